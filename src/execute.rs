use crate::{
    board::Board,
    movegen::Castling,
    moves::{ExtendedMove, Move, SubMove},
    piece::{Piece, PieceKind, Role},
    square::Square,
};

impl Board {
    /// Works out what `movement` does to the board. The move must be legal
    /// and `piece` must be the piece standing on its origin.
    ///
    /// `choose` picks the promotion piece when the move leaves it open.
    pub(crate) fn classify(
        &self,
        piece: Piece,
        movement: Move,
        choose: impl FnOnce(Square) -> PieceKind,
    ) -> ExtendedMove {
        debug_assert_eq!(piece.square, movement.from);
        let submove = SubMove {
            piece,
            to: movement.to,
        };
        if piece.kind() == PieceKind::King
            && let Some(castling) = Castling::new(piece, movement.to, self)
        {
            return ExtendedMove::Castling {
                king: SubMove {
                    piece,
                    to: castling.king_destination,
                },
                rook: SubMove {
                    piece: castling.rook,
                    to: castling.rook_destination,
                },
            };
        }
        if piece.kind() != PieceKind::Pawn {
            return ExtendedMove::Normal {
                movement: submove,
                captured: self.get(movement.to),
            };
        }
        if movement.to.row() == piece.color.promotion_row() {
            ExtendedMove::Promotion {
                movement: submove,
                captured: self.get(movement.to),
                kind: movement.promotion.unwrap_or_else(|| choose(movement.to)),
            }
        } else if movement.from.column() != movement.to.column()
            && self.get(movement.to).is_none()
            && let Some(captured) = self.get(movement.to.with_row(movement.from.row()))
        {
            ExtendedMove::EnPassant {
                movement: submove,
                captured,
            }
        } else if movement.from.row().abs_diff(movement.to.row()) == 2 {
            ExtendedMove::PawnDoubleStep { movement: submove }
        } else {
            ExtendedMove::Normal {
                movement: submove,
                captured: self.get(movement.to),
            }
        }
    }
    /// Plays a classified move. Returns the square of the pawn whose
    /// en-passant flag expired, which `revert` needs back.
    pub(crate) fn execute(&mut self, movement: ExtendedMove) -> Option<Square> {
        let expired = self
            .pieces()
            .find(|piece| piece.can_be_captured_en_passant())
            .map(|piece| piece.square);
        if let Some(square) = expired
            && let Some(pawn) = self.get_mut(square)
        {
            pawn.set_en_passant(false);
        }
        match movement {
            ExtendedMove::Normal { movement, captured } => {
                if let Some(captured) = captured {
                    self.take(captured.square);
                }
                self.relocate(movement);
            }
            ExtendedMove::Castling { king, rook } => {
                self.take(king.from());
                self.take(rook.from());
                let mut castled_king = king.piece;
                castled_king.step_to(king.to);
                if let Role::King { castled, .. } = &mut castled_king.role {
                    *castled = true;
                }
                let mut castled_rook = rook.piece;
                castled_rook.step_to(rook.to);
                self.put(castled_king);
                self.put(castled_rook);
            }
            ExtendedMove::EnPassant { movement, captured } => {
                self.take(captured.square);
                self.relocate(movement);
            }
            ExtendedMove::PawnDoubleStep { movement } => {
                self.relocate(movement);
                if let Some(pawn) = self.get_mut(movement.to) {
                    pawn.set_en_passant(true);
                }
            }
            ExtendedMove::Promotion {
                movement,
                captured,
                kind,
            } => {
                if let Some(captured) = captured {
                    self.take(captured.square);
                }
                self.take(movement.from());
                self.put(Piece::new(movement.piece.color, kind, movement.to));
            }
        }
        expired
    }
    /// Takes back `movement`, leaving the board exactly as it was before
    /// `execute`.
    pub(crate) fn revert(&mut self, movement: ExtendedMove, expired: Option<Square>) {
        match movement {
            ExtendedMove::Normal { movement, captured }
            | ExtendedMove::Promotion {
                movement, captured, ..
            } => {
                self.take(movement.to);
                self.put(movement.piece);
                if let Some(captured) = captured {
                    self.put(captured);
                }
            }
            ExtendedMove::Castling { king, rook } => {
                self.take(king.to);
                self.take(rook.to);
                self.put(king.piece);
                self.put(rook.piece);
            }
            ExtendedMove::EnPassant { movement, captured } => {
                self.take(movement.to);
                self.put(movement.piece);
                self.put(captured);
            }
            ExtendedMove::PawnDoubleStep { movement } => {
                self.take(movement.to);
                self.put(movement.piece);
            }
        }
        if let Some(square) = expired
            && let Some(pawn) = self.get_mut(square)
        {
            pawn.set_en_passant(true);
        }
    }
    fn relocate(&mut self, movement: SubMove) {
        if let Some(mut piece) = self.take(movement.from()) {
            piece.step_to(movement.to);
            self.put(piece);
        }
    }
}
