use std::ops::ControlFlow;

use crate::{
    attack_lines::{AttackLines, Regime},
    board::Board,
    color::Color,
    moves::Move,
    piece::{Piece, PieceKind},
    square::{Direction, Offset, Square},
};

type Visitor<'a> = &'a mut dyn FnMut(Move) -> ControlFlow<()>;

/// Movement capabilities shared by every piece kind.
pub trait Mover {
    /// Destinations ignoring checks and pins. Castling shows up as the square
    /// of the castling rook.
    fn pseudo_reachable(&self, piece: Piece, board: &Board) -> Vec<Square>;

    /// Feeds the legal moves of `piece` to `visit` until it breaks.
    ///
    /// `board` is only borrowed mutably for scoped simulations; it is
    /// unchanged when this returns.
    fn visit_legal(
        &self,
        piece: Piece,
        board: &mut Board,
        lines: &AttackLines,
        visit: Visitor<'_>,
    ) -> ControlFlow<()> {
        let regime = lines.regime(piece);
        if regime == Regime::Frozen {
            return ControlFlow::Continue(());
        }
        for destination in self.pseudo_reachable(piece, board) {
            if allows(regime, destination) {
                visit(Move::new(piece.square, destination))?;
            }
        }
        ControlFlow::Continue(())
    }

    fn legal_moves(&self, piece: Piece, board: &mut Board, lines: &AttackLines) -> Vec<Move> {
        let mut moves = Vec::new();
        let _ = self.visit_legal(piece, board, lines, &mut |movement| {
            moves.push(movement);
            ControlFlow::Continue(())
        });
        moves
    }

    /// Whether the piece has any legal move; stops at the first one found.
    fn is_selectable(&self, piece: Piece, board: &mut Board, lines: &AttackLines) -> bool {
        self.visit_legal(piece, board, lines, &mut |_| ControlFlow::Break(()))
            .is_break()
    }
}

fn allows(regime: Regime<'_>, destination: Square) -> bool {
    match regime {
        Regime::Free => true,
        Regime::Pinned(binding) => binding.allows(destination),
        Regime::Block(check) => check.resolves(destination),
        Regime::Frozen => false,
    }
}

fn is_open_for(board: &Board, square: Square, color: Color) -> bool {
    board.get(square).is_none_or(|piece| piece.color != color)
}

pub struct Pawn;

impl Pawn {
    /// The pawn an en-passant capture onto `destination` would remove.
    fn en_passant_victim(piece: Piece, board: &Board, destination: Square) -> Option<Square> {
        if destination.column() == piece.square.column() || board.get(destination).is_some() {
            return None;
        }
        let victim = destination.with_row(piece.square.row());
        board
            .get(victim)
            .filter(|target| target.color != piece.color && target.can_be_captured_en_passant())
            .map(|_| victim)
    }
}
impl Mover for Pawn {
    fn pseudo_reachable(&self, piece: Piece, board: &Board) -> Vec<Square> {
        let forward = Direction::forward(piece.color);
        let steps = if piece.square.row() == piece.color.pawn_start_row() {
            2
        } else {
            1
        };
        let mut destinations: Vec<_> = piece
            .square
            .ray(forward)
            .take(steps)
            .take_while(|square| board.get(*square).is_none())
            .collect();
        destinations.extend(
            Direction::pawn_captures(piece.color)
                .into_iter()
                .filter_map(|direction| piece.square.step(direction))
                .filter(|destination| {
                    board
                        .get(*destination)
                        .is_some_and(|target| target.color != piece.color)
                        || Pawn::en_passant_victim(piece, board, *destination).is_some()
                }),
        );
        destinations
    }
    fn visit_legal(
        &self,
        piece: Piece,
        board: &mut Board,
        lines: &AttackLines,
        visit: Visitor<'_>,
    ) -> ControlFlow<()> {
        let regime = lines.regime(piece);
        for destination in self.pseudo_reachable(piece, board) {
            // en passant removes a second piece from the board, which can
            // uncover an attack along the rank, so it is simulated instead
            let legal = if let Some(victim) = Pawn::en_passant_victim(piece, board, destination) {
                let mut probe = board.probe();
                probe.remove(victim);
                probe.relocate(piece.square, destination);
                !probe.is_king_attacked(piece.color)
            } else {
                allows(regime, destination)
            };
            if legal {
                visit(Move::new(piece.square, destination))?;
            }
        }
        ControlFlow::Continue(())
    }
}

pub struct Knight;

impl Mover for Knight {
    fn pseudo_reachable(&self, piece: Piece, board: &Board) -> Vec<Square> {
        Offset::KNIGHT_JUMPS
            .into_iter()
            .filter_map(|jump| piece.square.shift(jump))
            .filter(|destination| is_open_for(board, *destination, piece.color))
            .collect()
    }
}

/// Bishop, rook, and queen: slide along `directions` until blocked.
pub struct Slider {
    pub directions: &'static [Direction],
}
impl Mover for Slider {
    fn pseudo_reachable(&self, piece: Piece, board: &Board) -> Vec<Square> {
        let mut destinations = Vec::new();
        for direction in self.directions {
            for destination in piece.square.ray(*direction) {
                match board.get(destination) {
                    None => destinations.push(destination),
                    Some(target) => {
                        if target.color != piece.color {
                            destinations.push(destination);
                        }
                        break;
                    }
                }
            }
        }
        destinations
    }
}

/// A castling option: the rook and where both pieces end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Castling {
    pub rook: Piece,
    pub king_destination: Square,
    pub rook_destination: Square,
}
impl Castling {
    /// Castling geometry for `king` and the rook on `rook_square`, if both
    /// are unmoved and on their back row.
    pub fn new(king: Piece, rook_square: Square, board: &Board) -> Option<Self> {
        let row = king.color.back_row();
        if king.steps() != Some(0) || king.square.row() != row || rook_square.row() != row {
            return None;
        }
        let rook = board
            .get(rook_square)
            .filter(|rook| rook.is(king.color, PieceKind::Rook) && rook.steps() == Some(0))?;
        let (king_column, rook_column) = if rook_square.column() > king.square.column() {
            (6, 5)
        } else {
            (2, 3)
        };
        Some(Castling {
            rook,
            king_destination: Square::new(row, king_column),
            rook_destination: Square::new(row, rook_column),
        })
    }
    /// Squares the king walks over, destination included.
    fn king_path(self, king: Square) -> impl Iterator<Item = Square> {
        let destination = self.king_destination;
        king.direction_to(destination)
            .into_iter()
            .flat_map(move |direction| king.line_to(destination, direction).chain([destination]))
    }
    fn is_clear(self, king: Square, board: &Board) -> bool {
        let between = king
            .direction_to(self.rook.square)
            .into_iter()
            .flat_map(|direction| king.line_to(self.rook.square, direction));
        let rook_path = self
            .rook
            .square
            .direction_to(self.rook_destination)
            .into_iter()
            .flat_map(|direction| {
                self.rook
                    .square
                    .line_to(self.rook_destination, direction)
                    .chain([self.rook_destination])
            });
        between
            .chain(self.king_path(king))
            .chain(rook_path)
            .all(|square| square == king || square == self.rook.square || board.get(square).is_none())
    }
}

pub struct King;

impl King {
    fn castlings(piece: Piece, board: &Board) -> impl Iterator<Item = Castling> + '_ {
        [0, 7].into_iter().filter_map(move |column| {
            Castling::new(piece, piece.square.with_column(column), board)
        })
    }
    /// Whether the king of `color` would stand attacked on `destination`.
    fn is_exposed(board: &mut Board, origin: Square, destination: Square, color: Color) -> bool {
        let mut probe = board.probe();
        probe.relocate(origin, destination);
        probe.is_king_attacked(color)
    }
}
impl Mover for King {
    fn pseudo_reachable(&self, piece: Piece, board: &Board) -> Vec<Square> {
        Direction::ALL
            .into_iter()
            .filter_map(|direction| piece.square.step(direction))
            .filter(|destination| is_open_for(board, *destination, piece.color))
            .chain(
                King::castlings(piece, board)
                    .filter(|castling| castling.is_clear(piece.square, board))
                    .map(|castling| castling.rook.square),
            )
            .collect()
    }
    fn visit_legal(
        &self,
        piece: Piece,
        board: &mut Board,
        lines: &AttackLines,
        visit: Visitor<'_>,
    ) -> ControlFlow<()> {
        let steps: Vec<_> = Direction::ALL
            .into_iter()
            .filter_map(|direction| piece.square.step(direction))
            .filter(|destination| is_open_for(board, *destination, piece.color))
            .collect();
        for destination in steps {
            if !King::is_exposed(board, piece.square, destination, piece.color) {
                visit(Move::new(piece.square, destination))?;
            }
        }
        if lines.is_check() {
            return ControlFlow::Continue(());
        }
        let castlings: Vec<_> = King::castlings(piece, board)
            .filter(|castling| castling.is_clear(piece.square, board))
            .collect();
        for castling in castlings {
            let safe = castling
                .king_path(piece.square)
                .collect::<Vec<_>>()
                .into_iter()
                .all(|square| !King::is_exposed(board, piece.square, square, piece.color));
            if safe {
                visit(Move::new(piece.square, castling.rook.square))?;
            }
        }
        ControlFlow::Continue(())
    }
}

static PAWN: Pawn = Pawn;
static KNIGHT: Knight = Knight;
static BISHOP: Slider = Slider {
    directions: &Direction::DIAGONAL,
};
static ROOK: Slider = Slider {
    directions: &Direction::STRAIGHT,
};
static QUEEN: Slider = Slider {
    directions: &Direction::ALL,
};
static KING: King = King;

pub fn mover(kind: PieceKind) -> &'static dyn Mover {
    match kind {
        PieceKind::Pawn => &PAWN,
        PieceKind::Knight => &KNIGHT,
        PieceKind::Bishop => &BISHOP,
        PieceKind::Rook => &ROOK,
        PieceKind::Queen => &QUEEN,
        PieceKind::King => &KING,
    }
}

fn visit_all(board: &mut Board, color: Color, visit: Visitor<'_>) -> ControlFlow<()> {
    let lines = board.attack_lines(color);
    // under double check only the king can move
    let pieces: Vec<_> = if lines.is_double_check() {
        board.get(board.king(color)).into_iter().collect()
    } else {
        board.pieces_of(color).collect()
    };
    for piece in pieces {
        mover(piece.kind()).visit_legal(piece, board, &lines, visit)?;
    }
    ControlFlow::Continue(())
}

/// Every legal move of `color`.
pub fn legal_moves(board: &mut Board, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    let _ = visit_all(board, color, &mut |movement| {
        moves.push(movement);
        ControlFlow::Continue(())
    });
    moves
}

pub fn has_legal_move(board: &mut Board, color: Color) -> bool {
    visit_all(board, color, &mut |_| ControlFlow::Break(())).is_break()
}

/// Legal moves of the piece on `square`; empty for an empty square.
pub fn legal_moves_from(board: &mut Board, square: Square) -> Vec<Move> {
    let Some(piece) = board.get(square) else {
        return Vec::new();
    };
    let lines = board.attack_lines(piece.color);
    mover(piece.kind()).legal_moves(piece, board, &lines)
}

pub fn is_selectable(board: &mut Board, square: Square) -> bool {
    let Some(piece) = board.get(square) else {
        return false;
    };
    let lines = board.attack_lines(piece.color);
    mover(piece.kind()).is_selectable(piece, board, &lines)
}
