use std::{
    cell::RefCell,
    fmt::{self, Display, Formatter},
    ops::Index,
    sync::Arc,
};

use crate::{
    attack_lines::AttackLines,
    color::Color,
    error::InvalidPosition,
    piece::{Piece, PieceKind},
    square::{Direction, Offset, Square},
};

/// Mailbox board: one slot per square plus the square of each king.
///
/// Attack lines are memoized for one color at a time. Every method that
/// mutates the slots clears the memo before returning.
#[derive(Debug, Clone)]
pub struct Board {
    squares: [Option<Piece>; 64],
    kings: [Square; 2],
    attack_lines: RefCell<Option<Arc<AttackLines>>>,
}
impl Board {
    pub fn starting_position() -> Self {
        let mut pieces = Vec::with_capacity(32);
        for color in Color::ALL {
            for (column, kind) in (0..).zip(PieceKind::STARTING_CONFIGURATION) {
                pieces.push(Piece::new(
                    color,
                    kind,
                    Square::new(color.back_row(), column),
                ));
                pieces.push(Piece::new(
                    color,
                    PieceKind::Pawn,
                    Square::new(color.pawn_start_row(), column),
                ));
            }
        }
        Board::from_pieces(pieces).unwrap_or_else(|err| unreachable!("{err}"))
    }
    /// Places `pieces` on an empty board, requiring distinct squares and
    /// exactly one king per color.
    pub fn from_pieces(pieces: impl IntoIterator<Item = Piece>) -> Result<Self, InvalidPosition> {
        let mut squares = [None; 64];
        let mut kings = [None, None];
        for piece in pieces {
            let slot = &mut squares[piece.square.index()];
            if slot.is_some() {
                return Err(InvalidPosition::SharedSquare(piece.square));
            }
            *slot = Some(piece);
            if piece.kind() == PieceKind::King {
                let king = &mut kings[piece.color as usize];
                if king.is_some() {
                    return Err(InvalidPosition::ExceededKings(piece.color));
                }
                *king = Some(piece.square);
            }
        }
        let [Some(white), Some(black)] = kings else {
            let color = if kings[0].is_none() {
                Color::White
            } else {
                Color::Black
            };
            return Err(InvalidPosition::NoKing(color));
        };
        Ok(Board {
            squares,
            kings: [white, black],
            attack_lines: RefCell::new(None),
        })
    }
    /// Checks what the rules guarantee for any position reachable with
    /// `current_player` to move.
    pub fn validate(&self, current_player: Color) -> Result<(), InvalidPosition> {
        let mut en_passant = None;
        for piece in self.pieces() {
            if piece.kind() == PieceKind::Pawn
                && (piece.square.row() == 0 || piece.square.row() == 7)
            {
                return Err(InvalidPosition::PawnOnBackRank(piece.square));
            }
            if piece.can_be_captured_en_passant()
                && (piece.color == current_player
                    || piece.square.row() != piece.color.double_step_row())
            {
                return Err(InvalidPosition::MisplacedEnPassant(piece.square));
            }
            if piece.can_be_captured_en_passant() {
                if let Some(first) = en_passant {
                    return Err(InvalidPosition::MultipleEnPassant(first, piece.square));
                }
                en_passant = Some(piece.square);
            }
        }
        if self.is_attacked(self.king(!current_player), current_player) {
            return Err(InvalidPosition::NonPlayerInCheck);
        }
        if self.attackers(self.king(current_player), !current_player) > 2 {
            return Err(InvalidPosition::MoreThanTwoCheckers);
        }
        Ok(())
    }
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }
    pub fn king(&self, color: Color) -> Square {
        self.kings[color as usize]
    }
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.squares.iter().copied().flatten()
    }
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        self.pieces().filter(move |piece| piece.color == color)
    }
    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }
    /// Whether `square` holds a piece of `color` of one of `kinds`.
    pub fn holds(&self, square: Square, color: Color, kinds: &[PieceKind]) -> bool {
        self.get(square)
            .is_some_and(|piece| piece.color == color && kinds.contains(&piece.kind()))
    }
    /// First occupied square walking from `origin` towards `direction`.
    pub fn first_along(&self, origin: Square, direction: Direction) -> Option<Piece> {
        origin.ray(direction).find_map(|square| self.get(square))
    }

    pub(crate) fn take(&mut self, square: Square) -> Option<Piece> {
        self.invalidate();
        self.squares[square.index()].take()
    }
    /// Puts `piece` on its own square. The square must be empty.
    pub(crate) fn put(&mut self, piece: Piece) {
        self.invalidate();
        let slot = &mut self.squares[piece.square.index()];
        assert!(
            slot.is_none(),
            "{piece} placed on occupied {}",
            piece.square
        );
        *slot = Some(piece);
        if piece.kind() == PieceKind::King {
            self.kings[piece.color as usize] = piece.square;
        }
    }
    pub(crate) fn get_mut(&mut self, square: Square) -> Option<&mut Piece> {
        self.invalidate();
        self.squares[square.index()].as_mut()
    }
    fn invalidate(&mut self) {
        *self.attack_lines.get_mut() = None;
    }

    /// Checks and pins against the king of `color`, memoized until the next
    /// mutation.
    pub fn attack_lines(&self, color: Color) -> Arc<AttackLines> {
        let mut cache = self.attack_lines.borrow_mut();
        match &*cache {
            Some(lines) if lines.color() == color => lines.clone(),
            _ => {
                let lines = Arc::new(AttackLines::compute(self, color));
                *cache = Some(lines.clone());
                lines
            }
        }
    }
    pub fn is_check(&self, color: Color) -> bool {
        self.attack_lines(color).is_check()
    }
    /// Number of pieces of `by` attacking `square`, scanning the board
    /// directly.
    pub fn attackers(&self, square: Square, by: Color) -> usize {
        let pawns = Direction::pawn_captures(by)
            .into_iter()
            .filter_map(|direction| square.step(direction.reverse()))
            .filter(|origin| self.holds(*origin, by, &[PieceKind::Pawn]))
            .count();
        let knights = Offset::KNIGHT_JUMPS
            .into_iter()
            .filter_map(|jump| square.shift(jump))
            .filter(|origin| self.holds(*origin, by, &[PieceKind::Knight]))
            .count();
        let kings = Direction::ALL
            .into_iter()
            .filter_map(|direction| square.step(direction))
            .filter(|origin| self.holds(*origin, by, &[PieceKind::King]))
            .count();
        let sliders = Direction::ALL
            .into_iter()
            .filter(|direction| {
                self.first_along(square, *direction).is_some_and(|piece| {
                    piece.color == by && piece.kind().slides_along(*direction)
                })
            })
            .count();
        pawns + knights + kings + sliders
    }
    pub fn is_attacked(&self, square: Square, by: Color) -> bool {
        self.attackers(square, by) > 0
    }
    /// Opens a scoped mutation. Every change made through the probe is
    /// reverted when it drops, whatever happened in between.
    pub(crate) fn probe(&mut self) -> Probe<'_> {
        Probe {
            kings: self.kings,
            board: self,
            saved: Vec::with_capacity(4),
        }
    }
}
impl Index<Square> for Board {
    type Output = Option<Piece>;

    fn index(&self, index: Square) -> &Self::Output {
        &self.squares[index.index()]
    }
}
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.squares == other.squares
    }
}
impl Eq for Board {}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for row in (0..8).rev() {
            for column in 0..8 {
                let square = Square::new(row, column);
                match self.get(square) {
                    Some(piece) => write!(f, "{}", piece.fen())?,
                    None => write!(f, ".")?,
                }
            }
            writeln!(f, " {}", row + 1)?;
        }
        write!(f, "abcdefgh")?;
        Ok(())
    }
}

/// Scoped, self-reverting mutation of a [`Board`].
///
/// The probe writes the slots directly without touching the attack-line
/// memo: the memo is valid again once the probe restores the slots, and the
/// exclusive borrow keeps anyone from reading it in between.
pub(crate) struct Probe<'a> {
    board: &'a mut Board,
    saved: Vec<(Square, Option<Piece>)>,
    kings: [Square; 2],
}
impl Probe<'_> {
    fn set(&mut self, square: Square, piece: Option<Piece>) {
        let slot = &mut self.board.squares[square.index()];
        self.saved.push((square, *slot));
        *slot = piece;
    }
    /// Moves whatever stands on `origin` to `destination`, dropping anything
    /// that was there.
    pub fn relocate(&mut self, origin: Square, destination: Square) {
        let piece = self.board.get(origin).map(|piece| Piece {
            square: destination,
            ..piece
        });
        self.set(origin, None);
        self.set(destination, piece);
        if let Some(piece) = piece
            && piece.kind() == PieceKind::King
        {
            self.board.kings[piece.color as usize] = destination;
        }
    }
    pub fn remove(&mut self, square: Square) {
        self.set(square, None);
    }
    pub fn is_king_attacked(&self, color: Color) -> bool {
        self.board.is_attacked(self.board.king(color), !color)
    }
}
impl Drop for Probe<'_> {
    fn drop(&mut self) {
        for (square, piece) in self.saved.drain(..).rev() {
            self.board.squares[square.index()] = piece;
        }
        self.board.kings = self.kings;
    }
}

#[cfg(test)]
mod test {
    use crate::{
        board::Board,
        color::Color,
        error::InvalidPosition,
        piece::{Piece, PieceKind},
        square,
    };

    fn kings() -> [Piece; 2] {
        [
            Piece::new(Color::White, PieceKind::King, square!("e1")),
            Piece::new(Color::Black, PieceKind::King, square!("e8")),
        ]
    }

    #[test]
    fn starting_position_layout() {
        let board = Board::starting_position();
        assert_eq!(board.piece_count(), 32);
        assert_eq!(board.king(Color::White), square!("e1"));
        assert_eq!(board.king(Color::Black), square!("e8"));
        assert!(board.holds(square!("d8"), Color::Black, &[PieceKind::Queen]));
        assert!(board.holds(square!("h2"), Color::White, &[PieceKind::Pawn]));
        assert!(!board.is_check(Color::White));
    }
    #[test]
    fn rejects_broken_king_invariants() {
        let [white, _] = kings();
        assert_eq!(
            Board::from_pieces([white]).unwrap_err(),
            InvalidPosition::NoKing(Color::Black)
        );
        let [white, black] = kings();
        let second = Piece::new(Color::White, PieceKind::King, square!("a1"));
        assert_eq!(
            Board::from_pieces([white, black, second]).unwrap_err(),
            InvalidPosition::ExceededKings(Color::White)
        );
        let rook = Piece::new(Color::White, PieceKind::Rook, square!("e1"));
        assert_eq!(
            Board::from_pieces([white, black, rook]).unwrap_err(),
            InvalidPosition::SharedSquare(square!("e1"))
        );
    }
    #[test]
    fn counts_attackers() {
        let [white, black] = kings();
        let board = Board::from_pieces([
            white,
            black,
            Piece::new(Color::Black, PieceKind::Knight, square!("d3")),
            Piece::new(Color::Black, PieceKind::Rook, square!("e5")),
            Piece::new(Color::Black, PieceKind::Pawn, square!("f2")),
        ])
        .unwrap();
        assert_eq!(board.attackers(square!("e1"), Color::Black), 3);
        assert_eq!(
            board.validate(Color::White),
            Err(InvalidPosition::MoreThanTwoCheckers)
        );
        assert_eq!(
            board.validate(Color::Black),
            Err(InvalidPosition::NonPlayerInCheck)
        );
    }
    #[test]
    fn probe_reverts_on_drop() {
        let mut board = Board::starting_position();
        let before = board.clone();
        {
            let mut probe = board.probe();
            probe.relocate(square!("e1"), square!("e4"));
            probe.remove(square!("d8"));
            assert!(!probe.is_king_attacked(Color::White));
        }
        assert_eq!(board, before);
        assert_eq!(board.king(Color::White), square!("e1"));
    }
    #[test]
    fn memo_follows_mutation() {
        let [white, black] = kings();
        let mut board = Board::from_pieces([
            white,
            black,
            Piece::new(Color::Black, PieceKind::Rook, square!("a2")),
        ])
        .unwrap();
        assert!(!board.is_check(Color::White));
        let mut rook = board.take(square!("a2")).unwrap();
        rook.step_to(square!("a1"));
        board.put(rook);
        assert!(board.is_check(Color::White));
    }
}
