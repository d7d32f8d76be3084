use rustc_hash::FxHashMap;

use crate::{
    board::Board,
    color::Color,
    piece::{Piece, PieceKind},
    square::{Direction, Offset, Square},
};

/// An attacker giving check, with the squares that resolve it for any piece
/// other than the king: the attacker's own square, plus the squares between
/// it and the king for sliding attackers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckLine {
    attacker: Square,
    direction: Option<Direction>,
    squares: Vec<Square>,
}
impl CheckLine {
    fn sliding(king: Square, attacker: Square, direction: Direction) -> Self {
        let mut squares: Vec<_> = king.line_to(attacker, direction).collect();
        squares.push(attacker);
        CheckLine {
            attacker,
            direction: Some(direction),
            squares,
        }
    }
    fn contact(attacker: Square) -> Self {
        CheckLine {
            attacker,
            direction: None,
            squares: vec![attacker],
        }
    }
    pub fn attacker(&self) -> Square {
        self.attacker
    }
    /// Direction from the king towards a sliding attacker; `None` for pawn
    /// and knight checks, which cannot be blocked.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }
    pub fn resolves(&self, square: Square) -> bool {
        self.squares.contains(&square)
    }
}

/// A pinned piece and the squares it may still move to: those between the
/// king and itself, and those between itself and the pinning attacker,
/// attacker included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundLine {
    attacker: Square,
    direction: Direction,
    squares: Vec<Square>,
}
impl BoundLine {
    fn new(king: Square, pinned: Square, attacker: Square, direction: Direction) -> Self {
        let mut squares: Vec<_> = king.line_to(pinned, direction).collect();
        squares.extend(pinned.line_to(attacker, direction));
        squares.push(attacker);
        BoundLine {
            attacker,
            direction,
            squares,
        }
    }
    pub fn attacker(&self) -> Square {
        self.attacker
    }
    /// Direction from the king towards the pinned piece.
    pub fn direction(&self) -> Direction {
        self.direction
    }
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }
    pub fn allows(&self, square: Square) -> bool {
        self.squares.contains(&square)
    }
}

/// Which destinations a non-king piece may consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime<'a> {
    /// No check and not pinned.
    Free,
    /// No check, but confined to its pin axis.
    Pinned(&'a BoundLine),
    /// Single check: must capture the checker or interpose.
    Block(&'a CheckLine),
    /// Cannot move at all.
    Frozen,
}

/// Checks against the king of one color and the pins protecting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackLines {
    color: Color,
    checks: Vec<CheckLine>,
    bindings: FxHashMap<Square, BoundLine>,
}
impl AttackLines {
    pub fn compute(board: &Board, color: Color) -> Self {
        let king = board.king(color);
        let mut checks = Vec::with_capacity(2);
        let mut bindings = FxHashMap::default();
        for direction in Direction::ALL {
            let mut ray = king.ray(direction).filter_map(|square| board.get(square));
            let Some(first) = ray.next() else {
                continue;
            };
            if first.color != color {
                if first.kind().slides_along(direction) {
                    checks.push(CheckLine::sliding(king, first.square, direction));
                }
            } else if let Some(second) = ray.next()
                && second.color != color
                && second.kind().slides_along(direction)
            {
                bindings.insert(
                    first.square,
                    BoundLine::new(king, first.square, second.square, direction),
                );
            }
        }
        let pawns = Direction::pawn_captures(color)
            .into_iter()
            .filter_map(|direction| king.step(direction))
            .filter(|square| board.holds(*square, !color, &[PieceKind::Pawn]));
        let knights = Offset::KNIGHT_JUMPS
            .into_iter()
            .filter_map(|jump| king.shift(jump))
            .filter(|square| board.holds(*square, !color, &[PieceKind::Knight]));
        checks.extend(
            pawns
                .chain(knights)
                .map(|attacker| CheckLine::contact(attacker)),
        );
        assert!(
            checks.len() <= 2,
            "{color} king on {king} is attacked by {} pieces",
            checks.len()
        );
        AttackLines {
            color,
            checks,
            bindings,
        }
    }
    pub fn color(&self) -> Color {
        self.color
    }
    pub fn checks(&self) -> &[CheckLine] {
        &self.checks
    }
    pub fn is_check(&self) -> bool {
        !self.checks.is_empty()
    }
    pub fn is_double_check(&self) -> bool {
        self.checks.len() == 2
    }
    pub fn binding(&self, square: Square) -> Option<&BoundLine> {
        self.bindings.get(&square)
    }
    /// Legality regime of a non-king `piece` of this side.
    ///
    /// A pinned piece is frozen under any check. It can only move along the
    /// ray from its king through itself, while a check line lies on another
    /// ray from the king, or on a knight square off every ray. Two rays from
    /// one square meet only at that square, so no pinned move resolves a
    /// check. Under double check no single move resolves both lines, so
    /// every non-king piece is frozen there as well.
    pub fn regime(&self, piece: Piece) -> Regime<'_> {
        debug_assert_eq!(piece.color, self.color);
        debug_assert_ne!(piece.kind(), PieceKind::King);
        let binding = self.binding(piece.square);
        match (self.checks.as_slice(), binding) {
            ([], None) => Regime::Free,
            ([], Some(_)) if piece.kind() == PieceKind::Knight => Regime::Frozen,
            ([], Some(binding)) => Regime::Pinned(binding),
            ([check], None) => Regime::Block(check),
            _ => Regime::Frozen,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        attack_lines::{AttackLines, Regime},
        board::Board,
        color::Color,
        piece::{Piece, PieceKind},
        square,
        square::{Direction, Square},
    };

    fn setup(pieces: &[(Color, PieceKind, Square)]) -> Board {
        Board::from_pieces(
            pieces
                .iter()
                .map(|(color, kind, square)| Piece::new(*color, *kind, *square)),
        )
        .unwrap()
    }

    #[test]
    fn pin() {
        let board = setup(&[
            (Color::White, PieceKind::King, square!("e1")),
            (Color::White, PieceKind::Knight, square!("e2")),
            (Color::Black, PieceKind::Rook, square!("e7")),
            (Color::Black, PieceKind::King, square!("e8")),
        ]);
        let lines = AttackLines::compute(&board, Color::White);
        assert!(!lines.is_check());
        let binding = lines.binding(square!("e2")).unwrap();
        assert_eq!(binding.attacker(), square!("e7"));
        assert_eq!(binding.direction(), Direction::North);
        assert_eq!(
            binding.squares(),
            [
                square!("e3"),
                square!("e4"),
                square!("e5"),
                square!("e6"),
                square!("e7")
            ]
        );
        let knight = board.get(square!("e2")).unwrap();
        assert_eq!(lines.regime(knight), Regime::Frozen);
    }
    #[test]
    fn friendly_piece_behind_friendly_piece_is_not_pinned() {
        let board = setup(&[
            (Color::White, PieceKind::King, square!("a1")),
            (Color::White, PieceKind::Bishop, square!("b2")),
            (Color::White, PieceKind::Pawn, square!("c3")),
            (Color::Black, PieceKind::Queen, square!("h8")),
            (Color::Black, PieceKind::King, square!("e8")),
        ]);
        let lines = AttackLines::compute(&board, Color::White);
        assert!(lines.binding(square!("b2")).is_none());
        assert!(lines.binding(square!("c3")).is_none());
    }
    #[test]
    fn sliding_check_can_be_blocked() {
        let board = setup(&[
            (Color::White, PieceKind::King, square!("e1")),
            (Color::White, PieceKind::Rook, square!("a4")),
            (Color::Black, PieceKind::Bishop, square!("b4")),
            (Color::Black, PieceKind::King, square!("e8")),
        ]);
        let lines = AttackLines::compute(&board, Color::White);
        let [check] = lines.checks() else {
            panic!("expected one check");
        };
        assert_eq!(check.attacker(), square!("b4"));
        assert_eq!(check.direction(), Some(Direction::NorthWest));
        assert_eq!(check.squares(), [square!("d2"), square!("c3"), square!("b4")]);
        let rook = board.get(square!("a4")).unwrap();
        assert_eq!(lines.regime(rook), Regime::Block(check));
    }
    #[test]
    fn double_check_freezes_everything_but_the_king() {
        let board = setup(&[
            (Color::White, PieceKind::King, square!("e1")),
            (Color::White, PieceKind::Queen, square!("a5")),
            (Color::Black, PieceKind::Rook, square!("e5")),
            (Color::Black, PieceKind::Knight, square!("d3")),
            (Color::Black, PieceKind::King, square!("e8")),
        ]);
        let lines = AttackLines::compute(&board, Color::White);
        assert!(lines.is_double_check());
        assert!(lines.checks().iter().any(|check| check.direction().is_none()));
        let queen = board.get(square!("a5")).unwrap();
        assert_eq!(lines.regime(queen), Regime::Frozen);
    }
    #[test]
    fn pawn_checks_only_from_the_front() {
        let board = setup(&[
            (Color::White, PieceKind::King, square!("e4")),
            (Color::Black, PieceKind::Pawn, square!("d3")),
            (Color::Black, PieceKind::Pawn, square!("f3")),
            (Color::Black, PieceKind::King, square!("e8")),
        ]);
        assert!(!AttackLines::compute(&board, Color::White).is_check());
        let board = setup(&[
            (Color::White, PieceKind::King, square!("e4")),
            (Color::Black, PieceKind::Pawn, square!("d5")),
            (Color::Black, PieceKind::King, square!("e8")),
        ]);
        let lines = AttackLines::compute(&board, Color::White);
        assert_eq!(lines.checks().len(), 1);
        assert_eq!(lines.checks()[0].squares(), [square!("d5")]);
    }
}
