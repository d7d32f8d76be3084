use std::fmt::{self, Display, Formatter};

use crate::{board::Board, color::Color, piece::PieceKind};

/// State of the game after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    Ongoing,
    Checkmate,
    Stalemate,
    /// Neither side has the material to force mate.
    Draw,
    ThreeTimesSamePosition,
    FiftyMovesNoHit,
}
impl GameResult {
    pub fn is_over(self) -> bool {
        self != GameResult::Ongoing
    }
    /// The winner when `loser` is the side to move in this result.
    pub fn winner(self, loser: Color) -> Option<Color> {
        (self == GameResult::Checkmate).then_some(!loser)
    }
}
impl Display for GameResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Ongoing => write!(f, "ongoing")?,
            GameResult::Checkmate => write!(f, "checkmate")?,
            GameResult::Stalemate => write!(f, "stalemate")?,
            GameResult::Draw => write!(f, "draw by insufficient material")?,
            GameResult::ThreeTimesSamePosition => write!(f, "draw by threefold repetition")?,
            GameResult::FiftyMovesNoHit => write!(f, "draw by the fifty-move rule")?,
        }
        Ok(())
    }
}

/// Whether the remaining material is too thin to force mate: at most 6
/// pieces besides the kings, no pawn, rook, or queen, and each side down to
/// a lone bishop, or at most two knights.
///
/// A bishop and a knight together can force mate and keep the game going.
/// Some drawn material, such as same-colored bishops on both sides, is still
/// played out.
pub fn is_low_material(board: &Board) -> bool {
    if board.piece_count().saturating_sub(2) > 6 {
        return false;
    }
    Color::ALL.into_iter().all(|color| {
        board
            .pieces_of(color)
            .try_fold((0, 0), |(bishops, knights), piece| match piece.kind() {
                PieceKind::King => Some((bishops, knights)),
                PieceKind::Bishop => Some((bishops + 1, knights)),
                PieceKind::Knight => Some((bishops, knights + 1)),
                PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => None,
            })
            .is_some_and(|material| matches!(material, (0, 0..=2) | (1, 0)))
    })
}
