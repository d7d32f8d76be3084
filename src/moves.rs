use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use crate::{
    piece::{ParsePieceKindError, Piece, PieceKind},
    square::{ParseSquareError, Square},
};

/// A requested move. Castling is written as the king moving onto its own
/// rook, e.g. `e1-h1`.
///
/// Equality ignores the promotion kind unless both sides name one, so a
/// move listed without a promotion matches a request that picks a kind.
#[derive(Debug, Clone, Copy)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}
impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }
    pub fn with_promotion(self, kind: PieceKind) -> Self {
        Move {
            promotion: Some(kind),
            ..self
        }
    }
}
impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from
            && self.to == other.to
            && match (self.promotion, other.promotion) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }
}
impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let separator = self.promotion.map_or('-', PieceKind::uppercase);
        write!(f, "{}{separator}{}", self.from, self.to)?;
        Ok(())
    }
}
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseMoveError {
    NotEnoughCharacter(usize),
    ParseSquareError(ParseSquareError),
    ParsePieceKindError(ParsePieceKindError),
    InvalidPromotion(PieceKind),
    Unexpected(char),
}
impl From<ParseSquareError> for ParseMoveError {
    fn from(value: ParseSquareError) -> Self {
        ParseMoveError::ParseSquareError(value)
    }
}
impl From<ParsePieceKindError> for ParseMoveError {
    fn from(value: ParsePieceKindError) -> Self {
        ParseMoveError::ParsePieceKindError(value)
    }
}
impl Display for ParseMoveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseMoveError::NotEnoughCharacter(len) => write!(
                f,
                "provided string have length of {len} characters, 5 were expected"
            )?,
            ParseMoveError::ParseSquareError(err) => write!(f, "{err}")?,
            ParseMoveError::ParsePieceKindError(err) => write!(f, "{err}")?,
            ParseMoveError::InvalidPromotion(kind) => write!(f, "cannot promote to {kind}")?,
            ParseMoveError::Unexpected(c) => write!(f, "unexpected `{c}`")?,
        }
        Ok(())
    }
}
impl Error for ParseMoveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseMoveError::ParseSquareError(err) => Some(err),
            ParseMoveError::ParsePieceKindError(err) => Some(err),
            _ => None,
        }
    }
}
impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        let [from_column, from_row, separator, to_column, to_row] = chars[..] else {
            if let Some(c) = chars.get(5) {
                return Err(ParseMoveError::Unexpected(*c));
            }
            return Err(ParseMoveError::NotEnoughCharacter(chars.len()));
        };
        let from = Square::from_chars(from_column, from_row)?;
        let to = Square::from_chars(to_column, to_row)?;
        let promotion = match separator {
            '-' => None,
            c => {
                let kind = PieceKind::from_letter(c)?;
                if !kind.is_promotion_choice() {
                    return Err(ParseMoveError::InvalidPromotion(kind));
                }
                Some(kind)
            }
        };
        Ok(Move {
            from,
            to,
            promotion,
        })
    }
}

/// One piece of a compound move: the piece as it stood before moving and
/// where it went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubMove {
    pub piece: Piece,
    pub to: Square,
}
impl SubMove {
    pub fn from(self) -> Square {
        self.piece.square
    }
}

/// An applied move with everything needed to take it back. Pieces are
/// recorded as they stood before the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtendedMove {
    Normal {
        movement: SubMove,
        captured: Option<Piece>,
    },
    Castling {
        king: SubMove,
        rook: SubMove,
    },
    EnPassant {
        movement: SubMove,
        captured: Piece,
    },
    PawnDoubleStep {
        movement: SubMove,
    },
    Promotion {
        movement: SubMove,
        captured: Option<Piece>,
        kind: PieceKind,
    },
}
impl ExtendedMove {
    /// The move in request form, castling as king-onto-rook.
    pub fn as_move(&self) -> Move {
        match *self {
            ExtendedMove::Normal { movement, .. }
            | ExtendedMove::EnPassant { movement, .. }
            | ExtendedMove::PawnDoubleStep { movement } => Move::new(movement.from(), movement.to),
            ExtendedMove::Castling { king, rook } => Move::new(king.from(), rook.from()),
            ExtendedMove::Promotion { movement, kind, .. } => {
                Move::new(movement.from(), movement.to).with_promotion(kind)
            }
        }
    }
    pub fn captured(&self) -> Option<Piece> {
        match *self {
            ExtendedMove::Normal { captured, .. } | ExtendedMove::Promotion { captured, .. } => {
                captured
            }
            ExtendedMove::EnPassant { captured, .. } => Some(captured),
            ExtendedMove::Castling { .. } | ExtendedMove::PawnDoubleStep { .. } => None,
        }
    }
    /// Whether the move resets the half-move counter.
    pub fn is_irreversible(&self) -> bool {
        match self {
            ExtendedMove::Normal { movement, captured } => {
                captured.is_some() || movement.piece.kind() == PieceKind::Pawn
            }
            ExtendedMove::Castling { .. } => false,
            ExtendedMove::EnPassant { .. }
            | ExtendedMove::PawnDoubleStep { .. }
            | ExtendedMove::Promotion { .. } => true,
        }
    }
}
impl Display for ExtendedMove {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_move())
    }
}
