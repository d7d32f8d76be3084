use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use crate::{color::Color, moves::Move, square::Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidPosition {
    NoKing(Color),
    ExceededKings(Color),
    SharedSquare(Square),
    PawnOnBackRank(Square),
    MisplacedEnPassant(Square),
    MultipleEnPassant(Square, Square),
    NonPlayerInCheck,
    MoreThanTwoCheckers,
}
impl Display for InvalidPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InvalidPosition::NoKing(color) => write!(f, "no {color} king found")?,
            InvalidPosition::ExceededKings(color) => write!(f, "found more than 1 {color} king")?,
            InvalidPosition::SharedSquare(square) => {
                write!(f, "more than one piece placed on {square}")?;
            }
            InvalidPosition::PawnOnBackRank(square) => {
                write!(f, "pawn on {square} stands on a back rank")?;
            }
            InvalidPosition::MisplacedEnPassant(square) => write!(
                f,
                "pawn on {square} cannot be capturable en passant in this position"
            )?,
            InvalidPosition::MultipleEnPassant(first, second) => write!(
                f,
                "pawns on {first} and {second} cannot both be capturable en passant"
            )?,
            InvalidPosition::NonPlayerInCheck => write!(f, "non-player in check")?,
            InvalidPosition::MoreThanTwoCheckers => {
                write!(f, "found more than 2 pieces delivering check")?;
            }
        }
        Ok(())
    }
}
impl Error for InvalidPosition {}

/// A move outside the legal move set; the game was left untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IllegalMove(pub Move);

impl Display for IllegalMove {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not a legal move", self.0)?;
        Ok(())
    }
}
impl Error for IllegalMove {}
