use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    num::ParseIntError,
};

use crate::{
    board::Board,
    color::{Color, ParseColorError},
    error::InvalidPosition,
    game::Game,
    piece::{ParsePieceError, Piece},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionErrorReason {
    MissingField(&'static str),
    Side(ParseColorError),
    Counter(ParseIntError),
    Piece(ParsePieceError),
    Position(InvalidPosition),
}
impl Display for DescriptionErrorReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DescriptionErrorReason::MissingField(field) => write!(f, "missing {field}")?,
            DescriptionErrorReason::Side(err) => write!(f, "{err}")?,
            DescriptionErrorReason::Counter(err) => write!(f, "invalid half-move counter: {err}")?,
            DescriptionErrorReason::Piece(err) => write!(f, "{err}")?,
            DescriptionErrorReason::Position(err) => write!(f, "{err}")?,
        }
        Ok(())
    }
}

/// A malformed position description, naming the token at fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDescriptionError {
    pub token: Box<str>,
    pub reason: DescriptionErrorReason,
}
impl ParseDescriptionError {
    fn new(token: &str, reason: DescriptionErrorReason) -> Self {
        ParseDescriptionError {
            token: token.into(),
            reason,
        }
    }
}
impl Display for ParseDescriptionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`: {}", self.token, self.reason)?;
        Ok(())
    }
}
impl Error for ParseDescriptionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.reason {
            DescriptionErrorReason::MissingField(_) => None,
            DescriptionErrorReason::Side(err) => Some(err),
            DescriptionErrorReason::Counter(err) => Some(err),
            DescriptionErrorReason::Piece(err) => Some(err),
            DescriptionErrorReason::Position(err) => Some(err),
        }
    }
}

impl Game {
    /// Loads a position description such as
    /// `white 0 King-white-e1-0 Rook-white-h1-0 King-black-e8-0`.
    ///
    /// Pieces may be listed in any order.
    ///
    /// # Errors
    ///
    /// Returns [`ParseDescriptionError`] naming the first malformed token, or
    /// the whole piece list if the pieces do not form a valid position.
    pub fn from_description(s: &str) -> Result<Self, ParseDescriptionError> {
        let mut tokens = s.split_whitespace();
        let side = tokens.next().ok_or_else(|| {
            ParseDescriptionError::new(s, DescriptionErrorReason::MissingField("side to move"))
        })?;
        let current_player: Color = side
            .parse()
            .map_err(|err| ParseDescriptionError::new(side, DescriptionErrorReason::Side(err)))?;
        let counter = tokens.next().ok_or_else(|| {
            ParseDescriptionError::new(s, DescriptionErrorReason::MissingField("half-move counter"))
        })?;
        let half_moves = counter.parse().map_err(|err| {
            ParseDescriptionError::new(counter, DescriptionErrorReason::Counter(err))
        })?;
        let pieces = tokens
            .map(|token| {
                token.parse::<Piece>().map_err(|err| {
                    ParseDescriptionError::new(token, DescriptionErrorReason::Piece(err))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let piece_list = pieces
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        Board::from_pieces(pieces)
            .and_then(|board| Game::from_board(board, current_player, half_moves))
            .map_err(|err| {
                ParseDescriptionError::new(&piece_list, DescriptionErrorReason::Position(err))
            })
    }
    /// The position as `<side> <half-move counter> <pieces>`, pieces in
    /// square order from a1 to h8.
    pub fn description(&self) -> String {
        let mut description = format!("{} {}", self.current_player(), self.half_moves());
        for piece in self.board().pieces() {
            description.push(' ');
            description.push_str(&piece.to_string());
        }
        description
    }
}

#[cfg(test)]
mod test {
    use crate::{
        color::Color,
        description::DescriptionErrorReason,
        error::InvalidPosition,
        game::Game,
        piece::PieceKind,
        square,
    };

    #[test]
    fn round_trip() {
        let description = "white 7 Rook-white-f1-1 King-white-g1-1-true Pawn-white-d5-false \
            Pawn-black-e5-true Queen-black-d8 King-black-e8-0 Rook-black-h8-0";
        let game = Game::from_description(description).unwrap();
        assert_eq!(game.current_player(), Color::White);
        assert_eq!(game.half_moves(), 7);
        assert_eq!(game.description(), description);
        assert_eq!(Game::new().description().split(' ').count(), 34);
    }
    #[test]
    fn any_piece_order() {
        let game =
            Game::from_description("white 0 King-black-e8 Knight-white-b1 King-white-e1").unwrap();
        assert_eq!(
            game.description(),
            "white 0 Knight-white-b1 King-white-e1-0 King-black-e8-0"
        );
        assert!(game.board().holds(square!("b1"), Color::White, &[PieceKind::Knight]));
    }
    #[test]
    fn names_the_bad_token() {
        let err = Game::from_description("white 0 King-white-e1-0 King-black-e9-0").unwrap_err();
        assert_eq!(&*err.token, "King-black-e9-0");
        assert!(matches!(err.reason, DescriptionErrorReason::Piece(_)));

        let err = Game::from_description("green 0 King-white-e1-0").unwrap_err();
        assert_eq!(&*err.token, "green");

        let err = Game::from_description("white x King-white-e1-0").unwrap_err();
        assert_eq!(&*err.token, "x");
        assert!(matches!(err.reason, DescriptionErrorReason::Counter(_)));

        let err = Game::from_description("").unwrap_err();
        assert_eq!(err.reason, DescriptionErrorReason::MissingField("side to move"));
    }
    #[test]
    fn rejects_invalid_positions() {
        let err = Game::from_description("white 0 King-white-e1-0").unwrap_err();
        assert_eq!(
            err.reason,
            DescriptionErrorReason::Position(InvalidPosition::NoKing(Color::Black))
        );
        let err = Game::from_description(
            "white 0 King-white-e1-0 Pawn-white-a8-false King-black-e8-0",
        )
        .unwrap_err();
        assert_eq!(
            err.reason,
            DescriptionErrorReason::Position(InvalidPosition::PawnOnBackRank(square!("a8")))
        );
        let err = Game::from_description("white 0 King-white-e1-0 Rook-white-e7-1 King-black-e8-0")
            .unwrap_err();
        assert_eq!(
            err.reason,
            DescriptionErrorReason::Position(InvalidPosition::NonPlayerInCheck)
        );
    }
    #[test]
    fn rejects_two_en_passant_pawns() {
        let err = Game::from_description(
            "white 0 King-white-e1-0 Pawn-white-d5-false Pawn-black-c5-true \
             Pawn-black-e5-true King-black-h8-0",
        )
        .unwrap_err();
        assert_eq!(
            err.reason,
            DescriptionErrorReason::Position(InvalidPosition::MultipleEnPassant(
                square!("c5"),
                square!("e5")
            ))
        );
    }
}
