use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    iter::Peekable,
    num::ParseIntError,
};

use crate::{
    board::Board,
    color::Color,
    error::InvalidPosition,
    game::Game,
    movegen::Castling,
    piece::{Piece, PieceKind, Role},
    square::{Direction, ParseSquareError, Square},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFenError {
    NotEnoughSquaresOnRow,
    ExceedingSquaresOnRow,
    UnexpectedChar(char),
    UnexpectedEol,
    InvalidCastling(char),
    InvalidEnPassant(Square),
    ParseSquareError(ParseSquareError),
    Counter(ParseIntError),
    InvalidPosition(InvalidPosition),
}
impl From<ParseSquareError> for ParseFenError {
    fn from(value: ParseSquareError) -> Self {
        ParseFenError::ParseSquareError(value)
    }
}
impl From<ParseIntError> for ParseFenError {
    fn from(value: ParseIntError) -> Self {
        ParseFenError::Counter(value)
    }
}
impl From<InvalidPosition> for ParseFenError {
    fn from(value: InvalidPosition) -> Self {
        ParseFenError::InvalidPosition(value)
    }
}
impl Display for ParseFenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseFenError::NotEnoughSquaresOnRow => write!(f, "a row has fewer than 8 squares")?,
            ParseFenError::ExceedingSquaresOnRow => write!(f, "a row has more than 8 squares")?,
            ParseFenError::UnexpectedChar(c) => write!(f, "unexpected `{c}`")?,
            ParseFenError::UnexpectedEol => write!(f, "unexpected end of line")?,
            ParseFenError::InvalidCastling(c) => {
                write!(f, "castling right `{c}` has no unmoved king and rook")?;
            }
            ParseFenError::InvalidEnPassant(square) => {
                write!(f, "no pawn can be captured en passant on {square}")?;
            }
            ParseFenError::ParseSquareError(err) => write!(f, "{err}")?,
            ParseFenError::Counter(err) => write!(f, "invalid move counter: {err}")?,
            ParseFenError::InvalidPosition(err) => write!(f, "{err}")?,
        }
        Ok(())
    }
}
impl Error for ParseFenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseFenError::ParseSquareError(err) => Some(err),
            ParseFenError::Counter(err) => Some(err),
            ParseFenError::InvalidPosition(err) => Some(err),
            _ => None,
        }
    }
}

fn parse_placement(placement: &str) -> Result<Vec<Piece>, ParseFenError> {
    let mut pieces = Vec::new();
    let mut rows = placement.split('/');
    for row in (0..8).rev() {
        let cells = rows.next().ok_or(ParseFenError::UnexpectedEol)?;
        let mut column: u8 = 0;
        for c in cells.chars() {
            if let Some(space) = c.to_digit(10).filter(|space| (1..=8).contains(space)) {
                column += u8::try_from(space).unwrap_or(8);
            } else {
                let kind = PieceKind::from_letter(c).map_err(|_| ParseFenError::UnexpectedChar(c))?;
                if column >= 8 {
                    return Err(ParseFenError::ExceedingSquaresOnRow);
                }
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                pieces.push(Piece::new(color, kind, Square::new(row, column)));
                column += 1;
            }
            if column > 8 {
                return Err(ParseFenError::ExceedingSquaresOnRow);
            }
        }
        if column < 8 {
            return Err(ParseFenError::NotEnoughSquaresOnRow);
        }
    }
    if rows.next().is_some() {
        return Err(ParseFenError::UnexpectedChar('/'));
    }
    Ok(pieces)
}

/// Marks every king and rook as moved, then grants the castling rights named
/// by `rights` back.
fn apply_castling_rights(pieces: &mut [Piece], rights: &str) -> Result<(), ParseFenError> {
    for piece in pieces.iter_mut() {
        if let Role::Rook { steps } | Role::King { steps, .. } = &mut piece.role {
            *steps = 1;
        }
    }
    if rights == "-" {
        return Ok(());
    }
    for c in rights.chars() {
        let (color, column) = match c {
            'K' => (Color::White, 7),
            'Q' => (Color::White, 0),
            'k' => (Color::Black, 7),
            'q' => (Color::Black, 0),
            c => return Err(ParseFenError::UnexpectedChar(c)),
        };
        let row = color.back_row();
        let king = pieces
            .iter()
            .position(|piece| piece.is(color, PieceKind::King) && piece.square.row() == row);
        let rook = pieces
            .iter()
            .position(|piece| piece.is(color, PieceKind::Rook) && piece.square == Square::new(row, column));
        let (Some(king), Some(rook)) = (king, rook) else {
            return Err(ParseFenError::InvalidCastling(c));
        };
        for index in [king, rook] {
            if let Role::Rook { steps } | Role::King { steps, .. } = &mut pieces[index].role {
                *steps = 0;
            }
        }
    }
    Ok(())
}

/// Flags the pawn that just passed over `target`.
fn apply_en_passant(
    pieces: &mut [Piece],
    target: &str,
    current_player: Color,
) -> Result<(), ParseFenError> {
    if target == "-" {
        return Ok(());
    }
    let target: Square = target.parse()?;
    let mover = !current_player;
    let pawn = pieces.iter_mut().find(|piece| {
        piece.is(mover, PieceKind::Pawn)
            && piece.square.column() == target.column()
            && piece.square.row() == mover.double_step_row()
            && i16::from(target.row()) == i16::from(piece.square.row()) - i16::from(mover.forward())
    });
    let Some(pawn) = pawn else {
        return Err(ParseFenError::InvalidEnPassant(target));
    };
    pawn.set_en_passant(true);
    Ok(())
}

impl Game {
    /// Loads a position in Forsyth-Edwards Notation. The half-move clock and
    /// full-move number may be left out.
    ///
    /// Kings and rooks without a castling right are loaded as moved pieces.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFenError`] for malformed FEN or an invalid position.
    pub fn from_fen(fen: &str) -> Result<Self, ParseFenError> {
        let mut fields = fen.split_whitespace();
        let mut pieces = parse_placement(fields.next().ok_or(ParseFenError::UnexpectedEol)?)?;
        let current_player = match fields.next().ok_or(ParseFenError::UnexpectedEol)? {
            "w" => Color::White,
            "b" => Color::Black,
            side => {
                return Err(ParseFenError::UnexpectedChar(
                    side.chars().next().unwrap_or(' '),
                ));
            }
        };
        apply_castling_rights(&mut pieces, fields.next().unwrap_or("-"))?;
        apply_en_passant(&mut pieces, fields.next().unwrap_or("-"), current_player)?;
        let half_moves = fields.next().map(str::parse).transpose()?.unwrap_or(0);
        if let Some(full_moves) = fields.next() {
            let _: u32 = full_moves.parse()?;
        }
        if let Some(field) = fields.next() {
            return Err(ParseFenError::UnexpectedChar(
                field.chars().next().unwrap_or(' '),
            ));
        }
        let board = Board::from_pieces(pieces)?;
        Ok(Game::from_board(board, current_player, half_moves)?)
    }
    /// The position in Forsyth-Edwards Notation.
    ///
    /// The en-passant square is only written when an enemy pawn stands next
    /// to the flagged pawn. Full moves are counted from the position the
    /// game was loaded from.
    pub fn fen(&self) -> String {
        Fen(self).to_string()
    }
}

struct Fen<'a>(&'a Game);

impl Fen<'_> {
    fn castling_rights(&self) -> String {
        let board = self.0.board();
        let rights: String = Color::ALL
            .into_iter()
            .flat_map(|color| {
                [(7, 'K'), (0, 'Q')]
                    .into_iter()
                    .filter(move |(column, _)| {
                        board.get(board.king(color)).is_some_and(|king| {
                            Castling::new(king, Square::new(color.back_row(), *column), board)
                                .is_some()
                        })
                    })
                    .map(move |(_, right)| match color {
                        Color::White => right,
                        Color::Black => right.to_ascii_lowercase(),
                    })
            })
            .collect();
        if rights.is_empty() {
            "-".to_string()
        } else {
            rights
        }
    }
    fn en_passant_target(&self) -> Option<Square> {
        let board = self.0.board();
        let pawn = board
            .pieces()
            .find(|piece| piece.can_be_captured_en_passant())?;
        let capturable = [Direction::West, Direction::East]
            .into_iter()
            .filter_map(|side| pawn.square.step(side))
            .any(|square| board.holds(square, !pawn.color, &[PieceKind::Pawn]));
        capturable.then(|| {
            let behind = i16::from(pawn.square.row()) - i16::from(pawn.color.forward());
            pawn.square.with_row(u8::try_from(behind).unwrap_or_default())
        })
    }
    fn full_moves(&self) -> usize {
        let plies = self.0.history().count();
        // the side that moved first, counting back from the side to move
        let black_started = (self.0.current_player() == Color::Black) != (plies % 2 == 1);
        (plies + usize::from(black_started)) / 2 + 1
    }
}
impl Display for Fen<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let board = self.0.board();
        for row in (0..8).rev() {
            let cells = (0..8).map(|column| board.get(Square::new(row, column)));
            for cell in CellIter(cells.peekable()) {
                write!(f, "{cell}")?;
            }
            if row > 0 {
                write!(f, "/")?;
            }
        }
        write!(f, " {}", self.0.current_player().lowercase())?;
        write!(f, " {}", self.castling_rights())?;
        match self.en_passant_target() {
            Some(square) => write!(f, " {square}")?,
            None => write!(f, " -")?,
        }
        write!(f, " {} {}", self.0.half_moves(), self.full_moves())?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Cell {
    Piece(Piece),
    Space(u8),
}
impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Piece(piece) => write!(f, "{}", piece.fen())?,
            Cell::Space(space) => write!(f, "{space}")?,
        }
        Ok(())
    }
}
struct CellIter<T>(Peekable<T>)
where
    T: Iterator;

impl<T> Iterator for CellIter<T>
where
    T: Iterator<Item = Option<Piece>>,
{
    type Item = Cell;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|piece| match piece {
            Some(piece) => Cell::Piece(piece),
            None => {
                let mut count = 1;
                while self.0.peek().is_some_and(Option::is_none) {
                    self.0.next();
                    count += 1;
                }
                Cell::Space(count)
            }
        })
    }
}
