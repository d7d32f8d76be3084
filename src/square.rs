use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    iter::successors,
    ops::{Add, Neg, Sub},
    str::FromStr,
};

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseSquareError {
    InvalidColumn(char),
    InvalidRow(char),
    NotEnoughCharacter(u8),
    Unexpected(char),
}
impl Display for ParseSquareError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParseSquareError::InvalidColumn(column) => write!(
                f,
                "found `{column}`, characters from `a` to `h` were expected instead"
            )?,
            ParseSquareError::InvalidRow(row) => write!(
                f,
                "found `{row}`, characters from `1` to `8` were expected instead"
            )?,
            ParseSquareError::NotEnoughCharacter(len) => write!(
                f,
                "provided string have length of {len} characters, 2 were expected"
            )?,
            ParseSquareError::Unexpected(c) => write!(f, "unexpected `{c}`")?,
        }
        Ok(())
    }
}
impl Error for ParseSquareError {}

/// A square of the board. Row 0 is rank 1 and column 0 is file a, so the
/// linear index runs a1, b1, ..., h1, a2, ..., h8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    pub fn new(row: u8, column: u8) -> Self {
        debug_assert!(row < 8, "{row} should be < 8");
        debug_assert!(column < 8, "{column} should be < 8");
        Square(row * 8 + column)
    }
    pub fn new_checked(row: i8, column: i8) -> Option<Self> {
        if (0..8).contains(&row) && (0..8).contains(&column) {
            Some(Square::new(row.unsigned_abs(), column.unsigned_abs()))
        } else {
            None
        }
    }
    /// Compile-time parser behind the `square!` macro.
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        assert!(bytes.len() == 2, "a square name has exactly 2 characters");
        let column = bytes[0].wrapping_sub(b'a');
        let row = bytes[1].wrapping_sub(b'1');
        assert!(column < 8, "file must be within `a` to `h`");
        assert!(row < 8, "rank must be within `1` to `8`");
        Square(row * 8 + column)
    }
    pub fn from_chars(column: char, row: char) -> Result<Self, ParseSquareError> {
        let column = match column {
            'a'..='h' => column as u8 - b'a',
            _ => return Err(ParseSquareError::InvalidColumn(column)),
        };
        let row = match row {
            '1'..='8' => row as u8 - b'1',
            _ => return Err(ParseSquareError::InvalidRow(row)),
        };
        Ok(Square::new(row, column))
    }
    pub fn row(self) -> u8 {
        self.0 / 8
    }
    pub fn column(self) -> u8 {
        self.0 % 8
    }
    pub fn index(self) -> usize {
        self.0 as usize
    }
    pub fn file(self) -> char {
        (b'a' + self.column()) as char
    }
    pub fn shift(self, offset: Offset) -> Option<Self> {
        Square::new_checked(
            signed(self.row()) + offset.row,
            signed(self.column()) + offset.column,
        )
    }
    pub fn step(self, direction: Direction) -> Option<Self> {
        self.shift(direction.offset())
    }
    /// Squares walked from `self` towards `direction`, excluding `self`.
    pub fn ray(self, direction: Direction) -> impl Iterator<Item = Self> + Clone {
        successors(self.step(direction), move |square| square.step(direction))
    }
    /// Squares strictly between `self` and `end`, walking towards `direction`.
    pub fn line_to(self, end: Self, direction: Direction) -> impl Iterator<Item = Self> + Clone {
        self.ray(direction).take_while(move |square| *square != end)
    }
    /// The direction leading from `self` to `other` if both share a line.
    pub fn direction_to(self, other: Self) -> Option<Direction> {
        Direction::from_offset(other - self)
    }
    pub fn with_row(self, row: u8) -> Self {
        Square::new(row, self.column())
    }
    pub fn with_column(self, column: u8) -> Self {
        Square::new(self.row(), column)
    }
}
impl Display for Square {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.row() + 1)?;
        Ok(())
    }
}
impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let Some(column) = chars.next() else {
            return Err(ParseSquareError::NotEnoughCharacter(0));
        };
        let Some(row) = chars.next() else {
            return Err(ParseSquareError::NotEnoughCharacter(1));
        };
        if let Some(c) = chars.next() {
            return Err(ParseSquareError::Unexpected(c));
        }
        Square::from_chars(column, row)
    }
}
impl Sub<Self> for Square {
    type Output = Offset;

    fn sub(self, rhs: Self) -> Self::Output {
        Offset {
            row: signed(self.row()) - signed(rhs.row()),
            column: signed(self.column()) - signed(rhs.column()),
        }
    }
}

fn signed(value: u8) -> i8 {
    i8::try_from(value).unwrap_or(i8::MAX)
}

#[macro_export]
macro_rules! square {
    ($name:literal) => {
        const { $crate::square::Square::from_name($name) }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub row: i8,
    pub column: i8,
}
impl Offset {
    pub const KNIGHT_JUMPS: [Self; 8] = [
        Offset { row: -1, column: -2 },
        Offset { row: 1, column: -2 },
        Offset { row: -1, column: 2 },
        Offset { row: 1, column: 2 },
        Offset { row: -2, column: -1 },
        Offset { row: 2, column: -1 },
        Offset { row: -2, column: 1 },
        Offset { row: 2, column: 1 },
    ];

    pub fn is_knight_jump(self) -> bool {
        let row = self.row.unsigned_abs();
        let column = self.column.unsigned_abs();
        (row == 1 && column == 2) || (row == 2 && column == 1)
    }
    pub fn as_unit(self) -> Self {
        Offset {
            row: self.row.signum(),
            column: self.column.signum(),
        }
    }
}
impl Neg for Offset {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Offset {
            row: -self.row,
            column: -self.column,
        }
    }
}
impl Add<Self> for Offset {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Offset {
            row: self.row + rhs.row,
            column: self.column + rhs.column,
        }
    }
}

/// The 8 compass directions. North points towards rank 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}
impl Direction {
    pub const ALL: [Self; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];
    pub const STRAIGHT: [Self; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
    pub const DIAGONAL: [Self; 4] = [
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    pub fn offset(self) -> Offset {
        let (row, column) = match self {
            Direction::North => (1, 0),
            Direction::NorthEast => (1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (-1, 1),
            Direction::South => (-1, 0),
            Direction::SouthWest => (-1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (1, -1),
        };
        Offset { row, column }
    }
    pub fn from_unit(offset: Offset) -> Option<Self> {
        Direction::ALL
            .into_iter()
            .find(|direction| direction.offset() == offset)
    }
    /// Direction of `offset` if it lies on a rank, file, or diagonal.
    pub fn from_offset(offset: Offset) -> Option<Self> {
        let aligned = offset.row == 0
            || offset.column == 0
            || offset.row.unsigned_abs() == offset.column.unsigned_abs();
        if aligned && offset != (Offset { row: 0, column: 0 }) {
            Direction::from_unit(offset.as_unit())
        } else {
            None
        }
    }
    pub fn is_straight(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::East | Direction::South | Direction::West
        )
    }
    pub fn is_diagonal(self) -> bool {
        !self.is_straight()
    }
    pub fn reverse(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }
    /// The direction a pawn of `color` advances in.
    pub fn forward(color: Color) -> Self {
        match color {
            Color::White => Direction::North,
            Color::Black => Direction::South,
        }
    }
    /// Combines a straight direction with a perpendicular one, e.g. north
    /// and east make north-east.
    pub fn compose(self, side: Self) -> Option<Self> {
        if self.is_diagonal() || side.is_diagonal() {
            return None;
        }
        Direction::from_unit(self.offset() + side.offset())
            .filter(|direction| direction.is_diagonal())
    }
    /// The two diagonals a pawn of `color` captures along.
    pub fn pawn_captures(color: Color) -> [Self; 2] {
        let forward = Direction::forward(color);
        [Direction::West, Direction::East].map(|side| {
            forward
                .compose(side)
                .unwrap_or_else(|| unreachable!("forward is straight and perpendicular to sides"))
        })
    }
}

#[cfg(test)]
mod test {
    use crate::{
        color::Color,
        square::{Direction, Offset, Square},
    };

    #[test]
    fn index_runs_from_a1_to_h8() {
        assert_eq!(square!("a1").index(), 0);
        assert_eq!(square!("h1").index(), 7);
        assert_eq!(square!("a2").index(), 8);
        assert_eq!(square!("h8").index(), 63);
        assert_eq!(square!("e4"), Square::new(3, 4));
    }
    #[test]
    fn parse_and_display() {
        assert_eq!("c7".parse::<Square>().unwrap(), square!("c7"));
        assert_eq!(square!("g3").to_string(), "g3");
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("a".parse::<Square>().is_err());
        assert!("a1x".parse::<Square>().is_err());
    }
    #[test]
    fn adjacent_line_is_empty() {
        assert_eq!(
            square!("e4")
                .line_to(square!("e5"), Direction::North)
                .next(),
            None
        );
    }
    #[test]
    fn line_between_diagonal_squares() {
        let line: Vec<_> = square!("a1")
            .line_to(square!("d4"), Direction::NorthEast)
            .collect();
        assert_eq!(line, [square!("b2"), square!("c3")]);
    }
    #[test]
    fn direction_to_requires_alignment() {
        assert_eq!(
            square!("e1").direction_to(square!("e8")),
            Some(Direction::North)
        );
        assert_eq!(
            square!("h8").direction_to(square!("a1")),
            Some(Direction::SouthWest)
        );
        assert_eq!(square!("e1").direction_to(square!("f3")), None);
        assert_eq!(square!("e1").direction_to(square!("e1")), None);
    }
    #[test]
    fn directions_classify_and_reverse() {
        for direction in Direction::ALL {
            assert_eq!(direction.reverse().reverse(), direction);
            assert_eq!(direction.reverse().offset(), -direction.offset());
            assert_ne!(direction.is_straight(), direction.is_diagonal());
        }
        assert_eq!(
            Direction::North.compose(Direction::East),
            Some(Direction::NorthEast)
        );
        assert_eq!(Direction::North.compose(Direction::South), None);
        assert_eq!(
            Direction::pawn_captures(Color::Black),
            [Direction::SouthWest, Direction::SouthEast]
        );
    }
    #[test]
    fn knight_jumps_stay_on_board() {
        let jumps = Offset::KNIGHT_JUMPS
            .into_iter()
            .filter_map(|offset| square!("a1").shift(offset))
            .count();
        assert_eq!(jumps, 2);
        assert!(Offset::KNIGHT_JUMPS.iter().all(|jump| jump.is_knight_jump()));
    }
}
