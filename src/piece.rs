use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    num::{NonZero, ParseIntError},
    str::{FromStr, ParseBoolError},
};

use crate::{
    color::{Color, ParseColorError},
    square::{Direction, ParseSquareError, Square},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    // `ColoredPieceKind` relies on `PieceKind` being non-zero
    Pawn = 1,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
impl PieceKind {
    pub const PROMOTION_CHOICES: [Self; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];
    pub const STARTING_CONFIGURATION: [Self; 8] = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];

    pub fn uppercase(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }
    pub fn lowercase(self) -> char {
        self.uppercase().to_ascii_lowercase()
    }
    /// Name used by position descriptions, e.g. `Knight`.
    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "Pawn",
            PieceKind::Knight => "Knight",
            PieceKind::Bishop => "Bishop",
            PieceKind::Rook => "Rook",
            PieceKind::Queen => "Queen",
            PieceKind::King => "King",
        }
    }
    pub fn from_letter(c: char) -> Result<Self, ParsePieceKindError> {
        let piece = match c {
            'p' | 'P' => PieceKind::Pawn,
            'n' | 'N' => PieceKind::Knight,
            'b' | 'B' => PieceKind::Bishop,
            'r' | 'R' => PieceKind::Rook,
            'q' | 'Q' => PieceKind::Queen,
            'k' | 'K' => PieceKind::King,
            c => return Err(ParsePieceKindError(c.to_string().into())),
        };
        Ok(piece)
    }
    pub fn is_promotion_choice(self) -> bool {
        PieceKind::PROMOTION_CHOICES.contains(&self)
    }
    /// Whether a piece of this kind attacks any distance along `direction`.
    pub fn slides_along(self, direction: Direction) -> bool {
        match self {
            PieceKind::Queen => true,
            PieceKind::Rook => direction.is_straight(),
            PieceKind::Bishop => direction.is_diagonal(),
            PieceKind::Pawn | PieceKind::Knight | PieceKind::King => false,
        }
    }
}
impl Display for PieceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PieceKind::Pawn => write!(f, "pawn")?,
            PieceKind::Knight => write!(f, "knight")?,
            PieceKind::Bishop => write!(f, "bishop")?,
            PieceKind::Rook => write!(f, "rook")?,
            PieceKind::Queen => write!(f, "queen")?,
            PieceKind::King => write!(f, "king")?,
        }
        Ok(())
    }
}
impl FromStr for PieceKind {
    type Err = ParsePieceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let piece = match s {
            "Pawn" | "pawn" => PieceKind::Pawn,
            "Knight" | "knight" => PieceKind::Knight,
            "Bishop" | "bishop" => PieceKind::Bishop,
            "Rook" | "rook" => PieceKind::Rook,
            "Queen" | "queen" => PieceKind::Queen,
            "King" | "king" => PieceKind::King,
            s => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => PieceKind::from_letter(c)?,
                    _ => return Err(ParsePieceKindError(s.into())),
                }
            }
        };
        Ok(piece)
    }
}
impl From<PieceKind> for u8 {
    fn from(value: PieceKind) -> Self {
        value as u8
    }
}
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsePieceKindError(pub Box<str>);

impl Display for ParsePieceKindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "found `{}`, expected a piece name or one of `p`, `n`, `b`, `r`, `q`, `k`, or uppercase forms of these letters",
            self.0
        )?;
        Ok(())
    }
}
impl Error for ParsePieceKindError {}

// Bit structure: 0000CPPP
// C - Color
// P - Piece kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColoredPieceKind(NonZero<u8>);
impl ColoredPieceKind {
    pub fn new(color: Color, piece: PieceKind) -> Self {
        let color: u8 = color.into();
        let piece: u8 = piece.into();
        let data = (color << 3) | piece;
        ColoredPieceKind(NonZero::new(data).unwrap_or(NonZero::<u8>::MIN))
    }
    /// The 4-bit code of this piece; never 0.
    pub fn nibble(self) -> u8 {
        self.0.get()
    }
}

/// Kind-specific state that travels with a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Pawn { en_passant: bool },
    Knight,
    Bishop,
    Rook { steps: u32 },
    Queen,
    King { steps: u32, castled: bool },
}
impl Role {
    pub fn new(kind: PieceKind) -> Self {
        match kind {
            PieceKind::Pawn => Role::Pawn { en_passant: false },
            PieceKind::Knight => Role::Knight,
            PieceKind::Bishop => Role::Bishop,
            PieceKind::Rook => Role::Rook { steps: 0 },
            PieceKind::Queen => Role::Queen,
            PieceKind::King => Role::King {
                steps: 0,
                castled: false,
            },
        }
    }
    pub fn kind(self) -> PieceKind {
        match self {
            Role::Pawn { .. } => PieceKind::Pawn,
            Role::Knight => PieceKind::Knight,
            Role::Bishop => PieceKind::Bishop,
            Role::Rook { .. } => PieceKind::Rook,
            Role::Queen => PieceKind::Queen,
            Role::King { .. } => PieceKind::King,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub square: Square,
    pub role: Role,
}
impl Piece {
    /// A piece that has never moved.
    pub fn new(color: Color, kind: PieceKind, square: Square) -> Self {
        Piece {
            color,
            square,
            role: Role::new(kind),
        }
    }
    pub fn kind(self) -> PieceKind {
        self.role.kind()
    }
    pub fn colored(self) -> ColoredPieceKind {
        ColoredPieceKind::new(self.color, self.kind())
    }
    pub fn is(self, color: Color, kind: PieceKind) -> bool {
        self.color == color && self.kind() == kind
    }
    /// Steps taken by a rook or king; other pieces report `None`.
    pub fn steps(self) -> Option<u32> {
        match self.role {
            Role::Rook { steps } | Role::King { steps, .. } => Some(steps),
            _ => None,
        }
    }
    pub fn can_be_captured_en_passant(self) -> bool {
        matches!(self.role, Role::Pawn { en_passant: true })
    }
    pub fn set_en_passant(&mut self, value: bool) {
        if let Role::Pawn { en_passant } = &mut self.role {
            *en_passant = value;
        }
    }
    /// Relocates the piece, counting the step for rooks and kings.
    pub fn step_to(&mut self, destination: Square) {
        self.square = destination;
        match &mut self.role {
            Role::Rook { steps } | Role::King { steps, .. } => *steps = steps.saturating_add(1),
            _ => (),
        }
    }
    /// FEN letter: uppercase for white, lowercase for black.
    pub fn fen(self) -> char {
        match self.color {
            Color::White => self.kind().uppercase(),
            Color::Black => self.kind().lowercase(),
        }
    }
}
impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.kind().name(), self.color, self.square)?;
        match self.role {
            Role::Pawn { en_passant } => write!(f, "-{en_passant}")?,
            Role::Rook { steps } => write!(f, "-{steps}")?,
            Role::King { steps, castled } => {
                write!(f, "-{steps}")?;
                if castled {
                    write!(f, "-true")?;
                }
            }
            Role::Knight | Role::Bishop | Role::Queen => (),
        }
        Ok(())
    }
}
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsePieceError {
    MissingField(&'static str),
    Kind(ParsePieceKindError),
    Color(ParseColorError),
    Square(ParseSquareError),
    Steps(ParseIntError),
    Flag(ParseBoolError),
    Unexpected(Box<str>),
}
impl From<ParsePieceKindError> for ParsePieceError {
    fn from(value: ParsePieceKindError) -> Self {
        ParsePieceError::Kind(value)
    }
}
impl From<ParseColorError> for ParsePieceError {
    fn from(value: ParseColorError) -> Self {
        ParsePieceError::Color(value)
    }
}
impl From<ParseSquareError> for ParsePieceError {
    fn from(value: ParseSquareError) -> Self {
        ParsePieceError::Square(value)
    }
}
impl From<ParseIntError> for ParsePieceError {
    fn from(value: ParseIntError) -> Self {
        ParsePieceError::Steps(value)
    }
}
impl From<ParseBoolError> for ParsePieceError {
    fn from(value: ParseBoolError) -> Self {
        ParsePieceError::Flag(value)
    }
}
impl Display for ParsePieceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParsePieceError::MissingField(field) => write!(f, "missing {field}")?,
            ParsePieceError::Kind(err) => write!(f, "{err}")?,
            ParsePieceError::Color(err) => write!(f, "{err}")?,
            ParsePieceError::Square(err) => write!(f, "{err}")?,
            ParsePieceError::Steps(err) => write!(f, "invalid step count: {err}")?,
            ParsePieceError::Flag(err) => write!(f, "invalid flag: {err}")?,
            ParsePieceError::Unexpected(field) => write!(f, "unexpected `{field}`")?,
        }
        Ok(())
    }
}
impl Error for ParsePieceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParsePieceError::Kind(err) => Some(err),
            ParsePieceError::Color(err) => Some(err),
            ParsePieceError::Square(err) => Some(err),
            ParsePieceError::Steps(err) => Some(err),
            ParsePieceError::Flag(err) => Some(err),
            ParsePieceError::MissingField(_) | ParsePieceError::Unexpected(_) => None,
        }
    }
}
impl FromStr for Piece {
    type Err = ParsePieceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split('-');
        let kind: PieceKind = fields
            .next()
            .filter(|field| !field.is_empty())
            .ok_or(ParsePieceError::MissingField("piece kind"))?
            .parse()?;
        let color = fields
            .next()
            .ok_or(ParsePieceError::MissingField("color"))?
            .parse()?;
        let square = fields
            .next()
            .ok_or(ParsePieceError::MissingField("square"))?
            .parse()?;
        let role = match kind {
            PieceKind::Pawn => Role::Pawn {
                en_passant: fields.next().map(str::parse).transpose()?.unwrap_or(false),
            },
            PieceKind::Rook => Role::Rook {
                steps: fields.next().map(str::parse).transpose()?.unwrap_or(0),
            },
            PieceKind::King => Role::King {
                steps: fields.next().map(str::parse).transpose()?.unwrap_or(0),
                castled: fields.next().map(str::parse).transpose()?.unwrap_or(false),
            },
            PieceKind::Knight => Role::Knight,
            PieceKind::Bishop => Role::Bishop,
            PieceKind::Queen => Role::Queen,
        };
        if let Some(field) = fields.next() {
            return Err(ParsePieceError::Unexpected(field.into()));
        }
        Ok(Piece {
            color,
            square,
            role,
        })
    }
}

#[cfg(test)]
mod test {
    use crate::{
        color::Color,
        piece::{ParsePieceError, Piece, PieceKind, Role},
        square,
    };

    #[test]
    fn description_tokens() {
        let king = Piece {
            color: Color::White,
            square: square!("g1"),
            role: Role::King {
                steps: 1,
                castled: true,
            },
        };
        assert_eq!(king.to_string(), "King-white-g1-1-true");
        assert_eq!("King-white-g1-1-true".parse(), Ok(king));
        let king = Piece::new(Color::Black, PieceKind::King, square!("e8"));
        assert_eq!(king.to_string(), "King-black-e8-0");
        let queen = Piece::new(Color::Black, PieceKind::Queen, square!("h2"));
        assert_eq!(queen.to_string(), "Queen-black-h2");
        assert_eq!("Pawn-black-f3-false".parse::<Piece>().unwrap().square, square!("f3"));
    }
    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(
            "Wizard-white-a1".parse::<Piece>(),
            Err(ParsePieceError::Kind(_))
        ));
        assert!(matches!(
            "Rook-white".parse::<Piece>(),
            Err(ParsePieceError::MissingField("square"))
        ));
        assert!(matches!(
            "Rook-white-a1-x".parse::<Piece>(),
            Err(ParsePieceError::Steps(_))
        ));
        assert!(matches!(
            "Queen-white-a1-0".parse::<Piece>(),
            Err(ParsePieceError::Unexpected(_))
        ));
    }
    #[test]
    fn steps_count_for_rooks_and_kings_only() {
        let mut rook = Piece::new(Color::White, PieceKind::Rook, square!("a1"));
        rook.step_to(square!("a4"));
        assert_eq!(rook.steps(), Some(1));
        let mut knight = Piece::new(Color::White, PieceKind::Knight, square!("b1"));
        knight.step_to(square!("c3"));
        assert_eq!(knight.steps(), None);
        assert_eq!(knight.square, square!("c3"));
    }
}
