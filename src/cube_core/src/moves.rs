//! Turn tokens and their parsing.
//!
//! A turn is a face letter optionally suffixed by `'` (counter-clockwise
//! quarter turn) or `2` (half turn). The 18-token alphabet is fixed;
//! anything else is rejected at the parse boundary.

use std::fmt::Display;
use std::str::FromStr;

use strum_macros::EnumString;
use thiserror::Error;

/// A turnable face, named by its token letter. R/L turn around the
/// right-left axis, U/D around the up-down axis, F/B around the
/// front-back axis; the phase turn sets restrict which of these (and
/// in which directions) a search may use.
#[derive(PartialEq, Eq, EnumString, Debug, Clone, Copy, Hash)]
pub enum Face {
    R,
    L,
    U,
    D,
    F,
    B,
}

impl Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// How far the face is turned: an unsuffixed token is one clockwise
/// quarter turn, `Prime` (suffix `'`) is the inverse quarter turn, and
/// `Double` (suffix `2`) is the half turn that counts as a single move
/// in the half-turn metric.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Direction {
    Normal,
    Prime,
    Double,
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Normal => write!(f, ""),
            Direction::Prime => write!(f, "'"),
            Direction::Double => write!(f, "2"),
        }
    }
}

impl Direction {
    /// Number of clockwise quarter turns this direction stands for,
    /// counted modulo 4.
    #[must_use]
    pub fn quarter_turns(self) -> u8 {
        match self {
            Direction::Normal => 1,
            Direction::Double => 2,
            Direction::Prime => 3,
        }
    }

    /// The direction with `quarter_turns` clockwise quarter turns, or
    /// `None` for zero turns.
    #[must_use]
    pub fn from_quarter_turns(quarter_turns: u8) -> Option<Direction> {
        match quarter_turns % 4 {
            1 => Some(Direction::Normal),
            2 => Some(Direction::Double),
            3 => Some(Direction::Prime),
            _ => None,
        }
    }
}

/// An instantiation of a certain face equipped with a direction.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub struct Turn {
    pub face: Face,
    pub direction: Direction,
}

/// Builds a [`Turn`] from a face and direction pair without spelling
/// out the enum paths, keeping literal turn-set tables readable.
///
/// ```
/// use cube_core::turn;
///
/// let half_turns = [turn!(U, Double), turn!(D, Double)];
/// assert_eq!(half_turns[0].to_string(), "U2");
/// assert_eq!(turn!(B, Prime).to_string(), "B'");
/// ```
#[macro_export]
macro_rules! turn {
    ($face:ident, $direction:ident) => {{
        $crate::moves::Turn {
            face: $crate::moves::Face::$face,
            direction: $crate::moves::Direction::$direction,
        }
    }};
}

impl Turn {
    #[must_use]
    pub fn new(face: Face, direction: Direction) -> Self {
        Self { face, direction }
    }

    /// The turn undoing this one.
    #[must_use]
    pub fn inverse(self) -> Self {
        Self {
            face: self.face,
            direction: match self.direction {
                Direction::Normal => Direction::Prime,
                Direction::Prime => Direction::Normal,
                Direction::Double => Direction::Double,
            },
        }
    }
}

impl Display for Turn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.face, self.direction)
    }
}

/// All 18 allowed turns, in the fixed order the phase searches scan them.
pub const ALL_TURNS: [Turn; 18] = [
    turn!(R, Normal),
    turn!(R, Prime),
    turn!(R, Double),
    turn!(L, Normal),
    turn!(L, Prime),
    turn!(L, Double),
    turn!(U, Normal),
    turn!(U, Prime),
    turn!(U, Double),
    turn!(D, Normal),
    turn!(D, Prime),
    turn!(D, Double),
    turn!(F, Normal),
    turn!(F, Prime),
    turn!(F, Double),
    turn!(B, Normal),
    turn!(B, Prime),
    turn!(B, Double),
];

/// The error produced when a token outside the 18-token alphabet is
/// parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurnParseError {
    #[error("empty turn token")]
    Empty,
    #[error("unknown face in turn token `{0}`")]
    UnknownFace(String),
    #[error("unknown suffix in turn token `{0}`")]
    UnknownSuffix(String),
}

impl FromStr for Turn {
    type Err = TurnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let Some(face_char) = chars.next() else {
            return Err(TurnParseError::Empty);
        };
        let face = Face::from_str(face_char.encode_utf8(&mut [0; 4]))
            .map_err(|_| TurnParseError::UnknownFace(s.to_owned()))?;
        let direction = match (chars.next(), chars.next()) {
            (None, _) => Direction::Normal,
            (Some('\''), None) => Direction::Prime,
            (Some('2'), None) => Direction::Double,
            _ => return Err(TurnParseError::UnknownSuffix(s.to_owned())),
        };
        Ok(Turn { face, direction })
    }
}

/// Parse a whitespace-separated sequence of turn tokens.
///
/// # Errors
///
/// If any token is outside the 18-token alphabet.
pub fn parse_turns(s: &str) -> Result<Vec<Turn>, TurnParseError> {
    s.split_whitespace().map(Turn::from_str).collect()
}

/// Render a turn sequence as whitespace-separated tokens.
#[must_use]
pub fn format_turns(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The sequence undoing `turns`: each turn inverted, in reverse order.
#[must_use]
pub fn invert_turns(turns: &[Turn]) -> Vec<Turn> {
    turns.iter().rev().map(|turn| turn.inverse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_display_round_trip() {
        for turn in ALL_TURNS {
            let rendered = turn.to_string();
            assert_eq!(rendered.parse::<Turn>().unwrap(), turn);
        }
    }

    #[test]
    fn rejects_tokens_outside_the_alphabet() {
        for token in ["M", "E", "S", "x", "r", "R3", "R''", "R2'", "", "Rw", "2R"] {
            assert!(token.parse::<Turn>().is_err(), "accepted `{token}`");
        }
    }

    #[test]
    fn rejects_slice_turn_sequences() {
        assert_eq!(
            parse_turns("M U M U M U M U"),
            Err(TurnParseError::UnknownFace("M".to_owned()))
        );
    }

    #[test]
    fn parses_whitespace_separated_sequences() {
        let turns = parse_turns("R U2  R'\nU'").unwrap();
        assert_eq!(
            turns,
            vec![
                turn!(R, Normal),
                turn!(U, Double),
                turn!(R, Prime),
                turn!(U, Prime),
            ]
        );
        assert_eq!(format_turns(&turns), "R U2 R' U'");
    }

    #[test]
    fn inverse_is_an_involution() {
        for turn in ALL_TURNS {
            assert_eq!(turn.inverse().inverse(), turn);
        }
        assert_eq!(turn!(F, Normal).inverse(), turn!(F, Prime));
        assert_eq!(turn!(F, Double).inverse(), turn!(F, Double));
    }

    #[test]
    fn quarter_turn_counts_round_trip() {
        for direction in [Direction::Normal, Direction::Prime, Direction::Double] {
            assert_eq!(
                Direction::from_quarter_turns(direction.quarter_turns()),
                Some(direction)
            );
        }
        assert_eq!(Direction::from_quarter_turns(0), None);
        assert_eq!(Direction::from_quarter_turns(4), None);
    }
}
