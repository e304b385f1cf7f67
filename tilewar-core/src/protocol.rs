//! Plain-text wire protocol
//!
//! A move is `name:x,y`. A board state is a list of such records joined by
//! `;` with no trailing separator.

use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use rustc_hash::FxHashSet;

use crate::board::Pos;
use crate::error::ProtocolError;

pub const RECORD_SEPARATOR: char = ';';
pub const NAME_SEPARATOR: char = ':';
pub const COORD_SEPARATOR: char = ',';

/// One `name:x,y` record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveCommand {
    pub token: String,
    pub to: Pos,
}

impl MoveCommand {
    pub fn new(token: impl Into<String>, to: Pos) -> Self {
        Self {
            token: token.into(),
            to,
        }
    }
}

impl FromStr for MoveCommand {
    type Err = ProtocolError;

    fn from_str(record: &str) -> Result<Self, Self::Err> {
        let (name, coords) = record
            .split_once(NAME_SEPARATOR)
            .ok_or_else(|| ProtocolError::MissingNameSeparator(record.to_string()))?;
        if coords.contains(NAME_SEPARATOR) {
            return Err(ProtocolError::ExtraNameSeparator(record.to_string()));
        }
        if name.is_empty() {
            return Err(ProtocolError::EmptyName(record.to_string()));
        }

        let (x, y) = coords
            .split_once(COORD_SEPARATOR)
            .ok_or_else(|| ProtocolError::CoordinateCount(record.to_string()))?;
        if y.contains(COORD_SEPARATOR) {
            return Err(ProtocolError::CoordinateCount(record.to_string()));
        }

        Ok(Self {
            token: name.to_string(),
            to: Pos::new(parse_coordinate(record, x)?, parse_coordinate(record, y)?),
        })
    }
}

impl fmt::Display for MoveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}{}", self.token, NAME_SEPARATOR, self.to.x, COORD_SEPARATOR, self.to.y)
    }
}

/// Numbers too large for a coordinate saturate; they are off the board
/// either way
fn parse_coordinate(record: &str, value: &str) -> Result<i8, ProtocolError> {
    match value.parse::<i8>() {
        Ok(v) => Ok(v),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(i8::MAX),
        Err(e) if *e.kind() == IntErrorKind::NegOverflow => Ok(i8::MIN),
        Err(_) => Err(ProtocolError::InvalidCoordinate {
            record: record.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parse a full board state; every position must be on the board and every
/// token listed once
pub fn parse_board_state(state: &str) -> Result<Vec<MoveCommand>, ProtocolError> {
    if state.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen = FxHashSet::default();
    let mut commands = Vec::new();
    for record in state.split(RECORD_SEPARATOR) {
        let command: MoveCommand = record.parse()?;
        if !command.to.is_valid() {
            return Err(ProtocolError::OutOfBounds(record.to_string()));
        }
        if !seen.insert(command.token.clone()) {
            return Err(ProtocolError::DuplicateRecord(command.token));
        }
        commands.push(command);
    }
    Ok(commands)
}

/// Serialize `(name, position)` pairs as a board state
pub fn format_board_state<'a>(records: impl IntoIterator<Item = (&'a str, Pos)>) -> String {
    records
        .into_iter()
        .map(|(name, pos)| MoveCommand::new(name, pos).to_string())
        .collect::<Vec<_>>()
        .join(&RECORD_SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        let cmd: MoveCommand = "Fire Token Variant:2,3".parse().unwrap();
        assert_eq!(cmd, MoveCommand::new("Fire Token Variant", Pos::new(2, 3)));
        assert_eq!(cmd.to_string(), "Fire Token Variant:2,3");
    }

    #[test]
    fn test_parse_move_errors() {
        assert_eq!(
            "fire".parse::<MoveCommand>(),
            Err(ProtocolError::MissingNameSeparator("fire".into()))
        );
        assert_eq!(
            "a:b:1,2".parse::<MoveCommand>(),
            Err(ProtocolError::ExtraNameSeparator("a:b:1,2".into()))
        );
        assert_eq!(
            ":1,2".parse::<MoveCommand>(),
            Err(ProtocolError::EmptyName(":1,2".into()))
        );
        assert_eq!(
            "a:1".parse::<MoveCommand>(),
            Err(ProtocolError::CoordinateCount("a:1".into()))
        );
        assert_eq!(
            "a:1,2,3".parse::<MoveCommand>(),
            Err(ProtocolError::CoordinateCount("a:1,2,3".into()))
        );
        assert!(matches!(
            "a:x,2".parse::<MoveCommand>(),
            Err(ProtocolError::InvalidCoordinate { value, .. }) if value == "x"
        ));
        assert!(matches!(
            "a:1.5,2".parse::<MoveCommand>(),
            Err(ProtocolError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_large_coordinates_are_off_board() {
        let cmd: MoveCommand = "hero:200,0".parse().unwrap();
        assert_eq!(cmd.token, "hero");
        assert!(!cmd.to.is_valid());

        let cmd: MoveCommand = "hero:0,-99999".parse().unwrap();
        assert!(!cmd.to.is_valid());

        assert_eq!(
            parse_board_state("hero:200,0"),
            Err(ProtocolError::OutOfBounds("hero:200,0".into()))
        );
    }

    #[test]
    fn test_board_state_roundtrip() {
        let state = "a:0,0;b:4,4;c c:2,1";
        let records = parse_board_state(state).unwrap();
        assert_eq!(records.len(), 3);
        let formatted = format_board_state(records.iter().map(|r| (r.token.as_str(), r.to)));
        assert_eq!(formatted, state);
    }

    #[test]
    fn test_board_state_edge_cases() {
        assert!(parse_board_state("").unwrap().is_empty());
        assert_eq!(
            parse_board_state("a:0,5"),
            Err(ProtocolError::OutOfBounds("a:0,5".into()))
        );
        assert_eq!(
            parse_board_state("a:2,2;b:1,1;a:0,0"),
            Err(ProtocolError::DuplicateRecord("a".into()))
        );
        // trailing separator leaves an empty record
        assert!(parse_board_state("a:0,0;").is_err());
        assert_eq!(format_board_state(Vec::<(&str, Pos)>::new()), "");
    }
}
