//! The symbolic launcher instruction set.
//!
//! A [`Command`] is one unit of control. Free-form `(name, value)` input from
//! the command line or a targets file is turned into a `Command` by
//! [`Command::parse`]; nothing downstream ever deals in command names.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Most missiles a launcher holds.
pub const MAX_SHOTS: u32 = 4;

/// How long `Park` drives down to reach the bottom stop.
pub const PARK_DOWN_MS: u64 = 2000;

/// How long `Park` drives left to reach the left stop.
pub const PARK_LEFT_MS: u64 = 8000;

/// Direction of a turret movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// One symbolic launcher instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    /// Drive in `direction` for `duration_ms`, then stop.
    Move { direction: Direction, duration_ms: u64 },
    /// Fire `count` missiles. See [`Command::fire`] for the clamping rule.
    Fire { count: u32 },
    /// Switch the LED on or off.
    Led { on: bool },
    /// Drive to the bottom-left reference position.
    Park,
    /// Do nothing for `duration_ms`.
    Pause { duration_ms: u64 },
}

/// Errors produced while parsing a symbolic command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    /// The command name is not part of the instruction set.
    #[error("unknown command: '{0}'")]
    UnknownCommand(String),

    /// The value does not make sense for the command.
    #[error("invalid value {value} for command '{command}'")]
    InvalidValue { command: String, value: i64 },
}

impl Command {
    /// Builds a move instruction.
    pub fn movement(direction: Direction, duration_ms: u64) -> Self {
        Command::Move {
            direction,
            duration_ms,
        }
    }

    /// Builds a fire instruction.
    ///
    /// Counts outside `1..=4` are replaced with a single shot, not rejected.
    pub fn fire(count: i64) -> Self {
        let count = u32::try_from(count).unwrap_or(0);
        Command::Fire {
            count: effective_shots(count),
        }
    }

    /// Parses a `(name, value)` pair.
    ///
    /// Names are case-insensitive and accept the historical aliases
    /// (`zero`/`park`/`reset`, `pause`/`sleep`, `fire`/`shoot`).
    pub fn parse(name: &str, value: i64) -> Result<Self, CommandParseError> {
        let name = name.trim().to_lowercase();
        let duration = |command: &str| {
            u64::try_from(value).map_err(|_| CommandParseError::InvalidValue {
                command: command.to_string(),
                value,
            })
        };

        let command = match name.as_str() {
            "up" => Command::movement(Direction::Up, duration("up")?),
            "down" => Command::movement(Direction::Down, duration("down")?),
            "left" => Command::movement(Direction::Left, duration("left")?),
            "right" => Command::movement(Direction::Right, duration("right")?),
            "zero" | "park" | "reset" => Command::Park,
            "pause" | "sleep" => Command::Pause {
                duration_ms: duration("pause")?,
            },
            "led" => Command::Led { on: value != 0 },
            "fire" | "shoot" => Command::fire(value),
            _ => return Err(CommandParseError::UnknownCommand(name)),
        };

        Ok(command)
    }

    /// Expands macros into primitive instructions.
    ///
    /// `Park` becomes a long move down followed by a long move left, which
    /// runs the turret into both physical stops whatever its current
    /// position. Every other command expands to itself.
    pub fn expand(&self) -> Vec<Command> {
        match self {
            Command::Park => vec![
                Command::movement(Direction::Down, PARK_DOWN_MS),
                Command::movement(Direction::Left, PARK_LEFT_MS),
            ],
            other => vec![*other],
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move {
                direction,
                duration_ms,
            } => write!(f, "{} {}ms", direction, duration_ms),
            Command::Fire { count } => write!(f, "fire x{}", effective_shots(*count)),
            Command::Led { on } => write!(f, "led {}", if *on { "on" } else { "off" }),
            Command::Park => f.write_str("park"),
            Command::Pause { duration_ms } => write!(f, "pause {}ms", duration_ms),
        }
    }
}

/// Number of shots actually fired for a requested count.
pub fn effective_shots(count: u32) -> u32 {
    if (1..=MAX_SHOTS).contains(&count) {
        count
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directions() {
        assert_eq!(
            Command::parse("up", 200).unwrap(),
            Command::movement(Direction::Up, 200)
        );
        assert_eq!(
            Command::parse("RIGHT", 4400).unwrap(),
            Command::movement(Direction::Right, 4400)
        );
        assert_eq!(
            Command::parse(" Left ", 10).unwrap(),
            Command::movement(Direction::Left, 10)
        );
    }

    #[test]
    fn test_parse_aliases() {
        for name in ["zero", "park", "reset", "ZERO"] {
            assert_eq!(Command::parse(name, 0).unwrap(), Command::Park);
        }
        assert_eq!(
            Command::parse("sleep", 5000).unwrap(),
            Command::Pause { duration_ms: 5000 }
        );
        assert_eq!(
            Command::parse("shoot", 2).unwrap(),
            Command::Fire { count: 2 }
        );
    }

    #[test]
    fn test_parse_led() {
        assert_eq!(Command::parse("led", 0).unwrap(), Command::Led { on: false });
        assert_eq!(Command::parse("led", 1).unwrap(), Command::Led { on: true });
        assert_eq!(Command::parse("led", 7).unwrap(), Command::Led { on: true });
    }

    #[test]
    fn test_parse_unknown() {
        let err = Command::parse("dance", 1).unwrap_err();
        assert_eq!(err, CommandParseError::UnknownCommand("dance".to_string()));
        assert_eq!(err.to_string(), "unknown command: 'dance'");
    }

    #[test]
    fn test_parse_negative_duration() {
        let err = Command::parse("up", -5).unwrap_err();
        assert!(matches!(err, CommandParseError::InvalidValue { value: -5, .. }));
        assert!(Command::parse("pause", -1).is_err());
    }

    #[test]
    fn test_fire_clamps_out_of_range_to_one() {
        for n in [-3, 0, 5, 100] {
            assert_eq!(Command::fire(n), Command::Fire { count: 1 }, "count {}", n);
        }
        for n in 1..=4 {
            assert_eq!(Command::fire(n), Command::Fire { count: n as u32 });
        }
    }

    #[test]
    fn test_effective_shots() {
        assert_eq!(effective_shots(0), 1);
        assert_eq!(effective_shots(3), 3);
        assert_eq!(effective_shots(9), 1);
    }

    #[test]
    fn test_park_expansion() {
        assert_eq!(
            Command::Park.expand(),
            vec![
                Command::movement(Direction::Down, 2000),
                Command::movement(Direction::Left, 8000),
            ]
        );
    }

    #[test]
    fn test_primitives_expand_to_themselves() {
        let fire = Command::Fire { count: 2 };
        assert_eq!(fire.expand(), vec![fire]);
        let pause = Command::Pause { duration_ms: 10 };
        assert_eq!(pause.expand(), vec![pause]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::movement(Direction::Up, 200).to_string(), "up 200ms");
        assert_eq!(Command::Fire { count: 9 }.to_string(), "fire x1");
        assert_eq!(Command::Led { on: true }.to_string(), "led on");
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&Command::movement(Direction::Down, 5)).unwrap();
        assert_eq!(json, r#"{"kind":"move","direction":"down","duration_ms":5}"#);
    }
}
