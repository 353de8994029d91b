// Operator console: one action per input line

use crate::protocol::{Command, UnknownCommand};
use std::fmt;

pub const HELP: &str = "\
commands:
  login <credential>      authenticate and open the state channel
  enable <id>             enable a turtle
  disable <id>            disable a turtle
  status                  print connection status and turtles
  help                    show this help
  quit                    tear down and exit
  <trc command>           e.g. start, stop, kick_off_cyan, penalty_magenta";

/// One parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Login(String),
    Command(Command),
    Enable(String),
    Disable(String),
    Status,
    Help,
    Quit,
}

/// Parse a console line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleInput>, ConsoleError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();

    let input = match verb {
        "login" => ConsoleInput::Login(argument.unwrap_or_default().to_string()),
        "enable" => ConsoleInput::Enable(require(argument, "turtle id")?),
        "disable" => ConsoleInput::Disable(require(argument, "turtle id")?),
        "status" => ConsoleInput::Status,
        "help" | "?" => ConsoleInput::Help,
        "quit" | "exit" => ConsoleInput::Quit,
        other => ConsoleInput::Command(other.parse()?),
    };

    if words.next().is_some() {
        return Err(ConsoleError::TrailingInput);
    }
    Ok(Some(input))
}

fn require(argument: Option<&str>, what: &'static str) -> Result<String, ConsoleError> {
    argument
        .map(str::to_string)
        .ok_or(ConsoleError::MissingArgument(what))
}

/// Console parse errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleError {
    Unknown(UnknownCommand),
    MissingArgument(&'static str),
    TrailingInput,
}

impl From<UnknownCommand> for ConsoleError {
    fn from(err: UnknownCommand) -> Self {
        ConsoleError::Unknown(err)
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Unknown(e) => write!(f, "{} (type 'help')", e),
            ConsoleError::MissingArgument(what) => write!(f, "Missing {}", what),
            ConsoleError::TrailingInput => write!(f, "Too many arguments"),
        }
    }
}

impl std::error::Error for ConsoleError {}
