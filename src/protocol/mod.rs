// Wire types shared by the state channel and the dispatch endpoints

use crate::auth::Session;
use crate::state::{Snapshot, TurtlePatch, ENABLED};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// TRC command, serialized as its snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    DroppedBall,
    Start,
    Stop,
    GoIn,
    GoOut,
    KickOffMagenta,
    KickOffCyan,
    FreeKickMagenta,
    FreeKickCyan,
    GoalKickMagenta,
    GoalKickCyan,
    ThrowInMagenta,
    ThrowInCyan,
    CornerMagenta,
    CornerCyan,
    PenaltyMagenta,
    PenaltyCyan,
    RoleAssignerOn,
    RoleAssignerOff,
    PassDemo,
    PenaltyDemo,
    BallHandlingDemo,
}

impl Command {
    pub const ALL: [Command; 22] = [
        Command::DroppedBall,
        Command::Start,
        Command::Stop,
        Command::GoIn,
        Command::GoOut,
        Command::KickOffMagenta,
        Command::KickOffCyan,
        Command::FreeKickMagenta,
        Command::FreeKickCyan,
        Command::GoalKickMagenta,
        Command::GoalKickCyan,
        Command::ThrowInMagenta,
        Command::ThrowInCyan,
        Command::CornerMagenta,
        Command::CornerCyan,
        Command::PenaltyMagenta,
        Command::PenaltyCyan,
        Command::RoleAssignerOn,
        Command::RoleAssignerOff,
        Command::PassDemo,
        Command::PenaltyDemo,
        Command::BallHandlingDemo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::DroppedBall => "dropped_ball",
            Command::Start => "start",
            Command::Stop => "stop",
            Command::GoIn => "go_in",
            Command::GoOut => "go_out",
            Command::KickOffMagenta => "kick_off_magenta",
            Command::KickOffCyan => "kick_off_cyan",
            Command::FreeKickMagenta => "free_kick_magenta",
            Command::FreeKickCyan => "free_kick_cyan",
            Command::GoalKickMagenta => "goal_kick_magenta",
            Command::GoalKickCyan => "goal_kick_cyan",
            Command::ThrowInMagenta => "throw_in_magenta",
            Command::ThrowInCyan => "throw_in_cyan",
            Command::CornerMagenta => "corner_magenta",
            Command::CornerCyan => "corner_cyan",
            Command::PenaltyMagenta => "penalty_magenta",
            Command::PenaltyCyan => "penalty_cyan",
            Command::RoleAssignerOn => "role_assigner_on",
            Command::RoleAssignerOff => "role_assigner_off",
            Command::PassDemo => "pass_demo",
            Command::PenaltyDemo => "penalty_demo",
            Command::BallHandlingDemo => "ball_handling_demo",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

/// A name that is not a known TRC command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown command '{}'", self.0)
    }
}

impl std::error::Error for UnknownCommand {}

/// Server → client frame on the state channel
///
/// Both keys are optional; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    #[serde(
        default,
        deserialize_with = "deserialize_snapshot",
        skip_serializing_if = "Option::is_none"
    )]
    pub turtles: Option<Snapshot>,

    /// Currently active high-level command, kept raw so unknown values still decode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

// The server encodes turtles without any state as `null`; they still count as mentioned.
fn deserialize_snapshot<'de, D>(deserializer: D) -> Result<Option<Snapshot>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<TurtlePatch>>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|turtles| {
        turtles
            .into_iter()
            .map(|(id, patch)| (id, patch.unwrap_or_default()))
            .collect()
    }))
}

/// Decode a state channel text frame
pub fn decode_state(text: &str) -> Result<StateMessage, serde_json::Error> {
    serde_json::from_str(text)
}

/// First frame sent after the state channel opens: the session token as a JSON string
pub fn session_frame(session: &Session) -> String {
    Value::String(session.token().to_string()).to_string()
}

/// Turtle update that toggles a single turtle's enabled flag
pub fn enable_patch(id: &str, enabled: bool) -> Snapshot {
    let mut patch = TurtlePatch::new();
    patch.insert(ENABLED.to_string(), Value::Bool(enabled));

    let mut snapshot = Snapshot::new();
    snapshot.insert(id.to_string(), patch);
    snapshot
}
