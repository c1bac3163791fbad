//! Command envelope sent to hardware daemons

use serde::Serialize;
use std::fmt;

/// Command understood by every kiosk daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Start,
    Stop,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Start => write!(f, "start"),
            Command::Stop => write!(f, "stop"),
        }
    }
}

#[derive(Serialize)]
struct CommandEnvelope {
    cmd: Command,
}

/// Encode `{"cmd": "start"}` / `{"cmd": "stop"}`
pub fn encode(cmd: Command) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&CommandEnvelope { cmd })
}
