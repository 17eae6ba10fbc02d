//! The three coordinated phases every component goes through.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// One coordinated step all components complete before the next one begins.
///
/// Each component declares a separate dependency list per phase.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Initialize,
    Advance,
    Shutdown,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Initialize, Phase::Advance, Phase::Shutdown];

    /// Short lowercase label, also the manifest spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Initialize => "init",
            Phase::Advance    => "advance",
            Phase::Shutdown   => "shutdown",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "init" | "initialize" => Ok(Phase::Initialize),
            "advance" | "timestep" => Ok(Phase::Advance),
            "shutdown" => Ok(Phase::Shutdown),
            other => Err(CoreError::Parse(format!(
                "invalid phase {other:?}: expected \"init\", \"advance\", or \"shutdown\""
            ))),
        }
    }
}
