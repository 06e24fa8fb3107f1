use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress of a user-facing action (a quotation form, a payment return page).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Done,
    Failed,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Validating => "validating",
            Phase::Submitting => "submitting",
            Phase::Done => "done",
            Phase::Failed => "failed",
        }
    }

    /// An action is underway; controls that would start another should be disabled.
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Validating | Phase::Submitting)
    }

    pub fn is_settled(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
