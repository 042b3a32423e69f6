use serde::{Deserialize, Serialize};
use std::fmt;

use crate::condition::{Condition, ConditionReason, ConditionType, Conditions};

pub const STATUS_RESERVING: &str = "RESERVING";
pub const STATUS_RESERVED: &str = "RESERVED";
pub const STATUS_IN_USE: &str = "IN_USE";

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Readiness of an address as far as this provider is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Creating,
    Available,
}

/// Result of feeding an observed status into [`Lifecycle::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged(Lifecycle),
    Changed {
        from: Option<Lifecycle>,
        to: Lifecycle,
    },
}

impl Transition {
    pub fn target(self) -> Lifecycle {
        match self {
            Transition::Unchanged(l) => l,
            Transition::Changed { to, .. } => to,
        }
    }

    pub fn is_changed(self) -> bool {
        matches!(self, Transition::Changed { .. })
    }
}

impl Lifecycle {
    /// Map a Compute address status to a lifecycle state.
    ///
    /// Only a positive `RESERVED` or `IN_USE` counts as available; anything
    /// unrecognised, including an empty status, stays `Creating`. Tokens are
    /// matched without regard to case.
    pub fn interpret(status: &str) -> Lifecycle {
        match status.to_ascii_uppercase().as_str() {
            STATUS_RESERVED | STATUS_IN_USE => Lifecycle::Available,
            STATUS_RESERVING => Lifecycle::Creating,
            _ => Lifecycle::Creating,
        }
    }

    /// Next state given the current one (if any) and a freshly observed
    /// status. The target depends only on the observation; `current` decides
    /// whether that is a change worth recording.
    pub fn transition(current: Option<Lifecycle>, observed: &str) -> Transition {
        let to = Lifecycle::interpret(observed);
        match current {
            Some(from) if from == to => Transition::Unchanged(to),
            from => Transition::Changed { from, to },
        }
    }

    /// Lifecycle encoded by the current `Ready` condition, if it is one of ours.
    pub fn current(conditions: &Conditions) -> Option<Lifecycle> {
        conditions
            .current(ConditionType::Ready)
            .and_then(|c| match c.reason {
                ConditionReason::Creating => Some(Lifecycle::Creating),
                ConditionReason::Available => Some(Lifecycle::Available),
                _ => None,
            })
    }

    pub fn condition(self) -> Condition {
        match self {
            Lifecycle::Creating => Condition::creating(),
            Lifecycle::Available => Condition::available(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Lifecycle::Creating => "creating",
            Lifecycle::Available => "available",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition for an observed external status string.
pub fn interpret(status: &str) -> Condition {
    Lifecycle::interpret(status).condition()
}
