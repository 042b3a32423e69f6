use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ConditionType / ConditionStatus / ConditionReason
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    /// Whether the external object is usable.
    Ready,
    /// Whether the last reconcile pass succeeded.
    Synced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionReason {
    Creating,
    Available,
    Deleting,
    ReconcileSuccess,
    ReconcileError,
}

impl ConditionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionType::Ready => "Ready",
            ConditionType::Synced => "Synced",
        }
    }
}

impl ConditionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        }
    }
}

impl ConditionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionReason::Creating => "Creating",
            ConditionReason::Available => "Available",
            ConditionReason::Deleting => "Deleting",
            ConditionReason::ReconcileSuccess => "ReconcileSuccess",
            ConditionReason::ReconcileError => "ReconcileError",
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ConditionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: ConditionType,
    pub status: ConditionStatus,
    pub reason: ConditionReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    fn new(kind: ConditionType, status: ConditionStatus, reason: ConditionReason) -> Self {
        Self {
            kind,
            status,
            reason,
            message: None,
            last_transition_time: Utc::now(),
        }
    }

    /// The external object exists but is not usable yet.
    pub fn creating() -> Self {
        Self::new(
            ConditionType::Ready,
            ConditionStatus::False,
            ConditionReason::Creating,
        )
    }

    /// The external object is usable.
    pub fn available() -> Self {
        Self::new(
            ConditionType::Ready,
            ConditionStatus::True,
            ConditionReason::Available,
        )
    }

    pub fn deleting() -> Self {
        Self::new(
            ConditionType::Ready,
            ConditionStatus::False,
            ConditionReason::Deleting,
        )
    }

    pub fn reconcile_success() -> Self {
        Self::new(
            ConditionType::Synced,
            ConditionStatus::True,
            ConditionReason::ReconcileSuccess,
        )
    }

    pub fn reconcile_error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(
                ConditionType::Synced,
                ConditionStatus::False,
                ConditionReason::ReconcileError,
            )
        }
    }

    /// Equality on everything but `last_transition_time`.
    pub fn equal_ignoring_time(&self, other: &Condition) -> bool {
        self.kind == other.kind
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
    }
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// Ordered, append-only transition log. The latest entry of each
/// [`ConditionType`] is that type's current condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions(Vec<Condition>);

impl Conditions {
    /// Append `condition` unless it matches the current condition of its
    /// type. Returns whether anything was appended.
    pub fn set(&mut self, condition: Condition) -> bool {
        if self
            .current(condition.kind)
            .is_some_and(|c| c.equal_ignoring_time(&condition))
        {
            return false;
        }
        self.0.push(condition);
        true
    }

    pub fn current(&self, kind: ConditionType) -> Option<&Condition> {
        self.0.iter().rev().find(|c| c.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_appends_new_condition() {
        let mut conds = Conditions::default();
        assert!(conds.set(Condition::creating()));
        assert_eq!(conds.len(), 1);
        assert_eq!(
            conds.current(ConditionType::Ready).unwrap().reason,
            ConditionReason::Creating
        );
    }

    #[test]
    fn set_same_condition_is_noop() {
        let mut conds = Conditions::default();
        conds.set(Condition::creating());
        assert!(!conds.set(Condition::creating()));
        assert_eq!(conds.len(), 1);
    }

    #[test]
    fn transition_keeps_history() {
        let mut conds = Conditions::default();
        conds.set(Condition::creating());
        conds.set(Condition::available());
        assert_eq!(conds.len(), 2);
        let current = conds.current(ConditionType::Ready).unwrap();
        assert_eq!(current.reason, ConditionReason::Available);
        assert_eq!(current.status, ConditionStatus::True);
    }

    #[test]
    fn types_are_tracked_independently() {
        let mut conds = Conditions::default();
        conds.set(Condition::available());
        conds.set(Condition::reconcile_success());
        assert!(!conds.set(Condition::available()));
        assert_eq!(
            conds.current(ConditionType::Synced).unwrap().reason,
            ConditionReason::ReconcileSuccess
        );
    }

    #[test]
    fn different_message_is_a_change() {
        let mut conds = Conditions::default();
        conds.set(Condition::reconcile_error("boom"));
        assert!(!conds.set(Condition::reconcile_error("boom")));
        assert!(conds.set(Condition::reconcile_error("bang")));
    }

    #[test]
    fn serializes_kubernetes_style() {
        let yaml = serde_yaml::to_string(&Condition::available()).unwrap();
        assert!(yaml.contains("type: Ready"));
        assert!(yaml.contains("True"));
        assert!(yaml.contains("reason: Available"));
        assert!(yaml.contains("lastTransitionTime:"));
    }
}
