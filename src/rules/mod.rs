// Rule evaluation: geofence rule + containment transition -> event kind

use crate::geofence::RuleType;
use crate::state::Transition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a detected geofence event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Enter,
    Exit,
    ViolationEnter,
    ViolationExit,
}

impl EventKind {
    /// Violations are alerts and go through the cooldown gate
    pub fn is_violation(&self) -> bool {
        matches!(self, EventKind::ViolationEnter | EventKind::ViolationExit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Enter => "enter",
            EventKind::Exit => "exit",
            EventKind::ViolationEnter => "violation_enter",
            EventKind::ViolationExit => "violation_exit",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a rule and a transition to at most one event kind.
///
/// | rule      | entered          | exited          |
/// |-----------|------------------|-----------------|
/// | STANDARD  | enter            | exit            |
/// | FORBIDDEN | violation_enter  | -               |
/// | STAY_IN   | -                | violation_exit  |
///
/// Everything else, including unknown rules, yields nothing.
pub fn evaluate(rule_type: RuleType, transition: Transition) -> Option<EventKind> {
    match (rule_type, transition) {
        (RuleType::Standard, Transition::Entered) => Some(EventKind::Enter),
        (RuleType::Standard, Transition::Exited) => Some(EventKind::Exit),
        (RuleType::Forbidden, Transition::Entered) => Some(EventKind::ViolationEnter),
        (RuleType::StayIn, Transition::Exited) => Some(EventKind::ViolationExit),
        _ => None,
    }
}
