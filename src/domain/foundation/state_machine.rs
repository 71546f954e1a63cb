//! Transition rules for state enums.

use super::ValidationError;

/// A state enum with an explicit transition table.
///
/// Implementors only list which moves are legal; `transition_to` then
/// rejects everything else.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// True if moving from `self` to `target` is allowed.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Every state reachable from `self` in one step.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns `target` if the move is legal.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
