//! State machine trait for status enums.
//!
//! Gives every lifecycle enum the same validated-transition vocabulary, so a
//! status can never be mutated to a target its table does not allow.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors declare the transition table; validated transitions and
/// terminality come for free.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs a transition with validation, returning an error if invalid.
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

    /// Checks if the current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum ShipmentStatus {
        Packed,
        Shipped,
        Delivered,
        Lost,
    }

    impl StateMachine for ShipmentStatus {
        fn can_transition_to(&self, target: &Self) -> bool {
            use ShipmentStatus::*;
            matches!(
                (self, target),
                (Packed, Shipped) | (Shipped, Delivered) | (Shipped, Lost)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use ShipmentStatus::*;
            match self {
                Packed => vec![Shipped],
                Shipped => vec![Delivered, Lost],
                Delivered | Lost => vec![],
            }
        }
    }

    #[test]
    fn valid_transition_returns_target() {
        let next = ShipmentStatus::Packed
            .transition_to(ShipmentStatus::Shipped)
            .unwrap();
        assert_eq!(next, ShipmentStatus::Shipped);
    }

    #[test]
    fn invalid_transition_returns_error() {
        let result = ShipmentStatus::Packed.transition_to(ShipmentStatus::Delivered);
        assert!(result.is_err());
    }

    #[test]
    fn states_without_exits_are_terminal() {
        assert!(ShipmentStatus::Delivered.is_terminal());
        assert!(ShipmentStatus::Lost.is_terminal());
        assert!(!ShipmentStatus::Shipped.is_terminal());
    }

    #[test]
    fn terminal_states_reject_every_target() {
        for target in [
            ShipmentStatus::Packed,
            ShipmentStatus::Shipped,
            ShipmentStatus::Delivered,
            ShipmentStatus::Lost,
        ] {
            assert!(!ShipmentStatus::Delivered.can_transition_to(&target));
        }
    }
}
