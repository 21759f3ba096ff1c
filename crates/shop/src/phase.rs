//! Order placement state machine.

/// The phase of a single `place_order` invocation.
///
/// Phase transitions:
/// ```text
/// Started ──► Validating ──► InTransaction ──┬──► Committed
///                                            └──► RolledBack
/// ```
///
/// A request that fails validation stops in `Validating`; no transaction
/// was opened, so there is nothing to roll back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderPhase {
    #[default]
    Started,

    /// Preconditions are being checked. No storage access yet.
    Validating,

    /// A storage transaction is open.
    InTransaction,

    /// All rows were committed (terminal state).
    Committed,

    /// The transaction was rolled back; nothing persisted (terminal state).
    RolledBack,
}

impl OrderPhase {
    /// Returns true if moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: OrderPhase) -> bool {
        matches!(
            (self, next),
            (OrderPhase::Started, OrderPhase::Validating)
                | (OrderPhase::Validating, OrderPhase::InTransaction)
                | (OrderPhase::InTransaction, OrderPhase::Committed)
                | (OrderPhase::InTransaction, OrderPhase::RolledBack)
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderPhase::Committed | OrderPhase::RolledBack)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderPhase::Started => "Started",
            OrderPhase::Validating => "Validating",
            OrderPhase::InTransaction => "InTransaction",
            OrderPhase::Committed => "Committed",
            OrderPhase::RolledBack => "RolledBack",
        }
    }
}

impl std::fmt::Display for OrderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderPhase; 5] = [
        OrderPhase::Started,
        OrderPhase::Validating,
        OrderPhase::InTransaction,
        OrderPhase::Committed,
        OrderPhase::RolledBack,
    ];

    #[test]
    fn test_default_phase_is_started() {
        assert_eq!(OrderPhase::default(), OrderPhase::Started);
    }

    #[test]
    fn test_forward_transitions() {
        assert!(OrderPhase::Started.can_transition_to(OrderPhase::Validating));
        assert!(OrderPhase::Validating.can_transition_to(OrderPhase::InTransaction));
        assert!(OrderPhase::InTransaction.can_transition_to(OrderPhase::Committed));
        assert!(OrderPhase::InTransaction.can_transition_to(OrderPhase::RolledBack));
    }

    #[test]
    fn test_no_partial_commit_paths() {
        assert!(!OrderPhase::Validating.can_transition_to(OrderPhase::Committed));
        assert!(!OrderPhase::Started.can_transition_to(OrderPhase::InTransaction));
        assert!(!OrderPhase::Committed.can_transition_to(OrderPhase::RolledBack));
        assert!(!OrderPhase::RolledBack.can_transition_to(OrderPhase::Committed));
    }

    #[test]
    fn test_terminal_phases_have_no_successors() {
        for phase in ALL.iter().filter(|p| p.is_terminal()) {
            for next in ALL {
                assert!(!phase.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(OrderPhase::InTransaction.to_string(), "InTransaction");
        assert_eq!(OrderPhase::RolledBack.to_string(), "RolledBack");
    }
}
