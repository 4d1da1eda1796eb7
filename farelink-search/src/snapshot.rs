use std::time::Duration;

/// Status-only snapshots are coalesced to at most one per window.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// What caused a snapshot to be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotTrigger {
    /// The very first emission, before any network activity.
    Initial,
    /// An airline settled without contributing new flights.
    StatusChanged,
    /// New flights were just merged into the combined results.
    FlightsMerged,
    /// Every airline is terminal.
    Final,
}

/// The asymmetric flush policy: label-only changes are cheap to coalesce,
/// but new flights are the signal driving the UI and must not wait out a
/// debounce window.
pub fn flushes_immediately(trigger: SnapshotTrigger) -> bool {
    matches!(
        trigger,
        SnapshotTrigger::Initial | SnapshotTrigger::FlightsMerged | SnapshotTrigger::Final
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_policy_is_asymmetric() {
        assert!(flushes_immediately(SnapshotTrigger::Initial));
        assert!(flushes_immediately(SnapshotTrigger::FlightsMerged));
        assert!(flushes_immediately(SnapshotTrigger::Final));
        assert!(!flushes_immediately(SnapshotTrigger::StatusChanged));
    }
}
