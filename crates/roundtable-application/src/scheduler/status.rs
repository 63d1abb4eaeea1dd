use roundtable_core::Roundtable;
use roundtable_core::phase::Phase;

/// Read-only snapshot of a running discussion, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeStatus {
    pub phase: Phase,
    /// A model call is in flight
    pub busy: bool,
    /// Autonomous turns are scheduled
    pub running: bool,
    pub turn_count: usize,
    pub epoch: u64,
}

impl RuntimeStatus {
    pub(crate) fn of(table: &Roundtable, running: bool) -> Self {
        Self {
            phase: table.phase(),
            busy: table.is_busy(),
            running,
            turn_count: table.log().len(),
            epoch: table.state().epoch,
        }
    }
}
