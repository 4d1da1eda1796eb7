pub mod min_fare;
pub mod orchestrator;
pub mod snapshot;

pub use min_fare::{MinFareCache, MinFareKey, MinFareResponse};
pub use orchestrator::{OrchestratorConfig, SearchError, SearchOrchestrator};
pub use snapshot::{flushes_immediately, SnapshotTrigger, DEBOUNCE_WINDOW};
