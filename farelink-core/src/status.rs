use crate::flight::{CombinedSearchResult, FlightSearchResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-airline state within one orchestration run.
///
/// Transitions are one-way: `loading -> success` or `loading -> error`.
/// Retries happen inside the loading state and are invisible here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AirlineStatus {
    Loading,
    Success,
    Error,
}

impl AirlineStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AirlineStatus::Success | AirlineStatus::Error)
    }
}

/// One airline's record in the snapshot's status list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirlineSearchStatus {
    pub airline: String,
    pub status: AirlineStatus,
    #[serde(default)]
    pub results: Option<FlightSearchResponse>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AirlineSearchStatus {
    pub fn loading(airline: &str) -> Self {
        Self {
            airline: airline.to_string(),
            status: AirlineStatus::Loading,
            results: None,
            message: Some("Searching...".to_string()),
            error: None,
        }
    }
}

/// Run-level status: loading until the first airline settles, partial while
/// some are still in flight, complete once every airline is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Loading,
    Partial,
    Complete,
}

/// One immutable snapshot pushed to a progress subscriber.
///
/// Each snapshot is a full authoritative state, not a diff; intermediate
/// snapshots may be skipped by coalescing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressiveSearchResults {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub total_airlines: usize,
    pub completed_airlines: usize,
    pub search_statuses: Vec<AirlineSearchStatus>,
    pub combined_results: CombinedSearchResult,
}
