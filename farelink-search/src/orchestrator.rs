use crate::snapshot::{flushes_immediately, SnapshotTrigger, DEBOUNCE_WINDOW};
use farelink_core::{
    AirlineSearchStatus, AirlineStatus, CombinedSearchResult, FlightSearchPort,
    FlightSearchResponse, ItineraryQuery, ProgressiveSearchResults, RunStatus,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Fixed carrier roster to fan out over; not itinerary-dependent.
fn default_roster() -> Vec<String> {
    ["VN", "VJ", "QH", "VU", "BL"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub airlines: Vec<String>,
    /// Backoff before the single retry, for empty results and transport
    /// errors alike.
    pub retry_backoff: Duration,
    pub debounce_window: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            airlines: default_roster(),
            retry_backoff: Duration::from_secs(1),
            debounce_window: DEBOUNCE_WINDOW,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_roster(airlines: Vec<String>) -> Self {
        Self {
            airlines,
            ..Self::default()
        }
    }

    /// Build from configuration-file tunables (millisecond granularity).
    pub fn from_tunables(airlines: Vec<String>, retry_backoff_ms: u64, debounce_ms: u64) -> Self {
        Self {
            airlines,
            retry_backoff: Duration::from_millis(retry_backoff_ms),
            debounce_window: Duration::from_millis(debounce_ms),
        }
    }
}

/// Only setup can fail; per-airline failures are data in the snapshot,
/// never an error from the orchestration call.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("No airlines configured for fan-out")]
    EmptyRoster,
}

enum AirlineOutcome {
    Success(FlightSearchResponse),
    Failed(String),
}

struct AirlineSettled {
    airline: String,
    outcome: AirlineOutcome,
}

/// Per-run mutable state, exclusively owned by one orchestration call.
struct RunState {
    run_id: Uuid,
    statuses: Vec<AirlineSearchStatus>,
    combined: CombinedSearchResult,
    completed: usize,
}

impl RunState {
    fn new(airlines: &[String]) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            statuses: airlines
                .iter()
                .map(|a| AirlineSearchStatus::loading(a))
                .collect(),
            combined: CombinedSearchResult::empty(),
            completed: 0,
        }
    }

    fn apply(&mut self, settled: AirlineSettled) -> SnapshotTrigger {
        let entry = self
            .statuses
            .iter_mut()
            .find(|s| s.airline == settled.airline)
            .expect("settle for unknown airline");
        debug_assert_eq!(entry.status, AirlineStatus::Loading);

        self.completed += 1;
        match settled.outcome {
            AirlineOutcome::Success(response) => {
                let flights = response.flight_count();
                if flights > 0 {
                    self.combined.absorb(&response);
                }
                entry.status = AirlineStatus::Success;
                entry.message = Some(format!("Found {} flights", flights));
                entry.results = Some(response);
                if flights > 0 {
                    SnapshotTrigger::FlightsMerged
                } else {
                    SnapshotTrigger::StatusChanged
                }
            }
            AirlineOutcome::Failed(error) => {
                entry.status = AirlineStatus::Error;
                entry.message = Some("Search failed".to_string());
                entry.error = Some(error);
                SnapshotTrigger::StatusChanged
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.completed == self.statuses.len()
    }

    fn run_status(&self) -> RunStatus {
        if self.is_complete() {
            RunStatus::Complete
        } else if self.completed > 0 {
            RunStatus::Partial
        } else {
            RunStatus::Loading
        }
    }

    fn snapshot(&self) -> ProgressiveSearchResults {
        ProgressiveSearchResults {
            run_id: self.run_id,
            status: self.run_status(),
            total_airlines: self.statuses.len(),
            completed_airlines: self.completed,
            search_statuses: self.statuses.clone(),
            combined_results: self.combined.clone(),
        }
    }
}

/// Fans one itinerary query out to every configured airline, merges partial
/// results as they arrive, and pushes coalesced snapshots to the caller's
/// sink until every airline is terminal.
pub struct SearchOrchestrator {
    port: Arc<dyn FlightSearchPort>,
    config: OrchestratorConfig,
}

impl SearchOrchestrator {
    pub fn new(port: Arc<dyn FlightSearchPort>, config: OrchestratorConfig) -> Self {
        Self { port, config }
    }

    /// Run one progressive search. Resolves with the final snapshot once
    /// every airline settles, or with the partial state on cancellation.
    ///
    /// Every pushed snapshot is a full authoritative state; intermediate
    /// states may be skipped by coalescing.
    pub async fn search_progressive<F>(
        &self,
        query: ItineraryQuery,
        cancel: CancellationToken,
        mut on_progress: F,
    ) -> Result<ProgressiveSearchResults, SearchError>
    where
        F: FnMut(ProgressiveSearchResults),
    {
        if self.config.airlines.is_empty() {
            return Err(SearchError::EmptyRoster);
        }

        // The roster is config-supplied; a repeated carrier code would give
        // one status entry two settles, so duplicates are dropped up front
        let mut roster: Vec<String> = Vec::with_capacity(self.config.airlines.len());
        for airline in &self.config.airlines {
            if roster.contains(airline) {
                warn!(airline = %airline, "duplicate carrier in roster, ignoring");
            } else {
                roster.push(airline.clone());
            }
        }

        let mut run = RunState::new(&roster);
        info!(run_id = %run.run_id, airlines = run.statuses.len(), from = %query.from,
            to = %query.to, "progressive search started");

        // Subscribers see the all-loading state before any network activity
        on_progress(run.snapshot());

        let (tx, mut rx) = mpsc::channel::<AirlineSettled>(roster.len());
        let query = Arc::new(query);
        for airline in &roster {
            let port = Arc::clone(&self.port);
            let query = Arc::clone(&query);
            let airline = airline.clone();
            let backoff = self.config.retry_backoff;
            let cancel = cancel.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome =
                    settle_one_airline(port.as_ref(), &query, &airline, backoff, &cancel).await;
                let _ = tx.send(AirlineSettled { airline, outcome }).await;
            });
        }
        drop(tx);

        let mut pending_flush: Option<Instant> = None;
        loop {
            let flush_at = pending_flush
                .unwrap_or_else(|| Instant::now() + Duration::from_secs(86_400));
            tokio::select! {
                settled = rx.recv() => {
                    let Some(settled) = settled else { break };
                    let trigger = run.apply(settled);
                    if run.is_complete() {
                        pending_flush = None;
                        break;
                    }
                    if cancel.is_cancelled() {
                        return Ok(run.snapshot());
                    }
                    if flushes_immediately(trigger) {
                        pending_flush = None;
                        on_progress(run.snapshot());
                    } else if pending_flush.is_none() {
                        pending_flush = Some(Instant::now() + self.config.debounce_window);
                    }
                }
                _ = time::sleep_until(flush_at), if pending_flush.is_some() => {
                    pending_flush = None;
                    if cancel.is_cancelled() {
                        return Ok(run.snapshot());
                    }
                    on_progress(run.snapshot());
                }
                _ = cancel.cancelled() => {
                    info!(run_id = %run.run_id, completed = run.completed,
                        "search cancelled, resolving with partial state");
                    return Ok(run.snapshot());
                }
            }
        }

        let final_snapshot = run.snapshot();
        info!(run_id = %run.run_id, flights = final_snapshot.combined_results.flight_count(),
            "progressive search complete");
        on_progress(final_snapshot.clone());
        Ok(final_snapshot)
    }
}

/// Drive one airline to a terminal outcome: a well-formed empty result gets
/// one warm-up retry, a transport error gets one retry, and whatever the
/// second attempt yields is final.
async fn settle_one_airline(
    port: &dyn FlightSearchPort,
    query: &ItineraryQuery,
    airline: &str,
    backoff: Duration,
    cancel: &CancellationToken,
) -> AirlineOutcome {
    match port.search_one_airline(query, airline).await {
        Ok(first) if first.flight_count() == 0 => {
            debug!(airline, "empty result, retrying once");
            if !backoff_or_cancel(cancel, backoff).await {
                return AirlineOutcome::Success(first);
            }
            match port.search_one_airline(query, airline).await {
                Ok(second) => AirlineOutcome::Success(second),
                Err(e) => {
                    // The empty first response was at least well-formed
                    warn!(airline, error = %e, "retry of empty result failed, keeping empty");
                    AirlineOutcome::Success(first)
                }
            }
        }
        Ok(first) => AirlineOutcome::Success(first),
        Err(first_err) => {
            warn!(airline, error = %first_err, "transport error, retrying once");
            if !backoff_or_cancel(cancel, backoff).await {
                return AirlineOutcome::Failed(first_err.to_string());
            }
            match port.search_one_airline(query, airline).await {
                Ok(second) => AirlineOutcome::Success(second),
                Err(second_err) => AirlineOutcome::Failed(second_err.to_string()),
            }
        }
    }
}

/// Returns false if cancelled before the backoff elapsed.
async fn backoff_or_cancel(cancel: &CancellationToken, backoff: Duration) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = time::sleep(backoff) => true,
    }
}
