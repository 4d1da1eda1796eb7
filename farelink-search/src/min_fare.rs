use chrono::{DateTime, Duration, NaiveDate, Utc};
use farelink_core::{CabinClass, FlightSearchPort, ItineraryQuery};
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

const MIN_FARE_TTL_MINUTES: i64 = 10;

/// Exact-tuple cache key; equivalent-but-reordered queries are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MinFareKey {
    pub from: String,
    pub to: String,
    pub date: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl MinFareKey {
    fn to_query(&self) -> ItineraryQuery {
        ItineraryQuery {
            from: self.from.clone(),
            to: self.to.clone(),
            depart_date: self.date,
            return_date: None,
            adults: self.adults,
            children: self.children,
            infants: self.infants,
            cabin: CabinClass::Economy,
        }
    }
}

/// Cheapest per-adult price for one route/date/pax tuple. Feeds a
/// non-critical price-trend strip, so upstream failures come back as a soft
/// `status: false` shape rather than an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinFareResponse {
    pub status: bool,
    pub message: String,
    pub min_price: Option<i64>,
}

struct CacheEntry {
    data: MinFareResponse,
    expires_at: DateTime<Utc>,
}

/// Read-through memoization of cheapest-price lookups.
///
/// Entries are reused until expiry and overwritten afterwards; there is no
/// eviction or size bound, which is accepted for a session-lifetime cache.
pub struct MinFareCache {
    port: Arc<dyn FlightSearchPort>,
    airlines: Vec<String>,
    ttl: Duration,
    entries: RwLock<HashMap<MinFareKey, CacheEntry>>,
}

impl MinFareCache {
    pub fn new(port: Arc<dyn FlightSearchPort>, airlines: Vec<String>) -> Self {
        Self::with_ttl(port, airlines, Duration::minutes(MIN_FARE_TTL_MINUTES))
    }

    pub fn with_ttl(port: Arc<dyn FlightSearchPort>, airlines: Vec<String>, ttl: Duration) -> Self {
        Self {
            port,
            airlines,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get_min_fare(&self, key: MinFareKey) -> MinFareResponse {
        let now = Utc::now();
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&key) {
                if entry.expires_at > now {
                    debug!(from = %key.from, to = %key.to, date = %key.date, "min-fare cache hit");
                    return entry.data.clone();
                }
            }
        }

        let response = self.scan_minimum(&key).await;
        if response.status {
            let mut entries = self.entries.write().await;
            entries.insert(
                key,
                CacheEntry {
                    data: response.clone(),
                    expires_at: now + self.ttl,
                },
            );
        }
        response
    }

    /// Broad search across the whole roster, tracking the minimum adult
    /// `price + tax + fee` over every returned fare.
    ///
    /// Any failed airline leg makes the whole scan a soft error: a minimum
    /// computed from a subset of the roster would be silently wrong whenever
    /// the failed carrier held the cheapest fare.
    async fn scan_minimum(&self, key: &MinFareKey) -> MinFareResponse {
        let query = key.to_query();
        let searches = self
            .airlines
            .iter()
            .map(|airline| self.port.search_one_airline(&query, airline));

        let mut min_price: Option<i64> = None;
        let mut any_failed = false;
        for (airline, result) in self.airlines.iter().zip(join_all(searches).await) {
            match result {
                Ok(response) => {
                    for group in &response.departure {
                        for flight in &group.flights {
                            if let Some(total) = flight.adult_total() {
                                min_price =
                                    Some(min_price.map_or(total, |current| current.min(total)));
                            }
                        }
                    }
                }
                Err(e) => {
                    any_failed = true;
                    warn!(airline = %airline, error = %e, "min-fare search leg failed");
                }
            }
        }

        if any_failed {
            return MinFareResponse {
                status: false,
                message: "Error occurred".to_string(),
                min_price: None,
            };
        }

        MinFareResponse {
            status: true,
            message: String::new(),
            min_price,
        }
    }
}
