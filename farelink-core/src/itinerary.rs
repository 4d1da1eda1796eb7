use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cabin classes accepted by the reservation gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

/// One search invocation's input. Immutable for the lifetime of the run.
///
/// Passenger-count sanity (`infants <= adults` and so on) is the caller's
/// concern; this layer passes the counts through to the gateway verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryQuery {
    pub from: String,
    pub to: String,
    pub depart_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub cabin: CabinClass,
}

impl ItineraryQuery {
    pub fn is_round_trip(&self) -> bool {
        self.return_date.is_some()
    }

    pub fn passenger_count(&self) -> u32 {
        self.adults + self.children + self.infants
    }
}
