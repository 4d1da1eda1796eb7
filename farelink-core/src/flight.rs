use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Passenger types as the gateway spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaxType {
    #[serde(rename = "ADULT")]
    Adult,
    #[serde(rename = "CHD")]
    Child,
    #[serde(rename = "INF")]
    Infant,
}

/// One per-passenger-type price line on a fare.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarePrice {
    pub pax_type: PaxType,
    pub price: i64,
    pub tax: i64,
    pub fee: i64,
    #[serde(default)]
    pub discount: i64,
}

impl FarePrice {
    /// Authoritative per-person cost. `Flight::total_amt` is informational only.
    pub fn total(&self) -> i64 {
        self.price + self.tax + self.fee
    }
}

/// One physical leg of a flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSegment {
    pub airline: String,
    pub start_point: String,
    pub end_point: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default)]
    pub flight_code: String,
    #[serde(default)]
    pub plane: String,
}

/// One bookable fare instance, an immutable snapshot from the gateway.
///
/// A multi-entry `segments` list represents a connection. Expired flights
/// (`expired_date` in the past) must be re-searched, not patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub flight_number: String,
    pub segments: Vec<FlightSegment>,
    pub prices: Vec<FarePrice>,
    pub group_class: String,
    pub fare_class: String,
    pub remain_seats: i32,
    pub total_amt: i64,
    #[serde(default)]
    pub expired_date: Option<NaiveDateTime>,
    pub session: String,
    pub flight_value: String,
    pub vendor_id: i64,
}

impl Flight {
    /// Per-adult cost (`price + tax + fee`), if the fare carries an adult line.
    pub fn adult_total(&self) -> Option<i64> {
        self.prices
            .iter()
            .find(|p| p.pax_type == PaxType::Adult)
            .map(FarePrice::total)
    }
}

/// Fares grouped by flight number, as the gateway returns them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightGroup {
    pub flight_number: String,
    #[serde(default)]
    pub flights: Vec<Flight>,
}

/// Raw response of one per-airline `POST /search-flight` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchResponse {
    pub status: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub vendor_id: i64,
    #[serde(default)]
    pub departure: Vec<FlightGroup>,
}

impl FlightSearchResponse {
    pub fn flight_count(&self) -> usize {
        self.departure.iter().map(|g| g.flights.len()).sum()
    }
}

/// One leg of the wire request. `depart_date` is fixed-width `DDMMYYYY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLegRequest {
    pub start_point: String,
    pub end_point: String,
    pub depart_date: String,
    pub airline: String,
}

/// Wire body of `POST /search-flight`, scoped to exactly one carrier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchRequest {
    pub acc_code: String,
    pub ag_code: String,
    pub adt: u32,
    pub chd: u32,
    pub inf: u32,
    pub list_flight: Vec<SearchLegRequest>,
}

/// `GET /self-info` payload: the gateway's clock, used as a signing anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfInfo {
    pub time: String,
}

/// One entry of a fare's booking-rule text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRule {
    #[serde(default)]
    pub rule: Option<String>,
    pub title: String,
    pub content: String,
    pub is_active: bool,
}

/// `GET /get-price-term` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTermResponse {
    pub status: bool,
    #[serde(default)]
    pub booking_rules: Vec<BookingRule>,
}

/// Identifies one fare family for price-term and baggage lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareBasisKey {
    pub airline: String,
    pub group_class: String,
    pub fare_class: String,
}

/// Baggage allowance for one fare family, best effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaggageInfo {
    pub airline: String,
    pub group_class: String,
    pub fare_class: String,
    #[serde(default)]
    pub hand_baggage: Option<String>,
    #[serde(default)]
    pub checked_baggage: Option<String>,
}

impl BaggageInfo {
    /// A record with no allowance fields, used when a lookup degrades.
    pub fn bare(key: &FareBasisKey) -> Self {
        Self {
            airline: key.airline.clone(),
            group_class: key.group_class.clone(),
            fare_class: key.fare_class.clone(),
            hand_baggage: None,
            checked_baggage: None,
        }
    }
}

/// The running merge of every successful airline's result groups.
///
/// Grows monotonically over one orchestration run; no cross-airline
/// deduplication happens here (grouping is a downstream concern).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedSearchResult {
    pub status: bool,
    pub message: String,
    pub vendor_id: i64,
    pub departure: Vec<FlightGroup>,
}

impl CombinedSearchResult {
    pub fn empty() -> Self {
        Self {
            status: true,
            message: String::new(),
            vendor_id: 0,
            departure: Vec::new(),
        }
    }

    /// Append one airline's result groups. Never removes anything.
    pub fn absorb(&mut self, response: &FlightSearchResponse) {
        if self.vendor_id == 0 {
            self.vendor_id = response.vendor_id;
        }
        self.departure
            .extend(response.departure.iter().cloned());
    }

    pub fn flight_count(&self) -> usize {
        self.departure.iter().map(|g| g.flights.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response_json() -> &'static str {
        r#"
        {
            "status": true,
            "message": null,
            "vendorId": 7,
            "departure": [
                {
                    "flightNumber": "VN212",
                    "flights": [
                        {
                            "flightNumber": "VN212",
                            "segments": [
                                {
                                    "airline": "VN",
                                    "startPoint": "SGN",
                                    "endPoint": "HAN",
                                    "startTime": "2025-03-20T06:00:00",
                                    "endTime": "2025-03-20T08:10:00",
                                    "flightCode": "VN212",
                                    "plane": "A321"
                                }
                            ],
                            "prices": [
                                { "paxType": "ADULT", "price": 1500000, "tax": 400000, "fee": 50000, "discount": 0 },
                                { "paxType": "CHD", "price": 1100000, "tax": 400000, "fee": 50000, "discount": 0 }
                            ],
                            "groupClass": "ECONOMY",
                            "fareClass": "E",
                            "remainSeats": 9,
                            "totalAmt": 1950000,
                            "expiredDate": "2025-03-20T05:40:00",
                            "session": "sess-1",
                            "flightValue": "fv-1",
                            "vendorId": 7
                        }
                    ]
                }
            ]
        }
        "#
    }

    #[test]
    fn test_search_response_deserialization() {
        let response: FlightSearchResponse =
            serde_json::from_str(sample_response_json()).expect("Failed to deserialize");
        assert!(response.status);
        assert_eq!(response.vendor_id, 7);
        assert_eq!(response.flight_count(), 1);

        let flight = &response.departure[0].flights[0];
        assert_eq!(flight.flight_number, "VN212");
        assert_eq!(flight.segments[0].start_point, "SGN");
        // price + tax + fee, not totalAmt
        assert_eq!(flight.adult_total(), Some(1_950_000));
    }

    #[test]
    fn test_missing_departure_defaults_empty() {
        let response: FlightSearchResponse =
            serde_json::from_str(r#"{ "status": true }"#).expect("Failed to deserialize");
        assert_eq!(response.flight_count(), 0);
        assert_eq!(response.vendor_id, 0);
    }

    #[test]
    fn test_combined_result_absorb_is_append_only() {
        let response: FlightSearchResponse =
            serde_json::from_str(sample_response_json()).unwrap();

        let mut combined = CombinedSearchResult::empty();
        combined.absorb(&response);
        assert_eq!(combined.flight_count(), 1);
        assert_eq!(combined.vendor_id, 7);

        // A second airline's groups land after the first, nothing is replaced
        let mut other = response.clone();
        other.vendor_id = 9;
        other.departure[0].flight_number = "VJ150".to_string();
        combined.absorb(&other);
        assert_eq!(combined.flight_count(), 2);
        assert_eq!(combined.vendor_id, 7);
        assert_eq!(combined.departure[1].flight_number, "VJ150");
    }

    #[test]
    fn test_search_request_wire_shape() {
        let request = FlightSearchRequest {
            acc_code: "ACC1".into(),
            ag_code: "AG1".into(),
            adt: 1,
            chd: 0,
            inf: 0,
            list_flight: vec![SearchLegRequest {
                start_point: "SGN".into(),
                end_point: "HAN".into(),
                depart_date: "20032025".into(),
                airline: "VN".into(),
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["accCode"], "ACC1");
        assert_eq!(value["listFlight"][0]["departDate"], "20032025");
    }
}
