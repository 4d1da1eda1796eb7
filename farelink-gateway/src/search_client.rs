use crate::config::AgentIdentity;
use crate::token::TokenProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use farelink_core::{
    FlightSearchPort, FlightSearchRequest, FlightSearchResponse, GatewayError, ItineraryQuery,
    ReservationGateway, SearchLegRequest,
};
use std::sync::Arc;
use tracing::debug;

/// Fixed-width `DDMMYYYY`, as the gateway wants search dates.
const GATEWAY_DATE_FORMAT: &str = "%d%m%Y";

fn gateway_date(date: NaiveDate) -> String {
    date.format(GATEWAY_DATE_FORMAT).to_string()
}

/// Issues one search against the gateway for a single airline.
///
/// Purely functional given the itinerary and a valid credential; retry policy
/// lives in the orchestration layer, which distinguishes empty results from
/// transport errors.
pub struct AirlineSearchClient {
    gateway: Arc<dyn ReservationGateway>,
    tokens: Arc<TokenProvider>,
    identity: AgentIdentity,
}

impl AirlineSearchClient {
    pub fn new(
        gateway: Arc<dyn ReservationGateway>,
        tokens: Arc<TokenProvider>,
        identity: AgentIdentity,
    ) -> Self {
        Self {
            gateway,
            tokens,
            identity,
        }
    }

    /// Build the wire body: the outbound leg always, a return leg only for
    /// round trips, every leg scoped to the one carrier under search.
    fn build_request(&self, query: &ItineraryQuery, airline: &str) -> FlightSearchRequest {
        let mut list_flight = vec![SearchLegRequest {
            start_point: query.from.clone(),
            end_point: query.to.clone(),
            depart_date: gateway_date(query.depart_date),
            airline: airline.to_string(),
        }];

        if let Some(return_date) = query.return_date {
            list_flight.push(SearchLegRequest {
                start_point: query.to.clone(),
                end_point: query.from.clone(),
                depart_date: gateway_date(return_date),
                airline: airline.to_string(),
            });
        }

        FlightSearchRequest {
            acc_code: self.identity.acc_code.clone(),
            ag_code: self.identity.ag_code.clone(),
            adt: query.adults,
            chd: query.children,
            inf: query.infants,
            list_flight,
        }
    }
}

#[async_trait]
impl FlightSearchPort for AirlineSearchClient {
    async fn search_one_airline(
        &self,
        query: &ItineraryQuery,
        airline: &str,
    ) -> Result<FlightSearchResponse, GatewayError> {
        let token = self.tokens.credential().await?;
        let request = self.build_request(query, airline);

        let mut response = self.gateway.search_flight(&request, &token.value).await?;

        // The gateway pads responses with empty flight groups
        response.departure.retain(|group| !group.flights.is_empty());
        debug!(
            airline,
            flights = response.flight_count(),
            "airline search settled"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farelink_core::{CabinClass, FareBasisKey, PriceTermResponse, SelfInfo};
    use std::sync::Mutex;

    /// Records the request and credential it was called with.
    struct RecordingGateway {
        last: Mutex<Option<(FlightSearchRequest, String)>>,
        response: FlightSearchResponse,
    }

    impl RecordingGateway {
        fn new(response: FlightSearchResponse) -> Self {
            Self {
                last: Mutex::new(None),
                response,
            }
        }
    }

    #[async_trait]
    impl ReservationGateway for RecordingGateway {
        async fn self_info(&self) -> Result<SelfInfo, GatewayError> {
            Ok(SelfInfo {
                time: "2025-03-20T00:00:00".into(),
            })
        }

        async fn search_flight(
            &self,
            request: &FlightSearchRequest,
            credential: &str,
        ) -> Result<FlightSearchResponse, GatewayError> {
            *self.last.lock().unwrap() = Some((request.clone(), credential.to_string()));
            Ok(self.response.clone())
        }

        async fn price_terms(
            &self,
            _key: &FareBasisKey,
            _agent_code: &str,
            _credential: &str,
        ) -> Result<PriceTermResponse, GatewayError> {
            unimplemented!("not exercised")
        }
    }

    fn identity() -> AgentIdentity {
        AgentIdentity {
            acc_code: "ACC1".into(),
            ag_code: "AG1".into(),
            secret: "s1".into(),
        }
    }

    fn client(gateway: Arc<RecordingGateway>) -> AirlineSearchClient {
        let tokens = Arc::new(TokenProvider::new(identity(), gateway.clone()));
        AirlineSearchClient::new(gateway, tokens, identity())
    }

    fn one_way_query() -> ItineraryQuery {
        ItineraryQuery {
            from: "SGN".into(),
            to: "HAN".into(),
            depart_date: NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
            return_date: None,
            adults: 2,
            children: 1,
            infants: 0,
            cabin: CabinClass::Economy,
        }
    }

    fn empty_response() -> FlightSearchResponse {
        FlightSearchResponse {
            status: true,
            message: None,
            vendor_id: 7,
            departure: vec![],
        }
    }

    #[tokio::test]
    async fn test_one_way_request_has_single_leg() {
        let gateway = Arc::new(RecordingGateway::new(empty_response()));
        let client = client(gateway.clone());

        client
            .search_one_airline(&one_way_query(), "VN")
            .await
            .unwrap();

        let (request, credential) = gateway.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.list_flight.len(), 1);
        assert_eq!(request.list_flight[0].start_point, "SGN");
        assert_eq!(request.list_flight[0].depart_date, "20032025");
        assert_eq!(request.list_flight[0].airline, "VN");
        assert_eq!((request.adt, request.chd, request.inf), (2, 1, 0));
        assert!(credential.starts_with("VNJ "));
    }

    #[tokio::test]
    async fn test_round_trip_request_has_two_legs_one_call() {
        let gateway = Arc::new(RecordingGateway::new(empty_response()));
        let client = client(gateway.clone());

        let mut query = one_way_query();
        query.return_date = NaiveDate::from_ymd_opt(2025, 3, 25);

        client.search_one_airline(&query, "VJ").await.unwrap();

        let (request, _) = gateway.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.list_flight.len(), 2);
        assert_eq!(request.list_flight[1].start_point, "HAN");
        assert_eq!(request.list_flight[1].end_point, "SGN");
        assert_eq!(request.list_flight[1].depart_date, "25032025");
        assert_eq!(request.list_flight[1].airline, "VJ");
    }

    #[tokio::test]
    async fn test_empty_groups_are_dropped() {
        let mut response = empty_response();
        response.departure = vec![farelink_core::FlightGroup {
            flight_number: "VN212".into(),
            flights: vec![],
        }];
        let gateway = Arc::new(RecordingGateway::new(response));
        let client = client(gateway);

        let normalized = client
            .search_one_airline(&one_way_query(), "VN")
            .await
            .unwrap();
        assert!(normalized.departure.is_empty());
    }
}
