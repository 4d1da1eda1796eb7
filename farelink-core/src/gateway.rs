use crate::flight::{
    FareBasisKey, FlightSearchRequest, FlightSearchResponse, PriceTermResponse, SelfInfo,
};
use crate::itinerary::ItineraryQuery;
use async_trait::async_trait;

/// Failures on the path to the reservation gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Signing or network failure while minting a credential. Never retried
    /// by the token layer; callers must not proceed with dependent calls.
    #[error("Token acquisition failed: {0}")]
    Token(String),

    /// Non-2xx or network failure on a gateway call.
    #[error("Upstream transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// 2xx response whose body did not match the expected shape.
    #[error("Malformed gateway response: {0}")]
    Decode(String),
}

/// Low-level wire port to the airline reservation gateway.
///
/// `credential` is the full `VNJ <jwt> <agentCode>` header value.
#[async_trait]
pub trait ReservationGateway: Send + Sync {
    /// Fetch the gateway's clock, used as a signing anchor for credentials.
    async fn self_info(&self) -> Result<SelfInfo, GatewayError>;

    /// Run one single-carrier search.
    async fn search_flight(
        &self,
        request: &FlightSearchRequest,
        credential: &str,
    ) -> Result<FlightSearchResponse, GatewayError>;

    /// Fetch the booking-rule text for one fare family.
    async fn price_terms(
        &self,
        key: &FareBasisKey,
        agent_code: &str,
        credential: &str,
    ) -> Result<PriceTermResponse, GatewayError>;
}

/// One-airline search with credentials handled inside the implementation.
/// The orchestration layer fans out over this seam.
#[async_trait]
pub trait FlightSearchPort: Send + Sync {
    async fn search_one_airline(
        &self,
        query: &ItineraryQuery,
        airline: &str,
    ) -> Result<FlightSearchResponse, GatewayError>;
}
