pub mod baggage;
pub mod config;
pub mod http;
pub mod search_client;
pub mod token;

pub use baggage::BaggageInfoResolver;
pub use config::{AgentIdentity, GatewayConfig};
pub use http::HttpGateway;
pub use search_client::AirlineSearchClient;
pub use token::{AuthToken, TokenProvider};

use farelink_core::GatewayError;
use std::sync::Arc;

/// Search client for the primary booking identity.
pub fn booking_client(config: &GatewayConfig) -> Result<AirlineSearchClient, GatewayError> {
    client_for(config, config.agent.clone())
}

/// Search client for the separate min-fare identity. Its token cache is
/// independent of the booking identity's.
pub fn min_fare_client(config: &GatewayConfig) -> Result<AirlineSearchClient, GatewayError> {
    client_for(config, config.min_fare_agent.clone())
}

fn client_for(
    config: &GatewayConfig,
    identity: AgentIdentity,
) -> Result<AirlineSearchClient, GatewayError> {
    let gateway: Arc<HttpGateway> = Arc::new(HttpGateway::new(config)?);
    let tokens = Arc::new(TokenProvider::new(identity.clone(), gateway.clone()));
    Ok(AirlineSearchClient::new(gateway, tokens, identity))
}
