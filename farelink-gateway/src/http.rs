use crate::config::GatewayConfig;
use async_trait::async_trait;
use farelink_core::{
    FareBasisKey, FlightSearchRequest, FlightSearchResponse, GatewayError, PriceTermResponse,
    ReservationGateway, SelfInfo,
};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Reqwest-backed gateway transport. Every call carries a bounded timeout so
/// a hung airline cannot stall an orchestration run indefinitely.
pub struct HttpGateway {
    base_url: String,
    http: reqwest::Client,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Transport {
                status: None,
                message: format!("client construction failed: {}", e),
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| status.to_string());
        Err(GatewayError::Transport {
            status: Some(status.as_u16()),
            message,
        })
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    GatewayError::Transport {
        status: e.status().map(|s: StatusCode| s.as_u16()),
        message: e.to_string(),
    }
}

fn decode_error(e: reqwest::Error) -> GatewayError {
    GatewayError::Decode(e.to_string())
}

#[async_trait]
impl ReservationGateway for HttpGateway {
    async fn self_info(&self) -> Result<SelfInfo, GatewayError> {
        let response = self
            .http
            .get(self.url("/self-info"))
            .send()
            .await
            .map_err(transport_error)?;
        Self::check(response)
            .await?
            .json::<SelfInfo>()
            .await
            .map_err(decode_error)
    }

    async fn search_flight(
        &self,
        request: &FlightSearchRequest,
        credential: &str,
    ) -> Result<FlightSearchResponse, GatewayError> {
        debug!(
            airline = request.list_flight.first().map(|l| l.airline.as_str()),
            legs = request.list_flight.len(),
            "searching flights"
        );
        let response = self
            .http
            .post(self.url("/search-flight"))
            .header(reqwest::header::AUTHORIZATION, credential)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        Self::check(response)
            .await?
            .json::<FlightSearchResponse>()
            .await
            .map_err(decode_error)
    }

    async fn price_terms(
        &self,
        key: &FareBasisKey,
        agent_code: &str,
        credential: &str,
    ) -> Result<PriceTermResponse, GatewayError> {
        let response = self
            .http
            .get(self.url("/get-price-term"))
            .query(&[
                ("airline", key.airline.as_str()),
                ("groupClass", key.group_class.as_str()),
                ("fareClass", key.fare_class.as_str()),
                ("AgCode", agent_code),
            ])
            .header(reqwest::header::AUTHORIZATION, credential)
            .send()
            .await
            .map_err(transport_error)?;
        Self::check(response)
            .await?
            .json::<PriceTermResponse>()
            .await
            .map_err(decode_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentIdentity;

    fn config(base_url: &str) -> GatewayConfig {
        GatewayConfig {
            base_url: base_url.to_string(),
            agent: AgentIdentity {
                acc_code: "ACC1".into(),
                ag_code: "AG1".into(),
                secret: "s1".into(),
            },
            min_fare_agent: AgentIdentity {
                acc_code: "ACC2".into(),
                ag_code: "AG2".into(),
                secret: "s2".into(),
            },
            airlines: vec!["VN".into()],
            request_timeout_secs: 5,
            search_retry_backoff_ms: 1_000,
            snapshot_debounce_ms: 300,
        }
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let gateway = HttpGateway::new(&config("https://gw.example.com/")).unwrap();
        assert_eq!(gateway.url("/self-info"), "https://gw.example.com/self-info");
    }
}
