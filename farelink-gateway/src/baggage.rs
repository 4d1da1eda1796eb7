use crate::token::TokenProvider;
use farelink_core::{BaggageInfo, BookingRule, FareBasisKey, GatewayError, ReservationGateway};
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::warn;

/// Airlines whose fare rules come back as structured booking-rule text.
/// Everyone else gets the hardcoded default allowance.
const STRUCTURED_RULE_AIRLINES: &[&str] = &["VJ"];

const HAND_BAGGAGE_TITLE: &str = "hand baggage";
const CHECKED_BAGGAGE_TITLE: &str = "checked baggage";

const DEFAULT_HAND_BAGGAGE: &str = "7kg hand baggage";
const DEFAULT_CHECKED_BAGGAGE: &str = "No checked baggage";

/// Best-effort cross-airline baggage-allowance lookup for comparison UI.
///
/// The batch itself never fails: a key whose lookup errors degrades to a bare
/// record with no allowance fields.
pub struct BaggageInfoResolver {
    gateway: Arc<dyn ReservationGateway>,
    tokens: Arc<TokenProvider>,
    agent_code: String,
}

impl BaggageInfoResolver {
    pub fn new(
        gateway: Arc<dyn ReservationGateway>,
        tokens: Arc<TokenProvider>,
        agent_code: String,
    ) -> Self {
        Self {
            gateway,
            tokens,
            agent_code,
        }
    }

    pub async fn resolve_batch(&self, keys: &[FareBasisKey]) -> Vec<BaggageInfo> {
        join_all(keys.iter().map(|key| self.resolve_one(key))).await
    }

    async fn resolve_one(&self, key: &FareBasisKey) -> BaggageInfo {
        if !STRUCTURED_RULE_AIRLINES.contains(&key.airline.as_str()) {
            let mut info = BaggageInfo::bare(key);
            info.hand_baggage = Some(DEFAULT_HAND_BAGGAGE.to_string());
            info.checked_baggage = Some(DEFAULT_CHECKED_BAGGAGE.to_string());
            return info;
        }

        match self.lookup(key).await {
            Ok(info) => info,
            Err(e) => {
                warn!(airline = %key.airline, fare_class = %key.fare_class, error = %e,
                    "baggage lookup degraded");
                BaggageInfo::bare(key)
            }
        }
    }

    async fn lookup(&self, key: &FareBasisKey) -> Result<BaggageInfo, GatewayError> {
        let token = self.tokens.credential().await?;
        let terms = self
            .gateway
            .price_terms(key, &self.agent_code, &token.value)
            .await?;

        let (hand, checked) = parse_allowances(&terms.booking_rules);
        let mut info = BaggageInfo::bare(key);
        info.hand_baggage = hand;
        info.checked_baggage = checked;
        Ok(info)
    }
}

/// Pick hand/checked allowances out of rule text by title prefix.
fn parse_allowances(rules: &[BookingRule]) -> (Option<String>, Option<String>) {
    let mut hand = None;
    let mut checked = None;
    for rule in rules.iter().filter(|r| r.is_active) {
        let title = rule.title.to_lowercase();
        if hand.is_none() && title.starts_with(HAND_BAGGAGE_TITLE) {
            hand = Some(rule.content.trim().to_string());
        } else if checked.is_none() && title.starts_with(CHECKED_BAGGAGE_TITLE) {
            checked = Some(rule.content.trim().to_string());
        }
    }
    (hand, checked)
}
