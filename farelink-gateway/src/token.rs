use crate::config::AgentIdentity;
use chrono::{DateTime, Duration, Utc};
use farelink_core::{GatewayError, ReservationGateway};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Fixed protocol tag the gateway expects in the Authorization header.
const CREDENTIAL_SCHEME: &str = "VNJ";

/// The signed claim promises 24h of validity.
const CLAIM_VALIDITY_HOURS: i64 = 24;

/// The cache keeps the token 1h less than the claim promises, as margin
/// against clock drift between us and the gateway.
const CACHE_VALIDITY_HOURS: i64 = 23;

/// A cached token is reused only while it has at least this much life left.
const REUSE_BUFFER_MINUTES: i64 = 5;

#[derive(Debug, Serialize)]
struct AgentClaims {
    iss: String,
    exp: i64,
    request_time: String,
}

/// An opaque bearer credential: `VNJ <signed-JWT> <agentCode>`.
/// Lives only in process memory; discarded, not rotated, on minting errors.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub value: String,
    pub minted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    fn is_reusable(&self, reuse_buffer: Duration) -> bool {
        self.expires_at - Utc::now() > reuse_buffer
    }
}

/// Mints and caches the bearer credential for one agent identity.
///
/// The refresh path is serialized behind one async mutex, so concurrent
/// callers during a cache miss share a single mint instead of issuing
/// redundant ones. Any minting failure clears the cache entirely; the next
/// caller starts from scratch.
pub struct TokenProvider {
    identity: AgentIdentity,
    gateway: Arc<dyn ReservationGateway>,
    cache: tokio::sync::Mutex<Option<AuthToken>>,
    cache_validity: Duration,
    reuse_buffer: Duration,
}

impl TokenProvider {
    pub fn new(identity: AgentIdentity, gateway: Arc<dyn ReservationGateway>) -> Self {
        Self::with_validity(
            identity,
            gateway,
            Duration::hours(CACHE_VALIDITY_HOURS),
            Duration::minutes(REUSE_BUFFER_MINUTES),
        )
    }

    /// Construct with explicit cache lifetimes. The signed claim always
    /// promises 24h regardless; only local reuse is affected.
    pub fn with_validity(
        identity: AgentIdentity,
        gateway: Arc<dyn ReservationGateway>,
        cache_validity: Duration,
        reuse_buffer: Duration,
    ) -> Self {
        Self {
            identity,
            gateway,
            cache: tokio::sync::Mutex::new(None),
            cache_validity,
            reuse_buffer,
        }
    }

    /// Return the cached credential, minting a fresh one if it is missing or
    /// inside the reuse buffer. Idempotent within the validity window.
    pub async fn credential(&self) -> Result<AuthToken, GatewayError> {
        let mut cache = self.cache.lock().await;

        if let Some(token) = cache.as_ref() {
            if token.is_reusable(self.reuse_buffer) {
                debug!(agent = %self.identity.ag_code, "reusing cached credential");
                return Ok(token.clone());
            }
        }

        // No stale-token fallback: a failed mint leaves the cache empty.
        *cache = None;
        let token = self.mint().await?;
        *cache = Some(token.clone());
        Ok(token)
    }

    async fn mint(&self) -> Result<AuthToken, GatewayError> {
        let info = self.gateway.self_info().await?;
        let now = Utc::now();

        let claims = AgentClaims {
            iss: self.identity.ag_code.clone(),
            exp: (now + Duration::hours(CLAIM_VALIDITY_HOURS)).timestamp(),
            request_time: info.time,
        };

        let jwt = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(self.identity.secret.as_bytes()),
        )
        .map_err(|e| GatewayError::Token(format!("signing failed: {}", e)))?;

        info!(agent = %self.identity.ag_code, "minted gateway credential");

        Ok(AuthToken {
            value: format!("{} {} {}", CREDENTIAL_SCHEME, jwt, self.identity.ag_code),
            minted_at: now,
            expires_at: now + self.cache_validity,
        })
    }
}
