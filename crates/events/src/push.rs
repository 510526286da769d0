//! Web Push delivery (RFC 8030) authenticated with VAPID (RFC 8292).
//!
//! Pushes carry no payload: the browser wakes the service worker, which
//! fetches the unread notifications from the API. This avoids payload
//! encryption entirely.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

/// HTTP request timeout for a single push.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifetime of a VAPID token. Push services reject tokens over 24 hours.
const VAPID_TOKEN_TTL_SECS: i64 = 12 * 3600;

/// How long the push service should hold a message for an offline device.
const MESSAGE_TTL_SECS: u32 = 24 * 3600;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for push delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The subscription no longer exists (HTTP 404/410) and should be deleted.
    #[error("Push subscription is gone")]
    Gone,

    /// The push service returned another non-2xx status code.
    #[error("Push service returned HTTP {0}")]
    HttpStatus(u16),

    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The subscription endpoint is not an absolute https URL.
    #[error("Invalid push endpoint: {0}")]
    InvalidEndpoint(String),

    /// The VAPID key could not be loaded or the token could not be signed.
    #[error("VAPID signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// VAPID application server identity.
#[derive(Debug, Clone)]
pub struct VapidConfig {
    /// Uncompressed P-256 public key, base64url without padding. This is the
    /// `applicationServerKey` handed to browsers.
    pub public_key: String,
    /// PKCS#8 PEM of the matching private key.
    pub private_key_pem: String,
    /// Contact URI, `mailto:` or `https:`.
    pub subject: String,
}

/// Where to deliver a push.
#[derive(Debug, Clone)]
pub struct PushTarget {
    pub subscription_id: i64,
    pub endpoint: String,
}

/// Delivery priority hint for the push service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Low,
    Normal,
    High,
}

impl Urgency {
    pub fn as_header(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::High => "high",
        }
    }
}

/// Claims of a VAPID JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct VapidClaims {
    pub aud: String,
    pub exp: i64,
    pub sub: String,
}

/// Sends a wake-up push to one subscription.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, target: &PushTarget, urgency: Urgency) -> Result<(), PushError>;
}

// ---------------------------------------------------------------------------
// WebPushSender
// ---------------------------------------------------------------------------

/// Delivers pushes to browser push services over HTTPS.
pub struct WebPushSender {
    client: reqwest::Client,
    key: EncodingKey,
    public_key: String,
    subject: String,
}

impl WebPushSender {
    /// Build a sender from VAPID configuration.
    ///
    /// Fails if the private key is not a valid P-256 PEM.
    pub fn new(config: &VapidConfig) -> Result<Self, PushError> {
        let key = EncodingKey::from_ec_pem(config.private_key_pem.as_bytes())?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            key,
            public_key: config.public_key.clone(),
            subject: config.subject.clone(),
        })
    }

    /// Sign a VAPID token for the origin of `endpoint`.
    pub fn vapid_token(&self, endpoint: &str, now: i64) -> Result<String, PushError> {
        let claims = VapidClaims {
            aud: endpoint_origin(endpoint)?,
            exp: now + VAPID_TOKEN_TTL_SECS,
            sub: self.subject.clone(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::ES256), &claims, &self.key)?;
        Ok(token)
    }

    /// `Authorization` header value for a request to `endpoint`.
    pub fn authorization(&self, endpoint: &str, now: i64) -> Result<String, PushError> {
        let token = self.vapid_token(endpoint, now)?;
        Ok(format!("vapid t={token}, k={}", self.public_key))
    }
}

#[async_trait]
impl PushSender for WebPushSender {
    async fn send(&self, target: &PushTarget, urgency: Urgency) -> Result<(), PushError> {
        let now = chrono::Utc::now().timestamp();
        let authorization = self.authorization(&target.endpoint, now)?;

        let response = self
            .client
            .post(&target.endpoint)
            .header("Authorization", authorization)
            .header("TTL", MESSAGE_TTL_SECS.to_string())
            .header("Urgency", urgency.as_header())
            .header("Content-Length", "0")
            .send()
            .await?;

        classify_status(response.status())
    }
}

/// Map a push service response status to a delivery result.
fn classify_status(status: StatusCode) -> Result<(), PushError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::NOT_FOUND | StatusCode::GONE => Err(PushError::Gone),
        s => Err(PushError::HttpStatus(s.as_u16())),
    }
}

/// The `scheme://host[:port]` origin of a push endpoint.
pub fn endpoint_origin(endpoint: &str) -> Result<String, PushError> {
    let url = Url::parse(endpoint).map_err(|e| PushError::InvalidEndpoint(e.to_string()))?;
    if url.scheme() != "https" {
        return Err(PushError::InvalidEndpoint(format!(
            "scheme must be https, got {}",
            url.scheme()
        )));
    }
    Ok(url.origin().ascii_serialization())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
