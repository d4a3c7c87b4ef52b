//! # Header assembly
//!
//! Every outbound gateway call carries a fresh set of authentication headers:
//!
//! ```text
//! X-TNPG-TIMESTAMP: <protocol-formatted timestamp>
//! X-TNPG-HOST: <gateway host>
//! X-TNPG-TARGET-API: <path, or "METHOD path">
//! X-TNPG-MERCHANT-ID: <merchant id>
//! X-TNPG-API-KEY: <public api key>
//! X-TNPG-SIGNATURE: <HMAC-SHA256 of the signature string>
//! X-TNPG-DIGEST: <SHA-256 of the body>
//! Content-Type: application/json
//! ```
//!
//! Header sets are never reused: the timestamp, and with it the signature, changes on every call.
use chrono::{DateTime, Utc};
use log::*;
use serde::Serialize;

use crate::{
    canonical::{canonical_body, SigningContext},
    config::GatewayConfig,
    errors::AuthError,
    signer::{encoded_digest, encoded_signature},
};

pub const TIMESTAMP_HEADER: &str = "X-TNPG-TIMESTAMP";
pub const HOST_HEADER: &str = "X-TNPG-HOST";
pub const TARGET_API_HEADER: &str = "X-TNPG-TARGET-API";
pub const MERCHANT_ID_HEADER: &str = "X-TNPG-MERCHANT-ID";
pub const API_KEY_HEADER: &str = "X-TNPG-API-KEY";
pub const SIGNATURE_HEADER: &str = "X-TNPG-SIGNATURE";
pub const DIGEST_HEADER: &str = "X-TNPG-DIGEST";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// The seven headers a verifier needs, in the order they are emitted.
pub const AUTH_HEADERS: [&str; 7] = [
    TIMESTAMP_HEADER,
    HOST_HEADER,
    TARGET_API_HEADER,
    MERCHANT_ID_HEADER,
    API_KEY_HEADER,
    SIGNATURE_HEADER,
    DIGEST_HEADER,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayHeaders {
    pub timestamp: String,
    pub host: String,
    pub target_api: String,
    pub merchant_id: String,
    pub api_key: String,
    pub signature: String,
    pub digest: String,
}

impl GatewayHeaders {
    /// All eight headers, including `Content-Type`, as name/value pairs.
    pub fn to_pairs(&self) -> Vec<(&'static str, &str)> {
        vec![
            (TIMESTAMP_HEADER, self.timestamp.as_str()),
            (HOST_HEADER, self.host.as_str()),
            (TARGET_API_HEADER, self.target_api.as_str()),
            (MERCHANT_ID_HEADER, self.merchant_id.as_str()),
            (API_KEY_HEADER, self.api_key.as_str()),
            (SIGNATURE_HEADER, self.signature.as_str()),
            (DIGEST_HEADER, self.digest.as_str()),
            (CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE),
        ]
    }
}

/// A signed request: the headers, plus the exact body bytes they were computed over. Send `body` as-is; re-encoding
/// the payload would invalidate the digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub headers: GatewayHeaders,
    pub body: String,
}

/// Produces gateway authentication headers for one merchant.
#[derive(Clone, Debug)]
pub struct HeaderAssembler {
    config: GatewayConfig,
}

impl HeaderAssembler {
    /// Fails with [`AuthError::Configuration`] if any credential is blank. An assembler that exists can always sign.
    pub fn new(config: GatewayConfig) -> Result<Self, AuthError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serializes `body` canonically and signs it, using the current time.
    pub fn generate_gateway_headers<B: Serialize + ?Sized>(
        &self,
        method: &str,
        path: &str,
        body: &B,
    ) -> Result<SignedRequest, AuthError> {
        self.generate_gateway_headers_at(Utc::now(), method, path, body)
    }

    pub fn generate_gateway_headers_at<B: Serialize + ?Sized>(
        &self,
        now: DateTime<Utc>,
        method: &str,
        path: &str,
        body: &B,
    ) -> Result<SignedRequest, AuthError> {
        let body = canonical_body(body)?;
        let headers = self.sign_raw_body_at(now, method, path, &body)?;
        Ok(SignedRequest { headers, body })
    }

    /// Signs a body that has already been serialized. The digest covers `body` byte for byte.
    pub fn sign_raw_body_at(
        &self,
        now: DateTime<Utc>,
        method: &str,
        path: &str,
        body: &str,
    ) -> Result<GatewayHeaders, AuthError> {
        let protocol = self.config.protocol;
        let context = SigningContext {
            timestamp: protocol.format_timestamp(now),
            host: protocol.signing_host(&self.config.host),
            target_api: protocol.target_api(method, path),
            merchant_id: self.config.merchant_id.clone(),
            api_key: self.config.api_key.clone(),
        };
        let canonical = context.signature_string()?;
        trace!("🔐️ Signing '{canonical}' ({protocol})");
        let signature = encoded_signature(protocol, &canonical, &self.config.api_secret)?;
        let digest = encoded_digest(protocol, body.as_bytes());
        debug!("🔐️ Signed {} for merchant {}", context.target_api, context.merchant_id);
        let SigningContext { timestamp, host, target_api, merchant_id, api_key } = context;
        Ok(GatewayHeaders { timestamp, host, target_api, merchant_id, api_key, signature, digest })
    }
}
