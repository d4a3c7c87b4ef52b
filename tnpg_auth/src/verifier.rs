//! # Verification of inbound signed requests
//!
//! Given the headers and the raw body of a request, [`Verifier`] decides whether to accept it. The checks run in this
//! order, and each has its own [`VerificationError`]:
//!
//! 1. All seven `X-TNPG-*` headers are present (names are matched case-insensitively).
//! 2. The timestamp parses in this generation's format and lies inside the [`ReplayWindow`].
//! 3. Credentials are known for the asserted merchant id and the asserted api key matches them.
//! 4. The signature and the digest, recomputed with the *stored* secret, match. Both are compared in constant time and
//!    both comparisons always run before either outcome is looked at.
//! 5. The [`ReplayGuard`] has not seen this signature before.
//!
//! Verification holds no mutable state of its own, so a `Verifier` can be shared between any number of threads.
use std::collections::HashMap;

use chrono::{DateTime, SubsecRound, Utc};
use log::*;

use crate::{
    canonical::SigningContext,
    credentials::CredentialStore,
    errors::VerificationError,
    headers::{
        API_KEY_HEADER,
        AUTH_HEADERS,
        DIGEST_HEADER,
        HOST_HEADER,
        MERCHANT_ID_HEADER,
        SIGNATURE_HEADER,
        TARGET_API_HEADER,
        TIMESTAMP_HEADER,
    },
    protocol::ProtocolVersion,
    replay::{NoReplayGuard, ReplayGuard, ReplayWindow},
    signer::{constant_time_eq, encoded_digest, encoded_signature},
};

/// Request headers with case-insensitive lookup.
#[derive(Clone, Debug, Default)]
pub struct InboundHeaders {
    values: HashMap<String, String>,
}

impl InboundHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header. If the name repeats, the first value wins.
    pub fn insert(&mut self, name: &str, value: &str) {
        self.values.entry(name.to_ascii_lowercase()).or_insert_with(|| value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for InboundHeaders {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        iter.into_iter().for_each(|(k, v)| headers.insert(k.as_ref(), v.as_ref()));
        headers
    }
}

/// The identity established by a successful verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedRequest {
    pub merchant_id: String,
    pub api_key: String,
    pub target_api: String,
    pub timestamp: DateTime<Utc>,
}

pub struct Verifier<C> {
    protocol: ProtocolVersion,
    window: ReplayWindow,
    credentials: C,
    replay_guard: Box<dyn ReplayGuard>,
}

impl<C: CredentialStore> Verifier<C> {
    pub fn new(protocol: ProtocolVersion, window: ReplayWindow, credentials: C) -> Self {
        Self { protocol, window, credentials, replay_guard: Box::new(NoReplayGuard) }
    }

    pub fn with_replay_guard<G: ReplayGuard + 'static>(mut self, guard: G) -> Self {
        self.replay_guard = Box::new(guard);
        self
    }

    pub fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    /// Verifies the request against the system clock.
    pub fn verify(&self, headers: &InboundHeaders, body: &[u8]) -> Result<VerifiedRequest, VerificationError> {
        self.verify_at(headers, body, Utc::now())
    }

    pub fn verify_at(
        &self,
        headers: &InboundHeaders,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<VerifiedRequest, VerificationError> {
        self.log_outcome(headers, self.check(headers, body, None, now))
    }

    /// Like [`Self::verify`], but the signed target api must also name this `method` and `path`. A request signed for
    /// one endpoint cannot then be sent to another.
    pub fn verify_route(
        &self,
        method: &str,
        path: &str,
        headers: &InboundHeaders,
        body: &[u8],
    ) -> Result<VerifiedRequest, VerificationError> {
        self.verify_route_at(method, path, headers, body, Utc::now())
    }

    pub fn verify_route_at(
        &self,
        method: &str,
        path: &str,
        headers: &InboundHeaders,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<VerifiedRequest, VerificationError> {
        let target = self.protocol.target_api(method, path);
        self.log_outcome(headers, self.check(headers, body, Some(&target), now))
    }

    fn log_outcome(
        &self,
        headers: &InboundHeaders,
        result: Result<VerifiedRequest, VerificationError>,
    ) -> Result<VerifiedRequest, VerificationError> {
        match &result {
            Ok(req) => debug!("🔐️ Signed request from merchant {} for {} verified", req.merchant_id, req.target_api),
            Err(e) => warn!(
                "🔐️ Rejected signed request from merchant {}. [{}] {e}",
                headers.get(MERCHANT_ID_HEADER).unwrap_or("<none>"),
                e.code()
            ),
        }
        result
    }

    fn check(
        &self,
        headers: &InboundHeaders,
        body: &[u8],
        expected_target: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<VerifiedRequest, VerificationError> {
        let missing = AUTH_HEADERS
            .iter()
            .filter(|name| headers.get(name).map_or(true, str::is_empty))
            .map(|name| name.to_string())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(VerificationError::MissingHeaders(missing));
        }
        let field = |name: &str| headers.get(name).unwrap_or_default().to_string();
        let context = SigningContext {
            timestamp: field(TIMESTAMP_HEADER),
            host: field(HOST_HEADER),
            target_api: field(TARGET_API_HEADER),
            merchant_id: field(MERCHANT_ID_HEADER),
            api_key: field(API_KEY_HEADER),
        };
        let provided_signature = field(SIGNATURE_HEADER);
        let provided_digest = field(DIGEST_HEADER);

        let timestamp =
            self.protocol.parse_timestamp(&context.timestamp).map_err(VerificationError::MalformedTimestamp)?;
        // Header timestamps carry whole seconds only
        let now = now.trunc_subsecs(0);
        self.window.check(timestamp, now)?;

        let credentials = self
            .credentials
            .lookup(&context.merchant_id)
            .ok_or_else(|| VerificationError::UnknownMerchant(context.merchant_id.clone()))?;
        if !constant_time_eq(credentials.api_key.as_bytes(), context.api_key.as_bytes()) {
            return Err(VerificationError::UnknownMerchant(context.merchant_id.clone()));
        }

        let canonical = context.signature_string().map_err(|e| VerificationError::MalformedHeader(e.to_string()))?;
        let expected_signature = encoded_signature(self.protocol, &canonical, &credentials.api_secret).map_err(|e| {
            error!("🔐️ Stored credentials for merchant {} cannot sign. {e}", context.merchant_id);
            VerificationError::UnknownMerchant(context.merchant_id.clone())
        })?;
        let expected_digest = encoded_digest(self.protocol, body);
        let signature_ok = constant_time_eq(provided_signature.as_bytes(), expected_signature.as_bytes());
        let digest_ok = constant_time_eq(provided_digest.as_bytes(), expected_digest.as_bytes());
        if !signature_ok {
            return Err(VerificationError::InvalidSignature);
        }
        if !digest_ok {
            return Err(VerificationError::InvalidDigest);
        }
        // Must run before the replay guard records the request
        if let Some(expected) = expected_target {
            if context.target_api != expected {
                return Err(VerificationError::TargetMismatch {
                    signed: context.target_api.clone(),
                    actual: expected.to_string(),
                });
            }
        }

        if !self.replay_guard.check_and_record(
            &context.merchant_id,
            &provided_signature,
            &provided_digest,
            timestamp,
            now,
        ) {
            return Err(VerificationError::Replayed);
        }
        let SigningContext { merchant_id, api_key, target_api, .. } = context;
        Ok(VerifiedRequest { merchant_id, api_key, target_api, timestamp })
    }
}
