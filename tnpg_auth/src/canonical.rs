//! Canonical strings for signing.
//!
//! Two byte strings are signed or hashed for every request:
//!
//! * The signature string, `{timestamp}|{host}|{target_api}|{merchant_id}|{api_key}`. Values are used verbatim.
//! * The body string, the compact JSON encoding of the request body. Both ends must produce exactly the same bytes, so
//!   bodies are modelled as typed structs (see [`crate::data_objects`]): fields serialize in declaration order, with no
//!   whitespace and with whole amounts written as integers.
use serde::Serialize;

use crate::errors::AuthError;

pub const FIELD_DELIMITER: char = '|';

/// The five values that make up the signature string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    pub timestamp: String,
    pub host: String,
    pub target_api: String,
    pub merchant_id: String,
    pub api_key: String,
}

impl SigningContext {
    /// Builds the exact string that is fed to HMAC-SHA256.
    ///
    /// Every field must be non-empty. A field may not contain the delimiter either: otherwise `("a", "b|c", ..)` and
    /// `("a|b", "c", ..)` would produce the same string and hence the same signature.
    pub fn signature_string(&self) -> Result<String, AuthError> {
        let fields = [
            ("timestamp", self.timestamp.as_str()),
            ("host", self.host.as_str()),
            ("target_api", self.target_api.as_str()),
            ("merchant_id", self.merchant_id.as_str()),
            ("api_key", self.api_key.as_str()),
        ];
        for (name, value) in fields {
            if value.is_empty() {
                return Err(AuthError::MissingField(name));
            }
            if value.contains(FIELD_DELIMITER) {
                return Err(AuthError::DelimiterInField(name));
            }
        }
        Ok(fields.map(|(_, v)| v).join("|"))
    }
}

/// Serializes a request body into its canonical JSON form.
pub fn canonical_body<B: Serialize + ?Sized>(body: &B) -> Result<String, AuthError> {
    serde_json::to_string(body).map_err(|e| AuthError::BodySerialization(e.to_string()))
}
