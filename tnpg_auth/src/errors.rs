use thiserror::Error;

/// Errors raised while building an outbound signed request. All of them are fatal for the call in question: a request
/// that could not be signed correctly must never be sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid gateway configuration. {0}")]
    Configuration(String),
    #[error("Required signing field '{0}' is empty.")]
    MissingField(&'static str),
    #[error("Signing field '{0}' contains the '|' delimiter.")]
    DelimiterInField(&'static str),
    #[error("Could not compute request signature. {0}")]
    Signing(String),
    #[error("Could not serialize request body. {0}")]
    BodySerialization(String),
}

/// Reasons an inbound signed request is rejected.
///
/// These are for operator diagnostics only. Anything facing the caller must collapse them into a single generic
/// "unauthorized" answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("Missing authentication headers: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),
    #[error("Timestamp is not in the expected format. {0}")]
    MalformedTimestamp(String),
    #[error("Timestamp is outside the replay window ({skew_secs}s skew).")]
    StaleOrFutureTimestamp { skew_secs: i64 },
    #[error("Authentication header is malformed. {0}")]
    MalformedHeader(String),
    #[error("No credentials are known for merchant {0}.")]
    UnknownMerchant(String),
    #[error("Request signature does not match.")]
    InvalidSignature,
    #[error("Request body digest does not match.")]
    InvalidDigest,
    #[error("Request was signed for '{signed}' but sent to '{actual}'.")]
    TargetMismatch { signed: String, actual: String },
    #[error("Request has already been seen inside the replay window.")]
    Replayed,
}

impl VerificationError {
    /// A short, stable identifier for log lines and alerting rules.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingHeaders(_) => "missing_headers",
            Self::MalformedTimestamp(_) => "malformed_timestamp",
            Self::StaleOrFutureTimestamp { .. } => "stale_or_future_timestamp",
            Self::MalformedHeader(_) => "malformed_header",
            Self::UnknownMerchant(_) => "unknown_merchant",
            Self::InvalidSignature => "invalid_signature",
            Self::InvalidDigest => "invalid_digest",
            Self::TargetMismatch { .. } => "target_mismatch",
            Self::Replayed => "replayed",
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not sign request. {0}")]
    Auth(#[from] AuthError),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}
