//! # TNPG request authentication
//!
//! Signs outbound requests to the TNPG payment gateway and verifies inbound ones, including instant payment
//! notification (IPN) callbacks.
//!
//! The data flow for an outbound call is:
//!
//! ```text
//!   body ──> canonical JSON ──────────────> SHA-256 ────────┐
//!   timestamp|host|target_api|merchant_id|api_key ──> HMAC ─┴──> X-TNPG-* headers ──> HTTP request
//! ```
//!
//! and for an inbound one, headers + raw body go through [`Verifier`], which accepts or rejects the request.
//!
//! Everything here is synchronous and stateless apart from reading the clock, looking up merchant secrets through a
//! [`CredentialStore`] and, optionally, consulting a [`ReplayGuard`]. Signing and verification can be called from any
//! number of threads without coordination.
//!
//! ## Protocol generations
//! Two incompatible generations of the scheme exist. See [`protocol`] for the differences. Pick one with
//! [`ProtocolVersion`]; `V2` is the default.
//!
//! ## Configuration
//! See [`GatewayConfig::try_from_env`] for the environment variables that are read.

pub mod canonical;
pub mod client;
pub mod config;
pub mod credentials;
pub mod data_objects;
pub mod errors;
pub mod headers;
pub mod ipn;
pub mod protocol;
pub mod replay;
pub mod signer;
pub mod verifier;

pub use canonical::{canonical_body, SigningContext};
pub use client::GatewayClient;
pub use config::GatewayConfig;
pub use credentials::{CredentialStore, MerchantCredentials, StaticCredentialStore};
pub use data_objects::{Amount, CustomerInfo, IpnNotification, PaymentOrderRequest, PaymentOrderResponse, PaymentStatus};
pub use errors::{AuthError, GatewayError, VerificationError};
pub use headers::{GatewayHeaders, HeaderAssembler, SignedRequest};
pub use ipn::{CallbackAcceptor, CallbackOutcome, IpnProcessingError, IpnProcessor};
pub use protocol::ProtocolVersion;
pub use replay::{InMemoryReplayGuard, NoReplayGuard, ReplayGuard, ReplayWindow};
pub use verifier::{InboundHeaders, VerifiedRequest, Verifier};
