use std::env;

use log::*;
use tnpg_common::{is_blank, Secret};

use crate::{errors::AuthError, protocol::ProtocolVersion, replay::ReplayWindow};

/// Credentials and protocol settings for talking to the upstream gateway.
///
/// Build one at start-up and hand it to [`crate::HeaderAssembler`] and [`crate::Verifier`]. There is deliberately no
/// process-wide instance, so tests can run with as many credential sets as they like.
#[derive(Clone, Debug, Default)]
pub struct GatewayConfig {
    /// The gateway host, e.g. "api-stage.tnextpay.com". A scheme is optional.
    pub host: String,
    pub merchant_id: String,
    pub api_key: String,
    pub api_secret: Secret<String>,
    pub protocol: ProtocolVersion,
    pub replay_window: ReplayWindow,
}

impl GatewayConfig {
    pub fn new(host: &str, merchant_id: &str, api_key: &str, api_secret: Secret<String>) -> Self {
        Self {
            host: host.to_string(),
            merchant_id: merchant_id.to_string(),
            api_key: api_key.to_string(),
            api_secret,
            protocol: ProtocolVersion::default(),
            replay_window: ReplayWindow::default(),
        }
    }

    pub fn with_protocol(mut self, protocol: ProtocolVersion) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_replay_window(mut self, replay_window: ReplayWindow) -> Self {
        self.replay_window = replay_window;
        self
    }

    /// Fails if any of the credentials needed to sign a request is blank.
    pub fn validate(&self) -> Result<(), AuthError> {
        let missing = [
            ("host", is_blank(&self.host)),
            ("merchantId", is_blank(&self.merchant_id)),
            ("apiKey", is_blank(&self.api_key)),
            ("apiSecret", is_blank(self.api_secret.reveal())),
        ]
        .into_iter()
        .filter_map(|(name, blank)| blank.then_some(name))
        .collect::<Vec<_>>();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Configuration(format!("Missing gateway credentials: {}", missing.join(", "))))
        }
    }

    /// Loads the configuration from `TNPG_*` environment variables.
    ///
    /// Missing credentials are an error. The protocol version and replay window fall back to their defaults with a
    /// warning if they are absent or invalid.
    pub fn try_from_env() -> Result<Self, AuthError> {
        let host = required_env("TNPG_HOST")?;
        let merchant_id = required_env("TNPG_MERCHANT_ID")?;
        let api_key = required_env("TNPG_API_KEY")?;
        let api_secret = Secret::new(required_env("TNPG_API_SECRET")?);
        let protocol = env::var("TNPG_PROTOCOL_VERSION")
            .map_err(|_| info!("🪛️ TNPG_PROTOCOL_VERSION is not set. Using {}.", ProtocolVersion::default()))
            .and_then(|s| {
                s.parse::<ProtocolVersion>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for TNPG_PROTOCOL_VERSION. {e}"))
            })
            .unwrap_or_default();
        let replay_window = env::var("TNPG_REPLAY_WINDOW")
            .map_err(|_| {
                info!(
                    "🪛️ TNPG_REPLAY_WINDOW is not set. Using the default value of {} seconds.",
                    ReplayWindow::default().max_skew().num_seconds()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for TNPG_REPLAY_WINDOW. {e}"))
                    .and_then(|secs| {
                        if secs > 0 {
                            Ok(ReplayWindow::from_secs(secs))
                        } else {
                            warn!("🪛️ TNPG_REPLAY_WINDOW must be positive. Ignoring {secs}.");
                            Err(())
                        }
                    })
            })
            .unwrap_or_default();
        let config = Self { host, merchant_id, api_key, api_secret, protocol, replay_window };
        config.validate()?;
        info!("🪛️ Gateway configuration loaded for merchant {} on {} ({})", config.merchant_id, config.host, protocol);
        Ok(config)
    }
}

fn required_env(name: &str) -> Result<String, AuthError> {
    match env::var(name) {
        Ok(s) if !is_blank(&s) => Ok(s.trim().to_string()),
        Ok(_) => Err(AuthError::Configuration(format!("{name} is set but empty"))),
        Err(e) => Err(AuthError::Configuration(format!("{e} [{name}]"))),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn complete_config_is_valid() {
        let config = GatewayConfig::new("api-stage.tnextpay.com", "M12345", "test", Secret::from("test-secret-key"));
        assert!(config.validate().is_ok());
        assert_eq!(config.protocol, ProtocolVersion::V2);
        assert_eq!(config.replay_window.max_skew().num_seconds(), 300);
    }

    #[test]
    fn blank_credentials_are_named() {
        let config = GatewayConfig::new("api-stage.tnextpay.com", " ", "", Secret::from(""));
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            AuthError::Configuration("Missing gateway credentials: merchantId, apiKey, apiSecret".to_string())
        );
    }

    #[test]
    fn secret_is_not_printed() {
        let config = GatewayConfig::new("api-stage.tnextpay.com", "M12345", "test", Secret::from("test-secret-key"));
        let debug = format!("{config:?}");
        assert!(!debug.contains("test-secret-key"));
        assert!(debug.contains("****"));
    }
}
