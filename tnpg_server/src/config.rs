use std::env;

use log::*;
use tnpg_auth::GatewayConfig;
use tnpg_common::parse_boolean_flag;

use crate::errors::ServerError;

const DEFAULT_TNPG_SERVER_HOST: &str = "127.0.0.1";
const DEFAULT_TNPG_SERVER_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Merchant credentials. The same secret signs outbound calls and verifies inbound ones.
    pub gateway: GatewayConfig,
    /// If true, IPN callbacks must carry a valid `X-TNPG-*` signature before they are processed.
    pub ipn_signed: bool,
    /// If true, each signed `/api` request is accepted only once inside the replay window.
    pub replay_cache: bool,
}

impl ServerConfig {
    pub fn new(host: &str, port: u16, gateway: GatewayConfig) -> Self {
        Self { host: host.to_string(), port, gateway, ipn_signed: true, replay_cache: true }
    }

    /// Reads the server settings from the environment. Missing gateway credentials are fatal; everything else falls
    /// back to a default.
    pub fn try_from_env() -> Result<Self, ServerError> {
        let gateway = GatewayConfig::try_from_env().map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
        let host = env::var("TNPG_SERVER_HOST").ok().unwrap_or_else(|| DEFAULT_TNPG_SERVER_HOST.into());
        let port = env::var("TNPG_SERVER_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for TNPG_SERVER_PORT. {e} Using the default, \
                         {DEFAULT_TNPG_SERVER_PORT}, instead."
                    );
                    DEFAULT_TNPG_SERVER_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_TNPG_SERVER_PORT);
        let ipn_signed = parse_boolean_flag(env::var("TNPG_IPN_SIGNED").ok(), true);
        if !ipn_signed {
            warn!("🚨️ TNPG_IPN_SIGNED is off. Payment notifications will be processed without verification.");
        }
        let replay_cache = parse_boolean_flag(env::var("TNPG_REPLAY_CACHE").ok(), true);
        Ok(Self { host, port, gateway, ipn_signed, replay_cache })
    }
}
