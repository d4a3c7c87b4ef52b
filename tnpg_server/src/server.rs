use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use tnpg_auth::{CallbackAcceptor, InMemoryReplayGuard, IpnProcessor, StaticCredentialStore, Verifier};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    middleware::SignatureMiddlewareFactory,
    processor::LoggingIpnProcessor,
    routes::{health, whoami, IpnCallbackRoute, SharedCredentials},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let srv = create_server_instance(config, LoggingIpnProcessor)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// The verifier guarding the `/api` scope. With `replay_cache` on, a signed request is accepted once.
pub fn api_verifier(config: &ServerConfig, credentials: SharedCredentials) -> Verifier<SharedCredentials> {
    let gateway = &config.gateway;
    let verifier = Verifier::new(gateway.protocol, gateway.replay_window, credentials);
    if config.replay_cache {
        verifier.with_replay_guard(InMemoryReplayGuard::new(gateway.replay_window))
    } else {
        verifier
    }
}

/// The acceptor for IPN callbacks. The gateway re-sends a notification with its original headers when it retries, so
/// there is no replay guard here and the processor is expected to be idempotent.
pub fn ipn_acceptor<P: IpnProcessor>(
    config: &ServerConfig,
    credentials: SharedCredentials,
    processor: P,
) -> CallbackAcceptor<SharedCredentials, P> {
    let gateway = &config.gateway;
    let verifier = Verifier::new(gateway.protocol, gateway.replay_window, credentials);
    CallbackAcceptor::new(verifier, processor, config.ipn_signed)
}

pub fn create_server_instance<P>(config: ServerConfig, processor: P) -> Result<Server, ServerError>
where P: IpnProcessor + Send + Sync + 'static {
    config.gateway.validate().map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
    let credentials = Arc::new(StaticCredentialStore::from_config(&config.gateway));
    info!(
        "🔐️ Verifying {} requests for merchant {} (replay window {}s)",
        config.gateway.protocol,
        config.gateway.merchant_id,
        config.gateway.replay_window.max_skew().num_seconds()
    );
    let verifier = Arc::new(api_verifier(&config, Arc::clone(&credentials)));
    let acceptor = web::Data::new(ipn_acceptor(&config, credentials, processor));
    let srv = HttpServer::new(move || {
        // Routes that require a signature
        let api_scope =
            web::scope("/api").wrap(SignatureMiddlewareFactory::new(Arc::clone(&verifier))).service(whoami);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("tnpg::access_log"))
            .app_data(acceptor.clone())
            .service(health)
            .service(IpnCallbackRoute::<P>::new())
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
