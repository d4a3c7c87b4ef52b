use std::sync::Arc;

use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use chrono::Utc;
use log::debug;
use tnpg_auth::{GatewayConfig, HeaderAssembler, IpnProcessor, StaticCredentialStore};
use tnpg_common::Secret;

use crate::{
    config::ServerConfig,
    middleware::SignatureMiddlewareFactory,
    routes::{whoami, IpnCallbackRoute},
    server::{api_verifier, ipn_acceptor},
};

pub const MERCHANT_ID: &str = "MERCHANT-001";

// Test credentials only. DO NOT re-use them anywhere.
pub fn gateway_config() -> GatewayConfig {
    GatewayConfig::new("api-stage.tnextpay.com", MERCHANT_ID, "test-api-key", Secret::from("test-secret-key"))
}

pub fn server_config() -> ServerConfig {
    ServerConfig::new("127.0.0.1", 8360, gateway_config())
}

/// The headers and body of a request signed at the current time. Build as many identical `TestRequest`s from it as
/// a test needs.
#[derive(Debug, Clone)]
pub struct SignedCall {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    pub body: String,
}

impl SignedCall {
    pub fn new(config: GatewayConfig, method: &str, path: &str, body: &str) -> Self {
        let headers = HeaderAssembler::new(config)
            .expect("valid test config")
            .sign_raw_body_at(Utc::now(), method, path, body)
            .expect("signing failed");
        let headers = headers.to_pairs().into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Self { method: method.into(), path: path.into(), headers, body: body.into() }
    }

    /// Swaps the body for `body` without re-signing.
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.into();
        self
    }

    /// Sends the request to `path` without re-signing.
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.into();
        self
    }

    /// Sends the request with `method` without re-signing.
    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.into();
        self
    }

    pub fn test_request(&self) -> TestRequest {
        let req = match self.method.as_str() {
            "GET" => TestRequest::get(),
            _ => TestRequest::post(),
        };
        let req = self.headers.iter().fold(req.uri(&self.path), |req, (k, v)| req.insert_header((k.as_str(), v.as_str())));
        req.set_payload(self.body.clone())
    }
}

/// Sends `requests`, in order, to a single app instance serving the signed `/api` scope. Errors are rendered the way
/// the HTTP server would render them.
pub async fn call_api(config: &ServerConfig, requests: Vec<TestRequest>) -> Vec<(StatusCode, String)> {
    let credentials = Arc::new(StaticCredentialStore::from_config(&config.gateway));
    let verifier = Arc::new(api_verifier(config, credentials));
    let app = App::new().service(web::scope("/api").wrap(SignatureMiddlewareFactory::new(verifier)).service(whoami));
    let service = test::init_service(app).await;
    let mut results = Vec::with_capacity(requests.len());
    for req in requests {
        debug!("Making request");
        let result = match test::try_call_service(&service, req.to_request()).await {
            Ok(res) => {
                let status = res.status();
                let body = test::read_body(res).await;
                (status, String::from_utf8_lossy(&body).into_owned())
            },
            Err(e) => {
                let res = e.error_response();
                let status = res.status();
                let body = res.into_body().try_into_bytes().unwrap();
                (status, String::from_utf8_lossy(&body).into_owned())
            },
        };
        results.push(result);
    }
    results
}

/// Sends a single request to an app serving `/ipn` with the given processor.
pub async fn call_ipn<P: IpnProcessor + 'static>(config: &ServerConfig, processor: P, req: TestRequest) -> (StatusCode, String) {
    let credentials = Arc::new(StaticCredentialStore::from_config(&config.gateway));
    let acceptor = web::Data::new(ipn_acceptor(config, credentials, processor));
    let app = App::new().app_data(acceptor).service(IpnCallbackRoute::<P>::new());
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}
