use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::json;
use tnpg_auth::{IpnProcessingError, PaymentStatus};

use super::{
    helpers::{call_ipn, gateway_config, server_config, SignedCall},
    mocks::MockIpnProcessor,
};

const ACK: &str = r#"{"success":true,"message":"Notification received."}"#;

fn notification() -> String {
    json!({
        "order_id": "ORDER-12345",
        "transaction_id": "TXN-98765",
        "status": "SUCCESS",
        "amount": 1000,
        "currency": "BDT"
    })
    .to_string()
}

#[actix_web::test]
async fn authentic_ipn_is_processed() {
    let _ = env_logger::try_init().ok();
    let mut processor = MockIpnProcessor::new();
    processor
        .expect_process()
        .withf(|n| n.order_id == "ORDER-12345" && n.status == PaymentStatus::Success)
        .times(1)
        .returning(|_| Ok(()));
    let req = SignedCall::new(gateway_config(), "POST", "/ipn", &notification()).test_request();
    let (status, body) = call_ipn(&server_config(), processor, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ACK);
}

#[actix_web::test]
async fn unsigned_ipn_is_acknowledged_but_ignored() {
    let _ = env_logger::try_init().ok();
    let mut processor = MockIpnProcessor::new();
    processor.expect_process().never();
    let req = TestRequest::post().uri("/ipn").set_payload(notification());
    let (status, body) = call_ipn(&server_config(), processor, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ACK);
}

#[actix_web::test]
async fn forged_ipn_is_acknowledged_but_ignored() {
    let _ = env_logger::try_init().ok();
    let mut processor = MockIpnProcessor::new();
    processor.expect_process().never();
    let req = SignedCall::new(gateway_config(), "POST", "/ipn", &notification())
        .with_body(&notification().replace("SUCCESS", "FAILED"))
        .test_request();
    let (status, body) = call_ipn(&server_config(), processor, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ACK);
}

#[actix_web::test]
async fn processor_failure_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut processor = MockIpnProcessor::new();
    processor.expect_process().times(1).returning(|_| Err(IpnProcessingError("order store unavailable".into())));
    let req = SignedCall::new(gateway_config(), "POST", "/ipn", &notification()).test_request();
    let (status, body) = call_ipn(&server_config(), processor, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ACK);
}

#[actix_web::test]
async fn unsigned_ipn_is_processed_when_signatures_are_off() {
    let _ = env_logger::try_init().ok();
    let mut config = server_config();
    config.ipn_signed = false;
    let mut processor = MockIpnProcessor::new();
    processor.expect_process().times(1).returning(|_| Ok(()));
    let req = TestRequest::post().uri("/ipn").set_payload(notification());
    let (status, _) = call_ipn(&config, processor, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn repeated_ipn_is_processed_again() {
    let _ = env_logger::try_init().ok();
    let call = SignedCall::new(gateway_config(), "POST", "/ipn", &notification());
    let mut processor = MockIpnProcessor::new();
    processor.expect_process().times(1).returning(|_| Ok(()));
    let (status, _) = call_ipn(&server_config(), processor, call.test_request()).await;
    assert_eq!(status, StatusCode::OK);
    // A gateway retry carries the original headers and must not be mistaken for a replay
    let mut processor = MockIpnProcessor::new();
    processor.expect_process().times(1).returning(|_| Ok(()));
    let (status, _) = call_ipn(&server_config(), processor, call.test_request()).await;
    assert_eq!(status, StatusCode::OK);
}
