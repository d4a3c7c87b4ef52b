use actix_web::http::StatusCode;
use serde_json::json;
use tnpg_common::Secret;

use super::helpers::{call_api, gateway_config, server_config, SignedCall, MERCHANT_ID};

const UNAUTHORIZED: &str = r#"{"error":"Unauthorized"}"#;

fn body() -> String {
    json!({ "order_id": "ORDER-12345", "amount": 1000, "currency": "BDT" }).to_string()
}

#[actix_web::test]
async fn signed_request_reaches_handler() {
    let _ = env_logger::try_init().ok();
    let req = SignedCall::new(gateway_config(), "POST", "/api/whoami", &body()).test_request();
    let results = call_api(&server_config(), vec![req]).await;
    let (status, body) = &results[0];
    assert_eq!(*status, StatusCode::OK);
    assert_eq!(body, &format!(r#"{{"merchant_id":"{MERCHANT_ID}","target_api":"POST /api/whoami"}}"#));
}

#[actix_web::test]
async fn signed_get_without_body() {
    let _ = env_logger::try_init().ok();
    let call = SignedCall::new(gateway_config(), "GET", "/api/whoami", "");
    let results = call_api(&server_config(), vec![call.test_request()]).await;
    assert_eq!(results[0].0, StatusCode::OK);
}

#[actix_web::test]
async fn unsigned_request_is_rejected() {
    let _ = env_logger::try_init().ok();
    let req = actix_web::test::TestRequest::post().uri("/api/whoami").set_payload(body());
    let results = call_api(&server_config(), vec![req]).await;
    assert_eq!(results[0], (StatusCode::UNAUTHORIZED, UNAUTHORIZED.to_string()));
}

#[actix_web::test]
async fn tampered_body_is_rejected() {
    let _ = env_logger::try_init().ok();
    let req = SignedCall::new(gateway_config(), "POST", "/api/whoami", &body()).with_body(&body().replace("1000", "1"));
    let req = req.test_request();
    let results = call_api(&server_config(), vec![req]).await;
    assert_eq!(results[0], (StatusCode::UNAUTHORIZED, UNAUTHORIZED.to_string()));
}

#[actix_web::test]
async fn wrong_secret_is_rejected() {
    let _ = env_logger::try_init().ok();
    let mut config = gateway_config();
    config.api_secret = Secret::from("not-the-secret");
    let req = SignedCall::new(config, "POST", "/api/whoami", &body()).test_request();
    let results = call_api(&server_config(), vec![req]).await;
    // Same answer as for a tampered body
    assert_eq!(results[0], (StatusCode::UNAUTHORIZED, UNAUTHORIZED.to_string()));
}

#[actix_web::test]
async fn unknown_merchant_is_rejected() {
    let _ = env_logger::try_init().ok();
    let mut config = gateway_config();
    config.merchant_id = "MERCHANT-999".into();
    let req = SignedCall::new(config, "POST", "/api/whoami", &body()).test_request();
    let results = call_api(&server_config(), vec![req]).await;
    assert_eq!(results[0], (StatusCode::UNAUTHORIZED, UNAUTHORIZED.to_string()));
}

#[actix_web::test]
async fn replayed_request_is_rejected() {
    let _ = env_logger::try_init().ok();
    let call = SignedCall::new(gateway_config(), "POST", "/api/whoami", &body());
    let results = call_api(&server_config(), vec![call.test_request(), call.test_request()]).await;
    assert_eq!(results[0].0, StatusCode::OK);
    assert_eq!(results[1], (StatusCode::UNAUTHORIZED, UNAUTHORIZED.to_string()));
}

#[actix_web::test]
async fn repeats_allowed_without_replay_cache() {
    let _ = env_logger::try_init().ok();
    let mut config = server_config();
    config.replay_cache = false;
    let call = SignedCall::new(gateway_config(), "POST", "/api/whoami", &body());
    let results = call_api(&config, vec![call.test_request(), call.test_request()]).await;
    assert!(results.iter().all(|(status, _)| *status == StatusCode::OK));
}

#[actix_web::test]
async fn request_signed_for_another_route_is_rejected() {
    let _ = env_logger::try_init().ok();
    let mut config = server_config();
    config.replay_cache = false;
    let call = SignedCall::new(gateway_config(), "POST", "/api/refund", &body()).with_path("/api/whoami");
    let results = call_api(&config, vec![call.test_request()]).await;
    assert_eq!(results[0], (StatusCode::UNAUTHORIZED, UNAUTHORIZED.to_string()));
}

#[actix_web::test]
async fn request_signed_for_another_method_is_rejected() {
    let _ = env_logger::try_init().ok();
    let call = SignedCall::new(gateway_config(), "POST", "/api/whoami", "").with_method("GET");
    let results = call_api(&server_config(), vec![call.test_request()]).await;
    assert_eq!(results[0], (StatusCode::UNAUTHORIZED, UNAUTHORIZED.to_string()));
}

#[actix_web::test]
async fn two_bodies_in_the_same_second_are_both_accepted() {
    let _ = env_logger::try_init().ok();
    let first = SignedCall::new(gateway_config(), "POST", "/api/whoami", r#"{"order_id":"A"}"#);
    let second = SignedCall::new(gateway_config(), "POST", "/api/whoami", r#"{"order_id":"B"}"#);
    let results =
        call_api(&server_config(), vec![first.test_request(), second.test_request(), first.test_request()]).await;
    assert_eq!(results[0].0, StatusCode::OK);
    assert_eq!(results[1].0, StatusCode::OK);
    assert_eq!(results[2], (StatusCode::UNAUTHORIZED, UNAUTHORIZED.to_string()));
}
