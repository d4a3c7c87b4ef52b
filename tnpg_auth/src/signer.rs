//! HMAC-SHA256 signatures and SHA-256 body digests.
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::{Choice, ConstantTimeEq};
use tnpg_common::Secret;

use crate::{errors::AuthError, protocol::ProtocolVersion};

type HmacSha256 = Hmac<Sha256>;

/// Computes the raw HMAC-SHA256 of the canonical signature string.
///
/// An empty secret is refused rather than producing a MAC that anybody could forge.
pub fn sign(canonical: &str, secret: &Secret<String>) -> Result<[u8; 32], AuthError> {
    let key = secret.reveal();
    if key.is_empty() {
        return Err(AuthError::Signing("The signing secret is empty.".into()));
    }
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).map_err(|e| AuthError::Signing(e.to_string()))?;
    mac.update(canonical.as_bytes());
    Ok(mac.finalize().into_bytes().into())
}

/// SHA-256 of the body bytes.
pub fn digest(body: &[u8]) -> [u8; 32] {
    Sha256::digest(body).into()
}

/// The signature, encoded for the given protocol generation.
pub fn encoded_signature(
    protocol: ProtocolVersion,
    canonical: &str,
    secret: &Secret<String>,
) -> Result<String, AuthError> {
    sign(canonical, secret).map(|mac| protocol.encode_signature(&mac))
}

/// The body digest, encoded for the given protocol generation.
pub fn encoded_digest(protocol: ProtocolVersion, body: &[u8]) -> String {
    protocol.encode_digest(&digest(body))
}

/// Compares two byte strings without exiting early.
///
/// Every byte position up to the longer of the two inputs is inspected, so neither the position of the first
/// difference nor a length mismatch shortens the comparison.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let same_len = (a.len() as u64).ct_eq(&(b.len() as u64));
    let mut same_bytes = Choice::from(1u8);
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        same_bytes &= x.ct_eq(&y);
    }
    (same_len & same_bytes).into()
}

#[cfg(test)]
mod test {
    use super::*;

    const SIGNATURE_STRING: &str =
        "2026-02-09T07:47:49Z|api-stage.tnextpay.com|/payment/api/v1/merchant/payment-order|M12345|test";

    #[test]
    fn hmac_is_deterministic() {
        let secret = Secret::from("test-secret-key");
        let a = sign(SIGNATURE_STRING, &secret).unwrap();
        let b = sign(SIGNATURE_STRING, &secret).unwrap();
        assert_eq!(a, b);
        assert_eq!(hex::encode(a), "6574ed87e79c8994a490e753e8ed363f7d3a2c7b6289f094875c5a53f739bf7e");
    }

    #[test]
    fn different_secrets_give_different_signatures() {
        let a = sign(SIGNATURE_STRING, &Secret::from("test-secret-key")).unwrap();
        let b = sign(SIGNATURE_STRING, &Secret::from("test-secret-kez")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_secret_fails() {
        let err = sign(SIGNATURE_STRING, &Secret::from("")).unwrap_err();
        assert!(matches!(err, AuthError::Signing(_)));
    }

    #[test]
    fn digest_of_empty_body() {
        assert_eq!(
            encoded_digest(ProtocolVersion::V1, b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(encoded_digest(ProtocolVersion::V2, b""), "SHA-256=47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=");
    }

    #[test]
    fn digest_binding() {
        let a = digest(br#"{"order_id":"ORDER-1"}"#);
        let b = digest(br#"{"order_id":"ORDER-2"}"#);
        assert_ne!(a, b);
        assert_eq!(a, digest(br#"{"order_id":"ORDER-1"}"#));
    }

    #[test]
    fn constant_time_comparison() {
        assert!(constant_time_eq(b"abcdef", b"abcdef"));
        assert!(constant_time_eq(b"", b""));
        assert!(!constant_time_eq(b"abcdef", b"abcdeg"));
        assert!(!constant_time_eq(b"abcdef", b"xbcdef"));
        assert!(!constant_time_eq(b"abcdef", b"abcdefg"));
        assert!(!constant_time_eq(b"abc", b""));
        // Zero padding must not make a prefix look equal
        assert!(!constant_time_eq(b"abc\0", b"abc"));
    }
}
