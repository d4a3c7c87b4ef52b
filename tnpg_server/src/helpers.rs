use actix_web::http::header::HeaderMap;
use log::trace;
use tnpg_auth::InboundHeaders;

/// Copies the request headers into the form the verifier expects. Values that are not valid visible ASCII are
/// dropped, which the verifier then reports as a missing header.
pub fn inbound_headers(headers: &HeaderMap) -> InboundHeaders {
    headers
        .iter()
        .filter_map(|(name, value)| match value.to_str() {
            Ok(v) => Some((name.as_str(), v)),
            Err(_) => {
                trace!("Ignoring non-ascii value for header {}", name.as_str());
                None
            },
        })
        .collect()
}

#[cfg(test)]
mod test {
    use actix_web::http::header::{HeaderName, HeaderValue};

    use super::*;

    #[test]
    fn header_names_are_case_insensitive() {
        let mut map = HeaderMap::new();
        map.insert(HeaderName::from_static("x-tnpg-merchant-id"), HeaderValue::from_static("M1"));
        map.insert(HeaderName::from_static("x-tnpg-host"), HeaderValue::from_bytes(b"\xff\xfe").unwrap());
        let headers = inbound_headers(&map);
        assert_eq!(headers.get("X-TNPG-MERCHANT-ID"), Some("M1"));
        assert_eq!(headers.get("X-TNPG-HOST"), None);
    }
}
