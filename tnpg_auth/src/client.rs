use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
    Method,
    Request,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::GatewayConfig,
    data_objects::{PaymentOrderRequest, PaymentOrderResponse},
    errors::{AuthError, GatewayError},
    headers::{GatewayHeaders, HeaderAssembler},
    protocol::qualify_host,
};

pub const PAYMENT_ORDER_PATH: &str = "/payment/api/v1/merchant/payment-order";

/// A thin client for the upstream gateway. Each call is signed with fresh headers just before it is sent.
///
/// Timeouts and retries are left to the caller; a failed call is reported, never repeated.
#[derive(Clone)]
pub struct GatewayClient {
    assembler: HeaderAssembler,
    client: Arc<Client>,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let assembler = HeaderAssembler::new(config)?;
        let client = Client::builder().build().map_err(|e| GatewayError::Initialization(e.to_string()))?;
        Ok(Self { assembler, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", qualify_host(&self.assembler.config().host))
    }

    /// Builds, but does not send, a signed request.
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Request, GatewayError> {
        let signed = self.assembler.generate_gateway_headers(method.as_str(), path, body)?;
        let headers = header_map(&signed.headers)?;
        self.client
            .request(method, self.url(path))
            .headers(headers)
            .body(signed.body)
            .build()
            .map_err(|e| GatewayError::RestRequestError(e.to_string()))
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let request = self.build_request(method, path, body)?;
        trace!("Sending signed gateway request: {} {}", request.method(), request.url());
        let response = self.client.execute(request).await.map_err(|e| GatewayError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("Gateway request successful. {}", response.status());
            response.json::<T>().await.map_err(|e| GatewayError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayError::RestResponseError(e.to_string()))?;
            Err(GatewayError::QueryError { status, message })
        }
    }

    pub async fn initiate_payment(&self, order: &PaymentOrderRequest) -> Result<PaymentOrderResponse, GatewayError> {
        debug!("Initiating payment for order {} ({} {})", order.order_id, order.amount, order.currency);
        let result = self.rest_query::<PaymentOrderResponse, _>(Method::POST, PAYMENT_ORDER_PATH, order).await?;
        info!("Payment order {} accepted by the gateway", order.order_id);
        Ok(result)
    }
}

fn header_map(headers: &GatewayHeaders) -> Result<HeaderMap, GatewayError> {
    let pairs = headers.to_pairs();
    let mut map = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| GatewayError::RestRequestError(e.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| AuthError::Signing(format!("{name} cannot be sent as a header value. {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}
