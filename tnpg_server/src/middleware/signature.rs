//! Signature middleware for Actix Web.
//!
//! Wrap a scope with [`SignatureMiddlewareFactory`] to require the `X-TNPG-*` headers on every call into it. The body
//! is buffered, checked against `X-TNPG-DIGEST` and then handed back to the inner service untouched. The signed
//! target api must name the method and path the request was actually sent to.
//!
//! On success the [`VerifiedRequest`] is stored in the request extensions, so handlers can take it as
//! `web::ReqData<VerifiedRequest>`. Every failure turns into the same 401 response.

use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorBadRequest,
    web,
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use tnpg_auth::{CredentialStore, Verifier};

use crate::{errors::ServerError, helpers::inbound_headers};

pub struct SignatureMiddlewareFactory<C> {
    verifier: Arc<Verifier<C>>,
}

impl<C> SignatureMiddlewareFactory<C> {
    pub fn new(verifier: Arc<Verifier<C>>) -> Self {
        Self { verifier }
    }
}

impl<S, B, C> Transform<S, ServiceRequest> for SignatureMiddlewareFactory<C>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    C: CredentialStore + 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = SignatureMiddlewareService<S, C>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SignatureMiddlewareService { verifier: Arc::clone(&self.verifier), service: Rc::new(service) }))
    }
}

pub struct SignatureMiddlewareService<S, C> {
    verifier: Arc<Verifier<C>>,
    service: Rc<S>,
}

impl<S, B, C> Service<ServiceRequest> for SignatureMiddlewareService<S, C>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    C: CredentialStore + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = Arc::clone(&self.verifier);
        Box::pin(async move {
            trace!("🔐️ Checking signature for request to {}", req.path());
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {:?}", e);
                ErrorBadRequest("Failed to extract request data.")
            })?;
            let headers = inbound_headers(req.headers());
            let verified = verifier
                .verify_route(req.method().as_str(), req.path(), &headers, data.as_ref())
                .map_err(ServerError::from)?;
            trace!("🔐️ Signature check for request ✅️");
            req.extensions_mut().insert(verified);
            req.set_payload(bytes_to_payload(data));
            service.call(req).await
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
