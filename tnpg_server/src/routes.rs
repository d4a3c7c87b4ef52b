//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers that block the current thread stall the whole worker, so anything that waits on I/O must be async. The
//! IPN processor in particular is called from inside the handler and must not block.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use tnpg_auth::{CallbackAcceptor, IpnProcessor, StaticCredentialStore, VerifiedRequest};

use crate::{
    data_objects::{JsonResponse, MerchantIdentity},
    helpers::inbound_headers,
};

/// The credential store type shared by the server's verifiers.
pub type SharedCredentials = std::sync::Arc<StaticCredentialStore>;

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

route!(ipn_callback => Post "/ipn" impl IpnProcessor);
/// Payment notifications from the gateway.
///
/// The answer is always 200, otherwise the gateway keeps retrying. Whether the notification was authentic and
/// processed is only visible in the logs.
pub async fn ipn_callback<P: IpnProcessor>(
    req: HttpRequest,
    body: web::Bytes,
    acceptor: web::Data<CallbackAcceptor<SharedCredentials, P>>,
) -> HttpResponse {
    trace!("📨️ Received IPN callback: {}", req.uri());
    let headers = inbound_headers(req.headers());
    let outcome = acceptor.verify_then_process(&headers, body.as_ref()).await;
    debug!("📨️ IPN callback outcome: {outcome:?}");
    HttpResponse::Ok().json(JsonResponse::success("Notification received."))
}

/// Echoes the identity established by the signature middleware. Only mounted inside the signed `/api` scope.
#[actix_web::route("/whoami", method = "GET", method = "POST")]
pub async fn whoami(verified: web::ReqData<VerifiedRequest>) -> impl Responder {
    let verified = verified.into_inner();
    debug!("💻️ whoami for merchant {}", verified.merchant_id);
    HttpResponse::Ok().json(MerchantIdentity { merchant_id: verified.merchant_id, target_api: verified.target_api })
}
