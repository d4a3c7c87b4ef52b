//! # IPN callback acceptance
//!
//! The gateway retries a notification until it sees a 2xx answer, so callbacks are always acknowledged, even when
//! they could not be processed. Acknowledging is not the same as trusting, though: a callback whose signature does not
//! verify is acknowledged, logged at `error` level and *not* processed.
//!
//! [`CallbackAcceptor::verify_then_process`] reports what happened in a [`CallbackOutcome`].
use chrono::{DateTime, Utc};
use log::*;
use serde::Serialize;
use thiserror::Error;

use crate::{
    credentials::CredentialStore,
    data_objects::IpnNotification,
    verifier::{InboundHeaders, Verifier},
};

#[derive(Debug, Clone, Error)]
#[error("Could not process payment notification: {0}")]
pub struct IpnProcessingError(pub String);

impl From<String> for IpnProcessingError {
    fn from(e: String) -> Self {
        Self(e)
    }
}

/// Business handling of an authenticated payment notification, e.g. updating the order record.
#[allow(async_fn_in_trait)]
pub trait IpnProcessor {
    async fn process(&self, notification: IpnNotification) -> Result<(), IpnProcessingError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CallbackOutcome {
    /// Always true. The HTTP layer answers 200 regardless of the other two fields.
    pub ack_always: bool,
    /// The callback carried a valid signature.
    pub authentic: bool,
    /// The notification was handed to the processor and it succeeded.
    pub processed: bool,
}

impl CallbackOutcome {
    fn new(authentic: bool, processed: bool) -> Self {
        Self { ack_always: true, authentic, processed }
    }
}

pub struct CallbackAcceptor<C, P> {
    verifier: Verifier<C>,
    processor: P,
    require_signature: bool,
}

impl<C, P> CallbackAcceptor<C, P>
where
    C: CredentialStore,
    P: IpnProcessor,
{
    /// `require_signature` says whether the gateway signs its callbacks. When it is false, callbacks are processed
    /// without verification and reported as not authentic.
    pub fn new(verifier: Verifier<C>, processor: P, require_signature: bool) -> Self {
        if !require_signature {
            warn!("📨️ IPN signature checks are disabled. Callbacks will be processed without verification.");
        }
        Self { verifier, processor, require_signature }
    }

    pub async fn verify_then_process(&self, headers: &InboundHeaders, body: &[u8]) -> CallbackOutcome {
        self.verify_then_process_at(headers, body, Utc::now()).await
    }

    pub async fn verify_then_process_at(
        &self,
        headers: &InboundHeaders,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> CallbackOutcome {
        let authentic = if self.require_signature {
            match self.verifier.verify_at(headers, body, now) {
                Ok(verified) => {
                    debug!("📨️ IPN callback from merchant {} is authentic", verified.merchant_id);
                    true
                },
                Err(e) => {
                    error!("🚨️ IPN callback failed verification and will not be processed. [{}] {e}", e.code());
                    return CallbackOutcome::new(false, false);
                },
            }
        } else {
            warn!("📨️ Processing unverified IPN callback.");
            false
        };
        let notification = match serde_json::from_slice::<IpnNotification>(body) {
            Ok(n) => n,
            Err(e) => {
                warn!("📨️ Could not parse IPN body. {e}");
                return CallbackOutcome::new(authentic, false);
            },
        };
        let order_id = notification.order_id.clone();
        let status = notification.status.clone();
        match self.processor.process(notification).await {
            Ok(()) => {
                info!("📨️ IPN for order {order_id} ({status}) processed.");
                CallbackOutcome::new(authentic, true)
            },
            Err(e) => {
                error!("📨️ IPN for order {order_id} ({status}) could not be processed. {e}");
                CallbackOutcome::new(authentic, false)
            },
        }
    }
}
