use log::*;
use tnpg_auth::{IpnNotification, IpnProcessingError, IpnProcessor};

/// The processor the server binary runs with. It records each notification in the log and nothing else; an
/// application embedding this crate brings its own [`IpnProcessor`] to [`crate::server::create_server_instance`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingIpnProcessor;

impl IpnProcessor for LoggingIpnProcessor {
    async fn process(&self, notification: IpnNotification) -> Result<(), IpnProcessingError> {
        info!(
            "📨️ Payment notification for order {}: {} (transaction {})",
            notification.order_id,
            notification.status,
            notification.transaction_id.as_deref().unwrap_or("n/a")
        );
        Ok(())
    }
}
