use mockall::mock;
use tnpg_auth::{IpnNotification, IpnProcessingError, IpnProcessor};

mock! {
    pub IpnProcessor {}
    impl IpnProcessor for IpnProcessor {
        async fn process(&self, notification: IpnNotification) -> Result<(), IpnProcessingError>;
    }
}
