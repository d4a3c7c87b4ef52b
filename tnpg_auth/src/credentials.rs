//! Merchant credential lookup for the verifying side.
//!
//! The verifier only ever uses the secret it holds for the merchant id a request asserts. Secrets supplied by the
//! caller are never trusted.
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use log::*;
use tnpg_common::Secret;

use crate::config::GatewayConfig;

#[derive(Clone, Debug, Default)]
pub struct MerchantCredentials {
    pub api_key: String,
    pub api_secret: Secret<String>,
}

impl MerchantCredentials {
    pub fn new(api_key: &str, api_secret: Secret<String>) -> Self {
        Self { api_key: api_key.to_string(), api_secret }
    }
}

/// Maps a merchant id to its credentials. Implementations must be safe to read from many threads at once.
pub trait CredentialStore: Send + Sync {
    fn lookup(&self, merchant_id: &str) -> Option<MerchantCredentials>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn lookup(&self, merchant_id: &str) -> Option<MerchantCredentials> {
        self.as_ref().lookup(merchant_id)
    }
}

type CredentialMap = HashMap<String, MerchantCredentials>;

/// An in-memory credential store.
///
/// The map sits behind an `Arc` that is swapped as a whole on every change. Readers clone the `Arc` and work with a
/// snapshot, so a verification running during a rotation sees either the old credential set or the new one.
#[derive(Debug, Default)]
pub struct StaticCredentialStore {
    credentials: RwLock<Arc<CredentialMap>>,
}

impl StaticCredentialStore {
    pub fn new<I>(credentials: I) -> Self
    where I: IntoIterator<Item = (String, MerchantCredentials)> {
        let map = credentials.into_iter().collect::<CredentialMap>();
        Self { credentials: RwLock::new(Arc::new(map)) }
    }

    /// A store holding the single merchant described by `config`.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let creds = MerchantCredentials::new(&config.api_key, config.api_secret.clone());
        Self::new([(config.merchant_id.clone(), creds)])
    }

    fn snapshot(&self) -> Arc<CredentialMap> {
        match self.credentials.read() {
            Ok(map) => Arc::clone(&map),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn swap(&self, map: CredentialMap) {
        let mut guard = match self.credentials.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(map);
    }

    /// Replaces every credential in one step.
    pub fn replace_all<I>(&self, credentials: I)
    where I: IntoIterator<Item = (String, MerchantCredentials)> {
        let map = credentials.into_iter().collect::<CredentialMap>();
        info!("🔐️ Credential store replaced. {} merchants configured.", map.len());
        self.swap(map);
    }

    /// Adds or rotates the credentials of a single merchant.
    pub fn insert(&self, merchant_id: &str, credentials: MerchantCredentials) {
        let mut map = self.snapshot().as_ref().clone();
        map.insert(merchant_id.to_string(), credentials);
        debug!("🔐️ Credentials for merchant {merchant_id} updated.");
        self.swap(map);
    }

    pub fn remove(&self, merchant_id: &str) -> bool {
        let mut map = self.snapshot().as_ref().clone();
        let removed = map.remove(merchant_id).is_some();
        if removed {
            debug!("🔐️ Credentials for merchant {merchant_id} removed.");
            self.swap(map);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStore for StaticCredentialStore {
    fn lookup(&self, merchant_id: &str) -> Option<MerchantCredentials> {
        self.snapshot().get(merchant_id).cloned()
    }
}
