//! Tab-scoped store cache
//!
//! Store records change rarely within one browsing session, so the
//! list and each fetched store are cached in the same session-scoped
//! storage that holds the session blob. Cache trouble is never fatal:
//! a failed read is a miss, a failed write is dropped with a warning.

use krill_core::session::persistence::SessionBackend;
use shared::models::store::Store;
use std::sync::Arc;

/// Key of the cached store list
pub const STORE_LIST_KEY: &str = "stores";

/// Key of one cached store record
pub fn store_key(store_id: &str) -> String {
    format!("store:{}", store_id)
}

/// Read-through cache over the session storage scope
#[derive(Clone)]
pub struct StoreCache {
    backend: Arc<dyn SessionBackend>,
}

impl StoreCache {
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self { backend }
    }

    fn read<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.backend.load(key) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed");
                None
            }
        }
    }

    fn write<T: serde::Serialize>(&self, key: &str, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache encode failed");
                return;
            }
        };
        if let Err(e) = self.backend.save(key, &bytes) {
            tracing::warn!(key = %key, error = %e, "Cache write failed");
        }
    }

    pub fn store_list(&self) -> Option<Vec<Store>> {
        self.read(STORE_LIST_KEY)
    }

    pub fn put_store_list(&self, stores: &[Store]) {
        self.write(STORE_LIST_KEY, &stores);
    }

    pub fn store(&self, store_id: &str) -> Option<Store> {
        self.read(&store_key(store_id))
    }

    pub fn put_store(&self, store: &Store) {
        self.write(&store_key(&store.id), store);
    }
}
