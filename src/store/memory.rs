//! In-process secret store

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{SecretStore, StoreDocument};
use crate::error::{error_codes, SecretError, SecretResult};
use crate::secret::{RetiredSecret, RotationMetadata, Secret};

/// Store that keeps the document behind a mutex.
///
/// The compare-and-swap check and the swap happen under one lock, so
/// concurrent rotations through the same instance serialise cleanly.
#[derive(Debug)]
pub struct MemorySecretStore {
    document: Mutex<StoreDocument>,
    available: AtomicBool,
}

impl Default for MemorySecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::with_document(StoreDocument::default())
    }

    /// Start from existing state, e.g. a secret imported from the environment
    pub fn with_document(document: StoreDocument) -> Self {
        Self {
            document: Mutex::new(document),
            available: AtomicBool::new(true),
        }
    }

    /// Start with `secret` active and the given rotation history
    pub fn with_secret(secret: Secret, metadata: RotationMetadata) -> Self {
        Self::with_document(StoreDocument {
            current: Some(secret),
            previous: None,
            metadata,
        })
    }

    /// Simulate the backing service going away or coming back.
    ///
    /// While unavailable every operation fails with `StoreUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn lock(&self, operation: &str) -> SecretResult<MutexGuard<'_, StoreDocument>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(SecretError::store_unavailable(
                operation,
                "memory store marked unavailable",
                error_codes::STORE_READ_FAILED,
            ));
        }
        self.document.lock().map_err(|_| {
            SecretError::store_unavailable(
                operation,
                "store lock poisoned",
                error_codes::STORE_LOCK_FAILED,
            )
        })
    }
}

impl SecretStore for MemorySecretStore {
    fn get_current(&self) -> SecretResult<Option<Secret>> {
        Ok(self.lock("get_current")?.current.clone())
    }

    fn get_previous(&self) -> SecretResult<Option<RetiredSecret>> {
        Ok(self.lock("get_previous")?.previous.clone())
    }

    fn get_metadata(&self) -> SecretResult<RotationMetadata> {
        Ok(self.lock("get_metadata")?.metadata)
    }

    fn snapshot(&self) -> SecretResult<StoreDocument> {
        Ok(self.lock("snapshot")?.clone())
    }

    fn set_current(&self, secret: Secret, metadata: RotationMetadata) -> SecretResult<()> {
        self.lock("set_current")?.apply(secret, metadata)
    }
}
