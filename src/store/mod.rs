/*!
 * Secret Persistence
 *
 * The rotation core reads and writes the active secret through the
 * [`SecretStore`] trait. The store is the single source of truth shared by
 * every process using it, and its [`SecretStore::set_current`] write is the
 * only serialisation point for rotations.
 */

pub mod file;
pub mod memory;


use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{SecretError, SecretResult};
use crate::secret::{RetiredSecret, RotationMetadata, Secret};

pub use file::FileSecretStore;
pub use memory::MemorySecretStore;

/// Persistence adapter for the signing secret and its rotation metadata
pub trait SecretStore: Send + Sync {
    /// The active signing secret, if one was ever stored
    fn get_current(&self) -> SecretResult<Option<Secret>>;

    /// The secret superseded by the most recent rotation
    fn get_previous(&self) -> SecretResult<Option<RetiredSecret>>;

    fn get_metadata(&self) -> SecretResult<RotationMetadata>;

    /// Current secret, previous secret and metadata from a single read.
    ///
    /// Consumers that need more than one of these must use this instead of
    /// combining the individual getters, which may straddle a rotation.
    fn snapshot(&self) -> SecretResult<StoreDocument>;

    /// Atomically install `secret` and `metadata`.
    ///
    /// This is a compare-and-swap on the rotation count: the write is accepted
    /// only when `metadata.rotation_count` is exactly one more than the stored
    /// count, and fails with `RaceLoss` otherwise. On success the previous
    /// current secret becomes the retired secret. On any failure nothing
    /// changes.
    fn set_current(&self, secret: Secret, metadata: RotationMetadata) -> SecretResult<()>;
}

/// Everything a store persists, swapped as one unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDocument {
    pub current: Option<Secret>,
    pub previous: Option<RetiredSecret>,
    pub metadata: RotationMetadata,
}

impl StoreDocument {
    /// Apply a rotation if `metadata` is the direct successor of the stored one
    pub fn apply(&mut self, secret: Secret, metadata: RotationMetadata) -> SecretResult<()> {
        let stored = self.metadata.rotation_count;
        if metadata.rotation_count != stored + 1 {
            return Err(SecretError::race_loss(
                metadata.rotation_count.saturating_sub(1),
                stored,
            ));
        }

        let retired_at = metadata.last_rotation.unwrap_or_else(Utc::now);
        self.previous = self
            .current
            .take()
            .map(|secret| RetiredSecret { secret, retired_at });
        self.current = Some(secret);
        self.metadata = metadata;
        Ok(())
    }
}
