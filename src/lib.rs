/*!
 * BLEO JWT Secret Management
 *
 * Lifecycle of the symmetric secret used to sign and verify the BLEO
 * backend's JSON Web Tokens:
 *
 * - Strength scoring of candidate secrets (length, character classes,
 *   common patterns and known leaked values)
 * - Generation of new secrets from the operating system's random source or
 *   deterministically from a passphrase
 * - Time-based rotation with an atomic compare-and-swap write, so that
 *   concurrent rotations from several processes produce exactly one new secret
 * - A grace window during which tokens signed with the previous secret still
 *   verify
 *
 * The store is the single source of truth; the [`rotation::RotationManager`]
 * holds no secret material of its own.
 */

/// Error types and numeric error codes
pub mod error;

/// Rotation and generation settings, loaded from the environment or a file
pub mod config;

/// Secret values and rotation metadata
pub mod secret;

/// Scoring of candidate secrets
pub mod strength;

/// Random and passphrase-derived secret generation
pub mod generator;

/// Persistence of the active and previous secret
pub mod store;

/// Rotation policy, manager and background scheduler
pub mod rotation;

/// Signing and verification secrets for token consumers
pub mod keyring;

/// Random bytes, constant-time comparison and fingerprints
pub mod utils;

pub use config::{KeyDerivationParams, RotationConfig};
pub use error::{SecretError, SecretResult};
pub use generator::{generate_secret, SecretGenerator};
pub use keyring::Keyring;
pub use rotation::{
    RotationManager, RotationPolicy, RotationResult, RotationScheduler, RotationState,
    RotationStatus,
};
pub use secret::{RetiredSecret, RotationMetadata, Secret};
pub use store::{FileSecretStore, MemorySecretStore, SecretStore};
pub use strength::{SecretStrengthEvaluator, StrengthLabel, StrengthReport};

/// The types most callers need.
///
/// ```
/// use bleo_secrets::prelude::*;
///
/// let evaluator = SecretStrengthEvaluator::default();
/// let report = evaluator.evaluate("password").unwrap();
/// assert_eq!(report.label, StrengthLabel::Weak);
/// assert!(!report.is_secure);
/// ```
pub mod prelude {
    pub use crate::config::{KeyDerivationParams, RotationConfig};
    pub use crate::error::{SecretError, SecretResult};
    pub use crate::generator::{generate_secret, SecretGenerator};
    pub use crate::keyring::Keyring;
    pub use crate::rotation::{
        RotationManager, RotationPolicy, RotationResult, RotationScheduler, RotationState,
        RotationStatus,
    };
    pub use crate::secret::{RetiredSecret, RotationMetadata, Secret};
    pub use crate::store::{FileSecretStore, MemorySecretStore, SecretStore};
    pub use crate::strength::{SecretStrengthEvaluator, StrengthLabel, StrengthReport};
}
