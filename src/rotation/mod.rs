/*!
 * JWT Secret Rotation
 *
 * Time-based rotation of the signing secret:
 *
 * - [`RotationPolicy`] decides whether rotation is due.
 * - [`RotationManager`] runs a rotation against a secret store and tracks
 *   its state (`NotChecked`, `Current`, `Due`, `Rotating`, `Rotated`,
 *   `Failed`).
 * - [`RotationScheduler`] calls the manager periodically from a background
 *   thread.
 *
 * # Example
 *
 * ```
 * use std::sync::Arc;
 * use bleo_secrets::config::RotationConfig;
 * use bleo_secrets::rotation::RotationManager;
 * use bleo_secrets::store::MemorySecretStore;
 *
 * let store = Arc::new(MemorySecretStore::new());
 * let manager = RotationManager::new(RotationConfig::default(), store).unwrap();
 *
 * // A fresh store has never rotated, so the first check rotates
 * let result = manager.schedule_rotation_check();
 * assert!(result.rotated);
 * assert_eq!(result.rotation_count, Some(1));
 *
 * // Until the interval elapses further checks are no-ops
 * assert!(!manager.rotate(false).rotated);
 * ```
 */

pub mod manager;
pub mod policy;
pub mod scheduler;

#[cfg(test)]
mod tests;

pub use manager::{RotationManager, RotationResult, RotationState, RotationStatus};
pub use policy::RotationPolicy;
pub use scheduler::RotationScheduler;
