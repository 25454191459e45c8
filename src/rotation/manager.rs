//! Rotation Manager
//!
//! Orchestrates a rotation: consult the policy, generate and score a new
//! secret, and install it through the store's compare-and-swap write.
//! Store failures never escape as errors; they are reported in
//! [`RotationStatus`] and [`RotationResult`] values so that request-serving
//! and background callers can log and carry on.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::policy::RotationPolicy;
use crate::config::RotationConfig;
use crate::error::{error_codes, SecretError, SecretResult};
use crate::generator::SecretGenerator;
use crate::keyring::Keyring;
use crate::secret::RotationMetadata;
use crate::store::SecretStore;
use crate::strength::StrengthLabel;

/// Where the manager is in its check/rotate cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationState {
    NotChecked,
    Current,
    Due,
    Rotating,
    Rotated,
    Failed,
}

impl fmt::Display for RotationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RotationState::NotChecked => "not_checked",
            RotationState::Current => "current",
            RotationState::Due => "due",
            RotationState::Rotating => "rotating",
            RotationState::Rotated => "rotated",
            RotationState::Failed => "error",
        };
        f.write_str(name)
    }
}

/// Snapshot returned by [`RotationManager::get_status`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationStatus {
    pub status: RotationState,
    pub last_rotation: Option<DateTime<Utc>>,
    pub next_rotation: Option<DateTime<Utc>>,
    pub rotation_count: Option<u64>,
    /// Set when the store could not be read
    pub message: Option<String>,
}

impl RotationStatus {
    pub fn is_error(&self) -> bool {
        self.status == RotationState::Failed
    }
}

/// Outcome of [`RotationManager::rotate`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationResult {
    pub success: bool,
    pub rotated: bool,
    pub message: String,
    pub rotation_count: Option<u64>,
    pub next_rotation: Option<DateTime<Utc>>,
    pub secret_strength: Option<StrengthLabel>,
    pub secret_id: Option<Uuid>,
}

impl RotationResult {
    fn skipped(message: String, metadata: &RotationMetadata, next: Option<DateTime<Utc>>) -> Self {
        Self {
            success: true,
            rotated: false,
            message,
            rotation_count: Some(metadata.rotation_count),
            next_rotation: next,
            secret_strength: None,
            secret_id: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            rotated: false,
            message,
            rotation_count: None,
            next_rotation: None,
            secret_strength: None,
            secret_id: None,
        }
    }
}

/// Drives secret rotation against a [`SecretStore`]
pub struct RotationManager<S: SecretStore> {
    config: RotationConfig,
    policy: RotationPolicy,
    generator: SecretGenerator,
    store: Arc<S>,
    state: Mutex<RotationState>,
    /// Serialises rotations issued through this instance
    rotation_guard: Mutex<()>,
}

impl<S: SecretStore> fmt::Debug for RotationManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotationManager")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .field("state", &self.state())
            .finish()
    }
}

impl<S: SecretStore> RotationManager<S> {
    /// Build a manager from a validated configuration.
    ///
    /// # Errors
    ///
    /// `Configuration` when the configuration is invalid; the manager never
    /// runs with undefined policy.
    pub fn new(config: RotationConfig, store: Arc<S>) -> SecretResult<Self> {
        config.validate()?;
        let policy = RotationPolicy::from_config(&config)?;
        let generator = SecretGenerator::new(&config);

        Ok(Self {
            config,
            policy,
            generator,
            store,
            state: Mutex::new(RotationState::NotChecked),
            rotation_guard: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    pub fn generator(&self) -> &SecretGenerator {
        &self.generator
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn state(&self) -> RotationState {
        *lock_ignoring_poison(&self.state)
    }

    /// Current rotation status; a store failure yields an error status
    pub fn get_status(&self) -> RotationStatus {
        match self.store.get_metadata() {
            Ok(metadata) => {
                let status = if self.policy.is_due(&metadata, Utc::now()) {
                    RotationState::Due
                } else {
                    RotationState::Current
                };
                self.observe(status);

                RotationStatus {
                    status,
                    last_rotation: metadata.last_rotation,
                    next_rotation: self.policy.next_rotation(&metadata),
                    rotation_count: Some(metadata.rotation_count),
                    message: None,
                }
            }
            Err(e) => {
                log::warn!("Cannot read JWT secret rotation status: {}", e);
                self.observe(RotationState::Failed);

                RotationStatus {
                    status: RotationState::Failed,
                    last_rotation: None,
                    next_rotation: None,
                    rotation_count: None,
                    message: Some(e.to_string()),
                }
            }
        }
    }

    /// Whether the active secret is due; `false` when the store is unreachable
    pub fn needs_rotation(&self) -> bool {
        match self.store.get_metadata() {
            Ok(metadata) => self.policy.is_due(&metadata, Utc::now()),
            Err(e) => {
                log::warn!("Cannot check JWT secret rotation: {}", e);
                false
            }
        }
    }

    /// Rotate the signing secret if due, or unconditionally when `force` is set.
    ///
    /// Never returns an error: failures are reported with `success: false`
    /// and leave the stored secret and metadata untouched.
    pub fn rotate(&self, force: bool) -> RotationResult {
        let _guard = lock_ignoring_poison(&self.rotation_guard);
        let prior = self.transition(RotationState::Rotating);
        let now = Utc::now();

        let metadata = match self.store.get_metadata() {
            Ok(metadata) => metadata,
            Err(e) => return self.fail("read rotation metadata", e),
        };

        if !force && !self.policy.is_due(&metadata, now) {
            let restored = match prior {
                RotationState::NotChecked => RotationState::Current,
                other => other,
            };
            self.transition(restored);
            let next = self.policy.next_rotation(&metadata);
            log::debug!(
                "JWT secret rotation not due (count {}, next {:?})",
                metadata.rotation_count,
                next
            );
            return RotationResult::skipped(
                "Rotation not due".to_string(),
                &metadata,
                next,
            );
        }

        let secret = match self.generator.generate_default() {
            Ok(secret) => secret,
            Err(e) => return self.fail("generate secret", e),
        };
        let report = match self.generator.evaluate(&secret) {
            Ok(report) => report,
            Err(e) => return self.fail("evaluate secret", e),
        };
        if !report.is_secure {
            return self.fail(
                "evaluate secret",
                SecretError::RandomGeneration {
                    cause: format!("generated secret scored {} ({})", report.score, report.label),
                    error_code: error_codes::GENERATED_SECRET_INSECURE,
                },
            );
        }

        let secret_id = secret.id();
        let fingerprint = secret.fingerprint();
        let next_metadata = metadata.advance(now);

        match self.store.set_current(secret, next_metadata) {
            Ok(()) => {
                self.transition(RotationState::Rotated);
                let next = self.policy.next_rotation(&next_metadata);
                log::info!(
                    "Rotated JWT secret: id={} fingerprint={} count={} strength={}",
                    secret_id,
                    fingerprint,
                    next_metadata.rotation_count,
                    report.label
                );

                RotationResult {
                    success: true,
                    rotated: true,
                    message: "Secret rotated".to_string(),
                    rotation_count: Some(next_metadata.rotation_count),
                    next_rotation: next,
                    secret_strength: Some(report.label),
                    secret_id: Some(secret_id),
                }
            }
            Err(e @ SecretError::RaceLoss { .. }) => {
                self.transition(RotationState::Current);
                log::warn!("JWT secret rotation skipped: {}", e);
                let current = self.store.get_metadata().unwrap_or(metadata);
                RotationResult::skipped(
                    "Secret was rotated concurrently by another caller".to_string(),
                    &current,
                    self.policy.next_rotation(&current),
                )
            }
            Err(e) => self.fail("store new secret", e),
        }
    }

    /// Periodic entry point: rotate only if due, warn when overdue.
    pub fn schedule_rotation_check(&self) -> RotationResult {
        if let Ok(metadata) = self.store.get_metadata() {
            if let Some(overdue) = self.policy.overdue_by(&metadata, Utc::now()) {
                log::warn!(
                    "JWT secret rotation overdue by {} hours (count {})",
                    overdue.num_hours(),
                    metadata.rotation_count
                );
            }
        }
        self.rotate(false)
    }

    /// Current and in-grace previous secrets for token signing and verification
    pub fn keyring(&self) -> SecretResult<Keyring> {
        Keyring::load(self.store.as_ref(), self.config.grace_period())
    }

    fn fail(&self, operation: &str, error: SecretError) -> RotationResult {
        self.transition(RotationState::Failed);
        log::warn!("JWT secret rotation failed to {}: {}", operation, error);
        RotationResult::failed(format!("Failed to {}: {}", operation, error))
    }

    /// Set the state, returning the previous one
    fn transition(&self, next: RotationState) -> RotationState {
        let mut state = lock_ignoring_poison(&self.state);
        std::mem::replace(&mut *state, next)
    }

    /// Record a status read without clobbering an in-flight rotation
    fn observe(&self, observed: RotationState) {
        let mut state = lock_ignoring_poison(&self.state);
        if *state != RotationState::Rotating {
            *state = observed;
        }
    }
}

// Neither guarded value can be left half-updated by a panic
fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
