use super::*;
use crate::config::RotationConfig;
use crate::error::{error_codes, SecretError, SecretResult};
use crate::secret::{RetiredSecret, RotationMetadata, Secret};
use crate::store::{MemorySecretStore, SecretStore, StoreDocument};
use crate::strength::StrengthLabel;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Store whose writes always fail, reads pass through
struct WriteFailingStore {
    inner: MemorySecretStore,
}

impl SecretStore for WriteFailingStore {
    fn get_current(&self) -> SecretResult<Option<Secret>> {
        self.inner.get_current()
    }

    fn get_previous(&self) -> SecretResult<Option<RetiredSecret>> {
        self.inner.get_previous()
    }

    fn get_metadata(&self) -> SecretResult<RotationMetadata> {
        self.inner.get_metadata()
    }

    fn snapshot(&self) -> SecretResult<StoreDocument> {
        self.inner.snapshot()
    }

    fn set_current(&self, _secret: Secret, _metadata: RotationMetadata) -> SecretResult<()> {
        Err(SecretError::store_unavailable(
            "set_current",
            "connection reset",
            error_codes::STORE_WRITE_FAILED,
        ))
    }
}

/// Store where another writer always gets in just before our write
struct RacingStore {
    inner: MemorySecretStore,
}

impl SecretStore for RacingStore {
    fn get_current(&self) -> SecretResult<Option<Secret>> {
        self.inner.get_current()
    }

    fn get_previous(&self) -> SecretResult<Option<RetiredSecret>> {
        self.inner.get_previous()
    }

    fn get_metadata(&self) -> SecretResult<RotationMetadata> {
        self.inner.get_metadata()
    }

    fn snapshot(&self) -> SecretResult<StoreDocument> {
        self.inner.snapshot()
    }

    fn set_current(&self, secret: Secret, metadata: RotationMetadata) -> SecretResult<()> {
        let competitor = Secret::new("competing-rotation-secret".to_string());
        self.inner.set_current(competitor, metadata)?;
        self.inner.set_current(secret, metadata)
    }
}

fn store_rotated_days_ago(days: i64, count: u64) -> MemorySecretStore {
    let last = Utc::now() - Duration::days(days);
    MemorySecretStore::with_secret(
        Secret::with_timestamp("initial-signing-secret".to_string(), last),
        RotationMetadata::new(last, count),
    )
}

fn manager_for<S: SecretStore>(store: S) -> RotationManager<S> {
    RotationManager::new(RotationConfig::default(), Arc::new(store))
        .expect("Failed to build rotation manager")
}

#[test]
fn test_initial_state_not_checked() {
    let manager = manager_for(MemorySecretStore::new());
    assert_eq!(manager.state(), RotationState::NotChecked);
}

#[test]
fn test_invalid_config_rejected() {
    let config = RotationConfig::default().with_rotation_interval_days(0);
    let err = RotationManager::new(config, Arc::new(MemorySecretStore::new())).unwrap_err();
    assert_eq!(err.error_code(), error_codes::INVALID_ROTATION_INTERVAL);
}

#[test]
fn test_status_of_fresh_store_is_due() {
    let manager = manager_for(MemorySecretStore::new());
    let status = manager.get_status();

    assert_eq!(status.status, RotationState::Due);
    assert_eq!(status.rotation_count, Some(0));
    assert_eq!(status.last_rotation, None);
    assert_eq!(status.next_rotation, None);
    assert_eq!(manager.state(), RotationState::Due);
}

#[test]
fn test_status_of_recent_rotation_is_current() {
    let manager = manager_for(store_rotated_days_ago(10, 7));
    let status = manager.get_status();

    assert_eq!(status.status, RotationState::Current);
    assert_eq!(status.rotation_count, Some(7));
    let last = status.last_rotation.unwrap();
    assert_eq!(status.next_rotation, Some(last + Duration::days(90)));
    assert!(!status.is_error());
}

#[test]
fn test_needs_rotation_by_age() {
    assert!(manager_for(store_rotated_days_ago(91, 1)).needs_rotation());
    assert!(!manager_for(store_rotated_days_ago(10, 1)).needs_rotation());
}

#[test]
fn test_rotate_not_due_is_noop() {
    let store = Arc::new(store_rotated_days_ago(10, 2));
    let manager = RotationManager::new(RotationConfig::default(), store.clone()).unwrap();
    let before = store.snapshot().unwrap();

    let result = manager.rotate(false);

    assert!(result.success);
    assert!(!result.rotated);
    assert_eq!(result.rotation_count, Some(2));
    assert_eq!(result.secret_strength, None);
    assert_eq!(store.snapshot().unwrap(), before);
    assert_eq!(manager.state(), RotationState::Current);
}

#[test]
fn test_rotate_when_due() {
    let store = Arc::new(store_rotated_days_ago(91, 4));
    let manager = RotationManager::new(RotationConfig::default(), store.clone()).unwrap();

    let result = manager.rotate(false);

    assert!(result.success);
    assert!(result.rotated);
    assert_eq!(result.rotation_count, Some(5));
    assert_eq!(result.secret_strength, Some(StrengthLabel::Excellent));
    assert_eq!(manager.state(), RotationState::Rotated);

    let current = store.get_current().unwrap().unwrap();
    assert_eq!(Some(current.id()), result.secret_id);
    assert_eq!(current.len(), 64);
    let previous = store.get_previous().unwrap().unwrap();
    assert_eq!(previous.secret.expose(), "initial-signing-secret");

    let metadata = store.get_metadata().unwrap();
    assert_eq!(
        result.next_rotation,
        metadata.last_rotation.map(|last| last + Duration::days(90))
    );
    assert!(!manager.needs_rotation());
}

#[test]
fn test_forced_rotations_increment_by_two() {
    let store = Arc::new(store_rotated_days_ago(1, 0));
    let manager = RotationManager::new(RotationConfig::default(), store.clone()).unwrap();

    let first = manager.rotate(true);
    let first_secret = store.get_current().unwrap().unwrap();
    let second = manager.rotate(true);

    assert!(first.rotated && second.rotated);
    assert_eq!(second.rotation_count, Some(2));
    assert_eq!(store.get_metadata().unwrap().rotation_count, 2);

    let previous = store.get_previous().unwrap().unwrap();
    assert_eq!(previous.secret, first_secret);
    assert_eq!(Some(previous.secret.id()), first.secret_id);
}

#[test]
fn test_write_failure_leaves_store_untouched() {
    let inner = store_rotated_days_ago(91, 3);
    let before = inner.snapshot().unwrap();
    let store = Arc::new(WriteFailingStore { inner });
    let manager = RotationManager::new(RotationConfig::default(), store.clone()).unwrap();

    let result = manager.rotate(true);

    assert!(!result.success);
    assert!(!result.rotated);
    assert!(result.message.contains("connection reset"));
    assert_eq!(manager.state(), RotationState::Failed);
    assert_eq!(store.inner.snapshot().unwrap(), before);

    let status = manager.get_status();
    assert_eq!(status.rotation_count, Some(3));
    assert_eq!(status.last_rotation, before.metadata.last_rotation);
}

#[test]
fn test_unavailable_store_reported_not_raised() {
    let store = Arc::new(store_rotated_days_ago(91, 3));
    let manager = RotationManager::new(RotationConfig::default(), store.clone()).unwrap();
    store.set_available(false);

    let status = manager.get_status();
    assert!(status.is_error());
    assert_eq!(status.status.to_string(), "error");
    assert!(status.message.is_some());
    assert_eq!(manager.state(), RotationState::Failed);

    assert!(!manager.needs_rotation());

    let result = manager.schedule_rotation_check();
    assert!(!result.success);
    assert!(!result.rotated);

    store.set_available(true);
    assert_eq!(manager.get_status().status, RotationState::Due);
}

#[test]
fn test_lost_race_is_benign() {
    let store = Arc::new(RacingStore {
        inner: MemorySecretStore::new(),
    });
    let manager = RotationManager::new(RotationConfig::default(), store.clone()).unwrap();

    let result = manager.rotate(false);

    assert!(result.success);
    assert!(!result.rotated);
    assert_eq!(result.rotation_count, Some(1));
    assert_eq!(
        store.get_current().unwrap().unwrap().expose(),
        "competing-rotation-secret"
    );
    assert_eq!(manager.state(), RotationState::Current);
}

#[test]
fn test_schedule_rotation_check_rotates_overdue_secret() {
    let manager = manager_for(store_rotated_days_ago(120, 9));

    let result = manager.schedule_rotation_check();
    assert!(result.rotated);
    assert_eq!(result.rotation_count, Some(10));

    let again = manager.schedule_rotation_check();
    assert!(again.success);
    assert!(!again.rotated);
    assert_eq!(again.rotation_count, Some(10));
}

#[test]
fn test_far_future_last_rotation_degrades_gracefully() {
    let last = DateTime::<Utc>::MAX_UTC - Duration::days(1);
    let store = Arc::new(MemorySecretStore::with_secret(
        Secret::with_timestamp("future-stamped-secret".to_string(), last),
        RotationMetadata::new(last, 4),
    ));
    let manager = RotationManager::new(RotationConfig::default(), store.clone()).unwrap();
    let before = store.snapshot().unwrap();

    let status = manager.get_status();
    assert_eq!(status.status, RotationState::Current);
    assert_eq!(status.rotation_count, Some(4));
    assert_eq!(status.next_rotation, None);
    assert!(!manager.needs_rotation());

    let result = manager.schedule_rotation_check();
    assert!(result.success);
    assert!(!result.rotated);
    assert_eq!(store.snapshot().unwrap(), before);

    // Forcing still replaces the bogus timestamp with a real one
    let forced = manager.rotate(true);
    assert!(forced.rotated);
    assert_eq!(forced.rotation_count, Some(5));
    assert!(forced.next_rotation.is_some());
}

#[test]
fn test_keyring_after_rotation() {
    let manager = manager_for(store_rotated_days_ago(91, 1));
    manager.rotate(false);

    let keyring = manager.keyring().unwrap();
    let now = Utc::now();
    assert!(keyring.accepts("initial-signing-secret", now));
    assert!(!keyring.accepts("initial-signing-secret", now + Duration::hours(25)));
    assert_eq!(keyring.verification_secrets(now).len(), 2);
}

#[test]
fn test_scheduler_runs_and_stops() {
    let store = Arc::new(MemorySecretStore::new());
    let manager =
        Arc::new(RotationManager::new(RotationConfig::default(), store.clone()).unwrap());

    let scheduler = RotationScheduler::spawn(manager.clone(), std::time::Duration::from_millis(10))
        .expect("Failed to start scheduler");

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while store.get_metadata().unwrap().rotation_count == 0 && std::time::Instant::now() < deadline
    {
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert!(scheduler.is_running());
    scheduler.stop();

    // Only the first check was due; later ones were no-ops
    assert_eq!(store.get_metadata().unwrap().rotation_count, 1);
}

#[test]
fn test_scheduler_rejects_zero_cadence() {
    let manager = Arc::new(manager_for(MemorySecretStore::new()));
    let err = RotationScheduler::spawn(manager, std::time::Duration::ZERO).unwrap_err();
    assert_eq!(err.error_code(), error_codes::INVALID_CHECK_INTERVAL);
}
