//! Rotation Policy
//!
//! Decides whether the active secret is due for rotation.

use chrono::{DateTime, Duration, Utc};

use crate::config::{RotationConfig, MAX_ROTATION_INTERVAL_DAYS};
use crate::error::{error_codes, SecretError, SecretResult};
use crate::secret::RotationMetadata;

/// Time-based rotation policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RotationPolicy {
    interval: Duration,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::days(90),
        }
    }
}

impl RotationPolicy {
    /// Create a policy rotating every `interval`.
    ///
    /// # Errors
    ///
    /// `Configuration` when the interval is not positive or longer than
    /// [`MAX_ROTATION_INTERVAL_DAYS`].
    pub fn new(interval: Duration) -> SecretResult<Self> {
        if interval <= Duration::zero() || interval.num_days() > MAX_ROTATION_INTERVAL_DAYS {
            return Err(invalid_interval(&format!("{}s", interval.num_seconds())));
        }
        Ok(Self { interval })
    }

    /// Create a policy that rotates every N days.
    pub fn every_days(days: i64) -> SecretResult<Self> {
        let interval = Duration::try_days(days)
            .ok_or_else(|| invalid_interval(&format!("{} days", days)))?;
        Self::new(interval)
    }

    pub fn from_config(config: &RotationConfig) -> SecretResult<Self> {
        Self::new(config.rotation_interval())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Due when `now >= last_rotation + interval`; a secret that was never
    /// rotated is always due. A due time past the representable range is
    /// never reached.
    pub fn is_due(&self, metadata: &RotationMetadata, now: DateTime<Utc>) -> bool {
        match metadata.last_rotation {
            None => true,
            Some(_) => metadata
                .next_rotation(self.interval)
                .map_or(false, |next| now >= next),
        }
    }

    pub fn next_rotation(&self, metadata: &RotationMetadata) -> Option<DateTime<Utc>> {
        metadata.next_rotation(self.interval)
    }

    /// How far past its due time the rotation is, if it is overdue at all
    pub fn overdue_by(&self, metadata: &RotationMetadata, now: DateTime<Utc>) -> Option<Duration> {
        let next = self.next_rotation(metadata)?;
        if now > next {
            Some(now - next)
        } else {
            None
        }
    }
}

fn invalid_interval(actual: &str) -> SecretError {
    SecretError::configuration(
        "rotation_interval",
        &format!(
            "must be positive and at most {} days, got {}",
            MAX_ROTATION_INTERVAL_DAYS, actual
        ),
        error_codes::INVALID_ROTATION_INTERVAL,
    )
}
