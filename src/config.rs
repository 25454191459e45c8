/*!
 * Rotation Configuration
 *
 * Externally configurable values for the secret lifecycle. A configuration
 * is loaded once at process start (from the environment or a JSON file),
 * validated, and then passed by reference to everything that needs it.
 * Invalid values fail fast with a configuration error instead of silently
 * weakening the generated secrets.
 */

use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{error_codes, SecretError, SecretResult};

/// Smallest minimum-length setting accepted by [`RotationConfig::validate`]
pub const MIN_CONFIGURABLE_LENGTH: usize = 16;

/// Shortest secret the generator will ever produce
pub const MIN_SAFE_LENGTH: usize = 32;

/// Default length of generated secrets
pub const DEFAULT_SECRET_LENGTH: usize = 64;

/// Shortest salt accepted for passphrase derivation
pub const MIN_SALT_LENGTH: usize = 8;

/// Longest accepted rotation interval (ten years)
pub const MAX_ROTATION_INTERVAL_DAYS: i64 = 3650;

const ENV_INTERVAL_DAYS: &str = "BLEO_JWT_ROTATION_INTERVAL_DAYS";
const ENV_GRACE_HOURS: &str = "BLEO_JWT_GRACE_PERIOD_HOURS";
const ENV_MIN_LENGTH: &str = "BLEO_JWT_MIN_SECRET_LENGTH";
const ENV_MIN_SCORE: &str = "BLEO_JWT_MIN_STRENGTH_SCORE";
const ENV_SECRET_LENGTH: &str = "BLEO_JWT_SECRET_LENGTH";
const ENV_KDF_SALT: &str = "BLEO_JWT_KDF_SALT";

/// Parameters for passphrase-based derivation (Argon2id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDerivationParams {
    /// Memory cost (in KB)
    pub memory_cost: u32,
    /// Time cost (iterations)
    pub time_cost: u32,
    /// Parallelism factor
    pub parallelism: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KeyDerivationParams {
    /// Low-resource mode for constrained environments and tests
    pub fn low_resource() -> Self {
        Self {
            memory_cost: 19456, // 19 MB
            time_cost: 2,
            parallelism: 1,
        }
    }

    /// High-security mode for recovery passphrases
    pub fn high_security() -> Self {
        Self {
            memory_cost: 262144, // 256 MB
            time_cost: 4,
            parallelism: 8,
        }
    }

    pub(crate) fn to_argon2(self, output_len: usize) -> SecretResult<argon2::Params> {
        argon2::Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(output_len),
        )
        .map_err(|e| {
            SecretError::configuration(
                "kdf",
                &format!("invalid Argon2 parameters: {}", e),
                error_codes::INVALID_KDF_PARAMETERS,
            )
        })
    }
}

/// Configuration for secret generation, scoring and rotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Days between scheduled rotations
    pub rotation_interval_days: i64,

    /// Hours the previous secret stays valid after a rotation
    pub grace_period_hours: i64,

    /// Shortest secret considered secure
    pub min_secret_length: usize,

    /// Lowest strength score (0-100) considered secure
    pub min_strength_score: u8,

    /// Length of secrets produced by rotation
    pub generated_secret_length: usize,

    /// Fixed salt for passphrase derivation
    pub kdf_salt: String,

    pub kdf: KeyDerivationParams,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            rotation_interval_days: 90,
            grace_period_hours: 24,
            min_secret_length: MIN_SAFE_LENGTH,
            min_strength_score: 60,
            generated_secret_length: DEFAULT_SECRET_LENGTH,
            kdf_salt: "bleo-jwt-secret-salt".to_string(),
            kdf: KeyDerivationParams::default(),
        }
    }
}

impl RotationConfig {
    /// Rotation interval as a duration
    pub fn rotation_interval(&self) -> Duration {
        Duration::days(self.rotation_interval_days)
    }

    /// Grace window for the previous secret
    pub fn grace_period(&self) -> Duration {
        Duration::hours(self.grace_period_hours)
    }

    pub fn with_rotation_interval_days(mut self, days: i64) -> Self {
        self.rotation_interval_days = days;
        self
    }

    pub fn with_grace_period_hours(mut self, hours: i64) -> Self {
        self.grace_period_hours = hours;
        self
    }

    pub fn with_kdf(mut self, kdf: KeyDerivationParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Reject configurations that would leave rotation undefined or weak
    pub fn validate(&self) -> SecretResult<()> {
        if self.rotation_interval_days <= 0
            || self.rotation_interval_days > MAX_ROTATION_INTERVAL_DAYS
        {
            return Err(SecretError::configuration(
                "rotation_interval_days",
                &format!(
                    "must be within 1-{}, got {}",
                    MAX_ROTATION_INTERVAL_DAYS, self.rotation_interval_days
                ),
                error_codes::INVALID_ROTATION_INTERVAL,
            ));
        }

        if self.min_secret_length < MIN_CONFIGURABLE_LENGTH {
            return Err(SecretError::configuration(
                "min_secret_length",
                &format!(
                    "must be at least {}, got {}",
                    MIN_CONFIGURABLE_LENGTH, self.min_secret_length
                ),
                error_codes::INVALID_MIN_LENGTH,
            ));
        }

        if self.min_strength_score > 100 {
            return Err(SecretError::configuration(
                "min_strength_score",
                &format!("must be within 0-100, got {}", self.min_strength_score),
                error_codes::INVALID_STRENGTH_THRESHOLD,
            ));
        }

        if self.generated_secret_length < MIN_SAFE_LENGTH
            || self.generated_secret_length < self.min_secret_length
        {
            return Err(SecretError::configuration(
                "generated_secret_length",
                &format!(
                    "must be at least {} and at least min_secret_length ({}), got {}",
                    MIN_SAFE_LENGTH, self.min_secret_length, self.generated_secret_length
                ),
                error_codes::INVALID_MIN_LENGTH,
            ));
        }

        if self.grace_period_hours < 0
            || self.grace_period_hours >= self.rotation_interval_days * 24
        {
            return Err(SecretError::configuration(
                "grace_period_hours",
                &format!(
                    "must be non-negative and shorter than the rotation interval, got {}",
                    self.grace_period_hours
                ),
                error_codes::INVALID_GRACE_PERIOD,
            ));
        }

        if self.kdf_salt.len() < MIN_SALT_LENGTH {
            return Err(SecretError::configuration(
                "kdf_salt",
                &format!("must be at least {} bytes", MIN_SALT_LENGTH),
                error_codes::INVALID_KDF_PARAMETERS,
            ));
        }

        self.kdf.to_argon2(32)?;

        Ok(())
    }

    /// Load from `BLEO_JWT_*` environment variables over the defaults
    pub fn from_env() -> SecretResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> SecretResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(days) = parse_value(&lookup, ENV_INTERVAL_DAYS)? {
            config.rotation_interval_days = days;
        }
        if let Some(hours) = parse_value(&lookup, ENV_GRACE_HOURS)? {
            config.grace_period_hours = hours;
        }
        if let Some(length) = parse_value(&lookup, ENV_MIN_LENGTH)? {
            config.min_secret_length = length;
        }
        if let Some(score) = parse_value(&lookup, ENV_MIN_SCORE)? {
            config.min_strength_score = score;
        }
        if let Some(length) = parse_value(&lookup, ENV_SECRET_LENGTH)? {
            config.generated_secret_length = length;
        }
        if let Some(salt) = lookup(ENV_KDF_SALT) {
            config.kdf_salt = salt;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> SecretResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            SecretError::configuration(
                "config_file",
                &format!("cannot read {}: {}", path.display(), e),
                error_codes::CONFIG_FILE_UNREADABLE,
            )
        })?;

        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            SecretError::configuration(
                "config_file",
                &format!("cannot parse {}: {}", path.display(), e),
                error_codes::CONFIG_FILE_UNREADABLE,
            )
        })?;

        config.validate()?;
        Ok(config)
    }
}

fn parse_value<F, T>(lookup: &F, name: &str) -> SecretResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            SecretError::configuration(
                name,
                &format!("cannot parse '{}'", raw),
                error_codes::INVALID_ENVIRONMENT_VALUE,
            )
        }),
    }
}
