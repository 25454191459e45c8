/*!
 * Error Handling for the BLEO Secret Lifecycle
 *
 * Provides the error taxonomy for secret generation, strength evaluation,
 * rotation policy and secret persistence, with numeric error codes,
 * user-friendly messages and suggested remediation.
 *
 * Errors fall into two channels. Validation and configuration errors
 * propagate to the immediate caller. Operational errors (an unreachable
 * store, a lost compare-and-swap) are captured by the rotation manager and
 * turned into result values.
 */

use std::collections::HashMap;
use thiserror::Error;

/// Error type for all secret lifecycle operations
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Invalid input: {parameter} - expected {expected} - got {actual}")]
    InvalidInput {
        parameter: String,
        expected: String,
        actual: String,
        error_code: u32,
    },

    #[error("Invalid configuration: {setting} - {details}")]
    Configuration {
        setting: String,
        details: String,
        error_code: u32,
    },

    #[error("Secret store unavailable: {operation} - {cause}")]
    StoreUnavailable {
        operation: String,
        cause: String,
        error_code: u32,
    },

    #[error("Rotation race lost: expected rotation count {expected_count}, store holds {found_count}")]
    RaceLoss {
        expected_count: u64,
        found_count: u64,
        error_code: u32,
    },

    #[error("Random number generation failed: {cause}")]
    RandomGeneration { cause: String, error_code: u32 },

    #[error("Key derivation failed: {cause}")]
    KeyDerivation { cause: String, error_code: u32 },

    #[error("Rotation scheduler error: {cause}")]
    Scheduler { cause: String, error_code: u32 },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Error code constants for different error categories
pub mod error_codes {
    // Input errors: 1000-1999
    pub const EMPTY_SECRET: u32 = 1001;
    pub const EMPTY_PASSPHRASE: u32 = 1002;
    pub const SECRET_LENGTH_TOO_SHORT: u32 = 1003;

    // Configuration errors: 2000-2999
    pub const INVALID_ROTATION_INTERVAL: u32 = 2001;
    pub const INVALID_MIN_LENGTH: u32 = 2002;
    pub const INVALID_STRENGTH_THRESHOLD: u32 = 2003;
    pub const INVALID_GRACE_PERIOD: u32 = 2004;
    pub const INVALID_KDF_PARAMETERS: u32 = 2005;
    pub const INVALID_ENVIRONMENT_VALUE: u32 = 2006;
    pub const CONFIG_FILE_UNREADABLE: u32 = 2007;

    // Store errors: 3000-3999
    pub const STORE_READ_FAILED: u32 = 3001;
    pub const STORE_WRITE_FAILED: u32 = 3002;
    pub const STORE_LOCK_FAILED: u32 = 3003;
    pub const STORE_CORRUPTED: u32 = 3004;
    pub const ROTATION_RACE_LOST: u32 = 3005;

    // Generation errors: 4000-4999
    pub const RANDOM_SOURCE_FAILED: u32 = 4001;
    pub const KEY_DERIVATION_FAILED: u32 = 4002;
    pub const GENERATED_SECRET_INSECURE: u32 = 4003;

    // Scheduler errors: 5000-5999
    pub const SCHEDULER_SPAWN_FAILED: u32 = 5001;
    pub const INVALID_CHECK_INTERVAL: u32 = 5002;

    pub const SERIALIZATION_FAILED: u32 = 9001;
}

impl SecretError {
    /// Get the numeric error code for this error
    pub fn error_code(&self) -> u32 {
        match self {
            SecretError::InvalidInput { error_code, .. } => *error_code,
            SecretError::Configuration { error_code, .. } => *error_code,
            SecretError::StoreUnavailable { error_code, .. } => *error_code,
            SecretError::RaceLoss { error_code, .. } => *error_code,
            SecretError::RandomGeneration { error_code, .. } => *error_code,
            SecretError::KeyDerivation { error_code, .. } => *error_code,
            SecretError::Scheduler { error_code, .. } => *error_code,
            SecretError::Serialization(_) => error_codes::SERIALIZATION_FAILED,
        }
    }

    /// Get the error category/type as a string
    pub fn error_type(&self) -> &'static str {
        match self {
            SecretError::InvalidInput { .. } => "InvalidInputError",
            SecretError::Configuration { .. } => "ConfigurationError",
            SecretError::StoreUnavailable { .. } => "StoreUnavailableError",
            SecretError::RaceLoss { .. } => "RaceLossError",
            SecretError::RandomGeneration { .. } => "RandomGenerationError",
            SecretError::KeyDerivation { .. } => "KeyDerivationError",
            SecretError::Scheduler { .. } => "SchedulerError",
            SecretError::Serialization(_) => "SerializationError",
        }
    }

    /// Whether this error is an expected operational failure.
    ///
    /// Operational failures are captured by the rotation manager into result
    /// values; everything else propagates to the caller.
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            SecretError::StoreUnavailable { .. } | SecretError::RaceLoss { .. }
        )
    }

    /// Get a user-friendly error message
    pub fn user_friendly_message(&self) -> String {
        match self {
            SecretError::InvalidInput { parameter, expected, .. } => {
                format!("Invalid value for '{}'. Expected {}.", parameter, expected)
            }
            SecretError::Configuration { setting, .. } => format!(
                "Secret rotation is misconfigured ('{}'). Rotation is disabled until this is fixed.",
                setting
            ),
            SecretError::StoreUnavailable { operation, .. } => format!(
                "The secret store could not complete '{}'. The current secret is unchanged.",
                operation
            ),
            SecretError::RaceLoss { .. } => {
                "Another process rotated the secret first. No further rotation was needed."
                    .to_string()
            }
            SecretError::RandomGeneration { .. } => {
                "Random number generation failed. No secret was generated.".to_string()
            }
            SecretError::KeyDerivation { .. } => {
                "Deriving a secret from the passphrase failed.".to_string()
            }
            SecretError::Scheduler { .. } => {
                "Background rotation checks could not be started.".to_string()
            }
            SecretError::Serialization(_) => {
                "Stored secret data could not be read or written. Data format may be corrupted."
                    .to_string()
            }
        }
    }

    /// Get technical details for debugging
    pub fn technical_details(&self) -> HashMap<String, String> {
        let mut details = HashMap::new();

        details.insert("error_code".to_string(), self.error_code().to_string());
        details.insert("error_type".to_string(), self.error_type().to_string());
        details.insert("timestamp".to_string(), chrono::Utc::now().to_rfc3339());

        match self {
            SecretError::InvalidInput {
                parameter,
                expected,
                actual,
                ..
            } => {
                details.insert("parameter".to_string(), parameter.clone());
                details.insert("expected".to_string(), expected.clone());
                details.insert("actual".to_string(), actual.clone());
            }
            SecretError::Configuration {
                setting,
                details: config_details,
                ..
            } => {
                details.insert("setting".to_string(), setting.clone());
                details.insert("details".to_string(), config_details.clone());
            }
            SecretError::StoreUnavailable {
                operation, cause, ..
            } => {
                details.insert("operation".to_string(), operation.clone());
                details.insert("cause".to_string(), cause.clone());
            }
            SecretError::RaceLoss {
                expected_count,
                found_count,
                ..
            } => {
                details.insert("expected_count".to_string(), expected_count.to_string());
                details.insert("found_count".to_string(), found_count.to_string());
            }
            _ => {
                details.insert("details".to_string(), format!("{:?}", self));
            }
        }

        details
    }

    /// Get suggested remediation steps
    pub fn suggested_remediation(&self) -> Option<String> {
        match self {
            SecretError::InvalidInput { error_code, .. } => match *error_code {
                error_codes::SECRET_LENGTH_TOO_SHORT => {
                    Some("Request a secret of at least 32 characters.".to_string())
                }
                error_codes::EMPTY_PASSPHRASE => {
                    Some("Provide a non-empty, high-entropy passphrase.".to_string())
                }
                _ => None,
            },
            SecretError::Configuration { .. } => Some(
                "Check the BLEO_JWT_* environment variables or the configuration file."
                    .to_string(),
            ),
            SecretError::StoreUnavailable { error_code, .. } => match *error_code {
                error_codes::STORE_LOCK_FAILED => Some(
                    "Another process holds the store lock. Retry after it finishes.".to_string(),
                ),
                error_codes::STORE_CORRUPTED => Some(
                    "Restore the secret store from backup before rotating again.".to_string(),
                ),
                _ => Some(
                    "Check that the secret store is reachable and writable, then retry."
                        .to_string(),
                ),
            },
            SecretError::RandomGeneration { .. } => Some(
                "Check system entropy sources before retrying generation.".to_string(),
            ),
            _ => None,
        }
    }
}

/// Convenience constructors for common error types
impl SecretError {
    pub fn invalid_input(parameter: &str, expected: &str, actual: &str, error_code: u32) -> Self {
        SecretError::InvalidInput {
            parameter: parameter.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            error_code,
        }
    }

    pub fn configuration(setting: &str, details: &str, error_code: u32) -> Self {
        SecretError::Configuration {
            setting: setting.to_string(),
            details: details.to_string(),
            error_code,
        }
    }

    pub fn store_unavailable(operation: &str, cause: &str, error_code: u32) -> Self {
        SecretError::StoreUnavailable {
            operation: operation.to_string(),
            cause: cause.to_string(),
            error_code,
        }
    }

    pub fn race_loss(expected_count: u64, found_count: u64) -> Self {
        SecretError::RaceLoss {
            expected_count,
            found_count,
            error_code: error_codes::ROTATION_RACE_LOST,
        }
    }

    pub fn key_derivation(cause: &str) -> Self {
        SecretError::KeyDerivation {
            cause: cause.to_string(),
            error_code: error_codes::KEY_DERIVATION_FAILED,
        }
    }
}

// From implementations for automatic error conversion
impl From<std::io::Error> for SecretError {
    fn from(err: std::io::Error) -> Self {
        SecretError::store_unavailable(
            "io",
            &format!("IO operation failed: {}", err),
            error_codes::STORE_READ_FAILED,
        )
    }
}

impl From<serde_json::Error> for SecretError {
    fn from(err: serde_json::Error) -> Self {
        SecretError::Serialization(err.to_string())
    }
}

/// Result type alias for secret lifecycle operations
pub type SecretResult<T> = Result<T, SecretError>;
