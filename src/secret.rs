//! Signing secret and rotation metadata records
//!
//! A [`Secret`] is the signing key for authentication tokens. Secrets are
//! created by the generator, persisted through a store and superseded on
//! rotation; they are never mutated. The value is zeroed when the secret is
//! dropped and never appears in `Debug` output.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::utils;

/// A signing secret together with its identity and creation time
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    /// Stable identifier, usable as a token `kid` header
    #[zeroize(skip)]
    id: Uuid,

    /// The secret value itself
    value: String,

    /// When the secret was generated
    #[zeroize(skip)]
    created_at: DateTime<Utc>,
}

impl Secret {
    /// Wrap a freshly generated value, stamping it with a new id and `now`
    pub fn new(value: String) -> Self {
        Self::with_timestamp(value, Utc::now())
    }

    /// Wrap a value with an explicit creation time
    pub fn with_timestamp(value: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            value,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The secret value. Callers must not log it; use [`Secret::fingerprint`].
    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Length of the value in characters
    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Short SHA-256 based identifier of the value, safe to log
    pub fn fingerprint(&self) -> String {
        utils::fingerprint(&self.value)
    }

    /// Constant-time comparison against a presented value
    pub fn matches(&self, candidate: &str) -> bool {
        utils::secure_compare(&self.value, candidate)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("id", &self.id)
            .field("value", &"[REDACTED]")
            .field("fingerprint", &self.fingerprint())
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.created_at == other.created_at
            && utils::secure_compare(&self.value, &other.value)
    }
}

impl Eq for Secret {}

/// A secret that was superseded by a rotation.
///
/// Kept so tokens signed just before the rotation still verify during the
/// grace window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetiredSecret {
    pub secret: Secret,
    pub retired_at: DateTime<Utc>,
}

impl RetiredSecret {
    /// Whether the secret is still inside its grace window at `now`
    pub fn in_grace(&self, grace_period: Duration, now: DateTime<Utc>) -> bool {
        self.retired_at
            .checked_add_signed(grace_period)
            .map_or(true, |end| now < end)
    }
}

/// Rotation history for the active secret
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationMetadata {
    /// Time of the most recent successful rotation, `None` if never rotated
    pub last_rotation: Option<DateTime<Utc>>,

    /// Number of successful rotations
    pub rotation_count: u64,
}

impl RotationMetadata {
    pub fn new(last_rotation: DateTime<Utc>, rotation_count: u64) -> Self {
        Self {
            last_rotation: Some(last_rotation),
            rotation_count,
        }
    }

    /// Next due time, derived from the last rotation and the interval.
    ///
    /// `None` if never rotated, or if the due time is past the representable
    /// range.
    pub fn next_rotation(&self, interval: Duration) -> Option<DateTime<Utc>> {
        self.last_rotation
            .and_then(|last| last.checked_add_signed(interval))
    }

    /// Metadata recording one more successful rotation at `now`
    pub fn advance(&self, now: DateTime<Utc>) -> Self {
        Self {
            last_rotation: Some(now),
            rotation_count: self.rotation_count + 1,
        }
    }
}
