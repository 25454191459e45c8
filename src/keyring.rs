//! Signing and verification secrets for token consumers
//!
//! Tokens are always signed with the current secret. Verification also
//! accepts the previous secret for a grace window after it was retired, so a
//! rotation does not invalidate sessions issued just before it.

use chrono::{DateTime, Duration, Utc};

use crate::error::SecretResult;
use crate::secret::{RetiredSecret, Secret};
use crate::store::SecretStore;

#[derive(Debug, Clone)]
pub struct Keyring {
    current: Option<Secret>,
    previous: Option<RetiredSecret>,
    grace_period: Duration,
}

impl Keyring {
    pub fn new(
        current: Option<Secret>,
        previous: Option<RetiredSecret>,
        grace_period: Duration,
    ) -> Self {
        Self {
            current,
            previous,
            grace_period,
        }
    }

    /// Snapshot the store's current and previous secrets in one read
    pub fn load<S: SecretStore + ?Sized>(store: &S, grace_period: Duration) -> SecretResult<Self> {
        let document = store.snapshot()?;
        Ok(Self::new(document.current, document.previous, grace_period))
    }

    /// Secret to sign new tokens with
    pub fn signing_secret(&self) -> Option<&Secret> {
        self.current.as_ref()
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Secrets a token may have been signed with at `now`, current first
    pub fn verification_secrets(&self, now: DateTime<Utc>) -> Vec<&Secret> {
        let mut secrets: Vec<&Secret> = self.current.iter().collect();
        if let Some(previous) = &self.previous {
            if previous.in_grace(self.grace_period, now) {
                secrets.push(&previous.secret);
            }
        }
        secrets
    }

    /// Look up a verification secret by id, e.g. from a token `kid` header
    pub fn find(&self, id: uuid::Uuid, now: DateTime<Utc>) -> Option<&Secret> {
        self.verification_secrets(now)
            .into_iter()
            .find(|secret| secret.id() == id)
    }

    /// Whether `candidate` matches any secret valid at `now`.
    ///
    /// Every valid secret is compared so the timing does not reveal which
    /// one matched.
    pub fn accepts(&self, candidate: &str, now: DateTime<Utc>) -> bool {
        self.verification_secrets(now)
            .iter()
            .fold(false, |matched, secret| secret.matches(candidate) | matched)
    }
}
