/*!
 * Signing Secret Generation
 *
 * Secrets are drawn uniformly from letters, digits and a set of symbols that
 * are safe in environment files and JSON. A draw missing any of the four
 * character classes is discarded and redrawn.
 *
 * Two sources feed the same sampler:
 *
 * - Random: a ChaCha20 generator seeded from the operating system.
 * - Passphrase: a ChaCha20 generator seeded by Argon2id over the passphrase
 *   and the configured salt. The same passphrase, salt and cost parameters
 *   always produce the same secret, which allows recovery. The secret is
 *   never stronger than the passphrase behind it.
 */


use argon2::{Algorithm, Argon2, Version};
use rand::distributions::{Distribution, Uniform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroize;

use crate::config::{KeyDerivationParams, RotationConfig, DEFAULT_SECRET_LENGTH, MIN_SAFE_LENGTH};
use crate::error::{error_codes, SecretError, SecretResult};
use crate::secret::Secret;
use crate::strength::{CharacterClasses, SecretStrengthEvaluator, StrengthReport};
use crate::utils;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!#$%&()*+-./:;<=>?@[]^_{|}~";

const SEED_LEN: usize = 32;

/// The full alphabet secrets are drawn from
pub fn charset() -> Vec<u8> {
    [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS].concat()
}

/// Produces new signing secrets
#[derive(Debug, Clone)]
pub struct SecretGenerator {
    evaluator: SecretStrengthEvaluator,
    kdf: KeyDerivationParams,
    salt: Vec<u8>,
    default_length: usize,
    alphabet: Vec<u8>,
}

impl Default for SecretGenerator {
    fn default() -> Self {
        Self::new(&RotationConfig::default())
    }
}

impl SecretGenerator {
    pub fn new(config: &RotationConfig) -> Self {
        Self {
            evaluator: SecretStrengthEvaluator::from_config(config),
            kdf: config.kdf,
            salt: config.kdf_salt.as_bytes().to_vec(),
            default_length: config.generated_secret_length.max(MIN_SAFE_LENGTH),
            alphabet: charset(),
        }
    }

    /// Length used by [`SecretGenerator::generate_default`] and passphrase derivation
    pub fn default_length(&self) -> usize {
        self.default_length
    }

    /// Random secret of the configured default length
    pub fn generate_default(&self) -> SecretResult<Secret> {
        self.generate_random(self.default_length)
    }

    /// Cryptographically secure random secret of `length` characters
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `length` is below the minimum safe length (32),
    /// `RandomGeneration` when the OS generator fails.
    pub fn generate_random(&self, length: usize) -> SecretResult<Secret> {
        check_length(length)?;

        let mut seed = [0u8; SEED_LEN];
        let mut bytes = utils::random_bytes(SEED_LEN)?;
        seed.copy_from_slice(&bytes);
        bytes.zeroize();

        let mut rng = ChaCha20Rng::from_seed(seed);
        seed.zeroize();

        Ok(Secret::new(self.sample(&mut rng, length)))
    }

    /// Deterministic secret derived from a passphrase via Argon2id
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the passphrase is empty, `KeyDerivation` when
    /// Argon2 rejects the parameters.
    pub fn generate_from_passphrase(&self, passphrase: &str) -> SecretResult<Secret> {
        if passphrase.is_empty() {
            return Err(SecretError::invalid_input(
                "passphrase",
                "a non-empty passphrase",
                "an empty string",
                error_codes::EMPTY_PASSPHRASE,
            ));
        }

        let params = self.kdf.to_argon2(SEED_LEN)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut seed = [0u8; SEED_LEN];
        argon2
            .hash_password_into(passphrase.as_bytes(), &self.salt, &mut seed)
            .map_err(|e| SecretError::key_derivation(&e.to_string()))?;

        let mut rng = ChaCha20Rng::from_seed(seed);
        seed.zeroize();

        Ok(Secret::new(self.sample(&mut rng, self.default_length)))
    }

    /// Strength report for a generated secret
    pub fn evaluate(&self, secret: &Secret) -> SecretResult<StrengthReport> {
        self.evaluator.evaluate(secret.expose())
    }

    /// Random secret with its strength report
    pub fn generate_with_report(&self, length: usize) -> SecretResult<(Secret, StrengthReport)> {
        let secret = self.generate_random(length)?;
        let report = self.evaluate(&secret)?;
        Ok((secret, report))
    }

    fn sample<R: Rng>(&self, rng: &mut R, length: usize) -> String {
        let index = Uniform::from(0..self.alphabet.len());
        loop {
            let candidate: Vec<char> = (0..length)
                .map(|_| self.alphabet[index.sample(rng)] as char)
                .collect();
            if CharacterClasses::of(&candidate).is_complete() {
                return candidate.into_iter().collect();
            }
        }
    }
}

fn check_length(length: usize) -> SecretResult<()> {
    if length < MIN_SAFE_LENGTH {
        return Err(SecretError::invalid_input(
            "length",
            &format!("at least {} characters", MIN_SAFE_LENGTH),
            &length.to_string(),
            error_codes::SECRET_LENGTH_TOO_SHORT,
        ));
    }
    Ok(())
}

/// Random secret of the default length (64) using default settings
pub fn generate_secret() -> SecretResult<Secret> {
    SecretGenerator::default().generate_random(DEFAULT_SECRET_LENGTH)
}
