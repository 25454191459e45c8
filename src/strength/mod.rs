/*!
 * Secret Strength Evaluation
 *
 * Scores a candidate signing secret from 0 to 100 along three additive
 * dimensions:
 *
 * - Length: `min(chars, 64) * 40 / 64`, up to 40 points. Passes at the
 *   configured minimum length.
 * - Character classes: 10 points each for uppercase, lowercase, digits and
 *   symbols, up to 40 points. Passes when all four are present.
 * - Patterns: 20 points, minus 7 for each category of weak pattern found
 *   (repeated runs, sequential runs, common words). Passes when none are found.
 *
 * Labels follow the score: 80 and above is excellent, 60 strong, 40 moderate,
 * anything lower weak. A secret is secure when it reaches the minimum score
 * and minimum length and is not a known placeholder value.
 *
 * Evaluation is a pure function of its input.
 */

pub mod patterns;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{RotationConfig, MIN_SAFE_LENGTH};
use crate::error::{error_codes, SecretError, SecretResult};

pub use patterns::PatternKind;

/// Length at which the length dimension reaches its full weight
pub const FULL_LENGTH_SCORE_AT: usize = 64;

pub const LENGTH_WEIGHT: u32 = 40;
pub const CLASS_WEIGHT: u32 = 10;
pub const PATTERN_WEIGHT: u32 = 20;
pub const PATTERN_PENALTY: u32 = 7;

/// Default minimum score for a secret to count as secure
pub const DEFAULT_MIN_SCORE: u8 = 60;

// Approximate alphabet sizes used for the entropy estimate
const UPPER_POOL: f64 = 26.0;
const LOWER_POOL: f64 = 26.0;
const DIGIT_POOL: f64 = 10.0;
const SYMBOL_POOL: f64 = 32.0;

/// Categorical strength, ordered from weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLabel {
    Weak,
    Moderate,
    Strong,
    Excellent,
}

impl StrengthLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => StrengthLabel::Excellent,
            60..=79 => StrengthLabel::Strong,
            40..=59 => StrengthLabel::Moderate,
            _ => StrengthLabel::Weak,
        }
    }
}

impl fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrengthLabel::Weak => "weak",
            StrengthLabel::Moderate => "moderate",
            StrengthLabel::Strong => "strong",
            StrengthLabel::Excellent => "excellent",
        };
        f.write_str(name)
    }
}

/// Which character classes a secret draws from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterClasses {
    pub uppercase: bool,
    pub lowercase: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl CharacterClasses {
    pub fn of(chars: &[char]) -> Self {
        let mut classes = Self::default();
        for c in chars {
            if c.is_uppercase() {
                classes.uppercase = true;
            } else if c.is_lowercase() {
                classes.lowercase = true;
            } else if c.is_ascii_digit() {
                classes.digits = true;
            } else if !c.is_alphanumeric() && !c.is_whitespace() {
                classes.symbols = true;
            }
        }
        classes
    }

    pub fn count(&self) -> u32 {
        [self.uppercase, self.lowercase, self.digits, self.symbols]
            .iter()
            .filter(|present| **present)
            .count() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.count() == 4
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.uppercase {
            missing.push("uppercase letters");
        }
        if !self.lowercase {
            missing.push("lowercase letters");
        }
        if !self.digits {
            missing.push("digits");
        }
        if !self.symbols {
            missing.push("symbols");
        }
        missing
    }

    fn pool_size(&self) -> f64 {
        let mut pool = 0.0;
        if self.uppercase {
            pool += UPPER_POOL;
        }
        if self.lowercase {
            pool += LOWER_POOL;
        }
        if self.digits {
            pool += DIGIT_POOL;
        }
        if self.symbols {
            pool += SYMBOL_POOL;
        }
        pool
    }
}

/// Result of evaluating a candidate secret
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthReport {
    /// Score from 0 to 100
    pub score: u8,
    pub label: StrengthLabel,
    pub is_secure: bool,
    /// One entry per failed dimension
    pub recommendations: Vec<String>,
    /// Length in characters
    pub length: usize,
    pub character_classes: CharacterClasses,
    pub patterns: Vec<PatternKind>,
    /// Upper-bound entropy estimate: length times log2 of the alphabet size
    pub entropy_bits: f64,
    /// Whether the secret is a known placeholder value
    pub blacklisted: bool,
}

/// Scores secrets against configured length and score thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretStrengthEvaluator {
    min_length: usize,
    min_score: u8,
}

impl Default for SecretStrengthEvaluator {
    fn default() -> Self {
        Self {
            min_length: MIN_SAFE_LENGTH,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl SecretStrengthEvaluator {
    pub fn new(min_length: usize, min_score: u8) -> Self {
        Self {
            min_length,
            min_score: min_score.min(100),
        }
    }

    pub fn from_config(config: &RotationConfig) -> Self {
        Self::new(config.min_secret_length, config.min_strength_score)
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn min_score(&self) -> u8 {
        self.min_score
    }

    /// Evaluate a candidate secret
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the secret is empty.
    pub fn evaluate(&self, secret: &str) -> SecretResult<StrengthReport> {
        if secret.is_empty() {
            return Err(SecretError::invalid_input(
                "secret",
                "a non-empty string",
                "an empty string",
                error_codes::EMPTY_SECRET,
            ));
        }

        let chars: Vec<char> = secret.chars().collect();
        let length = chars.len();
        let classes = CharacterClasses::of(&chars);
        let found = patterns::detect(&chars);
        let blacklisted = patterns::is_blacklisted(secret);

        let length_points = (length.min(FULL_LENGTH_SCORE_AT) as u32 * LENGTH_WEIGHT)
            / FULL_LENGTH_SCORE_AT as u32;
        let class_points = classes.count() * CLASS_WEIGHT;
        let pattern_points =
            PATTERN_WEIGHT.saturating_sub(found.len() as u32 * PATTERN_PENALTY);
        let score = (length_points + class_points + pattern_points).min(100) as u8;

        let mut recommendations = Vec::new();
        if length < self.min_length {
            recommendations.push(format!(
                "Use at least {} characters (currently {}).",
                self.min_length, length
            ));
        }
        if !classes.is_complete() {
            recommendations.push(format!("Add {}.", classes.missing().join(", ")));
        }
        if !found.is_empty() {
            let names: Vec<String> = found.iter().map(|kind| kind.to_string()).collect();
            recommendations.push(format!("Avoid {}.", names.join(", ")));
        }
        if blacklisted {
            recommendations.push(
                "This is a well-known placeholder secret; generate a new random one."
                    .to_string(),
            );
        }

        let pool = classes.pool_size();
        let entropy_bits = if pool > 0.0 {
            length as f64 * pool.log2()
        } else {
            0.0
        };

        Ok(StrengthReport {
            score,
            label: StrengthLabel::from_score(score),
            is_secure: score >= self.min_score && length >= self.min_length && !blacklisted,
            recommendations,
            length,
            character_classes: classes,
            patterns: found,
            entropy_bits,
            blacklisted,
        })
    }
}
