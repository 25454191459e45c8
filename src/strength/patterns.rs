//! Weak-pattern detection used by the strength evaluator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest run that counts as a repeated or sequential pattern
pub const PATTERN_RUN_LENGTH: usize = 3;

/// Words that commonly appear in hand-written signing secrets
pub const COMMON_WORDS: &[&str] = &[
    "password", "passw0rd", "secret", "admin", "qwerty", "letmein", "welcome", "login",
    "token", "bleo", "django", "changeme", "default", "master", "monkey", "dragon",
    "iloveyou", "sunshine", "football", "trustno1",
];

/// Signing secrets that ship as placeholders in templates and tutorials
const BLACKLISTED_SECRETS: &[&str] = &[
    "secret",
    "secretkey",
    "secret_key",
    "secret-key",
    "your-secret-key",
    "your_secret_key",
    "yoursecretkey",
    "jwt_secret",
    "jwt-secret",
    "jwtsecret",
    "mysecret",
    "supersecret",
    "changeme",
    "change-me",
    "password",
    "default",
    "test",
];

/// Prefix of keys generated by `django-admin startproject`
const BLACKLISTED_PREFIXES: &[&str] = &["django-insecure-"];

/// Category of weak pattern found in a secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    RepeatedCharacters,
    SequentialCharacters,
    CommonWord,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatternKind::RepeatedCharacters => "repeated characters",
            PatternKind::SequentialCharacters => "sequential characters",
            PatternKind::CommonWord => "common words",
        };
        f.write_str(name)
    }
}

/// All pattern categories present in `chars`, in a fixed order
pub fn detect(chars: &[char]) -> Vec<PatternKind> {
    let mut found = Vec::new();
    if has_repeated_run(chars) {
        found.push(PatternKind::RepeatedCharacters);
    }
    if has_sequential_run(chars) {
        found.push(PatternKind::SequentialCharacters);
    }
    if contains_common_word(chars) {
        found.push(PatternKind::CommonWord);
    }
    found
}

/// `aaa`, `111`, `!!!`
pub fn has_repeated_run(chars: &[char]) -> bool {
    chars
        .windows(PATTERN_RUN_LENGTH)
        .any(|w| w.iter().all(|c| *c == w[0]))
}

/// `abc`, `CBA`, `123`, `987`; letters compare case-insensitively
pub fn has_sequential_run(chars: &[char]) -> bool {
    chars.windows(PATTERN_RUN_LENGTH).any(|w| {
        if !w.iter().all(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        if w.iter().any(|c| c.is_ascii_digit()) && !w.iter().all(|c| c.is_ascii_digit()) {
            return false;
        }
        let codes: Vec<i32> = w
            .iter()
            .map(|c| c.to_ascii_lowercase() as i32)
            .collect();
        let ascending = codes.windows(2).all(|p| p[1] - p[0] == 1);
        let descending = codes.windows(2).all(|p| p[0] - p[1] == 1);
        ascending || descending
    })
}

pub fn contains_common_word(chars: &[char]) -> bool {
    let lowered: String = chars.iter().flat_map(|c| c.to_lowercase()).collect();
    COMMON_WORDS.iter().any(|word| lowered.contains(word))
}

/// Known placeholder or leaked signing secrets
pub fn is_blacklisted(secret: &str) -> bool {
    let normalized = secret.trim().to_lowercase();
    BLACKLISTED_SECRETS.contains(&normalized.as_str())
        || BLACKLISTED_PREFIXES
            .iter()
            .any(|prefix| normalized.starts_with(prefix))
}
