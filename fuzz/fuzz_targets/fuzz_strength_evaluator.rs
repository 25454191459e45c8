#![no_main]

use arbitrary::Arbitrary;
use bleo_secrets::strength::{SecretStrengthEvaluator, StrengthLabel};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct EvaluatorFuzzInput {
    secret: String,
    suffix: String,
    min_length: u8,
    min_score: u8,
}

fuzz_target!(|input: EvaluatorFuzzInput| {
    let evaluator = SecretStrengthEvaluator::new(
        input.min_length as usize,
        input.min_score.min(100),
    );

    let report = match evaluator.evaluate(&input.secret) {
        Ok(report) => report,
        Err(_) => {
            assert!(input.secret.is_empty());
            return;
        }
    };

    assert!(report.score <= 100);
    assert_eq!(report.label, StrengthLabel::from_score(report.score));
    assert_eq!(report.length, input.secret.chars().count());
    if report.is_secure {
        assert!(report.score >= evaluator.min_score());
        assert!(!report.blacklisted);
    }

    // Appending can only add patterns, never remove them
    let extended = format!("{}{}", input.secret, input.suffix);
    if let Ok(longer) = evaluator.evaluate(&extended) {
        assert!(longer.patterns.len() >= report.patterns.len());
        if longer.patterns.len() == report.patterns.len() {
            assert!(longer.score >= report.score);
        }
    }
});
