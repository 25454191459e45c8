use super::*;

const STRONG_64: &str = "Xk9#mQ2$vL7@pR4!wN8%tB3^yH6&jF1*zC5(dG0)sK2-uE7+aM4=qP9?iT3~oW6<";

#[test]
fn test_empty_secret_rejected() {
    let evaluator = SecretStrengthEvaluator::default();
    let err = evaluator.evaluate("").unwrap_err();
    assert_eq!(err.error_type(), "InvalidInputError");
    assert_eq!(err.error_code(), error_codes::EMPTY_SECRET);
}

#[test]
fn test_label_thresholds() {
    assert_eq!(StrengthLabel::from_score(100), StrengthLabel::Excellent);
    assert_eq!(StrengthLabel::from_score(80), StrengthLabel::Excellent);
    assert_eq!(StrengthLabel::from_score(79), StrengthLabel::Strong);
    assert_eq!(StrengthLabel::from_score(60), StrengthLabel::Strong);
    assert_eq!(StrengthLabel::from_score(59), StrengthLabel::Moderate);
    assert_eq!(StrengthLabel::from_score(40), StrengthLabel::Moderate);
    assert_eq!(StrengthLabel::from_score(39), StrengthLabel::Weak);
    assert_eq!(StrengthLabel::from_score(0), StrengthLabel::Weak);
}

#[test]
fn test_label_monotonic_in_score() {
    let mut previous = StrengthLabel::from_score(0);
    for score in 1..=100u8 {
        let label = StrengthLabel::from_score(score);
        assert!(label >= previous, "label dropped at score {}", score);
        previous = label;
    }
}

#[test]
fn test_strong_secret_scores_full_marks() {
    let report = SecretStrengthEvaluator::default()
        .evaluate(STRONG_64)
        .expect("Failed to evaluate secret");

    assert_eq!(report.length, 64);
    assert_eq!(report.score, 100);
    assert_eq!(report.label, StrengthLabel::Excellent);
    assert!(report.is_secure);
    assert!(report.recommendations.is_empty());
    assert!(report.patterns.is_empty());
    assert!(report.character_classes.is_complete());
    assert!(report.entropy_bits > 400.0);
}

#[test]
fn test_weak_placeholder_secret() {
    let report = SecretStrengthEvaluator::default()
        .evaluate("password")
        .expect("Failed to evaluate secret");

    // 5 length + 10 lowercase + 13 patterns (one category found)
    assert_eq!(report.score, 28);
    assert_eq!(report.label, StrengthLabel::Weak);
    assert!(!report.is_secure);
    assert!(report.blacklisted);
    assert_eq!(report.patterns, vec![PatternKind::CommonWord]);

    // length, classes, patterns, blacklist
    assert_eq!(report.recommendations.len(), 4);
    assert!(report.recommendations[0].contains("at least 32"));
    assert!(report.recommendations[1].contains("uppercase letters"));
    assert!(report.recommendations[1].contains("symbols"));
    assert!(report.recommendations[2].contains("common words"));
}

#[test]
fn test_length_gate_on_security() {
    let evaluator = SecretStrengthEvaluator::default();

    // 31 characters: score 79 clears the score bar but not the length bar
    let short = evaluator.evaluate(&STRONG_64[..31]).unwrap();
    assert_eq!(short.score, 79);
    assert_eq!(short.label, StrengthLabel::Strong);
    assert!(!short.is_secure);
    assert_eq!(short.recommendations.len(), 1);

    let exact = evaluator.evaluate(&STRONG_64[..32]).unwrap();
    assert_eq!(exact.score, 80);
    assert!(exact.is_secure);
    assert!(exact.recommendations.is_empty());
}

#[test]
fn test_custom_thresholds() {
    let evaluator = SecretStrengthEvaluator::new(16, 90);
    let report = evaluator.evaluate(&STRONG_64[..32]).unwrap();
    assert_eq!(report.score, 80);
    assert!(!report.is_secure);

    let report = evaluator.evaluate(STRONG_64).unwrap();
    assert!(report.is_secure);
}

#[test]
fn test_repeated_characters_penalised() {
    let report = SecretStrengthEvaluator::default()
        .evaluate(&"a".repeat(40))
        .unwrap();

    // 25 length + 10 lowercase + 13 patterns
    assert_eq!(report.score, 48);
    assert_eq!(report.label, StrengthLabel::Moderate);
    assert_eq!(report.patterns, vec![PatternKind::RepeatedCharacters]);
}

#[test]
fn test_django_insecure_key_blacklisted() {
    let report = SecretStrengthEvaluator::default()
        .evaluate("django-insecure-8x@k2#v!q0z&r5m^w7p$e3t*y6u(i9o)l1")
        .unwrap();

    assert!(report.blacklisted);
    assert!(!report.is_secure);
    assert_eq!(report.score, 74);
}

#[test]
fn test_extension_never_lowers_score() {
    let evaluator = SecretStrengthEvaluator::default();
    let mut previous = 0u8;
    for end in 1..=STRONG_64.len() {
        let score = evaluator.evaluate(&STRONG_64[..end]).unwrap().score;
        assert!(score >= previous, "score dropped at length {}", end);
        previous = score;
    }
}

#[test]
fn test_extension_adding_pattern_may_lower_score() {
    let evaluator = SecretStrengthEvaluator::default();
    let base = evaluator.evaluate("Zq7#kV2!mW9@rT4$").unwrap();
    let extended = evaluator.evaluate("Zq7#kV2!mW9@rT4$abc").unwrap();

    assert!(base.patterns.is_empty());
    assert_eq!(extended.patterns, vec![PatternKind::SequentialCharacters]);
    assert_eq!(base.score, 70);
    assert_eq!(extended.score, 64);
    assert_eq!(extended.label, base.label);
}

#[test]
fn test_evaluator_from_config() {
    let config = RotationConfig {
        min_secret_length: 48,
        min_strength_score: 75,
        ..RotationConfig::default()
    };
    let evaluator = SecretStrengthEvaluator::from_config(&config);
    assert_eq!(evaluator.min_length(), 48);
    assert_eq!(evaluator.min_score(), 75);
}
