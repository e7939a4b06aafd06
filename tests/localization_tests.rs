//! # Localization Tests
//!
//! Tests for the message catalog: completeness across both languages,
//! fallback behavior for unknown languages, and the missing-translation
//! signal.

use raed::localization::{LocalizationManager, MESSAGE_KEYS, SUPPORTED_LANGUAGES};

fn setup_localization() -> LocalizationManager {
    LocalizationManager::new().expect("Failed to create localization manager")
}

#[test]
fn test_every_key_resolves_in_every_language() {
    let manager = setup_localization();

    for lang in SUPPORTED_LANGUAGES {
        for key in MESSAGE_KEYS {
            let message = manager.message(key, lang);
            assert!(
                !message.trim().is_empty(),
                "empty message for {key} in {lang}"
            );
            assert!(
                !message.starts_with("Missing translation:"),
                "missing translation for {key} in {lang}"
            );
        }
    }
}

#[test]
fn test_unknown_language_falls_back_to_english() {
    let manager = setup_localization();

    for key in MESSAGE_KEYS {
        let fallback = manager.message(key, "fr");
        let english = manager.message(key, "en");
        assert_eq!(fallback, english, "no English fallback for {key}");
    }
}

#[test]
fn test_arabic_differs_from_english() {
    let manager = setup_localization();

    let english = manager.message("welcome", "en");
    let arabic = manager.message("welcome", "ar");
    assert_ne!(english, arabic);
}

#[test]
fn test_unknown_key_yields_signal_not_panic() {
    let manager = setup_localization();

    let message = manager.message("nonexistent-key", "en");
    assert!(message.starts_with("Missing translation:"));

    let message = manager.message("nonexistent-key", "ar");
    assert!(message.starts_with("Missing translation:"));
}

#[test]
fn test_message_with_args() {
    let manager = setup_localization();

    let message = manager.message_with_args("upload-error-size", "en", &[("limit_mb", "15")]);
    assert!(message.contains("15"));

    let message = manager.message_with_args("upload-error-size", "ar", &[("limit_mb", "15")]);
    assert!(message.contains("15"));
}
