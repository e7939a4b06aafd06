//! Message catalog for the bot's two languages.
//!
//! Every outward-facing string lives in `locales/<lang>/main.ftl`. Handlers
//! never carry their own translation tables; they ask the catalog by key and
//! session language. Unknown languages fall back to English, unknown keys
//! produce a well-defined `Missing translation:` marker instead of a panic.

use anyhow::{anyhow, Context, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use std::collections::HashMap;
use std::fs;
use unic_langid::LanguageIdentifier;

/// Languages the catalog ships resources for.
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "ar"];

/// Language used when the session has no usable language.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Every message key the bot can emit. Kept in one place so tests can assert
/// the catalogs are complete.
pub const MESSAGE_KEYS: [&str; 26] = [
    "welcome",
    "use-start",
    "language-set",
    "language-error",
    "role-prompt",
    "role-error",
    "role-activist",
    "role-organization",
    "task-prompt",
    "task-error",
    "tools-menu",
    "tools-error",
    "problem-tree-intro",
    "swot-intro",
    "pestel-intro",
    "concept-note-intro",
    "full-proposal-intro",
    "flow-menu",
    "flow-error",
    "profile-required",
    "upload-success",
    "upload-error",
    "upload-error-size",
    "input-error",
    "generation-error",
    "goodbye",
];

/// Localization manager holding one fluent bundle per supported language.
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Loads all supported locales from `./locales`. Fails at startup if a
    /// resource file is missing or does not parse.
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for lang in SUPPORTED_LANGUAGES {
            let locale: LanguageIdentifier = lang.parse()?;
            let bundle = Self::create_bundle(&locale)?;
            bundles.insert(lang.to_string(), bundle);
        }

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale.
    fn create_bundle(locale: &LanguageIdentifier) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);

        let resource_path = format!("./locales/{locale}/main.ftl");
        let content = fs::read_to_string(&resource_path)
            .with_context(|| format!("failed to read locale resource {resource_path}"))?;
        let resource = FluentResource::try_new(content)
            .map_err(|(_, errors)| anyhow!("invalid fluent resource {resource_path}: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("conflicting fluent messages in {resource_path}: {errors:?}"))?;

        Ok(bundle)
    }

    /// Get a localized message for an explicit language tag. Unknown tags use
    /// the fallback language; a key missing from a non-English bundle is also
    /// retried against English before the missing-translation marker.
    pub fn get_message_in_language(
        &self,
        key: &str,
        lang: &str,
        args: Option<&FluentArgs>,
    ) -> String {
        let bundle = self
            .bundles
            .get(lang)
            .unwrap_or_else(|| &self.bundles[FALLBACK_LANGUAGE]);

        let msg = bundle.get_message(key).or_else(|| {
            if lang != FALLBACK_LANGUAGE {
                self.bundles[FALLBACK_LANGUAGE].get_message(key)
            } else {
                None
            }
        });

        let msg = match msg {
            Some(msg) => msg,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {key}"),
        };

        let mut errors = vec![];
        bundle.format_pattern(pattern, args, &mut errors).into_owned()
    }

    /// Get a localized message without arguments.
    pub fn message(&self, key: &str, lang: &str) -> String {
        self.get_message_in_language(key, lang, None)
    }

    /// Get a localized message with simple string arguments.
    pub fn message_with_args(&self, key: &str, lang: &str, args: &[(&str, &str)]) -> String {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, *value);
        }
        self.get_message_in_language(key, lang, Some(&fluent_args))
    }
}
