//! Configuration resolver
//!
//! Merges caller options over the defaults (shallow, last write wins) and
//! checks every recognised key. Keys no validator knows about pass through
//! untouched into [`ValidationConfig::extra`].

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use super::messages::MessageKey;
use super::options::UserOptions;
use crate::core::custom::{CustomValidation, CustomValidations};
use crate::error::ConfigError;

/// 10 MB
pub const DEFAULT_SIZE_IN_KB_ALLOWED: f64 = 10240.0;
pub const DEFAULT_ALLOWED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "application/pdf"];
pub const DEFAULT_MAX_IMAGE_HEIGHT: f64 = 2000.0;
pub const DEFAULT_MAX_IMAGE_WIDTH: f64 = 2000.0;
pub const DEFAULT_PDF_PAGE_MIN_COUNT: f64 = 1.0;
pub const DEFAULT_PDF_PAGE_MAX_COUNT: f64 = 10.0;

const REQUIRED_KEYS: [&str; 2] = ["sizeInKbAllowed", "allowedTypes"];
const CUSTOM_VALIDATION_KEYS: [&str; 2] = ["image", "pdf"];

const EXPECT_BOOL: &str = "a boolean";
const EXPECT_POSITIVE_NUMBER: &str = "a positive number";
const EXPECT_STRING_ARRAY: &str = "an array of MIME-type strings";
const EXPECT_MESSAGES: &str = "an object mapping message keys to strings";
const EXPECT_CALLBACKS: &str =
    "an object of 'image'/'pdf' callback lists registered on UserOptions";

/// Fully resolved policy for a single validation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    pub show_alert: bool,
    pub size_in_kb_allowed: f64,
    pub allowed_types: BTreeSet<String>,
    pub height_of_image: f64,
    pub width_of_image: f64,
    pub pdf_page_min_count: f64,
    pub pdf_page_max_count: f64,
    /// Only the keys that were supplied; see [`ValidationConfig::message`]
    pub messages: BTreeMap<MessageKey, String>,
    pub custom_validations: CustomValidations,
    /// Unrecognised keys, carried through as supplied
    pub extra: Map<String, Value>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            show_alert: false,
            size_in_kb_allowed: DEFAULT_SIZE_IN_KB_ALLOWED,
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect(),
            height_of_image: DEFAULT_MAX_IMAGE_HEIGHT,
            width_of_image: DEFAULT_MAX_IMAGE_WIDTH,
            pdf_page_min_count: DEFAULT_PDF_PAGE_MIN_COUNT,
            pdf_page_max_count: DEFAULT_PDF_PAGE_MAX_COUNT,
            messages: MessageKey::ALL
                .iter()
                .map(|k| (*k, k.default_message().to_string()))
                .collect(),
            custom_validations: CustomValidations::default(),
            extra: Map::new(),
        }
    }
}

impl ValidationConfig {
    /// Message for `key`, falling back to the default text when the caller's
    /// `messages` replaced the map without it.
    pub fn message(&self, key: MessageKey) -> &str {
        self.messages
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_message())
    }

    pub fn allows_type(&self, mime_type: &str) -> bool {
        self.allowed_types.contains(mime_type)
    }

    /// Whether a file of `size` bytes is within the size limit
    pub fn allows_size(&self, size: u64) -> bool {
        (size as f64 / 1024.0) <= self.size_in_kb_allowed
    }

    pub fn allows_page_count(&self, count: u64) -> bool {
        let count = count as f64;
        count >= self.pdf_page_min_count && count <= self.pdf_page_max_count
    }

    pub fn allows_dimensions(&self, width: u32, height: u32) -> bool {
        f64::from(height) <= self.height_of_image && f64::from(width) <= self.width_of_image
    }
}

/// Resolve caller options into a complete [`ValidationConfig`].
pub fn resolve(options: &UserOptions) -> Result<ValidationConfig, ConfigError> {
    let settings = options.settings();

    for key in REQUIRED_KEYS {
        if !settings.contains_key(key) {
            return Err(ConfigError::MissingRequired {
                key,
                expected: expected_for(key),
            });
        }
    }

    let mut config = ValidationConfig::default();

    // Required keys are checked ahead of the rest.
    let ordered = REQUIRED_KEYS
        .iter()
        .filter_map(|k| settings.get(*k).map(|v| (*k, v)))
        .chain(
            settings
                .iter()
                .map(|(k, v)| (k.as_str(), v))
                .filter(|(k, _)| !REQUIRED_KEYS.contains(k)),
        );

    for (key, value) in ordered {
        apply_setting(&mut config, key, value)?;
    }

    if let Some(callbacks) = options.custom_validations() {
        config.custom_validations = resolve_custom_validations(callbacks)?;
    }

    if config.pdf_page_min_count > config.pdf_page_max_count {
        return Err(ConfigError::PageRange {
            min: config.pdf_page_min_count,
            max: config.pdf_page_max_count,
        });
    }

    log::debug!(
        "Resolved config: {} KB max, {} allowed type(s), {} image / {} pdf callback(s)",
        config.size_in_kb_allowed,
        config.allowed_types.len(),
        config.custom_validations.image.len(),
        config.custom_validations.pdf.len()
    );

    Ok(config)
}

fn expected_for(key: &str) -> &'static str {
    match key {
        "showAlert" => EXPECT_BOOL,
        "sizeInKbAllowed" => EXPECT_POSITIVE_NUMBER,
        "allowedTypes" => EXPECT_STRING_ARRAY,
        "messages" => EXPECT_MESSAGES,
        "customValidations" => EXPECT_CALLBACKS,
        _ => EXPECT_POSITIVE_NUMBER,
    }
}

fn invalid(key: &'static str, value: &Value) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        expected: expected_for(key),
    }
}

fn apply_setting(config: &mut ValidationConfig, key: &str, value: &Value) -> Result<(), ConfigError> {
    match key {
        "showAlert" => {
            config.show_alert = value.as_bool().ok_or_else(|| invalid("showAlert", value))?;
        }
        "sizeInKbAllowed" => {
            config.size_in_kb_allowed =
                positive_number(value).ok_or_else(|| invalid("sizeInKbAllowed", value))?;
        }
        "allowedTypes" => {
            let types = value.as_array().ok_or_else(|| invalid("allowedTypes", value))?;
            config.allowed_types = types
                .iter()
                .map(|t| t.as_str().map(str::to_string))
                .collect::<Option<BTreeSet<_>>>()
                .ok_or_else(|| invalid("allowedTypes", value))?;
        }
        "heightOfImage" => {
            config.height_of_image =
                positive_number(value).ok_or_else(|| invalid("heightOfImage", value))?;
        }
        "widthOfImage" => {
            config.width_of_image =
                positive_number(value).ok_or_else(|| invalid("widthOfImage", value))?;
        }
        "pdfPageMinCount" => {
            config.pdf_page_min_count =
                positive_number(value).ok_or_else(|| invalid("pdfPageMinCount", value))?;
        }
        "pdfPageMaxCount" => {
            config.pdf_page_max_count =
                positive_number(value).ok_or_else(|| invalid("pdfPageMaxCount", value))?;
        }
        "messages" => {
            config.messages = resolve_messages(value)?;
        }
        "customValidations" => return Err(invalid("customValidations", value)),
        _ => {
            config.extra.insert(key.to_string(), value.clone());
        }
    }
    Ok(())
}

fn positive_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite() && *n > 0.0)
}

fn resolve_messages(value: &Value) -> Result<BTreeMap<MessageKey, String>, ConfigError> {
    let entries = value.as_object().ok_or_else(|| invalid("messages", value))?;

    let mut messages = BTreeMap::new();
    for (sub_key, text) in entries {
        let key = MessageKey::parse(sub_key).ok_or_else(|| ConfigError::UnknownMessageKey {
            key: sub_key.clone(),
            allowed: MessageKey::allowed_list(),
        })?;
        let text = text.as_str().ok_or_else(|| ConfigError::InvalidMessage {
            key: sub_key.clone(),
            value: text.to_string(),
        })?;
        messages.insert(key, text.to_string());
    }
    Ok(messages)
}

fn resolve_custom_validations(
    callbacks: &BTreeMap<String, Vec<CustomValidation>>,
) -> Result<CustomValidations, ConfigError> {
    let mut resolved = CustomValidations::default();

    for (key, checks) in callbacks {
        if !CUSTOM_VALIDATION_KEYS.contains(&key.as_str()) {
            return Err(ConfigError::UnknownCustomValidationKey {
                key: key.clone(),
                allowed: CUSTOM_VALIDATION_KEYS.join(", "),
            });
        }

        for check in checks {
            match (key.as_str(), check) {
                ("image", CustomValidation::Image(f)) => resolved.image.push(f.clone()),
                ("pdf", CustomValidation::Pdf(f)) => resolved.pdf.push(f.clone()),
                (_, other) => {
                    return Err(ConfigError::MismatchedCallback {
                        key: key.clone(),
                        found: other.category(),
                    })
                }
            }
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn required() -> UserOptions {
        UserOptions::new()
            .size_in_kb_allowed(100.0)
            .allowed_types(["application/pdf"])
    }

    #[test]
    fn test_missing_required_keys() {
        let err = resolve(&UserOptions::new().allowed_types(["image/png"])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { key: "sizeInKbAllowed", .. }));

        let err = resolve(&UserOptions::new().size_in_kb_allowed(1.0)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { key: "allowedTypes", .. }));
    }

    #[test]
    fn test_required_keys_must_be_valid() {
        let err = resolve(&required().set("sizeInKbAllowed", "big")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "sizeInKbAllowed",
                value: "\"big\"".to_string(),
                expected: "a positive number",
            }
        );

        for bad in [json!(0), json!(-5), json!(null)] {
            assert!(resolve(&required().set("sizeInKbAllowed", bad)).is_err());
        }

        let err = resolve(&required().set("allowedTypes", json!(["image/png", 3]))).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "allowedTypes", .. }));
    }

    #[test]
    fn test_optional_keys_are_type_checked() {
        let cases = [
            ("showAlert", json!("yes")),
            ("heightOfImage", json!(0)),
            ("widthOfImage", json!("wide")),
            ("pdfPageMinCount", json!(-1)),
            ("pdfPageMaxCount", json!("10")),
            ("messages", json!(["noFile"])),
        ];
        for (key, value) in cases {
            let err = resolve(&required().set(key, value.clone())).unwrap_err();
            let text = err.to_string();
            assert!(text.contains(key), "{} missing from: {}", key, text);
            assert!(text.contains(&value.to_string()), "value missing from: {}", text);
        }
    }

    #[test]
    fn test_unknown_message_key_is_named() {
        let options = required().set("messages", json!({"fileSize": "big", "missingImages": "x"}));
        let err = resolve(&options).unwrap_err();
        match err {
            ConfigError::UnknownMessageKey { key, allowed } => {
                assert_eq!(key, "missingImages");
                assert!(allowed.contains("pdfPageCount"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let config = resolve(&required().set("theme", json!({"dark": true}))).unwrap();
        assert_eq!(config.extra["theme"], json!({"dark": true}));
    }

    #[test]
    fn test_messages_replace_wholesale_and_fall_back() {
        let config = resolve(&required().set("messages", json!({"fileSize": "Too big!"}))).unwrap();
        assert_eq!(config.messages.len(), 1);
        assert_eq!(config.message(MessageKey::FileSize), "Too big!");
        assert_eq!(config.message(MessageKey::FileType), "Invalid file type.");
    }

    #[test]
    fn test_custom_validation_keys_are_restricted() {
        let options = required().custom_validation("video", CustomValidation::image(|_, _| Ok(())));
        let err = resolve(&options).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCustomValidationKey { ref key, .. } if key == "video"));

        let options = required().custom_validation("image", CustomValidation::pdf(|_, _, _| Ok(())));
        let err = resolve(&options).unwrap_err();
        assert!(matches!(err, ConfigError::MismatchedCallback { found: "pdf", .. }));

        let err = resolve(&required().set("customValidations", json!({"pdf": []}))).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "customValidations", .. }));
    }

    #[test]
    fn test_inverted_page_range() {
        let err = resolve(&required().set("pdfPageMinCount", 20)).unwrap_err();
        assert_eq!(err, ConfigError::PageRange { min: 20.0, max: 10.0 });
    }

    #[test]
    fn test_fractional_bounds_accepted() {
        let config = resolve(&required().set("heightOfImage", 1999.5)).unwrap();
        assert_eq!(config.height_of_image, 1999.5);
        assert!(config.allows_dimensions(10, 1999));
        assert!(!config.allows_dimensions(10, 2000));

        let config = resolve(
            &required()
                .set("pdfPageMinCount", 1.5)
                .set("pdfPageMaxCount", 3.5),
        )
        .unwrap();
        assert!(!config.allows_page_count(1));
        assert!(config.allows_page_count(3));
        assert!(!config.allows_page_count(4));

        let big = resolve(&required().set("widthOfImage", 1e10)).unwrap();
        assert!(big.allows_dimensions(u32::MAX, 1));
    }

    #[test]
    fn test_non_string_message_names_sub_key() {
        let err = resolve(&required().set("messages", json!({"noFile": "x", "fileSize": 42})))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidMessage {
                key: "fileSize".to_string(),
                value: "42".to_string(),
            }
        );
        assert!(err.to_string().contains("messages.fileSize"));
    }

    #[test]
    fn test_size_boundary() {
        let config = resolve(&required()).unwrap();
        assert!(config.allows_size(100 * 1024));
        assert!(!config.allows_size(100 * 1024 + 1));
    }
}
