//! Caller-supplied partial options

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::core::candidate::CandidateFile;
use crate::core::custom::CustomValidation;
use crate::core::pipeline::DecodedImage;
use crate::error::ConfigError;

/// Partial options for one validation call.
///
/// Plain settings are held as JSON so that their shapes can be checked and
/// reported the way they were supplied. Callbacks cannot be expressed in JSON
/// and are registered through [`UserOptions::custom_validation`] and friends.
#[derive(Debug, Clone, Default)]
pub struct UserOptions {
    settings: Map<String, Value>,
    custom_validations: Option<BTreeMap<String, Vec<CustomValidation>>>,
}

impl UserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object such as a parsed options file.
    pub fn from_json(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(settings) => Ok(Self {
                settings,
                custom_validations: None,
            }),
            other => Err(ConfigError::InvalidValue {
                key: "options",
                value: other.to_string(),
                expected: "a JSON object",
            }),
        }
    }

    /// Set any key, recognised or not.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn size_in_kb_allowed(self, kb: f64) -> Self {
        self.set("sizeInKbAllowed", kb)
    }

    pub fn allowed_types<I, S>(self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let types: Vec<Value> = types.into_iter().map(|t| Value::String(t.into())).collect();
        self.set("allowedTypes", types)
    }

    pub fn show_alert(self, show: bool) -> Self {
        self.set("showAlert", show)
    }

    /// Register a callback under an explicit `customValidations` key.
    ///
    /// The key is checked during resolution, so an unknown key or a callback
    /// filed under the wrong category fails there rather than here.
    pub fn custom_validation(mut self, key: impl Into<String>, check: CustomValidation) -> Self {
        self.custom_validations
            .get_or_insert_with(BTreeMap::new)
            .entry(key.into())
            .or_default()
            .push(check);
        self
    }

    pub fn image_check<F>(self, check: F) -> Self
    where
        F: Fn(&CandidateFile, &DecodedImage) -> Result<(), String> + Send + Sync + 'static,
    {
        self.custom_validation("image", CustomValidation::image(check))
    }

    pub fn pdf_check<F>(self, check: F) -> Self
    where
        F: Fn(&CandidateFile, &[u8], &str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.custom_validation("pdf", CustomValidation::pdf(check))
    }

    /// Overlay `other` on top of `self`, key by key.
    pub fn overlay(mut self, other: UserOptions) -> Self {
        self.settings.extend(other.settings);
        if other.custom_validations.is_some() {
            self.custom_validations = other.custom_validations;
        }
        self
    }

    pub fn settings(&self) -> &Map<String, Value> {
        &self.settings
    }

    pub fn custom_validations(&self) -> Option<&BTreeMap<String, Vec<CustomValidation>>> {
        self.custom_validations.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_requires_object() {
        assert!(UserOptions::from_json(json!({"sizeInKbAllowed": 5})).is_ok());
        let err = UserOptions::from_json(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("a JSON object"));
    }

    #[test]
    fn test_overlay_is_shallow() {
        let base = UserOptions::new()
            .set("messages", json!({"fileSize": "big", "fileType": "wrong"}))
            .size_in_kb_allowed(10.0);
        let top = UserOptions::new().set("messages", json!({"noFile": "none"}));

        let merged = base.overlay(top);
        assert_eq!(merged.settings()["messages"], json!({"noFile": "none"}));
        assert_eq!(merged.settings()["sizeInKbAllowed"], json!(10.0));
    }

    #[test]
    fn test_callbacks_accumulate_per_key() {
        let options = UserOptions::new()
            .pdf_check(|_, _, _| Ok(()))
            .pdf_check(|_, _, _| Ok(()))
            .image_check(|_, _| Ok(()));
        let callbacks = options.custom_validations().unwrap();
        assert_eq!(callbacks["pdf"].len(), 2);
        assert_eq!(callbacks["image"].len(), 1);
    }
}
