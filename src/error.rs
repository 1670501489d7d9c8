//! Error types for file validation.
//!
//! Two disjoint categories exist. [`ConfigError`] is a programmer error raised
//! synchronously while resolving options, before any file is inspected.
//! [`Rejection`] is the expected outcome of a policy check and is delivered
//! through the deferred validation result.

use serde::Serialize;

/// Malformed or missing validation options.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A required key was not supplied
    #[error("Missing required option '{key}': expected {expected}")]
    MissingRequired {
        key: &'static str,
        expected: &'static str,
    },

    /// A recognised key was supplied with a value of the wrong type or shape
    #[error("Invalid value for option '{key}': {value} (expected {expected})")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    /// `messages` contained a key outside the fixed message set
    #[error("Invalid key '{key}' in option 'messages': allowed keys are {allowed}")]
    UnknownMessageKey { key: String, allowed: String },

    /// A `messages` entry was not a string
    #[error("Invalid value for option 'messages.{key}': {value} (expected a string)")]
    InvalidMessage { key: String, value: String },

    /// `customValidations` contained a key other than `image` or `pdf`
    #[error("Invalid key '{key}' in option 'customValidations': allowed keys are {allowed}")]
    UnknownCustomValidationKey { key: String, allowed: String },

    /// A callback was registered under the wrong category
    #[error("Invalid callback in 'customValidations.{key}': expected {key} callbacks, found a {found} callback")]
    MismatchedCallback { key: String, found: &'static str },

    /// The resolved page-count bounds are inverted
    #[error("Invalid page range: pdfPageMinCount ({min}) is greater than pdfPageMaxCount ({max})")]
    PageRange { min: f64, max: f64 },
}

/// Which policy check produced a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectionKind {
    NoFile,
    FileSize,
    FileType,
    Dimensions,
    /// The image could not be read or decoded
    ImageDecode,
    InvalidPdf,
    PdfPageCount,
    /// A caller-supplied callback vetoed the file
    Custom,
}

/// A content rejection carrying the caller-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct Rejection {
    pub kind: RejectionKind,
    pub message: String,
}

impl Rejection {
    pub fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
