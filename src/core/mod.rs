//! Core validation engine

pub mod alert;
pub mod candidate;
pub mod custom;
pub mod pdf_scanner;
pub mod pipeline;
pub mod validator;

pub use alert::{AlertSink, LogAlert};
pub use candidate::{CandidateFile, SelectionEvent};
pub use custom::{CustomValidation, CustomValidations};
pub use pdf_scanner::{scan_pdf_text, PdfScanResult};
pub use pipeline::{DecodedImage, FileCategory};
pub use validator::{validate_file, FileValidator, ValidationOutcome};
