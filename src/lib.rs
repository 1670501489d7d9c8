//! File Policy Validator Library
//!
//! Validates a single user-selected file against a configurable policy: size
//! limit, MIME-type allow-list, image dimension bounds, a shallow structural
//! scan of PDFs, and caller-supplied callbacks.
//!
//! ```no_run
//! use file_policy_validator::prelude::*;
//!
//! # async fn run(bytes: Vec<u8>) {
//! let file = CandidateFile::from_bytes("upload.pdf", "application/pdf", bytes);
//! let options = UserOptions::new()
//!     .size_in_kb_allowed(2048.0)
//!     .allowed_types(["application/pdf", "image/png"])
//!     .pdf_check(|_, _, text| {
//!         if text.contains("/Encrypt") {
//!             Err("Encrypted PDFs are not accepted".to_string())
//!         } else {
//!             Ok(())
//!         }
//!     });
//!
//! match validate_file(&SelectionEvent::single(file), &options) {
//!     Ok(pending) => match pending.await {
//!         Ok(file) => println!("accepted {}", file.name()),
//!         Err(rejection) => println!("rejected: {}", rejection),
//!     },
//!     Err(config_error) => panic!("bad options: {}", config_error),
//! }
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod reporting;
pub mod scanner;

pub use crate::core::validator;
pub use error::{ConfigError, Rejection, RejectionKind};
pub use reporting::report_writer;
pub use scanner::file_scanner;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{resolve, MessageKey, UserOptions, ValidationConfig};
    pub use crate::core::alert::{AlertSink, LogAlert};
    pub use crate::core::candidate::{CandidateFile, SelectionEvent};
    pub use crate::core::custom::CustomValidation;
    pub use crate::core::pdf_scanner::{scan_pdf_text, PdfScanResult};
    pub use crate::core::pipeline::DecodedImage;
    pub use crate::core::validator::{validate_file, FileValidator, ValidationOutcome};
    pub use crate::error::{ConfigError, Rejection, RejectionKind};
    pub use crate::reporting::report_writer::{write_json_report, write_report, ValidationResult};
    pub use crate::scanner::file_scanner::{collect_files, expand_paths, guess_mime_type};
}
