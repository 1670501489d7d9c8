//! Validation orchestrator
//!
//! Resolves options, runs the checks shared by every file, then hands PDFs and
//! images to their own branch. Every step is terminal on failure.

use std::future::Future;
use std::sync::Arc;

use super::alert::{AlertSink, LogAlert};
use super::candidate::{CandidateFile, SelectionEvent};
use super::custom::{run_image_checks, run_pdf_checks};
use super::pdf_scanner::scan_pdf_text;
use super::pipeline::{decode_image, read_image_header, read_pdf, DecodeError, FileCategory};
use crate::config::{resolve, MessageKey, UserOptions, ValidationConfig};
use crate::error::{ConfigError, Rejection, RejectionKind};

/// Outcome of one validation call: the accepted file, or why it was rejected.
pub type ValidationOutcome = Result<CandidateFile, Rejection>;

/// Entry point with an injected alert collaborator.
#[derive(Clone)]
pub struct FileValidator {
    alert: Arc<dyn AlertSink>,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl FileValidator {
    /// Validator whose alerts go to the log
    pub fn new() -> Self {
        Self {
            alert: Arc::new(LogAlert),
        }
    }

    pub fn with_alert_sink(sink: impl AlertSink + 'static) -> Self {
        Self {
            alert: Arc::new(sink),
        }
    }

    /// Validate the first file of `event` against `options`.
    ///
    /// Configuration errors are returned immediately, before any file is
    /// inspected. Otherwise the returned future yields exactly one outcome.
    /// It must be polled inside a Tokio runtime, since image decoding runs on
    /// the blocking pool.
    pub fn validate(
        &self,
        event: &SelectionEvent,
        options: &UserOptions,
    ) -> Result<impl Future<Output = ValidationOutcome> + Send + 'static, ConfigError> {
        let config = resolve(options)?;
        let file = event.first_file().cloned();
        let alert = self.alert.clone();

        Ok(async move {
            let outcome = run_checks(file, &config).await;
            match &outcome {
                Ok(file) => log::info!("Accepted {} ({})", file.name(), file.mime_type()),
                Err(rejection) => {
                    log::warn!("Rejected ({:?}): {}", rejection.kind, rejection.message);
                    if config.show_alert {
                        alert.alert(&rejection.message);
                    }
                }
            }
            outcome
        })
    }
}

/// Validate with the default (log-backed) alert sink.
pub fn validate_file(
    event: &SelectionEvent,
    options: &UserOptions,
) -> Result<impl Future<Output = ValidationOutcome> + Send + 'static, ConfigError> {
    FileValidator::new().validate(event, options)
}

fn reject(config: &ValidationConfig, key: MessageKey, kind: RejectionKind) -> Rejection {
    Rejection::new(kind, config.message(key))
}

async fn run_checks(file: Option<CandidateFile>, config: &ValidationConfig) -> ValidationOutcome {
    let file = file.ok_or_else(|| reject(config, MessageKey::NoFile, RejectionKind::NoFile))?;
    check_common(&file, config)?;

    match FileCategory::from_mime(file.mime_type()) {
        FileCategory::Pdf => validate_pdf(file, config).await,
        FileCategory::Image => validate_image(file, config).await,
        // Allowed by the config, but there is no rule set for it
        FileCategory::Unsupported => Err(reject(config, MessageKey::FileType, RejectionKind::FileType)),
    }
}

/// Size and type checks shared by every file. No bytes are read.
pub fn check_common(file: &CandidateFile, config: &ValidationConfig) -> Result<(), Rejection> {
    if !config.allows_size(file.size()) {
        log::debug!(
            "{}: {} bytes exceeds {} KB",
            file.name(),
            file.size(),
            config.size_in_kb_allowed
        );
        return Err(reject(config, MessageKey::FileSize, RejectionKind::FileSize));
    }

    if !config.allows_type(file.mime_type()) {
        log::debug!("{}: type '{}' not allowed", file.name(), file.mime_type());
        return Err(reject(config, MessageKey::FileType, RejectionKind::FileType));
    }

    Ok(())
}

async fn validate_pdf(file: CandidateFile, config: &ValidationConfig) -> ValidationOutcome {
    let invalid_pdf = || reject(config, MessageKey::InvalidPdf, RejectionKind::InvalidPdf);

    let payload = read_pdf(&file).await.map_err(|e| {
        log::debug!("{}: {}", file.name(), e);
        invalid_pdf()
    })?;

    let scan = scan_pdf_text(&payload.text);
    log::debug!("{}: {:?}", file.name(), scan);

    if !scan.looks_like_pdf {
        return Err(invalid_pdf());
    }

    if !config.allows_page_count(scan.declared_page_count) {
        return Err(reject(config, MessageKey::PdfPageCount, RejectionKind::PdfPageCount));
    }

    if !scan.has_eof_marker {
        return Err(invalid_pdf());
    }

    run_pdf_checks(&config.custom_validations.pdf, &file, &payload.bytes, &payload.text)
        .map_err(|message| Rejection::new(RejectionKind::Custom, message))?;

    Ok(file)
}

async fn validate_image(file: CandidateFile, config: &ValidationConfig) -> ValidationOutcome {
    // Unreadable or undecodable images get the dimensions message.
    let undecodable = |e: DecodeError| {
        log::debug!("{}: {}", file.name(), e);
        reject(config, MessageKey::Dimensions, RejectionKind::ImageDecode)
    };

    // Dimensions come from the header so oversized images are never decoded.
    let header = read_image_header(&file).await.map_err(undecodable)?;

    if !config.allows_dimensions(header.width(), header.height()) {
        log::debug!(
            "{}: {}x{} exceeds {}x{}",
            file.name(),
            header.width(),
            header.height(),
            config.width_of_image,
            config.height_of_image
        );
        return Err(reject(config, MessageKey::Dimensions, RejectionKind::Dimensions));
    }

    let image = decode_image(header).await.map_err(undecodable)?;

    run_image_checks(&config.custom_validations.image, &file, &image)
        .map_err(|message| Rejection::new(RejectionKind::Custom, message))?;

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn options() -> UserOptions {
        UserOptions::new()
            .size_in_kb_allowed(1.0)
            .allowed_types(["application/pdf", "text/plain"])
    }

    #[test]
    fn test_check_common_order() {
        let config = resolve(&options()).unwrap();

        let big = CandidateFile::from_bytes("big.txt", "image/gif", vec![0u8; 2048]);
        assert_eq!(check_common(&big, &config).unwrap_err().kind, RejectionKind::FileSize);

        let gif = CandidateFile::from_bytes("a.gif", "image/gif", vec![0u8; 10]);
        assert_eq!(check_common(&gif, &config).unwrap_err().kind, RejectionKind::FileType);
    }

    #[tokio::test]
    async fn test_allowed_but_unsupported_type() {
        let file = CandidateFile::from_bytes("notes.txt", "text/plain", b"hello".to_vec());
        let event = SelectionEvent::single(file);
        let rejection = validate_file(&event, &options()).unwrap().await.unwrap_err();
        assert_eq!(rejection.kind, RejectionKind::FileType);
        assert_eq!(rejection.message, "Invalid file type.");
    }

    #[tokio::test]
    async fn test_alert_only_when_enabled() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = seen.clone();
        let validator = FileValidator::with_alert_sink(move |msg: &str| {
            sink.lock().unwrap().push(msg.to_string());
        });

        let event = SelectionEvent::empty();
        let quiet = options().set("messages", json!({"noFile": "Pick a file"}));
        let rejection = validator.validate(&event, &quiet).unwrap().await.unwrap_err();
        assert_eq!(rejection.message, "Pick a file");
        assert!(seen.lock().unwrap().is_empty());

        let loud = quiet.show_alert(true);
        validator.validate(&event, &loud).unwrap().await.unwrap_err();
        assert_eq!(*seen.lock().unwrap(), vec!["Pick a file".to_string()]);
    }

    #[tokio::test]
    async fn test_config_error_never_alerts() {
        let seen = Arc::new(Mutex::new(0usize));
        let sink = seen.clone();
        let validator = FileValidator::with_alert_sink(move |_: &str| {
            *sink.lock().unwrap() += 1;
        });

        let bad = UserOptions::new().show_alert(true).allowed_types(["image/png"]);
        assert!(validator.validate(&SelectionEvent::empty(), &bad).is_err());
        assert_eq!(*seen.lock().unwrap(), 0);
    }
}
