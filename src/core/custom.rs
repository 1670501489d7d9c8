//! Caller-supplied validation callbacks
//!
//! A callback returns `Ok(())` to pass; any `Err(message)` vetoes the file and
//! the message becomes the rejection text verbatim. Callbacks run synchronously
//! after the built-in checks and cannot await anything themselves.

use std::fmt;
use std::sync::Arc;

use super::candidate::CandidateFile;
use super::pipeline::DecodedImage;

/// Image callback: `(file, decoded image)`
pub type ImageCheck = Arc<dyn Fn(&CandidateFile, &DecodedImage) -> Result<(), String> + Send + Sync>;

/// PDF callback: `(file, raw bytes, decoded text)`
pub type PdfCheck = Arc<dyn Fn(&CandidateFile, &[u8], &str) -> Result<(), String> + Send + Sync>;

/// A single callback tagged with the file category it applies to.
#[derive(Clone)]
pub enum CustomValidation {
    Image(ImageCheck),
    Pdf(PdfCheck),
}

impl CustomValidation {
    pub fn image<F>(check: F) -> Self
    where
        F: Fn(&CandidateFile, &DecodedImage) -> Result<(), String> + Send + Sync + 'static,
    {
        CustomValidation::Image(Arc::new(check))
    }

    pub fn pdf<F>(check: F) -> Self
    where
        F: Fn(&CandidateFile, &[u8], &str) -> Result<(), String> + Send + Sync + 'static,
    {
        CustomValidation::Pdf(Arc::new(check))
    }

    /// Category name, matching the `customValidations` key it belongs under
    pub fn category(&self) -> &'static str {
        match self {
            CustomValidation::Image(_) => "image",
            CustomValidation::Pdf(_) => "pdf",
        }
    }
}

impl fmt::Debug for CustomValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomValidation::{}", self.category())
    }
}

/// Resolved `customValidations`: ordered callback lists per category.
#[derive(Clone, Default)]
pub struct CustomValidations {
    pub image: Vec<ImageCheck>,
    pub pdf: Vec<PdfCheck>,
}

impl CustomValidations {
    pub fn is_empty(&self) -> bool {
        self.image.is_empty() && self.pdf.is_empty()
    }
}

impl fmt::Debug for CustomValidations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValidations")
            .field("image", &self.image.len())
            .field("pdf", &self.pdf.len())
            .finish()
    }
}

// Callbacks compare by identity.
impl PartialEq for CustomValidations {
    fn eq(&self, other: &Self) -> bool {
        self.image.len() == other.image.len()
            && self.pdf.len() == other.pdf.len()
            && self.image.iter().zip(&other.image).all(|(a, b)| Arc::ptr_eq(a, b))
            && self.pdf.iter().zip(&other.pdf).all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

/// Run image callbacks in registration order, stopping at the first veto.
pub fn run_image_checks(
    checks: &[ImageCheck],
    file: &CandidateFile,
    image: &DecodedImage,
) -> Result<(), String> {
    for (idx, check) in checks.iter().enumerate() {
        if let Err(message) = check(file, image) {
            log::debug!("Image callback {} rejected {}: {}", idx, file.name(), message);
            return Err(message);
        }
    }
    Ok(())
}

/// Run PDF callbacks in registration order, stopping at the first veto.
pub fn run_pdf_checks(
    checks: &[PdfCheck],
    file: &CandidateFile,
    bytes: &[u8],
    text: &str,
) -> Result<(), String> {
    for (idx, check) in checks.iter().enumerate() {
        if let Err(message) = check(file, bytes, text) {
            log::debug!("PDF callback {} rejected {}: {}", idx, file.name(), message);
            return Err(message);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pdf_check<F>(check: F) -> PdfCheck
    where
        F: Fn(&CandidateFile, &[u8], &str) -> Result<(), String> + Send + Sync + 'static,
    {
        Arc::new(check)
    }

    #[test]
    fn test_pdf_checks_stop_at_first_veto() {
        let later_calls = Arc::new(AtomicUsize::new(0));
        let counter = later_calls.clone();

        let checks = vec![
            pdf_check(|_, _, _| Ok(())),
            pdf_check(|_, _, text| {
                if text.contains("/Encrypt") {
                    Err("Encrypted PDFs are not accepted".to_string())
                } else {
                    Ok(())
                }
            }),
            pdf_check(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        ];

        let file = CandidateFile::from_bytes("a.pdf", "application/pdf", b"x".to_vec());
        let result = run_pdf_checks(&checks, &file, b"x", "%PDF-1.7 /Encrypt");
        assert_eq!(result, Err("Encrypted PDFs are not accepted".to_string()));
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);

        assert!(run_pdf_checks(&checks, &file, b"x", "%PDF-1.7").is_ok());
        assert_eq!(later_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_category_names() {
        assert_eq!(CustomValidation::image(|_, _| Ok(())).category(), "image");
        assert_eq!(CustomValidation::pdf(|_, _, _| Ok(())).category(), "pdf");
    }
}
