//! Decode pipeline: obtains the data each file category is checked against
//!
//! PDF files are read into a byte buffer and decoded to text. Images are read
//! and their header parsed for dimensions first; the full pixel decode runs on
//! the blocking pool only when asked for. Each stage is awaited before the next
//! one starts, and none is retried.

use std::io::{self, Cursor};
use std::sync::Arc;

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};

use super::candidate::CandidateFile;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const IMAGE_MIME_PREFIX: &str = "image/";

/// Which rule set a declared MIME type selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Pdf,
    Image,
    Unsupported,
}

impl FileCategory {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type == PDF_MIME_TYPE {
            FileCategory::Pdf
        } else if mime_type.starts_with(IMAGE_MIME_PREFIX) {
            FileCategory::Image
        } else {
            FileCategory::Unsupported
        }
    }
}

/// Failure at the read/decode boundary
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Failed to read file: {0}")]
    Read(#[from] io::Error),

    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Decode task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Raw bytes of a PDF plus their text view.
#[derive(Debug, Clone)]
pub struct PdfPayload {
    pub bytes: Arc<[u8]>,
    pub text: String,
}

/// An image whose header has been parsed but whose pixels are not decoded yet.
#[derive(Debug, Clone)]
pub struct ImageHeader {
    bytes: Arc<[u8]>,
    format: Option<ImageFormat>,
    width: u32,
    height: u32,
}

impl ImageHeader {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }
}

/// A decoded image, as passed to image callbacks.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    format: Option<ImageFormat>,
    image: DynamicImage,
}

impl DecodedImage {
    fn new(image: DynamicImage, format: Option<ImageFormat>) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            format,
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Format sniffed from the content, not the declared MIME type
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Read a PDF and decode it to text (lossy UTF-8).
pub async fn read_pdf(file: &CandidateFile) -> Result<PdfPayload, DecodeError> {
    log::debug!("Reading PDF {} ({} bytes)", file.name(), file.size());
    let bytes = file.read_bytes().await?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok(PdfPayload { bytes, text })
}

/// Read an image and parse only its header for the pixel dimensions.
pub async fn read_image_header(file: &CandidateFile) -> Result<ImageHeader, DecodeError> {
    log::debug!("Reading image {} ({} bytes)", file.name(), file.size());
    let bytes = file.read_bytes().await?;

    let reader = ImageReader::new(Cursor::new(&bytes[..])).with_guessed_format()?;
    let format = reader.format();
    let (width, height) = reader.into_dimensions()?;

    Ok(ImageHeader {
        bytes,
        format,
        width,
        height,
    })
}

/// Decode the pixels behind a header on the blocking pool.
pub async fn decode_image(header: ImageHeader) -> Result<DecodedImage, DecodeError> {
    log::debug!("Decoding {}x{} image", header.width, header.height);
    let ImageHeader { bytes, format, .. } = header;

    let decoded = tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).map(|img| DecodedImage::new(img, format))
    })
    .await??;

    Ok(decoded)
}
