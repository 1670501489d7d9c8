//! Rejection message keys and their default texts

/// The fixed set of keys accepted in the `messages` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageKey {
    NoFile,
    FileSize,
    FileType,
    Dimensions,
    InvalidPdf,
    PdfPageCount,
}

impl MessageKey {
    pub const ALL: [MessageKey; 6] = [
        MessageKey::NoFile,
        MessageKey::FileSize,
        MessageKey::FileType,
        MessageKey::Dimensions,
        MessageKey::InvalidPdf,
        MessageKey::PdfPageCount,
    ];

    /// Key as it appears in options
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKey::NoFile => "noFile",
            MessageKey::FileSize => "fileSize",
            MessageKey::FileType => "fileType",
            MessageKey::Dimensions => "dimensions",
            MessageKey::InvalidPdf => "invalidPdf",
            MessageKey::PdfPageCount => "pdfPageCount",
        }
    }

    pub fn parse(key: &str) -> Option<MessageKey> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    pub fn default_message(self) -> &'static str {
        match self {
            MessageKey::NoFile => "No file selected.",
            MessageKey::FileSize => "File size exceeds the allowed limit.",
            MessageKey::FileType => "Invalid file type.",
            MessageKey::Dimensions => "Invalid image dimensions.",
            MessageKey::InvalidPdf => "Invalid PDF file.",
            MessageKey::PdfPageCount => "PDF does not meet the required page count.",
        }
    }

    /// Comma-separated list of every key, used in error messages
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
