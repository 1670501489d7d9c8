//! Shallow structural scan of PDF text
//!
//! Only ASCII markers are searched, so a lossy text decode of the raw bytes is
//! enough. No xref tables, object streams or encryption are looked at.

use lazy_static::lazy_static;
use regex::Regex;

const PDF_HEADER: &str = "%PDF-";
const EOF_MARKER: &str = "%%EOF";

lazy_static! {
    /// Page-tree `/Count N` declarations
    static ref RE_PAGE_COUNT: Regex = Regex::new(r"/Count\s+(\d+)").unwrap();
}

/// What the scanner found in one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PdfScanResult {
    pub looks_like_pdf: bool,
    /// Largest `/Count` value in the document, 0 if there is none
    pub declared_page_count: u64,
    pub has_eof_marker: bool,
}

/// Scan decoded PDF text.
pub fn scan_pdf_text(text: &str) -> PdfScanResult {
    PdfScanResult {
        looks_like_pdf: text.contains(PDF_HEADER),
        declared_page_count: declared_page_count(text),
        has_eof_marker: text.contains(EOF_MARKER),
    }
}

/// Maximum integer across every `/Count` declaration.
///
/// Intermediate page-tree nodes also carry `/Count`; the root holds the
/// largest value, which approximates the total without walking the tree.
pub fn declared_page_count(text: &str) -> u64 {
    RE_PAGE_COUNT
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}
