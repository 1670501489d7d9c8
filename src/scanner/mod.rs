//! File discovery for hosts that validate files from disk

pub mod file_scanner;

pub use file_scanner::{collect_files, expand_paths, guess_mime_type};
