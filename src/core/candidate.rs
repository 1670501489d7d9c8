//! The file under evaluation and the selection that produced it

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::scanner::file_scanner::guess_mime_type;

#[derive(Debug, Clone, PartialEq)]
enum FileSource {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

/// A single user-selected file.
///
/// Size and MIME type are the *declared* attributes the policy checks run
/// against; the bytes are only read when a PDF or image branch needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFile {
    name: String,
    size: u64,
    mime_type: String,
    source: FileSource,
}

impl CandidateFile {
    /// Wrap bytes that are already in memory
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        let bytes: Arc<[u8]> = Arc::from(bytes.into());
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type: mime_type.into(),
            source: FileSource::Memory(bytes),
        }
    }

    /// Describe a file on disk. Only metadata is read here; the MIME type is
    /// inferred from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            size: metadata.len(),
            mime_type: guess_mime_type(path).to_string(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Override the declared MIME type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Backing path, if the file lives on disk
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Path(path) => Some(path),
            FileSource::Memory(_) => None,
        }
    }

    /// Read the full contents. A single await point; no retries.
    pub async fn read_bytes(&self) -> io::Result<Arc<[u8]>> {
        match &self.source {
            FileSource::Path(path) => Ok(Arc::from(tokio::fs::read(path).await?)),
            FileSource::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

/// The selection a validation call was triggered by. Only the first file is
/// evaluated.
#[derive(Debug, Clone, Default)]
pub struct SelectionEvent {
    files: Vec<CandidateFile>,
}

impl SelectionEvent {
    pub fn new(files: Vec<CandidateFile>) -> Self {
        Self { files }
    }

    pub fn single(file: CandidateFile) -> Self {
        Self { files: vec![file] }
    }

    /// A selection with nothing chosen
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn first_file(&self) -> Option<&CandidateFile> {
        self.files.first()
    }

    pub fn files(&self) -> &[CandidateFile] {
        &self.files
    }
}

impl From<CandidateFile> for SelectionEvent {
    fn from(file: CandidateFile) -> Self {
        Self::single(file)
    }
}
