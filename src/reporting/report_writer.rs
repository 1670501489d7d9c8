//! Report writing functionality

use anyhow::Result;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Rejection;

/// Result of validating a single file
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub path: PathBuf,
    pub mime_type: String,
    /// `None` when the file was accepted
    pub rejection: Option<Rejection>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.rejection.is_none()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    total: usize,
    accepted: usize,
    rejected: usize,
    results: &'a [ValidationResult],
}

/// Write validation results to a file
///
/// # Arguments
/// * `output_path` - Path to output file
/// * `results` - Validation results to write
pub fn write_report(output_path: &Path, results: &[ValidationResult]) -> Result<()> {
    let mut file = BufWriter::new(File::create(output_path)?);

    let now = std::time::SystemTime::now();
    writeln!(file, "File Validation Report")?;
    writeln!(file, "======================")?;
    writeln!(file, "Generated: {:?}", now)?;
    writeln!(file)?;

    let valid_count = results.iter().filter(|r| r.is_valid()).count();
    let invalid_count = results.len() - valid_count;

    writeln!(file, "Summary Statistics:")?;
    writeln!(file, "-------------------")?;
    writeln!(file, "  Total files: {}", results.len())?;
    writeln!(file, "  Accepted files: {}", valid_count)?;
    writeln!(file, "  Rejected files: {}", invalid_count)?;

    if !results.is_empty() {
        let valid_pct = (valid_count as f64 / results.len() as f64) * 100.0;
        writeln!(file, "  Acceptance rate: {:.2}%", valid_pct)?;
    }

    writeln!(file)?;

    if invalid_count > 0 {
        writeln!(file, "Rejected Files:")?;
        writeln!(file, "---------------")?;
        for result in results.iter() {
            if let Some(rejection) = &result.rejection {
                writeln!(
                    file,
                    "  {} [{}]: {}",
                    result.path.display(),
                    result.mime_type,
                    rejection.message
                )?;
            }
        }
        writeln!(file)?;
    }

    writeln!(file, "Accepted Files:")?;
    writeln!(file, "---------------")?;
    for result in results.iter().filter(|r| r.is_valid()) {
        writeln!(file, "  {} [{}]", result.path.display(), result.mime_type)?;
    }

    file.flush()?;
    Ok(())
}

/// Write validation results as JSON
pub fn write_json_report(output_path: &Path, results: &[ValidationResult]) -> Result<()> {
    let accepted = results.iter().filter(|r| r.is_valid()).count();
    let report = JsonReport {
        total: results.len(),
        accepted,
        rejected: results.len() - accepted,
        results,
    };

    let file = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(file, &report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RejectionKind;
    use tempfile::NamedTempFile;

    fn sample_results() -> Vec<ValidationResult> {
        vec![
            ValidationResult {
                path: PathBuf::from("/test/valid.pdf"),
                mime_type: "application/pdf".to_string(),
                rejection: None,
            },
            ValidationResult {
                path: PathBuf::from("/test/huge.png"),
                mime_type: "image/png".to_string(),
                rejection: Some(Rejection::new(
                    RejectionKind::FileSize,
                    "File size exceeds the allowed limit.",
                )),
            },
        ]
    }

    #[test]
    fn test_write_report() {
        let temp_file = NamedTempFile::new().unwrap();

        write_report(temp_file.path(), &sample_results()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("Total files: 2"));
        assert!(content.contains("Accepted files: 1"));
        assert!(content.contains("Rejected files: 1"));
        assert!(content.contains("/test/huge.png [image/png]: File size exceeds the allowed limit."));
    }

    #[test]
    fn test_write_json_report() {
        let temp_file = NamedTempFile::new().unwrap();

        write_json_report(temp_file.path(), &sample_results()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["rejected"], 1);
        assert_eq!(json["results"][1]["rejection"]["kind"], "fileSize");
        assert!(json["results"][0]["rejection"].is_null());
    }
}
