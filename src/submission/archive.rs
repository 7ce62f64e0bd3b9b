//! The settlement ZIP: participant list, settlement form, report and invoices.

use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to write archive: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to build archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// An uploaded or generated file going into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl NamedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionBundle {
    pub event_name: String,
    pub participant_list: NamedFile,
    pub settlement_form: NamedFile,
    pub report: NamedFile,
    pub invoices: Vec<NamedFile>,
}

impl SubmissionBundle {
    /// Archive entry names and contents, in write order.
    pub fn entries(&self) -> Vec<(String, &[u8])> {
        let mut entries = vec![
            (self.participant_list.name.clone(), self.participant_list.bytes.as_slice()),
            (self.settlement_form.name.clone(), self.settlement_form.bytes.as_slice()),
            (self.report.name.clone(), self.report.bytes.as_slice()),
        ];
        for (i, invoice) in self.invoices.iter().enumerate() {
            entries.push((
                format!("Rechnungen/Rechnung_{}_{}", i + 1, invoice.name),
                invoice.bytes.as_slice(),
            ));
        }
        entries
    }
}

/// Event name reduced to alphanumerics, spaces, `_` and `-`, with spaces as underscores.
pub fn safe_event_name(event_name: &str) -> String {
    let kept: String = event_name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    let safe = kept.trim().replace(' ', "_");
    if safe.is_empty() {
        "Abrechnung".to_string()
    } else {
        safe
    }
}

pub fn archive_file_name(event_name: &str, now: DateTime<Local>) -> String {
    format!(
        "Abrechnung_{}_{}.zip",
        safe_event_name(event_name),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Writes the deflated archive into `output_dir` and returns its path.
pub fn write_archive(
    bundle: &SubmissionBundle,
    output_dir: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf, ArchiveError> {
    std::fs::create_dir_all(output_dir)?;
    let target = output_dir.join(archive_file_name(&bundle.event_name, now));

    let temp = tempfile::NamedTempFile::new_in(output_dir)?;
    let mut zip = ZipWriter::new(temp.reopen()?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in bundle.entries() {
        zip.start_file(name, options)?;
        zip.write_all(bytes)?;
    }
    zip.finish()?;
    drop(zip);

    temp.persist(&target).map_err(|e| ArchiveError::Io(e.error))?;
    log::info!(
        "Submission archive for '{}' written to {}",
        bundle.event_name,
        target.display()
    );
    Ok(target)
}
