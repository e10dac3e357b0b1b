// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::batch::{BatchReport, DocumentOutcome};
use crate::extractors::section::Sections;
use crate::models::DocketRecord;
use crate::utils::error::StorageError;
use crate::utils::text_debug;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Saves one record as `<stem>.json`
    pub fn save_record(&self, file: &str, record: &DocketRecord) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}.json", stem(file)));
        write_json(&file_path, record)?;
        tracing::info!("Saved record {} to {}", record.docket_no, file_path.display());
        Ok(file_path)
    }

    /// Saves the run summary as `summary.json`
    pub fn save_summary(&self, report: &BatchReport) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join("summary.json");

        let parsed: Vec<&str> = report
            .outcomes
            .iter()
            .filter(|o| matches!(o, DocumentOutcome::Parsed { .. }))
            .map(DocumentOutcome::file)
            .collect();
        let failed: Vec<serde_json::Value> = report
            .outcomes
            .iter()
            .filter_map(|o| match o {
                DocumentOutcome::Failed { file, kind, message } => Some(serde_json::json!({
                    "file": file,
                    "kind": kind,
                    "message": message,
                })),
                DocumentOutcome::Parsed { .. } => None,
            })
            .collect();

        let summary = serde_json::json!({
            "input_dir": report.input_dir.display().to_string(),
            "total": report.outcomes.len(),
            "parsed_count": parsed.len(),
            "failed_count": failed.len(),
            "parsed": parsed,
            "failed": failed,
            "finished_at": chrono::Utc::now().to_rfc3339(),
        });

        write_json(&file_path, &summary)?;
        tracing::info!("Saved run summary to {}", file_path.display());
        Ok(file_path)
    }

    /// Debug dump: segmented sections as JSON and the annotated normalized text
    pub fn save_debug(&self, file: &str, text: &str, sections: &Sections) -> Result<PathBuf, StorageError> {
        let debug_dir = self.base_dir.join("debug");
        if !debug_dir.exists() {
            fs::create_dir_all(&debug_dir)
                .map_err(StorageError::IoError)?;
        }

        let stem = stem(file);
        write_json(&debug_dir.join(format!("{}_sections.json", stem)), sections)?;

        let bounds = crate::extractors::section::boundaries(text);
        let annotated_path = debug_dir.join(format!("{}_annotated.txt", stem));
        text_debug::save_debug_text(text, &annotated_path, &bounds)?;
        tracing::debug!("Saved {} sections for {}", sections.len(), file);
        Ok(debug_dir)
    }
}

fn stem(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;
    fs::write(path, body)
        .map_err(StorageError::IoError)
}
