// src/batch.rs
//! Folder-level driver. Each file is its own unit of work and of failure.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::extractors::docket::DocketParser;
use crate::extractors::section::Sections;
use crate::models::DocketRecord;
use crate::pdf::source::DocumentSource;
use crate::utils::error::{AppError, ParseError};

/// Failure kind for a worker that panicked instead of returning.
const PANIC_KIND: &str = "panic";

/// What happened to one input file.
#[derive(Debug, Clone)]
pub enum DocumentOutcome {
    Parsed {
        file: String,
        record: Box<DocketRecord>,
    },
    Failed {
        file: String,
        kind: String,
        message: String,
    },
}

impl DocumentOutcome {
    pub fn file(&self) -> &str {
        match self {
            DocumentOutcome::Parsed { file, .. } | DocumentOutcome::Failed { file, .. } => file,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub input_dir: PathBuf,
    /// Sorted by file name.
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchReport {
    pub fn parsed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DocumentOutcome::Parsed { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.parsed_count()
    }
}

/// Debug material captured alongside a parse.
pub struct DebugDump {
    pub file: String,
    pub text: String,
    pub sections: Sections,
}

/// Everything a worker needs; shared read-only across workers.
pub struct Pipeline {
    pub source: Box<dyn DocumentSource>,
    pub parser: DocketParser,
    pub capture_debug: bool,
}

impl Pipeline {
    /// Opens, parses and releases one file. Errors of any kind come back as
    /// `AppError` so the caller can classify them.
    pub fn process_file(&self, path: &Path) -> (Result<DocketRecord, AppError>, Option<DebugDump>) {
        let file = file_name(path);
        let opened = match self.source.open(path) {
            Ok(opened) => opened,
            Err(e) => return (Err(e.into()), None),
        };

        let layout = opened.layout.as_ref();
        if !self.capture_debug {
            let result = self.parser.parse(&file, &opened.raw, layout).map_err(AppError::from);
            return (result, None);
        }

        // Debug capture segments once and hands the sections on to the parse.
        match self.parser.sections(&opened.raw) {
            Ok((text, sections)) => {
                let result = self
                    .parser
                    .parse_segmented(&file, &opened.raw, &text, &sections, layout)
                    .map_err(AppError::from);
                (result, Some(DebugDump { file, text, sections }))
            }
            Err(source) => (Err(ParseError { file, source }.into()), None),
        }
    }
}

/// PDF files directly inside `dir`, sorted by name.
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Parses every PDF in `dir` with at most `jobs` documents in flight. One bad
/// document never stops the rest.
pub async fn process_folder(
    dir: &Path,
    pipeline: Arc<Pipeline>,
    jobs: usize,
) -> Result<(BatchReport, Vec<DebugDump>), AppError> {
    let files = list_documents(dir)?;
    tracing::info!("Found {} PDF files in {}", files.len(), dir.display());

    let permits = Arc::new(Semaphore::new(jobs.max(1)));
    let mut tasks = JoinSet::new();
    let mut task_files = HashMap::new();

    for (idx, path) in files.iter().enumerate() {
        let permit = Arc::clone(&permits)
            .acquire_owned()
            .await
            .map_err(|e| AppError::Processing(e.to_string()))?;
        let pipeline = Arc::clone(&pipeline);
        let path = path.clone();
        let handle = tasks.spawn_blocking(move || {
            let _permit = permit;
            tracing::info!("[{}] Processing {}", idx, path.display());
            (idx, pipeline.process_file(&path))
        });
        task_files.insert(handle.id(), idx);
    }

    let mut slots: Vec<Option<DocumentOutcome>> = vec![None; files.len()];
    let mut dumps = Vec::new();
    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((_, (idx, (result, debug)))) => {
                let file = file_name(&files[idx]);
                slots[idx] = Some(match result {
                    Ok(record) => {
                        tracing::info!("Parsed {} ({})", file, record.docket_no);
                        DocumentOutcome::Parsed { file, record: Box::new(record) }
                    }
                    Err(e) => {
                        tracing::error!("Failed: {} [{}] {}", file, e.kind(), e);
                        DocumentOutcome::Failed {
                            file,
                            kind: e.kind().to_string(),
                            message: e.to_string(),
                        }
                    }
                });
                dumps.extend(debug);
            }
            Err(e) => match task_files.get(&e.id()) {
                Some(&idx) => {
                    let file = file_name(&files[idx]);
                    tracing::error!("Failed: {} [{}] {}", file, PANIC_KIND, e);
                    slots[idx] = Some(DocumentOutcome::Failed {
                        file,
                        kind: PANIC_KIND.to_string(),
                        message: e.to_string(),
                    });
                }
                None => tracing::error!("Worker for an unknown task crashed: {}", e),
            },
        }
    }

    // Only a task missing from the id map can leave a slot empty.
    let outcomes = slots
        .into_iter()
        .zip(&files)
        .map(|(slot, path)| {
            slot.unwrap_or_else(|| DocumentOutcome::Failed {
                file: file_name(path),
                kind: PANIC_KIND.to_string(),
                message: "worker did not report".to_string(),
            })
        })
        .collect();

    dumps.sort_by(|a: &DebugDump, b: &DebugDump| a.file.cmp(&b.file));
    Ok((
        BatchReport {
            input_dir: dir.to_path_buf(),
            outcomes,
        },
        dumps,
    ))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
