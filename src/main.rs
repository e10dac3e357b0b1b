// src/main.rs
mod batch;
mod extractors;
mod models;
mod pdf;
mod storage;
mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use batch::{process_folder, Pipeline};
use extractors::docket::DocketParser;
use pdf::source::{PdfDocumentSource, TextSourceChain};
use storage::StorageManager;
use utils::config::{default_jobs, OcrConfig, ParserConfig, Strictness};
use utils::AppError;

/// Extracts structured records from criminal docket PDFs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Folder containing the docket PDFs
    #[arg(short, long, env = "DOCKET_PATH", default_value = ".")]
    path: PathBuf,

    /// Output directory for records and the run summary
    #[arg(short, long, env = "DOCKET_OUTPUT_DIR", default_value = "./output")]
    output_dir: PathBuf,

    /// Reject repeated section anchors and repeated mandatory-field matches
    #[arg(long, env = "DOCKET_STRICT")]
    strict: bool,

    /// Never fall back to OCR for scanned documents
    #[arg(long, env = "DOCKET_NO_OCR")]
    no_ocr: bool,

    /// Tesseract language for OCR
    #[arg(long, env = "DOCKET_OCR_LANG", default_value = "eng")]
    ocr_lang: String,

    /// Render resolution for OCR
    #[arg(long, env = "DOCKET_OCR_DPI", default_value_t = 300)]
    ocr_dpi: u32,

    /// Documents processed at once (defaults to available cores)
    #[arg(short, long, env = "DOCKET_JOBS")]
    jobs: Option<usize>,

    /// Debug mode - save segmented sections and annotated text per document
    #[arg(short, long, env = "DOCKET_DEBUG")]
    debug: bool,
}

impl Args {
    fn into_config(self) -> Result<ParserConfig, AppError> {
        let jobs = self.jobs.unwrap_or_else(default_jobs);
        if jobs == 0 {
            return Err(AppError::Config("--jobs must be at least 1".to_string()));
        }
        Ok(ParserConfig {
            input_dir: self.path,
            output_dir: self.output_dir,
            strictness: if self.strict { Strictness::Strict } else { Strictness::Lenient },
            ocr: OcrConfig {
                enabled: !self.no_ocr,
                lang: self.ocr_lang,
                dpi: self.ocr_dpi,
            },
            jobs,
            debug: self.debug,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);
    let config = args.into_config()?;

    if !config.input_dir.is_dir() {
        return Err(AppError::Config(format!(
            "Input path {} is not a directory",
            config.input_dir.display()
        )));
    }

    // 3. Initialize storage
    let storage = StorageManager::new(&config.output_dir)?;

    // 4. Build the per-document pipeline
    let pipeline = Arc::new(Pipeline {
        source: Box::new(PdfDocumentSource::new(TextSourceChain::from_config(&config.ocr))),
        parser: DocketParser::new(config.strictness),
        capture_debug: config.debug,
    });

    // 5. Parse every document in the folder
    let (report, dumps) = process_folder(&config.input_dir, pipeline, config.jobs).await?;

    if report.outcomes.is_empty() {
        tracing::warn!("No PDF files found in {}", config.input_dir.display());
        return Ok(());
    }

    // 6. Persist results
    for outcome in &report.outcomes {
        if let batch::DocumentOutcome::Parsed { file, record } = outcome {
            if let Err(e) = storage.save_record(file, record) {
                tracing::error!("Failed to save record for {}: {}", file, e);
            }
        }
    }
    for dump in &dumps {
        match storage.save_debug(&dump.file, &dump.text, &dump.sections) {
            Ok(path) => tracing::info!("Saved debug output for {} to: {}", dump.file, path.display()),
            Err(e) => tracing::warn!("Failed to save debug output for {}: {}", dump.file, e),
        }
    }
    storage.save_summary(&report)?;

    let success_count = report.parsed_count();
    let failure_count = report.failed_count();
    tracing::info!("Processing finished. Success: {}, Failures: {}", success_count, failure_count);

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!(
            "Failed to parse any of {} documents",
            failure_count
        )));
    }

    Ok(())
}
