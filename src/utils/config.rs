// src/utils/config.rs
use std::path::PathBuf;

/// How repeated anchors and repeated field matches are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// First match wins.
    #[default]
    Lenient,
    /// More than one candidate where the format expects exactly one is an error.
    Strict,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub enabled: bool,
    pub lang: String,
    pub dpi: u32,
}

/// Resolved run settings, built from the command line in `main`.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub strictness: Strictness,
    pub ocr: OcrConfig,
    pub jobs: usize,
    pub debug: bool,
}

/// One worker per available core, never zero.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
