// src/pdf/source.rs
//! Page text acquisition. The text layer is tried first; scanned dockets fall
//! through to OCR when the text layer comes back blank.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use lopdf::Document as LopdfDocument;

use crate::models::RawDocument;
use crate::pdf::layout::{LayoutLoader, LopdfLayoutLoader};
use crate::utils::config::OcrConfig;
use crate::utils::error::SourceError;

/// A PDF parsed once and shared between text extraction and layout loading.
pub struct PdfFile {
    pub path: PathBuf,
    pub doc: Arc<LopdfDocument>,
}

impl PdfFile {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let doc = LopdfDocument::load(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            doc: Arc::new(doc),
        })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }
}

/// Something that can turn a PDF into per-page text.
pub trait TextSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn page_texts(&self, pdf: &PdfFile) -> Result<Vec<String>, SourceError>;
}

/// Reads the embedded text layer.
pub struct DigitalTextSource;

impl TextSource for DigitalTextSource {
    fn name(&self) -> &'static str {
        "text_layer"
    }

    fn page_texts(&self, pdf: &PdfFile) -> Result<Vec<String>, SourceError> {
        pdf.doc
            .get_pages()
            .keys()
            .map(|page_num| pdf.doc.extract_text(&[*page_num]).map_err(SourceError::from))
            .collect()
    }
}

/// Renders pages with `pdftoppm` and reads them back with `tesseract`.
pub struct OcrTextSource {
    lang: String,
    dpi: u32,
}

impl OcrTextSource {
    pub fn new(lang: impl Into<String>, dpi: u32) -> Self {
        Self {
            lang: lang.into(),
            dpi,
        }
    }

    /// Both external tools must answer a version check.
    pub fn is_available() -> bool {
        let pdftoppm = Command::new("pdftoppm").arg("-v").output().is_ok();
        let tesseract = Command::new("tesseract").arg("--version").output().is_ok();
        if !pdftoppm {
            tracing::debug!("pdftoppm not found - install poppler-utils for OCR support");
        }
        if !tesseract {
            tracing::debug!("tesseract not found - install tesseract-ocr for OCR support");
        }
        pdftoppm && tesseract
    }
}

impl TextSource for OcrTextSource {
    fn name(&self) -> &'static str {
        "ocr"
    }

    fn page_texts(&self, pdf: &PdfFile) -> Result<Vec<String>, SourceError> {
        let scratch = tempfile::tempdir()?;
        let prefix = scratch.path().join("page");

        tracing::info!("Running OCR on {} (dpi={}, lang={})", pdf.path.display(), self.dpi, self.lang);
        let render = Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(&pdf.path)
            .arg(&prefix)
            .output()
            .map_err(|e| SourceError::Ocr(format!("failed to run pdftoppm: {}", e)))?;
        if !render.status.success() {
            return Err(SourceError::Ocr(format!(
                "pdftoppm failed: {}",
                String::from_utf8_lossy(&render.stderr)
            )));
        }

        // pdftoppm zero-pads page numbers, so name order is page order.
        let mut images: Vec<PathBuf> = std::fs::read_dir(scratch.path())?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().map(|ext| ext == "png").unwrap_or(false))
            .collect();
        images.sort();
        if images.is_empty() {
            return Err(SourceError::Ocr("pdftoppm produced no images".to_string()));
        }

        let mut pages = Vec::with_capacity(images.len());
        for image in &images {
            let out = Command::new("tesseract")
                .arg(image)
                .arg("stdout")
                .arg("-l")
                .arg(&self.lang)
                .output()
                .map_err(|e| SourceError::Ocr(format!("failed to run tesseract: {}", e)))?;
            if !out.status.success() {
                return Err(SourceError::Ocr(format!(
                    "tesseract failed on {}: {}",
                    image.display(),
                    String::from_utf8_lossy(&out.stderr)
                )));
            }
            pages.push(String::from_utf8_lossy(&out.stdout).into_owned());
        }
        Ok(pages)
    }
}

/// Ordered fallbacks; the first source producing non-blank text wins.
pub struct TextSourceChain {
    sources: Vec<Box<dyn TextSource>>,
}

impl TextSourceChain {
    pub fn new(sources: Vec<Box<dyn TextSource>>) -> Self {
        Self { sources }
    }

    /// Text layer, plus OCR when enabled and installed.
    pub fn from_config(ocr: &OcrConfig) -> Self {
        let mut sources: Vec<Box<dyn TextSource>> = vec![Box::new(DigitalTextSource)];
        if ocr.enabled {
            if OcrTextSource::is_available() {
                sources.push(Box::new(OcrTextSource::new(ocr.lang.clone(), ocr.dpi)));
            } else {
                tracing::warn!("OCR fallback requested but pdftoppm/tesseract are unavailable");
            }
        }
        Self::new(sources)
    }

    pub fn resolve(&self, pdf: &PdfFile) -> Result<RawDocument, SourceError> {
        for source in &self.sources {
            match source.page_texts(pdf) {
                Ok(pages) => {
                    let raw = RawDocument::from_pages(pages);
                    if raw.has_text() {
                        tracing::debug!(
                            "{}: {} pages of text from {}",
                            pdf.path.display(),
                            raw.pages.len(),
                            source.name()
                        );
                        return Ok(raw);
                    }
                    tracing::info!("{}: {} yielded no text", pdf.path.display(), source.name());
                }
                Err(e) => tracing::warn!("{}: {} failed: {}", pdf.path.display(), source.name(), e),
            }
        }
        Err(SourceError::EmptyText(pdf.path.display().to_string()))
    }
}

/// Page text plus a loader for the same document's layout.
pub struct OpenedDocument {
    pub raw: RawDocument,
    pub layout: Box<dyn LayoutLoader>,
}

/// Opens one input file for parsing.
pub trait DocumentSource: Send + Sync {
    fn open(&self, path: &Path) -> Result<OpenedDocument, SourceError>;
}

pub struct PdfDocumentSource {
    chain: TextSourceChain,
}

impl PdfDocumentSource {
    pub fn new(chain: TextSourceChain) -> Self {
        Self { chain }
    }
}

impl DocumentSource for PdfDocumentSource {
    fn open(&self, path: &Path) -> Result<OpenedDocument, SourceError> {
        let pdf = PdfFile::open(path)?;
        tracing::debug!("Opened {} ({} pages)", path.display(), pdf.page_count());
        let raw = self.chain.resolve(&pdf)?;
        Ok(OpenedDocument {
            raw,
            layout: Box::new(LopdfLayoutLoader::new(Arc::clone(&pdf.doc))),
        })
    }
}
