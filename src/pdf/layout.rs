// src/pdf/layout.rs
//! Positioned text for a subset of pages.
//!
//! Only the pages named by a [`PageSet`] are walked; the resulting
//! [`LoadedLayout`] is owned by one parse call and dropped with it.

use std::collections::BTreeMap;
use std::sync::Arc;

use lopdf::{Document as LopdfDocument, Object};

use crate::extractors::pages::PageSet;
use crate::utils::error::ExtractError;

/// A run of text at a position on the page (PDF user space, y grows upward).
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Zero-based page index.
    pub index: usize,
    pub spans: Vec<TextSpan>,
}

/// Layout of the loaded pages, keyed by zero-based page index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedLayout {
    pages: BTreeMap<usize, PageLayout>,
}

impl LoadedLayout {
    pub fn insert(&mut self, page: PageLayout) {
        self.pages.insert(page.index, page);
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages of `set` that were loaded, in index order.
    pub fn pages_in<'a>(&'a self, set: &'a PageSet) -> impl Iterator<Item = &'a PageLayout> + 'a {
        set.iter().filter_map(move |i| self.pages.get(&i))
    }
}

/// Loads positioned text for a page subset of one opened document.
pub trait LayoutLoader: Send {
    fn load(&self, pages: &PageSet) -> Result<LoadedLayout, ExtractError>;
}

/// Layout loader that walks lopdf content streams.
pub struct LopdfLayoutLoader {
    doc: Arc<LopdfDocument>,
}

impl LopdfLayoutLoader {
    pub fn new(doc: Arc<LopdfDocument>) -> Self {
        Self { doc }
    }

    fn page_spans(&self, index: usize) -> Result<Vec<TextSpan>, ExtractError> {
        let pages = self.doc.get_pages();
        let page_id = pages.get(&(index as u32 + 1)).ok_or_else(|| {
            ExtractError::PageLoad(format!(
                "page {} is out of range (document has {} pages)",
                index,
                pages.len()
            ))
        })?;

        let fonts = self
            .doc
            .get_page_fonts(*page_id)
            .map_err(|e| ExtractError::PageLoad(e.to_string()))?;
        let content = self
            .doc
            .get_page_content(*page_id)
            .map_err(|e| ExtractError::PageLoad(e.to_string()))?;
        let content = lopdf::content::Content::decode(&content)
            .map_err(|e| ExtractError::PageLoad(e.to_string()))?;

        let mut spans = Vec::new();
        let mut font_name: Vec<u8> = Vec::new();
        let mut font_size: f32 = 12.0;
        let mut leading: f32 = 0.0;
        let mut matrix = TextMatrix::default();
        let mut in_text = false;

        for op in content.operations {
            match op.operator.as_str() {
                "BT" => {
                    in_text = true;
                    matrix = TextMatrix::default();
                }
                "ET" => in_text = false,
                "Tf" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        font_name = name.clone();
                    }
                    font_size = op.operands.get(1).and_then(get_number).unwrap_or(12.0);
                }
                "TL" => leading = op.operands.first().and_then(get_number).unwrap_or(0.0),
                "Td" | "TD" => {
                    let tx = op.operands.first().and_then(get_number).unwrap_or(0.0);
                    let ty = op.operands.get(1).and_then(get_number).unwrap_or(0.0);
                    if op.operator == "TD" {
                        leading = -ty;
                    }
                    matrix.translate(tx, ty);
                }
                "Tm" => {
                    let n: Vec<f32> = op.operands.iter().filter_map(get_number).collect();
                    if n.len() >= 6 {
                        matrix.set(n[0], n[1], n[2], n[3], n[4], n[5]);
                    }
                }
                "T*" => matrix.translate(0.0, -leading),
                "Tj" | "TJ" | "'" | "\"" if in_text => {
                    if op.operator != "Tj" && op.operator != "TJ" {
                        matrix.translate(0.0, -leading);
                    }
                    let operand = match op.operator.as_str() {
                        "\"" => op.operands.get(2),
                        _ => op.operands.first(),
                    };
                    let encoding = fonts
                        .get(&font_name)
                        .and_then(|f| f.get_font_encoding(&self.doc).ok());
                    let decode = |bytes: &[u8]| match &encoding {
                        Some(enc) => LopdfDocument::decode_text(enc, bytes).unwrap_or_default(),
                        None => String::from_utf8_lossy(bytes).into_owned(),
                    };
                    let text = match operand {
                        Some(Object::String(bytes, _)) => decode(bytes.as_slice()),
                        Some(Object::Array(items)) => items
                            .iter()
                            .map(|item| match item {
                                Object::String(bytes, _) => decode(bytes.as_slice()),
                                // Large negative kerning separates words.
                                other => match get_number(other) {
                                    Some(adj) if adj < -200.0 => " ".to_string(),
                                    _ => String::new(),
                                },
                            })
                            .collect(),
                        _ => String::new(),
                    };
                    if !text.trim().is_empty() {
                        let (x, y) = matrix.position();
                        spans.push(TextSpan::new(text.trim(), x, y, font_size * matrix.scale()));
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }
}

impl LayoutLoader for LopdfLayoutLoader {
    fn load(&self, pages: &PageSet) -> Result<LoadedLayout, ExtractError> {
        let mut layout = LoadedLayout::default();
        for index in pages.iter() {
            let spans = self.page_spans(index)?;
            tracing::debug!("Loaded layout for page {}: {} spans", index, spans.len());
            layout.insert(PageLayout { index, spans });
        }
        Ok(layout)
    }
}

#[derive(Debug, Clone, Copy)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self { a, b, c, d, e, f };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};

    /// One-page PDF of Courier text exercising each positioning operator.
    fn sample_pdf() -> LopdfDocument {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal("Statute")]),
                Operation::new("Td", vec![100.into(), 0.into()]),
                Operation::new("Tj", vec![Object::string_literal("Description")]),
                Operation::new("Td", vec![(-100).into(), (-14).into()]),
                Operation::new("Tj", vec![Object::string_literal("18 2701")]),
                Operation::new("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 300.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal("Bail Set")]),
                Operation::new(
                    "TJ",
                    vec![Object::Array(vec![
                        Object::string_literal("Arraignment"),
                        (-250).into(),
                        Object::string_literal("Court"),
                        (-50).into(),
                        Object::string_literal("Magistrate"),
                    ])],
                ),
                Operation::new("TL", vec![12.into()]),
                Operation::new("T*", vec![]),
                Operation::new("Tj", vec![Object::string_literal("Filed By")]),
                Operation::new("'", vec![Object::string_literal("Line Two")]),
                Operation::new("\"", vec![0.into(), 0.into(), Object::string_literal("Line Three")]),
                Operation::new("Tm", vec![2.into(), 0.into(), 0.into(), 2.into(), 100.into(), 100.into()]),
                Operation::new("Tj", vec![Object::string_literal("Big")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn walks_text_positions() {
        let loader = LopdfLayoutLoader::new(Arc::new(sample_pdf()));
        let first: PageSet = [0usize].into_iter().collect();
        let layout = loader.load(&first).unwrap();
        let spans = &layout.pages_in(&first).next().unwrap().spans;
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts[..3], ["Statute", "Description", "18 2701"]);
        assert_eq!((spans[0].x, spans[0].y), (50.0, 700.0));
        assert_eq!((spans[1].x, spans[1].y), (150.0, 700.0));
        assert_eq!((spans[2].x, spans[2].y), (50.0, 686.0));
    }

    #[test]
    fn handles_matrix_leading_and_kerning_operators() {
        let loader = LopdfLayoutLoader::new(Arc::new(sample_pdf()));
        let first: PageSet = [0usize].into_iter().collect();
        let layout = loader.load(&first).unwrap();
        let spans = &layout.pages_in(&first).next().unwrap().spans;
        let placed: Vec<(&str, f32, f32)> = spans[3..]
            .iter()
            .map(|s| (s.text.as_str(), s.x, s.y))
            .collect();
        assert_eq!(
            placed,
            vec![
                ("Bail Set", 300.0, 600.0),
                // Wide kerning becomes a space, narrow kerning does not.
                ("Arraignment CourtMagistrate", 300.0, 600.0),
                ("Filed By", 300.0, 588.0),
                ("Line Two", 300.0, 576.0),
                ("Line Three", 300.0, 564.0),
                ("Big", 100.0, 100.0),
            ]
        );
        assert_eq!(spans[3].font_size, 10.0);
        assert_eq!(spans[8].font_size, 20.0);
    }

    #[test]
    fn out_of_range_page_is_a_load_failure() {
        let loader = LopdfLayoutLoader::new(Arc::new(sample_pdf()));
        let err = loader.load(&[3usize].into_iter().collect()).unwrap_err();
        assert_eq!(err.kind(), "page_load");
    }

    #[test]
    fn pages_in_skips_unloaded_pages() {
        let mut layout = LoadedLayout::default();
        layout.insert(PageLayout { index: 2, spans: vec![] });
        let set: PageSet = [1usize, 2].into_iter().collect();
        let indices: Vec<usize> = layout.pages_in(&set).map(|p| p.index).collect();
        assert_eq!(indices, vec![2]);
    }
}
