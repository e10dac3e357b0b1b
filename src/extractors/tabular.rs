// src/extractors/tabular.rs
//! Positional extraction for the two fields plain text cannot recover
//! reliably: the charges table and the magistrate who set bail.

use crate::extractors::grammar::{
    BAIL_ENTRY_MARKER, BAIL_PAGE_ANCHOR, CHARGE_COLUMN_LABELS, CHARGE_TABLE_END_MARKERS,
};
use crate::extractors::pages::PageSet;
use crate::models::Charge;
use crate::pdf::layout::{LoadedLayout, PageLayout, TextSpan};

/// Row-level extraction over loaded page layouts.
pub trait TabularExtractor: Send + Sync {
    /// Charge rows found on `pages`, in page then row order.
    fn charges(&self, layout: &LoadedLayout, pages: &PageSet) -> Vec<Charge>;

    /// Name of the bail-setting magistrate, or an empty string.
    fn bail_set_by(&self, layout: &LoadedLayout, pages: &PageSet) -> String;
}

/// Rebuilds table lines from span baselines and buckets spans into columns by x.
pub struct PositionalTableExtractor {
    /// Spans whose baselines differ by at most this much share a line.
    line_tolerance: f32,
}

impl Default for PositionalTableExtractor {
    fn default() -> Self {
        Self { line_tolerance: 2.0 }
    }
}

struct Line<'a> {
    y: f32,
    spans: Vec<&'a TextSpan>,
}

impl Line<'_> {
    fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl PositionalTableExtractor {
    /// Lines top-down, spans left to right.
    fn lines<'a>(&self, page: &'a PageLayout) -> Vec<Line<'a>> {
        let mut spans: Vec<&TextSpan> = page.spans.iter().collect();
        spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        let mut lines: Vec<Line> = Vec::new();
        for span in spans {
            match lines.last_mut() {
                Some(line) if (line.y - span.y).abs() <= self.line_tolerance => {
                    line.spans.push(span)
                }
                _ => lines.push(Line { y: span.y, spans: vec![span] }),
            }
        }
        for line in &mut lines {
            line.spans.sort_by(|a, b| a.x.total_cmp(&b.x));
        }
        lines
    }

    /// Column starts taken from the header line, sorted by x.
    fn charge_columns(&self, header: &Line) -> Vec<(usize, f32)> {
        let mut columns: Vec<(usize, f32)> = header
            .spans
            .iter()
            .filter_map(|span| {
                CHARGE_COLUMN_LABELS
                    .iter()
                    .position(|label| span.text.trim() == *label)
                    .map(|col| (col, span.x))
            })
            .collect();
        columns.sort_by(|a, b| a.1.total_cmp(&b.1));
        columns
    }

    fn charges_on_page(&self, page: &PageLayout, charges: &mut Vec<Charge>) {
        let lines = self.lines(page);
        let Some(header_idx) = lines.iter().position(is_charge_header) else {
            tracing::debug!("No charge table header on page {}", page.index);
            return;
        };

        let columns = self.charge_columns(&lines[header_idx]);
        let statute_col = CHARGE_COLUMN_LABELS.iter().position(|l| *l == "Statute");
        if !columns.iter().any(|(col, _)| Some(*col) == statute_col) {
            tracing::warn!("Charge header on page {} has no positioned Statute column", page.index);
            return;
        }

        for line in &lines[header_idx + 1..] {
            let text = line.text();
            if is_charge_header(line)
                || CHARGE_TABLE_END_MARKERS.iter().any(|m| text.contains(m))
            {
                break;
            }

            let mut cells: [Vec<&str>; 7] = Default::default();
            for span in &line.spans {
                let col = columns
                    .iter()
                    .rev()
                    .find(|(_, x)| span.x + self.line_tolerance >= *x)
                    .or(columns.first())
                    .map(|(col, _)| *col)
                    .unwrap_or(0);
                cells[col].push(span.text.trim());
            }
            let cell = |i: usize| cells[i].join(" ");

            if cell(3).is_empty() {
                // Wrapped description text belongs to the row above.
                if let Some(prev) = charges.last_mut() {
                    let more = cell(4);
                    if !more.is_empty() {
                        prev.description = format!("{} {}", prev.description, more).trim().to_string();
                    }
                }
                continue;
            }

            charges.push(Charge {
                sequence: cell(0),
                original_sequence: cell(1),
                grade: cell(2),
                statute: cell(3),
                description: cell(4),
                offense_date: cell(5),
                otn: cell(6),
            });
        }
    }

    fn bail_on_page(&self, page: &PageLayout) -> Option<String> {
        let lines = self.lines(page);
        let (header_idx, header) = lines
            .iter()
            .enumerate()
            .find(|(_, line)| line.spans.iter().any(|s| s.text.contains(BAIL_PAGE_ANCHOR)))?;

        let start = header
            .spans
            .iter()
            .find(|s| s.text.contains(BAIL_PAGE_ANCHOR))
            .map(|s| s.x)?;
        let end = header
            .spans
            .iter()
            .map(|s| s.x)
            .filter(|x| *x > start)
            .fold(f32::INFINITY, f32::min);

        lines[header_idx + 1..]
            .iter()
            .filter(|line| line.text().contains(BAIL_ENTRY_MARKER))
            .map(|line| {
                line.spans
                    .iter()
                    .filter(|s| s.x + self.line_tolerance >= start && s.x < end)
                    .map(|s| s.text.trim())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .find(|name| !name.is_empty())
    }
}

fn is_charge_header(line: &Line) -> bool {
    let text = line.text();
    text.contains("Statute") && text.contains("Description")
}

impl TabularExtractor for PositionalTableExtractor {
    fn charges(&self, layout: &LoadedLayout, pages: &PageSet) -> Vec<Charge> {
        let mut charges = Vec::new();
        if layout.is_empty() {
            return charges;
        }
        for page in layout.pages_in(pages) {
            self.charges_on_page(page, &mut charges);
        }
        tracing::debug!("Extracted {} charge rows", charges.len());
        charges
    }

    fn bail_set_by(&self, layout: &LoadedLayout, pages: &PageSet) -> String {
        layout
            .pages_in(pages)
            .find_map(|page| self.bail_on_page(page))
            .unwrap_or_default()
    }
}
