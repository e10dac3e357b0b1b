// src/extractors/docket.rs
use crate::extractors::fields::FieldExtractor;
use crate::extractors::grammar::SectionName;
use crate::extractors::normalize::normalize;
use crate::extractors::pages::PageAddress;
use crate::extractors::section::{SectionSegmenter, Sections};
use crate::extractors::tabular::{PositionalTableExtractor, TabularExtractor};
use crate::models::{DocketRecord, RawDocument};
use crate::pdf::layout::LayoutLoader;
use crate::utils::config::Strictness;
use crate::utils::error::{ExtractError, ParseError};

/// Turns one document's text and layout into a [`DocketRecord`].
///
/// Holds no per-document state, so one parser can serve every worker.
pub struct DocketParser {
    segmenter: SectionSegmenter,
    fields: FieldExtractor,
    tables: Box<dyn TabularExtractor>,
}

impl DocketParser {
    pub fn new(strictness: Strictness) -> Self {
        Self::with_tables(strictness, Box::new(PositionalTableExtractor::default()))
    }

    pub fn with_tables(strictness: Strictness, tables: Box<dyn TabularExtractor>) -> Self {
        Self {
            segmenter: SectionSegmenter::new(strictness),
            fields: FieldExtractor::new(strictness),
            tables,
        }
    }

    /// Normalized text and its sections. Also the first step of [`parse`](Self::parse).
    pub fn sections(&self, raw: &RawDocument) -> Result<(String, Sections), ExtractError> {
        let text = normalize(&raw.full_text);
        let sections = self.segmenter.segment(&text)?;
        tracing::trace!(
            "Segmented {:?}",
            sections.iter().map(|s| (s.name, s.text.len())).collect::<Vec<_>>()
        );
        Ok((text, sections))
    }

    pub fn parse(
        &self,
        file_name: &str,
        raw: &RawDocument,
        layout: &dyn LayoutLoader,
    ) -> Result<DocketRecord, ParseError> {
        let (text, sections) = self.sections(raw).map_err(|e| failure(file_name, e))?;
        self.parse_segmented(file_name, raw, &text, &sections, layout)
    }

    /// Same as [`parse`](Self::parse), continuing from an earlier
    /// [`sections`](Self::sections) call on `raw`.
    pub fn parse_segmented(
        &self,
        file_name: &str,
        raw: &RawDocument,
        text: &str,
        sections: &Sections,
        layout: &dyn LayoutLoader,
    ) -> Result<DocketRecord, ParseError> {
        self.extract(raw, text, sections, layout)
            .map_err(|e| failure(file_name, e))
    }

    fn extract(
        &self,
        raw: &RawDocument,
        text: &str,
        sections: &Sections,
        layout: &dyn LayoutLoader,
    ) -> Result<DocketRecord, ExtractError> {
        // Phase 1 (text) is done by the caller.
        let address = PageAddress::locate(&raw.pages);
        if address.charges.is_empty() {
            tracing::debug!("No page mentions the charges table");
        }

        // Phase 2: layout for the addressed pages; dropped when this call returns.
        let loaded = layout.load(&address.load_set())?;

        let docket_no = self.fields.docket_no(text)?;
        let arrest_dt = self.fields.arrest_date(sections.get(SectionName::Status))?;
        let case_status = self.fields.case_status(sections.get(SectionName::Status))?;
        let arresting_officer = self.fields.arresting_officer(sections.get(SectionName::CaseInfo))?;
        let dob = self.fields.date_of_birth(sections.get(SectionName::Defendant))?;
        let prelim = self.fields.prelim_hearing(sections.get(SectionName::Calendar))?;

        let attorney = self.fields.attorney(sections.get(SectionName::ContactInfo));
        let offenses = self.tables.charges(&loaded, &address.charges);
        let bail_set_by = self.tables.bail_set_by(&loaded, &address.bail);

        tracing::debug!(
            "Parsed {} with {} offenses from {} layout pages",
            docket_no,
            offenses.len(),
            loaded.len()
        );

        Ok(DocketRecord {
            docket_no,
            offenses,
            arrest_dt,
            case_status,
            arresting_officer,
            attorney,
            dob,
            bail_set_by,
            prelim_hearing_dt: prelim.date,
            prelim_hearing_time: prelim.time,
        })
    }
}

fn failure(file_name: &str, source: ExtractError) -> ParseError {
    tracing::debug!("{}: {} ({})", file_name, source, source.kind());
    ParseError {
        file: file_name.to_string(),
        source,
    }
}
