// src/extractors/section.rs

// --- Imports ---
use crate::extractors::grammar::{SectionName, SectionRule, SECTION_GRAMMAR};
use crate::utils::config::Strictness;
use crate::utils::error::ExtractError;
use serde::Serialize;

// --- Data Structures ---
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub name: SectionName,
    pub text: String,
}

/// All eleven sections of one document, in canonical order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sections {
    sections: Vec<Section>,
}

impl Sections {
    pub fn get(&self, name: SectionName) -> &str {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.text.as_str())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }
}

// --- Main Segmenter Structure ---
pub struct SectionSegmenter {
    strictness: Strictness,
}

impl SectionSegmenter {
    pub fn new(strictness: Strictness) -> Self {
        Self { strictness }
    }

    /// Splits normalized text into the canonical sections. Fails on the first
    /// section whose anchors cannot be located.
    pub fn segment(&self, text: &str) -> Result<Sections, ExtractError> {
        let mut sections = Vec::with_capacity(SECTION_GRAMMAR.len());

        for rule in SECTION_GRAMMAR.iter() {
            if self.strictness == Strictness::Strict {
                let count = delimited_spans(text, rule);
                if count > 1 {
                    tracing::debug!("Anchor '{}' repeats {} times", rule.open, count);
                    return Err(ExtractError::AmbiguousAnchor { anchor: rule.open, count });
                }
            }

            let body = find_section(text, rule).ok_or_else(|| {
                let anchor = match rule.close {
                    Some(close) if text.contains(rule.open) => close,
                    _ => rule.open,
                };
                ExtractError::Segmentation { section: rule.name, anchor }
            })?;

            tracing::trace!("Section '{}': {} bytes", rule.name, body.len());
            sections.push(Section {
                name: rule.name,
                text: body.trim().to_string(),
            });
        }

        Ok(Sections { sections })
    }
}

/// Leftmost open anchor that has a close anchor after it, then the nearest close.
fn find_section<'a>(text: &'a str, rule: &SectionRule) -> Option<&'a str> {
    for (start, _) in text.match_indices(rule.open) {
        let body_start = start + rule.open.len();
        let rest = &text[body_start..];
        match rule.close {
            None => return Some(rest),
            Some(close) => {
                if let Some(end) = rest.find(close) {
                    return Some(&rest[..end]);
                }
            }
        }
    }
    None
}

/// Number of disjoint open..close spans. An open anchor nested inside an
/// earlier span ("CRIMINAL DOCKET" before "CASE INFORMATION") does not start a
/// new one. Without a close anchor every occurrence counts.
fn delimited_spans(text: &str, rule: &SectionRule) -> usize {
    let Some(close) = rule.close else {
        return text.matches(rule.open).count();
    };
    let mut count = 0;
    let mut pos = 0;
    while let Some(start) = text[pos..].find(rule.open) {
        let body_start = pos + start + rule.open.len();
        match text[body_start..].find(close) {
            Some(end) => {
                count += 1;
                pos = body_start + end + close.len();
            }
            None => break,
        }
    }
    count
}

/// Byte offsets of each section boundary, for annotated debug output.
pub fn boundaries(text: &str) -> Vec<(SectionName, usize, usize)> {
    SECTION_GRAMMAR
        .iter()
        .filter_map(|rule| {
            let body = find_section(text, rule)?;
            let start = body.as_ptr() as usize - text.as_ptr() as usize;
            Some((rule.name, start, start + body.len()))
        })
        .collect()
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(fillers: &[&str]) -> String {
        SECTION_GRAMMAR
            .iter()
            .zip(fillers)
            .map(|(rule, filler)| format!("{} {} ", rule.open, filler))
            .collect()
    }

    const FILLERS: [&str; 11] = [
        "Docket Number: MC-51-CR-0012345-2020",
        "Judge Assigned: Smith Arresting Officer : JONES, BOB Complaint/Incident #: 1",
        "Case Status: Active Arrest Date: 01/02/2020",
        "Calendar Event Type Preliminary Hearing 02/03/2020 9:00 am Scheduled",
        "Date Of Birth: 04/05/1990 City/State/Zip: Philadelphia, PA",
        "Participant Type Name Defendant",
        "Bail Action Set",
        "Seq. Orig Seq. Grade Statute Description",
        "Disposition Case Event",
        "ATTORNEY INFORMATION Name: JANE DOE Public Defender 1234",
        "Sequence Number Filed By",
    ];

    #[test]
    fn segments_all_eleven_sections_in_order() {
        let text = assemble(&FILLERS);
        let sections = SectionSegmenter::new(Strictness::Lenient).segment(&text).unwrap();
        assert_eq!(sections.len(), 11);
        let rebuilt: Vec<&str> = sections.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(rebuilt, FILLERS.to_vec());
        assert_eq!(sections.get(SectionName::Status), FILLERS[2]);
    }

    #[test]
    fn charges_section_stops_before_disposition_heading() {
        let text = assemble(&FILLERS);
        let sections = SectionSegmenter::new(Strictness::Lenient).segment(&text).unwrap();
        assert!(!sections.get(SectionName::Charges).contains("DISPOSITION"));
        assert_eq!(sections.get(SectionName::Dispo), "Disposition Case Event");
    }

    #[test]
    fn missing_anchor_is_a_segmentation_error() {
        let text = assemble(&FILLERS).replace("BAIL INFORMATION", "BAIL");
        let err = SectionSegmenter::new(Strictness::Lenient).segment(&text).unwrap_err();
        assert_eq!(
            err,
            ExtractError::Segmentation {
                section: SectionName::Participants,
                anchor: "BAIL INFORMATION",
            }
        );
    }

    #[test]
    fn repeated_open_anchor_uses_first_occurrence_in_lenient_mode() {
        let text = assemble(&FILLERS).replace(
            "STATUS INFORMATION",
            "STATUS INFORMATION Case Status: Closed Arrest STATUS INFORMATION",
        );
        let sections = SectionSegmenter::new(Strictness::Lenient).segment(&text).unwrap();
        assert_eq!(sections.get(SectionName::Status), "Case Status: Closed Arrest STATUS INFORMATION Case Status: Active Arrest Date: 01/02/2020");
    }

    #[test]
    fn strict_mode_rejects_repeated_open_anchor() {
        let text = format!("{} ENTRIES again", assemble(&FILLERS));
        let err = SectionSegmenter::new(Strictness::Strict).segment(&text).unwrap_err();
        assert_eq!(err, ExtractError::AmbiguousAnchor { anchor: "ENTRIES", count: 2 });
    }

    #[test]
    fn strict_mode_ignores_anchor_nested_in_its_own_section() {
        let mut fillers = FILLERS;
        fillers[0] = "Docket Number: MC-51-CR-0012345-2020 CRIMINAL DOCKET";
        let text = assemble(&fillers);
        let sections = SectionSegmenter::new(Strictness::Strict).segment(&text).unwrap();
        assert_eq!(sections.get(SectionName::Docket), fillers[0]);
    }

    #[test]
    fn strict_mode_rejects_repeated_delimited_section() {
        let text = format!(
            "{} STATUS INFORMATION Case Status: Closed CALENDAR EVENTS",
            assemble(&FILLERS)
        );
        let err = SectionSegmenter::new(Strictness::Strict).segment(&text).unwrap_err();
        assert_eq!(err, ExtractError::AmbiguousAnchor { anchor: "STATUS INFORMATION", count: 2 });
    }

    #[test]
    fn segmentation_is_deterministic() {
        let text = assemble(&FILLERS);
        let segmenter = SectionSegmenter::new(Strictness::Lenient);
        assert_eq!(segmenter.segment(&text).unwrap(), segmenter.segment(&text).unwrap());
    }

    #[test]
    fn boundaries_cover_every_section() {
        let text = assemble(&FILLERS);
        let bounds = boundaries(&text);
        assert_eq!(bounds.len(), 11);
        let (name, start, end) = bounds[0];
        assert_eq!(name, SectionName::Docket);
        assert_eq!(text[start..end].trim(), FILLERS[0]);
    }
}
