// src/extractors/grammar.rs
//! The docket document format as data: section anchors, field labels and page
//! anchors. Everything that knows a literal from the court layout lives here.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionName {
    Docket,
    CaseInfo,
    Status,
    Calendar,
    Defendant,
    Participants,
    BailInfo,
    Charges,
    Dispo,
    ContactInfo,
    Entries,
}

impl SectionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionName::Docket => "docket",
            SectionName::CaseInfo => "caseinfo",
            SectionName::Status => "status",
            SectionName::Calendar => "calendar",
            SectionName::Defendant => "defendant",
            SectionName::Participants => "participants",
            SectionName::BailInfo => "bailinfo",
            SectionName::Charges => "charges",
            SectionName::Dispo => "dispo",
            SectionName::ContactInfo => "contactinfo",
            SectionName::Entries => "entries",
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the section grammar. `close == None` runs to end of text.
#[derive(Debug, Clone, Copy)]
pub struct SectionRule {
    pub name: SectionName,
    pub open: &'static str,
    pub close: Option<&'static str>,
}

/// Sections in canonical order.
pub const SECTION_GRAMMAR: [SectionRule; 11] = [
    SectionRule { name: SectionName::Docket, open: "DOCKET", close: Some("CASE INFORMATION") },
    SectionRule { name: SectionName::CaseInfo, open: "CASE INFORMATION", close: Some("STATUS INFORMATION") },
    SectionRule { name: SectionName::Status, open: "STATUS INFORMATION", close: Some("CALENDAR EVENTS") },
    SectionRule { name: SectionName::Calendar, open: "CALENDAR EVENTS", close: Some("DEFENDANT INFORMATION") },
    SectionRule { name: SectionName::Defendant, open: "DEFENDANT INFORMATION", close: Some("CASE PARTICIPANTS") },
    SectionRule { name: SectionName::Participants, open: "CASE PARTICIPANTS", close: Some("BAIL INFORMATION") },
    SectionRule { name: SectionName::BailInfo, open: "BAIL INFORMATION", close: Some("CHARGES") },
    SectionRule { name: SectionName::Charges, open: "CHARGES", close: Some("DISPOSITION SENTENCING") },
    SectionRule { name: SectionName::Dispo, open: "DISPOSITION SENTENCING/PENALTIES", close: Some("COMMONWEALTH INFORMATION") },
    SectionRule { name: SectionName::ContactInfo, open: "COMMONWEALTH INFORMATION", close: Some("ENTRIES") },
    SectionRule { name: SectionName::Entries, open: "ENTRIES", close: None },
];

// --- Boilerplate ---
/// Literal replacements, applied in order.
pub const BOILERPLATE_REPLACEMENTS: [(&str, &str); 4] = [
    ("\r", ""),
    ("\n", " "),
    ("CPCMS 9082", ""),
    ("MUNICIPAL COURT OF PHILADELPHIA COUNTY", ""),
];
pub const DISCLAIMER_PATTERN: &str = r"Recent entries made(?s:.*?)Section 9183";
pub const PRINTED_PATTERN: &str = r"Printed:(?s:.*?)\d{2}/\d{2}/\d{4}";

// --- Page anchors ---
pub const CHARGES_PAGE_ANCHOR: &str = "Statute Description";
pub const BAIL_PAGE_ANCHOR: &str = "Filed By";

// --- Layout tables ---
/// Charge table header labels, in column order.
pub const CHARGE_COLUMN_LABELS: [&str; 7] = [
    "Seq.", "Orig Seq.", "Grade", "Statute", "Description", "Offense Dt.", "OTN",
];
/// A line containing any of these ends the charges table.
pub const CHARGE_TABLE_END_MARKERS: [&str; 3] = ["DISPOSITION", "Printed:", "CPCMS"];
/// Docket entry whose "Filed By" column names the bail-setting magistrate.
pub const BAIL_ENTRY_MARKER: &str = "Bail Set";

// --- Field patterns ---
pub const DOCKET_NO_PATTERN: &str = r"MC-\d{2}-CR-\d{7}-\d{4}";
pub const ARREST_DATE_PATTERN: &str = r"Arrest Date:(.*?\d{2}/\d{2}/\d{4})";
pub const CASE_STATUS_PATTERN: &str = r"Case Status:(.*?)Arrest";
pub const OFFICER_PATTERN: &str = r"Arresting Officer :(.*?)Complaint/Incident";
pub const DOB_PATTERN: &str = r"Date Of Birth:(.*?)City";
pub const PRELIM_SPAN_PATTERN: &str = r"Calendar Event Type (.*?)Scheduled";
pub const DATE_TOKEN_PATTERN: &str = r"\d{2}/\d{2}/\d{4}";
pub const TIME_TOKEN_PATTERN: &str = r"(?:1[0-2]|0?[1-9]):[0-5][0-9](?:\s?[AaPp][Mm])?";
pub const ATTORNEY_PATTERN: &str = r"ATTORNEY INFORMATION Name:(.*?)(?:\d|Supreme)";
/// These conclude the attorney's name.
pub const ATTORNEY_ROLE_MARKERS: [&str; 3] = ["Public", "Private", "Court Appointed"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_is_in_canonical_order_and_chained() {
        let names: Vec<&str> = SECTION_GRAMMAR.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "docket", "caseinfo", "status", "calendar", "defendant", "participants",
                "bailinfo", "charges", "dispo", "contactinfo", "entries"
            ]
        );
        // Every close anchor is a prefix of the next section's open anchor.
        for pair in SECTION_GRAMMAR.windows(2) {
            let close = pair[0].close.expect("only the last rule is open-ended");
            assert!(pair[1].open.starts_with(close), "{} -> {}", pair[0].name, pair[1].name);
        }
        assert!(SECTION_GRAMMAR[10].close.is_none());
    }

    #[test]
    fn anchors_survive_boilerplate_rules() {
        for rule in SECTION_GRAMMAR.iter() {
            for (from, _) in BOILERPLATE_REPLACEMENTS.iter() {
                assert!(!rule.open.contains(from), "{} contains {:?}", rule.open, from);
            }
        }
    }
}
