// src/extractors/fields.rs

// --- Imports ---
use crate::extractors::grammar::{
    ARREST_DATE_PATTERN, ATTORNEY_PATTERN, ATTORNEY_ROLE_MARKERS, CASE_STATUS_PATTERN,
    DATE_TOKEN_PATTERN, DOB_PATTERN, DOCKET_NO_PATTERN, OFFICER_PATTERN, PRELIM_SPAN_PATTERN,
    TIME_TOKEN_PATTERN,
};
use crate::utils::config::Strictness;
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

// --- Regex Patterns (Lazy Static) ---
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("field pattern must compile")
}

static DOCKET_NO_RE: Lazy<Regex> = Lazy::new(|| compile(DOCKET_NO_PATTERN));
static ARREST_DATE_RE: Lazy<Regex> = Lazy::new(|| compile(ARREST_DATE_PATTERN));
static CASE_STATUS_RE: Lazy<Regex> = Lazy::new(|| compile(CASE_STATUS_PATTERN));
static OFFICER_RE: Lazy<Regex> = Lazy::new(|| compile(OFFICER_PATTERN));
static DOB_RE: Lazy<Regex> = Lazy::new(|| compile(DOB_PATTERN));
static PRELIM_SPAN_RE: Lazy<Regex> = Lazy::new(|| compile(PRELIM_SPAN_PATTERN));
static DATE_TOKEN_RE: Lazy<Regex> = Lazy::new(|| compile(DATE_TOKEN_PATTERN));
static TIME_TOKEN_RE: Lazy<Regex> = Lazy::new(|| compile(TIME_TOKEN_PATTERN));
static ATTORNEY_RE: Lazy<Regex> = Lazy::new(|| compile(ATTORNEY_PATTERN));

/// Date and time of the preliminary hearing, as matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrelimHearing {
    pub date: String,
    pub time: String,
}

/// Per-field extraction over section text. Every field takes the first match
/// in its scope; strict mode turns a second, different match into an error.
pub struct FieldExtractor {
    strictness: Strictness,
}

impl FieldExtractor {
    pub fn new(strictness: Strictness) -> Self {
        Self { strictness }
    }

    /// Docket number, searched over the whole normalized document.
    pub fn docket_no(&self, document: &str) -> Result<String, ExtractError> {
        self.mandatory("docket_no", &DOCKET_NO_RE, document, 0)
    }

    pub fn arrest_date(&self, status: &str) -> Result<String, ExtractError> {
        self.mandatory("arrest_dt", &ARREST_DATE_RE, status, 1)
    }

    pub fn case_status(&self, status: &str) -> Result<String, ExtractError> {
        self.mandatory("case_status", &CASE_STATUS_RE, status, 1)
    }

    pub fn arresting_officer(&self, caseinfo: &str) -> Result<String, ExtractError> {
        self.mandatory("arresting_officer", &OFFICER_RE, caseinfo, 1)
    }

    pub fn date_of_birth(&self, defendant: &str) -> Result<String, ExtractError> {
        self.mandatory("dob", &DOB_RE, defendant, 1)
    }

    /// Takes the first "Calendar Event Type ... Scheduled" span, then the first
    /// date token and the first clock time inside it. The two are not checked
    /// against each other.
    pub fn prelim_hearing(&self, calendar: &str) -> Result<PrelimHearing, ExtractError> {
        let span = PRELIM_SPAN_RE
            .captures(calendar)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or(ExtractError::FieldNotFound { field: "prelim_hearing_dt" })?;

        let date = self.mandatory("prelim_hearing_dt", &DATE_TOKEN_RE, span, 0)?;
        let time = self.mandatory("prelim_hearing_time", &TIME_TOKEN_RE, span, 0)?;
        Ok(PrelimHearing { date, time })
    }

    /// Defense attorney name, or an empty string when the contact section has
    /// no attorney label.
    pub fn attorney(&self, contactinfo: &str) -> String {
        match ATTORNEY_RE.captures(contactinfo).and_then(|caps| caps.get(1)) {
            Some(m) => truncate_at_role_marker(m.as_str().trim()),
            None => {
                tracing::debug!("No attorney label in contact section, leaving attorney empty");
                String::new()
            }
        }
    }

    fn mandatory(
        &self,
        field: &'static str,
        re: &Regex,
        haystack: &str,
        group: usize,
    ) -> Result<String, ExtractError> {
        let mut values = re
            .captures_iter(haystack)
            .filter_map(|caps| caps.get(group).map(|m| m.as_str().trim()));
        let first = values.next().ok_or(ExtractError::FieldNotFound { field })?;

        // The same value printed again (page headers) is not ambiguous.
        if self.strictness == Strictness::Strict {
            let distinct: BTreeSet<&str> = values.chain([first]).collect();
            if distinct.len() > 1 {
                return Err(ExtractError::AmbiguousField { field, count: distinct.len() });
            }
        }

        tracing::trace!("Field '{}' = '{}'", field, first);
        Ok(first.to_string())
    }
}

/// Cuts the name at the earliest role marker; the role concludes the name.
pub fn truncate_at_role_marker(captured: &str) -> String {
    let cut = ATTORNEY_ROLE_MARKERS
        .iter()
        .filter_map(|marker| captured.find(marker))
        .min()
        .unwrap_or(captured.len());
    captured[..cut].trim().to_string()
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn lenient() -> FieldExtractor {
        FieldExtractor::new(Strictness::Lenient)
    }

    #[test]
    fn docket_number_matches_fixed_shape() {
        let doc = "DOCKET Docket Number: MC-51-CR-0012345-2020 CASE INFORMATION";
        assert_eq!(lenient().docket_no(doc).unwrap(), "MC-51-CR-0012345-2020");
        assert_eq!(
            lenient().docket_no("MC-51-CR-001234-2020").unwrap_err(),
            ExtractError::FieldNotFound { field: "docket_no" }
        );
    }

    #[test]
    fn status_fields() {
        let status = "Case Status: Active Status Date Processing Status Arrest Date: 01/02/2020";
        assert_eq!(lenient().case_status(status).unwrap(), "Active Status Date Processing Status");
        assert_eq!(lenient().arrest_date(status).unwrap(), "01/02/2020");
    }

    #[test]
    fn malformed_dates_pass_through() {
        let status = "Case Status: Closed Arrest Date: 13/40/2099";
        assert_eq!(lenient().arrest_date(status).unwrap(), "13/40/2099");
    }

    #[test]
    fn officer_and_dob_are_trimmed() {
        let caseinfo = "Judge Assigned: Arresting Officer :   JONES, BOB   Complaint/Incident #: 17";
        assert_eq!(lenient().arresting_officer(caseinfo).unwrap(), "JONES, BOB");
        let defendant = "Date Of Birth: 04/05/1990 City/State/Zip: Philadelphia, PA";
        assert_eq!(lenient().date_of_birth(defendant).unwrap(), "04/05/1990");
    }

    #[test]
    fn prelim_hearing_takes_first_date_and_time() {
        let calendar = "Case Calendar Event Type Preliminary Hearing 02/03/2020 9:00 am 1001 Scheduled 03/03/2020 10:30 am";
        let prelim = lenient().prelim_hearing(calendar).unwrap();
        assert_eq!(prelim.date, "02/03/2020");
        assert_eq!(prelim.time, "9:00 am");
    }

    #[test]
    fn prelim_time_meridiem_is_optional() {
        let calendar = "Calendar Event Type Preliminary Hearing 02/03/2020 12:45 Room 1 Scheduled";
        assert_eq!(lenient().prelim_hearing(calendar).unwrap().time, "12:45");
    }

    #[test]
    fn missing_prelim_span_names_date_field() {
        let err = lenient().prelim_hearing("Event Start Date").unwrap_err();
        assert_eq!(err, ExtractError::FieldNotFound { field: "prelim_hearing_dt" });
        let err = lenient()
            .prelim_hearing("Calendar Event Type Preliminary Hearing 02/03/2020 Scheduled")
            .unwrap_err();
        assert_eq!(err, ExtractError::FieldNotFound { field: "prelim_hearing_time" });
    }

    #[test]
    fn attorney_is_truncated_at_role_marker() {
        assert_eq!(truncate_at_role_marker("JANE DOE Public Defender's Office"), "JANE DOE");
        assert_eq!(truncate_at_role_marker("JOHN ROE Court Appointed Private"), "JOHN ROE");
        assert_eq!(truncate_at_role_marker("JOHN ROE"), "JOHN ROE");

        let contact = "ATTORNEY INFORMATION Name: JANE DOE Public Defender Supreme Court No: 012345";
        assert_eq!(lenient().attorney(contact), "JANE DOE");
    }

    #[test]
    fn absent_attorney_label_is_empty_not_an_error() {
        assert_eq!(lenient().attorney("Name: District Attorney Supreme Court No: 1"), "");
    }

    #[test]
    fn first_match_wins_unless_strict() {
        let status = "Case Status: Active Arrest Date: 01/02/2020 Arrest Date: 05/06/2020";
        assert_eq!(lenient().arrest_date(status).unwrap(), "01/02/2020");
        let strict = FieldExtractor::new(Strictness::Strict);
        assert_eq!(
            strict.arrest_date(status).unwrap_err(),
            ExtractError::AmbiguousField { field: "arrest_dt", count: 2 }
        );
    }

    #[test]
    fn strict_mode_allows_identical_repeats() {
        let strict = FieldExtractor::new(Strictness::Strict);
        let doc = "MC-51-CR-0012345-2020 page 2 MC-51-CR-0012345-2020 page 3 MC-51-CR-0012345-2020";
        assert_eq!(strict.docket_no(doc).unwrap(), "MC-51-CR-0012345-2020");
        let doc = format!("{} MC-51-CR-0000001-2021 MC-51-CR-0000002-2021", doc);
        assert_eq!(
            strict.docket_no(&doc).unwrap_err(),
            ExtractError::AmbiguousField { field: "docket_no", count: 3 }
        );
    }
}
