// src/models.rs
use serde::{Deserialize, Serialize};

/// Page text of one input file, as handed over by a text source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub full_text: String,
    pub pages: Vec<String>,
}

impl RawDocument {
    pub fn from_pages(pages: Vec<String>) -> Self {
        Self {
            full_text: pages.join("\n"),
            pages,
        }
    }

    pub fn has_text(&self) -> bool {
        self.pages.iter().any(|p| !p.trim().is_empty())
    }
}

/// One row of the charges table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub sequence: String,
    pub original_sequence: String,
    pub grade: String,
    pub statute: String,
    pub description: String,
    pub offense_date: String,
    pub otn: String,
}

/// Extracted docket. Dates and times are kept exactly as matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocketRecord {
    pub docket_no: String,
    pub offenses: Vec<Charge>,
    pub arrest_dt: String,
    pub case_status: String,
    pub arresting_officer: String,
    pub attorney: String,
    pub dob: String,
    pub bail_set_by: String,
    pub prelim_hearing_dt: String,
    pub prelim_hearing_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_text_joins_pages_in_order() {
        let doc = RawDocument::from_pages(vec!["a".into(), "b".into()]);
        assert_eq!(doc.full_text, "a\nb");
        assert!(doc.has_text());
        assert!(!RawDocument::from_pages(vec![" \n".into()]).has_text());
    }

    #[test]
    fn record_serializes_with_schema_field_names() {
        let record = DocketRecord {
            docket_no: "MC-51-CR-0012345-2020".into(),
            offenses: vec![],
            arrest_dt: "01/02/2020".into(),
            case_status: "Active".into(),
            arresting_officer: "JONES, BOB".into(),
            attorney: String::new(),
            dob: "04/05/1990".into(),
            bail_set_by: String::new(),
            prelim_hearing_dt: "02/03/2020".into(),
            prelim_hearing_time: "9:00 am".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        for key in [
            "docket_no", "offenses", "arrest_dt", "case_status", "arresting_officer",
            "attorney", "dob", "bail_set_by", "prelim_hearing_dt", "prelim_hearing_time",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["attorney"], "");
    }
}
