// src/extractors/normalize.rs
use crate::extractors::grammar::{BOILERPLATE_REPLACEMENTS, DISCLAIMER_PATTERN, PRINTED_PATTERN};
use once_cell::sync::Lazy;
use regex::Regex;

static REMOVAL_RE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [DISCLAIMER_PATTERN, PRINTED_PATTERN]
        .iter()
        .map(|pat| Regex::new(pat).expect("boilerplate pattern must compile"))
        .collect()
});

/// Strips page boilerplate and line breaks so the section grammar can run over
/// a single line of text. Never fails; a rule that does not match is a no-op.
pub fn normalize(raw_text: &str) -> String {
    let mut text = apply_rules(raw_text);
    // A removal can splice two fragments into a fresh match, so run to a fixpoint.
    loop {
        let next = apply_rules(&text);
        if next == text {
            return text;
        }
        tracing::trace!("Normalization pass removed {} bytes", text.len() - next.len());
        text = next;
    }
}

fn apply_rules(input: &str) -> String {
    let mut text = input.to_string();
    for (from, to) in BOILERPLATE_REPLACEMENTS.iter() {
        text = text.replace(from, to);
    }
    for re in REMOVAL_RE.iter() {
        text = re.replace_all(&text, "").into_owned();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_headers_and_newlines() {
        let raw = "MUNICIPAL COURT OF PHILADELPHIA COUNTY\nDOCKET\nDocket Number: MC-51-CR-0012345-2020\r\nCPCMS 9082 CASE INFORMATION";
        let out = normalize(raw);
        assert!(!out.contains('\n'));
        assert!(!out.contains('\r'));
        assert!(!out.contains("CPCMS 9082"));
        assert_eq!(out, " DOCKET Docket Number: MC-51-CR-0012345-2020  CASE INFORMATION");
    }

    #[test]
    fn removes_disclaimer_across_lines() {
        let raw = "ENTRIES a\nRecent entries made in the court filing\noffices may not be reflected\nSection 9183 b";
        assert_eq!(normalize(raw), "ENTRIES a  b");
    }

    #[test]
    fn removes_printed_stamp_lazily() {
        let raw = "x Printed: 03/04/2021 y 05/06/2021";
        assert_eq!(normalize(raw), "x  y 05/06/2021");
    }

    #[test]
    fn missing_patterns_are_a_no_op() {
        assert_eq!(normalize("plain text"), "plain text");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn is_idempotent() {
        let samples = [
            "MUNICIPAL COURT OF PHILADELPHIA COUNTY\nA\nB",
            "Prin Recent entries made x Section 9183ted: 01/02/2020 tail",
            "CPCMS CPCMS 9082 9082 left",
            "Recent entries made Recent entries made z Section 9183 Section 9183",
            "Printed:\n01/02/2020Printed: 11/12/2021",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn fixpoint_catches_spliced_boilerplate() {
        // Removing the printed stamp exposes a complete disclaimer.
        let raw = "Recent entries Printed: 01/02/2020made x Section 9183 tail";
        assert_eq!(normalize(raw), " tail");
    }
}
