// src/utils/text_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;
use crate::extractors::grammar::SectionName;
use crate::utils::error::StorageError;

/// Wraps each section span of the normalized text in `[[name>> ... <<name]]`
/// markers so a broken anchor shows up at a glance.
pub fn annotate_sections(text: &str, bounds: &[(SectionName, usize, usize)]) -> String {
    let mut annotated = String::with_capacity(text.len() + bounds.len() * 32);
    let mut sorted = bounds.to_vec();
    sorted.sort_by_key(|b| b.1);

    let mut last_pos = 0;
    for (name, start, end) in sorted {
        // Overlapping spans only happen with repeated anchors; skip them.
        if start < last_pos {
            continue;
        }
        annotated.push_str(&text[last_pos..start]);
        annotated.push_str(&format!("\n[[{}>>", name));
        annotated.push_str(&text[start..end]);
        annotated.push_str(&format!("<<{}]]\n", name));
        last_pos = end;
    }
    annotated.push_str(&text[last_pos..]);
    annotated
}

/// Writes the annotated text to `filename`.
pub fn save_debug_text(
    text: &str,
    filename: &Path,
    bounds: &[(SectionName, usize, usize)],
) -> Result<(), StorageError> {
    let mut file = File::create(filename)?;
    file.write_all(annotate_sections(text, bounds).as_bytes())?;
    tracing::info!("Saved annotated text to {}", filename.display());
    Ok(())
}
