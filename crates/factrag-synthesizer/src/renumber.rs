//! Renumbering of `[n]` source citations

use crate::error::SynthError;
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Write;

/// Header that starts the end notes
pub const SOURCES_HEADER: &str = "\n\n--- SOURCES ---\n\n";

/// End-notes body when the text cites nothing
pub const NO_CITATIONS: &str = "No citations provided.";

/// Renumber `[n]` citations in order of first appearance and append end notes
///
/// `number_to_source` maps the numbers used in `text` to source URIs. The
/// first distinct number becomes `[1]`, the next `[2]` and so on; end notes
/// list `k: <uri>` once per new number. Text without citations gets the
/// header followed by [`NO_CITATIONS`].
///
/// # Examples
///
/// ```
/// use factrag_synthesizer::renumber_source_citations;
/// use std::collections::HashMap;
///
/// let sources = HashMap::from([(7, "https://a.example".to_string()), (3, "https://b.example".to_string())]);
/// let out = renumber_source_citations("B [3], A [7], B again [3].", &sources).unwrap();
/// assert_eq!(
///     out,
///     "B [1], A [2], B again [1].\n\n--- SOURCES ---\n\n1: https://b.example\n2: https://a.example\n"
/// );
/// ```
pub fn renumber_source_citations(
    text: &str,
    number_to_source: &HashMap<u64, String>,
) -> Result<String, SynthError> {
    let pattern = Regex::new(r"\[(\d+)\]")?;
    let mut renumbered: HashMap<u64, u64> = HashMap::new();
    let mut notes = String::from(SOURCES_HEADER);
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in pattern.captures_iter(text) {
        let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let old: u64 = digits
            .as_str()
            .parse()
            .map_err(|_| SynthError::NotFound(format!("source number {}", digits.as_str())))?;
        let source = number_to_source
            .get(&old)
            .ok_or_else(|| SynthError::NotFound(format!("source number {}", old)))?;

        let next = renumbered.len() as u64 + 1;
        let new = *renumbered.entry(old).or_insert_with(|| {
            let _ = writeln!(notes, "{}: {}", next, source);
            next
        });

        out.push_str(&text[last..whole.start()]);
        let _ = write!(out, "[{}]", new);
        last = whole.end();
    }

    if renumbered.is_empty() {
        return Ok(format!("{}{}{}", text, SOURCES_HEADER, NO_CITATIONS));
    }

    out.push_str(&text[last..]);
    out.push_str(&notes);
    Ok(out)
}
