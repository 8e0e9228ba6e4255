//! Parse LLM output into fact strings

use tracing::{debug, warn};

/// Collect the facts from a marker-bulleted LLM response
///
/// A line is a fact iff it starts with `marker`; the marker is stripped and
/// the remainder is kept as is. A remainder with no visible text is skipped.
/// All other lines (preamble, commentary) are discarded.
///
/// # Examples
///
/// ```
/// use factrag_extractor::parse_marked_lines;
///
/// let response = "Here are the facts:\n--- Copper rose 2%.\n--- Tin fell.\nHope this helps!";
/// assert_eq!(parse_marked_lines(response, "--- "), vec!["Copper rose 2%.", "Tin fell."]);
/// ```
pub fn parse_marked_lines(response: &str, marker: &str) -> Vec<String> {
    let mut facts = Vec::new();
    let mut discarded = 0usize;

    for line in response.lines() {
        match line.strip_prefix(marker) {
            Some(rest) if !rest.trim().is_empty() => facts.push(rest.to_string()),
            _ => discarded += 1,
        }
    }

    if facts.is_empty() && !response.trim().is_empty() {
        warn!("LLM response contained no marked fact lines");
    } else if discarded > 0 {
        debug!("Discarded {} unmarked lines from LLM response", discarded);
    }

    facts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_only_marked_lines() {
        let response = "Sure! Facts below.\n\n--- A fact.\n-- not a fact\n---no space\n--- Another fact.\n";
        assert_eq!(parse_marked_lines(response, "--- "), vec!["A fact.", "Another fact."]);
    }

    #[test]
    fn test_remainder_not_trimmed() {
        let response = "--- Padded fact.   ";
        assert_eq!(parse_marked_lines(response, "--- "), vec!["Padded fact.   "]);
    }

    #[test]
    fn test_indented_marker_discarded() {
        assert!(parse_marked_lines("  --- indented", "--- ").is_empty());
    }

    #[test]
    fn test_empty_remainder_skipped() {
        assert!(parse_marked_lines("--- \n---    ", "--- ").is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(parse_marked_lines("--- One.\r\n--- Two.\r\n", "--- "), vec!["One.", "Two."]);
    }

    #[test]
    fn test_empty_response() {
        assert!(parse_marked_lines("", "--- ").is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: every fact is the tail of a response line that carried the marker
        #[test]
        fn test_facts_come_from_marked_lines(response in "[a-z\\- \n]{0,200}") {
            let facts = parse_marked_lines(&response, "--- ");
            let marked: Vec<&str> = response
                .lines()
                .filter_map(|line| line.strip_prefix("--- "))
                .collect();
            for fact in &facts {
                prop_assert!(marked.contains(&fact.as_str()));
            }
            prop_assert!(facts.len() <= marked.len());
        }
    }
}
