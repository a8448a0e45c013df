//! Permissive extraction of the analysis JSON from a raw model reply.
//!
//! Reasoning models wrap their answer in `<think>…</think>` and often add
//! prose or markdown fences around the JSON object. This module strips the
//! reasoning block, takes the outermost `{…}` span of what remains, and
//! parses it with every list field defaulted. Any irregularity yields `None`
//! and the pipeline degrades — parse failures are never an error class.

use tracklab_core::types::AnalysisReport;

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

/// Parse a raw reply into a report, or `None` if no usable JSON is present.
pub fn parse_reply(raw: &str) -> Option<AnalysisReport> {
    let text = strip_reasoning(raw);
    let span = extract_json_object(text)?;
    serde_json::from_str(span).ok()
}

/// Drop everything up to and including the last `</think>` marker, if the
/// reply carries a reasoning block.
fn strip_reasoning(text: &str) -> &str {
    if text.contains(THINK_OPEN)
        && let Some(end) = text.rfind(THINK_CLOSE)
    {
        return &text[end + THINK_CLOSE.len()..];
    }
    text
}

/// The outermost `{…}` span: first opening brace through last closing brace.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_JSON: &str = r#"{
        "summary": "Solid assembly progress.",
        "blockers": [{"issue": "cluster queue", "frequency": 2, "suggestion": "use short queue"}],
        "highlights": ["finished QC"],
        "suggestions": [],
        "patterns": ["long afternoon blocks"]
    }"#;

    #[test]
    fn test_plain_json_reply() {
        let report = parse_reply(GOOD_JSON).unwrap();
        assert_eq!(report.summary, "Solid assembly progress.");
        assert_eq!(report.blockers.len(), 1);
        assert_eq!(report.highlights[0], "finished QC");
    }

    #[test]
    fn test_reasoning_preamble_is_stripped() {
        let raw = format!(
            "<think>The user logged three entries. A '{{' brace in here should not confuse \
             the extractor.</think>\nHere is the analysis:\n{GOOD_JSON}\nHope that helps!"
        );
        let report = parse_reply(&raw).unwrap();
        assert_eq!(report.summary, "Solid assembly progress.");
        assert_eq!(report.patterns.len(), 1);
    }

    #[test]
    fn test_markdown_fenced_json() {
        let raw = format!("```json\n{GOOD_JSON}\n```");
        let report = parse_reply(&raw).unwrap();
        assert_eq!(report.summary, "Solid assembly progress.");
    }

    #[test]
    fn test_missing_lists_default_empty() {
        let report = parse_reply(r#"{"summary": "short day"}"#).unwrap();
        assert_eq!(report.summary, "short day");
        assert!(report.blockers.is_empty());
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn test_no_json_at_all() {
        assert!(parse_reply("I could not produce an analysis today, sorry.").is_none());
        assert!(parse_reply("").is_none());
    }

    #[test]
    fn test_malformed_json() {
        assert!(parse_reply(r#"{"summary": "unterminated"#).is_none());
        assert!(parse_reply("} backwards {").is_none());
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        // summary must be a string, not an object
        assert!(parse_reply(r#"{"summary": {"text": "nested"}}"#).is_none());
    }
}
