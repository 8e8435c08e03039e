// Fuzzy step matcher - does one observed record satisfy one expected step?

//! # Fuzzy Step Matcher
//!
//! Log text produced by capture tools is verbose and inconsistently formatted.
//! The matcher therefore accepts a record for a step when:
//! - the protocol tags are equal (case-insensitive),
//! - the raw direction tags are equal (case-insensitive), and
//! - every whitespace-separated token of the step pattern occurs in the message,
//!   in the pattern's left-to-right order.
//!
//! Token search is a plain substring scan with a moving cursor. It is **not**
//! word-boundary aware: the token `nas` is found inside `nasty`. Extra words
//! between tokens are tolerated; tokens out of order are not.
//!
//! ```rust
//! use protocol_analyzer::engine::matcher::contains_in_order;
//!
//! assert!(contains_in_order("received rrcsetupcomplete ok", "rrcSetupComplete"));
//! assert!(!contains_in_order("complete rrc setup", "rrc setup complete request"));
//! ```
//!
//! ## Rust Learning Notes:
//!
//! ### Byte Offsets into `&str`
//! `str::find` returns a byte offset. Slicing `&message[cursor..]` is safe here
//! because the cursor always sits at the end of a previous match, which is a
//! valid UTF-8 boundary.

use crate::models::{LogRecord, StepSpec};

/// Detailed result of matching one record against one step
///
/// Useful for explaining why a record did *not* advance a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepMatchEvaluation {
    /// Protocol tags equal, ignoring case
    pub protocol_matched: bool,

    /// Raw direction tags equal, ignoring case
    pub direction_matched: bool,

    /// All pattern tokens found in order
    pub message_matched: bool,

    /// All three checks passed
    pub matched: bool,

    /// Human-readable explanation of the outcome
    pub explanation: String,
}

/// Replace bracket characters with spaces and lower-case the text
pub fn normalize(text: &str) -> String {
    text.replace(|c: char| c == '[' || c == ']', " ").to_lowercase()
}

/// Check that every token of `pattern` occurs in `message`, in order
///
/// Both inputs are normalized first. An empty pattern matches every message.
pub fn contains_in_order(message: &str, pattern: &str) -> bool {
    let message = normalize(message);
    let pattern = normalize(pattern);

    let mut cursor = 0;
    for token in pattern.split_whitespace() {
        match message[cursor..].find(token) {
            Some(offset) => cursor += offset + token.len(),
            None => return false,
        }
    }
    true
}

fn same_protocol(record: &LogRecord, expected: &StepSpec) -> bool {
    record.protocol_tag.to_lowercase() == expected.protocol_tag.to_lowercase()
}

/// Decide whether `record` satisfies `expected`
///
/// Cheap tag comparisons run before the token scan.
pub fn matches(record: &LogRecord, expected: &StepSpec) -> bool {
    same_protocol(record, expected)
        && record.direction.matches(&expected.direction)
        && contains_in_order(&record.message, &expected.pattern)
}

/// Evaluate all three match conditions and explain the outcome
pub fn evaluate(record: &LogRecord, expected: &StepSpec) -> StepMatchEvaluation {
    let protocol_matched = same_protocol(record, expected);
    let direction_matched = record.direction.matches(&expected.direction);
    let message_matched = contains_in_order(&record.message, &expected.pattern);
    let matched = protocol_matched && direction_matched && message_matched;

    let explanation = if matched {
        format!("record #{} matches '{}'", record.sequence_number, expected.pattern)
    } else {
        let mut reasons = Vec::new();
        if !protocol_matched {
            reasons.push(format!(
                "protocol '{}' != '{}'",
                record.protocol_tag, expected.protocol_tag
            ));
        }
        if !direction_matched {
            reasons.push(format!("direction '{}' != '{}'", record.direction, expected.direction));
        }
        if !message_matched {
            reasons.push(format!("tokens of '{}' not found in order", expected.pattern));
        }
        format!("record #{} does not match: {}", record.sequence_number, reasons.join("; "))
    };

    StepMatchEvaluation {
        protocol_matched,
        direction_matched,
        message_matched,
        matched,
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(protocol: &str, direction: &str, message: &str) -> LogRecord {
        let ts = Utc.with_ymd_and_hms(2025, 4, 7, 9, 42, 30).unwrap();
        LogRecord::new(1, ts, protocol, direction, message)
    }

    #[test]
    fn test_single_token_inside_longer_message() {
        let step = StepSpec::new("rrcSetupComplete", "nrrrc", "u");
        assert!(matches(&record("nrrrc", "u", "received rrcsetupcomplete ok"), &step));
    }

    #[test]
    fn test_tokens_must_keep_pattern_order() {
        let step = StepSpec::new("rrcSetupComplete", "nrrrc", "u");
        assert!(!matches(&record("nrrrc", "u", "complete rrc setup"), &step));

        let multi = StepSpec::new("Security mode command", "nas", "d");
        assert!(matches(&record("nas", "d", "security protected mode of operation command"), &multi));
        assert!(!matches(&record("nas", "d", "command security mode"), &multi));
    }

    #[test]
    fn test_setup_does_not_consume_setup_complete_order() {
        // "rrcSetup" is a prefix of "rrcSetupComplete"; substring search accepts it
        let step = StepSpec::new("rrcSetup", "nrrrc", "d");
        assert!(matches(&record("nrrrc", "d", "rrcsetupcomplete"), &step));
        // but direction still has to agree
        assert!(!matches(&record("nrrrc", "u", "rrcsetup"), &step));
    }

    #[test]
    fn test_substring_search_is_not_word_aware() {
        assert!(contains_in_order("nasty message", "NAS"));
    }

    #[test]
    fn test_repeated_tokens_need_distinct_occurrences() {
        assert!(contains_in_order("nas transport nas", "nas nas"));
        assert!(!contains_in_order("nas transport", "nas nas"));
    }

    #[test]
    fn test_brackets_are_token_separators() {
        assert!(contains_in_order("200 [register] ok", "200 [REGISTER]"));
        assert!(contains_in_order("sip 200 register", "200[register]"));
        assert!(contains_in_order("anything", ""));
    }

    #[test]
    fn test_tags_compare_case_insensitively() {
        let step = StepSpec::new("NOTIFY", "sip", "D");
        assert!(matches(&record("SIP", "d", "notify"), &step));
        assert!(!matches(&record("nas", "d", "notify"), &step));
        assert!(!matches(&record("sip", "downlink", "notify"), &step));
    }

    #[test]
    fn test_evaluation_explains_failures() {
        let step = StepSpec::new("Registration accept", "nas", "d");

        let hit = evaluate(&record("nas", "D", "registration accept"), &step);
        assert!(hit.matched);
        assert!(hit.explanation.contains("matches"));

        let miss = evaluate(&record("nrrrc", "u", "accept registration"), &step);
        assert!(!miss.matched);
        assert!(!miss.protocol_matched);
        assert!(!miss.direction_matched);
        assert!(!miss.message_matched);
        assert!(miss.explanation.contains("protocol 'nrrrc' != 'nas'"));
        assert!(miss.explanation.contains("not found in order"));
    }

    #[test]
    fn test_matches_agrees_with_evaluate() {
        let step = StepSpec::new("UL NAS transport", "nas", "u");
        let samples = [
            record("nas", "u", "ul nas transport"),
            record("nas", "u", "ul information transfer nas transport"),
            record("nas", "d", "ul nas transport"),
            record("nas", "u", "dl nas transport"),
        ];
        for sample in &samples {
            assert_eq!(matches(sample, &step), evaluate(sample, &step).matched);
        }
    }
}
