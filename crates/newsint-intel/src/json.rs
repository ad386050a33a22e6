//! Defensive JSON recovery from model completions.
//!
//! Completions are asked for bare JSON but routinely arrive wrapped in
//! prose or code fences. This module digs the first well-formed JSON
//! object out of whatever came back.

use serde_json::Value;

/// Extract the first well-formed JSON object from a completion.
///
/// Tries the whole (trimmed) text first, then every balanced `{…}`
/// substring in order of appearance. Balancing is string- and escape-aware
/// so braces inside string values do not confuse the scan. Returns `None`
/// when nothing parses as an object.
pub(crate) fn extract_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Some(value);
        }
    }

    for (start, c) in trimmed.char_indices() {
        if c != '{' {
            continue;
        }
        if let Some(candidate) = balanced_object_at(trimmed, start) {
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                if value.is_object() {
                    return Some(value);
                }
            }
        }
    }

    None
}

/// The balanced `{…}` slice starting at byte offset `start`, or `None` if
/// the braces never close.
fn balanced_object_at(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_object() {
        let value = extract_json_object(r#"{"companies": ["HDFC Bank"]}"#).expect("object");
        assert_eq!(value["companies"][0], "HDFC Bank");
    }

    #[test]
    fn parses_object_wrapped_in_prose() {
        let text = r#"Here is the analysis you asked for:
{"sentiment": "positive", "sentiment_score": 0.7}
Let me know if you need anything else."#;
        let value = extract_json_object(text).expect("object");
        assert_eq!(value["sentiment"], "positive");
    }

    #[test]
    fn parses_object_inside_code_fence() {
        let text = "```json\n{\"stocks\": []}\n```";
        let value = extract_json_object(text).expect("object");
        assert!(value["stocks"].as_array().expect("array").is_empty());
    }

    #[test]
    fn handles_braces_inside_string_values() {
        let text = r#"{"reasoning": "uses {braces} and a \" quote", "is_duplicate": true}"#;
        let value = extract_json_object(text).expect("object");
        assert_eq!(value["is_duplicate"], true);
    }

    #[test]
    fn picks_first_object_when_several_present() {
        let text = r#"{"a": 1} trailing {"b": 2}"#;
        let value = extract_json_object(text).expect("object");
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn nested_objects_stay_intact() {
        let text = r#"note: {"outer": {"inner": [1, 2, 3]}} done"#;
        let value = extract_json_object(text).expect("object");
        assert_eq!(value["outer"]["inner"][2], 3);
    }

    #[test]
    fn skips_malformed_object_and_recovers_later_one() {
        let text = r#"{broken: nope} but then {"ok": true}"#;
        let value = extract_json_object(text).expect("object");
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn returns_none_when_no_object_recoverable() {
        assert!(extract_json_object("no json here").is_none());
        assert!(extract_json_object("[1, 2, 3]").is_none());
        assert!(extract_json_object("{never closes").is_none());
        assert!(extract_json_object("").is_none());
    }
}
