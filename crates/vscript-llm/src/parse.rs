//! Model-output parsing: balanced JSON span extraction and repair.
//!
//! The models are instructed to return bare JSON, but responses regularly
//! arrive wrapped in prose or markdown fences. Parsing locates the first
//! balanced span of the expected kind; if direct parsing fails, a single
//! repair pass runs before the output is declared malformed. The model call
//! itself is never retried.

use serde_json::Value;

use crate::error::{LlmError, LlmResult};

/// Parse the first balanced `{...}` span in `text` as JSON.
pub fn parse_object_span(text: &str) -> LlmResult<Value> {
    let span = balanced_span(text, b'{', b'}')
        .ok_or_else(|| LlmError::malformed("no JSON object found in model response"))?;
    parse_with_repair(span)
}

/// Parse the first balanced `[...]` span in `text` as JSON.
pub fn parse_array_span(text: &str) -> LlmResult<Value> {
    let span = balanced_span(text, b'[', b']')
        .ok_or_else(|| LlmError::malformed("no JSON array found in model response"))?;
    parse_with_repair(span)
}

fn parse_with_repair(span: &str) -> LlmResult<Value> {
    match serde_json::from_str(span) {
        Ok(value) => Ok(value),
        Err(first_err) => serde_json::from_str(&repair(span))
            .map_err(|_| LlmError::malformed(format!("JSON parse failed: {first_err}"))),
    }
}

/// Locate the first balanced span delimited by `open`/`close`, respecting
/// string literals and escapes.
fn balanced_span(text: &str, open: u8, close: u8) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|&b| b == open)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        if b == b'"' {
            in_string = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[start..start + offset + 1]);
            }
        }
    }

    None
}

/// Best-effort repair of almost-JSON: smart quotes, stray control characters
/// and trailing commas. Runs once, after direct parsing has already failed.
fn repair(span: &str) -> String {
    let normalized: String = span
        .chars()
        .map(|c| match c {
            '\u{201c}' | '\u{201d}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            c if c.is_control() && c != '\n' && c != '\t' && c != '\r' => ' ',
            c => c,
        })
        .collect();
    remove_trailing_commas(&normalized)
}

fn remove_trailing_commas(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in s.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '}' | ']' => {
                while out.ends_with(|ch: char| ch.is_whitespace()) {
                    out.pop();
                }
                if out.ends_with(',') {
                    out.pop();
                }
                out.push(c);
            }
            c => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_span_ignores_surrounding_prose() {
        let text = "Sure! Here is the analysis:\n{\"a\": 1}\nHope that helps.";
        let value = parse_object_span(text).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_object_span_inside_markdown_fence() {
        let text = "```json\n{\"a\": {\"b\": 2}}\n```";
        let value = parse_object_span(text).unwrap();
        assert_eq!(value["a"]["b"], 2);
    }

    #[test]
    fn test_nested_braces_and_strings() {
        let text = r#"noise {"a": "contains } and { inside", "b": {"c": 3}} trailing"#;
        let value = parse_object_span(text).unwrap();
        assert_eq!(value["b"]["c"], 3);
        assert_eq!(value["a"], "contains } and { inside");
    }

    #[test]
    fn test_escaped_quotes_in_strings() {
        let text = r#"{"a": "he said \"hi}\" loudly"}"#;
        let value = parse_object_span(text).unwrap();
        assert_eq!(value["a"], "he said \"hi}\" loudly");
    }

    #[test]
    fn test_array_span() {
        let text = "The scripts:\n[{\"id\": \"s1\"}, {\"id\": \"s2\"}]";
        let value = parse_array_span(text).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_array_span_prefers_array_over_object() {
        // An object appearing before the array must not confuse extraction.
        let text = r#"[{"inner": {"x": 1}}]"#;
        let value = parse_array_span(text).unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn test_missing_span_is_malformed() {
        assert!(matches!(
            parse_object_span("no json here"),
            Err(LlmError::MalformedOutput(_))
        ));
        assert!(matches!(
            parse_array_span("{\"only\": \"an object\"}"),
            Err(LlmError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_unbalanced_span_is_malformed() {
        assert!(matches!(
            parse_object_span(r#"{"a": 1"#),
            Err(LlmError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_repair_trailing_commas() {
        let text = r#"{"a": [1, 2, 3,], "b": {"c": 4,},}"#;
        let value = parse_object_span(text).unwrap();
        assert_eq!(value["a"].as_array().unwrap().len(), 3);
        assert_eq!(value["b"]["c"], 4);
    }

    #[test]
    fn test_repair_smart_quotes_as_delimiters() {
        let text = "{\u{201c}a\u{201d}: 1}";
        let value = parse_object_span(text).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_repair_failure_reports_original_error() {
        let err = parse_object_span("{totally: not json").unwrap_err();
        match err {
            LlmError::MalformedOutput(msg) => assert!(msg.contains("no JSON object") || msg.contains("JSON parse failed")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_trailing_comma_not_removed_inside_strings() {
        let text = r#"{"a": "one, two,", "b": 1,}"#;
        let value = parse_object_span(text).unwrap();
        assert_eq!(value["a"], "one, two,");
    }
}
