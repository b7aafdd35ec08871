//! Response Recovery
//!
//! Reduces free-form model text to exactly one structured JSON value.
//!
//! Model responses routinely wrap their payload in markdown fences, surround
//! it with prose, or leave trailing commas behind. Recovery is a pure,
//! side-effect-free text transform; the cleanup steps run in a fixed order
//! because later steps assume earlier cleanup:
//!
//! 1. Reject empty input
//! 2. Trim whitespace
//! 3. Strip markdown code fences
//! 4. Find the earliest `[` or `{` (payload start)
//! 5. Find the latest `]` or `}` (payload end)
//! 6. Slice inclusively, discarding surrounding prose
//! 7. Remove trailing commas before `}` / `]`
//! 8. Strict parse; no guessing, no partial results
//!
//! Schema conformance is NOT checked here; that is the calling task's job.
//! Prompt changes upstream require re-validating this module's test suite.

use serde_json::Value;

use crate::types::RecoveryError;

/// Extract and repair a single JSON value (object or array) from raw model
/// text. On failure the error retains the original and cleaned text for
/// diagnostics.
pub fn recover(raw: &str) -> Result<Value, RecoveryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RecoveryError::new("empty model response", raw));
    }

    let unfenced = strip_code_fences(trimmed);

    let first_bracket = unfenced.find('[');
    let first_brace = unfenced.find('{');
    let start = match (first_bracket, first_brace) {
        (Some(b), Some(c)) => b.min(c),
        (Some(b), None) => b,
        (None, Some(c)) => c,
        (None, None) => {
            return Err(RecoveryError::new(
                "could not find start of JSON ('[' or '{')",
                raw,
            ));
        }
    };

    let last_bracket = unfenced.rfind(']');
    let last_brace = unfenced.rfind('}');
    let end = match (last_bracket, last_brace) {
        (Some(b), Some(c)) => b.max(c),
        (Some(b), None) => b,
        (None, Some(c)) => c,
        (None, None) => {
            return Err(RecoveryError::new(
                "could not find end of JSON (']' or '}')",
                raw,
            ));
        }
    };

    if end < start {
        return Err(RecoveryError::new(
            "JSON end delimiter precedes its start delimiter",
            raw,
        ));
    }

    let candidate = &unfenced[start..=end];
    let cleaned = remove_trailing_commas(candidate);

    serde_json::from_str(&cleaned).map_err(|e| {
        RecoveryError::new(format!("failed to parse cleaned JSON: {}", e), raw)
            .with_cleaned(cleaned)
    })
}

/// Strip a surrounding markdown code fence, keeping only the interior.
/// The opening fence may carry a language tag (```json); both markers are
/// removed independently so a lone opener or closer still gets cleaned up.
fn strip_code_fences(s: &str) -> &str {
    let mut result = s;

    if result.starts_with("```") {
        result = match result.find('\n') {
            Some(newline) => &result[newline + 1..],
            None => &result[3..],
        };
    }

    if let Some(stripped) = result.strip_suffix("```") {
        result = stripped.trim_end();
    }

    result
}

/// Drop commas that directly precede a closing `}` or `]`, the most common
/// model artifact that breaks strict parsing.
fn remove_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());

    let mut i = 0;
    while i < chars.len() {
        if chars[i] == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && (chars[j] == ']' || chars[j] == '}') {
                i += 1;
                continue;
            }
        }
        result.push(chars[i]);
        i += 1;
    }

    result
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_clean_object_is_identity() {
        let value = json!({"a": 1, "b": ["x", "y"]});
        let recovered = recover(&serde_json::to_string(&value).unwrap()).unwrap();
        assert_eq!(recovered, value);
    }

    #[test]
    fn test_strips_fences() {
        let recovered = recover("```json\n{\"a\":1}\n```").unwrap();
        assert_eq!(recovered, json!({"a": 1}));
    }

    #[test]
    fn test_strips_fence_without_language_tag() {
        let recovered = recover("```\n[1, 2]\n```").unwrap();
        assert_eq!(recovered, json!([1, 2]));
    }

    #[test]
    fn test_tolerates_trailing_commas() {
        let recovered = recover(r#"{"a":1,}"#).unwrap();
        assert_eq!(recovered, json!({"a": 1}));

        let nested = recover(r#"{"items": [1, 2, 3,], "done": true,}"#).unwrap();
        assert_eq!(nested, json!({"items": [1, 2, 3], "done": true}));
    }

    #[test]
    fn test_tolerates_surrounding_prose() {
        let recovered = recover("Here you go: [1,2,3] thanks!").unwrap();
        assert_eq!(recovered, json!([1, 2, 3]));
    }

    #[test]
    fn test_fails_without_delimiters() {
        let err = recover("no structured data here").unwrap_err();
        assert!(err.message.contains("start of JSON"));
        assert_eq!(err.original, "no structured data here");
    }

    #[test]
    fn test_fails_on_empty_input() {
        assert!(recover("").is_err());
        assert!(recover("   \n\t ").is_err());
    }

    #[test]
    fn test_fails_on_unparseable_slice_keeps_diagnostics() {
        let err = recover("prefix {\"a\": } suffix").unwrap_err();
        assert!(err.cleaned.is_some());
        assert_eq!(err.original, "prefix {\"a\": } suffix");
    }

    #[test]
    fn test_end_before_start_is_failure_not_panic() {
        assert!(recover("} and then {").is_err());
    }

    #[test]
    fn test_object_selected_over_earlier_text() {
        let recovered =
            recover("The answer is below.\n```json\n{\"title\": \"T\", \"items\": []}\n```\n")
                .unwrap();
        assert_eq!(recovered["title"], "T");
    }

    fn arb_json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| Value::Number(n.into())),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
        ]
    }

    fn arb_json_value() -> impl Strategy<Value = Value> {
        arb_json_leaf().prop_recursive(3, 24, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    /// Top-level values must be objects or arrays; scalars are not a valid
    /// recovery target.
    fn arb_json_document() -> impl Strategy<Value = Value> {
        prop_oneof![
            prop::collection::vec(arb_json_value(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", arb_json_value(), 0..5)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    }

    proptest! {
        #[test]
        fn recovery_is_identity_on_serialized_values(value in arb_json_document()) {
            let serialized = serde_json::to_string(&value).unwrap();
            let recovered = recover(&serialized).unwrap();
            prop_assert_eq!(recovered, value);
        }
    }
}
