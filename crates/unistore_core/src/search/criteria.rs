//! Field criteria matching.
//!
//! # Invariants
//! - Every criterion must hold for a record to match (logical AND).
//! - A record without the criterion's field never matches.
//! - Text criteria match case-insensitively as substrings of scalar fields.
//! - Other criteria require equality; numbers compare by value.

use crate::model::document::Record;
use serde_json::{Map, Value};

/// Field name to expected value. Empty criteria match every record.
pub type SearchCriteria = Map<String, Value>;

/// Returns whether `record` satisfies all `criteria`.
pub fn matches(record: &Record, criteria: &SearchCriteria) -> bool {
    criteria
        .iter()
        .all(|(field, expected)| field_matches(record.get(field), expected))
}

fn field_matches(actual: Option<&Value>, expected: &Value) -> bool {
    let Some(actual) = actual else {
        return false;
    };

    match expected {
        Value::String(needle) => scalar_text(actual)
            .map(|text| text.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
        Value::Number(_) => numbers_equal(actual, expected),
        other => actual == other,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

// Integers compare exactly; f64 only when one side is a float, so that
// 1000000 == 1000000.0 while integers above 2^53 stay distinct.
fn numbers_equal(actual: &Value, expected: &Value) -> bool {
    let (Value::Number(left), Value::Number(right)) = (actual, expected) else {
        return false;
    };
    if left.is_f64() || right.is_f64() {
        return match (left.as_f64(), right.as_f64()) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        };
    }
    match (left.as_i64(), right.as_i64()) {
        (Some(left), Some(right)) => left == right,
        _ => left.as_u64().is_some() && left.as_u64() == right.as_u64(),
    }
}

#[cfg(test)]
mod tests {
    use super::{matches, SearchCriteria};
    use crate::model::document::Record;
    use serde_json::{json, Value};

    fn object(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn department() -> Record {
        object(json!({
            "id": "cs101",
            "name": "Computer Science",
            "building": "Tech Park",
            "budget": 1000000
        }))
    }

    #[test]
    fn text_criterion_is_case_insensitive_substring() {
        let criteria: SearchCriteria = object(json!({"name": "computer"}));
        assert!(matches(&department(), &criteria));

        let criteria: SearchCriteria = object(json!({"name": "SCIENCE"}));
        assert!(matches(&department(), &criteria));

        let criteria: SearchCriteria = object(json!({"name": "biology"}));
        assert!(!matches(&department(), &criteria));
    }

    #[test]
    fn number_criterion_requires_exact_equality() {
        assert!(matches(&department(), &object(json!({"budget": 1000000}))));
        assert!(matches(&department(), &object(json!({"budget": 1000000.0}))));
        assert!(!matches(&department(), &object(json!({"budget": 100}))));
        assert!(!matches(&department(), &object(json!({"budget": 10000000}))));
    }

    #[test]
    fn large_integers_compare_without_float_rounding() {
        let record = object(json!({"id": "big", "budget": 9007199254740993_u64}));
        assert!(!matches(&record, &object(json!({"budget": 9007199254740992_u64}))));
        assert!(matches(&record, &object(json!({"budget": 9007199254740993_u64}))));

        let negative = object(json!({"id": "neg", "budget": -5}));
        assert!(matches(&negative, &object(json!({"budget": -5}))));
        assert!(!matches(&negative, &object(json!({"budget": 18446744073709551611_u64}))));
    }

    #[test]
    fn text_criterion_on_number_field_uses_its_digits() {
        assert!(matches(&department(), &object(json!({"budget": "1000"}))));
    }

    #[test]
    fn missing_field_never_matches() {
        assert!(!matches(&department(), &object(json!({"dean": "x"}))));
        assert!(!matches(&department(), &object(json!({"dean": 1}))));
        assert!(!matches(&department(), &object(json!({"dean": null}))));
    }

    #[test]
    fn all_criteria_must_hold() {
        let criteria = object(json!({"name": "computer", "building": "library"}));
        assert!(!matches(&department(), &criteria));
        assert!(matches(&department(), &SearchCriteria::new()));
    }
}
