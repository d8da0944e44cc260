//! In-memory predicate evaluation over JSON-shaped rows.
//!
//! Rows are `serde_json::Value` objects whose keys follow the canonical
//! selector segments carried in each [`PathRef`]. Association chains are
//! nested objects or arrays; a collection hop fans out and the predicate
//! matches if any reached leaf satisfies it. Useful for testing compiled
//! predicates and for filtering small already-loaded datasets without a
//! backend.

use crate::coerce::{parse_datetime, parse_time, parse_uuid};
use chrono::NaiveDate;
use sieveql_ir::{CmpOp, PathRef, Predicate, Value};
use std::cmp::Ordering;
use thiserror::Error;

/// Errors raised during in-memory evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Document path-tests target a backend's jsonpath engine and have no
    /// in-memory equivalent here.
    #[error("cannot evaluate json path-test '{0}' in memory")]
    UnsupportedJsonTest(String),
}

/// Evaluate a compiled predicate against one row.
pub fn evaluate(predicate: &Predicate, row: &serde_json::Value) -> Result<bool, EvalError> {
    match predicate {
        Predicate::And(children) => {
            for child in children {
                if !evaluate(child, row)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Predicate::Or(children) => {
            for child in children {
                if evaluate(child, row)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Predicate::Not(inner) => Ok(!evaluate(inner, row)?),
        Predicate::Eq {
            path,
            value,
            ignore_case,
        } => Ok(leaves(row, path)
            .iter()
            .any(|leaf| leaf_equals(leaf, value, *ignore_case))),
        Predicate::Like {
            path,
            pattern,
            ignore_case,
        } => Ok(leaves(row, path).iter().any(|leaf| match leaf.as_str() {
            Some(s) => like_match(pattern, s, *ignore_case),
            None => false,
        })),
        Predicate::Cmp { path, op, value } => Ok(leaves(row, path).iter().any(|leaf| {
            matches!(
                (leaf_compare(leaf, value), op),
                (Some(Ordering::Less), CmpOp::Lt | CmpOp::Le)
                    | (Some(Ordering::Greater), CmpOp::Gt | CmpOp::Ge)
                    | (Some(Ordering::Equal), CmpOp::Le | CmpOp::Ge)
            )
        })),
        Predicate::Between { path, low, high } => Ok(leaves(row, path).iter().any(|leaf| {
            let above = matches!(
                leaf_compare(leaf, low),
                Some(Ordering::Greater | Ordering::Equal)
            );
            let below = matches!(
                leaf_compare(leaf, high),
                Some(Ordering::Less | Ordering::Equal)
            );
            above && below
        })),
        Predicate::In { path, values } => Ok(leaves(row, path)
            .iter()
            .any(|leaf| values.iter().any(|v| leaf_equals(leaf, v, false)))),
        Predicate::IsNull { path } => {
            Ok(leaves(row, path).iter().all(|leaf| leaf.is_null()))
        }
        Predicate::JsonTest { path, .. } => {
            Err(EvalError::UnsupportedJsonTest(path.selector()))
        }
    }
}

/// Collect every leaf value reachable through the path's canonical
/// segments, fanning out through arrays. A missing key yields no leaves.
fn leaves<'a>(row: &'a serde_json::Value, path: &PathRef) -> Vec<&'a serde_json::Value> {
    let mut current = vec![row];
    for segment in &path.segments {
        let mut next = Vec::new();
        for value in current {
            match value {
                serde_json::Value::Object(map) => {
                    if let Some(child) = map.get(segment) {
                        match child {
                            serde_json::Value::Array(items) => next.extend(items.iter()),
                            other => next.push(other),
                        }
                    }
                }
                serde_json::Value::Array(items) => {
                    for item in items {
                        if let Some(child) = item.get(segment) {
                            match child {
                                serde_json::Value::Array(nested) => next.extend(nested.iter()),
                                other => next.push(other),
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
    }
    current
}

/// Lift a JSON leaf into a typed value comparable with the operand. Typed
/// operands with a textual JSON representation (uuid, temporal) parse the
/// leaf string.
fn lift(leaf: &serde_json::Value, like: &Value) -> Value {
    match (leaf, like) {
        (serde_json::Value::String(s), Value::Uuid(_)) => match parse_uuid(s) {
            Some(bytes) => Value::Uuid(bytes),
            None => Value::Null,
        },
        (serde_json::Value::String(s), Value::Date(_)) => {
            match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(d) => Value::Date(d),
                Err(_) => Value::Null,
            }
        }
        (serde_json::Value::String(s), Value::Time(_)) => match parse_time(s) {
            Some(t) => Value::Time(t),
            None => Value::Null,
        },
        (serde_json::Value::String(s), Value::DateTime(_)) => match parse_datetime(s) {
            Some(dt) => Value::DateTime(dt),
            None => Value::Null,
        },
        (serde_json::Value::String(s), Value::Char(_)) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => Value::Null,
            }
        }
        (serde_json::Value::String(s), _) => Value::String(s.clone()),
        (serde_json::Value::Bool(b), _) => Value::Bool(*b),
        (serde_json::Value::Number(n), _) => {
            if let Some(i) = n.as_i64() {
                Value::Int64(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float64(f)
            } else {
                Value::Null
            }
        }
        _ => Value::Null,
    }
}

fn leaf_equals(leaf: &serde_json::Value, value: &Value, ignore_case: bool) -> bool {
    // A null operand (including one degraded from a failed coercion)
    // matches nothing; null tests go through IsNull.
    if value.is_null() {
        return false;
    }
    let lifted = lift(leaf, value);
    if ignore_case {
        if let (Some(a), Some(b)) = (lifted.as_str(), value.as_str()) {
            return a.eq_ignore_ascii_case(b);
        }
    }
    lifted.equals(value)
}

fn leaf_compare(leaf: &serde_json::Value, value: &Value) -> Option<Ordering> {
    lift(leaf, value).compare(value)
}

/// Match a pattern with `%` (any sequence) and `_` (single char)
/// wildcards; `\` escapes the next pattern character.
fn like_match(pattern: &str, text: &str, ignore_case: bool) -> bool {
    if ignore_case {
        return like_chars(
            &pattern.to_lowercase().chars().collect::<Vec<_>>(),
            &text.to_lowercase().chars().collect::<Vec<_>>(),
        );
    }
    like_chars(
        &pattern.chars().collect::<Vec<_>>(),
        &text.chars().collect::<Vec<_>>(),
    )
}

fn like_chars(pattern: &[char], text: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('%') => {
            (0..=text.len()).any(|skip| like_chars(&pattern[1..], &text[skip..]))
        }
        Some('_') => !text.is_empty() && like_chars(&pattern[1..], &text[1..]),
        Some('\\') if pattern.len() > 1 => {
            !text.is_empty() && text[0] == pattern[1] && like_chars(&pattern[2..], &text[1..])
        }
        Some(c) => !text.is_empty() && text[0] == *c && like_chars(&pattern[1..], &text[1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(segments: &[&str]) -> PathRef {
        PathRef {
            join: None,
            column: segments.iter().map(|s| s.to_string()).collect(),
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_equality() {
        let row = json!({"name": "acme", "age": 30});
        let p = Predicate::eq(path(&["name"]), "acme");
        assert!(evaluate(&p, &row).unwrap());
        let p = Predicate::eq(path(&["age"]), Value::Int32(30));
        assert!(evaluate(&p, &row).unwrap());
        let p = Predicate::eq(path(&["name"]), "other");
        assert!(!evaluate(&p, &row).unwrap());
    }

    #[test]
    fn test_ignore_case_equality() {
        let row = json!({"name": "ACME"});
        let p = Predicate::Eq {
            path: path(&["name"]),
            value: Value::String("acme".into()),
            ignore_case: true,
        };
        assert!(evaluate(&p, &row).unwrap());
    }

    #[test]
    fn test_like_patterns() {
        assert!(like_match("%Inc%", "Brite Inc Ltd", false));
        assert!(!like_match("%Inc%", "Brite Ltd", false));
        assert!(like_match("a_c", "abc", false));
        assert!(!like_match("a_c", "abbc", false));
        assert!(like_match("%inc%", "Brite INC", true));
        assert!(like_match("100\\%", "100%", false));

        let row = json!({"name": "Brite Inc"});
        let p = Predicate::Like {
            path: path(&["name"]),
            pattern: "%Inc%".into(),
            ignore_case: false,
        };
        assert!(evaluate(&p, &row).unwrap());
    }

    #[test]
    fn test_ordering_and_between() {
        let row = json!({"age": 30});
        let cmp = |op, value| Predicate::Cmp {
            path: path(&["age"]),
            op,
            value: Value::Int32(value),
        };
        assert!(evaluate(&cmp(CmpOp::Gt, 18), &row).unwrap());
        assert!(evaluate(&cmp(CmpOp::Ge, 30), &row).unwrap());
        assert!(!evaluate(&cmp(CmpOp::Lt, 30), &row).unwrap());

        let between = Predicate::Between {
            path: path(&["age"]),
            low: Value::Int32(18),
            high: Value::Int32(65),
        };
        assert!(evaluate(&between, &row).unwrap());
        assert!(!evaluate(&between, &json!({"age": 70})).unwrap());
    }

    #[test]
    fn test_membership() {
        let row = json!({"age": 30});
        let p = Predicate::In {
            path: path(&["age"]),
            values: vec![Value::Int32(20), Value::Int32(30)],
        };
        assert!(evaluate(&p, &row).unwrap());
        assert!(!evaluate(&Predicate::not(p), &row).unwrap());
    }

    #[test]
    fn test_null_operand_matches_nothing() {
        let p = Predicate::eq(path(&["age"]), Value::Null);
        assert!(!evaluate(&p, &json!({"age": null})).unwrap());
        assert!(!evaluate(&p, &json!({"age": 30})).unwrap());

        let p = Predicate::In {
            path: path(&["age"]),
            values: vec![Value::Null],
        };
        assert!(!evaluate(&p, &json!({"age": null})).unwrap());
    }

    #[test]
    fn test_null_tests() {
        let p = Predicate::is_null(path(&["name"]));
        assert!(evaluate(&p, &json!({"name": null})).unwrap());
        assert!(evaluate(&p, &json!({})).unwrap());
        assert!(!evaluate(&p, &json!({"name": "x"})).unwrap());
    }

    #[test]
    fn test_collection_fan_out() {
        let row = json!({
            "sites": [
                {"trunks": [{"id": 1}, {"id": 2}]},
                {"trunks": []}
            ]
        });
        let p = Predicate::eq(path(&["sites", "trunks", "id"]), Value::Int64(2));
        assert!(evaluate(&p, &row).unwrap());

        // An empty chain matches nothing, without erroring.
        let empty = json!({"sites": []});
        assert!(!evaluate(&p, &empty).unwrap());
    }

    #[test]
    fn test_logical_combinators() {
        let row = json!({"name": "acme", "age": 30});
        let p = Predicate::And(vec![
            Predicate::eq(path(&["name"]), "acme"),
            Predicate::Or(vec![
                Predicate::eq(path(&["age"]), Value::Int32(18)),
                Predicate::eq(path(&["age"]), Value::Int32(30)),
            ]),
        ]);
        assert!(evaluate(&p, &row).unwrap());
    }

    #[test]
    fn test_json_test_is_refused() {
        let p = Predicate::JsonTest {
            path: path(&["payload"]),
            expression: "$.k ? (@ == 1)".into(),
        };
        assert_eq!(
            evaluate(&p, &json!({})),
            Err(EvalError::UnsupportedJsonTest("payload".into()))
        );
    }

    #[test]
    fn test_typed_string_leaves() {
        let row = json!({"created": "2024-06-01"});
        let p = Predicate::Cmp {
            path: path(&["created"]),
            op: CmpOp::Gt,
            value: Value::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
        };
        assert!(evaluate(&p, &row).unwrap());
    }
}
