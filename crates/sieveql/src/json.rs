//! Path-test compilation for JSON document columns.
//!
//! Once the navigator terminates on a JSON attribute, the remaining key
//! path and the raw arguments are compiled here into a textual path-test
//! expression of the form `$.<path> ? (<condition>)`. Negated operator
//! families have no template of their own; they compile through their
//! positive counterpart and the returned `inverted` flag tells the caller
//! to wrap the test in logical NOT.

use crate::coerce::{parse_datetime, parse_time};
use crate::error::CompileError;
use chrono::NaiveDate;
use sieveql_ir::Operator;

/// Literal family a raw argument is typed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Temporal,
    Number,
    Bool,
    Text,
}

fn classify(raw: &str) -> Family {
    if parse_datetime(raw).is_some()
        || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
        || parse_time(raw).is_some()
    {
        Family::Temporal
    } else if raw.parse::<i64>().is_ok() || raw.parse::<f64>().is_ok() {
        Family::Number
    } else if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("false") {
        Family::Bool
    } else {
        Family::Text
    }
}

/// Type all arguments as the family they unanimously match, else text.
fn common_family(arguments: &[String]) -> Family {
    let mut families = arguments.iter().map(|a| classify(a));
    match families.next() {
        Some(first) if families.all(|f| f == first) => first,
        _ => Family::Text,
    }
}

fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out
}

fn literal(raw: &str, family: Family) -> String {
    match family {
        Family::Temporal => format!("\"{}\".datetime()", escape_text(raw)),
        Family::Number => raw.trim().to_string(),
        Family::Bool => raw.to_ascii_lowercase(),
        Family::Text => format!("\"{}\"", escape_text(raw)),
    }
}

fn value_ref(family: Family) -> &'static str {
    match family {
        Family::Temporal => "@.datetime()",
        _ => "@",
    }
}

/// Turn a raw argument into a like_regex body: `*` becomes `.*`, other
/// regex metacharacters are escaped, and wildcard-free arguments are
/// wrapped as a contains pattern.
fn regex_pattern(raw: &str, wrap_contains: bool) -> String {
    let mut body = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '*' => body.push_str(".*"),
            '"' => body.push_str("\\\""),
            '.' | '^' | '$' | '|' | '?' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '\\' => {
                body.push('\\');
                body.push(c);
            }
            _ => body.push(c),
        }
    }
    if wrap_contains && !raw.contains('*') {
        format!(".*{body}.*")
    } else {
        body
    }
}

fn check_keys(keys: &[String]) -> Result<(), CompileError> {
    if keys.is_empty() {
        return Err(CompileError::InvalidJsonPath(
            "selector ends at the document column with no key path".to_string(),
        ));
    }
    for key in keys {
        if key.trim().is_empty() || key.contains(char::is_whitespace) {
            return Err(CompileError::InvalidJsonPath(format!(
                "malformed key token '{key}'"
            )));
        }
    }
    Ok(())
}

/// Compile one comparison against a JSON key path.
///
/// Returns the path-test expression and whether the caller must invert it.
pub fn compile_json_test(
    operator: &Operator,
    keys: &[String],
    arguments: &[String],
) -> Result<(String, bool), CompileError> {
    check_keys(keys)?;
    let inverted = operator.is_negated();
    let positive = operator.positive();
    let family = common_family(arguments);

    let condition = match &positive {
        Operator::Equal | Operator::IgnoreCaseEqual => {
            if arguments.is_empty() {
                return Err(CompileError::arity(operator, 0));
            }
            if arguments.len() > 1 {
                // Multi-argument equality degrades to membership.
                disjunction(arguments, family)
            } else {
                equality(&arguments[0], family, positive == Operator::IgnoreCaseEqual)
            }
        }
        Operator::GreaterThan
        | Operator::GreaterThanOrEqual
        | Operator::LessThan
        | Operator::LessThanOrEqual => {
            if arguments.len() != 1 {
                return Err(CompileError::arity(operator, arguments.len()));
            }
            let symbol = match positive {
                Operator::GreaterThan => ">",
                Operator::GreaterThanOrEqual => ">=",
                Operator::LessThan => "<",
                _ => "<=",
            };
            format!(
                "{} {} {}",
                value_ref(family),
                symbol,
                literal(&arguments[0], family)
            )
        }
        Operator::In => {
            if arguments.is_empty() {
                return Err(CompileError::arity(operator, 0));
            }
            disjunction(arguments, family)
        }
        Operator::Between => {
            if arguments.len() != 2 {
                return Err(CompileError::arity(operator, arguments.len()));
            }
            format!(
                "{vr} >= {} && {vr} <= {}",
                literal(&arguments[0], family),
                literal(&arguments[1], family),
                vr = value_ref(family)
            )
        }
        Operator::Like | Operator::IgnoreCaseLike => {
            if arguments.len() != 1 {
                return Err(CompileError::arity(operator, arguments.len()));
            }
            let flag = if positive == Operator::IgnoreCaseLike {
                " flag \"i\""
            } else {
                ""
            };
            format!(
                "@ like_regex \"{}\"{flag}",
                regex_pattern(&arguments[0], true)
            )
        }
        // Arguments are accepted and ignored on null tests.
        Operator::NotNull => "@ != null".to_string(),
        other => return Err(CompileError::UnsupportedOperator(other.clone())),
    };

    Ok((format!("$.{} ? ({condition})", keys.join(".")), inverted))
}

fn equality(argument: &str, family: Family, ignore_case: bool) -> String {
    // Wildcard markers promote text equality to a pattern match.
    if family == Family::Text && argument.contains('*') {
        let flag = if ignore_case { " flag \"i\"" } else { "" };
        return format!("@ like_regex \"{}\"{flag}", regex_pattern(argument, false));
    }
    if ignore_case && family == Family::Text {
        return format!(
            "@ like_regex \"^{}$\" flag \"i\"",
            regex_pattern(argument, false)
        );
    }
    format!("{} == {}", value_ref(family), literal(argument, family))
}

fn disjunction(arguments: &[String], family: Family) -> String {
    arguments
        .iter()
        .map(|a| format!("{} == {}", value_ref(family), literal(a, family)))
        .collect::<Vec<_>>()
        .join(" || ")
}
