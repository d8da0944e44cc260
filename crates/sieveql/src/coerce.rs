//! String-literal coercion into typed values.
//!
//! Resolution order: a user-registered converter for the exact target
//! type, then the built-in for that type. This component never raises to
//! its caller: an expected parse failure degrades to [`Value::Null`] (the
//! comparison then proceeds with a null operand), and only
//! converter-internal faults are logged as errors while still degrading.

use crate::schema::ScalarType;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use sieveql_ir::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// Failure reported by a user-registered converter.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// The literal does not parse as the target type; expected, degrades
    /// quietly.
    Invalid(String),
    /// A fault inside the converter itself; logged at error level.
    Internal(String),
}

/// A user-registered converter.
pub type ConverterFn = Arc<dyn Fn(&str) -> Result<Value, ConvertError> + Send + Sync>;

/// Converter table: built-ins for every [`ScalarType`], overridable per
/// exact target type. Populated at startup, shared immutably afterwards.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    custom: HashMap<ScalarType, ConverterFn>,
}

impl ConverterRegistry {
    /// Create a registry with only the built-in converters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter for an exact target type, shadowing the
    /// built-in.
    pub fn register<F>(&mut self, target: ScalarType, converter: F)
    where
        F: Fn(&str) -> Result<Value, ConvertError> + Send + Sync + 'static,
    {
        self.custom.insert(target, Arc::new(converter));
    }

    /// Coerce a raw literal to the target type.
    pub fn coerce(&self, raw: &str, target: &ScalarType) -> Value {
        if let Some(converter) = self.custom.get(target) {
            return match converter(raw) {
                Ok(value) => value,
                Err(ConvertError::Invalid(reason)) => {
                    debug!(raw, %reason, "literal coercion failed, degrading to null");
                    Value::Null
                }
                Err(ConvertError::Internal(reason)) => {
                    error!(raw, %reason, "converter fault, degrading to null");
                    Value::Null
                }
            };
        }
        match builtin(raw, target) {
            Some(value) => value,
            None => {
                debug!(
                    raw,
                    target = %target.type_name(),
                    "literal coercion failed, degrading to null"
                );
                Value::Null
            }
        }
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn builtin(raw: &str, target: &ScalarType) -> Option<Value> {
    match target {
        ScalarType::String => Some(Value::String(raw.to_string())),
        ScalarType::Bool => {
            if raw.eq_ignore_ascii_case("true") {
                Some(Value::Bool(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Some(Value::Bool(false))
            } else {
                None
            }
        }
        ScalarType::Int32 => raw.parse::<i32>().ok().map(Value::Int32),
        ScalarType::Int64 => raw.parse::<i64>().ok().map(Value::Int64),
        ScalarType::Float32 => raw.parse::<f32>().ok().map(Value::Float32),
        ScalarType::Float64 => raw.parse::<f64>().ok().map(Value::Float64),
        ScalarType::Char => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Value::Char(c)),
                _ => None,
            }
        }
        ScalarType::Uuid => parse_uuid(raw).map(Value::Uuid),
        ScalarType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().map(Value::Date),
        ScalarType::Time => parse_time(raw).map(Value::Time),
        ScalarType::DateTime => parse_datetime(raw).map(Value::DateTime),
        ScalarType::Enum { variants, .. } => variants
            .iter()
            .find(|v| v.as_str() == raw)
            .map(|v| Value::String(v.clone())),
    }
}

/// Parse a wall-clock time in any of the accepted precisions.
pub(crate) fn parse_time(raw: &str) -> Option<NaiveTime> {
    for format in ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"] {
        if let Ok(t) = NaiveTime::parse_from_str(raw, format) {
            return Some(t);
        }
    }
    None
}

/// Parse a timestamp, with offset or naive (naive is taken as UTC), in any
/// of the accepted precisions.
pub(crate) fn parse_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }
    None
}

/// Parse a hyphenated UUID string to bytes.
pub(crate) fn parse_uuid(s: &str) -> Option<[u8; 16]> {
    if s.len() != 36 || s.chars().filter(|c| *c == '-').count() != 4 {
        return None;
    }
    let hex: String = s.chars().filter(|c| *c != '-').collect();
    if hex.len() != 32 {
        return None;
    }
    let mut bytes = [0u8; 16];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_scalars() {
        let registry = ConverterRegistry::new();

        assert_eq!(
            registry.coerce("hello", &ScalarType::String),
            Value::String("hello".into())
        );
        assert_eq!(registry.coerce("42", &ScalarType::Int32), Value::Int32(42));
        assert_eq!(
            registry.coerce("9999999999", &ScalarType::Int64),
            Value::Int64(9_999_999_999)
        );
        assert_eq!(
            registry.coerce("2.5", &ScalarType::Float64),
            Value::Float64(2.5)
        );
        assert_eq!(registry.coerce("TRUE", &ScalarType::Bool), Value::Bool(true));
        assert_eq!(registry.coerce("x", &ScalarType::Char), Value::Char('x'));
    }

    #[test]
    fn test_parse_failure_degrades_to_null() {
        let registry = ConverterRegistry::new();

        assert_eq!(registry.coerce("abc", &ScalarType::Int32), Value::Null);
        assert_eq!(registry.coerce("maybe", &ScalarType::Bool), Value::Null);
        assert_eq!(registry.coerce("xy", &ScalarType::Char), Value::Null);
        assert_eq!(registry.coerce("not-a-date", &ScalarType::Date), Value::Null);
    }

    #[test]
    fn test_uuid_parsing() {
        let registry = ConverterRegistry::new();
        let value = registry.coerce("123e4567-e89b-12d3-a456-426614174000", &ScalarType::Uuid);
        if let Value::Uuid(bytes) = value {
            assert_eq!(bytes[0], 0x12);
            assert_eq!(bytes[1], 0x3e);
        } else {
            panic!("expected Uuid");
        }
        assert_eq!(registry.coerce("not-a-uuid", &ScalarType::Uuid), Value::Null);
    }

    #[test]
    fn test_temporal_precisions() {
        let registry = ConverterRegistry::new();

        assert!(matches!(
            registry.coerce("2024-06-01", &ScalarType::Date),
            Value::Date(_)
        ));
        assert!(matches!(
            registry.coerce("10:30", &ScalarType::Time),
            Value::Time(_)
        ));
        assert!(matches!(
            registry.coerce("10:30:15.250", &ScalarType::Time),
            Value::Time(_)
        ));
        assert!(matches!(
            registry.coerce("2024-06-01T10:30:15+02:00", &ScalarType::DateTime),
            Value::DateTime(_)
        ));
        assert!(matches!(
            registry.coerce("2024-06-01 10:30:15", &ScalarType::DateTime),
            Value::DateTime(_)
        ));
    }

    #[test]
    fn test_enum_by_name() {
        let registry = ConverterRegistry::new();
        let status = ScalarType::Enum {
            name: "Status".into(),
            variants: vec!["Active".into(), "Inactive".into()],
        };

        assert_eq!(
            registry.coerce("Active", &status),
            Value::String("Active".into())
        );
        // Exact-name match only.
        assert_eq!(registry.coerce("active", &status), Value::Null);
    }

    #[test]
    fn test_custom_converter_shadows_builtin() {
        let mut registry = ConverterRegistry::new();
        registry.register(ScalarType::Int32, |raw| {
            raw.trim_start_matches('#')
                .parse::<i32>()
                .map(Value::Int32)
                .map_err(|e| ConvertError::Invalid(e.to_string()))
        });

        assert_eq!(registry.coerce("#7", &ScalarType::Int32), Value::Int32(7));
        assert_eq!(registry.coerce("#x", &ScalarType::Int32), Value::Null);
    }
}
