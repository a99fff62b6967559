//! Validated, immutable parameter sets.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ParamError, Result};
use crate::schema::{ParamSpec, ParamType, ParamValue, Schema};

/// Every schema name bound to a value of its declared type.
///
/// Only constructed by validating a raw table against a [`Schema`], and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSet {
    /// Profile the values came from, for diagnostics.
    profile: String,
    values: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    /// Validate a raw `[parameters]` table against `schema`.
    ///
    /// Unknown names are reported before missing ones so that a retired
    /// alias yields a hint instead of a bare "missing" error.
    pub fn from_table(schema: &Schema, profile: &str, table: &toml::Table) -> Result<Self> {
        for name in table.keys() {
            if schema.get(name).is_none() {
                return Err(ParamError::UnknownParameter {
                    profile: profile.to_string(),
                    name: name.clone(),
                    hint: schema.canonical_for(name).map(str::to_string),
                });
            }
        }

        let mut values = BTreeMap::new();
        for spec in schema.iter() {
            let raw = table
                .get(spec.name)
                .ok_or_else(|| ParamError::MissingParameter {
                    profile: profile.to_string(),
                    name: spec.name.to_string(),
                })?;
            values.insert(spec.name.to_string(), convert(spec, raw)?);
        }

        Ok(Self {
            profile: profile.to_string(),
            values,
        })
    }

    /// Name of the profile these values were loaded from.
    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Fetch an unsigned integer parameter.
    pub fn uint(&self, name: &str) -> Result<u64> {
        match self.require(name)? {
            ParamValue::UInt(v) => Ok(*v),
            other => Err(mismatch(name, "unsigned integer", other)),
        }
    }

    /// Fetch a string parameter.
    pub fn string(&self, name: &str) -> Result<&str> {
        match self.require(name)? {
            ParamValue::Str(s) => Ok(s.as_str()),
            other => Err(mismatch(name, "string", other)),
        }
    }

    /// Fetch a boolean parameter.
    pub fn boolean(&self, name: &str) -> Result<bool> {
        match self.require(name)? {
            ParamValue::Bool(b) => Ok(*b),
            other => Err(mismatch(name, "bool", other)),
        }
    }

    /// Iterate name/value pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn require(&self, name: &str) -> Result<&ParamValue> {
        self.values
            .get(name)
            .ok_or_else(|| ParamError::MissingParameter {
                profile: self.profile.clone(),
                name: name.to_string(),
            })
    }
}

fn mismatch(name: &str, expected: &str, found: &ParamValue) -> ParamError {
    ParamError::TypeMismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
}

/// Convert a raw TOML value to the declared type. Out-of-width integers are
/// rejected, never clamped.
fn convert(spec: &ParamSpec, raw: &toml::Value) -> Result<ParamValue> {
    let reject = |found: String| ParamError::TypeMismatch {
        name: spec.name.to_string(),
        expected: spec.ty.to_string(),
        found,
    };

    match (spec.ty, raw) {
        (ParamType::UInt { bits }, toml::Value::Integer(i)) => {
            let value = u64::try_from(*i).map_err(|_| reject(format!("negative integer {i}")))?;
            match spec.ty.max_value() {
                Some(max) if value <= max => Ok(ParamValue::UInt(value)),
                _ => Err(reject(format!("integer {i} wider than {bits} bits"))),
            }
        }
        (ParamType::Str, toml::Value::String(s)) => Ok(ParamValue::Str(s.clone())),
        (ParamType::Bool, toml::Value::Boolean(b)) => Ok(ParamValue::Bool(*b)),
        (_, other) => Err(reject(format!("{} {other}", other.type_str()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> toml::Table {
        toml::from_str(src).unwrap()
    }

    fn small_schema() -> Schema {
        Schema::new(vec![
            ParamSpec::new("WIDTH", ParamType::UInt { bits: 8 }, ""),
            ParamSpec::new("NAME", ParamType::Str, ""),
            ParamSpec::new("ENABLED", ParamType::Bool, ""),
        ])
        .with_alias("OLD_WIDTH", "WIDTH")
    }

    #[test]
    fn accepts_complete_table() {
        let set = ParameterSet::from_table(
            &small_schema(),
            "test",
            &table("WIDTH = 255\nNAME = \"board\"\nENABLED = true\n"),
        )
        .unwrap();
        assert_eq!(set.uint("WIDTH").unwrap(), 255);
        assert_eq!(set.string("NAME").unwrap(), "board");
        assert!(set.boolean("ENABLED").unwrap());
        assert_eq!(set.len(), 3);
        assert_eq!(set.profile(), "test");
    }

    #[test]
    fn missing_name_is_reported() {
        let err = ParameterSet::from_table(
            &small_schema(),
            "test",
            &table("WIDTH = 1\nENABLED = false\n"),
        )
        .unwrap_err();
        match err {
            ParamError::MissingParameter { profile, name } => {
                assert_eq!(profile, "test");
                assert_eq!(name, "NAME");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_alias_gets_hint() {
        let err = ParameterSet::from_table(
            &small_schema(),
            "test",
            &table("OLD_WIDTH = 1\nNAME = \"x\"\nENABLED = false\n"),
        )
        .unwrap_err();
        assert!(matches!(
            &err,
            ParamError::UnknownParameter { hint: Some(h), .. } if h == "WIDTH"
        ));
        assert!(err.to_string().contains("did you mean WIDTH"));
    }

    #[test]
    fn integer_wider_than_declared_is_rejected() {
        let err = ParameterSet::from_table(
            &small_schema(),
            "test",
            &table("WIDTH = 256\nNAME = \"x\"\nENABLED = false\n"),
        )
        .unwrap_err();
        assert!(matches!(err, ParamError::TypeMismatch { ref name, .. } if name == "WIDTH"));
        assert!(err.to_string().contains("wider than 8 bits"));
    }

    #[test]
    fn negative_integer_is_rejected() {
        let err = ParameterSet::from_table(
            &small_schema(),
            "test",
            &table("WIDTH = -1\nNAME = \"x\"\nENABLED = false\n"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("negative integer -1"));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err = ParameterSet::from_table(
            &small_schema(),
            "test",
            &table("WIDTH = \"eight\"\nNAME = \"x\"\nENABLED = false\n"),
        )
        .unwrap_err();
        match err {
            ParamError::TypeMismatch {
                name,
                expected,
                found,
            } => {
                assert_eq!(name, "WIDTH");
                assert_eq!(expected, "u8");
                assert!(found.starts_with("string"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn typed_accessors_check_type() {
        let set = ParameterSet::from_table(
            &small_schema(),
            "test",
            &table("WIDTH = 3\nNAME = \"x\"\nENABLED = false\n"),
        )
        .unwrap();
        assert!(matches!(
            set.uint("NAME"),
            Err(ParamError::TypeMismatch { .. })
        ));
        assert!(matches!(
            set.uint("ABSENT"),
            Err(ParamError::MissingParameter { .. })
        ));
    }
}
