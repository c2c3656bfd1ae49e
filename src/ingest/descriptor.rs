//! Batch elements as they arrive on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{normalize_grid_name, FleetError, FleetResult};

/// One incoming grid description. Both fields are optional on the wire and
/// checked by [`GridDescriptor::into_spec`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridDescriptor {
    pub name: Option<String>,
    pub age: Option<u32>,
}

/// A descriptor whose required fields are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSpec {
    pub name: String,
    pub age: u32,
}

/// A batch element that either parsed into a descriptor or failed on its own.
/// `name` is kept whenever it could be read, so rejections can be reported by name.
#[derive(Debug)]
pub struct BatchElement {
    pub name: Option<String>,
    pub parsed: FleetResult<GridDescriptor>,
}

impl BatchElement {
    pub fn from_loose(value: &Value) -> Self {
        Self {
            name: loose_name(value),
            parsed: GridDescriptor::from_loose(value),
        }
    }
}

impl From<GridDescriptor> for BatchElement {
    fn from(descriptor: GridDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            parsed: Ok(descriptor),
        }
    }
}

fn loose_name(value: &Value) -> Option<String> {
    value
        .as_object()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("name"))
        .and_then(|(_, name)| name.as_str())
        .map(str::to_string)
}

impl GridDescriptor {
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: Some(name.into()),
            age: Some(age),
        }
    }

    /// Reads an untyped JSON object. Keys match case-insensitively and
    /// unknown keys are ignored.
    pub fn from_loose(value: &Value) -> FleetResult<Self> {
        let Value::Object(fields) = value else {
            return Err(FleetError::InvalidInput(format!(
                "batch element must be an object, got {value}"
            )));
        };

        let mut descriptor = Self::default();
        for (key, value) in fields {
            if key.eq_ignore_ascii_case("name") {
                let name = value.as_str().ok_or_else(|| {
                    FleetError::InvalidInput(format!("name must be a string, got {value}"))
                })?;
                descriptor.name = Some(name.to_string());
            } else if key.eq_ignore_ascii_case("age") {
                descriptor.age = Some(parse_age(value)?);
            }
        }
        Ok(descriptor)
    }

    pub fn into_spec(self) -> FleetResult<GridSpec> {
        let name = self
            .name
            .ok_or_else(|| FleetError::InvalidInput("name is missing".into()))?;
        let name = normalize_grid_name(&name)?;
        let age = self
            .age
            .ok_or_else(|| FleetError::InvalidInput(format!("age is missing for '{name}'")))?;
        Ok(GridSpec { name, age })
    }
}

fn parse_age(value: &Value) -> FleetResult<u32> {
    value
        .as_u64()
        .and_then(|age| u32::try_from(age).ok())
        .ok_or_else(|| {
            FleetError::InvalidInput(format!("age must be a non-negative whole number of days, got {value}"))
        })
}

/// Parses an uploaded batch document. The document must be a JSON array;
/// each element is parsed independently.
pub fn parse_loose_batch(raw: &[u8]) -> FleetResult<Vec<BatchElement>> {
    let document: Value = serde_json::from_slice(raw)
        .map_err(|e| FleetError::InvalidInput(format!("batch is not valid JSON: {e}")))?;
    let Value::Array(elements) = document else {
        return Err(FleetError::InvalidInput("batch must be a JSON array".into()));
    };
    Ok(elements.iter().map(BatchElement::from_loose).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_keys_match_ignoring_case() {
        let descriptor =
            GridDescriptor::from_loose(&json!({"NAME": "Harbour", "Age": 120, "colour": "blue"}))
                .unwrap();
        assert_eq!(descriptor, GridDescriptor::new("Harbour", 120));
    }

    #[rstest]
    #[case(json!({"name": "Harbour", "age": "ten"}))]
    #[case(json!({"name": "Harbour", "age": -4}))]
    #[case(json!({"name": "Harbour", "age": 12.5}))]
    #[case(json!({"name": 17, "age": 12}))]
    #[case(json!(["Harbour", 12]))]
    fn test_malformed_elements(#[case] value: Value) {
        assert!(matches!(
            GridDescriptor::from_loose(&value),
            Err(FleetError::InvalidInput(_))
        ));
    }

    #[rstest]
    #[case(GridDescriptor { name: Some("Harbour".into()), age: None })]
    #[case(GridDescriptor { name: None, age: Some(4) })]
    #[case(GridDescriptor { name: Some("   ".into()), age: Some(4) })]
    #[case(GridDescriptor { name: Some("x".repeat(501)), age: Some(4) })]
    fn test_missing_required_fields(#[case] descriptor: GridDescriptor) {
        assert!(matches!(descriptor.into_spec(), Err(FleetError::InvalidInput(_))));
    }

    #[test]
    fn test_spec_trims_name() {
        let spec = GridDescriptor::new("  Harbour ", 3).into_spec().unwrap();
        assert_eq!(spec, GridSpec { name: "Harbour".into(), age: 3 });
    }

    #[test]
    fn test_parse_document_keeps_element_errors() {
        let raw = br#"[{"name": "A", "age": 100}, {"name": "B", "age": "old"}, 7]"#;
        let elements = parse_loose_batch(raw).unwrap();
        assert_eq!(elements.len(), 3);
        assert!(elements[0].parsed.is_ok());
        assert!(elements[1].parsed.is_err());
        assert_eq!(elements[1].name.as_deref(), Some("B"));
        assert!(elements[2].parsed.is_err());
        assert_eq!(elements[2].name, None);
    }

    #[rstest]
    #[case(b"not json".as_slice())]
    #[case(br#"{"name": "A", "age": 1}"#.as_slice())]
    fn test_parse_document_rejects_non_arrays(#[case] raw: &[u8]) {
        assert!(matches!(parse_loose_batch(raw), Err(FleetError::InvalidInput(_))));
    }
}
