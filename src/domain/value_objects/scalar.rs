//! Scalar values carried by entity attributes and observations

use serde::{Deserialize, Serialize};

/// Value of an entity attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

/// Measured value of an observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservationValue {
    Number(f64),
    Text(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_values_deserialize_untagged() {
        let values: Vec<AttributeValue> = serde_json::from_str(r#"[true, 98.4, "Austin"]"#).unwrap();
        assert_eq!(values[0], AttributeValue::Bool(true));
        assert_eq!(values[1], AttributeValue::Number(98.4));
        assert_eq!(values[2], AttributeValue::Text("Austin".to_string()));
    }

    #[test]
    fn test_observation_values_deserialize_untagged() {
        let values: Vec<ObservationValue> = serde_json::from_str(r#"[98.4, "nominal"]"#).unwrap();
        assert_eq!(values[0], ObservationValue::Number(98.4));
        assert_eq!(values[1], ObservationValue::Text("nominal".to_string()));
    }
}
