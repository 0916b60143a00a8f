//! # Witness Input Assignment
//!
//! Named input values for one circuit: scalars, arrays, or nested
//! shapes, exactly as the witness calculator consumes them. The
//! assignment is ephemeral — written to the artifact directory for the
//! duration of a request and overwritten by the next one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::ProveError;

/// Named input values for a circuit's witness computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WitnessAssignment(Map<String, Value>);

impl WitnessAssignment {
    /// Empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an assignment from a JSON value, which must be an object of
    /// named inputs.
    pub fn from_value(value: Value) -> Result<Self, ProveError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ProveError::InvalidAssignment(format!(
                "expected an object of named inputs, got {other}"
            ))),
        }
    }

    /// Set one input value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Whether no inputs are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The named inputs.
    pub fn inputs(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Write the assignment as the tool's input JSON file.
    pub async fn write_to(&self, path: &Path) -> Result<(), ProveError> {
        let bytes = serde_json::to_vec(&self.0)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_accepts_nested_shapes() {
        let assignment =
            WitnessAssignment::from_value(json!({"a": 3, "path": [1, 0, 1], "nested": {"x": "7"}}))
                .unwrap();
        assert!(!assignment.is_empty());
        assert_eq!(assignment.inputs()["a"], json!(3));
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(WitnessAssignment::from_value(json!([1, 2])).is_err());
        assert!(WitnessAssignment::from_value(json!("a")).is_err());
    }

    #[test]
    fn set_builds_incrementally() {
        let mut assignment = WitnessAssignment::new();
        assignment.set("a", 3).set("b", 4);
        assert_eq!(assignment.inputs().len(), 2);
    }

    #[tokio::test]
    async fn writes_tool_input_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("input.json");
        let mut assignment = WitnessAssignment::new();
        assignment.set("a", 3).set("b", 4);
        assignment.write_to(&path).await.unwrap();

        let back: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(back, json!({"a": 3, "b": 4}));
    }
}
