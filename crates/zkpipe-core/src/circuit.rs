//! # Circuit Name — Validated Identifier
//!
//! Circuit names key every durable artifact on disk: source files,
//! compile output directories, and proving/verification keys. A name is
//! validated once at the boundary and carried as a newtype afterwards.
//!
//! ## Integrity Invariant
//!
//! Names must match `^[A-Za-z_][A-Za-z0-9_]{0,63}$`. Path separators,
//! dots, and empty strings are rejected at construction, so a request
//! cannot escape the workspace by naming a circuit `../../etc/passwd`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

fn validate_circuit_name(name: &str) -> Result<String, CoreError> {
    let n = name.trim();
    if n.is_empty() {
        return Err(CoreError::InvalidCircuitName(
            "circuit name is required".into(),
        ));
    }
    if n.len() > 64 {
        return Err(CoreError::InvalidCircuitName(format!(
            "circuit name too long: {} chars (max 64)",
            n.len()
        )));
    }
    let mut chars = n.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => {
            return Err(CoreError::InvalidCircuitName(format!(
                "circuit name must start with [A-Za-z_], got: {n:?}"
            )));
        }
    }
    for c in chars {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return Err(CoreError::InvalidCircuitName(format!(
                "circuit name contains invalid character {c:?}: must match [A-Za-z0-9_]"
            )));
        }
    }
    Ok(n.to_string())
}

/// A validated circuit name.
///
/// Wraps a `String` that has been validated against
/// `^[A-Za-z_][A-Za-z0-9_]{0,63}$`. The inner value cannot be mutated
/// after construction, guaranteeing the invariant holds wherever the
/// name is used to build a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CircuitName(String);

impl CircuitName {
    /// Create a new validated circuit name.
    ///
    /// Returns an error if the string doesn't match
    /// `^[A-Za-z_][A-Za-z0-9_]{0,63}$`.
    pub fn new(s: &str) -> Result<Self, CoreError> {
        let validated = validate_circuit_name(s)?;
        Ok(Self(validated))
    }

    /// Return the circuit name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CircuitName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for CircuitName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<str> for CircuitName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl std::str::FromStr for CircuitName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// Deserialization re-runs validation so names arriving over the wire
// carry the same guarantee as names constructed in-process.
impl<'de> Deserialize<'de> for CircuitName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        CircuitName::new(&raw).map_err(serde::de::Error::custom)
    }
}
