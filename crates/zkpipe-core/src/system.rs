//! # Proving System Selector
//!
//! The proving system determines key derivation, proof shape, and which
//! external tool subcommand family handles each operation. Groth16 and
//! PLONK are fully supported; FFLONK is carried through the same paths.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// The cryptographic proof construction to use for a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvingSystem {
    /// Groth16 — circuit-specific trusted setup, smallest proofs.
    Groth16,
    /// PLONK — universal setup, no per-circuit contribution.
    Plonk,
    /// FFLONK — PLONK variant with cheaper verification.
    Fflonk,
}

impl ProvingSystem {
    /// The identifier used in artifact file names and tool invocations.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groth16 => "groth16",
            Self::Plonk => "plonk",
            Self::Fflonk => "fflonk",
        }
    }

    /// Whether key derivation applies a ceremony contribution step.
    ///
    /// Groth16 requires a circuit-specific contribution on top of the
    /// universal setup; PLONK and FFLONK setup emits the final key
    /// directly.
    pub fn requires_contribution(&self) -> bool {
        matches!(self, Self::Groth16)
    }

    /// All supported systems, in preference order.
    pub fn all() -> [ProvingSystem; 3] {
        [Self::Groth16, Self::Plonk, Self::Fflonk]
    }
}

impl fmt::Display for ProvingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProvingSystem {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groth16" => Ok(Self::Groth16),
            "plonk" => Ok(Self::Plonk),
            "fflonk" => Ok(Self::Fflonk),
            other => Err(CoreError::UnknownProvingSystem(other.to_string())),
        }
    }
}
