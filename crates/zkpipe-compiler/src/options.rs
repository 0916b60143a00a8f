//! # Compilation Options and Flag Assembly
//!
//! Mirrors the external compiler's command-line surface: which artifact
//! kinds to emit, the optimization level, and the constraint field prime.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::Path;

use zkpipe_core::CircuitName;

/// Constraint-simplification level passed to the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptLevel {
    /// No simplification.
    O0,
    /// Signal-substitution simplification only.
    O1,
    /// Full simplification.
    O2,
}

impl OptLevel {
    /// The compiler flag for this level.
    pub fn as_flag(&self) -> &'static str {
        match self {
            Self::O0 => "--O0",
            Self::O1 => "--O1",
            Self::O2 => "--O2",
        }
    }
}

impl Default for OptLevel {
    fn default() -> Self {
        Self::O1
    }
}

impl fmt::Display for OptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Strip the leading dashes for display.
        f.write_str(&self.as_flag()[2..])
    }
}

/// Field prime the constraint system is defined over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldPrime {
    /// BN254 scalar field (compiler name `bn128`).
    Bn128,
    /// BLS12-381 scalar field.
    Bls12381,
    /// Goldilocks 64-bit field.
    Goldilocks,
}

impl FieldPrime {
    /// The identifier passed to the compiler's `-p` flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bn128 => "bn128",
            Self::Bls12381 => "bls12381",
            Self::Goldilocks => "goldilocks",
        }
    }
}

impl Default for FieldPrime {
    fn default() -> Self {
        Self::Bn128
    }
}

impl fmt::Display for FieldPrime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options controlling one compiler invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    /// Emit the constraint system (`--r1cs`).
    pub emit_r1cs: bool,
    /// Emit the wasm witness calculator (`--wasm`).
    pub emit_wasm: bool,
    /// Emit the symbol table (`--sym`).
    pub emit_sym: bool,
    /// Emit the native C witness calculator (`--c`).
    pub emit_c: bool,
    /// Constraint-simplification level.
    pub opt_level: OptLevel,
    /// Field prime for the constraint system.
    pub prime: FieldPrime,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            emit_r1cs: true,
            emit_wasm: true,
            emit_sym: true,
            emit_c: false,
            opt_level: OptLevel::default(),
            prime: FieldPrime::default(),
        }
    }
}

impl CompileOptions {
    /// Assemble the compiler argument list for a source file.
    ///
    /// The source path comes first; artifact-kind flags, optimization
    /// level, field prime, and the optional library include path follow.
    /// Output flags are relative — the invocation runs with the artifact
    /// directory as working directory.
    pub fn to_args(&self, source: &Path, library_dir: Option<&Path>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![source.as_os_str().to_os_string()];
        if self.emit_r1cs {
            args.push("--r1cs".into());
        }
        if self.emit_wasm {
            args.push("--wasm".into());
        }
        if self.emit_sym {
            args.push("--sym".into());
        }
        if self.emit_c {
            args.push("--c".into());
        }
        args.push(self.opt_level.as_flag().into());
        args.push("-p".into());
        args.push(self.prime.as_str().into());
        if let Some(dir) = library_dir {
            args.push("-l".into());
            args.push(dir.as_os_str().to_os_string());
        }
        args
    }
}

/// A circuit submission: name, source text, and compile options.
///
/// Transient — written to the workspace on compile and superseded by the
/// next submission under the same name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitSource {
    /// Validated circuit name; keys all durable artifacts.
    pub name: CircuitName,
    /// Circuit source text.
    pub source: String,
    /// Compiler options.
    #[serde(default)]
    pub options: CompileOptions,
}
