//! # Circuit Compiler Service
//!
//! Owns the compile flow: precheck, source placement, subprocess
//! invocation with the artifact directory as working directory, output
//! classification, artifact discovery, and stats persistence.
//!
//! ## Overwrite Semantics
//!
//! The artifact directory for a circuit name is recreated on every
//! compile. There is no content versioning — the latest compile wins,
//! and stale keys are caught downstream by the ceremony's staleness
//! check.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use zkpipe_core::{
    strip_ansi, CircuitName, DiagnosticFormatter, LineClassifier, LineKind, ToolchainConfig,
    WorkspaceConfig,
};

use crate::error::CompileError;
use crate::options::CircuitSource;
use crate::stats::CircuitStats;

/// Upper bound on captured compiler output.
const CAPTURE_LIMIT: usize = 1024 * 1024;

/// File name for persisted stats inside an artifact directory.
const STATS_FILE: &str = "stats.json";

/// Handles and derived stats for one compiled circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledArtifactSet {
    /// The circuit this set belongs to.
    pub name: CircuitName,
    /// Artifact directory (recreated per compile).
    pub dir: PathBuf,
    /// Constraint system path.
    pub r1cs: PathBuf,
    /// Witness calculator path.
    pub wasm: PathBuf,
    /// Symbol table path.
    pub sym: PathBuf,
    /// Derived circuit statistics.
    pub stats: CircuitStats,
}

/// Read a child stream to completion, keeping at most `cap` bytes.
async fn drain_capped<R>(stream: Option<R>, cap: usize) -> std::io::Result<String>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let Some(mut stream) = stream else {
        return Ok(String::new());
    };
    let mut kept = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        if kept.len() < cap {
            let take = n.min(cap - kept.len());
            kept.extend_from_slice(&chunk[..take]);
        }
    }
    Ok(String::from_utf8_lossy(&kept).into_owned())
}

/// The circuit compiler adapter.
///
/// Construct one per workspace; the service holds no mutable state and
/// can be shared behind an `Arc`.
pub struct CircuitCompiler {
    workspace: WorkspaceConfig,
    toolchain: ToolchainConfig,
    formatter: DiagnosticFormatter,
}

impl CircuitCompiler {
    /// Create a compiler adapter with the default line classifier.
    pub fn new(workspace: WorkspaceConfig, toolchain: ToolchainConfig) -> Self {
        Self {
            workspace,
            toolchain,
            formatter: DiagnosticFormatter::default(),
        }
    }

    /// Replace the line classifier (e.g. for a structured tool format).
    pub fn with_classifier(mut self, classifier: Box<dyn LineClassifier>) -> Self {
        self.formatter = DiagnosticFormatter::new(classifier);
        self
    }

    /// The workspace this compiler writes into.
    pub fn workspace(&self) -> &WorkspaceConfig {
        &self.workspace
    }

    fn r1cs_path(&self, name: &CircuitName) -> PathBuf {
        self.workspace.circuit_dir(name).join(format!("{name}.r1cs"))
    }

    fn wasm_path(&self, name: &CircuitName) -> PathBuf {
        self.workspace
            .circuit_dir(name)
            .join(format!("{name}_js"))
            .join(format!("{name}.wasm"))
    }

    fn sym_path(&self, name: &CircuitName) -> PathBuf {
        self.workspace.circuit_dir(name).join(format!("{name}.sym"))
    }

    /// Compile a circuit source, returning the artifact set.
    ///
    /// Success requires zero classified error lines **and** the expected
    /// constraint-system artifact on disk; a clean exit alone is not
    /// trusted.
    pub async fn compile(&self, src: &CircuitSource) -> Result<CompiledArtifactSet, CompileError> {
        crate::precheck::run(&src.source)?;

        self.workspace.ensure_layout()?;
        let source_path = self.workspace.source_path(&src.name);
        tokio::fs::write(&source_path, &src.source).await?;

        // The artifact directory is fully overwritten per compile.
        let dir = self.workspace.circuit_dir(&src.name);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(&dir).await?;

        let args = src
            .options
            .to_args(&source_path, self.toolchain.library_dir.as_deref());
        tracing::info!(circuit = %src.name, tool = %self.toolchain.circom_bin.display(), "compiling circuit");
        let started = Instant::now();

        let mut child = Command::new(&self.toolchain.circom_bin)
            .args(&args)
            .current_dir(&dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CompileError::Spawn {
                tool: self.toolchain.circom_bin.display().to_string(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (out, err) = tokio::join!(
            drain_capped(stdout, CAPTURE_LIMIT),
            drain_capped(stderr, CAPTURE_LIMIT)
        );
        let status = child.wait().await?;
        let elapsed = started.elapsed();

        let mut lines: Vec<String> = Vec::new();
        for stream in [out?, err?] {
            lines.extend(stream.lines().map(strip_ansi));
        }

        let errors: Vec<String> = lines
            .iter()
            .filter(|l| self.formatter.classify(l) == LineKind::Error)
            .cloned()
            .collect();
        for line in &lines {
            if self.formatter.classify(line) == LineKind::Warning {
                tracing::warn!(circuit = %src.name, "{line}");
            }
        }
        if !errors.is_empty() {
            tracing::warn!(
                circuit = %src.name,
                error_lines = errors.len(),
                ?status,
                "compilation reported errors"
            );
            return Err(CompileError::Diagnostics {
                errors,
                formatted: self.formatter.render(&lines),
            });
        }

        // Exit code and silence are not enough: the tool can exit cleanly
        // while producing nothing.
        let r1cs = self.r1cs_path(&src.name);
        let primary = if src.options.emit_r1cs {
            r1cs.clone()
        } else {
            self.wasm_path(&src.name)
        };
        if !primary.exists() {
            return Err(CompileError::ArtifactMissing { path: primary });
        }

        let mut stats = CircuitStats::default();
        stats.absorb_stdout(&lines);
        let sym = self.sym_path(&src.name);
        if let Ok(content) = tokio::fs::read_to_string(&sym).await {
            stats.absorb_symbols(&content);
        }
        tokio::fs::write(dir.join(STATS_FILE), serde_json::to_vec_pretty(&stats)?).await?;

        tracing::info!(
            circuit = %src.name,
            constraints = stats.constraints(),
            wires = stats.wires,
            elapsed_ms = elapsed.as_millis() as u64,
            "compilation succeeded"
        );

        Ok(CompiledArtifactSet {
            name: src.name.clone(),
            dir,
            r1cs,
            wasm: self.wasm_path(&src.name),
            sym,
            stats,
        })
    }

    /// Reconstruct the artifact set for a previously compiled circuit.
    ///
    /// Fails with `ArtifactMissing` if the constraint system is absent.
    pub async fn artifact_set(&self, name: &CircuitName) -> Result<CompiledArtifactSet, CompileError> {
        let r1cs = self.r1cs_path(name);
        if !r1cs.exists() {
            return Err(CompileError::ArtifactMissing { path: r1cs });
        }
        let dir = self.workspace.circuit_dir(name);
        let stats = match tokio::fs::read(dir.join(STATS_FILE)).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => CircuitStats::default(),
        };
        Ok(CompiledArtifactSet {
            name: name.clone(),
            dir,
            r1cs,
            wasm: self.wasm_path(name),
            sym: self.sym_path(name),
            stats,
        })
    }
}

impl From<serde_json::Error> for CompileError {
    fn from(e: serde_json::Error) -> Self {
        CompileError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
