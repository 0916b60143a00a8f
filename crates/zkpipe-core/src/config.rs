//! # Workspace and Pipeline Configuration
//!
//! Every service in the workspace is constructed with an explicit
//! configuration value — there are no process-wide defaults consulted at
//! call time. `WorkspaceConfig` fixes the on-disk layout; `ToolchainConfig`
//! locates the external tool binaries; `PipelineConfig` is the YAML file
//! operators deploy with, from which both are derived.
//!
//! ## Layout
//!
//! ```text
//! <root>/
//!   src/                      circuit sources (<name>.circom)
//!   artifacts/<name>/         compile output, overwritten per compile
//!   keys/                     proving + verification key material
//!   setup/                    universal setup parameter files (.ptau)
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::circuit::CircuitName;
use crate::error::CoreError;
use crate::system::ProvingSystem;

/// Environment variable overriding the circuit compiler binary.
pub const ENV_CIRCOM_BIN: &str = "ZKPIPE_CIRCOM_BIN";
/// Environment variable overriding the proving tool binary.
pub const ENV_SNARKJS_BIN: &str = "ZKPIPE_SNARKJS_BIN";

/// On-disk layout of a pipeline workspace.
///
/// All durable state — sources, compiled artifacts, key material, and
/// universal setup files — lives under a single root directory. Paths for
/// a circuit are derived from its validated [`CircuitName`], never from
/// raw request strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Root directory of the workspace.
    pub root: PathBuf,
}

impl WorkspaceConfig {
    /// Create a workspace configuration rooted at the given directory.
    ///
    /// The directory does not need to exist yet — call
    /// [`ensure_layout()`](Self::ensure_layout) to create it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding circuit source files.
    pub fn src_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    /// Root directory for compiled artifacts.
    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.join("artifacts")
    }

    /// Per-circuit artifact output directory. Recreated on each compile.
    pub fn circuit_dir(&self, name: &CircuitName) -> PathBuf {
        self.artifacts_dir().join(name.as_str())
    }

    /// Directory holding proving and verification keys.
    pub fn keys_dir(&self) -> PathBuf {
        self.root.join("keys")
    }

    /// Directory holding universal setup parameter files.
    pub fn setup_dir(&self) -> PathBuf {
        self.root.join("setup")
    }

    /// Scratch directory for request-scoped staging files.
    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }

    /// Path where a circuit's source file is written before compilation.
    pub fn source_path(&self, name: &CircuitName) -> PathBuf {
        self.src_dir().join(format!("{name}.circom"))
    }

    /// Path of the final proving key for a circuit under a proving system.
    pub fn proving_key_path(&self, name: &CircuitName, system: ProvingSystem) -> PathBuf {
        self.keys_dir()
            .join(format!("{name}_{}_final.zkey", system.as_str()))
    }

    /// Path of the exported verification key for a circuit under a
    /// proving system.
    pub fn verification_key_path(&self, name: &CircuitName, system: ProvingSystem) -> PathBuf {
        self.keys_dir()
            .join(format!("{name}_{}_vkey.json", system.as_str()))
    }

    /// Create the workspace directory tree if any part of it is missing.
    pub fn ensure_layout(&self) -> Result<(), CoreError> {
        for dir in [
            self.src_dir(),
            self.artifacts_dir(),
            self.keys_dir(),
            self.setup_dir(),
            self.tmp_dir(),
        ] {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

/// Locations of the external tool binaries.
///
/// Defaults assume `circom` and `snarkjs` on `PATH`; deployments override
/// via the pipeline config file or the `ZKPIPE_CIRCOM_BIN` /
/// `ZKPIPE_SNARKJS_BIN` environment variables (environment wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Circuit compiler binary.
    pub circom_bin: PathBuf,
    /// Proving tool binary.
    pub snarkjs_bin: PathBuf,
    /// Optional circuit library include directory (`-l` flag).
    pub library_dir: Option<PathBuf>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            circom_bin: PathBuf::from("circom"),
            snarkjs_bin: PathBuf::from("snarkjs"),
            library_dir: None,
        }
    }
}

impl ToolchainConfig {
    /// Apply environment-variable overrides on top of this configuration.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bin) = std::env::var(ENV_CIRCOM_BIN) {
            if !bin.trim().is_empty() {
                self.circom_bin = PathBuf::from(bin);
            }
        }
        if let Ok(bin) = std::env::var(ENV_SNARKJS_BIN) {
            if !bin.trim().is_empty() {
                self.snarkjs_bin = PathBuf::from(bin);
            }
        }
        self
    }
}

/// Universal setup parameter store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetupConfig {
    /// Base URL of the public parameter store. Tier file names are
    /// appended to this URL on fetch.
    pub store_url: String,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            store_url: "https://hermez.s3-eu-west-1.amazonaws.com".to_string(),
        }
    }
}

/// Ledger submission collaborator settings. Absent means submissions are
/// skipped (the pipeline stops after verification).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Base URL of the ledger submission service.
    pub endpoint: String,
    /// Optional bearer token.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Resource limits for external tool invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum number of concurrently running external tool processes.
    pub max_concurrent_tools: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tools: 4,
        }
    }
}

/// Top-level deployment configuration, loaded from YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Workspace root directory.
    pub workspace_root: Option<PathBuf>,
    /// External tool locations.
    pub toolchain: ToolchainConfig,
    /// Universal setup store settings.
    pub setup: SetupConfig,
    /// Ledger collaborator settings.
    pub ledger: Option<LedgerConfig>,
    /// Resource limits.
    pub limits: LimitsConfig,
}

impl PipelineConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("cannot read config {}: {e}", path.display()))
        })?;
        let cfg: PipelineConfig = serde_yaml::from_str(&raw)?;
        Ok(cfg)
    }

    /// Derive the workspace layout, defaulting to `./workspace`.
    pub fn workspace(&self) -> WorkspaceConfig {
        let root = self
            .workspace_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("workspace"));
        WorkspaceConfig::new(root)
    }

    /// Derive the toolchain configuration with environment overrides applied.
    pub fn toolchain(&self) -> ToolchainConfig {
        self.toolchain.clone().with_env_overrides()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn layout_paths_derive_from_root() {
        let ws = WorkspaceConfig::new("/tmp/zk");
        let name = CircuitName::new("Multiplier2").unwrap();
        assert_eq!(ws.src_dir(), PathBuf::from("/tmp/zk/src"));
        assert_eq!(
            ws.circuit_dir(&name),
            PathBuf::from("/tmp/zk/artifacts/Multiplier2")
        );
        assert_eq!(
            ws.source_path(&name),
            PathBuf::from("/tmp/zk/src/Multiplier2.circom")
        );
    }

    #[test]
    fn ensure_layout_creates_tree() {
        let tmp = TempDir::new().unwrap();
        let ws = WorkspaceConfig::new(tmp.path().join("ws"));
        ws.ensure_layout().unwrap();
        assert!(ws.src_dir().is_dir());
        assert!(ws.artifacts_dir().is_dir());
        assert!(ws.keys_dir().is_dir());
        assert!(ws.setup_dir().is_dir());
        // Idempotent.
        ws.ensure_layout().unwrap();
    }

    #[test]
    fn key_paths_encode_circuit_and_system() {
        let ws = WorkspaceConfig::new("/tmp/zk");
        let name = CircuitName::new("Multiplier2").unwrap();
        assert_eq!(
            ws.proving_key_path(&name, ProvingSystem::Groth16),
            PathBuf::from("/tmp/zk/keys/Multiplier2_groth16_final.zkey")
        );
        assert_eq!(
            ws.verification_key_path(&name, ProvingSystem::Plonk),
            PathBuf::from("/tmp/zk/keys/Multiplier2_plonk_vkey.json")
        );
    }

    #[test]
    fn config_defaults_are_usable() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.toolchain.circom_bin, PathBuf::from("circom"));
        assert_eq!(cfg.limits.max_concurrent_tools, 4);
        assert!(cfg.ledger.is_none());
        assert!(cfg.setup.store_url.starts_with("https://"));
    }

    #[test]
    fn load_parses_partial_yaml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("zkpipe.yaml");
        std::fs::write(
            &path,
            "workspace_root: /srv/zkpipe\nlimits:\n  max_concurrent_tools: 2\n",
        )
        .unwrap();
        let cfg = PipelineConfig::load(&path).unwrap();
        assert_eq!(cfg.workspace().root, PathBuf::from("/srv/zkpipe"));
        assert_eq!(cfg.limits.max_concurrent_tools, 2);
        // Unspecified sections fall back to defaults.
        assert_eq!(cfg.toolchain.snarkjs_bin, PathBuf::from("snarkjs"));
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("zkpipe.yaml");
        std::fs::write(&path, "workspac_root: /srv/zkpipe\n").unwrap();
        assert!(PipelineConfig::load(&path).is_err());
    }

    #[test]
    fn missing_config_file_reports_path() {
        let err = PipelineConfig::load(Path::new("/nonexistent/zkpipe.yaml")).unwrap_err();
        assert!(format!("{err}").contains("/nonexistent/zkpipe.yaml"));
    }
}
