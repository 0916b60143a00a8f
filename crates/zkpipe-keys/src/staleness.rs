//! # Staleness Predicate
//!
//! Decides whether a cached derived artifact must be regenerated because
//! its dependency changed. The default compares modification times; the
//! trait exists so content-hash invalidation can replace it where mtimes
//! are unreliable (shared filesystems, distributed workers).

use std::path::Path;

/// Decides whether `artifact` is stale relative to `dependency`.
pub trait StalenessPredicate: Send + Sync {
    /// Returns `true` when the artifact must be regenerated.
    ///
    /// Callers only ask about artifacts that exist; a missing dependency
    /// is an error.
    fn is_stale(&self, artifact: &Path, dependency: &Path) -> std::io::Result<bool>;
}

/// Default predicate: stale when the dependency's modification time is
/// newer than the artifact's.
#[derive(Debug, Clone, Copy, Default)]
pub struct MtimeStaleness;

impl StalenessPredicate for MtimeStaleness {
    fn is_stale(&self, artifact: &Path, dependency: &Path) -> std::io::Result<bool> {
        let artifact_mtime = std::fs::metadata(artifact)?.modified()?;
        let dependency_mtime = std::fs::metadata(dependency)?.modified()?;
        Ok(dependency_mtime > artifact_mtime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn newer_dependency_is_stale() {
        let tmp = TempDir::new().unwrap();
        let artifact = tmp.path().join("key.zkey");
        let dependency = tmp.path().join("circuit.r1cs");
        std::fs::write(&artifact, b"key").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        std::fs::write(&dependency, b"r1cs").unwrap();

        assert!(MtimeStaleness.is_stale(&artifact, &dependency).unwrap());
        assert!(!MtimeStaleness.is_stale(&dependency, &artifact).unwrap());
    }

    #[test]
    fn missing_paths_error() {
        let tmp = TempDir::new().unwrap();
        let present = tmp.path().join("present");
        std::fs::write(&present, b"x").unwrap();
        assert!(MtimeStaleness
            .is_stale(&present, &tmp.path().join("absent"))
            .is_err());
    }
}
