//! # Snarkjs Subprocess Backend
//!
//! Drives a snarkjs-compatible CLI as a child process, one invocation per
//! backend operation. The tool's stdout and stderr are captured together
//! under a size bound and surfaced as raw lines; proof payloads on disk
//! are never parsed here.
//!
//! ## Exit Handling
//!
//! Exit codes are not authoritative for every operation: a derivation can
//! exit cleanly without writing its output. Operations that promise an
//! artifact check for it on disk after the process exits and report
//! `MissingOutput` when it is absent. Verification maps a clean "OK" run
//! to `true` and every other completed run to `false` — invalid proofs
//! and malformed public signals are not distinguished.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use zkpipe_core::{strip_ansi, ProvingSystem};

use crate::error::BackendError;
use crate::traits::ProvingBackend;

/// Upper bound on captured tool output. Output past the bound is read and
/// discarded so the child never blocks on a full pipe.
const CAPTURE_LIMIT: usize = 1024 * 1024;

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
        // Past the cap: keep reading so the child is never backpressured,
        // but drop the bytes.
    }
    Ok(String::from_utf8_lossy(&kept).into_owned())
}

/// Proving backend that shells out to a snarkjs-compatible CLI.
#[derive(Debug, Clone)]
pub struct SnarkjsBackend {
    bin: PathBuf,
}

impl SnarkjsBackend {
    /// Create a backend invoking the given binary.
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    /// The configured tool binary.
    pub fn bin(&self) -> &Path {
        &self.bin
    }

    /// Run one tool invocation and capture its combined output.
    async fn run(
        &self,
        operation: &str,
        args: Vec<OsString>,
    ) -> Result<(std::process::ExitStatus, Vec<String>), BackendError> {
        tracing::debug!(tool = %self.bin.display(), operation, "invoking proving tool");
        let mut child = Command::new(&self.bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| BackendError::Spawn {
                tool: self.bin.display().to_string(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (out, err) = tokio::join!(
            drain_capped(stdout, CAPTURE_LIMIT),
            drain_capped(stderr, CAPTURE_LIMIT)
        );
        let status = child.wait().await?;

        let mut lines: Vec<String> = Vec::new();
        for stream in [out?, err?] {
            lines.extend(stream.lines().map(strip_ansi));
        }
        tracing::debug!(operation, ?status, captured = lines.len(), "proving tool exited");
        Ok((status, lines))
    }

    /// Run an operation that must succeed and must produce `output`.
    async fn run_expecting(
        &self,
        operation: &str,
        args: Vec<OsString>,
        output: &Path,
    ) -> Result<(), BackendError> {
        let (status, lines) = self.run(operation, args).await?;
        if !status.success() {
            return Err(BackendError::Tool {
                operation: operation.to_string(),
                status: status.code(),
                lines,
            });
        }
        if !output.exists() {
            return Err(BackendError::MissingOutput {
                operation: operation.to_string(),
                path: output.to_path_buf(),
            });
        }
        Ok(())
    }
}

fn os_args(parts: &[&std::ffi::OsStr]) -> Vec<OsString> {
    parts.iter().map(|p| p.to_os_string()).collect()
}

#[async_trait]
impl ProvingBackend for SnarkjsBackend {
    async fn compute_witness(
        &self,
        wasm: &Path,
        input_json: &Path,
        wtns_out: &Path,
    ) -> Result<(), BackendError> {
        let args = os_args(&[
            "wtns".as_ref(),
            "calculate".as_ref(),
            wasm.as_os_str(),
            input_json.as_os_str(),
            wtns_out.as_os_str(),
        ]);
        self.run_expecting("wtns calculate", args, wtns_out).await
    }

    async fn setup_key(
        &self,
        system: ProvingSystem,
        r1cs: &Path,
        ptau: &Path,
        zkey_out: &Path,
    ) -> Result<(), BackendError> {
        let operation = format!("{system} setup");
        let args = os_args(&[
            system.as_str().as_ref(),
            "setup".as_ref(),
            r1cs.as_os_str(),
            ptau.as_os_str(),
            zkey_out.as_os_str(),
        ]);
        self.run_expecting(&operation, args, zkey_out).await
    }

    async fn contribute(
        &self,
        zkey_in: &Path,
        zkey_out: &Path,
        entropy: &str,
    ) -> Result<(), BackendError> {
        let entropy_flag = OsString::from(format!("-e={entropy}"));
        let mut args = os_args(&[
            "zkey".as_ref(),
            "contribute".as_ref(),
            zkey_in.as_os_str(),
            zkey_out.as_os_str(),
        ]);
        args.push(entropy_flag);
        self.run_expecting("zkey contribute", args, zkey_out).await
    }

    async fn export_verification_key(
        &self,
        zkey: &Path,
        vkey_out: &Path,
    ) -> Result<(), BackendError> {
        let args = os_args(&[
            "zkey".as_ref(),
            "export".as_ref(),
            "verificationkey".as_ref(),
            zkey.as_os_str(),
            vkey_out.as_os_str(),
        ]);
        self.run_expecting("zkey export verificationkey", args, vkey_out)
            .await
    }

    async fn prove(
        &self,
        system: ProvingSystem,
        zkey: &Path,
        wtns: &Path,
        proof_out: &Path,
        public_out: &Path,
    ) -> Result<(), BackendError> {
        let operation = format!("{system} prove");
        let args = os_args(&[
            system.as_str().as_ref(),
            "prove".as_ref(),
            zkey.as_os_str(),
            wtns.as_os_str(),
            proof_out.as_os_str(),
            public_out.as_os_str(),
        ]);
        self.run_expecting(&operation, args, proof_out).await?;
        if !public_out.exists() {
            return Err(BackendError::MissingOutput {
                operation,
                path: public_out.to_path_buf(),
            });
        }
        Ok(())
    }

    async fn full_prove(
        &self,
        system: ProvingSystem,
        input_json: &Path,
        wasm: &Path,
        zkey: &Path,
        proof_out: &Path,
        public_out: &Path,
    ) -> Result<(), BackendError> {
        let operation = format!("{system} fullprove");
        let args = os_args(&[
            system.as_str().as_ref(),
            "fullprove".as_ref(),
            input_json.as_os_str(),
            wasm.as_os_str(),
            zkey.as_os_str(),
            proof_out.as_os_str(),
            public_out.as_os_str(),
        ]);
        self.run_expecting(&operation, args, proof_out).await?;
        if !public_out.exists() {
            return Err(BackendError::MissingOutput {
                operation,
                path: public_out.to_path_buf(),
            });
        }
        Ok(())
    }

    async fn verify(
        &self,
        system: ProvingSystem,
        vkey: &Path,
        public_json: &Path,
        proof_json: &Path,
    ) -> Result<bool, BackendError> {
        let operation = format!("{system} verify");
        let args = os_args(&[
            system.as_str().as_ref(),
            "verify".as_ref(),
            vkey.as_os_str(),
            public_json.as_os_str(),
            proof_json.as_os_str(),
        ]);
        let (status, lines) = self.run(&operation, args).await?;
        let accepted = status.success() && lines.iter().any(|l| l.contains("OK"));
        if !accepted {
            tracing::warn!(operation, ?status, "verification rejected");
        }
        Ok(accepted)
    }

    async fn export_verifier_contract(
        &self,
        zkey: &Path,
        contract_out: &Path,
    ) -> Result<(), BackendError> {
        let args = os_args(&[
            "zkey".as_ref(),
            "export".as_ref(),
            "solidityverifier".as_ref(),
            zkey.as_os_str(),
            contract_out.as_os_str(),
        ]);
        self.run_expecting("zkey export solidityverifier", args, contract_out)
            .await
    }
}
