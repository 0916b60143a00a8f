//! # Universal Setup Parameter Store
//!
//! Universal setup files are circuit-independent, size-graded, and
//! append-only upstream: once published they never change, so a local
//! copy is valid forever. Selection policy is "first tier found on disk",
//! walking the tier table in ascending capacity order. The selection is
//! not validated against the circuit's actual constraint count — callers
//! may log an advisory warning via [`SetupTier::capacity`], but
//! enforcement is deliberately absent.
//!
//! When no tier is present locally, the smallest tier is fetched once
//! from the configured store. A failed fetch is fatal and surfaces the
//! manual remediation; there is no silent fallback.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use zkpipe_core::config::SetupConfig;

use crate::error::KeyError;

/// Log download progress every this many bytes.
const PROGRESS_INTERVAL: u64 = 8 * 1024 * 1024;

/// One capacity tier of the public parameter ceremony.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupTier {
    /// Two-log of the supported constraint capacity.
    pub power: u32,
    /// File name in the parameter store and on disk.
    pub file_name: &'static str,
}

impl SetupTier {
    /// Maximum constraint count this tier can cover.
    pub fn capacity(&self) -> u64 {
        1u64 << self.power
    }
}

/// Supported tiers in ascending capacity order.
pub const SETUP_TIERS: [SetupTier; 4] = [
    SetupTier {
        power: 14,
        file_name: "powersOfTau28_hez_final_14.ptau",
    },
    SetupTier {
        power: 16,
        file_name: "powersOfTau28_hez_final_16.ptau",
    },
    SetupTier {
        power: 18,
        file_name: "powersOfTau28_hez_final_18.ptau",
    },
    SetupTier {
        power: 20,
        file_name: "powersOfTau28_hez_final_20.ptau",
    },
];

/// Local cache of universal setup files, backed by the remote store.
#[derive(Debug, Clone)]
pub struct SetupStore {
    dir: PathBuf,
    store_url: String,
}

impl SetupStore {
    /// Create a store over the given directory and remote configuration.
    pub fn new(dir: impl Into<PathBuf>, config: &SetupConfig) -> Self {
        Self {
            dir: dir.into(),
            store_url: config.store_url.trim_end_matches('/').to_string(),
        }
    }

    /// The directory setup files live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn tier_path(&self, tier: &SetupTier) -> PathBuf {
        self.dir.join(tier.file_name)
    }

    fn tier_url(&self, tier: &SetupTier) -> String {
        format!("{}/{}", self.store_url, tier.file_name)
    }

    /// First tier present on disk, in ascending capacity order.
    pub fn find_local(&self) -> Option<(SetupTier, PathBuf)> {
        SETUP_TIERS.iter().find_map(|tier| {
            let path = self.tier_path(tier);
            path.exists().then(|| (*tier, path))
        })
    }

    /// Return a usable setup file, fetching the smallest tier if none is
    /// present locally.
    pub async fn acquire(&self) -> Result<(SetupTier, PathBuf), KeyError> {
        if let Some(found) = self.find_local() {
            tracing::debug!(file = found.0.file_name, "using local universal setup");
            return Ok(found);
        }
        let tier = SETUP_TIERS[0];
        let path = self.fetch(&tier).await?;
        Ok((tier, path))
    }

    /// Download one tier from the remote store.
    async fn fetch(&self, tier: &SetupTier) -> Result<PathBuf, KeyError> {
        let url = self.tier_url(tier);
        let dest = self.tier_path(tier);
        let prerequisite = |reason: String| KeyError::SetupPrerequisite {
            reason,
            url: url.clone(),
            dest: dest.clone(),
        };

        tokio::fs::create_dir_all(&self.dir).await?;
        tracing::info!(%url, dest = %dest.display(), "fetching universal setup parameters");

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| prerequisite(format!("http client construction failed: {e}")))?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| prerequisite(format!("request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(prerequisite(format!(
                "store returned {}",
                response.status()
            )));
        }

        let total = response.content_length();
        let partial = self.dir.join(format!("{}.partial", tier.file_name));
        let mut file = tokio::fs::File::create(&partial).await?;
        let mut response = response;
        let mut downloaded: u64 = 0;
        let mut last_logged: u64 = 0;
        loop {
            let chunk = response
                .chunk()
                .await
                .map_err(|e| prerequisite(format!("download interrupted: {e}")))?;
            let Some(chunk) = chunk else { break };
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            if downloaded - last_logged >= PROGRESS_INTERVAL {
                tracing::info!(
                    file = tier.file_name,
                    downloaded_mib = downloaded / (1024 * 1024),
                    total_mib = total.map(|t| t / (1024 * 1024)),
                    "setup download progress"
                );
                last_logged = downloaded;
            }
        }
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&partial, &dest).await?;
        tracing::info!(
            file = tier.file_name,
            bytes = downloaded,
            "universal setup fetched"
        );
        Ok(dest)
    }
}
