//! Configuration management for the page mutation engine

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

const DEFAULT_MEDIA_ROOT: &str = "./media";
const DEFAULT_MAX_CONCURRENT_OPS: usize = 4;
const DEFAULT_ARTIFACT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Root directory that logical document and page paths resolve against
    pub media_root: PathBuf,
    /// Upper bound on operations holding whole artifacts in memory at once
    pub max_concurrent_operations: usize,
    /// Timeout for a single blocking artifact edit
    pub artifact_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            media_root: PathBuf::from(DEFAULT_MEDIA_ROOT),
            max_concurrent_operations: DEFAULT_MAX_CONCURRENT_OPS,
            artifact_timeout_secs: DEFAULT_ARTIFACT_TIMEOUT_SECS,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenvy::dotenv().ok();

        let media_root = match env::var("PAGEWRIGHT_MEDIA_ROOT") {
            Ok(root) => PathBuf::from(root),
            Err(env::VarError::NotPresent) => PathBuf::from(DEFAULT_MEDIA_ROOT),
            Err(e) => return Err(e),
        };

        Ok(EngineConfig {
            media_root,
            max_concurrent_operations: env::var("PAGEWRIGHT_MAX_CONCURRENT_OPS")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(DEFAULT_MAX_CONCURRENT_OPS)
                .max(1),
            artifact_timeout_secs: env::var("PAGEWRIGHT_ARTIFACT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ARTIFACT_TIMEOUT_SECS),
        })
    }

    pub fn with_media_root(mut self, media_root: impl Into<PathBuf>) -> Self {
        self.media_root = media_root.into();
        self
    }

    pub fn with_max_concurrent_operations(mut self, max: usize) -> Self {
        self.max_concurrent_operations = max.max(1);
        self
    }

    pub fn with_artifact_timeout_secs(mut self, secs: u64) -> Self {
        self.artifact_timeout_secs = secs;
        self
    }
}
