//! Engine configuration, stored as plain JSON next to the caller's data.
//!
//! Nothing here is secret: it selects the derivation strategy, the
//! iteration count, breadcrumb shape and the worker queue size.

use std::fs;
use std::path::Path;

use pash_core::breadcrumbs::MAX_DEPTH;
use pash_core::{DerivationOptions, DerivationStrategy, KdfParams, DEFAULT_ITERATIONS};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ── Engine configuration ───────────────────────────────────────────

/// Tunable engine settings.
///
/// Persisted to `{data_dir}/pash-engine.json`. Missing fields take their
/// defaults, so files written by older versions keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Block derivation chain: `"combined"` or `"chained"`.
    #[serde(default)]
    pub strategy: DerivationStrategy,

    /// HMAC rounds per block (at least 1).
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Characters between two breadcrumbs.
    #[serde(default = "default_breadcrumb_step")]
    pub breadcrumb_step: usize,

    /// Bits per breadcrumb (1 to 8).
    #[serde(default = "default_breadcrumb_depth")]
    pub breadcrumb_depth: u8,

    /// Requests the worker queue holds before `submit` blocks.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: DerivationStrategy::default(),
            iterations: default_iterations(),
            breadcrumb_step: default_breadcrumb_step(),
            breadcrumb_depth: default_breadcrumb_depth(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

const fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}
const fn default_breadcrumb_step() -> usize {
    2
}
const fn default_breadcrumb_depth() -> u8 {
    1
}
const fn default_queue_capacity() -> usize {
    32
}

impl EngineConfig {
    /// Derivation options for new contexts.
    #[must_use]
    pub const fn options(&self) -> DerivationOptions {
        DerivationOptions::new(
            self.strategy,
            KdfParams {
                iterations: self.iterations,
            },
        )
    }

    /// # Errors
    ///
    /// Returns `EngineError::Config` naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.iterations == 0 {
            return Err(EngineError::Config("iterations must be at least 1".into()));
        }
        if self.breadcrumb_step == 0 {
            return Err(EngineError::Config("breadcrumbStep must be at least 1".into()));
        }
        if self.breadcrumb_depth == 0 || self.breadcrumb_depth > MAX_DEPTH {
            return Err(EngineError::Config(format!(
                "breadcrumbDepth {} outside 1..={MAX_DEPTH}",
                self.breadcrumb_depth
            )));
        }
        if self.queue_capacity == 0 {
            return Err(EngineError::Config("queueCapacity must be at least 1".into()));
        }
        Ok(())
    }
}

// ── File I/O ───────────────────────────────────────────────────────

const CONFIG_FILE: &str = "pash-engine.json";

impl EngineConfig {
    /// Load from `{data_dir}/pash-engine.json`.
    ///
    /// Returns [`Default::default()`] when the file is missing, is not
    /// valid JSON, or holds out-of-range values.
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        let Ok(contents) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match serde_json::from_str::<Self>(&contents) {
            Ok(config) if config.validate().is_ok() => config,
            Ok(_) | Err(_) => {
                tracing::warn!(path = %path.display(), "Ignoring unusable engine config");
                Self::default()
            }
        }
    }

    /// Persist to `{data_dir}/pash-engine.json`.
    ///
    /// Written to `.tmp` first and renamed into place.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` for out-of-range values and
    /// `EngineError::Io` if the write or rename fails.
    pub fn save(&self, data_dir: &Path) -> Result<(), EngineError> {
        self.validate()?;
        let path = data_dir.join(CONFIG_FILE);
        let tmp = data_dir.join(".pash-engine.json.tmp");

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(&tmp, &json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────
