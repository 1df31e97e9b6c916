//! ---
//! hearth_section: "04-configuration-orchestration"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Configuration loading for the access core."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
//! Configuration for the Hearth access-control core.
//!
//! Loaded once at startup and passed by reference into each component
//! constructor; nothing in this crate reads ambient global state after
//! load time.

#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use hearth_common::RegionCode;
use serde::{Deserialize, Serialize};

fn default_baseline_region() -> RegionCode {
    RegionCode::baseline()
}

fn default_emergency_window_minutes() -> i64 {
    120
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("target/audit/audit.log")
}

fn default_fail_policy() -> FailPolicy {
    FailPolicy::FailOpen
}

fn default_token_ttl_minutes() -> i64 {
    60
}

fn default_token_secret() -> String {
    // Dev-only secret; deployments override via configuration.
    "hearth-dev-secret".to_owned()
}

/// Behavior when an audit append fails while a business operation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailPolicy {
    /// The business operation proceeds; the gap is flagged for reconciliation.
    FailOpen,
    /// The business operation is rolled back when the audit write fails.
    FailClosed,
}

/// Break-glass configuration block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyConfig {
    /// Minutes an approved emergency grant remains active.
    #[serde(default = "default_emergency_window_minutes")]
    pub window_minutes: i64,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            window_minutes: default_emergency_window_minutes(),
        }
    }
}

/// Audit log configuration block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Location of the append-only audit log file.
    #[serde(default = "default_audit_path")]
    pub path: PathBuf,
    /// Propagation policy for append failures.
    #[serde(default = "default_fail_policy")]
    pub fail_policy: FailPolicy,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: default_audit_path(),
            fail_policy: default_fail_policy(),
        }
    }
}

/// Bearer-token signing configuration block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Shared secret used for HMAC token signatures.
    #[serde(default = "default_token_secret")]
    pub secret: String,
    /// Token lifetime in minutes.
    #[serde(default = "default_token_ttl_minutes")]
    pub ttl_minutes: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: default_token_secret(),
            ttl_minutes: default_token_ttl_minutes(),
        }
    }
}

/// Primary configuration object for the access core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Region assumed for resources whose region cannot be resolved.
    #[serde(default = "default_baseline_region")]
    pub baseline_region: RegionCode,
    /// Break-glass settings.
    #[serde(default)]
    pub emergency: EmergencyConfig,
    /// Audit log settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Token signing settings.
    #[serde(default)]
    pub token: TokenConfig,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            baseline_region: default_baseline_region(),
            emergency: EmergencyConfig::default(),
            audit: AuditConfig::default(),
            token: TokenConfig::default(),
        }
    }
}

/// Metadata describing where an [`AccessConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAccessConfig {
    /// The parsed configuration.
    pub config: AccessConfig,
    /// Path the configuration was read from.
    pub source: PathBuf,
}

impl AccessConfig {
    /// Environment variable overriding the configuration path.
    pub const ENV_CONFIG_PATH: &'static str = "HEARTH_ACCESS_CONFIG";

    /// Load configuration from disk, respecting the `HEARTH_ACCESS_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAccessConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAccessConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedAccessConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    /// Parse a configuration file from an explicit path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read configuration {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }
}
