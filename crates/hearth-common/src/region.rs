//! ---
//! hearth_section: "01-core-functionality"
//! hearth_subsection: "module"
//! hearth_type: "source"
//! hearth_scope: "code"
//! hearth_description: "Shared primitives for the Hearth access core."
//! hearth_version: "v0.0.0-prealpha"
//! hearth_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Region identifier attached to actors, resources, and residency policies.
///
/// Codes are normalized to uppercase on construction so that `us` and `US`
/// compare equal everywhere downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RegionCode(String);

impl<'de> Deserialize<'de> for RegionCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Normalize on the way in so configuration files may use any case.
        let raw = String::deserialize(deserializer)?;
        Ok(RegionCode::new(raw))
    }
}

impl RegionCode {
    /// Fallback region applied when a resource's region cannot be resolved.
    pub const BASELINE: &'static str = "US";

    /// Construct a region code, normalizing to uppercase.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// The baseline region used when resource lookup yields nothing.
    pub fn baseline() -> Self {
        Self::new(Self::BASELINE)
    }

    /// Borrow the normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
