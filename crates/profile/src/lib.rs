//! Printer profile definitions and validation for OpenLabel.
//!
//! A profile describes the device a label is headed for. Its `dpi` is the
//! target resolution used when scaling a command stream.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest printhead resolution accepted in a profile.
pub const MIN_DPI: u32 = 100;
/// Highest printhead resolution accepted in a profile.
pub const MAX_DPI: u32 = 600;

/// Errors that can occur when loading or validating a printer profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// JSON deserialization failed.
    #[error("invalid profile JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A required field value is out of its valid range.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// A human-readable explanation of why the field value is invalid.
        reason: String,
    },
}

/// A printer profile.
///
/// # Example
/// ```
/// let profile = openlabel_profile::Profile {
///     id: "warehouse-zt410".into(),
///     schema_version: "1.0.0".into(),
///     dpi: 300,
///     address: Some("10.0.0.42".into()),
///     page: Some(openlabel_profile::Page {
///         width_dots: Some(1248),
///         height_dots: None,
///     }),
/// };
/// assert_eq!(profile.dpi, 300);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Unique profile identifier (e.g., `"warehouse-zt410"`).
    pub id: String,
    /// Profile schema version for forward compatibility (e.g., `"1.0.0"`).
    pub schema_version: String,
    /// Print resolution in dots per inch (typically 152, 203, 300, or 600).
    pub dpi: u32,
    /// Default network address of the printer, in any form accepted by the
    /// print client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Page/label dimension constraints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<Page>,
}

/// Page/label dimension constraints for a printer profile.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Page {
    /// Maximum printhead width in dots.
    pub width_dots: Option<u32>,
    /// Maximum label length in dots.
    pub height_dots: Option<u32>,
}

/// Load and validate a [`Profile`] from a JSON string.
///
/// `id`, `schema_version` and `dpi` are required. After deserialization:
/// - `id` and `schema_version` must be non-empty
/// - `dpi` must be in range 100–600
/// - `address` must be non-empty (if present)
/// - `page.width_dots` and `page.height_dots` must be > 0 (if present)
pub fn load_profile_from_str(s: &str) -> Result<Profile, ProfileError> {
    let profile: Profile = serde_json::from_str(s)?;

    if profile.id.trim().is_empty() {
        return Err(invalid("id", "must not be empty"));
    }
    if profile.schema_version.trim().is_empty() {
        return Err(invalid("schema_version", "must not be empty"));
    }

    // -- DPI validation --
    if profile.dpi < MIN_DPI {
        return Err(invalid(
            "dpi",
            format!("{} is below minimum supported DPI ({MIN_DPI})", profile.dpi),
        ));
    }
    if profile.dpi > MAX_DPI {
        return Err(invalid(
            "dpi",
            format!("{} exceeds maximum supported DPI ({MAX_DPI})", profile.dpi),
        ));
    }

    if let Some(ref addr) = profile.address
        && addr.trim().is_empty()
    {
        return Err(invalid("address", "must not be empty"));
    }

    // -- Page dimension validation --
    if let Some(ref page) = profile.page {
        if page.width_dots == Some(0) {
            return Err(invalid("page.width_dots", "must be > 0"));
        }
        if page.height_dots == Some(0) {
            return Err(invalid("page.height_dots", "must be > 0"));
        }
    }

    Ok(profile)
}

fn invalid(field: &str, reason: impl Into<String>) -> ProfileError {
    ProfileError::InvalidField {
        field: field.into(),
        reason: reason.into(),
    }
}
