//! File-backed features and their two-state machine.
//!
//! Each [`Feature`] owns exactly one section in the managed `.htaccess` file.
//! The section names are part of the on-disk format: files already managed by
//! an earlier installation carry these exact names, so they must never change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Section name for the compression block.
pub const SECTION_COMPRESSION: &str = "Speed Up WordPress Gzip";
/// Section name for the cache-expiry block.
pub const SECTION_EXPIRY_HEADERS: &str = "Speed Up WordPress Expire";
/// Section name for the hotlink-prevention block.
pub const SECTION_HOTLINK_PREVENTION: &str = "Speed Up WordPress Hotlinks";

/// A web-server feature backed by one marker-delimited section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    /// gzip/deflate output compression.  The only feature whose effect is
    /// verified against the live site after enabling.
    Compression,
    /// Per-MIME-type cache lifetimes.
    ExpiryHeaders,
    /// Referrer-based blocking of image requests from foreign sites.
    HotlinkPrevention,
}

impl Feature {
    /// Every file-backed feature, in panel order.
    pub const ALL: [Feature; 3] = [
        Feature::Compression,
        Feature::ExpiryHeaders,
        Feature::HotlinkPrevention,
    ];

    /// Name of the section this feature owns in the managed file.
    pub fn section_name(self) -> &'static str {
        match self {
            Feature::Compression => SECTION_COMPRESSION,
            Feature::ExpiryHeaders => SECTION_EXPIRY_HEADERS,
            Feature::HotlinkPrevention => SECTION_HOTLINK_PREVENTION,
        }
    }

    /// Short identifier used on the command line and in JSON output.
    pub fn slug(self) -> &'static str {
        match self {
            Feature::Compression => "gzip",
            Feature::ExpiryHeaders => "expire",
            Feature::HotlinkPrevention => "hotlinks",
        }
    }

    /// Whether enabling this feature must be confirmed against the live site.
    pub fn requires_verification(self) -> bool {
        matches!(self, Feature::Compression)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Feature::Compression => "gzip compression",
            Feature::ExpiryHeaders => "expire headers",
            Feature::HotlinkPrevention => "hotlink blocking",
        };
        f.write_str(label)
    }
}

/// Error returned when parsing an unknown feature slug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature: {0}")]
pub struct UnknownFeature(pub String);

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.slug() == s)
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

/// State of a single two-state toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureState {
    Enabled,
    Disabled,
}

impl FeatureState {
    /// Maps a presence test result onto a state.
    pub fn from_present(present: bool) -> Self {
        if present {
            FeatureState::Enabled
        } else {
            FeatureState::Disabled
        }
    }

    /// The state a toggle moves to from this one.
    pub fn flipped(self) -> Self {
        match self {
            FeatureState::Enabled => FeatureState::Disabled,
            FeatureState::Disabled => FeatureState::Enabled,
        }
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, FeatureState::Enabled)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
