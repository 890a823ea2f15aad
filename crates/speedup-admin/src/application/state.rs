//! StateStore port: persisted flags shared with the presentation layer.
//!
//! The store is a flat string key-value map.  Two kinds of keys live in it:
//!
//! - **State flags** (`speedup_gzip_compression`, ...) remember the last
//!   known on/off value of each feature so the panel can render without
//!   re-reading `.htaccess`.
//! - **One-shot flags** (`speedup_htaccess_save`, ...) carry the outcome of
//!   the last toggle to the next panel render, which deletes them after
//!   reading (see [`crate::application::notices`]).
//!
//! The key names are the ones earlier installations already persisted, so an
//! existing settings store keeps working.

use std::path::PathBuf;

use speedup_core::Feature;
use thiserror::Error;

/// Flag value for an enabled feature.
pub const ON: &str = "on";
/// Flag value for a disabled feature.
pub const OFF: &str = "off";
/// One-shot status value for a successful operation.
pub const STATUS_OK: &str = "ok";
/// One-shot status value for a failed operation.
pub const STATUS_ERROR: &str = "error";

/// Store keys.
pub mod keys {
    pub const GZIP_COMPRESSION: &str = "speedup_gzip_compression";
    pub const EXPIRE_HEADERS: &str = "speedup_expire_headers";
    pub const BLOCK_HOTLINKS: &str = "speedup_block_hotlinks";

    pub const HTACCESS_SAVE: &str = "speedup_htaccess_save";
    pub const GZIP_TEST_RESULT: &str = "speedup_gzip_test_result";
    pub const EXPIRE_HEADERS_CHANGED: &str = "speedup_expire_headers_changed";
    pub const BLOCK_HOTLINKS_CHANGED: &str = "speedup_block_hotlinks_changed";

    pub const PING_STATUS: &str = "default_ping_status";
    pub const DISABLE_EMOJIS: &str = "speedup_disable_emojis";
    pub const IMAGE_LAZY_LOADING: &str = "speedup_image_lazy_loading";

    /// Every one-shot key, cleared together after a panel render.
    pub const ONE_SHOT: [&str; 4] = [
        HTACCESS_SAVE,
        GZIP_TEST_RESULT,
        EXPIRE_HEADERS_CHANGED,
        BLOCK_HOTLINKS_CHANGED,
    ];
}

/// Key holding the persisted on/off flag of `feature`.
pub fn enabled_key(feature: Feature) -> &'static str {
    match feature {
        Feature::Compression => keys::GZIP_COMPRESSION,
        Feature::ExpiryHeaders => keys::EXPIRE_HEADERS,
        Feature::HotlinkPrevention => keys::BLOCK_HOTLINKS,
    }
}

/// Key of the one-shot "changed" flag raised after a successful toggle.
///
/// Compression reports through [`keys::GZIP_TEST_RESULT`] instead.
pub fn changed_key(feature: Feature) -> Option<&'static str> {
    match feature {
        Feature::Compression => None,
        Feature::ExpiryHeaders => Some(keys::EXPIRE_HEADERS_CHANGED),
        Feature::HotlinkPrevention => Some(keys::BLOCK_HOTLINKS_CHANGED),
    }
}

/// Error type for state store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing state at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted state could not be decoded or encoded.
    #[error("state store is corrupt: {0}")]
    Corrupt(String),
}

/// Abstract key-value settings persistence.
///
/// Methods take `&self`; implementations use interior mutability so a single
/// store can be shared behind an `Arc` between the controller and the panel.
#[cfg_attr(test, mockall::automock)]
pub trait StateStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`.  Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// `true` when `key` holds exactly `value`.
pub fn flag_is(store: &dyn StateStore, key: &str, value: &str) -> bool {
    store.get(key).as_deref() == Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_feature_has_its_own_enabled_key() {
        let keys: Vec<&str> = Feature::ALL.iter().map(|f| enabled_key(*f)).collect();
        assert_eq!(keys.len(), 3);
        assert!(keys[0] != keys[1] && keys[1] != keys[2] && keys[0] != keys[2]);
    }

    #[test]
    fn test_compression_has_no_changed_key() {
        assert_eq!(changed_key(Feature::Compression), None);
        assert_eq!(changed_key(Feature::ExpiryHeaders), Some(keys::EXPIRE_HEADERS_CHANGED));
        assert_eq!(changed_key(Feature::HotlinkPrevention), Some(keys::BLOCK_HOTLINKS_CHANGED));
    }

    #[test]
    fn test_flag_is_compares_exact_value() {
        // Arrange
        let mut store = MockStateStore::new();
        store
            .expect_get()
            .returning(|key| (key == keys::HTACCESS_SAVE).then(|| STATUS_OK.to_string()));

        // Act / Assert
        assert!(flag_is(&store, keys::HTACCESS_SAVE, STATUS_OK));
        assert!(!flag_is(&store, keys::HTACCESS_SAVE, STATUS_ERROR));
        assert!(!flag_is(&store, keys::GZIP_TEST_RESULT, STATUS_OK));
    }
}
