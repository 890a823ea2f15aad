//! ToggleSettingUseCase: flips the settings-only features.
//!
//! These features live entirely in the [`StateStore`]; the host reads the
//! flags at request time (to close pings, drop the emoji scripts, or rewrite
//! post content through [`speedup_core::content::lazy_load_images`]).  No file
//! is edited, so the only way a toggle can fail is a store write error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use speedup_core::FeatureState;
use tracing::info;

use crate::application::state::{keys, StateStore, StoreError, OFF, ON};

/// Ping status value that denies pingbacks and trackbacks.
pub const PING_CLOSED: &str = "closed";
/// Ping status value that accepts pingbacks and trackbacks.
pub const PING_OPEN: &str = "open";

/// A feature backed by a single store flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Setting {
    /// Deny pingbacks and trackbacks.
    Pingbacks,
    /// Stop loading the emoji detection script and styles.
    Emojis,
    /// Defer image loading in post content.
    LazyLoad,
}

impl Setting {
    pub const ALL: [Setting; 3] = [Setting::Pingbacks, Setting::Emojis, Setting::LazyLoad];

    /// Store key holding this setting.
    pub fn key(self) -> &'static str {
        match self {
            Setting::Pingbacks => keys::PING_STATUS,
            Setting::Emojis => keys::DISABLE_EMOJIS,
            Setting::LazyLoad => keys::IMAGE_LAZY_LOADING,
        }
    }

    /// Stored value meaning "enabled".
    pub fn on_value(self) -> &'static str {
        match self {
            Setting::Pingbacks => PING_CLOSED,
            Setting::Emojis | Setting::LazyLoad => ON,
        }
    }

    /// Stored value meaning "disabled".
    pub fn off_value(self) -> &'static str {
        match self {
            Setting::Pingbacks => PING_OPEN,
            Setting::Emojis | Setting::LazyLoad => OFF,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Setting::Pingbacks => "pingbacks",
            Setting::Emojis => "emojis",
            Setting::LazyLoad => "image-lazyload",
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Setting::Pingbacks => "Deny Pingbacks, Trackbacks",
            Setting::Emojis => "Disable Emojis",
            Setting::LazyLoad => "Image Lazy Loading",
        };
        f.write_str(label)
    }
}

/// Returned when a setting name does not match any [`Setting`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown setting: {0}")]
pub struct UnknownSetting(pub String);

impl FromStr for Setting {
    type Err = UnknownSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pingbacks" => Ok(Setting::Pingbacks),
            "emojis" => Ok(Setting::Emojis),
            "image-lazyload" | "lazyload" | "lazy-load" => Ok(Setting::LazyLoad),
            other => Err(UnknownSetting(other.to_string())),
        }
    }
}

/// Current state of `setting`; anything but the "on" value counts as disabled.
pub fn setting_state(store: &dyn StateStore, setting: Setting) -> FeatureState {
    let enabled = store.get(setting.key()).as_deref() == Some(setting.on_value());
    FeatureState::from_present(enabled)
}

/// Flips `setting` and returns its new state.
///
/// # Errors
///
/// Returns the [`StoreError`] of the failed write; the stored value is then
/// unchanged.
pub fn toggle_setting(
    store: &dyn StateStore,
    setting: Setting,
) -> Result<FeatureState, StoreError> {
    let current = setting_state(store, setting);
    let next = current.flipped();
    let value = if next.is_enabled() {
        setting.on_value()
    } else {
        setting.off_value()
    };

    store.set(setting.key(), value)?;
    info!(setting = setting.slug(), from = ?current, to = ?next, "setting toggled");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::state::MockStateStore;
    use crate::infrastructure::storage::memory::MemoryStateStore;

    #[test]
    fn test_pingbacks_enabled_means_closed() {
        // Arrange
        let store = MemoryStateStore::new();
        store.set(keys::PING_STATUS, PING_OPEN).unwrap();

        // Act
        let state = toggle_setting(&store, Setting::Pingbacks).unwrap();

        // Assert
        assert_eq!(state, FeatureState::Enabled);
        assert_eq!(store.get(keys::PING_STATUS).as_deref(), Some(PING_CLOSED));
    }

    #[test]
    fn test_pingbacks_toggle_back_to_open() {
        let store = MemoryStateStore::new();
        store.set(keys::PING_STATUS, PING_CLOSED).unwrap();

        let state = toggle_setting(&store, Setting::Pingbacks).unwrap();

        assert_eq!(state, FeatureState::Disabled);
        assert_eq!(store.get(keys::PING_STATUS).as_deref(), Some(PING_OPEN));
    }

    #[test]
    fn test_absent_flag_counts_as_disabled() {
        let store = MemoryStateStore::new();
        for setting in Setting::ALL {
            assert_eq!(setting_state(&store, setting), FeatureState::Disabled);
        }
    }

    #[test]
    fn test_emojis_and_lazy_load_use_on_off() {
        let store = MemoryStateStore::new();

        toggle_setting(&store, Setting::Emojis).unwrap();
        toggle_setting(&store, Setting::LazyLoad).unwrap();
        toggle_setting(&store, Setting::LazyLoad).unwrap();

        assert_eq!(store.get(keys::DISABLE_EMOJIS).as_deref(), Some(ON));
        assert_eq!(store.get(keys::IMAGE_LAZY_LOADING).as_deref(), Some(OFF));
    }

    #[test]
    fn test_store_failure_is_returned() {
        // Arrange
        let mut store = MockStateStore::new();
        store.expect_get().returning(|_| None);
        store
            .expect_set()
            .returning(|_, _| Err(StoreError::Corrupt("read-only".to_string())));

        // Act
        let result = toggle_setting(&store, Setting::Emojis);

        // Assert
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_setting_parses_from_slug() {
        for setting in Setting::ALL {
            assert_eq!(setting.slug().parse::<Setting>(), Ok(setting));
        }
        assert!("minify".parse::<Setting>().is_err());
    }
}
