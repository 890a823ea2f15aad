//! One-shot notices reporting the outcome of the last toggle.
//!
//! A toggle leaves its outcome in the one-shot flags of the [`StateStore`];
//! the next panel render turns them into at most one [`Notice`] and clears
//! them, so every outcome is reported exactly once.

use serde::Serialize;
use tracing::warn;

use crate::application::state::{self, flag_is, keys, StateStore};

/// What the admin is told after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Notice {
    SaveFailed,
    CompressionNotWorking,
    CompressionEnabled,
    CompressionDisabled,
    ExpiryHeadersSet,
    ExpiryHeadersRemoved,
    HotlinkBlockingEnabled,
    HotlinkBlockingDisabled,
}

impl Notice {
    pub fn is_error(self) -> bool {
        matches!(self, Notice::SaveFailed | Notice::CompressionNotWorking)
    }

    pub fn message(self) -> &'static str {
        match self {
            Notice::SaveFailed => {
                "Could not update the .htaccess file. Please check that the file is writable."
            }
            Notice::CompressionNotWorking => {
                "Gzip compression seems not to be working. \
                 Perhaps you need to activate mod_deflate or mod_gzip module."
            }
            Notice::CompressionEnabled => "Gzip compression is now enabled and working.",
            Notice::CompressionDisabled => "Gzip compression is now disabled.",
            Notice::ExpiryHeadersSet => "File expire headers successfully set.",
            Notice::ExpiryHeadersRemoved => "File expire headers removed.",
            Notice::HotlinkBlockingEnabled => "Hotlink blocking now up and running.",
            Notice::HotlinkBlockingDisabled => "Hotlink blocking disabled.",
        }
    }
}

/// Picks the notice for the last toggle without clearing anything.
///
/// Failures win over successes; success notices need the save flag to be ok.
pub fn pending_notice(store: &dyn StateStore) -> Option<Notice> {
    if flag_is(store, keys::HTACCESS_SAVE, state::STATUS_ERROR) {
        return Some(Notice::SaveFailed);
    }
    if flag_is(store, keys::GZIP_TEST_RESULT, state::STATUS_ERROR) {
        return Some(Notice::CompressionNotWorking);
    }
    if !flag_is(store, keys::HTACCESS_SAVE, state::STATUS_OK) {
        return None;
    }

    let on = |key| flag_is(store, key, state::ON);

    if flag_is(store, keys::GZIP_TEST_RESULT, state::STATUS_OK) {
        return Some(if on(keys::GZIP_COMPRESSION) {
            Notice::CompressionEnabled
        } else {
            Notice::CompressionDisabled
        });
    }
    if flag_is(store, keys::EXPIRE_HEADERS_CHANGED, state::STATUS_OK) {
        return Some(if on(keys::EXPIRE_HEADERS) {
            Notice::ExpiryHeadersSet
        } else {
            Notice::ExpiryHeadersRemoved
        });
    }
    if flag_is(store, keys::BLOCK_HOTLINKS_CHANGED, state::STATUS_OK) {
        return Some(if on(keys::BLOCK_HOTLINKS) {
            Notice::HotlinkBlockingEnabled
        } else {
            Notice::HotlinkBlockingDisabled
        });
    }
    None
}

/// Returns the pending notice and clears every one-shot flag.
pub fn take_notice(store: &dyn StateStore) -> Option<Notice> {
    let notice = pending_notice(store);
    for key in keys::ONE_SHOT {
        if let Err(e) = store.delete(key) {
            warn!(key, error = %e, "could not clear one-shot flag");
        }
    }
    notice
}
