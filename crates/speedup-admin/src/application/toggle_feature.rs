//! ToggleFeatureUseCase: flips one file-backed feature on or off.
//!
//! # Toggle flow
//!
//! ```text
//! section_present? ──► Enabled ──► upsert(name, [])            ──► record
//!        │
//!        └──────────► Disabled ─► upsert(name, catalog lines)  ──► verify? ──► record
//!                                                                   │
//!                                                          not working: upsert(name, [])
//! ```
//!
//! Only compression is verified, and only right after it was enabled: the
//! file alone cannot prove that the server actually has `mod_deflate` or
//! `mod_gzip` loaded.  A failed verification removes the block again, so a
//! site never stays configured for compression it does not serve.
//!
//! The controller is cheap to build and is constructed once per request with
//! its collaborators injected; it keeps no state between toggles.

use std::path::PathBuf;
use std::sync::Arc;

use speedup_core::{BlockCatalog, Feature, FeatureState, MarkerError};
use thiserror::Error;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::application::state::{self, keys, StateStore};

// ── Ports ─────────────────────────────────────────────────────────────────────

/// Outcome of a successful section write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was rewritten.
    Written,
    /// The section was already in the requested state; the file was not touched.
    Unchanged,
}

/// Error type for section store operations.
#[derive(Debug, Error)]
pub enum EditError {
    /// The managed file exists but could not be read.
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The managed file (or a temporary file next to it) could not be written.
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file's markers are inconsistent for the requested section.
    #[error(transparent)]
    Markers(#[from] MarkerError),
}

/// Access to the marker-delimited sections of the managed config file.
#[cfg_attr(test, mockall::automock)]
pub trait SectionStore: Send + Sync {
    /// Whether section `name` counts as present under the store's policy.
    fn section_present(&self, name: &str) -> Result<bool, EditError>;

    /// Makes section `name` hold exactly `lines`; empty `lines` removes it.
    fn upsert_section(&self, name: &str, lines: &[String]) -> Result<WriteOutcome, EditError>;
}

/// Live check that compression is actually served.
#[cfg_attr(test, mockall::automock)]
pub trait VerificationProbe: Send + Sync {
    /// `true` iff the site answered with a gzip `Content-Encoding`.
    /// Transport failures are reported as `false`, never as errors.
    fn compression_active(&self) -> bool;
}

// ── Results ───────────────────────────────────────────────────────────────────

/// Record of one successful toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub feature: Feature,
    pub previous: FeatureState,
    pub current: FeatureState,
    pub write: WriteOutcome,
    /// `Some(true)` when compression was enabled and verified; `None` when no
    /// probe ran.
    pub verified: Option<bool>,
}

impl ToggleOutcome {
    /// Whether the managed file actually changed.
    pub fn changed(&self) -> bool {
        self.write == WriteOutcome::Written
    }
}

/// Why a toggle did not take effect.
#[derive(Debug, Error)]
pub enum ToggleError {
    /// Reading or writing the managed file failed; nothing was flipped.
    #[error("could not update the server config for {feature}: {source}")]
    Edit {
        feature: Feature,
        #[source]
        source: EditError,
    },

    /// Compression was written but the live site does not serve gzip; the
    /// block has been removed again.
    #[error("{feature} does not seem to be working; the change was rolled back")]
    VerificationFailed {
        feature: Feature,
        /// Set when removing the block again failed as well.
        #[source]
        rollback: Option<EditError>,
    },
}

/// Coarse error classification for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileRead,
    FileWrite,
    MalformedSection,
    VerificationFailed,
}

impl ToggleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToggleError::Edit { source, .. } => match source {
                EditError::Read { .. } => ErrorKind::FileRead,
                EditError::Write { .. } => ErrorKind::FileWrite,
                EditError::Markers(_) => ErrorKind::MalformedSection,
            },
            ToggleError::VerificationFailed { .. } => ErrorKind::VerificationFailed,
        }
    }

    pub fn feature(&self) -> Feature {
        match self {
            ToggleError::Edit { feature, .. } | ToggleError::VerificationFailed { feature, .. } => {
                *feature
            }
        }
    }
}

// ── Use case ──────────────────────────────────────────────────────────────────

/// Orchestrates detection, editing, verification, rollback and recording.
pub struct ToggleController {
    sections: Arc<dyn SectionStore>,
    probe: Arc<dyn VerificationProbe>,
    store: Arc<dyn StateStore>,
    catalog: BlockCatalog,
}

impl ToggleController {
    pub fn new(
        sections: Arc<dyn SectionStore>,
        probe: Arc<dyn VerificationProbe>,
        store: Arc<dyn StateStore>,
        catalog: BlockCatalog,
    ) -> Self {
        Self {
            sections,
            probe,
            store,
            catalog,
        }
    }

    /// Reads the current state of `feature` from the managed file.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Read`] when the file exists but is unreadable.
    pub fn current_state(&self, feature: Feature) -> Result<FeatureState, EditError> {
        self.sections
            .section_present(feature.section_name())
            .map(FeatureState::from_present)
    }

    /// Flips `feature` and records the outcome in the state store.
    ///
    /// # Errors
    ///
    /// - [`ToggleError::Edit`] if the file could not be read or written; the
    ///   save-failure flag is raised and no state flip is recorded.
    /// - [`ToggleError::VerificationFailed`] if compression was enabled but is
    ///   not served; the block has been rolled back.
    ///
    /// A removal that finds nothing to remove records nothing and reports the
    /// feature as still enabled.
    pub fn toggle(&self, feature: Feature) -> Result<ToggleOutcome, ToggleError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("toggle", %request_id, feature = feature.slug());
        let _guard = span.enter();

        let previous = match self.current_state(feature) {
            Ok(state) => state,
            Err(source) => return Err(self.record_edit_failure(feature, source)),
        };
        let desired = match previous {
            FeatureState::Enabled => Vec::new(),
            FeatureState::Disabled => self.catalog.render(feature),
        };

        let write = match self.sections.upsert_section(feature.section_name(), &desired) {
            Ok(write) => write,
            Err(source) => return Err(self.record_edit_failure(feature, source)),
        };

        if previous.is_enabled() && write == WriteOutcome::Unchanged {
            // Nothing was removed, so the file still reads as enabled.
            warn!("section detected but not found by the editor; state left as is");
            return Ok(ToggleOutcome {
                feature,
                previous,
                current: previous,
                write,
                verified: None,
            });
        }

        let current = previous.flipped();
        let mut verified = None;

        if feature.requires_verification() && current.is_enabled() {
            let working = self.probe.compression_active();
            verified = Some(working);
            if !working {
                return Err(self.roll_back(feature));
            }
        }

        self.record_success(feature, current);
        info!(from = ?previous, to = ?current, ?write, "feature toggled");

        Ok(ToggleOutcome {
            feature,
            previous,
            current,
            write,
            verified,
        })
    }

    fn roll_back(&self, feature: Feature) -> ToggleError {
        warn!("{feature} not detected on the live site; removing the block again");

        let rollback = self.sections.upsert_section(feature.section_name(), &[]).err();
        match &rollback {
            Some(e) => {
                warn!(error = %e, "rollback failed; the block may still be in place");
                self.put(keys::HTACCESS_SAVE, state::STATUS_ERROR);
            }
            None => self.put(keys::HTACCESS_SAVE, state::STATUS_OK),
        }

        self.put(keys::GZIP_TEST_RESULT, state::STATUS_ERROR);
        self.put(state::enabled_key(feature), state::OFF);

        ToggleError::VerificationFailed { feature, rollback }
    }

    fn record_edit_failure(&self, feature: Feature, source: EditError) -> ToggleError {
        warn!(error = %source, "could not update the server config");
        self.put(keys::HTACCESS_SAVE, state::STATUS_ERROR);
        ToggleError::Edit { feature, source }
    }

    fn record_success(&self, feature: Feature, current: FeatureState) {
        let flag = if current.is_enabled() { state::ON } else { state::OFF };
        self.put(state::enabled_key(feature), flag);

        if feature.requires_verification() {
            self.put(keys::GZIP_TEST_RESULT, state::STATUS_OK);
        }
        if let Some(key) = state::changed_key(feature) {
            self.put(key, state::STATUS_OK);
        }
        self.put(keys::HTACCESS_SAVE, state::STATUS_OK);
    }

    /// Store failures never undo a toggle that already reached the file.
    fn put(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key, error = %e, "could not record toggle outcome");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
