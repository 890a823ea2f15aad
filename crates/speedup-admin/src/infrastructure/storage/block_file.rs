//! File-backed [`SectionStore`] over the managed `.htaccess`.
//!
//! The file is read fresh on every call and never cached; other tools (and
//! people) edit it too.  Edits are computed with
//! [`speedup_core::upsert_text`] and written back through a temporary file in
//! the same directory followed by an atomic rename.
//!
//! # Concurrency
//!
//! Every read-modify-write runs under a write lock shared by all clones of
//! one editor, so two toggles in the same process can never lose each
//! other's section.  A second process editing the file at the same time is
//! not coordinated with: the last rename wins, but the file is never seen
//! half-written.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use speedup_core::{upsert_text, ByteDistancePolicy, PresencePolicy, SectionEdit};
use tracing::debug;

use crate::application::toggle_feature::{EditError, SectionStore, WriteOutcome};

/// Editor for the named sections of one file.
#[derive(Clone)]
pub struct BlockFileEditor {
    path: PathBuf,
    policy: Arc<dyn PresencePolicy>,
    write_lock: Arc<Mutex<()>>,
}

impl BlockFileEditor {
    /// Creates an editor using the default byte-distance presence policy.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_policy(path, Arc::new(ByteDistancePolicy::default()))
    }

    pub fn with_policy(path: impl Into<PathBuf>, policy: Arc<dyn PresencePolicy>) -> Self {
        Self {
            path: path.into(),
            policy,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Current file text; `None` when the file does not exist.
    fn read_text(&self) -> Result<Option<String>, EditError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(EditError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl SectionStore for BlockFileEditor {
    fn section_present(&self, name: &str) -> Result<bool, EditError> {
        let present = match self.read_text()? {
            Some(text) => self.policy.is_present(&text, name),
            None => false,
        };
        debug!(path = %self.path.display(), section = name, present, "presence checked");
        Ok(present)
    }

    fn upsert_section(&self, name: &str, lines: &[String]) -> Result<WriteOutcome, EditError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let text = self.read_text()?.unwrap_or_default();
        let rewritten = match upsert_text(&text, name, lines)? {
            SectionEdit::Unchanged => {
                debug!(path = %self.path.display(), section = name, "section already up to date");
                return Ok(WriteOutcome::Unchanged);
            }
            SectionEdit::Rewritten(out) => out,
        };

        super::write_atomically(&self.path, &rewritten).map_err(|source| EditError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(
            path = %self.path.display(),
            section = name,
            body_lines = lines.len(),
            bytes = rewritten.len(),
            "section written"
        );
        Ok(WriteOutcome::Written)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
