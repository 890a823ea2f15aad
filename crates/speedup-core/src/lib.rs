//! # speedup-core
//!
//! Shared library for speedup containing the directive catalog, the
//! marker-delimited section editor, and the presence-detection policies.
//!
//! Everything in this crate works on in-memory text.  It never touches the
//! file system or the network, so the admin crate (and its tests) can reason
//! about an `.htaccess` edit as a pure `&str -> String` transformation before
//! any byte hits the disk.
//!
//! # Architecture overview
//!
//! speedup manages a handful of web-server performance features by inserting
//! and removing named blocks in a single shared `.htaccess` file:
//!
//! ```text
//! # BEGIN Speed Up WordPress Expire
//! <IfModule mod_expires.c>
//!   ExpiresActive On
//!   ...
//! </IfModule>
//! # END Speed Up WordPress Expire
//! ```
//!
//! - **`domain`** – The togglable features, their two states, and the site
//!   host-name extraction used to parameterize the hotlink rules.
//!
//! - **`catalog`** – The literal directive lines each feature writes when it
//!   is enabled.
//!
//! - **`section`** – Locating, replacing, appending and removing a named
//!   section inside the file text, plus the policies that decide whether a
//!   section counts as "present".
//!
//! - **`content`** – Post-content rewriting used by the lazy-load setting.

pub mod catalog;
pub mod content;
pub mod domain;
pub mod section;

// Re-export the most-used types at the crate root so callers can write
// `speedup_core::Feature` instead of `speedup_core::domain::feature::Feature`.
pub use catalog::BlockCatalog;
pub use domain::feature::{Feature, FeatureState};
pub use domain::site::{site_domain, SiteUrlError};
pub use section::markers::{begin_marker, end_marker, upsert_text, MarkerError, SectionEdit};
pub use section::presence::{ByteDistancePolicy, LineCountPolicy, PresencePolicy};
