//! Application layer use cases for the admin side of speedup.
//!
//! Use cases here orchestrate `speedup_core` types to fulfil one admin
//! action.  They depend on the ports declared next to them ([`state::StateStore`],
//! [`toggle_feature::SectionStore`], [`toggle_feature::VerificationProbe`]) and
//! never touch the file system or the network themselves.
//!
//! # Sub-modules
//!
//! - **`state`** – Persisted flag keys and the key-value store port.
//!
//! - **`toggle_feature`** – Flips a file-backed feature, verifies compression
//!   against the live site and rolls it back when it does not work.
//!
//! - **`toggle_setting`** – Flips the settings-only features that never touch
//!   `.htaccess`.
//!
//! - **`notices`** – Turns the one-shot outcome flags of the last toggle into
//!   the single notice shown on the next panel render.

pub mod notices;
pub mod state;
pub mod toggle_feature;
pub mod toggle_setting;
