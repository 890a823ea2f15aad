//! Marker-delimited sections inside a line-oriented config file.
//!
//! A section looks like this on disk:
//!
//! ```text
//! # BEGIN <name>
//! <body line>
//! ...
//! # END <name>
//! ```
//!
//! - **`markers`** – Pure text edits: locate, replace, append, remove.
//! - **`presence`** – Policies deciding whether a section counts as enabled.

pub mod markers;
pub mod presence;
