//! Domain entities for speedup.
//!
//! This module contains the vocabulary shared by every layer: which features
//! exist, which state each one can be in, and how the site's own host name is
//! derived from its public URL.  Nothing here performs I/O.

/// The togglable features and their enabled/disabled state.
pub mod feature;

/// Host-name extraction from the site's public base URL.
pub mod site;
