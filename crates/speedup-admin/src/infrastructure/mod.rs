//! Infrastructure layer for the admin side of speedup.
//!
//! Contains the adapters behind the application ports: the `.htaccess`
//! editor and the settings stores on the file system, the HTTP compression
//! probe, and the command bridge the CLI (or any other front end) calls into.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `speedup_core`, but MUST NOT be imported by the `application` layer.

pub mod network;
pub mod storage;
pub mod ui_bridge;
