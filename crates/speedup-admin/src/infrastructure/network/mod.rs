//! Network infrastructure for the admin side.
//!
//! # Sub-modules
//!
//! - **`probe`** – The HTTP
//!   [`VerificationProbe`](crate::application::toggle_feature::VerificationProbe)
//!   that asks the live site whether it really serves gzip after the
//!   compression block was written.

pub mod probe;
