//! Foundation types for sprig.
//!
//! Shared by every sprig crate: the error enum surfaced by the markup front
//! end and its configuration loaders, and the crate-wide `Result` alias.

pub mod error;
