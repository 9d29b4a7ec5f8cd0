//! sprig core: a lenient markup front end.
//!
//! Turns a stream of characters into classified tokens and assembles them
//! into an arena element tree under HTML-like recovery rules.

pub use sprig_types::error;

pub mod markup;
