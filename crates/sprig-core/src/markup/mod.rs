//! Markup scanning and tree construction.
//!
//! The [`scanner::Scanner`] is a pull tokenizer over any [`source::CharSource`];
//! the [`tree_builder::TreeBuilder`] drives it and applies the recovery rules
//! of a [`dialect::Dialect`] to produce a [`dom::Document`].

pub mod dialect;
pub mod dom;
pub mod entities;
pub mod scanner;
pub mod serialize;
pub mod source;
pub mod token;
pub mod tree_builder;


pub use dialect::{Dialect, ParseOptions, ScannerConfig};
pub use dom::{Document, NodeId, NodeKind};
pub use scanner::{Mode, Scanner};
pub use token::{Token, TokenBuf, TokenKind};
pub use tree_builder::{TreeBuilder, build, parse, parse_document};
