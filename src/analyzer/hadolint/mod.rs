//! Dockerfile tokenizer.
//!
//! A Rust translation of the Dockerfile AST/parser half of
//! [Hadolint](https://github.com/hadolint/hadolint) (originally Haskell, GPL-3.0
//! licensed by Lukas Martinelli and contributors). Hadolint's own rule set and
//! CLI formatter are not carried here: [`crate::dockerfile`] implements its own
//! validation passes over this tokenizer's output.

pub mod parser;

pub use parser::{ParseError, parse_dockerfile};
