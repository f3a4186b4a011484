//! Loader for textual schema definitions (RFC 4512 §4.1).
//!
//! Text is tokenized, split into top-level `( ... )` definitions and read
//! into builders. Cross-references are left unresolved here; see
//! [`Schema::from_builders`](super::Schema::from_builders).

mod parser;
mod tokenizer;


pub use parser::{parse_attribute_types, parse_object_classes};
pub use tokenizer::{Token, TokenKind, tokenize};
