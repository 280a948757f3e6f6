//! The textual front-end: a parenthesized, Lisp-like syntax over the same
//! tree-of-values model as the binary engines.
//!
//! Lists are delimited by `(` `)`, atoms are separated by whitespace,
//! double-quoted strings support backslash escaping, and `;` starts a
//! comment running to end-of-line. Atoms beginning with `+`, `-`, or a
//! digit are numbers: Int64, or Double if they contain a `.`.
//!
//! No schema is involved: the syntax itself is the schema, and the
//! resulting tree uses only builtin tags plus `Seq` for lists.

pub mod lex;
pub mod read;

pub use lex::{LexState, Tokenizer};
pub use read::{read_from, Parser};
