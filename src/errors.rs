//! Failure conditions for the binary engines and the text front-end.
//!
//! The binary side distinguishes recoverable classes: a [`WireError::TagMismatch`]
//! means "not this format" and is safe to probe with, while truncation and
//! corrupt lengths mean the buffer itself is bad.

use crate::tag::Tag;
use failure::Fail;
use std::io;

#[derive(Debug, Fail, Clone, PartialEq, Eq)]
/// An error from pack, unpack, scan, or tree/schema construction.
pub enum WireError {
    /// The buffer's leading tag byte disagrees with the expected schema.
    #[fail(display = "tag mismatch: expected {}, found {}", expected, found)]
    TagMismatch { expected: Tag, found: Tag },

    /// The buffer is shorter than a declared or fixed size requires.
    #[fail(display = "truncated: needed {} bytes, {} available", needed, available)]
    Truncated { needed: usize, available: usize },

    /// A decoded length or count field is negative.
    #[fail(display = "corrupt {} length: {}", tag, len)]
    CorruptLength { tag: Tag, len: i64 },

    /// A tag byte outside the enumerated set.
    #[fail(display = "unknown tag byte {:#04x}", byte)]
    UnknownTag { byte: u8 },

    /// A reserved container kind reached pack or unpack.
    #[fail(display = "unsupported tag {}", tag)]
    Unsupported { tag: Tag },

    /// A child was added to a non-container schema or datum.
    #[fail(display = "{} is not a container", tag)]
    NotContainer { tag: Tag },

    /// A schema already referenced elsewhere (or a builtin singleton) was
    /// mutated.
    #[fail(display = "schema is shared and can no longer be extended")]
    SharedSchema,

    /// A sequence schema must declare exactly one element schema.
    #[fail(display = "sequence schema declares {} element schemas", count)]
    ElementCount { count: usize },

    /// A raw value does not match the kind its schema declares.
    #[fail(display = "value does not match schema tag {}", tag)]
    ValueKind { tag: Tag },

    /// A string payload does not fit its tag's length field.
    #[fail(display = "{} payload of {} bytes overflows the length field", tag, len)]
    Overflow { tag: Tag, len: usize },
}

#[derive(Debug, Fail)]
/// An error from the tokenizer or the text tree builder.
pub enum ParseError {
    /// A close-paren with no matching open list.
    #[fail(display = "unbalanced close at byte {}", offset)]
    UnbalancedClose { offset: usize },

    /// The tokenizer callback requested an abort.
    #[fail(display = "tokenization aborted: {}", _0)]
    Aborted(String),

    /// The underlying byte source failed.
    #[fail(display = "read failed")]
    Io(#[fail(cause)] io::Error),
}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> ParseError { ParseError::Io(e) }
}
