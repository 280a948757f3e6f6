//! # TSON
//!
//! TSON (Tagged Serial Object Notation) is a self-describing, schema-driven
//! binary value encoding with a Lisp-like textual front-end that parses
//! into the same tree-of-values model.
//!
//! # Usage
//!
//! A caller describes the expected shape of a message as a [`Schema`] tree,
//! builds a conforming value tree in a [`Tree`] arena, and packs it to
//! bytes; or unpacks bytes against a known schema; or scans a buffer with
//! no schema at all, letting the embedded tag bytes drive the walk.
//!
//! ```
//! use tson::prelude::*;
//!
//! // a record: one u32 followed by one str8
//! let mut record = Schema::make(Tag::Struct);
//! Schema::add_field(&mut record, Schema::make(Tag::U32)).unwrap();
//! Schema::add_field(&mut record, Schema::make(Tag::Str8)).unwrap();
//!
//! // outbound: build a tree and pack it
//! let mut tree = Tree::new();
//! let root = tree.make_container(&record).unwrap();
//! let seqno = tree.make_u32(41);
//! let body = tree.make_str(Tag::Str8, b"ping").unwrap();
//! tree.add_child(root, seqno).unwrap();
//! tree.add_child(root, body).unwrap();
//!
//! let buf = pack_full(&tree, root).unwrap();
//!
//! // inbound: unpack against the same schema
//! let (decoded, id) = unpack_full(&record, &buf).unwrap();
//! assert!(tree.deep_eq(root, &decoded, id));
//! ```
//!
//! The textual syntax needs no schema:
//!
//! ```
//! use tson::prelude::*;
//!
//! let (tree, root) = read_from(&b"(add 1 2.5) ; a form"[..]).unwrap();
//! let form = tree.child(root, 0).unwrap();
//! assert_eq!(tree.children(form).len(), 3);
//! ```
//!
//! # Specification
//!
//! This section describes the TSON binary format. All multi-byte fields are
//! big-endian except as noted for `double`.
//!
//! ## Tags
//!
//! The first byte of every encoded value is its *tag*:
//!
//! | Tag byte | Kind     | Payload                                   |
//! | ---      | ---      | ---                                       |
//! | 0        | `u8`     | 1 byte                                    |
//! | 1        | `i8`     | 1 byte                                    |
//! | 2        | `u16`    | 2 bytes, big-endian                       |
//! | 3        | `i16`    | 2 bytes, big-endian                       |
//! | 4        | `u32`    | 4 bytes, big-endian                       |
//! | 5        | `i32`    | 4 bytes, big-endian                       |
//! | 6        | `u64`    | 8 bytes, big-endian                       |
//! | 7        | `i64`    | 8 bytes, big-endian                       |
//! | 8        | `double` | 8 bytes, **native** byte order            |
//! | 9        | `str8`   | 1-byte signed length, then raw bytes      |
//! | 10       | `str16`  | 2-byte signed length, then raw bytes      |
//! | 11       | `str32`  | 4-byte signed length, then raw bytes      |
//! | 12       | `str64`  | 8-byte signed length, then raw bytes      |
//! | 13       | `struct` | 8-byte signed byte count, then children   |
//! | 14       | `seq`    | 8-byte signed byte count, then children   |
//! | 15       | `dict`   | reserved                                  |
//! | 16       | `func`   | reserved                                  |
//!
//! ## Strings
//!
//! The length field is signed; its width bounds the payload at 127, 32767,
//! 2^31-1, or 2^63-1 bytes. A negative decoded length is corrupt.
//!
//! ## Containers
//!
//! A `struct` is heterogeneous with fixed arity: its children are encoded
//! in declaration order and decoded one per schema field. A `seq` is
//! homogeneous: its arity is determined by the declared byte count, not an
//! element count, and its schema declares exactly one element type. The
//! byte count covers only the encoded children, excluding the container's
//! own tag byte and count field. `dict` and `func` are reserved and
//! rejected everywhere.
//!
//! ## Portability caveat
//!
//! `double` payloads are written in the host's byte order while every other
//! multi-byte field is big-endian. This is a wire-compatibility quirk kept
//! deliberately: existing streams encode doubles this way, and consumers
//! may depend on it. Cross-endian peers will misread `double` values.
//!
//! # Text syntax
//!
//! Lists are delimited by `(` `)`; atoms are separated by space, tab, CR,
//! or LF; double-quoted strings take backslash escapes (`\"` is `"`, `\\`
//! is `\`, any other escaped byte is itself); `;` starts a comment running
//! to end of line. Atoms beginning with `+`, `-`, or a digit parse as
//! `i64`, or as `double` when they contain a `.`.

#![warn(
    deprecated_in_future,
    unsafe_code,
    unused_labels,
    keyword_idents,
    missing_copy_implementations,
    missing_debug_implementations,
    macro_use_extern_crate,
    unreachable_pub,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces
)]

pub mod encoding;
pub mod errors;
pub mod prelude;
pub mod schema;
pub mod tag;
pub mod text;
pub mod tree;

pub use crate::{
    errors::{ParseError, WireError},
    schema::Schema,
    tag::Tag,
    tree::{NodeId, Tree, Value},
};
