//! Convenience re-exports of the whole public surface.

pub use crate::{
    encoding::{pack, pack_datum, pack_full, scan, unpack, unpack_full, Serializer, SerializerExt},
    errors::{ParseError, WireError},
    schema::Schema,
    tag::Tag,
    text::{read_from, LexState, Parser, Tokenizer},
    tree::{NodeId, Tree, Value},
};
pub use bytes::Bytes;
