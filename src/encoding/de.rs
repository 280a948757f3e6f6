use crate::{
    errors::WireError,
    schema::Schema,
    tag::Tag,
    tree::{NodeId, Tree, Value},
};
use byteorder::{BigEndian, ByteOrder, NativeEndian};
use bytes::Bytes;
use std::sync::Arc;

/// A bounds-checked reader over an encoded buffer. Every read validates the
/// remaining length first; nothing is consumed on failure.
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Cursor<'a> { Cursor { buf, pos: 0 } }

    #[inline]
    pub(crate) fn remaining(&self) -> usize { self.buf.len() - self.pos }

    #[inline]
    pub(crate) fn consumed(&self) -> usize { self.pos }

    #[inline]
    pub(crate) fn rest(&self) -> &'a [u8] { &self.buf[self.pos..] }

    #[inline]
    pub(crate) fn advance(&mut self, n: usize) { self.pos += n }

    #[inline]
    pub(crate) fn take_byte(&mut self) -> Result<u8, WireError> {
        if self.remaining() >= 1 {
            let byte = self.buf[self.pos];
            self.pos += 1;
            Ok(byte)
        } else {
            Err(WireError::Truncated {
                needed: 1,
                available: 0,
            })
        }
    }

    #[inline]
    pub(crate) fn read_many(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() >= len {
            let slice = &self.buf[self.pos..self.pos + len];
            self.pos += len;
            Ok(slice)
        } else {
            Err(WireError::Truncated {
                needed: len,
                available: self.remaining(),
            })
        }
    }

    #[inline]
    pub(crate) fn read_u16(&mut self) -> Result<u16, WireError> {
        Ok(BigEndian::read_u16(self.read_many(2)?))
    }

    #[inline]
    pub(crate) fn read_i16(&mut self) -> Result<i16, WireError> {
        Ok(BigEndian::read_i16(self.read_many(2)?))
    }

    #[inline]
    pub(crate) fn read_u32(&mut self) -> Result<u32, WireError> {
        Ok(BigEndian::read_u32(self.read_many(4)?))
    }

    #[inline]
    pub(crate) fn read_i32(&mut self) -> Result<i32, WireError> {
        Ok(BigEndian::read_i32(self.read_many(4)?))
    }

    #[inline]
    pub(crate) fn read_u64(&mut self) -> Result<u64, WireError> {
        Ok(BigEndian::read_u64(self.read_many(8)?))
    }

    #[inline]
    pub(crate) fn read_i64(&mut self) -> Result<i64, WireError> {
        Ok(BigEndian::read_i64(self.read_many(8)?))
    }

    /// Doubles travel in native byte order, unlike every other multi-byte
    /// field (see the crate docs).
    #[inline]
    pub(crate) fn read_f64(&mut self) -> Result<f64, WireError> {
        Ok(NativeEndian::read_f64(self.read_many(8)?))
    }

    /// Reads the length field for a string kind or the byte count for a
    /// container, rejecting negative values.
    pub(crate) fn read_len(&mut self, tag: Tag) -> Result<i64, WireError> {
        let len = match tag {
            Tag::Str8 => self.take_byte()? as i8 as i64,
            Tag::Str16 => self.read_i16()? as i64,
            Tag::Str32 => self.read_i32()? as i64,
            Tag::Str64 | Tag::Struct | Tag::Seq => self.read_i64()?,
            _ => return Err(WireError::Unsupported { tag }),
        };
        if len < 0 {
            return Err(WireError::CorruptLength { tag, len });
        }
        Ok(len)
    }
}

/// Parses one encoded value from `buf` into `tree`, guided by
/// `schema`. Returns the new datum and the number of bytes it
/// occupies, so callers can unpack a sequence of independent top-level
/// messages from one buffer.
///
/// # Errors
///
/// - [`WireError::TagMismatch`] when the leading tag byte disagrees with
///   `schema` (nothing consumed; safe to probe other schemas).
/// - [`WireError::Truncated`] when the buffer is shorter than a fixed or
///   declared size requires.
/// - [`WireError::CorruptLength`] when a length or count field is negative,
///   or a sequence's elements disagree with its declared byte count.
/// - [`WireError::Unsupported`] for the reserved container kinds.
/// - [`WireError::ElementCount`] when a sequence schema does not declare
///   exactly one element schema.
///
/// # Example
///
/// ```
/// use tson::prelude::*;
///
/// let mut tree = Tree::new();
/// let id = tree.make_u32(0xdead);
/// let buf = pack_full(&tree, id).unwrap();
///
/// let schema = Schema::make(Tag::U32);
/// let (out, root) = unpack_full(&schema, &buf).unwrap();
/// assert_eq!(out.value(root), &Value::U32(0xdead));
/// ```
pub fn unpack(
    tree: &mut Tree,
    schema: &Arc<Schema>,
    buf: &[u8],
) -> Result<(NodeId, usize), WireError> {
    let expected = schema.tag();
    let mut cur = Cursor::new(buf);

    let byte = cur.take_byte()?;
    let found = Tag::from_byte(byte).ok_or(WireError::UnknownTag { byte })?;
    if found != expected {
        return Err(WireError::TagMismatch { expected, found });
    }
    if expected == Tag::Dict || expected == Tag::Func {
        return Err(WireError::Unsupported { tag: expected });
    }
    // the fixed part must be present before any field is read
    if buf.len() < expected.expect_size() {
        return Err(WireError::Truncated {
            needed: expected.expect_size(),
            available: buf.len(),
        });
    }

    let node = match expected {
        Tag::U8 => {
            let v = cur.take_byte()?;
            tree.push(schema.clone(), Value::U8(v), expected.expect_size())
        }
        Tag::I8 => {
            let v = cur.take_byte()? as i8;
            tree.push(schema.clone(), Value::I8(v), expected.expect_size())
        }
        Tag::U16 => {
            let v = cur.read_u16()?;
            tree.push(schema.clone(), Value::U16(v), expected.expect_size())
        }
        Tag::I16 => {
            let v = cur.read_i16()?;
            tree.push(schema.clone(), Value::I16(v), expected.expect_size())
        }
        Tag::U32 => {
            let v = cur.read_u32()?;
            tree.push(schema.clone(), Value::U32(v), expected.expect_size())
        }
        Tag::I32 => {
            let v = cur.read_i32()?;
            tree.push(schema.clone(), Value::I32(v), expected.expect_size())
        }
        Tag::U64 => {
            let v = cur.read_u64()?;
            tree.push(schema.clone(), Value::U64(v), expected.expect_size())
        }
        Tag::I64 => {
            let v = cur.read_i64()?;
            tree.push(schema.clone(), Value::I64(v), expected.expect_size())
        }
        Tag::Double => {
            let v = cur.read_f64()?;
            tree.push(schema.clone(), Value::Double(v), expected.expect_size())
        }
        Tag::Str8 | Tag::Str16 | Tag::Str32 | Tag::Str64 => {
            let len = cur.read_len(expected)?;
            let payload = cur.read_many(len as usize)?;
            tree.push(
                schema.clone(),
                Value::Str(Bytes::from(payload.to_vec())),
                expected.expect_size() + len as usize,
            )
        }
        Tag::Struct => {
            let declared = cur.read_len(expected)?;
            if cur.remaining() < declared as usize {
                return Err(WireError::Truncated {
                    needed: declared as usize,
                    available: cur.remaining(),
                });
            }
            let node = tree.push(
                schema.clone(),
                Value::Fields {
                    nbytes: declared,
                    children: Vec::with_capacity(schema.fields().len()),
                },
                expected.expect_size() + declared as usize,
            );
            for field_schema in schema.fields() {
                if cur.remaining() == 0 {
                    return Err(WireError::Truncated {
                        needed: 1,
                        available: 0,
                    });
                }
                let (child, nread) = unpack(tree, field_schema, cur.rest())?;
                cur.advance(nread);
                tree.attach(node, child);
            }
            node
        }
        Tag::Seq => {
            let declared = cur.read_len(expected)?;
            if cur.remaining() < declared as usize {
                return Err(WireError::Truncated {
                    needed: declared as usize,
                    available: cur.remaining(),
                });
            }
            let elem_schema = match schema.fields() {
                [elem] => elem,
                fields => {
                    return Err(WireError::ElementCount {
                        count: fields.len(),
                    })
                }
            };
            let node = tree.push(
                schema.clone(),
                Value::Fields {
                    nbytes: declared,
                    children: Vec::new(),
                },
                expected.expect_size() + declared as usize,
            );
            let mut nread: i64 = 0;
            while nread < declared {
                let (child, n) = unpack(tree, elem_schema, cur.rest())?;
                cur.advance(n);
                nread += n as i64;
                tree.attach(node, child);
            }
            if nread != declared {
                // elements overran the declared budget
                return Err(WireError::CorruptLength {
                    tag: expected,
                    len: declared,
                });
            }
            node
        }
        Tag::Dict | Tag::Func => return Err(WireError::Unsupported { tag: expected }),
    };

    Ok((node, tree.packsz(node)))
}

/// Parses one encoded value into a fresh [`Tree`].
pub fn unpack_full(schema: &Arc<Schema>, buf: &[u8]) -> Result<(Tree, NodeId), WireError> {
    let mut tree = Tree::new();
    let (id, _) = unpack(&mut tree, schema, buf)?;
    Ok((tree, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ser::pack_full;

    #[test]
    fn tag_mismatch_consumes_nothing() {
        let mut tree = Tree::new();
        let id = tree.make_u8(3);
        let buf = pack_full(&tree, id).unwrap();

        let schema = Schema::make(Tag::I8);
        assert_eq!(
            unpack_full(&schema, &buf).err(),
            Some(WireError::TagMismatch {
                expected: Tag::I8,
                found: Tag::U8
            })
        );
    }

    #[test]
    fn unknown_tag_byte() {
        let schema = Schema::make(Tag::U8);
        assert_eq!(
            unpack_full(&schema, &[0xff, 0]).err(),
            Some(WireError::UnknownTag { byte: 0xff })
        );
    }

    #[test]
    fn negative_str_len_is_corrupt() {
        // str8 with length byte 0x80 (-128 as i8)
        let schema = Schema::make(Tag::Str8);
        assert_eq!(
            unpack_full(&schema, &[Tag::Str8.byte(), 0x80]).err(),
            Some(WireError::CorruptLength {
                tag: Tag::Str8,
                len: -128
            })
        );
    }

    #[test]
    fn empty_buffer() {
        let schema = Schema::make(Tag::U64);
        match unpack_full(&schema, &[]) {
            Err(WireError::Truncated { .. }) => {}
            other => panic!("expected truncation, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn seq_schema_needs_one_element() {
        let schema = Schema::make(Tag::Seq);

        let mut tree = Tree::new();
        let root = tree.make_container(&schema).unwrap();
        let buf = pack_full(&tree, root).unwrap();

        assert_eq!(
            unpack_full(&schema, &buf).err(),
            Some(WireError::ElementCount { count: 0 })
        );
    }

    #[test]
    fn reserved_schema_fails_cleanly() {
        let schema = Schema::make(Tag::Dict);
        assert_eq!(
            unpack_full(&schema, &[Tag::Dict.byte(), 0, 0, 0, 0, 0, 0, 0, 0]).err(),
            Some(WireError::Unsupported { tag: Tag::Dict })
        );
    }

    #[test]
    fn consumed_supports_composition() {
        let mut tree = Tree::new();
        let a = tree.make_u8(1);
        let b = tree.make_u16(2);

        let mut buf = pack_full(&tree, a).unwrap();
        buf.extend(pack_full(&tree, b).unwrap());

        let mut out = Tree::new();
        let (first, n) = unpack(&mut out, &Schema::make(Tag::U8), &buf).unwrap();
        let (second, m) = unpack(&mut out, &Schema::make(Tag::U16), &buf[n..]).unwrap();
        assert_eq!(n + m, buf.len());
        assert_eq!(out.value(first), &Value::U8(1));
        assert_eq!(out.value(second), &Value::U16(2));
    }
}
