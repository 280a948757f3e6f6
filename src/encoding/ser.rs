use crate::{
    errors::WireError,
    tag::Tag,
    tree::{NodeId, Tree, Value},
};

/// A sink for encoded bytes.
pub trait Serializer {
    /// The type of the output value.
    type Out;
    /// Add a byte to the output value.
    fn put_u8(&mut self, u: u8);
    /// Add a slice to the output value.
    fn put_slice(&mut self, slice: &[u8]);
    /// Return the output value.
    fn finalize(self) -> Self::Out;
}

impl Serializer for Vec<u8> {
    type Out = Self;

    fn put_u8(&mut self, u: u8) { self.push(u) }

    fn put_slice(&mut self, slice: &[u8]) { self.extend_from_slice(slice) }

    fn finalize(self) -> Self::Out { self }
}

/// Writes into a caller-supplied buffer whose capacity has already been
/// checked against the datum's `packsz`.
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Serializer for SliceWriter<'a> {
    type Out = usize;

    fn put_u8(&mut self, u: u8) {
        self.buf[self.pos] = u;
        self.pos += 1;
    }

    fn put_slice(&mut self, slice: &[u8]) {
        self.buf[self.pos..self.pos + slice.len()].copy_from_slice(slice);
        self.pos += slice.len();
    }

    fn finalize(self) -> usize { self.pos }
}

/// Wire-field writers for [`Serializer`]s. Multi-byte integers and length
/// fields go out big-endian; `put_f64` writes native byte order.
pub trait SerializerExt: Serializer {
    /// Add a [`u16`] in big-endian order.
    fn put_u16(&mut self, u: u16);
    /// Add an [`i16`] in big-endian order.
    fn put_i16(&mut self, i: i16);
    /// Add a [`u32`] in big-endian order.
    fn put_u32(&mut self, u: u32);
    /// Add an [`i32`] in big-endian order.
    fn put_i32(&mut self, i: i32);
    /// Add a [`u64`] in big-endian order.
    fn put_u64(&mut self, u: u64);
    /// Add an [`i64`] in big-endian order.
    fn put_i64(&mut self, i: i64);
    /// Add an [`f64`] in native byte order.
    fn put_f64(&mut self, f: f64);
}

impl<S: Serializer> SerializerExt for S {
    #[inline]
    fn put_u16(&mut self, u: u16) { self.put_slice(&u16::to_be_bytes(u)) }

    #[inline]
    fn put_i16(&mut self, i: i16) { self.put_slice(&i16::to_be_bytes(i)) }

    #[inline]
    fn put_u32(&mut self, u: u32) { self.put_slice(&u32::to_be_bytes(u)) }

    #[inline]
    fn put_i32(&mut self, i: i32) { self.put_slice(&i32::to_be_bytes(i)) }

    #[inline]
    fn put_u64(&mut self, u: u64) { self.put_slice(&u64::to_be_bytes(u)) }

    #[inline]
    fn put_i64(&mut self, i: i64) { self.put_slice(&i64::to_be_bytes(i)) }

    #[inline]
    fn put_f64(&mut self, f: f64) { self.put_slice(&f64::to_ne_bytes(f)) }
}

/// Serializes the subtree rooted at `id` into `out`: a one-byte tag, then
/// the payload in wire representation.
///
/// The engine trusts the `packsz` bookkeeping established when the tree was
/// built and performs no independent size computation.
///
/// # Errors
///
/// Fails on the reserved container kinds.
pub fn pack_datum<S: Serializer>(tree: &Tree, id: NodeId, out: &mut S) -> Result<(), WireError> {
    let tag = tree.schema(id).tag();
    out.put_u8(tag.byte());
    match tree.value(id) {
        Value::U8(v) => out.put_u8(*v),
        Value::I8(v) => out.put_u8(*v as u8),
        Value::U16(v) => out.put_u16(*v),
        Value::I16(v) => out.put_i16(*v),
        Value::U32(v) => out.put_u32(*v),
        Value::I32(v) => out.put_i32(*v),
        Value::U64(v) => out.put_u64(*v),
        Value::I64(v) => out.put_i64(*v),
        // doubles go out in native order; cross-endian peers will misread
        // them (see the crate docs)
        Value::Double(v) => out.put_f64(*v),
        Value::Str(b) => {
            match tag {
                Tag::Str8 => out.put_u8(b.len() as u8),
                Tag::Str16 => out.put_i16(b.len() as i16),
                Tag::Str32 => out.put_i32(b.len() as i32),
                Tag::Str64 => out.put_i64(b.len() as i64),
                _ => return Err(WireError::ValueKind { tag }),
            }
            out.put_slice(b);
        }
        Value::Fields { nbytes, children } => {
            match tag {
                Tag::Struct | Tag::Seq => {}
                _ => return Err(WireError::Unsupported { tag }),
            }
            out.put_i64(*nbytes);
            for &child in children {
                pack_datum(tree, child, out)?;
            }
        }
    }
    Ok(())
}

/// Serializes the subtree rooted at `id` into `buf`, returning the number
/// of bytes written (the datum's `packsz`).
///
/// # Errors
///
/// Fails without writing when `buf` is shorter than the datum's `packsz`,
/// and on the reserved container kinds.
pub fn pack(tree: &Tree, id: NodeId, buf: &mut [u8]) -> Result<usize, WireError> {
    let needed = tree.packsz(id);
    if buf.len() < needed {
        return Err(WireError::Truncated {
            needed,
            available: buf.len(),
        });
    }
    let mut w = SliceWriter { buf, pos: 0 };
    pack_datum(tree, id, &mut w)?;
    Ok(w.finalize())
}

/// Serializes the subtree rooted at `id` into a fresh buffer.
pub fn pack_full(tree: &Tree, id: NodeId) -> Result<Vec<u8>, WireError> {
    let mut out = Vec::with_capacity(tree.packsz(id));
    pack_datum(tree, id, &mut out)?;
    Ok(out.finalize())
}
