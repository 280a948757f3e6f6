use super::de::Cursor;
use crate::tag::Tag;
use failure::Error;

/// Walks a self-describing buffer with no external schema: the tag bytes
/// embedded in the stream select the decoding width. The callback is
/// invoked once per scalar or string primitive with its payload slice, and
/// once per container with the container's raw body. The scanner does
/// **not** recurse into container bodies, so a callback that wants the
/// children re-scans the sub-range it was handed. This keeps shallow
/// inspection (indexing, routing) cheap: no tree is materialized.
///
/// Consecutive top-level values are walked until the buffer is exhausted;
/// the total number of bytes consumed is returned. A callback error aborts
/// the scan.
///
/// # Errors
///
/// Truncated buffers and negative length fields are ordinary errors.
///
/// # Panics
///
/// A tag byte outside the enumerated set, or one of the reserved container
/// kinds, is a protocol violation on a self-describing stream and panics.
/// Callers that cannot trust the stream should unpack against a schema
/// instead.
///
/// # Example
///
/// ```
/// use tson::prelude::*;
///
/// let mut tree = Tree::new();
/// let id = tree.make_u8(9);
/// let buf = pack_full(&tree, id).unwrap();
///
/// let mut seen = Vec::new();
/// scan(&buf, |tag, payload| {
///     seen.push((tag, payload.to_vec()));
///     Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(seen, vec![(Tag::U8, vec![9])]);
/// ```
pub fn scan<F>(buf: &[u8], mut cb: F) -> Result<usize, Error>
where
    F: FnMut(Tag, &[u8]) -> Result<(), Error>,
{
    let mut cur = Cursor::new(buf);
    while cur.remaining() > 0 {
        let byte = cur.take_byte()?;
        let tag = match Tag::from_byte(byte) {
            Some(tag) => tag,
            None => panic!(
                "protocol violation: unknown tag byte {:#04x} in self-describing stream",
                byte
            ),
        };
        match tag {
            Tag::Dict | Tag::Func => panic!(
                "protocol violation: reserved tag {} in self-describing stream",
                tag
            ),
            Tag::Struct | Tag::Seq => {
                let count = cur.read_len(tag)?;
                let body = cur.read_many(count as usize)?;
                cb(tag, body)?;
            }
            Tag::Str8 | Tag::Str16 | Tag::Str32 | Tag::Str64 => {
                let len = cur.read_len(tag)?;
                let payload = cur.read_many(len as usize)?;
                cb(tag, payload)?;
            }
            scalar => {
                let payload = cur.read_many(scalar.fixed_len())?;
                cb(scalar, payload)?;
            }
        }
    }
    Ok(cur.consumed())
}
