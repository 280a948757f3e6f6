//! The value tree: concrete data conforming to a schema.
//!
//! Datums live in an arena owned by a [`Tree`] and are addressed by
//! [`NodeId`] handles. Every datum records `packsz`, the exact number of
//! bytes it occupies on the wire including its own tag byte and any length
//! or count prefix. Appending a child with [`Tree::add_child`] is the only
//! way a container's `packsz` changes after construction, and the change is
//! propagated along the parent chain so every ancestor stays correct
//! without a re-walk.
//!
//! # Example
//!
//! ```
//! use tson::prelude::*;
//!
//! let mut seq = Schema::make(Tag::Seq);
//! Schema::add_field(&mut seq, Schema::make(Tag::U16)).unwrap();
//!
//! let mut tree = Tree::new();
//! let root = tree.make_container(&seq).unwrap();
//! let elt = tree.make_u16(700);
//! tree.add_child(root, elt).unwrap();
//!
//! // tag + count field + one u16 element (tag + 2 bytes)
//! assert_eq!(tree.packsz(root), 1 + 8 + 3);
//! ```

use crate::{errors::WireError, schema::Schema, tag::Tag};
use bytes::Bytes;
use std::{fmt, sync::Arc};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// A handle to a datum inside a [`Tree`].
///
/// Handles are only meaningful for the tree that minted them.
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone, PartialEq)]
/// The payload of a datum.
///
/// Scalar and string datums never carry children; container datums carry
/// their child handles and the cumulative byte count of the encoded
/// children, never a scalar.
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    Double(f64),
    /// An owned string payload.
    Str(Bytes),
    /// Container payload: Σ(child packsz) and the ordered child handles.
    Fields { nbytes: i64, children: Vec<NodeId> },
}

use Value::*;

impl Value {
    /// An empty container payload.
    pub fn fields() -> Value {
        Fields {
            nbytes: 0,
            children: Vec::new(),
        }
    }

    /// Whether this payload is the kind `tag` declares.
    pub fn matches(&self, tag: Tag) -> bool {
        match self {
            U8(_) => tag == Tag::U8,
            I8(_) => tag == Tag::I8,
            U16(_) => tag == Tag::U16,
            I16(_) => tag == Tag::I16,
            U32(_) => tag == Tag::U32,
            I32(_) => tag == Tag::I32,
            U64(_) => tag == Tag::U64,
            I64(_) => tag == Tag::I64,
            Double(_) => tag == Tag::Double,
            Str(_) => tag.is_str(),
            Fields { .. } => tag.is_container(),
        }
    }

    /// The string payload, if this is a string datum.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Str(b) => Some(b),
            _ => None,
        }
    }

    /// The value, if this is an `I64` datum.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            I64(i) => Some(*i),
            _ => None,
        }
    }

    /// The value, if this is a `Double` datum.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Double(d) => Some(*d),
            _ => None,
        }
    }

    /// The cumulative encoded byte count, if this is a container datum.
    pub fn nbytes(&self) -> Option<i64> {
        match self {
            Fields { nbytes, .. } => Some(*nbytes),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Datum {
    schema: Arc<Schema>,
    value: Value,
    packsz: usize,
    parent: Option<NodeId>,
}

#[derive(Debug, Default)]
/// An arena of datums forming one or more value trees.
pub struct Tree {
    nodes: Vec<Datum>,
}

macro_rules! make_scalar {
    ($(#[$doc:meta] $fn:ident, $tag:ident, $ctor:ident, $ty:ty);* $(;)?) => {
        $(
            #[$doc]
            pub fn $fn(&mut self, v: $ty) -> NodeId {
                let tag = Tag::$tag;
                self.push(Schema::make(tag), $ctor(v), tag.expect_size())
            }
        )*
    };
}

impl Tree {
    /// Creates an empty arena.
    pub fn new() -> Tree { Tree { nodes: Vec::new() } }

    /// Number of datums in the arena.
    pub fn len(&self) -> usize { self.nodes.len() }

    /// Whether the arena holds no datums.
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub(crate) fn push(&mut self, schema: Arc<Schema>, value: Value, packsz: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Datum {
            schema,
            value,
            packsz,
            parent: None,
        });
        id
    }

    make_scalar! {
        /// Builds a `U8` datum against the builtin schema.
        make_u8, U8, U8, u8;
        /// Builds an `I8` datum against the builtin schema.
        make_i8, I8, I8, i8;
        /// Builds a `U16` datum against the builtin schema.
        make_u16, U16, U16, u16;
        /// Builds an `I16` datum against the builtin schema.
        make_i16, I16, I16, i16;
        /// Builds a `U32` datum against the builtin schema.
        make_u32, U32, U32, u32;
        /// Builds an `I32` datum against the builtin schema.
        make_i32, I32, I32, i32;
        /// Builds a `U64` datum against the builtin schema.
        make_u64, U64, U64, u64;
        /// Builds an `I64` datum against the builtin schema.
        make_i64, I64, I64, i64;
        /// Builds a `Double` datum against the builtin schema.
        make_double, Double, Double, f64;
    }

    /// Builds a string datum of the given kind, copying `payload` into an
    /// owned buffer.
    ///
    /// # Errors
    ///
    /// Fails with [`WireError::Overflow`] when the payload does not fit the
    /// tag's length-field width, and with [`WireError::ValueKind`] when
    /// `tag` is not a string kind.
    pub fn make_str(&mut self, tag: Tag, payload: &[u8]) -> Result<NodeId, WireError> {
        let max = tag.str_max().ok_or(WireError::ValueKind { tag })?;
        if payload.len() > max {
            return Err(WireError::Overflow {
                tag,
                len: payload.len(),
            });
        }
        let packsz = tag.expect_size() + payload.len();
        Ok(self.push(Schema::make(tag), Str(Bytes::from(payload.to_vec())), packsz))
    }

    /// Builds an empty container datum; children are added afterward with
    /// [`Tree::add_child`].
    ///
    /// # Errors
    ///
    /// Fails for non-container schemas and for the reserved `Dict`/`Func`
    /// kinds.
    pub fn make_container(&mut self, schema: &Arc<Schema>) -> Result<NodeId, WireError> {
        let tag = schema.tag();
        match tag {
            Tag::Struct | Tag::Seq => {
                Ok(self.push(schema.clone(), Value::fields(), tag.expect_size()))
            }
            Tag::Dict | Tag::Func => Err(WireError::Unsupported { tag }),
            _ => Err(WireError::NotContainer { tag }),
        }
    }

    /// Builds a datum from a schema and a raw value: the generic form of the
    /// typed `make_*` constructors. Container schemas take
    /// [`Value::fields`] and produce an empty container.
    ///
    /// # Errors
    ///
    /// Fails when the value kind does not match the schema tag, on string
    /// payloads overflowing their length field, and on reserved container
    /// kinds.
    pub fn make(&mut self, schema: &Arc<Schema>, value: Value) -> Result<NodeId, WireError> {
        let tag = schema.tag();
        if !value.matches(tag) {
            return Err(WireError::ValueKind { tag });
        }
        match value {
            Str(b) => {
                // matches() guarantees a string tag here
                let max = tag.str_max().ok_or(WireError::ValueKind { tag })?;
                if b.len() > max {
                    return Err(WireError::Overflow { tag, len: b.len() });
                }
                let packsz = tag.expect_size() + b.len();
                Ok(self.push(schema.clone(), Str(b), packsz))
            }
            Fields { nbytes, children } => {
                if nbytes != 0 || !children.is_empty() {
                    return Err(WireError::ValueKind { tag });
                }
                self.make_container(schema)
            }
            v => Ok(self.push(schema.clone(), v, tag.expect_size())),
        }
    }

    /// Appends `child` to `parent`'s ordered child list, links the parent
    /// handle, and adds the child's `packsz` to every ancestor.
    ///
    /// # Errors
    ///
    /// Fails unless `parent` is a container datum.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), WireError> {
        let ptag = self.nodes[parent.0].schema.tag();
        let delta = self.nodes[child.0].packsz;
        match &mut self.nodes[parent.0].value {
            Fields { children, .. } => children.push(child),
            _ => return Err(WireError::NotContainer { tag: ptag }),
        }
        self.nodes[child.0].parent = Some(parent);
        self.adjust_packsz(parent, delta);
        Ok(())
    }

    /// Links `child` under `parent` without touching any `packsz`: the
    /// unpack path sizes containers from their declared byte count.
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Fields { children, .. } = &mut self.nodes[parent.0].value {
            children.push(child);
        }
        self.nodes[child.0].parent = Some(parent);
    }

    fn adjust_packsz(&mut self, start: NodeId, delta: usize) {
        let mut cur = Some(start);
        while let Some(id) = cur {
            let d = &mut self.nodes[id.0];
            d.packsz += delta;
            if let Fields { nbytes, .. } = &mut d.value {
                *nbytes += delta as i64;
            }
            cur = d.parent;
        }
    }

    /// The schema this datum was built against.
    pub fn schema(&self, id: NodeId) -> &Arc<Schema> { &self.nodes[id.0].schema }

    /// The datum's payload.
    pub fn value(&self, id: NodeId) -> &Value { &self.nodes[id.0].value }

    /// The exact number of bytes this datum occupies when packed.
    pub fn packsz(&self, id: NodeId) -> usize { self.nodes[id.0].packsz }

    /// The datum's parent, if it has been appended to a container.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> { self.nodes[id.0].parent }

    /// The ordered child handles; empty for scalar and string datums.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id.0].value {
            Fields { children, .. } => children,
            _ => &[],
        }
    }

    /// Bounds-checked child lookup.
    pub fn child(&self, id: NodeId, idx: usize) -> Option<NodeId> {
        self.children(id).get(idx).copied()
    }

    /// Structural equality: same tags, same values, same shape. `Double`
    /// payloads compare bitwise so NaNs round-trip.
    pub fn deep_eq(&self, a: NodeId, other: &Tree, b: NodeId) -> bool {
        let (da, db) = (&self.nodes[a.0], &other.nodes[b.0]);
        if da.schema.tag() != db.schema.tag() || da.packsz != db.packsz {
            return false;
        }
        match (&da.value, &db.value) {
            (Double(x), Double(y)) => x.to_bits() == y.to_bits(),
            (Fields { nbytes: na, children: ca }, Fields { nbytes: nb, children: cb }) => {
                na == nb
                    && ca.len() == cb.len()
                    && ca
                        .iter()
                        .zip(cb.iter())
                        .all(|(&x, &y)| self.deep_eq(x, other, y))
            }
            (x, y) => x == y,
        }
    }

    /// A recursive dump of the subtree rooted at `id`.
    pub fn display(&self, id: NodeId) -> Dump { Dump { tree: self, id } }

    fn fmt_at(&self, f: &mut fmt::Formatter, id: NodeId, lvl: usize) -> fmt::Result {
        let d = &self.nodes[id.0];
        let tag = d.schema.tag();
        match &d.value {
            Fields { children, .. } => {
                writeln!(f, "{:indent$}<datum tag={}>", "", tag, indent = lvl * 2)?;
                for &c in children {
                    self.fmt_at(f, c, lvl + 1)?;
                }
                Ok(())
            }
            Str(b) => writeln!(
                f,
                "{:indent$}<datum tag={} value={:?}>",
                "",
                tag,
                String::from_utf8_lossy(b),
                indent = lvl * 2
            ),
            v => {
                write!(f, "{:indent$}<datum tag={} value=", "", tag, indent = lvl * 2)?;
                match v {
                    U8(n) => write!(f, "{}", n)?,
                    I8(n) => write!(f, "{}", n)?,
                    U16(n) => write!(f, "{}", n)?,
                    I16(n) => write!(f, "{}", n)?,
                    U32(n) => write!(f, "{}", n)?,
                    I32(n) => write!(f, "{}", n)?,
                    U64(n) => write!(f, "{}", n)?,
                    I64(n) => write!(f, "{}", n)?,
                    Double(n) => write!(f, "{}", n)?,
                    Str(_) | Fields { .. } => {}
                }
                writeln!(f, ">")
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
/// Displays a subtree; created by [`Tree::display`].
pub struct Dump<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> fmt::Display for Dump<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { self.tree.fmt_at(f, self.id, 0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_packsz() {
        let mut tree = Tree::new();
        let u8_id = tree.make_u8(0xff);
        let i16_id = tree.make_i16(-1);
        let u32_id = tree.make_u32(7);
        let dbl_id = tree.make_double(2.5);
        assert_eq!(tree.packsz(u8_id), 2);
        assert_eq!(tree.packsz(i16_id), 3);
        assert_eq!(tree.packsz(u32_id), 5);
        assert_eq!(tree.packsz(dbl_id), 9);
    }

    #[test]
    fn str_packsz_and_overflow() {
        let mut tree = Tree::new();
        let id = tree.make_str(Tag::Str8, b"hello").unwrap();
        assert_eq!(tree.packsz(id), 1 + 1 + 5);

        let empty = tree.make_str(Tag::Str8, b"").unwrap();
        assert_eq!(tree.packsz(empty), 2);

        let long = vec![b'x'; 128];
        assert_eq!(
            tree.make_str(Tag::Str8, &long),
            Err(WireError::Overflow {
                tag: Tag::Str8,
                len: 128
            })
        );
        assert!(tree.make_str(Tag::Str16, &long).is_ok());
    }

    #[test]
    fn size_propagates_to_ancestors() {
        let mut inner_schema = Schema::make(Tag::Seq);
        Schema::add_field(&mut inner_schema, Schema::make(Tag::U8)).unwrap();
        let mut outer_schema = Schema::make(Tag::Struct);
        Schema::add_field(&mut outer_schema, inner_schema.clone()).unwrap();

        let mut tree = Tree::new();
        let outer = tree.make_container(&outer_schema).unwrap();
        let inner = tree.make_container(&inner_schema).unwrap();
        tree.add_child(outer, inner).unwrap();

        assert_eq!(tree.packsz(outer), 9 + 9);

        // growing the nested container must update the outer one too
        let leaf = tree.make_u8(1);
        tree.add_child(inner, leaf).unwrap();

        assert_eq!(tree.packsz(inner), 9 + 2);
        assert_eq!(tree.value(inner).nbytes(), Some(2));
        assert_eq!(tree.packsz(outer), 9 + 9 + 2);
        assert_eq!(tree.value(outer).nbytes(), Some(9 + 2));
    }

    #[test]
    fn child_lookup_is_bounds_checked() {
        let mut schema = Schema::make(Tag::Seq);
        Schema::add_field(&mut schema, Schema::make(Tag::U8)).unwrap();

        let mut tree = Tree::new();
        let root = tree.make_container(&schema).unwrap();
        let a = tree.make_u8(1);
        tree.add_child(root, a).unwrap();

        assert_eq!(tree.child(root, 0), Some(a));
        assert_eq!(tree.child(root, 1), None);
        assert_eq!(tree.parent(a), Some(root));
    }

    #[test]
    fn scalars_reject_children() {
        let mut tree = Tree::new();
        let n = tree.make_u8(1);
        let m = tree.make_u8(2);
        assert_eq!(
            tree.add_child(n, m),
            Err(WireError::NotContainer { tag: Tag::U8 })
        );
    }

    #[test]
    fn reserved_containers_rejected() {
        let schema = Schema::make(Tag::Dict);
        let mut tree = Tree::new();
        assert_eq!(
            tree.make_container(&schema),
            Err(WireError::Unsupported { tag: Tag::Dict })
        );
    }

    #[test]
    fn generic_make_checks_kinds() {
        let mut tree = Tree::new();
        let schema = Schema::make(Tag::U16);
        assert!(tree.make(&schema, Value::U16(9)).is_ok());
        assert_eq!(
            tree.make(&schema, Value::U8(9)),
            Err(WireError::ValueKind { tag: Tag::U16 })
        );
    }
}
