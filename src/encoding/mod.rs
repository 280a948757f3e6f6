//! Binary pack, unpack, and scan engines.
//!
//! [`pack`] serializes a value tree into the tagged wire format per the
//! sizes recorded on the tree; [`unpack`] parses a buffer back into a tree
//! under a known schema with bounds checks at every step; [`scan`] walks a
//! buffer with no schema at all, using the embedded tag bytes.
//!
//! # Example
//!
//! ```
//! use tson::prelude::*;
//!
//! let mut schema = Schema::make(Tag::Seq);
//! Schema::add_field(&mut schema, Schema::make(Tag::Str8)).unwrap();
//!
//! let mut tree = Tree::new();
//! let root = tree.make_container(&schema).unwrap();
//! let elt = tree.make_str(Tag::Str8, b"hello").unwrap();
//! tree.add_child(root, elt).unwrap();
//!
//! let buf = pack_full(&tree, root).unwrap();
//! let (out, dec) = unpack_full(&schema, &buf).unwrap();
//!
//! assert!(tree.deep_eq(root, &out, dec));
//! ```

pub mod de;
pub mod scan;
pub mod ser;

pub use de::{unpack, unpack_full};
pub use scan::scan;
pub use ser::{pack, pack_datum, pack_full, Serializer, SerializerExt};
