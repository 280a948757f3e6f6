//! Schema nodes describing the expected shape of a value tree.
//!
//! Builtin scalar schemas are process-wide singletons interned in a table
//! built on first use; [`Schema::make`] hands out clones of the interned
//! handles. Container schemas are freshly allocated and composed with
//! [`Schema::add_field`], which only works while the handle is unique:
//! once a schema is referenced by another schema or by a datum it is
//! read-only.
//!
//! # Example
//!
//! ```
//! use tson::prelude::*;
//!
//! let mut point = Schema::make(Tag::Struct);
//! Schema::add_field(&mut point, Schema::make(Tag::I32)).unwrap();
//! Schema::add_field(&mut point, Schema::make(Tag::I32)).unwrap();
//!
//! assert_eq!(point.fields().len(), 2);
//! ```

use crate::{
    errors::WireError,
    tag::Tag,
};
use once_cell::sync::Lazy;
use std::{fmt, sync::Arc};

static BUILTIN_SCHEMAS: Lazy<Vec<Arc<Schema>>> = Lazy::new(|| {
    use Tag::*;
    [
        U8, I8, U16, I16, U32, I32, U64, I64, Double, Str8, Str16, Str32, Str64,
    ]
    .iter()
    .map(|&tag| {
        Arc::new(Schema {
            tag,
            name: None,
            fields: Vec::new(),
        })
    })
    .collect()
});

#[derive(Debug, Clone, PartialEq, Eq)]
/// A description of an expected value shape.
///
/// Scalar schemas carry only their tag. Container schemas additionally carry
/// an ordered list of child schemas: the declared members for
/// [`Tag::Struct`], and exactly one element schema for [`Tag::Seq`].
pub struct Schema {
    tag: Tag,
    name: Option<String>,
    fields: Vec<Arc<Schema>>,
}

impl Schema {
    /// Returns the interned singleton for builtin tags, or a fresh container
    /// schema with an empty field list otherwise.
    pub fn make(tag: Tag) -> Arc<Schema> {
        if tag.is_builtin() {
            BUILTIN_SCHEMAS[tag as usize].clone()
        } else {
            Arc::new(Schema {
                tag,
                name: None,
                fields: Vec::new(),
            })
        }
    }

    /// The tag this schema describes.
    pub fn tag(&self) -> Tag { self.tag }

    /// The member name, if one was set.
    pub fn name(&self) -> Option<&str> { self.name.as_ref().map(|s| s.as_str()) }

    /// The ordered child schemas.
    pub fn fields(&self) -> &[Arc<Schema>] { &self.fields }

    /// Bounds-checked child schema lookup.
    pub fn field(&self, idx: usize) -> Option<&Arc<Schema>> { self.fields.get(idx) }

    /// Appends `field` to `schema`'s ordered child list. The child is shared
    /// by reference, not copied.
    ///
    /// # Errors
    ///
    /// Fails if `schema` is not a container kind, or if the handle is no
    /// longer unique (builtin singletons and schemas already referenced
    /// elsewhere cannot be extended).
    pub fn add_field(schema: &mut Arc<Schema>, field: Arc<Schema>) -> Result<(), WireError> {
        if !schema.tag.is_container() {
            return Err(WireError::NotContainer { tag: schema.tag });
        }
        match Arc::get_mut(schema) {
            Some(s) => {
                s.fields.push(field);
                Ok(())
            }
            None => Err(WireError::SharedSchema),
        }
    }

    /// Names this schema, for structure members.
    ///
    /// # Errors
    ///
    /// Fails on shared handles, like [`Schema::add_field`].
    pub fn set_name(schema: &mut Arc<Schema>, name: &str) -> Result<(), WireError> {
        match Arc::get_mut(schema) {
            Some(s) => {
                s.name = Some(name.to_string());
                Ok(())
            }
            None => Err(WireError::SharedSchema),
        }
    }

    fn fmt_at(&self, f: &mut fmt::Formatter, lvl: usize) -> fmt::Result {
        match &self.name {
            Some(name) => writeln!(
                f,
                "{:indent$}<schema tag={} name={}>",
                "",
                self.tag,
                name,
                indent = lvl * 2
            )?,
            None => writeln!(f, "{:indent$}<schema tag={}>", "", self.tag, indent = lvl * 2)?,
        }
        for field in &self.fields {
            field.fmt_at(f, lvl + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { self.fmt_at(f, 0) }
}
