//! Wire-format type tags.
//!
//! Every encoded value starts with a one-byte tag identifying its kind. The
//! first thirteen tags are the builtin scalar kinds; the remaining four are
//! the container kinds, of which [`Tag::Dict`] and [`Tag::Func`] are reserved
//! and rejected by the pack/unpack engines.

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use std::fmt;

/// Number of builtin (scalar and string) tags.
pub const BUILTIN_TAG_END: usize = 13;

#[repr(u8)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
/// A value kind discriminator.
///
/// The discriminants are the wire encoding and must not be reordered.
pub enum Tag {
    U8 = 0,
    I8 = 1,
    U16 = 2,
    I16 = 3,
    U32 = 4,
    I32 = 5,
    U64 = 6,
    I64 = 7,
    Double = 8,
    Str8 = 9,
    Str16 = 10,
    Str32 = 11,
    Str64 = 12,
    Struct = 13,
    Seq = 14,
    Dict = 15,
    Func = 16,
}

use Tag::*;

impl Tag {
    /// Decodes a tag byte, returning `None` for bytes outside the enumerated
    /// set.
    pub fn from_byte(byte: u8) -> Option<Tag> { Tag::from_u8(byte) }

    /// The tag byte for this kind.
    pub fn byte(self) -> u8 { self as u8 }

    /// Whether this tag names one of the interned builtin schemas.
    pub fn is_builtin(self) -> bool { (self as usize) < BUILTIN_TAG_END }

    /// Whether this tag names a container kind (including the reserved ones).
    pub fn is_container(self) -> bool {
        match self {
            Struct | Seq | Dict | Func => true,
            _ => false,
        }
    }

    /// Whether this tag names a length-prefixed string kind.
    pub fn is_str(self) -> bool {
        match self {
            Str8 | Str16 | Str32 | Str64 => true,
            _ => false,
        }
    }

    /// Width in bytes of the fixed part of the payload: the scalar itself,
    /// a string's length field, or a container's byte count.
    pub fn fixed_len(self) -> usize {
        match self {
            U8 | I8 | Str8 => 1,
            U16 | I16 | Str16 => 2,
            U32 | I32 | Str32 => 4,
            U64 | I64 | Double | Str64 => 8,
            Struct | Seq | Dict | Func => 8,
        }
    }

    /// The minimum encoded size for this tag: one tag byte plus the fixed
    /// part of the payload. Strings and containers grow past this.
    pub fn expect_size(self) -> usize { 1 + self.fixed_len() }

    /// The largest payload a string of this kind can carry. The length
    /// fields are signed on the wire, so the limit is the signed maximum of
    /// the field width.
    pub fn str_max(self) -> Option<usize> {
        match self {
            Str8 => Some(i8::max_value() as usize),
            Str16 => Some(i16::max_value() as usize),
            Str32 => Some(i32::max_value() as usize),
            Str64 => Some(i64::max_value() as usize),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            U8 => "u8",
            I8 => "i8",
            U16 => "u16",
            I16 => "i16",
            U32 => "u32",
            I32 => "i32",
            U64 => "u64",
            I64 => "i64",
            Double => "double",
            Str8 => "str8",
            Str16 => "str16",
            Str32 => "str32",
            Str64 => "str64",
            Struct => "struct",
            Seq => "seq",
            Dict => "dict",
            Func => "func",
        };
        f.write_str(name)
    }
}
