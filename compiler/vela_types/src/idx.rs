//! Type handle.
//!
//! Every type lives in the [`Pool`](crate::Pool) and is referred to by a
//! 32-bit [`Idx`]. Basic types occupy fixed indices so they can be named
//! without a pool; everything else is allocated from [`Idx::FIRST_DYNAMIC`].
//!
//! Equality of handles is type identity. For declaration-site types
//! (defined types, aliases, standards, type parameters) and memoized
//! specializations this is exactly the identity the checker relies on.

use std::fmt;

use crate::BasicKind;

/// A 32-bit index into the type pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    // === Basic types (indices 0-22) ===
    pub const BOOL: Self = Self(0);
    pub const I8: Self = Self(1);
    pub const I16: Self = Self(2);
    pub const I32: Self = Self(3);
    pub const I64: Self = Self(4);
    pub const U8: Self = Self(5);
    pub const U16: Self = Self(6);
    pub const U32: Self = Self(7);
    pub const U64: Self = Self(8);
    /// Pointer-width signed integer.
    pub const INT: Self = Self(9);
    /// Pointer-width unsigned integer.
    pub const UINT: Self = Self(10);
    /// 32-bit floating point.
    pub const FLOAT: Self = Self(11);
    /// 64-bit floating point.
    pub const DOUBLE: Self = Self(12);
    pub const STRING: Self = Self(13);
    pub const CHAR: Self = Self(14);
    pub const BYTE: Self = Self(15);
    pub const VOID: Self = Self(16);
    /// Top type: every value is accepted where `any` is expected.
    pub const ANY: Self = Self(17);
    /// Marker for a type that failed to resolve. Validates against anything
    /// so one error does not cascade.
    pub const UNRESOLVED: Self = Self(18);
    /// Marker for an un-annotated `let`; takes the provided type.
    pub const PLACEHOLDER: Self = Self(19);
    pub const INT_LITERAL: Self = Self(20);
    pub const FLOAT_LITERAL: Self = Self(21);
    pub const NIL_LITERAL: Self = Self(22);

    /// Number of pre-interned basic types.
    pub const BASIC_COUNT: u32 = 23;

    /// First index for dynamically allocated types.
    pub const FIRST_DYNAMIC: u32 = 32;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check if this is one of the fixed basic indices.
    #[inline]
    pub const fn is_basic(self) -> bool {
        self.0 < Self::BASIC_COUNT
    }

    /// Integer, float or nil literal marker.
    #[inline]
    pub const fn is_literal(self) -> bool {
        self.0 >= Self::INT_LITERAL.0 && self.0 <= Self::NIL_LITERAL.0
    }

    /// The basic kind for fixed indices.
    pub fn basic_kind(self) -> Option<BasicKind> {
        BasicKind::ALL.get(self.index()).copied()
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.basic_kind() {
            Some(kind) => write!(f, "Idx::{}", kind.name()),
            None => write!(f, "Idx({})", self.0),
        }
    }
}

// Idx must stay exactly 4 bytes.
const _: () = assert!(std::mem::size_of::<Idx>() == 4);
