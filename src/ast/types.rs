//! Value types carried by expressions.
//!
//! A [`TypeSlot`] starts unset and can be written once. Writing goes through a
//! shared reference, so a pass that only borrows the tree can still record the
//! types it infers while every structural field stays read-only.
//!
//! An [`IntLiteral`] keeps an integer constant's digits as spelled in the dump,
//! so leading zeros and values of any size survive a round trip.

use std::fmt;

use once_cell::unsync::OnceCell;
use serde::{Serialize, Serializer};

use super::{NodeKind, NO_TYPE_KEYWORD};
use crate::diagnostics::{schema_violation, Result};

/// The digits of an integer constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IntLiteral(String);

impl IntLiteral {
    /// Wraps a non-empty run of ASCII digits.
    pub fn new(digits: impl Into<String>) -> Result<Self> {
        let digits = digits.into();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(schema_violation(
                NodeKind::IntConst,
                format!("'{digits}' is not a decimal integer"),
            ));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric value, or `None` if it does not fit in an `i64`.
    pub fn to_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl From<u64> for IntLiteral {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for IntLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inferred static type, or the unset sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StaticType {
    NoType,
    Named(String),
}

static UNSET: StaticType = StaticType::NoType;

impl StaticType {
    pub fn named(name: impl Into<String>) -> Self {
        StaticType::Named(name.into())
    }

    /// Canonical spelling: the type name, or `_no_type`.
    pub fn as_str(&self) -> &str {
        match self {
            StaticType::NoType => NO_TYPE_KEYWORD,
            StaticType::Named(name) => name,
        }
    }

}

impl fmt::Display for StaticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StaticType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            StaticType::NoType => serializer.serialize_none(),
            StaticType::Named(name) => serializer.serialize_some(name),
        }
    }
}

/// Write-once type annotation. A second write is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSlot(OnceCell<StaticType>);

impl TypeSlot {
    pub fn unset() -> Self {
        Self::default()
    }

    /// Reads the slot; an unwritten slot reads as [`StaticType::NoType`].
    pub fn get(&self) -> &StaticType {
        self.0.get().unwrap_or(&UNSET)
    }

    pub fn is_assigned(&self) -> bool {
        self.0.get().is_some()
    }

    /// Writes the slot. On a second write the rejected value is handed back.
    pub fn assign(&self, ty: StaticType) -> std::result::Result<(), StaticType> {
        self.0.set(ty)
    }
}

impl Serialize for TypeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.get().serialize(serializer)
    }
}
