//! Dynamic values encoded and decoded by the registry.

use crate::types::SuiAddress;
use num_bigint::BigUint;

/// A dynamically typed BCS value.
///
/// Values carry no schema of their own; the [`BcsType`](super::BcsType)
/// they are encoded with decides the wire form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// `bool`
    Bool(bool),
    /// `u8`
    U8(u8),
    /// `u16`
    U16(u16),
    /// `u32`
    U32(u32),
    /// `u64`
    U64(u64),
    /// `u128`
    U128(u128),
    /// `u256`
    U256(BigUint),
    /// A 32-byte address.
    Address(SuiAddress),
    /// Raw bytes, for fixed and length-prefixed byte shapes and `vector<u8>`.
    ///
    /// Decoding and JSON conversion always produce this form for
    /// `vector<u8>`; encoding also accepts a [`Value::Vector`] of `U8`.
    Bytes(Vec<u8>),
    /// A UTF-8 string.
    String(String),
    /// A sequence of values.
    Vector(Vec<Value>),
    /// An optional value.
    Option(Option<Box<Value>>),
    /// A tuple.
    Tuple(Vec<Value>),
    /// Struct fields by name, in declaration order.
    Struct(Vec<(String, Value)>),
    /// An enum variant with its payload.
    Enum {
        /// Variant name.
        variant: String,
        /// Payload, `None` for unit variants.
        payload: Option<Box<Value>>,
    },
}

impl Value {
    /// A unit enum variant.
    pub fn unit_variant(variant: impl Into<String>) -> Self {
        Self::Enum {
            variant: variant.into(),
            payload: None,
        }
    }

    /// An enum variant carrying `payload`.
    pub fn variant(variant: impl Into<String>, payload: Value) -> Self {
        Self::Enum {
            variant: variant.into(),
            payload: Some(Box::new(payload)),
        }
    }

    /// A struct from `(name, value)` pairs.
    pub fn struct_of<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Self::Struct(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    /// Looks up a struct field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Short description of the value's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::U128(_) => "u128",
            Self::U256(_) => "u256",
            Self::Address(_) => "address",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Vector(_) => "vector",
            Self::Option(_) => "option",
            Self::Tuple(_) => "tuple",
            Self::Struct(_) => "struct",
            Self::Enum { .. } => "enum",
        }
    }
}
