//! Type shapes understood by the codec.

use crate::error::{SuiError, SuiResult};
use crate::types::{SuiAddress, TypeTag};
use std::fmt;

/// The shape of a BCS value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BcsType {
    /// One byte, 0 or 1.
    Bool,
    /// Little-endian 8-bit unsigned integer.
    U8,
    /// Little-endian 16-bit unsigned integer.
    U16,
    /// Little-endian 32-bit unsigned integer.
    U32,
    /// Little-endian 64-bit unsigned integer.
    U64,
    /// Little-endian 128-bit unsigned integer.
    U128,
    /// Little-endian 256-bit unsigned integer.
    U256,
    /// A 32-byte address, no length prefix.
    Address,
    /// Exactly `n` bytes, no length prefix.
    FixedBytes(usize),
    /// Length-prefixed byte vector.
    Bytes,
    /// Length-prefixed UTF-8 string.
    String,
    /// Length-prefixed sequence of one element shape.
    Vector(Box<BcsType>),
    /// Optional value.
    Option(Box<BcsType>),
    /// Fixed sequence of heterogeneous shapes.
    Tuple(Vec<BcsType>),
    /// Named fields, encoded in declaration order.
    Struct(Vec<Field>),
    /// Variants, encoded as a ULEB128 index and an optional payload.
    Enum(Vec<Variant>),
    /// Reference to a type registered in the [`Registry`](super::Registry).
    Named(String),
}

/// A struct field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// Field name, used only when converting to and from JSON.
    pub name: String,
    /// Field shape.
    pub ty: BcsType,
}

/// An enum variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variant {
    /// Variant name.
    pub name: String,
    /// Payload shape, `None` for unit variants.
    pub ty: Option<BcsType>,
}

impl BcsType {
    /// `vector<T>`.
    pub fn vector(element: BcsType) -> Self {
        Self::Vector(Box::new(element))
    }

    /// `Option<T>`.
    pub fn option(inner: BcsType) -> Self {
        Self::Option(Box::new(inner))
    }

    /// A reference to a registered type.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// A struct from `(name, shape)` pairs.
    pub fn struct_of<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, BcsType)>,
        S: Into<String>,
    {
        Self::Struct(
            fields
                .into_iter()
                .map(|(name, ty)| Field {
                    name: name.into(),
                    ty,
                })
                .collect(),
        )
    }

    /// An enum from `(name, payload)` pairs, in discriminant order.
    pub fn enum_of<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<BcsType>)>,
        S: Into<String>,
    {
        Self::Enum(
            variants
                .into_iter()
                .map(|(name, ty)| Variant {
                    name: name.into(),
                    ty,
                })
                .collect(),
        )
    }

    /// Maps a Move type to the shape of its pure (non-object) encoding.
    ///
    /// Primitives, vectors, `0x1::string::String`, `0x1::ascii::String`,
    /// `0x1::option::Option<T>` and `0x2::object::ID` have pure
    /// encodings. Every other struct, and `signer`, do not.
    pub fn from_type_tag(tag: &TypeTag) -> SuiResult<Self> {
        Ok(match tag {
            TypeTag::Bool => Self::Bool,
            TypeTag::U8 => Self::U8,
            TypeTag::U16 => Self::U16,
            TypeTag::U32 => Self::U32,
            TypeTag::U64 => Self::U64,
            TypeTag::U128 => Self::U128,
            TypeTag::U256 => Self::U256,
            TypeTag::Address => Self::Address,
            TypeTag::Vector(inner) => Self::vector(Self::from_type_tag(inner)?),
            TypeTag::Signer => {
                return Err(SuiError::UnknownArgumentType(
                    "signer has no pure encoding".to_string(),
                ))
            }
            TypeTag::Struct(tag) => {
                if tag.is(SuiAddress::ONE, "string", "String")
                    || tag.is(SuiAddress::ONE, "ascii", "String")
                {
                    Self::String
                } else if tag.is(SuiAddress::TWO, "object", "ID") {
                    Self::Address
                } else if tag.is(SuiAddress::ONE, "option", "Option") {
                    match tag.type_params.as_slice() {
                        [inner] => Self::option(Self::from_type_tag(inner)?),
                        _ => {
                            return Err(SuiError::InvalidTypeTag(format!(
                                "{tag} must have exactly one type parameter"
                            )))
                        }
                    }
                } else {
                    return Err(SuiError::UnknownArgumentType(format!(
                        "{tag} has no pure encoding"
                    )));
                }
            }
        })
    }

    /// Parses a Move type string into a pure encoding shape.
    ///
    /// ```rust
    /// use sui_tx_builder::codec::BcsType;
    ///
    /// assert_eq!(
    ///     BcsType::parse("vector<address>").unwrap(),
    ///     BcsType::vector(BcsType::Address)
    /// );
    /// ```
    pub fn parse(type_str: &str) -> SuiResult<Self> {
        Self::from_type_tag(&TypeTag::from_str_strict(type_str)?)
    }
}

impl fmt::Display for BcsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::U128 => write!(f, "u128"),
            Self::U256 => write!(f, "u256"),
            Self::Address => write!(f, "address"),
            Self::FixedBytes(n) => write!(f, "bytes[{n}]"),
            Self::Bytes => write!(f, "bytes"),
            Self::String => write!(f, "string"),
            Self::Vector(inner) => write!(f, "vector<{inner}>"),
            Self::Option(inner) => write!(f, "option<{inner}>"),
            Self::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Self::Struct(_) => write!(f, "struct"),
            Self::Enum(_) => write!(f, "enum"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}
