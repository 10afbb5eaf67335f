//! Move type system representations.
//!
//! This module provides Rust types that mirror the Move type system as Sui
//! encodes it: identifiers, struct tags, type tags and move call targets.
//!
//! # Security
//!
//! All parsing functions enforce length limits to prevent denial-of-service
//! attacks via excessive memory allocation or CPU usage.

use crate::error::{SuiError, SuiResult};
use crate::types::SuiAddress;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Maximum length for type tag strings.
const MAX_TYPE_TAG_LENGTH: usize = 1024;

/// Maximum length for identifier strings.
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Maximum depth for nested type arguments (e.g., vector<vector<vector<...>>>).
const MAX_TYPE_NESTING_DEPTH: usize = 8;

/// An identifier in Move (module name, function name, etc.).
///
/// Identifiers must start with a letter or underscore and contain
/// only alphanumeric characters and underscores.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Creates a new identifier, validating the format.
    pub fn new(s: impl Into<String>) -> SuiResult<Self> {
        let s = s.into();
        if s.len() > MAX_IDENTIFIER_LENGTH {
            return Err(SuiError::InvalidTypeTag(format!(
                "identifier too long: {} bytes (max {})",
                s.len(),
                MAX_IDENTIFIER_LENGTH
            )));
        }
        let Some(first) = s.chars().next() else {
            return Err(SuiError::InvalidTypeTag(
                "identifier cannot be empty".into(),
            ));
        };

        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(SuiError::InvalidTypeTag(format!(
                "identifier must start with letter or underscore: {s}"
            )));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(SuiError::InvalidTypeTag(format!(
                "identifier contains invalid characters: {s}"
            )));
        }
        Ok(Self(s))
    }

    /// Creates an identifier without validation (for well-known names).
    pub(crate) fn from_static(s: &'static str) -> Self {
        Self(s.to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = SuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A struct tag identifies a specific struct type in Move.
///
/// Format: `address::module::StructName<TypeArg1, TypeArg2, ...>`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructTag {
    /// The address where the module is published.
    pub address: SuiAddress,
    /// The module name.
    pub module: Identifier,
    /// The struct name.
    pub name: Identifier,
    /// Type arguments (for generic structs).
    #[serde(default)]
    pub type_params: Vec<TypeTag>,
}

impl StructTag {
    /// Creates a new struct tag.
    pub fn new(
        address: SuiAddress,
        module: Identifier,
        name: Identifier,
        type_params: Vec<TypeTag>,
    ) -> Self {
        Self {
            address,
            module,
            name,
            type_params,
        }
    }

    /// The native coin struct tag (`0x2::sui::SUI`).
    pub fn sui() -> Self {
        Self {
            address: SuiAddress::TWO,
            module: Identifier::from_static("sui"),
            name: Identifier::from_static("SUI"),
            type_params: vec![],
        }
    }

    /// Returns true if this tag names `address::module::name`, ignoring type parameters.
    pub fn is(&self, address: SuiAddress, module: &str, name: &str) -> bool {
        self.address == address && self.module.as_str() == module && self.name.as_str() == name
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}",
            self.address.to_short_string(),
            self.module,
            self.name
        )?;
        if !self.type_params.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.type_params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// A type tag represents a Move type.
///
/// Variant indices follow the Sui wire format:
/// - 0: Bool
/// - 1: U8
/// - 2: U64
/// - 3: U128
/// - 4: Address
/// - 5: Signer
/// - 6: Vector
/// - 7: Struct
/// - 8: U16
/// - 9: U32
/// - 10: U256
///
/// Binary serializers see the enum; human-readable serializers see the
/// canonical string form (`vector<0x2::sui::SUI>`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Boolean type (variant 0)
    Bool,
    /// 8-bit unsigned integer (variant 1)
    U8,
    /// 64-bit unsigned integer (variant 2)
    U64,
    /// 128-bit unsigned integer (variant 3)
    U128,
    /// Address type (variant 4)
    Address,
    /// Signer type (variant 5)
    Signer,
    /// Vector type with element type (variant 6)
    Vector(Box<TypeTag>),
    /// Struct type (variant 7)
    Struct(Box<StructTag>),
    /// 16-bit unsigned integer (variant 8)
    U16,
    /// 32-bit unsigned integer (variant 9)
    U32,
    /// 256-bit unsigned integer (variant 10)
    U256,
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "TypeTag", rename_all = "lowercase")]
enum TypeTagWire {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

impl Serialize for TypeTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            TypeTagWire::serialize(self, serializer)
        }
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_str_strict(&s).map_err(serde::de::Error::custom)
        } else {
            TypeTagWire::deserialize(deserializer)
        }
    }
}

impl TypeTag {
    /// Creates a vector type tag with the given element type.
    pub fn vector(element: TypeTag) -> Self {
        Self::Vector(Box::new(element))
    }

    /// Creates a struct type tag.
    pub fn struct_tag(tag: StructTag) -> Self {
        Self::Struct(Box::new(tag))
    }

    /// Returns the native coin type tag (`0x2::sui::SUI`).
    pub fn sui() -> Self {
        Self::Struct(Box::new(StructTag::sui()))
    }

    /// Parses a type tag from a string.
    ///
    /// Supports:
    /// - Primitive types: bool, u8, u16, u32, u64, u128, u256, address, signer
    /// - Struct types: `address::module::StructName`
    /// - Vector types: vector<`element_type`>
    /// - Generic struct types: `address::module::StructName`<`TypeArg1`, `TypeArg2`>
    ///
    /// # Example
    ///
    /// ```rust
    /// use sui_tx_builder::TypeTag;
    ///
    /// let tag = TypeTag::from_str_strict("0x2::coin::Coin<0x2::sui::SUI>").unwrap();
    /// assert_eq!(tag.to_string(), "0x2::coin::Coin<0x2::sui::SUI>");
    /// ```
    pub fn from_str_strict(s: &str) -> SuiResult<Self> {
        let s = s.trim();

        if s.len() > MAX_TYPE_TAG_LENGTH {
            return Err(SuiError::InvalidTypeTag(format!(
                "type tag too long: {} bytes (max {})",
                s.len(),
                MAX_TYPE_TAG_LENGTH
            )));
        }

        Self::parse_type_tag_with_depth(s, 0)
    }

    fn parse_type_tag_with_depth(s: &str, depth: usize) -> SuiResult<Self> {
        if depth > MAX_TYPE_NESTING_DEPTH {
            return Err(SuiError::InvalidTypeTag(format!(
                "type tag nesting too deep: {depth} levels (max {MAX_TYPE_NESTING_DEPTH})"
            )));
        }

        match s {
            "bool" => return Ok(TypeTag::Bool),
            "u8" => return Ok(TypeTag::U8),
            "u16" => return Ok(TypeTag::U16),
            "u32" => return Ok(TypeTag::U32),
            "u64" => return Ok(TypeTag::U64),
            "u128" => return Ok(TypeTag::U128),
            "u256" => return Ok(TypeTag::U256),
            "address" => return Ok(TypeTag::Address),
            "signer" => return Ok(TypeTag::Signer),
            _ => {}
        }

        if s.starts_with("vector<") && s.ends_with('>') {
            let inner = s[7..s.len() - 1].trim();
            let inner_tag = Self::parse_type_tag_with_depth(inner, depth + 1)?;
            return Ok(TypeTag::Vector(Box::new(inner_tag)));
        }

        Self::parse_struct_type_with_depth(s, depth)
    }

    fn parse_struct_type_with_depth(s: &str, depth: usize) -> SuiResult<Self> {
        let generic_start = s.find('<');

        let (base, type_args_str) = if let Some(idx) = generic_start {
            if !s.ends_with('>') {
                return Err(SuiError::InvalidTypeTag(format!(
                    "malformed generic type: {s}"
                )));
            }
            (&s[..idx], Some(&s[idx + 1..s.len() - 1]))
        } else {
            (s, None)
        };

        let parts: Vec<&str> = base.split("::").collect();
        if parts.len() != 3 {
            return Err(SuiError::InvalidTypeTag(format!(
                "invalid struct type format (expected address::module::name): {s}"
            )));
        }

        let address = SuiAddress::from_str(parts[0].trim())?;
        let module = Identifier::new(parts[1].trim())?;
        let name = Identifier::new(parts[2].trim())?;

        let type_params = if let Some(args_str) = type_args_str {
            Self::parse_type_args_with_depth(args_str, depth)?
        } else {
            vec![]
        };

        Ok(TypeTag::Struct(Box::new(StructTag {
            address,
            module,
            name,
            type_params,
        })))
    }

    fn parse_type_args_with_depth(s: &str, depth: usize) -> SuiResult<Vec<TypeTag>> {
        if s.trim().is_empty() {
            return Ok(vec![]);
        }

        let mut result = Vec::new();
        let mut bracket_depth = 0i32;
        let mut start = 0;

        for (i, c) in s.char_indices() {
            match c {
                '<' => bracket_depth += 1,
                '>' => bracket_depth -= 1,
                ',' if bracket_depth == 0 => {
                    let arg = s[start..i].trim();
                    if !arg.is_empty() {
                        result.push(Self::parse_type_tag_with_depth(arg, depth + 1)?);
                    }
                    start = i + 1;
                }
                _ => {}
            }
        }

        if bracket_depth != 0 {
            return Err(SuiError::InvalidTypeTag(format!(
                "unbalanced angle brackets: {s}"
            )));
        }

        let last_arg = s[start..].trim();
        if !last_arg.is_empty() {
            result.push(Self::parse_type_tag_with_depth(last_arg, depth + 1)?);
        }

        Ok(result)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::U8 => write!(f, "u8"),
            TypeTag::U16 => write!(f, "u16"),
            TypeTag::U32 => write!(f, "u32"),
            TypeTag::U64 => write!(f, "u64"),
            TypeTag::U128 => write!(f, "u128"),
            TypeTag::U256 => write!(f, "u256"),
            TypeTag::Address => write!(f, "address"),
            TypeTag::Signer => write!(f, "signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{inner}>"),
            TypeTag::Struct(tag) => write!(f, "{tag}"),
        }
    }
}

impl FromStr for TypeTag {
    type Err = SuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_strict(s)
    }
}

/// A move call target (`package::module::function`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MoveCallTarget {
    /// The package containing the module.
    pub package: SuiAddress,
    /// The module name.
    pub module: Identifier,
    /// The function name.
    pub function: Identifier,
}

impl MoveCallTarget {
    /// Parses a target from a string (e.g., "`0x2::coin::zero`").
    ///
    /// The string must have exactly three `::`-separated components.
    pub fn from_str_strict(s: &str) -> SuiResult<Self> {
        let parts: Vec<&str> = s.split("::").collect();
        if parts.len() != 3 {
            return Err(SuiError::InvalidTypeTag(format!(
                "invalid move call target (expected package::module::function): {s}"
            )));
        }
        Ok(Self {
            package: SuiAddress::from_str(parts[0])?,
            module: Identifier::new(parts[1])?,
            function: Identifier::new(parts[2])?,
        })
    }
}

impl fmt::Display for MoveCallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}",
            self.package.to_short_string(),
            self.module,
            self.function
        )
    }
}

impl FromStr for MoveCallTarget {
    type Err = SuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_strict(s)
    }
}
