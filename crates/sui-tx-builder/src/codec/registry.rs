//! Named type registry with dynamic encode/decode.

use super::schema::{BcsType, Field, Variant};
use super::value::Value;
use super::{MAX_SEQUENCE_LENGTH, Reader, write_uleb128};
use crate::error::{SuiError, SuiResult};
use crate::types::{Identifier, MoveCallTarget, StructTag, SuiAddress, TypeTag};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use num_bigint::BigUint;
use once_cell::sync::Lazy;
use serde_json::{Map, Value as Json};
use std::collections::HashMap;
use std::str::FromStr;

/// Maximum nesting of values the codec will walk.
const MAX_VALUE_DEPTH: usize = 128;

/// Maximum chain of `Named` aliases followed to reach a shape.
const MAX_ALIAS_DEPTH: usize = 32;

/// Field names of the ergonomic move call form.
const TARGET: &str = "target";
const TYPE_ARGUMENTS: &str = "typeArguments";
const ARGUMENTS: &str = "arguments";

/// Field names of `kind`-tagged tuple payloads, in positional order.
const TUPLE_FIELD_ORDER: &[&str] = &["index", "resultIndex"];

/// A transformation applied around the structural encoding of a named type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CustomCodec {
    /// `ProgrammableMoveCall`: exposes `{ target, typeArguments, arguments }`
    /// while encoding `(package, module, function, typeArguments, arguments)`.
    /// Targets must have exactly three `::` components.
    MoveCallTarget,
    /// `TypeTag`: accepts and renders the canonical type string in JSON.
    TypeTagString,
}

impl CustomCodec {
    /// Converts an ergonomic value into its structural form.
    ///
    /// Returns `None` when the value is already structural.
    fn to_structural(self, value: &Value) -> SuiResult<Option<Value>> {
        match self {
            Self::MoveCallTarget => {
                let Some(target) = value.field(TARGET) else {
                    return Ok(None);
                };
                let Value::String(target) = target else {
                    return Err(SuiError::malformed("move call target must be a string"));
                };
                let target = MoveCallTarget::from_str_strict(target)
                    .map_err(|e| SuiError::malformed(e.to_string()))?;
                Ok(Some(Value::struct_of([
                    ("package", Value::Address(target.package)),
                    ("module", Value::String(target.module.to_string())),
                    ("function", Value::String(target.function.to_string())),
                    (
                        TYPE_ARGUMENTS,
                        value
                            .field(TYPE_ARGUMENTS)
                            .cloned()
                            .unwrap_or(Value::Vector(vec![])),
                    ),
                    (
                        ARGUMENTS,
                        value
                            .field(ARGUMENTS)
                            .cloned()
                            .unwrap_or(Value::Vector(vec![])),
                    ),
                ])))
            }
            Self::TypeTagString => Ok(None),
        }
    }

    /// Converts a freshly decoded structural value into its ergonomic form.
    fn from_structural(self, value: Value) -> SuiResult<Value> {
        match self {
            Self::MoveCallTarget => {
                let (Some(Value::Address(package)), Some(Value::String(module)), Some(Value::String(function))) = (
                    value.field("package"),
                    value.field("module"),
                    value.field("function"),
                ) else {
                    return Err(SuiError::malformed("move call is missing its target fields"));
                };
                let target = format!("{}::{}::{}", package.to_short_string(), module, function);
                let type_arguments = value
                    .field(TYPE_ARGUMENTS)
                    .cloned()
                    .unwrap_or(Value::Vector(vec![]));
                let arguments = value
                    .field(ARGUMENTS)
                    .cloned()
                    .unwrap_or(Value::Vector(vec![]));
                Ok(Value::struct_of([
                    (TARGET, Value::String(target)),
                    (TYPE_ARGUMENTS, type_arguments),
                    (ARGUMENTS, arguments),
                ]))
            }
            Self::TypeTagString => Ok(value),
        }
    }

    /// Shape of the ergonomic form, when it differs from the structural one.
    fn ergonomic_shape(self) -> Option<BcsType> {
        match self {
            Self::MoveCallTarget => Some(BcsType::struct_of([
                (TARGET, BcsType::String),
                (TYPE_ARGUMENTS, BcsType::vector(BcsType::named("TypeTag"))),
                (ARGUMENTS, BcsType::vector(BcsType::named("Argument"))),
            ])),
            Self::TypeTagString => None,
        }
    }
}

#[derive(Clone, Debug)]
struct Entry {
    shape: BcsType,
    custom: Option<CustomCodec>,
}

/// A registry of named BCS shapes.
///
/// [`Registry::sui`] comes pre-populated with every transaction wire type;
/// its encoding is byte-identical to the typed encoding of
/// [`TransactionData`](crate::transaction::TransactionData) and friends.
///
/// # Example
///
/// ```rust
/// use sui_tx_builder::codec::{registry, Value};
///
/// let bytes = registry()
///     .encode("Argument", &Value::variant("NestedResult", Value::Tuple(vec![Value::U16(1), Value::U16(2)])))
///     .unwrap();
/// assert_eq!(bytes, vec![3, 1, 0, 2, 0]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Registry {
    types: HashMap<String, Entry>,
}

/// The shared pre-populated registry.
pub fn registry() -> &'static Registry {
    static REGISTRY: Lazy<Registry> = Lazy::new(Registry::sui);
    &REGISTRY
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every transaction wire type.
    pub fn sui() -> Self {
        let mut registry = Self::new();
        let argument = || BcsType::named("Argument");
        let arguments = || BcsType::vector(BcsType::named("Argument"));
        let addresses = || BcsType::vector(BcsType::Address);
        let modules = || BcsType::vector(BcsType::Bytes);

        registry.register("Address", BcsType::Address);
        registry.register("ObjectDigest", BcsType::Bytes);
        registry.register(
            "SuiObjectRef",
            BcsType::struct_of([
                ("objectId", BcsType::Address),
                ("version", BcsType::U64),
                ("digest", BcsType::named("ObjectDigest")),
            ]),
        );
        registry.register(
            "SharedObjectRef",
            BcsType::struct_of([
                ("objectId", BcsType::Address),
                ("initialSharedVersion", BcsType::U64),
                ("mutable", BcsType::Bool),
            ]),
        );
        registry.register(
            "ObjectArg",
            BcsType::enum_of([
                ("ImmOrOwnedObject", Some(BcsType::named("SuiObjectRef"))),
                ("SharedObject", Some(BcsType::named("SharedObjectRef"))),
                ("Receiving", Some(BcsType::named("SuiObjectRef"))),
            ]),
        );
        registry.register(
            "CallArg",
            BcsType::enum_of([
                ("Pure", Some(BcsType::Bytes)),
                ("Object", Some(BcsType::named("ObjectArg"))),
            ]),
        );
        registry.register_custom(
            "TypeTag",
            BcsType::enum_of([
                ("bool", None),
                ("u8", None),
                ("u64", None),
                ("u128", None),
                ("address", None),
                ("signer", None),
                ("vector", Some(BcsType::named("TypeTag"))),
                ("struct", Some(BcsType::named("StructTag"))),
                ("u16", None),
                ("u32", None),
                ("u256", None),
            ]),
            CustomCodec::TypeTagString,
        );
        registry.register(
            "StructTag",
            BcsType::struct_of([
                ("address", BcsType::Address),
                ("module", BcsType::String),
                ("name", BcsType::String),
                ("typeParams", BcsType::vector(BcsType::named("TypeTag"))),
            ]),
        );
        registry.register(
            "Argument",
            BcsType::enum_of([
                ("GasCoin", None),
                ("Input", Some(BcsType::U16)),
                ("Result", Some(BcsType::U16)),
                (
                    "NestedResult",
                    Some(BcsType::Tuple(vec![BcsType::U16, BcsType::U16])),
                ),
            ]),
        );
        registry.register_custom(
            "ProgrammableMoveCall",
            BcsType::struct_of([
                ("package", BcsType::Address),
                ("module", BcsType::String),
                ("function", BcsType::String),
                (TYPE_ARGUMENTS, BcsType::vector(BcsType::named("TypeTag"))),
                (ARGUMENTS, arguments()),
            ]),
            CustomCodec::MoveCallTarget,
        );
        registry.register(
            "Command",
            BcsType::enum_of([
                ("MoveCall", Some(BcsType::named("ProgrammableMoveCall"))),
                (
                    "TransferObjects",
                    Some(BcsType::struct_of([
                        ("objects", arguments()),
                        ("address", argument()),
                    ])),
                ),
                (
                    "SplitCoins",
                    Some(BcsType::struct_of([
                        ("coin", argument()),
                        ("amounts", arguments()),
                    ])),
                ),
                (
                    "MergeCoins",
                    Some(BcsType::struct_of([
                        ("destination", argument()),
                        ("sources", arguments()),
                    ])),
                ),
                (
                    "Publish",
                    Some(BcsType::struct_of([
                        ("modules", modules()),
                        ("dependencies", addresses()),
                    ])),
                ),
                (
                    "MakeMoveVec",
                    Some(BcsType::struct_of([
                        ("type", BcsType::option(BcsType::named("TypeTag"))),
                        ("elements", arguments()),
                    ])),
                ),
                (
                    "Upgrade",
                    Some(BcsType::struct_of([
                        ("modules", modules()),
                        ("dependencies", addresses()),
                        ("package", BcsType::Address),
                        ("ticket", argument()),
                    ])),
                ),
            ]),
        );
        registry.register(
            "ProgrammableTransaction",
            BcsType::struct_of([
                ("inputs", BcsType::vector(BcsType::named("CallArg"))),
                ("commands", BcsType::vector(BcsType::named("Command"))),
            ]),
        );
        registry.register(
            "TransactionKind",
            BcsType::enum_of([(
                "ProgrammableTransaction",
                Some(BcsType::named("ProgrammableTransaction")),
            )]),
        );
        registry.register(
            "TransactionExpiration",
            BcsType::enum_of([("None", None), ("Epoch", Some(BcsType::U64))]),
        );
        registry.register(
            "GasData",
            BcsType::struct_of([
                ("payment", BcsType::vector(BcsType::named("SuiObjectRef"))),
                ("owner", BcsType::Address),
                ("price", BcsType::U64),
                ("budget", BcsType::U64),
            ]),
        );
        registry.register(
            "TransactionDataV1",
            BcsType::struct_of([
                ("kind", BcsType::named("TransactionKind")),
                ("sender", BcsType::Address),
                ("gasData", BcsType::named("GasData")),
                ("expiration", BcsType::named("TransactionExpiration")),
            ]),
        );
        registry.register(
            "TransactionData",
            BcsType::enum_of([("V1", Some(BcsType::named("TransactionDataV1")))]),
        );
        registry
    }

    /// Registers (or replaces) a named shape.
    pub fn register(&mut self, name: impl Into<String>, shape: BcsType) {
        self.types.insert(
            name.into(),
            Entry {
                shape,
                custom: None,
            },
        );
    }

    /// Registers (or replaces) a named shape with a custom codec.
    pub fn register_custom(&mut self, name: impl Into<String>, shape: BcsType, codec: CustomCodec) {
        self.types.insert(
            name.into(),
            Entry {
                shape,
                custom: Some(codec),
            },
        );
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Returns the structural shape registered under `name`.
    pub fn shape(&self, name: &str) -> Option<&BcsType> {
        self.types.get(name).map(|entry| &entry.shape)
    }

    /// Names of all registered types, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Encodes `value` as the registered type `name`.
    pub fn encode(&self, name: &str, value: &Value) -> SuiResult<Vec<u8>> {
        self.check_named(name)?;
        let mut buf = Vec::new();
        self.write_named(&mut buf, name, value, 0)?;
        Ok(buf)
    }

    /// Decodes `bytes` as the registered type `name`, rejecting trailing bytes.
    pub fn decode(&self, name: &str, bytes: &[u8]) -> SuiResult<Value> {
        self.check_named(name)?;
        let mut reader = Reader::new(bytes);
        let value = self.read_named(&mut reader, name, 0)?;
        reader.finish()?;
        Ok(value)
    }

    /// Encodes `value` with an anonymous shape.
    pub fn encode_type(&self, ty: &BcsType, value: &Value) -> SuiResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(&mut buf, ty, value, 0)?;
        Ok(buf)
    }

    /// Decodes `bytes` with an anonymous shape, rejecting trailing bytes.
    pub fn decode_type(&self, ty: &BcsType, bytes: &[u8]) -> SuiResult<Value> {
        let mut reader = Reader::new(bytes);
        let value = self.read(&mut reader, ty, 0)?;
        reader.finish()?;
        Ok(value)
    }

    /// Encodes a JSON value as the registered type `name`.
    pub fn encode_json(&self, name: &str, json: &Json) -> SuiResult<Vec<u8>> {
        self.check_named(name)?;
        let value = self.value_from_json(&BcsType::named(name), json)?;
        self.encode(name, &value)
    }

    /// Decodes `bytes` as the registered type `name` into JSON.
    pub fn decode_json(&self, name: &str, bytes: &[u8]) -> SuiResult<Json> {
        let value = self.decode(name, bytes)?;
        self.value_to_json(&BcsType::named(name), &value)
    }

    /// Converts JSON into a value of shape `ty`.
    ///
    /// Integers of 64 bits and wider accept numbers or decimal strings.
    /// Enums accept `{"Variant": payload}`, `{"kind": "Variant", ...}`, or
    /// a bare `"Variant"` string for unit variants.
    pub fn value_from_json(&self, ty: &BcsType, json: &Json) -> SuiResult<Value> {
        self.from_json(ty, json, 0)
    }

    /// Converts a value of shape `ty` into JSON.
    pub fn value_to_json(&self, ty: &BcsType, value: &Value) -> SuiResult<Json> {
        self.to_json(ty, value, 0)
    }

    fn entry(&self, name: &str) -> SuiResult<&Entry> {
        self.types
            .get(name)
            .ok_or_else(|| SuiError::UnknownType(name.to_string()))
    }

    fn check_named(&self, name: &str) -> SuiResult<()> {
        self.resolve(&BcsType::named(name)).map(|_| ())
    }

    /// Follows `Named` aliases to the shape they stand for.
    fn resolve<'a>(&'a self, ty: &'a BcsType) -> SuiResult<&'a BcsType> {
        let mut current = ty;
        for _ in 0..=MAX_ALIAS_DEPTH {
            match current {
                BcsType::Named(name) => current = &self.entry(name)?.shape,
                other => return Ok(other),
            }
        }
        Err(SuiError::UnknownType(format!(
            "{ty} does not resolve within {MAX_ALIAS_DEPTH} aliases"
        )))
    }

    fn write_named(&self, buf: &mut Vec<u8>, name: &str, value: &Value, depth: usize) -> SuiResult<()> {
        let entry = self.entry(name)?;
        let structural = match entry.custom {
            Some(codec) => codec.to_structural(value)?,
            None => None,
        };
        let value = match &structural {
            Some(converted) => converted,
            None => value,
        };
        self.write(buf, &entry.shape, value, depth + 1)
    }

    fn write(&self, buf: &mut Vec<u8>, ty: &BcsType, value: &Value, depth: usize) -> SuiResult<()> {
        if depth > MAX_VALUE_DEPTH {
            return Err(SuiError::malformed("value nesting too deep"));
        }
        match (ty, value) {
            (BcsType::Bool, Value::Bool(b)) => buf.push(u8::from(*b)),
            (BcsType::U8, Value::U8(v)) => buf.push(*v),
            (BcsType::U16, Value::U16(v)) => buf.extend_from_slice(&v.to_le_bytes()),
            (BcsType::U32, Value::U32(v)) => buf.extend_from_slice(&v.to_le_bytes()),
            (BcsType::U64, Value::U64(v)) => buf.extend_from_slice(&v.to_le_bytes()),
            (BcsType::U128, Value::U128(v)) => buf.extend_from_slice(&v.to_le_bytes()),
            (BcsType::U256, Value::U256(v)) => {
                let mut bytes = v.to_bytes_le();
                if bytes.len() > 32 {
                    return Err(SuiError::malformed(format!("{v} does not fit in u256")));
                }
                bytes.resize(32, 0);
                buf.extend_from_slice(&bytes);
            }
            (BcsType::Address, Value::Address(address)) => buf.extend_from_slice(address.as_bytes()),
            (BcsType::FixedBytes(n), Value::Bytes(bytes)) => {
                if bytes.len() != *n {
                    return Err(SuiError::malformed(format!(
                        "expected {n} bytes, found {}",
                        bytes.len()
                    )));
                }
                buf.extend_from_slice(bytes);
            }
            (BcsType::Bytes, Value::Bytes(bytes)) => {
                write_length(buf, bytes.len())?;
                buf.extend_from_slice(bytes);
            }
            (BcsType::Vector(inner), Value::Bytes(bytes)) if **inner == BcsType::U8 => {
                write_length(buf, bytes.len())?;
                buf.extend_from_slice(bytes);
            }
            (BcsType::String, Value::String(s)) => {
                write_length(buf, s.len())?;
                buf.extend_from_slice(s.as_bytes());
            }
            (BcsType::Vector(inner), Value::Vector(items)) => {
                write_length(buf, items.len())?;
                for item in items {
                    self.write(buf, inner, item, depth + 1)?;
                }
            }
            (BcsType::Option(inner), Value::Option(item)) => match item {
                None => buf.push(0),
                Some(item) => {
                    buf.push(1);
                    self.write(buf, inner, item, depth + 1)?;
                }
            },
            (BcsType::Tuple(shapes), Value::Tuple(items)) => {
                if shapes.len() != items.len() {
                    return Err(SuiError::malformed(format!(
                        "expected a tuple of {} values, found {}",
                        shapes.len(),
                        items.len()
                    )));
                }
                for (shape, item) in shapes.iter().zip(items) {
                    self.write(buf, shape, item, depth + 1)?;
                }
            }
            (BcsType::Struct(fields), Value::Struct(_)) => {
                for Field { name, ty } in fields {
                    let field = value
                        .field(name)
                        .ok_or_else(|| SuiError::malformed(format!("missing field {name}")))?;
                    self.write(buf, ty, field, depth + 1)?;
                }
            }
            (BcsType::Enum(variants), Value::Enum { variant, payload }) => {
                let index = variants
                    .iter()
                    .position(|v| &v.name == variant)
                    .ok_or_else(|| SuiError::malformed(format!("unknown variant {variant}")))?;
                write_uleb128(buf, index as u64);
                match (&variants[index].ty, payload) {
                    (None, None) => {}
                    (Some(shape), Some(payload)) => self.write(buf, shape, payload, depth + 1)?,
                    (None, Some(_)) => {
                        return Err(SuiError::malformed(format!(
                            "unit variant {variant} does not take a payload"
                        )))
                    }
                    (Some(_), None) => {
                        return Err(SuiError::malformed(format!(
                            "variant {variant} requires a payload"
                        )))
                    }
                }
            }
            (BcsType::Named(name), value) => self.write_named(buf, name, value, depth)?,
            (ty, value) => {
                return Err(SuiError::malformed(format!(
                    "expected {ty} value, found {}",
                    value.kind()
                )))
            }
        }
        Ok(())
    }

    fn read_named(&self, reader: &mut Reader<'_>, name: &str, depth: usize) -> SuiResult<Value> {
        let entry = self.entry(name)?;
        let value = self.read(reader, &entry.shape, depth + 1)?;
        match entry.custom {
            Some(codec) => codec.from_structural(value),
            None => Ok(value),
        }
    }

    fn read(&self, reader: &mut Reader<'_>, ty: &BcsType, depth: usize) -> SuiResult<Value> {
        if depth > MAX_VALUE_DEPTH {
            return Err(SuiError::malformed("value nesting too deep"));
        }
        Ok(match ty {
            BcsType::Bool => match reader.byte()? {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                other => return Err(SuiError::malformed(format!("invalid bool byte {other}"))),
            },
            BcsType::U8 => Value::U8(reader.byte()?),
            BcsType::U16 => Value::U16(u16::from_le_bytes(reader.array()?)),
            BcsType::U32 => Value::U32(u32::from_le_bytes(reader.array()?)),
            BcsType::U64 => Value::U64(u64::from_le_bytes(reader.array()?)),
            BcsType::U128 => Value::U128(u128::from_le_bytes(reader.array()?)),
            BcsType::U256 => Value::U256(BigUint::from_bytes_le(&reader.array::<32>()?)),
            BcsType::Address => Value::Address(SuiAddress::new(reader.array()?)),
            BcsType::FixedBytes(n) => Value::Bytes(reader.take(*n)?.to_vec()),
            BcsType::Bytes => {
                let len = reader.length()?;
                Value::Bytes(reader.take(len)?.to_vec())
            }
            BcsType::String => {
                let len = reader.length()?;
                let bytes = reader.take(len)?.to_vec();
                Value::String(
                    String::from_utf8(bytes).map_err(|e| SuiError::malformed(e.to_string()))?,
                )
            }
            BcsType::Vector(inner) if **inner == BcsType::U8 => {
                let len = reader.length()?;
                Value::Bytes(reader.take(len)?.to_vec())
            }
            BcsType::Vector(inner) => {
                let len = reader.length()?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read(reader, inner, depth + 1)?);
                }
                Value::Vector(items)
            }
            BcsType::Option(inner) => match reader.byte()? {
                0 => Value::Option(None),
                1 => Value::Option(Some(Box::new(self.read(reader, inner, depth + 1)?))),
                other => return Err(SuiError::malformed(format!("invalid option tag {other}"))),
            },
            BcsType::Tuple(shapes) => Value::Tuple(
                shapes
                    .iter()
                    .map(|shape| self.read(reader, shape, depth + 1))
                    .collect::<SuiResult<_>>()?,
            ),
            BcsType::Struct(fields) => Value::Struct(
                fields
                    .iter()
                    .map(|field| Ok((field.name.clone(), self.read(reader, &field.ty, depth + 1)?)))
                    .collect::<SuiResult<_>>()?,
            ),
            BcsType::Enum(variants) => {
                let index = reader.uleb128()?;
                let Variant { name, ty } = variants.get(index as usize).ok_or_else(|| {
                    SuiError::malformed(format!(
                        "variant index {index} out of range ({} variants)",
                        variants.len()
                    ))
                })?;
                let payload = match ty {
                    Some(shape) => Some(Box::new(self.read(reader, shape, depth + 1)?)),
                    None => None,
                };
                Value::Enum {
                    variant: name.clone(),
                    payload,
                }
            }
            BcsType::Named(name) => self.read_named(reader, name, depth)?,
        })
    }

    fn from_json(&self, ty: &BcsType, json: &Json, depth: usize) -> SuiResult<Value> {
        if depth > MAX_VALUE_DEPTH {
            return Err(SuiError::malformed("value nesting too deep"));
        }
        let mismatch = || SuiError::malformed(format!("expected {ty} value, found {json}"));
        Ok(match ty {
            BcsType::Bool => match json {
                Json::Bool(b) => Value::Bool(*b),
                Json::String(s) if s == "true" => Value::Bool(true),
                Json::String(s) if s == "false" => Value::Bool(false),
                _ => return Err(mismatch()),
            },
            BcsType::U8 => Value::U8(parse_integer(ty, json)?),
            BcsType::U16 => Value::U16(parse_integer(ty, json)?),
            BcsType::U32 => Value::U32(parse_integer(ty, json)?),
            BcsType::U64 => Value::U64(parse_integer(ty, json)?),
            BcsType::U128 => Value::U128(parse_integer(ty, json)?),
            BcsType::U256 => {
                let value: BigUint = parse_integer(ty, json)?;
                if value.bits() > 256 {
                    return Err(SuiError::malformed(format!("{value} does not fit in u256")));
                }
                Value::U256(value)
            }
            BcsType::Address => match json {
                Json::String(s) => Value::Address(SuiAddress::from_hex(s)?),
                _ => return Err(mismatch()),
            },
            BcsType::FixedBytes(n) => {
                let bytes = match json {
                    Json::String(s) => hex::decode(s.trim_start_matches("0x"))?,
                    Json::Array(_) => byte_array(json)?,
                    _ => return Err(mismatch()),
                };
                if bytes.len() != *n {
                    return Err(SuiError::malformed(format!(
                        "expected {n} bytes, found {}",
                        bytes.len()
                    )));
                }
                Value::Bytes(bytes)
            }
            BcsType::Bytes => match json {
                Json::String(s) => Value::Bytes(BASE64.decode(s)?),
                Json::Array(_) => Value::Bytes(byte_array(json)?),
                _ => return Err(mismatch()),
            },
            BcsType::String => match json {
                Json::String(s) => Value::String(s.clone()),
                _ => return Err(mismatch()),
            },
            BcsType::Vector(inner) => match json {
                Json::String(s) if **inner == BcsType::U8 => Value::Bytes(s.as_bytes().to_vec()),
                Json::Array(_) if **inner == BcsType::U8 => Value::Bytes(byte_array(json)?),
                Json::Array(items) => Value::Vector(
                    items
                        .iter()
                        .map(|item| self.from_json(inner, item, depth + 1))
                        .collect::<SuiResult<_>>()?,
                ),
                _ => return Err(mismatch()),
            },
            BcsType::Option(inner) => match json {
                Json::Null => Value::Option(None),
                other => Value::Option(Some(Box::new(self.from_json(inner, other, depth + 1)?))),
            },
            BcsType::Tuple(shapes) => match json {
                Json::Array(items) if items.len() == shapes.len() => Value::Tuple(
                    shapes
                        .iter()
                        .zip(items)
                        .map(|(shape, item)| self.from_json(shape, item, depth + 1))
                        .collect::<SuiResult<_>>()?,
                ),
                _ => return Err(mismatch()),
            },
            BcsType::Struct(fields) => {
                let Json::Object(map) = json else {
                    return Err(mismatch());
                };
                Value::Struct(
                    fields
                        .iter()
                        .map(|Field { name, ty }| {
                            let field = map
                                .get(name)
                                .ok_or_else(|| SuiError::malformed(format!("missing field {name}")))?;
                            Ok((name.clone(), self.from_json(ty, field, depth + 1)?))
                        })
                        .collect::<SuiResult<_>>()?,
                )
            }
            BcsType::Enum(variants) => self.enum_from_json(variants, json, depth)?,
            BcsType::Named(name) => {
                let entry = self.entry(name)?;
                match (entry.custom, json) {
                    (Some(CustomCodec::TypeTagString), Json::String(s)) => {
                        type_tag_to_value(&TypeTag::from_str_strict(s)?)
                    }
                    (Some(codec @ CustomCodec::MoveCallTarget), Json::Object(map))
                        if map.contains_key(TARGET) =>
                    {
                        let shape = codec.ergonomic_shape().unwrap_or_else(|| entry.shape.clone());
                        self.from_json(&shape, json, depth + 1)?
                    }
                    _ => self.from_json(&entry.shape, json, depth + 1)?,
                }
            }
        })
    }

    fn enum_from_json(&self, variants: &[Variant], json: &Json, depth: usize) -> SuiResult<Value> {
        let find = |name: &str| {
            variants
                .iter()
                .find(|v| v.name == name)
                .ok_or_else(|| SuiError::malformed(format!("unknown variant {name}")))
        };
        let (variant, payload_json) = match json {
            Json::String(name) => (find(name)?, None),
            Json::Object(map) => match map.get("kind") {
                Some(Json::String(kind)) => {
                    let variant = find(kind)?;
                    let rest: Vec<(&String, &Json)> =
                        map.iter().filter(|(key, _)| key.as_str() != "kind").collect();
                    let payload = match &variant.ty {
                        None => None,
                        Some(shape) => Some(self.kind_payload(shape, rest)?),
                    };
                    (variant, payload)
                }
                _ if map.len() == 1 => {
                    let Some((name, payload)) = map.iter().next() else {
                        return Err(SuiError::malformed("empty enum object"));
                    };
                    (find(name)?, Some(payload.clone()))
                }
                _ => {
                    return Err(SuiError::malformed(format!(
                        "expected an enum object with one key, found {json}"
                    )))
                }
            },
            _ => return Err(SuiError::malformed(format!("expected an enum, found {json}"))),
        };
        let payload = match (&variant.ty, payload_json) {
            (None, None | Some(Json::Null)) => None,
            (None, Some(other)) => {
                return Err(SuiError::malformed(format!(
                    "unit variant {} does not take a payload, found {other}",
                    variant.name
                )))
            }
            (Some(shape), Some(payload)) => Some(Box::new(self.from_json(shape, &payload, depth + 1)?)),
            (Some(_), None) => {
                return Err(SuiError::malformed(format!(
                    "variant {} requires a payload",
                    variant.name
                )))
            }
        };
        Ok(Value::Enum {
            variant: variant.name.clone(),
            payload,
        })
    }

    /// Rebuilds the payload of a `kind`-tagged variant from its sibling fields.
    ///
    /// Struct payloads keep the fields by name. Tuple payloads take the
    /// fields positionally: known argument field names in their declared
    /// order, anything else in the order written.
    fn kind_payload(&self, shape: &BcsType, mut rest: Vec<(&String, &Json)>) -> SuiResult<Json> {
        let object = |rest: Vec<(&String, &Json)>| {
            Json::Object(
                rest.into_iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect::<Map<String, Json>>(),
            )
        };
        Ok(match self.resolve(shape)? {
            BcsType::Struct(_) => object(rest),
            BcsType::Tuple(shapes) if rest.len() == shapes.len() => {
                if rest
                    .iter()
                    .all(|(key, _)| TUPLE_FIELD_ORDER.contains(&key.as_str()))
                {
                    rest.sort_by_key(|(key, _)| {
                        TUPLE_FIELD_ORDER.iter().position(|name| *name == key.as_str())
                    });
                }
                Json::Array(rest.into_iter().map(|(_, value)| value.clone()).collect())
            }
            _ if rest.len() == 1 => rest[0].1.clone(),
            _ => object(rest),
        })
    }

    fn to_json(&self, ty: &BcsType, value: &Value, depth: usize) -> SuiResult<Json> {
        if depth > MAX_VALUE_DEPTH {
            return Err(SuiError::malformed("value nesting too deep"));
        }
        Ok(match (ty, value) {
            (BcsType::Bool, Value::Bool(b)) => Json::Bool(*b),
            (BcsType::U8, Value::U8(v)) => Json::from(*v),
            (BcsType::U16, Value::U16(v)) => Json::from(*v),
            (BcsType::U32, Value::U32(v)) => Json::from(*v),
            (BcsType::U64, Value::U64(v)) => Json::String(v.to_string()),
            (BcsType::U128, Value::U128(v)) => Json::String(v.to_string()),
            (BcsType::U256, Value::U256(v)) => Json::String(v.to_string()),
            (BcsType::Address, Value::Address(address)) => Json::String(address.to_hex()),
            (BcsType::FixedBytes(_) | BcsType::Bytes, Value::Bytes(bytes)) => bytes_json(bytes),
            (BcsType::Vector(_), Value::Bytes(bytes)) => bytes_json(bytes),
            (BcsType::String, Value::String(s)) => Json::String(s.clone()),
            (BcsType::Vector(inner), Value::Vector(items)) => Json::Array(
                items
                    .iter()
                    .map(|item| self.to_json(inner, item, depth + 1))
                    .collect::<SuiResult<_>>()?,
            ),
            (BcsType::Option(_), Value::Option(None)) => Json::Null,
            (BcsType::Option(inner), Value::Option(Some(item))) => self.to_json(inner, item, depth + 1)?,
            (BcsType::Tuple(shapes), Value::Tuple(items)) if shapes.len() == items.len() => Json::Array(
                shapes
                    .iter()
                    .zip(items)
                    .map(|(shape, item)| self.to_json(shape, item, depth + 1))
                    .collect::<SuiResult<_>>()?,
            ),
            (BcsType::Struct(fields), Value::Struct(_)) => {
                let mut map = Map::new();
                for Field { name, ty } in fields {
                    let field = value
                        .field(name)
                        .ok_or_else(|| SuiError::malformed(format!("missing field {name}")))?;
                    map.insert(name.clone(), self.to_json(ty, field, depth + 1)?);
                }
                Json::Object(map)
            }
            (BcsType::Enum(variants), Value::Enum { variant, payload }) => {
                let shape = variants
                    .iter()
                    .find(|v| &v.name == variant)
                    .ok_or_else(|| SuiError::malformed(format!("unknown variant {variant}")))?;
                let payload = match (&shape.ty, payload) {
                    (Some(ty), Some(payload)) => self.to_json(ty, payload, depth + 1)?,
                    _ => Json::Null,
                };
                let mut map = Map::new();
                map.insert(variant.clone(), payload);
                Json::Object(map)
            }
            (BcsType::Named(name), value) => {
                let entry = self.entry(name)?;
                match entry.custom {
                    Some(CustomCodec::TypeTagString) => match value_to_type_tag(value) {
                        Ok(tag) => Json::String(tag.to_string()),
                        Err(_) => self.to_json(&entry.shape, value, depth + 1)?,
                    },
                    Some(codec @ CustomCodec::MoveCallTarget) if value.field(TARGET).is_some() => {
                        let shape = codec.ergonomic_shape().unwrap_or_else(|| entry.shape.clone());
                        self.to_json(&shape, value, depth + 1)?
                    }
                    _ => self.to_json(&entry.shape, value, depth + 1)?,
                }
            }
            (ty, value) => {
                return Err(SuiError::malformed(format!(
                    "expected {ty} value, found {}",
                    value.kind()
                )))
            }
        })
    }
}

fn write_length(buf: &mut Vec<u8>, len: usize) -> SuiResult<()> {
    if len as u64 > MAX_SEQUENCE_LENGTH {
        return Err(SuiError::malformed(format!("sequence of {len} elements is too long")));
    }
    write_uleb128(buf, len as u64);
    Ok(())
}

fn parse_integer<T>(ty: &BcsType, json: &Json) -> SuiResult<T>
where
    T: FromStr,
{
    let digits = match json {
        Json::Number(n) => n.to_string(),
        Json::String(s) => s.trim().to_string(),
        _ => return Err(SuiError::malformed(format!("expected {ty} value, found {json}"))),
    };
    digits
        .parse::<T>()
        .map_err(|_| SuiError::malformed(format!("{digits} is not a valid {ty}")))
}

fn byte_array(json: &Json) -> SuiResult<Vec<u8>> {
    match json {
        Json::Array(items) => items
            .iter()
            .map(|item| parse_integer::<u8>(&BcsType::U8, item))
            .collect(),
        other => Err(SuiError::malformed(format!("expected a byte array, found {other}"))),
    }
}

fn bytes_json(bytes: &[u8]) -> Json {
    Json::Array(bytes.iter().map(|b| Json::from(*b)).collect())
}

/// Converts a type tag into the registry's `TypeTag` value.
pub(crate) fn type_tag_to_value(tag: &TypeTag) -> Value {
    match tag {
        TypeTag::Bool => Value::unit_variant("bool"),
        TypeTag::U8 => Value::unit_variant("u8"),
        TypeTag::U16 => Value::unit_variant("u16"),
        TypeTag::U32 => Value::unit_variant("u32"),
        TypeTag::U64 => Value::unit_variant("u64"),
        TypeTag::U128 => Value::unit_variant("u128"),
        TypeTag::U256 => Value::unit_variant("u256"),
        TypeTag::Address => Value::unit_variant("address"),
        TypeTag::Signer => Value::unit_variant("signer"),
        TypeTag::Vector(inner) => Value::variant("vector", type_tag_to_value(inner)),
        TypeTag::Struct(tag) => Value::variant(
            "struct",
            Value::struct_of([
                ("address", Value::Address(tag.address)),
                ("module", Value::String(tag.module.to_string())),
                ("name", Value::String(tag.name.to_string())),
                (
                    "typeParams",
                    Value::Vector(tag.type_params.iter().map(type_tag_to_value).collect()),
                ),
            ]),
        ),
    }
}

/// Converts the registry's `TypeTag` value back into a type tag.
pub(crate) fn value_to_type_tag(value: &Value) -> SuiResult<TypeTag> {
    let Value::Enum { variant, payload } = value else {
        return Err(SuiError::InvalidTypeTag(format!(
            "expected a type tag enum, found {}",
            value.kind()
        )));
    };
    let payload = payload.as_deref();
    Ok(match (variant.as_str(), payload) {
        ("bool", None) => TypeTag::Bool,
        ("u8", None) => TypeTag::U8,
        ("u16", None) => TypeTag::U16,
        ("u32", None) => TypeTag::U32,
        ("u64", None) => TypeTag::U64,
        ("u128", None) => TypeTag::U128,
        ("u256", None) => TypeTag::U256,
        ("address", None) => TypeTag::Address,
        ("signer", None) => TypeTag::Signer,
        ("vector", Some(inner)) => TypeTag::vector(value_to_type_tag(inner)?),
        ("struct", Some(tag)) => {
            let (
                Some(Value::Address(address)),
                Some(Value::String(module)),
                Some(Value::String(name)),
                Some(Value::Vector(params)),
            ) = (
                tag.field("address"),
                tag.field("module"),
                tag.field("name"),
                tag.field("typeParams"),
            )
            else {
                return Err(SuiError::InvalidTypeTag("malformed struct tag".to_string()));
            };
            TypeTag::struct_tag(StructTag::new(
                *address,
                Identifier::new(module.as_str())?,
                Identifier::new(name.as_str())?,
                params
                    .iter()
                    .map(value_to_type_tag)
                    .collect::<SuiResult<_>>()?,
            ))
        }
        (other, _) => {
            return Err(SuiError::InvalidTypeTag(format!(
                "unknown type tag variant {other}"
            )))
        }
    })
}
