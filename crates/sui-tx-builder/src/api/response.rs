//! Types returned by transaction providers.

use crate::transaction::ObjectRef;
use crate::types::{Identifier, ObjectDigest, ObjectId, StructTag, SuiAddress, TypeTag};
use serde::{Deserialize, Serialize};

/// Who owns an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Owned by an address.
    AddressOwner(SuiAddress),
    /// Owned by another object.
    ObjectOwner(SuiAddress),
    /// Shared, accessible by anyone through consensus.
    Shared {
        /// The version at which the object became shared.
        initial_shared_version: u64,
    },
    /// Frozen.
    Immutable,
}

/// The current state of an on-chain object, as far as transactions need it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    /// The object id.
    pub object_id: ObjectId,
    /// The current version.
    pub version: u64,
    /// The digest at the current version.
    pub digest: ObjectDigest,
    /// The owner.
    pub owner: Owner,
}

impl ObjectInfo {
    /// The reference to the current version of the object.
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.object_id, self.version, self.digest)
    }
}

/// A struct type inside a normalized signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStruct {
    /// Defining package.
    pub address: SuiAddress,
    /// Module name.
    pub module: String,
    /// Struct name.
    pub name: String,
    /// Type arguments.
    #[serde(default)]
    pub type_arguments: Vec<NormalizedType>,
}

impl NormalizedStruct {
    fn is(&self, address: SuiAddress, module: &str, name: &str) -> bool {
        self.address == address && self.module == module && self.name == name
    }
}

/// A Move type as reported by a normalized module.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalizedType {
    /// `bool`
    Bool,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `u128`
    U128,
    /// `u256`
    U256,
    /// `address`
    Address,
    /// `signer`
    Signer,
    /// `vector<T>`
    Vector(Box<NormalizedType>),
    /// A struct type.
    Struct(NormalizedStruct),
    /// `&T`
    Reference(Box<NormalizedType>),
    /// `&mut T`
    MutableReference(Box<NormalizedType>),
    /// A generic type parameter, by position.
    TypeParameter(u16),
}

impl NormalizedType {
    /// Returns true for `&TxContext` and `&mut TxContext`.
    pub fn is_tx_context(&self) -> bool {
        match self {
            Self::Reference(inner) | Self::MutableReference(inner) => matches!(
                inner.as_ref(),
                Self::Struct(s) if s.is(SuiAddress::TWO, "tx_context", "TxContext")
            ),
            _ => false,
        }
    }

    /// Returns true for `&mut T`.
    pub fn is_mutable_reference(&self) -> bool {
        matches!(self, Self::MutableReference(_))
    }

    /// Whether the parameter takes an object input.
    ///
    /// Structs and type parameters, by value or by reference, take objects.
    /// Vectors of objects, `signer` and references to anything else cannot
    /// be passed as a single input.
    pub fn is_object_parameter(&self) -> bool {
        match self {
            Self::Struct(_) | Self::TypeParameter(_) => true,
            Self::Reference(inner) | Self::MutableReference(inner) => {
                matches!(inner.as_ref(), Self::Struct(_) | Self::TypeParameter(_))
            }
            _ => false,
        }
    }

    /// Returns true for `0x2::transfer::Receiving<T>`.
    pub fn is_receiving(&self) -> bool {
        matches!(self, Self::Struct(s) if s.is(SuiAddress::TWO, "transfer", "Receiving"))
    }

    /// Whether an object passed for this parameter needs mutable access.
    ///
    /// Objects taken by value are consumed, which also needs mutable access.
    pub fn needs_mutable_object(&self) -> bool {
        !matches!(self, Self::Reference(_))
    }

    /// The type tag of a parameter that takes a pure value.
    ///
    /// Primitives, vectors of pure types, `0x1::string::String`,
    /// `0x1::ascii::String`, `0x2::object::ID` and `0x1::option::Option`
    /// of a pure type are pure. Everything else is passed as an object.
    pub fn pure_type_tag(&self) -> Option<TypeTag> {
        match self {
            Self::Bool => Some(TypeTag::Bool),
            Self::U8 => Some(TypeTag::U8),
            Self::U16 => Some(TypeTag::U16),
            Self::U32 => Some(TypeTag::U32),
            Self::U64 => Some(TypeTag::U64),
            Self::U128 => Some(TypeTag::U128),
            Self::U256 => Some(TypeTag::U256),
            Self::Address => Some(TypeTag::Address),
            Self::Vector(inner) => inner.pure_type_tag().map(TypeTag::vector),
            Self::Struct(s) => {
                let is_pure_struct = s.is(SuiAddress::ONE, "string", "String")
                    || s.is(SuiAddress::ONE, "ascii", "String")
                    || s.is(SuiAddress::TWO, "object", "ID");
                if is_pure_struct {
                    return Self::struct_tag(s, vec![]);
                }
                if s.is(SuiAddress::ONE, "option", "Option") {
                    let [inner] = s.type_arguments.as_slice() else {
                        return None;
                    };
                    return Self::struct_tag(s, vec![inner.pure_type_tag()?]);
                }
                None
            }
            Self::Signer
            | Self::Reference(_)
            | Self::MutableReference(_)
            | Self::TypeParameter(_) => None,
        }
    }

    fn struct_tag(s: &NormalizedStruct, type_params: Vec<TypeTag>) -> Option<TypeTag> {
        Some(TypeTag::struct_tag(StructTag::new(
            s.address,
            Identifier::new(s.module.as_str()).ok()?,
            Identifier::new(s.name.as_str()).ok()?,
            type_params,
        )))
    }
}

/// A normalized Move function signature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedFunction {
    /// Whether the function is an entry function.
    #[serde(default)]
    pub is_entry: bool,
    /// Parameter types, in order.
    pub parameters: Vec<NormalizedType>,
    /// Return types.
    #[serde(default, rename = "return")]
    pub return_: Vec<NormalizedType>,
}

/// Gas charged by an execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCostSummary {
    /// Cost of computation.
    pub computation_cost: u64,
    /// Cost of storage written.
    pub storage_cost: u64,
    /// Storage refunded for deleted or shrunk objects.
    pub storage_rebate: u64,
    /// Part of the storage fee that is never refunded.
    #[serde(default)]
    pub non_refundable_storage_fee: u64,
}

impl GasCostSummary {
    /// Computation plus storage minus rebate, clamped at zero.
    pub fn net_gas_usage(&self) -> u64 {
        let net = i128::from(self.computation_cost) + i128::from(self.storage_cost)
            - i128::from(self.storage_rebate);
        u64::try_from(net.max(0)).unwrap_or(u64::MAX)
    }
}

/// Outcome of an execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Executed successfully.
    Success,
    /// Aborted.
    Failure {
        /// The reported error.
        error: String,
    },
}

impl ExecutionStatus {
    /// Returns true on success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Result of a dry run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunResult {
    /// Whether execution succeeded.
    pub status: ExecutionStatus,
    /// Gas the execution would charge.
    pub gas_used: GasCostSummary,
}
