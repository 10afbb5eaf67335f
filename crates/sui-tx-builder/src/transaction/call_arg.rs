//! Call arguments: the resolved form of transaction inputs.

use crate::error::{SuiError, SuiResult};
use crate::transaction::pure;
use crate::types::{ObjectDigest, ObjectId};
use serde::{Deserialize, Serialize};

/// A reference to one version of an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    /// The object id.
    pub object_id: ObjectId,
    /// The object version.
    pub version: u64,
    /// The digest of the object at this version.
    pub digest: ObjectDigest,
}

impl ObjectRef {
    /// Creates a new object reference.
    pub fn new(object_id: ObjectId, version: u64, digest: ObjectDigest) -> Self {
        Self {
            object_id,
            version,
            digest,
        }
    }
}

/// A reference to a shared object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedObjectRef {
    /// The object id.
    pub object_id: ObjectId,
    /// The version at which the object became shared.
    pub initial_shared_version: u64,
    /// Whether the transaction needs mutable access.
    pub mutable: bool,
}

impl SharedObjectRef {
    /// Creates a new shared object reference.
    pub fn new(object_id: ObjectId, initial_shared_version: u64, mutable: bool) -> Self {
        Self {
            object_id,
            initial_shared_version,
            mutable,
        }
    }
}

/// An object passed to a transaction.
///
/// Variant indices: `ImmOrOwnedObject = 0`, `SharedObject = 1`, `Receiving = 2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectArg {
    /// An owned or immutable object, by exact reference.
    ImmOrOwnedObject(ObjectRef),
    /// A shared object; the version is picked by consensus.
    SharedObject(SharedObjectRef),
    /// An object being received by another object.
    Receiving(ObjectRef),
}

impl ObjectArg {
    /// Returns the id of the referenced object.
    pub fn object_id(&self) -> ObjectId {
        match self {
            Self::ImmOrOwnedObject(r) | Self::Receiving(r) => r.object_id,
            Self::SharedObject(r) => r.object_id,
        }
    }
}

/// A fully resolved transaction input.
///
/// Variant indices: `Pure = 0`, `Object = 1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallArg {
    /// A BCS-encoded non-object value.
    Pure(Vec<u8>),
    /// An object.
    Object(ObjectArg),
}

impl CallArg {
    /// Returns the object id if this argument is an object.
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Self::Pure(_) => None,
            Self::Object(arg) => Some(arg.object_id()),
        }
    }

    /// Returns true if this is a pure value.
    pub fn is_pure(&self) -> bool {
        matches!(self, Self::Pure(_))
    }
}

/// Returns true if `arg` is a shared object.
pub fn is_shared_object_input(arg: &CallArg) -> bool {
    matches!(arg, CallArg::Object(ObjectArg::SharedObject(_)))
}

/// Returns true if `arg` is a shared object accessed mutably.
pub fn is_mutable_shared_object_input(arg: &CallArg) -> bool {
    matches!(
        arg,
        CallArg::Object(ObjectArg::SharedObject(SharedObjectRef { mutable: true, .. }))
    )
}

/// Constructors for [`CallArg`]s.
///
/// # Example
///
/// ```rust
/// use sui_tx_builder::transaction::{CallArg, Inputs};
///
/// let amount = Inputs::pure(&100u64).unwrap();
/// assert_eq!(amount, CallArg::Pure(100u64.to_le_bytes().to_vec()));
///
/// let flag = Inputs::pure_typed(&serde_json::json!(true), "bool").unwrap();
/// assert_eq!(flag, CallArg::Pure(vec![1]));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Inputs;

impl Inputs {
    /// Encodes a typed value as a pure argument.
    pub fn pure<T: Serialize + ?Sized>(value: &T) -> SuiResult<CallArg> {
        Ok(CallArg::Pure(bcs::to_bytes(value).map_err(SuiError::bcs)?))
    }

    /// Uses already encoded bytes as a pure argument.
    pub fn pure_bytes(bytes: impl Into<Vec<u8>>) -> CallArg {
        CallArg::Pure(bytes.into())
    }

    /// Encodes a JSON literal under an explicit Move type (e.g. `"vector<u64>"`).
    pub fn pure_typed(value: &serde_json::Value, type_str: &str) -> SuiResult<CallArg> {
        Ok(CallArg::Pure(pure::encode_pure_str(value, type_str)?))
    }

    /// An owned or immutable object.
    pub fn object_ref(object: ObjectRef) -> CallArg {
        CallArg::Object(ObjectArg::ImmOrOwnedObject(object))
    }

    /// A shared object.
    pub fn shared_object_ref(object: SharedObjectRef) -> CallArg {
        CallArg::Object(ObjectArg::SharedObject(object))
    }

    /// An object being received.
    pub fn receiving_ref(object: ObjectRef) -> CallArg {
        CallArg::Object(ObjectArg::Receiving(object))
    }
}
