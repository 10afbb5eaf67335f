//! Transaction data: the wire types and the mutable builder state.

use crate::error::{SuiError, SuiResult};
use crate::transaction::call_arg::{CallArg, ObjectRef};
use crate::transaction::command::Command;
use crate::types::{ObjectId, SuiAddress};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Version written into serialized snapshots.
pub const SNAPSHOT_VERSION: u8 = 1;

/// Largest number of inputs or commands an argument index can address.
const MAX_INDEXED: usize = u16::MAX as usize + 1;

/// When a transaction stops being valid.
///
/// Variant indices: `None = 0`, `Epoch = 1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionExpiration {
    /// Never expires.
    #[default]
    None,
    /// Expires after the given epoch.
    Epoch(u64),
}

/// Gas parameters of a finished transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GasData {
    /// Coins paying for gas.
    pub payment: Vec<ObjectRef>,
    /// Owner of the payment coins.
    pub owner: SuiAddress,
    /// Price per gas unit.
    pub price: u64,
    /// Maximum gas the transaction may spend.
    pub budget: u64,
}

/// A programmable transaction: inputs and the commands using them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgrammableTransaction {
    /// Resolved inputs.
    pub inputs: Vec<CallArg>,
    /// Commands, executed in order.
    pub commands: Vec<Command>,
}

/// What a transaction does, without sender or gas.
///
/// Only the programmable variant (index 0) is produced here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// A programmable transaction.
    ProgrammableTransaction(ProgrammableTransaction),
}

impl TransactionKind {
    /// Serializes the kind to BCS bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if BCS serialization fails.
    pub fn to_bcs(&self) -> SuiResult<Vec<u8>> {
        bcs::to_bytes(self).map_err(SuiError::bcs)
    }

    /// Decodes a kind from BCS bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SuiError::MalformedEncoding`] if the bytes are not a valid kind.
    pub fn from_bcs(bytes: &[u8]) -> SuiResult<Self> {
        bcs::from_bytes(bytes).map_err(|e| SuiError::malformed(e.to_string()))
    }

    /// The programmable transaction carried by this kind.
    pub fn programmable(&self) -> &ProgrammableTransaction {
        match self {
            Self::ProgrammableTransaction(pt) => pt,
        }
    }
}

/// Version 1 of the transaction data layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionDataV1 {
    /// What the transaction does.
    pub kind: TransactionKind,
    /// Who sends it.
    pub sender: SuiAddress,
    /// How gas is paid.
    pub gas_data: GasData,
    /// When it expires.
    pub expiration: TransactionExpiration,
}

/// A complete transaction, ready to be signed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionData {
    /// The only layout version.
    V1(TransactionDataV1),
}

impl TransactionData {
    /// Creates version 1 transaction data.
    pub fn new(
        kind: TransactionKind,
        sender: SuiAddress,
        gas_data: GasData,
        expiration: TransactionExpiration,
    ) -> Self {
        Self::V1(TransactionDataV1 {
            kind,
            sender,
            gas_data,
            expiration,
        })
    }

    /// Serializes the transaction to BCS bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if BCS serialization fails.
    pub fn to_bcs(&self) -> SuiResult<Vec<u8>> {
        bcs::to_bytes(self).map_err(SuiError::bcs)
    }

    /// Decodes a transaction from BCS bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SuiError::MalformedEncoding`] if the bytes are not valid
    /// transaction data.
    pub fn from_bcs(bytes: &[u8]) -> SuiResult<Self> {
        bcs::from_bytes(bytes).map_err(|e| SuiError::malformed(e.to_string()))
    }

    /// The transaction kind.
    pub fn kind(&self) -> &TransactionKind {
        match self {
            Self::V1(data) => &data.kind,
        }
    }

    /// The sender.
    pub fn sender(&self) -> SuiAddress {
        match self {
            Self::V1(data) => data.sender,
        }
    }

    /// The gas parameters.
    pub fn gas_data(&self) -> &GasData {
        match self {
            Self::V1(data) => &data.gas_data,
        }
    }

    /// The expiration.
    pub fn expiration(&self) -> TransactionExpiration {
        match self {
            Self::V1(data) => data.expiration,
        }
    }
}

/// Gas settings collected while building; all optional until the final encode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasConfig {
    /// Maximum gas the transaction may spend.
    pub budget: Option<u64>,
    /// Price per gas unit.
    pub price: Option<u64>,
    /// Coins paying for gas.
    pub payment: Option<Vec<ObjectRef>>,
    /// Owner of the payment coins, the sender when unset.
    pub owner: Option<SuiAddress>,
}

/// Whether an input carries a pure value or an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    /// A non-object value.
    Pure,
    /// An object.
    Object,
}

/// An object input waiting for its reference to be looked up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedObject {
    /// The object id.
    pub object_id: ObjectId,
    /// Requested mutability for a shared object, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutable: Option<bool>,
}

/// The value of an input at some stage of resolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputValue {
    /// A JSON literal whose Move type is not yet known.
    Pure(Json),
    /// An object id whose reference is not yet known.
    Object(UnresolvedObject),
    /// A fully resolved argument.
    Resolved(CallArg),
}

/// One transaction input.
///
/// `index` is the position in the input list and never changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Position in the input list.
    pub index: u16,
    /// Pure or object.
    pub kind: InputKind,
    /// The current value.
    pub value: Option<InputValue>,
}

impl TransactionInput {
    /// Returns true once the input holds a final [`CallArg`].
    pub fn is_resolved(&self) -> bool {
        matches!(self.value, Some(InputValue::Resolved(_)))
    }

    /// The object id of an object input, resolved or not.
    pub fn object_id(&self) -> Option<ObjectId> {
        match &self.value {
            Some(InputValue::Object(object)) => Some(object.object_id),
            Some(InputValue::Resolved(arg)) => arg.object_id(),
            _ => None,
        }
    }

    /// The resolved argument, if any.
    pub fn call_arg(&self) -> Option<&CallArg> {
        match &self.value {
            Some(InputValue::Resolved(arg)) => Some(arg),
            _ => None,
        }
    }

    fn to_call_arg(&self) -> SuiResult<CallArg> {
        match &self.value {
            Some(InputValue::Resolved(arg)) => Ok(arg.clone()),
            Some(InputValue::Pure(_)) => Err(SuiError::UnknownArgumentType(format!(
                "no type is known for pure input {}",
                self.index
            ))),
            Some(InputValue::Object(object)) => Err(SuiError::unresolvable(
                object.object_id,
                format!("input {} was never resolved", self.index),
            )),
            None => Err(SuiError::missing(format!("inputs[{}].value", self.index))),
        }
    }
}

impl From<CallArg> for TransactionInput {
    fn from(arg: CallArg) -> Self {
        let kind = if arg.is_pure() {
            InputKind::Pure
        } else {
            InputKind::Object
        };
        Self {
            index: 0,
            kind,
            value: Some(InputValue::Resolved(arg)),
        }
    }
}

/// The state of a transaction under construction.
///
/// This is also the JSON snapshot format produced by
/// [`Transaction::serialize`](super::Transaction::serialize).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBlockData {
    /// Snapshot format version, always 1.
    pub version: u8,
    /// The sender.
    pub sender: Option<SuiAddress>,
    /// The expiration, `None` when unset.
    pub expiration: Option<TransactionExpiration>,
    /// Gas settings.
    pub gas_config: GasConfig,
    /// Inputs, in index order.
    pub inputs: Vec<TransactionInput>,
    /// Commands, in execution order.
    pub commands: Vec<Command>,
}

impl Default for TransactionBlockData {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            sender: None,
            expiration: None,
            gas_config: GasConfig::default(),
            inputs: Vec::new(),
            commands: Vec::new(),
        }
    }
}

impl TransactionBlockData {
    /// Creates empty builder state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates builder state holding a decoded transaction kind.
    pub fn from_kind(kind: TransactionKind) -> Self {
        let TransactionKind::ProgrammableTransaction(pt) = kind;
        let inputs = pt
            .inputs
            .into_iter()
            .zip(0u16..)
            .map(|(arg, index)| TransactionInput {
                index,
                ..TransactionInput::from(arg)
            })
            .collect();
        Self {
            inputs,
            commands: pt.commands,
            ..Self::default()
        }
    }

    /// Creates builder state holding decoded transaction data.
    pub fn from_transaction_data(data: TransactionData) -> Self {
        let TransactionData::V1(v1) = data;
        let mut state = Self::from_kind(v1.kind);
        state.sender = Some(v1.sender);
        state.expiration = Some(v1.expiration);
        state.gas_config = GasConfig {
            budget: Some(v1.gas_data.budget),
            price: Some(v1.gas_data.price),
            payment: Some(v1.gas_data.payment),
            owner: Some(v1.gas_data.owner),
        };
        state
    }

    /// Ids of every object input, resolved or not.
    pub fn input_object_ids(&self) -> Vec<ObjectId> {
        self.inputs
            .iter()
            .filter_map(TransactionInput::object_id)
            .collect()
    }

    /// Builds the transaction kind from fully resolved inputs.
    ///
    /// # Errors
    ///
    /// Fails if an input is unresolved or there are more inputs or
    /// commands than argument indices can address.
    pub fn build_kind(&self) -> SuiResult<TransactionKind> {
        self.check_index_limits()?;
        let inputs = self
            .inputs
            .iter()
            .map(TransactionInput::to_call_arg)
            .collect::<SuiResult<Vec<_>>>()?;
        Ok(TransactionKind::ProgrammableTransaction(
            ProgrammableTransaction {
                inputs,
                commands: self.commands.clone(),
            },
        ))
    }

    /// Builds complete transaction data.
    ///
    /// # Errors
    ///
    /// Returns [`SuiError::MissingRequiredField`] if the sender, gas budget,
    /// gas price or gas payment is unset, plus any error of
    /// [`build_kind`](Self::build_kind).
    pub fn build(&self) -> SuiResult<TransactionData> {
        let sender = self.sender.ok_or_else(|| SuiError::missing("sender"))?;
        let budget = self
            .gas_config
            .budget
            .ok_or_else(|| SuiError::missing("gasConfig.budget"))?;
        let price = self
            .gas_config
            .price
            .ok_or_else(|| SuiError::missing("gasConfig.price"))?;
        let payment = self
            .gas_config
            .payment
            .clone()
            .ok_or_else(|| SuiError::missing("gasConfig.payment"))?;
        let kind = self.build_kind()?;
        Ok(TransactionData::new(
            kind,
            sender,
            GasData {
                payment,
                owner: self.gas_config.owner.unwrap_or(sender),
                price,
                budget,
            },
            self.expiration.unwrap_or_default(),
        ))
    }

    /// Encodes the transaction, or only its kind.
    pub fn to_bytes(&self, only_kind: bool) -> SuiResult<Vec<u8>> {
        if only_kind {
            self.build_kind()?.to_bcs()
        } else {
            self.build()?.to_bcs()
        }
    }

    /// Serializes the state to a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SuiError::MissingRequiredField`] if any input has no value.
    pub fn to_json(&self) -> SuiResult<String> {
        if let Some(input) = self.inputs.iter().find(|input| input.value.is_none()) {
            return Err(SuiError::missing(format!("inputs[{}].value", input.index)));
        }
        Ok(serde_json::to_string(self)?)
    }

    /// Restores state from a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SuiError::InvalidSnapshot`] for an unknown version, input
    /// indices that do not match their positions, or inputs without values.
    pub fn from_json(json: &str) -> SuiResult<Self> {
        let state: Self = serde_json::from_str(json)?;
        if state.version != SNAPSHOT_VERSION {
            return Err(SuiError::InvalidSnapshot(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                state.version
            )));
        }
        for (position, input) in state.inputs.iter().enumerate() {
            if usize::from(input.index) != position {
                return Err(SuiError::InvalidSnapshot(format!(
                    "input at position {position} has index {}",
                    input.index
                )));
            }
            if input.value.is_none() {
                return Err(SuiError::InvalidSnapshot(format!(
                    "input {position} has no value"
                )));
            }
        }
        Ok(state)
    }

    fn check_index_limits(&self) -> SuiResult<()> {
        if self.inputs.len() > MAX_INDEXED {
            return Err(SuiError::transaction(format!(
                "too many inputs: {} (max {MAX_INDEXED})",
                self.inputs.len()
            )));
        }
        if self.commands.len() > MAX_INDEXED {
            return Err(SuiError::transaction(format!(
                "too many commands: {} (max {MAX_INDEXED})",
                self.commands.len()
            )));
        }
        Ok(())
    }
}
