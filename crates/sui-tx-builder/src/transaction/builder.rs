//! Transaction builder.

use crate::config::{BuildOptions, MAX_GAS_OBJECTS};
use crate::error::{SuiError, SuiResult};
use crate::transaction::argument::Argument;
use crate::transaction::call_arg::{CallArg, Inputs, ObjectArg, ObjectRef, SharedObjectRef};
use crate::transaction::command::{Command, ModuleBytes};
use crate::transaction::data::{
    InputKind, InputValue, TransactionBlockData, TransactionData, TransactionExpiration,
    TransactionInput, TransactionKind, UnresolvedObject,
};
use crate::transaction::resolve;
use crate::types::{ObjectId, SuiAddress, TypeTag};
use serde::Serialize;
use serde_json::Value as Json;

/// A handle to the result of a command.
///
/// Converts into [`Argument::Result`]; [`nested`](Self::nested) addresses
/// one value of a command that returns several.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransactionResult {
    index: u16,
}

impl TransactionResult {
    /// Creates a handle to command `index`.
    pub fn new(index: u16) -> Self {
        Self { index }
    }

    /// The command index.
    pub fn index(&self) -> u16 {
        self.index
    }

    /// The whole result.
    pub fn argument(&self) -> Argument {
        Argument::Result(self.index)
    }

    /// Value `result_index` of a multi-value result.
    pub fn nested(&self, result_index: u16) -> Argument {
        Argument::NestedResult(self.index, result_index)
    }

    /// All nested results, lazily, starting at 0.
    ///
    /// The number of values a command returns is not known locally, so the
    /// sequence only ends at the largest addressable index.
    pub fn iter(&self) -> NestedResults {
        NestedResults {
            index: self.index,
            next: Some(0),
        }
    }

    /// The first `count` nested results.
    pub fn take(&self, count: usize) -> Vec<Argument> {
        self.iter().take(count).collect()
    }

    /// The first `N` nested results as an array.
    ///
    /// ```rust
    /// use sui_tx_builder::transaction::{Argument, Transaction};
    ///
    /// let mut tx = Transaction::new();
    /// let amounts = vec![tx.pure_bytes(vec![1; 8]), tx.pure_bytes(vec![2; 8])];
    /// let [a, b] = tx.split_coins(tx.gas(), amounts).destructure();
    /// assert_eq!(a, Argument::NestedResult(0, 0));
    /// assert_eq!(b, Argument::NestedResult(0, 1));
    /// ```
    pub fn destructure<const N: usize>(&self) -> [Argument; N] {
        std::array::from_fn(|i| {
            Argument::NestedResult(self.index, u16::try_from(i).unwrap_or(u16::MAX))
        })
    }
}

impl From<TransactionResult> for Argument {
    fn from(result: TransactionResult) -> Self {
        result.argument()
    }
}

impl IntoIterator for TransactionResult {
    type Item = Argument;
    type IntoIter = NestedResults;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the nested results of one command.
#[derive(Clone, Debug)]
pub struct NestedResults {
    index: u16,
    next: Option<u16>,
}

impl Iterator for NestedResults {
    type Item = Argument;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.checked_add(1);
        Some(Argument::NestedResult(self.index, current))
    }
}

/// An object to add as an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectInput {
    /// Only the id; the reference is looked up at build time.
    Id(ObjectId),
    /// A complete object argument.
    Arg(ObjectArg),
}

impl ObjectInput {
    fn object_id(&self) -> ObjectId {
        match self {
            Self::Id(id) => *id,
            Self::Arg(arg) => arg.object_id(),
        }
    }

    fn into_value(self) -> InputValue {
        match self {
            Self::Id(object_id) => InputValue::Object(UnresolvedObject {
                object_id,
                mutable: None,
            }),
            Self::Arg(arg) => InputValue::Resolved(CallArg::Object(arg)),
        }
    }
}

impl From<ObjectId> for ObjectInput {
    fn from(id: ObjectId) -> Self {
        Self::Id(id)
    }
}

impl From<ObjectArg> for ObjectInput {
    fn from(arg: ObjectArg) -> Self {
        Self::Arg(arg)
    }
}

impl From<ObjectRef> for ObjectInput {
    fn from(object: ObjectRef) -> Self {
        Self::Arg(ObjectArg::ImmOrOwnedObject(object))
    }
}

impl From<SharedObjectRef> for ObjectInput {
    fn from(object: SharedObjectRef) -> Self {
        Self::Arg(ObjectArg::SharedObject(object))
    }
}

/// A programmable transaction under construction.
///
/// Inputs are added with [`object`](Self::object) and the `pure*`
/// methods, each returning the [`Argument`] that refers to it; commands are
/// added with [`add`](Self::add) or the command helpers, each returning a
/// [`TransactionResult`]. Anything left unresolved (object references, the
/// types of JSON literals, gas) is filled in by [`build`](Self::build).
///
/// # Example
///
/// ```rust
/// use sui_tx_builder::transaction::Transaction;
/// use sui_tx_builder::config::BuildOptions;
/// use sui_tx_builder::types::SuiAddress;
///
/// # futures::executor::block_on(async {
/// let mut tx = Transaction::new();
/// let amount = tx.pure(&100u64).unwrap();
/// let coin = tx.split_coins(tx.gas(), vec![amount]);
/// let recipient = tx.pure(&SuiAddress::from_u64(0xb0b)).unwrap();
/// tx.transfer_objects(vec![coin.into()], recipient);
///
/// let kind = tx.build(BuildOptions::kind_only()).await.unwrap();
/// assert_eq!(kind[0], 0);
/// # });
/// ```
#[derive(Clone, Debug, Default)]
pub struct Transaction {
    data: TransactionBlockData,
}

impl Transaction {
    /// Creates an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transaction from a copy of `data`.
    pub fn from_data(data: &TransactionBlockData) -> Self {
        Self { data: data.clone() }
    }

    /// The current builder state.
    pub fn get_data(&self) -> &TransactionBlockData {
        &self.data
    }

    /// Restores a transaction from a [`serialize`](Self::serialize) snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or the snapshot is not version 1.
    pub fn from_serialized(json: &str) -> SuiResult<Self> {
        Ok(Self {
            data: TransactionBlockData::from_json(json)?,
        })
    }

    /// Creates a transaction from BCS-encoded transaction kind bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SuiError::MalformedEncoding`] if the bytes do not decode.
    pub fn from_kind_bytes(bytes: &[u8]) -> SuiResult<Self> {
        Ok(Self {
            data: TransactionBlockData::from_kind(TransactionKind::from_bcs(bytes)?),
        })
    }

    /// Creates a transaction from BCS-encoded transaction data bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SuiError::MalformedEncoding`] if the bytes do not decode.
    pub fn from_bytes(bytes: &[u8]) -> SuiResult<Self> {
        Ok(Self {
            data: TransactionBlockData::from_transaction_data(TransactionData::from_bcs(bytes)?),
        })
    }

    /// Serializes the transaction to a versioned JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SuiError::MissingRequiredField`] if an input has no value.
    pub fn serialize(&self) -> SuiResult<String> {
        self.data.to_json()
    }

    // Inputs

    /// Appends an input and returns its argument.
    ///
    /// Past `u16::MAX` inputs every new handle saturates at `Input(u16::MAX)`;
    /// building such a transaction fails with [`SuiError::Transaction`].
    pub fn input(&mut self, kind: InputKind, value: InputValue) -> Argument {
        // Saturates; `build_kind` rejects more than 65536 inputs.
        let index = u16::try_from(self.data.inputs.len()).unwrap_or(u16::MAX);
        self.data.inputs.push(TransactionInput {
            index,
            kind,
            value: Some(value),
        });
        Argument::Input(index)
    }

    /// Adds an object input.
    ///
    /// An object already used as an input is not added twice; its existing
    /// argument is returned and shared mutability is combined.
    pub fn object(&mut self, object: impl Into<ObjectInput>) -> Argument {
        let object = object.into();
        let object_id = object.object_id();
        let existing = self
            .data
            .inputs
            .iter_mut()
            .find(|input| input.object_id() == Some(object_id));
        match existing {
            Some(input) => {
                merge_object_value(&mut input.value, object.into_value());
                Argument::Input(input.index)
            }
            None => self.input(InputKind::Object, object.into_value()),
        }
    }

    /// Adds an object input from a resolved argument; pure arguments are
    /// added as pure inputs.
    pub fn call_arg(&mut self, arg: CallArg) -> Argument {
        match arg {
            CallArg::Object(object) => self.object(object),
            pure @ CallArg::Pure(_) => self.input(InputKind::Pure, InputValue::Resolved(pure)),
        }
    }

    /// Adds an owned or immutable object by reference.
    pub fn object_ref(&mut self, object: ObjectRef) -> Argument {
        self.object(object)
    }

    /// Adds a shared object by reference.
    pub fn shared_object_ref(&mut self, object: SharedObjectRef) -> Argument {
        self.object(object)
    }

    /// Adds a shared object.
    pub fn shared_object(
        &mut self,
        object_id: ObjectId,
        initial_shared_version: u64,
        mutable: bool,
    ) -> Argument {
        self.object(SharedObjectRef::new(object_id, initial_shared_version, mutable))
    }

    /// Adds an object being received.
    pub fn receiving_ref(&mut self, object: ObjectRef) -> Argument {
        self.object(ObjectArg::Receiving(object))
    }

    /// Adds a pure input holding the BCS encoding of `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if BCS serialization fails.
    pub fn pure<T: Serialize + ?Sized>(&mut self, value: &T) -> SuiResult<Argument> {
        let arg = Inputs::pure(value)?;
        Ok(self.input(InputKind::Pure, InputValue::Resolved(arg)))
    }

    /// Adds a pure input from already encoded bytes.
    pub fn pure_bytes(&mut self, bytes: impl Into<Vec<u8>>) -> Argument {
        self.input(
            InputKind::Pure,
            InputValue::Resolved(Inputs::pure_bytes(bytes)),
        )
    }

    /// Adds a pure input from a JSON literal under an explicit Move type.
    ///
    /// # Errors
    ///
    /// Returns an error if the type does not parse or is not a pure type,
    /// or the literal does not fit it.
    pub fn pure_typed(&mut self, value: &Json, type_str: &str) -> SuiResult<Argument> {
        let arg = Inputs::pure_typed(value, type_str)?;
        Ok(self.input(InputKind::Pure, InputValue::Resolved(arg)))
    }

    /// Adds a JSON literal whose type is inferred at build time from how
    /// commands use it.
    pub fn pure_json(&mut self, value: Json) -> Argument {
        self.input(InputKind::Pure, InputValue::Pure(value))
    }

    /// The gas coin.
    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    // Commands

    /// Appends a command and returns a handle to its result.
    ///
    /// Handles saturate at `u16::MAX` the same way input handles do.
    pub fn add(&mut self, command: Command) -> TransactionResult {
        // Saturates; `build_kind` rejects more than 65536 commands.
        let index = u16::try_from(self.data.commands.len()).unwrap_or(u16::MAX);
        self.data.commands.push(command);
        TransactionResult::new(index)
    }

    /// Calls `package::module::function`.
    ///
    /// # Errors
    ///
    /// Returns [`SuiError::InvalidTypeTag`] if the target is not of the form
    /// `package::module::function`.
    pub fn move_call(
        &mut self,
        target: &str,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Argument>,
    ) -> SuiResult<TransactionResult> {
        Ok(self.add(Command::move_call(target, type_arguments, arguments)?))
    }

    /// Transfers `objects` to `address`.
    pub fn transfer_objects(&mut self, objects: Vec<Argument>, address: Argument) -> TransactionResult {
        self.add(Command::transfer_objects(objects, address))
    }

    /// Splits `amounts` off `coin`.
    pub fn split_coins(&mut self, coin: Argument, amounts: Vec<Argument>) -> TransactionResult {
        self.add(Command::split_coins(coin, amounts))
    }

    /// Merges `sources` into `destination`.
    pub fn merge_coins(&mut self, destination: Argument, sources: Vec<Argument>) -> TransactionResult {
        self.add(Command::merge_coins(destination, sources))
    }

    /// Publishes a package.
    ///
    /// # Errors
    ///
    /// Returns an error if a module is invalid base64 or a dependency is not
    /// an address.
    pub fn publish<M, D>(
        &mut self,
        modules: impl IntoIterator<Item = M>,
        dependencies: impl IntoIterator<Item = D>,
    ) -> SuiResult<TransactionResult>
    where
        M: Into<ModuleBytes>,
        D: AsRef<str>,
    {
        Ok(self.add(Command::publish(modules, dependencies)?))
    }

    /// Upgrades `package`.
    ///
    /// # Errors
    ///
    /// Returns an error if a module is invalid base64 or a dependency is not
    /// an address.
    pub fn upgrade<M, D>(
        &mut self,
        modules: impl IntoIterator<Item = M>,
        dependencies: impl IntoIterator<Item = D>,
        package: ObjectId,
        ticket: Argument,
    ) -> SuiResult<TransactionResult>
    where
        M: Into<ModuleBytes>,
        D: AsRef<str>,
    {
        Ok(self.add(Command::upgrade(modules, dependencies, package, ticket)?))
    }

    /// Builds a vector from `elements`.
    pub fn make_move_vec(
        &mut self,
        element_type: Option<TypeTag>,
        elements: Vec<Argument>,
    ) -> TransactionResult {
        self.add(Command::make_move_vec(element_type, elements))
    }

    // Setters

    /// Sets the sender.
    pub fn set_sender(&mut self, sender: SuiAddress) {
        self.data.sender = Some(sender);
    }

    /// Sets the sender unless one is already set.
    pub fn set_sender_if_not_set(&mut self, sender: SuiAddress) {
        self.data.sender.get_or_insert(sender);
    }

    /// Sets the expiration.
    pub fn set_expiration(&mut self, expiration: TransactionExpiration) {
        self.data.expiration = Some(expiration);
    }

    /// Sets the gas price.
    pub fn set_gas_price(&mut self, price: u64) {
        self.data.gas_config.price = Some(price);
    }

    /// Sets the gas budget.
    pub fn set_gas_budget(&mut self, budget: u64) {
        self.data.gas_config.budget = Some(budget);
    }

    /// Sets the owner of the gas coins.
    pub fn set_gas_owner(&mut self, owner: SuiAddress) {
        self.data.gas_config.owner = Some(owner);
    }

    /// Sets the gas payment coins.
    ///
    /// # Errors
    ///
    /// Returns [`SuiError::TooManyGasObjects`] for more than 256 coins.
    pub fn set_gas_payment(&mut self, payment: Vec<ObjectRef>) -> SuiResult<()> {
        if payment.len() > MAX_GAS_OBJECTS {
            return Err(SuiError::TooManyGasObjects {
                count: payment.len(),
                max: MAX_GAS_OBJECTS,
            });
        }
        self.data.gas_config.payment = Some(payment);
        Ok(())
    }

    /// Resolves everything still missing and encodes the transaction.
    ///
    /// With [`BuildOptions::only_transaction_kind`] only the transaction
    /// kind is resolved and encoded; sender and gas are neither required
    /// nor looked up. Resolution mutates the transaction in place and is
    /// idempotent: building again performs no lookups.
    ///
    /// # Errors
    ///
    /// Returns the first error of any resolution phase; phases already
    /// completed keep their results.
    pub async fn build(&mut self, options: BuildOptions<'_>) -> SuiResult<Vec<u8>> {
        resolve::prepare(&mut self.data, &options).await?;
        self.data.to_bytes(options.only_transaction_kind)
    }
}

fn merge_object_value(existing: &mut Option<InputValue>, new: InputValue) {
    let Some(current) = existing.as_mut() else {
        *existing = Some(new);
        return;
    };
    match (current, new) {
        (
            InputValue::Resolved(CallArg::Object(ObjectArg::SharedObject(old))),
            InputValue::Resolved(CallArg::Object(ObjectArg::SharedObject(added))),
        ) => old.mutable |= added.mutable,
        (
            InputValue::Resolved(CallArg::Object(ObjectArg::SharedObject(old))),
            InputValue::Object(added),
        ) => old.mutable |= added.mutable.unwrap_or(false),
        (InputValue::Object(old), InputValue::Object(added)) => {
            old.mutable = match (old.mutable, added.mutable) {
                (None, None) => None,
                (a, b) => Some(a.unwrap_or(false) || b.unwrap_or(false)),
            };
        }
        (InputValue::Object(old), InputValue::Resolved(mut arg)) => {
            if let CallArg::Object(ObjectArg::SharedObject(shared)) = &mut arg {
                shared.mutable |= old.mutable.unwrap_or(false);
            }
            *existing = Some(InputValue::Resolved(arg));
        }
        _ => {}
    }
}
