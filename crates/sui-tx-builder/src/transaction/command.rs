//! Commands of a programmable transaction.

use crate::codec::BcsType;
use crate::error::{SuiError, SuiResult};
use crate::transaction::argument::Argument;
use crate::types::{Identifier, MoveCallTarget, ObjectId, TypeTag};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A call to a Move function.
///
/// On the wire the target is split into package, module and function.
/// In JSON it is the single string `package::module::function`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProgrammableMoveCall {
    /// The package containing the module.
    pub package: ObjectId,
    /// The module name.
    pub module: Identifier,
    /// The function name.
    pub function: Identifier,
    /// Type arguments of the function.
    pub type_arguments: Vec<TypeTag>,
    /// Arguments of the function.
    pub arguments: Vec<Argument>,
}

impl ProgrammableMoveCall {
    /// Creates a move call from a `package::module::function` target.
    pub fn new(
        target: &str,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Argument>,
    ) -> SuiResult<Self> {
        let MoveCallTarget {
            package,
            module,
            function,
        } = MoveCallTarget::from_str_strict(target)?;
        Ok(Self {
            package,
            module,
            function,
            type_arguments,
            arguments,
        })
    }

    /// Returns the `package::module::function` target, with a short package address.
    pub fn target(&self) -> String {
        format!(
            "{}::{}::{}",
            self.package.to_short_string(),
            self.module,
            self.function
        )
    }
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "ProgrammableMoveCall")]
struct MoveCallWire {
    package: ObjectId,
    module: Identifier,
    function: Identifier,
    type_arguments: Vec<TypeTag>,
    arguments: Vec<Argument>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveCallJson {
    target: String,
    type_arguments: Vec<TypeTag>,
    arguments: Vec<Argument>,
}

impl Serialize for ProgrammableMoveCall {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            MoveCallJson {
                target: self.target(),
                type_arguments: self.type_arguments.clone(),
                arguments: self.arguments.clone(),
            }
            .serialize(serializer)
        } else {
            MoveCallWire::serialize(self, serializer)
        }
    }
}

impl<'de> Deserialize<'de> for ProgrammableMoveCall {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let call = MoveCallJson::deserialize(deserializer)?;
            Self::new(&call.target, call.type_arguments, call.arguments)
                .map_err(serde::de::Error::custom)
        } else {
            MoveCallWire::deserialize(deserializer)
        }
    }
}

/// A single step of a programmable transaction.
///
/// Variant indices follow the wire format, `MoveCall = 0` through `Upgrade = 6`.
/// In JSON a command is an object tagged by `kind`, e.g.
/// `{"kind": "SplitCoins", "coin": {...}, "amounts": [...]}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Call a Move function.
    MoveCall(Box<ProgrammableMoveCall>),
    /// Send objects to an address.
    TransferObjects {
        /// Objects to transfer.
        objects: Vec<Argument>,
        /// Recipient address (a pure address argument).
        address: Argument,
    },
    /// Split amounts off a coin, producing one new coin per amount.
    SplitCoins {
        /// Coin to split.
        coin: Argument,
        /// Amounts to split off (pure `u64` arguments).
        amounts: Vec<Argument>,
    },
    /// Merge coins into a destination coin.
    MergeCoins {
        /// Coin receiving the balance.
        destination: Argument,
        /// Coins consumed.
        sources: Vec<Argument>,
    },
    /// Publish a package.
    Publish {
        /// Compiled module bytecode.
        modules: Vec<Vec<u8>>,
        /// Packages the new package depends on.
        dependencies: Vec<ObjectId>,
    },
    /// Build a vector from arguments.
    MakeMoveVec {
        /// Element type, required when the elements are not objects.
        element_type: Option<TypeTag>,
        /// Vector elements.
        elements: Vec<Argument>,
    },
    /// Upgrade a package.
    Upgrade {
        /// Compiled module bytecode.
        modules: Vec<Vec<u8>>,
        /// Packages the upgraded package depends on.
        dependencies: Vec<ObjectId>,
        /// The package being upgraded.
        package: ObjectId,
        /// The upgrade ticket.
        ticket: Argument,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Command")]
enum CommandWire {
    MoveCall(Box<ProgrammableMoveCall>),
    TransferObjects {
        objects: Vec<Argument>,
        address: Argument,
    },
    SplitCoins {
        coin: Argument,
        amounts: Vec<Argument>,
    },
    MergeCoins {
        destination: Argument,
        sources: Vec<Argument>,
    },
    Publish {
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectId>,
    },
    MakeMoveVec {
        element_type: Option<TypeTag>,
        elements: Vec<Argument>,
    },
    Upgrade {
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectId>,
        package: ObjectId,
        ticket: Argument,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Command", tag = "kind", rename_all_fields = "camelCase")]
enum CommandKind {
    MoveCall(Box<ProgrammableMoveCall>),
    TransferObjects {
        objects: Vec<Argument>,
        address: Argument,
    },
    SplitCoins {
        coin: Argument,
        amounts: Vec<Argument>,
    },
    MergeCoins {
        destination: Argument,
        sources: Vec<Argument>,
    },
    Publish {
        #[serde(with = "base64_modules")]
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectId>,
    },
    MakeMoveVec {
        #[serde(rename = "type")]
        element_type: Option<TypeTag>,
        elements: Vec<Argument>,
    },
    Upgrade {
        #[serde(with = "base64_modules")]
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectId>,
        package: ObjectId,
        ticket: Argument,
    },
}

impl Serialize for Command {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            CommandKind::serialize(self, serializer)
        } else {
            CommandWire::serialize(self, serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Command {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            CommandKind::deserialize(deserializer)
        } else {
            CommandWire::deserialize(deserializer)
        }
    }
}

mod base64_modules {
    use super::BASE64;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(modules: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(modules.iter().map(|module| BASE64.encode(module)))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|module| BASE64.decode(module).map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Compiled module bytecode, raw or base64-encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleBytes {
    /// Raw bytecode.
    Raw(Vec<u8>),
    /// Base64-encoded bytecode.
    Base64(String),
}

impl ModuleBytes {
    /// Returns the raw bytecode, decoding base64 if needed.
    pub fn into_bytes(self) -> SuiResult<Vec<u8>> {
        match self {
            Self::Raw(bytes) => Ok(bytes),
            Self::Base64(encoded) => Ok(BASE64.decode(encoded)?),
        }
    }
}

impl From<Vec<u8>> for ModuleBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Raw(bytes)
    }
}

impl From<&[u8]> for ModuleBytes {
    fn from(bytes: &[u8]) -> Self {
        Self::Raw(bytes.to_vec())
    }
}

impl From<String> for ModuleBytes {
    fn from(encoded: String) -> Self {
        Self::Base64(encoded)
    }
}

impl From<&str> for ModuleBytes {
    fn from(encoded: &str) -> Self {
        Self::Base64(encoded.to_string())
    }
}

/// How a built-in command needs an argument to be encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WellKnownEncoding {
    /// The argument must be an object.
    Object,
    /// The argument must be a pure value of this shape.
    Pure(BcsType),
}

fn decode_modules<M>(modules: impl IntoIterator<Item = M>) -> SuiResult<Vec<Vec<u8>>>
where
    M: Into<ModuleBytes>,
{
    modules.into_iter().map(|m| m.into().into_bytes()).collect()
}

fn normalize_dependencies<D>(dependencies: impl IntoIterator<Item = D>) -> SuiResult<Vec<ObjectId>>
where
    D: AsRef<str>,
{
    dependencies
        .into_iter()
        .map(|d| ObjectId::from_hex(d.as_ref()))
        .collect()
}

impl Command {
    /// A move call to `package::module::function`.
    pub fn move_call(
        target: &str,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Argument>,
    ) -> SuiResult<Self> {
        Ok(Self::MoveCall(Box::new(ProgrammableMoveCall::new(
            target,
            type_arguments,
            arguments,
        )?)))
    }

    /// Transfers `objects` to `address`.
    pub fn transfer_objects(objects: Vec<Argument>, address: Argument) -> Self {
        Self::TransferObjects { objects, address }
    }

    /// Splits `amounts` off `coin`.
    pub fn split_coins(coin: Argument, amounts: Vec<Argument>) -> Self {
        Self::SplitCoins { coin, amounts }
    }

    /// Merges `sources` into `destination`.
    pub fn merge_coins(destination: Argument, sources: Vec<Argument>) -> Self {
        Self::MergeCoins {
            destination,
            sources,
        }
    }

    /// Publishes `modules`; dependencies are address strings such as `"0x2"`.
    pub fn publish<M, D>(
        modules: impl IntoIterator<Item = M>,
        dependencies: impl IntoIterator<Item = D>,
    ) -> SuiResult<Self>
    where
        M: Into<ModuleBytes>,
        D: AsRef<str>,
    {
        Ok(Self::Publish {
            modules: decode_modules(modules)?,
            dependencies: normalize_dependencies(dependencies)?,
        })
    }

    /// Upgrades `package` using the upgrade `ticket`.
    pub fn upgrade<M, D>(
        modules: impl IntoIterator<Item = M>,
        dependencies: impl IntoIterator<Item = D>,
        package: ObjectId,
        ticket: Argument,
    ) -> SuiResult<Self>
    where
        M: Into<ModuleBytes>,
        D: AsRef<str>,
    {
        Ok(Self::Upgrade {
            modules: decode_modules(modules)?,
            dependencies: normalize_dependencies(dependencies)?,
            package,
            ticket,
        })
    }

    /// Builds a vector of `elements`.
    pub fn make_move_vec(element_type: Option<TypeTag>, elements: Vec<Argument>) -> Self {
        Self::MakeMoveVec {
            element_type,
            elements,
        }
    }

    /// Name of the command variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MoveCall(_) => "MoveCall",
            Self::TransferObjects { .. } => "TransferObjects",
            Self::SplitCoins { .. } => "SplitCoins",
            Self::MergeCoins { .. } => "MergeCoins",
            Self::Publish { .. } => "Publish",
            Self::MakeMoveVec { .. } => "MakeMoveVec",
            Self::Upgrade { .. } => "Upgrade",
        }
    }

    /// Every argument the command references, in field order.
    pub fn arguments(&self) -> Vec<Argument> {
        match self {
            Self::MoveCall(call) => call.arguments.clone(),
            Self::TransferObjects { objects, address } => {
                objects.iter().copied().chain([*address]).collect()
            }
            Self::SplitCoins { coin, amounts } => [*coin].into_iter().chain(amounts.iter().copied()).collect(),
            Self::MergeCoins {
                destination,
                sources,
            } => [*destination]
                .into_iter()
                .chain(sources.iter().copied())
                .collect(),
            Self::Publish { .. } => vec![],
            Self::MakeMoveVec { elements, .. } => elements.clone(),
            Self::Upgrade { ticket, .. } => vec![*ticket],
        }
    }

    /// Encodings that built-in commands require of their arguments.
    ///
    /// Move calls return nothing here; their encodings come from the
    /// function signature.
    pub fn well_known_encodings(&self) -> Vec<(Argument, WellKnownEncoding)> {
        let objects = |args: &[Argument]| {
            args.iter()
                .map(|arg| (*arg, WellKnownEncoding::Object))
                .collect::<Vec<_>>()
        };
        match self {
            Self::MoveCall(_) | Self::Publish { .. } => vec![],
            Self::TransferObjects { objects: objs, address } => {
                let mut out = objects(objs);
                out.push((*address, WellKnownEncoding::Pure(BcsType::Address)));
                out
            }
            Self::SplitCoins { coin, amounts } => {
                let mut out = objects(&[*coin]);
                out.extend(
                    amounts
                        .iter()
                        .map(|amount| (*amount, WellKnownEncoding::Pure(BcsType::U64))),
                );
                out
            }
            Self::MergeCoins {
                destination,
                sources,
            } => {
                let mut out = objects(&[*destination]);
                out.extend(objects(sources));
                out
            }
            Self::MakeMoveVec {
                element_type,
                elements,
            } => match element_type.as_ref().map(BcsType::from_type_tag) {
                Some(Ok(shape)) => elements
                    .iter()
                    .map(|element| (*element, WellKnownEncoding::Pure(shape.clone())))
                    .collect(),
                _ => objects(elements),
            },
            Self::Upgrade { ticket, .. } => objects(&[*ticket]),
        }
    }
}

impl From<ProgrammableMoveCall> for Command {
    fn from(call: ProgrammableMoveCall) -> Self {
        Self::MoveCall(Box::new(call))
    }
}

impl TryFrom<&Command> for ProgrammableMoveCall {
    type Error = SuiError;

    fn try_from(command: &Command) -> Result<Self, Self::Error> {
        match command {
            Command::MoveCall(call) => Ok((**call).clone()),
            other => Err(SuiError::transaction(format!(
                "expected a MoveCall command, found {}",
                other.kind()
            ))),
        }
    }
}
