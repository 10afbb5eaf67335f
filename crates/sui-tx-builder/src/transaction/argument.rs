//! Command arguments.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A reference to a value available to a command.
///
/// Variant indices follow the wire format:
/// - 0: GasCoin
/// - 1: Input
/// - 2: Result
/// - 3: NestedResult
///
/// In JSON an argument is an object tagged by `kind`, e.g.
/// `{"kind": "NestedResult", "index": 0, "resultIndex": 1}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Argument {
    /// The coin paying for gas.
    GasCoin,
    /// A transaction input, by position.
    Input(u16),
    /// The whole result of a command, by position.
    Result(u16),
    /// One value of a command that returns several, by command and value position.
    NestedResult(u16, u16),
}

impl Argument {
    /// Returns the input index if this argument refers to an input.
    pub fn input_index(&self) -> Option<u16> {
        match self {
            Self::Input(index) => Some(*index),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "Argument")]
enum ArgumentWire {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
enum ArgumentKind {
    GasCoin,
    Input { index: u16 },
    Result { index: u16 },
    NestedResult { index: u16, result_index: u16 },
}

impl From<Argument> for ArgumentKind {
    fn from(argument: Argument) -> Self {
        match argument {
            Argument::GasCoin => Self::GasCoin,
            Argument::Input(index) => Self::Input { index },
            Argument::Result(index) => Self::Result { index },
            Argument::NestedResult(index, result_index) => Self::NestedResult {
                index,
                result_index,
            },
        }
    }
}

impl From<ArgumentKind> for Argument {
    fn from(kind: ArgumentKind) -> Self {
        match kind {
            ArgumentKind::GasCoin => Self::GasCoin,
            ArgumentKind::Input { index } => Self::Input(index),
            ArgumentKind::Result { index } => Self::Result(index),
            ArgumentKind::NestedResult {
                index,
                result_index,
            } => Self::NestedResult(index, result_index),
        }
    }
}

impl Serialize for Argument {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            ArgumentKind::from(*self).serialize(serializer)
        } else {
            ArgumentWire::serialize(self, serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Argument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            ArgumentKind::deserialize(deserializer).map(Into::into)
        } else {
            ArgumentWire::deserialize(deserializer)
        }
    }
}
