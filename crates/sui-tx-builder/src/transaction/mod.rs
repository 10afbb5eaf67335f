//! Programmable transaction building.
//!
//! A [`Transaction`] collects inputs and commands. Inputs may be left
//! incomplete: an object given only by id, or a JSON literal whose Move type
//! is not yet known. [`Transaction::build`] resolves them through a
//! [`TransactionProvider`](crate::api::TransactionProvider), fills in gas,
//! and produces the BCS bytes of [`TransactionData`] or, for kind-only
//! builds, of [`TransactionKind`].
//!
//! # Example: Split and Transfer
//!
//! ```rust,ignore
//! use sui_tx_builder::transaction::Transaction;
//! use sui_tx_builder::config::BuildOptions;
//!
//! let mut tx = Transaction::new();
//! let amount = tx.pure(&1_000u64)?;
//! let coin = tx.split_coins(tx.gas(), vec![amount]);
//! let recipient = tx.pure(&recipient_address)?;
//! tx.transfer_objects(vec![coin.into()], recipient);
//! tx.set_sender(sender);
//!
//! let bytes = tx.build(BuildOptions::new(&provider)).await?;
//! ```
//!
//! # Example: Move Call With Inferred Arguments
//!
//! ```rust,ignore
//! use serde_json::json;
//!
//! let mut tx = Transaction::new();
//! let pool = tx.object(pool_id);
//! let amount = tx.pure_json(json!("2500"));
//! tx.move_call("0xdee9::pool::deposit", vec![coin_type], vec![pool, amount])?;
//!
//! // The signature of `deposit` types `amount` and decides whether `pool`
//! // is needed mutably.
//! let bytes = tx.build(BuildOptions::new(&provider)).await?;
//! ```

pub mod argument;
pub mod builder;
pub mod call_arg;
pub mod command;
pub mod data;
pub mod pure;
mod resolve;

pub use argument::Argument;
pub use builder::{NestedResults, ObjectInput, Transaction, TransactionResult};
pub use call_arg::{
    CallArg, Inputs, ObjectArg, ObjectRef, SharedObjectRef, is_mutable_shared_object_input,
    is_shared_object_input,
};
pub use command::{Command, ModuleBytes, ProgrammableMoveCall, WellKnownEncoding};
pub use data::{
    GasConfig, GasData, InputKind, InputValue, ProgrammableTransaction, SNAPSHOT_VERSION,
    TransactionBlockData, TransactionData, TransactionDataV1, TransactionExpiration,
    TransactionInput, TransactionKind, UnresolvedObject,
};
pub use pure::{encode_pure, encode_pure_str};
