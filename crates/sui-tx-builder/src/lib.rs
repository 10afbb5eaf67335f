//! # Sui Transaction Builder
//!
//! Builds Sui programmable transactions and encodes them to canonical BCS.
//!
//! A transaction is assembled from inputs and commands. Inputs may be given
//! incompletely: objects by id alone, pure values as JSON literals whose Move
//! type is not yet known. An asynchronous build pipeline resolves them
//! through caller-supplied providers, selects gas coins, estimates the
//! budget with a dry run, and emits the transaction bytes.
//!
//! ## Quick Start
//!
//! ```rust
//! use sui_tx_builder::config::BuildOptions;
//! use sui_tx_builder::transaction::Transaction;
//! use sui_tx_builder::types::SuiAddress;
//!
//! # futures::executor::block_on(async {
//! let mut tx = Transaction::new();
//! let amount = tx.pure(&100u64).unwrap();
//! let coin = tx.split_coins(tx.gas(), vec![amount]);
//! let recipient = tx.pure(&SuiAddress::from_u64(0xb0b)).unwrap();
//! tx.transfer_objects(vec![coin.into()], recipient);
//!
//! // Every input is resolved, so no provider is needed for the kind.
//! let kind_bytes = tx.build(BuildOptions::kind_only()).await.unwrap();
//! let restored = Transaction::from_kind_bytes(&kind_bytes).unwrap();
//! assert_eq!(restored.get_data().commands, tx.get_data().commands);
//! # });
//! ```
//!
//! ## Modules
//!
//! - [`transaction`] - Transaction builder, commands, arguments and the build pipeline
//! - [`codec`] - Schema-driven BCS codec with a registry of the wire types
//! - [`api`] - Provider traits the pipeline resolves through, and the object cache
//! - [`config`] - Limits and options for building
//! - [`types`] - Addresses, digests and Move type tags
//! - [`error`] - The crate error type

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod api;
pub mod codec;
pub mod config;
pub mod error;
pub mod transaction;
pub mod types;

pub use config::{BuildOptions, TransactionConfig};
pub use error::{SuiError, SuiResult};

pub use transaction::{Argument, Command, Transaction, TransactionData, TransactionKind};
pub use types::{ObjectDigest, ObjectId, SuiAddress, TypeTag};

#[cfg(test)]
mod tests;
