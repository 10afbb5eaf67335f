//! Core ledger types.
//!
//! This module contains the fundamental types used throughout the crate:
//! addresses and object ids, object digests, and Move type tags.

mod address;
mod digest;
mod move_types;

pub use address::{ADDRESS_LENGTH, ObjectId, SuiAddress};
pub use digest::{DIGEST_LENGTH, ObjectDigest};
pub use move_types::{Identifier, MoveCallTarget, StructTag, TypeTag};
