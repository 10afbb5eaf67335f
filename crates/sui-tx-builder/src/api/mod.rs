//! Provider interfaces for transaction resolution.
//!
//! - [`TransactionProvider`] - everything the build pipeline asks of the network
//! - [`ObjectCache`] - object states shared across builds
//! - [`response`] - types providers return

mod cache;
pub mod response;
mod traits;

pub use cache::ObjectCache;
pub use response::{
    DryRunResult, ExecutionStatus, GasCostSummary, NormalizedFunction, NormalizedStruct,
    NormalizedType, ObjectInfo, Owner,
};
pub use traits::{
    DryRunExecutor, GasPriceSource, MoveSignatureSource, ObjectResolver, TransactionProvider,
};
