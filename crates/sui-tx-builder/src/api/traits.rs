//! Capabilities the build pipeline needs from the network.
//!
//! The crate performs no I/O itself. Callers plug in whatever client they
//! use by implementing these traits; anything implementing all four is a
//! [`TransactionProvider`].

use crate::api::response::{DryRunResult, NormalizedFunction, ObjectInfo};
use crate::error::SuiResult;
use crate::transaction::ObjectRef;
use crate::types::{ObjectId, SuiAddress};
use async_trait::async_trait;

/// Looks up objects and owned coins.
#[async_trait]
pub trait ObjectResolver: Send + Sync {
    /// Fetches the current state of `ids`, in order; `None` for missing objects.
    async fn get_objects(&self, ids: &[ObjectId]) -> SuiResult<Vec<Option<ObjectInfo>>>;

    /// Lists objects of `object_type` owned by `owner`.
    async fn get_owned_objects(
        &self,
        owner: SuiAddress,
        object_type: &str,
    ) -> SuiResult<Vec<ObjectRef>>;

    /// Fetches a single object.
    async fn get_object(&self, id: ObjectId) -> SuiResult<Option<ObjectInfo>> {
        Ok(self.get_objects(&[id]).await?.into_iter().next().flatten())
    }
}

/// Looks up Move function signatures.
#[async_trait]
pub trait MoveSignatureSource: Send + Sync {
    /// Fetches the normalized signature of `package::module::function`.
    async fn get_normalized_function(
        &self,
        package: ObjectId,
        module: &str,
        function: &str,
    ) -> SuiResult<NormalizedFunction>;
}

/// Reports the reference gas price.
#[async_trait]
pub trait GasPriceSource: Send + Sync {
    /// The reference gas price of the current epoch.
    async fn get_reference_gas_price(&self) -> SuiResult<u64>;
}

/// Executes transactions without committing them.
#[async_trait]
pub trait DryRunExecutor: Send + Sync {
    /// Dry-runs BCS-encoded transaction data.
    async fn dry_run(&self, tx_bytes: &[u8]) -> SuiResult<DryRunResult>;
}

/// Everything the build pipeline may ask of the network.
pub trait TransactionProvider:
    ObjectResolver + MoveSignatureSource + GasPriceSource + DryRunExecutor
{
}

impl<T> TransactionProvider for T where
    T: ObjectResolver + MoveSignatureSource + GasPriceSource + DryRunExecutor
{
}
