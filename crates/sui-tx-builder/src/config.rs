//! Configuration for transaction building.
//!
//! [`TransactionConfig`] holds the protocol limits and gas constants the
//! build pipeline uses; [`BuildOptions`] bundles it with the provider and
//! cache for one call to [`Transaction::build`](crate::transaction::Transaction::build).

use crate::api::{ObjectCache, TransactionProvider};
use crate::error::{SuiError, SuiResult};
use crate::types::TypeTag;
use std::fmt;

/// Most gas payment objects a transaction may carry.
pub const MAX_GAS_OBJECTS: usize = 256;

/// Gas units added on top of a dry run estimate, multiplied by the gas price.
pub const GAS_SAFE_OVERHEAD: u64 = 1000;

/// Largest gas budget a transaction may declare.
pub const MAX_TX_GAS: u64 = 50_000_000_000;

/// Objects requested per lookup.
pub const MAX_OBJECTS_PER_FETCH: usize = 50;

/// Coin type used for gas.
pub const GAS_COIN_TYPE: &str = "0x2::sui::SUI";

/// Limits and constants for the build pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionConfig {
    /// Maximum gas payment objects selected or accepted.
    /// Default: 256
    pub max_gas_objects: usize,
    /// Gas units of headroom added to the dry run estimate.
    /// Default: 1000
    pub gas_safe_overhead: u64,
    /// Budget used for the estimating dry run.
    /// Default: 50 000 000 000
    pub max_tx_gas: u64,
    /// Object ids per lookup request.
    /// Default: 50
    pub max_objects_per_fetch: usize,
    /// Coin type searched for gas payment.
    /// Default: `0x2::sui::SUI`
    pub gas_coin_type: String,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            max_gas_objects: MAX_GAS_OBJECTS,
            gas_safe_overhead: GAS_SAFE_OVERHEAD,
            max_tx_gas: MAX_TX_GAS,
            max_objects_per_fetch: MAX_OBJECTS_PER_FETCH,
            gas_coin_type: GAS_COIN_TYPE.to_string(),
        }
    }
}

impl TransactionConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> TransactionConfigBuilder {
        TransactionConfigBuilder::default()
    }

    /// Sets the maximum number of gas payment objects.
    #[must_use]
    pub fn with_max_gas_objects(mut self, max: usize) -> Self {
        self.max_gas_objects = max;
        self
    }

    /// Sets the gas headroom added to estimates.
    #[must_use]
    pub fn with_gas_safe_overhead(mut self, overhead: u64) -> Self {
        self.gas_safe_overhead = overhead;
        self
    }

    /// Sets the budget used for the estimating dry run.
    #[must_use]
    pub fn with_max_tx_gas(mut self, max: u64) -> Self {
        self.max_tx_gas = max;
        self
    }

    /// Sets how many objects are requested per lookup.
    #[must_use]
    pub fn with_max_objects_per_fetch(mut self, max: usize) -> Self {
        self.max_objects_per_fetch = max;
        self
    }

    /// Sets the coin type searched for gas payment.
    #[must_use]
    pub fn with_gas_coin_type(mut self, coin_type: impl Into<String>) -> Self {
        self.gas_coin_type = coin_type.into();
        self
    }

    /// Checks the configuration for values the pipeline cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`SuiError::Config`] if a limit is zero, the gas object limit
    /// exceeds the protocol maximum, or the gas coin type does not parse.
    pub fn validate(&self) -> SuiResult<()> {
        if self.max_objects_per_fetch == 0 {
            return Err(SuiError::Config(
                "max_objects_per_fetch must be at least 1".into(),
            ));
        }
        if self.max_gas_objects == 0 || self.max_gas_objects > MAX_GAS_OBJECTS {
            return Err(SuiError::Config(format!(
                "max_gas_objects must be between 1 and {MAX_GAS_OBJECTS}, got {}",
                self.max_gas_objects
            )));
        }
        if self.max_tx_gas == 0 {
            return Err(SuiError::Config("max_tx_gas must be at least 1".into()));
        }
        TypeTag::from_str_strict(&self.gas_coin_type).map_err(|e| {
            SuiError::Config(format!("invalid gas coin type {}: {e}", self.gas_coin_type))
        })?;
        Ok(())
    }
}

/// Builder for [`TransactionConfig`].
#[derive(Debug, Clone, Default)]
pub struct TransactionConfigBuilder {
    max_gas_objects: Option<usize>,
    gas_safe_overhead: Option<u64>,
    max_tx_gas: Option<u64>,
    max_objects_per_fetch: Option<usize>,
    gas_coin_type: Option<String>,
}

impl TransactionConfigBuilder {
    /// Sets the maximum number of gas payment objects.
    pub fn max_gas_objects(mut self, max: usize) -> Self {
        self.max_gas_objects = Some(max);
        self
    }

    /// Sets the gas headroom added to estimates.
    pub fn gas_safe_overhead(mut self, overhead: u64) -> Self {
        self.gas_safe_overhead = Some(overhead);
        self
    }

    /// Sets the budget used for the estimating dry run.
    pub fn max_tx_gas(mut self, max: u64) -> Self {
        self.max_tx_gas = Some(max);
        self
    }

    /// Sets how many objects are requested per lookup.
    pub fn max_objects_per_fetch(mut self, max: usize) -> Self {
        self.max_objects_per_fetch = Some(max);
        self
    }

    /// Sets the coin type searched for gas payment.
    pub fn gas_coin_type(mut self, coin_type: impl Into<String>) -> Self {
        self.gas_coin_type = Some(coin_type.into());
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// See [`TransactionConfig::validate`].
    pub fn build(self) -> SuiResult<TransactionConfig> {
        let default = TransactionConfig::default();
        let config = TransactionConfig {
            max_gas_objects: self.max_gas_objects.unwrap_or(default.max_gas_objects),
            gas_safe_overhead: self.gas_safe_overhead.unwrap_or(default.gas_safe_overhead),
            max_tx_gas: self.max_tx_gas.unwrap_or(default.max_tx_gas),
            max_objects_per_fetch: self
                .max_objects_per_fetch
                .unwrap_or(default.max_objects_per_fetch),
            gas_coin_type: self.gas_coin_type.unwrap_or(default.gas_coin_type),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Options for one build.
///
/// # Example
///
/// ```rust
/// use sui_tx_builder::config::BuildOptions;
///
/// // Encoding only the transaction kind needs no provider when every input
/// // is already resolved.
/// let options = BuildOptions::kind_only();
/// assert!(options.only_transaction_kind);
/// ```
#[derive(Clone, Default)]
pub struct BuildOptions<'a> {
    /// Encode only the transaction kind, skipping gas and sender.
    pub only_transaction_kind: bool,
    /// Network access for resolution; required whenever anything is unresolved.
    pub provider: Option<&'a dyn TransactionProvider>,
    /// Object states shared across builds.
    pub cache: Option<&'a ObjectCache>,
    /// Limits and constants.
    pub config: TransactionConfig,
}

impl<'a> BuildOptions<'a> {
    /// Options for a full build through `provider`.
    pub fn new(provider: &'a dyn TransactionProvider) -> Self {
        Self {
            provider: Some(provider),
            ..Self::default()
        }
    }

    /// Options for a kind-only build without a provider.
    pub fn kind_only() -> Self {
        Self {
            only_transaction_kind: true,
            ..Self::default()
        }
    }

    /// Sets whether only the transaction kind is encoded.
    #[must_use]
    pub fn with_only_transaction_kind(mut self, only_kind: bool) -> Self {
        self.only_transaction_kind = only_kind;
        self
    }

    /// Sets the provider.
    #[must_use]
    pub fn with_provider(mut self, provider: &'a dyn TransactionProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the object cache.
    #[must_use]
    pub fn with_cache(mut self, cache: &'a ObjectCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: TransactionConfig) -> Self {
        self.config = config;
        self
    }
}

impl fmt::Debug for BuildOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildOptions")
            .field("only_transaction_kind", &self.only_transaction_kind)
            .field("provider", &self.provider.map(|_| "<provider>"))
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish()
    }
}
