//! Build pipeline tests against an in-memory provider.

use crate::api::{
    DryRunExecutor, DryRunResult, ExecutionStatus, GasCostSummary, GasPriceSource,
    MoveSignatureSource, NormalizedFunction, NormalizedStruct, NormalizedType, ObjectCache,
    ObjectInfo, ObjectResolver, Owner,
};
use crate::config::{BuildOptions, TransactionConfig};
use crate::error::{SuiError, SuiResult};
use crate::transaction::{
    Argument, CallArg, Inputs, ObjectArg, ObjectRef, SharedObjectRef, Transaction,
    TransactionData,
};
use crate::types::{ObjectDigest, ObjectId, SuiAddress, TypeTag};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

const GAS_PRICE: u64 = 1000;

fn sender() -> SuiAddress {
    SuiAddress::from_u64(0xa11ce)
}

fn digest(seed: u64) -> ObjectDigest {
    ObjectDigest::new([seed as u8; 32])
}

fn owned(id: u64, owner: SuiAddress) -> ObjectInfo {
    ObjectInfo {
        object_id: SuiAddress::from_u64(id),
        version: id * 10,
        digest: digest(id),
        owner: Owner::AddressOwner(owner),
    }
}

fn shared(id: u64, initial_shared_version: u64) -> ObjectInfo {
    ObjectInfo {
        object_id: SuiAddress::from_u64(id),
        version: 99,
        digest: digest(id),
        owner: Owner::Shared {
            initial_shared_version,
        },
    }
}

fn coin_type() -> NormalizedType {
    NormalizedType::Struct(NormalizedStruct {
        address: SuiAddress::TWO,
        module: "coin".into(),
        name: "Coin".into(),
        type_arguments: vec![NormalizedType::TypeParameter(0)],
    })
}

fn tx_context() -> NormalizedType {
    NormalizedType::MutableReference(Box::new(NormalizedType::Struct(NormalizedStruct {
        address: SuiAddress::TWO,
        module: "tx_context".into(),
        name: "TxContext".into(),
        type_arguments: vec![],
    })))
}

#[derive(Default)]
struct MockProvider {
    objects: HashMap<ObjectId, ObjectInfo>,
    owned_coins: HashMap<SuiAddress, Vec<ObjectRef>>,
    functions: HashMap<String, NormalizedFunction>,
    dry_run_error: Option<String>,
    gas_price_calls: AtomicUsize,
    object_calls: AtomicUsize,
    signature_calls: AtomicUsize,
    coin_calls: AtomicUsize,
    dry_runs: Mutex<Vec<TransactionData>>,
}

impl MockProvider {
    fn new() -> Self {
        Self::default()
    }

    fn with_object(mut self, info: ObjectInfo) -> Self {
        self.objects.insert(info.object_id, info);
        self
    }

    fn with_coins(mut self, owner: SuiAddress, ids: &[u64]) -> Self {
        let coins = ids.iter().map(|id| owned(*id, owner).object_ref()).collect();
        self.owned_coins.insert(owner, coins);
        self
    }

    fn with_function(mut self, target: &str, parameters: Vec<NormalizedType>) -> Self {
        self.functions.insert(
            target.to_string(),
            NormalizedFunction {
                is_entry: true,
                parameters,
                return_: vec![],
            },
        );
        self
    }

    fn failing_dry_run(mut self, error: &str) -> Self {
        self.dry_run_error = Some(error.to_string());
        self
    }

    fn total_calls(&self) -> usize {
        self.gas_price_calls.load(Ordering::SeqCst)
            + self.object_calls.load(Ordering::SeqCst)
            + self.signature_calls.load(Ordering::SeqCst)
            + self.coin_calls.load(Ordering::SeqCst)
            + self.dry_runs.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectResolver for MockProvider {
    async fn get_objects(&self, ids: &[ObjectId]) -> SuiResult<Vec<Option<ObjectInfo>>> {
        self.object_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ids.iter().map(|id| self.objects.get(id).copied()).collect())
    }

    async fn get_owned_objects(
        &self,
        owner: SuiAddress,
        object_type: &str,
    ) -> SuiResult<Vec<ObjectRef>> {
        self.coin_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(object_type, "0x2::sui::SUI");
        Ok(self.owned_coins.get(&owner).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl MoveSignatureSource for MockProvider {
    async fn get_normalized_function(
        &self,
        package: ObjectId,
        module: &str,
        function: &str,
    ) -> SuiResult<NormalizedFunction> {
        self.signature_calls.fetch_add(1, Ordering::SeqCst);
        let target = format!("{}::{module}::{function}", package.to_short_string());
        self.functions
            .get(&target)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("function {target} not found").into())
    }
}

#[async_trait]
impl GasPriceSource for MockProvider {
    async fn get_reference_gas_price(&self) -> SuiResult<u64> {
        self.gas_price_calls.fetch_add(1, Ordering::SeqCst);
        Ok(GAS_PRICE)
    }
}

#[async_trait]
impl DryRunExecutor for MockProvider {
    async fn dry_run(&self, tx_bytes: &[u8]) -> SuiResult<DryRunResult> {
        self.dry_runs
            .lock()
            .unwrap()
            .push(TransactionData::from_bcs(tx_bytes)?);
        let status = match &self.dry_run_error {
            Some(error) => ExecutionStatus::Failure {
                error: error.clone(),
            },
            None => ExecutionStatus::Success,
        };
        Ok(DryRunResult {
            status,
            gas_used: GasCostSummary {
                computation_cost: 1_000_000,
                storage_cost: 2_000_000,
                storage_rebate: 500_000,
                non_refundable_storage_fee: 0,
            },
        })
    }
}

fn split_and_transfer(tx: &mut Transaction) {
    let amount = tx.pure_json(json!(1000));
    let coin = tx.split_coins(tx.gas(), vec![amount]);
    let recipient = tx.pure_json(json!("0xb0b"));
    tx.transfer_objects(vec![coin.into()], recipient);
}

#[tokio::test]
async fn test_full_build_fills_gas() {
    let provider = MockProvider::new().with_coins(sender(), &[1, 2]);
    let mut tx = Transaction::new();
    split_and_transfer(&mut tx);
    tx.set_sender(sender());

    let bytes = tx.build(BuildOptions::new(&provider)).await.unwrap();
    let data = TransactionData::from_bcs(&bytes).unwrap();

    assert_eq!(data.sender(), sender());
    let gas = data.gas_data();
    assert_eq!(gas.price, GAS_PRICE);
    assert_eq!(gas.owner, sender());
    assert_eq!(gas.payment.len(), 2);
    // max(1_000_000 + 1_000_000, 1_000_000 + 2_000_000 - 500_000 + 1_000_000)
    assert_eq!(gas.budget, 3_500_000);

    let pt = data.kind().programmable();
    assert_eq!(pt.inputs[0], Inputs::pure(&1000u64).unwrap());
    assert_eq!(
        pt.inputs[1],
        Inputs::pure(&SuiAddress::from_u64(0xb0b)).unwrap()
    );

    let dry_runs = provider.dry_runs.lock().unwrap();
    assert_eq!(dry_runs.len(), 1);
    assert_eq!(dry_runs[0].gas_data().budget, 50_000_000_000);
    assert!(dry_runs[0].gas_data().payment.is_empty());
}

#[tokio::test]
async fn test_build_is_idempotent() {
    let provider = MockProvider::new()
        .with_object(owned(5, sender()))
        .with_coins(sender(), &[1])
        .with_function("0x2::pay::split", vec![
            NormalizedType::MutableReference(Box::new(coin_type())),
            NormalizedType::U64,
            tx_context(),
        ]);
    let mut tx = Transaction::new();
    let coin = tx.object(SuiAddress::from_u64(5));
    let amount = tx.pure_json(json!("42"));
    tx.move_call("0x2::pay::split", vec![TypeTag::sui()], vec![coin, amount])
        .unwrap();
    tx.set_sender(sender());

    let first = tx.build(BuildOptions::new(&provider)).await.unwrap();
    let calls = provider.total_calls();
    let second = tx.build(BuildOptions::new(&provider)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(provider.total_calls(), calls);
    assert_eq!(provider.signature_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_move_call_signature_types_arguments() {
    let provider = MockProvider::new()
        .with_object(owned(5, sender()))
        .with_function("0x2::pay::split", vec![
            NormalizedType::MutableReference(Box::new(coin_type())),
            NormalizedType::U64,
            tx_context(),
        ]);
    let mut tx = Transaction::new();
    let coin = tx.object(SuiAddress::from_u64(5));
    let amount = tx.pure_json(json!(42));
    tx.move_call("0x2::pay::split", vec![TypeTag::sui()], vec![coin, amount])
        .unwrap();

    tx.build(BuildOptions::kind_only().with_provider(&provider))
        .await
        .unwrap();

    let inputs = &tx.get_data().inputs;
    assert_eq!(
        inputs[0].call_arg(),
        Some(&Inputs::object_ref(owned(5, sender()).object_ref()))
    );
    assert_eq!(inputs[1].call_arg(), Some(&Inputs::pure(&42u64).unwrap()));
    assert_eq!(provider.gas_price_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_argument_count_mismatch() {
    let provider = MockProvider::new().with_function("0x2::coin::zero", vec![tx_context()]);
    let mut tx = Transaction::new();
    let extra = tx.pure_json(json!(1));
    tx.move_call("0x2::coin::zero", vec![TypeTag::sui()], vec![extra])
        .unwrap();

    let err = tx
        .build(BuildOptions::kind_only().with_provider(&provider))
        .await
        .unwrap_err();
    match err {
        SuiError::ArgumentCountMismatch {
            function,
            expected,
            provided,
        } => {
            assert_eq!(function, "0x2::coin::zero");
            assert_eq!(expected, 0);
            assert_eq!(provided, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_shared_object_mutability_follows_signature() {
    let provider = MockProvider::new()
        .with_object(shared(8, 3))
        .with_object(shared(9, 4))
        .with_function("0x10::pool::read", vec![
            NormalizedType::Reference(Box::new(coin_type())),
        ])
        .with_function("0x10::pool::write", vec![
            NormalizedType::MutableReference(Box::new(coin_type())),
        ]);
    let mut tx = Transaction::new();
    let read_only = tx.object(SuiAddress::from_u64(8));
    let written = tx.object(SuiAddress::from_u64(9));
    tx.move_call("0x10::pool::read", vec![], vec![read_only])
        .unwrap();
    tx.move_call("0x10::pool::read", vec![], vec![written])
        .unwrap();
    tx.move_call("0x10::pool::write", vec![], vec![written])
        .unwrap();

    tx.build(BuildOptions::kind_only().with_provider(&provider))
        .await
        .unwrap();

    let inputs = &tx.get_data().inputs;
    assert_eq!(
        inputs[0].call_arg(),
        Some(&CallArg::Object(ObjectArg::SharedObject(SharedObjectRef::new(
            SuiAddress::from_u64(8),
            3,
            false
        ))))
    );
    assert_eq!(
        inputs[1].call_arg(),
        Some(&CallArg::Object(ObjectArg::SharedObject(SharedObjectRef::new(
            SuiAddress::from_u64(9),
            4,
            true
        ))))
    );
}

#[tokio::test]
async fn test_missing_object_is_unresolvable() {
    let provider = MockProvider::new();
    let mut tx = Transaction::new();
    let missing = tx.object(SuiAddress::from_u64(77));
    let recipient = tx.pure_json(json!("0x1"));
    tx.transfer_objects(vec![missing], recipient);

    let err = tx
        .build(BuildOptions::kind_only().with_provider(&provider))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SuiError::UnresolvableObject { object_id, .. } if object_id == SuiAddress::from_u64(77)
    ));
}

#[tokio::test]
async fn test_object_used_as_pure_value() {
    let provider = MockProvider::new().with_object(owned(5, sender()));
    let mut tx = Transaction::new();
    let coin = tx.object(SuiAddress::from_u64(5));
    tx.transfer_objects(vec![coin], Argument::Input(0));

    let err = tx
        .build(BuildOptions::kind_only().with_provider(&provider))
        .await
        .unwrap_err();
    assert!(matches!(err, SuiError::UnknownArgumentType(_)));
}

#[tokio::test]
async fn test_object_owned_object_is_unresolvable() {
    let mut child = owned(12, sender());
    child.owner = Owner::ObjectOwner(SuiAddress::from_u64(11));
    let provider = MockProvider::new().with_object(child);
    let mut tx = Transaction::new();
    let object = tx.object(SuiAddress::from_u64(12));
    let recipient = tx.pure_json(json!("0x1"));
    tx.transfer_objects(vec![object], recipient);

    let err = tx
        .build(BuildOptions::kind_only().with_provider(&provider))
        .await
        .unwrap_err();
    assert!(matches!(err, SuiError::UnresolvableObject { .. }));
}

#[tokio::test]
async fn test_gas_payment_excludes_inputs() {
    let provider = MockProvider::new()
        .with_object(owned(1, sender()))
        .with_coins(sender(), &[1, 2]);
    let mut tx = Transaction::new();
    let coin = tx.object(SuiAddress::from_u64(1));
    let recipient = tx.pure_json(json!("0xb0b"));
    tx.transfer_objects(vec![coin], recipient);
    tx.set_sender(sender());

    let bytes = tx.build(BuildOptions::new(&provider)).await.unwrap();
    let data = TransactionData::from_bcs(&bytes).unwrap();
    let payment: Vec<ObjectId> = data.gas_data().payment.iter().map(|c| c.object_id).collect();
    assert_eq!(payment, vec![SuiAddress::from_u64(2)]);
}

#[tokio::test]
async fn test_no_gas_coins() {
    let provider = MockProvider::new()
        .with_object(owned(1, sender()))
        .with_coins(sender(), &[1]);
    let mut tx = Transaction::new();
    let coin = tx.object(SuiAddress::from_u64(1));
    let recipient = tx.pure_json(json!("0xb0b"));
    tx.transfer_objects(vec![coin], recipient);
    tx.set_sender(sender());

    let err = tx.build(BuildOptions::new(&provider)).await.unwrap_err();
    assert!(matches!(err, SuiError::NoGasCoins { owner } if owner == sender()));
}

#[tokio::test]
async fn test_gas_owner_overrides_sender() {
    let sponsor = SuiAddress::from_u64(0x5905);
    let provider = MockProvider::new().with_coins(sponsor, &[3]);
    let mut tx = Transaction::new();
    split_and_transfer(&mut tx);
    tx.set_sender(sender());
    tx.set_gas_owner(sponsor);

    let bytes = tx.build(BuildOptions::new(&provider)).await.unwrap();
    let data = TransactionData::from_bcs(&bytes).unwrap();
    assert_eq!(data.gas_data().owner, sponsor);
    assert_eq!(data.gas_data().payment[0].object_id, SuiAddress::from_u64(3));
}

#[tokio::test]
async fn test_dry_run_failure() {
    let provider = MockProvider::new()
        .with_coins(sender(), &[1])
        .failing_dry_run("InsufficientCoinBalance");
    let mut tx = Transaction::new();
    split_and_transfer(&mut tx);
    tx.set_sender(sender());

    let err = tx.build(BuildOptions::new(&provider)).await.unwrap_err();
    assert!(matches!(
        err,
        SuiError::DryRunFailed { ref message } if message == "InsufficientCoinBalance"
    ));
    // Earlier phases keep their results.
    assert_eq!(tx.get_data().gas_config.price, Some(GAS_PRICE));
    assert!(tx.get_data().gas_config.payment.is_some());
    assert!(tx.get_data().gas_config.budget.is_none());
}

#[tokio::test]
async fn test_cache_is_consulted_and_filled() {
    let provider = MockProvider::new().with_object(owned(5, sender()));
    let cache = ObjectCache::new();
    cache.insert(owned(6, sender()));

    let mut tx = Transaction::new();
    let a = tx.object(SuiAddress::from_u64(5));
    let b = tx.object(SuiAddress::from_u64(6));
    tx.merge_coins(a, vec![b]);

    tx.build(BuildOptions::kind_only().with_provider(&provider).with_cache(&cache))
        .await
        .unwrap();

    assert_eq!(provider.object_calls.load(Ordering::SeqCst), 1);
    assert!(cache.get(&SuiAddress::from_u64(5)).is_some());
}

#[tokio::test]
async fn test_objects_fetched_in_chunks() {
    let mut provider = MockProvider::new();
    let mut tx = Transaction::new();
    let mut coins = Vec::new();
    for id in 1..=5 {
        provider = provider.with_object(owned(id, sender()));
        coins.push(tx.object(SuiAddress::from_u64(id)));
    }
    let destination = coins.remove(0);
    tx.merge_coins(destination, coins);

    let options = BuildOptions::kind_only()
        .with_provider(&provider)
        .with_config(TransactionConfig::default().with_max_objects_per_fetch(2));
    tx.build(options).await.unwrap();

    assert_eq!(provider.object_calls.load(Ordering::SeqCst), 3);
    assert!(tx.get_data().inputs.iter().all(|input| input.is_resolved()));
}

#[tokio::test]
async fn test_provider_required_for_unresolved_inputs() {
    let mut tx = Transaction::new();
    let object = tx.object(SuiAddress::from_u64(5));
    let recipient = tx.pure_json(json!("0x1"));
    tx.transfer_objects(vec![object], recipient);

    let err = tx.build(BuildOptions::kind_only()).await.unwrap_err();
    assert!(matches!(err, SuiError::Config(_)));
}

#[tokio::test]
async fn test_missing_sender_fails_before_lookups() {
    let provider = MockProvider::new();
    let mut tx = Transaction::new();
    split_and_transfer(&mut tx);

    let err = tx.build(BuildOptions::new(&provider)).await.unwrap_err();
    assert!(err.is_missing_field());
    assert_eq!(provider.total_calls(), 0);
}

#[tokio::test]
async fn test_untyped_literal_without_usage() {
    let mut tx = Transaction::new();
    tx.pure_json(json!(5));

    let err = tx.build(BuildOptions::kind_only()).await.unwrap_err();
    assert!(matches!(err, SuiError::UnknownArgumentType(_)));
}

#[tokio::test]
async fn test_signer_parameter_is_rejected() {
    let provider = MockProvider::new().with_function("0x10::auth::check", vec![
        NormalizedType::Reference(Box::new(NormalizedType::Signer)),
    ]);
    let mut tx = Transaction::new();
    let literal = tx.pure_json(json!("0x1"));
    tx.move_call("0x10::auth::check", vec![], vec![literal])
        .unwrap();

    let err = tx
        .build(BuildOptions::kind_only().with_provider(&provider))
        .await
        .unwrap_err();
    assert!(matches!(err, SuiError::UnknownArgumentType(_)));
}

#[tokio::test]
async fn test_vector_of_objects_parameter_is_rejected() {
    let provider = MockProvider::new()
        .with_object(owned(0x77, sender()))
        .with_function("0x2::pay::join_vec", vec![
            NormalizedType::MutableReference(Box::new(coin_type())),
            NormalizedType::Vector(Box::new(coin_type())),
        ]);
    let mut tx = Transaction::new();
    let gas = tx.gas();
    let coins = tx.object(SuiAddress::from_u64(0x77));
    tx.move_call("0x2::pay::join_vec", vec![TypeTag::sui()], vec![gas, coins])
        .unwrap();

    let err = tx
        .build(BuildOptions::kind_only().with_provider(&provider))
        .await
        .unwrap_err();
    assert!(matches!(err, SuiError::UnknownArgumentType(_)));
    assert!(!tx.get_data().inputs[0].is_resolved());
}

fn receiving(inner: NormalizedType) -> NormalizedType {
    NormalizedType::Struct(NormalizedStruct {
        address: SuiAddress::TWO,
        module: "transfer".into(),
        name: "Receiving".into(),
        type_arguments: vec![inner],
    })
}

#[tokio::test]
async fn test_receiving_parameter_resolves_owned_object() {
    let inbox = SuiAddress::from_u64(0x40);
    let mut frozen = owned(0x42, inbox);
    frozen.owner = Owner::Immutable;
    let provider = MockProvider::new()
        .with_object(shared(0x40, 6))
        .with_object(owned(0x41, inbox))
        .with_object(frozen.clone())
        .with_function("0x10::inbox::accept", vec![
            NormalizedType::MutableReference(Box::new(NormalizedType::Struct(NormalizedStruct {
                address: SuiAddress::from_u64(0x10),
                module: "inbox".into(),
                name: "Inbox".into(),
                type_arguments: vec![],
            }))),
            receiving(coin_type()),
        ]);
    let mut tx = Transaction::new();
    let target = tx.object(inbox);
    let sent = tx.object(SuiAddress::from_u64(0x41));
    let immutable = tx.object(SuiAddress::from_u64(0x42));
    tx.move_call("0x10::inbox::accept", vec![], vec![target, sent])
        .unwrap();
    tx.move_call("0x10::inbox::accept", vec![], vec![target, immutable])
        .unwrap();

    tx.build(BuildOptions::kind_only().with_provider(&provider))
        .await
        .unwrap();

    let inputs = &tx.get_data().inputs;
    assert_eq!(
        inputs[0].call_arg(),
        Some(&CallArg::Object(ObjectArg::SharedObject(SharedObjectRef::new(inbox, 6, true))))
    );
    assert_eq!(
        inputs[1].call_arg(),
        Some(&CallArg::Object(ObjectArg::Receiving(owned(0x41, inbox).object_ref())))
    );
    assert_eq!(
        inputs[2].call_arg(),
        Some(&CallArg::Object(ObjectArg::ImmOrOwnedObject(frozen.object_ref())))
    );
}

#[tokio::test]
async fn test_configured_gas_object_limit() {
    let mut tx = Transaction::new();
    split_and_transfer(&mut tx);
    tx.set_sender(sender());
    tx.set_gas_price(1);
    tx.set_gas_budget(1);
    tx.set_gas_payment((1..=3).map(|id| owned(id, sender()).object_ref()).collect())
        .unwrap();

    let options = BuildOptions::kind_only()
        .with_only_transaction_kind(false)
        .with_config(TransactionConfig::default().with_max_gas_objects(2));
    let err = tx.build(options).await.unwrap_err();
    assert!(matches!(err, SuiError::TooManyGasObjects { count: 3, max: 2 }));
}
