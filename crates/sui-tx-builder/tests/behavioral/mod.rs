//! Behavioral tests for the transaction builder.
//!
//! These tests verify that the builder behaves correctly in various scenarios
//! without requiring a live network.

mod building_tests {
    use sui_tx_builder::codec::registry;
    use sui_tx_builder::config::BuildOptions;
    use sui_tx_builder::transaction::{ObjectRef, Transaction, TransactionData, TransactionKind};
    use sui_tx_builder::types::{ObjectDigest, SuiAddress, TypeTag};
    use sui_tx_builder::SuiError;

    fn full_options() -> BuildOptions<'static> {
        BuildOptions::kind_only().with_only_transaction_kind(false)
    }

    fn gas_ref(id: u64) -> ObjectRef {
        ObjectRef::new(SuiAddress::from_u64(id), 7, ObjectDigest::new([9; 32]))
    }

    #[tokio::test]
    async fn test_split_and_transfer_with_gas_set() {
        let sender = SuiAddress::from_u64(0xa11ce);
        let mut tx = Transaction::new();
        let amount = tx.pure_typed(&serde_json::json!(100), "u64").unwrap();
        let coin = tx.split_coins(tx.gas(), vec![amount]);
        let recipient = tx.pure(&SuiAddress::from_u64(0xb0b)).unwrap();
        tx.transfer_objects(vec![coin.into()], recipient);
        tx.set_sender(sender);
        tx.set_gas_price(1);
        tx.set_gas_budget(1);
        tx.set_gas_payment(vec![gas_ref(3)]).unwrap();

        let bytes = tx.build(full_options()).await.unwrap();
        assert!(!bytes.is_empty());

        let decoded = registry().decode_json("TransactionData", &bytes).unwrap();
        let sender_hex = decoded["V1"]["sender"].as_str().unwrap();
        assert_eq!(SuiAddress::from_hex(sender_hex).unwrap(), sender);
        assert_eq!(TransactionData::from_bcs(&bytes).unwrap().sender(), sender);
    }

    #[tokio::test]
    async fn test_move_call_target_round_trips() {
        let mut tx = Transaction::new();
        tx.move_call(
            "0x2::coin::zero",
            vec![TypeTag::from_str_strict("0x2::sui::SUI").unwrap()],
            vec![],
        )
        .unwrap();

        let bytes = tx.build(BuildOptions::kind_only()).await.unwrap();
        let decoded = registry().decode_json("TransactionKind", &bytes).unwrap();
        let call = &decoded["ProgrammableTransaction"]["commands"][0]["MoveCall"];
        assert_eq!(call["target"], "0x2::coin::zero");

        let type_argument = call["typeArguments"][0].as_str().unwrap();
        assert_eq!(
            TypeTag::from_str_strict(type_argument).unwrap().to_string(),
            "0x2::sui::SUI"
        );

        let kind = TransactionKind::from_bcs(&bytes).unwrap();
        assert_eq!(kind.programmable().commands.len(), 1);
    }

    #[test]
    fn test_too_many_gas_objects() {
        let mut tx = Transaction::new();
        let payment: Vec<ObjectRef> = (0..257).map(gas_ref).collect();

        let err = tx.set_gas_payment(payment).unwrap_err();
        assert!(matches!(
            err,
            SuiError::TooManyGasObjects {
                count: 257,
                max: 256
            }
        ));
        assert!(tx.get_data().gas_config.payment.is_none());
    }

    #[test]
    fn test_missing_gas_fields_are_reported() {
        let mut tx = Transaction::new();
        tx.set_sender(SuiAddress::ONE);
        tx.set_gas_price(1);
        tx.set_gas_payment(vec![gas_ref(3)]).unwrap();

        let err = tx.get_data().build().unwrap_err();
        assert!(err.is_missing_field());
        assert!(err.to_string().contains("gasConfig.budget"));
    }

    #[tokio::test]
    async fn test_budget_without_provider_is_a_config_error() {
        let mut tx = Transaction::new();
        tx.set_sender(SuiAddress::ONE);
        tx.set_gas_price(1);
        tx.set_gas_payment(vec![gas_ref(3)]).unwrap();

        let err = tx.build(full_options()).await.unwrap_err();
        assert!(matches!(err, SuiError::Config(_)));
    }

    #[tokio::test]
    async fn test_transfer_matches_reference_layout() {
        let sender = SuiAddress::new([0x01; 32]);
        let recipient = SuiAddress::new([0x02; 32]);
        let gas = ObjectRef::new(SuiAddress::new([0xCC; 32]), 5, ObjectDigest::new([0xDD; 32]));

        let mut tx = Transaction::new();
        let to = tx.pure(&recipient).unwrap();
        let amount = tx.pure(&1_000u64).unwrap();
        let coin = tx.split_coins(tx.gas(), vec![amount]);
        tx.transfer_objects(vec![coin.into()], to);
        tx.set_sender(sender);
        tx.set_gas_payment(vec![gas]).unwrap();
        tx.set_gas_price(1000);
        tx.set_gas_budget(2_000_000);
        let bytes = tx.build(full_options()).await.unwrap();

        let mut expected = vec![0x00, 0x00];
        expected.extend_from_slice(&[0x02, 0x00, 32]);
        expected.extend_from_slice(&[0x02; 32]);
        expected.extend_from_slice(&[0x00, 8]);
        expected.extend_from_slice(&1_000u64.to_le_bytes());
        expected.extend_from_slice(&[0x02]);
        expected.extend_from_slice(&[0x02, 0x00, 0x01, 0x01, 0x01, 0x00]);
        expected.extend_from_slice(&[0x01, 0x01, 0x02, 0x00, 0x00, 0x01, 0x00, 0x00]);
        expected.extend_from_slice(&[0x01; 32]);
        expected.push(0x01);
        expected.extend_from_slice(&[0xCC; 32]);
        expected.extend_from_slice(&5u64.to_le_bytes());
        expected.push(32);
        expected.extend_from_slice(&[0xDD; 32]);
        expected.extend_from_slice(&[0x01; 32]);
        expected.extend_from_slice(&1000u64.to_le_bytes());
        expected.extend_from_slice(&2_000_000u64.to_le_bytes());
        expected.push(0x00);

        assert_eq!(bytes, expected);
    }

    #[tokio::test]
    async fn test_kind_bytes_restore_commands() {
        let mut tx = Transaction::new();
        let amount = tx.pure(&5u64).unwrap();
        let coins = tx.split_coins(tx.gas(), vec![amount, amount]);
        let [first, second] = coins.destructure::<2>();
        tx.merge_coins(first, vec![second]);

        let bytes = tx.build(BuildOptions::kind_only()).await.unwrap();
        let restored = Transaction::from_kind_bytes(&bytes).unwrap();
        assert_eq!(restored.get_data().commands, tx.get_data().commands);
        assert_eq!(restored.get_data().inputs.len(), 1);
        assert!(restored.get_data().sender.is_none());
    }
}

mod resolution_tests {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use sui_tx_builder::api::{
        DryRunExecutor, DryRunResult, GasPriceSource, MoveSignatureSource, NormalizedFunction,
        NormalizedStruct, NormalizedType, ObjectInfo, ObjectResolver, Owner,
    };
    use sui_tx_builder::config::BuildOptions;
    use sui_tx_builder::transaction::{CallArg, ObjectArg, ObjectRef, Transaction};
    use sui_tx_builder::types::{ObjectDigest, ObjectId, SuiAddress};
    use sui_tx_builder::SuiResult;

    /// Serves a fixed set of objects and function signatures.
    struct StaticProvider {
        objects: HashMap<ObjectId, ObjectInfo>,
        functions: HashMap<String, NormalizedFunction>,
    }

    #[async_trait]
    impl ObjectResolver for StaticProvider {
        async fn get_objects(&self, ids: &[ObjectId]) -> SuiResult<Vec<Option<ObjectInfo>>> {
            Ok(ids.iter().map(|id| self.objects.get(id).copied()).collect())
        }

        async fn get_owned_objects(
            &self,
            _owner: SuiAddress,
            _object_type: &str,
        ) -> SuiResult<Vec<ObjectRef>> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl MoveSignatureSource for StaticProvider {
        async fn get_normalized_function(
            &self,
            _package: ObjectId,
            module: &str,
            function: &str,
        ) -> SuiResult<NormalizedFunction> {
            self.functions
                .get(&format!("{module}::{function}"))
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("unknown function {module}::{function}").into())
        }
    }

    #[async_trait]
    impl GasPriceSource for StaticProvider {
        async fn get_reference_gas_price(&self) -> SuiResult<u64> {
            Ok(1)
        }
    }

    #[async_trait]
    impl DryRunExecutor for StaticProvider {
        async fn dry_run(&self, _tx_bytes: &[u8]) -> SuiResult<DryRunResult> {
            Err(anyhow::anyhow!("dry runs are not served").into())
        }
    }

    fn pool_param(mutable: bool) -> NormalizedType {
        let pool = Box::new(NormalizedType::Struct(NormalizedStruct {
            address: SuiAddress::from_u64(0xdee9),
            module: "pool".to_string(),
            name: "Pool".to_string(),
            type_arguments: vec![],
        }));
        if mutable {
            NormalizedType::MutableReference(pool)
        } else {
            NormalizedType::Reference(pool)
        }
    }

    fn signature(parameters: Vec<NormalizedType>) -> NormalizedFunction {
        NormalizedFunction {
            is_entry: false,
            parameters,
            return_: vec![],
        }
    }

    #[tokio::test]
    async fn test_shared_object_used_mutably_once_is_mutable() {
        let pool_id = SuiAddress::from_u64(0x900d);
        let provider = StaticProvider {
            objects: HashMap::from([(
                pool_id,
                ObjectInfo {
                    object_id: pool_id,
                    version: 40,
                    digest: ObjectDigest::new([4; 32]),
                    owner: Owner::Shared {
                        initial_shared_version: 12,
                    },
                },
            )]),
            functions: HashMap::from([
                ("pool::price".to_string(), signature(vec![pool_param(false)])),
                ("pool::swap".to_string(), signature(vec![pool_param(true)])),
            ]),
        };

        let mut tx = Transaction::new();
        let pool = tx.object(pool_id);
        tx.move_call("0xdee9::pool::price", vec![], vec![pool]).unwrap();
        tx.move_call("0xdee9::pool::swap", vec![], vec![pool]).unwrap();

        tx.build(BuildOptions::kind_only().with_provider(&provider))
            .await
            .unwrap();

        assert_eq!(tx.get_data().inputs.len(), 1);
        match tx.get_data().inputs[0].call_arg() {
            Some(CallArg::Object(ObjectArg::SharedObject(shared))) => {
                assert!(shared.mutable);
                assert_eq!(shared.initial_shared_version, 12);
            }
            other => panic!("unexpected input: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_signature_lookup_failure_propagates() {
        let provider = StaticProvider {
            objects: HashMap::new(),
            functions: HashMap::new(),
        };
        let mut tx = Transaction::new();
        let amount = tx.pure_json(serde_json::json!(1));
        tx.move_call("0x2::coin::mint", vec![], vec![amount]).unwrap();

        let err = tx
            .build(BuildOptions::kind_only().with_provider(&provider))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("coin::mint"));
        assert!(!tx.get_data().inputs[0].is_resolved());
    }
}

mod snapshot_tests {
    use serde_json::json;
    use sui_tx_builder::transaction::{InputValue, Transaction, SNAPSHOT_VERSION};
    use sui_tx_builder::types::SuiAddress;
    use sui_tx_builder::SuiError;

    fn partial_transaction() -> Transaction {
        let mut tx = Transaction::new();
        let pool = tx.object(SuiAddress::from_u64(0x900d));
        let amount = tx.pure_json(json!("2500"));
        tx.move_call("0xdee9::pool::deposit", vec![], vec![pool, amount])
            .unwrap();
        tx.set_sender(SuiAddress::ONE);
        tx
    }

    #[test]
    fn test_snapshot_restores_unresolved_inputs() {
        let tx = partial_transaction();
        let snapshot = tx.serialize().unwrap();
        let restored = Transaction::from_serialized(&snapshot).unwrap();

        assert_eq!(restored.get_data(), tx.get_data());
        assert_eq!(restored.get_data().version, SNAPSHOT_VERSION);
        assert!(matches!(
            restored.get_data().inputs[1].value,
            Some(InputValue::Pure(ref literal)) if *literal == json!("2500")
        ));
    }

    #[test]
    fn test_snapshot_preserves_input_indices() {
        let tx = partial_transaction();
        let mut restored = Transaction::from_serialized(&tx.serialize().unwrap()).unwrap();

        for (position, input) in restored.get_data().inputs.iter().enumerate() {
            assert_eq!(usize::from(input.index), position);
        }

        // New inputs continue after the restored ones; existing ones dedupe.
        let again = restored.object(SuiAddress::from_u64(0x900d));
        let extra = restored.pure(&1u8).unwrap();
        assert_eq!(again.input_index(), Some(0));
        assert_eq!(extra.input_index(), Some(2));
    }

    #[test]
    fn test_snapshot_rejects_unknown_version() {
        let snapshot = partial_transaction().serialize().unwrap();
        let mut json: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
        json["version"] = json!(2);

        let err = Transaction::from_serialized(&json.to_string()).unwrap_err();
        assert!(matches!(err, SuiError::InvalidSnapshot(_)));
    }
}

mod codec_tests {
    use num_bigint::BigUint;
    use proptest::prelude::*;
    use sui_tx_builder::codec::{BcsType, Value, registry};
    use sui_tx_builder::transaction::{
        Argument, CallArg, Command, GasData, ObjectArg, ObjectRef, ProgrammableMoveCall,
        ProgrammableTransaction, SharedObjectRef, TransactionExpiration,
    };
    use sui_tx_builder::types::{Identifier, ObjectDigest, StructTag, SuiAddress, TypeTag};
    use sui_tx_builder::{TransactionData, TransactionKind};

    fn argument() -> impl Strategy<Value = Argument> {
        prop_oneof![
            Just(Argument::GasCoin),
            any::<u16>().prop_map(Argument::Input),
            any::<u16>().prop_map(Argument::Result),
            (any::<u16>(), any::<u16>()).prop_map(|(a, b)| Argument::NestedResult(a, b)),
        ]
    }

    fn address() -> impl Strategy<Value = SuiAddress> {
        any::<[u8; 32]>().prop_map(SuiAddress::new)
    }

    fn identifier(pattern: &'static str) -> impl Strategy<Value = Identifier> {
        pattern.prop_map(|name| Identifier::new(name).unwrap())
    }

    fn type_tag() -> impl Strategy<Value = TypeTag> {
        let leaf = prop_oneof![
            Just(TypeTag::Bool),
            Just(TypeTag::U8),
            Just(TypeTag::U16),
            Just(TypeTag::U32),
            Just(TypeTag::U64),
            Just(TypeTag::U128),
            Just(TypeTag::U256),
            Just(TypeTag::Address),
            Just(TypeTag::Signer),
        ];
        leaf.prop_recursive(3, 16, 3, |inner| {
            prop_oneof![
                inner.clone().prop_map(TypeTag::vector),
                (
                    address(),
                    identifier("[a-z][a-z0-9_]{0,11}"),
                    identifier("[A-Z][A-Za-z0-9]{0,11}"),
                    prop::collection::vec(inner, 0..3),
                )
                    .prop_map(|(address, module, name, params)| {
                        TypeTag::struct_tag(StructTag::new(address, module, name, params))
                    }),
            ]
        })
    }

    fn move_call() -> impl Strategy<Value = Command> {
        (
            address(),
            identifier("[a-z][a-z0-9_]{0,11}"),
            identifier("[a-z][a-z0-9_]{0,15}"),
            prop::collection::vec(type_tag(), 0..3),
            prop::collection::vec(argument(), 0..4),
        )
            .prop_map(|(package, module, function, type_arguments, arguments)| {
                Command::MoveCall(Box::new(ProgrammableMoveCall {
                    package,
                    module,
                    function,
                    type_arguments,
                    arguments,
                }))
            })
    }

    fn command() -> impl Strategy<Value = Command> {
        let arguments = || prop::collection::vec(argument(), 0..8);
        let modules = || prop::collection::vec(prop::collection::vec(any::<u8>(), 0..48), 0..3);
        let dependencies = || prop::collection::vec(address(), 0..3);
        prop_oneof![
            move_call(),
            (arguments(), argument()).prop_map(|(objects, address)| {
                Command::transfer_objects(objects, address)
            }),
            (argument(), arguments()).prop_map(|(coin, amounts)| Command::split_coins(coin, amounts)),
            (argument(), arguments()).prop_map(|(destination, sources)| {
                Command::merge_coins(destination, sources)
            }),
            (modules(), dependencies()).prop_map(|(modules, dependencies)| Command::Publish {
                modules,
                dependencies,
            }),
            (prop::option::of(type_tag()), arguments())
                .prop_map(|(element_type, elements)| Command::make_move_vec(element_type, elements)),
            (modules(), dependencies(), address(), argument()).prop_map(
                |(modules, dependencies, package, ticket)| Command::Upgrade {
                    modules,
                    dependencies,
                    package,
                    ticket,
                }
            ),
        ]
    }

    fn object_ref() -> impl Strategy<Value = ObjectRef> {
        (address(), any::<u64>(), any::<[u8; 32]>()).prop_map(|(id, version, digest)| {
            ObjectRef::new(id, version, ObjectDigest::new(digest))
        })
    }

    fn call_arg() -> impl Strategy<Value = CallArg> {
        prop_oneof![
            prop::collection::vec(any::<u8>(), 0..64).prop_map(CallArg::Pure),
            object_ref().prop_map(|object| CallArg::Object(ObjectArg::ImmOrOwnedObject(object))),
            (address(), any::<u64>(), any::<bool>()).prop_map(|(id, version, mutable)| {
                CallArg::Object(ObjectArg::SharedObject(SharedObjectRef::new(id, version, mutable)))
            }),
            object_ref().prop_map(|object| CallArg::Object(ObjectArg::Receiving(object))),
        ]
    }

    fn transaction_data() -> impl Strategy<Value = TransactionData> {
        let expiration = prop_oneof![
            Just(TransactionExpiration::None),
            any::<u64>().prop_map(TransactionExpiration::Epoch),
        ];
        (
            prop::collection::vec(call_arg(), 0..4),
            prop::collection::vec(command(), 0..4),
            address(),
            prop::collection::vec(object_ref(), 0..3),
            address(),
            any::<u64>(),
            any::<u64>(),
            expiration,
        )
            .prop_map(
                |(inputs, commands, sender, payment, owner, price, budget, expiration)| {
                    TransactionData::new(
                        TransactionKind::ProgrammableTransaction(ProgrammableTransaction {
                            inputs,
                            commands,
                        }),
                        sender,
                        GasData {
                            payment,
                            owner,
                            price,
                            budget,
                        },
                        expiration,
                    )
                },
            )
    }

    proptest! {
        #[test]
        fn test_registry_matches_typed_commands(command in command()) {
            let typed = bcs::to_bytes(&command).unwrap();
            let value = registry().decode("Command", &typed).unwrap();
            prop_assert_eq!(registry().encode("Command", &value).unwrap(), typed.clone());
            prop_assert_eq!(bcs::from_bytes::<Command>(&typed).unwrap(), command);
        }

        #[test]
        fn test_command_json_forms_agree(command in command()) {
            let typed = bcs::to_bytes(&command).unwrap();
            let json = serde_json::to_value(&command).unwrap();
            prop_assert_eq!(registry().encode_json("Command", &json).unwrap(), typed.clone());
            prop_assert_eq!(serde_json::from_value::<Command>(json).unwrap(), command);

            let registry_json = registry().decode_json("Command", &typed).unwrap();
            prop_assert_eq!(registry().encode_json("Command", &registry_json).unwrap(), typed);
        }

        #[test]
        fn test_registry_matches_typed_call_args(arg in call_arg()) {
            let typed = bcs::to_bytes(&arg).unwrap();
            let value = registry().decode("CallArg", &typed).unwrap();
            prop_assert_eq!(registry().encode("CallArg", &value).unwrap(), typed);
        }

        #[test]
        fn test_transaction_data_round_trip(data in transaction_data()) {
            let typed = data.to_bcs().unwrap();
            prop_assert_eq!(TransactionData::from_bcs(&typed).unwrap(), data);

            let value = registry().decode("TransactionData", &typed).unwrap();
            prop_assert_eq!(registry().encode("TransactionData", &value).unwrap(), typed.clone());

            let json = registry().decode_json("TransactionData", &typed).unwrap();
            prop_assert_eq!(registry().encode_json("TransactionData", &json).unwrap(), typed);
        }

        #[test]
        fn test_registry_integers_match_bcs(
            small in any::<u16>(),
            medium in any::<u32>(),
            large in any::<u128>(),
            wide in any::<[u8; 32]>(),
        ) {
            let registry = registry();
            let cases = [
                (BcsType::U16, Value::U16(small), bcs::to_bytes(&small).unwrap()),
                (BcsType::U32, Value::U32(medium), bcs::to_bytes(&medium).unwrap()),
                (BcsType::U128, Value::U128(large), bcs::to_bytes(&large).unwrap()),
                (BcsType::U256, Value::U256(BigUint::from_bytes_le(&wide)), wide.to_vec()),
            ];
            for (ty, value, typed) in cases {
                prop_assert_eq!(registry.encode_type(&ty, &value).unwrap(), typed.clone());
                prop_assert_eq!(registry.decode_type(&ty, &typed).unwrap(), value);
            }
        }

        #[test]
        fn test_registry_nested_vectors_match_bcs(
            numbers in prop::collection::vec(prop::collection::vec(any::<u64>(), 0..6), 0..6),
            blobs in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 0..6),
        ) {
            let registry = registry();

            let ty = BcsType::vector(BcsType::vector(BcsType::U64));
            let value = Value::Vector(
                numbers
                    .iter()
                    .map(|row| Value::Vector(row.iter().copied().map(Value::U64).collect()))
                    .collect(),
            );
            let typed = bcs::to_bytes(&numbers).unwrap();
            prop_assert_eq!(registry.encode_type(&ty, &value).unwrap(), typed.clone());
            prop_assert_eq!(registry.decode_type(&ty, &typed).unwrap(), value);

            let ty = BcsType::vector(BcsType::vector(BcsType::U8));
            let value = Value::Vector(blobs.iter().cloned().map(Value::Bytes).collect());
            let typed = bcs::to_bytes(&blobs).unwrap();
            prop_assert_eq!(registry.encode_type(&ty, &value).unwrap(), typed.clone());
            prop_assert_eq!(registry.decode_type(&ty, &typed).unwrap(), value);
        }

        #[test]
        fn test_truncated_commands_are_rejected(command in command(), cut in 1usize..4) {
            let typed = bcs::to_bytes(&command).unwrap();
            let truncated = &typed[..typed.len().saturating_sub(cut)];
            prop_assert!(registry().decode("Command", truncated).is_err());
        }
    }
}
