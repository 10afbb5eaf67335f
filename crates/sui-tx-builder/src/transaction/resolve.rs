//! The build pipeline: fills in everything a transaction still lacks.
//!
//! Phases run in order, each skipped when its result is already present:
//!
//! 1. gas price
//! 2. pure encodings and object uses implied by built-in commands
//! 3. Move call signatures, which type the remaining arguments
//! 4. object references
//! 5. gas payment
//! 6. gas budget, from a dry run
//!
//! Kind-only builds skip 1, 5 and 6. A phase that fails leaves earlier
//! results in place, so a later build resumes where this one stopped.

use crate::api::{
    DryRunExecutor, ExecutionStatus, GasCostSummary, GasPriceSource, MoveSignatureSource,
    NormalizedType, ObjectInfo, ObjectResolver, Owner, TransactionProvider,
};
use crate::codec::{BcsType, registry};
use crate::config::BuildOptions;
use crate::error::{SuiError, SuiResult};
use crate::transaction::argument::Argument;
use crate::transaction::call_arg::{CallArg, ObjectArg, ObjectRef, SharedObjectRef};
use crate::transaction::command::{Command, ProgrammableMoveCall, WellKnownEncoding};
use crate::transaction::data::{InputValue, TransactionBlockData, TransactionInput};
use crate::transaction::pure::encode_pure;
use crate::types::ObjectId;
use futures::future::try_join_all;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// How the commands of a transaction use one object input.
#[derive(Debug, Clone, Copy, Default)]
struct ObjectUse {
    mutable: bool,
    /// Passed to a `Receiving<T>` parameter.
    receiving: bool,
}

impl ObjectUse {
    const BY_VALUE: Self = Self {
        mutable: true,
        receiving: false,
    };

    fn for_parameter(param: &NormalizedType) -> Self {
        Self {
            mutable: param.needs_mutable_object(),
            receiving: param.is_receiving(),
        }
    }
}

/// Object uses requested per input index.
type ObjectRequests = BTreeMap<u16, ObjectUse>;

pub(crate) async fn prepare(
    data: &mut TransactionBlockData,
    options: &BuildOptions<'_>,
) -> SuiResult<()> {
    let config = &options.config;
    config.validate()?;
    let only_kind = options.only_transaction_kind;
    if !only_kind && data.sender.is_none() {
        return Err(SuiError::missing("sender"));
    }

    info!(
        inputs = data.inputs.len(),
        commands = data.commands.len(),
        only_kind,
        "Resolving transaction"
    );

    if !only_kind && data.gas_config.price.is_none() {
        let price = provider(options, "gas price")?
            .get_reference_gas_price()
            .await?;
        debug!(price, "Resolved reference gas price");
        data.gas_config.price = Some(price);
    }

    let mut requests = ObjectRequests::new();
    let move_calls =
        apply_well_known_encodings(&mut data.inputs, &data.commands, &mut requests)?;

    if !move_calls.is_empty() {
        resolve_signatures(&mut data.inputs, &move_calls, &mut requests, options).await?;
    }

    resolve_objects(&mut data.inputs, &requests, options).await?;

    if !only_kind && data.gas_config.payment.is_none() {
        resolve_gas_payment(data, options).await?;
    }
    if let Some(payment) = &data.gas_config.payment {
        if payment.len() > config.max_gas_objects {
            return Err(SuiError::TooManyGasObjects {
                count: payment.len(),
                max: config.max_gas_objects,
            });
        }
    }

    if !only_kind && data.gas_config.budget.is_none() {
        resolve_gas_budget(data, options).await?;
    }

    Ok(())
}

fn provider<'a>(
    options: &BuildOptions<'a>,
    purpose: &str,
) -> SuiResult<&'a dyn TransactionProvider> {
    options.provider.ok_or_else(|| {
        SuiError::Config(format!("a transaction provider is required to resolve the {purpose}"))
    })
}

fn input_mut(inputs: &mut [TransactionInput], index: u16) -> SuiResult<&mut TransactionInput> {
    let len = inputs.len();
    inputs.get_mut(usize::from(index)).ok_or_else(|| {
        SuiError::transaction(format!(
            "argument refers to input {index}, but the transaction has {len} inputs"
        ))
    })
}

fn is_unresolved(inputs: &[TransactionInput], argument: &Argument) -> bool {
    argument
        .input_index()
        .and_then(|index| inputs.get(usize::from(index)))
        .is_some_and(|input| !input.is_resolved())
}

/// Applies built-in command encodings and returns the move calls that still
/// have unresolved arguments.
fn apply_well_known_encodings(
    inputs: &mut [TransactionInput],
    commands: &[Command],
    requests: &mut ObjectRequests,
) -> SuiResult<Vec<ProgrammableMoveCall>> {
    let mut move_calls = Vec::new();
    for command in commands {
        if let Command::MoveCall(call) = command {
            if call.arguments.iter().any(|arg| is_unresolved(inputs, arg)) {
                move_calls.push((**call).clone());
            }
            continue;
        }
        for (argument, encoding) in command.well_known_encodings() {
            let Some(index) = argument.input_index() else {
                continue;
            };
            let input = input_mut(inputs, index)?;
            match encoding {
                // Built-in commands take their objects by value.
                WellKnownEncoding::Object => {
                    request_object(input, ObjectUse::BY_VALUE, requests)?
                }
                WellKnownEncoding::Pure(shape) => encode_pure_input(input, &shape)?,
            }
        }
    }
    Ok(move_calls)
}

fn encode_pure_input(input: &mut TransactionInput, shape: &BcsType) -> SuiResult<()> {
    match &input.value {
        Some(InputValue::Pure(literal)) => {
            let registry = registry();
            let value = registry.value_from_json(shape, literal)?;
            let bytes = registry.encode_type(shape, &value)?;
            input.value = Some(InputValue::Resolved(CallArg::Pure(bytes)));
            Ok(())
        }
        Some(InputValue::Object(object)) => Err(SuiError::UnknownArgumentType(format!(
            "input {} holds object {} but is used as a pure {shape}",
            input.index, object.object_id
        ))),
        _ => Ok(()),
    }
}

fn request_object(
    input: &TransactionInput,
    usage: ObjectUse,
    requests: &mut ObjectRequests,
) -> SuiResult<()> {
    match &input.value {
        Some(InputValue::Object(_)) => {
            let entry = requests.entry(input.index).or_default();
            entry.mutable |= usage.mutable;
            entry.receiving |= usage.receiving;
            Ok(())
        }
        Some(InputValue::Pure(_)) => Err(SuiError::UnknownArgumentType(format!(
            "input {} holds a pure value but is used as an object",
            input.index
        ))),
        _ => Ok(()),
    }
}

fn is_signer(param: &NormalizedType) -> bool {
    match param {
        NormalizedType::Signer => true,
        NormalizedType::Reference(inner) | NormalizedType::MutableReference(inner) => {
            matches!(inner.as_ref(), NormalizedType::Signer)
        }
        _ => false,
    }
}

async fn resolve_signatures(
    inputs: &mut [TransactionInput],
    move_calls: &[ProgrammableMoveCall],
    requests: &mut ObjectRequests,
    options: &BuildOptions<'_>,
) -> SuiResult<()> {
    let provider = provider(options, "move call signatures")?;
    debug!(calls = move_calls.len(), "Fetching move function signatures");
    let signatures = try_join_all(move_calls.iter().map(|call| {
        provider.get_normalized_function(
            call.package,
            call.module.as_str(),
            call.function.as_str(),
        )
    }))
    .await?;

    for (call, signature) in move_calls.iter().zip(signatures) {
        let mut params = signature.parameters.as_slice();
        if let Some((last, rest)) = params.split_last() {
            if last.is_tx_context() {
                params = rest;
            }
        }
        if params.len() != call.arguments.len() {
            return Err(SuiError::ArgumentCountMismatch {
                function: call.target(),
                expected: params.len(),
                provided: call.arguments.len(),
            });
        }

        for (param, argument) in params.iter().zip(&call.arguments) {
            let Some(index) = argument.input_index() else {
                continue;
            };
            let input = input_mut(inputs, index)?;
            if input.is_resolved() {
                continue;
            }
            if is_signer(param) {
                return Err(SuiError::UnknownArgumentType(format!(
                    "{} takes a signer, which cannot be passed as input {index}",
                    call.target()
                )));
            }
            let Some(tag) = param.pure_type_tag() else {
                if !param.is_object_parameter() {
                    return Err(SuiError::UnknownArgumentType(format!(
                        "{} takes {param:?} at input {index}, which is neither an object nor pure",
                        call.target()
                    )));
                }
                request_object(input, ObjectUse::for_parameter(param), requests)?;
                continue;
            };
            match &input.value {
                Some(InputValue::Pure(literal)) => {
                    let bytes = encode_pure(literal, &tag)?;
                    input.value = Some(InputValue::Resolved(CallArg::Pure(bytes)));
                }
                Some(InputValue::Object(object)) => {
                    return Err(SuiError::UnknownArgumentType(format!(
                        "input {index} holds object {} but {} expects a pure {tag}",
                        object.object_id,
                        call.target()
                    )));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

async fn resolve_objects(
    inputs: &mut [TransactionInput],
    requests: &ObjectRequests,
    options: &BuildOptions<'_>,
) -> SuiResult<()> {
    let mut pending: Vec<(usize, ObjectId, ObjectUse)> = Vec::new();
    for (position, input) in inputs.iter().enumerate() {
        if let Some(InputValue::Object(object)) = &input.value {
            let mut usage = requests.get(&input.index).copied().unwrap_or_default();
            usage.mutable |= object.mutable.unwrap_or(false);
            pending.push((position, object.object_id, usage));
        }
    }
    if pending.is_empty() {
        return Ok(());
    }

    let mut seen = HashSet::new();
    let ids: Vec<ObjectId> = pending
        .iter()
        .map(|(_, id, _)| *id)
        .filter(|id| seen.insert(*id))
        .collect();

    let mut found: HashMap<ObjectId, ObjectInfo> = HashMap::new();
    let mut to_fetch = Vec::new();
    for id in ids {
        match options.cache.and_then(|cache| cache.get(&id)) {
            Some(info) => {
                found.insert(id, info);
            }
            None => to_fetch.push(id),
        }
    }

    if !to_fetch.is_empty() {
        let provider = provider(options, "object references")?;
        let chunk_size = options.config.max_objects_per_fetch;
        debug!(
            objects = to_fetch.len(),
            cached = found.len(),
            chunk_size,
            "Fetching objects"
        );
        let chunks: Vec<&[ObjectId]> = to_fetch.chunks(chunk_size).collect();
        let responses =
            try_join_all(chunks.iter().map(|chunk| provider.get_objects(chunk))).await?;
        for (chunk, response) in chunks.iter().zip(responses) {
            for info in chunk.iter().zip(response).filter_map(|(_, info)| info) {
                if let Some(cache) = options.cache {
                    cache.insert(info);
                }
                found.insert(info.object_id, info);
            }
        }
    }

    for (position, object_id, usage) in pending {
        let info = found
            .get(&object_id)
            .ok_or_else(|| SuiError::unresolvable(object_id, "not found"))?;
        let arg = match info.owner {
            Owner::Shared {
                initial_shared_version,
            } => ObjectArg::SharedObject(SharedObjectRef::new(
                object_id,
                initial_shared_version,
                usage.mutable,
            )),
            Owner::ObjectOwner(parent) => {
                return Err(SuiError::unresolvable(
                    object_id,
                    format!("owned by object {parent}"),
                ));
            }
            Owner::AddressOwner(_) if usage.receiving => {
                ObjectArg::Receiving(ObjectRef::new(object_id, info.version, info.digest))
            }
            Owner::AddressOwner(_) | Owner::Immutable => {
                ObjectArg::ImmOrOwnedObject(ObjectRef::new(object_id, info.version, info.digest))
            }
        };
        inputs[position].value = Some(InputValue::Resolved(CallArg::Object(arg)));
    }
    Ok(())
}

async fn resolve_gas_payment(
    data: &mut TransactionBlockData,
    options: &BuildOptions<'_>,
) -> SuiResult<()> {
    let owner = data
        .gas_config
        .owner
        .or(data.sender)
        .ok_or_else(|| SuiError::missing("sender"))?;
    let coins = provider(options, "gas payment")?
        .get_owned_objects(owner, &options.config.gas_coin_type)
        .await?;

    let used: HashSet<ObjectId> = data.input_object_ids().into_iter().collect();
    let payment: Vec<ObjectRef> = coins
        .into_iter()
        .filter(|coin| !used.contains(&coin.object_id))
        .take(options.config.max_gas_objects)
        .collect();
    if payment.is_empty() {
        return Err(SuiError::NoGasCoins { owner });
    }

    debug!(owner = %owner, coins = payment.len(), "Selected gas payment");
    data.gas_config.payment = Some(payment);
    Ok(())
}

async fn resolve_gas_budget(
    data: &mut TransactionBlockData,
    options: &BuildOptions<'_>,
) -> SuiResult<()> {
    let config = &options.config;
    let price = data
        .gas_config
        .price
        .ok_or_else(|| SuiError::missing("gasConfig.price"))?;

    let mut dry_run = data.clone();
    dry_run.gas_config.budget = Some(config.max_tx_gas);
    dry_run.gas_config.payment = Some(Vec::new());
    let tx_bytes = dry_run.build()?.to_bcs()?;

    let result = provider(options, "gas budget")?
        .dry_run(&tx_bytes)
        .await?;
    if let ExecutionStatus::Failure { error } = result.status {
        return Err(SuiError::DryRunFailed { message: error });
    }

    let overhead = u128::from(config.gas_safe_overhead) * u128::from(price);
    let budget = gas_budget(&result.gas_used, overhead);
    debug!(
        budget,
        computation = result.gas_used.computation_cost,
        storage = result.gas_used.storage_cost,
        rebate = result.gas_used.storage_rebate,
        "Estimated gas budget"
    );
    data.gas_config.budget = Some(budget);
    Ok(())
}

/// `max(computation + overhead, computation + storage - rebate + overhead)`,
/// clamped to the `u64` range.
pub(crate) fn gas_budget(gas_used: &GasCostSummary, overhead: u128) -> u64 {
    let overhead = i128::try_from(overhead).unwrap_or(i128::MAX);
    let computation = i128::from(gas_used.computation_cost);
    let base = computation.saturating_add(overhead);
    let net = computation
        .saturating_add(i128::from(gas_used.storage_cost))
        .saturating_sub(i128::from(gas_used.storage_rebate))
        .saturating_add(overhead);
    let budget = base.max(net).clamp(0, i128::from(u64::MAX));
    u64::try_from(budget).unwrap_or(u64::MAX)
}
