//! Pure value encoding from JSON literals.
//!
//! Literals become BCS bytes once their Move type is known, either given
//! explicitly or inferred from how a command uses them.

use crate::codec::{BcsType, registry};
use crate::error::SuiResult;
use crate::types::TypeTag;
use serde_json::Value as Json;

/// Encodes `value` as the pure form of `ty`.
///
/// `u64` and wider accept numbers or decimal strings, addresses accept
/// hex strings, `vector<u8>` accepts a UTF-8 string, and `Option<T>`
/// accepts `null` for `None`.
pub fn encode_pure(value: &Json, ty: &TypeTag) -> SuiResult<Vec<u8>> {
    let shape = BcsType::from_type_tag(ty)?;
    let registry = registry();
    let value = registry.value_from_json(&shape, value)?;
    registry.encode_type(&shape, &value)
}

/// Like [`encode_pure`], with the type given as a Move type string.
pub fn encode_pure_str(value: &Json, type_str: &str) -> SuiResult<Vec<u8>> {
    encode_pure(value, &TypeTag::from_str_strict(type_str)?)
}
