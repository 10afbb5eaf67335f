//! Object digest type.
//!
//! A 32-byte digest identifying one version of an object. Digests are
//! displayed in base58 and encoded on the wire as a length-prefixed byte
//! vector.

use crate::error::{SuiError, SuiResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The length of a digest in bytes.
pub const DIGEST_LENGTH: usize = 32;

/// A 32-byte object digest.
///
/// # Example
///
/// ```rust
/// use sui_tx_builder::ObjectDigest;
///
/// let digest = ObjectDigest::new([1u8; 32]);
/// let parsed: ObjectDigest = digest.to_string().parse().unwrap();
/// assert_eq!(parsed, digest);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObjectDigest([u8; DIGEST_LENGTH]);

impl ObjectDigest {
    /// The "zero" digest (all zeros).
    pub const ZERO: Self = Self([0u8; DIGEST_LENGTH]);

    /// Creates a digest from a byte array.
    pub const fn new(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parses a digest from its base58 representation.
    pub fn from_base58(s: &str) -> SuiResult<Self> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SuiError::InvalidDigest(e.to_string()))?;
        Self::from_bytes(bytes)
    }

    /// Creates a digest from a byte slice of exactly 32 bytes.
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> SuiResult<Self> {
        let bytes = bytes.as_ref();
        if bytes.len() != DIGEST_LENGTH {
            return Err(SuiError::InvalidDigest(format!(
                "expected {} bytes, got {}",
                DIGEST_LENGTH,
                bytes.len()
            )));
        }
        let mut digest = [0u8; DIGEST_LENGTH];
        digest.copy_from_slice(bytes);
        Ok(Self(digest))
    }

    /// Returns the digest as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the base58 representation.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl fmt::Debug for ObjectDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectDigest({})", self.to_base58())
    }
}

impl fmt::Display for ObjectDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl FromStr for ObjectDigest {
    type Err = SuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for ObjectDigest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_base58())
        } else {
            // Length-prefixed on the wire, unlike addresses
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for ObjectDigest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_base58(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = serde_bytes::ByteBuf::deserialize(deserializer)?;
            Self::from_bytes(bytes.as_ref()).map_err(serde::de::Error::custom)
        }
    }
}

impl From<[u8; DIGEST_LENGTH]> for ObjectDigest {
    fn from(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }
}
