//! Store identifiers.
//!
//! # Design
//! An `ObjectId` is 12 bytes rendered as 24 lowercase hex characters:
//! a 4-byte big-endian timestamp (seconds), 5 random bytes fixed for the
//! lifetime of the process, and a 3-byte big-endian counter. Comparing ids
//! byte-wise therefore orders them by creation within a process, which is
//! what listing relies on.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

const LEN: usize = 12;
const COUNTER_MASK: u32 = 0x00ff_ffff;

/// Opaque identifier assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; LEN]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid object id {0:?}: expected 24 hex characters")]
pub struct InvalidObjectId(pub String);

fn process_unique() -> &'static [u8; 5] {
    static BYTES: OnceLock<[u8; 5]> = OnceLock::new();
    BYTES.get_or_init(|| {
        let random = Uuid::new_v4();
        let mut out = [0u8; 5];
        out.copy_from_slice(&random.as_bytes()[..5]);
        out
    })
}

fn next_count() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| {
        let seed = Uuid::new_v4().as_bytes()[0] as u32;
        AtomicU32::new(seed << 8)
    });
    counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK
}

impl ObjectId {
    /// Generate a fresh id stamped with the current time.
    pub fn new() -> Self {
        let secs = chrono::Utc::now().timestamp() as u32;
        Self::from_parts(secs, process_unique(), next_count())
    }

    fn from_parts(secs: u32, unique: &[u8; 5], count: u32) -> Self {
        let mut bytes = [0u8; LEN];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(unique);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Whether `s` has the shape of an id this store could have issued.
    pub fn is_valid(s: &str) -> bool {
        s.len() == LEN * 2 && s.bytes().all(|b| b.is_ascii_hexdigit())
    }

    pub fn parse_str(s: &str) -> Result<Self, InvalidObjectId> {
        if !Self::is_valid(s) {
            return Err(InvalidObjectId(s.to_string()));
        }
        let mut bytes = [0u8; LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| InvalidObjectId(s.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_str(&s).map_err(serde::de::Error::custom)
    }
}
