use std::{
    fmt,
    str::FromStr,
    sync::{
        atomic::{AtomicU32, Ordering},
        OnceLock,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub const OBJECT_ID_LEN: usize = 12;

const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// 12-byte document identifier: seconds since epoch, a per-process random
/// value and a wrapping counter, in that order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    pub fn new() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        let process = PROCESS_UNIQUE.get_or_init(|| rand::thread_rng().gen());
        let counter = COUNTER
            .get_or_init(|| AtomicU32::new(rand::thread_rng().gen_range(0..=COUNTER_MASK)))
            .fetch_add(1, Ordering::Relaxed)
            & COUNTER_MASK;

        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(process);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
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

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ObjectIdParseError {
    #[error("invalid object id length: expected 24 hex chars, got {0}")]
    InvalidLength(usize),
    #[error("invalid object id hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl FromStr for ObjectId {
    type Err = ObjectIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != OBJECT_ID_LEN * 2 {
            return Err(ObjectIdParseError::InvalidLength(s.len()));
        }
        let mut bytes = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
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
        ObjectId::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_hex() {
        let id = ObjectId::from_str("6728433b3bdeccb81751047a").unwrap();
        assert_eq!(id.to_string(), "6728433b3bdeccb81751047a");
    }

    #[test]
    fn rejects_bad_length() {
        assert_eq!(
            ObjectId::from_str("abcd"),
            Err(ObjectIdParseError::InvalidLength(4))
        );
    }

    #[test]
    fn rejects_non_hex() {
        let err = ObjectId::from_str("zz28433b3bdeccb81751047a").unwrap_err();
        assert!(matches!(err, ObjectIdParseError::InvalidHex(_)));
    }

    #[test]
    fn generated_ids_are_distinct_within_process() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
        // Same process, so the random middle section matches.
        assert_eq!(a.to_hex()[8..18], b.to_hex()[8..18]);
    }

    #[test]
    fn serializes_as_hex_string() {
        let id = ObjectId::from_str("61f5f484a2d21a1d4cf1b0e6").unwrap();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::json!("61f5f484a2d21a1d4cf1b0e6"));
        let back: ObjectId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }
}
