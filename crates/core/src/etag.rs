//! Etag: 128-bit document version stamp
//!
//! An etag is made of two 64-bit halves:
//!
//! - `restarts`: coarse component, the generator's start time in microseconds
//! - `changes`: fine component, `sequence << 8 | category`
//!
//! Ordering compares `restarts` first, then `changes`, which is generation
//! order. Two encodings exist, both pure conversions on the same value:
//!
//! | Encoding | Layout | Used for |
//! |----------|--------|----------|
//! | storage-sort | `restarts` BE ++ `changes` BE | `by_etag` index key |
//! | canonical | UUID of `restarts` LE ++ `changes` LE | API responses, precondition checks |
//!
//! Byte-wise comparison of the canonical form does not follow generation
//! order; only the storage-sort form may be used as an index key.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Identifier category an etag was generated for
///
/// Etags of different categories are never compared for correctness
/// purposes. The category lives in the low byte of the `changes` half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EtagCategory {
    /// Live document mutations
    Documents = 1,
    /// Pending mutations staged inside a transaction
    DocumentTransactions = 2,
}

impl EtagCategory {
    /// Numeric code stored in the etag
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a category code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(EtagCategory::Documents),
            2 => Some(EtagCategory::DocumentTransactions),
            _ => None,
        }
    }

    /// Human readable name
    pub fn name(&self) -> &'static str {
        match self {
            EtagCategory::Documents => "documents",
            EtagCategory::DocumentTransactions => "document-transactions",
        }
    }
}

/// Invalid textual etag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid etag '{0}'")]
pub struct EtagParseError(pub String);

/// 128-bit, strictly ordered version stamp
///
/// ## Invariants
///
/// - `Etag::EMPTY` sorts before every generated etag
/// - Ordering is generation order within one generator lineage
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Etag {
    restarts: u64,
    changes: u64,
}

impl Etag {
    /// The empty etag ("expect no document")
    pub const EMPTY: Etag = Etag {
        restarts: 0,
        changes: 0,
    };

    /// Create an etag from its halves
    #[inline]
    pub const fn from_parts(restarts: u64, changes: u64) -> Self {
        Etag { restarts, changes }
    }

    /// Create an etag from a category, coarse component and sequence number
    #[inline]
    pub const fn compose(category: EtagCategory, restarts: u64, sequence: u64) -> Self {
        Etag {
            restarts,
            changes: (sequence << 8) | category.code() as u64,
        }
    }

    /// Coarse component
    #[inline]
    pub const fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Fine component (sequence and category)
    #[inline]
    pub const fn changes(&self) -> u64 {
        self.changes
    }

    /// Sequence number without the category byte
    #[inline]
    pub const fn sequence(&self) -> u64 {
        self.changes >> 8
    }

    /// Category this etag was generated for
    pub fn category(&self) -> Option<EtagCategory> {
        EtagCategory::from_code((self.changes & 0xFF) as u8)
    }

    /// True for `Etag::EMPTY`
    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Etag::EMPTY
    }

    /// Numeric value (generation order)
    #[inline]
    pub const fn as_u128(&self) -> u128 {
        ((self.restarts as u128) << 64) | self.changes as u128
    }

    // =========================================================================
    // Storage-sort encoding
    // =========================================================================

    /// Encode for the `by_etag` index: byte order equals generation order
    pub fn to_sortable_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        BigEndian::write_u64(&mut bytes[..8], self.restarts);
        BigEndian::write_u64(&mut bytes[8..], self.changes);
        bytes
    }

    /// Decode an index key produced by [`Etag::to_sortable_bytes`]
    pub fn from_sortable_bytes(bytes: &[u8; 16]) -> Self {
        Etag {
            restarts: BigEndian::read_u64(&bytes[..8]),
            changes: BigEndian::read_u64(&bytes[8..]),
        }
    }

    // =========================================================================
    // Canonical encoding
    // =========================================================================

    /// Canonical external value
    pub fn to_uuid(&self) -> Uuid {
        let mut bytes = [0u8; 16];
        LittleEndian::write_u64(&mut bytes[..8], self.restarts);
        LittleEndian::write_u64(&mut bytes[8..], self.changes);
        Uuid::from_bytes(bytes)
    }

    /// Decode a canonical external value
    pub fn from_uuid(uuid: Uuid) -> Self {
        let bytes = uuid.as_bytes();
        Etag {
            restarts: LittleEndian::read_u64(&bytes[..8]),
            changes: LittleEndian::read_u64(&bytes[8..]),
        }
    }
}

impl fmt::Display for Etag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uuid().hyphenated())
    }
}

impl fmt::Debug for Etag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Etag({})", self)
    }
}

impl FromStr for Etag {
    type Err = EtagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Etag::from_uuid)
            .map_err(|_| EtagParseError(s.to_string()))
    }
}

impl Serialize for Etag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Etag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
