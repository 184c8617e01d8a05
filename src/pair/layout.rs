//! Mapping from pair slots to flash record IDs
//!
//! ```text
//! id 0            pair count (u16 le)
//! id 1 + 3i + 0   namespace of slot i (NUL terminated)
//! id 1 + 3i + 1   key of slot i (NUL terminated)
//! id 1 + 3i + 2   value of slot i
//! ```

use core::fmt;

use crate::blob::RecordId;

/// Record holding the number of live pairs.
pub const PAIR_COUNT_ID: RecordId = RecordId(0);

/// Number of records making up one pair.
pub const RECORDS_PER_PAIR: u16 = 3;

/// Largest number of slots whose records all have an ID below `u16::MAX`.
pub const MAX_PAIRS: u16 = (u16::MAX - 1) / RECORDS_PER_PAIR;

/// Position of a live pair, in `0..count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotIndex(u16);

impl SlotIndex {
    /// Returns `None` if the slot records would not be addressable.
    pub const fn new(index: u16) -> Option<Self> {
        if index < MAX_PAIRS {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    /// The three record IDs of this slot.
    pub const fn records(self) -> PairRecords {
        let base = 1 + self.0 * RECORDS_PER_PAIR;
        PairRecords {
            namespace: RecordId(base),
            key: RecordId(base + 1),
            value: RecordId(base + 2),
        }
    }

    /// The slot below this one, if any.
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairRecords {
    pub namespace: RecordId,
    pub key: RecordId,
    pub value: RecordId,
}
