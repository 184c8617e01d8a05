//! Flash blob primitive abstraction
//!
//! This module provides the `BlobStore` trait and implementations:
//! - `NvsBlobs`: For embedded systems using NOR flash (sequential-storage map)
//! - `MemoryBlobs`: RAM-backed, with write fault injection for power-loss testing
//! - `FileBlobs`: For std environments (testing, desktop) - requires `std` feature

mod memory;
mod nvs;

#[cfg(feature = "std")]
mod file;

pub use memory::{MemoryBlobs, MemoryBlobsError};
pub use nvs::{NvsBlobs, NvsError};

#[cfg(feature = "std")]
pub use file::{FileBlobs, FileBlobsError};

use core::fmt::{self, Debug};

/// Identifier of a single blob record on the flash medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RecordId(pub u16);

impl RecordId {
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Variable-length blob storage addressed by small integer IDs.
///
/// This is the only thing the pair store needs from the flash medium. It mirrors the
/// contract of ID-based NVS drivers: a record is written whole, and its length can only
/// be learned by reading it. Pair layout lives on [`PairStore`](crate::pair::PairStore).
pub trait BlobStore {
    /// Error type of the medium
    type Error: Debug;

    /// Read record `id` into `buf`.
    ///
    /// Returns `Ok(Some(len))` with the full stored length if the record exists, copying
    /// `min(len, buf.len())` bytes into `buf`. An empty `buf` only asks for the length.
    /// Returns `Ok(None)` if the record has never been written.
    fn read(&mut self, id: RecordId, buf: &mut [u8]) -> Result<Option<usize>, Self::Error>;

    /// Write record `id`, replacing any previous content.
    fn write(&mut self, id: RecordId, data: &[u8]) -> Result<(), Self::Error>;

    /// Drop every record. Used by reset tooling, never by normal operation.
    fn clear(&mut self) -> Result<(), Self::Error>;
}

impl<T: BlobStore + ?Sized> BlobStore for &mut T {
    type Error = T::Error;

    fn read(&mut self, id: RecordId, buf: &mut [u8]) -> Result<Option<usize>, Self::Error> {
        T::read(self, id, buf)
    }

    fn write(&mut self, id: RecordId, data: &[u8]) -> Result<(), Self::Error> {
        T::write(self, id, data)
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        T::clear(self)
    }
}
