//! RAM-backed blob store.
//!
//! Holds records in a `BTreeMap`. Writes can be made to fail after a given number of
//! successful writes, which is how the test suites simulate a power cut between any two
//! flash operations: the records written so far survive, the rest never land.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use super::{BlobStore, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryBlobsError {
    /// An injected write failure.
    PowerLoss,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryBlobs {
    records: BTreeMap<u16, Vec<u8>>,
    writes: usize,
    writes_left: Option<usize>,
}

impl MemoryBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `n` more writes succeed, then fail every write until [`restore_power`](Self::restore_power).
    pub fn fail_after_writes(&mut self, n: usize) {
        self.writes_left = Some(n);
    }

    pub fn restore_power(&mut self) {
        self.writes_left = None;
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn record(&self, id: RecordId) -> Option<&[u8]> {
        self.records.get(&id.0).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl BlobStore for MemoryBlobs {
    type Error = MemoryBlobsError;

    fn read(&mut self, id: RecordId, buf: &mut [u8]) -> Result<Option<usize>, Self::Error> {
        Ok(self.records.get(&id.0).map(|data| {
            let n = data.len().min(buf.len());
            buf[..n].copy_from_slice(&data[..n]);
            data.len()
        }))
    }

    fn write(&mut self, id: RecordId, data: &[u8]) -> Result<(), Self::Error> {
        match self.writes_left {
            Some(0) => return Err(MemoryBlobsError::PowerLoss),
            Some(ref mut left) => *left -= 1,
            None => {}
        }
        self.records.insert(id.0, data.to_vec());
        self.writes += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.records.clear();
        Ok(())
    }
}
