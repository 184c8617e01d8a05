//! Namespaced key/value pairs on top of a [`BlobStore`]
//!
//! Pairs occupy the contiguous slots `0..count`, three records each (see [`layout`]). A
//! delete moves the last pair into the freed slot, so there are never holes, and the only
//! damage a power cut can do is leave the moved pair counted twice. [`PairStore::open`]
//! repairs that before handing out the store.

mod layout;

pub use layout::{PairRecords, SlotIndex, MAX_PAIRS, PAIR_COUNT_ID, RECORDS_PER_PAIR};

use alloc::string::String;
use alloc::vec::Vec;

use crate::blob::{BlobStore, RecordId};
use crate::error::Error;

/// Allocate a zeroed buffer, reporting allocation failure instead of aborting.
pub(crate) fn try_alloc<E>(len: usize) -> Result<Vec<u8>, Error<E>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory)?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Stored form of a string: its bytes followed by a NUL.
pub(crate) fn nul_terminated<E>(s: &str) -> Result<Vec<u8>, Error<E>> {
    if s.as_bytes().contains(&0) {
        return Err(Error::InvalidParam);
    }
    let mut buf = Vec::new();
    buf.try_reserve_exact(s.len() + 1)
        .map_err(|_| Error::OutOfMemory)?;
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
    Ok(buf)
}

fn decode_str<E>(mut bytes: Vec<u8>) -> Result<String, Error<E>> {
    if bytes.pop() != Some(0) {
        return Err(Error::Encoding);
    }
    String::from_utf8(bytes).map_err(|_| Error::Encoding)
}

/// Ordered array of `(namespace, key, value)` pairs.
pub struct PairStore<B: BlobStore> {
    blobs: B,
    count: u16,
    max_pairs: u16,
}

impl<B: BlobStore> PairStore<B> {
    /// Load the pair count and repair a duplicate tail left by an interrupted delete.
    pub fn open(blobs: B) -> Result<Self, Error<B::Error>> {
        Self::open_with_limit(blobs, MAX_PAIRS)
    }

    /// Like [`open`](Self::open), refusing to grow beyond `max_pairs` pairs.
    pub fn open_with_limit(blobs: B, max_pairs: u16) -> Result<Self, Error<B::Error>> {
        let mut this = Self {
            blobs,
            count: 0,
            max_pairs: max_pairs.min(MAX_PAIRS),
        };
        this.get_pair_count()?;
        this.remove_duplicates()?;
        Ok(this)
    }

    /// Release the blob primitive.
    pub fn into_inner(self) -> B {
        self.blobs
    }

    pub fn blobs_mut(&mut self) -> &mut B {
        &mut self.blobs
    }

    /// Number of live pairs, as last read or written.
    pub fn len(&self) -> u16 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn max_pairs(&self) -> u16 {
        self.max_pairs
    }

    fn slot(&self, index: u16) -> Result<SlotIndex, Error<B::Error>> {
        SlotIndex::new(index).ok_or(Error::Encoding)
    }

    fn check_live(&self, slot: SlotIndex) -> Result<(), Error<B::Error>> {
        if slot.get() < self.count {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    fn read_record(&mut self, id: RecordId, buf: &mut [u8]) -> Result<Option<usize>, Error<B::Error>> {
        self.blobs.read(id, buf).map_err(|e| {
            error!("Failed to read record {}", id.0);
            Error::Storage(e)
        })
    }

    fn write_record(&mut self, id: RecordId, data: &[u8]) -> Result<(), Error<B::Error>> {
        self.blobs.write(id, data).map_err(|e| {
            error!("Failed to write record {}", id.0);
            Error::Storage(e)
        })
    }

    /// Read the pair count from flash. A missing count record means an empty store.
    pub fn get_pair_count(&mut self) -> Result<u16, Error<B::Error>> {
        let mut buf = [0u8; 2];
        let count = match self.read_record(PAIR_COUNT_ID, &mut buf)? {
            None => 0,
            Some(2) => u16::from_le_bytes(buf),
            Some(len) => {
                error!("Pair count record has length {}", len);
                return Err(Error::Encoding);
            }
        };
        if count > MAX_PAIRS {
            error!("Pair count {} out of range", count);
            return Err(Error::Encoding);
        }
        self.count = count;
        Ok(count)
    }

    pub fn set_pair_count(&mut self, count: u16) -> Result<(), Error<B::Error>> {
        if count > MAX_PAIRS {
            return Err(Error::InvalidParam);
        }
        self.write_record(PAIR_COUNT_ID, &count.to_le_bytes())?;
        debug!("Pair count set to {}", count);
        self.count = count;
        Ok(())
    }

    /// Read record `id`.
    ///
    /// With `None`, only the stored length is returned. With a buffer, the record is copied
    /// into it and its length returned; a buffer shorter than the record is an error.
    pub fn read_entry(&mut self, id: RecordId, buf: Option<&mut [u8]>) -> Result<usize, Error<B::Error>> {
        match buf {
            None => self.read_record(id, &mut [])?.ok_or(Error::NotFound),
            Some(buf) => {
                let capacity = buf.len();
                let len = self.read_record(id, buf)?.ok_or(Error::NotFound)?;
                if len > capacity {
                    return Err(Error::BufferTooSmall { required: len });
                }
                Ok(len)
            }
        }
    }

    /// Read record `id` into a buffer of exactly its length.
    pub fn read_entry_alloc(&mut self, id: RecordId) -> Result<Vec<u8>, Error<B::Error>> {
        let len = self.read_entry(id, None)?;
        let mut buf = try_alloc(len)?;
        let read = self.read_entry(id, Some(buf.as_mut_slice()))?;
        buf.truncate(read);
        Ok(buf)
    }

    fn write_records(
        &mut self,
        slot: SlotIndex,
        namespace: &[u8],
        key: &[u8],
        value: &[u8],
    ) -> Result<(), Error<B::Error>> {
        let records = slot.records();
        self.write_record(records.namespace, namespace)?;
        self.write_record(records.key, key)?;
        self.write_record(records.value, value)
    }

    /// Write the three records of `slot`, namespace first and value last.
    ///
    /// Does not touch the pair count.
    pub fn write_pair(
        &mut self,
        slot: SlotIndex,
        namespace: &str,
        key: &str,
        value: &[u8],
    ) -> Result<(), Error<B::Error>> {
        let namespace = nul_terminated(namespace)?;
        let key = nul_terminated(key)?;
        self.write_records(slot, &namespace, &key, value)
    }

    /// Copy the pair at `src` over the pair at `dst`.
    pub fn relocate_pair(&mut self, dst: SlotIndex, src: SlotIndex) -> Result<(), Error<B::Error>> {
        let records = src.records();
        let namespace = self.read_entry_alloc(records.namespace)?;
        let key = self.read_entry_alloc(records.key)?;
        let value = self.read_entry_alloc(records.value)?;

        debug!("Relocating pair {} -> {}", src.get(), dst.get());
        self.write_records(dst, &namespace, &key, &value)
    }

    fn record_equals(
        &mut self,
        id: RecordId,
        expected: &[u8],
        scratch: &mut Vec<u8>,
    ) -> Result<bool, Error<B::Error>> {
        let len = self.read_entry(id, None)?;
        if len != expected.len() {
            return Ok(false);
        }
        scratch.clear();
        scratch
            .try_reserve_exact(len)
            .map_err(|_| Error::OutOfMemory)?;
        scratch.resize(len, 0);
        self.read_entry(id, Some(scratch.as_mut_slice()))?;
        Ok(scratch.as_slice() == expected)
    }

    /// Drop the last pair if an earlier slot holds the same namespace and key.
    ///
    /// This is the state left by a power cut between copying the last pair over a deleted
    /// one and shrinking the count. The earlier copy takes the value of the last pair before
    /// the count shrinks, in case the cut hit before the value record was copied.
    ///
    /// Returns `true` if a duplicate was removed.
    pub fn remove_duplicates(&mut self) -> Result<bool, Error<B::Error>> {
        let count = self.get_pair_count()?;
        if count < 2 {
            return Ok(false);
        }

        let last = self.slot(count - 1)?.records();
        let last_key = self.read_entry_alloc(last.key)?;
        let last_namespace = self.read_entry_alloc(last.namespace)?;

        let mut scratch = Vec::new();
        for index in 0..count - 1 {
            let candidate = self.slot(index)?.records();
            if !self.record_equals(candidate.key, &last_key, &mut scratch)? {
                continue;
            }
            if !self.record_equals(candidate.namespace, &last_namespace, &mut scratch)? {
                continue;
            }

            warn!("Pair {} duplicates pair {}, dropping the tail", count - 1, index);
            let last_value = self.read_entry_alloc(last.value)?;
            if !self.record_equals(candidate.value, &last_value, &mut scratch)? {
                self.write_record(candidate.value, &last_value)?;
            }
            self.set_pair_count(count - 1)?;
            return Ok(true);
        }

        Ok(false)
    }

    /// Find the slot holding `(namespace, key)`.
    pub fn find(&mut self, namespace: &str, key: &str) -> Result<Option<SlotIndex>, Error<B::Error>> {
        let key = nul_terminated(key)?;
        let namespace = nul_terminated(namespace)?;

        let mut scratch = Vec::new();
        for index in 0..self.count {
            let slot = self.slot(index)?;
            let records = slot.records();
            if self.record_equals(records.key, &key, &mut scratch)?
                && self.record_equals(records.namespace, &namespace, &mut scratch)?
            {
                trace!("Found pair at slot {}", index);
                return Ok(Some(slot));
            }
        }
        Ok(None)
    }

    /// Append a new pair after the last one.
    pub fn append(&mut self, namespace: &str, key: &str, value: &[u8]) -> Result<SlotIndex, Error<B::Error>> {
        if self.count >= self.max_pairs {
            return Err(Error::StorageFull);
        }
        let slot = SlotIndex::new(self.count).ok_or(Error::StorageFull)?;

        debug!("Appending pair at slot {}", slot.get());
        self.write_pair(slot, namespace, key, value)?;
        self.set_pair_count(self.count + 1)?;
        Ok(slot)
    }

    /// Overwrite only the value record of a live pair.
    pub fn write_value(&mut self, slot: SlotIndex, value: &[u8]) -> Result<(), Error<B::Error>> {
        self.check_live(slot)?;
        self.write_record(slot.records().value, value)
    }

    pub fn read_value(&mut self, slot: SlotIndex) -> Result<Vec<u8>, Error<B::Error>> {
        self.check_live(slot)?;
        self.read_entry_alloc(slot.records().value)
    }

    pub fn read_namespace(&mut self, slot: SlotIndex) -> Result<String, Error<B::Error>> {
        self.check_live(slot)?;
        let bytes = self.read_entry_alloc(slot.records().namespace)?;
        decode_str(bytes)
    }

    pub fn read_key(&mut self, slot: SlotIndex) -> Result<String, Error<B::Error>> {
        self.check_live(slot)?;
        let bytes = self.read_entry_alloc(slot.records().key)?;
        decode_str(bytes)
    }

    /// Remove the pair at `slot`, moving the last pair into its place.
    pub fn remove(&mut self, slot: SlotIndex) -> Result<(), Error<B::Error>> {
        self.check_live(slot)?;
        let last = self.slot(self.count - 1)?;
        if slot != last {
            self.relocate_pair(slot, last)?;
        }
        self.set_pair_count(last.get())
    }

    /// Replace the value of `(namespace, key)`, appending the pair if it does not exist.
    pub fn upsert(&mut self, namespace: &str, key: &str, value: &[u8]) -> Result<SlotIndex, Error<B::Error>> {
        match self.find(namespace, key)? {
            Some(slot) => {
                debug!("Updating pair at slot {}", slot.get());
                self.write_value(slot, value)?;
                Ok(slot)
            }
            None => self.append(namespace, key, value),
        }
    }

    pub fn get(&mut self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, Error<B::Error>> {
        match self.find(namespace, key)? {
            Some(slot) => self.read_value(slot).map(Some),
            None => Ok(None),
        }
    }

    /// Returns `false` if the pair did not exist.
    pub fn delete(&mut self, namespace: &str, key: &str) -> Result<bool, Error<B::Error>> {
        match self.find(namespace, key)? {
            Some(slot) => {
                self.remove(slot)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
