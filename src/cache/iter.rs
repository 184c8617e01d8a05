//! Property enumeration
//!
//! [`PropertyCursor`] walks the pair slots from the highest down, which is newest first as
//! long as nothing is deleted meanwhile. A delete moves the last pair into the freed slot,
//! so deleting anything but the entry under the cursor can make the cursor revisit or skip
//! a pair. [`DeviceCache::property_snapshot`] copies every key up front instead.

use alloc::string::String;
use alloc::vec::Vec;

use super::{is_reserved_namespace, DeviceCache};
use crate::blob::BlobStore;
use crate::error::Error;
use crate::pair::SlotIndex;

/// Identity of a stored property.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyKey {
    pub interface_name: String,
    pub path: String,
}

/// Stored sizes of a property key, NUL terminator included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PropertyKeySizes {
    pub interface_name: usize,
    pub path: usize,
}

/// Live position in the stored properties.
///
/// The cursor holds no borrow of the cache, so properties can be changed while it is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyCursor {
    slot: Option<SlotIndex>,
}

impl PropertyCursor {
    /// Slot the cursor points at, `None` once exhausted.
    pub fn slot(&self) -> Option<SlotIndex> {
        self.slot
    }

    pub fn is_exhausted(&self) -> bool {
        self.slot.is_none()
    }

    fn live_slot<B: BlobStore>(&self, cache: &DeviceCache<B>) -> Result<SlotIndex, Error<B::Error>> {
        match self.slot {
            Some(slot) if slot.get() < cache.pairs.len() => Ok(slot),
            _ => Err(Error::NotFound),
        }
    }

    /// Key of the property under the cursor.
    pub fn get<B: BlobStore>(&self, cache: &mut DeviceCache<B>) -> Result<PropertyKey, Error<B::Error>> {
        let slot = self.live_slot(cache)?;
        Ok(PropertyKey {
            interface_name: cache.pairs.read_namespace(slot)?,
            path: cache.pairs.read_key(slot)?,
        })
    }

    /// Copy the key under the cursor into caller buffers, each NUL terminated.
    ///
    /// With `None` buffers only the sizes are reported, so a caller can size its buffers
    /// with a first call and fill them with a second.
    pub fn get_into<B: BlobStore>(
        &self,
        cache: &mut DeviceCache<B>,
        interface_name: Option<&mut [u8]>,
        path: Option<&mut [u8]>,
    ) -> Result<PropertyKeySizes, Error<B::Error>> {
        let records = self.live_slot(cache)?.records();
        Ok(PropertyKeySizes {
            interface_name: cache.pairs.read_entry(records.namespace, interface_name)?,
            path: cache.pairs.read_entry(records.key, path)?,
        })
    }

    /// Move to the next lower property slot. Returns `false` once there is none.
    pub fn advance<B: BlobStore>(&mut self, cache: &mut DeviceCache<B>) -> Result<bool, Error<B::Error>> {
        let Some(current) = self.slot else {
            return Ok(false);
        };
        let below = current.get().min(cache.pairs.len());
        self.slot = cache.seek_property(below)?;
        Ok(self.slot.is_some())
    }
}

impl<B: BlobStore> DeviceCache<B> {
    /// Highest property slot strictly below `below`, skipping singleton records.
    fn seek_property(&mut self, below: u16) -> Result<Option<SlotIndex>, Error<B::Error>> {
        for index in (0..below).rev() {
            let Some(slot) = SlotIndex::new(index) else {
                continue;
            };
            let namespace = self.pairs.read_namespace(slot)?;
            if !is_reserved_namespace(&namespace) {
                return Ok(Some(slot));
            }
        }
        Ok(None)
    }

    /// Cursor on the most recently appended property, `None` if there are no properties.
    pub fn property_iterator(&mut self) -> Result<Option<PropertyCursor>, Error<B::Error>> {
        let count = self.pairs.len();
        Ok(self
            .seek_property(count)?
            .map(|slot| PropertyCursor { slot: Some(slot) }))
    }

    /// Keys of all stored properties in cursor order, copied at call time.
    pub fn property_snapshot(&mut self) -> Result<Vec<PropertyKey>, Error<B::Error>> {
        let mut keys = Vec::new();
        let Some(mut cursor) = self.property_iterator()? else {
            return Ok(keys);
        };
        loop {
            let key = cursor.get(self)?;
            keys.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
            keys.push(key);
            if !cursor.advance(self)? {
                return Ok(keys);
            }
        }
    }
}
