//! NvsBlobs implementation using the sequential-storage crate (v7.x)
//!
//! Uses MapStorage for flash-based storage, one map item per record keyed by its `u16` ID.
//! Wear levelling, CRC-checked items and recovery from interrupted writes are the map's job.
//! The [`BlobStore`] trait is blocking, so every map future is driven with
//! `embassy_futures::block_on`.

use alloc::collections::BTreeSet;
use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use embassy_futures::block_on;
use embedded_storage_async::nor_flash::{MultiwriteNorFlash, NorFlash};
use sequential_storage::cache::NoCache;
use sequential_storage::map::{MapConfig, MapStorage};

use super::{BlobStore, RecordId};

/// Size of the map key in front of every stored record.
const KEY_LEN: usize = core::mem::size_of::<u16>();

/// NvsBlobs error type
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NvsError<E> {
    /// Record does not fit in one erase page
    TooLarge,
    /// Sequential storage error
    Storage(sequential_storage::Error<E>),
}

impl<E> From<sequential_storage::Error<E>> for NvsError<E> {
    fn from(e: sequential_storage::Error<E>) -> Self {
        NvsError::Storage(e)
    }
}

/// A [`BlobStore`] backed by NOR flash using sequential-storage v7.x.
///
/// No RAM index is kept: the number of records is bounded by the flash range only.
///
/// # Type Parameters
/// - `F`: The flash storage type (must implement `NorFlash` and `MultiwriteNorFlash`)
pub struct NvsBlobs<F: NorFlash> {
    map: MapStorage<u16, F, NoCache>,
    /// One erase page, large enough for any item the map can hold
    scratch: Vec<u8>,
}

impl<F: NorFlash> NvsBlobs<F> {
    /// Create a new NvsBlobs store with no cache.
    ///
    /// # Arguments
    /// - `flash`: The NOR flash instance
    /// - `flash_range`: The byte range within flash to use for storage, at least two pages
    pub fn new(flash: F, flash_range: Range<u32>) -> Self {
        let config = MapConfig::new(flash_range);
        let map = MapStorage::new(flash, config, NoCache::new());
        Self {
            map,
            scratch: vec![0; F::ERASE_SIZE],
        }
    }

    /// Largest record, in bytes, a write will attempt.
    pub fn max_record_len(&self) -> usize {
        self.scratch.len() - KEY_LEN
    }
}

impl<F: NorFlash + MultiwriteNorFlash> NvsBlobs<F> {
    async fn fetch(
        &mut self,
        id: RecordId,
        buf: &mut [u8],
    ) -> Result<Option<usize>, NvsError<F::Error>> {
        let Self { map, scratch } = self;

        let len = map.fetch_item::<&[u8]>(scratch, &id.get()).await?.map(|value| {
            let n = buf.len().min(value.len());
            buf[..n].copy_from_slice(&value[..n]);
            value.len()
        });
        Ok(len)
    }

    async fn store(&mut self, id: RecordId, data: &[u8]) -> Result<(), NvsError<F::Error>> {
        if data.len() > self.max_record_len() {
            return Err(NvsError::TooLarge);
        }
        let Self { map, scratch } = self;

        trace!("NVS store id {} ({} bytes)", id.get(), data.len());
        map.store_item(scratch, &id.get(), &data).await?;
        Ok(())
    }

    async fn remove_all(&mut self) -> Result<(), NvsError<F::Error>> {
        let Self { map, scratch } = self;

        // The iterator also yields superseded versions of a key
        let mut ids = BTreeSet::new();
        {
            let mut iter = map.fetch_all_items(scratch).await?;
            while let Some((id, _value)) = iter.next::<&[u8]>(scratch).await? {
                ids.insert(id);
            }
        }

        debug!("NVS removing {} records", ids.len());
        for id in ids {
            map.remove_item(scratch, &id).await?;
        }
        Ok(())
    }
}

impl<F: NorFlash + MultiwriteNorFlash> BlobStore for NvsBlobs<F> {
    type Error = NvsError<F::Error>;

    fn read(&mut self, id: RecordId, buf: &mut [u8]) -> Result<Option<usize>, Self::Error> {
        block_on(self.fetch(id, buf))
    }

    fn write(&mut self, id: RecordId, data: &[u8]) -> Result<(), Self::Error> {
        block_on(self.store(id, data))
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        block_on(self.remove_all())
    }
}
