use super::{DeviceCache, SYNCHRONIZATION_KEY, SYNCHRONIZATION_NAMESPACE};
use crate::blob::BlobStore;
use crate::error::Error;

impl<B: BlobStore> DeviceCache<B> {
    /// Whether the device completed a synchronization with the server.
    ///
    /// `Ok(None)` until [`synchronization_set`](Self::synchronization_set) is first called.
    pub fn synchronization_get(&mut self) -> Result<Option<bool>, Error<B::Error>> {
        match self
            .pairs
            .get(SYNCHRONIZATION_NAMESPACE, SYNCHRONIZATION_KEY)?
            .as_deref()
        {
            Some([flag]) => Ok(Some(*flag != 0)),
            Some(_) => Err(Error::Encoding),
            None => {
                info!("No previous synchronization recorded");
                Ok(None)
            }
        }
    }

    pub fn synchronization_set(&mut self, synchronized: bool) -> Result<(), Error<B::Error>> {
        self.pairs.upsert(
            SYNCHRONIZATION_NAMESPACE,
            SYNCHRONIZATION_KEY,
            &[synchronized as u8],
        )?;
        debug!("Synchronization flag set to {}", synchronized);
        Ok(())
    }
}
