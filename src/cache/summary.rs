//! Device property summary
//!
//! After reconnecting, the device tells the server which device-owned properties it still
//! holds: every `<interface_name><path>` joined by `;`, newest first.

use alloc::string::String;

use super::{DeviceCache, Introspection, Ownership};
use crate::blob::BlobStore;
use crate::error::Error;

impl<B: BlobStore> DeviceCache<B> {
    /// Build the summary of stored device-owned properties.
    ///
    /// Properties of server-owned interfaces are skipped. Properties of interfaces missing from
    /// `introspection` are skipped as well, or deleted when
    /// [`Config::purge_unknown_interfaces`](crate::Config::purge_unknown_interfaces) is set.
    pub fn property_device_string(&mut self, introspection: &Introspection<'_>) -> Result<String, Error<B::Error>> {
        let mut out = String::new();
        let Some(mut cursor) = self.property_iterator()? else {
            return Ok(out);
        };

        loop {
            let key = cursor.get(self)?;
            match introspection.get(&key.interface_name) {
                Some(interface) if interface.ownership == Ownership::Device => {
                    let sep = usize::from(!out.is_empty());
                    out.try_reserve(sep + key.interface_name.len() + key.path.len())
                        .map_err(|_| Error::OutOfMemory)?;
                    if sep > 0 {
                        out.push(';');
                    }
                    out.push_str(&key.interface_name);
                    out.push_str(&key.path);
                }
                Some(_) => {}
                None if self.config.purge_unknown_interfaces => {
                    debug!("Purging property of unknown interface {}", key.interface_name.as_str());
                    if let Some(slot) = cursor.slot() {
                        self.pairs.remove(slot)?;
                    }
                }
                None => {
                    trace!("Skipping property of unknown interface {}", key.interface_name.as_str());
                }
            }

            if !cursor.advance(self)? {
                return Ok(out);
            }
        }
    }

    /// Write the device property summary into `buf`, NUL terminated.
    ///
    /// Returns the size of the summary including the NUL. With `None`, only the size is
    /// returned, so a caller can size its buffer with a first call and fill it with a second.
    pub fn property_get_device_string(
        &mut self,
        introspection: &Introspection<'_>,
        buf: Option<&mut [u8]>,
    ) -> Result<usize, Error<B::Error>> {
        let summary = self.property_device_string(introspection)?;
        let required = summary.len() + 1;

        if let Some(buf) = buf {
            if buf.len() < required {
                return Err(Error::BufferTooSmall { required });
            }
            buf[..summary.len()].copy_from_slice(summary.as_bytes());
            buf[summary.len()] = 0;
        }
        Ok(required)
    }
}
