use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use super::DeviceCache;
use crate::blob::BlobStore;
use crate::error::Error;

/// Value of a device property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Integer(i32),
    LongInteger(i64),
    Double(f64),
    Boolean(bool),
    String(String),
    BinaryBlob(Vec<u8>),
    /// Milliseconds since the Unix epoch
    DateTime(i64),
    IntegerArray(Vec<i32>),
    LongIntegerArray(Vec<i64>),
    DoubleArray(Vec<f64>),
    BooleanArray(Vec<bool>),
    StringArray(Vec<String>),
    BinaryBlobArray(Vec<Vec<u8>>),
    DateTimeArray(Vec<i64>),
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Integer(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::LongInteger(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for PropertyValue {
    fn from(v: Vec<u8>) -> Self {
        Self::BinaryBlob(v)
    }
}

/// Value record of a property pair: the interface major version it was stored under, and
/// the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProperty {
    pub major: u32,
    pub value: PropertyValue,
}

impl StoredProperty {
    pub fn new(major: u32, value: impl Into<PropertyValue>) -> Self {
        Self {
            major,
            value: value.into(),
        }
    }

    pub(crate) fn to_bytes<E>(&self) -> Result<Vec<u8>, Error<E>> {
        Ok(postcard::to_allocvec(self)?)
    }

    pub(crate) fn from_bytes<E>(bytes: &[u8]) -> Result<Self, Error<E>> {
        Ok(postcard::from_bytes(bytes)?)
    }
}

impl<B: BlobStore> DeviceCache<B> {
    /// Store a property, replacing the value if `(interface_name, path)` already exists.
    pub fn property_store(
        &mut self,
        interface_name: &str,
        path: &str,
        major: u32,
        value: &PropertyValue,
    ) -> Result<(), Error<B::Error>> {
        Self::check_property_key(interface_name, path)?;

        let record = StoredProperty {
            major,
            value: value.clone(),
        }
        .to_bytes()?;
        let slot = self.pairs.upsert(interface_name, path, &record)?;
        debug!("Stored property {}{} at slot {}", interface_name, path, slot.get());
        Ok(())
    }

    /// Load a property. Returns `Ok(None)` if it has never been stored.
    ///
    /// The returned value is owned by the caller and released when dropped.
    pub fn property_load(
        &mut self,
        interface_name: &str,
        path: &str,
    ) -> Result<Option<StoredProperty>, Error<B::Error>> {
        Self::check_property_key(interface_name, path)?;

        match self.pairs.get(interface_name, path)? {
            Some(record) => StoredProperty::from_bytes(&record).map(Some),
            None => Ok(None),
        }
    }

    /// Delete a property. Fails with [`Error::NotFound`] if it does not exist.
    pub fn property_delete(&mut self, interface_name: &str, path: &str) -> Result<(), Error<B::Error>> {
        Self::check_property_key(interface_name, path)?;

        if self.pairs.delete(interface_name, path)? {
            debug!("Deleted property {}{}", interface_name, path);
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }
}
