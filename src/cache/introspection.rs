//! Interface list of a device and its stored fingerprint
//!
//! The fingerprint is the `name:major:minor` of every interface joined by `;`. It is stored
//! after a successful session so that the next boot can tell whether the interface set
//! changed in between.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use super::{is_valid_interface_name, DeviceCache, INTROSPECTION_KEY, INTROSPECTION_NAMESPACE};
use crate::blob::BlobStore;
use crate::error::Error;
use crate::pair::nul_terminated;

/// Which side of the connection writes an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ownership {
    Device,
    Server,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterfaceKind {
    Datastream,
    Properties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interface<'a> {
    pub name: &'a str,
    pub major: u32,
    pub minor: u32,
    pub ownership: Ownership,
    pub kind: InterfaceKind,
}

impl<'a> Interface<'a> {
    pub const fn new(
        name: &'a str,
        major: u32,
        minor: u32,
        ownership: Ownership,
        kind: InterfaceKind,
    ) -> Self {
        Self {
            name,
            major,
            minor,
            ownership,
            kind,
        }
    }

    /// A version of `0.0` is not a valid interface version.
    pub fn is_valid(&self) -> bool {
        is_valid_interface_name(self.name) && (self.major != 0 || self.minor != 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntrospectionError {
    /// Invalid name or version
    InvalidInterface,
    /// An interface with the same name is already present
    AlreadyPresent,
    NotFound,
}

impl fmt::Display for IntrospectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInterface => write!(f, "invalid interface"),
            Self::AlreadyPresent => write!(f, "interface already present"),
            Self::NotFound => write!(f, "interface not found"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for IntrospectionError {}

/// Result of comparing an introspection fingerprint with the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntrospectionStatus {
    /// The stored fingerprint is byte-identical.
    Current,
    /// Nothing stored yet, or the stored fingerprint differs.
    Outdated,
}

/// The set of interfaces a device declares, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Introspection<'a> {
    interfaces: Vec<Interface<'a>>,
}

impl<'a> Introspection<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, interface: Interface<'a>) -> Result<(), IntrospectionError> {
        if !interface.is_valid() {
            return Err(IntrospectionError::InvalidInterface);
        }
        if self.get(interface.name).is_some() {
            return Err(IntrospectionError::AlreadyPresent);
        }
        self.interfaces.push(interface);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Interface<'a>> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    pub fn remove(&mut self, name: &str) -> Result<Interface<'a>, IntrospectionError> {
        let pos = self
            .interfaces
            .iter()
            .position(|i| i.name == name)
            .ok_or(IntrospectionError::NotFound)?;
        Ok(self.interfaces.remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interface<'a>> {
        self.interfaces.iter()
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// `name:major:minor` of every interface, joined by `;`.
    pub fn fingerprint(&self) -> String {
        let mut out = String::new();
        for (i, interface) in self.interfaces.iter().enumerate() {
            if i > 0 {
                out.push(';');
            }
            out.push_str(interface.name);
            out.push(':');
            out.push_str(&interface.major.to_string());
            out.push(':');
            out.push_str(&interface.minor.to_string());
        }
        out
    }
}

impl<B: BlobStore> DeviceCache<B> {
    /// Replace the stored introspection fingerprint.
    pub fn introspection_store(&mut self, fingerprint: &str) -> Result<(), Error<B::Error>> {
        let record = nul_terminated(fingerprint)?;
        self.pairs
            .upsert(INTROSPECTION_NAMESPACE, INTROSPECTION_KEY, &record)?;
        debug!("Stored introspection ({} bytes)", record.len());
        Ok(())
    }

    /// Compare `fingerprint` byte for byte with the stored one.
    pub fn introspection_check(&mut self, fingerprint: &str) -> Result<IntrospectionStatus, Error<B::Error>> {
        let candidate = nul_terminated(fingerprint)?;
        let status = match self.pairs.get(INTROSPECTION_NAMESPACE, INTROSPECTION_KEY)? {
            Some(stored) if stored == candidate => IntrospectionStatus::Current,
            Some(_) => {
                info!("Introspection changed since it was last stored");
                IntrospectionStatus::Outdated
            }
            None => {
                info!("No introspection stored yet");
                IntrospectionStatus::Outdated
            }
        };
        Ok(status)
    }
}
