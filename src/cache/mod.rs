//! Device property cache
//!
//! This module provides the `DeviceCache` struct, the persistent state of a device session
//! kept on top of a [`PairStore`]. It handles:
//! - Property values keyed by `(interface_name, path)`
//! - Enumeration of stored properties, live or as a snapshot
//! - The synchronization flag and the introspection fingerprint singletons
//! - The device property summary string
//!
//! ## Record placement
//!
//! A property is a pair with `namespace = interface_name` and `key = path`. The singletons
//! use namespaces containing `_`, which no valid interface name can contain, so they never
//! collide with properties and are skipped by enumeration.
//!
//! ## Sharing
//!
//! No operation is internally synchronized. A runtime with several tasks should own the
//! cache behind a single mutex, held from construction until [`DeviceCache::destroy`].

mod introspection;
mod iter;
mod property;
mod summary;
mod sync;

pub use introspection::{
    Interface, InterfaceKind, Introspection, IntrospectionError, IntrospectionStatus, Ownership,
};
pub use iter::{PropertyCursor, PropertyKey, PropertyKeySizes};
pub use property::{PropertyValue, StoredProperty};

use crate::blob::BlobStore;
use crate::config::Config;
use crate::error::Error;
use crate::pair::PairStore;

pub(crate) const SYNCHRONIZATION_NAMESPACE: &str = "synchronization_namespace";
pub(crate) const SYNCHRONIZATION_KEY: &str = "synchronization_status";
pub(crate) const INTROSPECTION_NAMESPACE: &str = "introspection_namespace";
pub(crate) const INTROSPECTION_KEY: &str = "introspection_string";

/// Longest accepted interface name.
pub const MAX_INTERFACE_NAME_LEN: usize = 128;

fn is_reserved_namespace(namespace: &str) -> bool {
    namespace == SYNCHRONIZATION_NAMESPACE || namespace == INTROSPECTION_NAMESPACE
}

/// Reverse domain style name: a letter, then letters, digits, `.` and `-`.
pub fn is_valid_interface_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= MAX_INTERFACE_NAME_LEN
        && first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// A property path: starts with `/`, no NUL.
pub fn is_valid_path(path: &str) -> bool {
    path.starts_with('/') && !path.contains('\0')
}

/// Persistent device state on top of a blob primitive.
pub struct DeviceCache<B: BlobStore> {
    pairs: PairStore<B>,
    config: Config,
}

impl<B: BlobStore> DeviceCache<B> {
    /// Open the cache with the default [`Config`].
    ///
    /// A duplicate pair left by a power cut during a delete is repaired before returning.
    pub fn new(blobs: B) -> Result<Self, Error<B::Error>> {
        Self::with_config(blobs, Config::default())
    }

    pub fn with_config(blobs: B, config: Config) -> Result<Self, Error<B::Error>> {
        let pairs = PairStore::open_with_limit(blobs, config.max_pairs)?;
        debug!("Opened device cache with {} pairs", pairs.len());
        Ok(Self { pairs, config })
    }

    /// Close the cache and hand back the blob primitive.
    pub fn destroy(self) -> B {
        self.pairs.into_inner()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of stored pairs, singletons included.
    pub fn pair_count(&self) -> u16 {
        self.pairs.len()
    }

    /// Direct access to the underlying pair store.
    pub fn pairs_mut(&mut self) -> &mut PairStore<B> {
        &mut self.pairs
    }

    fn check_property_key(interface_name: &str, path: &str) -> Result<(), Error<B::Error>> {
        if is_valid_interface_name(interface_name) && is_valid_path(path) {
            Ok(())
        } else {
            Err(Error::InvalidParam)
        }
    }
}
