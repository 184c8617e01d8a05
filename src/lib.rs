//! Power-loss tolerant property cache for IoT devices
//!
//! The cache keeps a device's last known property values, its synchronization state and the
//! fingerprint of its interface list across reboots. It runs on any flash primitive that
//! stores variable-length blobs under small integer IDs ([`blob::BlobStore`]):
//!
//! - [`blob::NvsBlobs`] on an `embedded-storage-async` NOR flash, via `sequential-storage`
//! - [`blob::MemoryBlobs`] in RAM, with write fault injection for tests
//! - `blob::FileBlobs`, one file per record (feature `std`)
//!
//! ```ignore
//! let blobs = NvsBlobs::new(flash, 0x10_0000..0x10_4000);
//! let mut cache = DeviceCache::new(blobs)?;
//!
//! cache.property_store("org.example.Sensor", "/1/enabled", 1, &true.into())?;
//! if cache.introspection_check(&introspection.fingerprint())? == IntrospectionStatus::Outdated {
//!     // resend introspection, then
//!     cache.introspection_store(&introspection.fingerprint())?;
//! }
//! ```
#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod blob;
pub mod cache;
pub mod config;
pub mod error;
pub mod pair;

pub use cache::{
    DeviceCache, Interface, InterfaceKind, Introspection, IntrospectionStatus, Ownership,
    PropertyCursor, PropertyKey, PropertyValue, StoredProperty,
};
pub use config::Config;
pub use error::Error;
pub use pair::PairStore;
