mod common;

use common::flash::{RamFlash, SECTOR_SIZE};
use common::init_logger;
use device_cache::blob::NvsBlobs;
use device_cache::{Config, DeviceCache, Error, PropertyValue, StoredProperty};

const IFACE: &str = "org.example.Sensor";

fn blobs(flash: &RamFlash) -> NvsBlobs<RamFlash> {
    NvsBlobs::new(flash.clone(), 0..(flash.sectors() * SECTOR_SIZE) as u32)
}

fn store(cache: &mut DeviceCache<NvsBlobs<RamFlash>>, i: i32) -> Result<(), String> {
    cache
        .property_store(IFACE, &format!("/p{}", i), 1, &PropertyValue::Integer(i))
        .map_err(|e| format!("store #{} failed: {:?}", i, e))
}

#[test]
fn test_flash_cache_holds_forty_properties() {
    init_logger();
    let flash = RamFlash::new(16);

    let mut cache = DeviceCache::new(blobs(&flash)).unwrap();
    for i in 0..40 {
        store(&mut cache, i).unwrap();
    }
    assert_eq!(cache.pair_count(), 40);
    drop(cache);

    let mut cache = DeviceCache::new(blobs(&flash)).unwrap();
    assert_eq!(cache.pair_count(), 40);
    assert_eq!(cache.property_snapshot().unwrap().len(), 40);
    for i in 0..40 {
        assert_eq!(
            cache.property_load(IFACE, &format!("/p{}", i)).unwrap(),
            Some(StoredProperty::new(1, PropertyValue::Integer(i)))
        );
    }
}

#[test]
fn test_flash_cache_full_at_configured_limit() {
    init_logger();
    let flash = RamFlash::new(16);
    let config = Config::default().max_pairs(30);

    let mut cache = DeviceCache::with_config(blobs(&flash), config).unwrap();
    for i in 0..30 {
        store(&mut cache, i).unwrap();
    }

    let overflow = cache.property_store(IFACE, "/p30", 1, &PropertyValue::Integer(30));
    assert!(matches!(overflow, Err(Error::StorageFull)), "{:?}", overflow);

    // Existing pairs still update in place.
    cache.property_store(IFACE, "/p0", 1, &PropertyValue::Integer(100)).unwrap();
    assert_eq!(
        cache.property_load(IFACE, "/p0").unwrap(),
        Some(StoredProperty::new(1, PropertyValue::Integer(100)))
    );
    assert_eq!(cache.pair_count(), 30);
}
