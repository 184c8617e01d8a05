mod common;

use std::collections::BTreeSet;

use common::flash::{RamFlash, SECTOR_SIZE};
use common::init_logger;
use device_cache::blob::{MemoryBlobs, NvsBlobs};
use device_cache::{DeviceCache, PropertyValue, StoredProperty};

const IFACE: &str = "org.example.Sensor";
const SECTORS: usize = 4;

fn mount(flash: &RamFlash) -> DeviceCache<NvsBlobs<RamFlash>> {
    let blobs = NvsBlobs::new(flash.clone(), 0..(flash.sectors() * SECTOR_SIZE) as u32);
    DeviceCache::new(blobs).unwrap()
}

fn integer(cache: &mut DeviceCache<NvsBlobs<RamFlash>>, path: &str) -> Option<i32> {
    match cache.property_load(IFACE, path).unwrap() {
        Some(StoredProperty {
            value: PropertyValue::Integer(v),
            ..
        }) => Some(v),
        Some(other) => panic!("unexpected value {:?}", other),
        None => None,
    }
}

/// Every property path survives at most one version behind, and no key shows up twice.
fn check_consistent(cache: &mut DeviceCache<NvsBlobs<RamFlash>>) {
    let keys = cache.property_snapshot().unwrap();
    let unique: BTreeSet<_> = keys.iter().collect();
    assert_eq!(unique.len(), keys.len());
    assert_eq!(keys.len(), cache.pair_count() as usize);
}

#[test]
fn test_nvs_cache_survives_remount() {
    init_logger();
    let flash = RamFlash::new(SECTORS);
    let mut cache = mount(&flash);
    cache.property_store(IFACE, "/a", 1, &PropertyValue::Integer(1)).unwrap();
    cache.property_store(IFACE, "/b", 1, &PropertyValue::Integer(2)).unwrap();
    cache.synchronization_set(true).unwrap();
    cache.introspection_store("org.example.Sensor:1:0").unwrap();
    cache.property_delete(IFACE, "/a").unwrap();

    drop(cache);

    let mut cache = mount(&flash);
    assert_eq!(integer(&mut cache, "/a"), None);
    assert_eq!(integer(&mut cache, "/b"), Some(2));
    assert_eq!(cache.synchronization_get().unwrap(), Some(true));
    assert_eq!(
        cache.introspection_check("org.example.Sensor:1:0").unwrap(),
        device_cache::IntrospectionStatus::Current
    );
}

#[test]
fn test_nvs_power_cut_at_every_write() {
    init_logger();

    let base = RamFlash::new(SECTORS);
    let mut cache = mount(&base);
    for (path, v) in [("/a", 0), ("/b", 10), ("/c", 20), ("/d", 30)] {
        cache.property_store(IFACE, path, 1, &PropertyValue::Integer(v)).unwrap();
    }
    drop(cache);

    let mut completed_all = false;
    for cut in 0.. {
        let flash = base.fork();
        flash.cut_power_after(cut);
        let mut cache = mount(&flash);

        // Values of "/a" whose store returned Ok, and the one in flight when power went out.
        let mut stored_a = 0;
        let mut in_flight_a = None;
        let mut deleted_b = false;
        let mut stored_e = false;

        let result = (|| {
            cache.property_delete(IFACE, "/b")?;
            deleted_b = true;
            cache.property_store(IFACE, "/e", 1, &PropertyValue::Integer(40))?;
            stored_e = true;
            // Enough updates to wrap around every page.
            for v in 1..=150 {
                in_flight_a = Some(v);
                cache.property_store(IFACE, "/a", 1, &PropertyValue::Integer(v))?;
                stored_a = v;
                in_flight_a = None;
            }
            Ok::<_, device_cache::Error<_>>(())
        })();

        drop(cache);
        flash.restore_power();
        let mut cache = mount(&flash);
        check_consistent(&mut cache);

        assert_eq!(integer(&mut cache, "/c"), Some(20), "cut after {} writes", cut);
        assert_eq!(integer(&mut cache, "/d"), Some(30), "cut after {} writes", cut);

        let a = integer(&mut cache, "/a").unwrap();
        assert!(a == stored_a || Some(a) == in_flight_a, "cut after {} writes: /a = {}", cut, a);

        let b = integer(&mut cache, "/b");
        if deleted_b {
            assert_eq!(b, None);
        } else {
            assert!(b.is_none() || b == Some(10));
        }

        let e = integer(&mut cache, "/e");
        if stored_e {
            assert_eq!(e, Some(40));
        } else {
            assert!(e.is_none() || e == Some(40));
        }

        if result.is_ok() {
            completed_all = true;
            break;
        }
    }
    assert!(completed_all);
}

#[test]
fn test_memory_power_cut_during_delete() {
    init_logger();
    for cut in 0..4 {
        let mut cache = DeviceCache::new(MemoryBlobs::new()).unwrap();
        for (path, v) in [("/a", 0), ("/b", 10), ("/c", 20)] {
            cache.property_store(IFACE, path, 1, &PropertyValue::Integer(v)).unwrap();
        }

        cache.pairs_mut().blobs_mut().fail_after_writes(cut);
        assert!(cache.property_delete(IFACE, "/a").is_err());

        let mut blobs = cache.destroy();
        blobs.restore_power();
        let mut cache = DeviceCache::new(blobs).unwrap();

        let keys = cache.property_snapshot().unwrap();
        assert_eq!(keys.len(), cache.pair_count() as usize);
        assert!(cache.property_load(IFACE, "/b").unwrap().is_some());
        assert_eq!(
            cache.property_load(IFACE, "/c").unwrap(),
            Some(StoredProperty::new(1, PropertyValue::Integer(20)))
        );
    }
}
