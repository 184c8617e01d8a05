#![allow(dead_code)]

pub mod flash;

use device_cache::PropertyValue;

pub fn init_logger() {
    let _ = env_logger::Builder::from_default_env()
        .is_test(true)
        .try_init();
}

/// A property as stored by the tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub interface_name: &'static str,
    pub path: &'static str,
    pub major: u32,
    pub value: PropertyValue,
}

impl Property {
    pub fn new(
        interface_name: &'static str,
        path: &'static str,
        major: u32,
        value: impl Into<PropertyValue>,
    ) -> Self {
        Self {
            interface_name,
            path,
            major,
            value: value.into(),
        }
    }
}

pub fn p1() -> Property {
    Property::new("first.interface", "/first/path/to/property", 12, 11i32)
}

pub fn p2() -> Property {
    Property::new("second.interface", "/third/path/to/property", 45, false)
}

pub fn p3() -> Property {
    Property::new("first.interface", "/second/path/to/property", 12, 23.4)
}

pub fn p4() -> Property {
    Property::new("third.interface", "/fourth/path/to/property", 33, 11.5)
}

pub fn p5() -> Property {
    Property::new("fourth.interface", "/fifth/path/to/property", 33, true)
}

pub fn p6() -> Property {
    Property::new("fourth.interface", "/sixth/path/to/property", 33, false)
}
