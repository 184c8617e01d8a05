use crate::pair::MAX_PAIRS;

/// Tunables for a [`DeviceCache`](crate::DeviceCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of live pairs. Clamped to [`MAX_PAIRS`], the largest count whose
    /// record IDs still fit below `u16::MAX`.
    pub max_pairs: u16,
    /// Delete properties of interfaces missing from the introspection while building the
    /// device property summary, instead of only skipping them.
    pub purge_unknown_interfaces: bool,
}

impl Config {
    pub fn max_pairs(mut self, max_pairs: u16) -> Self {
        self.max_pairs = max_pairs.min(MAX_PAIRS);
        self
    }

    pub fn purge_unknown_interfaces(mut self, purge: bool) -> Self {
        self.purge_unknown_interfaces = purge;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_pairs: MAX_PAIRS,
            purge_unknown_interfaces: false,
        }
    }
}
