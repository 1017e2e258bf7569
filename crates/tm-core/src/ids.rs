//! Vehicle identifiers.
//!
//! The backing simulator addresses vehicles by string name, so `VehicleId`
//! wraps an `Arc<str>`: clones are a refcount bump, equality and hashing are
//! by content, and ids can be used as map keys and sorted-collection elements
//! without ceremony.  Lane indices are plain `usize` — a lane is only
//! meaningful relative to a [`RingGeometry`](crate::RingGeometry), which owns
//! the bounds check.

use std::fmt;
use std::sync::Arc;

/// Unique identifier of one vehicle, as known to the simulator.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleId(Arc<str>);

impl VehicleId {
    pub fn new(id: impl AsRef<str>) -> Self {
        VehicleId(Arc::from(id.as_ref()))
    }

    /// The raw string form, as sent over the simulator link.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(s: &str) -> Self {
        VehicleId::new(s)
    }
}

impl From<String> for VehicleId {
    fn from(s: String) -> Self {
        VehicleId(Arc::from(s))
    }
}

impl AsRef<str> for VehicleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
