//! The `VehicleRegistry` — identity lifecycle and static attributes.
//!
//! The registry is the sole owner of vehicle identity: ids exist from `add`
//! to `remove` (or until the kernel observes the vehicle leave the network).
//! A `BTreeMap` keeps iteration in ascending id order, which the step loop
//! relies on for deterministic decision order.

use std::collections::BTreeMap;

use tm_core::{TmError, TmResult, VehicleId};

use crate::{VehicleClass, VehicleSpec};

#[derive(Default, Debug)]
pub struct VehicleRegistry {
    specs: BTreeMap<VehicleId, VehicleSpec>,
}

impl VehicleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vehicle.  Duplicate ids are rejected — identity is unique
    /// for the lifetime of a run.
    pub fn add(&mut self, id: VehicleId, spec: VehicleSpec) -> TmResult<()> {
        if self.specs.contains_key(&id) {
            return Err(TmError::Config(format!("vehicle {id} already registered")));
        }
        self.specs.insert(id, spec);
        Ok(())
    }

    /// Deregister a vehicle, returning its spec if it was present.
    pub fn remove(&mut self, id: &VehicleId) -> Option<VehicleSpec> {
        self.specs.remove(id)
    }

    #[inline]
    pub fn contains(&self, id: &VehicleId) -> bool {
        self.specs.contains_key(id)
    }

    #[inline]
    pub fn spec(&self, id: &VehicleId) -> Option<&VehicleSpec> {
        self.specs.get(id)
    }

    /// All registered ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &VehicleId> {
        self.specs.keys()
    }

    /// Registered ids of one class, in ascending order.
    pub fn ids_of_class(&self, class: VehicleClass) -> Vec<VehicleId> {
        self.specs
            .iter()
            .filter(|(_, spec)| spec.class == class)
            .map(|(id, _)| id.clone())
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
