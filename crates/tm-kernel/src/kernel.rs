//! `VehicleKernel<S>` — the façade over registry, cache, spatial queries, and
//! the simulator command path.

use log::{debug, warn};

use tm_core::{RingGeometry, Step, TmError, TmResult, VehicleId};

use crate::{
    LaneContext, SimulatorLink, StateCache, VehicleClass, VehicleReading, VehicleRegistry,
    VehicleSpec,
};

/// The vehicle-state kernel for one simulation run.
///
/// Composes the [`VehicleRegistry`] (identity and static attributes), the
/// [`StateCache`] (per-step dynamic snapshot), and a [`SimulatorLink`]
/// backend.  Decision logic above this type reads exclusively through the
/// cache accessors; the simulator is touched only by [`update`](Self::update)
/// and the two `apply_*` command methods.
pub struct VehicleKernel<S: SimulatorLink> {
    geometry: RingGeometry,
    /// Static attributes and identity lifecycle.
    pub registry: VehicleRegistry,
    /// Dynamic per-step state.
    pub cache: StateCache,
    link: S,
    arrived_last_step: Vec<VehicleId>,
    total_arrived: u64,
}

impl<S: SimulatorLink> VehicleKernel<S> {
    pub fn new(geometry: RingGeometry, link: S) -> Self {
        Self {
            geometry,
            registry: VehicleRegistry::new(),
            cache: StateCache::new(),
            link,
            arrived_last_step: Vec::new(),
            total_arrived: 0,
        }
    }

    #[inline]
    pub fn geometry(&self) -> &RingGeometry {
        &self.geometry
    }

    /// Direct access to the simulator backend, for scenario plumbing and
    /// tests.  Kernel invariants only hold if state mutations flow through
    /// the kernel methods, so use sparingly.
    pub fn link_mut(&mut self) -> &mut S {
        &mut self.link
    }

    // ── Simulator interaction ─────────────────────────────────────────────

    /// Refresh the cache from one batched state pull.
    ///
    /// `reset = true` rebuilds everything from the simulator's authoritative
    /// vehicle enumeration (used after a simulator-level reset); `reset =
    /// false` updates the dynamic triple for tracked ids and preserves
    /// lane-change bookkeeping.  Vehicles missing from the pull are treated
    /// as having left the network: they are dropped from cache and registry
    /// and counted as arrived, and the run continues.
    pub fn update(&mut self, reset: bool) -> TmResult<()> {
        if reset {
            for id in self.link.vehicle_ids() {
                if !self.registry.contains(&id) {
                    warn!("simulator reports unregistered vehicle {id} on reset");
                }
            }
        }
        let readings = self.link.pull_states()?;
        let outcome = self
            .cache
            .refresh(reset, &readings, &self.registry, &self.geometry)?;
        for id in &outcome.departed {
            self.registry.remove(id);
            debug!("vehicle {id} left the network");
        }
        self.total_arrived += outcome.departed.len() as u64;
        self.arrived_last_step = outcome.departed;
        Ok(())
    }

    /// Add a vehicle: register it, insert it into the simulator, and track it
    /// in the cache starting from `reading`.
    pub fn add(&mut self, id: VehicleId, spec: VehicleSpec, reading: VehicleReading) -> TmResult<()> {
        if !self.geometry.contains_lane(reading.lane) {
            return Err(TmError::InvalidLane {
                lane: reading.lane,
                num_lanes: self.geometry.num_lanes(),
            });
        }
        self.registry.add(id.clone(), spec)?;
        self.link.spawn(&id, reading)?;
        self.cache.insert(id, reading, &self.geometry);
        Ok(())
    }

    /// Remove a vehicle from registry, cache, and simulator.  Unknown ids are
    /// a recoverable [`TmError::UnknownVehicle`].
    pub fn remove(&mut self, id: &VehicleId) -> TmResult<()> {
        if self.registry.remove(id).is_none() {
            return Err(TmError::UnknownVehicle(id.clone()));
        }
        self.cache.remove(id, &self.geometry);
        self.link.despawn(id)
    }

    // ── Mutation/command interface ────────────────────────────────────────

    /// Issue one batched acceleration command.  Ids that vanished between
    /// decision and application are skipped with a warning — a disappearing
    /// vehicle never aborts the step.
    pub fn apply_accelerations(&mut self, commands: &[(VehicleId, f64)]) -> TmResult<()> {
        let live: Vec<(VehicleId, f64)> = commands
            .iter()
            .filter(|(id, _)| {
                let known = self.cache.contains(id);
                if !known {
                    warn!("dropping acceleration for vanished vehicle {id}");
                }
                known
            })
            .cloned()
            .collect();
        if live.is_empty() {
            return Ok(());
        }
        self.link.send_accelerations(&live)
    }

    /// Apply a decision record: issue one lane-change command per vehicle
    /// whose target differs from its cached lane, and stamp `last_change`
    /// for exactly those vehicles.  Returns the number of commands issued.
    ///
    /// Every target lane is validated up front; an out-of-range index rejects
    /// the whole record before any command is issued (never clamped).
    /// Vanished vehicles are skipped with a warning.
    pub fn apply_lane_changes(
        &mut self,
        decisions: &[(VehicleId, usize)],
        now: Step,
    ) -> TmResult<usize> {
        for (_, lane) in decisions {
            if !self.geometry.contains_lane(*lane) {
                return Err(TmError::InvalidLane {
                    lane: *lane,
                    num_lanes: self.geometry.num_lanes(),
                });
            }
        }

        let mut commands: Vec<(VehicleId, usize)> = Vec::new();
        for (id, target) in decisions {
            match self.cache.lane(id) {
                Some(current) if current != *target => {
                    commands.push((id.clone(), *target));
                }
                Some(_) => {} // already there — no command, no timestamp
                None => warn!("dropping lane change for vanished vehicle {id}"),
            }
        }

        if commands.is_empty() {
            return Ok(0);
        }
        self.link.send_lane_changes(&commands)?;
        for (id, _) in &commands {
            self.cache.set_last_change(id, now);
        }
        Ok(commands.len())
    }

    /// Advance the simulator's physical state by one step.
    pub fn advance(&mut self, step_secs: f64) -> TmResult<()> {
        self.link.advance(step_secs)
    }

    // ── Read API — cache and registry only ────────────────────────────────

    /// All registered ids in ascending order (the deterministic decision
    /// order).
    pub fn ids(&self) -> Vec<VehicleId> {
        self.registry.ids().cloned().collect()
    }

    pub fn ids_of_class(&self, class: VehicleClass) -> Vec<VehicleId> {
        self.registry.ids_of_class(class)
    }

    #[inline]
    pub fn num_vehicles(&self) -> usize {
        self.registry.len()
    }

    /// Vehicles observed leaving the network during the last `update`.
    pub fn arrived_last_step(&self) -> &[VehicleId] {
        &self.arrived_last_step
    }

    /// Total vehicles that have left the network this run.
    #[inline]
    pub fn total_arrived(&self) -> u64 {
        self.total_arrived
    }

    #[inline]
    pub fn position(&self, id: &VehicleId) -> Option<f64> {
        self.cache.position(id)
    }

    #[inline]
    pub fn speed(&self, id: &VehicleId) -> Option<f64> {
        self.cache.speed(id)
    }

    #[inline]
    pub fn lane(&self, id: &VehicleId) -> Option<usize> {
        self.cache.lane(id)
    }

    #[inline]
    pub fn last_lane_change(&self, id: &VehicleId) -> Option<Step> {
        self.cache.last_change(id)
    }

    #[inline]
    pub fn max_speed(&self, id: &VehicleId) -> Option<f64> {
        self.registry.spec(id).map(|s| s.max_speed)
    }

    #[inline]
    pub fn length(&self, id: &VehicleId) -> Option<f64> {
        self.registry.spec(id).map(|s| s.length)
    }

    #[inline]
    pub fn class(&self, id: &VehicleId) -> Option<VehicleClass> {
        self.registry.spec(id).map(|s| s.class)
    }

    #[inline]
    pub fn route(&self, id: &VehicleId) -> Option<&[String]> {
        self.registry.spec(id).map(|s| s.route.as_slice())
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    pub fn leader(&self, id: &VehicleId, lane: usize) -> Option<VehicleId> {
        self.cache.leader(id, lane)
    }

    pub fn follower(&self, id: &VehicleId, lane: usize) -> Option<VehicleId> {
        self.cache.follower(id, lane)
    }

    pub fn lane_context(&self, id: &VehicleId, lane: usize) -> Option<LaneContext> {
        self.cache.lane_context(&self.geometry, id, lane)
    }

    /// Wrapped gap to the leader in the vehicle's own lane; infinite when the
    /// lane is otherwise empty, `None` when the vehicle itself is gone.
    pub fn headway(&self, id: &VehicleId) -> Option<f64> {
        let lane = self.cache.lane(id)?;
        self.lane_context(id, lane).map(|ctx| ctx.headway)
    }

    /// Wrapped gap to the follower in the vehicle's own lane.
    pub fn tailway(&self, id: &VehicleId) -> Option<f64> {
        let lane = self.cache.lane(id)?;
        self.lane_context(id, lane).map(|ctx| ctx.footway)
    }

    pub fn vehicles_in_window(
        &self,
        id: &VehicleId,
        lane: usize,
        back: f64,
        forward: f64,
    ) -> Vec<VehicleId> {
        self.cache
            .vehicles_in_window(&self.geometry, id, lane, back, forward)
    }

    pub fn lane_leaders(&self, id: &VehicleId) -> Vec<Option<VehicleId>> {
        self.cache.lane_leaders(&self.geometry, id)
    }

    pub fn lane_headways(&self, id: &VehicleId) -> Vec<f64> {
        self.cache.lane_headways(&self.geometry, id)
    }

    pub fn lane_followers(&self, id: &VehicleId) -> Vec<Option<VehicleId>> {
        self.cache.lane_followers(&self.geometry, id)
    }

    pub fn lane_tailways(&self, id: &VehicleId) -> Vec<f64> {
        self.cache.lane_tailways(&self.geometry, id)
    }
}
