//! Read-only traffic state passed to every controller callback.

use tm_core::{RingGeometry, Step, VehicleId};
use tm_kernel::{LaneContext, StateCache, VehicleRegistry};

/// A read-only snapshot of one step's traffic state.
///
/// Built once per step by the step loop and shared (immutably) across all
/// controller callbacks during the decision phase.  All queries go through
/// the state cache — nothing here touches the simulator.
///
/// # Lifetimes
///
/// All borrows live for the duration of one step's decision phase.  The step
/// loop never mutates the cache while a `TrafficView` is live.
pub struct TrafficView<'a> {
    /// Current simulation step.
    pub step: Step,
    /// Simulated seconds one step represents — for controllers that convert
    /// a desired speed delta into an acceleration.
    pub step_secs: f64,
    geometry: &'a RingGeometry,
    registry: &'a VehicleRegistry,
    cache: &'a StateCache,
}

impl<'a> TrafficView<'a> {
    /// Build a new view for a single step.
    #[inline]
    pub fn new(
        step: Step,
        step_secs: f64,
        geometry: &'a RingGeometry,
        registry: &'a VehicleRegistry,
        cache: &'a StateCache,
    ) -> Self {
        Self {
            step,
            step_secs,
            geometry,
            registry,
            cache,
        }
    }

    #[inline]
    pub fn num_lanes(&self) -> usize {
        self.geometry.num_lanes()
    }

    #[inline]
    pub fn track_length(&self) -> f64 {
        self.geometry.length()
    }

    // ── Per-vehicle state ─────────────────────────────────────────────────

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

    // ── Neighbourhood queries ─────────────────────────────────────────────

    pub fn lane_context(&self, id: &VehicleId, lane: usize) -> Option<LaneContext> {
        self.cache.lane_context(self.geometry, id, lane)
    }

    pub fn vehicles_in_window(
        &self,
        id: &VehicleId,
        lane: usize,
        back: f64,
        forward: f64,
    ) -> Vec<VehicleId> {
        self.cache
            .vehicles_in_window(self.geometry, id, lane, back, forward)
    }

    /// Arithmetic mean speed over the vehicles in the window, the query
    /// vehicle included when it is in `lane`.  `None` when the window holds
    /// no vehicles — the caller decides what "no data" means.
    pub fn mean_window_speed(
        &self,
        id: &VehicleId,
        lane: usize,
        back: f64,
        forward: f64,
    ) -> Option<f64> {
        let ids = self.vehicles_in_window(id, lane, back, forward);
        if ids.is_empty() {
            return None;
        }
        let sum: f64 = ids.iter().filter_map(|v| self.cache.speed(v)).sum();
        Some(sum / ids.len() as f64)
    }
}
