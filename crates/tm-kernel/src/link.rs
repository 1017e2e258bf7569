//! The `SimulatorLink` trait — the kernel's only window onto the simulator.
//!
//! One concrete implementation exists per backing simulator; the kernel and
//! everything above it depend only on this trait.  All exchanges are batched:
//! one state pull and at most one call per command sink per step, so the step
//! loop performs a bounded number of simulator round-trips regardless of
//! population size.

use tm_core::{TmResult, VehicleId};

/// One vehicle's dynamic state as reported by the simulator.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleReading {
    /// Lane index, `0 <= lane < num_lanes`.
    pub lane: usize,
    /// 1-D track position.  The cache wraps this to `[0, length)` on ingest.
    pub position: f64,
    /// Current speed, `>= 0`.
    pub speed: f64,
}

/// Capability set the kernel requires from a simulator backend.
///
/// Command sinks accept `(vehicle, value)` pairs and take effect on the next
/// [`advance`](Self::advance).  Errors from any method are fatal to the step:
/// the kernel has no partial-step recovery, by contract of the step loop.
pub trait SimulatorLink {
    /// Enumerate every vehicle currently live in the simulator.
    ///
    /// Used when rebuilding the cache after a simulator-level reset.
    fn vehicle_ids(&self) -> Vec<VehicleId>;

    /// Pull `(lane, position, speed)` for every live vehicle in one batch.
    fn pull_states(&mut self) -> TmResult<Vec<(VehicleId, VehicleReading)>>;

    /// Issue acceleration commands, one `(vehicle, m/s^2)` pair each.
    fn send_accelerations(&mut self, commands: &[(VehicleId, f64)]) -> TmResult<()>;

    /// Issue instantaneous lane-change commands, one `(vehicle, target lane)`
    /// pair each.
    fn send_lane_changes(&mut self, commands: &[(VehicleId, usize)]) -> TmResult<()>;

    /// Insert a new vehicle into the simulation at the given state.
    fn spawn(&mut self, id: &VehicleId, reading: VehicleReading) -> TmResult<()>;

    /// Remove a vehicle from the simulation.  Removing an id the simulator no
    /// longer knows is not an error — the vehicle may have exited on its own.
    fn despawn(&mut self, id: &VehicleId) -> TmResult<()>;

    /// Advance physical state by one step of `step_secs` simulated seconds.
    fn advance(&mut self, step_secs: f64) -> TmResult<()>;
}
