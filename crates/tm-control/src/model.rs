//! The `LaneChanger` trait — the lane-assignment extension point.

use tm_core::{SimRng, VehicleId};

use crate::TrafficView;

/// The per-step lane decisions, one `(vehicle, target lane)` pair each, in
/// ascending vehicle-id order.  Ephemeral: produced by the decision phase and
/// consumed immediately by the kernel's lane-change command path.
pub type DecisionRecord = Vec<(VehicleId, usize)>;

/// Pluggable lane-change behavior, assigned per vehicle.
///
/// Implementations receive a read-only [`TrafficView`] and the run's
/// [`SimRng`], and return the lane the vehicle wants to occupy next step.
/// Returning the current lane means "stay"; returning `None` means the
/// controller abstains (typically because the vehicle vanished from the
/// cache), and the step loop records nothing for it.
///
/// The trait is object-safe: the step loop stores one boxed controller per
/// vehicle, mirroring how vehicle types carry their own controllers.
pub trait LaneChanger {
    fn target_lane(
        &self,
        id: &VehicleId,
        view: &TrafficView<'_>,
        rng: &mut SimRng,
    ) -> Option<usize>;
}
