//! A lane changer that never requests a change.

use tm_core::{SimRng, VehicleId};

use crate::{LaneChanger, TrafficView};

/// Always stays in the current lane.
///
/// The baseline controller for vehicle populations that should hold their
/// lane, and a useful placeholder in tests.
pub struct StaticLaneChanger;

impl LaneChanger for StaticLaneChanger {
    fn target_lane(
        &self,
        id: &VehicleId,
        view: &TrafficView<'_>,
        _rng: &mut SimRng,
    ) -> Option<usize> {
        view.lane(id)
    }
}
