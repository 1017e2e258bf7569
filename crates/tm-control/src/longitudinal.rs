//! The `LongitudinalController` trait — the acceleration extension point.
//!
//! Car-following models live outside this workspace; this trait is the seam
//! through which they (or a learning agent's policy) feed the kernel's
//! acceleration command sink.

use tm_core::{SimRng, VehicleId};

use crate::TrafficView;

/// Pluggable acceleration behavior, assigned per vehicle.
///
/// Returning `None` defers to the simulator's own longitudinal dynamics for
/// this vehicle — no command is issued.
pub trait LongitudinalController {
    fn acceleration(
        &self,
        id: &VehicleId,
        view: &TrafficView<'_>,
        rng: &mut SimRng,
    ) -> Option<f64>;
}

/// Always defers to the simulator's own dynamics.
pub struct NoopLongitudinal;

impl LongitudinalController for NoopLongitudinal {
    fn acceleration(
        &self,
        _id: &VehicleId,
        _view: &TrafficView<'_>,
        _rng: &mut SimRng,
    ) -> Option<f64> {
        None
    }
}
