//! Fluent builder for constructing a [`Sim`].

use rustc_hash::FxHashMap;

use tm_control::{LaneChanger, LongitudinalController};
use tm_core::{RingGeometry, RunConfig, SimRng, VehicleId};
use tm_kernel::{SimulatorLink, VehicleKernel, VehicleReading, VehicleSpec};

use crate::{Sim, SimResult};

struct VehicleSetup {
    id: VehicleId,
    spec: VehicleSpec,
    reading: VehicleReading,
    changer: Box<dyn LaneChanger>,
    longitudinal: Box<dyn LongitudinalController>,
}

/// Fluent builder for [`Sim<S>`].
///
/// Validates everything up front: a malformed run configuration, a duplicate
/// vehicle id, or an out-of-range placement is rejected here, before the
/// first step runs.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, geometry.clone(), RingSimulator::new(geometry))
///     .vehicle(
///         "veh_0",
///         VehicleSpec::new(30.0, 5.0)?,
///         VehicleReading { lane: 0, position: 0.0, speed: 0.0 },
///         Box::new(StochasticLaneChanger::default_tuning()),
///         Box::new(NoopLongitudinal),
///     )
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<S: SimulatorLink> {
    config: RunConfig,
    geometry: RingGeometry,
    link: S,
    vehicles: Vec<VehicleSetup>,
}

impl<S: SimulatorLink> SimBuilder<S> {
    pub fn new(config: RunConfig, geometry: RingGeometry, link: S) -> Self {
        Self {
            config,
            geometry,
            link,
            vehicles: Vec::new(),
        }
    }

    /// Queue a vehicle with its initial state and controllers.
    pub fn vehicle(
        mut self,
        id: impl Into<VehicleId>,
        spec: VehicleSpec,
        reading: VehicleReading,
        changer: Box<dyn LaneChanger>,
        longitudinal: Box<dyn LongitudinalController>,
    ) -> Self {
        self.vehicles.push(VehicleSetup {
            id: id.into(),
            spec,
            reading,
            changer,
            longitudinal,
        });
        self
    }

    /// Validate inputs, spawn and register every queued vehicle, perform the
    /// initial full cache build, and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<S>> {
        self.config.validate()?;

        let mut kernel = VehicleKernel::new(self.geometry, self.link);
        let mut changers: FxHashMap<VehicleId, Box<dyn LaneChanger>> = FxHashMap::default();
        let mut longitudinals: FxHashMap<VehicleId, Box<dyn LongitudinalController>> =
            FxHashMap::default();

        for setup in self.vehicles {
            kernel.add(setup.id.clone(), setup.spec, setup.reading)?;
            changers.insert(setup.id.clone(), setup.changer);
            longitudinals.insert(setup.id, setup.longitudinal);
        }

        // Full rebuild from the simulator's authoritative enumeration.
        kernel.update(true)?;

        Ok(Sim {
            clock: self.config.make_clock(),
            rng: SimRng::new(self.config.seed),
            config: self.config,
            kernel,
            changers,
            longitudinals,
        })
    }
}
