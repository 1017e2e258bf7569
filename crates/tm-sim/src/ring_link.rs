//! An in-memory ring-road simulator.
//!
//! The reference [`SimulatorLink`] backend used by tests and demos.  It holds
//! the authoritative `(lane, position, speed)` per vehicle and integrates the
//! minimal kinematics `v' = max(0, v + a·dt)`, `x' = (x + v'·dt) mod L` —
//! deliberately not a car-following model.  Commands accumulate between
//! [`advance`](SimulatorLink::advance) calls and take effect at the next one,
//! like a batched round-trip to an external simulator process.

use tm_core::{RingGeometry, TmError, TmResult, VehicleId};
use tm_kernel::{SimulatorLink, VehicleReading};

struct RingVehicle {
    id: VehicleId,
    lane: usize,
    position: f64,
    speed: f64,
}

pub struct RingSimulator {
    geometry: RingGeometry,
    vehicles: Vec<RingVehicle>,
    pending_accelerations: Vec<(VehicleId, f64)>,
    pending_lane_changes: Vec<(VehicleId, usize)>,
}

impl RingSimulator {
    pub fn new(geometry: RingGeometry) -> Self {
        Self {
            geometry,
            vehicles: Vec::new(),
            pending_accelerations: Vec::new(),
            pending_lane_changes: Vec::new(),
        }
    }

    fn index_of(&self, id: &VehicleId) -> Option<usize> {
        self.vehicles.iter().position(|v| &v.id == id)
    }
}

impl SimulatorLink for RingSimulator {
    fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles.iter().map(|v| v.id.clone()).collect()
    }

    fn pull_states(&mut self) -> TmResult<Vec<(VehicleId, VehicleReading)>> {
        Ok(self
            .vehicles
            .iter()
            .map(|v| {
                (
                    v.id.clone(),
                    VehicleReading {
                        lane: v.lane,
                        position: v.position,
                        speed: v.speed,
                    },
                )
            })
            .collect())
    }

    fn send_accelerations(&mut self, commands: &[(VehicleId, f64)]) -> TmResult<()> {
        self.pending_accelerations.extend_from_slice(commands);
        Ok(())
    }

    fn send_lane_changes(&mut self, commands: &[(VehicleId, usize)]) -> TmResult<()> {
        for (_, lane) in commands {
            if !self.geometry.contains_lane(*lane) {
                return Err(TmError::InvalidLane {
                    lane: *lane,
                    num_lanes: self.geometry.num_lanes(),
                });
            }
        }
        self.pending_lane_changes.extend_from_slice(commands);
        Ok(())
    }

    fn spawn(&mut self, id: &VehicleId, reading: VehicleReading) -> TmResult<()> {
        if !self.geometry.contains_lane(reading.lane) {
            return Err(TmError::InvalidLane {
                lane: reading.lane,
                num_lanes: self.geometry.num_lanes(),
            });
        }
        if self.index_of(id).is_some() {
            return Err(TmError::Config(format!("vehicle {id} already spawned")));
        }
        self.vehicles.push(RingVehicle {
            id: id.clone(),
            lane: reading.lane,
            position: self.geometry.wrap(reading.position),
            speed: reading.speed.max(0.0),
        });
        Ok(())
    }

    fn despawn(&mut self, id: &VehicleId) -> TmResult<()> {
        // Despawning an id that already exited is not an error.
        self.vehicles.retain(|v| &v.id != id);
        Ok(())
    }

    fn advance(&mut self, step_secs: f64) -> TmResult<()> {
        // Commands first, then integration — a command issued this step
        // shapes this step's motion, exactly once.
        for (id, lane) in std::mem::take(&mut self.pending_lane_changes) {
            if let Some(i) = self.index_of(&id) {
                self.vehicles[i].lane = lane;
            }
        }
        for (id, acceleration) in std::mem::take(&mut self.pending_accelerations) {
            if let Some(i) = self.index_of(&id) {
                let v = &mut self.vehicles[i];
                v.speed = (v.speed + acceleration * step_secs).max(0.0);
            }
        }
        for v in &mut self.vehicles {
            v.position = self.geometry.wrap(v.position + v.speed * step_secs);
        }
        Ok(())
    }
}
