//! Static vehicle attributes, fixed at add time.

use tm_core::{TmError, TmResult};

/// Who actuates this vehicle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleClass {
    /// Driven by the simulator's own models or a rule-based controller.
    #[default]
    Human,
    /// Actuated by an external learning agent.
    Rl,
}

/// Static attributes of one vehicle.  Dynamic state (lane, position, speed)
/// lives in the per-step cache, not here.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleSpec {
    /// Maximum speed the vehicle can reach, `> 0`.
    pub max_speed: f64,
    /// Physical length, `> 0`.
    pub length: f64,
    pub class: VehicleClass,
    /// Ordered edge labels of the vehicle's route.  On the single-loop
    /// network this defaults to the one ring edge.
    pub route: Vec<String>,
}

impl VehicleSpec {
    /// Validate and construct with `Human` class and the single-loop route.
    pub fn new(max_speed: f64, length: f64) -> TmResult<Self> {
        if !max_speed.is_finite() || max_speed <= 0.0 {
            return Err(TmError::Config(format!(
                "max_speed must be a positive real, got {max_speed}"
            )));
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(TmError::Config(format!(
                "vehicle length must be a positive real, got {length}"
            )));
        }
        Ok(Self {
            max_speed,
            length,
            class: VehicleClass::Human,
            route: vec!["ring".to_owned()],
        })
    }

    pub fn class(mut self, class: VehicleClass) -> Self {
        self.class = class;
        self
    }

    pub fn route(mut self, route: Vec<String>) -> Self {
        self.route = route;
        self
    }
}
