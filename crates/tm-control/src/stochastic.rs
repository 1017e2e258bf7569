//! The stochastic lane changer.
//!
//! Scores every lane by how fast local traffic is moving, vetoes lanes whose
//! neighbour gaps are unsafe, and probabilistically commits to the best lane
//! when it beats the current one by a configurable margin.

use tm_core::{SimRng, VehicleId};

use crate::{ControlError, ControlResult, LaneChanger, TrafficView};

/// Tuning parameters for [`StochasticLaneChanger`].
///
/// Distances share the track's length unit; speeds share its speed unit.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneChangeConfig {
    /// Minimum score advantage a lane must have over the current one before
    /// a change is considered.
    pub speed_threshold: f64,
    /// Probability that a warranted change is actually requested.
    pub change_probability: f64,
    /// How far back the speed-sampling window reaches.
    pub back_distance: f64,
    /// How far forward the speed-sampling window reaches.
    pub forward_distance: f64,
    /// Minimum required clearance behind the vehicle in a candidate lane.
    pub gap_back: f64,
    /// Minimum required clearance ahead of the vehicle in a candidate lane.
    pub gap_forward: f64,
}

impl Default for LaneChangeConfig {
    fn default() -> Self {
        Self {
            speed_threshold: 5.0,
            change_probability: 0.5,
            back_distance: 0.0,
            forward_distance: 60.0,
            gap_back: 10.0,
            gap_forward: 5.0,
        }
    }
}

impl LaneChangeConfig {
    /// Reject unusable parameters before the controller is installed.
    pub fn validate(&self) -> ControlResult<()> {
        if !(0.0..=1.0).contains(&self.change_probability) {
            return Err(ControlError::Config(format!(
                "change_probability must be in [0, 1], got {}",
                self.change_probability
            )));
        }
        for (name, value) in [
            ("speed_threshold", self.speed_threshold),
            ("back_distance", self.back_distance),
            ("forward_distance", self.forward_distance),
            ("gap_back", self.gap_back),
            ("gap_forward", self.gap_forward),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ControlError::Config(format!(
                    "{name} must be a non-negative real, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Scores lanes by local mean traffic speed and commits probabilistically.
pub struct StochasticLaneChanger {
    config: LaneChangeConfig,
}

impl StochasticLaneChanger {
    pub fn new(config: LaneChangeConfig) -> ControlResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Default-tuned instance.
    pub fn default_tuning() -> Self {
        Self {
            config: LaneChangeConfig::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &LaneChangeConfig {
        &self.config
    }

    /// Score every lane for `id`, index = lane.  `None` when the vehicle is
    /// no longer in the cache.
    ///
    /// Per lane: a missing leader or follower scores the vehicle's own
    /// `max_speed` (an open lane is maximally attractive); an unsafe gap on
    /// either side scores `0.0` no matter how fast that lane moves; otherwise
    /// the score is the mean speed of all vehicles in the sampling window.
    /// A window with no vehicles at all is scored like an open lane —
    /// `max_speed` — so "no data" never reads as "blocked".
    pub fn lane_scores(&self, id: &VehicleId, view: &TrafficView<'_>) -> Option<Vec<f64>> {
        let max_speed = view.max_speed(id)?;
        view.lane(id)?;
        let scores = (0..view.num_lanes())
            .map(|lane| {
                let ctx = match view.lane_context(id, lane) {
                    Some(ctx) => ctx,
                    None => return 0.0,
                };
                if ctx.leader.is_none() || ctx.follower.is_none() {
                    return max_speed;
                }
                if ctx.headway < self.config.gap_forward || ctx.footway < self.config.gap_back {
                    return 0.0;
                }
                view.mean_window_speed(
                    id,
                    lane,
                    self.config.back_distance,
                    self.config.forward_distance,
                )
                .unwrap_or(max_speed)
            })
            .collect();
        Some(scores)
    }
}

impl LaneChanger for StochasticLaneChanger {
    /// One decision per step, from the pre-step cache only.
    ///
    /// The change commits iff the best lane differs from the current one,
    /// its score beats the current lane's by more than `speed_threshold`,
    /// and a uniform draw lands under `change_probability`.  The draw is
    /// taken only when the first two conditions hold, so replaying a run
    /// consumes the RNG identically.  Ties go to the lowest lane index.
    fn target_lane(
        &self,
        id: &VehicleId,
        view: &TrafficView<'_>,
        rng: &mut SimRng,
    ) -> Option<usize> {
        let current = view.lane(id)?;
        let scores = self.lane_scores(id, view)?;

        let (best_lane, best_score) = scores
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bl, bs), (lane, &score)| {
                if score > bs { (lane, score) } else { (bl, bs) }
            });
        let current_score = scores[current];

        if best_lane != current
            && best_score - current_score > self.config.speed_threshold
            && rng.random::<f64>() < self.config.change_probability
        {
            Some(best_lane)
        } else {
            Some(current)
        }
    }
}
