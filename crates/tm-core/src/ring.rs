//! Single-loop road geometry and wrapped-distance arithmetic.
//!
//! The network is one circular edge of fixed length with `num_lanes` parallel
//! lanes.  Positions are 1-D track coordinates; all gap arithmetic is done
//! modulo the track length so the road is topologically a ring.  Both fields
//! are fixed for the duration of a run.

use crate::{TmError, TmResult};

/// Geometry of the circular track.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingGeometry {
    num_lanes: usize,
    length: f64,
}

impl RingGeometry {
    /// Validate and construct.  `num_lanes` must be at least 1 and `length`
    /// must be a finite positive real; anything else is a configuration
    /// error, rejected before a run starts.
    pub fn new(num_lanes: usize, length: f64) -> TmResult<Self> {
        if num_lanes < 1 {
            return Err(TmError::Config(format!(
                "num_lanes must be >= 1, got {num_lanes}"
            )));
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(TmError::Config(format!(
                "track length must be a positive real, got {length}"
            )));
        }
        Ok(Self { num_lanes, length })
    }

    #[inline]
    pub fn num_lanes(&self) -> usize {
        self.num_lanes
    }

    /// Total track length.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[inline]
    pub fn contains_lane(&self, lane: usize) -> bool {
        lane < self.num_lanes
    }

    /// Reduce a 1-D position to the canonical `[0, length)` range.
    #[inline]
    pub fn wrap(&self, x: f64) -> f64 {
        let w = x.rem_euclid(self.length);
        // rem_euclid can round up to exactly `length` for tiny negatives.
        if w >= self.length { 0.0 } else { w }
    }

    /// Wrapped forward distance from position `a` to position `b`:
    /// `(b - a) mod length`, always in `[0, length)`.
    ///
    /// A leader just past the wrap point is *ahead*: on a 200 m ring, the gap
    /// from 190 to 10 is 20, not -180.
    #[inline]
    pub fn forward_gap(&self, a: f64, b: f64) -> f64 {
        self.wrap(b - a)
    }
}

impl std::fmt::Display for RingGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ring({} lanes x {:.1} m)", self.num_lanes, self.length)
    }
}
