//! Simulation step counter, clock, and run configuration.
//!
//! Time is a monotonically increasing `Step` counter; one step corresponds to
//! `step_secs` of simulated time.  Using an integer step as the canonical
//! unit keeps comparisons exact — the floating-point step duration only
//! enters when converting to elapsed seconds or integrating kinematics.

use std::fmt;

use crate::{TmError, TmResult};

// ── Step ─────────────────────────────────────────────────────────────────────

/// An absolute simulation step counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step(pub u64);

impl Step {
    pub const ZERO: Step = Step(0);

    /// Return the step `n` after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Step {
        Step(self.0 + n)
    }

    /// Steps elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Step) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Step {
    type Output = Step;
    #[inline]
    fn add(self, rhs: u64) -> Step {
        Step(self.0 + rhs)
    }
}

impl std::ops::Sub for Step {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Step) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

// ── StepClock ─────────────────────────────────────────────────────────────────

/// Tracks the current step and maps it to simulated seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepClock {
    /// Simulated seconds one step represents.
    pub step_secs: f64,
    /// The current step — advanced by `StepClock::advance()` once per step.
    pub current_step: Step,
}

impl StepClock {
    pub fn new(step_secs: f64) -> Self {
        Self {
            step_secs,
            current_step: Step::ZERO,
        }
    }

    /// Advance the clock by one step.
    #[inline]
    pub fn advance(&mut self) {
        self.current_step = Step(self.current_step.0 + 1);
    }

    /// Elapsed simulated seconds since step 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_step.0 as f64 * self.step_secs
    }
}

impl fmt::Display for StepClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1} s)", self.current_step, self.elapsed_secs())
    }
}

// ── RunConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration, fixed before the first step.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// Total steps to simulate.
    pub total_steps: u64,

    /// Simulated seconds per step.
    pub step_secs: f64,

    /// Master RNG seed.  The same seed always produces identical runs.
    pub seed: u64,

    /// Emit a state snapshot every N steps.  0 disables snapshots.
    pub output_interval_steps: u64,
}

impl RunConfig {
    /// Reject malformed configuration before any step runs.
    pub fn validate(&self) -> TmResult<()> {
        if !self.step_secs.is_finite() || self.step_secs <= 0.0 {
            return Err(TmError::Config(format!(
                "step_secs must be a positive real, got {}",
                self.step_secs
            )));
        }
        Ok(())
    }

    /// The step at which the run ends (exclusive upper bound).
    #[inline]
    pub fn end_step(&self) -> Step {
        Step(self.total_steps)
    }

    /// Construct a `StepClock` pre-configured for this run.
    pub fn make_clock(&self) -> StepClock {
        StepClock::new(self.step_secs)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            total_steps: 1_000,
            step_secs: 0.1,
            seed: 0,
            output_interval_steps: 0,
        }
    }
}
