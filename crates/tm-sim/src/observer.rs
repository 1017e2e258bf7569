//! Run observer trait for progress reporting and data collection.

use tm_core::Step;
use tm_kernel::{StateCache, VehicleRegistry};

/// Summary of one completed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepStats {
    /// Vehicles tracked after the step's refresh.
    pub vehicles: usize,
    /// Mean speed over all tracked vehicles (0.0 on an empty network).
    pub mean_speed: f64,
    /// Lane-change commands issued this step.
    pub lane_changes: usize,
    /// Vehicles observed leaving the network this step.
    pub arrived: usize,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// step loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_step_end(&mut self, step: Step, stats: &StepStats) {
///         if step.0 % self.interval == 0 {
///             println!("{step}: {} vehicles, mean {:.2} m/s", stats.vehicles, stats.mean_speed);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each step, before any processing.
    fn on_step_start(&mut self, _step: Step) {}

    /// Called at the end of each step, after the cache refresh.
    fn on_step_end(&mut self, _step: Step, _stats: &StepStats) {}

    /// Called at snapshot intervals (every `config.output_interval_steps`
    /// steps; never when that is 0).
    ///
    /// Provides read-only access to the registry and the freshly refreshed
    /// cache so output writers can record per-vehicle state without the sim
    /// knowing about any specific output format.
    fn on_snapshot(&mut self, _step: Step, _registry: &VehicleRegistry, _cache: &StateCache) {}

    /// Called once after the final step completes.
    fn on_run_end(&mut self, _final_step: Step) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
