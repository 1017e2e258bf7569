//! The `Sim` struct and its step loop.

use rustc_hash::FxHashMap;

use tm_control::{DecisionRecord, LaneChanger, LongitudinalController, TrafficView};
use tm_core::{RunConfig, SimRng, Step, StepClock, VehicleId};
use tm_kernel::{SimulatorLink, VehicleKernel};

use crate::{SimObserver, SimResult, StepStats};

/// The main simulation runner.
///
/// Owns the [`VehicleKernel`], one boxed controller pair per vehicle, the
/// run's single RNG, and the clock.  Create via
/// [`SimBuilder`][crate::SimBuilder].
pub struct Sim<S: SimulatorLink> {
    /// Global configuration (total steps, seed, step duration, …).
    pub config: RunConfig,

    /// Simulation clock — tracks the current step.
    pub clock: StepClock,

    /// The vehicle-state kernel over the simulator backend.
    pub kernel: VehicleKernel<S>,

    pub(crate) changers: FxHashMap<VehicleId, Box<dyn LaneChanger>>,
    pub(crate) longitudinals: FxHashMap<VehicleId, Box<dyn LongitudinalController>>,

    /// The run's RNG.  Every controller draw flows through here, in
    /// ascending vehicle-id order, so runs replay exactly.
    pub rng: SimRng,
}

impl<S: SimulatorLink> Sim<S> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current step to `config.end_step()`.
    ///
    /// Calls observer hooks at every step boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        loop {
            let now = self.clock.current_step;
            if now >= self.config.end_step() {
                break;
            }
            self.process_step(now, observer)?;
        }
        observer.on_run_end(self.clock.current_step);
        Ok(())
    }

    /// Run exactly `n` steps from the current position (ignores `end_step`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_steps<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            let now = self.clock.current_step;
            self.process_step(now, observer)?;
        }
        Ok(())
    }

    /// A read-only view of the current cached state, for external decision
    /// consumers (e.g. a learning policy computing accelerations between
    /// steps).
    pub fn view(&self) -> TrafficView<'_> {
        TrafficView::new(
            self.clock.current_step,
            self.config.step_secs,
            self.kernel.geometry(),
            &self.kernel.registry,
            &self.kernel.cache,
        )
    }

    /// Remove a vehicle and its controllers mid-run.
    pub fn remove_vehicle(&mut self, id: &VehicleId) -> SimResult<()> {
        self.changers.remove(id);
        self.longitudinals.remove(id);
        self.kernel.remove(id).map_err(Into::into)
    }

    // ── Core step processing ──────────────────────────────────────────────

    fn process_step<O: SimObserver>(&mut self, now: Step, observer: &mut O) -> SimResult<()> {
        observer.on_step_start(now);

        // ── Phase 1: decision phase ───────────────────────────────────────
        //
        // One view over the pre-step cache; every decision reads the same
        // snapshot, so vehicles cannot react to each other's in-progress
        // choices and iteration order cannot bias outcomes.  Ascending id
        // order fixes the RNG draw sequence.
        let ids = self.kernel.ids();
        let mut decisions: DecisionRecord = Vec::new();
        let mut accelerations: Vec<(VehicleId, f64)> = Vec::new();
        {
            let view = TrafficView::new(
                now,
                self.config.step_secs,
                self.kernel.geometry(),
                &self.kernel.registry,
                &self.kernel.cache,
            );
            for id in &ids {
                if let Some(changer) = self.changers.get(id)
                    && let Some(lane) = changer.target_lane(id, &view, &mut self.rng)
                {
                    decisions.push((id.clone(), lane));
                }
                if let Some(longitudinal) = self.longitudinals.get(id)
                    && let Some(acc) = longitudinal.acceleration(id, &view, &mut self.rng)
                {
                    accelerations.push((id.clone(), acc));
                }
            }
        }

        // ── Phase 2: apply phase ──────────────────────────────────────────
        self.kernel.apply_accelerations(&accelerations)?;
        let lane_changes = self.kernel.apply_lane_changes(&decisions, now)?;

        // ── Phase 3: simulator advance ────────────────────────────────────
        self.kernel.advance(self.config.step_secs)?;

        // ── Phase 4: cache refresh ────────────────────────────────────────
        self.kernel.update(false)?;

        let stats = StepStats {
            vehicles: self.kernel.num_vehicles(),
            mean_speed: self.kernel.cache.mean_speed().unwrap_or(0.0),
            lane_changes,
            arrived: self.kernel.arrived_last_step().len(),
        };
        observer.on_step_end(now, &stats);
        if self.config.output_interval_steps > 0
            && now.0.is_multiple_of(self.config.output_interval_steps)
        {
            observer.on_snapshot(now, &self.kernel.registry, &self.kernel.cache);
        }

        self.clock.advance();
        Ok(())
    }
}
