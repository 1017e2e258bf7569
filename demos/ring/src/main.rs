//! ring — two-lane circular-road demo for the rust_tm traffic kernel.
//!
//! Twelve vehicles share a 200 m two-lane loop: six slow lane-holders and six
//! faster vehicles that change lanes stochastically when traffic ahead is
//! slower than the other lane.  Writes per-step summaries and periodic
//! vehicle snapshots as CSV.
//!
//! Usage: `ring [output_dir]` (default `./output`).

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;

use tm_control::{
    LaneChangeConfig, LaneChanger, LongitudinalController, StaticLaneChanger,
    StochasticLaneChanger, TrafficView,
};
use tm_core::{RingGeometry, RunConfig, SimRng, Step, VehicleId};
use tm_kernel::{StateCache, VehicleReading, VehicleRegistry, VehicleSpec};
use tm_output::{CsvWriter, OutputWriter, SimOutputObserver};
use tm_sim::{RingSimulator, SimBuilder, SimObserver, StepStats};

// ── Constants ─────────────────────────────────────────────────────────────────

const TRACK_LENGTH: f64 = 200.0;
const NUM_LANES: usize = 2;
const SLOW_COUNT: usize = 6;
const FAST_COUNT: usize = 6;
const SLOW_TARGET: f64 = 6.0; // m/s
const FAST_TARGET: f64 = 10.0; // m/s
const VEHICLE_MAX_SPEED: f64 = 35.0;
const VEHICLE_LENGTH: f64 = 5.0;
const TOTAL_STEPS: u64 = 1_000;
const STEP_SECS: f64 = 0.1;
const SEED: u64 = 42;
const OUTPUT_INTERVAL_STEPS: u64 = 10;
const PROGRESS_INTERVAL_STEPS: u64 = 100;

// ── Application controllers ───────────────────────────────────────────────────

/// Relaxes toward a desired speed under bounded acceleration.
struct DesiredSpeed {
    target: f64,
    max_accel: f64,
    max_decel: f64,
}

impl DesiredSpeed {
    fn new(target: f64) -> Self {
        Self {
            target,
            max_accel: 3.0,
            max_decel: 6.0,
        }
    }
}

impl LongitudinalController for DesiredSpeed {
    fn acceleration(
        &self,
        id: &VehicleId,
        view: &TrafficView<'_>,
        _rng: &mut SimRng,
    ) -> Option<f64> {
        let speed = view.speed(id)?;
        let wanted = (self.target - speed) / view.step_secs;
        Some(wanted.clamp(-self.max_decel, self.max_accel))
    }
}

// ── Progress wrapper over the CSV observer ────────────────────────────────────

struct Progress<O: SimObserver> {
    inner: O,
    total_lane_changes: u64,
}

impl<O: SimObserver> Progress<O> {
    fn new(inner: O) -> Self {
        Self {
            inner,
            total_lane_changes: 0,
        }
    }
}

impl<O: SimObserver> SimObserver for Progress<O> {
    fn on_step_start(&mut self, step: Step) {
        self.inner.on_step_start(step);
    }

    fn on_step_end(&mut self, step: Step, stats: &StepStats) {
        self.total_lane_changes += stats.lane_changes as u64;
        if step.0 % PROGRESS_INTERVAL_STEPS == 0 {
            println!(
                "{step}: {} vehicles, mean {:.2} m/s, {} lane changes so far",
                stats.vehicles, stats.mean_speed, self.total_lane_changes
            );
        }
        self.inner.on_step_end(step, stats);
    }

    fn on_snapshot(&mut self, step: Step, registry: &VehicleRegistry, cache: &StateCache) {
        self.inner.on_snapshot(step, registry, cache);
    }

    fn on_run_end(&mut self, final_step: Step) {
        self.inner.on_run_end(final_step);
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    let output_dir: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./output".to_owned())
        .into();
    fs::create_dir_all(&output_dir)?;

    let geometry = RingGeometry::new(NUM_LANES, TRACK_LENGTH)?;
    let config = RunConfig {
        total_steps: TOTAL_STEPS,
        step_secs: STEP_SECS,
        seed: SEED,
        output_interval_steps: OUTPUT_INTERVAL_STEPS,
    };

    // Slow lane-holders and faster stochastic changers, interleaved and
    // evenly spaced around the loop, all starting in lane 0.
    let total = SLOW_COUNT + FAST_COUNT;
    let spacing = TRACK_LENGTH / total as f64;
    let mut builder = SimBuilder::new(config, geometry.clone(), RingSimulator::new(geometry));
    for i in 0..total {
        let slow = i % 2 == 0;
        let (name, target) = if slow {
            (format!("slow_{}", i / 2), SLOW_TARGET)
        } else {
            (format!("fast_{}", i / 2), FAST_TARGET)
        };
        let changer: Box<dyn LaneChanger> = if slow {
            Box::new(StaticLaneChanger)
        } else {
            Box::new(StochasticLaneChanger::new(LaneChangeConfig::default())?)
        };
        builder = builder.vehicle(
            name,
            VehicleSpec::new(VEHICLE_MAX_SPEED, VEHICLE_LENGTH)?,
            VehicleReading {
                lane: 0,
                position: i as f64 * spacing,
                speed: target,
            },
            changer,
            Box::new(DesiredSpeed::new(target)),
        );
    }
    let mut sim = builder.build()?;

    let writer = CsvWriter::new(&output_dir)?;
    let mut observer = Progress::new(SimOutputObserver::new(writer));

    let started = Instant::now();
    sim.run(&mut observer)?;
    let elapsed = started.elapsed();

    if let Some(e) = observer.inner.take_error() {
        log::warn!("output error: {e}");
    }
    observer.inner.into_writer().finish()?;

    println!(
        "done: {} steps in {:.2?}, {} lane changes, output in {}",
        TOTAL_STEPS,
        elapsed,
        observer.total_lane_changes,
        output_dir.display()
    );
    Ok(())
}
