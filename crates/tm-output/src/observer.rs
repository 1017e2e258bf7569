//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use tm_core::Step;
use tm_kernel::{StateCache, VehicleRegistry};
use tm_sim::{SimObserver, StepStats};

use crate::row::{StepSummaryRow, VehicleSnapshotRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes vehicle snapshots and step summaries to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer: W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_step_end(&mut self, step: Step, stats: &StepStats) {
        let row = StepSummaryRow {
            step: step.0,
            vehicles: stats.vehicles as u64,
            mean_speed: stats.mean_speed,
            lane_changes: stats.lane_changes as u64,
            arrived: stats.arrived as u64,
        };
        let result = self.writer.write_step_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, step: Step, registry: &VehicleRegistry, cache: &StateCache) {
        // Registry order is ascending id, so rows come out deterministic.
        let rows: Vec<VehicleSnapshotRow> = registry
            .ids()
            .filter_map(|id| {
                cache.state(id).map(|state| VehicleSnapshotRow {
                    vehicle_id: id.to_string(),
                    step: step.0,
                    lane: state.lane,
                    position: state.position,
                    speed: state.speed,
                })
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_run_end(&mut self, _final_step: Step) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
