//! The `OutputWriter` trait implemented by all output backends.

use crate::{OutputResult, StepSummaryRow, VehicleSnapshotRow};

pub trait OutputWriter {
    /// Append a batch of per-vehicle snapshot rows.
    fn write_snapshots(&mut self, rows: &[VehicleSnapshotRow]) -> OutputResult<()>;

    /// Append one step-summary row.
    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()>;

    /// Flush and close.  Safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
