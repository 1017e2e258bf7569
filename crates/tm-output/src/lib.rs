//! `tm-output` — run output writers for the rust_tm traffic kernel.
//!
//! The CSV backend creates two files in the configured output directory:
//! - `vehicle_snapshots.csv` — per-vehicle state at every snapshot interval
//! - `step_summaries.csv` — aggregate statistics for every step
//!
//! The backend implements [`OutputWriter`] and is driven by
//! [`SimOutputObserver`], which implements `tm_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tm_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{StepSummaryRow, VehicleSnapshotRow};
pub use writer::OutputWriter;
