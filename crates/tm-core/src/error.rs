//! Workspace error type.
//!
//! Sub-crates may define their own error enums and convert them into
//! `TmError` via `From` impls, or keep them separate and wrap `TmError` as
//! one variant.  Both patterns are acceptable; prefer whichever keeps error
//! sites clean.
//!
//! Per-vehicle anomalies (a queried id that vanished between steps) are NOT
//! errors on the read path — read accessors return `Option` so one vehicle's
//! disappearance can never abort a step.  `UnknownVehicle` appears only where
//! a mutation names a specific missing vehicle.

use thiserror::Error;

use crate::VehicleId;

/// The top-level error type for `tm-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum TmError {
    /// A mutation referenced an id that is not in the kernel.
    #[error("vehicle {0} not found")]
    UnknownVehicle(VehicleId),

    /// A lane index outside `[0, num_lanes)` reached a boundary that must
    /// reject it — lane indices are never silently clamped.
    #[error("lane {lane} out of range (network has {num_lanes} lanes)")]
    InvalidLane { lane: usize, num_lanes: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `tm-*` crates.
pub type TmResult<T> = Result<T, TmError>;
