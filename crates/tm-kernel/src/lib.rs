//! `tm-kernel` — the vehicle-state kernel.
//!
//! The ground truth for every vehicle lives in an external simulator process.
//! This crate maintains a consistent, query-friendly mirror of that state and
//! the command path back:
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`link`]     | `SimulatorLink` trait, `VehicleReading`                        |
//! | [`spec`]     | `VehicleSpec`, `VehicleClass` — static attributes              |
//! | [`registry`] | `VehicleRegistry` — identity lifecycle                         |
//! | [`cache`]    | `StateCache` — per-step dynamic state snapshot                 |
//! | [`spatial`]  | leader/follower/gap queries on the ring, `LaneContext`         |
//! | [`kernel`]   | `VehicleKernel<S>` — the façade composing all of the above     |
//!
//! # Design notes
//!
//! All read queries are served from the [`StateCache`], refreshed in one
//! batched pull per step — nothing on the read path talks to the simulator,
//! so per-step query cost is O(1) amortized.  Read accessors return `Option`:
//! a vehicle can exit the network between steps, and a vanished id must
//! degrade to the caller's default value, never to a panic or an aborted
//! step.  Mutations are batched per step and reject out-of-range lane indices
//! before issuing anything.

pub mod cache;
pub mod kernel;
pub mod link;
pub mod registry;
pub mod spatial;
pub mod spec;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cache::{RefreshOutcome, StateCache, VehicleState};
pub use kernel::VehicleKernel;
pub use link::{SimulatorLink, VehicleReading};
pub use registry::VehicleRegistry;
pub use spatial::LaneContext;
pub use spec::{VehicleClass, VehicleSpec};
