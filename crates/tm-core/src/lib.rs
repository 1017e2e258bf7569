//! `tm-core` — foundational types for the `rust_tm` traffic-kernel workspace.
//!
//! This crate is a dependency of every other `tm-*` crate.  It intentionally
//! has no `tm-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                          |
//! |-------------|---------------------------------------------------|
//! | [`ids`]     | `VehicleId`                                       |
//! | [`ring`]    | `RingGeometry`, wrapped-distance arithmetic       |
//! | [`step`]    | `Step`, `StepClock`, `RunConfig`                  |
//! | [`rng`]     | `SimRng` (single seedable run-level generator)    |
//! | [`error`]   | `TmError`, `TmResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod ids;
pub mod ring;
pub mod rng;
pub mod step;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{TmError, TmResult};
pub use ids::VehicleId;
pub use ring::RingGeometry;
pub use rng::SimRng;
pub use step::{RunConfig, Step, StepClock};
