//! `tm-control` — per-vehicle control decisions over the cached traffic state.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                     |
//! |-----------------|--------------------------------------------------------------|
//! | [`context`]     | `TrafficView<'a>` — read-only per-step snapshot              |
//! | [`model`]       | `LaneChanger` trait, `DecisionRecord`                        |
//! | [`noop`]        | `StaticLaneChanger` — never requests a change                |
//! | [`stochastic`]  | `StochasticLaneChanger` + `LaneChangeConfig`                 |
//! | [`longitudinal`]| `LongitudinalController` trait, `NoopLongitudinal`           |
//! | [`error`]       | `ControlError`, `ControlResult<T>`                           |
//!
//! # Design notes
//!
//! Controllers are pure functions of one step's cached state plus the run's
//! RNG: every vehicle's decision is computed from the same pre-step snapshot,
//! never from another vehicle's in-progress choice, so decision order cannot
//! bias outcomes.  The step loop calls controllers in ascending vehicle-id
//! order and applies the collected `DecisionRecord` afterwards in one batch.

pub mod context;
pub mod error;
pub mod longitudinal;
pub mod model;
pub mod noop;
pub mod stochastic;

#[cfg(test)]
mod tests;

pub use context::TrafficView;
pub use error::{ControlError, ControlResult};
pub use longitudinal::{LongitudinalController, NoopLongitudinal};
pub use model::{DecisionRecord, LaneChanger};
pub use noop::StaticLaneChanger;
pub use stochastic::{LaneChangeConfig, StochasticLaneChanger};
