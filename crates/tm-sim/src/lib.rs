//! `tm-sim` — step-loop orchestrator for the rust_tm traffic kernel.
//!
//! # The step loop
//!
//! ```text
//! for step in 0..config.total_steps:
//!   ① Decide   — one TrafficView over the pre-step cache; every vehicle's
//!                lane changer and longitudinal controller run in ascending
//!                id order and their outputs are collected.
//!   ② Apply    — accelerations, then the lane-change decision record, each
//!                as one batched kernel call; lane-change timestamps are
//!                stamped here.
//!   ③ Advance  — the simulator integrates one step of physical state.
//!   ④ Refresh  — kernel.update(reset = false) re-mirrors the cache and
//!                accounts departures.
//! ```
//!
//! Everything is single-threaded and synchronous: decisions are computed
//! from the same immutable snapshot, applied sequentially, and the one
//! generator behind all draws makes a run replay exactly from its seed.
//! A step either completes fully or its error aborts the run — per-vehicle
//! anomalies are absorbed inside the kernel, everything else is fatal.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tm_core::{RingGeometry, RunConfig};
//! use tm_sim::{NoopObserver, RingSimulator, SimBuilder};
//!
//! let geometry = RingGeometry::new(2, 200.0)?;
//! let link = RingSimulator::new(geometry.clone());
//! let mut sim = SimBuilder::new(RunConfig::default(), geometry, link)
//!     .vehicle(/* id, spec, reading, lane changer, longitudinal */)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod ring_link;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, StepStats};
pub use ring_link::RingSimulator;
pub use sim::Sim;
