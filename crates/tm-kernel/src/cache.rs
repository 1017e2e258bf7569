//! The per-step state cache.
//!
//! Refreshed once per step from a single batched simulator pull; every read
//! query in the workspace is served from here.  The cache also maintains a
//! per-lane list of `(position, id)` sorted by position, rebuilt once per
//! refresh, so leader/follower lookups are a binary search instead of a scan.

use std::collections::hash_map::Entry;

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use tm_core::{RingGeometry, Step, TmError, TmResult, VehicleId};

use crate::{VehicleReading, VehicleRegistry};

/// Dynamic state of one vehicle for the current step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleState {
    pub lane: usize,
    /// Track position, wrapped to `[0, length)`.
    pub position: f64,
    pub speed: f64,
    /// Step at which this vehicle last changed lanes; `None` = never.
    pub last_change: Option<Step>,
}

/// What a refresh observed besides the updated triples.
#[derive(Debug, Default)]
pub struct RefreshOutcome {
    /// Tracked ids absent from the pull — vehicles that left the network
    /// since the previous step, in ascending id order.
    pub departed: Vec<VehicleId>,
}

#[derive(Default, Debug)]
pub struct StateCache {
    states: FxHashMap<VehicleId, VehicleState>,
    /// Per-lane `(position, id)` lists, each sorted by position.
    pub(crate) lane_index: Vec<Vec<(f64, VehicleId)>>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one step's batched pull.
    ///
    /// With `reset = true` all cached data is discarded and rebuilt from the
    /// readings (used after a simulator-level reset); lane-change bookkeeping
    /// starts over.  With `reset = false` only the `(lane, position, speed)`
    /// triple is updated for ids already tracked, and `last_change` survives.
    ///
    /// Readings for unregistered ids are skipped with a debug log.  A reading
    /// whose lane is outside the network is malformed simulator output and
    /// fails the whole refresh.
    pub fn refresh(
        &mut self,
        reset: bool,
        readings: &[(VehicleId, VehicleReading)],
        registry: &VehicleRegistry,
        geometry: &RingGeometry,
    ) -> TmResult<RefreshOutcome> {
        for (_, reading) in readings {
            if !geometry.contains_lane(reading.lane) {
                return Err(TmError::InvalidLane {
                    lane: reading.lane,
                    num_lanes: geometry.num_lanes(),
                });
            }
        }

        if reset {
            self.states.clear();
        }

        let mut seen: FxHashSet<&VehicleId> = FxHashSet::default();
        for (id, reading) in readings {
            seen.insert(id);
            if !registry.contains(id) {
                debug!("ignoring unregistered vehicle {id} in state pull");
                continue;
            }
            let position = geometry.wrap(reading.position);
            match self.states.entry(id.clone()) {
                Entry::Occupied(mut entry) => {
                    let state = entry.get_mut();
                    state.lane = reading.lane;
                    state.position = position;
                    state.speed = reading.speed;
                }
                Entry::Vacant(entry) => {
                    if reset {
                        entry.insert(VehicleState {
                            lane: reading.lane,
                            position,
                            speed: reading.speed,
                            last_change: None,
                        });
                    } else {
                        // A non-reset refresh only updates ids already tracked.
                        debug!("ignoring untracked vehicle {id} in state pull");
                    }
                }
            }
        }

        let mut departed: Vec<VehicleId> = self
            .states
            .keys()
            .filter(|id| !seen.contains(id))
            .cloned()
            .collect();
        departed.sort_unstable();
        for id in &departed {
            self.states.remove(id);
        }

        self.rebuild_lane_index(geometry);
        Ok(RefreshOutcome { departed })
    }

    /// Insert a vehicle mid-run (`VehicleKernel::add` path).
    pub(crate) fn insert(
        &mut self,
        id: VehicleId,
        reading: VehicleReading,
        geometry: &RingGeometry,
    ) {
        self.states.insert(
            id,
            VehicleState {
                lane: reading.lane,
                position: geometry.wrap(reading.position),
                speed: reading.speed,
                last_change: None,
            },
        );
        self.rebuild_lane_index(geometry);
    }

    pub(crate) fn remove(&mut self, id: &VehicleId, geometry: &RingGeometry) {
        if self.states.remove(id).is_some() {
            self.rebuild_lane_index(geometry);
        }
    }

    fn rebuild_lane_index(&mut self, geometry: &RingGeometry) {
        self.lane_index.clear();
        self.lane_index
            .resize_with(geometry.num_lanes(), Vec::new);
        for (id, state) in &self.states {
            self.lane_index[state.lane].push((state.position, id.clone()));
        }
        for lane in &mut self.lane_index {
            lane.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        }
    }

    // ── Read queries — O(1), never touch the simulator ────────────────────

    #[inline]
    pub fn contains(&self, id: &VehicleId) -> bool {
        self.states.contains_key(id)
    }

    #[inline]
    pub fn state(&self, id: &VehicleId) -> Option<&VehicleState> {
        self.states.get(id)
    }

    #[inline]
    pub fn position(&self, id: &VehicleId) -> Option<f64> {
        self.states.get(id).map(|s| s.position)
    }

    #[inline]
    pub fn speed(&self, id: &VehicleId) -> Option<f64> {
        self.states.get(id).map(|s| s.speed)
    }

    #[inline]
    pub fn lane(&self, id: &VehicleId) -> Option<usize> {
        self.states.get(id).map(|s| s.lane)
    }

    #[inline]
    pub fn last_change(&self, id: &VehicleId) -> Option<Step> {
        self.states.get(id).and_then(|s| s.last_change)
    }

    /// Stamp the lane-change step for `id`.  Returns `false` if the vehicle
    /// is no longer tracked.
    pub(crate) fn set_last_change(&mut self, id: &VehicleId, step: Step) -> bool {
        match self.states.get_mut(id) {
            Some(state) => {
                state.last_change = Some(step);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Mean speed over all tracked vehicles; `None` when the cache is empty.
    pub fn mean_speed(&self) -> Option<f64> {
        if self.states.is_empty() {
            return None;
        }
        let sum: f64 = self.states.values().map(|s| s.speed).sum();
        Some(sum / self.states.len() as f64)
    }
}
