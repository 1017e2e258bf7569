//! Leader/follower relationships and longitudinal gaps on the ring.
//!
//! All queries run against the cache's per-lane position-sorted index, so a
//! leader or follower lookup is a binary search plus a short cyclic scan to
//! skip the query vehicle itself.  Distances are wrapped modulo the track
//! length: a leader just past position 0 is a few metres ahead of a vehicle
//! near the end of the track, not a lap behind it.

use tm_core::{RingGeometry, VehicleId};

use crate::StateCache;

/// Derived neighbourhood of one vehicle in one lane.  Never stored — computed
/// on demand from the current step's cache.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneContext {
    /// Vehicle immediately ahead in the lane, if any.
    pub leader: Option<VehicleId>,
    /// Vehicle immediately behind in the lane, if any.
    pub follower: Option<VehicleId>,
    /// Wrapped forward gap to the leader; `f64::INFINITY` with no leader —
    /// an open lane is maximally clear, never "zero gap".
    pub headway: f64,
    /// Wrapped backward gap to the follower; `f64::INFINITY` with no follower.
    pub footway: f64,
}

impl StateCache {
    /// Entries of `lane`, sorted by position.  Empty for out-of-range lanes.
    #[inline]
    fn ring(&self, lane: usize) -> &[(f64, VehicleId)] {
        self.lane_index.get(lane).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The vehicle in `lane` minimizing the wrapped forward distance from
    /// `id`'s position, excluding `id` itself.
    pub fn leader(&self, id: &VehicleId, lane: usize) -> Option<VehicleId> {
        let pos = self.position(id)?;
        let ring = self.ring(lane);
        // First entry at or past the query position; co-located vehicles are
        // zero distance ahead and therefore lead.
        let start = ring.partition_point(|(x, _)| *x < pos);
        for k in 0..ring.len() {
            let (_, cand) = &ring[(start + k) % ring.len()];
            if cand != id {
                return Some(cand.clone());
            }
        }
        None
    }

    /// The vehicle in `lane` minimizing the wrapped forward distance *to*
    /// `id`'s position, excluding `id` itself.
    pub fn follower(&self, id: &VehicleId, lane: usize) -> Option<VehicleId> {
        let pos = self.position(id)?;
        let ring = self.ring(lane);
        let start = ring.partition_point(|(x, _)| *x < pos);
        for k in 1..=ring.len() {
            let (_, cand) = &ring[(start + ring.len() - k) % ring.len()];
            if cand != id {
                return Some(cand.clone());
            }
        }
        None
    }

    /// Leader, follower, and both wrapped gaps for `id` in `lane`.
    ///
    /// `None` when `id` itself is not tracked (it may have left the network);
    /// absent neighbours yield infinite gaps, not zero.
    pub fn lane_context(
        &self,
        geometry: &RingGeometry,
        id: &VehicleId,
        lane: usize,
    ) -> Option<LaneContext> {
        let pos = self.position(id)?;
        let leader = self.leader(id, lane);
        let follower = self.follower(id, lane);
        let headway = leader
            .as_ref()
            .and_then(|l| self.position(l))
            .map_or(f64::INFINITY, |lp| geometry.forward_gap(pos, lp));
        let footway = follower
            .as_ref()
            .and_then(|f| self.position(f))
            .map_or(f64::INFINITY, |fp| geometry.forward_gap(fp, pos));
        Some(LaneContext {
            leader,
            follower,
            headway,
            footway,
        })
    }

    /// Vehicles in `lane` whose wrapped offset from `id` lies within
    /// `[-back, forward]`, sorted by position.  Includes `id` itself when it
    /// is in `lane` (its offset is zero).  Empty when `id` is not tracked.
    pub fn vehicles_in_window(
        &self,
        geometry: &RingGeometry,
        id: &VehicleId,
        lane: usize,
        back: f64,
        forward: f64,
    ) -> Vec<VehicleId> {
        let Some(pos) = self.position(id) else {
            return Vec::new();
        };
        let length = geometry.length();
        self.ring(lane)
            .iter()
            .filter(|(x, _)| {
                let ahead = geometry.forward_gap(pos, *x);
                ahead <= forward || ahead >= length - back
            })
            .map(|(_, cand)| cand.clone())
            .collect()
    }

    // ── All-lane conveniences ─────────────────────────────────────────────

    /// Leader of `id` in every lane, index = lane.
    pub fn lane_leaders(&self, geometry: &RingGeometry, id: &VehicleId) -> Vec<Option<VehicleId>> {
        (0..geometry.num_lanes())
            .map(|lane| self.leader(id, lane))
            .collect()
    }

    /// Headway of `id` in every lane; `f64::INFINITY` where no leader exists.
    pub fn lane_headways(&self, geometry: &RingGeometry, id: &VehicleId) -> Vec<f64> {
        (0..geometry.num_lanes())
            .map(|lane| {
                self.lane_context(geometry, id, lane)
                    .map_or(f64::INFINITY, |ctx| ctx.headway)
            })
            .collect()
    }

    /// Follower of `id` in every lane, index = lane.
    pub fn lane_followers(
        &self,
        geometry: &RingGeometry,
        id: &VehicleId,
    ) -> Vec<Option<VehicleId>> {
        (0..geometry.num_lanes())
            .map(|lane| self.follower(id, lane))
            .collect()
    }

    /// Backward gap of `id` in every lane; `f64::INFINITY` where no follower
    /// exists.
    pub fn lane_tailways(&self, geometry: &RingGeometry, id: &VehicleId) -> Vec<f64> {
        (0..geometry.num_lanes())
            .map(|lane| {
                self.lane_context(geometry, id, lane)
                    .map_or(f64::INFINITY, |ctx| ctx.footway)
            })
            .collect()
    }
}
