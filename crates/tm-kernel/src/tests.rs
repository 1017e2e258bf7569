//! Unit tests for tm-kernel.

use tm_core::{RingGeometry, Step, TmError, TmResult, VehicleId};

use crate::{
    SimulatorLink, StateCache, VehicleClass, VehicleKernel, VehicleReading, VehicleRegistry,
    VehicleSpec,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn geom(lanes: usize, length: f64) -> RingGeometry {
    RingGeometry::new(lanes, length).unwrap()
}

fn vid(name: &str) -> VehicleId {
    VehicleId::new(name)
}

fn reading(lane: usize, position: f64, speed: f64) -> VehicleReading {
    VehicleReading {
        lane,
        position,
        speed,
    }
}

fn registry_of(ids: &[&str]) -> VehicleRegistry {
    let mut registry = VehicleRegistry::new();
    for id in ids {
        registry
            .add(vid(id), VehicleSpec::new(30.0, 5.0).unwrap())
            .unwrap();
    }
    registry
}

/// In-memory link that records every command batch it is sent.
#[derive(Default)]
struct RecordingLink {
    vehicles: Vec<(VehicleId, VehicleReading)>,
    accel_batches: Vec<Vec<(VehicleId, f64)>>,
    lane_batches: Vec<Vec<(VehicleId, usize)>>,
}

impl SimulatorLink for RecordingLink {
    fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles.iter().map(|(id, _)| id.clone()).collect()
    }

    fn pull_states(&mut self) -> TmResult<Vec<(VehicleId, VehicleReading)>> {
        Ok(self.vehicles.clone())
    }

    fn send_accelerations(&mut self, commands: &[(VehicleId, f64)]) -> TmResult<()> {
        self.accel_batches.push(commands.to_vec());
        Ok(())
    }

    fn send_lane_changes(&mut self, commands: &[(VehicleId, usize)]) -> TmResult<()> {
        self.lane_batches.push(commands.to_vec());
        Ok(())
    }

    fn spawn(&mut self, id: &VehicleId, reading: VehicleReading) -> TmResult<()> {
        self.vehicles.push((id.clone(), reading));
        Ok(())
    }

    fn despawn(&mut self, id: &VehicleId) -> TmResult<()> {
        self.vehicles.retain(|(v, _)| v != id);
        Ok(())
    }

    fn advance(&mut self, _step_secs: f64) -> TmResult<()> {
        Ok(())
    }
}

/// Kernel with the given vehicles spawned and an initial reset refresh done.
fn kernel_with(
    geometry: RingGeometry,
    vehicles: &[(&str, VehicleReading)],
) -> VehicleKernel<RecordingLink> {
    let mut kernel = VehicleKernel::new(geometry, RecordingLink::default());
    for (name, reading) in vehicles {
        kernel
            .add(vid(name), VehicleSpec::new(30.0, 5.0).unwrap(), *reading)
            .unwrap();
    }
    kernel.update(true).unwrap();
    kernel
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod registry {
    use super::*;

    #[test]
    fn duplicate_ids_rejected() {
        let mut registry = registry_of(&["a"]);
        let err = registry.add(vid("a"), VehicleSpec::new(30.0, 5.0).unwrap());
        assert!(matches!(err, Err(TmError::Config(_))));
    }

    #[test]
    fn ids_iterate_in_ascending_order() {
        let registry = registry_of(&["veh_2", "veh_0", "veh_1"]);
        let ids: Vec<String> = registry.ids().map(|id| id.to_string()).collect();
        assert_eq!(ids, ["veh_0", "veh_1", "veh_2"]);
    }

    #[test]
    fn class_split() {
        let mut registry = registry_of(&["human_0"]);
        registry
            .add(
                vid("rl_0"),
                VehicleSpec::new(30.0, 5.0).unwrap().class(VehicleClass::Rl),
            )
            .unwrap();
        assert_eq!(registry.ids_of_class(VehicleClass::Rl), [vid("rl_0")]);
        assert_eq!(registry.ids_of_class(VehicleClass::Human), [vid("human_0")]);
    }

    #[test]
    fn spec_validation() {
        assert!(VehicleSpec::new(0.0, 5.0).is_err());
        assert!(VehicleSpec::new(30.0, -1.0).is_err());
        assert!(VehicleSpec::new(30.0, 5.0).is_ok());
    }
}

// ── State cache ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod cache {
    use super::*;

    #[test]
    fn reset_builds_from_scratch() {
        let g = geom(2, 200.0);
        let registry = registry_of(&["a", "b"]);
        let mut cache = StateCache::new();
        let readings = vec![
            (vid("a"), reading(0, 10.0, 5.0)),
            (vid("b"), reading(1, 50.0, 6.0)),
        ];
        cache.refresh(true, &readings, &registry, &g).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.lane(&vid("a")), Some(0));
        assert_eq!(cache.speed(&vid("b")), Some(6.0));
        assert_eq!(cache.last_change(&vid("a")), None);
    }

    #[test]
    fn positions_wrapped_on_ingest() {
        let g = geom(1, 200.0);
        let registry = registry_of(&["a"]);
        let mut cache = StateCache::new();
        cache
            .refresh(true, &[(vid("a"), reading(0, 250.0, 1.0))], &registry, &g)
            .unwrap();
        assert_eq!(cache.position(&vid("a")), Some(50.0));
    }

    #[test]
    fn non_reset_updates_triple_and_preserves_last_change() {
        let g = geom(2, 200.0);
        let registry = registry_of(&["a"]);
        let mut cache = StateCache::new();
        cache
            .refresh(true, &[(vid("a"), reading(0, 10.0, 5.0))], &registry, &g)
            .unwrap();
        assert!(cache.set_last_change(&vid("a"), Step(7)));

        cache
            .refresh(false, &[(vid("a"), reading(1, 20.0, 8.0))], &registry, &g)
            .unwrap();
        assert_eq!(cache.lane(&vid("a")), Some(1));
        assert_eq!(cache.position(&vid("a")), Some(20.0));
        assert_eq!(cache.speed(&vid("a")), Some(8.0));
        assert_eq!(cache.last_change(&vid("a")), Some(Step(7)));
    }

    #[test]
    fn missing_ids_reported_as_departed() {
        let g = geom(1, 200.0);
        let registry = registry_of(&["a", "b"]);
        let mut cache = StateCache::new();
        let both = vec![
            (vid("a"), reading(0, 10.0, 5.0)),
            (vid("b"), reading(0, 50.0, 5.0)),
        ];
        cache.refresh(true, &both, &registry, &g).unwrap();

        let outcome = cache
            .refresh(false, &[(vid("a"), reading(0, 11.0, 5.0))], &registry, &g)
            .unwrap();
        assert_eq!(outcome.departed, [vid("b")]);
        // The vanished vehicle degrades to the caller's default, not a fault.
        assert_eq!(cache.speed(&vid("b")), None);
        assert_eq!(cache.speed(&vid("b")).unwrap_or(-1001.0), -1001.0);
    }

    #[test]
    fn unregistered_ids_ignored() {
        let g = geom(1, 200.0);
        let registry = registry_of(&["a"]);
        let mut cache = StateCache::new();
        let readings = vec![
            (vid("a"), reading(0, 10.0, 5.0)),
            (vid("ghost"), reading(0, 90.0, 5.0)),
        ];
        cache.refresh(true, &readings, &registry, &g).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(!cache.contains(&vid("ghost")));
    }

    #[test]
    fn out_of_range_lane_is_fatal() {
        let g = geom(2, 200.0);
        let registry = registry_of(&["a"]);
        let mut cache = StateCache::new();
        let err = cache.refresh(true, &[(vid("a"), reading(2, 10.0, 5.0))], &registry, &g);
        assert!(matches!(err, Err(TmError::InvalidLane { lane: 2, .. })));
    }
}

// ── Spatial queries ───────────────────────────────────────────────────────────

#[cfg(test)]
mod spatial {
    use super::*;

    fn cache_with(g: &RingGeometry, vehicles: &[(&str, usize, f64)]) -> StateCache {
        let names: Vec<&str> = vehicles.iter().map(|(n, _, _)| *n).collect();
        let registry = registry_of(&names);
        let readings: Vec<(VehicleId, VehicleReading)> = vehicles
            .iter()
            .map(|(n, lane, pos)| (vid(n), reading(*lane, *pos, 5.0)))
            .collect();
        let mut cache = StateCache::new();
        cache.refresh(true, &readings, &registry, g).unwrap();
        cache
    }

    #[test]
    fn leader_and_follower_in_lane() {
        let g = geom(1, 200.0);
        let cache = cache_with(&g, &[("a", 0, 10.0), ("b", 0, 50.0), ("c", 0, 120.0)]);
        assert_eq!(cache.leader(&vid("a"), 0), Some(vid("b")));
        assert_eq!(cache.follower(&vid("a"), 0), Some(vid("c")));
        assert_eq!(cache.leader(&vid("c"), 0), Some(vid("a")));
        assert_eq!(cache.follower(&vid("b"), 0), Some(vid("a")));
    }

    #[test]
    fn headway_wraps_across_origin() {
        // Vehicle at 190, leader at 10 on a 200 m ring: headway 20, not -180.
        let g = geom(1, 200.0);
        let cache = cache_with(&g, &[("back", 0, 190.0), ("front", 0, 10.0)]);
        let ctx = cache.lane_context(&g, &vid("back"), 0).unwrap();
        assert_eq!(ctx.leader, Some(vid("front")));
        assert_eq!(ctx.headway, 20.0);
    }

    #[test]
    fn lone_pair_is_mutual_leader_and_follower() {
        let g = geom(1, 200.0);
        let cache = cache_with(&g, &[("a", 0, 30.0), ("b", 0, 80.0)]);
        let ctx = cache.lane_context(&g, &vid("a"), 0).unwrap();
        assert_eq!(ctx.leader, Some(vid("b")));
        assert_eq!(ctx.follower, Some(vid("b")));
        assert_eq!(ctx.headway + ctx.footway, 200.0);
    }

    #[test]
    fn empty_lane_has_no_neighbours_and_infinite_gaps() {
        let g = geom(2, 200.0);
        let cache = cache_with(&g, &[("a", 0, 30.0)]);
        assert_eq!(cache.leader(&vid("a"), 1), None);
        assert_eq!(cache.follower(&vid("a"), 1), None);
        let ctx = cache.lane_context(&g, &vid("a"), 1).unwrap();
        assert_eq!(ctx.headway, f64::INFINITY);
        assert_eq!(ctx.footway, f64::INFINITY);
        // Alone in its own lane, a vehicle has no leader either.
        assert_eq!(cache.leader(&vid("a"), 0), None);
    }

    #[test]
    fn unknown_vehicle_yields_none_and_empty() {
        let g = geom(1, 200.0);
        let cache = cache_with(&g, &[("a", 0, 30.0)]);
        assert_eq!(cache.leader(&vid("ghost"), 0), None);
        assert!(cache.lane_context(&g, &vid("ghost"), 0).is_none());
        assert!(cache.vehicles_in_window(&g, &vid("ghost"), 0, 10.0, 10.0).is_empty());
    }

    #[test]
    fn window_selects_forward_arc_and_self() {
        let g = geom(1, 200.0);
        let cache = cache_with(
            &g,
            &[("me", 0, 100.0), ("near", 0, 140.0), ("far", 0, 170.0), ("behind", 0, 90.0)],
        );
        let ids = cache.vehicles_in_window(&g, &vid("me"), 0, 0.0, 60.0);
        assert!(ids.contains(&vid("me")));
        assert!(ids.contains(&vid("near")));
        assert!(!ids.contains(&vid("far")));
        assert!(!ids.contains(&vid("behind")));
    }

    #[test]
    fn window_wraps_backward_arc() {
        let g = geom(1, 200.0);
        let cache = cache_with(&g, &[("me", 0, 5.0), ("tail", 0, 195.0), ("away", 0, 100.0)]);
        let ids = cache.vehicles_in_window(&g, &vid("me"), 0, 20.0, 0.0);
        assert!(ids.contains(&vid("tail")));
        assert!(!ids.contains(&vid("away")));
    }

    #[test]
    fn all_lane_views() {
        let g = geom(2, 200.0);
        let cache = cache_with(&g, &[("a", 0, 10.0), ("b", 0, 40.0), ("c", 1, 60.0)]);
        assert_eq!(
            cache.lane_leaders(&g, &vid("a")),
            [Some(vid("b")), Some(vid("c"))]
        );
        let headways = cache.lane_headways(&g, &vid("a"));
        assert_eq!(headways, [30.0, 50.0]);
        let tailways = cache.lane_tailways(&g, &vid("a"));
        assert_eq!(tailways[0], 170.0); // b is also the follower, wrapped
        assert_eq!(tailways[1], 150.0);
    }
}

// ── Kernel façade ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod kernel {
    use super::*;

    #[test]
    fn add_spawns_and_tracks() {
        let mut kernel = kernel_with(geom(2, 200.0), &[("a", reading(0, 10.0, 5.0))]);
        assert_eq!(kernel.num_vehicles(), 1);
        assert_eq!(kernel.lane(&vid("a")), Some(0));
        assert_eq!(kernel.max_speed(&vid("a")), Some(30.0));
        assert_eq!(kernel.route(&vid("a")), Some(&["ring".to_owned()][..]));
        kernel.remove(&vid("a")).unwrap();
        assert_eq!(kernel.num_vehicles(), 0);
        assert!(kernel.link_mut().vehicles.is_empty());
    }

    #[test]
    fn remove_unknown_is_recoverable() {
        let mut kernel = kernel_with(geom(1, 200.0), &[]);
        let err = kernel.remove(&vid("ghost"));
        assert!(matches!(err, Err(TmError::UnknownVehicle(_))));
    }

    #[test]
    fn add_rejects_out_of_range_lane() {
        let mut kernel = kernel_with(geom(2, 200.0), &[]);
        let err = kernel.add(
            vid("a"),
            VehicleSpec::new(30.0, 5.0).unwrap(),
            reading(5, 0.0, 0.0),
        );
        assert!(matches!(err, Err(TmError::InvalidLane { lane: 5, .. })));
    }

    #[test]
    fn update_accounts_departures() {
        let mut kernel = kernel_with(
            geom(1, 200.0),
            &[("a", reading(0, 10.0, 5.0)), ("b", reading(0, 50.0, 5.0))],
        );
        kernel.link_mut().despawn(&vid("b")).unwrap();
        kernel.update(false).unwrap();
        assert_eq!(kernel.arrived_last_step(), [vid("b")]);
        assert_eq!(kernel.total_arrived(), 1);
        assert_eq!(kernel.num_vehicles(), 1);
        assert_eq!(kernel.speed(&vid("b")), None);
    }

    #[test]
    fn lane_change_commands_only_on_difference() {
        let mut kernel = kernel_with(
            geom(2, 200.0),
            &[("a", reading(0, 10.0, 5.0)), ("b", reading(0, 50.0, 5.0))],
        );
        let issued = kernel
            .apply_lane_changes(&[(vid("a"), 1), (vid("b"), 0)], Step(3))
            .unwrap();
        assert_eq!(issued, 1);
        assert_eq!(kernel.link_mut().lane_batches, vec![vec![(vid("a"), 1)]]);
        // Timestamp stamped only for the vehicle that was commanded.
        assert_eq!(kernel.last_lane_change(&vid("a")), Some(Step(3)));
        assert_eq!(kernel.last_lane_change(&vid("b")), None);
    }

    #[test]
    fn invalid_lane_rejected_before_any_command() {
        let mut kernel = kernel_with(geom(2, 200.0), &[("a", reading(0, 10.0, 5.0))]);
        let err = kernel.apply_lane_changes(&[(vid("a"), 1), (vid("a"), 9)], Step(0));
        assert!(matches!(err, Err(TmError::InvalidLane { lane: 9, .. })));
        assert!(kernel.link_mut().lane_batches.is_empty());
        assert_eq!(kernel.last_lane_change(&vid("a")), None);
    }

    #[test]
    fn vanished_vehicle_skipped_in_commands() {
        let mut kernel = kernel_with(geom(2, 200.0), &[("a", reading(0, 10.0, 5.0))]);
        let issued = kernel
            .apply_lane_changes(&[(vid("ghost"), 1)], Step(0))
            .unwrap();
        assert_eq!(issued, 0);
        assert!(kernel.link_mut().lane_batches.is_empty());

        kernel
            .apply_accelerations(&[(vid("ghost"), 1.0), (vid("a"), 0.5)])
            .unwrap();
        assert_eq!(kernel.link_mut().accel_batches, vec![vec![(vid("a"), 0.5)]]);
    }

    #[test]
    fn headway_and_tailway_in_own_lane() {
        let mut kernel = kernel_with(
            geom(2, 200.0),
            &[("a", reading(0, 10.0, 5.0)), ("b", reading(0, 60.0, 5.0))],
        );
        assert_eq!(kernel.headway(&vid("a")), Some(50.0));
        assert_eq!(kernel.tailway(&vid("a")), Some(150.0));
        kernel.remove(&vid("b")).unwrap();
        assert_eq!(kernel.headway(&vid("a")), Some(f64::INFINITY));
    }
}
