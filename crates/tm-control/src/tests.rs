//! Unit tests for tm-control.

use tm_core::{RingGeometry, SimRng, Step, VehicleId};
use tm_kernel::{StateCache, VehicleReading, VehicleRegistry, VehicleSpec};

use crate::{
    LaneChangeConfig, LaneChanger, StaticLaneChanger, StochasticLaneChanger, TrafficView,
};

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// `(name, lane, position, speed, max_speed)` per vehicle.
type Fixture<'a> = &'a [(&'a str, usize, f64, f64, f64)];

fn vid(name: &str) -> VehicleId {
    VehicleId::new(name)
}

fn view<'a>(
    geometry: &'a RingGeometry,
    registry: &'a VehicleRegistry,
    cache: &'a StateCache,
) -> TrafficView<'a> {
    TrafficView::new(Step(0), 0.1, geometry, registry, cache)
}

fn populate(geometry: &RingGeometry, vehicles: Fixture) -> (VehicleRegistry, StateCache) {
    let mut registry = VehicleRegistry::new();
    let mut readings = Vec::new();
    for (name, lane, position, speed, max_speed) in vehicles {
        registry
            .add(vid(name), VehicleSpec::new(*max_speed, 5.0).unwrap())
            .unwrap();
        readings.push((
            vid(name),
            VehicleReading {
                lane: *lane,
                position: *position,
                speed: *speed,
            },
        ));
    }
    let mut cache = StateCache::new();
    cache.refresh(true, &readings, &registry, geometry).unwrap();
    (registry, cache)
}

fn changer(change_probability: f64) -> StochasticLaneChanger {
    StochasticLaneChanger::new(LaneChangeConfig {
        change_probability,
        ..LaneChangeConfig::default()
    })
    .unwrap()
}

/// The forced-switch scenario: two lanes, a peer hard ahead of `a` in lane 0,
/// lane 1 empty.
fn blocked_scenario(geometry: &RingGeometry) -> (VehicleRegistry, StateCache) {
    populate(
        geometry,
        &[("a", 0, 100.0, 2.0, 30.0), ("blocker", 0, 103.0, 2.0, 30.0)],
    )
}

// ── Lane scoring ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod scoring {
    use super::*;

    #[test]
    fn empty_lanes_score_max_speed_exactly() {
        let g = RingGeometry::new(2, 200.0).unwrap();
        let (registry, cache) = populate(&g, &[("a", 0, 50.0, 3.0, 27.5)]);
        let view = view(&g, &registry, &cache);
        let scores = StochasticLaneChanger::default_tuning()
            .lane_scores(&vid("a"), &view)
            .unwrap();
        // Alone on the ring: both its own lane and the other are open.
        assert_eq!(scores, [27.5, 27.5]);
    }

    #[test]
    fn unsafe_headway_vetoes_lane() {
        let g = RingGeometry::new(2, 200.0).unwrap();
        let (registry, cache) = blocked_scenario(&g);
        let view = view(&g, &registry, &cache);
        let scores = StochasticLaneChanger::default_tuning()
            .lane_scores(&vid("a"), &view)
            .unwrap();
        // Blocker 3 m ahead (< gap_forward = 5) zeroes lane 0; lane 1 is open.
        assert_eq!(scores, [0.0, 30.0]);
    }

    #[test]
    fn veto_overrides_fast_traffic() {
        let g = RingGeometry::new(1, 200.0).unwrap();
        let (registry, cache) = populate(
            &g,
            &[("a", 0, 100.0, 2.0, 30.0), ("racer", 0, 103.0, 90.0, 90.0)],
        );
        let view = view(&g, &registry, &cache);
        let scores = StochasticLaneChanger::default_tuning()
            .lane_scores(&vid("a"), &view)
            .unwrap();
        assert_eq!(scores, [0.0]);
    }

    #[test]
    fn unsafe_footway_vetoes_lane() {
        let g = RingGeometry::new(2, 200.0).unwrap();
        // Candidate lane 1: leader 30 ahead (fine), follower 4 behind
        // (< gap_back = 10).
        let (registry, cache) = populate(
            &g,
            &[
                ("a", 0, 100.0, 2.0, 30.0),
                ("lead", 1, 130.0, 5.0, 30.0),
                ("tail", 1, 96.0, 5.0, 30.0),
            ],
        );
        let view = view(&g, &registry, &cache);
        let scores = StochasticLaneChanger::default_tuning()
            .lane_scores(&vid("a"), &view)
            .unwrap();
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn safe_lane_scores_windowed_mean_speed() {
        let g = RingGeometry::new(2, 200.0).unwrap();
        let (registry, cache) = populate(
            &g,
            &[
                ("a", 0, 100.0, 2.0, 30.0),
                ("near", 1, 120.0, 4.0, 30.0),
                ("mid", 1, 140.0, 8.0, 30.0),
                ("far", 1, 150.0, 100.0, 100.0),
            ],
        );
        let config = LaneChangeConfig {
            forward_distance: 45.0,
            ..LaneChangeConfig::default()
        };
        let view = view(&g, &registry, &cache);
        let scores = StochasticLaneChanger::new(config)
            .unwrap()
            .lane_scores(&vid("a"), &view)
            .unwrap();
        // Window reaches 45 m ahead: near (20) and mid (40) count, far (50)
        // does not.
        assert_eq!(scores[1], (4.0 + 8.0) / 2.0);
    }

    #[test]
    fn empty_window_scores_like_open_lane() {
        let g = RingGeometry::new(2, 200.0).unwrap();
        // Lane 1 is occupied (leader at +80, follower at -100) but nothing
        // falls inside the [-0, +60] sampling window.
        let (registry, cache) = populate(
            &g,
            &[
                ("a", 0, 0.0, 2.0, 30.0),
                ("lead", 1, 80.0, 5.0, 30.0),
                ("tail", 1, 100.0, 5.0, 30.0),
            ],
        );
        let view = view(&g, &registry, &cache);
        let scores = StochasticLaneChanger::default_tuning()
            .lane_scores(&vid("a"), &view)
            .unwrap();
        assert_eq!(scores[1], 30.0);
    }

    #[test]
    fn own_lane_window_includes_self() {
        let g = RingGeometry::new(1, 200.0).unwrap();
        let (registry, cache) = populate(
            &g,
            &[("a", 0, 100.0, 6.0, 30.0), ("peer", 0, 130.0, 12.0, 30.0)],
        );
        let view = view(&g, &registry, &cache);
        let mean = view.mean_window_speed(&vid("a"), 0, 0.0, 60.0).unwrap();
        assert_eq!(mean, 9.0);
    }
}

// ── Commit rule ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod commit {
    use super::*;

    #[test]
    fn switches_when_draw_succeeds() {
        let g = RingGeometry::new(2, 200.0).unwrap();
        let (registry, cache) = blocked_scenario(&g);
        let view = view(&g, &registry, &cache);
        let mut rng = SimRng::new(1);
        // 30 - 0 > speed_threshold and the draw always lands under 1.0.
        let target = changer(1.0).target_lane(&vid("a"), &view, &mut rng);
        assert_eq!(target, Some(1));
    }

    #[test]
    fn stays_when_draw_fails() {
        let g = RingGeometry::new(2, 200.0).unwrap();
        let (registry, cache) = blocked_scenario(&g);
        let view = view(&g, &registry, &cache);
        let mut rng = SimRng::new(1);
        let target = changer(0.0).target_lane(&vid("a"), &view, &mut rng);
        assert_eq!(target, Some(0));
    }

    #[test]
    fn no_change_when_best_is_current() {
        let g = RingGeometry::new(2, 200.0).unwrap();
        // Lane 0 is open for `a`; lane 1 is vetoed.  Best lane == current.
        let (registry, cache) = populate(
            &g,
            &[
                ("a", 0, 100.0, 2.0, 30.0),
                ("x", 1, 101.0, 5.0, 30.0),
                ("y", 1, 102.0, 5.0, 30.0),
            ],
        );
        let view = view(&g, &registry, &cache);
        let mut rng = SimRng::new(1);
        let target = changer(1.0).target_lane(&vid("a"), &view, &mut rng);
        assert_eq!(target, Some(0));
    }

    #[test]
    fn equal_scores_never_change() {
        let g = RingGeometry::new(2, 200.0).unwrap();
        // Alone on the ring in lane 1: both lanes score max_speed.  The
        // argmax lands on lane 0, but a zero advantage never clears the
        // threshold, so no draw is taken and the vehicle stays.
        let (registry, cache) = populate(&g, &[("a", 1, 50.0, 3.0, 30.0)]);
        let view = view(&g, &registry, &cache);
        let mut rng = SimRng::new(1);
        let target = changer(1.0).target_lane(&vid("a"), &view, &mut rng);
        assert_eq!(target, Some(1));
    }

    #[test]
    fn tie_break_is_lowest_lane_index() {
        let g = RingGeometry::new(3, 200.0).unwrap();
        let (registry, cache) = populate(&g, &[("a", 0, 50.0, 3.0, 30.0)]);
        let view = view(&g, &registry, &cache);
        let scores = StochasticLaneChanger::default_tuning()
            .lane_scores(&vid("a"), &view)
            .unwrap();
        assert_eq!(scores, [30.0, 30.0, 30.0]);
        let best = scores
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bl, bs), (l, &s)| {
                if s > bs { (l, s) } else { (bl, bs) }
            })
            .0;
        assert_eq!(best, 0);
    }

    #[test]
    fn decisions_replay_identically_for_a_fixed_seed() {
        let g = RingGeometry::new(2, 200.0).unwrap();
        let (registry, cache) = blocked_scenario(&g);
        let view = view(&g, &registry, &cache);
        let lc = changer(0.5);

        let run = |seed: u64| -> Vec<Option<usize>> {
            let mut rng = SimRng::new(seed);
            (0..50)
                .map(|_| lc.target_lane(&vid("a"), &view, &mut rng))
                .collect()
        };
        assert_eq!(run(42), run(42));
        // And the sequence actually varies with 0.5 probability draws.
        let decisions = run(42);
        assert!(decisions.contains(&Some(0)));
        assert!(decisions.contains(&Some(1)));
    }

    #[test]
    fn vanished_vehicle_abstains() {
        let g = RingGeometry::new(2, 200.0).unwrap();
        let (registry, cache) = populate(&g, &[("a", 0, 50.0, 3.0, 30.0)]);
        let view = view(&g, &registry, &cache);
        let mut rng = SimRng::new(1);
        let target = changer(1.0).target_lane(&vid("ghost"), &view, &mut rng);
        assert_eq!(target, None);
    }
}

// ── Config and baseline controller ────────────────────────────────────────────

#[cfg(test)]
mod config {
    use super::*;

    #[test]
    fn rejects_out_of_range_probability() {
        let config = LaneChangeConfig {
            change_probability: 1.5,
            ..LaneChangeConfig::default()
        };
        assert!(StochasticLaneChanger::new(config).is_err());
    }

    #[test]
    fn rejects_negative_distances() {
        let config = LaneChangeConfig {
            gap_back: -1.0,
            ..LaneChangeConfig::default()
        };
        assert!(config.validate().is_err());
        let config = LaneChangeConfig {
            forward_distance: f64::NAN,
            ..LaneChangeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn defaults_validate() {
        assert!(LaneChangeConfig::default().validate().is_ok());
    }

    #[test]
    fn static_changer_always_stays() {
        let g = RingGeometry::new(2, 200.0).unwrap();
        let (registry, cache) = blocked_scenario(&g);
        let view = view(&g, &registry, &cache);
        let mut rng = SimRng::new(1);
        assert_eq!(
            StaticLaneChanger.target_lane(&vid("a"), &view, &mut rng),
            Some(0)
        );
        assert_eq!(
            StaticLaneChanger.target_lane(&vid("ghost"), &view, &mut rng),
            None
        );
    }
}
