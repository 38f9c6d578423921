//! Unit tests for signal plans, offsets, and TSP control.

#[cfg(test)]
mod offsets {
    use crate::{compute_green_band, compute_offsets};

    #[test]
    fn reference_corridor() {
        // 300 m then 280 m at 40 km/h on a 90 s cycle.
        assert_eq!(compute_offsets(&[300.0, 280.0], 90, 40.0), vec![0, 27, 52]);
    }

    #[test]
    fn first_is_zero_and_all_within_cycle() {
        for cycle in [30u32, 90, 180] {
            for speed in [20.0, 40.0, 80.0] {
                let offsets = compute_offsets(&[300.0, 300.0, 300.0, 300.0], cycle, speed);
                assert_eq!(offsets[0], 0);
                assert!(offsets.iter().all(|&o| o < cycle), "cycle={cycle} speed={speed}");
            }
        }
    }

    #[test]
    fn empty_distances_single_node() {
        assert_eq!(compute_offsets(&[], 90, 40.0), vec![0]);
    }

    #[test]
    fn green_band_windows() {
        let nodes = vec!["J1".to_string(), "J2".to_string(), "J3".to_string()];
        let offsets = vec![0, 27, 52];
        let band = compute_green_band(&nodes, &offsets, 90, 0.6);
        assert_eq!(band.len(), 3);
        assert_eq!(band[0].start, 0);
        assert_eq!(band[0].end, 54);
        assert_eq!(band[1].start, 27);
        assert_eq!(band[1].end, 81);
        // Window clipped at the cycle boundary.
        assert_eq!(band[2].start, 52);
        assert_eq!(band[2].end, 90);
        assert!(band.iter().all(|w| w.width == 54));
    }
}

#[cfg(test)]
mod plan {
    use glide_core::{NodeId, Tick};

    use crate::{Phase, SignalPlan};

    const POSITIONS: [f64; 5] = [-600.0, -300.0, 0.0, 300.0, 600.0];

    #[test]
    fn fixed_mode_zero_offsets() {
        let plan = SignalPlan::fixed(90, &POSITIONS);
        assert!(plan.nodes().iter().all(|n| n.offset == 0));
        assert_eq!(plan.green, 54);
        assert_eq!(plan.yellow, 6);
    }

    #[test]
    fn glide_mode_offsets_from_geometry() {
        // 300 m spacing at 40 km/h → 27 s per hop.
        let plan = SignalPlan::glide(90, &POSITIONS, 40.0);
        let offsets: Vec<u32> = plan.nodes().iter().map(|n| n.offset).collect();
        assert_eq!(offsets, vec![0, 27, 54, 81, 18]);
        assert_eq!(plan.first_offset(), 0);
    }

    #[test]
    fn phase_boundaries() {
        let plan = SignalPlan::fixed(90, &POSITIONS);
        let j1 = NodeId(0);
        assert_eq!(plan.phase_at(j1, Tick(0)), Phase::Green);
        assert_eq!(plan.phase_at(j1, Tick(53)), Phase::Green);
        assert_eq!(plan.phase_at(j1, Tick(54)), Phase::Yellow);
        assert_eq!(plan.phase_at(j1, Tick(59)), Phase::Yellow);
        assert_eq!(plan.phase_at(j1, Tick(60)), Phase::Red);
        assert_eq!(plan.phase_at(j1, Tick(89)), Phase::Red);
        // Next cycle wraps back to green.
        assert_eq!(plan.phase_at(j1, Tick(90)), Phase::Green);
    }

    #[test]
    fn offset_shifts_phase() {
        let plan = SignalPlan::glide(90, &POSITIONS, 40.0);
        let j2 = NodeId(1); // offset 27
        // τ = (63 + 27) mod 90 = 0 → green.
        assert_eq!(plan.phase_at(j2, Tick(63)), Phase::Green);
        // τ = (33 + 27) mod 90 = 60 → red.
        assert_eq!(plan.phase_at(j2, Tick(33)), Phase::Red);
    }

    #[test]
    fn extension_widens_green() {
        let plan = SignalPlan::fixed(90, &POSITIONS);
        let j1 = NodeId(0);
        assert_eq!(plan.phase_at(j1, Tick(55)), Phase::Yellow);
        assert_eq!(plan.phase_with_extension(j1, Tick(55), 8), Phase::Green);
        assert_eq!(plan.phase_with_extension(j1, Tick(62), 8), Phase::Green);
        assert_eq!(plan.phase_with_extension(j1, Tick(63), 8), Phase::Yellow);
    }
}

#[cfg(test)]
mod policy {
    use crate::tsp::{DEFAULT_MAX_ADVANCE, DEFAULT_MAX_EXTEND, STATION_HOLD_SECS};
    use crate::{TspReason, tsp_policy};

    fn decide(h: f64) -> crate::TspDecision {
        tsp_policy(h, 360.0, 90.0, DEFAULT_MAX_EXTEND, DEFAULT_MAX_ADVANCE)
    }

    #[test]
    fn late_bus_grants_extension() {
        let d = decide(480.0);
        assert!(d.grant);
        assert_eq!(d.extend, 8);
        assert_eq!(d.advance, 6);
        assert_eq!(d.hold, 0);
        assert_eq!(d.reason, TspReason::LateBus);
    }

    #[test]
    fn early_bus_recommends_hold() {
        let d = decide(240.0);
        assert!(!d.grant);
        assert_eq!(d.extend, 0);
        assert_eq!(d.hold, STATION_HOLD_SECS);
        assert_eq!(d.reason, TspReason::EarlyBus);
    }

    #[test]
    fn exact_boundaries_are_normal() {
        // Strict inequalities: h == target and h == target ± delta take no action.
        for h in [360.0, 450.0, 270.0] {
            let d = decide(h);
            assert!(!d.grant, "h={h}");
            assert_eq!(d.hold, 0, "h={h}");
            assert_eq!(d.reason, TspReason::Normal, "h={h}");
        }
    }
}

#[cfg(test)]
mod controller {
    use glide_core::{NodeId, Tick};

    use crate::TspController;

    #[test]
    fn cooldown_blocks_second_grant() {
        let mut ctl = TspController::new(5, 60, 10);
        let j1 = NodeId(0);
        ctl.begin_cycle(j1, 0);

        assert_eq!(ctl.try_grant(j1, Tick(100), 8), 8);
        // Within the cooldown window: nothing granted.
        assert_eq!(ctl.try_grant(j1, Tick(100), 8), 0);
        assert_eq!(ctl.try_grant(j1, Tick(130), 8), 0);
        // After the cooldown the remaining budget (10 − 8 = 2) caps the grant.
        assert_eq!(ctl.try_grant(j1, Tick(160), 8), 2);
    }

    #[test]
    fn cycle_budget_never_exceeded() {
        let mut ctl = TspController::new(5, 0, 10); // no cooldown: isolate the budget
        let j1 = NodeId(0);
        ctl.begin_cycle(j1, 0);

        let mut total = 0;
        for t in 0..20 {
            total += ctl.try_grant(j1, Tick(t), 8);
        }
        assert_eq!(total, 10);
        assert_eq!(ctl.budget_used(j1), 10);
        assert_eq!(ctl.try_grant(j1, Tick(21), 1), 0);
    }

    #[test]
    fn new_cycle_resets_budget_and_extension() {
        let mut ctl = TspController::new(5, 0, 10);
        let j1 = NodeId(0);
        ctl.begin_cycle(j1, 0);
        assert_eq!(ctl.try_grant(j1, Tick(10), 10), 10);
        assert_eq!(ctl.extension(j1), 10);

        ctl.begin_cycle(j1, 1);
        assert_eq!(ctl.extension(j1), 0);
        assert_eq!(ctl.budget_used(j1), 0);
        assert_eq!(ctl.try_grant(j1, Tick(95), 8), 8);
    }

    #[test]
    fn nodes_are_independent() {
        let mut ctl = TspController::new(2, 60, 10);
        ctl.begin_cycle(NodeId(0), 0);
        ctl.begin_cycle(NodeId(1), 0);
        assert_eq!(ctl.try_grant(NodeId(0), Tick(5), 8), 8);
        // Node 1 has its own cooldown and budget.
        assert_eq!(ctl.try_grant(NodeId(1), Tick(5), 8), 8);
    }
}
