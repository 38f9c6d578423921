//! Unit tests for demand generation.

#[cfg(test)]
mod gaps {
    use glide_core::RunRng;

    use crate::GapSampler;
    use crate::cars::{GAP_CEIL_SECS, GAP_FLOOR_SECS};

    #[test]
    fn samples_always_clamped() {
        let mut rng = RunRng::new(7);
        for vph in [400, 1000, 1700, 1900, 2200] {
            let sampler = GapSampler::new(vph, 90, 54);
            for _ in 0..2000 {
                let g = sampler.sample(&mut rng);
                assert!(
                    (GAP_FLOOR_SECS..=GAP_CEIL_SECS).contains(&g),
                    "vph={vph} gap={g}"
                );
            }
        }
    }

    #[test]
    fn heavier_volume_means_tighter_gaps() {
        let mut rng = RunRng::new(11);
        let light = GapSampler::new(600, 90, 54);
        let heavy = GapSampler::new(2000, 90, 54);
        let mean = |s: &GapSampler, rng: &mut RunRng| -> f64 {
            (0..4000).map(|_| s.sample(rng)).sum::<f64>() / 4000.0
        };
        assert!(mean(&light, &mut rng) > mean(&heavy, &mut rng));
    }
}

#[cfg(test)]
mod cars {
    use glide_core::RunRng;

    use crate::generate_departures;

    #[test]
    fn sorted_and_within_run() {
        let mut rng = RunRng::new(42);
        let departures = generate_departures(1700, 90, 54, 0, 180, &mut rng);
        assert!(!departures.is_empty());
        assert!(departures.windows(2).all(|w| w[0] <= w[1]));
        assert!(departures.iter().all(|&t| (0.0..181.0).contains(&t)));
    }

    #[test]
    fn departures_fall_in_green_windows() {
        let mut rng = RunRng::new(42);
        // No placement jitter margin beyond ±0.1 s around the window.
        let departures = generate_departures(1000, 90, 54, 0, 360, &mut rng);
        for &t in &departures {
            let tau = t.rem_euclid(90.0);
            assert!(tau < 54.0 + 0.1, "departure at τ={tau} is outside green");
        }
    }

    #[test]
    fn saturated_volume_injects_platoons() {
        let mut rng_hi = RunRng::new(3);
        let mut rng_lo = RunRng::new(3);
        let heavy = generate_departures(1900, 90, 54, 0, 360, &mut rng_hi);
        let light = generate_departures(1000, 90, 54, 0, 360, &mut rng_lo);
        assert!(heavy.len() > light.len());
        // Platoon cars arrive within the first second of some green window.
        let early = heavy
            .iter()
            .filter(|t| t.rem_euclid(90.0) < 1.0)
            .count();
        assert!(early >= 3, "expected platoon cars near window open");
    }

    #[test]
    fn deterministic_for_same_seed() {
        let a = generate_departures(1700, 90, 54, 0, 180, &mut RunRng::new(5));
        let b = generate_departures(1700, 90, 54, 0, 180, &mut RunRng::new(5));
        assert_eq!(a, b);
    }
}

#[cfg(test)]
mod buses {
    use glide_core::RunRng;

    use crate::lines::BusLineSpec;
    use crate::{build_timetable, default_corridor_lines};

    fn line(headway: u32, jitter: u32, phase: u32) -> BusLineSpec {
        BusLineSpec {
            id: "T1".to_string(),
            headway_sec: headway,
            jitter_sec: jitter,
            dwell_sec: 20,
            phase_offset_sec: phase,
        }
    }

    #[test]
    fn first_departure_respects_warmup_and_phase() {
        let mut rng = RunRng::new(1);
        // steps=180 → warm-up 9; phase 60 mod 240 = 60 → first at 69.
        let times = build_timetable(&line(240, 0, 60), 180, false, &mut rng);
        assert_eq!(times[0], 9.0 + 60.0);
    }

    #[test]
    fn sorted_and_bounded() {
        let mut rng = RunRng::new(2);
        for l in default_corridor_lines() {
            let times = build_timetable(&l, 1200, true, &mut rng);
            assert!(times.windows(2).all(|w| w[0] <= w[1]));
            assert!(times.iter().all(|&t| (0.0..1200.0).contains(&t)));
        }
    }

    #[test]
    fn bunching_inserts_extra_departures() {
        // Without jitter the base schedule is fixed, so any surplus over the
        // bunching-free run is inserted twins.
        let base = build_timetable(&line(30, 0, 0), 1200, false, &mut RunRng::new(9));
        let bunched = build_timetable(&line(30, 0, 0), 1200, true, &mut RunRng::new(9));
        assert!(bunched.len() > base.len());
    }

    #[test]
    fn default_preset_has_six_lines() {
        let lines = default_corridor_lines();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0].id, "R61");
        assert!(lines.iter().all(|l| l.headway_sec >= 60));
    }
}
