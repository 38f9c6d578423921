//! Per-line bus departure timetables.

use glide_core::RunRng;

use crate::lines::BusLineSpec;

/// Probability of inserting an extra near-duplicate departure after a
/// scheduled one, when bunching simulation is enabled.
pub const BUNCH_PROBABILITY: f64 = 0.25;

/// Build one line's departure times over `[0, steps)`, sorted ascending.
///
/// The first departure waits out a short warm-up (`max(5, min(15,
/// 0.05·steps))`) plus the line's phase offset reduced modulo its headway.
/// Each subsequent departure is `headway ± jitter` later, floored at zero.
///
/// With `simulate_bunching`, each departure has a [`BUNCH_PROBABILITY`]
/// chance of spawning a trailing twin at a gap of `[0.3, 0.55]×headway` —
/// manufactured bunching for the anti-bunching controller to correct.
pub fn build_timetable(
    line: &BusLineSpec,
    steps: u32,
    simulate_bunching: bool,
    rng: &mut RunRng,
) -> Vec<f64> {
    let steps = steps as f64;
    let headway = line.headway_sec.max(1) as f64;
    let warmup = (0.05 * steps).clamp(5.0, 15.0);
    let first = warmup + (line.phase_offset_sec % line.headway_sec.max(1)) as f64;

    let mut times = Vec::new();
    let mut t = first;
    while t < steps {
        times.push(t);

        if simulate_bunching && rng.gen_bool(BUNCH_PROBABILITY) {
            let gap = rng.gen_range(0.3 * headway..0.55 * headway);
            if t + gap < steps {
                times.push(t + gap);
            }
        }

        let jitter = if line.jitter_sec > 0 {
            rng.gen_range(-(line.jitter_sec as f64)..line.jitter_sec as f64)
        } else {
            0.0
        };
        t = (t + headway + jitter).max(0.0);
    }

    times.sort_by(|a, b| a.total_cmp(b));
    times
}
