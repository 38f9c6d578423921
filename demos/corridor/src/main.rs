//! corridor — side-by-side comparison of the three signal control modes.
//!
//! Runs the same seeded demand through fixed-time, green-wave, and
//! green-wave + TSP control, prints the corridor KPIs for each, and dumps
//! the full TSP-mode result as JSON.
//!
//! Run with:
//!   cargo run -p corridor --release

use std::time::Instant;

use anyhow::Result;

use glide_signal::compute_green_band;
use glide_sim::{
    CorridorEngine, Mode, RunObserver, SimulationConfig, SimulationResult, TspEvent,
};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:    u64 = 42;
const STEPS:   u32 = 600;
const CYCLE:   u32 = 90;
const V_KMH:   f64 = 40.0;
const CAR_VPH: u32 = 1700;

// ── Observer: live TSP event trace ────────────────────────────────────────────

#[derive(Default)]
struct TspTrace {
    events: usize,
}

impl RunObserver for TspTrace {
    fn on_tsp_event(&mut self, event: &TspEvent) {
        self.events += 1;
        println!(
            "  [{}] {:?} {}s at {} (line {})",
            event.tick, event.action, event.seconds, event.at, event.line
        );
    }
}

// ── Runs ──────────────────────────────────────────────────────────────────────

fn config(mode: Mode) -> SimulationConfig {
    let mut cfg = SimulationConfig::new(mode);
    cfg.seed = Some(SEED);
    cfg.steps = STEPS;
    cfg.cycle = CYCLE;
    cfg.v_prog_kmh = V_KMH;
    cfg.cars_per_hour = Some(CAR_VPH);
    cfg
}

fn print_kpis(result: &SimulationResult) {
    let k = &result.kpis;
    println!("run {}  mode={}", result.run_id, k.mode.as_str());
    println!("  estimated volume:   {} vph (target {})", k.estimated_vph, k.target_vph);
    println!(
        "  progression rate:   {:.1}% zero-stop",
        100.0 * k.progression_rate
    );
    println!("  avg stops/car:      {:.2}", k.avg_stops_main);
    println!("  avg signal delay:   {:.1} s", k.avg_delay_main);
    println!("  avg travel time:    {:.1} s", k.avg_travel_time_s);
    if let Some(h) = k.avg_discharge_headway_s {
        println!("  discharge headway:  {h:.2} s");
    }
    println!("  vehicles arrived:   {}", k.total_arrived);
    for line in &result.monitor.lines {
        if let Some(avg) = line.observed_headway_avg {
            println!(
                "    line {:>4}: headway {:.0}s observed vs {}s scheduled, \
                 {} extends, {} holds, on-time {:.0}%",
                line.id,
                avg,
                line.scheduled_headway_sec,
                line.tsp_extends,
                line.holds,
                line.on_time_pct.unwrap_or(0.0),
            );
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== corridor — signalized corridor microsimulation ===");
    println!("Steps: {STEPS}  |  Cycle: {CYCLE}s  |  {V_KMH} km/h  |  {CAR_VPH} vph  |  Seed: {SEED}");
    println!();

    let engine = CorridorEngine::new();

    // 1. Fixed-time baseline.
    println!("--- fixed ---");
    let start = Instant::now();
    let fixed = engine.run(&config(Mode::Fixed))?;
    print_kpis(&fixed);
    println!("  ({:.1} ms)", start.elapsed().as_secs_f64() * 1e3);
    println!();

    // 2. Green-wave progression, with the derived band.
    println!("--- glide ---");
    let glide = engine.run(&config(Mode::Glide))?;
    print_kpis(&glide);
    let names: Vec<String> = glide.plan.nodes.iter().map(|(n, _, _)| n.clone()).collect();
    let offsets: Vec<u32> = glide.plan.nodes.iter().map(|(_, _, o)| *o).collect();
    println!("  green band (cycle {CYCLE}s):");
    for w in compute_green_band(&names, &offsets, CYCLE, 0.6) {
        println!("    {}: green [{:>2}, {:>2})", w.node, w.start, w.end);
    }
    println!();

    // 3. Green wave + anti-bunching TSP, with a live event trace.
    println!("--- glide_tsp ---");
    let mut trace = TspTrace::default();
    let tsp = engine.run_with_observer(&config(Mode::GlideTsp), &mut trace)?;
    print_kpis(&tsp);
    println!("  {} TSP events total", trace.events);
    println!();

    // 4. Full JSON payload, as a frontend would receive it.
    let payload = serde_json::to_string(&tsp)?;
    println!(
        "glide_tsp result: {} frames, {} bytes of JSON",
        tsp.frames.len(),
        payload.len()
    );

    Ok(())
}
