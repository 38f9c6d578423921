//! Streaming per-line/per-stop statistics and end-of-run KPI aggregation.
//!
//! Counters accumulate tick by tick; the heavier derived figures (observed
//! headway mean/deviation, on-time percentage, discharge headway) are
//! computed once at run end, consuming the recorded arrival ticks.

use glide_core::{LineId, Tick};
use glide_demand::BusLineSpec;

use crate::config::Mode;
use crate::result::{Kpis, LineReport, MonitorReport, StopReport};
use crate::stops::StopRegistry;

// ── Per-line accumulation ─────────────────────────────────────────────────────

/// Live per-line counters, folded into a [`LineReport`] at run end.
#[derive(Clone, Debug)]
pub struct LineStats {
    pub id: String,
    pub scheduled_headway_sec: u32,
    pub arrivals: u32,
    /// TSP station-hold recommendations issued for this line.
    pub holds: u32,
    /// TSP green extensions actually granted for this line.
    pub tsp_extends: u32,
    /// Berth-denied queue holds at stops.
    pub queue_holds: u32,
    /// Stop-arrival ticks, consumed at run end for headway statistics.
    arrival_ticks: Vec<Tick>,
    /// Buses of this line that completed the corridor.
    pub exited: u32,
    pub signal_delay_s: f64,
    pub queue_hold_s: f64,
    pub dwell_s: f64,
}

impl LineStats {
    fn new(spec: &BusLineSpec) -> Self {
        Self {
            id: spec.id.clone(),
            scheduled_headway_sec: spec.headway_sec,
            arrivals: 0,
            holds: 0,
            tsp_extends: 0,
            queue_holds: 0,
            arrival_ticks: Vec::new(),
            exited: 0,
            signal_delay_s: 0.0,
            queue_hold_s: 0.0,
            dwell_s: 0.0,
        }
    }

    /// Record a stop arrival; returns the newly observed headway (gap to the
    /// line's previous arrival) once two arrivals exist.
    pub fn record_arrival(&mut self, tick: Tick) -> Option<f64> {
        self.arrivals += 1;
        self.arrival_ticks.push(tick);
        match self.arrival_ticks.len() {
            0 | 1 => None,
            n => Some((self.arrival_ticks[n - 1] - self.arrival_ticks[n - 2]) as f64),
        }
    }

    fn finalize(&self, tolerance_sec: u32) -> LineReport {
        let gaps: Vec<f64> = self
            .arrival_ticks
            .windows(2)
            .map(|w| (w[1] - w[0]) as f64)
            .collect();

        let (avg, std, on_time_pct) = if gaps.is_empty() {
            (None, None, None)
        } else {
            let n = gaps.len() as f64;
            let mean = gaps.iter().sum::<f64>() / n;
            let var = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / n;
            let target = self.scheduled_headway_sec as f64;
            let tol = tolerance_sec as f64;
            let on_time = gaps.iter().filter(|g| (*g - target).abs() <= tol).count();
            (
                Some(mean),
                Some(var.sqrt()),
                Some(100.0 * on_time as f64 / n),
            )
        };

        LineReport {
            id: self.id.clone(),
            scheduled_headway_sec: self.scheduled_headway_sec,
            arrivals: self.arrivals,
            holds: self.holds,
            tsp_extends: self.tsp_extends,
            queue_holds: self.queue_holds,
            exited: self.exited,
            signal_delay_s: self.signal_delay_s,
            queue_hold_s: self.queue_hold_s,
            dwell_s: self.dwell_s,
            observed_headway_avg: avg,
            observed_headway_std: std,
            on_time_pct,
        }
    }
}

// ── Car totals ────────────────────────────────────────────────────────────────

/// Corridor-level car accumulation for the KPI block.
#[derive(Clone, Debug, Default)]
pub struct CarTotals {
    pub spawned: u32,
    pub exited: u32,
    pub zero_stop: u32,
    pub delay_sum_s: f64,
    pub stops_sum: u32,
    pub travel_sum_s: f64,
    /// Corridor-exit ticks, for the discharge-headway figure.
    pub exit_ticks: Vec<u32>,
}

impl CarTotals {
    pub fn fold_exit(&mut self, exit_tick: u32, stops: u32, delay_s: f64, travel_s: f64) {
        self.exited += 1;
        if stops == 0 {
            self.zero_stop += 1;
        }
        self.stops_sum += stops;
        self.delay_sum_s += delay_s;
        self.travel_sum_s += travel_s;
        self.exit_ticks.push(exit_tick);
    }

    /// Mean gap between consecutive exits; `None` below two exits.
    pub fn discharge_headway(&self) -> Option<f64> {
        if self.exit_ticks.len() < 2 {
            return None;
        }
        let gaps: Vec<f64> = self
            .exit_ticks
            .windows(2)
            .map(|w| (w[1] - w[0]) as f64)
            .collect();
        Some(gaps.iter().sum::<f64>() / gaps.len() as f64)
    }
}

// ── Monitor ───────────────────────────────────────────────────────────────────

/// All run-scoped statistics: one [`LineStats`] per configured line plus the
/// corridor-level [`CarTotals`].
#[derive(Clone, Debug)]
pub struct Monitor {
    pub lines: Vec<LineStats>,
    pub cars: CarTotals,
}

impl Monitor {
    pub fn new(lines: &[BusLineSpec]) -> Self {
        Self {
            lines: lines.iter().map(LineStats::new).collect(),
            cars: CarTotals::default(),
        }
    }

    pub fn line_mut(&mut self, line: LineId) -> &mut LineStats {
        &mut self.lines[line.index()]
    }

    /// Fold everything into the serializable monitor report.
    pub fn finalize(&self, tolerance_sec: u32, stops: &StopRegistry) -> MonitorReport {
        let lines = self.lines.iter().map(|l| l.finalize(tolerance_sec)).collect();
        let stops = stops
            .sites()
            .iter()
            .map(|site| {
                let s = stops.state(site.id);
                StopReport {
                    id: site.name.clone(),
                    position: site.position,
                    arrivals: s.arrivals,
                    avg_dwell_s: s.sum_dwell_s / s.arrivals.max(1) as f64,
                    queue_now: s.queue_now,
                    queue_max: s.queue_max,
                }
            })
            .collect();
        MonitorReport { lines, stops }
    }

    /// Corridor KPIs.  Per-car means are guarded by flooring the exited-car
    /// denominator at 1.
    pub fn kpis(&self, mode: Mode, steps: u32, target_vph: u32, frames: usize, total_arrived: u32) -> Kpis {
        let exited = self.cars.exited;
        let denom = exited.max(1) as f64;
        Kpis {
            mode,
            frames,
            estimated_vph: (exited as f64 * 3600.0 / steps.max(1) as f64).round() as u32,
            avg_discharge_headway_s: self.cars.discharge_headway(),
            progression_rate: self.cars.zero_stop as f64 / denom,
            avg_stops_main: self.cars.stops_sum as f64 / denom,
            avg_delay_main: self.cars.delay_sum_s / denom,
            avg_travel_time_s: self.cars.travel_sum_s / denom,
            target_vph,
            total_arrived,
        }
    }
}
