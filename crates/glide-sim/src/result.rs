//! Serializable run output: per-tick frames, TSP event log, monitor report,
//! and the corridor KPI block.
//!
//! Field names and single-character signal codes form the wire contract
//! consumed by downstream renderers; change them only with a protocol bump.

use glide_core::Tick;
use glide_signal::{Phase, SignalPlan};

use crate::config::Mode;

// ── Frames ────────────────────────────────────────────────────────────────────

/// One vehicle as rendered in a frame.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RenderVehicle {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub is_bus: bool,
    pub stopped: bool,
    /// Dwelling at a bus-stop berth (always `false` for cars).
    pub at_station: bool,
    /// Route label of the bus's line; `None` for cars.
    pub line: Option<String>,
}

/// One signal head as rendered in a frame.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SignalIndication {
    pub node: String,
    pub x: f64,
    /// `G` / `y` / `r`.
    pub state: Phase,
}

/// Snapshot of the corridor at one tick.  Buses always render; cars are
/// subsampled above the volume-dependent cap.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    pub t: u32,
    pub vehicles: Vec<RenderVehicle>,
    pub signals: Vec<SignalIndication>,
}

// ── TSP events ────────────────────────────────────────────────────────────────

/// What a TSP event did.
#[derive(Copy, Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TspAction {
    /// Green extension granted at a node.
    Extend,
    /// Station hold applied to a dwelling bus.
    Hold,
}

/// One entry in the run's TSP event log.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TspEvent {
    pub tick: Tick,
    /// Node name for extensions, stop name for holds.
    pub at: String,
    pub line: String,
    pub action: TspAction,
    /// Seconds of extension or hold applied.
    pub seconds: u32,
}

// ── Monitor report ────────────────────────────────────────────────────────────

/// End-of-run statistics for one bus line.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LineReport {
    pub id: String,
    pub scheduled_headway_sec: u32,
    pub arrivals: u32,
    pub holds: u32,
    pub tsp_extends: u32,
    pub queue_holds: u32,
    pub exited: u32,
    pub signal_delay_s: f64,
    pub queue_hold_s: f64,
    pub dwell_s: f64,
    /// Mean observed stop-arrival headway; `None` below two arrivals.
    pub observed_headway_avg: Option<f64>,
    /// Population standard deviation of the observed headways.
    pub observed_headway_std: Option<f64>,
    /// Share of observed headways within ±tolerance of schedule, in percent.
    pub on_time_pct: Option<f64>,
}

/// End-of-run statistics for one stop.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StopReport {
    pub id: String,
    pub position: f64,
    pub arrivals: u32,
    pub avg_dwell_s: f64,
    pub queue_now: u32,
    pub queue_max: u32,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MonitorReport {
    pub lines: Vec<LineReport>,
    pub stops: Vec<StopReport>,
}

// ── KPIs ──────────────────────────────────────────────────────────────────────

/// Corridor-level key performance indicators for one run.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Kpis {
    pub mode: Mode,
    pub frames: usize,
    /// Exited cars extrapolated to vehicles/hour.
    pub estimated_vph: u32,
    /// Mean gap between consecutive car exits; `None` below two exits.
    pub avg_discharge_headway_s: Option<f64>,
    /// Share of exited cars that never stopped at a signal.
    pub progression_rate: f64,
    pub avg_stops_main: f64,
    pub avg_delay_main: f64,
    pub avg_travel_time_s: f64,
    pub target_vph: u32,
    /// Vehicles (cars and buses) that completed the corridor.
    pub total_arrived: u32,
}

// ── SimulationResult ──────────────────────────────────────────────────────────

/// Static description of the signal plan, for the result header.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PlanSummary {
    pub cycle: u32,
    pub green: u32,
    pub yellow: u32,
    /// Per-node `(name, position, offset)` in corridor order.
    pub nodes: Vec<(String, f64, u32)>,
}

impl PlanSummary {
    pub fn from_plan(plan: &SignalPlan) -> Self {
        Self {
            cycle: plan.cycle,
            green: plan.green,
            yellow: plan.yellow,
            nodes: plan
                .nodes()
                .iter()
                .map(|n| (n.name.clone(), n.position, n.offset))
                .collect(),
        }
    }
}

/// Complete output of one simulation run.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SimulationResult {
    pub run_id: String,
    pub plan: PlanSummary,
    pub frames: Vec<Frame>,
    pub tsp_events: Vec<TspEvent>,
    pub monitor: MonitorReport,
    pub kpis: Kpis,
}
