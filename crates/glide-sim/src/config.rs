//! Run configuration and boundary validation.

use glide_demand::BusLineSpec;

use crate::error::ConfigError;

/// Signal control strategy for the run.
#[derive(Copy, Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Fixed-time signals, all offsets zero.
    Fixed,
    /// Green-wave offsets derived from geometry and cruise speed.
    Glide,
    /// Green-wave plus anti-bunching transit signal priority.
    GlideTsp,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Fixed => "fixed",
            Mode::Glide => "glide",
            Mode::GlideTsp => "glide_tsp",
        }
    }
}

// ── TSP parameters ────────────────────────────────────────────────────────────

/// Request-level TSP limits.  The policy's own per-grant default (8 s) is
/// separate; these bound what the engine will actually apply.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TspParams {
    /// Maximum green extension per grant, seconds (0–60).
    pub max_extend_sec: u32,
    /// Maximum station hold applied per recommendation, seconds (0–120).
    pub max_hold_sec: u32,
    /// Minimum spacing between grants at one node, seconds (0–600).
    pub cooldown_sec: u32,
}

impl Default for TspParams {
    fn default() -> Self {
        Self { max_extend_sec: 10, max_hold_sec: 30, cooldown_sec: 120 }
    }
}

// ── SimulationConfig ──────────────────────────────────────────────────────────

/// Full request for one simulation run.
///
/// Construct with [`SimulationConfig::new`] and adjust fields; call
/// [`validate`][SimulationConfig::validate] (the engine does this too)
/// before running.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SimulationConfig {
    pub mode: Mode,

    /// Ticks to simulate (60–1800; additionally hard-capped at 1200 during
    /// execution).
    #[serde(default = "defaults::steps")]
    pub steps: u32,

    /// Signal cycle length in seconds (30–180).
    #[serde(default = "defaults::cycle")]
    pub cycle: u32,

    /// Target cruise (progression) speed in km/h (20–80).
    #[serde(default = "defaults::v_prog_kmh")]
    pub v_prog_kmh: f64,

    /// Target car volume in vehicles/hour; `None` uses the corridor default.
    #[serde(default)]
    pub cars_per_hour: Option<u32>,

    /// Global stop dwell in seconds (0–120), used when no per-line dwell
    /// applies.
    #[serde(default = "defaults::dwell_sec")]
    pub dwell_sec: u32,

    /// Anti-bunching headway tolerance ±δ in seconds.
    #[serde(default = "defaults::ab_tolerance_sec")]
    pub ab_tolerance_sec: u32,

    /// Inject manufactured bus bunching into the timetables.
    #[serde(default = "defaults::yes")]
    pub simulate_bunching: bool,

    /// Enable the anti-bunching TSP controller (glide_tsp mode only).
    #[serde(default = "defaults::yes")]
    pub anti_bunching: bool,

    #[serde(default)]
    pub tsp: Option<TspParams>,

    /// Bus lines for this run; `None` uses the default six-line corridor.
    #[serde(default)]
    pub bus_lines: Option<Vec<BusLineSpec>>,

    /// PRNG seed for reproducible runs; `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

mod defaults {
    pub fn steps() -> u32 {
        180
    }
    pub fn cycle() -> u32 {
        90
    }
    pub fn v_prog_kmh() -> f64 {
        40.0
    }
    pub fn dwell_sec() -> u32 {
        20
    }
    pub fn ab_tolerance_sec() -> u32 {
        120
    }
    pub fn yes() -> bool {
        true
    }
}

impl SimulationConfig {
    /// A config with every optional field at its documented default.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            steps: defaults::steps(),
            cycle: defaults::cycle(),
            v_prog_kmh: defaults::v_prog_kmh(),
            cars_per_hour: None,
            dwell_sec: defaults::dwell_sec(),
            ab_tolerance_sec: defaults::ab_tolerance_sec(),
            simulate_bunching: true,
            anti_bunching: true,
            tsp: None,
            bus_lines: None,
            seed: None,
        }
    }

    /// Reject any field outside its declared bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("steps", self.steps as f64, 60.0, 1800.0)?;
        check("cycle", self.cycle as f64, 30.0, 180.0)?;
        check("v_prog_kmh", self.v_prog_kmh, 20.0, 80.0)?;
        check("dwell_sec", self.dwell_sec as f64, 0.0, 120.0)?;

        if let Some(tsp) = &self.tsp {
            check("tsp.max_extend_sec", tsp.max_extend_sec as f64, 0.0, 60.0)?;
            check("tsp.max_hold_sec", tsp.max_hold_sec as f64, 0.0, 120.0)?;
            check("tsp.cooldown_sec", tsp.cooldown_sec as f64, 0.0, 600.0)?;
        }

        if let Some(lines) = &self.bus_lines {
            for line in lines {
                if line.headway_sec < 60 {
                    return Err(ConfigError::InvalidLine {
                        line: line.id.clone(),
                        reason: "headway must be at least 60 s",
                    });
                }
                if line.jitter_sec > line.headway_sec {
                    return Err(ConfigError::InvalidLine {
                        line: line.id.clone(),
                        reason: "jitter must not exceed the headway",
                    });
                }
                if line.dwell_sec > 120 {
                    return Err(ConfigError::InvalidLine {
                        line: line.id.clone(),
                        reason: "dwell must be at most 120 s",
                    });
                }
            }
        }
        Ok(())
    }

    /// Requested volume, or the corridor default.
    pub fn target_vph(&self) -> u32 {
        self.cars_per_hour.unwrap_or(glide_demand::DEFAULT_TARGET_VPH)
    }
}

fn check(field: &'static str, got: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if got < min || got > max {
        return Err(ConfigError::OutOfRange { field, got, min, max });
    }
    Ok(())
}
