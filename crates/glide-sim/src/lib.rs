//! `glide-sim` — the corridor microsimulation engine.
//!
//! Ties the other `glide-*` crates into a runnable simulation: validate a
//! [`SimulationConfig`], execute the tick loop, and return a
//! [`SimulationResult`] with frames, a TSP event log, per-line monitor
//! statistics and corridor KPIs.
//!
//! # What lives here
//!
//! | Module       | Contents                                            |
//! |--------------|-----------------------------------------------------|
//! | [`config`]   | `Mode`, `TspParams`, `SimulationConfig` + validation |
//! | [`vehicle`]  | `Vehicle` with car/bus payloads                     |
//! | [`stops`]    | `StopRegistry` (berths, coincidence, queue holds)   |
//! | [`stepper`]  | Per-vehicle kinematics for one tick                 |
//! | [`engine`]   | `CorridorEngine` and the run loop                   |
//! | [`monitor`]  | Streaming statistics and KPI aggregation            |
//! | [`result`]   | Serializable run output                             |
//! | [`observer`] | `RunObserver` callbacks                             |
//! | [`backend`]  | `CorridorBackend` trait and the unavailable stub    |
//! | [`error`]    | `ConfigError`, `SimError`, `SimResult`              |
//!
//! # Quick start
//!
//! ```
//! use glide_sim::{CorridorEngine, Mode, SimulationConfig};
//!
//! let mut config = SimulationConfig::new(Mode::Glide);
//! config.seed = Some(42);
//! let result = CorridorEngine::new().run(&config)?;
//! assert_eq!(result.frames.len(), config.steps as usize);
//! # Ok::<(), glide_sim::SimError>(())
//! ```

pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod monitor;
pub mod observer;
pub mod result;
pub mod stepper;
pub mod stops;
pub mod vehicle;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use backend::{CorridorBackend, UnavailableBackend};
pub use config::{Mode, SimulationConfig, TspParams};
pub use engine::{CorridorEngine, HARD_STEP_CAP, STOPLINE_POSITIONS};
pub use error::{ConfigError, SimError, SimResult};
pub use observer::{NoopObserver, RunObserver};
pub use result::{
    Frame, Kpis, LineReport, MonitorReport, PlanSummary, RenderVehicle, SignalIndication,
    SimulationResult, StopReport, TspAction, TspEvent,
};
pub use stops::{StopRegistry, STOP_BERTHS};
pub use vehicle::{Vehicle, VehicleKind, X_MAX, X_MIN};
