//! `glide-demand` — stochastic demand for the corridor simulator.
//!
//! Both generators run once per simulation run, before stepping begins, and
//! draw from a caller-supplied [`RunRng`] stream so concurrent runs stay
//! isolated and seeded runs stay reproducible.
//!
//! | Module    | Contents                                             |
//! |-----------|------------------------------------------------------|
//! | [`lines`] | `BusLineSpec` and the default six-line corridor      |
//! | [`cars`]  | Green-window car departure timeline (`GapSampler`)  |
//! | [`buses`] | Per-line bus departure timetable with bunching      |
//!
//! [`RunRng`]: glide_core::RunRng

pub mod buses;
pub mod cars;
pub mod lines;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use buses::build_timetable;
pub use cars::{DEFAULT_TARGET_VPH, GapSampler, generate_departures};
pub use lines::{BusLineSpec, default_corridor_lines};
