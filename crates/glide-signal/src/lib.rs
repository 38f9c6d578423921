//! `glide-signal` — signal plans and priority control for the corridor.
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`plan`]    | `Phase`, `SignalNode`, `SignalPlan` (phase-at-tick lookup) |
//! | [`offsets`] | Green-wave offset derivation and green-band windows        |
//! | [`tsp`]     | Headway-driven TSP policy and per-node grant controller    |
//!
//! Everything in this crate is pure arithmetic over in-memory state; there
//! is no I/O and no clock other than the caller-supplied [`Tick`].
//!
//! [`Tick`]: glide_core::Tick

pub mod offsets;
pub mod plan;
pub mod tsp;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use offsets::{GreenBandWindow, compute_green_band, compute_offsets};
pub use plan::{Phase, SignalNode, SignalPlan};
pub use tsp::{
    DEFAULT_CYCLE_BUDGET, DEFAULT_MAX_ADVANCE, DEFAULT_MAX_EXTEND, STATION_HOLD_SECS,
    TspController, TspDecision, TspReason, tsp_policy,
};
