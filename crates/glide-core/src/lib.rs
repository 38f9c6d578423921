//! `glide-core` — foundational types for the glide corridor simulator.
//!
//! This crate is a dependency of every other `glide-*` crate.  It
//! intentionally has no `glide-*` dependencies and minimal external ones
//! (only `rand` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                         |
//! |-----------|--------------------------------------------------|
//! | [`ids`]   | `NodeId`, `StopId`, `LineId`, `VehicleId`        |
//! | [`time`]  | `Tick`                                           |
//! | [`rng`]   | `RunRng` (per-run seedable PRNG)                 |
//! | [`error`] | `GlideError`, `GlideResult`                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{GlideError, GlideResult};
pub use ids::{LineId, NodeId, StopId, VehicleId};
pub use rng::RunRng;
pub use time::Tick;
