//! Engine error types.
//!
//! `ConfigError` is rejected before a run starts; nothing at the boundary is
//! silently clamped (the demand generator's internal parameter clamps are
//! part of its algorithm, not validation).  `SimError::Runtime` is fatal to
//! its run only — the process hosting the engine keeps serving.

use glide_core::Tick;
use thiserror::Error;

/// A request parameter outside its declared bound.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} = {got} outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        got: f64,
        min: f64,
        max: f64,
    },

    #[error("bus line {line}: {reason}")]
    InvalidLine { line: String, reason: &'static str },
}

/// Top-level engine error.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Internal state inconsistency during stepping.  Not expected in normal
    /// operation; carries enough context to reproduce the failing run.
    #[error("run {run_id} failed at {tick}: {message}")]
    Runtime {
        run_id: String,
        tick: Tick,
        message: String,
    },

    /// The optional external simulator backend cannot be used.  Degrades
    /// only that backend; the built-in engine is unaffected.
    #[error("external backend unavailable: {0}")]
    BackendUnavailable(String),
}

pub type SimResult<T> = Result<T, SimError>;
