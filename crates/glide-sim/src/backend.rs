//! Pluggable simulation backends.
//!
//! The built-in engine is one backend; an external microsimulator (when its
//! bindings are installed) would be another.  Hosts select a backend per
//! request and fall back to the built-in one when the external backend
//! reports itself unavailable.

use crate::config::SimulationConfig;
use crate::engine::CorridorEngine;
use crate::error::{SimError, SimResult};
use crate::result::SimulationResult;

/// A simulator capable of executing one corridor run.
pub trait CorridorBackend {
    /// Human-readable backend name, surfaced in host logs.
    fn name(&self) -> &'static str;

    /// Execute one run to completion.
    fn run_corridor(&self, config: &SimulationConfig) -> SimResult<SimulationResult>;
}

impl CorridorBackend for CorridorEngine {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn run_corridor(&self, config: &SimulationConfig) -> SimResult<SimulationResult> {
        self.run(config)
    }
}

/// Placeholder for an external microsimulator backend.  Always reports
/// unavailable; hosts use this to exercise their fallback path without the
/// external tool installed.
#[derive(Default)]
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl CorridorBackend for UnavailableBackend {
    fn name(&self) -> &'static str {
        "external"
    }

    fn run_corridor(&self, _config: &SimulationConfig) -> SimResult<SimulationResult> {
        let reason = if self.reason.is_empty() {
            "not installed".to_string()
        } else {
            self.reason.clone()
        };
        Err(SimError::BackendUnavailable(reason))
    }
}
