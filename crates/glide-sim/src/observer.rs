//! Run observation hooks.
//!
//! An observer receives callbacks as the engine steps; all methods default
//! to no-ops so implementors override only what they need.  Observers see
//! borrowed state and must not retain it.

use glide_core::Tick;

use crate::result::{Frame, TspEvent};
use crate::vehicle::Vehicle;

/// Callbacks fired during a run.
pub trait RunObserver {
    /// A vehicle entered the corridor this tick.
    fn on_spawn(&mut self, _tick: Tick, _vehicle: &Vehicle) {}

    /// A vehicle crossed the exit boundary and was folded out.
    fn on_exit(&mut self, _tick: Tick, _vehicle: &Vehicle) {}

    /// A TSP extension or hold was applied.
    fn on_tsp_event(&mut self, _event: &TspEvent) {}

    /// The tick finished; `frame` is the snapshot just recorded.
    fn on_tick_end(&mut self, _tick: Tick, _frame: &Frame) {}
}

/// The default observer: ignores everything.
#[derive(Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}
