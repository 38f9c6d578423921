//! Bus stops: berth capacity, occupancy, and dwell bookkeeping.
//!
//! A stop admits a bus only when a berth is free AND the previous arrival is
//! older than the coincidence window — the window models conflict with a
//! just-departing bus even when a berth is nominally open.  Denied buses are
//! held at a standoff short of the stop and retry on later ticks.

use glide_core::{StopId, Tick, VehicleId};

/// Berths per stop.
pub const STOP_BERTHS: usize = 2;

/// Minimum spacing between two admissions at one stop, in seconds.
/// Uncalibrated — inherited verbatim from the deployed tuning.
pub const COINCIDENCE_WINDOW_SECS: u32 = 18;

/// Queue-hold standoff distance before the stop, in distance-units.
/// Uncalibrated — inherited verbatim from the deployed tuning.
pub const PRESTOP_STANDOFF: f64 = 16.0;

// ── Sites and state ───────────────────────────────────────────────────────────

/// Fixed geometry of one stop.
#[derive(Clone, Debug)]
pub struct StopSite {
    pub id: StopId,
    pub name: String,
    pub position: f64,
}

/// Per-run mutable state and statistics for one stop.
#[derive(Clone, Debug, Default)]
pub struct StopState {
    /// Buses currently occupying a berth, in admission order.
    occupants: Vec<VehicleId>,
    /// Scheduled release tick of each occupant (parallel to `occupants`).
    release_at: Vec<Tick>,
    /// Tick of the most recent admission, for coincidence suppression.
    last_arrival: Option<Tick>,

    pub arrivals: u32,
    pub sum_dwell_s: f64,
    /// Occupants beyond berth capacity right now.
    pub queue_now: u32,
    /// Peak of `queue_now` over the run.
    pub queue_max: u32,
}

impl StopState {
    pub fn occupancy(&self) -> usize {
        self.occupants.len()
    }
}

/// Outcome of a bus reaching a stop's capture zone.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Approach {
    /// Admitted: dwell until the given tick.
    Enter { dwell_until: Tick },
    /// Denied: hold at this position (standoff, never behind the current
    /// position).
    Hold { position: f64 },
}

// ── StopRegistry ──────────────────────────────────────────────────────────────

/// All stops of the corridor, with admission/release logic.
#[derive(Clone, Debug)]
pub struct StopRegistry {
    sites: Vec<StopSite>,
    states: Vec<StopState>,
}

impl StopRegistry {
    pub fn new(positions: &[f64]) -> Self {
        let sites = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| StopSite {
                id: StopId(i as u8),
                name: format!("S{}", i + 1),
                position,
            })
            .collect::<Vec<_>>();
        let states = vec![StopState::default(); positions.len()];
        Self { sites, states }
    }

    /// The corridor's two stops, one on each approach to the midpoint.
    pub fn corridor_default() -> Self {
        Self::new(&[-450.0, 450.0])
    }

    pub fn sites(&self) -> &[StopSite] {
        &self.sites
    }

    pub fn state(&self, stop: StopId) -> &StopState {
        &self.states[stop.index()]
    }

    #[inline]
    pub fn position(&self, stop: StopId) -> f64 {
        self.sites[stop.index()].position
    }

    // ── Admission ─────────────────────────────────────────────────────────

    /// Resolve a bus crossing into `stop`'s capture zone this tick.
    ///
    /// Denial (full berths or a too-recent previous arrival) holds the bus
    /// at `max(current_x, stop − standoff)` so its position never regresses.
    pub fn on_approach(
        &mut self,
        stop: StopId,
        bus: VehicleId,
        current_x: f64,
        now: Tick,
        dwell_secs: u32,
    ) -> Approach {
        let position = self.position(stop);
        let state = &mut self.states[stop.index()];

        let coincident = state
            .last_arrival
            .is_some_and(|last| now.since(last) <= COINCIDENCE_WINDOW_SECS);
        if state.occupants.len() >= STOP_BERTHS || coincident {
            return Approach::Hold {
                position: current_x.max(position - PRESTOP_STANDOFF),
            };
        }

        let dwell_until = now.offset(dwell_secs);
        state.occupants.push(bus);
        state.release_at.push(dwell_until);
        state.last_arrival = Some(now);

        state.arrivals += 1;
        state.sum_dwell_s += dwell_secs as f64;
        state.queue_now = state.occupants.len().saturating_sub(STOP_BERTHS) as u32;
        state.queue_max = state.queue_max.max(state.queue_now);

        Approach::Enter { dwell_until }
    }

    /// Release `bus` from `stop` at the end of its dwell.
    ///
    /// Returns `false` if the bus was not an occupant — a state
    /// inconsistency the caller treats as fatal to the run.
    #[must_use]
    pub fn release(&mut self, stop: StopId, bus: VehicleId) -> bool {
        let state = &mut self.states[stop.index()];
        match state.occupants.iter().position(|&o| o == bus) {
            Some(i) => {
                state.occupants.remove(i);
                state.release_at.remove(i);
                state.queue_now = state.occupants.len().saturating_sub(STOP_BERTHS) as u32;
                true
            }
            None => false,
        }
    }

    /// Push back `bus`'s scheduled release (station hold under TSP).
    pub fn extend_release(&mut self, stop: StopId, bus: VehicleId, new_release: Tick) {
        let state = &mut self.states[stop.index()];
        if let Some(i) = state.occupants.iter().position(|&o| o == bus) {
            state.release_at[i] = new_release;
        }
    }
}
