//! Headway-driven transit signal priority with anti-bunching.
//!
//! # Two layers
//!
//! [`tsp_policy`] is the stateless decision function: given an observed
//! headway and a target band it recommends a green extension (late bus), a
//! station hold (early bus — bunching risk), or nothing.
//!
//! [`TspController`] is the stateful gate that turns recommendations into
//! actual grants: per-node cooldown between grants, and a per-cycle
//! extension budget so side streets are never starved.  A node's budget and
//! active extension reset when its signal cycle rolls over.

use glide_core::{NodeId, Tick};

/// Station-hold recommendation for an early (bunching) bus, in seconds.
pub const STATION_HOLD_SECS: u32 = 15;

/// Default maximum green extension per grant, in seconds.
pub const DEFAULT_MAX_EXTEND: u32 = 8;

/// Default maximum early-green advance per grant, in seconds.
pub const DEFAULT_MAX_ADVANCE: u32 = 6;

/// Default cumulative extension budget per node per cycle, in seconds.
pub const DEFAULT_CYCLE_BUDGET: u32 = 10;

// ── Decision ──────────────────────────────────────────────────────────────────

/// Why the policy decided what it decided.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TspReason {
    /// Observed headway above `target + delta`: the bus is running late.
    LateBus,
    /// Observed headway below `target - delta`: bunching risk.
    EarlyBus,
    /// Headway within the tolerance band; no action.
    Normal,
}

impl std::fmt::Display for TspReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TspReason::LateBus => "late bus",
            TspReason::EarlyBus => "early bus",
            TspReason::Normal => "normal headway",
        };
        f.write_str(s)
    }
}

/// Output of one policy evaluation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TspDecision {
    /// Whether signal priority is requested at all.
    pub grant: bool,
    /// Requested green extension in seconds (0 unless `grant`).
    pub extend: u32,
    /// Requested early-green advance in seconds (0 unless `grant`).
    pub advance: u32,
    /// Recommended station hold in seconds (early bus only).
    pub hold: u32,
    pub reason: TspReason,
}

/// Evaluate the anti-bunching policy for one observed headway.
///
/// Both comparisons are strict: a headway exactly at `target ± delta` is
/// treated as normal.
///
/// - `h_now > target + delta` → grant, extend by `max_extend`, advance by
///   `max_advance`.
/// - `h_now < target - delta` → no grant, recommend a fixed
///   [`STATION_HOLD_SECS`] station hold.
/// - otherwise → no action.
pub fn tsp_policy(
    h_now: f64,
    target: f64,
    delta: f64,
    max_extend: u32,
    max_advance: u32,
) -> TspDecision {
    if h_now > target + delta {
        TspDecision {
            grant: true,
            extend: max_extend,
            advance: max_advance,
            hold: 0,
            reason: TspReason::LateBus,
        }
    } else if h_now < target - delta {
        TspDecision {
            grant: false,
            extend: 0,
            advance: 0,
            hold: STATION_HOLD_SECS,
            reason: TspReason::EarlyBus,
        }
    } else {
        TspDecision {
            grant: false,
            extend: 0,
            advance: 0,
            hold: 0,
            reason: TspReason::Normal,
        }
    }
}

// ── Controller ────────────────────────────────────────────────────────────────

/// Per-node grant state.  Idle ↔ Cooling is implicit in `last_grant`:
/// the node is cooling while `now - last_grant < cooldown`.
#[derive(Clone, Debug, Default)]
struct NodeTspState {
    last_grant: Option<Tick>,
    /// Cycle index the budget below belongs to.
    cycle_index: u32,
    /// Extension seconds already granted in the current cycle.
    used: u32,
    /// Green extension currently active (applied to phase lookups).
    extension: u32,
}

/// Stateful TSP gate: one cooldown timer and one per-cycle extension budget
/// per signal node.
#[derive(Clone, Debug)]
pub struct TspController {
    cooldown: u32,
    cycle_budget: u32,
    nodes: Vec<NodeTspState>,
}

impl TspController {
    pub fn new(node_count: usize, cooldown: u32, cycle_budget: u32) -> Self {
        Self {
            cooldown,
            cycle_budget,
            nodes: vec![NodeTspState::default(); node_count],
        }
    }

    /// Inform the controller of `node`'s current cycle index.  When a new
    /// cycle starts the node's budget and active extension reset.  Call once
    /// per node per tick, before any grant attempt.
    pub fn begin_cycle(&mut self, node: NodeId, cycle_index: u32) {
        let state = &mut self.nodes[node.index()];
        if state.cycle_index != cycle_index {
            state.cycle_index = cycle_index;
            state.used = 0;
            state.extension = 0;
        }
    }

    /// `true` if `node` is out of its cooldown window at `now`.
    pub fn can_grant(&self, node: NodeId, now: Tick) -> bool {
        match self.nodes[node.index()].last_grant {
            None => true,
            Some(last) => now.since(last) >= self.cooldown,
        }
    }

    /// Attempt to apply a grant of `requested` extension seconds.
    ///
    /// Returns the seconds actually granted: `min(requested, budget left)`,
    /// or 0 when the node is cooling or its budget is exhausted.  A non-zero
    /// grant restarts the cooldown and accumulates into the cycle budget.
    pub fn try_grant(&mut self, node: NodeId, now: Tick, requested: u32) -> u32 {
        if !self.can_grant(node, now) {
            return 0;
        }
        let state = &mut self.nodes[node.index()];
        let remaining = self.cycle_budget.saturating_sub(state.used);
        let granted = requested.min(remaining);
        if granted == 0 {
            return 0;
        }
        state.used += granted;
        state.extension += granted;
        state.last_grant = Some(now);
        granted
    }

    /// Green extension currently active at `node` (0 when none).
    #[inline]
    pub fn extension(&self, node: NodeId) -> u32 {
        self.nodes[node.index()].extension
    }

    /// Extension seconds consumed from `node`'s budget this cycle.
    #[inline]
    pub fn budget_used(&self, node: NodeId) -> u32 {
        self.nodes[node.index()].used
    }
}
