//! Fixed-cycle signal plans: per-node offsets and phase-at-tick lookup.
//!
//! # Phase model
//!
//! Every node shares one cycle length `C`, one green width `G` and one
//! yellow width `Y`; only the offset `τ₀` differs per node.  The phase at
//! tick `t` is a pure function of the node's cycle position:
//!
//! ```text
//! τ = (t + τ₀) mod C
//! τ < G      → Green
//! τ < G + Y  → Yellow
//! else       → Red
//! ```
//!
//! The invariant `G + Y ≤ C` holds for every valid cycle length (green is
//! 60% of the cycle, yellow a fixed 6 s, and cycles are at least 30 s).

use glide_core::{NodeId, Tick};

use crate::offsets::compute_offsets;

/// Yellow (change interval) width in seconds, identical at every node.
pub const YELLOW_SECS: u32 = 6;

/// Main-street share of the cycle given to green.
pub const MAIN_SPLIT: f64 = 0.6;

// ── Phase ─────────────────────────────────────────────────────────────────────

/// Signal indication for the corridor's through movement.
///
/// Wire codes match the frame payload: `G`, `y`, `r`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    #[cfg_attr(feature = "serde", serde(rename = "G"))]
    Green,
    #[cfg_attr(feature = "serde", serde(rename = "y"))]
    Yellow,
    #[cfg_attr(feature = "serde", serde(rename = "r"))]
    Red,
}

impl Phase {
    #[inline]
    pub fn is_green(self) -> bool {
        matches!(self, Phase::Green)
    }

    /// Single-character wire code (`G` / `y` / `r`).
    pub fn code(self) -> char {
        match self {
            Phase::Green => 'G',
            Phase::Yellow => 'y',
            Phase::Red => 'r',
        }
    }
}

// ── SignalNode ────────────────────────────────────────────────────────────────

/// One signalized intersection on the corridor.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalNode {
    pub id: NodeId,
    /// Display name, `J1`, `J2`, … in corridor order.
    pub name: String,
    /// Stop-line position along the corridor axis.
    pub position: f64,
    /// Green-wave offset `τ₀` in seconds.
    pub offset: u32,
}

// ── SignalPlan ────────────────────────────────────────────────────────────────

/// The full corridor signal timing: shared cycle/green/yellow widths plus
/// one offset per node.  Construct via [`SignalPlan::fixed`] or
/// [`SignalPlan::glide`]; phase lookups are pure and O(1).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalPlan {
    /// Cycle length `C` in seconds.
    pub cycle: u32,
    /// Green width `G = round(0.6 · C)` in seconds.
    pub green: u32,
    /// Yellow width `Y` in seconds.
    pub yellow: u32,
    nodes: Vec<SignalNode>,
}

impl SignalPlan {
    /// Fixed-time plan: every node's offset is 0 regardless of geometry.
    pub fn fixed(cycle: u32, positions: &[f64]) -> Self {
        let offsets = vec![0; positions.len()];
        Self::with_offsets(cycle, positions, offsets)
    }

    /// Green-wave plan: offsets derived from inter-node distances and the
    /// target cruise speed (see [`compute_offsets`]).
    pub fn glide(cycle: u32, positions: &[f64], v_prog_kmh: f64) -> Self {
        let distances: Vec<f64> = positions.windows(2).map(|w| w[1] - w[0]).collect();
        let offsets = compute_offsets(&distances, cycle, v_prog_kmh);
        Self::with_offsets(cycle, positions, offsets)
    }

    fn with_offsets(cycle: u32, positions: &[f64], offsets: Vec<u32>) -> Self {
        debug_assert_eq!(positions.len(), offsets.len());
        let green = (MAIN_SPLIT * cycle as f64).round() as u32;
        debug_assert!(green + YELLOW_SECS <= cycle, "G+Y must fit in the cycle");
        let nodes = positions
            .iter()
            .zip(offsets)
            .enumerate()
            .map(|(i, (&position, offset))| SignalNode {
                id: NodeId(i as u8),
                name: format!("J{}", i + 1),
                position,
                offset,
            })
            .collect();
        Self { cycle, green, yellow: YELLOW_SECS, nodes }
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    /// Phase of `node` at `tick` under the base timing.
    #[inline]
    pub fn phase_at(&self, node: NodeId, tick: Tick) -> Phase {
        self.phase_with_extension(node, tick, 0)
    }

    /// Phase of `node` at `tick` with `ext` seconds of TSP green extension
    /// active in the current cycle.  The extension widens green; yellow
    /// shifts after it, both capped at the cycle length.
    pub fn phase_with_extension(&self, node: NodeId, tick: Tick, ext: u32) -> Phase {
        let n = &self.nodes[node.index()];
        let tau = tick.cycle_pos(n.offset, self.cycle);
        let green_end = (self.green + ext).min(self.cycle);
        let yellow_end = (green_end + self.yellow).min(self.cycle);
        if tau < green_end {
            Phase::Green
        } else if tau < yellow_end {
            Phase::Yellow
        } else {
            Phase::Red
        }
    }

    /// Cycle index of `node` at `tick` (used for per-cycle TSP budget resets).
    #[inline]
    pub fn cycle_index(&self, node: NodeId, tick: Tick) -> u32 {
        tick.cycle_index(self.nodes[node.index()].offset, self.cycle)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn nodes(&self) -> &[SignalNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Stop-line position of `node`.
    #[inline]
    pub fn position(&self, node: NodeId) -> f64 {
        self.nodes[node.index()].position
    }

    /// Offset of the first (most upstream) node — demand injection aligns
    /// its green windows to this.
    pub fn first_offset(&self) -> u32 {
        self.nodes.first().map(|n| n.offset).unwrap_or(0)
    }
}
