//! Green-wave offset derivation (the "OffsetPlanner" collaborator).
//!
//! Pure arithmetic: a platoon cruising at the target speed should meet every
//! downstream signal at the same cycle position it met the first one, so
//! each node's offset is the cumulative travel time from the first node,
//! taken modulo the cycle.

/// Derive per-node green-wave offsets from inter-node distances.
///
/// `distances_m[i]` is the spacing between node `i` and node `i + 1`, so the
/// result has `distances_m.len() + 1` entries.  The first node's offset is
/// always 0; every offset lies in `[0, cycle_s)`.  Cumulative travel times
/// are truncated toward zero, matching the deployed timing tables.
///
/// ```
/// use glide_signal::compute_offsets;
/// assert_eq!(compute_offsets(&[300.0, 280.0], 90, 40.0), vec![0, 27, 52]);
/// ```
pub fn compute_offsets(distances_m: &[f64], cycle_s: u32, v_prog_kmh: f64) -> Vec<u32> {
    debug_assert!(cycle_s > 0 && v_prog_kmh > 0.0);
    let v_ms = v_prog_kmh / 3.6;
    let mut offsets = Vec::with_capacity(distances_m.len() + 1);
    offsets.push(0);

    let mut cumulative = 0.0;
    for &distance in distances_m {
        cumulative += distance / v_ms;
        offsets.push((cumulative % cycle_s as f64) as u32);
    }
    offsets
}

// ── Green band ────────────────────────────────────────────────────────────────

/// The green window of one node within its cycle, for band visualisation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GreenBandWindow {
    pub node: String,
    pub start: u32,
    pub end: u32,
    pub width: u32,
}

/// Compute each node's green window `[start, end)` inside the cycle.
///
/// `main_split` is the share of the cycle given to the main street
/// (window width = `⌊main_split · cycle⌋`).  Windows are clipped at the
/// cycle boundary rather than wrapped.
pub fn compute_green_band(
    node_ids: &[String],
    offsets: &[u32],
    cycle_s: u32,
    main_split: f64,
) -> Vec<GreenBandWindow> {
    let width = (main_split * cycle_s as f64) as u32;
    node_ids
        .iter()
        .zip(offsets)
        .map(|(node, &offset)| GreenBandWindow {
            node: node.clone(),
            start: offset,
            end: (offset + width).min(cycle_s),
            width,
        })
        .collect()
}
