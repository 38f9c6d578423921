//! Bus line specifications.

/// Immutable per-run description of one bus line.
///
/// Drives the timetable builder only; the engine reads back `headway_sec`
/// (TSP target), `dwell_sec` (per-line stop dwell), and `id` (labels).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusLineSpec {
    /// Route label, e.g. `R61` or `235`.
    pub id: String,
    /// Target headway between departures, in seconds.
    pub headway_sec: u32,
    /// Uniform departure jitter amplitude, in seconds.
    #[cfg_attr(feature = "serde", serde(default = "default_jitter"))]
    pub jitter_sec: u32,
    /// This line's average stop dwell, in seconds.
    #[cfg_attr(feature = "serde", serde(default = "default_dwell"))]
    pub dwell_sec: u32,
    /// Initial phase shift so multiple lines don't hit stops in lockstep.
    #[cfg_attr(feature = "serde", serde(default))]
    pub phase_offset_sec: u32,
}

#[cfg(feature = "serde")]
fn default_jitter() -> u32 {
    40
}

#[cfg(feature = "serde")]
fn default_dwell() -> u32 {
    20
}

/// The default six-line corridor preset, used when a request supplies no
/// explicit lines.  Headways and phase offsets are staggered so arrivals
/// interleave rather than platoon from the start.
pub fn default_corridor_lines() -> Vec<BusLineSpec> {
    let spec = |id: &str, headway, jitter, dwell, phase| BusLineSpec {
        id: id.to_string(),
        headway_sec: headway,
        jitter_sec: jitter,
        dwell_sec: dwell,
        phase_offset_sec: phase,
    };
    vec![
        spec("R61", 240, 30, 25, 0),
        spec("235", 300, 35, 20, 60),
        spec("236", 300, 35, 22, 120),
        spec("251", 360, 40, 25, 180),
        spec("252", 420, 45, 25, 210),
        spec("644", 480, 50, 28, 240),
    ]
}
