//! Vehicle state: common kinematics plus a kind-specific payload.
//!
//! The payload split means a car never carries dwell bookkeeping and a bus
//! never carries fields that only make sense for cars.  Position `x` is
//! non-decreasing across ticks for an active vehicle: it may be held at a
//! stop line, a pre-stop standoff, or a station, but never moves backwards.

use glide_core::{LineId, StopId, Tick, VehicleId};

/// Corridor entry boundary (vehicles spawn here).
pub const X_MIN: f64 = -800.0;

/// Corridor exit boundary.
pub const X_MAX: f64 = 800.0;

/// Distance past `X_MAX` at which a vehicle is folded out of the run.
pub const EXIT_CLEARANCE: f64 = 30.0;

// ── Kind payloads ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct CarState {
    /// Seconds spent stopped at signals.
    pub delay_s: f64,
}

#[derive(Clone, Debug)]
pub struct BusState {
    pub line: LineId,
    /// Tick at which the current stop dwell ends, while serving a stop.
    pub dwell_until: Option<Tick>,
    /// The stop currently being served.
    pub at_stop: Option<StopId>,
    /// Held at a pre-stop standoff waiting for a berth.
    pub queueing: bool,
    /// Stops already served by this bus (each stop served at most once).
    pub served: Vec<StopId>,
    /// Seconds stopped at signals.
    pub signal_delay_s: f64,
    /// Seconds held queueing before a stop.
    pub queue_hold_s: f64,
    /// Seconds dwelling at stops.
    pub dwell_s: f64,
}

#[derive(Clone, Debug)]
pub enum VehicleKind {
    Car(CarState),
    Bus(BusState),
}

// ── Vehicle ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Vehicle {
    pub id: VehicleId,
    /// Render label (`car_12`, `bus_R61_0`), fixed at spawn.
    pub label: String,
    /// Longitudinal position along the corridor axis.
    pub x: f64,
    /// Lateral render offset.
    pub y: f64,
    /// Cruise speed in distance-units per tick.
    pub speed: f64,
    /// `true` exactly when the last update left the position unchanged.
    pub stopped: bool,
    /// Fractional entry time (spawn tick plus sub-tick offset).
    pub entered_at: f64,
    /// Signal-induced stop events (moving → stopped transitions, excluding
    /// station dwells and berth queues).
    pub signal_stops: u32,
    pub kind: VehicleKind,
}

impl Vehicle {
    pub fn car(id: VehicleId, seq: u32, x: f64, y: f64, speed: f64, entered_at: f64) -> Self {
        Self {
            id,
            label: format!("car_{seq}"),
            x,
            y,
            speed,
            stopped: false,
            entered_at,
            signal_stops: 0,
            kind: VehicleKind::Car(CarState::default()),
        }
    }

    pub fn bus(
        id: VehicleId,
        line: LineId,
        line_name: &str,
        trip: usize,
        x: f64,
        speed: f64,
        entered_at: f64,
    ) -> Self {
        Self {
            id,
            label: format!("bus_{line_name}_{trip}"),
            x,
            y: 0.0,
            speed,
            stopped: false,
            entered_at,
            signal_stops: 0,
            kind: VehicleKind::Bus(BusState {
                line,
                dwell_until: None,
                at_stop: None,
                queueing: false,
                served: Vec::new(),
                signal_delay_s: 0.0,
                queue_hold_s: 0.0,
                dwell_s: 0.0,
            }),
        }
    }

    #[inline]
    pub fn is_bus(&self) -> bool {
        matches!(self.kind, VehicleKind::Bus(_))
    }

    /// `true` while the bus is serving a stop (dwelling at a berth).
    pub fn at_station(&self) -> bool {
        match &self.kind {
            VehicleKind::Bus(b) => b.dwell_until.is_some() && b.at_stop.is_some(),
            VehicleKind::Car(_) => false,
        }
    }

    /// `true` while the bus is held at a pre-stop standoff.
    pub fn queueing(&self) -> bool {
        match &self.kind {
            VehicleKind::Bus(b) => b.queueing,
            VehicleKind::Car(_) => false,
        }
    }

    /// Past the exit boundary plus clearance — ready to be folded out.
    #[inline]
    pub fn has_exited(&self) -> bool {
        self.x > X_MAX + EXIT_CLEARANCE
    }
}
