//! Per-vehicle kinematics for one tick.
//!
//! Movement is first-order: a vehicle advances `speed` per tick unless
//! clamped by the next non-green stop line, a stop capture, or an active
//! dwell.  Position never regresses; every clamp is floored at the current
//! position.

use glide_core::Tick;
use glide_signal::{Phase, SignalPlan};

use crate::stops::{Approach, StopRegistry};
use crate::vehicle::{Vehicle, VehicleKind};

/// How far short of a red stop line a vehicle halts, in distance-units.
pub const STOPLINE_BUFFER: f64 = 4.5;

/// Buses cruise at this fraction of the car progression speed.
pub const BUS_SPEED_FACTOR: f64 = 0.9;

/// What a bus did this tick, for monitor bookkeeping.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusEvent {
    None,
    /// Admitted to a berth at this stop.
    Arrived(glide_core::StopId),
    /// Denied a berth; held at the pre-stop standoff.
    Queued(glide_core::StopId),
    /// Dwell finished; berth released.
    Released(glide_core::StopId),
}

/// One tick's stepping context: the signal plan, the phases already resolved
/// for this tick (TSP extensions applied), and the mutable stop registry.
pub struct Stepper<'a> {
    pub plan: &'a SignalPlan,
    /// Phase per node, indexed by node order, for the current tick.
    pub phases: &'a [Phase],
    pub stops: &'a mut StopRegistry,
}

/// First stop line strictly ahead of `x` (with a small epsilon so a vehicle
/// sitting exactly on a line is past it).
fn next_stopline(plan: &SignalPlan, x: f64) -> Option<(usize, f64)> {
    plan.nodes()
        .iter()
        .enumerate()
        .find(|(_, n)| n.position > x + 0.1)
        .map(|(i, n)| (i, n.position))
}

impl Stepper<'_> {
    /// Advance a car: cruise, clamped short of the next non-green stop line.
    pub fn step_car(&self, v: &mut Vehicle) {
        let x0 = v.x;
        let mut x_new = v.x + v.speed;
        if let Some((i, sx)) = next_stopline(self.plan, v.x) {
            if !self.phases[i].is_green() && x_new > sx - STOPLINE_BUFFER {
                x_new = sx - STOPLINE_BUFFER;
            }
        }
        v.x = x_new.max(x0);
        v.stopped = (v.x - x0).abs() < 1e-9;
    }

    /// Advance a bus: finish or continue a dwell, capture an unserved stop
    /// crossed this tick, or cruise under signal control.
    ///
    /// Returns `Err` on a berth-release inconsistency; the engine promotes
    /// it to a fatal run error.
    pub fn step_bus(
        &mut self,
        v: &mut Vehicle,
        now: Tick,
        dwell_secs: u32,
    ) -> Result<BusEvent, &'static str> {
        let id = v.id;
        let mut x_try = v.x + v.speed;
        let VehicleKind::Bus(bus) = &mut v.kind else {
            return Ok(BusEvent::None);
        };

        // Serving a stop: keep dwelling, or release and resume movement in
        // the same tick.
        let mut released = None;
        if let (Some(until), Some(stop)) = (bus.dwell_until, bus.at_stop) {
            if now < until {
                v.stopped = true;
                return Ok(BusEvent::None);
            }
            if !self.stops.release(stop, id) {
                return Err("released bus was not a berth occupant");
            }
            bus.dwell_until = None;
            bus.at_stop = None;
            bus.served.push(stop);
            // Pull clear of the berth so the stop cannot re-capture.
            v.x = v.x.max(self.stops.position(stop) + 0.2);
            x_try = x_try.max(v.x);
            released = Some(stop);
        }

        let x_base = v.x;

        // Crossing an unserved stop this tick.
        let capture = self
            .stops
            .sites()
            .iter()
            .find(|s| v.x < s.position && x_try >= s.position && !bus.served.contains(&s.id))
            .map(|s| s.id);
        if let Some(stop) = capture {
            match self.stops.on_approach(stop, id, v.x, now, dwell_secs) {
                Approach::Enter { dwell_until } => {
                    bus.dwell_until = Some(dwell_until);
                    bus.at_stop = Some(stop);
                    bus.queueing = false;
                    v.x = v.x.max(self.stops.position(stop) - 0.1);
                    v.stopped = true;
                    return Ok(BusEvent::Arrived(stop));
                }
                Approach::Hold { position } => {
                    bus.queueing = true;
                    v.x = position.max(x_base);
                    v.stopped = true;
                    return Ok(BusEvent::Queued(stop));
                }
            }
        }

        // Plain cruise under signal control.
        bus.queueing = false;
        let mut x_new = x_try;
        if let Some((i, sx)) = next_stopline(self.plan, v.x) {
            if !self.phases[i].is_green() && x_new > sx - STOPLINE_BUFFER {
                x_new = sx - STOPLINE_BUFFER;
            }
        }
        v.x = x_new.max(x_base);
        v.stopped = (v.x - x_base).abs() < 1e-9;
        Ok(match released {
            Some(stop) => BusEvent::Released(stop),
            None => BusEvent::None,
        })
    }
}
