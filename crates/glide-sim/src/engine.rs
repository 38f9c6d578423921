//! The corridor run loop.
//!
//! One [`Run`] owns everything a simulation touches — demand timelines,
//! signal plan, TSP controller, stops, vehicles, monitor — so concurrent
//! runs share nothing.  Each tick proceeds in a fixed order: spawn, TSP,
//! phase resolution, vehicle stepping (buses first), exit folding, frame
//! capture.
//!
//! # Tick order
//!
//! Buses step before cars so berth admissions settle before car clamping is
//! evaluated against the same tick's signal phases.

use std::mem;

use glide_core::{LineId, RunRng, StopId, Tick, VehicleId};
use glide_demand::{build_timetable, default_corridor_lines, generate_departures, BusLineSpec};
use glide_signal::{
    tsp_policy, Phase, SignalPlan, TspController, TspReason, DEFAULT_CYCLE_BUDGET,
    DEFAULT_MAX_ADVANCE, DEFAULT_MAX_EXTEND,
};

use crate::config::{Mode, SimulationConfig, TspParams};
use crate::error::{SimError, SimResult};
use crate::monitor::Monitor;
use crate::observer::{NoopObserver, RunObserver};
use crate::result::{
    Frame, PlanSummary, RenderVehicle, SignalIndication, SimulationResult, TspAction, TspEvent,
};
use crate::stepper::{BusEvent, Stepper, BUS_SPEED_FACTOR};
use crate::stops::StopRegistry;
use crate::vehicle::{CarState, Vehicle, VehicleKind, X_MIN};

/// Stop-line positions of the five corridor signals, in corridor order.
pub const STOPLINE_POSITIONS: [f64; 5] = [-600.0, -300.0, 0.0, 300.0, 600.0];

/// Absolute ceiling on executed ticks, regardless of the requested `steps`.
pub const HARD_STEP_CAP: u32 = 1200;

/// Per-car cruise speed factor range (buses run at a fixed factor).
const CAR_SPEED_FACTOR: std::ops::Range<f64> = 0.92..1.05;

/// Car lateral render offset range (buses render on the axis).
const CAR_LANE_RANGE: std::ops::Range<f64> = -2.0..2.0;

/// Volume-dependent cap on rendered vehicles per frame.
fn frame_vehicle_cap(target_vph: u32) -> usize {
    if target_vph < 1200 {
        220
    } else if target_vph < 1800 {
        320
    } else {
        500
    }
}

// ── CorridorEngine ────────────────────────────────────────────────────────────

/// The built-in simulator.  Stateless between runs; cheap to construct.
#[derive(Default)]
pub struct CorridorEngine;

impl CorridorEngine {
    pub fn new() -> Self {
        Self
    }

    /// Execute one run to completion.
    pub fn run(&self, config: &SimulationConfig) -> SimResult<SimulationResult> {
        self.run_with_observer(config, &mut NoopObserver)
    }

    /// Execute one run, firing observer callbacks as it steps.
    pub fn run_with_observer(
        &self,
        config: &SimulationConfig,
        observer: &mut dyn RunObserver,
    ) -> SimResult<SimulationResult> {
        self.run_internal(config, observer).map(|(result, _)| result)
    }

    pub(crate) fn run_internal(
        &self,
        config: &SimulationConfig,
        observer: &mut dyn RunObserver,
    ) -> SimResult<(SimulationResult, RunCounters)> {
        config.validate()?;
        let mut run = Run::new(config);
        run.execute(observer)
    }
}

/// Conservation counters, checked by tests.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct RunCounters {
    pub cars_spawned: u32,
    pub cars_exited: u32,
    pub cars_active: u32,
}

// ── Run state ─────────────────────────────────────────────────────────────────

/// An unconsumed headway observation for one line: the gap measured when its
/// latest bus reached a stop.  Evaluated by the TSP layer exactly once.
struct HeadwayObs {
    headway: f64,
    bus: VehicleId,
    stop: StopId,
    consumed: bool,
}

struct Run {
    cfg: SimulationConfig,
    run_id: String,
    steps: u32,
    /// Root RNG stream; spawn-time per-vehicle draws come from here after
    /// the schedule child streams have been split off.
    rng: RunRng,

    plan: SignalPlan,
    lines: Vec<BusLineSpec>,
    /// Effective dwell per line (per-line when lines were supplied, the
    /// global dwell otherwise).
    dwell: Vec<u32>,

    car_departures: Vec<f64>,
    car_cursor: usize,
    car_seq: u32,
    bus_timetables: Vec<Vec<f64>>,
    bus_cursors: Vec<usize>,

    stops: StopRegistry,
    tsp: TspController,
    tsp_params: TspParams,
    obs: Vec<Option<HeadwayObs>>,

    monitor: Monitor,
    vehicles: Vec<Vehicle>,
    next_id: u32,
    frames: Vec<Frame>,
    tsp_events: Vec<TspEvent>,
}

impl Run {
    fn new(cfg: &SimulationConfig) -> Self {
        let mut rng = match cfg.seed {
            Some(seed) => RunRng::new(seed),
            None => RunRng::from_entropy(),
        };
        let run_id = format!("sim_{:08x}", rng.random::<u32>());

        let plan = match cfg.mode {
            Mode::Fixed => SignalPlan::fixed(cfg.cycle, &STOPLINE_POSITIONS),
            Mode::Glide | Mode::GlideTsp => {
                SignalPlan::glide(cfg.cycle, &STOPLINE_POSITIONS, cfg.v_prog_kmh)
            }
        };

        let steps = cfg.steps.min(HARD_STEP_CAP);
        let lines = cfg
            .bus_lines
            .clone()
            .unwrap_or_else(default_corridor_lines);
        let dwell = lines
            .iter()
            .map(|l| if cfg.bus_lines.is_some() { l.dwell_sec } else { cfg.dwell_sec })
            .collect();

        let mut car_rng = rng.child(1);
        let car_departures = generate_departures(
            cfg.target_vph(),
            plan.cycle,
            plan.green,
            plan.first_offset(),
            steps,
            &mut car_rng,
        );
        let bus_timetables = lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let mut line_rng = rng.child(10 + i as u64);
                build_timetable(line, steps, cfg.simulate_bunching, &mut line_rng)
            })
            .collect::<Vec<_>>();

        let tsp_params = cfg.tsp.unwrap_or_default();
        let line_count = lines.len();
        Self {
            cfg: cfg.clone(),
            run_id,
            steps,
            rng,
            tsp: TspController::new(plan.node_count(), tsp_params.cooldown_sec, DEFAULT_CYCLE_BUDGET),
            tsp_params,
            stops: StopRegistry::corridor_default(),
            monitor: Monitor::new(&lines),
            obs: (0..line_count).map(|_| None).collect(),
            bus_cursors: vec![0; line_count],
            plan,
            lines,
            dwell,
            car_departures,
            car_cursor: 0,
            car_seq: 0,
            bus_timetables,
            vehicles: Vec::new(),
            next_id: 0,
            frames: Vec::new(),
            tsp_events: Vec::new(),
        }
    }

    fn execute(mut self, observer: &mut dyn RunObserver) -> SimResult<(SimulationResult, RunCounters)> {
        for t in 0..self.steps {
            let now = Tick(t);
            self.spawn(now, observer);
            if self.cfg.mode == Mode::GlideTsp && self.cfg.anti_bunching {
                self.update_tsp(now, observer);
            }
            let phases = self.resolve_phases(now);
            self.step_vehicles(now, &phases)?;
            self.fold_exits(now, observer);
            let frame = self.render_frame(t, &phases);
            observer.on_tick_end(now, &frame);
            self.frames.push(frame);
        }
        Ok(self.finalize())
    }

    // ── Spawning ──────────────────────────────────────────────────────────

    fn alloc_id(&mut self) -> VehicleId {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Inject every departure scheduled inside `[t, t+1)`.  Positions are
    /// extrapolated from the fractional departure offset so a vehicle leaving
    /// mid-tick is already part-way into the corridor; cars additionally draw
    /// a lateral lane offset and an individual cruise-speed factor.
    fn spawn(&mut self, now: Tick, observer: &mut dyn RunObserver) {
        let t = now.0 as f64;
        let v_prog = self.cfg.v_prog_kmh / 3.6;

        while self.car_cursor < self.car_departures.len()
            && self.car_departures[self.car_cursor] < t + 1.0
        {
            let depart = self.car_departures[self.car_cursor];
            self.car_cursor += 1;
            let dt = (depart - t).max(0.0);
            let y = self.rng.gen_range(CAR_LANE_RANGE);
            let speed = v_prog * self.rng.gen_range(CAR_SPEED_FACTOR);
            let id = self.alloc_id();
            let car = Vehicle::car(id, self.car_seq, X_MIN + v_prog * dt, y, speed, t + dt);
            self.car_seq += 1;
            self.monitor.cars.spawned += 1;
            observer.on_spawn(now, &car);
            self.vehicles.push(car);
        }

        let v_bus = v_prog * BUS_SPEED_FACTOR;
        for li in 0..self.lines.len() {
            while self.bus_cursors[li] < self.bus_timetables[li].len()
                && self.bus_timetables[li][self.bus_cursors[li]] < t + 1.0
            {
                let depart = self.bus_timetables[li][self.bus_cursors[li]];
                let trip = self.bus_cursors[li];
                self.bus_cursors[li] += 1;
                let dt = (depart - t).max(0.0);
                let id = self.alloc_id();
                let bus = Vehicle::bus(
                    id,
                    LineId(li as u16),
                    &self.lines[li].id,
                    trip,
                    X_MIN + v_bus * dt,
                    v_bus,
                    t + dt,
                );
                observer.on_spawn(now, &bus);
                self.vehicles.push(bus);
            }
        }
    }

    // ── TSP ───────────────────────────────────────────────────────────────

    /// Evaluate pending headway observations and apply grants/holds.  Each
    /// observation is consumed by exactly one evaluation, granted or not.
    fn update_tsp(&mut self, now: Tick, observer: &mut dyn RunObserver) {
        for node in self.plan.nodes() {
            self.tsp.begin_cycle(node.id, self.plan.cycle_index(node.id, now));
        }

        let delta = self.cfg.ab_tolerance_sec as f64;
        let max_extend = DEFAULT_MAX_EXTEND.min(self.tsp_params.max_extend_sec);

        for li in 0..self.lines.len() {
            let Some(obs) = self.obs[li].as_mut() else { continue };
            if obs.consumed {
                continue;
            }
            obs.consumed = true;
            let (headway, bus_id, stop) = (obs.headway, obs.bus, obs.stop);

            let target = self.lines[li].headway_sec as f64;
            let decision = tsp_policy(headway, target, delta, max_extend, DEFAULT_MAX_ADVANCE);

            match decision.reason {
                TspReason::Normal => {}
                TspReason::LateBus => {
                    // Extend green at the next signal ahead of the late bus.
                    let Some(bus_x) = self.vehicles.iter().find(|v| v.id == bus_id).map(|v| v.x)
                    else {
                        continue;
                    };
                    let Some(node) = self
                        .plan
                        .nodes()
                        .iter()
                        .find(|n| n.position > bus_x + 0.1)
                        .map(|n| n.id)
                    else {
                        continue;
                    };
                    let granted = self.tsp.try_grant(node, now, decision.extend);
                    if granted > 0 {
                        self.monitor.lines[li].tsp_extends += 1;
                        let event = TspEvent {
                            tick: now,
                            at: self.plan.nodes()[node.index()].name.clone(),
                            line: self.lines[li].id.clone(),
                            action: TspAction::Extend,
                            seconds: granted,
                        };
                        observer.on_tsp_event(&event);
                        self.tsp_events.push(event);
                    }
                }
                TspReason::EarlyBus => {
                    // Hold the early bus at its berth a little longer.
                    let hold = decision.hold.min(self.tsp_params.max_hold_sec);
                    if hold == 0 {
                        continue;
                    }
                    let Some(v) = self.vehicles.iter_mut().find(|v| v.id == bus_id) else {
                        continue;
                    };
                    let VehicleKind::Bus(bus) = &mut v.kind else { continue };
                    let (Some(until), Some(at_stop)) = (bus.dwell_until, bus.at_stop) else {
                        continue;
                    };
                    if at_stop != stop {
                        continue;
                    }
                    let new_release = until.offset(hold);
                    bus.dwell_until = Some(new_release);
                    self.stops.extend_release(stop, bus_id, new_release);
                    self.monitor.lines[li].holds += 1;
                    let event = TspEvent {
                        tick: now,
                        at: self.stops.sites()[stop.index()].name.clone(),
                        line: self.lines[li].id.clone(),
                        action: TspAction::Hold,
                        seconds: hold,
                    };
                    observer.on_tsp_event(&event);
                    self.tsp_events.push(event);
                }
            }
        }
    }

    fn resolve_phases(&self, now: Tick) -> Vec<Phase> {
        self.plan
            .nodes()
            .iter()
            .map(|n| {
                let ext = if self.cfg.mode == Mode::GlideTsp {
                    self.tsp.extension(n.id)
                } else {
                    0
                };
                self.plan.phase_with_extension(n.id, now, ext)
            })
            .collect()
    }

    // ── Stepping and scoring ──────────────────────────────────────────────

    fn step_vehicles(&mut self, now: Tick, phases: &[Phase]) -> SimResult<()> {
        let mut vehicles = mem::take(&mut self.vehicles);
        // Buses first: berth state settles before cars are scored.
        vehicles.sort_by_key(|v| !v.is_bus());

        let mut stepper = Stepper { plan: &self.plan, phases, stops: &mut self.stops };

        for v in &mut vehicles {
            let was_stopped = v.stopped;
            match &v.kind {
                VehicleKind::Car(_) => stepper.step_car(v),
                VehicleKind::Bus(b) => {
                    let li = b.line.index();
                    let dwell = self.dwell[li];
                    let event = stepper.step_bus(v, now, dwell).map_err(|message| {
                        SimError::Runtime {
                            run_id: self.run_id.clone(),
                            tick: now,
                            message: message.to_string(),
                        }
                    })?;
                    match event {
                        BusEvent::Arrived(stop) => {
                            if let Some(headway) = self.monitor.lines[li].record_arrival(now) {
                                self.obs[li] = Some(HeadwayObs {
                                    headway,
                                    bus: v.id,
                                    stop,
                                    consumed: false,
                                });
                            }
                        }
                        BusEvent::Queued(_) => {
                            self.monitor.lines[li].queue_holds += 1;
                        }
                        BusEvent::Released(_) | BusEvent::None => {}
                    }
                }
            }
            score_tick(v, was_stopped);
        }

        self.vehicles = vehicles;
        Ok(())
    }

    fn fold_exits(&mut self, now: Tick, observer: &mut dyn RunObserver) {
        let exit_tick = now.0 + 1;
        let mut kept = Vec::with_capacity(self.vehicles.len());
        for v in mem::take(&mut self.vehicles) {
            if !v.has_exited() {
                kept.push(v);
                continue;
            }
            observer.on_exit(now, &v);
            match &v.kind {
                VehicleKind::Car(car) => {
                    let travel = exit_tick as f64 - v.entered_at;
                    self.monitor
                        .cars
                        .fold_exit(exit_tick, v.signal_stops, car.delay_s, travel);
                }
                VehicleKind::Bus(bus) => {
                    let stats = self.monitor.line_mut(bus.line);
                    stats.exited += 1;
                    stats.signal_delay_s += bus.signal_delay_s;
                    stats.queue_hold_s += bus.queue_hold_s;
                    stats.dwell_s += bus.dwell_s;
                }
            }
        }
        self.vehicles = kept;
    }

    // ── Frames ────────────────────────────────────────────────────────────

    fn render_frame(&self, t: u32, phases: &[Phase]) -> Frame {
        let signals = self
            .plan
            .nodes()
            .iter()
            .zip(phases)
            .map(|(n, &phase)| SignalIndication { node: n.name.clone(), x: n.position, state: phase })
            .collect();

        let buses: Vec<&Vehicle> = self.vehicles.iter().filter(|v| v.is_bus()).collect();
        let cars: Vec<&Vehicle> = self.vehicles.iter().filter(|v| !v.is_bus()).collect();

        let cap = frame_vehicle_cap(self.cfg.target_vph());
        let max_cars = cap.saturating_sub(buses.len());

        let mut vehicles: Vec<RenderVehicle> = buses.iter().map(|v| self.render(v)).collect();
        if max_cars > 0 {
            if cars.len() > max_cars {
                let stride = (cars.len() / max_cars).max(1);
                vehicles.extend(
                    cars.iter()
                        .enumerate()
                        .filter(|(i, _)| i % stride == 0)
                        .map(|(_, v)| self.render(v)),
                );
            } else {
                vehicles.extend(cars.iter().map(|v| self.render(v)));
            }
        }

        Frame { t, vehicles, signals }
    }

    fn render(&self, v: &Vehicle) -> RenderVehicle {
        let line = match &v.kind {
            VehicleKind::Bus(b) => Some(self.lines[b.line.index()].id.clone()),
            VehicleKind::Car(_) => None,
        };
        RenderVehicle {
            id: v.label.clone(),
            x: v.x,
            y: v.y,
            is_bus: v.is_bus(),
            stopped: v.stopped,
            at_station: v.at_station(),
            line,
        }
    }

    // ── Finalisation ──────────────────────────────────────────────────────

    fn finalize(self) -> (SimulationResult, RunCounters) {
        let counters = RunCounters {
            cars_spawned: self.monitor.cars.spawned,
            cars_exited: self.monitor.cars.exited,
            cars_active: self.vehicles.iter().filter(|v| !v.is_bus()).count() as u32,
        };

        let total_arrived = self.monitor.cars.exited
            + self.monitor.lines.iter().map(|l| l.exited).sum::<u32>();
        let kpis = self.monitor.kpis(
            self.cfg.mode,
            self.steps,
            self.cfg.target_vph(),
            self.frames.len(),
            total_arrived,
        );
        let monitor = self.monitor.finalize(self.cfg.ab_tolerance_sec, &self.stops);

        let result = SimulationResult {
            run_id: self.run_id,
            plan: PlanSummary::from_plan(&self.plan),
            frames: self.frames,
            tsp_events: self.tsp_events,
            monitor,
            kpis,
        };
        (result, counters)
    }
}

/// Per-tick scoring: one second of the matching delay bucket, plus a stop
/// event on each moving → stopped edge outside stations and berth queues.
fn score_tick(v: &mut Vehicle, was_stopped: bool) {
    let at_station = v.at_station();
    let queueing = v.queueing();
    match &mut v.kind {
        VehicleKind::Car(CarState { delay_s }) => {
            if v.stopped {
                *delay_s += 1.0;
                if !was_stopped {
                    v.signal_stops += 1;
                }
            }
        }
        VehicleKind::Bus(bus) => {
            if at_station {
                bus.dwell_s += 1.0;
            } else if queueing {
                bus.queue_hold_s += 1.0;
            } else if v.stopped {
                bus.signal_delay_s += 1.0;
                if !was_stopped {
                    v.signal_stops += 1;
                }
            }
        }
    }
}

