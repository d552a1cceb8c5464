//! Main simulation world that ties everything together
//!
//! The world owns every depot and transporter and advances them one turn at
//! a time. Within a turn transporters act strictly in the order they were
//! added, each applying its whole action before the next one starts, so a
//! run is fully determined by its setup.

use std::fmt::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::{debug, info};

use super::building::{Depots, Field, Warehouse};
use super::events::{EventLogger, EventSink};
use super::observer::{
    DepotView, NoopObserver, SimObserver, TransporterView, WorldSnapshot,
};
use super::report::Report;
use super::task::{FleetStatus, Task, TurnContext};
use super::transporter::Transporter;
use super::types::{FieldId, Position, SimId, TransporterId, WarehouseId};

/// Working status of every transporter except the one taking its turn
struct FleetView<'a> {
    before: &'a [Transporter],
    after: &'a [Transporter],
    /// Completion turns, indexed like the whole fleet
    completed: &'a [Option<u64>],
}

impl FleetStatus for FleetView<'_> {
    /// Transporters already recorded as finished never count as working,
    /// even if they are stuck with cargo
    fn is_working(&self, id: TransporterId) -> bool {
        let after_start = self.before.len() + 1;
        self.before
            .iter()
            .enumerate()
            .chain(
                self.after
                    .iter()
                    .enumerate()
                    .map(|(i, t)| (after_start + i, t)),
            )
            .find(|(_, t)| t.id == id)
            .is_some_and(|(i, t)| {
                self.completed.get(i).is_some_and(Option::is_none) && t.is_working()
            })
    }
}

/// The main simulation world
pub struct Simulation {
    /// All fields and warehouses
    pub depots: Depots,

    /// Transporters in processing order
    transports: Vec<Transporter>,

    /// Turn on which each transporter reported it was done
    completed: Vec<Option<u64>>,

    /// Turns elapsed
    time: u64,

    /// Next ID to assign
    next_id: usize,

    /// Event logger handed to every new transporter
    events: EventLogger,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    /// Create an empty world whose events go nowhere
    pub fn new() -> Self {
        Self {
            depots: Depots::new(),
            transports: Vec::new(),
            completed: Vec::new(),
            time: 0,
            next_id: 0,
            events: EventLogger::noop(),
        }
    }

    /// Create an empty world reporting transporter events to `sink`
    pub fn with_event_sink(sink: Arc<dyn EventSink>) -> Self {
        Self {
            events: EventLogger::new(sink),
            ..Self::new()
        }
    }

    fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a field holding `resources` units
    pub fn add_field(
        &mut self,
        name: impl Into<String>,
        position: Position,
        resources: f64,
    ) -> Result<FieldId> {
        let name = name.into();
        if resources < 0.0 {
            bail!("Field '{}' cannot start with negative resources", name);
        }
        let id = FieldId(self.next_sim_id());
        self.depots
            .fields
            .insert(id, Field::new(id, name, position, resources));
        Ok(id)
    }

    /// Add an empty warehouse; `None` capacity means unlimited storage
    pub fn add_warehouse(
        &mut self,
        name: impl Into<String>,
        position: Position,
        capacity: Option<f64>,
    ) -> Result<WarehouseId> {
        self.add_stocked_warehouse(name, position, capacity, 0.0)
    }

    /// Add a warehouse that already holds `stock` units
    pub fn add_stocked_warehouse(
        &mut self,
        name: impl Into<String>,
        position: Position,
        capacity: Option<f64>,
        stock: f64,
    ) -> Result<WarehouseId> {
        let name = name.into();
        if capacity.is_some_and(|c| c < 0.0) {
            bail!("Warehouse '{}' cannot have negative capacity", name);
        }
        let id = WarehouseId(self.next_sim_id());
        let warehouse = Warehouse::new(id, name, position, capacity).with_stock(stock)?;
        self.depots.warehouses.insert(id, warehouse);
        Ok(id)
    }

    /// Add an idle transporter at `position`
    pub fn add_transporter(
        &mut self,
        name: impl Into<String>,
        position: Position,
        speed: f64,
        max_capacity: f64,
    ) -> Result<TransporterId> {
        let name = name.into();
        if speed <= 0.0 {
            bail!("Transporter '{}' needs a positive speed, got {}", name, speed);
        }
        if max_capacity <= 0.0 {
            bail!(
                "Transporter '{}' needs a positive capacity, got {}",
                name,
                max_capacity
            );
        }
        let id = TransporterId(self.next_sim_id());
        let transporter = Transporter::new(id, name, position)
            .with_speed(speed)
            .with_capacity(max_capacity)
            .with_events(self.events.clone());
        self.transports.push(transporter);
        self.completed.push(None);
        Ok(id)
    }

    /// Give a transporter its task queue, replacing any previous one
    pub fn assign_tasks(&mut self, id: TransporterId, tasks: Vec<Box<dyn Task>>) -> Result<()> {
        let fleet: Vec<TransporterId> = self.transports.iter().map(|t| t.id).collect();
        for task in &tasks {
            task.check_references(id, &self.depots, &fleet)
                .with_context(|| format!("Invalid task '{}'", task.describe()))?;
        }

        let index = self.index_of(id).context("Transporter not found")?;
        self.transports[index].assign_tasks(tasks);
        Ok(())
    }

    fn index_of(&self, id: TransporterId) -> Option<usize> {
        self.transports.iter().position(|t| t.id == id)
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn transporters(&self) -> &[Transporter] {
        &self.transports
    }

    pub fn transporter(&self, id: TransporterId) -> Option<&Transporter> {
        self.transports.iter().find(|t| t.id == id)
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.depots.field(id)
    }

    pub fn warehouse(&self, id: WarehouseId) -> Option<&Warehouse> {
        self.depots.warehouse(id)
    }

    /// Turn on which each transporter finished, in processing order
    pub fn completion_turns(&self) -> &[Option<u64>] {
        &self.completed
    }

    pub fn is_finished(&self) -> bool {
        self.completed.iter().all(Option::is_some)
    }

    /// Cargo currently on board any transporter
    pub fn cargo_in_transit(&self) -> f64 {
        self.transports.iter().map(|t| t.loaded).sum()
    }

    /// Advance every unfinished transporter by one turn.
    ///
    /// Returns `true` while at least one transporter is still unfinished.
    pub fn step(&mut self) -> Result<bool> {
        let time = self.time;

        for i in 0..self.transports.len() {
            if self.completed[i].is_some() {
                continue;
            }

            let (before, rest) = self.transports.split_at_mut(i);
            let Some((current, after)) = rest.split_first_mut() else {
                break;
            };
            let fleet = FleetView {
                before: &*before,
                after: &*after,
                completed: &self.completed,
            };
            let mut ctx = TurnContext::new(&mut self.depots, &fleet);

            let still_working = current
                .work(&mut ctx)
                .with_context(|| format!("Transporter '{}' failed on turn {}", current.name, time))?;

            if !still_working {
                debug!("{} finished on turn {}", current.name, time);
                self.completed[i] = Some(time);
            }
        }

        self.time += 1;
        Ok(!self.is_finished())
    }

    /// Run until every transporter is done or `max_turns` turns have passed
    pub fn run(&mut self, max_turns: Option<u64>) -> Result<Report> {
        self.run_observed(max_turns, &mut NoopObserver)
    }

    /// Like [`run`](Self::run), showing `observer` the world before each turn
    pub fn run_observed<O: SimObserver>(
        &mut self,
        max_turns: Option<u64>,
        observer: &mut O,
    ) -> Result<Report> {
        let mut turns = 0;
        loop {
            if max_turns.is_some_and(|limit| turns >= limit) {
                info!("Stopping after the turn cap of {} turns", turns);
                break;
            }
            if observer.wants_snapshots() {
                observer.on_turn_start(&self.snapshot());
            }

            turns += 1;
            if !self.step()? {
                break;
            }
        }

        let report = self.report();
        info!(
            "Simulation ended after {} turns, {} of {} transporters finished",
            report.simulation_steps,
            report.transport_steps.len() - report.unfinished_count(),
            report.transport_steps.len()
        );
        observer.on_run_end(&report);
        Ok(report)
    }

    pub fn report(&self) -> Report {
        Report::new(self.time, self.completed.clone())
    }

    /// Copy of the visible state of every entity
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            time: self.time,
            fields: self
                .depots
                .sorted_fields()
                .into_iter()
                .map(|f| DepotView {
                    name: f.name.clone(),
                    position: f.position,
                    resources: f.resources,
                    capacity: None,
                })
                .collect(),
            warehouses: self
                .depots
                .sorted_warehouses()
                .into_iter()
                .map(|w| DepotView {
                    name: w.name.clone(),
                    position: w.position,
                    resources: w.resources,
                    capacity: w.capacity,
                })
                .collect(),
            transporters: self
                .transports
                .iter()
                .map(|t| TransporterView {
                    name: t.name.clone(),
                    position: t.position,
                    loaded: t.loaded,
                    max_capacity: t.max_capacity,
                })
                .collect(),
        }
    }

    /// Multi-line description of the world state
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Freight Simulation Summary ===");
        let _ = writeln!(out, "Time: {}", self.time);
        let _ = writeln!(
            out,
            "Fields: {}, Warehouses: {}, Transporters: {}",
            self.depots.fields.len(),
            self.depots.warehouses.len(),
            self.transports.len()
        );

        let _ = writeln!(out, "--- Fields ---");
        for field in self.depots.sorted_fields() {
            let _ = writeln!(out, "  {}: resources={}", field.name, field.resources);
        }

        let _ = writeln!(out, "--- Warehouses ---");
        for warehouse in self.depots.sorted_warehouses() {
            match warehouse.capacity {
                Some(capacity) => {
                    let _ = writeln!(
                        out,
                        "  {}: resources={}/{}",
                        warehouse.name, warehouse.resources, capacity
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "  {}: resources={} (unlimited)",
                        warehouse.name, warehouse.resources
                    );
                }
            }
        }

        let _ = writeln!(out, "--- Transporters ---");
        for (transporter, finished) in self.transports.iter().zip(&self.completed) {
            let status = match finished {
                Some(turn) => format!("finished on turn {turn}"),
                None => match transporter.current_task() {
                    Some(task) => format!("{:?}: {}", task.phase(), task.describe()),
                    None => "idle".to_string(),
                },
            };
            let _ = writeln!(
                out,
                "  {}: work_steps={}, distance={:.1}, transported={}, loaded={}/{}, tasks done={}/{}, {}",
                transporter.name,
                transporter.work_steps,
                transporter.distance_travelled,
                transporter.transported,
                transporter.loaded,
                transporter.max_capacity,
                transporter.historical_tasks().count(),
                transporter.historical_tasks().count() + transporter.pending_task_count(),
                status
            );
        }
        out
    }
}
