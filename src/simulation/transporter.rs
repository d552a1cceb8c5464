//! Transporter movement and cargo handling
//!
//! A transporter owns its cargo and its queue of tasks. Fields and
//! warehouses are lent to it by the simulation for the length of a turn.

use std::collections::VecDeque;
use std::fmt;

use anyhow::Result;
use log::warn;

use super::building::{Field, Warehouse};
use super::error::{TransferError, TransferResult};
use super::events::EventLogger;
use super::task::{Task, TurnContext, TurnOutcome};
use super::types::{Position, TransporterId};

/// Cargo capacity used when none is given
pub const DEFAULT_MAX_CAPACITY: f64 = 10.0;

/// Distance covered per turn when no speed is given
pub const DEFAULT_SPEED: f64 = 1.0;

/// A mobile agent moving resources from fields to warehouses
#[derive(Debug)]
pub struct Transporter {
    pub id: TransporterId,
    pub name: String,
    pub position: Position,
    /// Distance units covered per turn
    pub speed: f64,
    pub max_capacity: f64,
    /// Current cargo, between 0 and `max_capacity`
    pub loaded: f64,
    pub distance_travelled: f64,
    /// Turns in which this transporter had something to do
    pub work_steps: u64,
    /// Total amount unloaded into warehouses
    pub transported: f64,
    pub events: EventLogger,
    tasks: VecDeque<Box<dyn Task>>,
    historical_tasks: Vec<Box<dyn Task>>,
}

impl Transporter {
    pub fn new(id: TransporterId, name: impl Into<String>, position: Position) -> Self {
        let name = name.into();
        Self {
            id,
            events: EventLogger::noop().bind("name", &name),
            name,
            position,
            speed: DEFAULT_SPEED,
            max_capacity: DEFAULT_MAX_CAPACITY,
            loaded: 0.0,
            distance_travelled: 0.0,
            work_steps: 0,
            transported: 0.0,
            tasks: VecDeque::new(),
            historical_tasks: Vec::new(),
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_capacity(mut self, max_capacity: f64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Send this transporter's events to `events`, tagged with its name
    pub fn with_events(mut self, events: EventLogger) -> Self {
        self.events = events.bind("name", &self.name);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.loaded <= 0.0
    }

    pub fn free_cargo_space(&self) -> f64 {
        self.max_capacity - self.loaded
    }

    /// Check whether a load of at least `min_amount` could happen right now
    pub fn can_load(&self, field: &Field, min_amount: f64) -> TransferResult<()> {
        if !self.is_on_position(&field.position) {
            Err(TransferError::NotCoLocated)
        } else if field.resources <= 0.0 {
            Err(TransferError::NothingToLoad)
        } else if self.free_cargo_space() < min_amount {
            Err(TransferError::AlreadyFull)
        } else if field.resources <= min_amount {
            Err(TransferError::InsufficientResources)
        } else {
            Ok(())
        }
    }

    /// Load as much as fits from `field`, returning the amount moved
    pub fn load(&mut self, field: &mut Field) -> TransferResult<f64> {
        self.can_load(field, 0.0)?;

        let amount = field.resources.min(self.free_cargo_space());
        field.resources -= amount;
        self.loaded += amount;
        Ok(amount)
    }

    /// Check whether any cargo could be unloaded into `warehouse` right now
    pub fn can_unload(&self, warehouse: &Warehouse) -> TransferResult<()> {
        if !self.is_on_position(&warehouse.position) {
            Err(TransferError::NotCoLocated)
        } else if !warehouse.has_free_space() {
            Err(TransferError::StorageFull)
        } else {
            Ok(())
        }
    }

    /// Unload as much cargo as `warehouse` accepts, returning the amount moved
    pub fn unload(&mut self, warehouse: &mut Warehouse) -> TransferResult<f64> {
        self.can_unload(warehouse)?;

        let amount = match warehouse.free_capacity() {
            Some(free) => self.loaded.min(free),
            None => self.loaded,
        };
        self.loaded -= amount;
        warehouse.resources += amount;
        self.transported += amount;
        Ok(amount)
    }

    pub fn is_on_position(&self, position: &Position) -> bool {
        self.position == *position
    }

    /// Estimated turns needed to reach `position` at the current speed
    pub fn steps_to(&self, position: &Position) -> f64 {
        self.position.distance(position) / self.speed
    }

    /// Travel one turn toward `target`, returning the turns still needed.
    ///
    /// Must not be called when already at `target`.
    pub fn move_toward(&mut self, target: Position) -> f64 {
        debug_assert!(
            !self.is_on_position(&target),
            "{} asked to move to {} but is already there",
            self.name,
            target
        );

        let steps_needed = self.steps_to(&target);
        if steps_needed < 1.0 {
            self.distance_travelled += self.speed * steps_needed;
            self.position = target;
            0.0
        } else {
            self.distance_travelled += self.speed;
            self.position = self.position.lerp(&target, 1.0 / steps_needed);
            steps_needed - 1.0
        }
    }

    /// Replace the pending task queue
    pub fn assign_tasks(&mut self, tasks: Vec<Box<dyn Task>>) {
        self.tasks = tasks.into();
    }

    pub fn tasks(&self) -> impl Iterator<Item = &dyn Task> {
        self.tasks.iter().map(|t| t.as_ref())
    }

    pub fn historical_tasks(&self) -> impl Iterator<Item = &dyn Task> {
        self.historical_tasks.iter().map(|t| t.as_ref())
    }

    pub fn current_task(&self) -> Option<&dyn Task> {
        self.tasks.front().map(|t| t.as_ref())
    }

    pub fn pending_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Still has tasks, or cargo it has to get rid of
    pub fn is_working(&self) -> bool {
        !self.tasks.is_empty() || !self.is_empty()
    }

    /// Run one turn. Returns `false` once there is nothing left to do.
    pub fn work(&mut self, ctx: &mut TurnContext<'_>) -> Result<bool> {
        if !self.is_working() {
            self.events.info("All tasks are finished", &[]);
            return Ok(false);
        }

        self.work_steps += 1;

        let Some(mut task) = self.tasks.pop_front() else {
            warn!(
                "{} holds {} units of cargo but has no task to deliver it",
                self.name, self.loaded
            );
            self.events
                .info("Stranded with cargo", &[("carry", self.loaded.to_string())]);
            return Ok(false);
        };

        let outcome = task.work(self, ctx);
        self.tasks.push_front(task);

        if outcome? == TurnOutcome::Yield {
            self.retire_completed_tasks();
        }

        if self.tasks.is_empty() {
            self.events.info("All tasks are finished", &[]);
            return Ok(false);
        }
        Ok(true)
    }

    fn retire_completed_tasks(&mut self) {
        while self.tasks.front().is_some_and(|t| t.is_completed()) {
            if let Some(done) = self.tasks.pop_front() {
                self.historical_tasks.push(done);
                self.events.info(
                    "Task is finished",
                    &[
                        ("finished", self.historical_tasks.len().to_string()),
                        ("remaining", self.tasks.len().to_string()),
                    ],
                );
            }
        }
    }
}

impl fmt::Display for Transporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] position: {} loaded: {}/{}",
            self.name, self.position, self.loaded, self.max_capacity
        )
    }
}
