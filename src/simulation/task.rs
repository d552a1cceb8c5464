//! Task state machine for transporters
//!
//! A task is a multi-turn objective. Every turn the owning transporter hands
//! itself to the task at the front of its queue, the task performs exactly
//! one action (move, load, unload or wait) and reports a [`TurnOutcome`].

use std::collections::HashSet;
use std::fmt;

use anyhow::{bail, Context, Result};

use super::building::Depots;
use super::error::TransferError;
use super::events::EventLogger;
use super::transporter::Transporter;
use super::types::{FieldId, TransporterId, WarehouseId};

/// What a task reports back after its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The task still has work to do on later turns
    Continue,
    /// The task takes no further action this turn; the transporter may
    /// retire it if it is completed
    Yield,
}

/// Where a task stands in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    MovingToSource,
    /// At the source, holding until enough resources accumulate
    WaitingForThreshold,
    /// At an empty source while dependencies are still active
    WaitingForCargo,
    Loading,
    MovingToDestination,
    Unloading,
    WaitingForStorage,
    Completed,
}

/// Read-only view of which transporters still have work
pub trait FleetStatus {
    fn is_working(&self, id: TransporterId) -> bool;
}

/// Transporters in the set count as working
impl FleetStatus for HashSet<TransporterId> {
    fn is_working(&self, id: TransporterId) -> bool {
        self.contains(&id)
    }
}

/// Everything a task may touch during one turn besides its transporter
pub struct TurnContext<'a> {
    pub depots: &'a mut Depots,
    pub fleet: &'a dyn FleetStatus,
}

impl<'a> TurnContext<'a> {
    pub fn new(depots: &'a mut Depots, fleet: &'a dyn FleetStatus) -> Self {
        Self { depots, fleet }
    }
}

/// A multi-turn objective owned by a single transporter
pub trait Task: fmt::Debug {
    /// Perform this turn's action for `transporter`
    fn work(&mut self, transporter: &mut Transporter, ctx: &mut TurnContext<'_>)
        -> Result<TurnOutcome>;

    /// Once true, stays true
    fn is_completed(&self) -> bool;

    fn phase(&self) -> Phase;

    /// Number of non-terminal turns this task has run
    fn turns_taken(&self) -> u64;

    /// Short human readable label
    fn describe(&self) -> String;

    /// Make sure every id the task refers to exists and that it does not
    /// wait on its own transporter
    fn check_references(
        &self,
        owner: TransporterId,
        depots: &Depots,
        fleet: &[TransporterId],
    ) -> Result<()>;
}

/// Repeatedly gather from one field and deliver to one warehouse until the
/// field is exhausted
#[derive(Debug, Clone)]
pub struct OneWayGathering {
    gather_from: FieldId,
    deliver_to: WarehouseId,
    wait_for: Vec<TransporterId>,
    min_amount: f64,
    completed: bool,
    phase: Phase,
    turns_waiting_for_storage: u64,
    turn_n: u64,
}

impl OneWayGathering {
    pub fn new(gather_from: FieldId, deliver_to: WarehouseId) -> Self {
        Self {
            gather_from,
            deliver_to,
            wait_for: Vec::new(),
            min_amount: 0.0,
            completed: false,
            phase: Phase::MovingToSource,
            turns_waiting_for_storage: 0,
            turn_n: 0,
        }
    }

    /// Do not finish while any of these transporters is still working
    pub fn waiting_for(mut self, transporters: impl IntoIterator<Item = TransporterId>) -> Self {
        self.wait_for.extend(transporters);
        self
    }

    /// While dependencies are active, only load once this much is available
    pub fn with_min_amount(mut self, min_amount: f64) -> Self {
        self.min_amount = min_amount;
        self
    }

    pub fn boxed(self) -> Box<dyn Task> {
        Box::new(self)
    }

    pub fn gather_from(&self) -> FieldId {
        self.gather_from
    }

    pub fn deliver_to(&self) -> WarehouseId {
        self.deliver_to
    }

    pub fn wait_for(&self) -> &[TransporterId] {
        &self.wait_for
    }

    pub fn min_amount(&self) -> f64 {
        self.min_amount
    }

    /// Consecutive turns the last unload attempt was refused
    pub fn turns_waiting_for_storage(&self) -> u64 {
        self.turns_waiting_for_storage
    }

    fn dependencies_working(&self, fleet: &dyn FleetStatus) -> bool {
        self.wait_for.iter().any(|id| fleet.is_working(*id))
    }

    fn complete(&mut self, log: &EventLogger, reason: &str, leftover: f64) -> TurnOutcome {
        self.completed = true;
        self.phase = Phase::Completed;
        log.info(
            format!("Task completed - {reason}"),
            &[("leftover", leftover.to_string())],
        );
        TurnOutcome::Yield
    }

    fn move_to_source(
        &mut self,
        transporter: &mut Transporter,
        ctx: &TurnContext<'_>,
        log: &EventLogger,
    ) -> Result<TurnOutcome> {
        let field = ctx
            .depots
            .field(self.gather_from)
            .context("Source field not found")?;
        let remaining = transporter.move_toward(field.position);
        self.phase = Phase::MovingToSource;
        log.info(
            format!("Moving to the {} ({})", field.name, field.resources),
            &[("steps_left", format!("{remaining:.1}"))],
        );
        Ok(TurnOutcome::Continue)
    }

    fn move_to_destination(
        &mut self,
        transporter: &mut Transporter,
        ctx: &TurnContext<'_>,
        log: &EventLogger,
        message: &str,
    ) -> Result<TurnOutcome> {
        let warehouse = ctx
            .depots
            .warehouse(self.deliver_to)
            .context("Destination warehouse not found")?;
        let remaining = transporter.move_toward(warehouse.position);
        self.phase = Phase::MovingToDestination;
        log.info(
            format!("{} {} ({})", message, warehouse.name, warehouse.resources),
            &[("steps_left", format!("{remaining:.1}"))],
        );
        Ok(TurnOutcome::Continue)
    }

    fn at_source(
        &mut self,
        transporter: &mut Transporter,
        ctx: &mut TurnContext<'_>,
        dependencies_working: bool,
        log: &EventLogger,
    ) -> Result<TurnOutcome> {
        let field = ctx
            .depots
            .field_mut(self.gather_from)
            .context("Source field not found")?;

        if dependencies_working && transporter.can_load(field, self.min_amount).is_err() {
            self.phase = if field.is_empty() {
                Phase::WaitingForCargo
            } else {
                Phase::WaitingForThreshold
            };
            log.info(
                "Waiting for more resources to gather",
                &[
                    ("present_cargo", field.resources.to_string()),
                    ("min_cargo", self.min_amount.to_string()),
                ],
            );
            return Ok(TurnOutcome::Continue);
        }

        match transporter.load(field) {
            Ok(amount) => {
                self.phase = Phase::Loading;
                log.info(
                    "Loading",
                    &[
                        ("carry", transporter.loaded.to_string()),
                        ("amount", amount.to_string()),
                    ],
                );
                Ok(TurnOutcome::Continue)
            }
            Err(TransferError::NothingToLoad) if dependencies_working => {
                self.phase = Phase::WaitingForCargo;
                log.info("Waiting for a cargo", &[]);
                Ok(TurnOutcome::Continue)
            }
            Err(TransferError::NothingToLoad) => {
                if transporter.is_empty() {
                    Ok(self.complete(log, "nothing more to load", 0.0))
                } else {
                    self.move_to_destination(
                        transporter,
                        ctx,
                        log,
                        "Moving to deliver remaining cargo to the",
                    )
                }
            }
            Err(other) => Err(other).context("Loading at the source field failed"),
        }
    }

    fn at_destination(
        &mut self,
        transporter: &mut Transporter,
        ctx: &mut TurnContext<'_>,
        dependencies_working: bool,
        log: &EventLogger,
    ) -> Result<TurnOutcome> {
        let warehouse = ctx
            .depots
            .warehouse_mut(self.deliver_to)
            .context("Destination warehouse not found")?;

        match transporter.unload(warehouse) {
            Ok(amount) => {
                self.turns_waiting_for_storage = 0;
                self.phase = Phase::Unloading;
                log.info(
                    "Unloading the cargo",
                    &[
                        ("carry", transporter.loaded.to_string()),
                        ("amount", amount.to_string()),
                    ],
                );

                let source_drained = ctx
                    .depots
                    .field(self.gather_from)
                    .context("Source field not found")?
                    .is_empty();
                if source_drained && !dependencies_working {
                    let reason = if transporter.is_empty() {
                        "source exhausted and cargo delivered"
                    } else {
                        "source exhausted, warehouse could not take the rest"
                    };
                    return Ok(self.complete(log, reason, transporter.loaded));
                }
                Ok(TurnOutcome::Continue)
            }
            Err(TransferError::StorageFull) => {
                self.turns_waiting_for_storage += 1;
                self.phase = Phase::WaitingForStorage;
                log.info(
                    format!("Waiting for {} to free a space", warehouse.name),
                    &[("turns", self.turns_waiting_for_storage.to_string())],
                );
                Ok(TurnOutcome::Continue)
            }
            Err(other) => Err(other).context("Unloading at the destination warehouse failed"),
        }
    }
}

impl Task for OneWayGathering {
    fn work(
        &mut self,
        transporter: &mut Transporter,
        ctx: &mut TurnContext<'_>,
    ) -> Result<TurnOutcome> {
        if self.completed {
            return Ok(TurnOutcome::Yield);
        }

        let log = transporter
            .events
            .bind("time", transporter.work_steps)
            .bind("carry", transporter.loaded)
            .bind("position", transporter.position);
        let dependencies_working = self.dependencies_working(ctx.fleet);

        let source = ctx
            .depots
            .field(self.gather_from)
            .context("Source field not found")?
            .position;
        let destination = ctx
            .depots
            .warehouse(self.deliver_to)
            .context("Destination warehouse not found")?
            .position;

        let outcome = if transporter.is_empty() {
            if !transporter.is_on_position(&source) {
                self.move_to_source(transporter, ctx, &log)?
            } else {
                self.at_source(transporter, ctx, dependencies_working, &log)?
            }
        } else if !transporter.is_on_position(&destination) {
            self.move_to_destination(transporter, ctx, &log, "Moving to the")?
        } else {
            self.at_destination(transporter, ctx, dependencies_working, &log)?
        };

        if outcome == TurnOutcome::Continue {
            self.turn_n += 1;
        }
        Ok(outcome)
    }

    fn is_completed(&self) -> bool {
        self.completed
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn turns_taken(&self) -> u64 {
        self.turn_n
    }

    fn describe(&self) -> String {
        format!(
            "gather from field {} to warehouse {}",
            self.gather_from.0 .0, self.deliver_to.0 .0
        )
    }

    fn check_references(
        &self,
        owner: TransporterId,
        depots: &Depots,
        fleet: &[TransporterId],
    ) -> Result<()> {
        if depots.field(self.gather_from).is_none() {
            bail!("Task refers to unknown field {:?}", self.gather_from);
        }
        if depots.warehouse(self.deliver_to).is_none() {
            bail!("Task refers to unknown warehouse {:?}", self.deliver_to);
        }
        if self.min_amount < 0.0 {
            bail!("Minimum load amount cannot be negative");
        }
        for dependency in &self.wait_for {
            if *dependency == owner {
                bail!("Transporter {:?} cannot wait for itself", owner);
            }
            if !fleet.contains(dependency) {
                bail!("Task waits for unknown transporter {:?}", dependency);
            }
        }
        Ok(())
    }
}
