//! Ready-made worlds used by the CLI and the tests

use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::events::EventSink;
use super::task::{OneWayGathering, Task};
use super::types::Position;
use super::world::Simulation;

/// One truck hauling a single field into an unlimited warehouse
pub fn basic(sink: Arc<dyn EventSink>) -> Result<Simulation> {
    let mut sim = Simulation::with_event_sink(sink);
    let field = sim.add_field("Farm", Position::new(0.0, 0.0), 25.0)?;
    let warehouse = sim.add_warehouse("Depot", Position::new(6.0, 8.0), None)?;
    let truck = sim.add_transporter("Truck", Position::new(0.0, 0.0), 2.0, 10.0)?;
    sim.assign_tasks(truck, vec![OneWayGathering::new(field, warehouse).boxed()])?;
    Ok(sim)
}

/// Two haulers share an orchard while a sweeper waits for them.
///
/// The sweeper only loads full batches while the haulers are busy, then
/// clears whatever is left once they are done.
pub fn relay(sink: Arc<dyn EventSink>) -> Result<Simulation> {
    let mut sim = Simulation::with_event_sink(sink);
    let orchard = sim.add_field("Orchard", Position::new(0.0, 0.0), 47.0)?;
    let market = sim.add_warehouse("Market", Position::new(12.0, 0.0), None)?;
    let silo = sim.add_warehouse("Silo", Position::new(0.0, 9.0), Some(40.0))?;

    let first = sim.add_transporter("Hauler A", Position::new(3.0, 4.0), 1.5, 8.0)?;
    let second = sim.add_transporter("Hauler B", Position::new(-4.0, 3.0), 1.0, 12.0)?;
    let sweeper = sim.add_transporter("Sweeper", Position::new(0.0, 0.0), 2.0, 6.0)?;

    sim.assign_tasks(first, vec![OneWayGathering::new(orchard, market).boxed()])?;
    sim.assign_tasks(second, vec![OneWayGathering::new(orchard, silo).boxed()])?;
    sim.assign_tasks(
        sweeper,
        vec![OneWayGathering::new(orchard, silo)
            .waiting_for([first, second])
            .with_min_amount(6.0)
            .boxed()],
    )?;
    Ok(sim)
}

/// More cargo than storage: the last loads never fit and the trucks queue
/// at the warehouse until the turn cap stops the run
pub fn congested(sink: Arc<dyn EventSink>) -> Result<Simulation> {
    let mut sim = Simulation::with_event_sink(sink);
    let quarry = sim.add_field("Quarry", Position::new(0.0, 0.0), 30.0)?;
    let yard = sim.add_warehouse("Yard", Position::new(5.0, 0.0), Some(18.0))?;
    for (i, start) in [Position::new(0.0, 2.0), Position::new(0.0, -2.0)]
        .into_iter()
        .enumerate()
    {
        let truck = sim.add_transporter(format!("Dumper {}", i + 1), start, 1.0, 7.0)?;
        sim.assign_tasks(truck, vec![OneWayGathering::new(quarry, yard).boxed()])?;
    }
    Ok(sim)
}

fn random_position(rng: &mut StdRng) -> Position {
    Position::new(rng.random_range(0.0..40.0), rng.random_range(0.0..25.0))
}

/// Randomly laid out world, reproducible from `seed`
pub fn random(seed: u64, sink: Arc<dyn EventSink>) -> Result<Simulation> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sim = Simulation::with_event_sink(sink);

    let field_count = rng.random_range(2..=4);
    let mut fields = Vec::with_capacity(field_count);
    for i in 0..field_count {
        let position = random_position(&mut rng);
        let resources = rng.random_range(5..=40) as f64;
        fields.push(sim.add_field(format!("Field {}", i + 1), position, resources)?);
    }

    let warehouse_count = rng.random_range(1..=3);
    let mut warehouses = Vec::with_capacity(warehouse_count);
    for i in 0..warehouse_count {
        let position = random_position(&mut rng);
        let capacity = if rng.random_bool(0.5) {
            None
        } else {
            Some(rng.random_range(60..=120) as f64)
        };
        warehouses.push(sim.add_warehouse(format!("Warehouse {}", i + 1), position, capacity)?);
    }

    let transporter_count = rng.random_range(2..=5);
    for i in 0..transporter_count {
        let position = random_position(&mut rng);
        let speed = rng.random_range(1.0..3.0);
        let capacity = rng.random_range(4..=12) as f64;
        let truck = sim.add_transporter(format!("Truck {}", i + 1), position, speed, capacity)?;

        let task_count = rng.random_range(1..=2);
        let mut tasks: Vec<Box<dyn Task>> = Vec::with_capacity(task_count);
        for _ in 0..task_count {
            let field = fields[rng.random_range(0..fields.len())];
            let warehouse = warehouses[rng.random_range(0..warehouses.len())];
            tasks.push(OneWayGathering::new(field, warehouse).boxed());
        }
        sim.assign_tasks(truck, tasks)?;
    }
    Ok(sim)
}
