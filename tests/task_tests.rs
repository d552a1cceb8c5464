//! One-way gathering task, driven turn by turn outside the simulation loop

use std::collections::HashSet;

use freight_sim::simulation::{
    Depots, Field, FieldId, OneWayGathering, Phase, Position, SimId, Task, Transporter,
    TransporterId, TurnContext, TurnOutcome, Warehouse, WarehouseId,
};

const FIELD: FieldId = FieldId(SimId(0));
const WAREHOUSE: WarehouseId = WarehouseId(SimId(1));
const TRUCK: TransporterId = TransporterId(SimId(2));
const HELPER: TransporterId = TransporterId(SimId(3));

/// Field at the origin, warehouse at `warehouse_x` on the x axis
fn farm_and_depot(field_resources: f64, warehouse_x: f64, capacity: Option<f64>) -> Depots {
    let mut depots = Depots::new();
    depots.fields.insert(
        FIELD,
        Field::new(FIELD, "Farm", Position::new(0.0, 0.0), field_resources),
    );
    depots.warehouses.insert(
        WAREHOUSE,
        Warehouse::new(WAREHOUSE, "Depot", Position::new(warehouse_x, 0.0), capacity),
    );
    depots
}

fn new_truck() -> Transporter {
    Transporter::new(TRUCK, "Truck", Position::new(0.0, 0.0))
}

fn turn(
    task: &mut OneWayGathering,
    truck: &mut Transporter,
    depots: &mut Depots,
    working: &HashSet<TransporterId>,
) -> TurnOutcome {
    let mut ctx = TurnContext::new(depots, working);
    task.work(truck, &mut ctx).expect("turn should not fail")
}

#[test]
fn test_full_cycle_phases() {
    let mut depots = farm_and_depot(5.0, 2.0, None);
    let mut truck = new_truck();
    let mut task = OneWayGathering::new(FIELD, WAREHOUSE);
    let idle = HashSet::new();

    assert_eq!(turn(&mut task, &mut truck, &mut depots, &idle), TurnOutcome::Continue);
    assert_eq!(task.phase(), Phase::Loading);
    assert_eq!(truck.loaded, 5.0);

    assert_eq!(turn(&mut task, &mut truck, &mut depots, &idle), TurnOutcome::Continue);
    assert_eq!(task.phase(), Phase::MovingToDestination);
    assert_eq!(turn(&mut task, &mut truck, &mut depots, &idle), TurnOutcome::Continue);
    assert_eq!(task.phase(), Phase::MovingToDestination);

    assert_eq!(turn(&mut task, &mut truck, &mut depots, &idle), TurnOutcome::Yield);
    assert_eq!(task.phase(), Phase::Completed);
    assert!(task.is_completed());
    assert_eq!(truck.loaded, 0.0);
    assert_eq!(depots.warehouse(WAREHOUSE).map(|w| w.resources), Some(5.0));
    assert_eq!(task.turns_taken(), 3);
}

#[test]
fn test_completed_task_stays_completed() {
    let mut depots = farm_and_depot(5.0, 0.0, None);
    let mut truck = new_truck();
    let mut task = OneWayGathering::new(FIELD, WAREHOUSE);
    let idle = HashSet::new();

    turn(&mut task, &mut truck, &mut depots, &idle);
    assert_eq!(turn(&mut task, &mut truck, &mut depots, &idle), TurnOutcome::Yield);
    assert!(task.is_completed());
    let turns = task.turns_taken();
    let position = truck.position;

    assert_eq!(turn(&mut task, &mut truck, &mut depots, &idle), TurnOutcome::Yield);
    assert!(task.is_completed());
    assert_eq!(task.turns_taken(), turns);
    assert_eq!(truck.position, position);
}

#[test]
fn test_moves_to_source_first() {
    let mut depots = farm_and_depot(5.0, 0.0, None);
    let mut truck = Transporter::new(TRUCK, "Truck", Position::new(0.0, 2.0));
    let mut task = OneWayGathering::new(FIELD, WAREHOUSE);
    let idle = HashSet::new();

    assert_eq!(turn(&mut task, &mut truck, &mut depots, &idle), TurnOutcome::Continue);
    assert_eq!(task.phase(), Phase::MovingToSource);
    assert_eq!(truck.position, Position::new(0.0, 1.0));
    assert_eq!(truck.loaded, 0.0);
}

#[test]
fn test_empty_source_completes_immediately() {
    let mut depots = farm_and_depot(0.0, 4.0, None);
    let mut truck = new_truck();
    let mut task = OneWayGathering::new(FIELD, WAREHOUSE);
    let idle = HashSet::new();

    assert_eq!(turn(&mut task, &mut truck, &mut depots, &idle), TurnOutcome::Yield);
    assert!(task.is_completed());
    assert_eq!(task.turns_taken(), 0);
}

#[test]
fn test_storage_full_waits_every_turn() {
    let mut depots = farm_and_depot(10.0, 0.0, Some(10.0));
    if let Some(warehouse) = depots.warehouse_mut(WAREHOUSE) {
        warehouse.resources = 10.0;
    }
    let mut truck = new_truck();
    let mut task = OneWayGathering::new(FIELD, WAREHOUSE);
    let idle = HashSet::new();

    turn(&mut task, &mut truck, &mut depots, &idle);
    assert_eq!(truck.loaded, 10.0);

    for expected in 1..=3 {
        assert_eq!(turn(&mut task, &mut truck, &mut depots, &idle), TurnOutcome::Continue);
        assert_eq!(task.phase(), Phase::WaitingForStorage);
        assert_eq!(task.turns_waiting_for_storage(), expected);
        assert_eq!(truck.loaded, 10.0);
    }

    // Space frees up
    if let Some(warehouse) = depots.warehouse_mut(WAREHOUSE) {
        warehouse.resources = 0.0;
    }
    assert_eq!(turn(&mut task, &mut truck, &mut depots, &idle), TurnOutcome::Yield);
    assert_eq!(task.turns_waiting_for_storage(), 0);
    assert_eq!(truck.loaded, 0.0);
    assert!(task.is_completed());
}

#[test]
fn test_waits_for_active_dependency_at_empty_source() {
    let mut depots = farm_and_depot(0.0, 4.0, None);
    let mut truck = new_truck();
    let mut task = OneWayGathering::new(FIELD, WAREHOUSE).waiting_for([HELPER]);
    let busy: HashSet<TransporterId> = [HELPER].into_iter().collect();

    for _ in 0..3 {
        assert_eq!(turn(&mut task, &mut truck, &mut depots, &busy), TurnOutcome::Continue);
        assert_eq!(task.phase(), Phase::WaitingForCargo);
        assert!(!task.is_completed());
        assert_eq!(truck.position, Position::new(0.0, 0.0));
    }
    assert_eq!(task.turns_taken(), 3);

    let idle = HashSet::new();
    assert_eq!(turn(&mut task, &mut truck, &mut depots, &idle), TurnOutcome::Yield);
    assert!(task.is_completed());
}

#[test]
fn test_dependency_keeps_task_alive_after_drained_delivery() {
    let mut depots = farm_and_depot(5.0, 0.0, None);
    let mut truck = new_truck();
    let mut task = OneWayGathering::new(FIELD, WAREHOUSE).waiting_for([HELPER]);
    let busy: HashSet<TransporterId> = [HELPER].into_iter().collect();

    turn(&mut task, &mut truck, &mut depots, &busy);
    assert_eq!(task.phase(), Phase::Loading);

    // Source is now empty but the helper is still out
    assert_eq!(turn(&mut task, &mut truck, &mut depots, &busy), TurnOutcome::Continue);
    assert_eq!(task.phase(), Phase::Unloading);
    assert!(!task.is_completed());

    assert_eq!(turn(&mut task, &mut truck, &mut depots, &busy), TurnOutcome::Continue);
    assert_eq!(task.phase(), Phase::WaitingForCargo);

    // Stock topped up by hand while the helper is still out
    if let Some(field) = depots.field_mut(FIELD) {
        field.resources = 2.0;
    }
    assert_eq!(turn(&mut task, &mut truck, &mut depots, &busy), TurnOutcome::Continue);
    assert_eq!(task.phase(), Phase::Loading);
    assert_eq!(truck.loaded, 2.0);

    let idle = HashSet::new();
    assert_eq!(turn(&mut task, &mut truck, &mut depots, &idle), TurnOutcome::Yield);
    assert!(task.is_completed());
    assert_eq!(depots.warehouse(WAREHOUSE).map(|w| w.resources), Some(7.0));
}

#[test]
fn test_min_amount_threshold_only_while_dependencies_work() {
    let mut depots = farm_and_depot(4.0, 3.0, None);
    let mut truck = new_truck();
    let mut task = OneWayGathering::new(FIELD, WAREHOUSE)
        .waiting_for([HELPER])
        .with_min_amount(6.0);
    let busy: HashSet<TransporterId> = [HELPER].into_iter().collect();

    assert_eq!(turn(&mut task, &mut truck, &mut depots, &busy), TurnOutcome::Continue);
    assert_eq!(task.phase(), Phase::WaitingForThreshold);
    assert_eq!(truck.loaded, 0.0);

    if let Some(field) = depots.field_mut(FIELD) {
        field.resources = 8.0;
    }
    turn(&mut task, &mut truck, &mut depots, &busy);
    assert_eq!(task.phase(), Phase::Loading);
    assert_eq!(truck.loaded, 8.0);

    // Without active dependencies the threshold no longer applies
    let mut depots = farm_and_depot(4.0, 3.0, None);
    let mut truck = new_truck();
    let mut task = OneWayGathering::new(FIELD, WAREHOUSE)
        .waiting_for([HELPER])
        .with_min_amount(6.0);
    let idle = HashSet::new();
    turn(&mut task, &mut truck, &mut depots, &idle);
    assert_eq!(task.phase(), Phase::Loading);
    assert_eq!(truck.loaded, 4.0);
}

#[test]
fn test_check_references() {
    let depots = farm_and_depot(5.0, 1.0, None);
    let fleet = [TRUCK, HELPER];

    assert!(OneWayGathering::new(FIELD, WAREHOUSE)
        .waiting_for([HELPER])
        .check_references(TRUCK, &depots, &fleet)
        .is_ok());
    assert!(OneWayGathering::new(FIELD, WAREHOUSE)
        .waiting_for([TRUCK])
        .check_references(TRUCK, &depots, &fleet)
        .is_err());
    assert!(OneWayGathering::new(FieldId(SimId(99)), WAREHOUSE)
        .check_references(TRUCK, &depots, &fleet)
        .is_err());
    assert!(OneWayGathering::new(FIELD, WarehouseId(SimId(99)))
        .check_references(TRUCK, &depots, &fleet)
        .is_err());
    assert!(OneWayGathering::new(FIELD, WAREHOUSE)
        .waiting_for([TransporterId(SimId(42))])
        .check_references(TRUCK, &depots, &fleet)
        .is_err());
}

#[test]
fn test_builder_settings_are_kept() {
    let task = OneWayGathering::new(FIELD, WAREHOUSE)
        .waiting_for([HELPER])
        .with_min_amount(6.0);

    assert_eq!(task.gather_from(), FIELD);
    assert_eq!(task.deliver_to(), WAREHOUSE);
    assert_eq!(task.wait_for(), &[HELPER]);
    assert_eq!(task.min_amount(), 6.0);
    assert_eq!(task.phase(), Phase::MovingToSource);
    assert!(!task.is_completed());

    let plain = OneWayGathering::new(FIELD, WAREHOUSE);
    assert!(plain.wait_for().is_empty());
    assert_eq!(plain.min_amount(), 0.0);
}
