//! ASCII map rendering of world snapshots

use freight_sim::simulation::{
    AsciiRenderer, DepotView, Position, TransporterView, WorldSnapshot, MAX_MAP_HEIGHT,
    MAX_MAP_WIDTH,
};

fn depot(name: &str, x: f64, y: f64, capacity: Option<f64>) -> DepotView {
    DepotView {
        name: name.to_string(),
        position: Position::new(x, y),
        resources: 5.0,
        capacity,
    }
}

fn world(warehouse_x: f64, warehouse_y: f64) -> WorldSnapshot {
    WorldSnapshot {
        time: 3,
        fields: vec![depot("Farm", 0.0, 0.0, None)],
        warehouses: vec![depot("Depot", warehouse_x, warehouse_y, Some(10.0))],
        transporters: vec![TransporterView {
            name: "Truck".to_string(),
            position: Position::new(1.0, 1.0),
            loaded: 2.0,
            max_capacity: 10.0,
        }],
    }
}

/// Rows of the character map, between the legend and the detail lines
fn map_rows(rendered: &str) -> Vec<&str> {
    rendered
        .lines()
        .skip_while(|line| !line.starts_with("Legend"))
        .skip(1)
        .take_while(|line| !line.starts_with("  "))
        .collect()
}

#[test]
fn test_default_map_layout() {
    let rendered = AsciiRenderer::default().render(&world(6.0, 8.0));
    assert!(rendered.starts_with("=== Time: 3 ==="));

    let rows = map_rows(&rendered);
    // 8 units tall and 6 wide plus 2 padding on every side
    assert_eq!(rows.len(), 13);
    assert!(rows.iter().all(|row| row.chars().count() == 11));
    assert!(rendered.contains('F'));
    assert!(rendered.contains('W'));
    assert!(rendered.contains('T'));
    assert!(rendered.contains("W Depot at [6.0, 8.0]: resources=5/10"));
}

#[test]
fn test_scale_widens_map() {
    let rendered = AsciiRenderer::new(2.0).render(&world(6.0, 8.0));
    let rows = map_rows(&rendered);
    assert_eq!(rows.len(), 25);
    assert!(rows.iter().all(|row| row.chars().count() == 21));
}

#[test]
fn test_far_apart_world_is_scaled_down() {
    let rendered = AsciiRenderer::default().render(&world(1e10, 0.0));
    let rows = map_rows(&rendered);

    assert!(!rows.is_empty());
    assert!(rows.len() <= MAX_MAP_HEIGHT + 1);
    assert!(rows
        .iter()
        .all(|row| row.chars().count() <= MAX_MAP_WIDTH + 1));
    assert!(rows.iter().any(|row| row.contains('W')));
}

#[test]
fn test_empty_world() {
    let snapshot = WorldSnapshot {
        time: 0,
        fields: Vec::new(),
        warehouses: Vec::new(),
        transporters: Vec::new(),
    };
    let rendered = AsciiRenderer::default().render(&snapshot);
    assert_eq!(rendered, "=== Time: 0 ===\n(empty world)\n");
}
