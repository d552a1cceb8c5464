//! Terminal rendering of world snapshots

use std::fmt::Write;

use super::observer::WorldSnapshot;
use super::types::Position;

/// Widest map drawn, in characters; larger worlds are scaled down to fit
pub const MAX_MAP_WIDTH: usize = 120;

/// Tallest map drawn, in rows
pub const MAX_MAP_HEIGHT: usize = 60;

/// Draws a [`WorldSnapshot`] as a character map followed by a legend
#[derive(Debug, Clone, Copy)]
pub struct AsciiRenderer {
    /// Characters per world unit
    pub scale: f64,
    /// World units of empty border around the outermost entity
    pub padding: f64,
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self {
            scale: 1.0,
            padding: 2.0,
        }
    }
}

impl AsciiRenderer {
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    pub fn render(&self, snapshot: &WorldSnapshot) -> String {
        let positions: Vec<Position> = snapshot
            .fields
            .iter()
            .map(|f| f.position)
            .chain(snapshot.warehouses.iter().map(|w| w.position))
            .chain(snapshot.transporters.iter().map(|t| t.position))
            .collect();

        let mut out = String::new();
        let _ = writeln!(out, "=== Time: {} ===", snapshot.time);

        if positions.is_empty() {
            out.push_str("(empty world)\n");
            return out;
        }

        // Find bounds of the world
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for pos in &positions {
            min_x = min_x.min(pos.x);
            max_x = max_x.max(pos.x);
            min_y = min_y.min(pos.y);
            max_y = max_y.max(pos.y);
        }
        min_x -= self.padding;
        max_x += self.padding;
        min_y -= self.padding;
        max_y += self.padding;

        let scale = self
            .scale
            .min(MAX_MAP_WIDTH as f64 / (max_x - min_x))
            .min(MAX_MAP_HEIGHT as f64 / (max_y - min_y));
        let width = (((max_x - min_x) * scale) as usize + 1).min(MAX_MAP_WIDTH + 1);
        let height = (((max_y - min_y) * scale) as usize + 1).min(MAX_MAP_HEIGHT + 1);
        let mut grid = vec![vec!['.'; width]; height];

        // Y grows upwards, rows grow downwards
        let to_grid = |pos: &Position| -> (usize, usize) {
            let col = ((pos.x - min_x) * scale).round() as usize;
            let row = ((max_y - pos.y) * scale).round() as usize;
            (row.min(height - 1), col.min(width - 1))
        };

        for field in &snapshot.fields {
            let (row, col) = to_grid(&field.position);
            grid[row][col] = 'F';
        }
        for warehouse in &snapshot.warehouses {
            let (row, col) = to_grid(&warehouse.position);
            grid[row][col] = if grid[row][col] == 'F' { '#' } else { 'W' };
        }
        // Transporters only show on open ground so depots stay visible
        for transporter in &snapshot.transporters {
            let (row, col) = to_grid(&transporter.position);
            if grid[row][col] == '.' {
                grid[row][col] = 'T';
            }
        }

        out.push_str("Legend: F=Field, W=Warehouse, #=Field+Warehouse, T=Transporter\n");
        for row in &grid {
            let line: String = row.iter().collect();
            out.push_str(&line);
            out.push('\n');
        }

        for field in &snapshot.fields {
            let _ = writeln!(
                out,
                "  F {} at {}: resources={}",
                field.name, field.position, field.resources
            );
        }
        for warehouse in &snapshot.warehouses {
            let capacity = warehouse
                .capacity
                .map_or_else(|| "unlimited".to_string(), |c| c.to_string());
            let _ = writeln!(
                out,
                "  W {} at {}: resources={}/{}",
                warehouse.name, warehouse.position, warehouse.resources, capacity
            );
        }
        for transporter in &snapshot.transporters {
            let _ = writeln!(
                out,
                "  T {} at {}: loaded={}/{}",
                transporter.name, transporter.position, transporter.loaded, transporter.max_capacity
            );
        }
        out
    }
}
