//! Depot types for the freight simulation
//!
//! Fields produce resources, warehouses store them. Both are passive: only
//! a transporter's load/unload changes their stock.

use std::collections::HashMap;

use anyhow::{bail, Result};

use super::types::{FieldId, Position, WarehouseId};

/// A stationary resource source
#[derive(Debug, Clone)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub position: Position,
    /// Remaining stock, only ever decreases
    pub resources: f64,
}

impl Field {
    pub fn new(id: FieldId, name: impl Into<String>, position: Position, resources: f64) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            resources,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.resources <= 0.0
    }
}

/// A stationary resource sink
#[derive(Debug, Clone)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub position: Position,
    /// Maximum stock, `None` for unlimited storage
    pub capacity: Option<f64>,
    /// Current stock, never above `capacity`
    pub resources: f64,
}

impl Warehouse {
    pub fn new(
        id: WarehouseId,
        name: impl Into<String>,
        position: Position,
        capacity: Option<f64>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            capacity,
            resources: 0.0,
        }
    }

    /// Start the warehouse with some stock already on hand
    pub fn with_stock(mut self, stock: f64) -> Result<Self> {
        if stock < 0.0 {
            bail!("Warehouse '{}' cannot start with negative stock", self.name);
        }
        if let Some(capacity) = self.capacity {
            if stock > capacity {
                bail!(
                    "Warehouse '{}' cannot start with {} units, capacity is {}",
                    self.name,
                    stock,
                    capacity
                );
            }
        }
        self.resources = stock;
        Ok(self)
    }

    pub fn has_free_space(&self) -> bool {
        match self.free_capacity() {
            None => true,
            Some(free) => free > 0.0,
        }
    }

    /// Remaining room, or `None` when the warehouse is unbounded
    pub fn free_capacity(&self) -> Option<f64> {
        self.capacity.map(|capacity| capacity - self.resources)
    }
}

/// Registry of every field and warehouse in a simulation
///
/// Tasks refer to depots by id and borrow them from here for the duration
/// of a single turn.
#[derive(Debug, Clone, Default)]
pub struct Depots {
    pub fields: HashMap<FieldId, Field>,
    pub warehouses: HashMap<WarehouseId, Warehouse>,
}

impl Depots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(&id)
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.fields.get_mut(&id)
    }

    pub fn warehouse(&self, id: WarehouseId) -> Option<&Warehouse> {
        self.warehouses.get(&id)
    }

    pub fn warehouse_mut(&mut self, id: WarehouseId) -> Option<&mut Warehouse> {
        self.warehouses.get_mut(&id)
    }

    /// Fields ordered by id, for stable output
    pub fn sorted_fields(&self) -> Vec<&Field> {
        let mut fields: Vec<&Field> = self.fields.values().collect();
        fields.sort_by_key(|f| f.id);
        fields
    }

    /// Warehouses ordered by id, for stable output
    pub fn sorted_warehouses(&self) -> Vec<&Warehouse> {
        let mut warehouses: Vec<&Warehouse> = self.warehouses.values().collect();
        warehouses.sort_by_key(|w| w.id);
        warehouses
    }

    pub fn total_field_resources(&self) -> f64 {
        self.fields.values().map(|f| f.resources).sum()
    }

    pub fn total_warehouse_resources(&self) -> f64 {
        self.warehouses.values().map(|w| w.resources).sum()
    }
}
