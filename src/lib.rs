//! Freight Simulation Library
//!
//! A turn-based logistics simulation: transporters gather resources from
//! fields and deliver them to capacity-bounded warehouses.

pub mod simulation;
