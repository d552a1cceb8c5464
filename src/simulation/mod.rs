//! Turn-based freight simulation
//!
//! Transporters shuttle resources from fields to warehouses, one action per
//! turn, driven by the tasks queued on them. Nothing in here depends on how
//! the results are displayed; observers and event sinks plug in from outside.

mod building;
mod error;
mod events;
mod observer;
mod render;
mod report;
pub mod scenario;
mod task;
mod transporter;
mod types;
mod world;

pub use building::{Depots, Field, Warehouse};
pub use error::{TransferError, TransferResult};
pub use events::{Event, EventLogger, EventSink, LogSink, MemorySink, NoopSink};
pub use observer::{
    DepotView, FrameRecorder, NoopObserver, SimObserver, TransporterView, WorldSnapshot,
};
pub use render::{AsciiRenderer, MAX_MAP_HEIGHT, MAX_MAP_WIDTH};
pub use report::Report;
pub use task::{FleetStatus, OneWayGathering, Phase, Task, TurnContext, TurnOutcome};
pub use transporter::{Transporter, DEFAULT_MAX_CAPACITY, DEFAULT_SPEED};
pub use types::{FieldId, Position, SimId, TransporterId, WarehouseId, POSITION_EPSILON};
pub use world::Simulation;
