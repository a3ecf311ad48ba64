//! # Burrow
//!
//! Grid placement and production composition engine for a dungeon base-building game.
//!
//! ## Architecture Overview
//!
//! Players place polyomino-shaped rooms on a fixed tile grid per floor, staff
//! them with creatures, and every simulated tick the engine works out how much
//! of each resource every room produces. The crate is organised around a few
//! concepts:
//!
//! - **Grid**: tile occupancy, room shapes, placement validation and adjacency
//! - **World**: floors, placed rooms, inhabitants, hallways and connections
//! - **Catalog**: read-only content definitions keyed by id, loaded from JSON
//! - **Production**: the ordered modifier chain that turns base rates into output
//! - **Ledger**: the capped resource store the per-tick income pass folds into
//!
//! Every operation that changes a floor returns a new [`Floor`] value and leaves
//! its input untouched, so a preview placement can never corrupt the
//! authoritative state.

pub mod catalog;
pub mod grid;
pub mod ledger;
pub mod production;
pub mod sandbox;
pub mod world;

pub use catalog::*;
pub use grid::*;
pub use ledger::*;
pub use production::*;
pub use sandbox::*;
pub use world::*;

/// Core error type for the Burrow engine.
#[derive(thiserror::Error, Debug)]
pub enum BurrowError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Catalog content is inconsistent
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A room could not be placed
    #[error("{0}")]
    Placement(#[from] PlacementRejection),

    /// An upgrade could not be applied
    #[error("{0}")]
    Upgrade(#[from] UpgradeError),

    /// Referenced entity is not on the floor
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The ledger cannot pay a cost
    #[error("Not enough resources: {0}")]
    InsufficientResources(String),

    /// A connection request was rejected
    #[error("Invalid connection: {0}")]
    InvalidConnection(String),
}

/// Result type used throughout the Burrow codebase.
pub type BurrowResult<T> = Result<T, BurrowError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine configuration constants.
pub mod config {
    /// Width and height of every floor grid in tiles
    pub const GRID_SIZE: i32 = 20;

    /// Production bonus added per floor of depth
    pub const DEPTH_BONUS_PER_LEVEL: f64 = 0.05;

    /// Simulation ticks per in-game minute, used for display rates
    pub const TICKS_PER_MINUTE: f64 = 5.0;

    /// Fear tolerance assumed when a creature definition omits one
    pub const DEFAULT_FEAR_TOLERANCE: i32 = 2;

    /// Worker efficiency assumed when a creature definition is unknown
    pub const DEFAULT_WORKER_EFFICIENCY: f64 = 1.0;

    /// Corruption needed before dark upgrades unlock
    pub const DARK_UPGRADE_CORRUPTION_THRESHOLD: f64 = 50.0;

    /// First hour (inclusive) counted as night
    pub const NIGHT_START_HOUR: u32 = 18;

    /// First hour (inclusive) counted as day
    pub const DAY_START_HOUR: u32 = 6;
}
