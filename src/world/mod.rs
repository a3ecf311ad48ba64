//! # World Module
//!
//! Floors and everything placed on them.
//!
//! A [`Floor`] owns its [`Grid`], the ordered list of [`PlacedRoom`]s and the
//! inhabitants, hallways and connections that reference those rooms. Floors
//! are plain values: operations that change one hand back a new floor.

pub mod inhabitants;

pub use inhabitants::*;

use crate::catalog::{RoomTypeId, UpgradePathId};
use crate::grid::{Grid, Position, ShapeId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for placed entities (rooms, hallways, inhabitants).
pub type EntityId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

/// Environmental biome of a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Biome {
    #[default]
    Neutral,
    Volcanic,
    Flooded,
    Crystal,
    Corrupted,
    Fungal,
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Biome::Neutral => "neutral",
            Biome::Volcanic => "volcanic",
            Biome::Flooded => "flooded",
            Biome::Crystal => "crystal",
            Biome::Corrupted => "corrupted",
            Biome::Fungal => "fungal",
        };
        f.write_str(name)
    }
}

/// A room instance on a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedRoom {
    /// Unique identifier for the lifetime of the floor
    pub id: EntityId,
    /// Catalog room type
    pub room_type_id: RoomTypeId,
    /// Catalog shape the footprint is built from
    pub shape_id: ShapeId,
    /// Grid position the shape offsets are translated by
    pub anchor: Position,
    /// Upgrade path chosen for this room; set at most once
    #[serde(default)]
    pub applied_upgrade_path_id: Option<UpgradePathId>,
    /// Elevator/portal/stair this room is linked to, owned by transport
    #[serde(default)]
    pub transport_link_id: Option<EntityId>,
    /// Installed room features
    #[serde(default)]
    pub feature_ids: Vec<String>,
}

impl PlacedRoom {
    /// Creates an unupgraded room with a fresh id.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{PlacedRoom, Position};
    ///
    /// let room = PlacedRoom::new("crystal-mine", "square-2", Position::new(3, 3));
    /// assert_eq!(room.room_type_id, "crystal-mine");
    /// assert!(room.applied_upgrade_path_id.is_none());
    /// ```
    pub fn new(
        room_type_id: impl Into<RoomTypeId>,
        shape_id: impl Into<ShapeId>,
        anchor: Position,
    ) -> Self {
        Self {
            id: new_entity_id(),
            room_type_id: room_type_id.into(),
            shape_id: shape_id.into(),
            anchor,
            applied_upgrade_path_id: None,
            transport_link_id: None,
            feature_ids: Vec::new(),
        }
    }

    /// Whether an upgrade path has been applied.
    pub fn is_upgraded(&self) -> bool {
        self.applied_upgrade_path_id.is_some()
    }
}

/// A corridor segment occupying grid tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hallway {
    pub id: EntityId,
    pub tiles: Vec<Position>,
}

impl Hallway {
    /// Creates a hallway with a fresh id.
    pub fn new(tiles: Vec<Position>) -> Self {
        Self {
            id: new_entity_id(),
            tiles,
        }
    }
}

/// A player-made link between two adjacent entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: EntityId,
    pub entity_a: EntityId,
    pub entity_b: EntityId,
}

impl Connection {
    /// Creates a connection with a fresh id.
    pub fn new(entity_a: EntityId, entity_b: EntityId) -> Self {
        Self {
            id: new_entity_id(),
            entity_a,
            entity_b,
        }
    }

    /// Whether this connection has `entity_id` at either end.
    pub fn involves(&self, entity_id: EntityId) -> bool {
        self.entity_a == entity_id || self.entity_b == entity_id
    }

    /// The end opposite `entity_id`, if it is one of the ends.
    pub fn other_end(&self, entity_id: EntityId) -> Option<EntityId> {
        if self.entity_a == entity_id {
            Some(self.entity_b)
        } else if self.entity_b == entity_id {
            Some(self.entity_a)
        } else {
            None
        }
    }

    /// Whether this connection links exactly `a` and `b`, in either order.
    pub fn links(&self, a: EntityId, b: EntityId) -> bool {
        (self.entity_a == a && self.entity_b == b) || (self.entity_a == b && self.entity_b == a)
    }
}

/// One dungeon floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    /// Depth below the surface, 0 for the first floor
    pub depth: u32,
    /// Environmental biome
    #[serde(default)]
    pub biome: Biome,
    /// Tile occupancy; kept in lockstep with `rooms` and `hallways`
    pub grid: Grid,
    /// Rooms in placement order
    #[serde(default)]
    pub rooms: Vec<PlacedRoom>,
    /// Creatures living on this floor
    #[serde(default)]
    pub inhabitants: Vec<InhabitantInstance>,
    #[serde(default)]
    pub hallways: Vec<Hallway>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Floor {
    /// Creates an empty floor.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{Biome, Floor};
    ///
    /// let floor = Floor::new(0, Biome::Neutral);
    /// assert!(floor.rooms.is_empty());
    /// assert_eq!(floor.grid.occupied_count(), 0);
    /// ```
    pub fn new(depth: u32, biome: Biome) -> Self {
        Self {
            depth,
            biome,
            grid: Grid::new(),
            rooms: Vec::new(),
            inhabitants: Vec::new(),
            hallways: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Finds a room by id.
    pub fn room(&self, room_id: EntityId) -> Option<&PlacedRoom> {
        self.rooms.iter().find(|room| room.id == room_id)
    }

    /// Finds a hallway by id.
    pub fn hallway(&self, hallway_id: EntityId) -> Option<&Hallway> {
        self.hallways.iter().find(|hallway| hallway.id == hallway_id)
    }

    /// Whether a room or hallway with this id is on the floor.
    pub fn contains_entity(&self, entity_id: EntityId) -> bool {
        self.room(entity_id).is_some() || self.hallway(entity_id).is_some()
    }

    /// Inhabitants assigned to the given room.
    pub fn inhabitants_in(&self, room_id: EntityId) -> Vec<&InhabitantInstance> {
        self.inhabitants
            .iter()
            .filter(|inhabitant| inhabitant.assigned_room_id == Some(room_id))
            .collect()
    }

    /// Returns a copy with `room` replacing the room of the same id.
    ///
    /// Returns `None` when no room with that id is on the floor.
    pub fn with_room_replaced(&self, room: PlacedRoom) -> Option<Floor> {
        let index = self.rooms.iter().position(|existing| existing.id == room.id)?;
        let mut floor = self.clone();
        floor.rooms[index] = room;
        Some(floor)
    }

    /// Returns a copy with the inhabitant added.
    pub fn with_inhabitant(&self, inhabitant: InhabitantInstance) -> Floor {
        let mut floor = self.clone();
        floor.inhabitants.push(inhabitant);
        floor
    }
}
