//! # Catalog Module
//!
//! Read-only content definitions keyed by id.
//!
//! Rooms, shapes, creatures and upgrade paths are authored as data and loaded
//! from JSON. Lookups return `Option`: a stale id after a content patch is a
//! normal situation that every consumer maps to a neutral default.

use crate::grid::{RoomShape, ShapeId};
use crate::ledger::{ResourceMap, ResourceType};
use crate::production::StateModifier;
use crate::world::{InhabitantState, PlacedRoom};
use crate::{config, BurrowError, BurrowResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Catalog identifier of a room type.
pub type RoomTypeId = String;

/// Catalog identifier of an upgrade path.
pub type UpgradePathId = String;

/// Catalog identifier of a creature definition.
pub type CreatureId = String;

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

/// How frightening a room is to the creatures working in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FearLevelRepr", into = "FearLevelRepr")]
pub enum FearLevel {
    /// A fixed fear value
    Fixed(i32),
    /// Fear decided at runtime by the room's occupants
    Variable,
}

impl Default for FearLevel {
    fn default() -> Self {
        FearLevel::Fixed(0)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FearLevelRepr {
    Level(i32),
    Named(String),
}

impl TryFrom<FearLevelRepr> for FearLevel {
    type Error = String;

    fn try_from(repr: FearLevelRepr) -> Result<Self, Self::Error> {
        match repr {
            FearLevelRepr::Level(level) => Ok(FearLevel::Fixed(level)),
            FearLevelRepr::Named(name) if name == "variable" => Ok(FearLevel::Variable),
            FearLevelRepr::Named(name) => Err(format!("unknown fear level \"{}\"", name)),
        }
    }
}

impl From<FearLevel> for FearLevelRepr {
    fn from(level: FearLevel) -> Self {
        match level {
            FearLevel::Fixed(level) => FearLevelRepr::Level(level),
            FearLevel::Variable => FearLevelRepr::Named("variable".to_string()),
        }
    }
}

/// Production bonus a room gets from a neighbouring room type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyBonus {
    pub adjacent_room_type_id: RoomTypeId,
    pub bonus: f64,
}

/// One effect of an upgrade path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UpgradeEffect {
    /// Multiplies the output of one resource
    ProductionMultiplier { resource: ResourceType, value: f64 },
    /// Raises the room's inhabitant cap
    MaxInhabitantBonus { value: i32 },
    /// Lowers the room's fear level
    FearReduction { value: i32 },
    /// Raises the room's fear level
    FearIncrease { value: i32 },
    /// Adds output of another resource proportional to base production
    SecondaryProduction { resource: ResourceType, value: f64 },
    BreedingTimeMultiplier { value: f64 },
    MutationOddsBonus { value: f64 },
    MutationStatBonus { value: f64 },
}

/// A permanent, exclusive enhancement choice for a room type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomUpgradePath {
    pub id: UpgradePathId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cost: ResourceMap,
    #[serde(default)]
    pub effects: Vec<UpgradeEffect>,
    /// Only offered once dark upgrades are unlocked
    #[serde(default)]
    pub requires_dark_upgrade: bool,
}

/// Catalog entry describing a room type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDefinition {
    pub id: RoomTypeId,
    pub name: String,
    pub shape_id: ShapeId,
    /// Base output per tick
    #[serde(default)]
    pub production: ResourceMap,
    /// Whether the room produces nothing without an assigned worker
    #[serde(default)]
    pub requires_workers: bool,
    /// Inhabitant cap, `-1` for unlimited
    pub max_inhabitants: i32,
    #[serde(default)]
    pub adjacency_bonuses: Vec<AdjacencyBonus>,
    #[serde(default)]
    pub upgrade_paths: Vec<RoomUpgradePath>,
    #[serde(default)]
    pub fear_level: FearLevel,
    /// At most one room of this type may exist across all floors
    #[serde(default)]
    pub unique: bool,
}

fn default_worker_efficiency() -> f64 {
    config::DEFAULT_WORKER_EFFICIENCY
}

/// Catalog entry describing a creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureDefinition {
    pub id: CreatureId,
    pub name: String,
    /// Labor output relative to a baseline worker
    #[serde(default = "default_worker_efficiency")]
    pub worker_efficiency: f64,
    /// Highest room fear level this creature works in without getting scared
    #[serde(default)]
    pub fear_tolerance: Option<i32>,
    /// Per-state overrides of the default state modifiers
    #[serde(default)]
    pub state_modifiers: BTreeMap<InhabitantState, StateModifier>,
}

/// On-disk layout of a catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub shapes: Vec<RoomShape>,
    #[serde(default)]
    pub rooms: Vec<RoomDefinition>,
    #[serde(default)]
    pub creatures: Vec<CreatureDefinition>,
}

/// Indexed, read-only content catalog.
#[derive(Debug, Clone, Default)]
pub struct ContentCatalog {
    rooms: HashMap<RoomTypeId, RoomDefinition>,
    shapes: HashMap<ShapeId, RoomShape>,
    creatures: HashMap<CreatureId, CreatureDefinition>,
    upgrade_owners: HashMap<UpgradePathId, RoomTypeId>,
}

impl ContentCatalog {
    /// Builds and validates a catalog from its definitions.
    ///
    /// Duplicate ids, duplicate upgrade path ids and rooms naming an unknown
    /// shape are rejected.
    pub fn from_file(file: CatalogFile) -> BurrowResult<Self> {
        let mut catalog = ContentCatalog::default();

        for shape in file.shapes {
            if catalog.shapes.contains_key(&shape.id) {
                return Err(BurrowError::InvalidCatalog(format!(
                    "duplicate shape id \"{}\"",
                    shape.id
                )));
            }
            catalog.shapes.insert(shape.id.clone(), shape);
        }

        for room in file.rooms {
            if catalog.rooms.contains_key(&room.id) {
                return Err(BurrowError::InvalidCatalog(format!(
                    "duplicate room id \"{}\"",
                    room.id
                )));
            }
            if !catalog.shapes.contains_key(&room.shape_id) {
                return Err(BurrowError::InvalidCatalog(format!(
                    "room \"{}\" uses unknown shape \"{}\"",
                    room.id, room.shape_id
                )));
            }
            for path in &room.upgrade_paths {
                if let Some(owner) = catalog.upgrade_owners.get(&path.id) {
                    return Err(BurrowError::InvalidCatalog(format!(
                        "upgrade path \"{}\" defined by both \"{}\" and \"{}\"",
                        path.id, owner, room.id
                    )));
                }
                catalog
                    .upgrade_owners
                    .insert(path.id.clone(), room.id.clone());
            }
            catalog.rooms.insert(room.id.clone(), room);
        }

        for creature in file.creatures {
            if catalog.creatures.contains_key(&creature.id) {
                return Err(BurrowError::InvalidCatalog(format!(
                    "duplicate creature id \"{}\"",
                    creature.id
                )));
            }
            catalog.creatures.insert(creature.id.clone(), creature);
        }

        log::debug!(
            "Loaded catalog: {} rooms, {} shapes, {} creatures",
            catalog.rooms.len(),
            catalog.shapes.len(),
            catalog.creatures.len()
        );

        Ok(catalog)
    }

    /// Parses a catalog from JSON.
    pub fn from_json(json: &str) -> BurrowResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Reads and parses a catalog JSON file.
    pub fn load_from_path(path: impl AsRef<Path>) -> BurrowResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The catalog shipped with the engine.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::ContentCatalog;
    ///
    /// let catalog = ContentCatalog::builtin().unwrap();
    /// assert!(catalog.room("crystal-mine").is_some());
    /// ```
    pub fn builtin() -> BurrowResult<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Looks up a room definition.
    pub fn room(&self, room_type_id: &str) -> Option<&RoomDefinition> {
        self.rooms.get(room_type_id)
    }

    /// Looks up a shape.
    pub fn shape(&self, shape_id: &str) -> Option<&RoomShape> {
        self.shapes.get(shape_id)
    }

    /// Looks up a creature definition.
    pub fn creature(&self, creature_id: &str) -> Option<&CreatureDefinition> {
        self.creatures.get(creature_id)
    }

    /// Looks up an upgrade path by its id alone.
    pub fn upgrade_path(&self, path_id: &str) -> Option<&RoomUpgradePath> {
        let owner = self.upgrade_owners.get(path_id)?;
        self.rooms
            .get(owner)?
            .upgrade_paths
            .iter()
            .find(|path| path.id == path_id)
    }

    /// The room type an upgrade path belongs to.
    pub fn upgrade_path_owner(&self, path_id: &str) -> Option<&str> {
        self.upgrade_owners.get(path_id).map(String::as_str)
    }

    /// The shape a placed room was built with.
    pub fn shape_of(&self, room: &PlacedRoom) -> Option<&RoomShape> {
        self.shape(&room.shape_id)
    }

    /// Room definitions sorted by id.
    pub fn room_definitions(&self) -> Vec<&RoomDefinition> {
        let mut rooms: Vec<_> = self.rooms.values().collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    /// Creature definitions sorted by id.
    pub fn creature_definitions(&self) -> Vec<&CreatureDefinition> {
        let mut creatures: Vec<_> = self.creatures.values().collect();
        creatures.sort_by(|a, b| a.id.cmp(&b.id));
        creatures
    }
}
