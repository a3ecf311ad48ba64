//! # Sandbox Layouts
//!
//! Seeded random floor layouts for trying out catalogs, benchmarking the
//! production pass and driving the command-line simulator.

use crate::catalog::{ContentCatalog, CreatureDefinition, RoomDefinition};
use crate::config::GRID_SIZE;
use crate::grid::{is_unique_type_placed, place_on_floor, Position, RoomShape};
use crate::production::{get_effective_fear_level, get_effective_max_inhabitants, StateModifierRegistry};
use crate::world::{Biome, Floor, InhabitantInstance, InhabitantState, PlacedRoom};
use crate::{BurrowError, BurrowResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const BIOMES: [Biome; 6] = [
    Biome::Neutral,
    Biome::Volcanic,
    Biome::Flooded,
    Biome::Crystal,
    Biome::Corrupted,
    Biome::Fungal,
];

/// Parameters for a sandbox layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Random seed for reproducible layouts
    pub seed: u64,
    /// Number of floors, starting at depth 0
    pub floor_count: u32,
    /// Minimum rooms attempted per floor
    pub min_rooms: u32,
    /// Maximum rooms attempted per floor
    pub max_rooms: u32,
    /// Worker cap for rooms with unlimited capacity
    pub max_workers_per_room: u32,
}

impl SandboxConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            floor_count: 3,
            min_rooms: 6,
            max_rooms: 12,
            max_workers_per_room: 4,
        }
    }

    /// A single small floor.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            floor_count: 1,
            min_rooms: 3,
            max_rooms: 5,
            max_workers_per_room: 2,
        }
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Places random catalog rooms on fresh floors and staffs them.
#[derive(Debug, Clone)]
pub struct SandboxGenerator {
    /// Maximum anchors tried per room before giving up on it
    pub max_placement_attempts: u32,
}

impl SandboxGenerator {
    pub fn new() -> Self {
        Self {
            max_placement_attempts: 100,
        }
    }

    pub fn for_testing() -> Self {
        Self {
            max_placement_attempts: 50,
        }
    }

    /// Generates `config.floor_count` floors.
    ///
    /// Unique room types appear at most once across all floors. Rooms that
    /// need workers get between one worker and their effective capacity.
    pub fn generate(&self, catalog: &ContentCatalog, config: &SandboxConfig) -> BurrowResult<Vec<Floor>> {
        let definitions = catalog.room_definitions();
        if definitions.is_empty() {
            return Err(BurrowError::InvalidCatalog(
                "catalog has no room definitions".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut floors: Vec<Floor> = Vec::new();

        for depth in 0..config.floor_count {
            let biome = *BIOMES.choose(&mut rng).unwrap_or(&Biome::Neutral);
            let floor = self.populate_floor(
                Floor::new(depth, biome),
                &floors,
                catalog,
                &definitions,
                config,
                &mut rng,
            );
            log::debug!(
                "Sandbox floor {} ({}): {} rooms, {} inhabitants",
                depth,
                biome,
                floor.rooms.len(),
                floor.inhabitants.len()
            );
            floors.push(floor);
        }

        Ok(floors)
    }

    fn populate_floor(
        &self,
        mut floor: Floor,
        previous_floors: &[Floor],
        catalog: &ContentCatalog,
        definitions: &[&RoomDefinition],
        config: &SandboxConfig,
        rng: &mut StdRng,
    ) -> Floor {
        let creatures = catalog.creature_definitions();
        let room_count = rng.gen_range(config.min_rooms.min(config.max_rooms)..=config.max_rooms);

        for _ in 0..room_count {
            let Some(&definition) = definitions.choose(rng) else {
                break;
            };
            if definition.unique
                && (is_unique_type_placed(previous_floors, &definition.id)
                    || is_unique_type_placed(std::slice::from_ref(&floor), &definition.id))
            {
                continue;
            }
            let Some(shape) = catalog.shape(&definition.shape_id) else {
                log::warn!(
                    "Skipping {}: unknown shape \"{}\"",
                    definition.id,
                    definition.shape_id
                );
                continue;
            };

            if let Some((placed, room)) = self.try_place_room(&floor, definition, shape, rng) {
                floor = staff_room(placed, &room, definition, &creatures, catalog, config, rng);
            }
        }

        floor
    }

    /// Tries random anchors until the room fits or attempts run out.
    fn try_place_room(
        &self,
        floor: &Floor,
        definition: &RoomDefinition,
        shape: &RoomShape,
        rng: &mut StdRng,
    ) -> Option<(Floor, PlacedRoom)> {
        let max_x = GRID_SIZE - shape.width as i32;
        let max_y = GRID_SIZE - shape.height as i32;
        if max_x < 0 || max_y < 0 {
            return None;
        }

        for _ in 0..self.max_placement_attempts {
            let anchor = Position::new(rng.gen_range(0..=max_x), rng.gen_range(0..=max_y));
            let room = PlacedRoom::new(definition.id.clone(), shape.id.clone(), anchor);
            if let Ok(placed) = place_on_floor(floor, room.clone(), shape) {
                return Some((placed, room));
            }
        }

        None // Floor too crowded for this shape
    }
}

impl Default for SandboxGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Assigns random creatures to a freshly placed worker room.
///
/// Creatures whose tolerance the room's fear level exceeds start scared.
fn staff_room(
    floor: Floor,
    room: &PlacedRoom,
    definition: &RoomDefinition,
    creatures: &[&CreatureDefinition],
    catalog: &ContentCatalog,
    config: &SandboxConfig,
    rng: &mut StdRng,
) -> Floor {
    if !definition.requires_workers || creatures.is_empty() {
        return floor;
    }

    let capacity = match get_effective_max_inhabitants(room, definition) {
        -1 => config.max_workers_per_room,
        cap => cap.max(0) as u32,
    };
    if capacity == 0 {
        return floor;
    }

    let states = StateModifierRegistry::new(catalog);
    let fear_level = get_effective_fear_level(room, definition);
    let worker_count = rng.gen_range(1..=capacity);

    let mut staffed = floor;
    for _ in 0..worker_count {
        let Some(creature) = creatures.choose(rng) else {
            break;
        };
        let mut inhabitant = InhabitantInstance::assigned(creature.id.clone(), room.id);
        if fear_level.is_some_and(|fear| states.is_inhabitant_scared(&inhabitant, fear)) {
            inhabitant = inhabitant.with_state(InhabitantState::Scared);
        }
        staffed = staffed.with_inhabitant(inhabitant);
    }
    staffed
}
