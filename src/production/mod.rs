//! # Production Module
//!
//! Turns placed, staffed rooms into per-tick resource output.
//!
//! Output for each resource a room produces runs through a fixed chain of
//! stages, multiplied in this order:
//!
//! 1. base rate from the catalog
//! 2. `1 + mean worker efficiency delta + adjacency bonus`, floored at zero
//! 3. environmental modifiers (time of day, floor depth, biome)
//! 4. behavioral state of the inhabitants
//! 5. the applied upgrade's production multiplier for that resource
//! 6. seasonal multiplier
//! 7. reputation multiplier
//!
//! Secondary production from upgrades skips stage 5. Nothing here fails:
//! unknown ids degrade to neutral values so a stale catalog reference cannot
//! stop a tick.

pub mod modifiers;
pub mod states;
pub mod upgrades;

pub use modifiers::*;
pub use states::*;
pub use upgrades::*;

use crate::catalog::{ContentCatalog, UpgradeEffect};
use crate::config::{DEFAULT_WORKER_EFFICIENCY, TICKS_PER_MINUTE};
use crate::grid::get_adjacent_room_ids;
use crate::ledger::{drop_zero_entries, merge_resources, ResourceLedger, ResourceMap, ResourceType};
use crate::world::{EntityId, Floor, PlacedRoom};
use crate::BurrowResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// External multiplier provider, such as the current season or reputation.
pub trait ProductionMultiplierSource: std::fmt::Debug {
    fn get_production_multiplier(&self, resource: ResourceType) -> f64;
}

/// A source that never changes anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeutralMultipliers;

impl ProductionMultiplierSource for NeutralMultipliers {
    fn get_production_multiplier(&self, _resource: ResourceType) -> f64 {
        1.0
    }
}

pub static NEUTRAL: NeutralMultipliers = NeutralMultipliers;

/// A fixed multiplier per resource; resources not listed get 1.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedMultipliers {
    pub multipliers: ResourceMap,
}

impl FixedMultipliers {
    pub fn new(multipliers: ResourceMap) -> Self {
        Self { multipliers }
    }
}

impl ProductionMultiplierSource for FixedMultipliers {
    fn get_production_multiplier(&self, resource: ResourceType) -> f64 {
        self.multipliers.get(&resource).copied().unwrap_or(1.0)
    }
}

/// Everything outside a floor that production depends on.
#[derive(Debug, Clone, Copy)]
pub struct ProductionContext<'a> {
    pub catalog: &'a ContentCatalog,
    pub modifiers: &'a ModifierRegistry,
    pub hour: u32,
    pub seasonal: &'a dyn ProductionMultiplierSource,
    pub reputation: &'a dyn ProductionMultiplierSource,
}

impl<'a> ProductionContext<'a> {
    /// Context at noon with neutral seasonal and reputation sources.
    pub fn new(catalog: &'a ContentCatalog, modifiers: &'a ModifierRegistry) -> Self {
        Self {
            catalog,
            modifiers,
            hour: 12,
            seasonal: &NEUTRAL,
            reputation: &NEUTRAL,
        }
    }

    pub fn with_hour(mut self, hour: u32) -> Self {
        self.hour = hour;
        self
    }

    pub fn with_seasonal(mut self, seasonal: &'a dyn ProductionMultiplierSource) -> Self {
        self.seasonal = seasonal;
        self
    }

    pub fn with_reputation(mut self, reputation: &'a dyn ProductionMultiplierSource) -> Self {
        self.reputation = reputation;
        self
    }
}

/// Stage values for one resource of one room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductionBreakdown {
    pub resource: ResourceType,
    pub base: f64,
    pub workers_and_adjacency: f64,
    pub environmental: f64,
    pub behavioral: f64,
    pub upgrade: f64,
    pub seasonal: f64,
    pub reputation: f64,
    /// Granted by a secondary production upgrade rather than the room itself
    pub secondary: bool,
}

impl ProductionBreakdown {
    /// Final per-tick output, multiplied in stage order.
    pub fn output(&self) -> f64 {
        self.base
            * self.workers_and_adjacency
            * self.environmental
            * self.behavioral
            * self.upgrade
            * self.seasonal
            * self.reputation
    }
}

/// Stage values for every resource a room produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomProductionBreakdown {
    pub room_id: EntityId,
    pub room_type_id: String,
    pub stages: Vec<ProductionBreakdown>,
}

impl RoomProductionBreakdown {
    fn idle(room: &PlacedRoom) -> Self {
        Self {
            room_id: room.id,
            room_type_id: room.room_type_id.clone(),
            stages: Vec::new(),
        }
    }

    /// Output per resource with zero entries dropped.
    pub fn totals(&self) -> ResourceMap {
        let mut totals = ResourceMap::new();
        for stage in &self.stages {
            *totals.entry(stage.resource).or_insert(0.0) += stage.output();
        }
        drop_zero_entries(&mut totals);
        totals
    }
}

/// Base production of a room type; empty for unknown or passive types.
pub fn get_base_production(catalog: &ContentCatalog, room_type_id: &str) -> ResourceMap {
    catalog
        .room(room_type_id)
        .map(|definition| definition.production.clone())
        .unwrap_or_default()
}

/// Sum of the room's configured adjacency bonuses over its distinct neighbours.
///
/// Each adjacent room counts once per matching bonus entry, however many tiles
/// it shares. A neighbour of the room's own type matches too.
pub fn calculate_adjacency_bonus(
    room: &PlacedRoom,
    adjacent_room_ids: &[EntityId],
    all_rooms: &[PlacedRoom],
    catalog: &ContentCatalog,
) -> f64 {
    let Some(definition) = catalog.room(&room.room_type_id) else {
        return 0.0;
    };

    let mut seen = HashSet::new();
    adjacent_room_ids
        .iter()
        .filter(|&&id| id != room.id && seen.insert(id))
        .filter_map(|id| all_rooms.iter().find(|other| other.id == *id))
        .map(|other| {
            definition
                .adjacency_bonuses
                .iter()
                .filter(|entry| entry.adjacent_room_type_id == other.room_type_id)
                .map(|entry| entry.bonus)
                .sum::<f64>()
        })
        .sum()
}

fn worker_efficiency_delta(catalog: &ContentCatalog, floor: &Floor, room: &PlacedRoom) -> f64 {
    let inhabitants = floor.inhabitants_in(room.id);
    if inhabitants.is_empty() {
        return 0.0;
    }
    let total: f64 = inhabitants
        .iter()
        .map(|inhabitant| {
            catalog
                .creature(&inhabitant.definition_id)
                .map(|creature| creature.worker_efficiency)
                .unwrap_or(DEFAULT_WORKER_EFFICIENCY)
                - 1.0
        })
        .sum();
    total / inhabitants.len() as f64
}

/// Every stage of the chain for one room, for production breakdown displays.
pub fn calculate_room_breakdown(
    room: &PlacedRoom,
    floor: &Floor,
    context: &ProductionContext<'_>,
) -> RoomProductionBreakdown {
    let catalog = context.catalog;
    let Some(definition) = catalog.room(&room.room_type_id) else {
        log::warn!(
            "Room {} has unknown type \"{}\"; it produces nothing",
            room.id,
            room.room_type_id
        );
        return RoomProductionBreakdown::idle(room);
    };

    let inhabitants = floor.inhabitants_in(room.id);
    if definition.requires_workers && inhabitants.is_empty() {
        return RoomProductionBreakdown::idle(room);
    }

    let adjacent = get_adjacent_room_ids(room, floor, catalog);
    let adjacency = calculate_adjacency_bonus(room, &adjacent, &floor.rooms, catalog);
    let workers_and_adjacency = (1.0 + worker_efficiency_delta(catalog, floor, room) + adjacency).max(0.0);

    let environmental = context
        .modifiers
        .calculate_production_modifiers(&ProductionModifierContext {
            room_type_id: &room.room_type_id,
            floor_depth: floor.depth,
            floor_biome: floor.biome,
            hour: context.hour,
        });
    let behavioral = StateModifierRegistry::new(catalog).calculate_per_creature_production(&inhabitants);
    let effects = UpgradeResolver::new(catalog).get_applied_effects(room);

    let stage = |resource: ResourceType, base: f64, upgrade: f64, secondary: bool| ProductionBreakdown {
        resource,
        base,
        workers_and_adjacency,
        environmental,
        behavioral,
        upgrade,
        seasonal: context.seasonal.get_production_multiplier(resource),
        reputation: context.reputation.get_production_multiplier(resource),
        secondary,
    };

    let mut stages: Vec<ProductionBreakdown> = definition
        .production
        .iter()
        .map(|(&resource, &base)| {
            let upgrade: f64 = effects
                .iter()
                .filter_map(|effect| match effect {
                    UpgradeEffect::ProductionMultiplier { resource: target, value } if *target == resource => {
                        Some(*value)
                    }
                    _ => None,
                })
                .product();
            stage(resource, base, upgrade, false)
        })
        .collect();

    let base_total: f64 = definition.production.values().sum();
    stages.extend(effects.iter().filter_map(|effect| match effect {
        UpgradeEffect::SecondaryProduction { resource, value } => {
            Some(stage(*resource, base_total * value, 1.0, true))
        }
        _ => None,
    }));

    log::debug!(
        "Room {} ({}): factor {:.3}, environment {:.3}, behavior {:.3}",
        room.id,
        room.room_type_id,
        workers_and_adjacency,
        environmental,
        behavioral
    );

    RoomProductionBreakdown {
        room_id: room.id,
        room_type_id: room.room_type_id.clone(),
        stages,
    }
}

/// Per-tick output of a single room.
///
/// A room that needs workers produces nothing until someone is assigned.
pub fn calculate_single_room_production(
    room: &PlacedRoom,
    floor: &Floor,
    context: &ProductionContext<'_>,
) -> ResourceMap {
    calculate_room_breakdown(room, floor, context).totals()
}

/// Per-tick output of every room on a floor.
pub fn calculate_floor_production(floor: &Floor, context: &ProductionContext<'_>) -> ResourceMap {
    let mut total = ResourceMap::new();
    for room in &floor.rooms {
        merge_resources(&mut total, &calculate_single_room_production(room, floor, context));
    }
    drop_zero_entries(&mut total);
    total
}

/// Per-tick output of every room on every floor, zero entries omitted.
pub fn calculate_total(floors: &[Floor], context: &ProductionContext<'_>) -> ResourceMap {
    let mut total = ResourceMap::new();
    for floor in floors {
        merge_resources(&mut total, &calculate_floor_production(floor, context));
    }
    drop_zero_entries(&mut total);
    total
}

/// Converts a per-tick rate to a per-minute rate for display.
///
/// # Examples
///
/// ```
/// use burrow::production_per_minute;
///
/// assert_eq!(production_per_minute(2.0), 10.0);
/// ```
pub fn production_per_minute(per_tick: f64) -> f64 {
    per_tick * TICKS_PER_MINUTE
}

/// Runs `ticks` income passes and returns the resulting ledger.
///
/// Floors do not change between ticks, so the per-tick total is computed once
/// and folded in repeatedly, clamping at each step.
pub fn advance_ticks(
    floors: &[Floor],
    ledger: &ResourceLedger,
    context: &ProductionContext<'_>,
    ticks: u32,
) -> ResourceLedger {
    let per_tick = calculate_total(floors, context);
    log::debug!("Advancing {} ticks at {:?} per tick", ticks, per_tick);

    let mut ledger = ledger.clone();
    for _ in 0..ticks {
        ledger.apply_delta(&per_tick);
    }
    ledger
}

/// Simulation-wide settings loaded alongside a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Hour of day, 0 to 23
    #[serde(default = "default_hour")]
    pub hour: u32,
    #[serde(default)]
    pub modifiers: ModifierConfig,
    #[serde(default)]
    pub seasonal: FixedMultipliers,
    #[serde(default)]
    pub reputation: FixedMultipliers,
    /// Ledger cap per resource
    #[serde(default = "default_resource_caps")]
    pub resource_caps: ResourceMap,
}

fn default_hour() -> u32 {
    12
}

fn default_resource_caps() -> ResourceMap {
    BTreeMap::from([
        (ResourceType::Crystals, 500.0),
        (ResourceType::Food, 500.0),
        (ResourceType::Gold, 1000.0),
        (ResourceType::Flux, 200.0),
        (ResourceType::Research, 300.0),
        (ResourceType::Essence, 200.0),
        (ResourceType::Corruption, 100.0),
    ])
}

impl SimulationConfig {
    /// Creates the default configuration at the given hour.
    pub fn new(hour: u32) -> Self {
        Self {
            hour,
            modifiers: ModifierConfig::default(),
            seasonal: FixedMultipliers::default(),
            reputation: FixedMultipliers::default(),
            resource_caps: default_resource_caps(),
        }
    }

    /// Configuration with no environmental modifiers, so output equals the
    /// worker and upgrade stages alone.
    pub fn for_testing() -> Self {
        Self {
            modifiers: ModifierConfig {
                night_bonuses: BTreeMap::new(),
                day_bonuses: BTreeMap::new(),
                biome_bonuses: Vec::new(),
                depth_bonus_per_level: 0.0,
            },
            ..Self::new(default_hour())
        }
    }

    pub fn from_json(json: &str) -> BurrowResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> BurrowResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading simulation config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Registry with this configuration's rule tables.
    pub fn build_registry(&self) -> ModifierRegistry {
        ModifierRegistry::from_config(&self.modifiers)
    }

    /// Production context using this configuration's hour and multipliers.
    pub fn context<'a>(
        &'a self,
        catalog: &'a ContentCatalog,
        modifiers: &'a ModifierRegistry,
    ) -> ProductionContext<'a> {
        ProductionContext::new(catalog, modifiers)
            .with_hour(self.hour)
            .with_seasonal(&self.seasonal)
            .with_reputation(&self.reputation)
    }

    /// Empty ledger with this configuration's caps.
    pub fn ledger(&self) -> ResourceLedger {
        ResourceLedger::with_caps(&self.resource_caps)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new(default_hour())
    }
}
