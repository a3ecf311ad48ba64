//! # Environmental Modifiers
//!
//! Pluggable production rules keyed by room type, hour, floor depth and biome.
//!
//! Each rule either produces an active modifier or nothing at all. Inactive
//! rules are simply absent from the list, so they contribute the implicit 1.0
//! of an empty product rather than an explicit entry.

use crate::catalog::RoomTypeId;
use crate::config::{DAY_START_HOUR, DEPTH_BONUS_PER_LEVEL, NIGHT_START_HOUR};
use crate::world::Biome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a modifier rule gets to look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionModifierContext<'a> {
    pub room_type_id: &'a str,
    pub floor_depth: u32,
    pub floor_biome: Biome,
    pub hour: u32,
}

/// Which rule produced a modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierSource {
    TimeOfDay,
    FloorDepth,
    Biome,
}

/// A modifier currently affecting a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveModifier {
    pub source: ModifierSource,
    pub multiplier: f64,
    pub description: String,
}

/// A production rule evaluated against a room's surroundings.
pub trait ProductionModifierRule: std::fmt::Debug {
    /// The active modifier for this context, or `None` when the rule does not apply.
    fn evaluate(&self, context: &ProductionModifierContext<'_>) -> Option<ActiveModifier>;
}

/// Whether the hour falls in the night window.
///
/// # Examples
///
/// ```
/// use burrow::is_night;
///
/// assert!(is_night(18));
/// assert!(is_night(5));
/// assert!(!is_night(6));
/// assert!(!is_night(17));
/// ```
pub fn is_night(hour: u32) -> bool {
    hour >= NIGHT_START_HOUR || hour < DAY_START_HOUR
}

fn percent(multiplier: f64) -> String {
    let delta = ((multiplier - 1.0) * 100.0).round() as i64;
    if delta >= 0 {
        format!("+{}%", delta)
    } else {
        format!("{}%", delta)
    }
}

/// Flat bonuses for room types that thrive by night or by day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeOfDayRule {
    pub night_bonuses: BTreeMap<RoomTypeId, f64>,
    pub day_bonuses: BTreeMap<RoomTypeId, f64>,
}

impl ProductionModifierRule for TimeOfDayRule {
    fn evaluate(&self, context: &ProductionModifierContext<'_>) -> Option<ActiveModifier> {
        let (bonuses, window) = if is_night(context.hour) {
            (&self.night_bonuses, "Night")
        } else {
            (&self.day_bonuses, "Day")
        };
        let multiplier = *bonuses.get(context.room_type_id)?;
        Some(ActiveModifier {
            source: ModifierSource::TimeOfDay,
            multiplier,
            description: format!("{} bonus: {}", window, percent(multiplier)),
        })
    }
}

/// Deeper floors produce more, for every room type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorDepthRule {
    pub bonus_per_level: f64,
}

impl Default for FloorDepthRule {
    fn default() -> Self {
        Self {
            bonus_per_level: DEPTH_BONUS_PER_LEVEL,
        }
    }
}

impl ProductionModifierRule for FloorDepthRule {
    fn evaluate(&self, context: &ProductionModifierContext<'_>) -> Option<ActiveModifier> {
        if context.floor_depth == 0 {
            return None;
        }
        let multiplier = 1.0 + context.floor_depth as f64 * self.bonus_per_level;
        Some(ActiveModifier {
            source: ModifierSource::FloorDepth,
            multiplier,
            description: format!("Floor depth {}: {}", context.floor_depth, percent(multiplier)),
        })
    }
}

/// One entry of the biome table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeBonus {
    pub room_type_id: RoomTypeId,
    pub biome: Biome,
    pub multiplier: f64,
}

/// Per (room type, biome) multipliers. Neutral floors never match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiomeRule {
    pub bonuses: Vec<BiomeBonus>,
}

impl ProductionModifierRule for BiomeRule {
    fn evaluate(&self, context: &ProductionModifierContext<'_>) -> Option<ActiveModifier> {
        if context.floor_biome == Biome::Neutral {
            return None;
        }
        let entry = self.bonuses.iter().find(|entry| {
            entry.biome == context.floor_biome && entry.room_type_id == context.room_type_id
        })?;
        Some(ActiveModifier {
            source: ModifierSource::Biome,
            multiplier: entry.multiplier,
            description: format!("{} biome: {}", entry.biome, percent(entry.multiplier)),
        })
    }
}

/// Serializable tables for the built-in rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierConfig {
    #[serde(default)]
    pub night_bonuses: BTreeMap<RoomTypeId, f64>,
    #[serde(default)]
    pub day_bonuses: BTreeMap<RoomTypeId, f64>,
    #[serde(default)]
    pub biome_bonuses: Vec<BiomeBonus>,
    #[serde(default = "default_depth_bonus")]
    pub depth_bonus_per_level: f64,
}

fn default_depth_bonus() -> f64 {
    DEPTH_BONUS_PER_LEVEL
}

impl Default for ModifierConfig {
    fn default() -> Self {
        let bonus = |room: &str, biome: Biome, multiplier: f64| BiomeBonus {
            room_type_id: room.to_string(),
            biome,
            multiplier,
        };
        Self {
            night_bonuses: BTreeMap::from([
                ("shadow-library".to_string(), 1.2),
                ("soul-well".to_string(), 1.15),
            ]),
            day_bonuses: BTreeMap::from([("mushroom-grove".to_string(), 1.2)]),
            biome_bonuses: vec![
                bonus("crystal-mine", Biome::Crystal, 1.5),
                bonus("crystal-mine", Biome::Flooded, 0.8),
                bonus("dark-forge", Biome::Volcanic, 1.3),
                bonus("mushroom-grove", Biome::Fungal, 1.4),
                bonus("mushroom-grove", Biome::Volcanic, 0.7),
                bonus("shadow-library", Biome::Corrupted, 1.25),
                bonus("soul-well", Biome::Corrupted, 1.3),
            ],
            depth_bonus_per_level: DEPTH_BONUS_PER_LEVEL,
        }
    }
}

/// Ordered collection of modifier rules.
#[derive(Debug, Default)]
pub struct ModifierRegistry {
    rules: Vec<Box<dyn ProductionModifierRule>>,
}

impl ModifierRegistry {
    /// Creates a registry with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the time-of-day, depth and biome rules.
    pub fn from_config(config: &ModifierConfig) -> Self {
        let mut registry = Self::new();
        registry.register(TimeOfDayRule {
            night_bonuses: config.night_bonuses.clone(),
            day_bonuses: config.day_bonuses.clone(),
        });
        registry.register(FloorDepthRule {
            bonus_per_level: config.depth_bonus_per_level,
        });
        registry.register(BiomeRule {
            bonuses: config.biome_bonuses.clone(),
        });
        registry
    }

    /// Adds a rule after the existing ones.
    pub fn register(&mut self, rule: impl ProductionModifierRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every modifier currently active for the context, in rule order.
    pub fn evaluate_modifiers(&self, context: &ProductionModifierContext<'_>) -> Vec<ActiveModifier> {
        self.rules
            .iter()
            .filter_map(|rule| rule.evaluate(context))
            .collect()
    }

    /// Product of all active multipliers; 1.0 when none apply.
    pub fn calculate_production_modifiers(&self, context: &ProductionModifierContext<'_>) -> f64 {
        let multipliers: Vec<f64> = self
            .evaluate_modifiers(context)
            .iter()
            .map(|modifier| modifier.multiplier)
            .collect();
        apply_modifiers(1.0, &multipliers)
    }
}

/// Multiplies `base` by each multiplier in turn.
///
/// # Examples
///
/// ```
/// use burrow::apply_modifiers;
///
/// assert_eq!(apply_modifiers(10.0, &[2.0, 0.5]), 10.0);
/// assert_eq!(apply_modifiers(10.0, &[2.0, 0.0, 3.0]), 0.0);
/// assert_eq!(apply_modifiers(4.0, &[]), 4.0);
/// ```
pub fn apply_modifiers(base: f64, multipliers: &[f64]) -> f64 {
    multipliers
        .iter()
        .fold(base, |value, multiplier| value * multiplier)
}
