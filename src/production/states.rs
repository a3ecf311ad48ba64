//! # Behavioral State Modifiers
//!
//! Per-creature multipliers driven by behavioral state (scared, hungry, ...).
//! Creature definitions may override the defaults state by state.

use crate::catalog::ContentCatalog;
use crate::config::DEFAULT_FEAR_TOLERANCE;
use crate::world::{InhabitantInstance, InhabitantState};
use serde::{Deserialize, Serialize};

/// Multipliers a behavioral state applies to a creature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateModifier {
    pub production_multiplier: f64,
    pub food_consumption_multiplier: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense_multiplier: Option<f64>,
}

impl StateModifier {
    /// The built-in modifier for a state, used when no override exists.
    pub fn default_for(state: InhabitantState) -> Self {
        let (production_multiplier, food_consumption_multiplier) = match state {
            InhabitantState::Normal => (1.0, 1.0),
            InhabitantState::Scared => (0.5, 1.0),
            InhabitantState::Hungry => (0.5, 1.0),
            InhabitantState::Starving => (0.1, 1.0),
        };
        let combat = match state {
            InhabitantState::Starving => Some(0.5),
            _ => None,
        };
        Self {
            production_multiplier,
            food_consumption_multiplier,
            attack_multiplier: combat,
            defense_multiplier: combat,
        }
    }
}

/// Looks up state modifiers and fear tolerances from the catalog.
#[derive(Debug, Clone, Copy)]
pub struct StateModifierRegistry<'a> {
    catalog: &'a ContentCatalog,
}

impl<'a> StateModifierRegistry<'a> {
    pub fn new(catalog: &'a ContentCatalog) -> Self {
        Self { catalog }
    }

    /// Fear tolerance of a creature, falling back to the default.
    pub fn fear_tolerance(&self, definition_id: &str) -> i32 {
        self.catalog
            .creature(definition_id)
            .and_then(|creature| creature.fear_tolerance)
            .unwrap_or(DEFAULT_FEAR_TOLERANCE)
    }

    /// Whether a room's fear level exceeds the creature's tolerance.
    ///
    /// A fear level equal to the tolerance does not scare.
    pub fn is_inhabitant_scared(&self, inhabitant: &InhabitantInstance, room_fear_level: i32) -> bool {
        room_fear_level > self.fear_tolerance(&inhabitant.definition_id)
    }

    /// Modifier for a creature in a state: its override, else the default.
    pub fn get(&self, definition_id: &str, state: InhabitantState) -> StateModifier {
        self.catalog
            .creature(definition_id)
            .and_then(|creature| creature.state_modifiers.get(&state))
            .copied()
            .unwrap_or_else(|| StateModifier::default_for(state))
    }

    /// Mean production multiplier across the given creatures; 1.0 for none.
    pub fn calculate_per_creature_production(&self, inhabitants: &[&InhabitantInstance]) -> f64 {
        if inhabitants.is_empty() {
            return 1.0;
        }
        let total: f64 = inhabitants
            .iter()
            .map(|inhabitant| {
                self.get(&inhabitant.definition_id, inhabitant.state)
                    .production_multiplier
            })
            .sum();
        total / inhabitants.len() as f64
    }
}
