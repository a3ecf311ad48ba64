//! # Inhabitants
//!
//! Creature instances living on a floor and their behavioral state.

use crate::catalog::CreatureId;
use crate::world::{new_entity_id, EntityId};
use serde::{Deserialize, Serialize};

/// Behavioral state of a creature, driving its production and upkeep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InhabitantState {
    #[default]
    Normal,
    Scared,
    Hungry,
    Starving,
}

impl InhabitantState {
    /// Lower-case state name as used in catalog files.
    pub fn name(self) -> &'static str {
        match self {
            InhabitantState::Normal => "normal",
            InhabitantState::Scared => "scared",
            InhabitantState::Hungry => "hungry",
            InhabitantState::Starving => "starving",
        }
    }
}

/// A creature living on a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InhabitantInstance {
    pub id: EntityId,
    /// Catalog creature definition
    pub definition_id: CreatureId,
    /// Room this creature works in, if any
    #[serde(default)]
    pub assigned_room_id: Option<EntityId>,
    #[serde(default)]
    pub state: InhabitantState,
}

impl InhabitantInstance {
    /// Creates an unassigned creature in the normal state.
    pub fn new(definition_id: impl Into<CreatureId>) -> Self {
        Self {
            id: new_entity_id(),
            definition_id: definition_id.into(),
            assigned_room_id: None,
            state: InhabitantState::Normal,
        }
    }

    /// Creates a creature already assigned to a room.
    pub fn assigned(definition_id: impl Into<CreatureId>, room_id: EntityId) -> Self {
        Self {
            assigned_room_id: Some(room_id),
            ..Self::new(definition_id)
        }
    }

    /// Returns this creature with a different state.
    pub fn with_state(mut self, state: InhabitantState) -> Self {
        self.state = state;
        self
    }
}
