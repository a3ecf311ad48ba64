//! # Room Upgrades
//!
//! Single-slot, permanent upgrade selection per placed room.
//!
//! A room starts unupgraded and moves to upgraded exactly once. Queries that
//! depend on the dark-upgrade unlock take it as a parameter.

use crate::catalog::{ContentCatalog, FearLevel, RoomDefinition, RoomUpgradePath, UpgradeEffect};
use crate::ledger::ResourceLedger;
use crate::world::{EntityId, Floor, PlacedRoom};
use crate::{BurrowError, BurrowResult};

/// Why an upgrade cannot be applied to a room.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeError {
    #[error("Room already has an upgrade applied")]
    AlreadyUpgraded,
    #[error("Invalid upgrade path for this room type")]
    InvalidPath,
    #[error("Requires dark upgrades (50 Corruption)")]
    RequiresDarkUpgrades,
}

/// An upgrade path as shown in the upgrade panel.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleUpgrade<'a> {
    pub path: &'a RoomUpgradePath,
    pub locked: bool,
    pub lock_reason: Option<String>,
}

/// Resolves upgrade paths for placed rooms against the catalog.
#[derive(Debug, Clone, Copy)]
pub struct UpgradeResolver<'a> {
    catalog: &'a ContentCatalog,
}

impl<'a> UpgradeResolver<'a> {
    pub fn new(catalog: &'a ContentCatalog) -> Self {
        Self { catalog }
    }

    /// Upgrade paths of a room type; empty for unknown types.
    pub fn get_paths(&self, room_type_id: &str) -> &'a [RoomUpgradePath] {
        self.catalog
            .room(room_type_id)
            .map(|definition| definition.upgrade_paths.as_slice())
            .unwrap_or(&[])
    }

    /// Checks whether `path_id` may be applied to `room`.
    ///
    /// Checks run in order: already upgraded, path belongs to the room type,
    /// dark gating.
    pub fn can_apply(
        &self,
        room: &PlacedRoom,
        path_id: &str,
        dark_unlocked: bool,
    ) -> Result<(), UpgradeError> {
        if room.is_upgraded() {
            return Err(UpgradeError::AlreadyUpgraded);
        }
        let path = self
            .get_paths(&room.room_type_id)
            .iter()
            .find(|path| path.id == path_id)
            .ok_or(UpgradeError::InvalidPath)?;
        if path.requires_dark_upgrade && !dark_unlocked {
            return Err(UpgradeError::RequiresDarkUpgrades);
        }
        Ok(())
    }

    /// Returns `room` with the upgrade recorded. Does not validate.
    pub fn apply(&self, room: &PlacedRoom, path_id: &str) -> PlacedRoom {
        PlacedRoom {
            applied_upgrade_path_id: Some(path_id.to_string()),
            ..room.clone()
        }
    }

    /// The path applied to `room`, if it resolves for the room's type.
    pub fn get_applied(&self, room: &PlacedRoom) -> Option<&'a RoomUpgradePath> {
        let path_id = room.applied_upgrade_path_id.as_deref()?;
        self.get_paths(&room.room_type_id)
            .iter()
            .find(|path| path.id == path_id)
    }

    /// Effects of the applied path; empty when none resolves.
    pub fn get_applied_effects(&self, room: &PlacedRoom) -> &'a [UpgradeEffect] {
        self.get_applied(room)
            .map(|path| path.effects.as_slice())
            .unwrap_or(&[])
    }

    /// Paths the room can take right now.
    pub fn get_available(&self, room: &PlacedRoom, dark_unlocked: bool) -> Vec<&'a RoomUpgradePath> {
        if room.is_upgraded() {
            return Vec::new();
        }
        self.get_paths(&room.room_type_id)
            .iter()
            .filter(|path| dark_unlocked || !path.requires_dark_upgrade)
            .collect()
    }

    /// Every path the room could take, with dark-gated ones marked locked.
    pub fn get_visible(&self, room: &PlacedRoom, dark_unlocked: bool) -> Vec<VisibleUpgrade<'a>> {
        if room.is_upgraded() {
            return Vec::new();
        }
        self.get_paths(&room.room_type_id)
            .iter()
            .map(|path| {
                let locked = path.requires_dark_upgrade && !dark_unlocked;
                VisibleUpgrade {
                    path,
                    locked,
                    lock_reason: locked.then(|| UpgradeError::RequiresDarkUpgrades.to_string()),
                }
            })
            .collect()
    }
}

/// Applies an upgrade to a room on a floor, paying its cost.
///
/// Returns the new floor and ledger; neither input is modified.
pub fn purchase_upgrade(
    floor: &Floor,
    room_id: EntityId,
    path_id: &str,
    dark_unlocked: bool,
    ledger: &ResourceLedger,
    catalog: &ContentCatalog,
) -> BurrowResult<(Floor, ResourceLedger)> {
    let resolver = UpgradeResolver::new(catalog);
    let room = floor.room(room_id).ok_or(BurrowError::EntityNotFound(room_id))?;
    resolver.can_apply(room, path_id, dark_unlocked)?;

    let path = resolver
        .get_paths(&room.room_type_id)
        .iter()
        .find(|path| path.id == path_id)
        .ok_or(UpgradeError::InvalidPath)?;
    let ledger = ledger.pay(&path.cost)?;

    log::debug!("Applying upgrade {} to room {}", path_id, room_id);

    let floor = floor
        .with_room_replaced(resolver.apply(room, path_id))
        .ok_or(BurrowError::EntityNotFound(room_id))?;
    Ok((floor, ledger))
}

/// Inhabitant cap including the applied upgrade's bonus.
///
/// Unlimited rooms (`-1`) stay unlimited whatever the upgrade says.
pub fn get_effective_max_inhabitants(room: &PlacedRoom, definition: &RoomDefinition) -> i32 {
    if definition.max_inhabitants == -1 {
        return -1;
    }
    definition.max_inhabitants + applied_effects(room, definition)
        .iter()
        .map(|effect| match effect {
            UpgradeEffect::MaxInhabitantBonus { value } => *value,
            _ => 0,
        })
        .sum::<i32>()
}

/// Fear level including the applied upgrade's adjustments, never below zero.
///
/// Variable-fear rooms have no fixed level and yield `None`.
pub fn get_effective_fear_level(room: &PlacedRoom, definition: &RoomDefinition) -> Option<i32> {
    let FearLevel::Fixed(base) = definition.fear_level else {
        return None;
    };
    let adjustment: i32 = applied_effects(room, definition)
        .iter()
        .map(|effect| match effect {
            UpgradeEffect::FearIncrease { value } => *value,
            UpgradeEffect::FearReduction { value } => -*value,
            _ => 0,
        })
        .sum();
    Some((base + adjustment).max(0))
}

fn applied_effects<'d>(room: &PlacedRoom, definition: &'d RoomDefinition) -> &'d [UpgradeEffect] {
    room.applied_upgrade_path_id
        .as_deref()
        .and_then(|path_id| definition.upgrade_paths.iter().find(|path| path.id == path_id))
        .map(|path| path.effects.as_slice())
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;
    use crate::ledger::{ResourceMap, ResourceType};
    use std::collections::BTreeMap;

    fn catalog() -> ContentCatalog {
        ContentCatalog::builtin().unwrap()
    }

    fn mine() -> PlacedRoom {
        PlacedRoom::new("crystal-mine", "l-shape", Position::new(0, 0))
    }

    #[test]
    fn test_get_paths() {
        let catalog = catalog();
        let resolver = UpgradeResolver::new(&catalog);
        assert_eq!(resolver.get_paths("crystal-mine").len(), 3);
        assert!(resolver.get_paths("no-such-room").is_empty());
        assert!(resolver.get_paths("soul-well").is_empty());
    }

    #[test]
    fn test_can_apply_checks() {
        let catalog = catalog();
        let resolver = UpgradeResolver::new(&catalog);
        let room = mine();

        assert_eq!(resolver.can_apply(&room, "deep-veins", false), Ok(()));
        assert_eq!(
            resolver.can_apply(&room, "spore-vats", false),
            Err(UpgradeError::InvalidPath)
        );
        assert_eq!(
            resolver.can_apply(&room, "blood-crystals", false),
            Err(UpgradeError::RequiresDarkUpgrades)
        );
        assert_eq!(resolver.can_apply(&room, "blood-crystals", true), Ok(()));
    }

    #[test]
    fn test_already_upgraded_checked_first() {
        let catalog = catalog();
        let resolver = UpgradeResolver::new(&catalog);
        let upgraded = resolver.apply(&mine(), "deep-veins");

        for path_id in ["deep-veins", "expanded-tunnels", "blood-crystals", "nonsense"] {
            let err = resolver.can_apply(&upgraded, path_id, false).unwrap_err();
            assert_eq!(err, UpgradeError::AlreadyUpgraded);
            assert_eq!(err.to_string(), "Room already has an upgrade applied");
        }
    }

    #[test]
    fn test_apply_is_non_mutating() {
        let catalog = catalog();
        let resolver = UpgradeResolver::new(&catalog);
        let room = mine();
        let upgraded = resolver.apply(&room, "deep-veins");

        assert!(room.applied_upgrade_path_id.is_none());
        assert_eq!(upgraded.applied_upgrade_path_id.as_deref(), Some("deep-veins"));
        assert_eq!(upgraded.id, room.id);
    }

    #[test]
    fn test_get_applied_and_effects() {
        let catalog = catalog();
        let resolver = UpgradeResolver::new(&catalog);
        let room = mine();
        assert!(resolver.get_applied(&room).is_none());
        assert!(resolver.get_applied_effects(&room).is_empty());

        let upgraded = resolver.apply(&room, "deep-veins");
        assert_eq!(resolver.get_applied(&upgraded).unwrap().id, "deep-veins");
        assert_eq!(
            resolver.get_applied_effects(&upgraded),
            &[UpgradeEffect::ProductionMultiplier {
                resource: ResourceType::Crystals,
                value: 1.5
            }]
        );

        let stale = resolver.apply(&room, "removed-in-patch");
        assert!(resolver.get_applied(&stale).is_none());
        assert!(resolver.get_applied_effects(&stale).is_empty());
    }

    #[test]
    fn test_available_filters_dark() {
        let catalog = catalog();
        let resolver = UpgradeResolver::new(&catalog);
        let room = mine();

        let ids = |paths: Vec<&RoomUpgradePath>| paths.into_iter().map(|p| p.id.clone()).collect::<Vec<_>>();
        assert_eq!(
            ids(resolver.get_available(&room, false)),
            vec!["deep-veins", "expanded-tunnels"]
        );
        assert_eq!(resolver.get_available(&room, true).len(), 3);

        let upgraded = resolver.apply(&room, "deep-veins");
        assert!(resolver.get_available(&upgraded, true).is_empty());
    }

    #[test]
    fn test_visible_marks_locked() {
        let catalog = catalog();
        let resolver = UpgradeResolver::new(&catalog);
        let room = mine();

        let visible = resolver.get_visible(&room, false);
        assert_eq!(visible.len(), 3);
        let locked: Vec<_> = visible.iter().filter(|v| v.locked).collect();
        assert_eq!(locked.len(), 1);
        assert_eq!(locked[0].path.id, "blood-crystals");
        assert_eq!(
            locked[0].lock_reason.as_deref(),
            Some("Requires dark upgrades (50 Corruption)")
        );

        assert!(resolver.get_visible(&room, true).iter().all(|v| !v.locked));

        let upgraded = resolver.apply(&room, "expanded-tunnels");
        assert!(resolver.get_visible(&upgraded, false).is_empty());
    }

    #[test]
    fn test_effective_max_inhabitants() {
        let catalog = catalog();
        let resolver = UpgradeResolver::new(&catalog);

        let mine_def = catalog.room("crystal-mine").unwrap();
        let room = mine();
        assert_eq!(get_effective_max_inhabitants(&room, mine_def), 2);
        let expanded = resolver.apply(&room, "expanded-tunnels");
        assert_eq!(get_effective_max_inhabitants(&expanded, mine_def), 4);

        let altar_def = catalog.room("altar-room").unwrap();
        let altar = PlacedRoom::new("altar-room", "square-3", Position::new(5, 5));
        let basin = resolver.apply(&altar, "sacrificial-basin");
        assert_eq!(get_effective_max_inhabitants(&basin, altar_def), -1);
    }

    #[test]
    fn test_effective_fear_level() {
        let catalog = catalog();
        let resolver = UpgradeResolver::new(&catalog);

        let library_def = catalog.room("shadow-library").unwrap();
        let library = PlacedRoom::new("shadow-library", "square-2", Position::new(0, 0));
        assert_eq!(get_effective_fear_level(&library, library_def), Some(2));
        assert_eq!(
            get_effective_fear_level(&resolver.apply(&library, "quiet-study"), library_def),
            Some(1)
        );
        assert_eq!(
            get_effective_fear_level(&resolver.apply(&library, "forbidden-tomes"), library_def),
            Some(4)
        );

        let altar_def = catalog.room("altar-room").unwrap();
        let altar = PlacedRoom::new("altar-room", "square-3", Position::new(5, 5));
        assert_eq!(get_effective_fear_level(&altar, altar_def), None);
    }

    #[test]
    fn test_purchase_pays_and_upgrades() {
        let catalog = catalog();
        let room = mine();
        let mut floor = Floor::new(0, crate::world::Biome::Neutral);
        floor.rooms.push(room.clone());

        let caps: ResourceMap = BTreeMap::from([(ResourceType::Gold, 100.0)]);
        let mut ledger = ResourceLedger::with_caps(&caps);
        ledger.apply_delta(&BTreeMap::from([(ResourceType::Gold, 60.0)]));

        let (upgraded_floor, paid) =
            purchase_upgrade(&floor, room.id, "deep-veins", false, &ledger, &catalog).unwrap();
        assert_eq!(paid.current(ResourceType::Gold), 10.0);
        assert!(upgraded_floor.room(room.id).unwrap().is_upgraded());
        assert!(!floor.room(room.id).unwrap().is_upgraded());

        assert!(matches!(
            purchase_upgrade(&upgraded_floor, room.id, "expanded-tunnels", false, &paid, &catalog),
            Err(BurrowError::Upgrade(UpgradeError::AlreadyUpgraded))
        ));
        assert!(matches!(
            purchase_upgrade(&floor, room.id, "expanded-tunnels", false, &paid, &catalog),
            Err(BurrowError::InsufficientResources(_))
        ));
    }
}
