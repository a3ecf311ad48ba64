//! # Placement
//!
//! Validation and copy-on-write execution of room placement and removal.
//!
//! Validation never fails fast: every applicable problem is reported so the
//! player sees the whole reason at once. Execution re-validates and, on
//! success, returns a new [`Floor`]; the input floor is never touched.

use crate::grid::{absolute_tiles, Grid, Occupant, Position, RoomShape, Tile};
use crate::world::{EntityId, Floor, Hallway, PlacedRoom};
use serde::{Deserialize, Serialize};

/// Why a set of tiles cannot be claimed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementError {
    /// Some tile falls outside the grid
    #[error("Room extends beyond grid boundary")]
    OutOfBounds,
    /// Some tiles are already owned by another entity
    #[error("Tiles already occupied")]
    Overlap { conflicting_tiles: Vec<Position> },
    /// An entity with the same id is already on the floor
    #[error("Already placed on this floor")]
    AlreadyPlaced { entity_id: EntityId },
}

/// Accumulated outcome of all placement checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementValidation {
    /// Failures in check order: bounds, then overlap
    pub errors: Vec<PlacementError>,
}

impl PlacementValidation {
    /// Whether every check passed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// User-facing messages, one per failed check.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Tiles reported by the overlap check, for highlighting.
    pub fn conflicting_tiles(&self) -> &[Position] {
        self.errors
            .iter()
            .find_map(|error| match error {
                PlacementError::Overlap { conflicting_tiles } => Some(conflicting_tiles.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    fn into_result(self) -> Result<(), PlacementRejection> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(PlacementRejection {
                errors: self.errors,
            })
        }
    }
}

/// A placement refused by the executor, carrying every reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRejection {
    pub errors: Vec<PlacementError>,
}

impl std::fmt::Display for PlacementRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        f.write_str(&format_errors(&messages))
    }
}

impl std::error::Error for PlacementRejection {}

fn tiles_in_bounds(tiles: &[Position]) -> Result<(), PlacementError> {
    if tiles.iter().all(|pos| pos.is_within_grid()) {
        Ok(())
    } else {
        Err(PlacementError::OutOfBounds)
    }
}

fn tiles_unoccupied(tiles: &[Position], grid: &Grid) -> Result<(), PlacementError> {
    // Out-of-grid tiles are the bounds check's concern, not conflicts.
    let conflicting_tiles: Vec<Position> = tiles
        .iter()
        .copied()
        .filter(|&pos| grid.is_occupied(pos))
        .collect();

    if conflicting_tiles.is_empty() {
        Ok(())
    } else {
        Err(PlacementError::Overlap { conflicting_tiles })
    }
}

fn validate_tiles(tiles: &[Position], grid: &Grid) -> PlacementValidation {
    let errors = [tiles_in_bounds(tiles), tiles_unoccupied(tiles, grid)]
        .into_iter()
        .filter_map(Result::err)
        .collect();
    PlacementValidation { errors }
}

/// Checks that every tile of the shape at `anchor` lies inside the grid.
///
/// # Examples
///
/// ```
/// use burrow::{validate_bounds, Position, RoomShape};
///
/// let shape = RoomShape::rectangle("square-2", 2, 2);
/// assert!(validate_bounds(&shape, Position::new(0, 0)).is_ok());
/// assert!(validate_bounds(&shape, Position::new(19, 0)).is_err());
/// ```
pub fn validate_bounds(shape: &RoomShape, anchor: Position) -> Result<(), PlacementError> {
    tiles_in_bounds(&absolute_tiles(shape, anchor))
}

/// Checks that every tile of the shape at `anchor` is free on `grid`.
///
/// The error lists the conflicting tiles in shape order.
pub fn validate_no_overlap(
    shape: &RoomShape,
    anchor: Position,
    grid: &Grid,
) -> Result<(), PlacementError> {
    tiles_unoccupied(&absolute_tiles(shape, anchor), grid)
}

/// Runs the bounds and overlap checks independently, collecting both failures.
pub fn validate(shape: &RoomShape, anchor: Position, grid: &Grid) -> PlacementValidation {
    validate_tiles(&absolute_tiles(shape, anchor), grid)
}

/// Joins error messages into one sentence for the player.
///
/// # Examples
///
/// ```
/// use burrow::format_errors;
///
/// let message = format_errors(&["Room extends beyond grid boundary", "Tiles already occupied"]);
/// assert_eq!(
///     message,
///     "Cannot place room: room extends beyond grid boundary, tiles already occupied"
/// );
/// assert_eq!(format_errors::<&str>(&[]), "");
/// ```
pub fn format_errors<S: AsRef<str>>(errors: &[S]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let joined = errors
        .iter()
        .map(|error| error.as_ref().to_lowercase())
        .collect::<Vec<_>>()
        .join(", ");
    format!("Cannot place room: {}", joined)
}

/// Returns a copy of `grid` with every listed tile owned by `occupant`.
pub fn occupy_tiles(grid: &Grid, tiles: &[Position], occupant: Occupant) -> Grid {
    let mut grid = grid.clone();
    for &pos in tiles {
        grid.set_tile(pos, Tile::with_occupant(occupant));
    }
    grid
}

/// Returns a copy of `grid` with the listed tiles owned by `occupant` emptied.
///
/// Tiles owned by anything else are left alone.
pub fn clear_tiles(grid: &Grid, tiles: &[Position], occupant: Occupant) -> Grid {
    let mut grid = grid.clone();
    for &pos in tiles {
        if grid.tile(pos).map(|tile| tile.occupant) == Some(occupant) {
            grid.set_tile(pos, Tile::empty());
        }
    }
    grid
}

/// Places a room on a floor, returning the new floor.
///
/// A room whose id is already on the floor is refused, so every room id owns
/// exactly one footprint.
///
/// # Examples
///
/// ```
/// use burrow::{place_on_floor, Biome, Floor, PlacedRoom, Position, RoomShape};
///
/// let shape = RoomShape::rectangle("square-2", 2, 2);
/// let floor = Floor::new(0, Biome::Neutral);
/// let room = PlacedRoom::new("crystal-mine", "square-2", Position::new(1, 1));
///
/// let placed = place_on_floor(&floor, room, &shape).unwrap();
/// assert_eq!(placed.rooms.len(), 1);
/// assert_eq!(placed.grid.occupied_count(), 4);
/// assert!(floor.rooms.is_empty());
/// ```
pub fn place_on_floor(
    floor: &Floor,
    room: PlacedRoom,
    shape: &RoomShape,
) -> Result<Floor, PlacementRejection> {
    if floor.room(room.id).is_some() {
        return Err(PlacementRejection {
            errors: vec![PlacementError::AlreadyPlaced { entity_id: room.id }],
        });
    }
    let tiles = absolute_tiles(shape, room.anchor);
    validate_tiles(&tiles, &floor.grid).into_result()?;

    log::debug!(
        "Placing {} ({}) at {} on floor {}",
        room.room_type_id,
        room.id,
        room.anchor,
        floor.depth
    );

    let mut placed = floor.clone();
    placed.grid = occupy_tiles(&floor.grid, &tiles, Occupant::Room(room.id));
    placed.rooms.push(room);
    Ok(placed)
}

/// Removes a room from a floor, returning the new floor.
///
/// Returns `None` when the room is not on the floor. Inhabitants working in
/// the room become unassigned and connections to it are dropped.
pub fn remove_from_floor(floor: &Floor, room_id: EntityId, shape: &RoomShape) -> Option<Floor> {
    let room = floor.room(room_id)?;
    let tiles = absolute_tiles(shape, room.anchor);

    log::debug!(
        "Removing {} ({}) from floor {}",
        room.room_type_id,
        room_id,
        floor.depth
    );

    let mut removed = floor.clone();
    removed.grid = clear_tiles(&floor.grid, &tiles, Occupant::Room(room_id));
    removed.rooms.retain(|room| room.id != room_id);
    removed.connections.retain(|connection| !connection.involves(room_id));
    for inhabitant in removed.inhabitants.iter_mut() {
        if inhabitant.assigned_room_id == Some(room_id) {
            inhabitant.assigned_room_id = None;
        }
    }
    Some(removed)
}

/// Places a hallway on a floor under the same rules as rooms.
pub fn place_hallway_on_floor(
    floor: &Floor,
    hallway: Hallway,
) -> Result<Floor, PlacementRejection> {
    if floor.hallways.iter().any(|existing| existing.id == hallway.id) {
        return Err(PlacementRejection {
            errors: vec![PlacementError::AlreadyPlaced {
                entity_id: hallway.id,
            }],
        });
    }
    validate_tiles(&hallway.tiles, &floor.grid).into_result()?;

    let mut placed = floor.clone();
    placed.grid = occupy_tiles(&floor.grid, &hallway.tiles, Occupant::Hallway(hallway.id));
    placed.hallways.push(hallway);
    Ok(placed)
}

/// Whether a room of the given type exists on any floor.
pub fn is_unique_type_placed(floors: &[Floor], room_type_id: &str) -> bool {
    floors
        .iter()
        .flat_map(|floor| floor.rooms.iter())
        .any(|room| room.room_type_id == room_type_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GRID_SIZE;
    use crate::world::{Biome, Connection, InhabitantInstance};

    fn square() -> RoomShape {
        RoomShape::rectangle("square-2", 2, 2)
    }

    fn floor_with_room_at(anchor: Position) -> (Floor, PlacedRoom) {
        let room = PlacedRoom::new("crystal-mine", "square-2", anchor);
        let floor = place_on_floor(&Floor::new(0, Biome::Neutral), room.clone(), &square()).unwrap();
        (floor, room)
    }

    #[test]
    fn test_validate_accepts_free_in_bounds_placement() {
        let result = validate(&square(), Position::new(5, 5), &Grid::new());
        assert!(result.is_valid());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_validate_bounds_edges() {
        let shape = square();
        assert!(validate_bounds(&shape, Position::new(GRID_SIZE - 2, GRID_SIZE - 2)).is_ok());
        assert_eq!(
            validate_bounds(&shape, Position::new(GRID_SIZE - 1, 0)),
            Err(PlacementError::OutOfBounds)
        );
        assert_eq!(
            validate_bounds(&shape, Position::new(-1, 3)),
            Err(PlacementError::OutOfBounds)
        );
    }

    #[test]
    fn test_overlap_lists_exact_conflicts() {
        let (floor, _) = floor_with_room_at(Position::new(4, 4));

        let err = validate_no_overlap(&square(), Position::new(5, 5), &floor.grid).unwrap_err();
        assert_eq!(
            err,
            PlacementError::Overlap {
                conflicting_tiles: vec![Position::new(5, 5)]
            }
        );
        assert_eq!(err.to_string(), "Tiles already occupied");
    }

    #[test]
    fn test_validate_reports_bounds_then_overlap() {
        let (floor, _) = floor_with_room_at(Position::new(GRID_SIZE - 2, 0));

        let result = validate(&square(), Position::new(GRID_SIZE - 1, 1), &floor.grid);
        assert!(!result.is_valid());
        assert_eq!(
            result.messages(),
            vec![
                "Room extends beyond grid boundary".to_string(),
                "Tiles already occupied".to_string()
            ]
        );
        assert_eq!(result.conflicting_tiles(), &[Position::new(GRID_SIZE - 1, 1)]);
    }

    #[test]
    fn test_format_errors_passes_unknown_through_lowercased() {
        assert_eq!(
            format_errors(&["Something ODD happened"]),
            "Cannot place room: something odd happened"
        );
    }

    #[test]
    fn test_place_marks_tiles_and_leaves_input() {
        let floor = Floor::new(0, Biome::Neutral);
        let room = PlacedRoom::new("crystal-mine", "square-2", Position::new(2, 3));
        let placed = place_on_floor(&floor, room.clone(), &square()).unwrap();

        assert_eq!(floor.grid.occupied_count(), 0);
        assert!(floor.rooms.is_empty());

        for pos in absolute_tiles(&square(), room.anchor) {
            let tile = placed.grid.tile(pos).unwrap();
            assert_eq!(tile.occupant, Occupant::Room(room.id));
        }
        assert_eq!(placed.rooms, vec![room]);
    }

    #[test]
    fn test_place_rejects_overlap_with_reasons() {
        let (floor, _) = floor_with_room_at(Position::new(4, 4));
        let intruder = PlacedRoom::new("crystal-mine", "square-2", Position::new(3, 3));

        let rejection = place_on_floor(&floor, intruder, &square()).unwrap_err();
        assert_eq!(
            rejection.to_string(),
            "Cannot place room: tiles already occupied"
        );
    }

    #[test]
    fn test_remove_restores_grid() {
        let empty = Floor::new(0, Biome::Neutral);
        let (floor, room) = floor_with_room_at(Position::new(7, 7));

        let removed = remove_from_floor(&floor, room.id, &square()).unwrap();
        assert_eq!(removed.grid, empty.grid);
        assert!(removed.rooms.is_empty());
        assert_eq!(floor.rooms.len(), 1);
    }

    #[test]
    fn test_remove_unknown_room_is_none() {
        let (floor, _) = floor_with_room_at(Position::new(7, 7));
        assert!(remove_from_floor(&floor, crate::new_entity_id(), &square()).is_none());
    }

    #[test]
    fn test_remove_drops_references() {
        let (floor, room) = floor_with_room_at(Position::new(0, 0));
        let other = PlacedRoom::new("crystal-mine", "square-2", Position::new(2, 0));
        let mut floor = place_on_floor(&floor, other.clone(), &square()).unwrap();

        floor.connections.push(Connection::new(room.id, other.id));
        let floor = floor.with_inhabitant(InhabitantInstance::assigned("goblin", room.id));

        let removed = remove_from_floor(&floor, room.id, &square()).unwrap();
        assert!(removed.connections.is_empty());
        assert!(removed.inhabitants[0].assigned_room_id.is_none());
        assert_eq!(removed.rooms, vec![other]);
    }

    #[test]
    fn test_place_refuses_same_room_twice() {
        let (floor, room) = floor_with_room_at(Position::new(0, 0));
        let moved = PlacedRoom {
            anchor: Position::new(5, 5),
            ..room.clone()
        };

        let rejection = place_on_floor(&floor, moved, &square()).unwrap_err();
        assert_eq!(
            rejection.errors,
            vec![PlacementError::AlreadyPlaced { entity_id: room.id }]
        );
        assert_eq!(
            rejection.to_string(),
            "Cannot place room: already placed on this floor"
        );

        let removed = remove_from_floor(&floor, room.id, &square()).unwrap();
        assert!(removed.rooms.is_empty());
        assert_eq!(removed.grid.occupied_count(), 0);
    }

    #[test]
    fn test_extreme_anchors_are_out_of_bounds() {
        let shape = square();
        for anchor in [
            Position::new(i32::MAX, 0),
            Position::new(0, i32::MAX),
            Position::new(i32::MIN, 0),
            Position::new(i32::MAX - 1, i32::MIN + 1),
        ] {
            assert_eq!(validate_bounds(&shape, anchor), Err(PlacementError::OutOfBounds));
            assert!(validate_no_overlap(&shape, anchor, &Grid::new()).is_ok());

            let result = validate(&shape, anchor, &Grid::new());
            assert_eq!(result.errors, vec![PlacementError::OutOfBounds]);

            let room = PlacedRoom::new("crystal-mine", "square-2", anchor);
            assert!(place_on_floor(&Floor::new(0, Biome::Neutral), room, &shape).is_err());
        }
    }

    #[test]
    fn test_hallway_placement_blocks_rooms() {
        let hallway = Hallway::new(vec![Position::new(3, 3), Position::new(4, 3)]);
        let floor = place_hallway_on_floor(&Floor::new(0, Biome::Neutral), hallway.clone()).unwrap();
        assert_eq!(
            floor.grid.tile(Position::new(3, 3)).unwrap().occupant,
            Occupant::Hallway(hallway.id)
        );

        let room = PlacedRoom::new("crystal-mine", "square-2", Position::new(2, 2));
        assert!(place_on_floor(&floor, room, &square()).is_err());
    }

    #[test]
    fn test_is_unique_type_placed() {
        let (floor, _) = floor_with_room_at(Position::new(0, 0));
        let floors = vec![Floor::new(0, Biome::Neutral), floor];
        assert!(is_unique_type_placed(&floors, "crystal-mine"));
        assert!(!is_unique_type_placed(&floors, "throne-room"));
    }
}
