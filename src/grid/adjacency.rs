//! # Adjacency
//!
//! Tile-level touching between placed entities, and the connection queries
//! layered on top of it.

use crate::catalog::{ContentCatalog, RoomTypeId};
use crate::grid::{absolute_tiles, Position};
use crate::world::{Connection, EntityId, Floor, PlacedRoom};
use crate::{BurrowError, BurrowResult};
use std::collections::{BTreeSet, HashSet};

/// Whether any tile of `a` shares an edge with any tile of `b`.
///
/// Diagonal contact does not count, nor do shared tiles. The relation is
/// symmetric.
///
/// # Examples
///
/// ```
/// use burrow::{are_adjacent, Position};
///
/// let left = [Position::new(0, 0), Position::new(1, 0)];
/// let right = [Position::new(2, 0)];
/// let diagonal = [Position::new(2, 1)];
/// assert!(are_adjacent(&left, &right));
/// assert!(!are_adjacent(&left, &diagonal));
/// ```
pub fn are_adjacent(a: &[Position], b: &[Position]) -> bool {
    let b_tiles: HashSet<Position> = b.iter().copied().collect();
    a.iter().any(|pos| {
        pos.cardinal_adjacent_positions()
            .iter()
            .any(|neighbour| b_tiles.contains(neighbour))
    })
}

/// Absolute tiles of a placed room, or `None` if its shape is unknown.
pub fn room_tiles(room: &PlacedRoom, catalog: &ContentCatalog) -> Option<Vec<Position>> {
    match catalog.shape_of(room) {
        Some(shape) => Some(absolute_tiles(shape, room.anchor)),
        None => {
            log::warn!(
                "Room {} uses unknown shape \"{}\"; treating it as having no tiles",
                room.id,
                room.shape_id
            );
            None
        }
    }
}

/// Absolute tiles of a room or hallway on the floor.
pub fn entity_tiles(
    floor: &Floor,
    entity_id: EntityId,
    catalog: &ContentCatalog,
) -> Option<Vec<Position>> {
    if let Some(room) = floor.room(entity_id) {
        return room_tiles(room, catalog);
    }
    floor.hallway(entity_id).map(|hallway| hallway.tiles.clone())
}

/// Ids of the other rooms touching `room`, in floor order.
pub fn get_adjacent_room_ids(
    room: &PlacedRoom,
    floor: &Floor,
    catalog: &ContentCatalog,
) -> Vec<EntityId> {
    let Some(tiles) = room_tiles(room, catalog) else {
        return Vec::new();
    };

    floor
        .rooms
        .iter()
        .filter(|other| other.id != room.id)
        .filter(|other| {
            room_tiles(other, catalog)
                .map(|other_tiles| are_adjacent(&tiles, &other_tiles))
                .unwrap_or(false)
        })
        .map(|other| other.id)
        .collect()
}

/// Distinct room types touching `room`.
pub fn get_adjacent_room_type_ids(
    room: &PlacedRoom,
    floor: &Floor,
    catalog: &ContentCatalog,
) -> BTreeSet<RoomTypeId> {
    get_adjacent_room_ids(room, floor, catalog)
        .into_iter()
        .filter_map(|id| floor.room(id))
        .map(|other| other.room_type_id.clone())
        .collect()
}

/// Rooms and hallways touching the given entity, rooms first.
pub fn get_adjacent_entities(
    floor: &Floor,
    entity_id: EntityId,
    catalog: &ContentCatalog,
) -> Vec<EntityId> {
    let Some(tiles) = entity_tiles(floor, entity_id, catalog) else {
        return Vec::new();
    };

    let rooms = floor.rooms.iter().filter_map(|room| {
        let other_tiles = room_tiles(room, catalog)?;
        Some((room.id, other_tiles))
    });
    let hallways = floor
        .hallways
        .iter()
        .map(|hallway| (hallway.id, hallway.tiles.clone()));

    rooms
        .chain(hallways)
        .filter(|(id, _)| *id != entity_id)
        .filter(|(_, other_tiles)| are_adjacent(&tiles, other_tiles))
        .map(|(id, _)| id)
        .collect()
}

/// Connections with `room_id` at either end.
pub fn get_room_connections(floor: &Floor, room_id: EntityId) -> Vec<&Connection> {
    floor
        .connections
        .iter()
        .filter(|connection| connection.involves(room_id))
        .collect()
}

/// Adjacent rooms and hallways not yet connected to `room_id`.
pub fn get_adjacent_unconnected(
    floor: &Floor,
    room_id: EntityId,
    catalog: &ContentCatalog,
) -> Vec<EntityId> {
    let connected: HashSet<EntityId> = get_room_connections(floor, room_id)
        .into_iter()
        .filter_map(|connection| connection.other_end(room_id))
        .collect();

    get_adjacent_entities(floor, room_id, catalog)
        .into_iter()
        .filter(|id| !connected.contains(id))
        .collect()
}

/// Connects two adjacent entities, returning the new floor.
pub fn connect_entities(
    floor: &Floor,
    entity_a: EntityId,
    entity_b: EntityId,
    catalog: &ContentCatalog,
) -> BurrowResult<Floor> {
    for id in [entity_a, entity_b] {
        if !floor.contains_entity(id) {
            return Err(BurrowError::EntityNotFound(id));
        }
    }
    if entity_a == entity_b {
        return Err(BurrowError::InvalidConnection(
            "an entity cannot connect to itself".to_string(),
        ));
    }
    if floor
        .connections
        .iter()
        .any(|connection| connection.links(entity_a, entity_b))
    {
        return Err(BurrowError::InvalidConnection(
            "entities are already connected".to_string(),
        ));
    }
    if !get_adjacent_entities(floor, entity_a, catalog).contains(&entity_b) {
        return Err(BurrowError::InvalidConnection(
            "entities are not adjacent".to_string(),
        ));
    }

    let mut connected = floor.clone();
    connected.connections.push(Connection::new(entity_a, entity_b));
    Ok(connected)
}

/// Removes a connection, returning the new floor, or `None` if it is absent.
pub fn disconnect(floor: &Floor, connection_id: EntityId) -> Option<Floor> {
    floor
        .connections
        .iter()
        .position(|connection| connection.id == connection_id)?;

    let mut disconnected = floor.clone();
    disconnected
        .connections
        .retain(|connection| connection.id != connection_id);
    Some(disconnected)
}
