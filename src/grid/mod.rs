//! # Grid Module
//!
//! Tile grid, per-tile occupancy and room shapes.
//!
//! This module holds the spatial building blocks of a floor:
//! - [`Position`] coordinates and their cardinal neighbours
//! - [`Tile`] occupancy, owned by at most one entity at a time
//! - [`Grid`], the fixed `GRID_SIZE` square of tiles every floor owns
//! - [`RoomShape`], a catalog polyomino translated onto the grid by an anchor
//!
//! Grids are never mutated in place by callers. The placement executor in
//! [`placement`] builds new grids from old ones.

pub mod adjacency;
pub mod placement;

pub use adjacency::*;
pub use placement::*;

use crate::config::GRID_SIZE;
use crate::EntityId;
use serde::{Deserialize, Serialize};

/// Represents a 2D tile coordinate on a floor grid.
///
/// # Examples
///
/// ```
/// use burrow::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let neighbours = pos.cardinal_adjacent_positions();
/// assert_eq!(neighbours.len(), 4);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translates by `offset`, saturating at the `i32` limits.
    ///
    /// A saturated coordinate is far outside any grid, so anchors that would
    /// overflow still fail bounds checks instead of wrapping back in.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::Position;
    ///
    /// assert_eq!(Position::new(3, 4).offset_by(Position::new(-1, 2)), Position::new(2, 6));
    /// assert_eq!(Position::new(i32::MAX, 0).offset_by(Position::new(1, 0)).x, i32::MAX);
    /// ```
    pub fn offset_by(self, offset: Position) -> Self {
        Self::new(
            self.x.saturating_add(offset.x),
            self.y.saturating_add(offset.y),
        )
    }

    /// Returns the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1), // N
            Position::new(self.x - 1, self.y), // W
            Position::new(self.x + 1, self.y), // E
            Position::new(self.x, self.y + 1), // S
        ]
    }

    /// Whether this position lies inside a `GRID_SIZE` square grid.
    pub fn is_within_grid(self) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < GRID_SIZE && self.y < GRID_SIZE
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The kind of entity occupying a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupantKind {
    Empty,
    Room,
    Hallway,
    Stair,
    Elevator,
    Portal,
}

/// What a tile holds, together with the owning entity id.
///
/// Carrying the id inside the variant means a tile can never claim two owners
/// or name an owner while empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Occupant {
    #[default]
    Empty,
    Room(EntityId),
    Hallway(EntityId),
    Stair(EntityId),
    Elevator(EntityId),
    Portal(EntityId),
}

impl Occupant {
    /// The kind of this occupant.
    pub fn kind(&self) -> OccupantKind {
        match self {
            Occupant::Empty => OccupantKind::Empty,
            Occupant::Room(_) => OccupantKind::Room,
            Occupant::Hallway(_) => OccupantKind::Hallway,
            Occupant::Stair(_) => OccupantKind::Stair,
            Occupant::Elevator(_) => OccupantKind::Elevator,
            Occupant::Portal(_) => OccupantKind::Portal,
        }
    }

    /// The owning entity id, if any.
    pub fn entity_id(&self) -> Option<EntityId> {
        match *self {
            Occupant::Empty => None,
            Occupant::Room(id)
            | Occupant::Hallway(id)
            | Occupant::Stair(id)
            | Occupant::Elevator(id)
            | Occupant::Portal(id) => Some(id),
        }
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    pub occupant: Occupant,
}

impl Tile {
    /// Creates an unoccupied tile.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a tile owned by the given occupant.
    pub fn with_occupant(occupant: Occupant) -> Self {
        Self { occupant }
    }

    /// Whether anything occupies this tile.
    pub fn is_occupied(&self) -> bool {
        self.occupant != Occupant::Empty
    }

    /// The kind of entity occupying this tile.
    pub fn occupied_by(&self) -> OccupantKind {
        self.occupant.kind()
    }
}

/// Square tile grid owned by a single floor.
///
/// Tiles are stored row-major as `tiles[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub tiles: Vec<Vec<Tile>>,
}

impl Grid {
    /// Creates a grid with every tile unoccupied.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{Grid, Position};
    ///
    /// let grid = Grid::new();
    /// assert_eq!(grid.occupied_count(), 0);
    /// assert!(grid.tile(Position::new(0, 0)).is_some());
    /// assert!(grid.tile(Position::new(-1, 0)).is_none());
    /// ```
    pub fn new() -> Self {
        let size = GRID_SIZE as usize;
        Self {
            tiles: vec![vec![Tile::empty(); size]; size],
        }
    }

    /// Gets the tile at a position, or `None` outside the grid.
    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        if !pos.is_within_grid() {
            return None;
        }
        self.tiles
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
    }

    /// Whether the tile at `pos` is occupied. Out-of-grid positions are not.
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.tile(pos).map(Tile::is_occupied).unwrap_or(false)
    }

    /// Number of occupied tiles.
    pub fn occupied_count(&self) -> usize {
        self.tiles
            .iter()
            .flat_map(|row| row.iter())
            .filter(|tile| tile.is_occupied())
            .count()
    }

    /// Positions of every tile owned by the given occupant.
    pub fn tiles_owned_by(&self, occupant: Occupant) -> Vec<Position> {
        let mut positions = Vec::new();
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if tile.occupant == occupant {
                    positions.push(Position::new(x as i32, y as i32));
                }
            }
        }
        positions
    }

    /// Overwrites a single tile. Out-of-grid positions are ignored.
    ///
    /// Only the placement executor writes tiles.
    pub(crate) fn set_tile(&mut self, pos: Position, tile: Tile) {
        if !pos.is_within_grid() {
            return;
        }
        if let Some(slot) = self
            .tiles
            .get_mut(pos.y as usize)
            .and_then(|row| row.get_mut(pos.x as usize))
        {
            *slot = tile;
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

/// Catalog identifier of a room shape.
pub type ShapeId = String;

/// A polyomino room footprint.
///
/// Offsets are relative to the anchor the room is placed at and need not be
/// normalized to start at (0, 0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomShape {
    /// Catalog identifier
    pub id: ShapeId,
    /// Bounding box width in tiles
    pub width: u32,
    /// Bounding box height in tiles
    pub height: u32,
    /// Tile offsets relative to the anchor
    pub tiles: Vec<Position>,
}

impl RoomShape {
    /// Creates a shape from its offsets, deriving the bounding box.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow::{Position, RoomShape};
    ///
    /// let l_shape = RoomShape::new(
    ///     "l-3",
    ///     vec![Position::new(0, 0), Position::new(0, 1), Position::new(1, 1)],
    /// );
    /// assert_eq!(l_shape.width, 2);
    /// assert_eq!(l_shape.height, 2);
    /// ```
    pub fn new(id: impl Into<ShapeId>, tiles: Vec<Position>) -> Self {
        let (width, height) = bounding_size(&tiles);
        Self {
            id: id.into(),
            width,
            height,
            tiles,
        }
    }

    /// Creates a filled `width` x `height` rectangle anchored at its top-left.
    pub fn rectangle(id: impl Into<ShapeId>, width: u32, height: u32) -> Self {
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                tiles.push(Position::new(x, y));
            }
        }
        Self {
            id: id.into(),
            width,
            height,
            tiles,
        }
    }

    /// Number of tiles in the footprint.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }
}

fn bounding_size(tiles: &[Position]) -> (u32, u32) {
    let (Some(min_x), Some(max_x)) = (
        tiles.iter().map(|p| p.x).min(),
        tiles.iter().map(|p| p.x).max(),
    ) else {
        return (0, 0);
    };
    let min_y = tiles.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = tiles.iter().map(|p| p.y).max().unwrap_or(0);
    ((max_x - min_x + 1) as u32, (max_y - min_y + 1) as u32)
}

/// Translates a shape's offsets by an anchor into absolute grid positions.
///
/// # Examples
///
/// ```
/// use burrow::{absolute_tiles, Position, RoomShape};
///
/// let shape = RoomShape::rectangle("square-2", 2, 2);
/// let tiles = absolute_tiles(&shape, Position::new(3, 4));
/// assert!(tiles.contains(&Position::new(4, 5)));
/// assert_eq!(tiles.len(), 4);
/// ```
pub fn absolute_tiles(shape: &RoomShape, anchor: Position) -> Vec<Position> {
    shape.tiles.iter().map(|&offset| anchor.offset_by(offset)).collect()
}
