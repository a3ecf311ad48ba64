//! Property tests for placement validation, adjacency and upgrade exclusivity.

use burrow::config::GRID_SIZE;
use burrow::{
    absolute_tiles, are_adjacent, place_on_floor, remove_from_floor, validate, validate_bounds,
    Biome, ContentCatalog, Floor, PlacedRoom, PlacementError, Position, RoomShape, UpgradeError,
    UpgradeResolver,
};
use proptest::prelude::*;

fn builtin_shapes() -> Vec<RoomShape> {
    let catalog = ContentCatalog::builtin().expect("builtin catalog loads");
    [
        "square-1", "square-2", "square-3", "l-shape", "t-shape", "i-shape",
    ]
    .iter()
    .map(|id| catalog.shape(id).expect("builtin shape").clone())
    .collect()
}

fn shape_strategy() -> impl Strategy<Value = RoomShape> {
    prop::sample::select(builtin_shapes())
}

fn tile_set_strategy() -> impl Strategy<Value = Vec<Position>> {
    prop::collection::vec((-2_i32..8, -2_i32..8), 0..8)
        .prop_map(|coords| coords.into_iter().map(|(x, y)| Position::new(x, y)).collect())
}

fn fits(shape: &RoomShape, anchor: Position) -> bool {
    absolute_tiles(shape, anchor)
        .iter()
        .all(|pos| pos.is_within_grid())
}

proptest! {
    #[test]
    fn in_bounds_placement_on_empty_grid_is_valid(
        shape in shape_strategy(),
        x in 0_i32..GRID_SIZE,
        y in 0_i32..GRID_SIZE,
    ) {
        let anchor = Position::new(x, y);
        prop_assume!(fits(&shape, anchor));

        let floor = Floor::new(0, Biome::Neutral);
        let result = validate(&shape, anchor, &floor.grid);
        prop_assert!(result.is_valid());
        prop_assert!(result.errors.is_empty());
    }

    #[test]
    fn out_of_bounds_is_reported_alongside_overlap(
        shape in shape_strategy(),
        x in -4_i32..(GRID_SIZE + 4),
        y in -4_i32..(GRID_SIZE + 4),
    ) {
        let anchor = Position::new(x, y);
        prop_assume!(!fits(&shape, anchor));
        prop_assert_eq!(validate_bounds(&shape, anchor), Err(PlacementError::OutOfBounds));

        // Fill the whole grid so any in-grid tile overlaps as well
        let filler = RoomShape::rectangle("filler", GRID_SIZE as u32, GRID_SIZE as u32);
        let floor = place_on_floor(
            &Floor::new(0, Biome::Neutral),
            PlacedRoom::new("filler", "filler", Position::new(0, 0)),
            &filler,
        ).expect("filler fits");

        let result = validate(&shape, anchor, &floor.grid);
        prop_assert_eq!(&result.errors[0], &PlacementError::OutOfBounds);

        let any_inside = absolute_tiles(&shape, anchor).iter().any(|pos| pos.is_within_grid());
        prop_assert_eq!(result.errors.len(), if any_inside { 2 } else { 1 });
    }

    #[test]
    fn place_then_remove_restores_grid(
        shape in shape_strategy(),
        x in 0_i32..GRID_SIZE,
        y in 0_i32..GRID_SIZE,
        neighbour_x in 0_i32..GRID_SIZE,
    ) {
        let anchor = Position::new(x, y);
        prop_assume!(fits(&shape, anchor));

        // Start from a floor that already holds something
        let single = RoomShape::rectangle("square-1", 1, 1);
        let start = place_on_floor(
            &Floor::new(0, Biome::Neutral),
            PlacedRoom::new("soul-well", "square-1", Position::new(neighbour_x, GRID_SIZE - 1)),
            &single,
        ).expect("corner room fits");

        let room = PlacedRoom::new("test-room", shape.id.clone(), anchor);
        if let Ok(placed) = place_on_floor(&start, room.clone(), &shape) {
            let removed = remove_from_floor(&placed, room.id, &shape).expect("room is on floor");
            prop_assert_eq!(&removed.grid, &start.grid);
            prop_assert_eq!(removed.rooms.len(), start.rooms.len());
        }
    }

    #[test]
    fn adjacency_is_symmetric(a in tile_set_strategy(), b in tile_set_strategy()) {
        prop_assert_eq!(are_adjacent(&a, &b), are_adjacent(&b, &a));
    }

    #[test]
    fn upgraded_rooms_reject_every_path(
        first in 0_usize..3,
        second in 0_usize..3,
        dark_unlocked in any::<bool>(),
    ) {
        let catalog = ContentCatalog::builtin().expect("builtin catalog loads");
        let resolver = UpgradeResolver::new(&catalog);
        let paths = resolver.get_paths("crystal-mine");
        let room = PlacedRoom::new("crystal-mine", "l-shape", Position::new(0, 0));

        let upgraded = resolver.apply(&room, &paths[first].id);
        prop_assert_eq!(
            resolver.can_apply(&upgraded, &paths[second].id, dark_unlocked),
            Err(UpgradeError::AlreadyUpgraded)
        );
        prop_assert!(resolver.get_visible(&upgraded, dark_unlocked).is_empty());
    }

    #[test]
    fn unlocked_paths_are_never_locked(dark_unlocked in any::<bool>()) {
        let catalog = ContentCatalog::builtin().expect("builtin catalog loads");
        let resolver = UpgradeResolver::new(&catalog);

        for definition in catalog.room_definitions() {
            let room = PlacedRoom::new(definition.id.clone(), definition.shape_id.clone(), Position::new(0, 0));
            for visible in resolver.get_visible(&room, dark_unlocked) {
                if dark_unlocked {
                    prop_assert!(!visible.locked);
                }
                prop_assert_eq!(visible.locked, visible.lock_reason.is_some());
            }
        }
    }
}
