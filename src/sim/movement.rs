//! Wall-limited travel
//!
//! The crux of the simulation: translating "go that way" into a true,
//! wall-respecting displacement under continuous coordinates. Limits are
//! computed fresh from the grid every query, so repeated calls with the
//! same inputs agree and nothing here holds hidden state.
//!
//! Travel limits land on cell centers: the furthest point reachable is the
//! center of the last free cell before a blocking cell, keeping rounded
//! positions strictly inside free cells.

use glam::Vec2;

use super::geometry::{is_axis_aligned, Axis, Direction, GridPos};
use super::maze::{Cell, InvariantViolation, Maze};
use crate::tuning::Tuning;

/// Movement queries for one agent class against one maze.
///
/// Gates block the primary agent but not pursuers; the class is fixed at
/// construction so every query on a `Motion` answers for the same mask.
#[derive(Clone, Copy)]
pub struct Motion<'a> {
    maze: &'a Maze,
    tuning: &'a Tuning,
    block_mask: u16,
}

impl<'a> Motion<'a> {
    pub fn new(maze: &'a Maze, tuning: &'a Tuning, passable_gates: bool) -> Self {
        let block_mask = if passable_gates {
            Cell::WALL
        } else {
            Cell::WALL | Cell::GATE
        };
        Self {
            maze,
            tuning,
            block_mask,
        }
    }

    /// Whether `pos` refuses this agent class. Out of bounds blocks like
    /// a wall (mazes are bounded, not toroidal).
    #[inline]
    fn blocks(&self, pos: GridPos) -> bool {
        self.maze
            .cell_at(pos)
            .is_none_or(|cell| cell.has(self.block_mask))
    }

    /// Furthest point reachable from `location` along `direction` before
    /// entering a blocking cell.
    ///
    /// The returned point carries the direction-axis coordinate of the
    /// last free cell center and preserves the caller's perpendicular
    /// coordinate. An agent offset from the centerline by more than the
    /// corner tolerance cannot cut past a blocking diagonal neighbor, so
    /// its travel is capped at one cell-step.
    pub fn wall_limit_from(
        &self,
        location: Vec2,
        direction: Direction,
    ) -> Result<Vec2, InvariantViolation> {
        let cell = GridPos::containing(location);
        if self.blocks(cell) {
            return Err(InvariantViolation::InsideWall {
                x: cell.x,
                y: cell.y,
            });
        }
        let center = cell.center();

        let offset = match direction.axis() {
            Axis::X => location.y - center.y,
            Axis::Y => location.x - center.x,
        };

        let mut cap = f32::INFINITY;
        if offset.abs() > self.tuning.corner_correct {
            let side = offset.signum() as i32;
            let diagonal = match direction.axis() {
                Axis::X => cell.step(direction).offset(0, side),
                Axis::Y => cell.step(direction).offset(side, 0),
            };
            if self.blocks(diagonal) {
                cap = 1.0;
            }
        }

        let mut travel = 0.0f32;
        let mut probe = cell.step(direction);
        while travel < cap && !self.blocks(probe) {
            travel += 1.0;
            probe = probe.step(direction);
        }

        let limit = center + direction.delta() * travel;
        Ok(match direction.axis() {
            Axis::X => Vec2::new(limit.x, location.y),
            Axis::Y => Vec2::new(location.x, limit.y),
        })
    }

    /// Wall limits for all four cardinals, in [`Direction::ALL`] order.
    pub fn allowable_directions(
        &self,
        location: Vec2,
    ) -> Result<Vec<(Direction, Vec2)>, InvariantViolation> {
        Direction::ALL
            .iter()
            .map(|&dir| Ok((dir, self.wall_limit_from(location, dir)?)))
            .collect()
    }

    /// Move from `location` along `direction` by at most `step_distance`,
    /// clamped to the wall limit. Never lands past the limit, therefore
    /// never inside a wall.
    pub fn advance(
        &self,
        location: Vec2,
        direction: Direction,
        step_distance: f32,
    ) -> Result<Vec2, InvariantViolation> {
        let limit = self.wall_limit_from(location, direction)?;
        debug_assert!(is_axis_aligned(limit - location, self.tuning.epsilon));
        let remaining = (limit - location).dot(direction.delta()).max(0.0);
        Ok(location + direction.delta() * remaining.min(step_distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::manhattan;
    use proptest::prelude::*;

    const PEN: &str = "
        +-------+
        |ooooooo|
        |o-----o|
        |oxxxoo*|
        |o-=---o|
        |ooo@ooo|
        +-------+
    ";

    const RING: &str = "
        +---+
        |ooo|
        |o-o|
        |ooo|
        +---+
    ";

    fn fixture(text: &str) -> (Maze, Tuning) {
        (Maze::parse(text).unwrap(), Tuning::default())
    }

    #[test]
    fn test_limit_stops_at_last_free_center() {
        let (maze, tuning) = fixture("+-----+\n|ooooo|\n+-----+");
        let motion = Motion::new(&maze, &tuning, false);
        let from = Vec2::new(3.0, 1.0);

        let east = motion.wall_limit_from(from, Direction::East).unwrap();
        assert_eq!(east, Vec2::new(5.0, 1.0));
        let west = motion.wall_limit_from(from, Direction::West).unwrap();
        assert_eq!(west, Vec2::new(1.0, 1.0));
        // Walled in above and below: no room at all.
        let north = motion.wall_limit_from(from, Direction::North).unwrap();
        assert_eq!(north, from);
    }

    #[test]
    fn test_limit_preserves_perpendicular_coordinate() {
        let (maze, tuning) = fixture("+-----+\n|ooooo|\n+-----+");
        let motion = Motion::new(&maze, &tuning, false);
        let from = Vec2::new(3.0, 1.1);
        let east = motion.wall_limit_from(from, Direction::East).unwrap();
        assert_eq!(east, Vec2::new(5.0, 1.1));
    }

    #[test]
    fn test_offset_agent_cannot_cut_a_blocked_corner() {
        let (maze, tuning) = fixture(RING);
        let motion = Motion::new(&maze, &tuning, false);

        // Offset 0.3 below the centerline of row 1, heading east past the
        // island wall at (2, 2): capped one cell out.
        let capped = motion
            .wall_limit_from(Vec2::new(1.0, 1.3), Direction::East)
            .unwrap();
        assert_eq!(capped, Vec2::new(2.0, 1.3));

        // Mirrored offset toward the top border: same cap.
        let mirrored = motion
            .wall_limit_from(Vec2::new(1.0, 0.7), Direction::East)
            .unwrap();
        assert_eq!(mirrored, Vec2::new(2.0, 0.7));

        // Inside the tolerance the full run opens up.
        let aligned = motion
            .wall_limit_from(Vec2::new(1.0, 1.2), Direction::East)
            .unwrap();
        assert_eq!(aligned, Vec2::new(3.0, 1.2));
    }

    #[test]
    fn test_gates_block_only_the_primary_class() {
        let (maze, tuning) = fixture(PEN);
        let from = Vec2::new(3.0, 5.0);

        // Gate at (3, 4) seals the primary in the corridor.
        let primary = Motion::new(&maze, &tuning, false);
        let sealed = primary.wall_limit_from(from, Direction::North).unwrap();
        assert_eq!(sealed, from);

        // A pursuer passes the gate and runs to the pen row.
        let pursuer = Motion::new(&maze, &tuning, true);
        let open = pursuer.wall_limit_from(from, Direction::North).unwrap();
        assert_eq!(open, Vec2::new(3.0, 3.0));
    }

    #[test]
    fn test_pursuer_may_stand_on_a_gate() {
        let (maze, tuning) = fixture(PEN);
        let gate = Vec2::new(3.0, 4.0);
        let pursuer = Motion::new(&maze, &tuning, true);
        assert!(pursuer.wall_limit_from(gate, Direction::North).is_ok());

        let primary = Motion::new(&maze, &tuning, false);
        assert_eq!(
            primary.wall_limit_from(gate, Direction::North),
            Err(InvariantViolation::InsideWall { x: 3, y: 4 })
        );
    }

    #[test]
    fn test_inside_wall_is_an_invariant_violation() {
        let (maze, tuning) = fixture(PEN);
        let motion = Motion::new(&maze, &tuning, false);
        assert_eq!(
            motion.wall_limit_from(Vec2::ZERO, Direction::East),
            Err(InvariantViolation::InsideWall { x: 0, y: 0 })
        );
    }

    #[test]
    fn test_maze_edge_blocks_like_a_wall() {
        // A borderless strip: travel stops at the last in-bounds cell.
        let (maze, tuning) = fixture("ooo");
        let motion = Motion::new(&maze, &tuning, false);
        let limit = motion
            .wall_limit_from(Vec2::new(1.0, 0.0), Direction::East)
            .unwrap();
        assert_eq!(limit, Vec2::new(2.0, 0.0));
        let north = motion
            .wall_limit_from(Vec2::new(1.0, 0.0), Direction::North)
            .unwrap();
        assert_eq!(north, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_allowable_directions_covers_all_cardinals_in_order() {
        let (maze, tuning) = fixture(PEN);
        let motion = Motion::new(&maze, &tuning, false);
        let limits = motion.allowable_directions(Vec2::new(4.0, 5.0)).unwrap();
        let dirs: Vec<Direction> = limits.iter().map(|&(dir, _)| dir).collect();
        assert_eq!(dirs, Direction::ALL.to_vec());
    }

    #[test]
    fn test_advance_clamps_to_step_then_to_limit() {
        let (maze, tuning) = fixture("+-----+\n|ooooo|\n+-----+");
        let motion = Motion::new(&maze, &tuning, false);

        let stepped = motion
            .advance(Vec2::new(3.0, 1.0), Direction::East, 0.125)
            .unwrap();
        assert_eq!(stepped, Vec2::new(3.125, 1.0));

        // Near the limit the step truncates; a further advance holds.
        let near = motion
            .advance(Vec2::new(4.95, 1.0), Direction::East, 0.125)
            .unwrap();
        assert!((near.x - 5.0).abs() < 1e-6);
        let held = motion.advance(near, Direction::East, 0.125).unwrap();
        assert!((held.x - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_advance_holds_still_past_the_limit() {
        let (maze, tuning) = fixture("+-----+\n|ooooo|\n+-----+");
        let motion = Motion::new(&maze, &tuning, false);

        // Placed east of the last free center: no room remains, so a
        // step toward the wall must not move at all.
        let held = motion
            .advance(Vec2::new(5.3, 1.0), Direction::East, 0.125)
            .unwrap();
        assert_eq!(held, Vec2::new(5.3, 1.0));
    }

    fn free_cells(maze: &Maze) -> Vec<GridPos> {
        maze.locations_with(
            Cell::COOKIE | Cell::PILL | Cell::START_PRIMARY | Cell::START_PURSUER,
        )
        .collect()
    }

    proptest! {
        #[test]
        fn prop_limit_never_lands_in_a_blocking_cell(
            pick in 0usize..4096,
            dx in -0.49f32..0.49,
            dy in -0.49f32..0.49,
            dir in 0usize..4,
            passable in proptest::bool::ANY,
        ) {
            let (maze, tuning) = fixture(PEN);
            let free = free_cells(&maze);
            let location = free[pick % free.len()].center() + Vec2::new(dx, dy);
            let direction = Direction::ALL[dir];

            let motion = Motion::new(&maze, &tuning, passable);
            let limit = motion.wall_limit_from(location, direction).unwrap();

            let mask = if passable { Cell::WALL } else { Cell::WALL | Cell::GATE };
            let landing = maze.cell_at(GridPos::containing(limit));
            prop_assert!(landing.is_some_and(|cell| !cell.has(mask)));
        }

        #[test]
        fn prop_limit_queries_are_idempotent(
            pick in 0usize..4096,
            dx in -0.49f32..0.49,
            dy in -0.49f32..0.49,
            dir in 0usize..4,
        ) {
            let (maze, tuning) = fixture(PEN);
            let free = free_cells(&maze);
            let location = free[pick % free.len()].center() + Vec2::new(dx, dy);
            let direction = Direction::ALL[dir];

            let motion = Motion::new(&maze, &tuning, true);
            let first = motion.wall_limit_from(location, direction).unwrap();
            let second = motion.wall_limit_from(location, direction).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_advance_is_bounded_by_step_and_limit(
            pick in 0usize..4096,
            dx in -0.49f32..0.49,
            dy in -0.49f32..0.49,
            dir in 0usize..4,
            step in 0.01f32..1.0,
        ) {
            let (maze, tuning) = fixture(PEN);
            let free = free_cells(&maze);
            let location = free[pick % free.len()].center() + Vec2::new(dx, dy);
            let direction = Direction::ALL[dir];

            let motion = Motion::new(&maze, &tuning, true);
            let limit = motion.wall_limit_from(location, direction).unwrap();
            let moved = motion.advance(location, direction, step).unwrap();

            prop_assert!(manhattan(moved - location) <= step + 1e-5);
            prop_assert!((moved - location).dot(direction.delta()) >= 0.0);
            let room = (limit - location).dot(direction.delta());
            if room > 0.0 {
                let past = (moved - limit).dot(direction.delta());
                prop_assert!(past <= 1e-5, "landed {past} past the limit");
            } else {
                // Already at or beyond the limit: advance holds still.
                prop_assert_eq!(moved, location);
            }
        }
    }
}
