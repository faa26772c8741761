//! Agent bodies, decision logic, and the breadcrumb follower
//!
//! Decision logic is a strategy trait: each policy owns whatever state it
//! needs (a remembered direction, a script) instead of sharing a loose
//! state bag. The session invokes one decision per agent per tick and
//! threads its seeded RNG through, so runs replay exactly.

use std::collections::VecDeque;
use std::fmt;

use glam::Vec2;
use rand::{Rng, RngCore};

use super::geometry::{is_close, manhattan, Direction, GridPos};
use super::maze::{Cell, InvariantViolation, Maze};
use super::session::BoardView;
use crate::tuning::Tuning;

/// A pluggable movement policy, invoked once per agent per tick.
///
/// Implementations read the board only through the view and must not
/// assume they move the agent themselves; they answer "which way" and the
/// session realizes the motion.
pub trait AgentLogic: Send + Sync {
    /// Static identifier of the policy.
    fn kind(&self) -> &'static str;

    /// Choose a direction from `location` against the current board.
    fn decide(
        &mut self,
        view: &BoardView<'_>,
        location: Vec2,
        rng: &mut dyn RngCore,
    ) -> Result<Direction, InvariantViolation>;
}

/// Reference pursuer policy: keep going while there is room, otherwise
/// pick uniformly among the directions that still have room.
#[derive(Debug, Default)]
pub struct RoamLogic {
    current: Option<Direction>,
}

impl RoamLogic {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AgentLogic for RoamLogic {
    fn kind(&self) -> &'static str {
        "roam"
    }

    fn decide(
        &mut self,
        view: &BoardView<'_>,
        location: Vec2,
        rng: &mut dyn RngCore,
    ) -> Result<Direction, InvariantViolation> {
        let limits = view.motion().allowable_directions(location)?;
        let bumper = view.tuning.wall_bumper;

        if let Some(current) = self.current {
            let (_, limit) = limits[current.index()];
            if manhattan(location - limit) > bumper {
                return Ok(current);
            }
        }

        let open: Vec<Direction> = limits
            .iter()
            .filter(|&&(_, limit)| manhattan(location - limit) > bumper)
            .map(|&(dir, _)| dir)
            .collect();
        let choice = if open.is_empty() {
            // Boxed in on all four sides; hold the old heading.
            self.current.unwrap_or(Direction::North)
        } else {
            open[rng.random_range(0..open.len())]
        };
        self.current = Some(choice);
        Ok(choice)
    }
}

/// Pursuit personality: of the directions with room, take the one that
/// closes the most manhattan distance to the primary agent, avoiding a
/// straight reversal when any other choice exists.
#[derive(Debug, Default)]
pub struct ChaseLogic {
    last: Option<Direction>,
}

impl ChaseLogic {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AgentLogic for ChaseLogic {
    fn kind(&self) -> &'static str {
        "chase"
    }

    fn decide(
        &mut self,
        view: &BoardView<'_>,
        location: Vec2,
        _rng: &mut dyn RngCore,
    ) -> Result<Direction, InvariantViolation> {
        let limits = view.motion().allowable_directions(location)?;
        let bumper = view.tuning.wall_bumper;

        let open: Vec<Direction> = limits
            .iter()
            .filter(|&&(_, limit)| manhattan(location - limit) > bumper)
            .map(|&(dir, _)| dir)
            .collect();
        if open.is_empty() {
            let held = self.last.unwrap_or(Direction::North);
            self.last = Some(held);
            return Ok(held);
        }

        let reverse = self.last.map(Direction::opposite);
        let mut best: Option<(f32, Direction)> = None;
        for &dir in &open {
            if Some(dir) == reverse && open.len() > 1 {
                continue;
            }
            let score = manhattan(location + dir.delta() - view.primary);
            if best.is_none_or(|(closest, _)| score < closest) {
                best = Some((score, dir));
            }
        }
        let choice = best.map(|(_, dir)| dir).unwrap_or(open[0]);
        self.last = Some(choice);
        Ok(choice)
    }
}

/// Replays a fixed direction sequence, then holds the last direction.
/// Front-ends use this to feed buffered input; tests use it to steer.
#[derive(Debug)]
pub struct ScriptedLogic {
    script: VecDeque<Direction>,
    hold: Direction,
}

impl ScriptedLogic {
    pub fn new<I: IntoIterator<Item = Direction>>(script: I) -> Self {
        Self {
            script: script.into_iter().collect(),
            hold: Direction::North,
        }
    }
}

impl AgentLogic for ScriptedLogic {
    fn kind(&self) -> &'static str {
        "scripted"
    }

    fn decide(
        &mut self,
        _view: &BoardView<'_>,
        _location: Vec2,
        _rng: &mut dyn RngCore,
    ) -> Result<Direction, InvariantViolation> {
        if let Some(dir) = self.script.pop_front() {
            self.hold = dir;
        }
        Ok(self.hold)
    }
}

/// Breadcrumb override state. While following, scripted waypoints replace
/// the agent's own decisions for the tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PathOverride {
    #[default]
    NoOverride,
    FollowingPath(VecDeque<Vec2>),
}

impl PathOverride {
    pub fn is_active(&self) -> bool {
        matches!(self, PathOverride::FollowingPath(queue) if !queue.is_empty())
    }

    pub fn clear(&mut self) {
        *self = PathOverride::NoOverride;
    }
}

/// One navigation step toward `target`: snap the perpendicular coordinate
/// when already within the corner tolerance, then move along the
/// dominant-delta axis by at most one step.
pub fn follow_step(location: Vec2, target: Vec2, step_distance: f32, corner_correct: f32) -> Vec2 {
    let mut next = location;
    let delta = target - location;
    if delta.x.abs() >= delta.y.abs() {
        if delta.y.abs() <= corner_correct {
            next.y = target.y;
        }
        next.x += delta.x.clamp(-step_distance, step_distance);
    } else {
        if delta.x.abs() <= corner_correct {
            next.x = target.x;
        }
        next.y += delta.y.clamp(-step_distance, step_distance);
    }
    next
}

/// A continuous position and the strategy that steers it. Agents are
/// created at load and only ever repositioned, never recreated.
pub struct Agent {
    pub location: Vec2,
    pub logic: Box<dyn AgentLogic>,
    pub path: PathOverride,
}

impl Agent {
    pub fn new(location: Vec2, logic: Box<dyn AgentLogic>) -> Self {
        Self {
            location,
            logic,
            path: PathOverride::NoOverride,
        }
    }

    /// Advance along the breadcrumb queue if one is pending. Returns true
    /// when the override handled this tick's movement.
    pub fn follow_path_step(&mut self, tuning: &Tuning) -> bool {
        let queue = match &mut self.path {
            PathOverride::FollowingPath(queue) => queue,
            PathOverride::NoOverride => return false,
        };
        match queue.front().copied() {
            Some(target) => {
                self.location = follow_step(
                    self.location,
                    target,
                    tuning.step_distance,
                    tuning.corner_correct,
                );
                if is_close(self.location, target, tuning.epsilon) {
                    queue.pop_front();
                }
                if queue.is_empty() {
                    self.path = PathOverride::NoOverride;
                }
                true
            }
            None => {
                self.path = PathOverride::NoOverride;
                false
            }
        }
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("location", &self.location)
            .field("logic", &self.logic.kind())
            .field("path", &self.path)
            .finish()
    }
}

/// A materialization point inside the holding pen: a uniformly random
/// point on the segment between a randomly chosen grid-adjacent pair of
/// pursuer-start cells. Falls back to a bare start cell when the starts
/// are scattered, `None` when there are none at all.
pub fn respawn_location(starts: &[GridPos], rng: &mut dyn RngCore) -> Option<Vec2> {
    let mut pairs: Vec<(GridPos, GridPos)> = Vec::new();
    for (i, &a) in starts.iter().enumerate() {
        for &b in &starts[i + 1..] {
            if a.manhattan(b) == 1 {
                pairs.push((a, b));
            }
        }
    }

    if pairs.is_empty() {
        if starts.is_empty() {
            return None;
        }
        log::warn!("no adjacent pursuer-start pair; respawning on a bare start cell");
        let pick = starts[rng.random_range(0..starts.len())];
        return Some(pick.center());
    }

    let (a, b) = pairs[rng.random_range(0..pairs.len())];
    let t: f32 = rng.random_range(0.0..1.0);
    Some(a.center().lerp(b.center(), t))
}

/// Breadcrumbs routing a respawned pursuer out of the pen: the gate-side
/// neighbor nearest `from`, the gate itself, then the far-side neighbor.
/// `None` when the maze has no gate with an open span through it.
pub fn gate_exit_path(maze: &Maze, from: Vec2) -> Option<VecDeque<Vec2>> {
    let from_cell = GridPos::containing(from);
    let gate = maze
        .locations_with(Cell::GATE)
        .min_by_key(|gate| gate.manhattan(from_cell))?;

    let open = |pos: GridPos| {
        maze.cell_at(pos)
            .is_some_and(|cell| !cell.has(Cell::WALL))
    };
    let spans = [
        (gate.offset(0, -1), gate.offset(0, 1)),
        (gate.offset(-1, 0), gate.offset(1, 0)),
    ];
    for (a, b) in spans {
        if open(a) && open(b) {
            let (pen, exit) = if a.manhattan(from_cell) <= b.manhattan(from_cell) {
                (a, b)
            } else {
                (b, a)
            };
            return Some(VecDeque::from([pen.center(), gate.center(), exit.center()]));
        }
    }
    None
}
