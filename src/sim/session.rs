//! Session orchestration
//!
//! Owns the mutable board and runs the fixed tick pipeline:
//!
//! - primary decides and moves, then eats the cell it stands on
//! - pursuers decide and move in index order, breadcrumbs first
//! - board cleared when the last cookie goes
//! - empowered contact captures pursuers, ordinary contact costs a retry
//!
//! Everything here is pure state transformation; rendering and pacing
//! live behind the [`BoardRenderer`] and [`SessionObserver`] seams.

use std::collections::HashSet;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::agent::{gate_exit_path, respawn_location, Agent, AgentLogic, PathOverride, RoamLogic};
use super::geometry::{manhattan, GridPos};
use super::maze::{InvariantViolation, MapFormatError, Maze};
use super::movement::Motion;
use crate::tuning::{RespawnExit, Tuning, TuningError};

/// Anything that can stop a session from loading.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("map format: {0}")]
    Format(#[from] MapFormatError),
    #[error("board invariant: {0}")]
    Invariant(#[from] InvariantViolation),
    #[error("tuning: {0}")]
    Tuning(#[from] TuningError),
}

/// Lifecycle of a session. `Cleared` and `GameOver` are terminal; the
/// tick pipeline becomes a no-op once either is reached.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum SessionPhase {
    Loaded,
    Playing,
    Cleared,
    GameOver,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Cleared | SessionPhase::GameOver)
    }
}

/// What happened during one tick, in the order it happened.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum GameEvent {
    CookieEaten { at: GridPos },
    PillEaten { at: GridPos },
    PursuerCaptured { pursuer: usize },
    LifeLost { retries_left: u32 },
    Cleared,
    GameOver,
}

/// The live play field: static maze plus everything that changes.
/// Cookies and pills live outside the maze so eating never mutates it.
#[derive(Debug)]
pub struct Board {
    pub maze: Maze,
    pub cookies: HashSet<GridPos>,
    pub pills: HashSet<GridPos>,
    pub primary: Agent,
    pub pursuers: Vec<Agent>,
    pub retries: u32,
    pub empowered: bool,
    pub empowered_left: u32,
    primary_home: GridPos,
    pursuer_homes: Vec<GridPos>,
}

impl Board {
    fn from_maze(maze: Maze, retries: u32) -> Result<Self, InvariantViolation> {
        let primary_home = maze.primary_start()?;
        let pursuer_homes: Vec<GridPos> = maze.pursuer_starts().collect();
        let cookies: HashSet<GridPos> = maze.cookie_locations().collect();
        let pills: HashSet<GridPos> = maze.pill_locations().collect();
        let primary = Agent::new(primary_home.center(), Box::new(RoamLogic::new()));
        let pursuers = pursuer_homes
            .iter()
            .map(|home| Agent::new(home.center(), Box::new(RoamLogic::new())))
            .collect();
        Ok(Self {
            maze,
            cookies,
            pills,
            primary,
            pursuers,
            retries,
            empowered: false,
            empowered_left: 0,
            primary_home,
            pursuer_homes,
        })
    }
}

/// Read-only board snapshot handed to decision logic for one agent's
/// turn. `passable_gates` reflects the deciding agent's movement rules,
/// so a policy queries the board exactly as its body will move.
#[derive(Clone, Copy)]
pub struct BoardView<'a> {
    pub maze: &'a Maze,
    pub tuning: &'a Tuning,
    pub cookies: &'a HashSet<GridPos>,
    pub pills: &'a HashSet<GridPos>,
    pub primary: Vec2,
    pub pursuers: &'a [Vec2],
    pub empowered: bool,
    pub passable_gates: bool,
}

impl BoardView<'_> {
    pub fn motion(&self) -> Motion<'_> {
        Motion::new(self.maze, self.tuning, self.passable_gates)
    }
}

/// One full game on one board, driven a tick at a time.
#[derive(Debug)]
pub struct Session {
    pub board: Board,
    phase: SessionPhase,
    tuning: Tuning,
    rng: Pcg32,
    seed: u64,
    ticks: u64,
}

impl Session {
    /// Parse a map against validated tuning and stage a session in the
    /// `Loaded` phase. Agents start with roaming logic; swap in anything
    /// else before the first tick.
    pub fn load(text: &str, tuning: Tuning) -> Result<Self, SessionError> {
        tuning.validate()?;
        let maze = Maze::parse(text)?;
        let board = Board::from_maze(maze, tuning.retries)?;
        let seed = tuning.rng_seed.unwrap_or_else(rand::random);
        log::info!(
            "session loaded: {}x{} maze, {} cookies, {} pills, {} pursuers, seed {}",
            board.maze.width,
            board.maze.height,
            board.cookies.len(),
            board.pills.len(),
            board.pursuers.len(),
            seed
        );
        Ok(Self {
            board,
            phase: SessionPhase::Loaded,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            ticks: 0,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn set_primary_logic(&mut self, logic: Box<dyn AgentLogic>) {
        self.board.primary.logic = logic;
    }

    pub fn set_pursuer_logic(&mut self, index: usize, logic: Box<dyn AgentLogic>) {
        if let Some(pursuer) = self.board.pursuers.get_mut(index) {
            pursuer.logic = logic;
        }
    }

    /// Advance the simulation by one step and report what happened.
    /// Inert once the phase is terminal.
    pub fn tick(&mut self) -> Result<Vec<GameEvent>, InvariantViolation> {
        if self.phase.is_terminal() {
            return Ok(Vec::new());
        }
        if self.phase == SessionPhase::Loaded {
            self.phase = SessionPhase::Playing;
        }
        self.ticks += 1;
        let mut events = Vec::new();

        let Board {
            maze,
            cookies,
            pills,
            primary,
            pursuers,
            retries,
            empowered,
            empowered_left,
            primary_home,
            pursuer_homes,
        } = &mut self.board;

        // Empowerment winds down first; a zero budget never expires.
        if *empowered && self.tuning.empowered_ticks > 0 {
            *empowered_left = empowered_left.saturating_sub(1);
            if *empowered_left == 0 {
                *empowered = false;
            }
        }

        // Primary turn. Gates are sealed for it both ways.
        let pursuer_spots: Vec<Vec2> = pursuers.iter().map(|p| p.location).collect();
        let view = BoardView {
            maze,
            tuning: &self.tuning,
            cookies,
            pills,
            primary: primary.location,
            pursuers: &pursuer_spots,
            empowered: *empowered,
            passable_gates: false,
        };
        let dir = primary.logic.decide(&view, primary.location, &mut self.rng)?;
        primary.location = Motion::new(maze, &self.tuning, false).advance(
            primary.location,
            dir,
            self.tuning.step_distance,
        )?;

        let at = GridPos::containing(primary.location);
        if cookies.remove(&at) {
            events.push(GameEvent::CookieEaten { at });
        }
        if pills.remove(&at) {
            *empowered = true;
            *empowered_left = self.tuning.empowered_ticks;
            events.push(GameEvent::PillEaten { at });
        }

        // Pursuer turns, index order. A pending breadcrumb path replaces
        // the policy for the tick; each mover sees the ones before it.
        for i in 0..pursuers.len() {
            if pursuers[i].follow_path_step(&self.tuning) {
                continue;
            }
            let spots: Vec<Vec2> = pursuers.iter().map(|p| p.location).collect();
            let view = BoardView {
                maze,
                tuning: &self.tuning,
                cookies,
                pills,
                primary: primary.location,
                pursuers: &spots,
                empowered: *empowered,
                passable_gates: true,
            };
            let pursuer = &mut pursuers[i];
            let dir = pursuer.logic.decide(&view, pursuer.location, &mut self.rng)?;
            pursuer.location = Motion::new(maze, &self.tuning, true).advance(
                pursuer.location,
                dir,
                self.tuning.step_distance,
            )?;
        }

        if cookies.is_empty() {
            self.phase = SessionPhase::Cleared;
            events.push(GameEvent::Cleared);
            log::info!("board cleared after {} ticks", self.ticks);
            return Ok(events);
        }

        // Contact resolution. While empowered the primary captures;
        // otherwise any contact costs a retry, then the game.
        let close = self.tuning.collision_close;
        if *empowered {
            for (i, pursuer) in pursuers.iter_mut().enumerate() {
                if manhattan(pursuer.location - primary.location) < close {
                    respawn_pursuer(
                        pursuer,
                        pursuer_homes,
                        maze,
                        self.tuning.respawn_exit,
                        &mut self.rng,
                    );
                    events.push(GameEvent::PursuerCaptured { pursuer: i });
                }
            }
        } else if pursuers
            .iter()
            .any(|p| manhattan(p.location - primary.location) < close)
        {
            if *retries > 0 {
                *retries -= 1;
                primary.location = primary_home.center();
                primary.path.clear();
                for pursuer in pursuers.iter_mut() {
                    respawn_pursuer(
                        pursuer,
                        pursuer_homes,
                        maze,
                        self.tuning.respawn_exit,
                        &mut self.rng,
                    );
                }
                *empowered = false;
                *empowered_left = 0;
                events.push(GameEvent::LifeLost {
                    retries_left: *retries,
                });
                log::info!("life lost, {} retries left", retries);
            } else {
                self.phase = SessionPhase::GameOver;
                events.push(GameEvent::GameOver);
                log::info!("game over after {} ticks", self.ticks);
            }
        }

        if !events.is_empty() {
            log::debug!("tick {}: {:?}", self.ticks, events);
        }
        Ok(events)
    }
}

/// Put a pursuer back in the pen, optionally with breadcrumbs that walk
/// it out through the nearest gate.
fn respawn_pursuer(
    pursuer: &mut Agent,
    homes: &[GridPos],
    maze: &Maze,
    exit: RespawnExit,
    rng: &mut Pcg32,
) {
    let spot = match respawn_location(homes, rng) {
        Some(spot) => spot,
        None => return,
    };
    pursuer.location = spot;
    pursuer.path.clear();
    if exit == RespawnExit::Scripted {
        match gate_exit_path(maze, spot) {
            Some(path) => pursuer.path = PathOverride::FollowingPath(path),
            None => log::warn!("no gate exit from the pen, releasing in place"),
        }
    }
}

/// Drives current board contents out through a front-end each tick.
pub trait BoardRenderer {
    fn render(&mut self, session: &Session);
}

/// Callbacks for the milestone events of a run. All optional.
pub trait SessionObserver {
    fn cleared(&mut self, _session: &Session) {}
    fn life_lost(&mut self, _session: &Session, _retries_left: u32) {}
    fn game_over(&mut self, _session: &Session) {}
}

/// Run a session to its terminal phase, rendering after every tick.
pub fn play<R: BoardRenderer, O: SessionObserver>(
    session: &mut Session,
    renderer: &mut R,
    observer: &mut O,
) -> Result<SessionPhase, InvariantViolation> {
    renderer.render(session);
    while !session.phase().is_terminal() {
        let events = session.tick()?;
        renderer.render(session);
        for event in &events {
            match event {
                GameEvent::Cleared => observer.cleared(session),
                GameEvent::LifeLost { retries_left } => {
                    observer.life_lost(session, *retries_left)
                }
                GameEvent::GameOver => observer.game_over(session),
                _ => {}
            }
        }
    }
    Ok(session.phase())
}
