//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick pipeline only
//! - Seeded RNG only
//! - Stable agent order (primary first, pursuers by index)
//! - No rendering or platform dependencies

pub mod agent;
pub mod geometry;
pub mod levels;
pub mod maze;
pub mod movement;
pub mod session;

pub use agent::{
    follow_step, gate_exit_path, respawn_location, Agent, AgentLogic, ChaseLogic, PathOverride,
    RoamLogic, ScriptedLogic,
};
pub use geometry::{is_axis_aligned, is_close, manhattan, Axis, Direction, GridPos};
pub use levels::LEVEL1;
pub use maze::{Cell, InvariantViolation, MapFormatError, Maze};
pub use movement::Motion;
pub use session::{
    play, Board, BoardRenderer, BoardView, GameEvent, Session, SessionError, SessionObserver,
    SessionPhase,
};
