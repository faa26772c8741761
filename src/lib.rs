//! Maze Chase - a deterministic maze-chase simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (maze, movement, agents, sessions)
//! - `tuning`: Data-driven movement and rules parameters
//!
//! The crate draws nothing and schedules nothing. Front-ends plug in
//! through [`sim::BoardRenderer`] and [`sim::SessionObserver`] and pace
//! ticks however they like; identical seeds replay identical games.

pub mod sim;
pub mod tuning;

pub use sim::{GameEvent, Maze, Session, SessionPhase};
pub use tuning::{RespawnExit, Tuning};
