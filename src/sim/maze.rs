//! Maze parsing and cell queries
//!
//! A maze is parsed once from ASCII text into an immutable row-major grid
//! of flag bitmasks and never mutated afterward; pickups live in the
//! session's shrinking sets, not here. The low nibble of each wall cell
//! carries join bits describing which neighbors continue the wall run, for
//! front-ends that pick tile art per cell.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::{Direction, GridPos};

/// Malformed maze text, fatal to the load attempt.
#[derive(Debug, Error, PartialEq)]
pub enum MapFormatError {
    #[error("maze text contains no rows")]
    Empty,
    #[error("maze rows must be uniform length: expected {expected}, found {found}")]
    RaggedRows { expected: usize, found: usize },
    #[error("unknown legend character {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
}

/// A geometric/state invariant was broken. Programming fault, propagated
/// to the caller rather than recovered.
#[derive(Debug, Error, PartialEq)]
pub enum InvariantViolation {
    #[error("maze must contain exactly one primary start, found {found}")]
    PrimaryStartCount { found: usize },
    #[error("agent location rounds into a blocking cell at ({x}, {y})")]
    InsideWall { x: i32, y: i32 },
}

/// One grid cell: a bitmask of semantic flags plus wall-join bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell(u16);

impl Cell {
    /// Wall-join bits, N=1 E=2 S=4 W=8 (bit order matches
    /// [`Direction::ALL`]).
    pub const JOIN_MASK: u16 = 0x000F;
    pub const WALL: u16 = 0x0010;
    pub const GATE: u16 = 0x0020;
    pub const PILL: u16 = 0x0040;
    pub const COOKIE: u16 = 0x0080;
    pub const START_PRIMARY: u16 = 0x0100;
    pub const START_PURSUER: u16 = 0x0200;

    pub const fn new(flags: u16) -> Self {
        Self(flags)
    }

    /// Whether any of `flags` is set.
    #[inline]
    pub fn has(self, flags: u16) -> bool {
        self.0 & flags != 0
    }

    /// Raw bitmask.
    #[inline]
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Wall-join nibble (meaningful on WALL cells).
    #[inline]
    pub fn join_bits(self) -> u8 {
        (self.0 & Self::JOIN_MASK) as u8
    }

    /// Join nibble as the four-character `{n}{e}{s}{w}` suffix tile-art
    /// sets are keyed by (`wall-0101` is a horizontal run piece).
    pub fn join_suffix(self) -> String {
        let bits = self.join_bits();
        (0..4).map(|i| if bits & (1 << i) != 0 { '1' } else { '0' }).collect()
    }
}

/// Immutable maze grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maze {
    pub width: usize,
    pub height: usize,
    cells: Vec<Cell>,
}

impl Maze {
    /// Parse maze text: blank rows are ignored, remaining rows must be of
    /// equal length, and every glyph must be in the legend
    /// (`| - +` wall, `=` gate, `o` cookie, `*` pill, `@` primary start,
    /// `x` pursuer start).
    pub fn parse(text: &str) -> Result<Maze, MapFormatError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(MapFormatError::Empty);
        }

        let width = lines[0].chars().count();
        let height = lines.len();
        let mut cells = Vec::with_capacity(width * height);

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MapFormatError::RaggedRows {
                    expected: width,
                    found,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let flags = match glyph {
                    '|' | '-' | '+' => Cell::WALL,
                    '=' => Cell::GATE,
                    'o' => Cell::COOKIE,
                    '*' => Cell::PILL,
                    '@' => Cell::START_PRIMARY,
                    'x' => Cell::START_PURSUER,
                    _ => return Err(MapFormatError::UnknownGlyph { glyph, row, col }),
                };
                cells.push(Cell::new(flags));
            }
        }

        let mut maze = Maze {
            width,
            height,
            cells,
        };
        maze.set_join_bits();

        log::debug!(
            "parsed {}x{} maze: {} cookies, {} pills, {} pursuer starts",
            maze.width,
            maze.height,
            maze.cookie_locations().count(),
            maze.pill_locations().count(),
            maze.pursuer_starts().count(),
        );
        Ok(maze)
    }

    /// Second parse pass: each wall cell learns which neighbors continue
    /// the run (walls, or the gate embedded in one).
    fn set_join_bits(&mut self) {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let pos = GridPos::new(x, y);
                let index = self.index_of(pos);
                if !self.cells[index].has(Cell::WALL) {
                    continue;
                }
                let mut bits = 0u16;
                for dir in Direction::ALL {
                    let joins = self
                        .cell_at(pos.step(dir))
                        .is_some_and(|n| n.has(Cell::WALL | Cell::GATE));
                    if joins {
                        bits |= 1 << dir.index();
                    }
                }
                self.cells[index].0 |= bits;
            }
        }
    }

    #[inline]
    fn index_of(&self, pos: GridPos) -> usize {
        pos.y as usize * self.width + pos.x as usize
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Cell at an integer coordinate; `None` out of bounds. Mazes are
    /// bounded, not toroidal; callers treat the edge as blocking.
    #[inline]
    pub fn cell_at(&self, pos: GridPos) -> Option<Cell> {
        self.in_bounds(pos).then(|| self.cells[self.index_of(pos)])
    }

    /// All coordinates whose cell has any of `flags` set, lazily, in
    /// row-major order.
    pub fn locations_with(&self, flags: u16) -> impl Iterator<Item = GridPos> + '_ {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height)
            .flat_map(move |y| (0..width).map(move |x| GridPos::new(x, y)))
            .filter(move |&pos| self.cells[self.index_of(pos)].has(flags))
    }

    /// The unique primary-start coordinate.
    pub fn primary_start(&self) -> Result<GridPos, InvariantViolation> {
        let mut starts = self.locations_with(Cell::START_PRIMARY);
        match (starts.next(), starts.next()) {
            (Some(pos), None) => Ok(pos),
            (None, _) => Err(InvariantViolation::PrimaryStartCount { found: 0 }),
            (Some(_), Some(_)) => Err(InvariantViolation::PrimaryStartCount {
                found: self.locations_with(Cell::START_PRIMARY).count(),
            }),
        }
    }

    pub fn pursuer_starts(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.locations_with(Cell::START_PURSUER)
    }

    pub fn pill_locations(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.locations_with(Cell::PILL)
    }

    pub fn cookie_locations(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.locations_with(Cell::COOKIE)
    }
}
