//! Maze Chase entry point
//!
//! Plays a session out in the terminal, one frame per tick, with
//! box-drawing walls. Optional args: a map file to replace the bundled
//! board, then a JSON file to replace the default tuning.

use std::env;
use std::fs;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use maze_chase::sim::{
    play, BoardRenderer, Cell, ChaseLogic, GridPos, Session, SessionObserver, SessionPhase, LEVEL1,
};
use maze_chase::Tuning;

/// Wall glyphs indexed by join bits (north = 1, east = 2, south = 4,
/// west = 8), so a cell picks the box-drawing char that continues its
/// neighbors.
const WALL_GLYPHS: [char; 16] = [
    '·', '╵', '╶', '└', '╷', '│', '┌', '├', '╴', '┘', '─', '┴', '┐', '┤', '┬', '┼',
];

struct AsciiRenderer {
    frame_delay: Duration,
}

impl BoardRenderer for AsciiRenderer {
    fn render(&mut self, session: &Session) {
        let board = &session.board;
        let primary_at = GridPos::containing(board.primary.location);
        let pursuer_cells: Vec<GridPos> = board
            .pursuers
            .iter()
            .map(|p| GridPos::containing(p.location))
            .collect();

        let mut frame = String::with_capacity((board.maze.width + 1) * board.maze.height);
        for y in 0..board.maze.height as i32 {
            for x in 0..board.maze.width as i32 {
                let pos = GridPos::new(x, y);
                let glyph = if pos == primary_at {
                    '@'
                } else if pursuer_cells.contains(&pos) {
                    'x'
                } else if board.cookies.contains(&pos) {
                    'o'
                } else if board.pills.contains(&pos) {
                    '*'
                } else {
                    match board.maze.cell_at(pos) {
                        Some(cell) if cell.has(Cell::GATE) => '=',
                        Some(cell) if cell.has(Cell::WALL) => {
                            WALL_GLYPHS[cell.join_bits() as usize]
                        }
                        _ => ' ',
                    }
                };
                frame.push(glyph);
            }
            frame.push('\n');
        }

        let empowered = if board.empowered { "  EMPOWERED" } else { "" };
        println!(
            "\x1b[2J\x1b[H{frame}{:?}  tick {}  retries {}  cookies {}{empowered}",
            session.phase(),
            session.ticks(),
            board.retries,
            board.cookies.len(),
        );
        thread::sleep(self.frame_delay);
    }
}

struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn cleared(&mut self, session: &Session) {
        println!("board cleared in {} ticks", session.ticks());
    }

    fn life_lost(&mut self, session: &Session, retries_left: u32) {
        println!(
            "caught! {retries_left} of {} retries left",
            session.tuning().retries
        );
    }

    fn game_over(&mut self, session: &Session) {
        println!("game over at tick {}", session.ticks());
    }
}

fn run() -> Result<SessionPhase, Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let text = match args.get(1) {
        Some(path) => fs::read_to_string(path)?,
        None => LEVEL1.to_string(),
    };
    let tuning: Tuning = match args.get(2) {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Tuning::default(),
    };

    let mut session = Session::load(&text, tuning)?;
    // One dedicated hunter makes the demo end; the rest roam.
    session.set_pursuer_logic(0, Box::new(ChaseLogic::new()));

    let mut renderer = AsciiRenderer {
        frame_delay: Duration::from_millis(40),
    };
    Ok(play(&mut session, &mut renderer, &mut ConsoleObserver)?)
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Maze Chase (terminal) starting...");
    match run() {
        Ok(phase) => {
            log::info!("session finished in phase {phase:?}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
