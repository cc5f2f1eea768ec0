//! Blast Arena entry point
//!
//! Headless runner: loads tuning, drives the fixed-step simulation with a
//! simple autopilot standing in for keyboard input, and reports the outcome.
//! Windowing, drawing and real audio devices live outside this crate.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use glam::IVec2;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use blast_arena::audio::{AudioManager, LogBackend};
use blast_arena::consts::*;
use blast_arena::sim::grid::ARMS;
use blast_arena::sim::{Cell, Direction, GamePhase, GameState, TickInput, tick};
use blast_arena::Tuning;

/// Wall-clock time the runner pretends passes per rendered frame
const FRAME_DT: f32 = 1.0 / 30.0;
/// How far the autopilot searches for cover
const FLEE_DEPTH: usize = 6;

#[derive(Debug, Parser)]
#[command(name = "blast-arena", about = "Run a headless bomb arena match")]
struct Args {
    /// JSON tuning file (defaults to the classic arena)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// RNG seed (defaults to the wall clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many simulated seconds
    #[arg(long, default_value_t = 300.0)]
    max_secs: f32,

    /// Print every frame as a JSON line
    #[arg(long)]
    frames: bool,

    /// Master volume for sound cues (0.0 - 1.0)
    #[arg(long, default_value_t = 0.8)]
    volume: f32,

    /// Sound effect volume (0.0 - 1.0)
    #[arg(long, default_value_t = 1.0)]
    sfx_volume: f32,

    /// Drop all sound cues
    #[arg(long)]
    mute: bool,
}

/// Runner holding the simulation and its clocks
struct Game {
    state: GameState,
    rng: Pcg32,
    accumulator: f32,
    elapsed: f32,
    input: TickInput,
    heading: Direction,
    audio: AudioManager<LogBackend>,
}

impl Game {
    fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            state: GameState::new(tuning),
            rng: Pcg32::seed_from_u64(seed),
            accumulator: 0.0,
            elapsed: 0.0,
            input: TickInput::default(),
            heading: Direction::Right,
            audio: AudioManager::new(Some(LogBackend::default())),
        }
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.input = self.autopilot();
            tick(&mut self.state, &self.input, SIM_DT, &mut self.rng);
            self.accumulator -= SIM_DT;
            self.elapsed += SIM_DT;
            substeps += 1;

            let events = self.state.drain_events();
            self.audio.play_events(&events);
        }
    }

    /// Stand-in for a human: flee live blast lines, bomb nearby blocks and
    /// enemies, otherwise wander.
    fn autopilot(&mut self) -> TickInput {
        let state = &self.state;
        let pos = state.player.pos();
        let danger = threatened_cells(state);

        if danger.contains(&pos) {
            return match escape_route(state, &danger, pos) {
                Some(dir) => held(dir),
                None => TickInput::default(),
            };
        }

        let block_adjacent = ARMS
            .iter()
            .any(|arm| state.grid.cell(pos + *arm) == Cell::Block);
        let enemy_near = state
            .enemies
            .iter()
            .any(|e| e.is_alive() && (e.pos() - pos).abs().element_sum() <= 2);
        if (block_adjacent || enemy_near)
            && state.player.actor.can_place_bomb()
            && !state.bomb_at(pos)
        {
            // Only drop it if there is somewhere to hide afterwards
            let mut after = danger.clone();
            after.extend(blast_cells(state, pos, state.player.bomb_range()));
            if escape_route(state, &after, pos).is_some() {
                return TickInput {
                    place_bomb: true,
                    ..Default::default()
                };
            }
        }

        let ahead = pos + self.heading.offset();
        if !is_safe_step(state, &danger, ahead) {
            let options: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|d| is_safe_step(state, &danger, pos + d.offset()))
                .collect();
            match options.choose(&mut self.rng) {
                Some(dir) => self.heading = *dir,
                None => return TickInput::default(),
            }
        }
        held(self.heading)
    }
}

fn held(dir: Direction) -> TickInput {
    TickInput {
        up: dir == Direction::Up,
        down: dir == Direction::Down,
        left: dir == Direction::Left,
        right: dir == Direction::Right,
        place_bomb: false,
    }
}

fn is_safe_step(state: &GameState, danger: &HashSet<IVec2>, pos: IVec2) -> bool {
    state.grid.is_walkable(pos) && !state.bomb_at(pos) && !danger.contains(&pos)
}

/// Cells a live bomb or a burning explosion can reach
fn threatened_cells(state: &GameState) -> HashSet<IVec2> {
    let mut cells: HashSet<IVec2> = HashSet::new();
    for y in 0..state.grid.height() {
        for x in 0..state.grid.width() {
            let pos = IVec2::new(x, y);
            if state.grid.cell(pos) == Cell::Explosion {
                cells.insert(pos);
            }
        }
    }
    for bomb in &state.bombs {
        cells.extend(blast_cells(state, bomb.pos, bomb.range));
    }
    cells
}

/// Cells a blast at `origin` would reach
fn blast_cells(state: &GameState, origin: IVec2, range: i32) -> Vec<IVec2> {
    let mut cells = vec![origin];
    for arm in ARMS {
        for step in 1..=range {
            let pos = origin + arm * step;
            if matches!(state.grid.cell(pos), Cell::Wall | Cell::Block) {
                break;
            }
            cells.push(pos);
        }
    }
    cells
}

/// First step of the shortest walk to a cell outside `danger`
fn escape_route(state: &GameState, danger: &HashSet<IVec2>, from: IVec2) -> Option<Direction> {
    let mut seen = HashSet::from([from]);
    let mut queue: VecDeque<(IVec2, Direction, usize)> = VecDeque::new();

    for dir in Direction::ALL {
        let next = from + dir.offset();
        if state.grid.is_walkable(next) && !state.bomb_at(next) && seen.insert(next) {
            queue.push_back((next, dir, 1));
        }
    }

    while let Some((pos, first, depth)) = queue.pop_front() {
        if !danger.contains(&pos) {
            return Some(first);
        }
        if depth >= FLEE_DEPTH {
            continue;
        }
        for dir in Direction::ALL {
            let next = pos + dir.offset();
            if state.grid.is_walkable(next) && !state.bomb_at(next) && seen.insert(next) {
                queue.push_back((next, first, depth + 1));
            }
        }
    }
    None
}

fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning: {e}");
                return ExitCode::from(1);
            }
        },
        None => Tuning::default(),
    };

    let seed = args.seed.unwrap_or_else(wall_clock_seed);
    log::info!(
        "Blast Arena starting: {}x{} arena, seed {seed}",
        tuning.map_width,
        tuning.map_height
    );

    let mut game = Game::new(tuning, seed);
    game.audio.set_master_volume(args.volume);
    game.audio.set_sfx_volume(args.sfx_volume);
    game.audio.set_muted(args.mute);
    while !game.state.phase.is_over() && game.elapsed < args.max_secs {
        game.update(FRAME_DT);
        if args.frames {
            match serde_json::to_string(&game.state.snapshot()) {
                Ok(line) => println!("{line}"),
                Err(e) => log::warn!("Frame serialization failed: {e}"),
            }
        }
    }

    let played = game.audio.backend().map_or(0, |b| b.played.len());
    let verdict = match game.state.phase {
        GamePhase::Victorious => "victory",
        GamePhase::Defeated => "defeat",
        GamePhase::Running => "time limit",
    };
    println!(
        "Match ended ({verdict}) after {:.1}s: {} lives left, {}/{} enemies alive, {played} sound cues",
        game.elapsed,
        game.state.player.lives(),
        game.state.living_enemies(),
        game.state.initial_enemies,
    );

    ExitCode::SUCCESS
}
