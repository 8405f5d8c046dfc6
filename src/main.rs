//! Zerg Chess - Self-Play Driver
//!
//! Sets up a game from command line flags and lets the engine play both
//! sides until one wins, the side to move is stuck or the ply limit is hit.
//!
//! Usage:
//!     zerg_chess --layout " knbr" --depth 5
//!     zerg_chess --generate --zobrist keys.bin --tt table.bin
//!
//! Set `RUST_LOG=debug` to see per-search statistics.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{info, warn};
use rand::thread_rng;

use zerg_chess::error::{EngineError, Result};
use zerg_chess::game::{write_fresh_blobs, Game, GameConfig, DEFAULT_DEPTH, DEFAULT_MAX_PLIES};
use zerg_chess::search::DEFAULT_TT_CAPACITY;
use zerg_chess::types::WIN_SCORE;

#[derive(Parser, Debug)]
#[command(name = "zerg_chess", version, about = "Fifteen pawns against an army on an 8x5 board")]
struct Args {
    /// Back-rank layout such as " knbr" or "r.bnk"; random when omitted
    #[arg(long)]
    layout: Option<String>,

    /// Search depth in plies
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: u8,

    /// Transposition table slots, 0 to search without a table
    #[arg(long = "tt-size", default_value_t = DEFAULT_TT_CAPACITY)]
    tt_size: usize,

    /// Zobrist key blob to load (and save after the game)
    #[arg(long)]
    zobrist: Option<PathBuf>,

    /// Transposition table blob to load (and save after the game)
    #[arg(long)]
    tt: Option<PathBuf>,

    /// Stop self-play after this many plies
    #[arg(long = "max-plies", default_value_t = DEFAULT_MAX_PLIES)]
    max_plies: usize,

    /// Write fresh blobs to --zobrist and --tt, then exit
    #[arg(long, requires_all = ["zobrist", "tt"])]
    generate: bool,

    /// Opening moves in coordinate notation, comma separated (e.g. "c2c4,b6b5")
    #[arg(long, value_delimiter = ',')]
    moves: Vec<String>,
}

impl From<&Args> for GameConfig {
    fn from(args: &Args) -> Self {
        GameConfig {
            layout: args.layout.clone(),
            depth: args.depth,
            tt_capacity: args.tt_size,
            zobrist_path: args.zobrist.clone(),
            tt_path: args.tt.clone(),
            max_plies: args.max_plies,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    if let (true, Some(zobrist), Some(tt)) = (args.generate, &args.zobrist, &args.tt) {
        return write_fresh_blobs(&mut thread_rng(), zobrist, tt, args.tt_size.max(1));
    }

    let mut config = GameConfig::from(args);
    let mut game = match Game::new(&config) {
        Err(err @ EngineError::InvalidLayout { .. }) => {
            warn!("{err}; using a random layout");
            config.layout = None;
            Game::new(&config)?
        }
        other => other?,
    };

    for notation in &args.moves {
        match game.parse_move(notation) {
            Some(mv) => {
                game.play(mv);
            }
            None => {
                warn!("{notation:?} is not legal here, engine takes over");
                break;
            }
        }
    }

    println!("{}\n", game.board());

    while game.history().len() < config.max_plies && game.win_status() == 0 {
        let side = if game.white_to_move() { "white" } else { "black" };
        let Some(mv) = game.ai_move() else { break };
        println!(
            "{}. {side} {mv} ({} nodes)",
            game.history().len(),
            game.engine().nodes_searched
        );
        println!("{}\n", game.board());
    }

    let outcome = match game.win_status() {
        WIN_SCORE => "white wins",
        s if s == -WIN_SCORE => "black wins",
        _ if game.legal_moves().is_empty() => "side to move has no moves, draw",
        _ => "ply limit reached",
    };
    info!("game over after {} plies", game.history().len());
    println!("{outcome}");

    if let Some(zobrist) = &config.zobrist_path {
        game.save(zobrist, config.tt_path.as_deref())?;
    }

    Ok(())
}
