//! Study trainer: variation tree and puzzle shell on stdin/stdout.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use study_tree::pgn::Headers;
use study_tree::{Engine, EngineConfig, PuzzleSet, Shell};

#[derive(Parser, Debug)]
#[command(name = "trainer", version, about = "Chess study tree and puzzle trainer")]
struct Args {
    /// Record to open at startup.
    #[arg(long)]
    pgn: Option<PathBuf>,

    /// JSON puzzle collection.
    #[arg(long)]
    puzzles: Option<PathBuf>,

    /// Start position for a new study.
    #[arg(long, conflicts_with = "pgn")]
    fen: Option<String>,

    /// Export the main line only.
    #[arg(long)]
    main_line_only: bool,

    /// Do not play the opponent's reply in puzzles.
    #[arg(long)]
    no_auto_reply: bool,

    /// Log filter, overrides RUST_LOG.
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = match &args.log {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = EngineConfig::default()
        .with_auto_reply(!args.no_auto_reply)
        .with_main_line_only(args.main_line_only);
    let mut engine = Engine::with_config(config);

    if let Some(path) = &args.pgn {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        engine
            .import_record(&text)
            .with_context(|| format!("failed to import {}", path.display()))?;
    } else {
        engine.reset(args.fen.as_deref()).context("invalid --fen")?;
        let date = chrono::Local::now().date_naive();
        let mut headers = Headers::dated(date);
        for (key, value) in engine.headers().iter() {
            headers.set(key, value);
        }
        *engine.headers_mut() = headers;
    }

    let mut shell = Shell::new(engine);
    if let Some(path) = &args.puzzles {
        let puzzles = PuzzleSet::load(path)
            .with_context(|| format!("failed to load puzzles from {}", path.display()))?;
        shell = shell.with_puzzles(puzzles);
    }

    println!("Study trainer {}", env!("CARGO_PKG_VERSION"));
    println!("Type a move, 'd' to display the board, 'tree' for the tree, 'quit' to exit");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    shell.run(stdin.lock(), &mut stdout)?;
    Ok(())
}
