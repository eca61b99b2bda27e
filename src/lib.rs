pub mod advance;
pub mod bracket;
pub mod commands;
pub mod config;
pub mod error;
pub mod resolver;
pub mod tournament;
pub mod types;

pub use advance::{advance_winners_to_next_round, clear_unresolved_feeds, tournament_status, tournament_winner};
pub use bracket::{calculate_byes, generate_bracket, round_name, total_rounds};
pub use error::BracketError;
pub use resolver::{apply_scores, determine_match_winner, is_round_complete};
pub use tournament::Tournament;

use clap::Parser;
use commands::{execute, Args};
use config::*;
use std::fs;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub fn run() {
    let env_keys = load_env_file();
    let args = Args::parse();
    let config = args.config();

    // Initialize tracing with daily file output; stdout carries the JSON
    let logs_dir = log_dir(&config);
    fs::create_dir_all(&logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    info!("FPL knockout starting: {:?}", args.command);
    if !env_keys.is_empty() {
        info!("Loaded {} from .env", env_keys.join(", "));
    }
    log_env_warnings(&config);

    match execute(&args) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            drop(_guard);
            std::process::exit(1);
        }
    }
}
