use crate::config::*;
use crate::tournament::Tournament;
use crate::types::*;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Knockout brackets for fantasy league mini-leagues
#[derive(Parser, Debug)]
#[command(version, about = "Knockout brackets for fantasy league mini-leagues")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Directory for the daily log files [env: KNOCKOUT_LOG_DIR]
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Pretty print the JSON output [env: KNOCKOUT_PRETTY]
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Seed a bracket from a standings fixture and print it
    Generate {
        /// Standings fixture [env: KNOCKOUT_FIXTURE_PATH]
        fixture: Option<PathBuf>,

        /// Gameweek of the first round [env: KNOCKOUT_START_GAMEWEEK]
        #[arg(long)]
        start_gameweek: Option<u32>,
    },
    /// Play every score sheet in a fixture through the bracket
    Simulate {
        /// Standings fixture [env: KNOCKOUT_FIXTURE_PATH]
        fixture: Option<PathBuf>,

        /// Gameweek of the first round [env: KNOCKOUT_START_GAMEWEEK]
        #[arg(long)]
        start_gameweek: Option<u32>,
    },
}

impl Args {
    pub fn config(&self) -> KnockoutConfig {
        let (fixture, start_gameweek) = match &self.command {
            Command::Generate { fixture, start_gameweek } | Command::Simulate { fixture, start_gameweek } => {
                (fixture, *start_gameweek)
            }
        };
        let to_string = |path: &PathBuf| path.to_string_lossy().to_string();
        apply_env_defaults(KnockoutConfig {
            fixture_path: fixture.as_ref().map(to_string).unwrap_or_default(),
            log_dir: self.log_dir.as_ref().map(to_string).unwrap_or_default(),
            start_gameweek,
            pretty: self.pretty,
        })
    }
}

pub fn new_tournament(fixture: &StandingsFixture, start_gameweek: u32) -> Result<Tournament, String> {
    Tournament::new(&fixture.name, fixture.participants.clone(), start_gameweek)
        .map_err(|e| format!("generate bracket for \"{}\": {e}", fixture.name))
}

/// Records each gameweek's sheet in order and advances after each one.
pub fn simulate(fixture: &StandingsFixture, start_gameweek: u32) -> Result<SimulationReport, String> {
    let mut tournament = new_tournament(fixture, start_gameweek)?;
    let mut skipped_gameweeks = Vec::new();

    for (gameweek, sheet) in &fixture.scores {
        if let Err(e) = tournament.record_gameweek_scores(*gameweek, sheet) {
            warn!("Skipping score sheet: {e}");
            skipped_gameweeks.push(*gameweek);
            continue;
        }
        tournament.advance();
    }

    let participants = tournament
        .participants
        .iter()
        .map(|participant| ParticipantProgress {
            participant: participant.clone(),
            state: tournament
                .participant_state(participant.fpl_team_id)
                .unwrap_or(ParticipantState::Active),
        })
        .collect();

    let report = SimulationReport {
        name: tournament.name.clone(),
        generated_at: timestamp(),
        status: tournament.status(),
        champion: tournament.winner().cloned(),
        revision: tournament.revision,
        skipped_gameweeks,
        participants,
        rounds: tournament.rounds,
    };
    match report.champion.as_ref() {
        Some(champion) => info!("\"{}\" won by {} ({})", report.name, champion.fpl_team_name, champion.manager_name),
        None => info!("\"{}\" is {:?} after {} score sheets", report.name, report.status, fixture.scores.len()),
    }
    Ok(report)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map_err(|e| e.to_string())
}

pub fn execute(args: &Args) -> Result<String, String> {
    let config = args.config();
    let fixture = load_fixture(&fixture_path(&config))?;
    let start = start_gameweek(&config, &fixture);
    match args.command {
        Command::Generate { .. } => to_json(&new_tournament(&fixture, start)?, config.pretty),
        Command::Simulate { .. } => to_json(&simulate(&fixture, start)?, config.pretty),
    }
}
