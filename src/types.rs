use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ── Constants ──────────────────────────────────────────────────────────

pub const FINAL_ROUND_NAME: &str = "Final";
pub const SEMI_FINAL_ROUND_NAME: &str = "Semi-Finals";
pub const QUARTER_FINAL_ROUND_NAME: &str = "Quarter-Finals";

/// Last gameweek of a Premier League season.
pub const LAST_GAMEWEEK: u32 = 38;

pub type FplTeamId = u32;
pub type Seed = u32;
pub type Points = i32;

// ── Bracket domain types ───────────────────────────────────────────────

/// A team entered into the knockout, taken from the league standings when the
/// tournament is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub fpl_team_id: FplTeamId,
    pub fpl_team_name: String,
    pub manager_name: String,
    pub seed: Seed,
}

impl Participant {
    pub fn new(fpl_team_id: FplTeamId, fpl_team_name: &str, manager_name: &str, seed: Seed) -> Self {
        Participant {
            fpl_team_id,
            fpl_team_name: fpl_team_name.to_string(),
            manager_name: manager_name.to_string(),
            seed,
        }
    }

    pub fn to_match_player(&self) -> MatchPlayer {
        MatchPlayer::new(self.fpl_team_id, self.seed)
    }
}

/// One side of a match. `score` stays `None` until the gameweek's points are
/// in; a score of zero is a real result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPlayer {
    pub fpl_team_id: FplTeamId,
    pub seed: Seed,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Points>,
}

impl MatchPlayer {
    pub fn new(fpl_team_id: FplTeamId, seed: Seed) -> Self {
        MatchPlayer {
            fpl_team_id,
            seed,
            score: None,
        }
    }

    pub fn with_score(mut self, score: Points) -> Self {
        self.score = Some(score);
        self
    }

    pub fn has_score(&self) -> bool {
        self.score.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    #[serde(default)]
    pub player1: Option<MatchPlayer>,
    #[serde(default)]
    pub player2: Option<MatchPlayer>,
    /// N-way form. Takes precedence over `player1`/`player2` when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<MatchPlayer>>,
    #[serde(default)]
    pub winner_id: Option<FplTeamId>,
    #[serde(default)]
    pub is_bye: bool,
}

impl Match {
    pub fn id_for(round_number: u32, index: usize) -> String {
        format!("r{round_number}-m{index}")
    }

    /// A match waiting for both of its players.
    pub fn empty(round_number: u32, index: usize) -> Self {
        Match {
            id: Self::id_for(round_number, index),
            player1: None,
            player2: None,
            players: None,
            winner_id: None,
            is_bye: false,
        }
    }

    pub fn head_to_head(round_number: u32, index: usize, player1: MatchPlayer, player2: MatchPlayer) -> Self {
        Match {
            player1: Some(player1),
            player2: Some(player2),
            ..Self::empty(round_number, index)
        }
    }

    /// Byes resolve on creation.
    pub fn bye(round_number: u32, index: usize, player: MatchPlayer) -> Self {
        Match {
            winner_id: Some(player.fpl_team_id),
            player1: Some(player),
            is_bye: true,
            ..Self::empty(round_number, index)
        }
    }

    /// Everyone drawn into this match, preferring the N-way list and falling
    /// back to the two-player pair.
    pub fn players(&self) -> Vec<&MatchPlayer> {
        match self.players.as_deref() {
            Some(players) if !players.is_empty() => players.iter().collect(),
            _ => self.player1.iter().chain(self.player2.iter()).collect(),
        }
    }

    pub fn player(&self, fpl_team_id: FplTeamId) -> Option<&MatchPlayer> {
        self.players()
            .into_iter()
            .find(|player| player.fpl_team_id == fpl_team_id)
    }

    pub fn involves(&self, fpl_team_id: FplTeamId) -> bool {
        self.player(fpl_team_id).is_some()
    }

    pub fn is_resolved(&self) -> bool {
        self.winner_id.is_some()
    }

    pub fn loser_id(&self) -> Option<FplTeamId> {
        let winner_id = self.winner_id?;
        if self.is_bye {
            return None;
        }
        self.players()
            .into_iter()
            .map(|player| player.fpl_team_id)
            .find(|id| *id != winner_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub round_number: u32,
    pub name: String,
    pub gameweek: u32,
    pub matches: Vec<Match>,
    #[serde(default)]
    pub is_complete: bool,
}

impl Round {
    pub fn winners(&self) -> Vec<FplTeamId> {
        self.matches.iter().filter_map(|m| m.winner_id).collect()
    }

    pub fn bye_count(&self) -> usize {
        self.matches.iter().filter(|m| m.is_bye).count()
    }

    pub fn has_recorded_scores(&self) -> bool {
        self.matches
            .iter()
            .flat_map(|m| m.players())
            .any(MatchPlayer::has_score)
    }
}

/// Where a tournament is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TournamentStatus {
    /// Round one is drawn and no points have been recorded.
    Seeded,
    InProgress,
    /// The final has a winner.
    Complete,
}

/// How far a single participant has made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum ParticipantState {
    Active,
    Eliminated {
        #[serde(rename = "roundNumber")]
        round_number: u32,
    },
    Champion,
}

// ── Config types ───────────────────────────────────────────────────────

/// A standings snapshot plus the points each team scored per gameweek, as
/// handed over by the standings and score sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsFixture {
    pub name: String,
    #[serde(default)]
    pub start_gameweek: Option<u32>,
    pub participants: Vec<Participant>,
    /// Gameweek → team id → points.
    #[serde(default)]
    pub scores: BTreeMap<u32, HashMap<FplTeamId, Points>>,
}

/// Settings for the command line tool. Empty fields fall back to the
/// environment, then to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KnockoutConfig {
    pub fixture_path: String,
    pub log_dir: String,
    pub start_gameweek: Option<u32>,
    pub pretty: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantProgress {
    #[serde(flatten)]
    pub participant: Participant,
    #[serde(flatten)]
    pub state: ParticipantState,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub name: String,
    pub generated_at: String,
    pub status: TournamentStatus,
    pub champion: Option<Participant>,
    pub revision: u64,
    /// Gameweeks in the fixture that no round is played in.
    pub skipped_gameweeks: Vec<u32>,
    pub participants: Vec<ParticipantProgress>,
    pub rounds: Vec<Round>,
}
