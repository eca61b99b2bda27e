use thiserror::Error;

/// Rejected inputs to bracket generation and score recording.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketError {
    #[error("bracket: no participants were provided")]
    NoParticipants,
    #[error("bracket: a knockout needs at least two participants, got {0}")]
    NotEnoughParticipants(usize),
    #[error("bracket: seed {seed} of team {fpl_team_id} is outside 1..={participant_count}")]
    SeedOutOfRange {
        fpl_team_id: u32,
        seed: u32,
        participant_count: usize,
    },
    #[error("bracket: seed {0} is assigned to more than one team")]
    DuplicateSeed(u32),
    #[error("bracket: team {0} is entered more than once")]
    DuplicateTeam(u32),
    #[error("bracket: a knockout starting in gameweek {0} runs past the last representable gameweek")]
    StartGameweekOutOfRange(u32),
    #[error("bracket: no round is played in gameweek {0}")]
    UnknownGameweek(u32),
}
