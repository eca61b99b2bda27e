use crate::error::BracketError;
use crate::types::*;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Number of byes needed to pad the field to the next power of two.
pub fn calculate_byes(participant_count: usize) -> Result<usize, BracketError> {
  if participant_count == 0 {
    return Err(BracketError::NoParticipants);
  }
  Ok(participant_count.next_power_of_two() - participant_count)
}

/// `ceil(log2 participant_count)`.
pub fn total_rounds(participant_count: usize) -> u32 {
  participant_count.next_power_of_two().trailing_zeros()
}

/// Late rounds are named by their distance from the final, early ones by
/// their absolute number.
pub fn round_name(round_number: u32, total_rounds: u32) -> String {
  match total_rounds.checked_sub(round_number) {
    Some(0) => FINAL_ROUND_NAME.to_string(),
    Some(1) => SEMI_FINAL_ROUND_NAME.to_string(),
    Some(2) => QUARTER_FINAL_ROUND_NAME.to_string(),
    _ => format!("Round {round_number}"),
  }
}

pub fn matches_in_round(round_number: u32, total_rounds: u32) -> usize {
  match total_rounds.checked_sub(round_number) {
    Some(distance) => 1usize << distance,
    None => 0,
  }
}

/// Stable sort by seed, best seed first.
pub fn sort_by_seed(participants: &[Participant]) -> Vec<Participant> {
  let mut seeded = participants.to_vec();
  seeded.sort_by_key(|p| p.seed);
  seeded
}

/// Seeds must be a dense `1..=n` permutation and team ids unique.
pub fn validate_participants(participants: &[Participant]) -> Result<(), BracketError> {
  let count = participants.len();
  if count == 0 {
    return Err(BracketError::NoParticipants);
  }
  if count < 2 {
    return Err(BracketError::NotEnoughParticipants(count));
  }

  let mut seeds = HashSet::with_capacity(count);
  let mut teams = HashSet::with_capacity(count);
  for participant in participants {
    let in_range = usize::try_from(participant.seed)
      .map(|seed| seed >= 1 && seed <= count)
      .unwrap_or(false);
    if !in_range {
      return Err(BracketError::SeedOutOfRange {
        fpl_team_id: participant.fpl_team_id,
        seed: participant.seed,
        participant_count: count,
      });
    }
    if !seeds.insert(participant.seed) {
      return Err(BracketError::DuplicateSeed(participant.seed));
    }
    if !teams.insert(participant.fpl_team_id) {
      return Err(BracketError::DuplicateTeam(participant.fpl_team_id));
    }
  }
  Ok(())
}

/// Pairs the seed-sorted field: seed `i` meets the participant at
/// `bracket_size - 1 - i`. That slot is empty for exactly the first `byes`
/// pairings, so the best seeds get the byes and the weakest play each other.
pub fn build_first_round(seeded: &[Participant], byes: usize) -> Vec<Match> {
  let bracket_size = seeded.len() + byes;
  let match_count = bracket_size / 2;

  seeded
    .iter()
    .take(match_count)
    .enumerate()
    .map(|(index, top)| {
      let top_player = top.to_match_player();
      match seeded.get(bracket_size - 1 - index) {
        Some(bottom) => Match::head_to_head(1, index, top_player, bottom.to_match_player()),
        None => Match::bye(1, index, top_player),
      }
    })
    .collect()
}

fn build_round(round_number: u32, total_rounds: u32, start_gameweek: u32, matches: Vec<Match>) -> Round {
  Round {
    round_number,
    name: round_name(round_number, total_rounds),
    gameweek: start_gameweek + (round_number - 1),
    matches,
    is_complete: false,
  }
}

/// Seeds the field into round one and lays out empty rounds up to the final.
pub fn generate_bracket(participants: &[Participant], start_gameweek: u32) -> Result<Vec<Round>, BracketError> {
  validate_participants(participants)?;

  let seeded = sort_by_seed(participants);
  let byes = calculate_byes(seeded.len())?;
  let total = total_rounds(seeded.len());
  start_gameweek
    .checked_add(total - 1)
    .ok_or(BracketError::StartGameweekOutOfRange(start_gameweek))?;

  let mut rounds = Vec::with_capacity(total as usize);
  rounds.push(build_round(1, total, start_gameweek, build_first_round(&seeded, byes)));

  for round_number in 2..=total {
    let matches = (0..matches_in_round(round_number, total))
      .map(|index| Match::empty(round_number, index))
      .collect();
    rounds.push(build_round(round_number, total, start_gameweek, matches));
  }

  if let Some(last) = rounds.last() {
    if last.gameweek > LAST_GAMEWEEK {
      warn!(
        "Final lands in gameweek {}, after the last gameweek of the season ({LAST_GAMEWEEK})",
        last.gameweek
      );
    }
  }

  debug!("Round one drawn with {} matches and {byes} byes", rounds[0].matches.len());
  info!(
    "Generated bracket for {} participants: {total} rounds from gameweek {start_gameweek}",
    seeded.len()
  );
  Ok(rounds)
}
