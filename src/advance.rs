use crate::resolver::{determine_match_winner, is_round_complete};
use crate::types::*;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Puts `incoming` in the slot. Keeps the current player, recorded score
/// included, when it is already the same team. Returns whether the slot changed.
fn seat(slot: &mut Option<MatchPlayer>, incoming: Option<MatchPlayer>) -> bool {
  match (slot.as_ref(), incoming) {
    (Some(current), Some(next)) if current.fpl_team_id == next.fpl_team_id => false,
    (None, None) => false,
    (_, next) => {
      *slot = next;
      true
    }
  }
}

/// Fills the round after `completed_round_number` with its winners: match `j`
/// takes the winners of matches `2j` and `2j + 1`. Returns a copy of `rounds`
/// untouched when that round is missing, incomplete, or the final.
pub fn advance_winners_to_next_round(
  rounds: &[Round],
  completed_round_number: u32,
  participants: &[Participant],
) -> Vec<Round> {
  let mut next_rounds = rounds.to_vec();

  let Some(completed) = rounds.iter().find(|r| r.round_number == completed_round_number) else {
    return next_rounds;
  };
  if !completed.is_complete {
    debug!("Round {completed_round_number} is not complete yet; nothing to advance");
    return next_rounds;
  }
  let Some(next_round) = next_rounds
    .iter_mut()
    .find(|r| r.round_number == completed_round_number + 1)
  else {
    return next_rounds;
  };

  let seeds = participants
    .iter()
    .map(|p| (p.fpl_team_id, p.seed))
    .collect::<HashMap<_, _>>();

  let winners = completed
    .matches
    .iter()
    .filter_map(|m| {
      let winner_id = m.winner_id?;
      let seed = seeds
        .get(&winner_id)
        .copied()
        .or_else(|| m.player(winner_id).map(|p| p.seed));
      if seed.is_none() {
        warn!("Winner {winner_id} of {} has no known seed; not advancing it", m.id);
      }
      Some(MatchPlayer::new(winner_id, seed?))
    })
    .collect::<Vec<_>>();

  let mut seated = 0usize;
  for (index, m) in next_round.matches.iter_mut().enumerate() {
    let first = winners.get(index * 2).cloned();
    let second = winners.get(index * 2 + 1).cloned();
    m.is_bye = first.is_some() && second.is_none();

    if seat(&mut m.player1, first) | seat(&mut m.player2, second) {
      seated += 1;
    }
    m.winner_id = determine_match_winner(m);
  }
  next_round.is_complete = is_round_complete(next_round);

  if seated > 0 {
    info!(
      "Advanced {} winners from round {completed_round_number} into {} ({seated} matches updated)",
      winners.len(),
      next_round.name
    );
  }
  next_rounds
}

/// Empties every slot fed by a match that has no winner, round by round, so a
/// corrected result cannot leave a stale team further up the bracket.
pub fn clear_unresolved_feeds(rounds: &[Round]) -> Vec<Round> {
  let mut next_rounds = rounds.to_vec();

  for index in 1..next_rounds.len() {
    let (earlier, later) = next_rounds.split_at_mut(index);
    let feeding = &earlier[index - 1];
    let fed = &mut later[0];
    if fed.round_number != feeding.round_number + 1 {
      continue;
    }

    let mut cleared = 0usize;
    for (position, source) in feeding.matches.iter().enumerate() {
      if source.is_resolved() {
        continue;
      }
      let Some(m) = fed.matches.get_mut(position / 2) else {
        continue;
      };
      let slot = if position % 2 == 0 { &mut m.player1 } else { &mut m.player2 };
      if slot.take().is_some() {
        m.is_bye = false;
        m.winner_id = determine_match_winner(m);
        cleared += 1;
      }
    }

    if cleared > 0 {
      fed.is_complete = is_round_complete(fed);
      warn!("Cleared {cleared} slots in {} fed by unresolved matches", fed.name);
    }
  }
  next_rounds
}

/// The final's winner, once there is one.
pub fn tournament_winner(rounds: &[Round]) -> Option<FplTeamId> {
  let final_round = rounds.iter().max_by_key(|r| r.round_number)?;
  match final_round.matches.as_slice() {
    [only] => only.winner_id,
    _ => None,
  }
}

pub fn tournament_status(rounds: &[Round]) -> TournamentStatus {
  if tournament_winner(rounds).is_some() {
    TournamentStatus::Complete
  } else if rounds.iter().any(Round::has_recorded_scores) {
    TournamentStatus::InProgress
  } else {
    TournamentStatus::Seeded
  }
}
