use crate::types::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Highest score wins; equal scores go to the better (lower) seed. Returns
/// `None` while any contender is still waiting on points.
pub fn determine_match_winner(m: &Match) -> Option<FplTeamId> {
  if m.is_bye {
    if let Some(player) = m.player1.as_ref() {
      return Some(player.fpl_team_id);
    }
  }

  let players = m.players();
  if players.len() < 2 {
    return None;
  }

  let mut best: Option<(&MatchPlayer, Points)> = None;
  for player in players {
    let score = player.score?;
    best = match best {
      None => Some((player, score)),
      Some((leader, leader_score)) => match score.cmp(&leader_score) {
        Ordering::Greater => Some((player, score)),
        Ordering::Equal if player.seed < leader.seed => Some((player, score)),
        _ => Some((leader, leader_score)),
      },
    };
  }
  best.map(|(player, _)| player.fpl_team_id)
}

/// An empty round is never complete.
pub fn is_round_complete(round: &Round) -> bool {
  !round.matches.is_empty() && round.matches.iter().all(Match::is_resolved)
}

fn fill_score(player: &mut MatchPlayer, sheet: &HashMap<FplTeamId, Points>, match_id: &str) {
  let Some(&points) = sheet.get(&player.fpl_team_id) else {
    return;
  };
  match player.score {
    None => player.score = Some(points),
    Some(recorded) if recorded != points => {
      warn!(
        "Ignoring {points} points for team {} in {match_id}: {recorded} already recorded",
        player.fpl_team_id
      );
    }
    Some(_) => {}
  }
}

/// Copies the round, fills every missing score found in `sheet`, and
/// recomputes winners and completion. Recorded scores are never replaced.
pub fn apply_scores(round: &Round, sheet: &HashMap<FplTeamId, Points>) -> Round {
  let mut next = round.clone();
  for m in next.matches.iter_mut() {
    let match_id = m.id.clone();
    if let Some(players) = m.players.as_mut().filter(|players| !players.is_empty()) {
      for player in players.iter_mut() {
        fill_score(player, sheet, &match_id);
      }
    } else {
      for player in m.player1.iter_mut().chain(m.player2.iter_mut()) {
        fill_score(player, sheet, &match_id);
      }
    }
    m.winner_id = determine_match_winner(m);
  }
  next.is_complete = is_round_complete(&next);
  debug!(
    "Applied scores to {}: {} of {} matches resolved",
    next.name,
    next.matches.iter().filter(|m| m.is_resolved()).count(),
    next.matches.len()
  );
  next
}
