use crate::advance::{advance_winners_to_next_round, clear_unresolved_feeds, tournament_status, tournament_winner};
use crate::bracket::generate_bracket;
use crate::error::BracketError;
use crate::resolver::apply_scores;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// A knockout and everything drawn in it.
///
/// Only two things move it forward: recording a gameweek's points and
/// advancing completed rounds. Both are driven by the caller. `revision` goes
/// up whenever the rounds change, so a store can reject stale writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub name: String,
    pub start_gameweek: u32,
    pub participants: Vec<Participant>,
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub revision: u64,
}

impl Tournament {
    pub fn new(name: &str, participants: Vec<Participant>, start_gameweek: u32) -> Result<Self, BracketError> {
        let rounds = generate_bracket(&participants, start_gameweek)?;
        info!("Created knockout \"{name}\" with {} participants", participants.len());
        Ok(Tournament {
            name: name.to_string(),
            start_gameweek,
            participants,
            rounds,
            revision: 0,
        })
    }

    pub fn total_rounds(&self) -> usize {
        self.rounds.len()
    }

    pub fn status(&self) -> TournamentStatus {
        tournament_status(&self.rounds)
    }

    pub fn winner(&self) -> Option<&Participant> {
        tournament_winner(&self.rounds).and_then(|id| self.participant(id))
    }

    pub fn participant(&self, fpl_team_id: FplTeamId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.fpl_team_id == fpl_team_id)
    }

    /// First round still waiting on results.
    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.iter().find(|r| !r.is_complete)
    }

    pub fn round_for_gameweek(&self, gameweek: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.gameweek == gameweek)
    }

    /// The furthest match the team has been drawn into.
    pub fn match_for_team(&self, fpl_team_id: FplTeamId) -> Option<(&Round, &Match)> {
        self.rounds.iter().rev().find_map(|round| {
            round
                .matches
                .iter()
                .find(|m| m.involves(fpl_team_id))
                .map(|m| (round, m))
        })
    }

    pub fn participant_state(&self, fpl_team_id: FplTeamId) -> Option<ParticipantState> {
        self.participant(fpl_team_id)?;
        if tournament_winner(&self.rounds) == Some(fpl_team_id) {
            return Some(ParticipantState::Champion);
        }
        let knocked_out_in = self.rounds.iter().find(|round| {
            round
                .matches
                .iter()
                .any(|m| m.loser_id() == Some(fpl_team_id))
        });
        Some(match knocked_out_in {
            Some(round) => ParticipantState::Eliminated {
                round_number: round.round_number,
            },
            None => ParticipantState::Active,
        })
    }

    fn replace_rounds(&mut self, rounds: Vec<Round>) -> bool {
        if rounds == self.rounds {
            return false;
        }
        self.rounds = rounds;
        self.revision += 1;
        true
    }

    /// Records a gameweek's points against the round played in it.
    pub fn record_gameweek_scores(
        &mut self,
        gameweek: u32,
        sheet: &HashMap<FplTeamId, Points>,
    ) -> Result<(), BracketError> {
        let index = self
            .rounds
            .iter()
            .position(|r| r.gameweek == gameweek)
            .ok_or(BracketError::UnknownGameweek(gameweek))?;

        let mut rounds = self.rounds.clone();
        rounds[index] = apply_scores(&self.rounds[index], sheet);
        if self.replace_rounds(rounds) {
            debug!("Recorded gameweek {gameweek} scores for \"{}\" (revision {})", self.name, self.revision);
        }
        Ok(())
    }

    /// Pushes winners of every completed round forward, then empties any
    /// later slot whose feeding match lost its winner. Safe to call on every
    /// refresh; returns whether anything changed.
    pub fn advance(&mut self) -> bool {
        let mut rounds = self.rounds.clone();
        let round_numbers = rounds.iter().map(|r| r.round_number).collect::<Vec<_>>();
        for round_number in round_numbers {
            rounds = advance_winners_to_next_round(&rounds, round_number, &self.participants);
        }
        self.replace_rounds(clear_unresolved_feeds(&rounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_participants() -> Vec<Participant> {
        vec![
            Participant::new(501, "Klopp Fiction", "Ada", 1),
            Participant::new(502, "Saka Potatoes", "Ben", 2),
            Participant::new(503, "Haalandaise Sauce", "Cleo", 3),
            Participant::new(504, "Ctrl Alt Delap", "Dev", 4),
            Participant::new(505, "Xhaka Khan", "Eve", 5),
            Participant::new(506, "Dinner Ederson", "Fay", 6),
        ]
    }

    fn sheet(entries: &[(u32, i32)]) -> HashMap<u32, i32> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_full_knockout() {
        let mut tournament = Tournament::new("Office League Cup", make_participants(), 20).unwrap();
        assert_eq!(tournament.total_rounds(), 3);
        assert_eq!(tournament.status(), TournamentStatus::Seeded);
        assert_eq!(tournament.current_round().map(|r| r.gameweek), Some(20));

        // Seeds 1 and 2 have byes; 3 v 6 and 4 v 5 are played.
        tournament
            .record_gameweek_scores(20, &sheet(&[(503, 48), (506, 52), (504, 61), (505, 61)]))
            .unwrap();
        assert_eq!(tournament.status(), TournamentStatus::InProgress);
        assert!(tournament.rounds[0].is_complete);
        assert!(tournament.advance());

        let semis = &tournament.rounds[1];
        let drawn: Vec<_> = semis
            .matches
            .iter()
            .map(|m| (m.player1.as_ref().map(|p| p.fpl_team_id), m.player2.as_ref().map(|p| p.fpl_team_id)))
            .collect();
        assert_eq!(drawn, vec![(Some(501), Some(502)), (Some(506), Some(504))]);
        assert_eq!(tournament.participant_state(503), Some(ParticipantState::Eliminated { round_number: 1 }));
        assert_eq!(tournament.participant_state(505), Some(ParticipantState::Eliminated { round_number: 1 }));
        assert_eq!(tournament.participant_state(501), Some(ParticipantState::Active));

        tournament
            .record_gameweek_scores(21, &sheet(&[(501, 70), (502, 81), (506, 66), (504, 40)]))
            .unwrap();
        tournament.advance();
        assert_eq!(
            tournament.match_for_team(502).map(|(round, m)| (round.name.as_str(), m.id.as_str())),
            Some(("Final", "r3-m0"))
        );

        tournament.record_gameweek_scores(22, &sheet(&[(502, 59), (506, 59)])).unwrap();
        tournament.advance();
        assert_eq!(tournament.status(), TournamentStatus::Complete);
        assert_eq!(tournament.winner().map(|p| p.fpl_team_name.as_str()), Some("Saka Potatoes"));
        assert_eq!(tournament.participant_state(502), Some(ParticipantState::Champion));
        assert_eq!(tournament.participant_state(506), Some(ParticipantState::Eliminated { round_number: 3 }));
        assert_eq!(tournament.current_round(), None);
    }

    fn play_out(tournament: &mut Tournament) {
        tournament
            .record_gameweek_scores(20, &sheet(&[(503, 48), (506, 52), (504, 61), (505, 61)]))
            .unwrap();
        tournament.advance();
        tournament
            .record_gameweek_scores(21, &sheet(&[(501, 70), (502, 81), (506, 66), (504, 40)]))
            .unwrap();
        tournament.advance();
        tournament.record_gameweek_scores(22, &sheet(&[(502, 59), (506, 59)])).unwrap();
        tournament.advance();
    }

    #[test]
    fn test_corrected_result_reopens_later_rounds() {
        let mut tournament = Tournament::new("Office League Cup", make_participants(), 20).unwrap();
        play_out(&mut tournament);
        assert_eq!(tournament.winner().map(|p| p.fpl_team_id), Some(502));

        // 505 was short 2 points in gameweek 20 and actually beat 504.
        let corrected = &mut tournament.rounds[0].matches[3];
        corrected.player2 = corrected.player2.take().map(|p| p.with_score(63));
        corrected.winner_id = Some(505);
        assert!(tournament.advance());

        let semi = &tournament.rounds[1].matches[1];
        assert_eq!(semi.player2.as_ref().map(|p| (p.fpl_team_id, p.score)), Some((505, None)));
        assert_eq!(semi.winner_id, None);
        let final_match = &tournament.rounds[2].matches[0];
        assert_eq!(final_match.player1.as_ref().map(|p| p.fpl_team_id), Some(502));
        assert!(final_match.player2.is_none());
        assert_eq!(final_match.winner_id, None);
        assert!(!tournament.rounds[2].is_complete);
        assert_eq!(tournament.status(), TournamentStatus::InProgress);
        assert!(tournament.winner().is_none());
        assert_eq!(tournament.participant_state(506), Some(ParticipantState::Active));
        assert!(!tournament.advance());

        tournament.record_gameweek_scores(21, &sheet(&[(505, 70)])).unwrap();
        tournament.advance();
        tournament.record_gameweek_scores(22, &sheet(&[(505, 60)])).unwrap();
        tournament.advance();
        assert_eq!(tournament.status(), TournamentStatus::Complete);
        assert_eq!(tournament.winner().map(|p| p.fpl_team_id), Some(505));
        assert_eq!(tournament.participant_state(506), Some(ParticipantState::Eliminated { round_number: 2 }));
        assert_eq!(tournament.participant_state(502), Some(ParticipantState::Eliminated { round_number: 3 }));
    }

    #[test]
    fn test_revision_moves_only_on_change() {
        let mut tournament = Tournament::new("Cup", make_participants(), 1).unwrap();
        assert!(!tournament.advance());
        assert_eq!(tournament.revision, 0);

        tournament.record_gameweek_scores(1, &sheet(&[(999, 10)])).unwrap();
        assert_eq!(tournament.revision, 0);

        tournament.record_gameweek_scores(1, &sheet(&[(503, 10)])).unwrap();
        assert_eq!(tournament.revision, 1);
        tournament.record_gameweek_scores(1, &sheet(&[(503, 10)])).unwrap();
        assert_eq!(tournament.revision, 1);

        tournament.record_gameweek_scores(1, &sheet(&[(506, 9), (504, 1), (505, 2)])).unwrap();
        assert_eq!(tournament.revision, 2);
        assert!(tournament.advance());
        assert!(!tournament.advance());
        assert_eq!(tournament.revision, 3);
    }

    #[test]
    fn test_unknown_gameweek() {
        let mut tournament = Tournament::new("Cup", make_participants(), 30).unwrap();
        assert_eq!(
            tournament.record_gameweek_scores(29, &sheet(&[(501, 1)])),
            Err(BracketError::UnknownGameweek(29))
        );
        assert_eq!(tournament.participant_state(42), None);
        assert!(tournament.match_for_team(42).is_none());
    }

    #[test]
    fn test_serializes_with_document_field_names() {
        let tournament = Tournament::new("Cup", make_participants(), 30).unwrap();
        let value = serde_json::to_value(&tournament).unwrap();
        let first_match = &value["rounds"][0]["matches"][0];
        assert_eq!(first_match["isBye"], serde_json::json!(true));
        assert_eq!(first_match["winnerId"], serde_json::json!(501));
        assert_eq!(first_match["player1"]["fplTeamId"], serde_json::json!(501));
        assert_eq!(value["rounds"][0]["roundNumber"], serde_json::json!(1));
        assert_eq!(value["startGameweek"], serde_json::json!(30));

        let back: Tournament = serde_json::from_value(value).unwrap();
        assert_eq!(back, tournament);
    }
}
