//! Game-night settlement
//!
//! Each round records signed amounts per participant (winnings positive,
//! losses negative) and must sum to zero. Cumulative totals are already
//! balances, so they go straight to the transfer matcher.
//!
//! # Example
//!
//! ```text
//! Round 1:  A +3000   B -1000   C -2000
//! Round 2:  A -1000   B +2000   C -1000
//!
//! Totals:   A +2000   B +1000   C -3000
//!
//! Transfers:
//!   C pays A: 2000
//!   C pays B: 1000
//! ```

use crate::{
    netting::TransferMatcher,
    types::{Participant, ParticipantId, ParticipantSummary, SettlementId, Transfer},
    Error, Result,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// One participant's result in a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRoundEntry {
    /// Participant
    pub participant_id: ParticipantId,

    /// Signed amount won (positive) or lost (negative)
    pub amount: Decimal,
}

/// A single game round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRound {
    /// Round ID
    pub id: Uuid,

    /// 1-based round number
    pub round_number: u32,

    /// Display title
    pub title: String,

    /// Entries
    pub entries: Vec<GameRoundEntry>,

    /// Participants sitting this round out
    #[serde(default)]
    pub excluded: Vec<ParticipantId>,
}

impl GameRound {
    /// Create round with a generated title
    pub fn new(round_number: u32, entries: Vec<GameRoundEntry>) -> Self {
        Self {
            id: Uuid::now_v7(),
            round_number,
            title: format!("Round {}", round_number),
            entries,
            excluded: Vec::new(),
        }
    }

    /// Exclude participants from this round
    pub fn excluding(mut self, excluded: impl IntoIterator<Item = ParticipantId>) -> Self {
        self.excluded.extend(excluded);
        self
    }

    fn is_excluded(&self, id: ParticipantId) -> bool {
        self.excluded.contains(&id)
    }
}

/// Round validation outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundValidation {
    /// Round sums to zero and nobody is missing
    pub is_valid: bool,

    /// Sum of all entries
    pub total_amount: Decimal,

    /// Active, non-excluded participants without an entry
    pub missing_participants: Vec<String>,

    /// Reason, when invalid
    pub error_message: Option<String>,
}

impl RoundValidation {
    /// Convert into a result
    pub fn into_result(self) -> Result<()> {
        match self.error_message {
            Some(message) if !self.is_valid => Err(Error::InvalidRound(message)),
            _ => Ok(()),
        }
    }
}

/// Check that a round sums to zero and covers every playing participant
pub fn validate_round(round: &GameRound, participants: &[Participant]) -> RoundValidation {
    // Exclusion only waives the missing-entry check; every entry counts
    let total_amount: Decimal = round.entries.iter().map(|e| e.amount).sum();

    let with_entry: HashSet<ParticipantId> =
        round.entries.iter().map(|e| e.participant_id).collect();
    let missing_participants: Vec<String> = participants
        .iter()
        .filter(|p| p.is_active && !round.is_excluded(p.id) && !with_entry.contains(&p.id))
        .map(|p| p.name.clone())
        .collect();

    let error_message = if !total_amount.is_zero() {
        Some(format!(
            "{} sums to {}; a round must sum to zero",
            round.title, total_amount
        ))
    } else if !missing_participants.is_empty() {
        Some(format!(
            "{} is missing entries for {}",
            round.title,
            missing_participants.join(", ")
        ))
    } else {
        None
    };

    RoundValidation {
        is_valid: error_message.is_none(),
        total_amount,
        missing_participants,
        error_message,
    }
}

/// Cumulative standing of one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantGameStatus {
    /// Participant ID
    pub participant_id: ParticipantId,

    /// Participant name
    pub participant_name: String,

    /// Net winnings over all rounds
    pub total_amount: Decimal,

    /// Rounds played
    pub round_count: usize,

    /// Rounds won
    pub win_count: usize,

    /// Rounds lost
    pub lose_count: usize,

    /// Largest single-round win
    pub max_win: Decimal,

    /// Largest single-round loss (magnitude)
    pub max_loss: Decimal,
}

/// Cumulative status for every active participant, in input order
pub fn participant_status(
    participants: &[Participant],
    rounds: &[GameRound],
) -> Vec<ParticipantGameStatus> {
    participants
        .iter()
        .filter(|p| p.is_active)
        .map(|participant| {
            let amounts: Vec<Decimal> = rounds
                .iter()
                .filter(|round| !round.is_excluded(participant.id))
                .filter_map(|round| {
                    round
                        .entries
                        .iter()
                        .find(|e| e.participant_id == participant.id)
                        .map(|e| e.amount)
                })
                .collect();

            ParticipantGameStatus {
                participant_id: participant.id,
                participant_name: participant.name.clone(),
                total_amount: amounts.iter().copied().sum(),
                round_count: amounts.len(),
                win_count: amounts.iter().filter(|a| **a > Decimal::ZERO).count(),
                lose_count: amounts.iter().filter(|a| **a < Decimal::ZERO).count(),
                max_win: amounts
                    .iter()
                    .copied()
                    .filter(|a| *a > Decimal::ZERO)
                    .max()
                    .unwrap_or(Decimal::ZERO),
                max_loss: amounts
                    .iter()
                    .copied()
                    .filter(|a| *a < Decimal::ZERO)
                    .min()
                    .map(|a| a.abs())
                    .unwrap_or(Decimal::ZERO),
            }
        })
        .collect()
}

/// Game-wide statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Rounds played
    pub total_rounds: usize,

    /// Sum of positive entries over all rounds
    pub total_amount: Decimal,

    /// total_amount / total_rounds at 2 decimals
    pub average_round_amount: Decimal,
}

/// Compute game statistics
pub fn game_statistics(rounds: &[GameRound]) -> GameStatistics {
    let total_amount: Decimal = rounds
        .iter()
        .flat_map(|round| round.entries.iter())
        .map(|e| e.amount)
        .filter(|a| *a > Decimal::ZERO)
        .sum();

    let average_round_amount = if rounds.is_empty() {
        Decimal::ZERO
    } else {
        (total_amount / Decimal::from(rounds.len())).round_dp(2)
    };

    GameStatistics {
        total_rounds: rounds.len(),
        total_amount,
        average_round_amount,
    }
}

/// Game settlement result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettlementResult {
    /// Settlement ID
    pub settlement_id: SettlementId,

    /// Cumulative standing per participant
    pub final_balances: Vec<ParticipantGameStatus>,

    /// Transfers from losers to winners
    pub transfers: Vec<Transfer>,

    /// Game statistics
    pub statistics: GameStatistics,

    /// Calculation timestamp
    pub calculated_at: DateTime<Utc>,
}

/// Validate all rounds and settle cumulative winnings
pub fn settle_game<M: TransferMatcher + ?Sized>(
    settlement_id: SettlementId,
    participants: &[Participant],
    rounds: &[GameRound],
    matcher: &M,
) -> Result<GameSettlementResult> {
    if !participants.iter().any(|p| p.is_active) {
        return Err(Error::NoActiveParticipants);
    }

    let active: HashSet<ParticipantId> = participants
        .iter()
        .filter(|p| p.is_active)
        .map(|p| p.id)
        .collect();

    for round in rounds {
        if let Some(entry) = round
            .entries
            .iter()
            .find(|e| !active.contains(&e.participant_id))
        {
            return Err(Error::UnknownParticipant(entry.participant_id));
        }
        validate_round(round, participants).into_result()?;
    }

    tracing::info!(
        %settlement_id,
        rounds = rounds.len(),
        participants = active.len(),
        "Settling game"
    );

    let final_balances = participant_status(participants, rounds);
    let summaries: Vec<ParticipantSummary> = final_balances
        .iter()
        .map(|status| ParticipantSummary {
            participant_id: status.participant_id,
            participant_name: status.participant_name.clone(),
            total_paid: Decimal::ZERO,
            should_pay: -status.total_amount,
            balance: status.total_amount,
        })
        .collect();

    let transfers = matcher.match_transfers(&summaries);

    Ok(GameSettlementResult {
        settlement_id,
        final_balances,
        transfers,
        statistics: game_statistics(rounds),
        calculated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netting::GreedyMatcher;

    fn entry(p: &Participant, amount: i64) -> GameRoundEntry {
        GameRoundEntry {
            participant_id: p.id,
            amount: Decimal::from(amount),
        }
    }

    #[test]
    fn test_validate_round() {
        let a = Participant::new("A");
        let b = Participant::new("B");
        let c = Participant::new("C");
        let participants = vec![a.clone(), b.clone(), c.clone()];

        let ok = GameRound::new(1, vec![entry(&a, 3000), entry(&b, -1000), entry(&c, -2000)]);
        assert!(validate_round(&ok, &participants).is_valid);

        let unbalanced = GameRound::new(2, vec![entry(&a, 3000), entry(&b, -1000), entry(&c, 0)]);
        let validation = validate_round(&unbalanced, &participants);
        assert!(!validation.is_valid);
        assert_eq!(validation.total_amount, Decimal::from(2000));
        assert!(matches!(validation.into_result(), Err(Error::InvalidRound(_))));

        let missing = GameRound::new(3, vec![entry(&a, 1000), entry(&b, -1000)]);
        let validation = validate_round(&missing, &participants);
        assert!(!validation.is_valid);
        assert_eq!(validation.missing_participants, vec!["C".to_string()]);

        let sat_out = GameRound::new(4, vec![entry(&a, 1000), entry(&b, -1000)]).excluding([c.id]);
        assert!(validate_round(&sat_out, &participants).is_valid);
    }

    #[test]
    fn test_excluded_entry_still_counts() {
        let a = Participant::new("A");
        let b = Participant::new("B");
        let c = Participant::new("C");
        let participants = vec![a.clone(), b.clone(), c.clone()];

        let round = GameRound::new(1, vec![entry(&a, 50), entry(&b, -100), entry(&c, 50)])
            .excluding([c.id]);

        let validation = validate_round(&round, &participants);
        assert!(validation.is_valid);
        assert_eq!(validation.total_amount, Decimal::ZERO);

        let stats = game_statistics(&[round]);
        assert_eq!(stats.total_amount, Decimal::from(100));
    }

    #[test]
    fn test_participant_status() {
        let a = Participant::new("A");
        let b = Participant::new("B");
        let rounds = vec![
            GameRound::new(1, vec![entry(&a, 500), entry(&b, -500)]),
            GameRound::new(2, vec![entry(&a, -200), entry(&b, 200)]),
            GameRound::new(3, vec![entry(&a, 0), entry(&b, 0)]),
        ];

        let status = participant_status(&[a, b], &rounds);

        assert_eq!(status[0].total_amount, Decimal::from(300));
        assert_eq!(status[0].round_count, 3);
        assert_eq!(status[0].win_count, 1);
        assert_eq!(status[0].lose_count, 1);
        assert_eq!(status[0].max_win, Decimal::from(500));
        assert_eq!(status[0].max_loss, Decimal::from(200));
        assert_eq!(status[1].total_amount, Decimal::from(-300));
    }

    #[test]
    fn test_settle_game() {
        let a = Participant::new("A");
        let b = Participant::new("B");
        let c = Participant::new("C");
        let rounds = vec![
            GameRound::new(1, vec![entry(&a, 3000), entry(&b, -1000), entry(&c, -2000)]),
            GameRound::new(2, vec![entry(&a, -1000), entry(&b, 2000), entry(&c, -1000)]),
        ];

        let result = settle_game(
            SettlementId::new(),
            &[a.clone(), b.clone(), c.clone()],
            &rounds,
            &GreedyMatcher,
        )
        .unwrap();

        assert_eq!(result.transfers.len(), 2);
        assert_eq!(result.transfers[0].from_participant_id, c.id);
        assert_eq!(result.transfers[0].to_participant_id, a.id);
        assert_eq!(result.transfers[0].amount, Decimal::from(2000));
        assert_eq!(result.transfers[1].to_participant_id, b.id);
        assert_eq!(result.transfers[1].amount, Decimal::from(1000));

        assert_eq!(result.statistics.total_rounds, 2);
        assert_eq!(result.statistics.total_amount, Decimal::from(5000));
        assert_eq!(result.statistics.average_round_amount, Decimal::from(2500));
    }

    #[test]
    fn test_settle_game_rejects_bad_input() {
        let a = Participant::new("A");
        let b = Participant::new("B");
        let stranger = Participant::new("Stranger");

        let err = settle_game(SettlementId::new(), &[], &[], &GreedyMatcher).unwrap_err();
        assert!(matches!(err, Error::NoActiveParticipants));

        let rounds = vec![GameRound::new(
            1,
            vec![entry(&a, 100), entry(&b, -50), entry(&stranger, -50)],
        )];
        let err = settle_game(SettlementId::new(), &[a.clone(), b.clone()], &rounds, &GreedyMatcher)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownParticipant(id) if id == stranger.id));

        let rounds = vec![GameRound::new(1, vec![entry(&a, 100), entry(&b, -40)])];
        let err = settle_game(SettlementId::new(), &[a, b], &rounds, &GreedyMatcher).unwrap_err();
        assert!(matches!(err, Error::InvalidRound(_)));
    }

    #[test]
    fn test_game_statistics_empty() {
        let stats = game_statistics(&[]);
        assert_eq!(stats.total_rounds, 0);
        assert_eq!(stats.average_round_amount, Decimal::ZERO);
    }
}
