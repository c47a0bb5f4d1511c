//! Transfer matching
//!
//! Turns signed balances into point-to-point transfers.
//!
//! # Algorithm
//!
//! 1. Split participants into creditors (balance > 0) and debtors (balance < 0)
//! 2. Sort both sides by amount, largest first (stable)
//! 3. Match the largest debtor with the largest creditor for min(both)
//! 4. Advance whichever side reached zero, repeat
//!
//! # Example
//!
//! ```text
//! Balances:
//!   A: +15000   B: +5000   C: -5000   D: -15000
//!
//! Transfers:
//!   D pays A: 15000
//!   C pays B: 5000
//! ```
//!
//! Greedy matching is not guaranteed to reach the minimum number of
//! transfers for every distribution; it needs at most n - 1.

use crate::types::{ParticipantId, ParticipantSummary, Transfer};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Strategy producing transfers that settle a set of balances
pub trait TransferMatcher: Send + Sync {
    /// Produce transfers that drive every balance to zero
    fn match_transfers(&self, summaries: &[ParticipantSummary]) -> Vec<Transfer>;
}

impl<M: TransferMatcher + ?Sized> TransferMatcher for &M {
    fn match_transfers(&self, summaries: &[ParticipantSummary]) -> Vec<Transfer> {
        (**self).match_transfers(summaries)
    }
}

impl<M: TransferMatcher + ?Sized> TransferMatcher for Box<M> {
    fn match_transfers(&self, summaries: &[ParticipantSummary]) -> Vec<Transfer> {
        (**self).match_transfers(summaries)
    }
}

/// Greedy largest-first matcher
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyMatcher;

/// Outstanding amount for one side of the match
struct Position<'a> {
    summary: &'a ParticipantSummary,
    remaining: Decimal,
}

impl TransferMatcher for GreedyMatcher {
    fn match_transfers(&self, summaries: &[ParticipantSummary]) -> Vec<Transfer> {
        let mut creditors: Vec<Position<'_>> = summaries
            .iter()
            .filter(|s| s.is_creditor())
            .map(|s| Position {
                summary: s,
                remaining: s.balance,
            })
            .collect();

        let mut debtors: Vec<Position<'_>> = summaries
            .iter()
            .filter(|s| s.is_debtor())
            .map(|s| Position {
                summary: s,
                remaining: s.balance.abs(),
            })
            .collect();

        // Stable: equal amounts keep input order
        creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
        debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

        let mut transfers = Vec::new();
        let (mut i, mut j) = (0, 0);

        while i < creditors.len() && j < debtors.len() {
            let creditor = &mut creditors[i];
            let debtor = &mut debtors[j];
            let amount = creditor.remaining.min(debtor.remaining);

            transfers.push(Transfer {
                from_participant_id: debtor.summary.participant_id,
                from_participant_name: debtor.summary.participant_name.clone(),
                to_participant_id: creditor.summary.participant_id,
                to_participant_name: creditor.summary.participant_name.clone(),
                amount,
            });

            creditor.remaining -= amount;
            debtor.remaining -= amount;

            if creditor.remaining.is_zero() {
                i += 1;
            }
            if debtor.remaining.is_zero() {
                j += 1;
            }
        }

        let unsettled: Decimal = creditors[i..]
            .iter()
            .chain(debtors[j..].iter())
            .map(|p| p.remaining)
            .sum();
        if !unsettled.is_zero() {
            tracing::warn!(%unsettled, "balances do not net to zero; left unsettled");
        }

        tracing::debug!(
            creditors = creditors.len(),
            debtors = debtors.len(),
            transfers = transfers.len(),
            "greedy matching complete"
        );

        transfers
    }
}

/// Replay transfers against the balances; true when everyone ends at zero
pub fn verify_transfers(summaries: &[ParticipantSummary], transfers: &[Transfer]) -> bool {
    let mut balances: HashMap<ParticipantId, Decimal> = summaries
        .iter()
        .map(|s| (s.participant_id, s.balance))
        .collect();

    for transfer in transfers {
        if transfer.amount <= Decimal::ZERO {
            return false;
        }
        match balances.get_mut(&transfer.from_participant_id) {
            Some(balance) => *balance += transfer.amount,
            None => return false,
        }
        match balances.get_mut(&transfer.to_participant_id) {
            Some(balance) => *balance -= transfer.amount,
            None => return false,
        }
    }

    balances.values().all(|b| b.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, balance: &str) -> ParticipantSummary {
        ParticipantSummary {
            participant_id: ParticipantId::new(),
            participant_name: name.to_string(),
            total_paid: Decimal::ZERO,
            should_pay: Decimal::ZERO,
            balance: balance.parse().unwrap(),
        }
    }

    #[test]
    fn test_single_transfer() {
        let summaries = vec![
            summary("A", "10000.00"),
            summary("B", "0.00"),
            summary("C", "-10000.00"),
        ];

        let transfers = GreedyMatcher.match_transfers(&summaries);

        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].from_participant_name, "C");
        assert_eq!(transfers[0].to_participant_name, "A");
        assert_eq!(transfers[0].amount, Decimal::new(1000000, 2));
        assert!(verify_transfers(&summaries, &transfers));
    }

    #[test]
    fn test_largest_first() {
        let summaries = vec![
            summary("A", "15000"),
            summary("B", "5000"),
            summary("C", "-5000"),
            summary("D", "-15000"),
        ];

        let transfers = GreedyMatcher.match_transfers(&summaries);

        assert_eq!(transfers.len(), 2);
        assert_eq!(transfers[0].from_participant_name, "D");
        assert_eq!(transfers[0].to_participant_name, "A");
        assert_eq!(transfers[0].amount, Decimal::from(15000));
        assert_eq!(transfers[1].from_participant_name, "C");
        assert_eq!(transfers[1].to_participant_name, "B");
        assert!(verify_transfers(&summaries, &transfers));
    }

    #[test]
    fn test_one_creditor_many_debtors() {
        let summaries = vec![
            summary("A", "6666.66"),
            summary("B", "-3333.33"),
            summary("C", "-3333.33"),
        ];

        let transfers = GreedyMatcher.match_transfers(&summaries);

        assert_eq!(transfers.len(), 2);
        // Equal debts keep input order
        assert_eq!(transfers[0].from_participant_name, "B");
        assert_eq!(transfers[1].from_participant_name, "C");
        let total: Decimal = transfers.iter().map(|t| t.amount).sum();
        assert_eq!(total, "6666.66".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_split_debt_across_creditors() {
        let summaries = vec![
            summary("A", "70"),
            summary("B", "30"),
            summary("C", "-100"),
        ];

        let transfers = GreedyMatcher.match_transfers(&summaries);

        assert_eq!(transfers.len(), 2);
        assert_eq!(transfers[0].amount, Decimal::from(70));
        assert_eq!(transfers[1].amount, Decimal::from(30));
        assert!(verify_transfers(&summaries, &transfers));
    }

    #[test]
    fn test_all_zero_yields_nothing() {
        let summaries = vec![summary("A", "0"), summary("B", "0.00")];
        assert!(GreedyMatcher.match_transfers(&summaries).is_empty());
        assert!(GreedyMatcher.match_transfers(&[]).is_empty());
    }

    #[test]
    fn test_verify_rejects_bad_replay() {
        let summaries = vec![summary("A", "50"), summary("B", "-50")];
        let mut transfers = GreedyMatcher.match_transfers(&summaries);
        transfers[0].amount = Decimal::from(40);
        assert!(!verify_transfers(&summaries, &transfers));

        transfers[0].from_participant_id = ParticipantId::new();
        assert!(!verify_transfers(&summaries, &transfers));
    }

    #[test]
    fn test_boxed_strategy() {
        let matcher: Box<dyn TransferMatcher> = Box::new(GreedyMatcher);
        let summaries = vec![summary("A", "1"), summary("B", "-1")];
        assert_eq!(matcher.match_transfers(&summaries).len(), 1);
    }
}
