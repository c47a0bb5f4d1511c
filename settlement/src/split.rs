//! Per-expense split records
//!
//! Builds the share each participant carries for a single expense, either
//! equally (same truncation rule as the balance calculator) or from shares
//! entered by hand. Splits are informational: the balance calculator always
//! uses an equal split of the settlement total and does not read them.

use crate::{
    remainder,
    types::{Expense, ExpenseId, ParticipantId},
    Error, Result,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places used when comparing split totals
const COMPARE_SCALE: u32 = 2;

/// How an expense is divided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitType {
    /// Equal shares, first participant absorbs the remainder
    Equal,
    /// Caller-provided shares
    Manual,
}

/// One participant's requested share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRequest {
    /// Participant
    pub participant_id: ParticipantId,

    /// Share, required for manual splits
    #[serde(default)]
    pub share: Option<Decimal>,
}

/// Split request for one expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRequest {
    /// Split type
    pub split_type: SplitType,

    /// Participants sharing the expense, in allocation order
    pub splits: Vec<ShareRequest>,
}

/// Share of one expense carried by one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    /// Expense
    pub expense_id: ExpenseId,

    /// Participant
    pub participant_id: ParticipantId,

    /// Share amount (non-negative)
    pub share: Decimal,
}

impl ExpenseSplit {
    /// Share as a percentage of the expense amount
    pub fn share_percentage(&self, expense_amount: Decimal) -> Decimal {
        if expense_amount.is_zero() {
            return Decimal::ZERO;
        }
        (self.share / expense_amount)
            .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
            * Decimal::ONE_HUNDRED
    }
}

/// Build and validate splits for an expense
pub fn build_splits(expense: &Expense, request: &SplitRequest) -> Result<Vec<ExpenseSplit>> {
    tracing::debug!(
        expense_id = %expense.id,
        split_type = ?request.split_type,
        participants = request.splits.len(),
        "Building expense splits"
    );

    let splits = match request.split_type {
        SplitType::Equal => {
            let ids: Vec<ParticipantId> =
                request.splits.iter().map(|s| s.participant_id).collect();
            equal_splits(expense, &ids)?
        }
        SplitType::Manual => {
            let shares = request
                .splits
                .iter()
                .map(|s| {
                    s.share.map(|share| (s.participant_id, share)).ok_or_else(|| {
                        Error::InvalidAmount(format!(
                            "manual split for {} is missing a share",
                            s.participant_id
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            manual_splits(expense, &shares)?
        }
    };

    validate_split_total(expense.amount, &splits)?;
    Ok(splits)
}

/// Equal shares truncated at 2 decimals; the first participant absorbs the rest
pub fn equal_splits(expense: &Expense, participants: &[ParticipantId]) -> Result<Vec<ExpenseSplit>> {
    if participants.is_empty() {
        return Err(Error::NoActiveParticipants);
    }

    let shares = remainder::split_evenly(expense.amount, participants.len(), COMPARE_SCALE);

    Ok(participants
        .iter()
        .enumerate()
        .map(|(idx, &participant_id)| ExpenseSplit {
            expense_id: expense.id,
            participant_id,
            share: if idx == 0 {
                shares.absorber_share()
            } else {
                shares.per_person
            },
        })
        .collect())
}

/// Caller-provided shares; each must be non-negative
pub fn manual_splits(
    expense: &Expense,
    shares: &[(ParticipantId, Decimal)],
) -> Result<Vec<ExpenseSplit>> {
    shares
        .iter()
        .map(|&(participant_id, share)| {
            if share < Decimal::ZERO {
                return Err(Error::InvalidAmount(format!(
                    "share {} for {} must not be negative",
                    share, participant_id
                )));
            }
            Ok(ExpenseSplit {
                expense_id: expense.id,
                participant_id,
                share,
            })
        })
        .collect()
}

/// Shares must add up to the expense amount at 2 decimals (half-up)
pub fn validate_split_total(expense_amount: Decimal, splits: &[ExpenseSplit]) -> Result<()> {
    let actual: Decimal = splits.iter().map(|s| s.share).sum();
    let round = |d: Decimal| {
        d.round_dp_with_strategy(COMPARE_SCALE, RoundingStrategy::MidpointAwayFromZero)
    };

    if round(actual) != round(expense_amount) {
        return Err(Error::SplitMismatch {
            expected: expense_amount,
            actual,
        });
    }
    Ok(())
}
