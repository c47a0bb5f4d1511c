//! Balance calculation
//!
//! Computes what each participant paid, what they should have paid under an
//! equal split, and the resulting signed balance.
//!
//! # Example
//!
//! ```text
//! Expenses:  A paid 30000, B paid 20000, C paid 10000
//! Total:     60000, per person 20000.00
//!
//! Balances:
//!   A: +10000.00 (owed money)
//!   B:      0.00
//!   C: -10000.00 (owes money)
//! ```
//!
//! Any per-expense split data is ignored; every active participant carries
//! an equal share of the total.

use crate::{
    config::RoundingConfig,
    remainder,
    types::{Expense, Participant, ParticipantId, ParticipantSummary, RemainderOverride},
    Error, Result,
};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Balance calculator
#[derive(Debug, Clone, Default)]
pub struct BalanceCalculator {
    rounding: RoundingConfig,
}

impl BalanceCalculator {
    /// Create new balance calculator
    pub fn new(rounding: RoundingConfig) -> Self {
        Self { rounding }
    }

    /// Compute one summary per active participant, in input order
    pub fn calculate(
        &self,
        expenses: &[Expense],
        participants: &[Participant],
        remainder: Option<&RemainderOverride>,
    ) -> Result<Vec<ParticipantSummary>> {
        let active: Vec<&Participant> = participants.iter().filter(|p| p.is_active).collect();
        if active.is_empty() {
            return Err(Error::NoActiveParticipants);
        }
        if expenses.is_empty() {
            return Err(Error::NoExpenses);
        }
        validate_amounts(expenses)?;

        let total = total_amount(expenses);
        let total_paid = self.total_paid(expenses, &active);
        let should_pay = remainder::allocate(total, &active, remainder, &self.rounding)?;

        Ok(active
            .iter()
            .zip(should_pay)
            .map(|(participant, should_pay)| {
                let paid = total_paid
                    .get(&participant.id)
                    .copied()
                    .unwrap_or(Decimal::ZERO);

                ParticipantSummary {
                    participant_id: participant.id,
                    participant_name: participant.name.clone(),
                    total_paid: paid,
                    should_pay,
                    balance: paid - should_pay,
                }
            })
            .collect())
    }

    /// Sum paid per participant
    fn total_paid(
        &self,
        expenses: &[Expense],
        participants: &[&Participant],
    ) -> HashMap<ParticipantId, Decimal> {
        let mut paid: HashMap<ParticipantId, Decimal> = participants
            .iter()
            .map(|p| (p.id, Decimal::ZERO))
            .collect();

        for expense in expenses {
            match paid.get_mut(&expense.payer) {
                Some(sum) => *sum += expense.amount,
                None => tracing::warn!(
                    expense_id = %expense.id,
                    payer = %expense.payer,
                    "expense payer is not an active participant; amount credited to nobody"
                ),
            }
        }

        paid
    }
}

/// Sum of all expense amounts
pub fn total_amount(expenses: &[Expense]) -> Decimal {
    expenses.iter().map(|e| e.amount).sum()
}

fn validate_amounts(expenses: &[Expense]) -> Result<()> {
    match expenses.iter().find(|e| e.amount <= Decimal::ZERO) {
        Some(expense) => Err(Error::InvalidAmount(format!(
            "expense {} has non-positive amount {}",
            expense.id, expense.amount
        ))),
        None => Ok(()),
    }
}
