//! Main settlement engine
//!
//! Runs the balance calculator, then hands the balances to a transfer
//! matcher. Holds no state between calls.

use crate::{
    balance::{self, BalanceCalculator},
    config::{Config, RoundingConfig},
    netting::{GreedyMatcher, TransferMatcher},
    types::*,
    Result,
};
use chrono::Utc;

/// Settlement engine
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine<M = GreedyMatcher> {
    /// Balance calculator
    calculator: BalanceCalculator,

    /// Transfer matching strategy
    matcher: M,
}

impl SettlementEngine<GreedyMatcher> {
    /// Create engine with the greedy matcher
    pub fn new(rounding: RoundingConfig) -> Self {
        Self::with_matcher(rounding, GreedyMatcher)
    }

    /// Create engine from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rounding)
    }
}

impl<M: TransferMatcher> SettlementEngine<M> {
    /// Create engine with a custom matching strategy
    pub fn with_matcher(rounding: RoundingConfig, matcher: M) -> Self {
        Self {
            calculator: BalanceCalculator::new(rounding),
            matcher,
        }
    }

    /// Calculate balances and transfers for a settlement
    pub fn calculate(
        &self,
        settlement_id: SettlementId,
        expenses: &[Expense],
        participants: &[Participant],
        remainder: Option<&RemainderOverride>,
    ) -> Result<SettlementResult> {
        tracing::info!(
            %settlement_id,
            participants = participants.len(),
            expenses = expenses.len(),
            "Calculating settlement"
        );

        let summaries = self.calculate_balances(expenses, participants, remainder)?;
        let total_amount = balance::total_amount(expenses);

        tracing::info!(
            %settlement_id,
            %total_amount,
            active = summaries.len(),
            "Balances computed"
        );

        let transfers = self.match_transfers(&summaries);

        tracing::info!(
            %settlement_id,
            transfers = transfers.len(),
            "Settlement calculation complete"
        );

        Ok(SettlementResult {
            settlement_id,
            total_amount,
            participants: summaries,
            transfers,
            calculated_at: Utc::now(),
        })
    }

    /// Balance calculation only
    pub fn calculate_balances(
        &self,
        expenses: &[Expense],
        participants: &[Participant],
        remainder: Option<&RemainderOverride>,
    ) -> Result<Vec<ParticipantSummary>> {
        self.calculator.calculate(expenses, participants, remainder)
    }

    /// Transfer matching only
    pub fn match_transfers(&self, summaries: &[ParticipantSummary]) -> Vec<Transfer> {
        self.matcher.match_transfers(summaries)
    }

    /// Matching strategy in use
    pub fn matcher(&self) -> &M {
        &self.matcher
    }
}
