//! Core types for the settlement engine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Participant identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Create a fresh random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Expense identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(Uuid);

impl ExpenseId {
    /// Create a fresh random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for ExpenseId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settlement identifier (the group being netted out)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettlementId(Uuid);

impl SettlementId {
    /// Create a fresh random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SettlementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SettlementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Person taking part in a settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Participant ID
    pub id: ParticipantId,

    /// Display name
    pub name: String,

    /// Inactive participants are left out of calculations
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Participant {
    /// Create an active participant with a fresh ID
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(),
            name: name.into(),
            is_active: true,
        }
    }
}

/// Recorded expense, paid in full by one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID
    #[serde(default)]
    pub id: ExpenseId,

    /// Who paid
    pub payer: ParticipantId,

    /// Amount paid (positive, 2 fractional digits)
    pub amount: Decimal,

    /// Free-form description
    #[serde(default)]
    pub description: String,
}

impl Expense {
    /// Create an expense with a fresh ID
    pub fn new(payer: ParticipantId, amount: Decimal) -> Self {
        Self {
            id: ExpenseId::new(),
            payer,
            amount,
            description: String::new(),
        }
    }
}

/// Caller-designated remainder: one participant absorbs a named amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainderOverride {
    /// Who absorbs the amount (first participant when absent)
    #[serde(default)]
    pub payer: Option<ParticipantId>,

    /// Amount absorbed on top of the equal share
    pub amount: Decimal,
}

impl RemainderOverride {
    /// Override mode only applies to a positive amount
    pub fn is_effective(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// Per-participant outcome of a calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    /// Participant ID
    pub participant_id: ParticipantId,

    /// Participant name
    pub participant_name: String,

    /// Sum of expenses this participant paid
    pub total_paid: Decimal,

    /// Allocated share of the total
    pub should_pay: Decimal,

    /// total_paid - should_pay (positive = owed money, negative = owes money)
    pub balance: Decimal,
}

impl ParticipantSummary {
    /// Owed money
    pub fn is_creditor(&self) -> bool {
        self.balance > Decimal::ZERO
    }

    /// Owes money
    pub fn is_debtor(&self) -> bool {
        self.balance < Decimal::ZERO
    }
}

/// Directed payment instruction from a debtor to a creditor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Debtor (pays)
    pub from_participant_id: ParticipantId,

    /// Debtor name
    pub from_participant_name: String,

    /// Creditor (receives)
    pub to_participant_id: ParticipantId,

    /// Creditor name
    pub to_participant_name: String,

    /// Amount to transfer (positive)
    pub amount: Decimal,
}

/// Settlement calculation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    /// Settlement ID
    pub settlement_id: SettlementId,

    /// Sum of all expenses
    pub total_amount: Decimal,

    /// Per-participant summaries, in input order
    pub participants: Vec<ParticipantSummary>,

    /// Transfers that settle every balance
    pub transfers: Vec<Transfer>,

    /// Calculation timestamp
    pub calculated_at: DateTime<Utc>,
}

impl SettlementResult {
    /// Total money moved by the transfers
    pub fn transfer_total(&self) -> Decimal {
        self.transfers.iter().map(|t| t.amount).sum()
    }

    /// Participants who are owed money
    pub fn creditors(&self) -> impl Iterator<Item = &ParticipantSummary> {
        self.participants.iter().filter(|s| s.is_creditor())
    }

    /// Participants who owe money
    pub fn debtors(&self) -> impl Iterator<Item = &ParticipantSummary> {
        self.participants.iter().filter(|s| s.is_debtor())
    }

    /// Look up a participant's summary
    pub fn summary_for(&self, id: ParticipantId) -> Option<&ParticipantSummary> {
        self.participants.iter().find(|s| s.participant_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, balance: i64) -> ParticipantSummary {
        ParticipantSummary {
            participant_id: ParticipantId::new(),
            participant_name: name.to_string(),
            total_paid: Decimal::ZERO,
            should_pay: Decimal::ZERO,
            balance: Decimal::new(balance, 2),
        }
    }

    #[test]
    fn test_remainder_override_effective() {
        let zero = RemainderOverride { payer: None, amount: Decimal::ZERO };
        assert!(!zero.is_effective());

        let some = RemainderOverride { payer: None, amount: Decimal::new(100, 0) };
        assert!(some.is_effective());
    }

    #[test]
    fn test_result_helpers() {
        let a = summary("A", 5000);
        let b = summary("B", -5000);
        let c = summary("C", 0);
        let result = SettlementResult {
            settlement_id: SettlementId::new(),
            total_amount: Decimal::new(10000, 2),
            participants: vec![a.clone(), b.clone(), c],
            transfers: vec![Transfer {
                from_participant_id: b.participant_id,
                from_participant_name: b.participant_name.clone(),
                to_participant_id: a.participant_id,
                to_participant_name: a.participant_name.clone(),
                amount: Decimal::new(5000, 2),
            }],
            calculated_at: Utc::now(),
        };

        assert_eq!(result.transfer_total(), Decimal::new(5000, 2));
        assert_eq!(result.creditors().count(), 1);
        assert_eq!(result.debtors().count(), 1);
        assert_eq!(result.summary_for(b.participant_id), Some(&b));
    }

    #[test]
    fn test_participant_defaults_to_active() {
        let json = format!(r#"{{"id":"{}","name":"A"}}"#, Uuid::new_v4());
        let participant: Participant = serde_json::from_str(&json).unwrap();
        assert!(participant.is_active);
    }
}
