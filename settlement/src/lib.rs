//! Settlement Engine
//!
//! Splits shared costs between a group of participants and works out who
//! owes whom.
//!
//! # Architecture
//!
//! A calculation is a pure function of its inputs:
//!
//! 1. **Balances**: Sum what each participant paid and allocate an equal share
//! 2. **Remainder**: Assign leftover currency units to a single participant
//! 3. **Matching**: Pair debtors with creditors into point-to-point transfers
//!
//! # Invariants
//!
//! - Zero sum: Σ(balance) == 0 exactly (fixed-point `Decimal`, no floats)
//! - Transfers net out: replaying them drives every balance to zero
//! - Deterministic: same input snapshot → same balances and transfers
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use settle_engine::{Expense, Participant, RoundingConfig, SettlementEngine, SettlementId};
//!
//! # fn main() -> settle_engine::Result<()> {
//! let alice = Participant::new("Alice");
//! let bob = Participant::new("Bob");
//! let expenses = vec![Expense::new(alice.id, Decimal::from(100))];
//!
//! let engine = SettlementEngine::new(RoundingConfig::default());
//! let result = engine.calculate(SettlementId::new(), &expenses, &[alice, bob], None)?;
//!
//! assert_eq!(result.transfers.len(), 1);
//! assert_eq!(result.transfers[0].amount, Decimal::from(50));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod remainder;
pub mod balance;
pub mod netting;
pub mod split;
pub mod game;
pub mod snapshot;
pub mod error;
pub mod config;
pub mod engine;

// Re-exports
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, RoundingConfig};
pub use balance::BalanceCalculator;
pub use netting::{verify_transfers, GreedyMatcher, TransferMatcher};
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
pub use engine::SettlementEngine;
