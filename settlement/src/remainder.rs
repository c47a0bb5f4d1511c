//! Remainder allocation
//!
//! Splits a total into equal shares without losing or inventing currency
//! units. Shares are truncated toward zero and whatever is left over is
//! absorbed by a single participant, so the shares always add up to the
//! total exactly.
//!
//! # Modes
//!
//! ```text
//! Default:   per_person = trunc(total / n, 2)
//!            absorber   = per_person + (total - per_person * n)
//!
//! Override:  per_person = trunc((total - amount) / n, 0)
//!            absorber   = per_person + amount (+ truncation residue)
//! ```

use crate::{
    config::RoundingConfig,
    types::{Participant, ParticipantId, RemainderOverride},
    Error, Result,
};
use rust_decimal::{Decimal, RoundingStrategy};

/// Equal split of a total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EqualShares {
    /// Share paid by everyone except the absorber
    pub per_person: Decimal,

    /// Extra paid by the absorber on top of `per_person`
    pub remainder: Decimal,
}

impl EqualShares {
    /// Share of the participant absorbing the remainder
    pub fn absorber_share(&self) -> Decimal {
        self.per_person + self.remainder
    }
}

/// Truncate toward zero at `scale` decimal places
pub fn truncate(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, RoundingStrategy::ToZero)
}

/// Default mode: truncate the share, leftover goes to the absorber
pub fn split_evenly(total: Decimal, count: usize, scale: u32) -> EqualShares {
    debug_assert!(count > 0, "split_evenly requires at least one share");
    let n = Decimal::from(count);
    let per_person = truncate(total / n, scale);
    let remainder = total - per_person * n;

    EqualShares { per_person, remainder }
}

/// Override mode: the absorber takes `amount` and the rest is shared
///
/// Any residue left by truncating the shared part also lands on the
/// absorber, keeping `per_person * (n - 1) + absorber_share == total`.
pub fn split_with_override(
    total: Decimal,
    count: usize,
    amount: Decimal,
    scale: u32,
) -> Result<EqualShares> {
    debug_assert!(count > 0, "split_with_override requires at least one share");
    if amount < Decimal::ZERO {
        return Err(Error::InvalidAmount(format!(
            "remainder amount {} must not be negative",
            amount
        )));
    }
    if amount > total {
        return Err(Error::InvalidAmount(format!(
            "remainder amount {} exceeds total {}",
            amount, total
        )));
    }

    let remaining_total = total - amount;
    let shared = split_evenly(remaining_total, count, scale);

    Ok(EqualShares {
        per_person: shared.per_person,
        remainder: amount + shared.remainder,
    })
}

/// Allocate `should_pay` for every participant, in input order
pub fn allocate(
    total: Decimal,
    participants: &[&Participant],
    remainder: Option<&RemainderOverride>,
    rounding: &RoundingConfig,
) -> Result<Vec<Decimal>> {
    if participants.is_empty() {
        return Err(Error::NoActiveParticipants);
    }
    let count = participants.len();

    let (shares, absorber) = match remainder.filter(|r| r.is_effective()) {
        Some(over) => {
            let shares = split_with_override(total, count, over.amount, rounding.override_scale)?;
            let absorber = match over.payer {
                Some(payer) => position_of(participants, payer)?,
                None => 0,
            };
            (shares, absorber)
        }
        None => (split_evenly(total, count, rounding.share_scale), 0),
    };

    tracing::debug!(
        per_person = %shares.per_person,
        remainder = %shares.remainder,
        absorber,
        "allocated equal shares"
    );

    Ok((0..count)
        .map(|idx| {
            if idx == absorber {
                shares.absorber_share()
            } else {
                shares.per_person
            }
        })
        .collect())
}

fn position_of(participants: &[&Participant], id: ParticipantId) -> Result<usize> {
    participants
        .iter()
        .position(|p| p.id == id)
        .ok_or(Error::UnknownParticipant(id))
}
