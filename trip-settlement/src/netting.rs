//! Greedy debt-matching
//!
//! Turns member positions into a short list of pairwise transfers.
//!
//! # Algorithm
//!
//! 1. Compute net positions for each member
//! 2. Split into debtors (below -ε) and creditors (above +ε)
//! 3. Sort both largest first, stable on roster order
//! 4. Match the current largest debtor with the current largest creditor
//!
//! Largest-first matching is a heuristic. It does not guarantee the minimum
//! number of transfers, but it is deterministic for a given roster order.
//!
//! # Example
//!
//! ```text
//! Net positions:
//!   A: +200 (creditor)
//!   B: -100 (debtor)
//!   C: -100 (debtor)
//!
//! Transfers:
//!   B pays A: 100
//!   C pays A: 100
//! ```

use crate::{
    balance::compute_positions,
    types::{Expense, MemberId, MemberPosition, Transfer},
    Error, Result,
};
use rust_decimal::{Decimal, RoundingStrategy};

/// Default tolerance: one whole currency unit
pub const DEFAULT_TOLERANCE: Decimal = Decimal::ONE;

/// Decimal places below which a remainder is division noise
const NOISE_SCALE: u32 = 20;

/// Netting engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NettingEngine {
    /// Remaining amounts at or below this are treated as settled
    tolerance: Decimal,
}

impl Default for NettingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl NettingEngine {
    /// Create new netting engine
    pub fn new(tolerance: Decimal) -> Self {
        Self {
            tolerance: tolerance.abs(),
        }
    }

    /// Tolerance in currency units
    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    /// Compute the transfer plan for an expense list
    pub fn compute_settlements(
        &self,
        members: &[MemberId],
        expenses: &[Expense],
    ) -> Result<Vec<Transfer>> {
        let positions = compute_positions(members, expenses)?;
        self.generate_transfers(&positions)
    }

    /// Generate transfers from positions
    ///
    /// Recorded amounts are rounded to whole units. The running remainders
    /// stay exact so rounding never feeds back into later matches.
    pub fn generate_transfers(&self, positions: &[MemberPosition]) -> Result<Vec<Transfer>> {
        let threshold = self.threshold();

        let mut debtors: Vec<(&MemberId, Decimal)> = positions
            .iter()
            .filter(|p| p.is_debtor(threshold))
            .map(|p| (&p.member, p.abs_net_position()))
            .collect();

        let mut creditors: Vec<(&MemberId, Decimal)> = positions
            .iter()
            .filter(|p| p.is_creditor(threshold))
            .map(|p| (&p.member, p.abs_net_position()))
            .collect();

        // Largest first; sort_by is stable so ties keep roster order
        debtors.sort_by(|a, b| b.1.cmp(&a.1));
        creditors.sort_by(|a, b| b.1.cmp(&a.1));

        let mut transfers = Vec::new();
        let (mut d, mut c) = (0, 0);

        while d < debtors.len() && c < creditors.len() {
            let amount = debtors[d].1.min(creditors[c].1);
            let rounded = round_whole(amount);

            if amount > threshold && rounded > Decimal::ZERO {
                transfers.push(Transfer {
                    from: debtors[d].0.clone(),
                    to: creditors[c].0.clone(),
                    amount: rounded,
                });
            }

            debtors[d].1 -= amount;
            creditors[c].1 -= amount;

            if is_settled(debtors[d].1, threshold) {
                d += 1;
            }
            if is_settled(creditors[c].1, threshold) {
                c += 1;
            }
        }

        let leftover: Decimal = debtors[d..]
            .iter()
            .chain(creditors[c..].iter())
            .map(|(_, remaining)| *remaining)
            .sum();
        let allowance = threshold * Decimal::from(positions.len().max(1));

        if leftover > allowance {
            tracing::error!(
                %leftover,
                %allowance,
                unmatched_debtors = debtors.len() - d,
                unmatched_creditors = creditors.len() - c,
                "Balances did not net out"
            );
            return Err(Error::InvariantViolation(format!(
                "{leftover} left unmatched after settlement (allowance {allowance})"
            )));
        }

        tracing::debug!(
            debtors = debtors.len(),
            creditors = creditors.len(),
            transfers = transfers.len(),
            "Generated settlement transfers"
        );

        Ok(transfers)
    }

    /// Tolerance, floored at decimal division noise
    fn threshold(&self) -> Decimal {
        self.tolerance.max(Decimal::new(1, NOISE_SCALE))
    }
}

fn is_settled(remaining: Decimal, threshold: Decimal) -> bool {
    remaining <= Decimal::ZERO || remaining < threshold
}

/// Compute the transfer plan with the default tolerance
pub fn compute_settlements(members: &[MemberId], expenses: &[Expense]) -> Result<Vec<Transfer>> {
    NettingEngine::default().compute_settlements(members, expenses)
}

/// Round to the nearest whole unit, halves away from zero
fn round_whole(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
