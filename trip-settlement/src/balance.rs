//! Balance computation
//!
//! Balances are never stored. They are rederived from the full expense list
//! on every call so that an added or deleted expense cannot leave stale state
//! behind.
//!
//! # Example
//!
//! ```text
//! Members: A, B, C
//! A pays 300, split among A, B, C
//!
//! Positions:
//!   A: paid 300, share 100 → +200
//!   B: paid   0, share 100 → -100
//!   C: paid   0, share 100 → -100
//! ```

use crate::{
    types::{Balances, Expense, MemberId, MemberPosition},
    validation::ExpenseValidator,
    Result,
};
use std::collections::HashMap;

/// Compute each member's net balance
///
/// Every member appears in the result, at zero if untouched by any expense.
/// Shares use exact decimal division; nothing is rounded here.
pub fn compute_balances(members: &[MemberId], expenses: &[Expense]) -> Result<Balances> {
    let positions = compute_positions(members, expenses)?;
    Ok(positions
        .into_iter()
        .map(|p| (p.member, p.net_position))
        .collect())
}

/// Compute per-member positions in roster order
pub fn compute_positions(
    members: &[MemberId],
    expenses: &[Expense],
) -> Result<Vec<MemberPosition>> {
    let validator = ExpenseValidator::new(members)?;
    validator.validate_all(expenses)?;

    let positions = accumulate_positions(members, expenses);

    tracing::debug!(
        members = members.len(),
        expenses = expenses.len(),
        "Computed member positions"
    );

    Ok(positions)
}

/// Book every expense onto a fresh set of positions
///
/// Inputs must already be validated.
fn accumulate_positions(members: &[MemberId], expenses: &[Expense]) -> Vec<MemberPosition> {
    let mut positions: Vec<MemberPosition> =
        members.iter().cloned().map(MemberPosition::new).collect();
    let index: HashMap<&str, usize> = members
        .iter()
        .enumerate()
        .map(|(i, m)| (m.as_str(), i))
        .collect();

    for expense in expenses {
        let Some(share) = expense.share() else {
            continue;
        };

        if let Some(&payer) = index.get(expense.paid_by.as_str()) {
            positions[payer].add_payment(expense.amount);
        }

        for participant in &expense.split_among {
            if let Some(&i) = index.get(participant.as_str()) {
                positions[i].add_share(share);
            }
        }
    }

    positions
}
