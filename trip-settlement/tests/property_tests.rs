//! Property-based tests for settlement invariants
//!
//! These tests use proptest to verify:
//! - Zero sum: balances always net to zero
//! - Settlement correctness: applying the transfers clears every balance
//! - No self-transfers
//! - Purity: same inputs → same outputs

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use trip_settlement::{
    compute_balances, compute_settlements, Balances, Expense, ExpenseId, MemberId, Transfer,
};

const MAX_MEMBERS: usize = 10;

/// Raw expense: (payer index, amount, participant mask)
fn raw_expense_strategy() -> impl Strategy<Value = (usize, u32, u16)> {
    (0..MAX_MEMBERS, 1u32..200_000u32, 1u16..(1 << MAX_MEMBERS))
}

/// Strategy for a roster plus expenses drawn from it
fn ledger_strategy() -> impl Strategy<Value = (Vec<MemberId>, Vec<Expense>)> {
    (
        2..=MAX_MEMBERS,
        prop::collection::vec(raw_expense_strategy(), 0..40),
    )
        .prop_map(|(member_count, raw)| {
            let members: Vec<MemberId> = (0..member_count)
                .map(|i| MemberId::new(format!("member-{i}")))
                .collect();

            let expenses = raw
                .into_iter()
                .enumerate()
                .map(|(n, (payer, amount, mask))| {
                    let mut split_among: Vec<MemberId> = members
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| mask & (1 << i) != 0)
                        .map(|(_, m)| m.clone())
                        .collect();
                    if split_among.is_empty() {
                        split_among.push(members[n % member_count].clone());
                    }

                    Expense {
                        id: ExpenseId::new(format!("e{n}")),
                        paid_by: members[payer % member_count].clone(),
                        description: String::new(),
                        amount: Decimal::from(amount),
                        split_among,
                        date: Utc.timestamp_opt(1_768_000_000, 0).unwrap(),
                    }
                })
                .collect();

            (members, expenses)
        })
}

fn apply_transfers(balances: &Balances, transfers: &[Transfer]) -> Balances {
    let mut adjusted = balances.clone();
    for transfer in transfers {
        *adjusted.get_mut(&transfer.from).unwrap() += transfer.amount;
        *adjusted.get_mut(&transfer.to).unwrap() -= transfer.amount;
    }
    adjusted
}

proptest! {
    /// Property: Σ(balances) == 0 up to decimal division noise
    #[test]
    fn balances_sum_to_zero((members, expenses) in ledger_strategy()) {
        let balances = compute_balances(&members, &expenses).unwrap();

        let total: Decimal = balances.values().copied().sum();
        prop_assert!(total.abs() < Decimal::new(1, 12), "total = {}", total);
        prop_assert_eq!(balances.len(), members.len());
    }

    /// Property: after applying every transfer, no member is left off by more
    /// than the accumulated tolerance (ε plus half a unit of display rounding,
    /// per member)
    #[test]
    fn transfers_settle_every_member((members, expenses) in ledger_strategy()) {
        let balances = compute_balances(&members, &expenses).unwrap();
        let transfers = compute_settlements(&members, &expenses).unwrap();

        let bound = (Decimal::ONE + Decimal::new(5, 1)) * Decimal::from(members.len());
        for (member, remaining) in apply_transfers(&balances, &transfers) {
            prop_assert!(
                remaining.abs() <= bound,
                "{} left at {} (bound {})", member, remaining, bound
            );
        }
    }

    /// Property: nobody pays themself and every amount is a positive whole number
    #[test]
    fn transfers_are_well_formed((members, expenses) in ledger_strategy()) {
        let transfers = compute_settlements(&members, &expenses).unwrap();

        for transfer in &transfers {
            prop_assert_ne!(&transfer.from, &transfer.to);
            prop_assert!(transfer.amount > Decimal::ZERO);
            prop_assert!(transfer.amount.fract().is_zero());
        }
        prop_assert!(transfers.len() < members.len());
    }

    /// Property: pure functions return identical results for identical input
    #[test]
    fn computation_is_deterministic((members, expenses) in ledger_strategy()) {
        prop_assert_eq!(
            compute_balances(&members, &expenses).unwrap(),
            compute_balances(&members, &expenses).unwrap()
        );
        prop_assert_eq!(
            compute_settlements(&members, &expenses).unwrap(),
            compute_settlements(&members, &expenses).unwrap()
        );
    }

    /// Property: balances do not depend on expense order
    #[test]
    fn balances_ignore_expense_order((members, expenses) in ledger_strategy()) {
        let forward = compute_balances(&members, &expenses).unwrap();

        let mut reversed = expenses.clone();
        reversed.reverse();
        let backward = compute_balances(&members, &reversed).unwrap();

        for member in &members {
            let diff = (forward[member] - backward[member]).abs();
            prop_assert!(diff < Decimal::new(1, 12));
        }
    }
}
