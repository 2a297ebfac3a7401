//! Input validation for rosters and expenses
//!
//! Everything here runs before any arithmetic so that the balance pass never
//! divides by an empty split group or books money against a stranger.

use crate::{
    types::{Expense, MemberId},
    Error, Result,
};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Largest accepted expense or cost amount, in whole currency units
///
/// Keeps every running total far inside `Decimal` range.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Validates expenses against a fixed roster
#[derive(Debug)]
pub struct ExpenseValidator<'a> {
    roster: HashSet<&'a str>,
}

impl<'a> ExpenseValidator<'a> {
    /// Create a validator for `members`, rejecting blank or repeated names
    pub fn new(members: &'a [MemberId]) -> Result<Self> {
        let mut roster = HashSet::with_capacity(members.len());
        for member in members {
            if is_blank(member) {
                return Err(Error::EmptyMemberName);
            }
            if !roster.insert(member.as_str()) {
                return Err(Error::DuplicateMember(member.clone()));
            }
        }
        Ok(Self { roster })
    }

    /// Whether `member` is on the roster
    pub fn is_registered(&self, member: &MemberId) -> bool {
        self.roster.contains(member.as_str())
    }

    /// Check shape and membership of one expense
    pub fn validate(&self, expense: &Expense) -> Result<()> {
        check_shape(expense)?;

        if let Some(unknown) = expense.referenced_members().find(|m| !self.is_registered(m)) {
            return Err(Error::UnknownMember {
                expense_id: expense.id.clone(),
                member: unknown.clone(),
            });
        }

        Ok(())
    }

    /// Check every expense, stopping at the first failure
    pub fn validate_all(&self, expenses: &[Expense]) -> Result<()> {
        expenses.iter().try_for_each(|expense| self.validate(expense))
    }
}

/// Roster-independent checks: amount and split group
pub fn check_shape(expense: &Expense) -> Result<()> {
    // Amount must be positive
    if expense.amount <= Decimal::ZERO {
        return Err(Error::NonPositiveAmount {
            expense_id: expense.id.clone(),
            amount: expense.amount,
        });
    }

    if expense.amount > Decimal::from(MAX_AMOUNT) {
        return Err(Error::AmountTooLarge {
            expense_id: expense.id.clone(),
            amount: expense.amount,
            max: Decimal::from(MAX_AMOUNT),
        });
    }

    // Whole currency units only
    if !expense.amount.fract().is_zero() {
        return Err(Error::FractionalAmount {
            expense_id: expense.id.clone(),
            amount: expense.amount,
        });
    }

    if expense.referenced_members().any(is_blank) {
        return Err(Error::BlankParticipant {
            expense_id: expense.id.clone(),
        });
    }

    if expense.split_among.is_empty() {
        return Err(Error::EmptySplit {
            expense_id: expense.id.clone(),
        });
    }

    let mut seen = HashSet::with_capacity(expense.split_among.len());
    for member in &expense.split_among {
        if !seen.insert(member.as_str()) {
            return Err(Error::DuplicateParticipant {
                expense_id: expense.id.clone(),
                member: member.clone(),
            });
        }
    }

    Ok(())
}

fn is_blank(member: &MemberId) -> bool {
    member.as_str().trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExpenseId;
    use chrono::Utc;
    use rstest::rstest;

    fn members(names: &[&str]) -> Vec<MemberId> {
        names.iter().copied().map(MemberId::from).collect()
    }

    fn expense(paid_by: &str, amount: i64, split: &[&str]) -> Expense {
        Expense {
            id: ExpenseId::new("e1"),
            paid_by: paid_by.into(),
            description: String::new(),
            amount: Decimal::from(amount),
            split_among: members(split),
            date: Utc::now(),
        }
    }

    #[test]
    fn test_valid_expense() {
        let roster = members(&["A", "B", "C"]);
        let validator = ExpenseValidator::new(&roster).unwrap();

        assert!(validator.validate(&expense("A", 300, &["A", "B", "C"])).is_ok());
        assert!(validator.validate(&expense("A", 300, &["B"])).is_ok());
    }

    #[rstest]
    #[case::zero_amount(expense("A", 0, &["A", "B"]), "NonPositiveAmount")]
    #[case::negative_amount(expense("A", -10, &["A", "B"]), "NonPositiveAmount")]
    #[case::empty_split(expense("A", 100, &[]), "EmptySplit")]
    #[case::too_large(expense("A", MAX_AMOUNT + 1, &["A", "B"]), "AmountTooLarge")]
    #[case::blank_payer(expense("", 100, &["A"]), "BlankParticipant")]
    #[case::blank_participant(expense("A", 100, &["A", " "]), "BlankParticipant")]
    #[case::repeated_participant(expense("A", 100, &["B", "B"]), "DuplicateParticipant")]
    #[case::unknown_payer(expense("Z", 100, &["A"]), "UnknownMember")]
    #[case::unknown_participant(expense("A", 100, &["A", "Z"]), "UnknownMember")]
    fn test_rejected_expenses(#[case] expense: Expense, #[case] expected: &str) {
        let roster = members(&["A", "B", "C"]);
        let validator = ExpenseValidator::new(&roster).unwrap();

        let err = validator.validate(&expense).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(
            format!("{err:?}").starts_with(expected),
            "expected {expected}, got {err:?}"
        );
    }

    #[test]
    fn test_fractional_amount_rejected() {
        let mut e = expense("A", 100, &["A", "B"]);
        e.amount = Decimal::new(10050, 2);

        assert!(matches!(check_shape(&e), Err(Error::FractionalAmount { .. })));
    }

    #[test]
    fn test_roster_checks() {
        assert!(matches!(
            ExpenseValidator::new(&members(&["A", "B", "A"])),
            Err(Error::DuplicateMember(m)) if m.as_str() == "A"
        ));
        assert!(matches!(
            ExpenseValidator::new(&members(&["A", " "])),
            Err(Error::EmptyMemberName)
        ));
        assert!(ExpenseValidator::new(&[]).is_ok());
    }
}
