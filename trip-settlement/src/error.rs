//! Error types for the settlement engine

use crate::types::{ExpenseId, MemberId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Expense amount is zero or negative
    #[error("Expense {expense_id}: amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// Offending expense
        expense_id: ExpenseId,
        /// Rejected amount
        amount: Decimal,
    },

    /// Expense amount has a fractional part
    #[error("Expense {expense_id}: amount must be whole currency units, got {amount}")]
    FractionalAmount {
        /// Offending expense
        expense_id: ExpenseId,
        /// Rejected amount
        amount: Decimal,
    },

    /// Expense amount is above the supported maximum
    #[error("Expense {expense_id}: amount {amount} exceeds the maximum of {max}")]
    AmountTooLarge {
        /// Offending expense
        expense_id: ExpenseId,
        /// Rejected amount
        amount: Decimal,
        /// Largest accepted amount
        max: Decimal,
    },

    /// Nobody shares the expense
    #[error("Expense {expense_id}: split group is empty")]
    EmptySplit {
        /// Offending expense
        expense_id: ExpenseId,
    },

    /// A member is listed twice in one split group
    #[error("Expense {expense_id}: {member} appears more than once in the split group")]
    DuplicateParticipant {
        /// Offending expense
        expense_id: ExpenseId,
        /// Repeated member
        member: MemberId,
    },

    /// Expense references a member missing from the roster
    #[error("Expense {expense_id}: unknown member {member}")]
    UnknownMember {
        /// Offending expense
        expense_id: ExpenseId,
        /// Unregistered member
        member: MemberId,
    },

    /// Roster lists a member twice
    #[error("Duplicate member: {0}")]
    DuplicateMember(MemberId),

    /// Roster contains a blank name
    #[error("Member names must not be empty")]
    EmptyMemberName,

    /// Expense names a blank payer or participant
    #[error("Expense {expense_id}: member names must not be empty")]
    BlankParticipant {
        /// Offending expense
        expense_id: ExpenseId,
    },

    /// Expense ID already present in the ledger
    #[error("Duplicate expense: {0}")]
    DuplicateExpense(ExpenseId),

    /// Expense ID not present in the ledger
    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    /// Malformed cost table entry
    #[error("Invalid cost: {0}")]
    InvalidCost(String),

    /// Bookkeeping bug: balances did not net out
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller submitted bad input (as opposed to an internal fault)
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::NonPositiveAmount { .. }
                | Error::FractionalAmount { .. }
                | Error::AmountTooLarge { .. }
                | Error::EmptySplit { .. }
                | Error::DuplicateParticipant { .. }
                | Error::UnknownMember { .. }
                | Error::DuplicateMember(_)
                | Error::EmptyMemberName
                | Error::BlankParticipant { .. }
                | Error::DuplicateExpense(_)
                | Error::ExpenseNotFound(_)
                | Error::InvalidCost(_)
        )
    }
}
