//! Trip Settlement
//!
//! Expense ledger and settle-up computation for a shared trip board.
//!
//! # Architecture
//!
//! The board keeps one shared document; whenever its expense list changes,
//! the caller hands the roster and expenses to this crate and renders the
//! result:
//!
//! 1. **Validation**: reject empty split groups, non-positive amounts and
//!    unknown members before any arithmetic
//! 2. **Balances**: rederive every member's net position from scratch
//! 3. **Netting**: greedily match the largest debtor with the largest creditor
//!
//! Nothing is cached between calls.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use rust_decimal::Decimal;
//! use trip_settlement::{compute_balances, compute_settlements, Expense, ExpenseId, MemberId};
//!
//! let members: Vec<MemberId> = vec!["A".into(), "B".into(), "C".into()];
//! let expenses = vec![Expense {
//!     id: ExpenseId::new("e1"),
//!     paid_by: "A".into(),
//!     description: "lodging".to_string(),
//!     amount: Decimal::from(300),
//!     split_among: members.clone(),
//!     date: Utc::now(),
//! }];
//!
//! let balances = compute_balances(&members, &expenses)?;
//! assert_eq!(balances["A"], Decimal::from(200));
//!
//! let transfers = compute_settlements(&members, &expenses)?;
//! assert_eq!(transfers.len(), 2);
//! # Ok::<(), trip_settlement::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod balance;
pub mod config;
pub mod cost;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod netting;
pub mod types;
pub mod validation;

// Re-exports
pub use balance::compute_balances;
pub use config::Config;
pub use cost::{per_person_share, CostAmount, CostBreakdown, CostItem, CostRange, CostSummary};
pub use engine::SettlementEngine;
pub use error::{Error, Result};
pub use ledger::{ExpenseLedger, MemberPolicy, NewExpense, TripDocument};
pub use netting::{compute_settlements, NettingEngine};
pub use types::*;
