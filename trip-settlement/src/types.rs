//! Core types for the trip expense ledger

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use uuid::Uuid;

/// Trip member identifier (the member's display name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Create new member ID
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for MemberId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MemberId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for MemberId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Expense identifier, stable for the lifetime of the expense
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExpenseId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One recorded payment: who fronted the money and who shares it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Expense ID
    pub id: ExpenseId,

    /// Member who paid
    pub paid_by: MemberId,

    /// Free text label
    #[serde(default)]
    pub description: String,

    /// Amount in whole currency units
    pub amount: Decimal,

    /// Members sharing the cost (may include the payer)
    pub split_among: Vec<MemberId>,

    /// Creation timestamp, informational only
    pub date: DateTime<Utc>,
}

impl Expense {
    /// Share carried by each participant, before any rounding
    ///
    /// Returns `None` for an empty split group.
    pub fn share(&self) -> Option<Decimal> {
        if self.split_among.is_empty() {
            return None;
        }
        Some(self.amount / Decimal::from(self.split_among.len()))
    }

    /// Every member this expense references, payer first
    pub fn referenced_members(&self) -> impl Iterator<Item = &MemberId> {
        std::iter::once(&self.paid_by).chain(self.split_among.iter())
    }
}

/// Net amount per member: positive is owed money, negative owes money
pub type Balances = HashMap<MemberId, Decimal>;

/// One transfer of the settlement plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Member who pays
    pub from: MemberId,

    /// Member who receives
    pub to: MemberId,

    /// Whole currency units to transfer
    pub amount: Decimal,
}

/// Running position of one member across the expense list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPosition {
    /// Member ID
    pub member: MemberId,

    /// Total fronted by this member
    pub total_paid: Decimal,

    /// Total of this member's shares
    pub total_share: Decimal,

    /// Net position (positive = creditor, negative = debtor)
    pub net_position: Decimal,
}

impl MemberPosition {
    /// Create new position at zero
    pub fn new(member: MemberId) -> Self {
        Self {
            member,
            total_paid: Decimal::ZERO,
            total_share: Decimal::ZERO,
            net_position: Decimal::ZERO,
        }
    }

    /// Record money this member fronted
    pub fn add_payment(&mut self, amount: Decimal) {
        self.total_paid += amount;
        self.net_position = self.total_paid - self.total_share;
    }

    /// Record this member's share of an expense
    pub fn add_share(&mut self, share: Decimal) {
        self.total_share += share;
        self.net_position = self.total_paid - self.total_share;
    }

    /// Owes more than `tolerance`
    pub fn is_debtor(&self, tolerance: Decimal) -> bool {
        self.net_position < -tolerance
    }

    /// Is owed more than `tolerance`
    pub fn is_creditor(&self, tolerance: Decimal) -> bool {
        self.net_position > tolerance
    }

    /// Get absolute net position
    pub fn abs_net_position(&self) -> Decimal {
        self.net_position.abs()
    }
}

/// Summary figures for one settlement run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementStats {
    /// Number of members on the roster
    pub member_count: usize,

    /// Number of expenses considered
    pub expense_count: usize,

    /// Number of transfers in the plan
    pub transfer_count: usize,

    /// Sum of all expense amounts
    pub total_spent: Decimal,

    /// Sum of all (rounded) transfer amounts
    pub transfer_total: Decimal,
}

/// Balances, transfers and statistics computed from one ledger snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    /// Per-member positions in roster order
    pub positions: Vec<MemberPosition>,

    /// Transfer plan in generation order
    pub transfers: Vec<Transfer>,

    /// Summary figures
    pub stats: SettlementStats,
}

impl SettlementReport {
    /// Net balances keyed by member
    pub fn balances(&self) -> Balances {
        self.positions
            .iter()
            .map(|p| (p.member.clone(), p.net_position))
            .collect()
    }

    /// Transfers paid by `member`
    pub fn transfers_from<'a>(&'a self, member: &'a str) -> impl Iterator<Item = &'a Transfer> {
        self.transfers.iter().filter(move |t| t.from.as_str() == member)
    }
}
