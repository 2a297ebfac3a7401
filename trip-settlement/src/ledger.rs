//! Expense ledger
//!
//! In-memory view of the expense section of the shared trip document: the
//! member roster plus the expense list. Expenses are appended or deleted,
//! never edited in place. The ledger holds no derived state; balances and
//! transfers are recomputed from it by the engine.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use trip_settlement::{ExpenseLedger, MemberPolicy, NewExpense};
//!
//! let mut ledger = ExpenseLedger::new(
//!     vec!["A".into(), "B".into()],
//!     MemberPolicy::Reject,
//! )?;
//! let id = ledger.add_expense(
//!     NewExpense::new("A", Decimal::from(100), vec!["A".into(), "B".into()])
//!         .with_description("gas"),
//! )?;
//! ledger.remove_expense(&id)?;
//! assert!(ledger.is_empty());
//! # Ok::<(), trip_settlement::Error>(())
//! ```

use crate::{
    cost::CostBreakdown,
    types::{Expense, ExpenseId, MemberId},
    validation::{check_shape, ExpenseValidator},
    Error, Result,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What to do with an expense that names someone off the roster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberPolicy {
    /// Fail with [`Error::UnknownMember`]
    #[default]
    Reject,
    /// Append the name to the roster
    AutoRegister,
}

impl FromStr for MemberPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(MemberPolicy::Reject),
            "auto_register" | "auto-register" => Ok(MemberPolicy::AutoRegister),
            other => Err(Error::Config(format!("Unknown member policy: {other}"))),
        }
    }
}

/// Expense as submitted by a participant, before an ID is assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// Member who paid
    pub paid_by: MemberId,
    /// Free text label
    pub description: String,
    /// Amount in whole currency units
    pub amount: Decimal,
    /// Members sharing the cost
    pub split_among: Vec<MemberId>,
    /// Explicit ID, generated when absent
    pub id: Option<ExpenseId>,
    /// Explicit timestamp, `Utc::now()` when absent
    pub date: Option<DateTime<Utc>>,
}

impl NewExpense {
    /// Create a new expense submission
    pub fn new(paid_by: impl Into<MemberId>, amount: Decimal, split_among: Vec<MemberId>) -> Self {
        Self {
            paid_by: paid_by.into(),
            description: String::new(),
            amount,
            split_among,
            id: None,
            date: None,
        }
    }

    /// Set the label
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Use a caller-chosen ID
    pub fn with_id(mut self, id: ExpenseId) -> Self {
        self.id = Some(id);
        self
    }

    /// Use a caller-chosen timestamp
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    fn into_expense(self) -> Expense {
        Expense {
            id: self.id.unwrap_or_else(ExpenseId::generate),
            paid_by: self.paid_by,
            description: self.description,
            amount: self.amount,
            split_among: self.split_among,
            date: self.date.unwrap_or_else(Utc::now),
        }
    }
}

/// Expense-related fields of the shared trip document
///
/// Other document fields (flights, schedule, weather...) are ignored on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDocument {
    /// Member roster
    #[serde(default)]
    pub members: Vec<MemberId>,

    /// Expense list
    #[serde(default)]
    pub expenses: Vec<Expense>,

    /// Planned-cost table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<CostBreakdown>,
}

impl TripDocument {
    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Build a validated ledger from the document's roster and expenses
    pub fn to_ledger(&self, policy: MemberPolicy) -> Result<ExpenseLedger> {
        let mut ledger = ExpenseLedger::new(self.members.clone(), policy)?;
        for expense in &self.expenses {
            ledger.insert_expense(expense.clone())?;
        }
        Ok(ledger)
    }
}

/// Member roster plus expense list
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseLedger {
    members: Vec<MemberId>,
    expenses: Vec<Expense>,
    policy: MemberPolicy,
}

impl ExpenseLedger {
    /// Create an empty ledger for `members`
    pub fn new(members: Vec<MemberId>, policy: MemberPolicy) -> Result<Self> {
        ExpenseValidator::new(&members)?;
        Ok(Self {
            members,
            expenses: Vec::new(),
            policy,
        })
    }

    /// Parse a trip document and build its ledger
    pub fn from_json(json: &str, policy: MemberPolicy) -> Result<Self> {
        TripDocument::from_json(json)?.to_ledger(policy)
    }

    /// Serialize roster and expenses in the document's field layout
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Roster and expenses as a document value
    pub fn to_document(&self) -> TripDocument {
        TripDocument {
            members: self.members.clone(),
            expenses: self.expenses.clone(),
            costs: None,
        }
    }

    /// Append a submitted expense, returning its ID
    pub fn add_expense(&mut self, expense: NewExpense) -> Result<ExpenseId> {
        let expense = expense.into_expense();
        let id = expense.id.clone();
        self.insert_expense(expense)?;
        Ok(id)
    }

    /// Append a fully formed expense
    pub fn insert_expense(&mut self, expense: Expense) -> Result<()> {
        check_shape(&expense)?;

        if self.get(&expense.id).is_some() {
            return Err(Error::DuplicateExpense(expense.id));
        }

        let unknown = self.unknown_members(&expense);
        if !unknown.is_empty() {
            match self.policy {
                MemberPolicy::Reject => {
                    return Err(Error::UnknownMember {
                        expense_id: expense.id.clone(),
                        member: unknown[0].clone(),
                    });
                }
                MemberPolicy::AutoRegister => {
                    for member in unknown {
                        tracing::warn!(%member, expense_id = %expense.id, "Registering unknown member");
                        self.members.push(member);
                    }
                }
            }
        }

        tracing::info!(
            expense_id = %expense.id,
            paid_by = %expense.paid_by,
            amount = %expense.amount,
            participants = expense.split_among.len(),
            "Expense added"
        );

        self.expenses.push(expense);
        Ok(())
    }

    /// Delete an expense by ID
    pub fn remove_expense(&mut self, id: &ExpenseId) -> Result<Expense> {
        let index = self
            .expenses
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| Error::ExpenseNotFound(id.clone()))?;

        let removed = self.expenses.remove(index);
        tracing::info!(expense_id = %removed.id, "Expense removed");
        Ok(removed)
    }

    /// Look up an expense
    pub fn get(&self, id: &ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|e| &e.id == id)
    }

    /// Member roster in registration order
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    /// Expenses in insertion order
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Policy for unknown members
    pub fn policy(&self) -> MemberPolicy {
        self.policy
    }

    /// Number of expenses
    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    /// No expenses recorded
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Sum of all expense amounts
    pub fn total_spent(&self) -> Decimal {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// Referenced names missing from the roster, deduplicated, payer first
    fn unknown_members(&self, expense: &Expense) -> Vec<MemberId> {
        let mut unknown: Vec<MemberId> = Vec::new();
        for member in expense.referenced_members() {
            if !self.members.contains(member) && !unknown.contains(member) {
                unknown.push(member.clone());
            }
        }
        unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(names: &[&str]) -> Vec<MemberId> {
        names.iter().copied().map(MemberId::from).collect()
    }

    #[test]
    fn test_add_and_remove() {
        let mut ledger = ExpenseLedger::new(roster(&["A", "B", "C"]), MemberPolicy::Reject).unwrap();

        let first = ledger
            .add_expense(NewExpense::new("A", Decimal::from(300), roster(&["A", "B", "C"])))
            .unwrap();
        let second = ledger
            .add_expense(NewExpense::new("B", Decimal::from(60), roster(&["A", "B"])))
            .unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total_spent(), Decimal::from(360));
        assert_ne!(first, second);

        let removed = ledger.remove_expense(&first).unwrap();
        assert_eq!(removed.amount, Decimal::from(300));
        assert_eq!(ledger.expenses()[0].id, second);
        assert!(ledger.get(&first).is_none());
    }

    #[test]
    fn test_remove_missing_expense() {
        let mut ledger = ExpenseLedger::new(roster(&["A"]), MemberPolicy::Reject).unwrap();

        assert!(matches!(
            ledger.remove_expense(&ExpenseId::new("nope")),
            Err(Error::ExpenseNotFound(_))
        ));
    }

    #[test]
    fn test_reject_policy() {
        let mut ledger = ExpenseLedger::new(roster(&["A", "B"]), MemberPolicy::Reject).unwrap();

        let result =
            ledger.add_expense(NewExpense::new("A", Decimal::from(100), roster(&["A", "Z"])));

        assert!(matches!(
            result,
            Err(Error::UnknownMember { member, .. }) if member.as_str() == "Z"
        ));
        assert!(ledger.is_empty());
        assert_eq!(ledger.members().len(), 2);
    }

    #[test]
    fn test_auto_register_policy() {
        let mut ledger =
            ExpenseLedger::new(roster(&["A", "B"]), MemberPolicy::AutoRegister).unwrap();

        ledger
            .add_expense(NewExpense::new("Y", Decimal::from(100), roster(&["A", "Z", "Y"])))
            .unwrap();

        assert_eq!(ledger.members(), roster(&["A", "B", "Y", "Z"]).as_slice());
    }

    #[test]
    fn test_invalid_shape_rejected_before_registration() {
        let mut ledger =
            ExpenseLedger::new(roster(&["A"]), MemberPolicy::AutoRegister).unwrap();

        let result = ledger.add_expense(NewExpense::new("Z", Decimal::from(100), vec![]));

        assert!(matches!(result, Err(Error::EmptySplit { .. })));
        assert_eq!(ledger.members().len(), 1);
    }

    #[test]
    fn test_blank_names_never_registered() {
        let mut ledger =
            ExpenseLedger::new(roster(&["A", "B"]), MemberPolicy::AutoRegister).unwrap();

        let blank_payer = ledger.add_expense(NewExpense::new("", Decimal::from(100), roster(&["A"])));
        let blank_participant =
            ledger.add_expense(NewExpense::new("A", Decimal::from(100), roster(&["B", "  "])));

        assert!(matches!(blank_payer, Err(Error::BlankParticipant { .. })));
        assert!(matches!(blank_participant, Err(Error::BlankParticipant { .. })));
        assert_eq!(ledger.members(), roster(&["A", "B"]).as_slice());
        assert!(ledger.is_empty());

        ledger
            .add_expense(NewExpense::new("A", Decimal::from(100), roster(&["A", "B"])))
            .unwrap();
        assert!(crate::SettlementEngine::default().settle(&ledger).is_ok());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut ledger = ExpenseLedger::new(roster(&["A", "B"]), MemberPolicy::Reject).unwrap();
        let submission = NewExpense::new("A", Decimal::from(10), roster(&["B"]))
            .with_id(ExpenseId::new("e1"));

        ledger.add_expense(submission.clone()).unwrap();

        assert!(matches!(
            ledger.add_expense(submission),
            Err(Error::DuplicateExpense(_))
        ));
    }

    #[test]
    fn test_document_round_trip_ignores_other_fields() {
        let json = r#"{
            "title": "Hokkaido 2026",
            "members": ["A", "B", "C"],
            "expenses": [
                {
                    "id": "e1",
                    "paidBy": "A",
                    "description": "rental car",
                    "amount": 31000,
                    "splitAmong": ["A", "B", "C"],
                    "date": "2026-01-11T09:30:00Z"
                }
            ],
            "updatedAt": "2026-01-10T00:00:00Z"
        }"#;

        let ledger = ExpenseLedger::from_json(json, MemberPolicy::Reject).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.expenses()[0].description, "rental car");

        let reloaded = ExpenseLedger::from_json(&ledger.to_json().unwrap(), MemberPolicy::Reject)
            .unwrap();
        assert_eq!(reloaded, ledger);
    }

    #[test]
    fn test_document_with_invalid_expense_fails_to_load() {
        let json = r#"{
            "members": ["A", "B"],
            "expenses": [
                {"id": "e1", "paidBy": "A", "amount": 100, "splitAmong": [], "date": "2026-01-11T09:30:00Z"}
            ]
        }"#;

        assert!(matches!(
            ExpenseLedger::from_json(json, MemberPolicy::Reject),
            Err(Error::EmptySplit { .. })
        ));
    }

    #[test]
    fn test_member_policy_from_str() {
        assert_eq!("reject".parse::<MemberPolicy>().unwrap(), MemberPolicy::Reject);
        assert_eq!(
            "Auto-Register".parse::<MemberPolicy>().unwrap(),
            MemberPolicy::AutoRegister
        );
        assert!("sometimes".parse::<MemberPolicy>().is_err());
    }
}
