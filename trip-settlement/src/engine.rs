//! Main settlement engine
//!
//! Ties validation, balance computation and netting together behind one
//! configured value. The engine holds configuration only, so one instance can
//! be shared freely and re-run on every document change.

use crate::{
    balance::compute_positions,
    config::Config,
    cost::{CostBreakdown, CostSummary},
    ledger::ExpenseLedger,
    netting::NettingEngine,
    types::*,
    Result,
};
use rust_decimal::Decimal;

/// Settlement engine
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    /// Netting engine
    netting: NettingEngine,

    /// Configuration
    config: Config,
}

impl Default for SettlementEngine {
    fn default() -> Self {
        let config = Config::default();
        Self {
            netting: NettingEngine::new(config.tolerance),
            config,
        }
    }
}

impl SettlementEngine {
    /// Create new settlement engine
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            netting: NettingEngine::new(config.tolerance),
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create an empty ledger using the configured member policy
    pub fn new_ledger(&self, members: Vec<MemberId>) -> Result<ExpenseLedger> {
        ExpenseLedger::new(members, self.config.member_policy)
    }

    /// Net balance per member
    pub fn compute_balances(&self, members: &[MemberId], expenses: &[Expense]) -> Result<Balances> {
        crate::balance::compute_balances(members, expenses)
    }

    /// Transfer plan that settles every balance
    pub fn compute_settlements(
        &self,
        members: &[MemberId],
        expenses: &[Expense],
    ) -> Result<Vec<Transfer>> {
        self.netting.compute_settlements(members, expenses)
    }

    /// Settle a ledger snapshot
    pub fn settle(&self, ledger: &ExpenseLedger) -> Result<SettlementReport> {
        let _span = tracing::info_span!(
            "settle",
            members = ledger.members().len(),
            expenses = ledger.len()
        )
        .entered();

        let positions = compute_positions(ledger.members(), ledger.expenses())?;
        let transfers = self.netting.generate_transfers(&positions)?;

        let stats = SettlementStats {
            member_count: positions.len(),
            expense_count: ledger.len(),
            transfer_count: transfers.len(),
            total_spent: ledger.total_spent(),
            transfer_total: transfers.iter().map(|t| t.amount).sum::<Decimal>(),
        };

        tracing::info!(
            "Settlement complete: {} expenses totalling {} → {} transfers",
            stats.expense_count,
            stats.total_spent,
            stats.transfer_count
        );

        Ok(SettlementReport {
            positions,
            transfers,
            stats,
        })
    }

    /// Summarize a cost table, defaulting the headcount to `members`
    pub fn summarize_costs(&self, costs: &CostBreakdown, members: usize) -> Result<CostSummary> {
        costs.summarize(members, self.config.cost.per_person_step)
    }
}
