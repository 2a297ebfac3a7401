//! Configuration for the settlement engine

use crate::{ledger::MemberPolicy, netting::DEFAULT_TOLERANCE, Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Settlement engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Balances within this many currency units of zero count as settled
    pub tolerance: Decimal,

    /// Handling of expenses that name someone off the roster
    pub member_policy: MemberPolicy,

    /// Cost table configuration
    pub cost: CostConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "trip-settlement".to_string(),
            tolerance: DEFAULT_TOLERANCE,
            member_policy: MemberPolicy::default(),
            cost: CostConfig::default(),
        }
    }
}

/// Cost table configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Per-person figures are rounded up to a multiple of this
    pub per_person_step: Decimal,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            per_person_step: Decimal::from(1000),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(tolerance) = std::env::var("TRIP_SETTLEMENT_TOLERANCE") {
            config.tolerance = parse_decimal("TRIP_SETTLEMENT_TOLERANCE", &tolerance)?;
        }

        if let Ok(policy) = std::env::var("TRIP_SETTLEMENT_MEMBER_POLICY") {
            config.member_policy = policy.parse()?;
        }

        if let Ok(step) = std::env::var("TRIP_SETTLEMENT_COST_STEP") {
            config.cost.per_person_step = parse_decimal("TRIP_SETTLEMENT_COST_STEP", &step)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.tolerance < Decimal::ZERO {
            return Err(Error::Config(format!(
                "tolerance must not be negative, got {}",
                self.tolerance
            )));
        }
        if self.cost.per_person_step <= Decimal::ZERO {
            return Err(Error::Config(format!(
                "cost.per_person_step must be positive, got {}",
                self.cost.per_person_step
            )));
        }
        Ok(())
    }
}

fn parse_decimal(name: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|e| Error::Config(format!("{name}={value:?} is not a number: {e}")))
}
