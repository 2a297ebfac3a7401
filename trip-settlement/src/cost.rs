//! Planned-cost table
//!
//! The trip document carries a budget table next to the expense ledger:
//! shared costs split across the group and individual costs everyone pays
//! for themself. Some lines are only estimates and carry a range such as
//! `"10,000〜15,000"`.
//!
//! The per-person figure here is display-only and is rounded *up* so the
//! group never under-collects. It is unrelated to the exact arithmetic the
//! settlement engine uses.

use crate::{validation::MAX_AMOUNT, Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Separators accepted between the bounds of a range
const RANGE_SEPARATORS: [char; 4] = ['〜', '～', '~', '-'];

/// Inclusive amount range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRange {
    /// Lower bound
    pub min: Decimal,
    /// Upper bound
    pub max: Decimal,
}

impl CostRange {
    /// Zero-width range
    pub fn fixed(amount: Decimal) -> Self {
        Self {
            min: amount,
            max: amount,
        }
    }

    /// Empty total
    pub fn zero() -> Self {
        Self::fixed(Decimal::ZERO)
    }

    /// Whether both bounds coincide
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Divide both bounds by `people`, rounding up to a multiple of `step`
    pub fn per_person(&self, people: u32, step: Decimal) -> Result<Self> {
        if people == 0 {
            return Err(Error::InvalidCost("Cannot split costs among zero people".to_string()));
        }
        if step <= Decimal::ZERO {
            return Err(Error::InvalidCost(format!("Rounding step must be positive, got {step}")));
        }

        let people = Decimal::from(people);
        Ok(Self {
            min: round_up_to(self.min / people, step),
            max: round_up_to(self.max / people, step),
        })
    }
}

impl Add for CostRange {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            min: self.min + rhs.min,
            max: self.max + rhs.max,
        }
    }
}

impl std::iter::Sum for CostRange {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl std::fmt::Display for CostRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_fixed() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}〜{}", self.min, self.max)
        }
    }
}

/// Amount of one cost line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAmount", into = "RawAmount")]
pub enum CostAmount {
    /// Known amount
    Fixed(Decimal),
    /// Estimate between two bounds
    Range(CostRange),
}

impl CostAmount {
    /// Parse `"31000"`, `"31,000"` or `"10,000〜15,000"`
    pub fn parse(text: &str) -> Result<Self> {
        let cleaned: String = text
            .chars()
            .filter(|c| !matches!(c, ',' | '¥' | '￥') && !c.is_whitespace())
            .collect();

        let bounds: Vec<&str> = cleaned
            .splitn(2, |c: char| RANGE_SEPARATORS.contains(&c))
            .collect();
        let parse_bound = |s: &str| {
            s.parse::<Decimal>()
                .map_err(|e| Error::InvalidCost(format!("Bad amount {text:?}: {e}")))
        };

        let amount = match bounds.as_slice() {
            [single] => CostAmount::Fixed(parse_bound(single)?),
            [min, max] => {
                let range = CostRange {
                    min: parse_bound(min)?,
                    max: parse_bound(max)?,
                };
                if range.min > range.max {
                    return Err(Error::InvalidCost(format!("Inverted range {text:?}")));
                }
                CostAmount::Range(range)
            }
            _ => return Err(Error::InvalidCost(format!("Bad amount {text:?}"))),
        };

        amount.check_bounds()
    }

    fn check_bounds(self) -> Result<Self> {
        let range = self.as_range();
        if range.min < Decimal::ZERO {
            return Err(Error::InvalidCost(format!("Negative amount {range}")));
        }
        if range.max > Decimal::from(MAX_AMOUNT) {
            return Err(Error::InvalidCost(format!(
                "Amount {range} exceeds the maximum of {MAX_AMOUNT}"
            )));
        }
        Ok(self)
    }

    /// View as a range (fixed amounts have zero width)
    pub fn as_range(&self) -> CostRange {
        match *self {
            CostAmount::Fixed(amount) => CostRange::fixed(amount),
            CostAmount::Range(range) => range,
        }
    }
}

/// Wire form: a plain number or a human-formatted string
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(Decimal),
    Text(String),
}

impl TryFrom<RawAmount> for CostAmount {
    type Error = Error;

    fn try_from(raw: RawAmount) -> Result<Self> {
        match raw {
            RawAmount::Number(amount) => CostAmount::Fixed(amount).check_bounds(),
            RawAmount::Text(text) => CostAmount::parse(&text),
        }
    }
}

impl From<CostAmount> for RawAmount {
    fn from(amount: CostAmount) -> Self {
        match amount {
            CostAmount::Fixed(amount) => RawAmount::Number(amount),
            CostAmount::Range(range) => RawAmount::Text(range.to_string()),
        }
    }
}

/// One line of the cost table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostItem {
    /// Label shown in the table
    pub label: String,

    /// Amount or estimate
    pub amount: CostAmount,

    /// Optional remark ("varies", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Shared and individual planned costs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    /// Costs split across the group
    #[serde(default)]
    pub shared: Vec<CostItem>,

    /// Costs each member pays for themself
    #[serde(default)]
    pub individual: Vec<CostItem>,

    /// Headcount for the shared split; the roster size when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people: Option<u32>,

    /// Footnote shown under the table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CostBreakdown {
    /// Total of shared lines
    pub fn shared_total(&self) -> CostRange {
        self.shared.iter().map(|item| item.amount.as_range()).sum()
    }

    /// Total of individual lines (per member)
    pub fn individual_total(&self) -> CostRange {
        self.individual.iter().map(|item| item.amount.as_range()).sum()
    }

    /// Shared total per head, rounded up to `step`
    pub fn per_person(&self, people: u32, step: Decimal) -> Result<CostRange> {
        self.shared_total().per_person(people, step)
    }

    /// Compute the summary shown under the table
    pub fn summarize(&self, default_people: usize, step: Decimal) -> Result<CostSummary> {
        let people = match self.people {
            Some(people) => people,
            None => u32::try_from(default_people)
                .map_err(|_| Error::InvalidCost(format!("Too many people: {default_people}")))?,
        };

        Ok(CostSummary {
            people,
            shared_total: self.shared_total(),
            per_person: self.per_person(people, step)?,
            individual_total: self.individual_total(),
        })
    }
}

/// Derived cost figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    /// Headcount used for the split
    pub people: u32,
    /// Sum of shared lines
    pub shared_total: CostRange,
    /// Shared total per head, rounded up
    pub per_person: CostRange,
    /// Sum of individual lines
    pub individual_total: CostRange,
}

/// "Amount per person" for a single expense, rounded up to a whole unit
pub fn per_person_share(amount: Decimal, people: usize) -> Result<Decimal> {
    if people == 0 {
        return Err(Error::InvalidCost("Cannot split costs among zero people".to_string()));
    }
    Ok((amount / Decimal::from(people)).ceil())
}

fn round_up_to(value: Decimal, step: Decimal) -> Decimal {
    (value / step).ceil() * step
}
