use std::collections::BTreeSet;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Categorical, EngineError};

/// One monthly balance/revenue observation for a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyMonthlyRecord {
    pub company_id: String,
    /// Reporting month. Any day inside the month identifies it.
    pub period: NaiveDate,
    pub balance: f64,
    /// Annual revenue, constant across a company's periods
    pub revenue: f64,
    pub sector: String,
}

/// A payment from `payer_id` to `receiver_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub payer_id: String,
    pub receiver_id: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: NaiveDate,
}

impl Transaction {
    pub fn touches(&self, company_id: &str) -> bool {
        self.payer_id == company_id || self.receiver_id == company_id
    }
}

/// Direction of money relative to the company being analysed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// The company paid the counterparty
    Outgoing,
    /// The counterparty paid the company
    Incoming,
}

/// A transaction seen from one company's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartyFlow {
    pub counterparty_id: String,
    pub amount: f64,
    pub direction: Direction,
    pub kind: String,
    pub date: NaiveDate,
}

/// A company's ordered monthly records plus every transaction it takes part in.
///
/// Built per analysis call and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_id: String,
    pub records: Vec<CompanyMonthlyRecord>,
    pub transactions: Vec<Transaction>,
}

impl CompanyProfile {
    /// Assemble a profile, keeping only rows that belong to `company_id`.
    ///
    /// Records are ordered by period. Fails on duplicate periods, non-finite
    /// record values and transactions whose amount is not strictly positive.
    pub fn new(
        company_id: &str,
        records: Vec<CompanyMonthlyRecord>,
        transactions: Vec<Transaction>,
    ) -> Result<Self, EngineError> {
        let mut records: Vec<CompanyMonthlyRecord> = records
            .into_iter()
            .filter(|r| r.company_id == company_id)
            .collect();
        records.sort_by_key(|r| r.period);

        for pair in records.windows(2) {
            if same_month(pair[0].period, pair[1].period) {
                return Err(EngineError::DuplicatePeriod {
                    company_id: company_id.to_string(),
                    period: month_start(pair[1].period),
                });
            }
        }
        if let Some(bad) = records
            .iter()
            .find(|r| !r.balance.is_finite() || !r.revenue.is_finite())
        {
            return Err(EngineError::InvalidRecord(format!(
                "company {} period {} has non-finite balance or revenue",
                bad.company_id, bad.period
            )));
        }

        let transactions: Vec<Transaction> = transactions
            .into_iter()
            .filter(|t| t.touches(company_id))
            .collect();
        if let Some(bad) = transactions
            .iter()
            .find(|t| !(t.amount.is_finite() && t.amount > 0.0))
        {
            return Err(EngineError::InvalidTransaction {
                payer_id: bad.payer_id.clone(),
                receiver_id: bad.receiver_id.clone(),
                amount: bad.amount,
            });
        }

        Ok(Self {
            company_id: company_id.to_string(),
            records,
            transactions,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Balance series ordered by period
    pub fn balances(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.balance).collect()
    }

    pub fn current_balance(&self) -> Option<f64> {
        self.records.last().map(|r| r.balance)
    }

    pub fn first_balance(&self) -> Option<f64> {
        self.records.first().map(|r| r.balance)
    }

    /// Revenue as reported on the first record; 0 without records.
    pub fn revenue(&self) -> f64 {
        self.records.first().map(|r| r.revenue).unwrap_or(0.0)
    }

    pub fn sector(&self) -> Option<&str> {
        self.records.first().map(|r| r.sector.as_str())
    }

    /// Number of reported months
    pub fn age_months(&self) -> usize {
        self.records.len()
    }

    pub fn has_period(&self, period: NaiveDate) -> bool {
        self.records.iter().any(|r| same_month(r.period, period))
    }

    /// Transactions where the company is the payer
    pub fn payments(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |t| t.payer_id == self.company_id)
    }

    /// Transactions where the company is the receiver
    pub fn receipts(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |t| t.receiver_id == self.company_id)
    }

    /// Every transaction re-expressed from this company's side.
    pub fn flows(&self) -> Vec<CounterpartyFlow> {
        let outgoing = self.payments().map(|t| CounterpartyFlow {
            counterparty_id: t.receiver_id.clone(),
            amount: t.amount,
            direction: Direction::Outgoing,
            kind: t.kind.clone(),
            date: t.date,
        });
        let incoming = self.receipts().map(|t| CounterpartyFlow {
            counterparty_id: t.payer_id.clone(),
            amount: t.amount,
            direction: Direction::Incoming,
            kind: t.kind.clone(),
            date: t.date,
        });
        outgoing.chain(incoming).collect()
    }

    /// Distinct counterparties across both directions
    pub fn partners(&self) -> BTreeSet<&str> {
        self.payments()
            .map(|t| t.receiver_id.as_str())
            .chain(self.receipts().map(|t| t.payer_id.as_str()))
            .collect()
    }

    /// The profile as it stood at the end of `period`.
    pub fn as_of(&self, period: NaiveDate) -> CompanyProfile {
        let cutoff = month_start(period);
        let end = month_end(period);
        CompanyProfile {
            company_id: self.company_id.clone(),
            records: self
                .records
                .iter()
                .filter(|r| month_start(r.period) <= cutoff)
                .cloned()
                .collect(),
            transactions: self
                .transactions
                .iter()
                .filter(|t| t.date <= end)
                .cloned()
                .collect(),
        }
    }

    /// Volume paid plus received inside the month containing `period`.
    pub fn volume_in_month(&self, period: NaiveDate) -> f64 {
        let paid: f64 = self
            .payments()
            .filter(|t| same_month(t.date, period))
            .map(|t| t.amount)
            .sum();
        let received: f64 = self
            .receipts()
            .filter(|t| same_month(t.date, period))
            .map(|t| t.amount)
            .sum();
        paid + received
    }
}

/// High / Medium / Low banding shared by the health and risk scorers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    /// `>= high` is High, `>= medium` is Medium, anything else Low.
    pub fn from_score(score: f64, high: f64, medium: f64) -> Self {
        match score {
            s if s >= high => ScoreBand::High,
            s if s >= medium => ScoreBand::Medium,
            _ => ScoreBand::Low,
        }
    }
}

impl Categorical for ScoreBand {
    fn label(&self) -> &'static str {
        match self {
            ScoreBand::High => "High",
            ScoreBand::Medium => "Medium",
            ScoreBand::Low => "Low",
        }
    }
}

/// Company maturity stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifeStage {
    Starting,
    Growing,
    Mature,
    Declining,
    /// Only produced by upstream snapshot providers; never by the classifier.
    PersistentDecline,
}

impl LifeStage {
    /// Stages eligible for credit offers
    pub fn is_established(&self) -> bool {
        matches!(self, LifeStage::Mature | LifeStage::Growing)
    }

    pub fn is_declining(&self) -> bool {
        matches!(self, LifeStage::Declining | LifeStage::PersistentDecline)
    }
}

impl Categorical for LifeStage {
    fn label(&self) -> &'static str {
        match self {
            LifeStage::Starting => "Starting",
            LifeStage::Growing => "Growing",
            LifeStage::Mature => "Mature",
            LifeStage::Declining => "Declining",
            LifeStage::PersistentDecline => "Persistent Decline",
        }
    }
}

/// A bounded score plus its category. `category == None` means "N/A".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult<C> {
    pub score: f64,
    pub category: Option<C>,
}

impl<C: Categorical> ScoreResult<C> {
    pub fn new(score: f64, category: C) -> Self {
        Self {
            score,
            category: Some(category),
        }
    }

    /// Neutral result for companies the engine knows nothing about
    pub fn not_available() -> Self {
        Self {
            score: 0.0,
            category: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.category.is_some()
    }

    pub fn label(&self) -> &'static str {
        self.category.as_ref().map_or("N/A", |c| c.label())
    }
}

/// Per-company scores for one reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub company_id: String,
    pub period: NaiveDate,
    pub health_score: f64,
    pub risk_score: f64,
    /// `None` when the runway is undefined upstream
    pub runway: Option<f64>,
    pub stress_flag: bool,
    /// Month-over-month transaction volume growth as a fraction
    pub volume_growth: Option<f64>,
    pub life_stage: LifeStage,
    pub balance: f64,
    pub volume: f64,
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

pub fn previous_month(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_sub_months(Months::new(1))
        .unwrap_or(date)
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}
