use std::sync::Arc;

use credit_core::{
    CompanyDataSource, CompanyProfile, Direction, EngineError, LifeStage, ScoreBand, ScoreResult,
};
use serde::{Deserialize, Serialize};

use crate::alerts::{self, RiskAlert};
use crate::counterparties::{self, CounterpartyStat};
use crate::credit_score::{self, CreditScore};
use crate::dependency::{self, DependencyRiskBreakdown};
use crate::health::{self, HealthBreakdown};
use crate::life_stage;
use crate::liquidity::{self, LiquidityEvolution, LiquidityMetrics, LiquidityRisk, Roll3View};
use crate::metrics::CompanyMetrics;

/// Everything the engine knows about one company, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyReport {
    pub company_id: String,
    pub sector: Option<String>,
    pub metrics: CompanyMetrics,
    pub health: ScoreResult<ScoreBand>,
    pub health_breakdown: HealthBreakdown,
    pub dependency_risk: ScoreResult<ScoreBand>,
    pub dependency_breakdown: DependencyRiskBreakdown,
    pub credit: CreditScore,
    pub life_stage: ScoreResult<LifeStage>,
    pub liquidity_risk: LiquidityRisk,
    pub evolution: LiquidityEvolution,
    pub roll3: Roll3View,
    pub payments: Vec<CounterpartyStat>,
    pub receipts: Vec<CounterpartyStat>,
    pub alert: Option<RiskAlert>,
}

impl CompanyReport {
    /// `None` when the profile has no records.
    pub fn from_profile(profile: &CompanyProfile) -> Option<Self> {
        let metrics = CompanyMetrics::from_profile(profile)?;
        let balances = profile.balances();
        let health_breakdown = health::breakdown(&metrics);

        Some(Self {
            company_id: profile.company_id.clone(),
            sector: profile.sector().map(str::to_string),
            health: ScoreResult::new(health_breakdown.total, health::categorize(health_breakdown.total)),
            health_breakdown,
            dependency_risk: dependency::score(&metrics.concentration, !profile.transactions.is_empty()),
            dependency_breakdown: dependency::breakdown(&metrics.concentration),
            credit: credit_score::score(&metrics),
            life_stage: life_stage::assess(&metrics),
            liquidity_risk: metrics.liquidity.risk_level(),
            evolution: liquidity::evolution(&balances),
            roll3: liquidity::roll3(&balances),
            payments: counterparties::stats(profile, Direction::Outgoing),
            receipts: counterparties::stats(profile, Direction::Incoming),
            alert: alerts::evaluate(&metrics),
            metrics,
        })
    }
}

/// Entry point for every consumer that needs a company's scores.
///
/// Each call takes the company id explicitly and reads a fresh profile from
/// the data source; nothing is cached between calls.
pub struct ScoringEngine<S: ?Sized> {
    source: Arc<S>,
}

impl<S: ?Sized> Clone for ScoringEngine<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: CompanyDataSource + ?Sized> ScoringEngine<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// `Ok(None)` for unknown companies; `Err` only for data-quality defects.
    pub fn profile(&self, company_id: &str) -> Result<Option<CompanyProfile>, EngineError> {
        let records = self.source.company_records(company_id);
        if records.is_empty() {
            tracing::debug!(company_id, "no records for company");
            return Ok(None);
        }
        let transactions = self.source.transactions_for(company_id);
        match CompanyProfile::new(company_id, records, transactions) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                tracing::warn!(company_id, error = %e, "rejecting company data");
                Err(e)
            }
        }
    }

    pub fn metrics(&self, company_id: &str) -> Result<Option<CompanyMetrics>, EngineError> {
        Ok(self
            .profile(company_id)?
            .as_ref()
            .and_then(CompanyMetrics::from_profile))
    }

    pub fn compute_health(&self, company_id: &str) -> Result<ScoreResult<ScoreBand>, EngineError> {
        Ok(self
            .metrics(company_id)?
            .map(|m| health::score(&m))
            .unwrap_or_else(ScoreResult::not_available))
    }

    pub fn health_breakdown(&self, company_id: &str) -> Result<Option<HealthBreakdown>, EngineError> {
        Ok(self.metrics(company_id)?.map(|m| health::breakdown(&m)))
    }

    pub fn compute_dependency_risk(&self, company_id: &str) -> Result<ScoreResult<ScoreBand>, EngineError> {
        let Some(profile) = self.profile(company_id)? else {
            return Ok(ScoreResult::not_available());
        };
        let concentration = crate::concentration::analyze(&profile);
        Ok(dependency::score(&concentration, !profile.transactions.is_empty()))
    }

    pub fn compute_credit_score(&self, company_id: &str) -> Result<CreditScore, EngineError> {
        Ok(self
            .metrics(company_id)?
            .map(|m| credit_score::score(&m))
            .unwrap_or_else(CreditScore::not_available))
    }

    pub fn classify_life_stage(&self, company_id: &str) -> Result<ScoreResult<LifeStage>, EngineError> {
        Ok(self
            .metrics(company_id)?
            .map(|m| life_stage::assess(&m))
            .unwrap_or_else(ScoreResult::not_available))
    }

    pub fn compute_liquidity(&self, company_id: &str) -> Result<Option<LiquidityMetrics>, EngineError> {
        Ok(self
            .profile(company_id)?
            .and_then(|p| liquidity::analyze(&p.balances())))
    }

    pub fn liquidity_evolution(&self, company_id: &str) -> Result<Option<LiquidityEvolution>, EngineError> {
        Ok(self
            .profile(company_id)?
            .map(|p| liquidity::evolution(&p.balances())))
    }

    pub fn roll3(&self, company_id: &str) -> Result<Option<Roll3View>, EngineError> {
        Ok(self.profile(company_id)?.map(|p| liquidity::roll3(&p.balances())))
    }

    pub fn counterparty_stats(
        &self,
        company_id: &str,
        direction: Direction,
    ) -> Result<Vec<CounterpartyStat>, EngineError> {
        Ok(self
            .profile(company_id)?
            .map(|p| counterparties::stats(&p, direction))
            .unwrap_or_default())
    }

    pub fn risk_alerts(&self, company_id: &str) -> Result<Option<RiskAlert>, EngineError> {
        Ok(self
            .metrics(company_id)?
            .and_then(|m| alerts::evaluate(&m)))
    }

    pub fn company_report(&self, company_id: &str) -> Result<Option<CompanyReport>, EngineError> {
        let report = self
            .profile(company_id)?
            .as_ref()
            .and_then(CompanyReport::from_profile);
        if let Some(r) = &report {
            tracing::debug!(
                company_id,
                health = r.health.score,
                risk = r.dependency_risk.score,
                credit = r.credit.total,
                "company report built"
            );
        }
        Ok(report)
    }

    /// Reports for every company the source knows, skipping rejected data.
    pub fn all_reports(&self) -> Vec<CompanyReport> {
        self.source
            .company_ids()
            .iter()
            .filter_map(|id| match self.company_report(id) {
                Ok(report) => report,
                Err(e) => {
                    tracing::warn!(company_id = %id, error = %e, "skipping company");
                    None
                }
            })
            .collect()
    }
}
