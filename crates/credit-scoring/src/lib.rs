//! Credit scoring engine.
//!
//! Every formula that turns a company's balance series and transaction graph
//! into a score lives here. Presentation layers and the portfolio screener call
//! these functions instead of re-deriving them.

pub mod alerts;
pub mod concentration;
pub mod counterparties;
pub mod credit_score;
pub mod dependency;
pub mod engine;
pub mod health;
pub mod life_stage;
pub mod liquidity;
pub mod metrics;


pub use alerts::{RiskAlert, RiskAlertKind};
pub use concentration::ConcentrationProfile;
pub use counterparties::CounterpartyStat;
pub use credit_score::{CreditDimension, CreditScore, CreditScoreBreakdown};
pub use dependency::DependencyRiskBreakdown;
pub use engine::{CompanyReport, ScoringEngine};
pub use health::HealthBreakdown;
pub use liquidity::{LiquidityEvolution, LiquidityMetrics, LiquidityRisk, Roll3View, TrendDirection};
pub use metrics::CompanyMetrics;
