use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use super::compliance::{
    combine, open_findings, ComplianceEvaluator, ComplianceIssue, ComplianceSettings,
};
use super::financials::{
    apply_budget_variance, FinancialAggregator, NoiReport, OccupancyReport, OperatingSummary,
    RentProjection,
};
use crate::error::AppError;
use crate::portfolio::{PortfolioStore, PropertyId, TransactionQuery};

/// Shared state for the reporting endpoints.
pub struct AnalyticsState<S> {
    store: Arc<S>,
    settings: ComplianceSettings,
}

impl<S> Clone for AnalyticsState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: self.settings.clone(),
        }
    }
}

/// Router exposing compliance issues and financial reports.
pub fn analytics_router<S>(store: Arc<S>, settings: ComplianceSettings) -> Router
where
    S: PortfolioStore + 'static,
{
    Router::new()
        .route("/api/v1/compliance/issues", get(compliance_issues::<S>))
        .route("/api/v1/reports/occupancy", get(occupancy_report::<S>))
        .route("/api/v1/reports/rent", get(rent_report::<S>))
        .route(
            "/api/v1/reports/operating-summary",
            get(operating_summary_report::<S>),
        )
        .route("/api/v1/reports/noi", get(noi_report::<S>))
        .route(
            "/api/v1/reports/budget-variance",
            post(budget_variance_report::<S>),
        )
        .with_state(AnalyticsState { store, settings })
}

fn include_events_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueParams {
    #[serde(default = "include_events_default")]
    pub(crate) include_events: bool,
    /// Evaluation date; defaults to the local date.
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PropertyParams {
    pub(crate) property_id: Option<PropertyId>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PeriodParams {
    pub(crate) property_id: Option<PropertyId>,
    pub(crate) start: Option<NaiveDate>,
    pub(crate) end: Option<NaiveDate>,
}

impl PeriodParams {
    fn query(&self) -> TransactionQuery {
        TransactionQuery {
            property_id: self.property_id,
            start: self.start,
            end: self.end,
        }
    }
}

pub(crate) async fn compliance_issues<S: PortfolioStore>(
    State(state): State<AnalyticsState<S>>,
    Query(params): Query<IssueParams>,
) -> Result<Json<Vec<ComplianceIssue>>, AppError> {
    let snapshot = state.store.snapshot()?;
    let today = params.as_of.unwrap_or_else(|| Local::now().date_naive());
    let evaluator = ComplianceEvaluator::new(&snapshot, state.settings.clone(), today);

    let issues = evaluator.consolidate_issues()?;
    let issues = if params.include_events {
        combine([issues, open_findings(&snapshot)?])
    } else {
        issues
    };
    Ok(Json(issues))
}

pub(crate) async fn occupancy_report<S: PortfolioStore>(
    State(state): State<AnalyticsState<S>>,
    Query(params): Query<PropertyParams>,
) -> Result<Json<Vec<OccupancyReport>>, AppError> {
    let snapshot = state.store.snapshot()?;
    let reports = FinancialAggregator::new(&snapshot).occupancy_reports(params.property_id)?;
    Ok(Json(reports))
}

pub(crate) async fn rent_report<S: PortfolioStore>(
    State(state): State<AnalyticsState<S>>,
    Query(params): Query<PropertyParams>,
) -> Result<Json<Vec<RentProjection>>, AppError> {
    let snapshot = state.store.snapshot()?;
    let projections = FinancialAggregator::new(&snapshot).rent_projection(params.property_id)?;
    Ok(Json(projections))
}

pub(crate) async fn operating_summary_report<S: PortfolioStore>(
    State(state): State<AnalyticsState<S>>,
    Query(params): Query<PeriodParams>,
) -> Result<Json<OperatingSummary>, AppError> {
    let snapshot = state.store.snapshot()?;
    let summary = FinancialAggregator::new(&snapshot).operating_summary(&params.query())?;
    Ok(Json(summary))
}

pub(crate) async fn noi_report<S: PortfolioStore>(
    State(state): State<AnalyticsState<S>>,
    Query(params): Query<PeriodParams>,
) -> Result<Json<NoiReport>, AppError> {
    let snapshot = state.store.snapshot()?;
    let report = FinancialAggregator::new(&snapshot).noi_report(&params.query())?;
    Ok(Json(report))
}

pub(crate) async fn budget_variance_report<S: PortfolioStore>(
    State(state): State<AnalyticsState<S>>,
    Query(params): Query<PeriodParams>,
    Json(budget): Json<BTreeMap<String, f64>>,
) -> Result<Json<BTreeMap<String, f64>>, AppError> {
    let snapshot = state.store.snapshot()?;
    let actuals = FinancialAggregator::new(&snapshot).operating_summary(&params.query())?;
    Ok(Json(apply_budget_variance(&actuals.totals(), &budget)))
}
