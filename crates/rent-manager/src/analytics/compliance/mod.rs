mod config;
mod detectors;

pub use config::{
    ComplianceSettings, DEFAULT_AREA_MEDIAN_INCOME, DEFAULT_INACTIVITY_MONTHS,
    DEFAULT_RECERTIFICATION_WINDOW_DAYS,
};
pub use detectors::income_limit;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::portfolio::{EventQuery, HouseholdId, PortfolioReader, Severity, StoreError};

/// One detected compliance risk for a household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    pub household_id: HouseholdId,
    pub household_name: String,
    pub program_name: String,
    pub issue: String,
    pub severity: Severity,
    /// Due date, occurrence date, or evaluation date depending on the source.
    pub next_due_date: NaiveDate,
}

type Detector<'a, R> = fn(&ComplianceEvaluator<'a, R>) -> Result<Vec<ComplianceIssue>, StoreError>;

/// Stateless evaluator running the rule battery against one portfolio view.
pub struct ComplianceEvaluator<'a, R> {
    reader: &'a R,
    settings: ComplianceSettings,
    today: NaiveDate,
}

impl<'a, R> ComplianceEvaluator<'a, R>
where
    R: PortfolioReader,
{
    pub fn new(reader: &'a R, settings: ComplianceSettings, today: NaiveDate) -> Self {
        Self {
            reader,
            settings,
            today,
        }
    }

    /// Run every detector in order and concatenate their findings.
    ///
    /// No deduplication: a household flagged by several detectors appears once per detector.
    pub fn consolidate_issues(&self) -> Result<Vec<ComplianceIssue>, StoreError> {
        let detectors: [(&str, Detector<'a, R>); 3] = [
            ("certifications_due", Self::certifications_due),
            ("income_limit_exceptions", Self::income_limit_exceptions),
            ("households_without_recent_activity", Self::inactive_households),
        ];

        let mut aggregated = Vec::new();
        for (name, detector) in detectors {
            let issues = detector(self)?;
            debug!(detector = name, issues = issues.len(), "compliance detector finished");
            aggregated.extend(issues);
        }
        Ok(aggregated)
    }

    fn inactive_households(&self) -> Result<Vec<ComplianceIssue>, StoreError> {
        self.households_without_recent_activity(self.settings.inactivity_months)
    }
}

/// Convert unresolved compliance events into issues.
///
/// Events whose household or program no longer exists are skipped.
pub fn open_findings<R>(reader: &R) -> Result<Vec<ComplianceIssue>, StoreError>
where
    R: PortfolioReader + ?Sized,
{
    let mut issues = Vec::new();
    for event in reader.compliance_events(&EventQuery::unresolved())? {
        let Some(program) = reader.program(event.program_id)? else {
            continue;
        };
        let Some(household) = reader.household(event.household_id)? else {
            warn!(
                event_id = %event.id,
                household_id = %event.household_id,
                "skipping compliance event for missing household"
            );
            continue;
        };

        issues.push(ComplianceIssue {
            household_id: household.id,
            household_name: household.name,
            program_name: program.name,
            issue: event.finding,
            severity: event.severity,
            next_due_date: event.occurred_on,
        });
    }
    Ok(issues)
}

/// Concatenate issue sources, preserving the relative order within and across them.
pub fn combine<I>(sources: I) -> Vec<ComplianceIssue>
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = ComplianceIssue>,
{
    sources.into_iter().flatten().collect()
}
