use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;

use super::{ComplianceEvaluator, ComplianceIssue};
use crate::analytics::whole_dollars;
use crate::portfolio::{
    Certification, CertificationQuery, Household, PortfolioReader, Program, Severity,
    StoreError,
};

const BASELINE_HOUSEHOLD_SIZE: u8 = 4;
const PER_MEMBER_ADJUSTMENT: f64 = 0.08;
const DAYS_PER_MONTH: i64 = 30;

/// Income ceiling for a household under a program, bumped 8% per member above four.
pub fn income_limit(area_median_income: f64, income_limit_percent: u8, household_size: u8) -> f64 {
    let extra_members = household_size.saturating_sub(BASELINE_HOUSEHOLD_SIZE);
    let bump = 1.0 + PER_MEMBER_ADJUSTMENT * f64::from(extra_members);
    area_median_income * (f64::from(income_limit_percent) / 100.0) * bump
}

/// `date + days`, saturating at the last representable date.
fn days_after(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|span| date.checked_add_signed(span))
        .unwrap_or(NaiveDate::MAX)
}

/// `date - days`, saturating at the first representable date.
fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|span| date.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN)
}

impl<'a, R> ComplianceEvaluator<'a, R>
where
    R: PortfolioReader,
{
    /// Active certifications due within the recertification window or already past due.
    pub fn certifications_due(&self) -> Result<Vec<ComplianceIssue>, StoreError> {
        let window = i64::from(self.settings.recertification_window_days);
        let threshold = days_after(self.today, window);
        let query = CertificationQuery::active().due_on_or_before(threshold);

        let issues = self
            .with_parties(self.reader.certifications(&query)?)?
            .into_iter()
            .map(|(certification, household, program)| {
                let severity = if certification.next_due_date < self.today {
                    Severity::High
                } else {
                    Severity::Medium
                };

                ComplianceIssue {
                    household_id: household.id,
                    household_name: household.name,
                    program_name: program.name,
                    issue: "Certification due".to_string(),
                    severity,
                    next_due_date: certification.next_due_date,
                }
            })
            .collect();
        Ok(issues)
    }

    /// Active certifications whose recorded income exceeds the program limit.
    pub fn income_limit_exceptions(&self) -> Result<Vec<ComplianceIssue>, StoreError> {
        let certifications = self.reader.certifications(&CertificationQuery::active())?;

        let mut issues = Vec::new();
        for (certification, household, program) in self.with_parties(certifications)? {
            let limit = income_limit(
                self.settings.area_median_income,
                program.income_limit_percent,
                household.household_size,
            );
            if certification.household_income <= limit {
                continue;
            }

            issues.push(ComplianceIssue {
                household_id: household.id,
                household_name: household.name,
                program_name: program.name,
                issue: format!(
                    "Household income {} exceeds limit {}",
                    whole_dollars(certification.household_income),
                    whole_dollars(limit)
                ),
                severity: Severity::High,
                next_due_date: certification.next_due_date,
            });
        }
        Ok(issues)
    }

    /// Households with no certification effective within the last `months` (30-day months).
    pub fn households_without_recent_activity(
        &self,
        months: u32,
    ) -> Result<Vec<ComplianceIssue>, StoreError> {
        let cutoff = days_before(self.today, i64::from(months) * DAYS_PER_MONTH);
        let query = CertificationQuery::default().effective_on_or_after(cutoff);
        let recently_certified: BTreeSet<_> = self
            .reader
            .certifications(&query)?
            .into_iter()
            .map(|certification| certification.household_id)
            .collect();

        let issues = self
            .reader
            .households(None)?
            .into_iter()
            .filter(|household| !recently_certified.contains(&household.id))
            .map(|household| ComplianceIssue {
                household_id: household.id,
                household_name: household.name,
                program_name: "All".to_string(),
                issue: "No recertification activity".to_string(),
                severity: Severity::Medium,
                next_due_date: self.today,
            })
            .collect();
        Ok(issues)
    }

    /// Attach household and program records, dropping certifications that reference neither.
    fn with_parties(
        &self,
        certifications: Vec<Certification>,
    ) -> Result<Vec<(Certification, Household, Program)>, StoreError> {
        let mut joined = Vec::with_capacity(certifications.len());
        for certification in certifications {
            let household = self.reader.household(certification.household_id)?;
            let program = self.reader.program(certification.program_id)?;
            if let (Some(household), Some(program)) = (household, program) {
                joined.push((certification, household, program));
            }
        }
        Ok(joined)
    }
}
