//! Derived compliance and financial analytics over a portfolio snapshot.
//!
//! Everything here is read-only: evaluators borrow a [`PortfolioReader`] for the
//! duration of a request and return freshly built views.
//!
//! [`PortfolioReader`]: crate::portfolio::PortfolioReader

pub mod compliance;
pub mod financials;
pub mod router;

#[cfg(test)]
mod tests;

pub use compliance::{
    combine, open_findings, ComplianceEvaluator, ComplianceIssue, ComplianceSettings,
};
pub use financials::{
    apply_budget_variance, net_operating_income, FinancialAggregator, NoiReport,
    OccupancyReport, OperatingSummary, RentProjection,
};
pub use router::analytics_router;

/// Round to cents, halves to even.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Render an amount as whole dollars with thousands separators, e.g. `$55,000`.
/// Halves round to even.
pub(crate) fn whole_dollars(amount: f64) -> String {
    let rounded = amount.round_ties_even() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if rounded < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
