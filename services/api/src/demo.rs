use crate::infra::{parse_date, seed_demo_portfolio};
use chrono::{Local, NaiveDate};
use clap::Args;
use rent_manager::analytics::{
    apply_budget_variance, combine, open_findings, ComplianceEvaluator, ComplianceIssue,
    ComplianceSettings, FinancialAggregator,
};
use rent_manager::config::AppConfig;
use rent_manager::error::AppError;
use rent_manager::portfolio::{
    BudgetImporter, FinancialTransaction, InMemoryPortfolioStore, PortfolioReader,
    PortfolioSnapshot, PortfolioStore, PropertyId, TransactionDraft, TransactionId,
    TransactionImporter, TransactionQuery,
};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ComplianceReportArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Leave unresolved compliance events out of the report
    #[arg(long)]
    pub(crate) skip_events: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct FinancialReportArgs {
    /// Restrict the report to one property
    #[arg(long)]
    pub(crate) property_id: Option<u64>,
    /// First transaction date to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: Option<NaiveDate>,
    /// Last transaction date to include (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) end: Option<NaiveDate>,
    /// Ledger export (Date,Category,Amount[,Description][,Source]) to report on
    /// instead of the sample portfolio
    #[arg(long)]
    pub(crate) transactions_csv: Option<PathBuf>,
    /// Budget (Category,Amount) to compare against actuals
    #[arg(long)]
    pub(crate) budget_csv: Option<PathBuf>,
}

pub(crate) fn run_compliance_report(args: ComplianceReportArgs) -> Result<(), AppError> {
    let ComplianceReportArgs { today, skip_events } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let settings = AppConfig::load()?.compliance;

    let snapshot = demo_snapshot(today)?;
    let issues = compliance_issues(&snapshot, settings, today, !skip_events)?;
    render_compliance_issues(&issues, today);
    Ok(())
}

pub(crate) fn run_financial_report(args: FinancialReportArgs) -> Result<(), AppError> {
    let FinancialReportArgs {
        property_id,
        start,
        end,
        transactions_csv,
        budget_csv,
    } = args;
    let property_id = property_id.map(PropertyId);

    let snapshot = match transactions_csv {
        Some(path) => {
            let ledger_property = property_id.unwrap_or(PropertyId(1));
            ledger_snapshot(TransactionImporter::from_path(path, ledger_property)?)
        }
        None => demo_snapshot(Local::now().date_naive())?,
    };
    let budget = budget_csv.map(BudgetImporter::from_path).transpose()?;

    let query = TransactionQuery {
        property_id,
        start,
        end,
    };
    render_financials(&snapshot, &query, budget.as_ref())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let settings = AppConfig::load()?.compliance;
    let snapshot = demo_snapshot(today)?;

    println!("Affordable housing portfolio demo");
    let issues = compliance_issues(&snapshot, settings, today, true)?;
    render_compliance_issues(&issues, today);

    println!();
    render_financials(&snapshot, &TransactionQuery::default(), None)
}

fn demo_snapshot(today: NaiveDate) -> Result<PortfolioSnapshot, AppError> {
    let store = InMemoryPortfolioStore::new();
    seed_demo_portfolio(&store, today)?;
    Ok(store.snapshot()?)
}

/// Wrap imported drafts in a snapshot that holds nothing but the ledger.
fn ledger_snapshot(drafts: Vec<TransactionDraft>) -> PortfolioSnapshot {
    let transactions = drafts
        .into_iter()
        .zip(1..)
        .map(|(draft, id)| FinancialTransaction::from_draft(TransactionId(id), draft))
        .collect();
    PortfolioSnapshot {
        transactions,
        ..PortfolioSnapshot::default()
    }
}

fn compliance_issues<R: PortfolioReader>(
    reader: &R,
    settings: ComplianceSettings,
    today: NaiveDate,
    include_events: bool,
) -> Result<Vec<ComplianceIssue>, AppError> {
    let evaluator = ComplianceEvaluator::new(reader, settings, today);
    let mut sources = vec![evaluator.consolidate_issues()?];
    if include_events {
        sources.push(open_findings(reader)?);
    }
    Ok(combine(sources))
}

fn render_compliance_issues(issues: &[ComplianceIssue], today: NaiveDate) {
    println!("Compliance issues as of {today}");
    if issues.is_empty() {
        println!("- none");
        return;
    }

    for issue in issues {
        println!(
            "- [{}] {} ({}): {} | {}",
            issue.severity.label(),
            issue.household_name,
            issue.program_name,
            issue.issue,
            issue.next_due_date
        );
    }
}

fn render_financials<R: PortfolioReader>(
    reader: &R,
    query: &TransactionQuery,
    budget: Option<&BTreeMap<String, f64>>,
) -> Result<(), AppError> {
    let aggregator = FinancialAggregator::new(reader);

    let occupancy = aggregator.occupancy_reports(query.property_id)?;
    if !occupancy.is_empty() {
        println!("Occupancy");
        for report in &occupancy {
            let ami = report
                .ami_average
                .map(|value| format!("{value:.1}% AMI"))
                .unwrap_or_else(|| "no AMI data".to_string());
            println!(
                "- {}: {}/{} units ({:.2}%) | {}",
                report.property_name,
                report.occupied_units,
                report.total_units,
                report.occupancy_rate,
                ami
            );
        }
    }

    let rent = aggregator.rent_projection(query.property_id)?;
    if !rent.is_empty() {
        println!("Rent roll");
        for projection in &rent {
            println!(
                "- {}: ${:.2} monthly | tenant ${:.2} | subsidy ${:.2}",
                projection.property_name,
                projection.monthly_rent_roll,
                projection.tenant_share,
                projection.subsidy_share
            );
        }
    }

    let noi = aggregator.noi_report(query)?;
    println!("Operating summary");
    if noi.summary.is_empty() {
        println!("- no transactions in range");
    }
    for (category, entry) in noi.summary.iter() {
        println!("- {category} [{}]: ${:.2}", entry.kind.label(), entry.total);
    }
    println!("Net operating income: ${:.2}", noi.net_operating_income);

    if let Some(budget) = budget {
        println!("Budget variance (actual - budget)");
        for (category, variance) in apply_budget_variance(&noi.summary.totals(), budget) {
            println!("- {category}: {variance:+.2}");
        }
    }

    Ok(())
}
