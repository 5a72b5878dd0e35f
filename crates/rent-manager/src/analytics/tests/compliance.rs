use super::common::*;

use crate::analytics::compliance::income_limit;
use crate::analytics::{
    combine, open_findings, ComplianceEvaluator, ComplianceIssue, ComplianceSettings,
};
use crate::portfolio::{CertificationStatus, HouseholdId, Severity, StoreError};

fn issue(household: u64, text: &str) -> ComplianceIssue {
    ComplianceIssue {
        household_id: HouseholdId(household),
        household_name: format!("Household {household}"),
        program_name: "LIHTC".to_string(),
        issue: text.to_string(),
        severity: Severity::Low,
        next_due_date: today(),
    }
}

#[test]
fn income_limit_bumps_eight_percent_per_member_above_four() {
    let base = income_limit(65_000.0, 60, 4);
    assert!((base - 39_000.0).abs() < 1e-6);
    assert_eq!(income_limit(65_000.0, 60, 1), base);
    assert!((income_limit(65_000.0, 60, 5) - 42_120.0).abs() < 1e-6);
    assert!((income_limit(65_000.0, 60, 6) - 45_240.0).abs() < 1e-6);
}

#[test]
fn certifications_due_grades_overdue_as_high() {
    let portfolio = Portfolio::new();
    let overdue = portfolio.occupy("101", "Garcia Household", 3);
    let upcoming = portfolio.occupy("102", "Nguyen Household", 2);
    let boundary = portfolio.occupy("103", "Okafor Household", 2);
    let distant = portfolio.occupy("104", "Silva Household", 2);
    let expired = portfolio.occupy("105", "Baker Household", 2);

    for (household, due, status) in [
        (&overdue, date(2025, 5, 15), CertificationStatus::Active),
        (&upcoming, date(2025, 6, 20), CertificationStatus::Active),
        (&boundary, date(2025, 7, 1), CertificationStatus::Active),
        (&distant, date(2025, 7, 2), CertificationStatus::Active),
        (&expired, date(2025, 5, 1), CertificationStatus::Expired),
    ] {
        portfolio.certify(
            household.id,
            CertTerms {
                next_due_date: due,
                status,
                ..CertTerms::default()
            },
        );
    }

    let snapshot = portfolio.snapshot();
    let evaluator = ComplianceEvaluator::new(&snapshot, settings(), today());
    let issues = evaluator.certifications_due().expect("detector runs");

    let summary: Vec<_> = issues
        .iter()
        .map(|issue| (issue.household_id, issue.severity, issue.next_due_date))
        .collect();
    assert_eq!(
        summary,
        vec![
            (overdue.id, Severity::High, date(2025, 5, 15)),
            (upcoming.id, Severity::Medium, date(2025, 6, 20)),
            (boundary.id, Severity::Medium, date(2025, 7, 1)),
        ]
    );
    assert!(issues.iter().all(|issue| issue.issue == "Certification due"));
    assert!(issues.iter().all(|issue| issue.program_name == "LIHTC"));
}

#[test]
fn due_today_is_medium_not_overdue() {
    let portfolio = Portfolio::new();
    let household = portfolio.occupy("101", "Garcia Household", 3);
    portfolio.certify(
        household.id,
        CertTerms {
            next_due_date: today(),
            ..CertTerms::default()
        },
    );

    let snapshot = portfolio.snapshot();
    let issues = ComplianceEvaluator::new(&snapshot, settings(), today())
        .certifications_due()
        .expect("detector runs");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, Severity::Medium);
}

#[test]
fn income_exactly_at_limit_is_not_flagged() {
    let portfolio = Portfolio::new();
    let at_limit = portfolio.occupy("101", "Garcia Household", 4);
    let over_limit = portfolio.occupy("102", "Nguyen Household", 4);
    portfolio.certify(
        at_limit.id,
        CertTerms {
            household_income: income_limit(65_000.0, 60, 4),
            ..CertTerms::default()
        },
    );
    portfolio.certify(
        over_limit.id,
        CertTerms {
            household_income: 45_000.0,
            ..CertTerms::default()
        },
    );

    let snapshot = portfolio.snapshot();
    let issues = ComplianceEvaluator::new(&snapshot, settings(), today())
        .income_limit_exceptions()
        .expect("detector runs");

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].household_id, over_limit.id);
    assert_eq!(issues[0].severity, Severity::High);
    assert_eq!(
        issues[0].issue,
        "Household income $45,000 exceeds limit $39,000"
    );
    assert_eq!(issues[0].next_due_date, date(2026, 3, 1));
}

#[test]
fn larger_households_get_a_higher_limit() {
    let portfolio = Portfolio::new();
    let large = portfolio.occupy("101", "Garcia Household", 6);
    portfolio.certify(
        large.id,
        CertTerms {
            household_income: 45_000.0,
            ..CertTerms::default()
        },
    );

    let snapshot = portfolio.snapshot();
    let issues = ComplianceEvaluator::new(&snapshot, settings(), today())
        .income_limit_exceptions()
        .expect("detector runs");
    assert!(issues.is_empty());
}

#[test]
fn inactive_households_include_those_never_certified() {
    let portfolio = Portfolio::new();
    let recent = portfolio.occupy("101", "Garcia Household", 3);
    let never = portfolio.occupy("102", "Nguyen Household", 2);
    let stale = portfolio.occupy("103", "Okafor Household", 2);
    let recently_expired = portfolio.occupy("104", "Silva Household", 2);

    portfolio.certify(recent.id, CertTerms::default());
    portfolio.certify(
        stale.id,
        CertTerms {
            effective_date: date(2024, 6, 1),
            ..CertTerms::default()
        },
    );
    portfolio.certify(
        recently_expired.id,
        CertTerms {
            effective_date: date(2025, 4, 1),
            status: CertificationStatus::Expired,
            ..CertTerms::default()
        },
    );

    let snapshot = portfolio.snapshot();
    let issues = ComplianceEvaluator::new(&snapshot, settings(), today())
        .households_without_recent_activity(6)
        .expect("detector runs");

    let flagged: Vec<_> = issues.iter().map(|issue| issue.household_id).collect();
    assert_eq!(flagged, vec![never.id, stale.id]);
    for issue in &issues {
        assert_eq!(issue.program_name, "All");
        assert_eq!(issue.issue, "No recertification activity");
        assert_eq!(issue.severity, Severity::Medium);
        assert_eq!(issue.next_due_date, today());
    }
}

#[test]
fn inactivity_cutoff_uses_thirty_day_months() {
    let portfolio = Portfolio::new();
    let on_cutoff = portfolio.occupy("101", "Garcia Household", 3);
    let before_cutoff = portfolio.occupy("102", "Nguyen Household", 3);
    // 2025-06-01 minus 180 days.
    portfolio.certify(
        on_cutoff.id,
        CertTerms {
            effective_date: date(2024, 12, 3),
            ..CertTerms::default()
        },
    );
    portfolio.certify(
        before_cutoff.id,
        CertTerms {
            effective_date: date(2024, 12, 2),
            ..CertTerms::default()
        },
    );

    let snapshot = portfolio.snapshot();
    let issues = ComplianceEvaluator::new(&snapshot, settings(), today())
        .households_without_recent_activity(6)
        .expect("detector runs");
    let flagged: Vec<_> = issues.iter().map(|issue| issue.household_id).collect();
    assert_eq!(flagged, vec![before_cutoff.id]);
}

#[test]
fn consolidate_runs_detectors_in_order_without_dedup() {
    let portfolio = Portfolio::new();
    let overdue_and_over = portfolio.occupy("101", "Garcia Household", 2);
    let idle = portfolio.occupy("102", "Nguyen Household", 2);
    portfolio.certify(
        overdue_and_over.id,
        CertTerms {
            next_due_date: date(2025, 5, 1),
            household_income: 55_000.0,
            ..CertTerms::default()
        },
    );

    let snapshot = portfolio.snapshot();
    let evaluator = ComplianceEvaluator::new(&snapshot, settings(), today());
    let due = evaluator.certifications_due().expect("due");
    let income = evaluator.income_limit_exceptions().expect("income");
    let inactive = evaluator
        .households_without_recent_activity(settings().inactivity_months)
        .expect("inactive");

    let issues = evaluator.consolidate_issues().expect("consolidated");
    assert_eq!(issues.len(), due.len() + income.len() + inactive.len());
    assert_eq!(issues, combine([due, income, inactive]));

    let texts: Vec<_> = issues.iter().map(|issue| issue.issue.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Certification due",
            "Household income $55,000 exceeds limit $39,000",
            "No recertification activity",
        ]
    );
    assert_eq!(issues[0].household_id, overdue_and_over.id);
    assert_eq!(issues[1].household_id, overdue_and_over.id);
    assert_eq!(issues[2].household_id, idle.id);
}

#[test]
fn certifications_with_missing_parties_are_skipped() {
    let portfolio = Portfolio::new();
    let household = portfolio.occupy("101", "Garcia Household", 2);
    portfolio.certify(
        household.id,
        CertTerms {
            next_due_date: date(2025, 5, 1),
            ..CertTerms::default()
        },
    );

    let mut snapshot = portfolio.snapshot();
    snapshot.programs.clear();

    let issues = ComplianceEvaluator::new(&snapshot, settings(), today())
        .certifications_due()
        .expect("detector runs");
    assert!(issues.is_empty());
}

#[test]
fn open_findings_keep_unresolved_events_only() {
    let portfolio = Portfolio::new();
    let household = portfolio.occupy("101", "Garcia Household", 2);
    portfolio.finding(household.id, "Missing lease addendum", date(2025, 4, 10), None);
    portfolio.finding(
        household.id,
        "Smoke detector",
        date(2025, 3, 1),
        Some(date(2025, 3, 5)),
    );

    let issues = open_findings(&portfolio.snapshot()).expect("findings");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].issue, "Missing lease addendum");
    assert_eq!(issues[0].severity, Severity::Low);
    assert_eq!(issues[0].next_due_date, date(2025, 4, 10));
    assert_eq!(issues[0].household_name, "Garcia Household");
    assert_eq!(issues[0].program_name, "LIHTC");
}

#[test]
fn open_findings_skip_events_for_missing_households() {
    let portfolio = Portfolio::new();
    let kept = portfolio.occupy("101", "Garcia Household", 2);
    let removed = portfolio.occupy("102", "Nguyen Household", 2);
    portfolio.finding(kept.id, "Income documentation", date(2025, 4, 1), None);
    portfolio.finding(removed.id, "Lease unsigned", date(2025, 4, 2), None);

    let mut snapshot = portfolio.snapshot();
    snapshot
        .households
        .retain(|household| household.id != removed.id);

    let issues = open_findings(&snapshot).expect("findings");
    let households: Vec<_> = issues.iter().map(|issue| issue.household_id).collect();
    assert_eq!(households, vec![kept.id]);
}

#[test]
fn combine_preserves_source_order() {
    let merged = combine([
        vec![issue(2, "b"), issue(1, "a")],
        Vec::new(),
        vec![issue(3, "c")],
    ]);
    let texts: Vec<_> = merged.iter().map(|issue| issue.issue.as_str()).collect();
    assert_eq!(texts, vec!["b", "a", "c"]);
    assert!(combine(Vec::<Vec<ComplianceIssue>>::new()).is_empty());
}

#[test]
fn detectors_propagate_store_failures() {
    let evaluator = ComplianceEvaluator::new(&UnavailableStore, settings(), today());
    assert!(matches!(
        evaluator.consolidate_issues(),
        Err(StoreError::Unavailable(_))
    ));
    assert!(matches!(
        open_findings(&UnavailableStore),
        Err(StoreError::Unavailable(_))
    ));
}

#[test]
fn oversized_windows_saturate_instead_of_overflowing() {
    let portfolio = Portfolio::new();
    let certified = portfolio.occupy("101", "Garcia Household", 3);
    portfolio.occupy("102", "Nguyen Household", 2);
    portfolio.certify(
        certified.id,
        CertTerms {
            effective_date: date(1990, 1, 1),
            next_due_date: date(2090, 1, 1),
            ..CertTerms::default()
        },
    );

    let settings = ComplianceSettings {
        recertification_window_days: u32::MAX,
        inactivity_months: 4_000_000,
        ..ComplianceSettings::default()
    };
    let snapshot = portfolio.snapshot();
    let evaluator = ComplianceEvaluator::new(&snapshot, settings, today());
    let issues = evaluator.consolidate_issues().expect("detectors run");

    let summary: Vec<_> = issues
        .iter()
        .map(|issue| (issue.household_name.as_str(), issue.issue.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Garcia Household", "Certification due"),
            ("Nguyen Household", "No recertification activity"),
        ]
    );
}
