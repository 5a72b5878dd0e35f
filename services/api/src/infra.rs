use chrono::{Datelike, Duration, NaiveDate};
use metrics_exporter_prometheus::PrometheusHandle;
use rent_manager::portfolio::{
    CertificationDraft, CertificationStatus, ComplianceEventDraft, HouseholdDraft,
    HouseholdId, PortfolioStore, ProgramDraft, ProgramId, PropertyDraft, PropertyId, Severity,
    StoreError, TransactionDraft, UnitDraft, UnitId,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Properties created by [`seed_demo_portfolio`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct DemoPortfolio {
    pub(crate) sunrise: PropertyId,
    pub(crate) oak_terrace: PropertyId,
}

/// Populate a store with a small portfolio whose dates are relative to `today`, so the
/// compliance report always has something due, something overdue, and an idle household.
pub(crate) fn seed_demo_portfolio<S>(
    store: &S,
    today: NaiveDate,
) -> Result<DemoPortfolio, StoreError>
where
    S: PortfolioStore + ?Sized,
{
    let sunrise = store
        .create_property(property("Sunrise Homes", "SUN01", "1450 Larimer St", Some(4)))?
        .id;
    let oak_terrace = store
        .create_property(property("Oak Terrace", "OAK01", "88 Colfax Ave", Some(1)))?
        .id;

    let lihtc = store
        .create_program(ProgramDraft {
            name: "LIHTC".to_string(),
            category: "Tax Credit".to_string(),
            funding_source: Some("Colorado HFA".to_string()),
            income_limit_percent: 60,
            rent_limit_percent: Some(30),
        })?
        .id;
    let home = store
        .create_program(ProgramDraft {
            name: "HOME".to_string(),
            category: "Federal Grant".to_string(),
            funding_source: Some("HUD".to_string()),
            income_limit_percent: 50,
            rent_limit_percent: None,
        })?
        .id;

    let unit_101 = store.create_unit(unit(sunrise, "101", 2, Some(60), "Occupied"))?.id;
    let unit_102 = store.create_unit(unit(sunrise, "102", 3, Some(50), "Occupied"))?.id;
    let unit_103 = store.create_unit(unit(sunrise, "103", 1, Some(60), "Occupied"))?.id;
    store.create_unit(unit(sunrise, "104", 2, Some(80), "Vacant"))?;
    let unit_1a = store.create_unit(unit(oak_terrace, "1A", 1, Some(50), "Occupied"))?.id;

    let days = Duration::days;
    let garcia = household(store, unit_101, "Garcia Household", 3, 55_000.0, today - days(400))?;
    let nguyen = household(store, unit_102, "Nguyen Household", 5, 41_000.0, today - days(900))?;
    let okafor = household(store, unit_103, "Okafor Household", 2, 28_000.0, today - days(45))?;
    household(store, unit_1a, "Silva Household", 1, 21_500.0, today - days(700))?;

    // Garcia is due soon and over income; Nguyen is overdue and last certified over a year ago.
    let garcia_dates = (today - days(60), today + days(20));
    let nguyen_dates = (today - days(400), today - days(10));
    let okafor_dates = (today - days(30), today + days(335));
    certify(store, garcia, lihtc, garcia_dates, 55_000.0, (1_200.0, 400.0))?;
    certify(store, nguyen, home, nguyen_dates, 41_000.0, (1_350.0, 450.0))?;
    certify(store, okafor, lihtc, okafor_dates, 28_000.0, (950.0, 700.0))?;

    store.create_compliance_event(ComplianceEventDraft {
        household_id: nguyen,
        program_id: home,
        event_type: "File Review".to_string(),
        finding: "Income verification missing".to_string(),
        severity: Severity::Medium,
        occurred_on: today - Duration::days(15),
        resolved_on: None,
        notes: Some("Employer letter requested".to_string()),
    })?;
    store.create_compliance_event(ComplianceEventDraft {
        household_id: garcia,
        program_id: lihtc,
        event_type: "Inspection".to_string(),
        finding: "Smoke detector battery".to_string(),
        severity: Severity::Low,
        occurred_on: today - Duration::days(90),
        resolved_on: Some(today - Duration::days(85)),
        notes: None,
    })?;

    let month_start = today.with_day(1).unwrap_or(today);
    for (property_id, offset, category, amount, source) in [
        (sunrise, 0, "revenue-rent", 3_600.0, "tenant"),
        (sunrise, 0, "revenue-subsidy", 2_450.0, "HUD"),
        (sunrise, 3, "revenue-laundry", 120.0, "vendor"),
        (sunrise, 6, "expense-maintenance", 850.0, "vendor"),
        (sunrise, 9, "expense-admin", 300.0, "vendor"),
        (sunrise, 12, "reserve-deposit", 500.0, "owner"),
        (oak_terrace, 0, "revenue-rent", 900.0, "tenant"),
        (oak_terrace, 4, "expense-utilities", 210.0, "vendor"),
    ] {
        store.create_transaction(TransactionDraft {
            property_id,
            transaction_date: month_start + Duration::days(offset),
            category: category.to_string(),
            kind: None,
            amount,
            description: None,
            source: source.to_string(),
        })?;
    }

    info!(%sunrise, %oak_terrace, %today, "demo portfolio seeded");
    Ok(DemoPortfolio {
        sunrise,
        oak_terrace,
    })
}

fn property(name: &str, code: &str, address: &str, total_units: Option<u32>) -> PropertyDraft {
    PropertyDraft {
        name: name.to_string(),
        code: code.to_string(),
        property_type: "Affordable".to_string(),
        address_line1: address.to_string(),
        city: "Denver".to_string(),
        state: "CO".to_string(),
        postal_code: "80202".to_string(),
        total_units,
        property_manager: Some("Dana Ortiz".to_string()),
    }
}

fn unit(
    property_id: PropertyId,
    number: &str,
    bedrooms: u8,
    ami: Option<u8>,
    status: &str,
) -> UnitDraft {
    UnitDraft {
        property_id,
        number: number.to_string(),
        bedrooms,
        bathrooms: 1.0,
        square_feet: Some(650 + u32::from(bedrooms) * 200),
        ami_percent: ami,
        status: status.to_string(),
    }
}

fn household<S>(
    store: &S,
    unit_id: UnitId,
    name: &str,
    household_size: u8,
    annual_income: f64,
    move_in_date: NaiveDate,
) -> Result<HouseholdId, StoreError>
where
    S: PortfolioStore + ?Sized,
{
    let record = store.create_household(HouseholdDraft {
        unit_id,
        name: name.to_string(),
        move_in_date,
        annual_income,
        household_size,
        voucher_type: None,
    })?;
    Ok(record.id)
}

/// `dates` is `(effective, next_due)`; `rents` is `(contract_rent, tenant_rent)`.
fn certify<S>(
    store: &S,
    household_id: HouseholdId,
    program_id: ProgramId,
    dates: (NaiveDate, NaiveDate),
    household_income: f64,
    rents: (f64, f64),
) -> Result<(), StoreError>
where
    S: PortfolioStore + ?Sized,
{
    store.create_certification(CertificationDraft {
        household_id,
        program_id,
        effective_date: dates.0,
        next_due_date: dates.1,
        household_income,
        contract_rent: rents.0,
        tenant_rent: rents.1,
        utility_allowance: 85.0,
        status: CertificationStatus::Active,
    })?;
    Ok(())
}
