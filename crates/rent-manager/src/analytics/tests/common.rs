use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use axum::Router;
use chrono::NaiveDate;
use serde_json::Value;

use crate::analytics::{analytics_router, ComplianceSettings};
use crate::portfolio::{
    CategoryKind, Certification, CertificationDraft, CertificationQuery, CertificationStatus,
    ComplianceEvent, ComplianceEventDraft, EventQuery, FinancialTransaction, Household,
    HouseholdDraft, HouseholdId, InMemoryPortfolioStore, PortfolioReader, PortfolioSnapshot,
    PortfolioStore, Program, ProgramDraft, ProgramId, Property, PropertyDraft, PropertyId,
    Resident, ResidentDraft, Severity, StoreError, TransactionDraft, TransactionQuery, Unit,
    UnitDraft, UnitId,
};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    date(2025, 6, 1)
}

pub(super) fn settings() -> ComplianceSettings {
    ComplianceSettings::default()
}

/// A property with one LIHTC 60% program, ready for units and households.
pub(super) struct Portfolio {
    pub(super) store: Arc<InMemoryPortfolioStore>,
    pub(super) property: Property,
    pub(super) program: Program,
}

impl Portfolio {
    pub(super) fn new() -> Self {
        let store = Arc::new(InMemoryPortfolioStore::new());
        let property = store
            .create_property(property_draft("SUN01", "Sunrise Homes"))
            .expect("property created");
        let program = store
            .create_program(program_draft("LIHTC", 60))
            .expect("program created");

        Self {
            store,
            property,
            program,
        }
    }

    pub(super) fn snapshot(&self) -> PortfolioSnapshot {
        self.store.snapshot().expect("snapshot")
    }

    pub(super) fn router(&self) -> Router {
        analytics_router(Arc::clone(&self.store), settings())
    }

    pub(super) fn add_property(&self, code: &str, name: &str) -> Property {
        self.store
            .create_property(property_draft(code, name))
            .expect("property created")
    }

    pub(super) fn add_unit(&self, property_id: PropertyId, number: &str, ami: Option<u8>) -> Unit {
        self.store
            .create_unit(UnitDraft {
                property_id,
                number: number.to_string(),
                bedrooms: 2,
                bathrooms: 1.0,
                square_feet: Some(850),
                ami_percent: ami,
                status: "Occupied".to_string(),
            })
            .expect("unit created")
    }

    pub(super) fn add_household(&self, unit_id: UnitId, name: &str, size: u8) -> Household {
        self.store
            .create_household(HouseholdDraft {
                unit_id,
                name: name.to_string(),
                move_in_date: date(2024, 3, 1),
                annual_income: 42_000.0,
                household_size: size,
                voucher_type: None,
            })
            .expect("household created")
    }

    /// Unit plus household in the default property.
    pub(super) fn occupy(&self, number: &str, name: &str, size: u8) -> Household {
        let unit = self.add_unit(self.property.id, number, Some(60));
        self.add_household(unit.id, name, size)
    }

    pub(super) fn certify(&self, household_id: HouseholdId, terms: CertTerms) -> Certification {
        self.store
            .create_certification(CertificationDraft {
                household_id,
                program_id: terms.program_id.unwrap_or(self.program.id),
                effective_date: terms.effective_date,
                next_due_date: terms.next_due_date,
                household_income: terms.household_income,
                contract_rent: terms.contract_rent,
                tenant_rent: terms.tenant_rent,
                utility_allowance: 100.0,
                status: terms.status,
            })
            .expect("certification created")
    }

    pub(super) fn finding(
        &self,
        household_id: HouseholdId,
        finding: &str,
        occurred_on: NaiveDate,
        resolved_on: Option<NaiveDate>,
    ) -> ComplianceEvent {
        self.store
            .create_compliance_event(ComplianceEventDraft {
                household_id,
                program_id: self.program.id,
                event_type: "Audit".to_string(),
                finding: finding.to_string(),
                severity: Severity::Low,
                occurred_on,
                resolved_on,
                notes: None,
            })
            .expect("event created")
    }

    pub(super) fn record(
        &self,
        property_id: PropertyId,
        on: NaiveDate,
        category: &str,
        amount: f64,
    ) -> FinancialTransaction {
        self.record_as(property_id, on, category, None, amount)
    }

    /// Record a transaction with an explicit accounting kind.
    pub(super) fn record_as(
        &self,
        property_id: PropertyId,
        on: NaiveDate,
        category: &str,
        kind: Option<CategoryKind>,
        amount: f64,
    ) -> FinancialTransaction {
        self.store
            .create_transaction(TransactionDraft {
                property_id,
                transaction_date: on,
                category: category.to_string(),
                kind,
                amount,
                description: None,
                source: "tenant".to_string(),
            })
            .expect("transaction created")
    }
}

/// Certification terms; defaults describe a current, compliant certification.
pub(super) struct CertTerms {
    pub(super) program_id: Option<ProgramId>,
    pub(super) effective_date: NaiveDate,
    pub(super) next_due_date: NaiveDate,
    pub(super) household_income: f64,
    pub(super) contract_rent: f64,
    pub(super) tenant_rent: f64,
    pub(super) status: CertificationStatus,
}

impl Default for CertTerms {
    fn default() -> Self {
        Self {
            program_id: None,
            effective_date: date(2025, 3, 1),
            next_due_date: date(2026, 3, 1),
            household_income: 30_000.0,
            contract_rent: 1_200.0,
            tenant_rent: 400.0,
            status: CertificationStatus::Active,
        }
    }
}

pub(super) fn property_draft(code: &str, name: &str) -> PropertyDraft {
    PropertyDraft {
        name: name.to_string(),
        code: code.to_string(),
        property_type: "Affordable".to_string(),
        address_line1: "123 Main St".to_string(),
        city: "Denver".to_string(),
        state: "CO".to_string(),
        postal_code: "80202".to_string(),
        total_units: None,
        property_manager: None,
    }
}

pub(super) fn program_draft(name: &str, income_limit_percent: u8) -> ProgramDraft {
    ProgramDraft {
        name: name.to_string(),
        category: "Tax Credit".to_string(),
        funding_source: None,
        income_limit_percent,
        rent_limit_percent: None,
    }
}

/// Store whose every call fails as if the backing database went away.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("database offline".to_string()))
}

impl PortfolioReader for UnavailableStore {
    fn properties(&self, _: Option<PropertyId>) -> Result<Vec<Property>, StoreError> {
        offline()
    }

    fn programs(&self) -> Result<Vec<Program>, StoreError> {
        offline()
    }

    fn units(&self, _: Option<PropertyId>) -> Result<Vec<Unit>, StoreError> {
        offline()
    }

    fn households(&self, _: Option<PropertyId>) -> Result<Vec<Household>, StoreError> {
        offline()
    }

    fn occupancy(&self, _: PropertyId) -> Result<BTreeMap<UnitId, HouseholdId>, StoreError> {
        offline()
    }

    fn certifications(&self, _: &CertificationQuery) -> Result<Vec<Certification>, StoreError> {
        offline()
    }

    fn compliance_events(&self, _: &EventQuery) -> Result<Vec<ComplianceEvent>, StoreError> {
        offline()
    }

    fn transactions(&self, _: &TransactionQuery) -> Result<Vec<FinancialTransaction>, StoreError> {
        offline()
    }

    fn residents(&self, _: HouseholdId) -> Result<Vec<Resident>, StoreError> {
        offline()
    }

    fn property(&self, _: PropertyId) -> Result<Option<Property>, StoreError> {
        offline()
    }

    fn unit(&self, _: UnitId) -> Result<Option<Unit>, StoreError> {
        offline()
    }

    fn household(&self, _: HouseholdId) -> Result<Option<Household>, StoreError> {
        offline()
    }

    fn program(&self, _: ProgramId) -> Result<Option<Program>, StoreError> {
        offline()
    }
}

impl PortfolioStore for UnavailableStore {
    fn create_property(&self, _: PropertyDraft) -> Result<Property, StoreError> {
        offline()
    }

    fn create_unit(&self, _: UnitDraft) -> Result<Unit, StoreError> {
        offline()
    }

    fn create_program(&self, _: ProgramDraft) -> Result<Program, StoreError> {
        offline()
    }

    fn create_household(&self, _: HouseholdDraft) -> Result<Household, StoreError> {
        offline()
    }

    fn create_resident(&self, _: ResidentDraft) -> Result<Resident, StoreError> {
        offline()
    }

    fn create_certification(&self, _: CertificationDraft) -> Result<Certification, StoreError> {
        offline()
    }

    fn create_compliance_event(
        &self,
        _: ComplianceEventDraft,
    ) -> Result<ComplianceEvent, StoreError> {
        offline()
    }

    fn create_transaction(&self, _: TransactionDraft) -> Result<FinancialTransaction, StoreError> {
        offline()
    }

    fn snapshot(&self) -> Result<PortfolioSnapshot, StoreError> {
        offline()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
