use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    Certification, CertificationDraft, CertificationStatus, ComplianceEvent,
    ComplianceEventDraft, FinancialTransaction, Household, HouseholdDraft, HouseholdId,
    Program, ProgramDraft, ProgramId, Property, PropertyDraft, PropertyId, Resident,
    ResidentDraft, TransactionDraft, Unit, UnitDraft, UnitId,
};

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Invalid(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Certification filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationQuery {
    pub status: Option<CertificationStatus>,
    pub household_id: Option<HouseholdId>,
    pub program_id: Option<ProgramId>,
    /// Restrict to households living in units of this property.
    pub property_id: Option<PropertyId>,
    pub due_on_or_before: Option<NaiveDate>,
    pub effective_on_or_after: Option<NaiveDate>,
}

impl CertificationQuery {
    pub fn active() -> Self {
        Self {
            status: Some(CertificationStatus::Active),
            ..Self::default()
        }
    }

    pub fn for_household(household_id: HouseholdId) -> Self {
        Self {
            household_id: Some(household_id),
            ..Self::default()
        }
    }

    pub fn in_property(mut self, property_id: Option<PropertyId>) -> Self {
        self.property_id = property_id;
        self
    }

    pub fn due_on_or_before(mut self, date: NaiveDate) -> Self {
        self.due_on_or_before = Some(date);
        self
    }

    pub fn effective_on_or_after(mut self, date: NaiveDate) -> Self {
        self.effective_on_or_after = Some(date);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    pub household_id: Option<HouseholdId>,
    #[serde(default)]
    pub unresolved_only: bool,
}

impl EventQuery {
    pub fn unresolved() -> Self {
        Self {
            household_id: None,
            unresolved_only: true,
        }
    }
}

/// Transaction filter; the date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionQuery {
    pub property_id: Option<PropertyId>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Read contract the analytics layer requires from a store.
///
/// Results are ordered by ascending identity. Implementations backed by a live
/// database should serve every call made during one request from the same
/// transaction or session.
pub trait PortfolioReader {
    fn properties(&self, filter: Option<PropertyId>) -> Result<Vec<Property>, StoreError>;
    fn programs(&self) -> Result<Vec<Program>, StoreError>;
    fn units(&self, property_id: Option<PropertyId>) -> Result<Vec<Unit>, StoreError>;
    fn households(&self, property_id: Option<PropertyId>) -> Result<Vec<Household>, StoreError>;
    /// Derived relation from each occupied unit of a property to its current household.
    fn occupancy(&self, property_id: PropertyId)
        -> Result<BTreeMap<UnitId, HouseholdId>, StoreError>;
    fn certifications(&self, query: &CertificationQuery)
        -> Result<Vec<Certification>, StoreError>;
    fn compliance_events(&self, query: &EventQuery) -> Result<Vec<ComplianceEvent>, StoreError>;
    fn transactions(&self, query: &TransactionQuery)
        -> Result<Vec<FinancialTransaction>, StoreError>;
    fn residents(&self, household_id: HouseholdId) -> Result<Vec<Resident>, StoreError>;

    fn property(&self, id: PropertyId) -> Result<Option<Property>, StoreError>;
    fn unit(&self, id: UnitId) -> Result<Option<Unit>, StoreError>;
    fn household(&self, id: HouseholdId) -> Result<Option<Household>, StoreError>;
    fn program(&self, id: ProgramId) -> Result<Option<Program>, StoreError>;
}

/// Record-management contract used by the HTTP layer; creation is transactional per call.
///
/// Single-record reads go through the [`PortfolioReader`] supertrait against the live
/// tables. Reports that issue several reads take a [`snapshot`](Self::snapshot) first.
pub trait PortfolioStore: PortfolioReader + Send + Sync {
    fn create_property(&self, draft: PropertyDraft) -> Result<Property, StoreError>;
    fn create_unit(&self, draft: UnitDraft) -> Result<Unit, StoreError>;
    fn create_program(&self, draft: ProgramDraft) -> Result<Program, StoreError>;
    fn create_household(&self, draft: HouseholdDraft) -> Result<Household, StoreError>;
    fn create_resident(&self, draft: ResidentDraft) -> Result<Resident, StoreError>;
    fn create_certification(&self, draft: CertificationDraft)
        -> Result<Certification, StoreError>;
    fn create_compliance_event(
        &self,
        draft: ComplianceEventDraft,
    ) -> Result<ComplianceEvent, StoreError>;
    fn create_transaction(&self, draft: TransactionDraft)
        -> Result<FinancialTransaction, StoreError>;

    /// Consistent copy of every table, used to serve one request's reads.
    fn snapshot(&self) -> Result<PortfolioSnapshot, StoreError>;
}

/// Owned, point-in-time copy of every entity table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub properties: Vec<Property>,
    pub units: Vec<Unit>,
    pub programs: Vec<Program>,
    pub households: Vec<Household>,
    pub residents: Vec<Resident>,
    pub certifications: Vec<Certification>,
    pub compliance_events: Vec<ComplianceEvent>,
    pub transactions: Vec<FinancialTransaction>,
}

impl PortfolioSnapshot {
    fn unit_ids_in(&self, property_id: PropertyId) -> BTreeSet<UnitId> {
        self.units
            .iter()
            .filter(|unit| unit.property_id == property_id)
            .map(|unit| unit.id)
            .collect()
    }

    fn household_ids_in(&self, property_id: PropertyId) -> BTreeSet<HouseholdId> {
        let units = self.unit_ids_in(property_id);
        self.households
            .iter()
            .filter(|household| units.contains(&household.unit_id))
            .map(|household| household.id)
            .collect()
    }
}

impl PortfolioReader for PortfolioSnapshot {
    fn properties(&self, filter: Option<PropertyId>) -> Result<Vec<Property>, StoreError> {
        Ok(self
            .properties
            .iter()
            .filter(|property| filter.map_or(true, |id| property.id == id))
            .cloned()
            .collect())
    }

    fn programs(&self) -> Result<Vec<Program>, StoreError> {
        Ok(self.programs.clone())
    }

    fn units(&self, property_id: Option<PropertyId>) -> Result<Vec<Unit>, StoreError> {
        Ok(self
            .units
            .iter()
            .filter(|unit| property_id.map_or(true, |id| unit.property_id == id))
            .cloned()
            .collect())
    }

    fn households(&self, property_id: Option<PropertyId>) -> Result<Vec<Household>, StoreError> {
        let Some(property_id) = property_id else {
            return Ok(self.households.clone());
        };

        let units = self.unit_ids_in(property_id);
        Ok(self
            .households
            .iter()
            .filter(|household| units.contains(&household.unit_id))
            .cloned()
            .collect())
    }

    fn occupancy(
        &self,
        property_id: PropertyId,
    ) -> Result<BTreeMap<UnitId, HouseholdId>, StoreError> {
        let units = self.unit_ids_in(property_id);
        let mut occupancy = BTreeMap::new();
        for household in &self.households {
            if units.contains(&household.unit_id) {
                occupancy.entry(household.unit_id).or_insert(household.id);
            }
        }
        Ok(occupancy)
    }

    fn certifications(
        &self,
        query: &CertificationQuery,
    ) -> Result<Vec<Certification>, StoreError> {
        let households = query
            .property_id
            .map(|property_id| self.household_ids_in(property_id));

        Ok(self
            .certifications
            .iter()
            .filter(|cert| query.status.map_or(true, |status| cert.status == status))
            .filter(|cert| query.household_id.map_or(true, |id| cert.household_id == id))
            .filter(|cert| query.program_id.map_or(true, |id| cert.program_id == id))
            .filter(|cert| {
                households
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&cert.household_id))
            })
            .filter(|cert| {
                query
                    .due_on_or_before
                    .map_or(true, |date| cert.next_due_date <= date)
            })
            .filter(|cert| {
                query
                    .effective_on_or_after
                    .map_or(true, |date| cert.effective_date >= date)
            })
            .cloned()
            .collect())
    }

    fn compliance_events(&self, query: &EventQuery) -> Result<Vec<ComplianceEvent>, StoreError> {
        Ok(self
            .compliance_events
            .iter()
            .filter(|event| query.household_id.map_or(true, |id| event.household_id == id))
            .filter(|event| !query.unresolved_only || event.is_unresolved())
            .cloned()
            .collect())
    }

    fn transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<FinancialTransaction>, StoreError> {
        Ok(self
            .transactions
            .iter()
            .filter(|txn| query.property_id.map_or(true, |id| txn.property_id == id))
            .filter(|txn| query.start.map_or(true, |start| txn.transaction_date >= start))
            .filter(|txn| query.end.map_or(true, |end| txn.transaction_date <= end))
            .cloned()
            .collect())
    }

    fn residents(&self, household_id: HouseholdId) -> Result<Vec<Resident>, StoreError> {
        Ok(self
            .residents
            .iter()
            .filter(|resident| resident.household_id == household_id)
            .cloned()
            .collect())
    }

    fn property(&self, id: PropertyId) -> Result<Option<Property>, StoreError> {
        Ok(self.properties.iter().find(|record| record.id == id).cloned())
    }

    fn unit(&self, id: UnitId) -> Result<Option<Unit>, StoreError> {
        Ok(self.units.iter().find(|record| record.id == id).cloned())
    }

    fn household(&self, id: HouseholdId) -> Result<Option<Household>, StoreError> {
        Ok(self.households.iter().find(|record| record.id == id).cloned())
    }

    fn program(&self, id: ProgramId) -> Result<Option<Program>, StoreError> {
        Ok(self.programs.iter().find(|record| record.id == id).cloned())
    }
}
