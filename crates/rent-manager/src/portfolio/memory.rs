use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::{
    Certification, CertificationDraft, CertificationId, ComplianceEvent, ComplianceEventDraft,
    ComplianceEventId, FinancialTransaction, Household, HouseholdDraft, HouseholdId, Program,
    ProgramDraft, ProgramId, Property, PropertyDraft, PropertyId, Resident, ResidentDraft,
    ResidentId, TransactionDraft, TransactionId, Unit, UnitDraft, UnitId,
};
use super::store::{
    CertificationQuery, EventQuery, PortfolioReader, PortfolioSnapshot, PortfolioStore,
    StoreError, TransactionQuery,
};

#[derive(Debug, Default)]
struct Sequences {
    property: u64,
    unit: u64,
    program: u64,
    household: u64,
    resident: u64,
    certification: u64,
    event: u64,
    transaction: u64,
}

fn next(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default)]
struct StoreState {
    tables: PortfolioSnapshot,
    sequences: Sequences,
}

impl StoreState {
    fn require_property(&self, id: PropertyId) -> Result<(), StoreError> {
        if self.tables.properties.iter().any(|record| record.id == id) {
            Ok(())
        } else {
            Err(StoreError::NotFound("Property"))
        }
    }

    fn require_unit(&self, id: UnitId) -> Result<(), StoreError> {
        if self.tables.units.iter().any(|record| record.id == id) {
            Ok(())
        } else {
            Err(StoreError::NotFound("Unit"))
        }
    }

    fn require_household(&self, id: HouseholdId) -> Result<(), StoreError> {
        if self.tables.households.iter().any(|record| record.id == id) {
            Ok(())
        } else {
            Err(StoreError::NotFound("Household"))
        }
    }

    fn require_program(&self, id: ProgramId) -> Result<(), StoreError> {
        if self.tables.programs.iter().any(|record| record.id == id) {
            Ok(())
        } else {
            Err(StoreError::NotFound("Program"))
        }
    }
}

/// Mutex-guarded store used by the service and tests. Ids are assigned sequentially per table.
#[derive(Debug, Default)]
pub struct InMemoryPortfolioStore {
    state: Mutex<StoreState>,
}

impl InMemoryPortfolioStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("portfolio store lock poisoned".to_string()))
    }
}

impl PortfolioReader for InMemoryPortfolioStore {
    fn properties(&self, filter: Option<PropertyId>) -> Result<Vec<Property>, StoreError> {
        self.lock()?.tables.properties(filter)
    }

    fn programs(&self) -> Result<Vec<Program>, StoreError> {
        self.lock()?.tables.programs()
    }

    fn units(&self, property_id: Option<PropertyId>) -> Result<Vec<Unit>, StoreError> {
        self.lock()?.tables.units(property_id)
    }

    fn households(&self, property_id: Option<PropertyId>) -> Result<Vec<Household>, StoreError> {
        self.lock()?.tables.households(property_id)
    }

    fn occupancy(
        &self,
        property_id: PropertyId,
    ) -> Result<BTreeMap<UnitId, HouseholdId>, StoreError> {
        self.lock()?.tables.occupancy(property_id)
    }

    fn certifications(
        &self,
        query: &CertificationQuery,
    ) -> Result<Vec<Certification>, StoreError> {
        self.lock()?.tables.certifications(query)
    }

    fn compliance_events(&self, query: &EventQuery) -> Result<Vec<ComplianceEvent>, StoreError> {
        self.lock()?.tables.compliance_events(query)
    }

    fn transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<FinancialTransaction>, StoreError> {
        self.lock()?.tables.transactions(query)
    }

    fn residents(&self, household_id: HouseholdId) -> Result<Vec<Resident>, StoreError> {
        self.lock()?.tables.residents(household_id)
    }

    fn property(&self, id: PropertyId) -> Result<Option<Property>, StoreError> {
        self.lock()?.tables.property(id)
    }

    fn unit(&self, id: UnitId) -> Result<Option<Unit>, StoreError> {
        self.lock()?.tables.unit(id)
    }

    fn household(&self, id: HouseholdId) -> Result<Option<Household>, StoreError> {
        self.lock()?.tables.household(id)
    }

    fn program(&self, id: ProgramId) -> Result<Option<Program>, StoreError> {
        self.lock()?.tables.program(id)
    }
}

impl PortfolioStore for InMemoryPortfolioStore {
    fn create_property(&self, draft: PropertyDraft) -> Result<Property, StoreError> {
        let mut state = self.lock()?;
        if state
            .tables
            .properties
            .iter()
            .any(|existing| existing.code == draft.code)
        {
            return Err(StoreError::Conflict(
                "Property code already exists".to_string(),
            ));
        }

        let id = PropertyId(next(&mut state.sequences.property));
        let record = Property::from_draft(id, draft);
        state.tables.properties.push(record.clone());
        Ok(record)
    }

    fn create_unit(&self, draft: UnitDraft) -> Result<Unit, StoreError> {
        let mut state = self.lock()?;
        state.require_property(draft.property_id)?;

        let id = UnitId(next(&mut state.sequences.unit));
        let record = Unit::from_draft(id, draft);
        state.tables.units.push(record.clone());
        Ok(record)
    }

    fn create_program(&self, draft: ProgramDraft) -> Result<Program, StoreError> {
        let within_cap = |percent: u8| percent <= Program::MAX_LIMIT_PERCENT;
        if !within_cap(draft.income_limit_percent) {
            return Err(StoreError::Invalid(format!(
                "income_limit_percent must be between 0 and {}",
                Program::MAX_LIMIT_PERCENT
            )));
        }
        if !draft.rent_limit_percent.map_or(true, within_cap) {
            return Err(StoreError::Invalid(format!(
                "rent_limit_percent must be between 0 and {}",
                Program::MAX_LIMIT_PERCENT
            )));
        }

        let mut state = self.lock()?;
        let id = ProgramId(next(&mut state.sequences.program));
        let record = Program::from_draft(id, draft);
        state.tables.programs.push(record.clone());
        Ok(record)
    }

    fn create_household(&self, draft: HouseholdDraft) -> Result<Household, StoreError> {
        let mut state = self.lock()?;
        state.require_unit(draft.unit_id)?;
        if state
            .tables
            .households
            .iter()
            .any(|existing| existing.unit_id == draft.unit_id)
        {
            return Err(StoreError::Conflict("Unit already occupied".to_string()));
        }

        let id = HouseholdId(next(&mut state.sequences.household));
        let record = Household::from_draft(id, draft);
        state.tables.households.push(record.clone());
        Ok(record)
    }

    fn create_resident(&self, draft: ResidentDraft) -> Result<Resident, StoreError> {
        let mut state = self.lock()?;
        state.require_household(draft.household_id)?;

        let id = ResidentId(next(&mut state.sequences.resident));
        let record = Resident::from_draft(id, draft);
        state.tables.residents.push(record.clone());
        Ok(record)
    }

    fn create_certification(
        &self,
        draft: CertificationDraft,
    ) -> Result<Certification, StoreError> {
        let mut state = self.lock()?;
        state.require_household(draft.household_id)?;
        state.require_program(draft.program_id)?;

        let id = CertificationId(next(&mut state.sequences.certification));
        let record = Certification::from_draft(id, draft);
        state.tables.certifications.push(record.clone());
        Ok(record)
    }

    fn create_compliance_event(
        &self,
        draft: ComplianceEventDraft,
    ) -> Result<ComplianceEvent, StoreError> {
        let mut state = self.lock()?;
        state.require_household(draft.household_id)?;
        state.require_program(draft.program_id)?;

        let id = ComplianceEventId(next(&mut state.sequences.event));
        let record = ComplianceEvent::from_draft(id, draft);
        state.tables.compliance_events.push(record.clone());
        Ok(record)
    }

    fn create_transaction(
        &self,
        draft: TransactionDraft,
    ) -> Result<FinancialTransaction, StoreError> {
        let mut state = self.lock()?;
        state.require_property(draft.property_id)?;

        let id = TransactionId(next(&mut state.sequences.transaction));
        let record = FinancialTransaction::from_draft(id, draft);
        state.tables.transactions.push(record.clone());
        Ok(record)
    }

    fn snapshot(&self) -> Result<PortfolioSnapshot, StoreError> {
        Ok(self.lock()?.tables.clone())
    }
}
