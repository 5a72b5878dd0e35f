//! Property, tenancy, subsidy, and ledger records and the store contracts that serve them.

pub mod domain;
pub mod import;
pub mod memory;
pub mod router;
pub mod store;

pub use domain::{
    CategoryKind, Certification, CertificationDraft, CertificationId, CertificationStatus,
    ComplianceEvent, ComplianceEventDraft, ComplianceEventId, FinancialTransaction, Household,
    HouseholdDraft, HouseholdId, Program, ProgramDraft, ProgramId, Property, PropertyDraft,
    PropertyId, Resident, ResidentDraft, ResidentId, Severity, TransactionDraft, TransactionId,
    Unit, UnitDraft, UnitId,
};
pub use import::{BudgetImporter, ImportError, TransactionImporter};
pub use memory::InMemoryPortfolioStore;
pub use router::portfolio_router;
pub use store::{
    CertificationQuery, EventQuery, PortfolioReader, PortfolioSnapshot, PortfolioStore,
    StoreError, TransactionQuery,
};
