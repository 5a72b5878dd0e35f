use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier assigned to a property by the store.
    PropertyId
);
record_id!(UnitId);
record_id!(ProgramId);
record_id!(HouseholdId);
record_id!(ResidentId);
record_id!(CertificationId);
record_id!(ComplianceEventId);
record_id!(TransactionId);

fn default_property_type() -> String {
    "Affordable".to_string()
}

fn default_unit_status() -> String {
    "Vacant".to_string()
}

fn default_transaction_source() -> String {
    "tenant".to_string()
}

/// Creation payload for an affordable housing property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDraft {
    pub name: String,
    pub code: String,
    #[serde(rename = "type", default = "default_property_type")]
    pub property_type: String,
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default)]
    pub total_units: Option<u32>,
    #[serde(default)]
    pub property_manager: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub total_units: Option<u32>,
    pub property_manager: Option<String>,
}

impl Property {
    pub fn from_draft(id: PropertyId, draft: PropertyDraft) -> Self {
        Self {
            id,
            name: draft.name,
            code: draft.code,
            property_type: draft.property_type,
            address_line1: draft.address_line1,
            city: draft.city,
            state: draft.state,
            postal_code: draft.postal_code,
            total_units: draft.total_units,
            property_manager: draft.property_manager,
        }
    }
}

/// Creation payload for a physical unit inside a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDraft {
    pub property_id: PropertyId,
    pub number: String,
    pub bedrooms: u8,
    pub bathrooms: f32,
    #[serde(default)]
    pub square_feet: Option<u32>,
    /// Affordability tier expressed as a percentage of area median income.
    #[serde(default)]
    pub ami_percent: Option<u8>,
    #[serde(default = "default_unit_status")]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub property_id: PropertyId,
    pub number: String,
    pub bedrooms: u8,
    pub bathrooms: f32,
    pub square_feet: Option<u32>,
    pub ami_percent: Option<u8>,
    pub status: String,
}

impl Unit {
    pub fn from_draft(id: UnitId, draft: UnitDraft) -> Self {
        Self {
            id,
            property_id: draft.property_id,
            number: draft.number,
            bedrooms: draft.bedrooms,
            bathrooms: draft.bathrooms,
            square_feet: draft.square_feet,
            ami_percent: draft.ami_percent,
            status: draft.status,
        }
    }
}

/// Creation payload for a subsidy or affordability program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDraft {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub funding_source: Option<String>,
    /// AMI percentage cap for eligibility (0-120).
    pub income_limit_percent: u8,
    #[serde(default)]
    pub rent_limit_percent: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub category: String,
    pub funding_source: Option<String>,
    pub income_limit_percent: u8,
    pub rent_limit_percent: Option<u8>,
}

impl Program {
    pub const MAX_LIMIT_PERCENT: u8 = 120;

    pub fn from_draft(id: ProgramId, draft: ProgramDraft) -> Self {
        Self {
            id,
            name: draft.name,
            category: draft.category,
            funding_source: draft.funding_source,
            income_limit_percent: draft.income_limit_percent,
            rent_limit_percent: draft.rent_limit_percent,
        }
    }
}

/// Creation payload for a household leasing a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdDraft {
    pub unit_id: UnitId,
    pub name: String,
    pub move_in_date: NaiveDate,
    pub annual_income: f64,
    pub household_size: u8,
    #[serde(default)]
    pub voucher_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub id: HouseholdId,
    pub unit_id: UnitId,
    pub name: String,
    pub move_in_date: NaiveDate,
    pub annual_income: f64,
    pub household_size: u8,
    pub voucher_type: Option<String>,
}

impl Household {
    pub fn from_draft(id: HouseholdId, draft: HouseholdDraft) -> Self {
        Self {
            id,
            unit_id: draft.unit_id,
            name: draft.name,
            move_in_date: draft.move_in_date,
            annual_income: draft.annual_income,
            household_size: draft.household_size,
            voucher_type: draft.voucher_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentDraft {
    pub household_id: HouseholdId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub relationship: String,
    #[serde(default)]
    pub disability_status: Option<String>,
    #[serde(default)]
    pub monthly_income: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resident {
    pub id: ResidentId,
    pub household_id: HouseholdId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub relationship: String,
    pub disability_status: Option<String>,
    pub monthly_income: Option<f64>,
}

impl Resident {
    pub fn from_draft(id: ResidentId, draft: ResidentDraft) -> Self {
        Self {
            id,
            household_id: draft.household_id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            date_of_birth: draft.date_of_birth,
            relationship: draft.relationship,
            disability_status: draft.disability_status,
            monthly_income: draft.monthly_income,
        }
    }
}

/// Lifecycle state of a certification. Only `Active` certifications feed analytics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertificationStatus {
    #[default]
    Active,
    Pending,
    Expired,
    Terminated,
}


/// Creation payload for a household's program certification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationDraft {
    pub household_id: HouseholdId,
    pub program_id: ProgramId,
    pub effective_date: NaiveDate,
    pub next_due_date: NaiveDate,
    pub household_income: f64,
    pub contract_rent: f64,
    pub tenant_rent: f64,
    pub utility_allowance: f64,
    #[serde(default)]
    pub status: CertificationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub id: CertificationId,
    pub household_id: HouseholdId,
    pub program_id: ProgramId,
    pub effective_date: NaiveDate,
    pub next_due_date: NaiveDate,
    pub household_income: f64,
    pub contract_rent: f64,
    pub tenant_rent: f64,
    pub utility_allowance: f64,
    pub status: CertificationStatus,
}

impl Certification {
    pub fn from_draft(id: CertificationId, draft: CertificationDraft) -> Self {
        Self {
            id,
            household_id: draft.household_id,
            program_id: draft.program_id,
            effective_date: draft.effective_date,
            next_due_date: draft.next_due_date,
            household_income: draft.household_income,
            contract_rent: draft.contract_rent,
            tenant_rent: draft.tenant_rent,
            utility_allowance: draft.utility_allowance,
            status: draft.status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Creation payload for an audit finding recorded against a household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceEventDraft {
    pub household_id: HouseholdId,
    pub program_id: ProgramId,
    pub event_type: String,
    pub finding: String,
    pub severity: Severity,
    pub occurred_on: NaiveDate,
    #[serde(default)]
    pub resolved_on: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceEvent {
    pub id: ComplianceEventId,
    pub household_id: HouseholdId,
    pub program_id: ProgramId,
    pub event_type: String,
    pub finding: String,
    pub severity: Severity,
    pub occurred_on: NaiveDate,
    pub resolved_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl ComplianceEvent {
    pub fn from_draft(id: ComplianceEventId, draft: ComplianceEventDraft) -> Self {
        Self {
            id,
            household_id: draft.household_id,
            program_id: draft.program_id,
            event_type: draft.event_type,
            finding: draft.finding,
            severity: draft.severity,
            occurred_on: draft.occurred_on,
            resolved_on: draft.resolved_on,
            notes: draft.notes,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        self.resolved_on.is_none()
    }
}

/// Accounting treatment of a transaction category, fixed when the transaction is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Revenue,
    Expense,
    Other,
}

impl CategoryKind {
    /// Classify a category by its `revenue*` / `expense*` prefix, ignoring case.
    /// Leading whitespace is part of the category, so `" revenue"` is `Other`.
    pub fn classify(category: &str) -> Self {
        let lowered = category.to_ascii_lowercase();
        if lowered.starts_with("revenue") {
            Self::Revenue
        } else if lowered.starts_with("expense") {
            Self::Expense
        } else {
            Self::Other
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::Expense => "Expense",
            Self::Other => "Other",
        }
    }
}

/// Creation payload for a revenue or expense entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub property_id: PropertyId,
    pub transaction_date: NaiveDate,
    pub category: String,
    /// Explicit accounting kind; classified from `category` when omitted.
    #[serde(default)]
    pub kind: Option<CategoryKind>,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_transaction_source")]
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialTransaction {
    pub id: TransactionId,
    pub property_id: PropertyId,
    pub transaction_date: NaiveDate,
    pub category: String,
    pub kind: CategoryKind,
    pub amount: f64,
    pub description: Option<String>,
    pub source: String,
}

impl FinancialTransaction {
    pub fn from_draft(id: TransactionId, draft: TransactionDraft) -> Self {
        let kind = draft
            .kind
            .unwrap_or_else(|| CategoryKind::classify(&draft.category));

        Self {
            id,
            property_id: draft.property_id,
            transaction_date: draft.transaction_date,
            category: draft.category,
            kind,
            amount: draft.amount,
            description: draft.description,
            source: draft.source,
        }
    }
}
