use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::domain::{
    Certification, CertificationDraft, ComplianceEvent, ComplianceEventDraft,
    FinancialTransaction, Household, HouseholdDraft, HouseholdId, Program, ProgramDraft,
    Property, PropertyDraft, PropertyId, Resident, ResidentDraft, TransactionDraft, Unit,
    UnitDraft,
};
use super::store::{
    CertificationQuery, EventQuery, PortfolioReader, PortfolioStore, StoreError,
    TransactionQuery,
};
use crate::error::AppError;

type Created<T> = Result<(StatusCode, Json<T>), AppError>;
type Listed<T> = Result<Json<Vec<T>>, AppError>;

/// Router exposing record creation and retrieval for every portfolio entity.
pub fn portfolio_router<S>(store: Arc<S>) -> Router
where
    S: PortfolioStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/properties",
            get(list_properties::<S>).post(create_property::<S>),
        )
        .route("/api/v1/properties/:property_id", get(get_property::<S>))
        .route("/api/v1/units", get(list_units::<S>).post(create_unit::<S>))
        .route(
            "/api/v1/programs",
            get(list_programs::<S>).post(create_program::<S>),
        )
        .route(
            "/api/v1/households",
            get(list_households::<S>).post(create_household::<S>),
        )
        .route("/api/v1/households/:household_id", get(get_household::<S>))
        .route(
            "/api/v1/households/:household_id/residents",
            get(list_residents::<S>).post(create_resident::<S>),
        )
        .route(
            "/api/v1/households/:household_id/certifications",
            get(list_certifications::<S>).post(create_certification::<S>),
        )
        .route(
            "/api/v1/compliance/events",
            get(list_events::<S>).post(create_event::<S>),
        )
        .route(
            "/api/v1/transactions",
            get(list_transactions::<S>).post(create_transaction::<S>),
        )
        .with_state(store)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PropertyFilter {
    pub(crate) property_id: Option<PropertyId>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HouseholdFilter {
    pub(crate) household_id: Option<HouseholdId>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TransactionFilter {
    pub(crate) property_id: Option<PropertyId>,
    pub(crate) start_date: Option<NaiveDate>,
    pub(crate) end_date: Option<NaiveDate>,
}

fn created<T>(record: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(record)))
}

fn require_household<S: PortfolioStore>(
    store: &S,
    household_id: HouseholdId,
) -> Result<Household, AppError> {
    store
        .household(household_id)?
        .ok_or(AppError::Store(StoreError::NotFound("Household")))
}

pub(crate) async fn create_property<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Json(draft): Json<PropertyDraft>,
) -> Created<Property> {
    created(store.create_property(draft)?)
}

pub(crate) async fn list_properties<S: PortfolioStore>(
    State(store): State<Arc<S>>,
) -> Listed<Property> {
    Ok(Json(store.properties(None)?))
}

pub(crate) async fn get_property<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Path(property_id): Path<u64>,
) -> Result<Json<Property>, AppError> {
    store
        .property(PropertyId(property_id))?
        .map(Json)
        .ok_or(AppError::Store(StoreError::NotFound("Property")))
}

pub(crate) async fn create_unit<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Json(draft): Json<UnitDraft>,
) -> Created<Unit> {
    created(store.create_unit(draft)?)
}

pub(crate) async fn list_units<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Query(filter): Query<PropertyFilter>,
) -> Listed<Unit> {
    Ok(Json(store.units(filter.property_id)?))
}

pub(crate) async fn create_program<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Json(draft): Json<ProgramDraft>,
) -> Created<Program> {
    created(store.create_program(draft)?)
}

pub(crate) async fn list_programs<S: PortfolioStore>(
    State(store): State<Arc<S>>,
) -> Listed<Program> {
    Ok(Json(store.programs()?))
}

pub(crate) async fn create_household<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Json(draft): Json<HouseholdDraft>,
) -> Created<Household> {
    created(store.create_household(draft)?)
}

pub(crate) async fn list_households<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Query(filter): Query<PropertyFilter>,
) -> Listed<Household> {
    Ok(Json(store.households(filter.property_id)?))
}

pub(crate) async fn get_household<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Path(household_id): Path<u64>,
) -> Result<Json<Household>, AppError> {
    require_household(store.as_ref(), HouseholdId(household_id)).map(Json)
}

pub(crate) async fn create_resident<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Path(household_id): Path<u64>,
    Json(draft): Json<ResidentDraft>,
) -> Created<Resident> {
    let household = require_household(store.as_ref(), HouseholdId(household_id))?;
    if draft.household_id != household.id {
        return Err(AppError::BadRequest(
            "Household mismatch in payload".to_string(),
        ));
    }
    created(store.create_resident(draft)?)
}

pub(crate) async fn list_residents<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Path(household_id): Path<u64>,
) -> Listed<Resident> {
    let household = require_household(store.as_ref(), HouseholdId(household_id))?;
    Ok(Json(store.residents(household.id)?))
}

pub(crate) async fn create_certification<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Path(household_id): Path<u64>,
    Json(draft): Json<CertificationDraft>,
) -> Created<Certification> {
    let household = require_household(store.as_ref(), HouseholdId(household_id))?;
    if draft.household_id != household.id {
        return Err(AppError::BadRequest(
            "Household mismatch in payload".to_string(),
        ));
    }
    created(store.create_certification(draft)?)
}

pub(crate) async fn list_certifications<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Path(household_id): Path<u64>,
) -> Listed<Certification> {
    let household = require_household(store.as_ref(), HouseholdId(household_id))?;
    let query = CertificationQuery::for_household(household.id);
    Ok(Json(store.certifications(&query)?))
}

pub(crate) async fn create_event<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Json(draft): Json<ComplianceEventDraft>,
) -> Created<ComplianceEvent> {
    created(store.create_compliance_event(draft)?)
}

pub(crate) async fn list_events<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Query(filter): Query<HouseholdFilter>,
) -> Listed<ComplianceEvent> {
    let query = EventQuery {
        household_id: filter.household_id,
        unresolved_only: false,
    };
    Ok(Json(store.compliance_events(&query)?))
}

pub(crate) async fn create_transaction<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Json(draft): Json<TransactionDraft>,
) -> Created<FinancialTransaction> {
    created(store.create_transaction(draft)?)
}

pub(crate) async fn list_transactions<S: PortfolioStore>(
    State(store): State<Arc<S>>,
    Query(filter): Query<TransactionFilter>,
) -> Listed<FinancialTransaction> {
    let query = TransactionQuery {
        property_id: filter.property_id,
        start: filter.start_date,
        end: filter.end_date,
    };
    Ok(Json(store.transactions(&query)?))
}
