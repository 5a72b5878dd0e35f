use serde::Serialize;

use super::summary::OperatingSummary;
use crate::portfolio::PropertyId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyReport {
    pub property_id: PropertyId,
    pub property_name: String,
    pub total_units: usize,
    pub occupied_units: usize,
    pub occupancy_rate: f64,
    pub ami_average: Option<f64>,
}

/// Monthly rent roll split into the tenant-paid and subsidy-paid portions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentProjection {
    pub property_id: PropertyId,
    pub property_name: String,
    pub monthly_rent_roll: f64,
    pub subsidy_share: f64,
    pub tenant_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoiReport {
    pub net_operating_income: f64,
    pub summary: OperatingSummary,
}
