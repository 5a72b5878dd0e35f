mod summary;
mod views;

pub use summary::{apply_budget_variance, net_operating_income, CategoryTotal, OperatingSummary};
pub use views::{NoiReport, OccupancyReport, RentProjection};

use tracing::debug;

use crate::analytics::round_cents;
use crate::portfolio::{
    CertificationQuery, PortfolioReader, PropertyId, StoreError, TransactionQuery,
};

/// Per-property occupancy, rent roll, and cash-flow metrics over one portfolio view.
pub struct FinancialAggregator<'a, R> {
    reader: &'a R,
}

impl<'a, R> FinancialAggregator<'a, R>
where
    R: PortfolioReader,
{
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    pub fn occupancy_reports(
        &self,
        property_filter: Option<PropertyId>,
    ) -> Result<Vec<OccupancyReport>, StoreError> {
        let mut reports = Vec::new();
        for property in self.reader.properties(property_filter)? {
            let units = self.reader.units(Some(property.id))?;
            let occupancy = self.reader.occupancy(property.id)?;

            let total_units = units.len();
            let occupied_units = occupancy.len();
            let occupancy_rate = if total_units == 0 {
                0.0
            } else {
                round_cents(occupied_units as f64 / total_units as f64 * 100.0)
            };

            let ami_values: Vec<f64> = units
                .iter()
                .filter(|unit| occupancy.contains_key(&unit.id))
                .filter_map(|unit| unit.ami_percent.map(f64::from))
                .collect();
            let ami_average = if ami_values.is_empty() {
                None
            } else {
                Some(round_cents(
                    ami_values.iter().sum::<f64>() / ami_values.len() as f64,
                ))
            };

            reports.push(OccupancyReport {
                property_id: property.id,
                property_name: property.name,
                total_units,
                occupied_units,
                occupancy_rate,
                ami_average,
            });
        }
        Ok(reports)
    }

    /// Split the active rent roll into tenant and subsidy shares. Shares are not clamped.
    pub fn rent_projection(
        &self,
        property_filter: Option<PropertyId>,
    ) -> Result<Vec<RentProjection>, StoreError> {
        let mut projections = Vec::new();
        for property in self.reader.properties(property_filter)? {
            let query = CertificationQuery::active().in_property(Some(property.id));

            let mut tenant_share = 0.0;
            let mut subsidy_share = 0.0;
            for certification in self.reader.certifications(&query)? {
                tenant_share += certification.tenant_rent;
                subsidy_share += certification.contract_rent - certification.tenant_rent;
            }

            projections.push(RentProjection {
                property_id: property.id,
                property_name: property.name,
                monthly_rent_roll: round_cents(tenant_share + subsidy_share),
                subsidy_share: round_cents(subsidy_share),
                tenant_share: round_cents(tenant_share),
            });
        }
        Ok(projections)
    }

    pub fn operating_summary(
        &self,
        query: &TransactionQuery,
    ) -> Result<OperatingSummary, StoreError> {
        let transactions = self.reader.transactions(query)?;
        debug!(
            transactions = transactions.len(),
            "building operating summary"
        );
        Ok(OperatingSummary::from_transactions(&transactions))
    }

    pub fn noi_report(&self, query: &TransactionQuery) -> Result<NoiReport, StoreError> {
        let summary = self.operating_summary(query)?;
        Ok(NoiReport {
            net_operating_income: net_operating_income(&summary),
            summary,
        })
    }
}
