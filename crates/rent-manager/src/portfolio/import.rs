use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::domain::{PropertyId, TransactionDraft};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read import file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: '{value}' is not a YYYY-MM-DD date")]
    InvalidDate { row: usize, value: String },
}

/// Loads ledger exports (`Date,Category,Amount[,Description][,Source]`) as transaction drafts.
pub struct TransactionImporter;

impl TransactionImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        property_id: PropertyId,
    ) -> Result<Vec<TransactionDraft>, ImportError> {
        let file = File::open(path)?;
        Self::from_reader(file, property_id)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        property_id: PropertyId,
    ) -> Result<Vec<TransactionDraft>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut drafts = Vec::new();

        for (index, record) in csv_reader.deserialize::<LedgerRow>().enumerate() {
            let row = record?;
            let transaction_date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(
                |_| ImportError::InvalidDate {
                    row: index + 1,
                    value: row.date.clone(),
                },
            )?;

            drafts.push(TransactionDraft {
                property_id,
                transaction_date,
                category: row.category,
                kind: None,
                amount: row.amount,
                description: row.description,
                source: row.source.unwrap_or_else(|| "tenant".to_string()),
            });
        }

        Ok(drafts)
    }
}

/// Loads budget expectations (`Category,Amount`) into a category mapping.
pub struct BudgetImporter;

impl BudgetImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, f64>, ImportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<BTreeMap<String, f64>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut budget = BTreeMap::new();

        for record in csv_reader.deserialize::<BudgetRow>() {
            let row = record?;
            *budget.entry(row.category).or_insert(0.0) += row.amount;
        }

        Ok(budget)
    }
}

#[derive(Debug, Deserialize)]
struct LedgerRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(
        rename = "Description",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    description: Option<String>,
    #[serde(rename = "Source", default, deserialize_with = "empty_string_as_none")]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BudgetRow {
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Amount")]
    amount: f64,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::domain::{CategoryKind, FinancialTransaction, TransactionId};

    #[test]
    fn ledger_rows_become_drafts() {
        let csv = "Date,Category,Amount,Description,Source\n\
2025-06-01,revenue-rent,1200.00,June rent,tenant\n\
2025-06-03,expense-maintenance,300,,vendor\n";

        let drafts =
            TransactionImporter::from_reader(csv.as_bytes(), PropertyId(4)).expect("imports");

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].property_id, PropertyId(4));
        assert_eq!(drafts[0].description.as_deref(), Some("June rent"));
        assert!(drafts[1].description.is_none());
        assert_eq!(drafts[1].source, "vendor");

        let stored = FinancialTransaction::from_draft(TransactionId(1), drafts[1].clone());
        assert_eq!(stored.kind, CategoryKind::Expense);
    }

    #[test]
    fn source_defaults_when_column_missing() {
        let csv = "Date,Category,Amount\n2025-06-01,revenue-laundry,80\n";
        let drafts =
            TransactionImporter::from_reader(csv.as_bytes(), PropertyId(1)).expect("imports");
        assert_eq!(drafts[0].source, "tenant");
    }

    #[test]
    fn reports_row_for_bad_dates() {
        let csv = "Date,Category,Amount\n2025-06-01,revenue-rent,1\n06/02/2025,revenue-rent,1\n";

        match TransactionImporter::from_reader(csv.as_bytes(), PropertyId(1)) {
            Err(ImportError::InvalidDate { row, value }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "06/02/2025");
            }
            other => panic!("expected invalid date, got {other:?}"),
        }
    }

    #[test]
    fn budget_rows_sum_repeated_categories() {
        let csv = "Category,Amount\nrevenue-rent,5000\nexpense-admin,400\nexpense-admin,400\n";
        let budget = BudgetImporter::from_reader(csv.as_bytes()).expect("imports");

        assert_eq!(budget.get("revenue-rent"), Some(&5000.0));
        assert_eq!(budget.get("expense-admin"), Some(&800.0));
    }
}
