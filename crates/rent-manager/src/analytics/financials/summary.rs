use std::collections::{BTreeMap, BTreeSet};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::analytics::round_cents;
use crate::portfolio::{CategoryKind, FinancialTransaction};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTotal {
    pub kind: CategoryKind,
    pub total: f64,
}

/// Transaction totals keyed by exact category string.
///
/// Revenue and expense totals follow each transaction's own kind, so a category
/// holding both kinds contributes to both sides. The per-category `kind` is the
/// kind of the first transaction seen for it and only labels the row.
/// Serializes as a plain `{category: total}` object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatingSummary {
    categories: BTreeMap<String, CategoryTotal>,
    revenue: f64,
    expenses: f64,
}

impl OperatingSummary {
    pub fn from_transactions<'t, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'t FinancialTransaction>,
    {
        let mut summary = Self::default();
        for transaction in transactions {
            summary
                .categories
                .entry(transaction.category.clone())
                .or_insert(CategoryTotal {
                    kind: transaction.kind,
                    total: 0.0,
                })
                .total += transaction.amount;
            summary.add_to_kind(transaction.kind, transaction.amount);
        }

        for entry in summary.categories.values_mut() {
            entry.total = round_cents(entry.total);
        }
        summary
    }

    /// Build a summary from plain totals, classifying each category by its prefix.
    pub fn from_totals<I, K>(totals: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut summary = Self::default();
        for (category, total) in totals {
            let category: String = category.into();
            let kind = CategoryKind::classify(&category);
            summary.add_to_kind(kind, total);
            summary
                .categories
                .entry(category)
                .or_insert(CategoryTotal { kind, total: 0.0 })
                .total += total;
        }
        summary
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.categories.get(category).map(|entry| entry.total)
    }

    pub fn kind_of(&self, category: &str) -> Option<CategoryKind> {
        self.categories.get(category).map(|entry| entry.kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryTotal)> {
        self.categories
            .iter()
            .map(|(category, entry)| (category.as_str(), entry))
    }

    pub fn totals(&self) -> BTreeMap<String, f64> {
        self.categories
            .iter()
            .map(|(category, entry)| (category.clone(), entry.total))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    fn add_to_kind(&mut self, kind: CategoryKind, amount: f64) {
        match kind {
            CategoryKind::Revenue => self.revenue += amount,
            CategoryKind::Expense => self.expenses += amount,
            CategoryKind::Other => {}
        }
    }
}

impl Serialize for OperatingSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (category, entry) in &self.categories {
            map.serialize_entry(category, &entry.total)?;
        }
        map.end()
    }
}

/// Revenue minus expenses; amounts of kind `Other` do not contribute.
pub fn net_operating_income(summary: &OperatingSummary) -> f64 {
    round_cents(summary.revenue - summary.expenses)
}

/// Actual minus budget for every category in either mapping; missing sides count as zero.
pub fn apply_budget_variance(
    actuals: &BTreeMap<String, f64>,
    budget: &BTreeMap<String, f64>,
) -> BTreeMap<String, f64> {
    let keys: BTreeSet<&String> = actuals.keys().chain(budget.keys()).collect();
    keys.into_iter()
        .map(|key| {
            let actual = actuals.get(key).copied().unwrap_or(0.0);
            let expected = budget.get(key).copied().unwrap_or(0.0);
            (key.clone(), round_cents(actual - expected))
        })
        .collect()
}
