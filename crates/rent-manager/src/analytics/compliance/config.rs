use serde::{Deserialize, Serialize};

pub const DEFAULT_AREA_MEDIAN_INCOME: f64 = 65_000.0;
pub const DEFAULT_RECERTIFICATION_WINDOW_DAYS: u32 = 30;
pub const DEFAULT_INACTIVITY_MONTHS: u32 = 6;

/// Thresholds applied by the compliance detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSettings {
    /// Reference AMI used to derive program income limits.
    pub area_median_income: f64,
    /// Days ahead of a due date that count as "due soon".
    pub recertification_window_days: u32,
    /// Lookback used when flagging households with no recent certification.
    pub inactivity_months: u32,
}

impl Default for ComplianceSettings {
    fn default() -> Self {
        Self {
            area_median_income: DEFAULT_AREA_MEDIAN_INCOME,
            recertification_window_days: DEFAULT_RECERTIFICATION_WINDOW_DAYS,
            inactivity_months: DEFAULT_INACTIVITY_MONTHS,
        }
    }
}
