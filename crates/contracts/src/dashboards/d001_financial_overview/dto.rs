use serde::{Deserialize, Serialize};

/// Response for the financial overview dashboard.
///
/// All figures are sample data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialOverviewResponse {
    /// Total revenue for the displayed range
    pub revenue: f64,
    /// Total expenses for the displayed range
    pub expenses: f64,
    pub profit: f64,
    /// Month-by-month series, oldest first
    pub trend: Vec<TrendPoint>,
    pub discrepancies: Vec<Discrepancy>,
}

/// Single point of the revenue/expense trend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Period label, e.g. "2024-01"
    pub period: String,
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discrepancy {
    pub id: u32,
    /// Date in format "YYYY-MM-DD"
    pub date: String,
    pub amount: f64,
    pub status: DiscrepancyStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscrepancyStatus {
    Pending,
    Resolved,
    #[serde(rename = "Under Review")]
    UnderReview,
}

impl DiscrepancyStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DiscrepancyStatus::Pending => "Pending",
            DiscrepancyStatus::Resolved => "Resolved",
            DiscrepancyStatus::UnderReview => "Under Review",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_uses_display_labels_on_the_wire() {
        let json = serde_json::to_string(&DiscrepancyStatus::UnderReview).unwrap();
        assert_eq!(json, "\"Under Review\"");
        let parsed: DiscrepancyStatus = serde_json::from_str("\"Pending\"").unwrap();
        assert_eq!(parsed, DiscrepancyStatus::Pending);
    }
}
