use axum::Json;
use contracts::dashboards::d001_financial_overview::dto::FinancialOverviewResponse;

use crate::dashboards::d001_financial_overview::service;

/// GET /api/d001/financial-overview
pub async fn get_financial_overview() -> Json<FinancialOverviewResponse> {
    let response = service::get_financial_overview();
    tracing::info!(
        "D001 Dashboard: Returning {} trend points and {} discrepancies",
        response.trend.len(),
        response.discrepancies.len()
    );
    Json(response)
}
