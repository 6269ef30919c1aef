use contracts::dashboards::d001_financial_overview::dto::FinancialOverviewResponse;
use gloo_net::http::Request;

use crate::shared::api_utils::api_url;

/// Получить сводку для финансового дашборда
pub async fn get_financial_overview() -> Result<FinancialOverviewResponse, String> {
    let response = Request::get(&api_url("/api/d001/financial-overview"))
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.ok() {
        return Err(format!("HTTP error: {}", response.status()));
    }

    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}
