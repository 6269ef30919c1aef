use contracts::dashboards::d001_financial_overview::dto::{
    Discrepancy, DiscrepancyStatus, FinancialOverviewResponse, TrendPoint,
};

/// Помесячные выручка и расходы (демонстрационные данные)
const MONTHLY_FIGURES: &[(&str, f64, f64)] = &[
    ("2024-01", 12_500.00, 8_200.00),
    ("2024-02", 13_800.00, 8_900.00),
    ("2024-03", 15_200.00, 9_400.00),
    ("2024-04", 14_100.00, 9_800.00),
    ("2024-05", 16_700.00, 10_300.00),
    ("2024-06", 18_900.00, 11_200.00),
];

/// Сводка для дашборда: итоги, тренд и расхождения
pub fn get_financial_overview() -> FinancialOverviewResponse {
    let trend: Vec<TrendPoint> = MONTHLY_FIGURES
        .iter()
        .map(|(period, revenue, expenses)| TrendPoint {
            period: period.to_string(),
            revenue: *revenue,
            expenses: *expenses,
            profit: round_cents(revenue - expenses),
        })
        .collect();

    let revenue = round_cents(trend.iter().map(|p| p.revenue).sum());
    let expenses = round_cents(trend.iter().map(|p| p.expenses).sum());

    FinancialOverviewResponse {
        revenue,
        expenses,
        profit: round_cents(revenue - expenses),
        trend,
        discrepancies: sample_discrepancies(),
    }
}

fn sample_discrepancies() -> Vec<Discrepancy> {
    [
        (1, "2023-04-01", 150.75, DiscrepancyStatus::Pending),
        (2, "2023-04-02", 75.50, DiscrepancyStatus::Resolved),
        (3, "2023-04-05", 210.25, DiscrepancyStatus::UnderReview),
    ]
    .into_iter()
    .map(|(id, date, amount, status)| Discrepancy {
        id,
        date: date.to_string(),
        amount,
        status,
    })
    .collect()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_match_trend() {
        let overview = get_financial_overview();
        assert_eq!(overview.trend.len(), 6);
        assert_eq!(overview.revenue, 91_200.00);
        assert_eq!(overview.expenses, 57_800.00);
        assert_eq!(overview.profit, 33_400.00);
        for point in &overview.trend {
            assert_eq!(point.profit, round_cents(point.revenue - point.expenses));
        }
    }

    #[test]
    fn test_discrepancies_cover_every_status() {
        let overview = get_financial_overview();
        let statuses: Vec<_> = overview.discrepancies.iter().map(|d| d.status).collect();
        assert_eq!(
            statuses,
            vec![
                DiscrepancyStatus::Pending,
                DiscrepancyStatus::Resolved,
                DiscrepancyStatus::UnderReview
            ]
        );
    }
}
