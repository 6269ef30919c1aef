use contracts::dashboards::d001_financial_overview::dto::{
    Discrepancy, DiscrepancyStatus, TrendPoint,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Revenue,
    Expenses,
    Profit,
}

impl Metric {
    pub fn all() -> [Metric; 3] {
        [Metric::Revenue, Metric::Expenses, Metric::Profit]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Revenue => "Revenue",
            Metric::Expenses => "Expenses",
            Metric::Profit => "Profit",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Metric::Revenue => "Revenue Trends",
            Metric::Expenses => "Expense Trends",
            Metric::Profit => "Profit Trends",
        }
    }

    pub fn value(&self, point: &TrendPoint) -> f64 {
        match self {
            Metric::Revenue => point.revenue,
            Metric::Expenses => point.expenses,
            Metric::Profit => point.profit,
        }
    }
}

/// Последнее значение и изменение к предыдущему, %
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSummary {
    pub current: f64,
    pub percent_change: f64,
}

pub fn summarize(values: &[f64]) -> Option<TrendSummary> {
    let current = *values.last()?;
    let previous = values.len().checked_sub(2).map(|i| values[i]).unwrap_or(0.0);
    let percent_change = if previous != 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    };
    Some(TrendSummary {
        current,
        percent_change,
    })
}

/// Последние `months` точек тренда
pub fn last_months(trend: &[TrendPoint], months: usize) -> Vec<TrendPoint> {
    let start = trend.len().saturating_sub(months);
    trend[start..].to_vec()
}

/// Отметить расхождение как решённое (только на клиенте)
pub fn resolve(discrepancies: &mut [Discrepancy], id: u32) {
    if let Some(d) = discrepancies.iter_mut().find(|d| d.id == id) {
        d.status = DiscrepancyStatus::Resolved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(period: &str, revenue: f64, expenses: f64) -> TrendPoint {
        TrendPoint {
            period: period.to_string(),
            revenue,
            expenses,
            profit: revenue - expenses,
        }
    }

    #[test]
    fn test_summarize() {
        let s = summarize(&[100.0, 125.0]).unwrap();
        assert_eq!(s.current, 125.0);
        assert!((s.percent_change - 25.0).abs() < 1e-9);

        let single = summarize(&[80.0]).unwrap();
        assert_eq!(single.percent_change, 0.0);
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_last_months_and_metric() {
        let trend = vec![
            point("2024-01", 10.0, 4.0),
            point("2024-02", 12.0, 5.0),
            point("2024-03", 15.0, 6.0),
        ];
        let recent = last_months(&trend, 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].period, "2024-02");
        assert_eq!(last_months(&trend, 12).len(), 3);

        let profits: Vec<f64> = trend.iter().map(|p| Metric::Profit.value(p)).collect();
        assert_eq!(profits, vec![6.0, 7.0, 9.0]);
    }

    #[test]
    fn test_resolve() {
        let mut list = vec![Discrepancy {
            id: 1,
            date: "2023-04-01".into(),
            amount: 150.75,
            status: DiscrepancyStatus::Pending,
        }];
        resolve(&mut list, 1);
        resolve(&mut list, 99);
        assert_eq!(list[0].status, DiscrepancyStatus::Resolved);
    }
}
