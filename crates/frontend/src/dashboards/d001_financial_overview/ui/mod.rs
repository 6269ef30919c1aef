mod dashboard;

pub use dashboard::FinancialOverviewDashboard;
