pub mod d001_financial_overview;

pub use d001_financial_overview::ui::FinancialOverviewDashboard;
