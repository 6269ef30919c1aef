pub mod d001_financial_overview;
