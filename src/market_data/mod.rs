pub mod frame;
pub mod table;

// Re-export the table types for convenient access (e.g. `use crate::market_data::PriceTable`).
pub use frame::{normalize, ColumnLabel, NormalizeError, RawFrame};
pub use table::{CloseSeries, Column, PriceTable, TableError, Timestamp, CLOSE_COLUMN, PRICE_COLUMNS};
