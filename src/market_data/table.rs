// =============================================================================
// Price Table & Close Series
// =============================================================================
//
// A `PriceTable` is a small columnar frame: one ascending timestamp index and
// a list of named `Option<f64>` columns of the same length.  `None` marks a
// missing cell.  Tables are never re-ordered; operations either append
// columns aligned by timestamp or drop whole rows.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Row index type shared by tables, series and raw provider frames.
pub type Timestamp = DateTime<Utc>;

/// The normalized price columns, in canonical order.
pub const PRICE_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// Name of the closing-price column.
pub const CLOSE_COLUMN: &str = "close";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("column '{column}' has {actual} values but the index has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// One named column of a [`PriceTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// PriceTable
// ---------------------------------------------------------------------------

/// Timestamp-indexed table of price bars (and, later, indicator columns).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    index: Vec<Timestamp>,
    columns: Vec<Column>,
}

impl PriceTable {
    /// Build a table from an index and a list of `(name, values)` columns.
    ///
    /// Every column must have exactly as many values as the index.
    pub fn from_columns(
        index: Vec<Timestamp>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self, TableError> {
        let expected = index.len();
        let columns = columns
            .into_iter()
            .map(|(name, values)| {
                if values.len() != expected {
                    return Err(TableError::LengthMismatch {
                        column: name,
                        expected,
                        actual: values.len(),
                    });
                }
                Ok(Column { name, values })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { index, columns })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Values of the column called `name`, if present.
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Extract the `close` column as a dense [`CloseSeries`].
    ///
    /// Returns `None` when there is no `close` column or when any close value
    /// is missing.
    pub fn close_series(&self) -> Option<CloseSeries> {
        let values = self
            .column(CLOSE_COLUMN)?
            .iter()
            .copied()
            .collect::<Option<Vec<f64>>>()?;

        Some(CloseSeries {
            index: self.index.clone(),
            values,
        })
    }

    /// Insert `values` (indexed by `series_index`) as the column `name`,
    /// aligned to this table's index by timestamp.
    ///
    /// Rows whose timestamp does not appear in `series_index` receive `None`.
    /// An existing column with the same name is replaced in place.
    pub fn insert_series(&mut self, name: &str, series_index: &[Timestamp], values: &[Option<f64>]) {
        let positions: HashMap<&Timestamp, usize> = series_index
            .iter()
            .enumerate()
            .map(|(i, ts)| (ts, i))
            .collect();

        let aligned: Vec<Option<f64>> = self
            .index
            .iter()
            .map(|ts| {
                positions
                    .get(ts)
                    .and_then(|&i| values.get(i).copied().flatten())
            })
            .collect();

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = aligned,
            None => self.columns.push(Column {
                name: name.to_string(),
                values: aligned,
            }),
        }
    }

    /// Keep only the rows where every column has a value.
    pub fn drop_incomplete_rows(self) -> Self {
        let keep: Vec<bool> = (0..self.index.len())
            .map(|row| self.columns.iter().all(|c| c.values[row].is_some()))
            .collect();

        let index = self
            .index
            .into_iter()
            .zip(&keep)
            .filter_map(|(ts, &k)| k.then_some(ts))
            .collect();

        let columns = self
            .columns
            .into_iter()
            .map(|c| Column {
                name: c.name,
                values: c
                    .values
                    .into_iter()
                    .zip(&keep)
                    .filter_map(|(v, &k)| k.then_some(v))
                    .collect(),
            })
            .collect();

        Self { index, columns }
    }

    /// Iterate rows as `(timestamp, cells)` where `cells` follows
    /// [`Self::columns`] order.
    pub fn rows(&self) -> impl Iterator<Item = (Timestamp, Vec<Option<f64>>)> + '_ {
        self.index.iter().enumerate().map(move |(row, ts)| {
            let cells = self.columns.iter().map(|c| c.values[row]).collect();
            (*ts, cells)
        })
    }
}

// Serialised as an array of row objects:
//   [{ "timestamp": "...", "open": 1.0, ..., "RSI": 55.2 }, ...]
impl Serialize for PriceTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for row in 0..self.len() {
            seq.serialize_element(&RowView { table: self, row })?;
        }
        seq.end()
    }
}

struct RowView<'a> {
    table: &'a PriceTable,
    row: usize,
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.table.columns.len() + 1))?;
        map.serialize_entry("timestamp", &self.table.index[self.row])?;
        for column in &self.table.columns {
            map.serialize_entry(&column.name, &column.values[self.row])?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// CloseSeries
// ---------------------------------------------------------------------------

/// One-dimensional closing-price series, carrying the timestamps of the table
/// it was extracted from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CloseSeries {
    index: Vec<Timestamp>,
    values: Vec<f64>,
}

impl CloseSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn index(&self) -> &[Timestamp] {
        &self.index
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(minute: i64) -> Timestamp {
        DateTime::from_timestamp(1_700_000_000 + minute * 60, 0).unwrap()
    }

    fn sample() -> PriceTable {
        PriceTable::from_columns(
            vec![ts(0), ts(1), ts(2)],
            vec![
                ("open".into(), vec![Some(1.0), Some(2.0), Some(3.0)]),
                ("close".into(), vec![Some(1.5), Some(2.5), Some(3.5)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn from_columns_rejects_short_column() {
        let err = PriceTable::from_columns(vec![ts(0), ts(1)], vec![("close".into(), vec![Some(1.0)])])
            .unwrap_err();
        assert_eq!(
            err,
            TableError::LengthMismatch {
                column: "close".into(),
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn close_series_matches_close_column() {
        let table = sample();
        let close = table.close_series().unwrap();
        assert_eq!(close.len(), table.len());
        assert_eq!(close.values(), &[1.5, 2.5, 3.5]);
        assert_eq!(close.index(), table.index());
    }

    #[test]
    fn close_series_none_when_close_missing() {
        let table = PriceTable::from_columns(
            vec![ts(0), ts(1)],
            vec![("close".into(), vec![Some(1.0), None])],
        )
        .unwrap();
        assert!(table.close_series().is_none());
    }

    #[test]
    fn insert_series_aligns_by_timestamp() {
        let mut table = sample();
        // Series covers an extra leading row the table doesn't have, and
        // misses the table's last row.
        table.insert_series("x", &[ts(-1), ts(0), ts(1)], &[Some(9.0), Some(10.0), None]);
        assert_eq!(table.column("x").unwrap(), &[Some(10.0), None, None]);
    }

    #[test]
    fn insert_series_replaces_existing_column() {
        let mut table = sample();
        let index = table.index().to_vec();
        table.insert_series("open", &index, &[Some(7.0); 3]);
        assert_eq!(table.column_names(), vec!["open", "close"]);
        assert_eq!(table.column("open").unwrap(), &[Some(7.0); 3]);
    }

    #[test]
    fn drop_incomplete_rows_removes_any_missing() {
        let mut table = sample();
        table.insert_series("x", &[ts(1), ts(2)], &[Some(1.0), Some(2.0)]);
        let table = table.drop_incomplete_rows();
        assert_eq!(table.index(), &[ts(1), ts(2)]);
        assert_eq!(table.column("open").unwrap(), &[Some(2.0), Some(3.0)]);
    }

    #[test]
    fn serializes_as_row_objects() {
        let json = serde_json::to_value(sample()).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["close"], 1.5);
        assert!(rows[0]["timestamp"].is_string());
    }
}
