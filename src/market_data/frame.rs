// =============================================================================
// Raw provider frames and shape normalization
// =============================================================================
//
// Providers hand back a `RawFrame`: a timestamp index plus labelled columns,
// where a label may be single-level ("Close") or two-level
// (["Close", "BTC-USD"]).  `normalize` turns that into a `PriceTable` with
// exactly the lower-case columns open/high/low/close/volume.
//
// Steps:
//   1. Collapse two-level labels to their top-level label.
//   2. Lower-case every label.
//   3. Reject empty frames and frames missing a required column.
//   4. Drop bars with no prices at all and bars with no close.
//   5. Enforce a strictly ascending index (a repeated timestamp keeps the
//      later bar; a timestamp going backwards is an error).
// =============================================================================

use thiserror::Error;
use tracing::debug;

use super::table::{PriceTable, TableError, Timestamp, CLOSE_COLUMN, PRICE_COLUMNS};

/// Column label as delivered by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnLabel {
    Single(String),
    /// Hierarchical label, outermost level first.
    Multi(Vec<String>),
}

impl ColumnLabel {
    /// The outermost label.
    pub fn top_level(&self) -> &str {
        match self {
            Self::Single(name) => name,
            Self::Multi(levels) => levels.first().map(String::as_str).unwrap_or(""),
        }
    }
}

/// Un-normalized table as returned by a [`MarketDataProvider`](crate::provider::MarketDataProvider).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    pub index: Vec<Timestamp>,
    pub columns: Vec<(ColumnLabel, Vec<Option<f64>>)>,
}

impl RawFrame {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// `true` when any column carries a hierarchical label.
    pub fn is_multi_level(&self) -> bool {
        self.columns
            .iter()
            .any(|(label, _)| matches!(label, ColumnLabel::Multi(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("provider returned no rows")]
    Empty,

    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),

    #[error(transparent)]
    Shape(#[from] TableError),

    #[error("timestamps out of order: {next} follows {previous}")]
    OutOfOrder {
        previous: Timestamp,
        next: Timestamp,
    },
}

/// Normalize a provider frame into a [`PriceTable`].
pub fn normalize(frame: RawFrame) -> Result<PriceTable, NormalizeError> {
    if frame.is_multi_level() {
        debug!("collapsing multi-level column labels");
    }

    let RawFrame { index, columns } = frame;
    let rows = index.len();

    for (label, values) in &columns {
        if values.len() != rows {
            return Err(TableError::LengthMismatch {
                column: label.top_level().to_string(),
                expected: rows,
                actual: values.len(),
            }
            .into());
        }
    }

    let mut named: Vec<(String, Vec<Option<f64>>)> = columns
        .into_iter()
        .map(|(label, values)| (label.top_level().to_lowercase(), values))
        .collect();

    if rows == 0 {
        return Err(NormalizeError::Empty);
    }

    // Pick the first column of each required name, in canonical order.
    let mut selected: Vec<(String, Vec<Option<f64>>)> = Vec::with_capacity(PRICE_COLUMNS.len());
    for name in PRICE_COLUMNS {
        let pos = named
            .iter()
            .position(|(n, _)| n == name)
            .ok_or(NormalizeError::MissingColumn(name))?;
        selected.push(named.swap_remove(pos));
    }
    if !named.is_empty() {
        debug!(
            dropped = ?named.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            "ignoring extra provider columns"
        );
    }

    let keep = usable_rows(&index, &selected)?;
    let kept = keep.iter().filter(|&&k| k).count();
    if kept < rows {
        debug!(dropped = rows - kept, "dropped unusable bars");
    }
    if kept == 0 {
        return Err(NormalizeError::Empty);
    }

    let index = filter_by(index, &keep);
    let selected = selected
        .into_iter()
        .map(|(name, values)| (name, filter_by(values, &keep)))
        .collect();

    Ok(PriceTable::from_columns(index, selected)?)
}

/// Decide which rows survive normalization.
fn usable_rows(
    index: &[Timestamp],
    columns: &[(String, Vec<Option<f64>>)],
) -> Result<Vec<bool>, NormalizeError> {
    let close = columns
        .iter()
        .find(|(n, _)| n == CLOSE_COLUMN)
        .map(|(_, v)| v.as_slice())
        .ok_or(NormalizeError::MissingColumn(CLOSE_COLUMN))?;
    let prices: Vec<&[Option<f64>]> = columns
        .iter()
        .filter(|(n, _)| n != "volume")
        .map(|(_, v)| v.as_slice())
        .collect();

    let mut keep: Vec<bool> = (0..index.len())
        .map(|row| close[row].is_some() && prices.iter().any(|col| col[row].is_some()))
        .collect();

    // Ordering over the surviving rows only.
    let mut last: Option<usize> = None;
    for row in 0..index.len() {
        if !keep[row] {
            continue;
        }
        if let Some(prev) = last {
            if index[row] == index[prev] {
                // In-progress bar re-reported; the later one wins.
                keep[prev] = false;
            } else if index[row] < index[prev] {
                return Err(NormalizeError::OutOfOrder {
                    previous: index[prev],
                    next: index[row],
                });
            }
        }
        last = Some(row);
    }

    Ok(keep)
}

fn filter_by<T>(values: Vec<T>, keep: &[bool]) -> Vec<T> {
    values
        .into_iter()
        .zip(keep)
        .filter_map(|(v, &k)| k.then_some(v))
        .collect()
}
