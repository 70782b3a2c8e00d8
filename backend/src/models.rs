use chrono::{DateTime, Utc};
use serde::Serialize;

pub const CLOSE: &str = "Close";
pub const RSI: &str = "RSI";
pub const EMA: &str = "EMA";

/// A single-level column. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// A column labeled by (field, ticker), as produced by a multi-symbol download
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedColumn {
    pub field: String,
    pub ticker: String,
    pub values: Vec<Option<f64>>,
}

/// Column labeling of a freshly fetched table
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSet {
    Flat(Vec<Column>),
    Grouped(Vec<GroupedColumn>),
}

/// Price table as it arrives from the data-fetch layer, before any cleaning
#[derive(Debug, Clone, PartialEq)]
pub struct RawPriceTable {
    pub timestamps: Vec<DateTime<Utc>>,
    pub columns: ColumnSet,
}

/// One fully defined row of the augmented series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub rsi: f64,
    pub ema: f64,
}
