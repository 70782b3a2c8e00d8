//! Series preparation: flattens column labels and prunes incomplete rows.

use chrono::{DateTime, Utc};

use crate::error::SignalError;
use crate::models::{Column, ColumnSet, RawPriceTable};

/// Flat, single-level price table. All columns share the timestamp index.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    timestamps: Vec<DateTime<Utc>>,
    columns: Vec<Column>,
}

impl PriceTable {
    /// Builds a table, checking column lengths against the index.
    /// Non-finite values are stored as undefined; on duplicate names the first column wins.
    pub fn new(timestamps: Vec<DateTime<Utc>>, columns: Vec<Column>) -> Result<Self, SignalError> {
        let mut table = Self {
            timestamps,
            columns: Vec::with_capacity(columns.len()),
        };
        for column in columns {
            if table.column(&column.name).is_some() {
                tracing::debug!("Ignoring duplicate {} column", column.name);
                continue;
            }
            table = table.with_column(column.name, column.values)?;
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn require(&self, name: &str) -> Result<&[Option<f64>], SignalError> {
        self.column(name)
            .ok_or_else(|| SignalError::MissingColumn(name.to_string()))
    }

    /// Values of a column that must have no gaps (e.g. after pruning)
    pub fn defined_values(&self, name: &str) -> Result<Vec<f64>, SignalError> {
        self.require(name)?
            .iter()
            .enumerate()
            .map(|(row, value)| {
                value.ok_or_else(|| SignalError::UndefinedValue {
                    column: name.to_string(),
                    row,
                })
            })
            .collect()
    }

    /// Adds a column, replacing any existing column with the same name
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<Self, SignalError> {
        let name = name.into();
        if values.len() != self.len() {
            return Err(SignalError::ShapeMismatch {
                column: name,
                expected: self.len(),
                found: values.len(),
            });
        }

        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column { name, values }),
        }
        Ok(self)
    }

    /// Removes every row with an undefined value in any of `required`.
    /// A table without such rows is returned unchanged.
    pub fn drop_incomplete(self, required: &[&str]) -> Result<Self, SignalError> {
        let required_columns = required
            .iter()
            .map(|name| self.require(name))
            .collect::<Result<Vec<_>, _>>()?;

        let keep: Vec<bool> = (0..self.len())
            .map(|row| required_columns.iter().all(|values| values[row].is_some()))
            .collect();

        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped == 0 {
            return Ok(self);
        }

        tracing::debug!(
            "Dropping {} of {} rows with gaps in {:?}",
            dropped,
            self.len(),
            required
        );

        let PriceTable { timestamps, columns } = self;
        Ok(Self {
            timestamps: retain_rows(timestamps, &keep),
            columns: columns
                .into_iter()
                .map(|c| Column {
                    name: c.name,
                    values: retain_rows(c.values, &keep),
                })
                .collect(),
        })
    }
}

impl From<PriceTable> for RawPriceTable {
    fn from(table: PriceTable) -> Self {
        RawPriceTable {
            timestamps: table.timestamps,
            columns: ColumnSet::Flat(table.columns),
        }
    }
}

/// Collapses two-level labels to their outer field name.
/// When several tickers share a field, the first column wins.
pub fn flatten(raw: RawPriceTable) -> Result<PriceTable, SignalError> {
    let RawPriceTable { timestamps, columns } = raw;

    let columns = match columns {
        ColumnSet::Flat(columns) => columns,
        ColumnSet::Grouped(grouped) => {
            let mut flat: Vec<Column> = Vec::with_capacity(grouped.len());
            for column in grouped {
                if flat.iter().any(|c| c.name == column.field) {
                    tracing::debug!(
                        "Ignoring duplicate {} column for {}",
                        column.field,
                        column.ticker
                    );
                    continue;
                }
                flat.push(Column::new(column.field, column.values));
            }
            flat
        }
    };

    PriceTable::new(timestamps, columns)
}

/// Flatten then prune rows with gaps in `required`. Idempotent.
pub fn prepare(raw: RawPriceTable, required: &[&str]) -> Result<PriceTable, SignalError> {
    flatten(raw)?.drop_incomplete(required)
}

fn retain_rows<T>(values: Vec<T>, keep: &[bool]) -> Vec<T> {
    values
        .into_iter()
        .zip(keep)
        .filter(|(_, keep)| **keep)
        .map(|(value, _)| value)
        .collect()
}
