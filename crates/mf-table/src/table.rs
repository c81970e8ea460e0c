//! Column-typed tables.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{TableError, TableResult};
use crate::series::Series;

/// Logical type tag carried by every column.
///
/// Tags are preserved by selection, dropping, and concatenation; the
/// engine never rewrites them. Components that change a column's
/// meaning are expected to retag it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Continuous numeric values.
    Double,
    /// Whole-number values.
    Integer,
    /// True/false values stored as 0.0/1.0.
    Boolean,
    /// Category codes; the mapping to labels is component state.
    Categorical,
}

/// A single named, typed column. Missing values are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    ctype: ColumnType,
    values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, ctype: ColumnType, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            ctype,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.ctype
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Same data under a new name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// An ordered collection of uniquely named, length-consistent columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    columns: Vec<Column>,
}

impl DataTable {
    /// Build a table, validating that all columns share one length and
    /// that no name repeats.
    pub fn new(columns: Vec<Column>) -> TableResult<Self> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            for column in &columns {
                if column.len() != expected {
                    return Err(TableError::LengthMismatch {
                        name: column.name().to_string(),
                        len: column.len(),
                        expected,
                    });
                }
            }
        }
        let mut seen = BTreeSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(TableError::DuplicateColumn {
                    name: column.name().to_string(),
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Single-column table from a series (e.g. predictions promoted to a
    /// feature for downstream consumers).
    pub fn from_series(series: &Series, ctype: ColumnType) -> Self {
        Self {
            columns: vec![Column::new(series.name(), ctype, series.values().to_vec())],
        }
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Keep only the named columns, in the order given.
    pub fn select(&self, names: &[&str]) -> TableResult<DataTable> {
        let mut columns = Vec::with_capacity(names.len());
        for &name in names {
            let column = self.column(name).ok_or_else(|| TableError::ColumnNotFound {
                name: name.to_string(),
            })?;
            columns.push(column.clone());
        }
        DataTable::new(columns)
    }

    /// Remove the named columns; every name must be present.
    pub fn drop_columns(&self, names: &[&str]) -> TableResult<DataTable> {
        for &name in names {
            if !self.has_column(name) {
                return Err(TableError::ColumnNotFound {
                    name: name.to_string(),
                });
            }
        }
        let columns = self
            .columns
            .iter()
            .filter(|column| !names.contains(&column.name()))
            .cloned()
            .collect();
        Ok(DataTable { columns })
    }

    /// Append a column, enforcing the table invariants.
    pub fn with_column(&self, column: Column) -> TableResult<DataTable> {
        let mut columns = self.columns.clone();
        columns.push(column);
        DataTable::new(columns)
    }
}

/// Column-wise, type-preserving concatenation.
///
/// All inputs must agree on row count; duplicate column names are
/// rejected rather than silently shadowed.
pub fn concat_columns(tables: &[DataTable]) -> TableResult<DataTable> {
    let mut columns: Vec<Column> = Vec::new();
    for table in tables {
        columns.extend(table.columns().iter().cloned());
    }
    DataTable::new(columns)
}
