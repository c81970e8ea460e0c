//! mf-table: column-typed tabular data for modelflow pipelines.
//!
//! Provides:
//! - `DataTable`: an ordered collection of uniquely named, length-consistent
//!   columns, each tagged with a logical type
//! - `Series`: a single named sequence for targets and predictions
//! - Type-preserving column selection, dropping, and concatenation
//!
//! The engine carries tables between pipeline nodes without inspecting
//! cell values; components are the only readers and writers of data.
//!
//! # Example
//!
//! ```
//! use mf_table::{concat_columns, Column, ColumnType, DataTable};
//!
//! let left = DataTable::new(vec![Column::new(
//!     "age",
//!     ColumnType::Integer,
//!     vec![34.0, 21.0],
//! )])?;
//! let right = DataTable::new(vec![Column::new(
//!     "income",
//!     ColumnType::Double,
//!     vec![52_000.0, 48_500.0],
//! )])?;
//!
//! let combined = concat_columns(&[left, right])?;
//! assert_eq!(combined.column_names(), vec!["age", "income"]);
//! assert_eq!(combined.column("age").map(|c| c.column_type()), Some(ColumnType::Integer));
//! # Ok::<(), mf_table::TableError>(())
//! ```

pub mod error;
pub mod series;
pub mod table;

pub use error::{TableError, TableResult};
pub use series::Series;
pub use table::{concat_columns, Column, ColumnType, DataTable};
