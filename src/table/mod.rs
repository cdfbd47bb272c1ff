//! Tabular readers: random access to raw string fields by row or column.

mod archive;
pub mod raw_table;
pub mod utils;

use serde::{Deserialize, Serialize};

pub use raw_table::RawTable;

/// Random access to a table of raw string fields.
///
/// The loader assumes indices passed here are within the reported counts.
pub trait TabularReader {
    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    /// Fields of row `index`, in column order.
    fn row(&self, index: usize) -> Vec<&str>;

    /// Fields of column `index`, in row order.
    fn column(&self, index: usize) -> Vec<&str>;
}

impl<T: TabularReader + ?Sized> TabularReader for &T {
    fn row_count(&self) -> usize {
        (**self).row_count()
    }

    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    fn row(&self, index: usize) -> Vec<&str> {
        (**self).row(index)
    }

    fn column(&self, index: usize) -> Vec<&str> {
        (**self).column(index)
    }
}

/// How raw text is split into fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Field delimiter; derived from the file extension when `None`.
    pub delimiter: Option<char>,
    /// Treat the first row as column names rather than data.
    pub has_headers: bool,
    /// Strip surrounding whitespace from every field. Quotes are handled by
    /// CSV quoting alone, so an escaped `"""red"""` stays `"red"`.
    pub trim: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_headers: false,
            trim: true,
        }
    }
}
