//! Persisting loaded matrices: Arrow/Parquet for the values, JSON for the mapper.

pub mod arrow;
pub mod write;

pub use self::arrow::{build_arrow_schema, field_datatype, to_record_batch, DATATYPE_KEY};
pub use self::write::{read_mappings, write_mappings, write_parquet};

use std::path::Path;

use anyhow::Result;

use crate::config::LoadedTable;

/// Write a loaded table's matrix as Parquet and, if asked, its mapper as JSON.
pub fn write_loaded(
    loaded: &LoadedTable,
    parquet_path: &Path,
    mappings_path: Option<&Path>,
) -> Result<u64> {
    let batch = to_record_batch(&loaded.matrix, &loaded.mapper, &loaded.column_names())?;
    let bytes = write_parquet(&batch, parquet_path)?;
    if let Some(path) = mappings_path {
        write_mappings(&loaded.mapper, path)?;
    }
    Ok(bytes)
}
