use ndarray::Array2;
use tracing::debug;

use super::{
    inference::{matrix_size, transpose_matrix_size, Shape},
    Orientation,
};
use crate::{
    error::LoadError,
    mapper::{DatasetMapper, Element, MapPolicy},
    table::TabularReader,
};

/// Parse a non-transposed matrix: table row `r` becomes matrix row `r`.
pub fn non_transpose_parse<T, P, R>(
    reader: &R,
    mapper: &mut DatasetMapper<P>,
) -> Result<Array2<T>, LoadError>
where
    T: Element,
    P: MapPolicy,
    R: TabularReader + ?Sized,
{
    let Shape { rows, cols } = matrix_size::<T, P, R>(reader, mapper)?;
    let mut out = Array2::from_elem((rows, cols), T::default());

    for row in 0..rows {
        let tokens = reader.row(row);
        if tokens.len() != cols {
            return Err(LoadError::DimensionMismatch {
                orientation: Orientation::Normal,
                line: row,
                expected: cols,
                actual: tokens.len(),
            });
        }
        for (col, token) in tokens.into_iter().enumerate() {
            out[[row, col]] = mapper
                .map_string(token, col)
                .map_err(|e| LoadError::from_map(e, row))?;
        }
    }

    debug!(rows, cols, "non-transposed parse complete");
    Ok(out)
}

/// Parse a transposed matrix: table row `c` becomes matrix column `c`.
pub fn transpose_parse<T, P, R>(
    reader: &R,
    mapper: &mut DatasetMapper<P>,
) -> Result<Array2<T>, LoadError>
where
    T: Element,
    P: MapPolicy,
    R: TabularReader + ?Sized,
{
    let Shape { rows, cols } = transpose_matrix_size::<T, P, R>(reader, mapper)?;
    let mut out = Array2::from_elem((rows, cols), T::default());

    for col in 0..cols {
        let tokens = reader.row(col);
        if tokens.len() != rows {
            return Err(LoadError::DimensionMismatch {
                orientation: Orientation::Transposed,
                line: col,
                expected: rows,
                actual: tokens.len(),
            });
        }
        for (row, token) in tokens.into_iter().enumerate() {
            out[[row, col]] = mapper
                .map_string(token, col)
                .map_err(|e| LoadError::from_map(e, row))?;
        }
    }

    debug!(rows, cols, "transposed parse complete");
    Ok(out)
}
