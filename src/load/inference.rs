use tracing::debug;

use crate::{
    error::LoadError,
    mapper::{DatasetMapper, Element, MapPolicy},
    table::TabularReader,
};

/// Output matrix shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

/// Shape of a non-transposed load: one matrix column (and one mapper
/// dimension) per table column.
///
/// Re-creates `mapper` with one slot per column and, when the policy asks for
/// it, feeds every column through [`DatasetMapper::map_first_pass`].
pub fn matrix_size<T, P, R>(reader: &R, mapper: &mut DatasetMapper<P>) -> Result<Shape, LoadError>
where
    T: Element,
    P: MapPolicy,
    R: TabularReader + ?Sized,
{
    let shape = Shape {
        rows: reader.row_count(),
        cols: reader.column_count(),
    };
    first_pass::<T, P, _>(mapper, shape.cols, |dimension| reader.column(dimension))?;
    Ok(shape)
}

/// Shape of a transposed load: one matrix column (and one mapper dimension)
/// per table row.
pub fn transpose_matrix_size<T, P, R>(
    reader: &R,
    mapper: &mut DatasetMapper<P>,
) -> Result<Shape, LoadError>
where
    T: Element,
    P: MapPolicy,
    R: TabularReader + ?Sized,
{
    let shape = Shape {
        rows: reader.column_count(),
        cols: reader.row_count(),
    };
    first_pass::<T, P, _>(mapper, shape.cols, |dimension| reader.row(dimension))?;
    Ok(shape)
}

fn first_pass<'a, T, P, F>(
    mapper: &mut DatasetMapper<P>,
    dimensionality: usize,
    fetch: F,
) -> Result<(), LoadError>
where
    T: Element,
    P: MapPolicy,
    F: Fn(usize) -> Vec<&'a str>,
{
    mapper.reset(dimensionality);
    if !mapper.policy().needs_first_pass() {
        return Ok(());
    }

    let mut seen = 0usize;
    for dimension in 0..dimensionality {
        for (position, token) in fetch(dimension).into_iter().enumerate() {
            mapper
                .map_first_pass::<T>(token, dimension)
                .map_err(|e| LoadError::from_map(e, position))?;
            seen += 1;
        }
    }
    debug!(dimensionality, tokens = seen, "first pass complete");
    Ok(())
}
