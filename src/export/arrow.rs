use std::{collections::HashMap, sync::Arc};

use anyhow::{ensure, Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array},
    datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use ndarray::Array2;

use crate::mapper::{DatasetMapper, Datatype, Element, MapPolicy};

/// Field metadata key carrying the dimension's [`Datatype`].
pub const DATATYPE_KEY: &str = "datatype";

/// One nullable Float64 field per matrix column, tagged with the mapper's
/// classification of that dimension.
pub fn build_arrow_schema<P: MapPolicy>(
    names: &[String],
    mapper: &DatasetMapper<P>,
) -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = names
        .iter()
        .enumerate()
        .map(|(dim, name)| {
            let datatype = mapper.datatype(dim).unwrap_or_default();
            ArrowField::new(name, DataType::Float64, true).with_metadata(HashMap::from([(
                DATATYPE_KEY.to_string(),
                datatype.as_str().to_string(),
            )]))
        })
        .collect();

    Arc::new(ArrowSchema::new(fields))
}

/// Convert a loaded matrix into a [`RecordBatch`]. NaN cells become nulls.
pub fn to_record_batch<T, P>(
    matrix: &Array2<T>,
    mapper: &DatasetMapper<P>,
    names: &[String],
) -> Result<RecordBatch>
where
    T: Element,
    P: MapPolicy,
{
    ensure!(
        names.len() == matrix.ncols(),
        "{} column names for a matrix with {} columns",
        names.len(),
        matrix.ncols()
    );

    let schema = build_arrow_schema(names, mapper);
    let columns: Vec<ArrayRef> = matrix
        .columns()
        .into_iter()
        .map(|col| {
            let values: Float64Array = col
                .iter()
                .map(|&v| (!v.is_nan()).then(|| v.to_f64()))
                .collect();
            Arc::new(values) as ArrayRef
        })
        .collect();

    let options = RecordBatchOptions::new().with_row_count(Some(matrix.nrows()));
    RecordBatch::try_new_with_options(schema, columns, &options).context("building record batch")
}

/// Read a dimension's classification back from a field written by [`build_arrow_schema`].
pub fn field_datatype(field: &ArrowField) -> Option<Datatype> {
    match field.metadata().get(DATATYPE_KEY)?.as_str() {
        "numeric" => Some(Datatype::Numeric),
        "categorical" => Some(Datatype::Categorical),
        _ => None,
    }
}
