//! Load delimited text tables into dense numeric matrices, encoding
//! non-numeric fields as stable per-dimension category codes.

pub mod config;
pub mod error;
pub mod export;
pub mod load;
pub mod mapper;
pub mod table;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{LoadError, MapError, ParseError};
pub use load::{load, Orientation, TableLoader};
pub use mapper::{
    DatasetInfo, DatasetMapper, Datatype, DimensionState, Element, IncrementPolicy, MapPolicy,
    MissingPolicy, NumericPolicy, Policy,
};
pub use table::{RawTable, TableOptions, TabularReader};
