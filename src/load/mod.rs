//! Two-pass table → matrix loading.
//!
//! Inference sizes the output and (if the mapping policy asks for it) runs a
//! first pass over every dimension; assembly then fills a matrix of exactly
//! that size through the primed mapper.

pub mod assemble;
pub mod inference;

use std::{fmt, path::Path};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{
    error::LoadError,
    mapper::{DatasetMapper, Element, MapPolicy},
    table::{RawTable, TableOptions, TabularReader},
};

pub use assemble::{non_transpose_parse, transpose_parse};
pub use inference::{matrix_size, transpose_matrix_size, Shape};

/// How table rows relate to matrix columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Table row `r` becomes matrix row `r`; one dimension per table column.
    Normal,
    /// Table row `r` becomes matrix column `r`; one dimension per table row.
    #[default]
    Transposed,
}

impl Orientation {
    pub fn from_transpose(transpose: bool) -> Self {
        if transpose {
            Orientation::Transposed
        } else {
            Orientation::Normal
        }
    }

    pub fn is_transposed(self) -> bool {
        self == Orientation::Transposed
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Normal => f.write_str("non-transposed"),
            Orientation::Transposed => f.write_str("transposed"),
        }
    }
}

/// Load `reader` into `matrix`, encoding every field through `mapper`.
///
/// `mapper` is re-created with one slot per output column. On success
/// `matrix` is replaced by a fully populated matrix of the inferred shape and
/// `mapper` holds the final classification and codes. On error `matrix` is
/// untouched but `mapper` may be half-built and must be discarded.
#[tracing::instrument(level = "debug", skip_all, fields(transpose = transpose))]
pub fn load<T, P, R>(
    reader: &R,
    matrix: &mut Array2<T>,
    mapper: &mut DatasetMapper<P>,
    transpose: bool,
) -> Result<(), LoadError>
where
    T: Element,
    P: MapPolicy,
    R: TabularReader + ?Sized,
{
    let filled = match Orientation::from_transpose(transpose) {
        Orientation::Transposed => transpose_parse(reader, mapper)?,
        Orientation::Normal => non_transpose_parse(reader, mapper)?,
    };
    *matrix = filled;
    Ok(())
}

/// Owns an opened table and loads it on request.
#[derive(Debug, Clone)]
pub struct TableLoader<R = RawTable> {
    reader: R,
}

impl TableLoader<RawTable> {
    /// Open `path` now; opening errors surface here rather than at load time.
    pub fn open<P: AsRef<Path>>(path: P, options: &TableOptions) -> Result<Self, LoadError> {
        Ok(Self::new(RawTable::open(path, options)?))
    }
}

impl<R: TabularReader> TableLoader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn load<T: Element, P: MapPolicy>(
        &self,
        matrix: &mut Array2<T>,
        mapper: &mut DatasetMapper<P>,
        transpose: bool,
    ) -> Result<(), LoadError> {
        load(&self.reader, matrix, mapper, transpose)
    }

    /// [`TableLoader::load`] in the default, transposed, orientation.
    pub fn load_transposed<T: Element, P: MapPolicy>(
        &self,
        matrix: &mut Array2<T>,
        mapper: &mut DatasetMapper<P>,
    ) -> Result<(), LoadError> {
        self.load(matrix, mapper, Orientation::default().is_transposed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::mapper::{DatasetInfo, Datatype, DimensionState, NumericPolicy};
    use crate::test_support::init_test_logging;
    use anyhow::Result;
    use ndarray::array;
    use std::io::Write;
    use tempfile::Builder;

    fn numeric_table() -> RawTable {
        RawTable::from_rows([["1", "2", "3"], ["4", "5", "6"]])
    }

    #[test]
    fn shapes_follow_orientation() -> Result<()> {
        init_test_logging();
        let table = numeric_table();
        let mut m = Array2::<f64>::zeros((0, 0));
        let mut mapper = DatasetMapper::with_policy(NumericPolicy, 0);

        load(&table, &mut m, &mut mapper, false)?;
        assert_eq!(m.dim(), (2, 3));
        assert_eq!(m, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(mapper.dimensionality(), 3);

        load(&table, &mut m, &mut mapper, true)?;
        assert_eq!(m.dim(), (3, 2));
        assert_eq!(m, array![[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]]);
        assert_eq!(mapper.dimensionality(), 2);
        Ok(())
    }

    #[test]
    fn transposed_cell_matches_swapped_token() -> Result<()> {
        let table = RawTable::from_rows([["0.5", "-1", "2e3"], ["7", "8.25", "9"]]);
        let mut m = Array2::<f64>::zeros((0, 0));
        let mut mapper = DatasetMapper::with_policy(NumericPolicy, 0);
        load(&table, &mut m, &mut mapper, true)?;
        for r in 0..3 {
            for c in 0..2 {
                let expected: f64 = table.rows()[c][r].parse()?;
                assert_eq!(m[[r, c]], expected);
            }
        }
        Ok(())
    }

    #[test]
    fn categorical_example_loads_with_codes() -> Result<()> {
        init_test_logging();
        let table = RawTable::from_reader(
            "1,red\n2,blue\n3,red\n".as_bytes(),
            &TableOptions::default(),
            Path::new("inline"),
        )?;
        let mut m = Array2::<f64>::zeros((0, 0));
        let mut info = DatasetInfo::default();
        load(&table, &mut m, &mut info, false)?;
        assert_eq!(m, array![[1.0, 0.0], [2.0, 1.0], [3.0, 0.0]]);
        assert_eq!(info.datatype(0), Some(Datatype::Numeric));
        assert_eq!(info.datatype(1), Some(Datatype::Categorical));
        Ok(())
    }

    #[test]
    fn nan_and_inf_words_load_as_codes() -> Result<()> {
        let table = RawTable::from_rows([["1", "Nan"], ["2", "Inf"], ["3", "Nan"]]);
        let mut m = Array2::<f64>::zeros((0, 0));
        let mut info = DatasetInfo::default();
        load(&table, &mut m, &mut info, false)?;
        assert_eq!(info.datatype(1), Some(Datatype::Categorical));
        assert_eq!(m, array![[1.0, 0.0], [2.0, 1.0], [3.0, 0.0]]);
        assert_eq!(info.unmap_string(1.0f64, 1, 0), Some("Inf"));

        let table = RawTable::from_rows([["infinity", "nan"]]);
        let mut mapper = DatasetMapper::with_policy(NumericPolicy, 0);
        let err = load(&table, &mut m, &mut mapper, false).unwrap_err();
        assert!(matches!(err, LoadError::Parse { dimension: 0, position: 0, .. }));
        Ok(())
    }

    /// Categorical everywhere, codes assigned lazily during the fill.
    #[derive(Default)]
    struct LazyCategorical;

    impl MapPolicy for LazyCategorical {
        fn needs_first_pass(&self) -> bool {
            false
        }

        fn map_first_pass<T: Element>(&self, _token: &str, _state: &mut DimensionState) {}

        fn map_string<T: Element>(
            &self,
            token: &str,
            _dimension: usize,
            state: &mut DimensionState,
        ) -> Result<T, ParseError> {
            state.set_datatype(Datatype::Categorical);
            Ok(T::from_code(state.register(token)))
        }

        fn mapped_value<T: Element>(&self, code: usize) -> T {
            T::from_code(code)
        }
    }

    #[test]
    fn codes_are_stable_across_both_protocols() -> Result<()> {
        let table = RawTable::from_rows([["A"], ["B"], ["A"], ["C"], ["B"]]);
        let expected = array![[0.0], [1.0], [0.0], [2.0], [1.0]];

        let mut m = Array2::<f64>::zeros((0, 0));
        let mut primed = DatasetInfo::default();
        load(&table, &mut m, &mut primed, false)?;
        assert_eq!(m, expected);

        let mut lazy = DatasetMapper::<LazyCategorical>::new(0);
        let mut m2 = Array2::<f64>::zeros((0, 0));
        load(&table, &mut m2, &mut lazy, false)?;
        assert_eq!(m2, expected);

        for token in ["A", "B", "C"] {
            assert_eq!(
                primed.unmap_value::<f64>(token, 0),
                lazy.unmap_value::<f64>(token, 0)
            );
        }
        Ok(())
    }

    #[test]
    fn mismatch_leaves_matrix_untouched() {
        let table = RawTable::from_rows(vec![vec!["1", "2"], vec!["3"]]);
        let mut m = array![[9.0f64]];
        let mut mapper = DatasetMapper::with_policy(NumericPolicy, 0);
        let err = load(&table, &mut m, &mut mapper, false).unwrap_err();
        assert!(matches!(
            err,
            LoadError::DimensionMismatch {
                line: 1,
                expected: 2,
                actual: 1,
                ..
            }
        ));
        assert_eq!(m, array![[9.0]]);
    }

    #[test]
    fn empty_table_loads_empty_matrix() -> Result<()> {
        let table = RawTable::default();
        let mut m = Array2::<f64>::zeros((2, 2));
        let mut info = DatasetInfo::default();
        load(&table, &mut m, &mut info, true)?;
        assert_eq!(m.dim(), (0, 0));
        assert_eq!(info.dimensionality(), 0);
        Ok(())
    }

    #[test]
    fn loader_opens_files_and_defaults_to_transposed() -> Result<()> {
        init_test_logging();
        let mut tmp = Builder::new().suffix(".csv").tempfile()?;
        tmp.write_all(b"1,a\n2,b\n3,a\n")?;

        let loader = TableLoader::open(tmp.path(), &TableOptions::default())?;
        let mut m = Array2::<f32>::zeros((0, 0));
        let mut info = DatasetInfo::default();
        loader.load_transposed(&mut m, &mut info)?;

        // 3 table rows → 3 categorical dimensions, each coding its own tokens
        assert_eq!(m.dim(), (2, 3));
        assert_eq!(info.dimensionality(), 3);
        assert_eq!(m.row(0).to_vec(), vec![0.0, 0.0, 0.0]);
        assert_eq!(m.row(1).to_vec(), vec![1.0, 1.0, 1.0]);
        assert_eq!(info.unmap_string(1.0f32, 2, 0), Some("a"));
        Ok(())
    }

    #[test]
    fn loader_reports_open_failure() {
        let err = TableLoader::open("no/such/table.csv", &TableOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }

    #[test]
    fn orientation_glue() {
        assert_eq!(Orientation::default(), Orientation::Transposed);
        assert_eq!(Orientation::from_transpose(false), Orientation::Normal);
        assert!(Orientation::from_transpose(true).is_transposed());
        assert_eq!(Orientation::Normal.to_string(), "non-transposed");
    }
}
