//! Error types for table loading.

use std::path::PathBuf;

use crate::load::Orientation;

/// A token that could not be turned into a number for a numeric-only dimension.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot parse `{token}` as a number in dimension {dimension}")]
pub struct ParseError {
    pub token: String,
    pub dimension: usize,
}

/// Failure of a single dataset mapper operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("dimension {dimension} is out of range for a mapper with {dimensionality} dimensions")]
    DimensionOutOfRange {
        dimension: usize,
        dimensionality: usize,
    },
}

/// Errors that can occur while opening a table or loading it into a matrix.
///
/// Every variant is fatal for the load that produced it: the output matrix and
/// the dataset mapper must be discarded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unsupported table format for {}: {reason}", .path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error(
        "{orientation} parse: wrong number of dimensions ({actual}) on line {line}; \
         should be {expected} dimensions"
    )]
    DimensionMismatch {
        orientation: Orientation,
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("cannot parse `{token}` in dimension {dimension} at position {position}")]
    Parse {
        token: String,
        dimension: usize,
        position: usize,
    },

    #[error("dimension {dimension} is out of range for a mapper with {dimensionality} dimensions")]
    DimensionOutOfRange {
        dimension: usize,
        dimensionality: usize,
    },
}

impl LoadError {
    pub(crate) fn open(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        LoadError::Open {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Attach the in-dimension position of the offending token to a mapper failure.
    pub(crate) fn from_map(err: MapError, position: usize) -> Self {
        match err {
            MapError::Parse(ParseError { token, dimension }) => LoadError::Parse {
                token,
                dimension,
                position,
            },
            MapError::DimensionOutOfRange {
                dimension,
                dimensionality,
            } => LoadError::DimensionOutOfRange {
                dimension,
                dimensionality,
            },
        }
    }
}
