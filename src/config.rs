//! Load configuration: YAML file, command-line flags, or both.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::LoadError,
    load::{load, Orientation},
    mapper::{DatasetMapper, IncrementPolicy, MissingPolicy, NumericPolicy, Policy},
    table::{RawTable, TableOptions},
};

/// Which mapping policy to build.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Auto-categorical: non-numeric dimensions get sequential codes.
    #[default]
    Increment,
    /// Numbers only; any other token fails the load.
    Numeric,
    /// Missing or non-numeric tokens load as NaN.
    Missing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub kind: PolicyKind,
    /// Tokens treated as missing by the `missing` policy.
    pub missing: Vec<String>,
    /// `increment` only: encode numeric tokens as codes too.
    pub force_all_mappings: bool,
}

impl PolicyConfig {
    pub fn build(&self) -> Policy {
        match self.kind {
            PolicyKind::Increment => {
                IncrementPolicy::with_force_all_mappings(self.force_all_mappings).into()
            }
            PolicyKind::Numeric => NumericPolicy.into(),
            PolicyKind::Missing => MissingPolicy::new(self.missing.iter().cloned()).into(),
        }
    }
}

/// Everything needed to turn one table file into a matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub transpose: bool,
    pub policy: PolicyConfig,
    pub table: TableOptions,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            transpose: Orientation::default().is_transposed(),
            policy: PolicyConfig::default(),
            table: TableOptions::default(),
        }
    }
}

impl LoadConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing {:?}", path))
    }

    /// Open `path` and load it under this configuration.
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<LoadedTable, LoadError> {
        let path = path.as_ref();
        let table = RawTable::open(path, &self.table)?;
        let mut matrix = Array2::<f64>::zeros((0, 0));
        let mut mapper = DatasetMapper::with_policy(self.policy.build(), 0);
        load(&table, &mut matrix, &mut mapper, self.transpose)?;
        info!(
            path = %path.display(),
            rows = matrix.nrows(),
            cols = matrix.ncols(),
            transpose = self.transpose,
            "loaded table"
        );
        Ok(LoadedTable {
            matrix,
            mapper,
            headers: table.headers().map(<[String]>::to_vec),
            orientation: Orientation::from_transpose(self.transpose),
        })
    }
}

/// Result of [`LoadConfig::load_path`].
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub matrix: Array2<f64>,
    pub mapper: DatasetMapper<Policy>,
    /// Header row of the source table, if one was read.
    pub headers: Option<Vec<String>>,
    pub orientation: Orientation,
}

impl LoadedTable {
    /// Names for the matrix columns: the headers when each matrix column is a
    /// table column, otherwise `dim_<n>`.
    pub fn column_names(&self) -> Vec<String> {
        match (&self.headers, self.orientation) {
            (Some(h), Orientation::Normal) if h.len() == self.matrix.ncols() => h.clone(),
            _ => (0..self.matrix.ncols()).map(|i| format!("dim_{}", i)).collect(),
        }
    }
}

/// Command-line flags shared by the binaries. Flags override the config file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LoadArgs {
    /// YAML file with a `LoadConfig`
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Keep table rows as matrix rows (default loads transposed)
    #[arg(long)]
    pub no_transpose: bool,

    #[arg(long, value_enum)]
    pub policy: Option<PolicyKind>,

    /// Token to treat as missing (repeatable); implies `--policy missing`
    #[arg(long = "missing")]
    pub missing: Vec<String>,

    #[arg(long)]
    pub force_all_mappings: bool,

    /// Field delimiter; defaults from the file extension
    #[arg(long)]
    pub delimiter: Option<char>,

    /// First row holds column names
    #[arg(long)]
    pub has_headers: bool,

    /// Keep surrounding whitespace in fields
    #[arg(long)]
    pub no_trim: bool,
}

impl LoadArgs {
    pub fn resolve(&self) -> Result<LoadConfig> {
        let mut cfg = match &self.config {
            Some(path) => LoadConfig::from_yaml_file(path)?,
            None => LoadConfig::default(),
        };
        if self.no_transpose {
            cfg.transpose = false;
        }
        if !self.missing.is_empty() {
            cfg.policy.kind = PolicyKind::Missing;
            cfg.policy.missing.extend(self.missing.iter().cloned());
        }
        if let Some(kind) = self.policy {
            cfg.policy.kind = kind;
        }
        if self.force_all_mappings {
            cfg.policy.force_all_mappings = true;
        }
        if self.delimiter.is_some() {
            cfg.table.delimiter = self.delimiter;
        }
        if self.has_headers {
            cfg.table.has_headers = true;
        }
        if self.no_trim {
            cfg.table.trim = false;
        }
        Ok(cfg)
    }
}
