use std::{
    fs::File,
    io::{BufReader, Cursor, Read},
    path::Path,
};

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use super::{
    archive::read_first_csv_entry,
    utils::{format_for_path, TableFormat},
    TableOptions, TabularReader,
};
use crate::error::LoadError;

/// A fully materialized table of raw string fields.
///
/// Rows keep whatever field count the source had; uniformity is checked by
/// the loader, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Column names, when the table was read with `has_headers`.
    headers: Option<Vec<String>>,
    /// Each data row, as a Vec of Strings (one per field).
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table directly from already split rows.
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: None,
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Parse delimited text from any reader.
    ///
    /// `origin` is only used to label errors.
    pub fn from_reader<R: Read>(
        reader: R,
        options: &TableOptions,
        origin: &Path,
    ) -> Result<Self, LoadError> {
        let delimiter = match options.delimiter {
            None => b',',
            Some(c) if c.is_ascii() => c as u8,
            Some(c) => {
                return Err(LoadError::UnsupportedFormat {
                    path: origin.to_path_buf(),
                    reason: format!("delimiter {:?} is not a single-byte character", c),
                })
            }
        };
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // ragged rows must survive so the loader can report them
            .delimiter(delimiter)
            .trim(if options.trim { Trim::All } else { Trim::None })
            .from_reader(reader);

        let mut rows: Vec<Vec<String>> = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| LoadError::open(origin, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        let headers = if options.has_headers && !rows.is_empty() {
            Some(rows.remove(0))
        } else {
            None
        };

        debug!(
            origin = %origin.display(),
            rows = rows.len(),
            has_headers = headers.is_some(),
            "parsed raw table"
        );
        Ok(Self { headers, rows })
    }

    /// Open a table file, choosing the parser from its extension unless a
    /// delimiter was given explicitly.
    #[tracing::instrument(level = "info", skip(path, options), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P, options: &TableOptions) -> Result<Self, LoadError> {
        let path = path.as_ref();
        match (format_for_path(path), options.delimiter) {
            (Some(TableFormat::Zip), delimiter) => {
                let data = read_first_csv_entry(path)?;
                let opts = TableOptions {
                    delimiter: Some(delimiter.unwrap_or(',')),
                    ..options.clone()
                };
                Self::from_reader(Cursor::new(data), &opts, path)
            }
            (Some(TableFormat::Delimited(default)), delimiter) => {
                let opts = TableOptions {
                    delimiter: Some(delimiter.unwrap_or(default)),
                    ..options.clone()
                };
                Self::from_file(path, &opts)
            }
            (None, Some(_)) => Self::from_file(path, options),
            (None, None) => Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: "unknown extension and no delimiter given".into(),
            }),
        }
    }

    fn from_file(path: &Path, options: &TableOptions) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|e| LoadError::open(path, e))?;
        Self::from_reader(BufReader::new(file), options, path)
    }

    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

impl TabularReader for RawTable {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the first row; later rows are not consulted.
    fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    fn row(&self, index: usize) -> Vec<&str> {
        self.rows
            .get(index)
            .map(|r| r.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn column(&self, index: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|r| r.get(index).map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn csv_file(suffix: &str, content: &str) -> Result<NamedTempFile> {
        let mut tmp = Builder::new().suffix(suffix).tempfile()?;
        tmp.write_all(content.as_bytes())?;
        Ok(tmp)
    }

    #[test]
    fn reads_rows_and_counts() -> Result<()> {
        let table = RawTable::from_reader(
            "1,red\n2,blue\n3,red\n".as_bytes(),
            &TableOptions::default(),
            Path::new("inline"),
        )?;
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row(1), vec!["2", "blue"]);
        assert_eq!(table.column(1), vec!["red", "blue", "red"]);
        assert!(table.headers().is_none());
        Ok(())
    }

    #[test]
    fn keeps_ragged_rows() -> Result<()> {
        let table = RawTable::from_reader(
            "1,2,3\n4,5\n6,7,8\n".as_bytes(),
            &TableOptions::default(),
            Path::new("inline"),
        )?;
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row(1).len(), 2);
        assert_eq!(table.column(2), vec!["3", "8"]);
        Ok(())
    }

    #[test]
    fn header_row_is_split_off() -> Result<()> {
        let opts = TableOptions {
            has_headers: true,
            ..TableOptions::default()
        };
        let table =
            RawTable::from_reader("x,color\n1,red\n".as_bytes(), &opts, Path::new("inline"))?;
        assert_eq!(table.headers(), Some(&["x".to_string(), "color".to_string()][..]));
        assert_eq!(table.row_count(), 1);
        Ok(())
    }

    #[test]
    fn quoted_fields_and_trimming() -> Result<()> {
        let table = RawTable::from_reader(
            "\"a, b\", 2 \n".as_bytes(),
            &TableOptions::default(),
            Path::new("inline"),
        )?;
        assert_eq!(table.row(0), vec!["a, b", "2"]);

        let raw = TableOptions {
            trim: false,
            ..TableOptions::default()
        };
        let table = RawTable::from_reader(" 1 ,2\n".as_bytes(), &raw, Path::new("inline"))?;
        assert_eq!(table.row(0), vec![" 1 ", "2"]);
        Ok(())
    }

    #[test]
    fn escaped_quotes_survive_trimming() -> Result<()> {
        let table = RawTable::from_reader(
            "\"\"\"red\"\"\", red ,\" red \"\n".as_bytes(),
            &TableOptions::default(),
            Path::new("inline"),
        )?;
        assert_eq!(table.row(0), vec!["\"red\"", "red", "red"]);
        Ok(())
    }

    #[test]
    fn open_uses_extension_delimiter() -> Result<()> {
        let tsv = csv_file(".tsv", "1\t2\n3\t4\n")?;
        let table = RawTable::open(tsv.path(), &TableOptions::default())?;
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row(1), vec!["3", "4"]);

        let csv = csv_file(".csv", "1;2\n")?;
        let explicit = TableOptions {
            delimiter: Some(';'),
            ..TableOptions::default()
        };
        let table = RawTable::open(csv.path(), &explicit)?;
        assert_eq!(table.row(0), vec!["1", "2"]);
        Ok(())
    }

    #[test]
    fn open_rejects_unknown_extension() -> Result<()> {
        let f = csv_file(".dat", "1,2\n")?;
        let err = RawTable::open(f.path(), &TableOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
        Ok(())
    }

    #[test]
    fn open_missing_file_fails() {
        let err = RawTable::open("does/not/exist.csv", &TableOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }

    #[test]
    fn empty_table_has_no_columns() {
        let table = RawTable::default();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
        assert!(table.column(0).is_empty());
    }
}
