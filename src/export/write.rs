use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use parquet::{
    arrow::ArrowWriter,
    basic::{BrotliLevel, Compression},
    file::properties::WriterProperties,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::mapper::DatasetMapper;

/// Write `batch` as a Brotli-compressed Parquet file, returning its size in bytes.
pub fn write_parquet(batch: &RecordBatch, output_path: &Path) -> Result<u64> {
    let file = File::create(output_path)
        .with_context(|| format!("creating file {}", output_path.display()))?;

    let props = WriterProperties::builder()
        .set_compression(Compression::BROTLI(BrotliLevel::try_new(5)?))
        .build();

    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), Some(props)).context("creating parquet writer")?;

    writer.write(batch).context("writing batch to parquet")?;
    writer.close().context("closing parquet writer")?;

    let bytes = fs::metadata(output_path)
        .context("getting file metadata")?
        .len();
    debug!(path = %output_path.display(), bytes, rows = batch.num_rows(), "wrote parquet");
    Ok(bytes)
}

/// Write the mapper as pretty JSON: to a hidden tmp file, then rename over `path`.
pub fn write_mappings<P: Serialize>(mapper: &DatasetMapper<P>, path: &Path) -> Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("{:?} has no file name", path))?
        .to_string_lossy();
    let tmp_path: PathBuf = path.with_file_name(format!(".{}.tmp", file_name));

    let mut tmp = File::create(&tmp_path).with_context(|| format!("creating {:?}", tmp_path))?;
    serde_json::to_writer_pretty(&mut tmp, mapper).context("serializing mappings")?;
    tmp.write_all(b"\n")?;

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    Ok(())
}

pub fn read_mappings<P: DeserializeOwned>(path: &Path) -> Result<DatasetMapper<P>> {
    let f = File::open(path).with_context(|| format!("opening {:?}", path))?;
    serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing {:?}", path))
}
