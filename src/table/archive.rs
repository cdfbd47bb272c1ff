use std::{fs::File, io::Read, path::Path};

use tracing::debug;
use zip::ZipArchive;

use crate::error::LoadError;

/// Upper bound on the up-front buffer reserved from an entry's declared size.
const MAX_PREALLOC: u64 = 64 << 20;

/// Open `zip_path` and buffer the first `.csv` entry (in archive order) into memory.
#[tracing::instrument(level = "debug", skip(zip_path), fields(path = %zip_path.display()))]
pub fn read_first_csv_entry(zip_path: &Path) -> Result<Vec<u8>, LoadError> {
    let file = File::open(zip_path).map_err(|e| LoadError::open(zip_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| LoadError::open(zip_path, e))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| LoadError::open(zip_path, e))?;
        let name = entry.name().to_string();

        if entry.is_file() && name.to_lowercase().ends_with(".csv") {
            let mut buf = Vec::with_capacity(prealloc_len(entry.size()));
            entry
                .read_to_end(&mut buf)
                .map_err(|e| LoadError::open(zip_path, e))?;
            debug!(entry = %name, bytes = buf.len(), "buffered csv entry");
            return Ok(buf);
        }
    }

    Err(LoadError::UnsupportedFormat {
        path: zip_path.to_path_buf(),
        reason: "archive contains no .csv entry".into(),
    })
}

/// Declared sizes come from the archive header and are not trusted.
fn prealloc_len(declared: u64) -> usize {
    declared.min(MAX_PREALLOC) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;
    use zip::write::SimpleFileOptions;
    use zip::CompressionMethod;

    fn write_zip(entries: &[(&str, &str)]) -> Result<NamedTempFile> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            for (name, content) in entries {
                zip.start_file(*name, options)?;
                zip.write_all(content.as_bytes())?;
            }
            zip.finish()?;
        }
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(&buf)?;
        Ok(tmp)
    }

    #[test]
    fn picks_first_csv_entry() -> Result<()> {
        let tmp = write_zip(&[
            ("README.md", "not a table"),
            ("data.csv", "1,2\n3,4\n"),
            ("other.csv", "9,9\n"),
        ])?;
        let bytes = read_first_csv_entry(tmp.path())?;
        assert_eq!(bytes, b"1,2\n3,4\n");
        Ok(())
    }

    #[test]
    fn declared_size_does_not_drive_allocation() {
        assert_eq!(prealloc_len(10), 10);
        assert_eq!(prealloc_len(u64::MAX), MAX_PREALLOC as usize);
    }

    #[test]
    fn archive_without_csv_is_unsupported() -> Result<()> {
        let tmp = write_zip(&[("notes.txt", "hello")])?;
        let err = read_first_csv_entry(tmp.path()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
        Ok(())
    }

    #[test]
    fn garbage_is_an_open_failure() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"definitely not a zip archive")?;
        let err = read_first_csv_entry(tmp.path()).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        Ok(())
    }
}
