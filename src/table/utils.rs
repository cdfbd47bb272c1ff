use std::path::Path;

/// Kind of container a table file is stored in, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Plain delimited text with the given default delimiter.
    Delimited(char),
    /// ZIP archive holding a `.csv` entry.
    Zip,
}

/// Map a file extension to its table format:
///  - `.csv`          → comma separated
///  - `.tsv` / `.txt` → tab separated
///  - `.zip`          → first `.csv` entry of the archive
/// Returns `None` for anything else.
pub fn format_for_path(path: &Path) -> Option<TableFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(TableFormat::Delimited(',')),
        "tsv" | "txt" => Some(TableFormat::Delimited('\t')),
        "zip" => Some(TableFormat::Zip),
        _ => None,
    }
}
