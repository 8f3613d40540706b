//! Chunk file output.

use std::path::{Path, PathBuf};

use super::error::PipelineError;
use super::types::FlatRow;

/// File name for a chunk index.
pub fn chunk_file_name(chunk_index: usize) -> String {
    format!("chunk_{}.csv", chunk_index)
}

/// Full path for a chunk index under `output_dir`.
pub fn chunk_path(output_dir: &Path, chunk_index: usize) -> PathBuf {
    output_dir.join(chunk_file_name(chunk_index))
}

/// Create the output directory if it does not exist.
pub fn ensure_output_dir(output_dir: &Path) -> Result<(), PipelineError> {
    std::fs::create_dir_all(output_dir).map_err(|source| PipelineError::Io {
        path: output_dir.to_path_buf(),
        source,
    })
}

/// Write rows (with header) to `path`, replacing any existing file.
pub fn write_rows(path: &Path, rows: &[FlatRow]) -> Result<(), PipelineError> {
    let output_error = |source| PipelineError::Output {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(output_error)?;
    for row in rows {
        writer.serialize(row).map_err(output_error)?;
    }
    writer.flush().map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_naming() {
        assert_eq!(chunk_file_name(0), "chunk_0.csv");
        assert_eq!(
            chunk_path(Path::new("out"), 12),
            PathBuf::from("out/chunk_12.csv")
        );
    }

    #[test]
    fn test_write_rows_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunk_0.csv");
        let rows = vec![FlatRow {
            id: "1".to_string(),
            description: "FRESH VEGETABLE".to_string(),
            ingredients: "Carrot, Pea".to_string(),
            ..Default::default()
        }];

        write_rows(&path, &rows).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,description,Brand,Category,Sub-Category,Ingredients,Preparation Method,Cultural Origin,State,Additional Features"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,FRESH VEGETABLE,,,,\"Carrot, Pea\",,,,"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_ensure_output_dir_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
