//! Input table loading.

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::preprocess::Preprocessor;

use super::error::PipelineError;
use super::types::DescriptionRecord;

/// Which columns hold the identifier and the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputColumns {
    pub id: String,
    pub description: String,
}

/// Read and standardize every record of a CSV file.
///
/// Fails before returning anything when the file is unreadable or a column is missing.
pub fn read_records(
    path: &Path,
    columns: &InputColumns,
    preprocessor: &Preprocessor,
    limit: Option<usize>,
) -> Result<Vec<DescriptionRecord>, PipelineError> {
    let reader = csv::Reader::from_path(path).map_err(|source| PipelineError::Input {
        path: path.to_path_buf(),
        source,
    })?;

    let records = read_from(reader, path, columns, preprocessor, limit)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Read records from any reader. `label` names the source in errors.
pub fn read_records_from<R: Read>(
    input: R,
    label: &Path,
    columns: &InputColumns,
    preprocessor: &Preprocessor,
    limit: Option<usize>,
) -> Result<Vec<DescriptionRecord>, PipelineError> {
    read_from(
        csv::Reader::from_reader(input),
        label,
        columns,
        preprocessor,
        limit,
    )
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, PipelineError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| PipelineError::MissingColumn {
            column: name.to_string(),
            available: headers.iter().collect::<Vec<_>>().join(", "),
        })
}

fn read_from<R: Read>(
    mut reader: csv::Reader<R>,
    label: &Path,
    columns: &InputColumns,
    preprocessor: &Preprocessor,
    limit: Option<usize>,
) -> Result<Vec<DescriptionRecord>, PipelineError> {
    let input_error = |source| PipelineError::Input {
        path: label.to_path_buf(),
        source,
    };

    let headers = reader.headers().map_err(input_error)?.clone();
    let id_idx = column_index(&headers, &columns.id)?;
    let desc_idx = column_index(&headers, &columns.description)?;

    let mut records = Vec::new();
    for row in reader.records() {
        if limit.is_some_and(|n| records.len() >= n) {
            break;
        }
        let row = row.map_err(input_error)?;
        let id = row.get(id_idx).unwrap_or("").trim();
        let raw = row.get(desc_idx).unwrap_or("");
        records.push(DescriptionRecord::new(id, raw, preprocessor));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> InputColumns {
        InputColumns {
            id: "fdc_id".to_string(),
            description: "description".to_string(),
        }
    }

    fn read(data: &str, limit: Option<usize>) -> Result<Vec<DescriptionRecord>, PipelineError> {
        read_records_from(
            data.as_bytes(),
            Path::new("test.csv"),
            &columns(),
            &Preprocessor::default(),
            limit,
        )
    }

    #[test]
    fn test_reads_and_standardizes() {
        let records = read(
            "fdc_id,description,extra\n1,FR VEG,x\n2,BEVE CKD,y\n3,raw,z\n",
            None,
        )
        .unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        let texts: Vec<_> = records.iter().map(|r| r.standardized.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(texts, vec!["FRESH VEGETABLE", "BEVERAGE COOKED", "RAW"]);
        assert_eq!(records[0].raw, "FR VEG");
    }

    #[test]
    fn test_missing_column_is_fatal() {
        match read("id,text\n1,FR VEG\n", None).unwrap_err() {
            PipelineError::MissingColumn { column, available } => {
                assert_eq!(column, "fdc_id");
                assert_eq!(available, "id, text");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_description_is_kept() {
        let records = read("fdc_id,description\n1,\n", None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].standardized, "");
    }

    #[test]
    fn test_limit() {
        let records = read("fdc_id,description\n1,a\n2,b\n3,c\n", Some(2)).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_unreadable_file() {
        let err = read_records(
            Path::new("/nonexistent/input.csv"),
            &columns(),
            &Preprocessor::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Input { .. }));
    }
}
