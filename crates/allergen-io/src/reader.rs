//! CSV dataset reader with schema and domain validation.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::domain::{FEATURE_COLUMNS, FeatureRecord, LABEL_COLUMN, LabeledRecord};
use crate::IoError;

/// One CSV row: the typed attributes plus the raw label cell, if present.
struct Row {
    features: FeatureRecord,
    label: Option<String>,
}

/// Reads allergy records from a CSV file.
///
/// Expected CSV format:
/// - Header row naming at least the ten feature columns (any order; extra
///   columns are ignored)
/// - `Allergic` (0 or 1) is required for labeled reads
/// - Cells are trimmed of surrounding whitespace
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::MissingColumn`] | A required column is absent from the header |
/// | [`IoError::CsvParse`] | Malformed row or a cell of the wrong type |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InvalidLabel`] | `Allergic` is not 0 or 1 |
/// | [`IoError::InvalidRecord`] | A labeled row has a numeric attribute out of range |
pub struct DatasetReader {
    path: PathBuf,
}

impl DatasetReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read a labeled dataset for training and evaluation.
    ///
    /// Every row is range-checked: an out-of-range training record is a data
    /// error, not something to score around.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read_labeled(&self) -> Result<Vec<LabeledRecord>, IoError> {
        let rows = self.read_rows(true)?;
        let mut records = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.into_iter().enumerate() {
            row.features
                .validate()
                .map_err(|source| IoError::InvalidRecord {
                    path: self.path.clone(),
                    row_index,
                    source,
                })?;
            let allergic = match row.label.as_deref() {
                Some("0") => false,
                Some("1") => true,
                other => {
                    return Err(IoError::InvalidLabel {
                        path: self.path.clone(),
                        row_index,
                        raw: other.unwrap_or_default().to_string(),
                    });
                }
            };
            records.push(LabeledRecord {
                features: row.features,
                allergic,
            });
        }

        let n_allergic = records.iter().filter(|r| r.allergic).count();
        info!(
            n_records = records.len(),
            n_allergic,
            "labeled dataset loaded"
        );
        Ok(records)
    }

    /// Read unlabeled records for inference.
    ///
    /// Rows are not range-checked here; each record is validated when it is
    /// predicted, so one bad row does not block the rest.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read_unlabeled(&self) -> Result<Vec<FeatureRecord>, IoError> {
        let records: Vec<FeatureRecord> = self
            .read_rows(false)?
            .into_iter()
            .map(|row| row.features)
            .collect();
        info!(n_records = records.len(), "unlabeled records loaded");
        Ok(records)
    }

    fn read_rows(&self, labeled: bool) -> Result<Vec<Row>, IoError> {
        let file = File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        // Check the schema up front so a missing column is reported by name
        // rather than as a per-row deserialize failure.
        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        let required = FEATURE_COLUMNS
            .iter()
            .copied()
            .chain(labeled.then_some(LABEL_COLUMN));
        for column in required {
            if !header.iter().any(|h| h == column) {
                return Err(IoError::MissingColumn {
                    path: self.path.clone(),
                    column,
                });
            }
        }
        debug!(n_columns = header.len(), "read CSV header");

        let label_index = header.iter().position(|h| h == LABEL_COLUMN);

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| self.csv_error(e))?;
            let features: FeatureRecord = record
                .deserialize(Some(&header))
                .map_err(|e| self.csv_error(e))?;
            let label = label_index
                .and_then(|i| record.get(i))
                .map(str::to_string);
            rows.push(Row { features, label });
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        Ok(rows)
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    const HEADER: &str = "Age,Gender,Family_History,Previous_Reaction,Symptoms,Food_Type,Food_Frequency,Medical_Conditions,IgE_Levels,Severity_Score,Allergic";

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_labeled_rows() {
        let csv = format!(
            "{HEADER}\n34,Female,Yes,Mild,Swelling,Nuts,3,Asthma,120.5,6,1\n61,Male,No,None,No symptoms,Dairy,1,None,12,0,0\n"
        );
        let f = write_csv(&csv);
        let records = DatasetReader::new(f.path()).read_labeled().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].allergic);
        assert_eq!(records[0].label(), 1);
        assert_eq!(records[0].features.food_type, "Nuts");
        assert!((records[0].features.ige_levels - 120.5).abs() < 1e-12);
        assert_eq!(records[1].features.symptoms, "No symptoms");
        assert!(!records[1].allergic);
    }

    #[test]
    fn column_order_and_extra_columns_ignored() {
        let csv = "Patient,Allergic,Severity_Score,IgE_Levels,Medical_Conditions,Food_Frequency,Food_Type,Symptoms,Previous_Reaction,Family_History,Gender,Age\n\
                   P1,0,2,8.5,Eczema,4,Eggs,Nausea,Moderate,No,Other,22\n";
        let f = write_csv(csv);
        let records = DatasetReader::new(f.path()).read_labeled().unwrap();
        assert_eq!(records[0].features.age, 22);
        assert_eq!(records[0].features.gender, "Other");
        assert_eq!(records[0].features.medical_conditions, "Eczema");
    }

    #[test]
    fn missing_column_named() {
        let csv = "Age,Gender,Family_History,Previous_Reaction,Symptoms,Food_Type,Food_Frequency,Medical_Conditions,IgE_Levels,Allergic\n\
                   34,Female,Yes,Mild,Swelling,Nuts,3,Asthma,120.5,1\n";
        let f = write_csv(csv);
        let err = DatasetReader::new(f.path()).read_labeled().unwrap_err();
        assert!(matches!(err, IoError::MissingColumn { column: "Severity_Score", .. }));
    }

    #[test]
    fn label_column_required_only_for_labeled_reads() {
        let header = HEADER.trim_end_matches(",Allergic");
        let csv = format!("{header}\n34,Female,Yes,Mild,Swelling,Nuts,3,Asthma,120.5,6\n");
        let f = write_csv(&csv);
        let reader = DatasetReader::new(f.path());
        assert!(matches!(
            reader.read_labeled(),
            Err(IoError::MissingColumn { column: "Allergic", .. })
        ));
        let records = reader.read_unlabeled().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity_score, 6);
    }

    #[test]
    fn empty_dataset_rejected() {
        let f = write_csv(&format!("{HEADER}\n"));
        let err = DatasetReader::new(f.path()).read_labeled().unwrap_err();
        assert!(matches!(err, IoError::EmptyDataset { .. }));
    }

    #[test]
    fn bad_label_rejected() {
        let csv = format!("{HEADER}\n34,Female,Yes,Mild,Swelling,Nuts,3,Asthma,120.5,6,2\n");
        let f = write_csv(&csv);
        let err = DatasetReader::new(f.path()).read_labeled().unwrap_err();
        assert!(matches!(err, IoError::InvalidLabel { row_index: 0, ref raw, .. } if raw == "2"));
    }

    #[test]
    fn out_of_range_training_row_rejected() {
        let csv = format!(
            "{HEADER}\n34,Female,Yes,Mild,Swelling,Nuts,3,Asthma,120.5,6,1\n90,Male,No,None,Nausea,Dairy,1,None,3.0,2,0\n"
        );
        let f = write_csv(&csv);
        let err = DatasetReader::new(f.path()).read_labeled().unwrap_err();
        match err {
            IoError::InvalidRecord { row_index, source, .. } => {
                assert_eq!(row_index, 1);
                assert_eq!(source.field, "Age");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unlabeled_rows_not_range_checked() {
        let header = HEADER.trim_end_matches(",Allergic");
        let csv = format!("{header}\n90,Male,No,None,Nausea,Dairy,1,None,3.0,2\n");
        let f = write_csv(&csv);
        let records = DatasetReader::new(f.path()).read_unlabeled().unwrap();
        assert_eq!(records[0].age, 90);
    }

    #[test]
    fn non_numeric_cell_is_parse_error() {
        let csv = format!("{HEADER}\nthirty,Female,Yes,Mild,Swelling,Nuts,3,Asthma,120.5,6,1\n");
        let f = write_csv(&csv);
        let err = DatasetReader::new(f.path()).read_labeled().unwrap_err();
        assert!(matches!(err, IoError::CsvParse { .. }));
    }

    #[test]
    fn missing_file() {
        let err = DatasetReader::new(Path::new("/nonexistent/allergy.csv"))
            .read_labeled()
            .unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
