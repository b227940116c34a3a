//! Dataset loader
//!
//! The measurement data ships inside the binary as a CSV asset with species
//! encoded as integer codes, standing in for the external dataset provider.
//! Loading parses the asset through Arrow's CSV reader against an explicit
//! schema and decodes the code column into category names, so the rest of
//! the pipeline only ever sees human-readable labels.

use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::compute;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use tracing::debug;

use crate::table::{Feature, Species, Table, SPECIES_COLUMN_NAME};
use crate::{Error, Result};

/// Row count of the fixed dataset.
pub const EXPECTED_ROWS: usize = 150;

/// The raw dataset asset. Species are stored as integer codes and decoded
/// during loading.
const IRIS_CSV: &str = include_str!("../data/iris.csv");

/// Schema of the raw asset: the label column is still an integer code here.
fn raw_schema() -> Schema {
    let mut fields: Vec<Field> = Feature::ALL
        .iter()
        .map(|f| Field::new(f.column_name(), DataType::Float64, false))
        .collect();
    fields.push(Field::new(SPECIES_COLUMN_NAME, DataType::Int64, false));
    Schema::new(fields)
}

/// Load the fixed dataset into a [`Table`].
///
/// # Errors
/// Returns [`Error::DataSource`] if the asset cannot be parsed or contains
/// an unknown species code.
pub fn load() -> Result<Table> {
    let batch = read_raw_asset()?;
    let decoded = decode_species(&batch)?;
    debug!(
        rows = decoded.num_rows(),
        columns = decoded.num_columns(),
        "dataset materialized"
    );
    Table::from_batch(decoded)
}

/// Parse the embedded CSV into a single raw record batch.
fn read_raw_asset() -> Result<RecordBatch> {
    let schema = Arc::new(raw_schema());
    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_header(true)
        .build(Cursor::new(IRIS_CSV.as_bytes()))
        .map_err(|e| Error::DataSource(format!("failed to open dataset asset: {e}")))?;

    let mut batches = Vec::new();
    for batch in reader {
        let batch =
            batch.map_err(|e| Error::DataSource(format!("failed to parse dataset asset: {e}")))?;
        batches.push(batch);
    }

    if batches.is_empty() {
        return Err(Error::DataSource("dataset asset is empty".to_string()));
    }
    compute::concat_batches(&schema, &batches)
        .map_err(|e| Error::DataSource(format!("failed to assemble dataset: {e}")))
}

/// Replace the integer code column with decoded category names.
fn decode_species(batch: &RecordBatch) -> Result<RecordBatch> {
    let code_index = batch.num_columns() - 1;
    let codes = batch
        .column(code_index)
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| Error::DataSource("species code column is not Int64".to_string()))?;

    let mut names = Vec::with_capacity(codes.len());
    for row in 0..codes.len() {
        if codes.is_null(row) {
            return Err(Error::DataSource(format!(
                "missing species code at row {row}"
            )));
        }
        let code = codes.value(row);
        let species = Species::from_code(code)
            .ok_or_else(|| Error::DataSource(format!("unknown species code {code} at row {row}")))?;
        names.push(species.name());
    }

    let mut fields: Vec<Field> = Feature::ALL
        .iter()
        .map(|f| Field::new(f.column_name(), DataType::Float64, false))
        .collect();
    fields.push(Field::new(SPECIES_COLUMN_NAME, DataType::Utf8, false));

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());
    for feature in Feature::ALL {
        let column = batch
            .column(feature.column_index())
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| {
                Error::DataSource(format!(
                    "column {} is not Float64",
                    feature.column_name()
                ))
            })?;
        columns.push(Arc::new(column.clone()));
    }
    columns.push(Arc::new(StringArray::from(names)));

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .map_err(|e| Error::DataSource(format!("failed to decode species labels: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_has_fixed_shape() {
        let table = load().unwrap();
        assert_eq!(table.num_rows(), EXPECTED_ROWS);
        assert_eq!(table.schema().fields().len() - 1, Feature::ALL.len());
    }

    #[test]
    fn test_load_decodes_all_labels() {
        let table = load().unwrap();
        let labels = table.species_array().unwrap();
        for row in 0..labels.len() {
            assert!(Species::from_name(labels.value(row)).is_some());
        }
    }

    #[test]
    fn test_load_balanced_groups() {
        // The fixed dataset has 50 records per species.
        let table = load().unwrap();
        for species in Species::ALL {
            let group = table
                .feature_values(Feature::SepalLength, Some(species))
                .unwrap();
            assert_eq!(group.len(), 50, "unbalanced group for {species}");
        }
    }

    #[test]
    fn test_decode_rejects_unknown_code() {
        let schema = Arc::new(raw_schema());
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![5.1])),
                Arc::new(Float64Array::from(vec![3.5])),
                Arc::new(Float64Array::from(vec![1.4])),
                Arc::new(Float64Array::from(vec![0.2])),
                Arc::new(Int64Array::from(vec![7])),
            ],
        )
        .unwrap();
        let err = decode_species(&batch).unwrap_err();
        assert!(err.to_string().contains("unknown species code"));
    }
}
