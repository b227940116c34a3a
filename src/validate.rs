//! Table validation
//!
//! Structural invariants checked before any statistics run: non-empty table,
//! the fixed four-feature schema, labels inside the closed category set, and
//! zero missing values. Missing-value counts are computed for real (not
//! assumed zero) so the profile can report them and the counting logic stays
//! testable on its own; a non-zero total halts the pipeline. No cleaning or
//! imputation is ever attempted.

use arrow::array::Array;
use arrow::datatypes::DataType;
use serde::Serialize;
use tracing::info;

use crate::table::{Feature, Species, Table, SPECIES_COLUMN_NAME};
use crate::{Error, Result};

/// Shape and cleanliness of one column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Arrow dtype, rendered for narration
    pub dtype: String,
    /// Number of null cells
    pub missing: usize,
}

/// Structural report over a validated (or about-to-be-validated) table.
#[derive(Debug, Clone, Serialize)]
pub struct TableProfile {
    /// Number of records
    pub rows: usize,
    /// Number of numeric feature columns
    pub feature_columns: usize,
    /// Per-column dtype and missing-value report, in schema order
    pub columns: Vec<ColumnInfo>,
    /// Species observed in the data, in closed-set order
    pub species_observed: Vec<Species>,
}

impl TableProfile {
    /// Scan a table into a profile.
    ///
    /// Checks everything that must hold for the scan itself to make sense
    /// (schema shape, dtypes, known labels) and counts missing values, but
    /// does not yet enforce the zero-missing invariant; [`validate`] does.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] on schema, dtype, label or finiteness
    /// violations.
    pub fn scan(table: &Table) -> Result<Self> {
        let schema = table.schema();

        for feature in Feature::ALL {
            let field = schema.field(feature.column_index());
            if field.name() != feature.column_name() {
                return Err(Error::Validation(format!(
                    "expected column {} at position {}, found {}",
                    feature.column_name(),
                    feature.column_index(),
                    field.name()
                )));
            }
            if field.data_type() != &DataType::Float64 {
                return Err(Error::Validation(format!(
                    "column {} has dtype {}, expected Float64",
                    feature.column_name(),
                    field.data_type()
                )));
            }
        }
        let label_field = schema.field(crate::table::SPECIES_COLUMN_INDEX);
        if label_field.name() != SPECIES_COLUMN_NAME {
            return Err(Error::Validation(format!(
                "expected label column {SPECIES_COLUMN_NAME}, found {}",
                label_field.name()
            )));
        }
        if label_field.data_type() != &DataType::Utf8 {
            return Err(Error::Validation(format!(
                "label column has dtype {}, expected Utf8",
                label_field.data_type()
            )));
        }

        let mut columns = Vec::with_capacity(schema.fields().len());
        for feature in Feature::ALL {
            let array = table.feature_array(feature)?;
            for row in 0..array.len() {
                if !array.is_null(row) && !array.value(row).is_finite() {
                    return Err(Error::Validation(format!(
                        "non-finite value in column {} at row {row}",
                        feature.column_name()
                    )));
                }
            }
            columns.push(ColumnInfo {
                name: feature.column_name().to_string(),
                dtype: DataType::Float64.to_string(),
                missing: array.null_count(),
            });
        }

        let labels = table.species_array()?;
        let mut seen = [false; 3];
        for row in 0..labels.len() {
            if labels.is_null(row) {
                continue;
            }
            let name = labels.value(row);
            let species = Species::from_name(name).ok_or_else(|| {
                Error::Validation(format!("unknown species label {name:?} at row {row}"))
            })?;
            seen[species as usize] = true;
        }
        columns.push(ColumnInfo {
            name: SPECIES_COLUMN_NAME.to_string(),
            dtype: DataType::Utf8.to_string(),
            missing: labels.null_count(),
        });

        let species_observed = Species::ALL
            .into_iter()
            .zip(seen)
            .filter_map(|(species, present)| present.then_some(species))
            .collect();

        Ok(Self {
            rows: table.num_rows(),
            feature_columns: Feature::ALL.len(),
            columns,
            species_observed,
        })
    }

    /// Total missing cells across all columns.
    #[must_use]
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing).sum()
    }

    /// True when no column has missing values.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.total_missing() == 0
    }
}

/// Validate a table, returning its profile on success.
///
/// Invariants, in check order: row count > 0, the fixed feature schema,
/// labels within the closed set, zero missing values.
///
/// # Errors
/// Returns [`Error::Validation`] on any violation.
pub fn validate(table: &Table) -> Result<TableProfile> {
    if table.num_rows() == 0 {
        return Err(Error::Validation("table has no rows".to_string()));
    }

    let profile = TableProfile::scan(table)?;

    let missing = profile.total_missing();
    if missing > 0 {
        return Err(Error::Validation(format!(
            "{missing} missing value(s) across {} column(s)",
            profile.columns.iter().filter(|c| c.missing > 0).count()
        )));
    }

    info!(
        rows = profile.rows,
        features = profile.feature_columns,
        species = profile.species_observed.len(),
        "table validated"
    );
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    fn batch_with(petal_width: Float64Array, labels: StringArray) -> Table {
        let n = petal_width.len();
        let schema = Schema::new(vec![
            Field::new("sepal_length_cm", DataType::Float64, true),
            Field::new("sepal_width_cm", DataType::Float64, true),
            Field::new("petal_length_cm", DataType::Float64, true),
            Field::new("petal_width_cm", DataType::Float64, true),
            Field::new("species", DataType::Utf8, true),
        ]);
        let fill = Float64Array::from(vec![1.0; n]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(fill.clone()),
                Arc::new(fill.clone()),
                Arc::new(fill),
                Arc::new(petal_width),
                Arc::new(labels),
            ],
        )
        .unwrap();
        Table::from_batch(batch).unwrap()
    }

    #[test]
    fn test_fixed_dataset_is_clean() {
        let table = crate::dataset::load().unwrap();
        let profile = validate(&table).unwrap();
        assert_eq!(profile.rows, 150);
        assert_eq!(profile.feature_columns, 4);
        assert!(profile.is_clean());
        assert_eq!(profile.species_observed, Species::ALL.to_vec());
    }

    #[test]
    fn test_missing_values_are_counted_and_rejected() {
        let table = batch_with(
            Float64Array::from(vec![Some(0.2), None, Some(1.8)]),
            StringArray::from(vec!["setosa", "setosa", "virginica"]),
        );

        // Counting logic is observable on its own through the scan.
        let profile = TableProfile::scan(&table).unwrap();
        assert_eq!(profile.total_missing(), 1);
        assert!(!profile.is_clean());
        assert_eq!(profile.columns[3].missing, 1);

        // And the invariant halts validation.
        let err = validate(&table).unwrap_err();
        assert!(err.to_string().contains("missing value"));
    }

    #[test]
    fn test_empty_table_rejected() {
        let table = batch_with(
            Float64Array::from(Vec::<f64>::new()),
            StringArray::from(Vec::<&str>::new()),
        );
        let err = validate(&table).unwrap_err();
        assert!(err.to_string().contains("no rows"));
    }

    #[test]
    fn test_unknown_label_rejected() {
        let table = batch_with(
            Float64Array::from(vec![0.2]),
            StringArray::from(vec!["rosa"]),
        );
        let err = validate(&table).unwrap_err();
        assert!(err.to_string().contains("unknown species label"));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let table = batch_with(
            Float64Array::from(vec![f64::NAN]),
            StringArray::from(vec!["setosa"]),
        );
        let err = validate(&table).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn test_observed_species_subset() {
        let table = batch_with(
            Float64Array::from(vec![0.2, 0.3]),
            StringArray::from(vec!["setosa", "setosa"]),
        );
        let profile = validate(&table).unwrap();
        assert_eq!(profile.species_observed, vec![Species::Setosa]);
    }
}
