//! Fixed-schema measurement table
//!
//! One Arrow [`RecordBatch`] behind an immutable wrapper: four `Float64`
//! measurement columns followed by one `Utf8` label column. The table is
//! created once by the loader and only ever read after that.

use arrow::array::{Array, Float64Array, StringArray};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use serde::Serialize;

use crate::{Error, Result};

/// Total column count of the fixed schema (four features + the label).
pub const COLUMN_COUNT: usize = 5;

/// Index of the label column within the fixed schema.
pub const SPECIES_COLUMN_INDEX: usize = 4;

/// Column name of the label column.
pub const SPECIES_COLUMN_NAME: &str = "species";

/// One of the four numeric measurement columns.
///
/// `ALL` fixes both the schema order and the reporting order everywhere the
/// features are iterated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Feature {
    /// Sepal length in centimeters
    SepalLength,
    /// Sepal width in centimeters
    SepalWidth,
    /// Petal length in centimeters
    PetalLength,
    /// Petal width in centimeters
    PetalWidth,
}

impl Feature {
    /// All features, in schema order.
    pub const ALL: [Self; 4] = [
        Self::SepalLength,
        Self::SepalWidth,
        Self::PetalLength,
        Self::PetalWidth,
    ];

    /// Column index within the fixed schema.
    #[must_use]
    pub const fn column_index(self) -> usize {
        match self {
            Self::SepalLength => 0,
            Self::SepalWidth => 1,
            Self::PetalLength => 2,
            Self::PetalWidth => 3,
        }
    }

    /// Column name as it appears in the schema.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::SepalLength => "sepal_length_cm",
            Self::SepalWidth => "sepal_width_cm",
            Self::PetalLength => "petal_length_cm",
            Self::PetalWidth => "petal_width_cm",
        }
    }

    /// Human-readable label for chart axes and narration.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SepalLength => "Sepal Length (cm)",
            Self::SepalWidth => "Sepal Width (cm)",
            Self::PetalLength => "Petal Length (cm)",
            Self::PetalWidth => "Petal Width (cm)",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the closed set of category labels.
///
/// `ALL` fixes the reporting order; grouped statistics iterate this order,
/// never first-appearance order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Species {
    /// Iris setosa
    Setosa,
    /// Iris versicolor
    Versicolor,
    /// Iris virginica
    Virginica,
}

impl Species {
    /// All species, in reporting order.
    pub const ALL: [Self; 3] = [Self::Setosa, Self::Versicolor, Self::Virginica];

    /// Human-readable category name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Setosa => "setosa",
            Self::Versicolor => "versicolor",
            Self::Virginica => "virginica",
        }
    }

    /// Decode the dataset's internal integer code.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Setosa),
            1 => Some(Self::Versicolor),
            2 => Some(Self::Virginica),
            _ => None,
        }
    }

    /// Parse a decoded category name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable measurement table over one record batch.
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    /// Wrap a record batch.
    ///
    /// Only the column count is enforced here so that the typed accessors
    /// stay in bounds; dtype, label and missing-value invariants belong to
    /// [`crate::validate::validate`].
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the batch does not have exactly
    /// [`COLUMN_COUNT`] columns.
    pub fn from_batch(batch: RecordBatch) -> Result<Self> {
        if batch.num_columns() != COLUMN_COUNT {
            return Err(Error::Validation(format!(
                "expected {COLUMN_COUNT} columns, got {}",
                batch.num_columns()
            )));
        }
        Ok(Self { batch })
    }

    /// Number of records.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Schema of the underlying batch.
    #[must_use]
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Underlying record batch.
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// First `n` records, for narration.
    #[must_use]
    pub fn head(&self, n: usize) -> RecordBatch {
        self.batch.slice(0, n.min(self.batch.num_rows()))
    }

    /// Typed access to one measurement column.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the column is not `Float64`.
    pub fn feature_array(&self, feature: Feature) -> Result<&Float64Array> {
        self.batch
            .column(feature.column_index())
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| {
                Error::Validation(format!(
                    "column {} is not Float64",
                    feature.column_name()
                ))
            })
    }

    /// Typed access to the label column.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the column is not `Utf8`.
    pub fn species_array(&self) -> Result<&StringArray> {
        self.batch
            .column(SPECIES_COLUMN_INDEX)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                Error::Validation(format!("column {SPECIES_COLUMN_NAME} is not Utf8"))
            })
    }

    /// Values of one measurement column, optionally restricted to rows of one
    /// species. Null cells are rejected; the loader never produces them and
    /// validation runs before any aggregation.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] on dtype mismatch or a null cell.
    pub fn feature_values(&self, feature: Feature, only: Option<Species>) -> Result<Vec<f64>> {
        let values = self.feature_array(feature)?;
        let labels = self.species_array()?;

        let mut out = Vec::with_capacity(values.len());
        for row in 0..values.len() {
            if let Some(species) = only {
                if labels.is_null(row) || labels.value(row) != species.name() {
                    continue;
                }
            }
            if values.is_null(row) {
                return Err(Error::Validation(format!(
                    "null value in column {} at row {row}",
                    feature.column_name()
                )));
            }
            out.push(values.value(row));
        }
        Ok(out)
    }
}
