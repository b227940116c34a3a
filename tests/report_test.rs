//! Integration tests for the reporting stage

use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use iris_eda::report::{Reporter, Theme, OUTPUT_PREFIX};
use iris_eda::stats::species_feature_means;
use iris_eda::table::Table;
use iris_eda::{dataset, stats};

/// A small table with two records per species.
fn two_per_species_table() -> Table {
    let schema = Schema::new(vec![
        Field::new("sepal_length_cm", DataType::Float64, false),
        Field::new("sepal_width_cm", DataType::Float64, false),
        Field::new("petal_length_cm", DataType::Float64, false),
        Field::new("petal_width_cm", DataType::Float64, false),
        Field::new("species", DataType::Utf8, false),
    ]);
    let batch = RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(Float64Array::from(vec![5.1, 4.9, 7.0, 6.4, 6.3, 5.8])),
            Arc::new(Float64Array::from(vec![3.5, 3.0, 3.2, 3.2, 3.3, 2.7])),
            Arc::new(Float64Array::from(vec![1.4, 1.4, 4.7, 4.5, 6.0, 5.1])),
            Arc::new(Float64Array::from(vec![0.2, 0.2, 1.4, 1.5, 2.5, 1.9])),
            Arc::new(StringArray::from(vec![
                "setosa",
                "setosa",
                "versicolor",
                "versicolor",
                "virginica",
                "virginica",
            ])),
        ],
    )
    .unwrap();
    Table::from_batch(batch).unwrap()
}

#[test]
fn test_four_specs_cover_the_grid() {
    let specs = Reporter::new(Theme::default()).chart_specs();
    assert_eq!(specs.len(), 4);
    for spec in &specs {
        assert!(!spec.title.is_empty());
        assert!(!spec.x_label.is_empty());
        assert!(!spec.y_label.is_empty());
        assert!(spec.by_species);
    }
}

#[test]
fn test_render_full_dataset_at_production_geometry() {
    let table = dataset::load().unwrap();
    let means = stats::species_feature_means(&table).unwrap();
    let artifact = Reporter::new(Theme::default()).render(&table, &means).unwrap();

    assert!(artifact.svg().contains("<svg"));
    // Every panel title must make it into the vector output.
    for spec in Reporter::new(Theme::default()).chart_specs() {
        assert!(
            artifact.svg().contains(&spec.title),
            "missing panel title {:?}",
            spec.title
        );
    }
    assert!(!artifact.png().is_empty());
}

#[test]
fn test_render_succeeds_with_two_records_per_group() {
    let table = two_per_species_table();
    let means = species_feature_means(&table).unwrap();
    assert_eq!(means.len(), 3);

    let theme = Theme {
        figure_size: (640, 480),
        raster_scale: 1,
        ..Theme::default()
    };
    let artifact = Reporter::new(theme).render(&table, &means).unwrap();
    assert!(artifact.svg().contains("<svg"));
    assert!(!artifact.png().is_empty());
}

#[test]
fn test_output_prefix_is_fixed() {
    assert_eq!(OUTPUT_PREFIX, "iris_analysis_report");
}
