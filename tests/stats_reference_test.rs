//! Reference checks for the aggregation stage
//!
//! The fixed dataset has well-known published statistics; the overall means
//! and extrema must reproduce them to tight tolerance, and grouping must
//! follow the closed species order without phantom groups.

use iris_eda::stats::{describe, describe_by_species, species_feature_means};
use iris_eda::table::{Feature, Species};
use iris_eda::{dataset, validate};

const TOL: f64 = 1e-6;

/// Published overall means, in schema order.
const REFERENCE_MEANS: [f64; 4] = [5.843_333_333_333_334, 3.057_333_333_333_333, 3.758, 1.199_333_333_333_333];

#[test]
fn test_overall_means_match_reference() {
    let table = dataset::load().unwrap();
    let overall = describe(&table).unwrap();

    for (summary, expected) in overall.iter().zip(REFERENCE_MEANS) {
        assert!(
            (summary.summary.mean - expected).abs() < TOL,
            "{}: mean {} != {expected}",
            summary.feature,
            summary.summary.mean
        );
    }
}

#[test]
fn test_overall_extrema_and_medians() {
    let table = dataset::load().unwrap();
    let overall = describe(&table).unwrap();

    let by_feature = |f: Feature| overall[f.column_index()].summary;

    let sl = by_feature(Feature::SepalLength);
    assert!((sl.min - 4.3).abs() < TOL);
    assert!((sl.max - 7.9).abs() < TOL);
    assert!((sl.median - 5.8).abs() < TOL);

    let pl = by_feature(Feature::PetalLength);
    assert!((pl.min - 1.0).abs() < TOL);
    assert!((pl.max - 6.9).abs() < TOL);
    assert!((pl.median - 4.35).abs() < TOL);

    // Published sample standard deviation of sepal length.
    assert!((sl.std_dev - 0.828_066_127_977_863).abs() < TOL);
}

#[test]
fn test_group_ordering_and_petal_separation() {
    let table = dataset::load().unwrap();
    let groups = describe_by_species(&table).unwrap();

    // One group per observed species, in closed-set order, no phantom rows.
    assert_eq!(groups.len(), 3);
    assert_eq!(
        groups.iter().map(|g| g.species).collect::<Vec<_>>(),
        Species::ALL.to_vec()
    );
    for group in &groups {
        assert_eq!(group.count, 50);
        assert_eq!(group.features.len(), 4);
    }

    // Setosa petals are far smaller than virginica petals.
    let petal = |s: Species| {
        groups
            .iter()
            .find(|g| g.species == s)
            .unwrap()
            .features[Feature::PetalLength.column_index()]
            .summary
            .mean
    };
    assert!(petal(Species::Setosa) < petal(Species::Virginica));
    assert!((petal(Species::Setosa) - 1.462).abs() < TOL);
    assert!((petal(Species::Virginica) - 5.552).abs() < TOL);
}

#[test]
fn test_summary_invariants_hold_per_group() {
    let table = dataset::load().unwrap();
    for group in describe_by_species(&table).unwrap() {
        for fs in &group.features {
            let s = fs.summary;
            assert!(s.std_dev >= 0.0);
            assert!(s.min <= s.mean && s.mean <= s.max);
            assert!(s.min <= s.median && s.median <= s.max);
        }
    }
}

#[test]
fn test_chart_means_agree_with_group_summaries() {
    let table = dataset::load().unwrap();
    let groups = describe_by_species(&table).unwrap();
    let means = species_feature_means(&table).unwrap();

    assert_eq!(groups.len(), means.len());
    for (group, row) in groups.iter().zip(&means) {
        assert_eq!(group.species, row.species);
        for fs in &group.features {
            let m = row.means[fs.feature.column_index()];
            assert_eq!(fs.summary.mean.to_bits(), m.to_bits());
        }
    }
}

#[test]
fn test_aggregation_is_bit_deterministic() {
    let table = dataset::load().unwrap();
    validate::validate(&table).unwrap();

    let first = describe(&table).unwrap();
    let second = describe(&table).unwrap();
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.summary.mean.to_bits(), b.summary.mean.to_bits());
        assert_eq!(a.summary.median.to_bits(), b.summary.median.to_bits());
        assert_eq!(a.summary.std_dev.to_bits(), b.summary.std_dev.to_bits());
        assert_eq!(a.summary.min.to_bits(), b.summary.min.to_bits());
        assert_eq!(a.summary.max.to_bits(), b.summary.max.to_bits());
    }
}
