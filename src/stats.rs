//! Descriptive statistics
//!
//! Mean, median, sample standard deviation, minimum and maximum per feature,
//! computed overall and grouped by species. Grouping iterates the closed
//! label set in its fixed order so repeated runs report categories in the
//! same sequence regardless of row order; a species with no observed rows is
//! omitted entirely rather than reported as a zero or NaN row.

use serde::Serialize;
use tracing::debug;

use crate::table::{Feature, Species, Table};
use crate::{Error, Result};

/// Five-number descriptive summary of one feature over one grouping.
///
/// Standard deviation is the sample deviation (denominator n − 1); a group
/// of one record reports 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateSummary {
    /// Arithmetic mean
    pub mean: f64,
    /// Median (midpoint of the two central order statistics for even sizes)
    pub median: f64,
    /// Sample standard deviation
    pub std_dev: f64,
    /// Minimum
    pub min: f64,
    /// Maximum
    pub max: f64,
}

impl AggregateSummary {
    /// Summarize a non-empty sample. Returns `None` for an empty slice.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;

        let std_dev = if samples.len() < 2 {
            0.0
        } else {
            let ss = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (ss / (n - 1.0)).sqrt()
        };

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(Self {
            mean,
            median,
            std_dev,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Summary of one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSummary {
    /// The summarized feature
    pub feature: Feature,
    /// Its five-number summary
    pub summary: AggregateSummary,
}

/// Summaries of every feature for one species group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesSummary {
    /// The group's species
    pub species: Species,
    /// Number of records in the group
    pub count: usize,
    /// One summary per feature, in schema order
    pub features: Vec<FeatureSummary>,
}

/// Per-species mean of every feature, the subset chart rendering consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeciesMeans {
    /// The group's species
    pub species: Species,
    /// Mean per feature, in schema order
    pub means: [f64; 4],
}

/// Overall summary of every feature, in schema order.
///
/// # Errors
/// Returns [`Error::Validation`] on an empty table or malformed columns
/// (neither occurs post-validation).
pub fn describe(table: &Table) -> Result<Vec<FeatureSummary>> {
    let mut out = Vec::with_capacity(Feature::ALL.len());
    for feature in Feature::ALL {
        let values = table.feature_values(feature, None)?;
        let summary = AggregateSummary::from_samples(&values).ok_or_else(|| {
            Error::Validation(format!("no values to summarize for {feature}"))
        })?;
        out.push(FeatureSummary { feature, summary });
    }
    debug!(features = out.len(), "overall statistics computed");
    Ok(out)
}

/// Per-species summaries of every feature, species in closed-set order.
/// Species with no observed records are skipped.
///
/// # Errors
/// Returns [`Error::Validation`] on malformed columns.
pub fn describe_by_species(table: &Table) -> Result<Vec<SpeciesSummary>> {
    let mut out = Vec::with_capacity(Species::ALL.len());
    for species in Species::ALL {
        let mut features = Vec::with_capacity(Feature::ALL.len());
        let mut count = 0;
        for feature in Feature::ALL {
            let values = table.feature_values(feature, Some(species))?;
            count = values.len();
            let Some(summary) = AggregateSummary::from_samples(&values) else {
                break;
            };
            features.push(FeatureSummary { feature, summary });
        }
        if features.len() == Feature::ALL.len() {
            out.push(SpeciesSummary {
                species,
                count,
                features,
            });
        }
    }
    debug!(groups = out.len(), "grouped statistics computed");
    Ok(out)
}

/// Per-species mean matrix for chart rendering. Empty groups are skipped,
/// matching [`describe_by_species`].
///
/// # Errors
/// Returns [`Error::Validation`] on malformed columns.
pub fn species_feature_means(table: &Table) -> Result<Vec<SpeciesMeans>> {
    let mut out = Vec::with_capacity(Species::ALL.len());
    for species in Species::ALL {
        let mut means = [0.0_f64; 4];
        let mut empty = false;
        for feature in Feature::ALL {
            let values = table.feature_values(feature, Some(species))?;
            if values.is_empty() {
                empty = true;
                break;
            }
            #[allow(clippy::cast_precision_loss)]
            {
                means[feature.column_index()] =
                    values.iter().sum::<f64>() / values.len() as f64;
            }
        }
        if !empty {
            out.push(SpeciesMeans { species, means });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_summary_of_known_sample() {
        let s = AggregateSummary::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0])
            .unwrap();
        assert!((s.mean - 5.0).abs() < EPS);
        assert!((s.median - 4.5).abs() < EPS);
        // Sample variance of this classic sample is 32/7.
        assert!((s.std_dev - (32.0_f64 / 7.0).sqrt()).abs() < EPS);
        assert!((s.min - 2.0).abs() < EPS);
        assert!((s.max - 9.0).abs() < EPS);
    }

    #[test]
    fn test_summary_empty_and_singleton() {
        assert!(AggregateSummary::from_samples(&[]).is_none());
        let s = AggregateSummary::from_samples(&[3.25]).unwrap();
        assert!((s.mean - 3.25).abs() < EPS);
        assert!((s.median - 3.25).abs() < EPS);
        assert!((s.std_dev - 0.0).abs() < EPS);
    }

    #[test]
    fn test_median_odd_sample() {
        let s = AggregateSummary::from_samples(&[9.0, 1.0, 5.0]).unwrap();
        assert!((s.median - 5.0).abs() < EPS);
    }

    #[test]
    fn test_describe_by_species_skips_empty_groups() {
        // A table observed with a single species must yield a single group.
        let table = crate::dataset::load().unwrap();
        let labels = table.species_array().unwrap();
        let keep: Vec<bool> = (0..table.num_rows())
            .map(|row| labels.value(row) == Species::Setosa.name())
            .collect();
        let mask = arrow::array::BooleanArray::from(keep);
        let filtered =
            arrow::compute::filter_record_batch(table.batch(), &mask).unwrap();
        let setosa_only = Table::from_batch(filtered).unwrap();

        let groups = describe_by_species(&setosa_only).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].species, Species::Setosa);
        assert_eq!(groups[0].count, 50);

        let means = species_feature_means(&setosa_only).unwrap();
        assert_eq!(means.len(), 1);
    }

    #[test]
    fn test_groups_follow_closed_set_order() {
        let table = crate::dataset::load().unwrap();
        let groups = describe_by_species(&table).unwrap();
        let order: Vec<Species> = groups.iter().map(|g| g.species).collect();
        assert_eq!(order, Species::ALL.to_vec());
    }

    #[test]
    fn test_determinism() {
        let table = crate::dataset::load().unwrap();
        let a = describe(&table).unwrap();
        let b = describe(&table).unwrap();
        // Bit-identical, not merely close.
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.summary.mean.to_bits(), y.summary.mean.to_bits());
            assert_eq!(x.summary.std_dev.to_bits(), y.summary.std_dev.to_bits());
            assert_eq!(x.summary.median.to_bits(), y.summary.median.to_bits());
        }
        assert_eq!(
            describe_by_species(&table).unwrap(),
            describe_by_species(&table).unwrap()
        );
    }
}
