//! Pipeline orchestration
//!
//! One function sequences the four stages — load, validate, aggregate,
//! report — and is the single boundary where stage errors are caught. It
//! returns a tagged [`RunOutcome`] instead of propagating: the caller always
//! gets a value to narrate, never a panic or an escaped error. A failed
//! persistence step after a successful render is a distinct, partially
//! successful outcome (the charts exist in memory, the files do not).
//!
//! No stage has side effects before persistence, so there is nothing to
//! clean up on failure and no retry policy; each run is one shot.

use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::report::{Reporter, SavedReport, Theme, OUTPUT_PREFIX};
use crate::stats::{self, FeatureSummary, SpeciesMeans, SpeciesSummary};
use crate::table::Table;
use crate::validate::{self, TableProfile};
use crate::{dataset, Error};

/// Fixed configuration of one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory both output files are written into
    pub output_dir: PathBuf,
    /// Stem prefix of the output files
    pub prefix: String,
    /// Visual configuration handed to the reporter
    pub theme: Theme,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            prefix: OUTPUT_PREFIX.to_string(),
            theme: Theme::default(),
        }
    }
}

/// Pipeline stage names, for failure reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    /// Dataset materialization
    Load,
    /// Structural validation
    Validate,
    /// Descriptive statistics
    Aggregate,
    /// Chart rendering
    Render,
    /// Artifact persistence
    Persist,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Load => "load",
            Self::Validate => "validate",
            Self::Aggregate => "aggregate",
            Self::Render => "render",
            Self::Persist => "persist",
        })
    }
}

/// Where and why a run stopped short.
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    /// Stage that failed
    pub stage: Stage,
    /// Stable error-kind name
    pub kind: &'static str,
    /// Human-readable message
    pub message: String,
    /// Remediation hint, when one exists
    pub hint: Option<String>,
}

impl FailureReport {
    fn new(stage: Stage, err: &Error) -> Self {
        let hint = match err {
            Error::PermissionDenied { path, .. } => Some(format!(
                "check the permissions of {}",
                path.parent()
                    .unwrap_or_else(|| std::path::Path::new("."))
                    .display()
            )),
            _ => None,
        };
        Self {
            stage,
            kind: err.kind(),
            message: err.to_string(),
            hint,
        }
    }
}

/// Everything the analysis stages produced, kept for narration.
#[derive(Debug)]
pub struct Analysis {
    /// The loaded table
    pub table: Table,
    /// Validation profile
    pub profile: TableProfile,
    /// Overall summaries, one per feature
    pub overall: Vec<FeatureSummary>,
    /// Grouped summaries, one per observed species
    pub by_species: Vec<SpeciesSummary>,
    /// Per-species mean matrix fed to the charts
    pub species_means: Vec<SpeciesMeans>,
}

/// Tagged result of one run.
#[derive(Debug)]
pub enum RunOutcome {
    /// All stages completed; both artifacts are on disk.
    Completed {
        /// Stage results
        analysis: Analysis,
        /// Persisted file pair
        saved: SavedReport,
    },
    /// Charts were built in memory but could not be persisted.
    ChartsNotPersisted {
        /// Stage results
        analysis: Analysis,
        /// The persistence failure
        failure: FailureReport,
    },
    /// A stage failed before any charts existed.
    Failed {
        /// The failure
        failure: FailureReport,
    },
}

impl RunOutcome {
    /// Stage results, when the analysis stages completed.
    #[must_use]
    pub const fn analysis(&self) -> Option<&Analysis> {
        match self {
            Self::Completed { analysis, .. } | Self::ChartsNotPersisted { analysis, .. } => {
                Some(analysis)
            }
            Self::Failed { .. } => None,
        }
    }

    /// The failure report, when anything went wrong.
    #[must_use]
    pub const fn failure(&self) -> Option<&FailureReport> {
        match self {
            Self::Completed { .. } => None,
            Self::ChartsNotPersisted { failure, .. } | Self::Failed { failure } => Some(failure),
        }
    }

    /// Persisted paths, when both files landed.
    #[must_use]
    pub const fn saved(&self) -> Option<&SavedReport> {
        match self {
            Self::Completed { saved, .. } => Some(saved),
            _ => None,
        }
    }
}

/// Run the pipeline once.
///
/// Never panics and never returns an error; every stage failure is folded
/// into the outcome.
#[must_use]
pub fn run(config: &RunConfig) -> RunOutcome {
    info!(output_dir = %config.output_dir.display(), "pipeline started");

    let table = match dataset::load() {
        Ok(table) => table,
        Err(e) => return fail(Stage::Load, &e),
    };
    info!(rows = table.num_rows(), "dataset loaded");

    let profile = match validate::validate(&table) {
        Ok(profile) => profile,
        Err(e) => return fail(Stage::Validate, &e),
    };

    let (overall, by_species, species_means) = match aggregate(&table) {
        Ok(aggregates) => aggregates,
        Err(e) => return fail(Stage::Aggregate, &e),
    };
    info!(groups = by_species.len(), "aggregates computed");

    let analysis = Analysis {
        table,
        profile,
        overall,
        by_species,
        species_means,
    };

    let reporter = Reporter::new(config.theme.clone());
    let artifact = match reporter.render(&analysis.table, &analysis.species_means) {
        Ok(artifact) => artifact,
        Err(e) => return fail(Stage::Render, &e),
    };

    match artifact.persist_into(&config.output_dir, &config.prefix, Local::now()) {
        Ok(saved) => {
            info!("pipeline completed");
            RunOutcome::Completed { analysis, saved }
        }
        Err(e) => {
            warn!(error = %e, "charts built but not persisted");
            RunOutcome::ChartsNotPersisted {
                analysis,
                failure: FailureReport::new(Stage::Persist, &e),
            }
        }
    }
}

type Aggregates = (
    Vec<FeatureSummary>,
    Vec<SpeciesSummary>,
    Vec<SpeciesMeans>,
);

fn aggregate(table: &Table) -> crate::Result<Aggregates> {
    Ok((
        stats::describe(table)?,
        stats::describe_by_species(table)?,
        stats::species_feature_means(table)?,
    ))
}

fn fail(stage: Stage, err: &Error) -> RunOutcome {
    error!(stage = %stage, error = %err, "pipeline stage failed");
    RunOutcome::Failed {
        failure: FailureReport::new(stage, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_completes_into_tempdir() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            output_dir: dir.path().to_path_buf(),
            theme: Theme {
                figure_size: (640, 480),
                raster_scale: 1,
                ..Theme::default()
            },
            ..RunConfig::default()
        };
        let outcome = run(&config);
        let saved = outcome.saved().expect("run should complete");
        assert!(saved.vector_path.exists());
        assert!(saved.raster_path.exists());

        let analysis = outcome.analysis().unwrap();
        assert_eq!(analysis.profile.rows, 150);
        assert_eq!(analysis.by_species.len(), 3);
    }

    #[test]
    fn test_unwritable_destination_is_partial_success() {
        let config = RunConfig {
            output_dir: PathBuf::from("/nonexistent-output-dir"),
            theme: Theme {
                figure_size: (640, 480),
                raster_scale: 1,
                ..Theme::default()
            },
            ..RunConfig::default()
        };
        let outcome = run(&config);
        match outcome {
            RunOutcome::ChartsNotPersisted { failure, .. } => {
                assert_eq!(failure.stage, Stage::Persist);
            }
            other => panic!("expected partial success, got {other:?}"),
        }
    }
}
