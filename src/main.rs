//! Binary entry point
//!
//! Runs the pipeline once and narrates the result on stdout: dataset
//! overview, descriptive statistics, qualitative observations, export
//! confirmation and a final summary. Diagnostic logging goes to stderr via
//! `RUST_LOG`. The process always completes with exit code 0; failures are
//! reported through the narration, and the completion banner prints on every
//! path.

use arrow::util::pretty::pretty_format_batches;

use iris_eda::pipeline::{self, Analysis, RunConfig, RunOutcome};
use iris_eda::stats::{AggregateSummary, SpeciesSummary};
use iris_eda::table::Feature;

fn main() {
    init_tracing();

    let config = RunConfig::default();
    let outcome = pipeline::run(&config);

    narrate(&outcome);

    // Fixed finalization: printed on every path, success or not.
    println!("\nAnalysis completed. Check the output files for visualizations.");
    print_summary(&outcome);
}

/// Route diagnostics to stderr so the narration owns stdout.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn banner(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

fn narrate(outcome: &RunOutcome) {
    let Some(analysis) = outcome.analysis() else {
        if let Some(failure) = outcome.failure() {
            banner("PIPELINE FAILURE");
            println!(
                "\nAn error occurred during the {} stage: {}",
                failure.stage, failure.message
            );
            if let Some(hint) = &failure.hint {
                println!("Hint: {hint}");
            }
        }
        return;
    };

    narrate_dataset(analysis);
    narrate_statistics(analysis);
    narrate_export(outcome);
}

fn narrate_dataset(analysis: &Analysis) {
    banner("DATASET OVERVIEW");

    println!("\nFirst 5 rows of the dataset:");
    match pretty_format_batches(&[analysis.table.head(5)]) {
        Ok(preview) => println!("{preview}"),
        Err(e) => println!("(table preview unavailable: {e})"),
    }

    println!("Number of samples: {}", analysis.profile.rows);
    println!("Number of features: {}", analysis.profile.feature_columns);
    println!(
        "Species categories: {}",
        analysis
            .profile
            .species_observed
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    println!("\nData types:");
    for column in &analysis.profile.columns {
        println!("  {:<18} {}", column.name, column.dtype);
    }

    println!("\nMissing values per column:");
    for column in &analysis.profile.columns {
        println!("  {:<18} {}", column.name, column.missing);
    }
    if analysis.profile.is_clean() {
        println!("\nNo missing values found - dataset is clean.");
    }
}

fn narrate_statistics(analysis: &Analysis) {
    banner("DESCRIPTIVE STATISTICS");

    type Extract = fn(&AggregateSummary) -> f64;
    let rows: [(&str, Extract); 5] = [
        ("mean", |s| s.mean),
        ("median", |s| s.median),
        ("std", |s| s.std_dev),
        ("min", |s| s.min),
        ("max", |s| s.max),
    ];

    println!("\nOverall statistics for numerical features:");
    print!("{:<10}", "");
    for feature in Feature::ALL {
        print!("{:>20}", feature.column_name());
    }
    println!();
    for (name, extract) in rows {
        print!("{name:<10}");
        for summary in &analysis.overall {
            print!("{:>20.6}", extract(&summary.summary));
        }
        println!();
    }

    println!("\nStatistics grouped by species:");
    for group in &analysis.by_species {
        println!("\n{} (n = {}):", group.species, group.count);
        for fs in &group.features {
            let s = fs.summary;
            println!(
                "  {:<18} mean={:>6.3}  median={:>6.3}  std={:>6.3}  min={:>4.1}  max={:>4.1}",
                fs.feature.column_name(),
                s.mean,
                s.median,
                s.std_dev,
                s.min,
                s.max
            );
        }
    }

    print_observations(analysis);
}

/// Qualitative observations derived from the grouped aggregates.
fn print_observations(analysis: &Analysis) {
    println!("\nKey observations:");

    let petal_mean = |g: &&SpeciesSummary| {
        g.features[Feature::PetalLength.column_index()].summary.mean
    };
    let groups = &analysis.by_species;

    if let (Some(smallest), Some(largest)) = (
        groups.iter().min_by(|a, b| petal_mean(a).total_cmp(&petal_mean(b))),
        groups.iter().max_by(|a, b| petal_mean(a).total_cmp(&petal_mean(b))),
    ) {
        if smallest.species != largest.species {
            println!(
                "1. {} has the smallest petals on average ({:.2} cm, vs {:.2} cm for {})",
                smallest.species,
                petal_mean(&smallest),
                petal_mean(&largest),
                largest.species
            );
        }
    }

    let sepal_len = |g: &&SpeciesSummary| {
        g.features[Feature::SepalLength.column_index()].summary.mean
    };
    if let Some(longest) = groups.iter().max_by(|a, b| sepal_len(a).total_cmp(&sepal_len(b))) {
        println!(
            "2. {} has the longest sepals (mean {:.2} cm)",
            longest.species,
            sepal_len(&longest)
        );
    }

    let sepal_width = |g: &&SpeciesSummary| {
        g.features[Feature::SepalWidth.column_index()].summary.mean
    };
    if let Some(widest) = groups.iter().max_by(|a, b| sepal_width(a).total_cmp(&sepal_width(b))) {
        println!(
            "3. {} has the widest sepals on average (mean {:.2} cm)",
            widest.species,
            sepal_width(&widest)
        );
    }

    let spread = |feature: Feature| {
        analysis.overall[feature.column_index()].summary.std_dev
    };
    let petal_spread = spread(Feature::PetalLength) + spread(Feature::PetalWidth);
    let sepal_spread = spread(Feature::SepalLength) + spread(Feature::SepalWidth);
    if petal_spread > sepal_spread {
        println!("4. Petal measurements show more variation than sepal measurements");
    } else {
        println!("4. Sepal measurements show more variation than petal measurements");
    }
}

fn narrate_export(outcome: &RunOutcome) {
    banner("VISUALIZATION & EXPORT");

    match outcome {
        RunOutcome::Completed { saved, .. } => {
            println!("\nVisualizations saved successfully:");
            println!("- SVG: {}", saved.vector_path.display());
            println!("- PNG: {}", saved.raster_path.display());
        }
        RunOutcome::ChartsNotPersisted { failure, .. } => {
            println!(
                "\nError: charts were built but could not be saved: {}",
                failure.message
            );
            if let Some(hint) = &failure.hint {
                println!("Hint: {hint}");
            }
        }
        RunOutcome::Failed { .. } => {}
    }
}

fn print_summary(outcome: &RunOutcome) {
    banner("ANALYSIS SUMMARY");

    match outcome.analysis() {
        Some(analysis) => {
            println!(
                "1. Dataset loaded and validated ({} samples, {} features)",
                analysis.profile.rows, analysis.profile.feature_columns
            );
            println!(
                "2. Statistics computed overall and for {} species groups",
                analysis.by_species.len()
            );
            println!("3. Visualizations created:");
            println!("   - Feature means comparison");
            println!("   - Sepal width comparison");
            println!("   - Petal length distribution");
            println!("   - Sepal-petal length relationship");
        }
        None => {
            if let Some(failure) = outcome.failure() {
                println!(
                    "1. Pipeline failed during the {} stage: {}",
                    failure.stage, failure.message
                );
            }
        }
    }

    if outcome.saved().is_some() {
        println!("\nThe visualizations show that the species separate most");
        println!("clearly on petal measurements.");
    } else if let Some(failure) = outcome.failure() {
        println!("\nRun finished with a reported problem ({}).", failure.kind);
    }
}
