//! # iris-eda: Single-Pass Exploratory Analysis & Reporting
//!
//! Loads the fixed 150-row Iris measurements dataset, validates its
//! structure, computes descriptive statistics overall and per species, and
//! renders a four-panel chart report persisted as a timestamped SVG + PNG
//! pair.
//!
//! The pipeline is strictly sequential — load → validate → aggregate →
//! report — with a single orchestration boundary that folds every stage
//! failure into a tagged outcome. Nothing touches the filesystem until the
//! final persistence step.
//!
//! ## Example
//!
//! ```rust
//! use iris_eda::{dataset, stats, validate};
//!
//! # fn main() -> iris_eda::Result<()> {
//! let table = dataset::load()?;
//! let profile = validate::validate(&table)?;
//! assert_eq!(profile.rows, 150);
//!
//! let overall = stats::describe(&table)?;
//! assert_eq!(overall.len(), 4);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod table;
pub mod validate;

pub use error::{Error, Result};
