//! diffex: differential gene expression ranking
//!
//! Loads a GCT expression matrix and CLS phenotype labels. Each gene is then
//! scored against the phenotype with a pluggable ranking metric, and every
//! score gets a subsampling margin of error, a permutation p-value and a
//! corrected FDR.
//!
//! The main components of this library are:
//! - `ExpressionMatrix`: GCT loading, with the `Description` column dropped
//! - `Phenotypes`: CLS label parsing and explicit alignment with matrix samples
//! - `RankingMethod` / `RankingMetric`: built-in and user supplied ranking metrics
//! - `DifferentialExpression`: the scoring and significance computation
//! - `pipeline::run`: end to end execution from an `AnalysisConfig`

mod config;
mod differential;
mod error;
mod labels;
mod math;
mod matrix;
pub mod pipeline;
mod results;
mod utils;

pub use config::{AnalysisConfig, DifferentialConfig, RankingMethod, RankingMetric, TransformConfig};
pub use differential::{differential_gene_expression, DifferentialExpression};
pub use error::{Error, Result};
pub use labels::Phenotypes;
pub use math::{pearson, signal_to_noise, spearman};
pub use matrix::{ExpressionMatrix, DESCRIPTION_COLUMN};
pub use results::{DifferentialResults, GeneResult};
