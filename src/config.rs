use std::path::PathBuf;

use adjustp::{adjust, Procedure};
use bon::Builder;
use clap::ValueEnum;

use crate::math::{pearson, signal_to_noise, spearman};

/// A pairwise ranking metric scoring one gene against the phenotype labels
///
/// Any `Fn(&[f64], &[f64]) -> f64` closure can be used as a metric.
pub trait RankingMetric: Sync {
    /// Scores `values` (one gene across samples) against `labels`
    fn score(&self, labels: &[f64], values: &[f64]) -> f64;

    /// Whether the metric is only defined for exactly two phenotype classes
    fn requires_two_classes(&self) -> bool {
        false
    }
}

impl<F> RankingMetric for F
where
    F: Fn(&[f64], &[f64]) -> f64 + Sync,
{
    fn score(&self, labels: &[f64], values: &[f64]) -> f64 {
        self(labels, values)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RankingMethod {
    /// Pearson correlation of expression with the label codes
    #[default]
    Pearson,
    /// Spearman rank correlation
    Spearman,
    /// Difference of group means over the sum of group standard deviations
    SignalToNoise,
}

impl RankingMetric for RankingMethod {
    fn score(&self, labels: &[f64], values: &[f64]) -> f64 {
        match self {
            RankingMethod::Pearson => pearson(labels, values),
            RankingMethod::Spearman => spearman(labels, values),
            RankingMethod::SignalToNoise => signal_to_noise(labels, values),
        }
    }

    fn requires_two_classes(&self) -> bool {
        matches!(self, RankingMethod::SignalToNoise)
    }
}

/// Multiple-testing correction applied to the permutation p-values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TransformConfig {
    Identity,
    #[default]
    Fdr,
    Bonferroni,
}
impl TransformConfig {
    pub fn transform(&self, pvalues: &[f64]) -> Vec<f64> {
        if pvalues.is_empty() {
            return Vec::new();
        }
        match self {
            TransformConfig::Identity => pvalues.to_vec(),
            TransformConfig::Fdr => adjust(pvalues, Procedure::BenjaminiHochberg),
            TransformConfig::Bonferroni => adjust(pvalues, Procedure::Bonferroni),
        }
    }
}

/// Settings for the differential expression computation itself
#[derive(Debug, Clone, Copy, Builder)]
pub struct DifferentialConfig {
    /// Number of label permutations used for the p-value null distribution
    #[builder(default = 100)]
    pub permutations: usize,
    /// Number of subsamplings used for the score margin of error
    #[builder(default = 30)]
    pub samplings: usize,
    #[builder(default = 42)]
    pub seed: u64,
    #[builder(default)]
    pub correction: TransformConfig,
}

impl Default for DifferentialConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Everything needed to run one analysis end to end
#[derive(Debug, Clone, Builder)]
pub struct AnalysisConfig {
    /// GCT expression matrix
    #[builder(into)]
    pub matrix_path: PathBuf,
    /// CLS phenotype labels
    #[builder(into)]
    pub labels_path: PathBuf,
    /// Name of the result artifact, written as `<output_name>.tsv`
    #[builder(into, default = String::from("DE_test"))]
    pub output_name: String,
    #[builder(into, default = PathBuf::from("."))]
    pub output_dir: PathBuf,
    #[builder(default)]
    pub ranking_method: RankingMethod,
    #[builder(default)]
    pub differential: DifferentialConfig,
}

impl AnalysisConfig {
    /// Location of the result artifact
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.tsv", self.output_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ranking_method_dispatch() {
        let labels = vec![0., 0., 1., 1.];
        let values = vec![1., 2., 3., 4.];
        assert_relative_eq!(
            RankingMethod::Pearson.score(&labels, &values),
            pearson(&labels, &values)
        );
        assert_relative_eq!(
            RankingMethod::Spearman.score(&labels, &values),
            spearman(&labels, &values)
        );
        assert!(RankingMethod::SignalToNoise.requires_two_classes());
        assert!(!RankingMethod::Pearson.requires_two_classes());
    }

    #[test]
    fn test_closure_metric() {
        let weighted_sum = |labels: &[f64], values: &[f64]| {
            labels.iter().zip(values).map(|(l, v)| l * v).sum::<f64>()
        };
        assert_relative_eq!(weighted_sum.score(&[0., 1.], &[5., 7.]), 7.0);
        assert!(!weighted_sum.requires_two_classes());
    }

    #[test]
    fn test_transform_identity() {
        let pvalues = vec![0.01, 0.04, 0.5];
        assert_eq!(TransformConfig::Identity.transform(&pvalues), pvalues);
        assert!(TransformConfig::Fdr.transform(&[]).is_empty());
    }

    #[test]
    fn test_transform_bonferroni() {
        let adjusted = TransformConfig::Bonferroni.transform(&[0.01, 0.02, 0.1]);
        assert_relative_eq!(adjusted[0], 0.03, epsilon = 1e-12);
        assert_relative_eq!(adjusted[1], 0.06, epsilon = 1e-12);
        assert_relative_eq!(adjusted[2], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_fdr() {
        let adjusted = TransformConfig::Fdr.transform(&[0.01, 0.04, 0.03]);
        assert_relative_eq!(adjusted[0], 0.03, epsilon = 1e-12);
        assert_relative_eq!(adjusted[1], 0.04, epsilon = 1e-12);
        assert_relative_eq!(adjusted[2], 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_analysis_config_defaults() {
        let config = AnalysisConfig::builder()
            .matrix_path("data/BRCA_minimal.gct")
            .labels_path("data/BRCA_minimal.cls")
            .build();
        assert_eq!(config.output_name, "DE_test");
        assert_eq!(config.ranking_method, RankingMethod::Pearson);
        assert_eq!(config.differential.permutations, 100);
        assert_eq!(config.differential.correction, TransformConfig::Fdr);
        assert_eq!(config.output_path(), PathBuf::from("./DE_test.tsv"));
    }
}
