use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    config::{DifferentialConfig, RankingMetric},
    error::{Error, Result},
    labels::Phenotypes,
    math::{empirical_pvalue, standard_deviation},
    matrix::ExpressionMatrix,
    results::{DifferentialResults, GeneResult},
    utils::{draw_subsample, select_indices, shuffled, subsample_size},
};

/// Two-sided 95% normal quantile
const Z_975: f64 = 1.959963984540054;

/// Differential expression of every gene in a matrix against phenotype labels
///
/// Each gene is scored with the ranking metric, then given:
/// 1. a margin of error from repeated subsampling of the samples
/// 2. an empirical p-value against a pooled label-permutation null
/// 3. a multiple-testing corrected p-value (FDR)
pub struct DifferentialExpression<'a, M: RankingMetric + ?Sized> {
    labels: Vec<f64>,
    matrix: &'a ExpressionMatrix,
    metric: &'a M,
    config: DifferentialConfig,
}
impl<'a, M: RankingMetric + ?Sized> DifferentialExpression<'a, M> {
    /// Pairs the labels with the matrix columns
    ///
    /// Fails if the label count differs from the sample count, or if the metric
    /// needs two phenotype classes and the labels do not provide exactly two.
    pub fn new(
        phenotypes: &Phenotypes,
        matrix: &'a ExpressionMatrix,
        metric: &'a M,
        config: DifferentialConfig,
    ) -> Result<Self> {
        let aligned = phenotypes.align(matrix)?;
        if metric.requires_two_classes() {
            let n_classes = phenotypes.classes().len();
            if n_classes != 2 {
                return Err(Error::InvalidGroups(n_classes));
            }
        }
        // labels in matrix column order
        let labels = aligned.iter().map(|&(_, label)| label as f64).collect();
        Ok(Self {
            labels,
            matrix,
            metric,
            config,
        })
    }

    pub fn run(&self) -> DifferentialResults {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let scores = self.score_genes(&self.labels, None);
        let margins = self.margins_of_error(&mut rng);
        let pvalues = self.permutation_pvalues(&scores, &mut rng);
        let fdrs = self.correct(&pvalues);

        let results = self
            .matrix
            .genes()
            .iter()
            .zip(scores)
            .zip(margins)
            .zip(pvalues.into_iter().zip(fdrs))
            .map(|(((gene, score), margin_of_error), (pvalue, fdr))| {
                GeneResult::builder()
                    .gene(gene.as_str())
                    .score(score)
                    .maybe_margin_of_error(margin_of_error.filter(|_| score.is_finite()))
                    .maybe_pvalue(pvalue)
                    .maybe_fdr(fdr)
                    .build()
            })
            .collect::<Vec<_>>();

        DifferentialResults::from_vec(results)
    }

    /// Scores every gene against `labels`
    ///
    /// When `columns` is given only those sample columns are used, and `labels`
    /// must already be restricted to them.
    fn score_genes(&self, labels: &[f64], columns: Option<&[usize]>) -> Vec<f64> {
        self.matrix
            .par_rows()
            .map(|row| match columns {
                Some(columns) => self.metric.score(labels, &select_indices(columns, row)),
                None => self.metric.score(labels, row),
            })
            .collect()
    }

    fn margins_of_error(&self, rng: &mut ChaCha8Rng) -> Vec<Option<f64>> {
        let n_genes = self.matrix.n_genes();
        if self.config.samplings < 2 {
            return vec![None; n_genes];
        }

        let n_samples = self.matrix.n_samples();
        let size = subsample_size(n_samples);
        let mut draws = vec![Vec::with_capacity(self.config.samplings); n_genes];
        for _ in 0..self.config.samplings {
            let columns = draw_subsample(rng, n_samples, size);
            let labels = select_indices(&columns, &self.labels);
            let scores = self.score_genes(&labels, Some(&columns));
            for (gene_draws, score) in draws.iter_mut().zip(scores) {
                if score.is_finite() {
                    gene_draws.push(score);
                }
            }
        }
        debug!(samplings = self.config.samplings, size, "computed subsampled scores");

        draws
            .into_par_iter()
            .map(|gene_draws| {
                (gene_draws.len() >= 2).then(|| Z_975 * standard_deviation(&gene_draws))
            })
            .collect()
    }

    fn permutation_pvalues(&self, scores: &[f64], rng: &mut ChaCha8Rng) -> Vec<Option<f64>> {
        let mut null = Vec::with_capacity(self.config.permutations * scores.len());
        for _ in 0..self.config.permutations {
            let labels = shuffled(rng, &self.labels);
            null.extend(
                self.score_genes(&labels, None)
                    .into_iter()
                    .filter(|s| s.is_finite())
                    .map(f64::abs),
            );
        }
        null.sort_unstable_by(f64::total_cmp);
        debug!(
            permutations = self.config.permutations,
            null_size = null.len(),
            "built permutation null distribution"
        );

        scores
            .par_iter()
            .map(|&score| empirical_pvalue(score, &null))
            .collect()
    }

    /// Applies the configured correction to the defined p-values only
    fn correct(&self, pvalues: &[Option<f64>]) -> Vec<Option<f64>> {
        let (indices, defined): (Vec<usize>, Vec<f64>) = pvalues
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| (i, p)))
            .unzip();
        let adjusted = self.config.correction.transform(&defined);

        let mut fdrs = vec![None; pvalues.len()];
        for (i, q) in indices.into_iter().zip(adjusted) {
            fdrs[i] = Some(q);
        }
        fdrs
    }
}

/// Runs differential expression and writes the results to `output`
pub fn differential_gene_expression<M: RankingMetric + ?Sized>(
    phenotypes: &Phenotypes,
    matrix: &ExpressionMatrix,
    output: &Path,
    metric: &M,
    config: DifferentialConfig,
) -> Result<DifferentialResults> {
    let analysis = DifferentialExpression::new(phenotypes, matrix, metric, config)?;
    info!(
        n_genes = matrix.n_genes(),
        n_samples = matrix.n_samples(),
        permutations = config.permutations,
        samplings = config.samplings,
        "running differential expression"
    );
    let results = analysis.run();
    results.write_tsv(output)?;
    info!(path = %output.display(), n_genes = results.len(), "wrote differential expression results");
    Ok(results)
}
