use tracing::info;

use crate::{
    config::AnalysisConfig,
    differential::differential_gene_expression,
    error::Result,
    labels::Phenotypes,
    matrix::ExpressionMatrix,
    results::DifferentialResults,
};

/// Loads the inputs named in `config`, runs the analysis and writes the artifact
pub fn run(config: &AnalysisConfig) -> Result<DifferentialResults> {
    info!(
        matrix = %config.matrix_path.display(),
        labels = %config.labels_path.display(),
        ranking = ?config.ranking_method,
        "starting analysis"
    );
    let matrix = ExpressionMatrix::from_gct(&config.matrix_path)?;
    let phenotypes = Phenotypes::from_path(&config.labels_path)?;

    differential_gene_expression(
        &phenotypes,
        &matrix,
        &config.output_path(),
        &config.ranking_method,
        config.differential,
    )
}
