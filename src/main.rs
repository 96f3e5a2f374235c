use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use diffex::{pipeline, AnalysisConfig, DifferentialConfig, RankingMethod, TransformConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "diffex",
    version,
    about = "Rank genes of a GCT expression matrix against CLS phenotype labels"
)]
struct Cli {
    /// Expression matrix in GCT format
    #[arg(short, long)]
    matrix: PathBuf,
    /// Phenotype labels in CLS format
    #[arg(short, long)]
    labels: PathBuf,
    /// Name of the result table, written as <OUTPUT>.tsv
    #[arg(short, long, default_value = "DE_test")]
    output: String,
    /// Directory the result table is written into
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    /// Ranking metric used to score each gene
    #[arg(short, long, value_enum, default_value_t = RankingMethod::Pearson)]
    ranking: RankingMethod,
    /// Label permutations for the p-value null distribution
    #[arg(long, default_value_t = 100)]
    permutations: usize,
    /// Subsamplings for the score margin of error
    #[arg(long, default_value_t = 30)]
    samplings: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Multiple-testing correction applied to the p-values
    #[arg(long, value_enum, default_value_t = TransformConfig::Fdr)]
    correction: TransformConfig,
    /// Worker threads (defaults to all cores)
    #[arg(short, long)]
    threads: Option<usize>,
    /// Also print the results to stdout
    #[arg(long)]
    print: bool,
    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig::builder()
            .matrix_path(self.matrix.clone())
            .labels_path(self.labels.clone())
            .output_name(self.output.clone())
            .output_dir(self.output_dir.clone())
            .ranking_method(self.ranking)
            .differential(
                DifferentialConfig::builder()
                    .permutations(self.permutations)
                    .samplings(self.samplings)
                    .seed(self.seed)
                    .correction(self.correction)
                    .build(),
            )
            .build()
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure worker threads")?;
    }

    let config = cli.analysis_config();
    let results = pipeline::run(&config).with_context(|| {
        format!(
            "differential expression failed for {} and {}",
            config.matrix_path.display(),
            config.labels_path.display()
        )
    })?;

    if cli.print {
        results.pprint();
    }
    Ok(())
}
