//! End to end runs over GCT/CLS files on disk

use std::{fs, path::Path};

use diffex::{
    pipeline, AnalysisConfig, DifferentialConfig, Error, ExpressionMatrix, Phenotypes,
    RankingMethod,
};
use tempfile::TempDir;

const GCT: &str = "#1.2\n\
                   3\t3\n\
                   Name\tDescription\tS1\tS2\tS3\n\
                   GENE_A\tfirst gene\t1.0\t9.0\t1.5\n\
                   GENE_B\tsecond gene\t8.0\t0.5\t7.5\n\
                   GENE_C\tthird gene\t4.0\t4.0\t4.0\n";

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn config(dir: &TempDir, labels: &str) -> AnalysisConfig {
    let matrix_path = write(dir.path(), "minimal.gct", GCT);
    let labels_path = write(dir.path(), "minimal.cls", labels);
    AnalysisConfig::builder()
        .matrix_path(matrix_path)
        .labels_path(labels_path)
        .output_dir(dir.path())
        .differential(
            DifferentialConfig::builder()
                .permutations(10)
                .samplings(4)
                .build(),
        )
        .build()
}

#[test]
fn test_labels_align_with_samples() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "3 2 1\n# control case\n0 1 0\n");

    let matrix = ExpressionMatrix::from_gct(&config.matrix_path).unwrap();
    let phenotypes = Phenotypes::from_path(&config.labels_path).unwrap();
    assert_eq!(phenotypes.labels(), &[0, 1, 0]);
    assert_eq!(
        phenotypes.align(&matrix).unwrap(),
        vec![("S1", 0), ("S2", 1), ("S3", 0)]
    );
}

#[test]
fn test_run_writes_named_artifact() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "3 2 1\n# control case\n0 1 0\n");

    let results = pipeline::run(&config).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results.iter().next().unwrap().gene, "GENE_A");
    let flat = results.get("GENE_C").unwrap();
    assert!(flat.score.is_nan());
    assert!(flat.pvalue.is_none());
    assert_eq!(results.iter().last().unwrap().gene, "GENE_C");

    let output = dir.path().join("DE_test.tsv");
    assert_eq!(config.output_path(), output);
    let written = fs::read_to_string(output).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Gene\tScore\tMarginOfError\tPValue\tFDR"
    );
    assert!(lines.next().unwrap().starts_with("GENE_A\t"));
    assert_eq!(written.lines().count(), 4);
}

#[test]
fn test_signal_to_noise_run() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir, "3 2 1\n# control case\n0 1 0\n");
    config.ranking_method = RankingMethod::SignalToNoise;
    config.output_name = "snr".to_string();

    let results = pipeline::run(&config).unwrap();
    assert!(results.get("GENE_A").unwrap().score > 0.0);
    assert!(results.get("GENE_B").unwrap().score < 0.0);
    assert!(dir.path().join("snr.tsv").exists());
}

#[test]
fn test_label_count_mismatch_fails() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "2 2 1\n# control case\n0 1\n");

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(
        err,
        Error::LabelMismatch {
            labels: 2,
            samples: 3
        }
    ));
    assert!(!config.output_path().exists());
}

#[test]
fn test_invalid_label_fails() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "3 2 1\n# control case\n0 one 0\n");
    assert!(matches!(
        pipeline::run(&config),
        Err(Error::InvalidLabel { position: 1, .. })
    ));
}

#[test]
fn test_missing_input_is_io_error() {
    let dir = TempDir::new().unwrap();
    let config = AnalysisConfig::builder()
        .matrix_path(dir.path().join("absent.gct"))
        .labels_path(dir.path().join("absent.cls"))
        .build();
    assert!(matches!(pipeline::run(&config), Err(Error::Io { .. })));
}
