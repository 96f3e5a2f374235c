use std::{cmp::Ordering, fs::File, io::Write, path::Path};

use bon::Builder;
use serde::Serialize;

use crate::error::{Error, Result};

/// Differential expression statistics for a single gene
#[derive(Debug, Clone, PartialEq, Builder, Serialize)]
pub struct GeneResult {
    #[serde(rename = "Gene")]
    #[builder(into)]
    pub gene: String,
    #[serde(rename = "Score")]
    pub score: f64,
    /// Half-width of the 95% confidence interval of the score
    #[serde(rename = "MarginOfError")]
    pub margin_of_error: Option<f64>,
    #[serde(rename = "PValue")]
    pub pvalue: Option<f64>,
    #[serde(rename = "FDR")]
    pub fdr: Option<f64>,
}

/// Per-gene results ordered from the most positive to the most negative score
///
/// Genes with an undefined (NaN) score are placed last.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialResults {
    results: Vec<GeneResult>,
}
impl DifferentialResults {
    pub fn from_vec(mut gene_results: Vec<GeneResult>) -> Self {
        gene_results.sort_by(|a, b| descending_score(a.score, b.score));
        Self {
            results: gene_results,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneResult> {
        self.results.iter()
    }

    pub fn get(&self, gene: &str) -> Option<&GeneResult> {
        self.results.iter().find(|r| r.gene == gene)
    }

    /// Writes the results as a tab-separated table
    pub fn write_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        self.write_to(file)?;
        Ok(())
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        for result in &self.results {
            writer.serialize(result)?;
        }
        writer.flush().map_err(|e| Error::io("<results>", e))?;
        Ok(())
    }

    pub fn pprint(&self) {
        println!("Gene\tScore\tMarginOfError\tPValue\tFDR");
        for result in &self.results {
            println!(
                "{}\t{}\t{}\t{}\t{}",
                result.gene,
                result.score,
                display_optional(result.margin_of_error),
                display_optional(result.pvalue),
                display_optional(result.fdr),
            );
        }
    }
}

fn descending_score(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

fn display_optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(gene: &str, score: f64) -> GeneResult {
        GeneResult::builder().gene(gene).score(score).build()
    }

    #[test]
    fn test_sorted_by_descending_score() {
        let results = DifferentialResults::from_vec(vec![
            result("low", -0.8),
            result("undefined", f64::NAN),
            result("high", 0.9),
            result("mid", 0.1),
        ]);
        let genes = results.iter().map(|r| r.gene.as_str()).collect::<Vec<_>>();
        assert_eq!(genes, vec!["high", "mid", "low", "undefined"]);
        assert_eq!(results.len(), 4);
        assert!(results.get("mid").is_some());
        assert!(results.get("absent").is_none());
    }

    #[test]
    fn test_write_tsv_layout() {
        let results = DifferentialResults::from_vec(vec![
            GeneResult::builder()
                .gene("TP53")
                .score(0.5)
                .margin_of_error(0.1)
                .pvalue(0.01)
                .fdr(0.02)
                .build(),
            result("BRCA1", -0.25),
        ]);
        let mut buffer = Vec::new();
        results.write_to(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Gene\tScore\tMarginOfError\tPValue\tFDR");
        assert_eq!(lines[1], "TP53\t0.5\t0.1\t0.01\t0.02");
        assert_eq!(lines[2], "BRCA1\t-0.25\t\t\t");
    }
}
