use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Name of the free-text annotation column dropped on load
pub const DESCRIPTION_COLUMN: &str = "Description";

/// Cell contents read as a missing value
const MISSING_VALUES: &[&str] = &["", "NA", "N/A", "n/a", "#N/A", "NULL", "null", "<NA>"];

/// A genes-by-samples matrix of expression values
///
/// Values are stored row-major: one contiguous slice per gene.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionMatrix {
    genes: Vec<String>,
    samples: Vec<String>,
    values: Vec<f64>,
}

impl ExpressionMatrix {
    /// Builds a matrix from per-gene rows
    pub fn from_rows(
        genes: Vec<String>,
        samples: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if genes.len() != rows.len() {
            return Err(Error::MalformedMatrix(format!(
                "{} gene identifiers for {} rows",
                genes.len(),
                rows.len()
            )));
        }
        if let Some((gene, row)) = genes
            .iter()
            .zip(rows.iter())
            .find(|(_, row)| row.len() != samples.len())
        {
            return Err(Error::MalformedMatrix(format!(
                "gene {gene} has {} values for {} samples",
                row.len(),
                samples.len()
            )));
        }
        let values = rows.into_iter().flatten().collect();
        Self::checked(genes, samples, values)
    }

    fn checked(genes: Vec<String>, samples: Vec<String>, values: Vec<f64>) -> Result<Self> {
        if genes.is_empty() || samples.is_empty() {
            return Err(Error::EmptyMatrix);
        }
        Ok(Self {
            genes,
            samples,
            values,
        })
    }

    /// Loads a GCT file from disk
    pub fn from_gct<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let matrix = Self::from_gct_reader(BufReader::new(file)).map_err(|e| match e {
            Error::Io { source, .. } => Error::io(path, source),
            other => other,
        })?;
        debug!(
            path = %path.display(),
            n_genes = matrix.n_genes(),
            n_samples = matrix.n_samples(),
            "loaded expression matrix"
        );
        Ok(matrix)
    }

    /// Parses GCT content
    ///
    /// Line 1 is the version tag, line 2 the declared dimensions and line 3 the
    /// header. The first column holds the gene identifiers and any column named
    /// `Description` is dropped.
    pub fn from_gct_reader<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut preamble = String::new();
        for line_no in 1..=2 {
            preamble.clear();
            let n = reader
                .read_line(&mut preamble)
                .map_err(|e| Error::io("<matrix>", e))?;
            if n == 0 {
                return Err(Error::MalformedMatrix(format!(
                    "file ended at line {line_no}, before the header"
                )));
            }
        }
        let declared = parse_dimensions(&preamble);
        let matrix = parse_table(reader)?;

        if let Some((rows, cols)) = declared {
            if rows != matrix.n_genes() || cols != matrix.n_samples() {
                warn!(
                    declared_rows = rows,
                    declared_cols = cols,
                    rows = matrix.n_genes(),
                    cols = matrix.n_samples(),
                    "GCT dimension line disagrees with table contents"
                );
            }
        }
        Ok(matrix)
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Expression values of the gene at `index`
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.n_samples();
        &self.values[start..start + self.n_samples()]
    }

    /// Parallel iterator over the gene rows, in gene order
    pub fn par_rows(&self) -> rayon::slice::ChunksExact<'_, f64> {
        self.values.par_chunks_exact(self.n_samples())
    }
}

fn parse_dimensions(line: &str) -> Option<(usize, usize)> {
    let mut fields = line.split_whitespace().map(|f| f.parse::<usize>().ok());
    match (fields.next(), fields.next()) {
        (Some(Some(rows)), Some(Some(cols))) => Some((rows, cols)),
        _ => None,
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    if MISSING_VALUES.contains(&cell) {
        return Some(f64::NAN);
    }
    cell.parse::<f64>().ok()
}

fn parse_table<R: Read>(reader: R) -> Result<ExpressionMatrix> {
    let mut table = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header = table.headers()?.clone();
    if header.len() < 2 {
        return Err(Error::MalformedMatrix(format!(
            "header has {} column(s); expected an index column and samples",
            header.len()
        )));
    }

    // Column 0 is the gene index; keep every other column except descriptions
    let kept = header
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, name)| name.trim() != DESCRIPTION_COLUMN)
        .map(|(i, _)| i)
        .collect::<Vec<_>>();
    let samples = kept
        .iter()
        .map(|&i| header[i].trim().to_string())
        .collect::<Vec<_>>();

    let mut genes = Vec::new();
    let mut values = Vec::new();
    for record in table.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if record.len() != header.len() {
            return Err(Error::MalformedMatrix(format!(
                "row {} has {} fields; header has {}",
                genes.len() + 1,
                record.len(),
                header.len()
            )));
        }
        let gene = record[0].trim().to_string();
        for (&column, sample) in kept.iter().zip(samples.iter()) {
            let cell = record[column].trim();
            values.push(parse_cell(cell).ok_or_else(|| Error::InvalidValue {
                gene: gene.clone(),
                sample: sample.clone(),
                value: cell.to_string(),
            })?);
        }
        genes.push(gene);
    }

    ExpressionMatrix::checked(genes, samples, values)
}
