use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use itertools::Itertools;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    matrix::ExpressionMatrix,
};

/// Phenotype labels read from a CLS file
///
/// Labels are ordered: the label at position `i` belongs to the `i`-th sample
/// column of the expression matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phenotypes {
    labels: Vec<i64>,
    class_names: Vec<String>,
}

impl Phenotypes {
    pub fn new(labels: Vec<i64>) -> Self {
        Self {
            labels,
            class_names: Vec::new(),
        }
    }

    /// Reads a CLS file from disk
    ///
    /// The file handle is dropped before returning, on success and on failure alike.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let phenotypes = Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            Error::Io { source, .. } => Error::io(path, source),
            other => other,
        })?;
        debug!(
            path = %path.display(),
            n_labels = phenotypes.len(),
            "loaded phenotype labels"
        );
        Ok(phenotypes)
    }

    /// Parses CLS content
    ///
    /// Line 1 (`<samples> <classes> 1`) and line 2 (`# <class names>`) are
    /// informational and never rejected. Line 3 holds one integer label per sample.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let mut header = Vec::with_capacity(2);
        for _ in 0..2 {
            match lines.next() {
                Some(line) => header.push(line.map_err(|e| Error::io("<labels>", e))?),
                None => return Err(Error::MissingLabelLine { found: header.len() }),
            }
        }
        let label_line = match lines.next() {
            Some(line) => line.map_err(|e| Error::io("<labels>", e))?,
            None => return Err(Error::MissingLabelLine { found: 2 }),
        };

        let labels = parse_label_line(&label_line)?;
        if labels.is_empty() {
            return Err(Error::MissingLabelLine { found: 2 });
        }

        if let Some(declared) = declared_sample_count(&header[0]) {
            if declared != labels.len() {
                warn!(
                    declared,
                    found = labels.len(),
                    "label file header disagrees with number of labels"
                );
            }
        }

        Ok(Self {
            labels,
            class_names: parse_class_names(&header[1]),
        })
    }

    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    /// Class names from the `#` line, empty if the file had none
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Distinct labels in ascending order
    pub fn classes(&self) -> Vec<i64> {
        self.labels.iter().copied().unique().sorted().collect()
    }

    /// Pairs each matrix sample with its label
    ///
    /// Fails when the number of labels differs from the number of samples.
    pub fn align<'a>(&self, matrix: &'a ExpressionMatrix) -> Result<Vec<(&'a str, i64)>> {
        if self.len() != matrix.n_samples() {
            return Err(Error::LabelMismatch {
                labels: self.len(),
                samples: matrix.n_samples(),
            });
        }
        Ok(matrix
            .samples()
            .iter()
            .map(String::as_str)
            .zip(self.labels.iter().copied())
            .collect())
    }
}

fn parse_label_line(line: &str) -> Result<Vec<i64>> {
    line.trim_end_matches(['\r', '\n'])
        .split_whitespace()
        .enumerate()
        .map(|(position, token)| {
            token.parse::<i64>().map_err(|_| Error::InvalidLabel {
                token: token.to_string(),
                position,
            })
        })
        .collect()
}

fn declared_sample_count(line: &str) -> Option<usize> {
    line.split_whitespace().next()?.parse().ok()
}

fn parse_class_names(line: &str) -> Vec<String> {
    match line.trim().strip_prefix('#') {
        Some(rest) => rest.split_whitespace().map(str::to_string).collect(),
        None => Vec::new(),
    }
}
