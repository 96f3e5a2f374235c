use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading inputs or computing differential expression.
#[derive(Debug, Error)]
pub enum Error {
    /// A file could not be opened, read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// The label file ended before its label line.
    #[error("label file has {found} line(s); expected labels on line 3")]
    MissingLabelLine { found: usize },

    /// A token on the label line is not an integer.
    #[error("label {position} ('{token}') is not an integer")]
    InvalidLabel { token: String, position: usize },

    /// Structural problem in the expression matrix.
    #[error("malformed expression matrix: {0}")]
    MalformedMatrix(String),

    /// A matrix cell could not be parsed as a number.
    #[error("gene {gene}, sample {sample}: '{value}' is not a number")]
    InvalidValue {
        gene: String,
        sample: String,
        value: String,
    },

    #[error("expression matrix has no genes or no samples")]
    EmptyMatrix,

    /// Labels and matrix columns do not pair up one-to-one.
    #[error("{labels} phenotype labels for {samples} matrix samples")]
    LabelMismatch { labels: usize, samples: usize },

    /// The ranking metric needs a different number of phenotype classes.
    #[error("ranking metric requires exactly two phenotype classes, found {0}")]
    InvalidGroups(usize),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
