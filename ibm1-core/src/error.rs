use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::WordId;

pub type Result<T, E = Ibm1Error> = std::result::Result<T, E>;

/// Which half of the bitext a word id belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Target,
    Source,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Target => f.write_str("target"),
            Side::Source => f.write_str("source"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Ibm1Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "corpus length mismatch: target {target_name} has {target_len} sentences, \
         source {source_name} has {source_len}"
    )]
    CorpusLengthMismatch {
        target_name: String,
        target_len: usize,
        source_name: String,
        source_len: usize,
    },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("no {side} word for id {id}")]
    UnknownWordId { side: Side, id: WordId },
}
