//! IBM Model 1 word-translation probabilities estimated with EM.

pub mod types;
pub mod error;
pub mod text;
pub mod vocab;
pub mod corpus;
pub mod model;
pub mod trainer;
pub mod report;

pub use error::{Ibm1Error, Result, Side};
pub use text::{Text, Sentence, parse_plaintext, read_text};
pub use vocab::{Vocabulary, IndexedText, index_text};
pub use corpus::ParallelCorpus;
pub use model::ProbabilityTable;
pub use trainer::{TrainOptions, TrainResult, Trainer, IterationStats, train, train_plaintext};
pub use report::{Record, collect, write_report, write_stats};
