pub type WordId = i32;
pub type Probability = f64;

/// Id every below-threshold word folds into.
pub const UNK_ID: WordId = -1;
/// Id of the synthetic empty-alignment word, added to every target sentence.
pub const NULL_ID: WordId = 0;
pub const FIRST_WORD_ID: WordId = 1;

pub const UNK_SYMBOL: &str = "<UNK>";
pub const NULL_SYMBOL: &str = "NULL";

/// Value a (source, target) entry gets the first time the pair co-occurs.
pub const DEFAULT_PROBABILITY: Probability = 0.01;
pub const DEFAULT_UNK_THRESHOLD: usize = 1;
pub const DEFAULT_ITERATIONS: usize = 5;
