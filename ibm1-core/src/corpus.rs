use crate::error::{Ibm1Error, Result};
use crate::text::{Sentence, Text};
use crate::types::*;
use crate::vocab::{index_text, Vocabulary};

/// Position-aligned target/source sentences ready for training. Every target
/// sentence already carries [`NULL_ID`].
#[derive(Clone, Debug)]
pub struct ParallelCorpus {
    target: Vec<Sentence>,
    source: Vec<Sentence>,
}

impl ParallelCorpus {
    pub fn new(mut target: Vec<Sentence>, source: Vec<Sentence>) -> Result<Self> {
        check_lengths("target", target.len(), "source", source.len())?;
        for sent in target.iter_mut() {
            sent.insert(NULL_ID);
        }
        Ok(ParallelCorpus { target, source })
    }

    /// Indexes both sides and pairs them up.
    pub fn index(
        target: &Text,
        source: &Text,
        unk_threshold: usize,
    ) -> Result<(Self, Vocabulary, Vocabulary)> {
        check_lengths("target", target.len(), "source", source.len())?;
        let t = index_text(target, unk_threshold);
        let s = index_text(source, unk_threshold);
        let corpus = ParallelCorpus::new(t.sentences, s.sentences)?;
        Ok((corpus, t.vocab, s.vocab))
    }

    #[inline] pub fn len(&self) -> usize { self.target.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.target.is_empty() }

    /// `(target, source)` pairs in corpus order.
    pub fn pairs(&self) -> impl Iterator<Item = (&Sentence, &Sentence)> + '_ {
        self.target.iter().zip(self.source.iter())
    }
}

pub fn check_lengths(
    target_name: &str,
    target_len: usize,
    source_name: &str,
    source_len: usize,
) -> Result<()> {
    if target_len != source_len {
        return Err(Ibm1Error::CorpusLengthMismatch {
            target_name: target_name.to_string(),
            target_len,
            source_name: source_name.to_string(),
            source_len,
        });
    }
    Ok(())
}
