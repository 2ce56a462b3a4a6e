//! Vocabulary indexing: surface words to dense integer ids.
//!
//! Ids are handed out in first-seen order starting at [`FIRST_WORD_ID`]. Words
//! that occur in fewer than `unk_threshold` sentences share [`UNK_ID`]; the fold
//! decision is taken once from the global count of the whole side.

use hashbrown::HashMap;

use crate::error::{Ibm1Error, Result, Side};
use crate::text::{Sentence, Text};
use crate::types::*;

#[derive(Clone, Debug)]
pub struct Vocabulary {
    word_to_id: HashMap<String, WordId>,
    id_to_word: HashMap<WordId, String>,
    next_id: WordId,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let mut v = Vocabulary {
            word_to_id: HashMap::new(),
            id_to_word: HashMap::new(),
            next_id: FIRST_WORD_ID,
        };
        v.reserve(UNK_SYMBOL, UNK_ID);
        v.reserve(NULL_SYMBOL, NULL_ID);
        v
    }
}

impl Vocabulary {
    fn reserve(&mut self, word: &str, id: WordId) {
        self.word_to_id.insert(word.to_string(), id);
        self.id_to_word.insert(id, word.to_string());
    }

    fn get_or_insert(&mut self, word: &str) -> WordId {
        if let Some(&id) = self.word_to_id.get(word) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.reserve(word, id);
        id
    }

    #[inline]
    pub fn id(&self, word: &str) -> Option<WordId> {
        self.word_to_id.get(word).copied()
    }

    #[inline]
    pub fn word(&self, id: WordId) -> Option<&str> {
        self.id_to_word.get(&id).map(String::as_str)
    }

    pub fn lookup(&self, side: Side, id: WordId) -> Result<&str> {
        self.word(id).ok_or(Ibm1Error::UnknownWordId { side, id })
    }

    /// Number of ids with a reverse entry, reserved ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.id_to_word.len()
    }

    /// Number of ids handed to real words.
    #[inline]
    pub fn n_words(&self) -> usize {
        (self.next_id - FIRST_WORD_ID) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_words() == 0
    }
}

#[derive(Clone, Debug)]
pub struct IndexedText {
    pub sentences: Vec<Sentence>,
    pub vocab: Vocabulary,
}

/// Number of sentences each word occurs in.
pub fn sentence_frequencies(text: &Text) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for s in &text.sentences {
        for w in s {
            *counts.entry(w.as_str()).or_insert(0) += 1;
        }
    }
    counts
}

pub fn index_text(text: &Text, unk_threshold: usize) -> IndexedText {
    let counts = sentence_frequencies(text);
    let mut vocab = Vocabulary::default();
    let mut n_folded = 0usize;

    let sentences = text
        .sentences
        .iter()
        .map(|words| {
            let mut sent = Sentence::default();
            for w in words {
                let id = if counts.get(w.as_str()).copied().unwrap_or(0) < unk_threshold {
                    n_folded += 1;
                    UNK_ID
                } else {
                    vocab.get_or_insert(w)
                };
                sent.insert(id);
            }
            sent
        })
        .collect();

    log::debug!(
        "indexed {} sentences: {} word types, {} occurrences folded into {}",
        text.len(),
        vocab.n_words(),
        n_folded,
        UNK_SYMBOL
    );

    IndexedText { sentences, vocab }
}
