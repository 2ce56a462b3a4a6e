use std::fs;
use std::io::Read;
use std::path::Path;

use hashbrown::HashSet;

use crate::error::{Ibm1Error, Result};
use crate::types::*;

/// One side of a bitext before indexing: each sentence is the set of its
/// whitespace-separated words, kept in first-seen order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Text {
    pub sentences: Vec<Vec<String>>,
}

impl Text {
    #[inline] pub fn len(&self) -> usize { self.sentences.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.sentences.is_empty() }
}

/// Indexed sentence: a set of word ids, no duplicates, iterated in insertion
/// order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sentence {
    ids: Vec<WordId>,
    members: HashSet<WordId>,
}

impl Sentence {
    pub fn from_ids<I: IntoIterator<Item = WordId>>(ids: I) -> Self {
        let mut s = Sentence::default();
        for id in ids {
            s.insert(id);
        }
        s
    }

    /// Adds `id` unless it is already a member.
    pub fn insert(&mut self, id: WordId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    #[inline] pub fn ids(&self) -> &[WordId] { &self.ids }
    #[inline] pub fn len(&self) -> usize { self.ids.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.ids.is_empty() }
    #[inline] pub fn contains(&self, id: WordId) -> bool { self.members.contains(&id) }
}

pub fn parse_plaintext(s: &str) -> Text {
    let mut sentences = Vec::new();
    for line in s.lines() {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut words = Vec::new();
        for w in line.split_whitespace() {
            if seen.insert(w) {
                words.push(w.to_string());
            }
        }
        // empty lines stay as empty sentences so positions line up with the other side
        sentences.push(words);
    }
    Text { sentences }
}

/// Reads a whole corpus file; `-` reads stdin.
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<Text> {
    let path = path.as_ref();
    let io_err = |source| Ibm1Error::Io { path: path.to_path_buf(), source };
    let raw = if path == Path::new("-") {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s).map_err(io_err)?;
        s
    } else {
        fs::read_to_string(path).map_err(io_err)?
    };
    Ok(parse_plaintext(&raw))
}
