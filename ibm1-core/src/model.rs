use hashbrown::HashMap;

use crate::types::*;

/// Translation probabilities, keyed source id -> target id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbabilityTable {
    rows: HashMap<WordId, HashMap<WordId, Probability>>,
}

impl ProbabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, f: WordId, e: WordId) -> Option<Probability> {
        self.rows.get(&f).and_then(|row| row.get(&e)).copied()
    }

    #[inline]
    pub fn set(&mut self, f: WordId, e: WordId, p: Probability) {
        self.rows.entry(f).or_default().insert(e, p);
    }

    /// Creates the entry with `init` if the pair has never been seen; returns
    /// the stored value.
    #[inline]
    pub fn get_or_init(&mut self, f: WordId, e: WordId, init: Probability) -> Probability {
        *self.rows.entry(f).or_default().entry(e).or_insert(init)
    }

    pub fn row(&self, f: WordId) -> Option<&HashMap<WordId, Probability>> {
        self.rows.get(&f)
    }

    /// Number of (source, target) entries.
    pub fn len(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.values().all(|r| r.is_empty())
    }

    /// `(source, target, probability)` triples in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (WordId, WordId, Probability)> + '_ {
        self.rows
            .iter()
            .flat_map(|(&f, row)| row.iter().map(move |(&e, &p)| (f, e, p)))
    }

    /// Probability mass over all source words for target `e`.
    pub fn target_mass(&self, e: WordId) -> Probability {
        self.rows.values().filter_map(|row| row.get(&e)).sum()
    }
}

impl FromIterator<(WordId, WordId, Probability)> for ProbabilityTable {
    fn from_iter<I: IntoIterator<Item = (WordId, WordId, Probability)>>(iter: I) -> Self {
        let mut t = ProbabilityTable::new();
        for (f, e, p) in iter {
            t.set(f, e, p);
        }
        t
    }
}
