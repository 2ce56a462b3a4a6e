use hashbrown::{HashMap, HashSet};

use crate::corpus::ParallelCorpus;
use crate::error::{Ibm1Error, Result};
use crate::model::ProbabilityTable;
use crate::text::Text;
use crate::types::*;
use crate::vocab::Vocabulary;

#[derive(Clone, Debug)]
pub struct TrainOptions {
    pub iterations: usize,     // 0 => no training at all
    pub unk_threshold: usize,  // sentence frequency below this folds into <UNK>
    pub initial_probability: Probability,
}

impl Default for TrainOptions {
    fn default() -> Self {
        TrainOptions {
            iterations: DEFAULT_ITERATIONS,
            unk_threshold: DEFAULT_UNK_THRESHOLD,
            initial_probability: DEFAULT_PROBABILITY,
        }
    }
}

impl TrainOptions {
    pub fn validate(&self) -> Result<()> {
        let p = self.initial_probability;
        if !p.is_finite() || p < 0.0 {
            return Err(Ibm1Error::InvalidOption(format!(
                "initial probability must be a finite non-negative number, got {p}"
            )));
        }
        Ok(())
    }
}

/// What one EM pass saw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationStats {
    pub iteration: usize,
    /// Sum over pairs and target words of `ln(sum_f t(e|f))` under the
    /// probabilities the E-step used. Zero-mass words are left out.
    ///
    /// Diagnostic only. The E-step normalizes each source word over the
    /// sentence's targets, so this is not a quantity EM is guaranteed to
    /// increase and it can fall from one iteration to the next.
    pub log_mass: f64,
    /// Table entries after the M-step.
    pub entries: usize,
    /// Targets seen this iteration whose expected count was zero or that never
    /// co-occurred with a source word; their entries kept prior values.
    pub skipped_targets: usize,
}

pub struct Trainer<'a> {
    corpus: &'a ParallelCorpus,
    probs: ProbabilityTable,
    initial_probability: Probability,
    iteration: usize,
}

impl<'a> Trainer<'a> {
    pub fn new(corpus: &'a ParallelCorpus, opts: &TrainOptions) -> Result<Self> {
        Self::with_table(corpus, ProbabilityTable::new(), opts)
    }

    /// Continues from an existing table. Entries already present are used as
    /// they are; only unseen pairs get the initial probability.
    pub fn with_table(
        corpus: &'a ParallelCorpus,
        table: ProbabilityTable,
        opts: &TrainOptions,
    ) -> Result<Self> {
        opts.validate()?;
        Ok(Trainer {
            corpus,
            probs: table,
            initial_probability: opts.initial_probability,
            iteration: 0,
        })
    }

    /// Completed EM passes.
    #[inline] pub fn iteration(&self) -> usize { self.iteration }
    #[inline] pub fn table(&self) -> &ProbabilityTable { &self.probs }
    pub fn into_table(self) -> ProbabilityTable { self.probs }

    /// One full expectation + maximization pass over the corpus.
    pub fn step(&mut self) -> IterationStats {
        let mut e_counts: HashMap<WordId, Probability> = HashMap::new();
        let mut ef_counts: HashMap<(WordId, WordId), Probability> = HashMap::new();
        let mut log_mass = 0.0;
        let mut seen_targets: HashSet<WordId> = HashSet::new();
        let mut mass: Vec<Probability> = Vec::new();

        for (tgt, src) in self.corpus.pairs() {
            let tgt_ids = tgt.ids();
            seen_targets.extend(tgt_ids.iter().copied());

            for &f in src.ids() {
                for &e in tgt_ids {
                    self.probs.get_or_init(f, e, self.initial_probability);
                }
            }

            mass.clear();
            mass.resize(tgt_ids.len(), 0.0);

            for &f in src.ids() {
                let row = match self.probs.row(f) {
                    Some(r) => r,
                    None => continue,
                };
                let p = |e: &WordId| row.get(e).copied().unwrap_or(0.0);
                // denominator is restricted to this sentence's targets
                let sum_f: Probability = tgt_ids.iter().map(p).sum();

                for (k, e) in tgt_ids.iter().enumerate() {
                    let p_fe = p(e);
                    mass[k] += p_fe;
                    let w = if sum_f > 0.0 { p_fe / sum_f } else { 0.0 };
                    *e_counts.entry(*e).or_insert(0.0) += w;
                    *ef_counts.entry((f, *e)).or_insert(0.0) += w;
                }
            }

            log_mass += mass.iter().filter(|&&m| m > 0.0).map(|m| m.ln()).sum::<f64>();
        }

        for (&(f, e), &v) in ef_counts.iter() {
            if let Some(&total) = e_counts.get(&e) {
                if total > 0.0 {
                    self.probs.set(f, e, v / total);
                }
            }
        }
        let skipped = seen_targets
            .iter()
            .filter(|e| !matches!(e_counts.get(*e), Some(&total) if total > 0.0))
            .count();

        self.iteration += 1;
        let stats = IterationStats {
            iteration: self.iteration,
            log_mass,
            entries: self.probs.len(),
            skipped_targets: skipped,
        };

        log::debug!(
            "iteration {}: log mass {:.6}, {} entries",
            stats.iteration,
            stats.log_mass,
            stats.entries
        );
        if stats.skipped_targets > 0 {
            log::warn!(
                "iteration {}: {} target words had no expected count, kept previous probabilities",
                stats.iteration,
                stats.skipped_targets
            );
        }
        stats
    }

    /// Runs exactly `iterations` passes; there is no convergence check.
    pub fn run(&mut self, iterations: usize) -> Vec<IterationStats> {
        (0..iterations).map(|_| self.step()).collect()
    }
}

#[derive(Debug)]
pub struct TrainResult {
    pub table: ProbabilityTable,
    pub target_vocab: Vocabulary,
    pub source_vocab: Vocabulary,
    pub stats: Vec<IterationStats>,
}

/// Indexes both sides, checks they pair up, and trains for `opts.iterations`.
pub fn train(target: &Text, source: &Text, opts: &TrainOptions) -> Result<TrainResult> {
    opts.validate()?;
    let (corpus, target_vocab, source_vocab) =
        ParallelCorpus::index(target, source, opts.unk_threshold)?;

    log::info!(
        "training on {} sentence pairs ({} target / {} source word types), {} iterations",
        corpus.len(),
        target_vocab.n_words(),
        source_vocab.n_words(),
        opts.iterations
    );
    if opts.iterations == 0 {
        log::warn!("zero iterations requested, the probability table stays empty");
    }

    let mut trainer = Trainer::new(&corpus, opts)?;
    let stats = trainer.run(opts.iterations);
    let table = trainer.into_table();

    log::info!("training finished with {} table entries", table.len());

    Ok(TrainResult { table, target_vocab, source_vocab, stats })
}

pub fn train_plaintext(target: &str, source: &str, opts: &TrainOptions) -> Result<TrainResult> {
    train(
        &crate::text::parse_plaintext(target),
        &crate::text::parse_plaintext(source),
        opts,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::parse_plaintext;

    const EPS: f64 = 1e-9;

    fn toy() -> (ParallelCorpus, Vocabulary, Vocabulary) {
        let target = parse_plaintext("the house\nthe book\n");
        let source = parse_plaintext("la casa\nla libro\n");
        ParallelCorpus::index(&target, &source, 1).unwrap()
    }

    fn target_ids(corpus: &ParallelCorpus) -> HashSet<WordId> {
        corpus.pairs().flat_map(|(t, _)| t.ids().iter().copied()).collect()
    }

    fn assert_normalized(corpus: &ParallelCorpus, table: &ProbabilityTable) {
        for e in target_ids(corpus) {
            let mass = table.target_mass(e);
            assert!((mass - 1.0).abs() < EPS, "target {e} has mass {mass}");
        }
    }

    #[test]
    fn normalization_holds_after_every_iteration() {
        let target = parse_plaintext(
            "the house is small\nthe house is big\nthe book is small\na book\nmy house\n",
        );
        let source = parse_plaintext(
            "das haus ist klein\ndas haus ist gross\ndas buch ist klein\nein buch\nmein haus\n",
        );
        let (corpus, _, _) = ParallelCorpus::index(&target, &source, 1).unwrap();
        let mut trainer = Trainer::new(&corpus, &TrainOptions::default()).unwrap();
        for i in 1..=10 {
            let stats = trainer.step();
            assert_eq!(stats.iteration, i);
            assert_eq!(stats.skipped_targets, 0);
            assert!(stats.log_mass.is_finite());
            assert_normalized(&corpus, trainer.table());
        }
    }

    #[test]
    fn first_iteration_splits_evenly() {
        let (corpus, tv, sv) = toy();
        let mut trainer = Trainer::new(&corpus, &TrainOptions::default()).unwrap();
        trainer.step();
        let t = trainer.table();
        let house = tv.id("house").unwrap();
        let casa = sv.id("casa").unwrap();
        let la = sv.id("la").unwrap();
        let libro = sv.id("libro").unwrap();
        assert!((t.get(casa, house).unwrap() - 0.5).abs() < EPS);
        assert!((t.get(la, house).unwrap() - 0.5).abs() < EPS);
        // never co-occur, so no entry at all
        assert_eq!(t.get(libro, house), None);
        assert_eq!(t.get(NULL_ID, house), None);
    }

    #[test]
    fn second_iteration_prefers_the_specific_source_word() {
        let (corpus, tv, sv) = toy();
        let mut trainer = Trainer::new(&corpus, &TrainOptions::default()).unwrap();
        trainer.run(2);
        let t = trainer.table();
        let house = tv.id("house").unwrap();
        let book = tv.id("book").unwrap();
        let casa = sv.id("casa").unwrap();
        let libro = sv.id("libro").unwrap();
        let la = sv.id("la").unwrap();
        assert!((t.get(casa, house).unwrap() - 0.6).abs() < EPS);
        assert!((t.get(la, house).unwrap() - 0.4).abs() < EPS);
        assert!((t.get(libro, book).unwrap() - 0.6).abs() < EPS);
        assert_normalized(&corpus, t);
    }

    #[test]
    fn log_mass_is_not_monotone_but_normalization_holds() {
        let target = parse_plaintext("a b c d\na\nb c\n");
        let source = parse_plaintext("x\ny z w\nz\n");
        let (corpus, _, _) = ParallelCorpus::index(&target, &source, 1).unwrap();
        let mut trainer = Trainer::new(&corpus, &TrainOptions::default()).unwrap();
        let mut masses = Vec::new();
        for _ in 0..15 {
            let stats = trainer.step();
            assert!(stats.log_mass.is_finite());
            assert_normalized(&corpus, trainer.table());
            masses.push(stats.log_mass);
        }
        assert!(masses[1] > masses[0]);
        // falls steadily after the second pass
        assert!(masses[2] < masses[1]);
        assert!(masses[14] < masses[2]);
    }

    #[test]
    fn zero_iterations_leave_the_table_empty() {
        let opts = TrainOptions { iterations: 0, ..TrainOptions::default() };
        let res = train_plaintext("the house\n", "la casa\n", &opts).unwrap();
        assert!(res.table.is_empty());
        assert!(res.stats.is_empty());
    }

    #[test]
    fn zero_initial_probability_skips_every_target() {
        let (corpus, _, _) = toy();
        let opts = TrainOptions { initial_probability: 0.0, ..TrainOptions::default() };
        let mut trainer = Trainer::new(&corpus, &opts).unwrap();
        let stats = trainer.step();
        // the, house, book, NULL
        assert_eq!(stats.skipped_targets, 4);
        assert_eq!(stats.log_mass, 0.0);
        assert!(trainer.table().iter().all(|(_, _, p)| p == 0.0));
        assert_eq!(trainer.table().len(), 10);
    }

    #[test]
    fn zero_count_target_keeps_previous_values() {
        let (corpus, tv, sv) = toy();
        let house = tv.id("house").unwrap();
        let la = sv.id("la").unwrap();
        let casa = sv.id("casa").unwrap();
        let mut table = ProbabilityTable::new();
        table.set(la, house, 0.0);
        table.set(casa, house, 0.0);

        let mut trainer = Trainer::with_table(&corpus, table, &TrainOptions::default()).unwrap();
        let stats = trainer.step();
        assert_eq!(stats.skipped_targets, 1);
        let t = trainer.table();
        assert_eq!(t.get(la, house), Some(0.0));
        assert_eq!(t.get(casa, house), Some(0.0));
        for e in ["the", "book", NULL_SYMBOL] {
            let id = tv.id(e).unwrap();
            assert!((t.target_mass(id) - 1.0).abs() < EPS);
        }
        assert!(t.iter().all(|(_, _, p)| p.is_finite()));
    }

    #[test]
    fn unknown_words_pool_their_mass() {
        let target = parse_plaintext("a x\na y\n");
        let source = parse_plaintext("b p\nb q\n");
        let (corpus, tv, sv) = ParallelCorpus::index(&target, &source, 2).unwrap();
        assert_eq!(tv.n_words(), 1);
        assert_eq!(sv.n_words(), 1);

        let mut trainer = Trainer::new(&corpus, &TrainOptions::default()).unwrap();
        trainer.run(3);
        let t = trainer.table();
        // source {b, UNK} x target {a, UNK, NULL}
        assert_eq!(t.len(), 6);
        assert!(t.get(UNK_ID, UNK_ID).unwrap() > 0.0);
        assert!((t.target_mass(UNK_ID) - 1.0).abs() < EPS);
    }

    #[test]
    fn training_is_deterministic() {
        let opts = TrainOptions { iterations: 4, ..TrainOptions::default() };
        let a = train_plaintext("x y z\ny z\nz\n", "p q r\nq r\nr\n", &opts).unwrap();
        let b = train_plaintext("x y z\ny z\nz\n", "p q r\nq r\nr\n", &opts).unwrap();
        assert_eq!(a.table, b.table);
        assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn invalid_initial_probability_is_rejected() {
        let (corpus, _, _) = toy();
        for p in [-0.5, f64::NAN, f64::INFINITY] {
            let opts = TrainOptions { initial_probability: p, ..TrainOptions::default() };
            assert!(matches!(
                Trainer::new(&corpus, &opts),
                Err(Ibm1Error::InvalidOption(_))
            ));
        }
    }

    #[test]
    fn empty_source_sentence_contributes_nothing() {
        let opts = TrainOptions { iterations: 2, ..TrainOptions::default() };
        let res = train_plaintext("a b\nc\n", "x\n\n", &opts).unwrap();
        let c = res.target_vocab.id("c").unwrap();
        assert_eq!(res.table.target_mass(c), 0.0);
        // "c" never meets a source word, so every pass reports it as skipped
        assert!(res.stats.iter().all(|st| st.skipped_targets == 1));
        let a = res.target_vocab.id("a").unwrap();
        assert!((res.table.target_mass(a) - 1.0).abs() < EPS);
    }
}
