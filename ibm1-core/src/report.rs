use crate::error::{Ibm1Error, Result, Side};
use crate::model::ProbabilityTable;
use crate::trainer::IterationStats;
use crate::types::Probability;
use crate::vocab::Vocabulary;

/// One retained (target word, source word) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub target: String,
    pub source: String,
    pub probability: Probability,
}

impl Record {
    pub fn to_line(&self) -> String {
        format!("{}\t{}\t{}", self.target, self.source, format_probability(self.probability))
    }
}

/// Shortest round-trip digits, written the way Python's `repr` writes floats:
/// integral values keep a `.0`, and exponents below -4 or from 16 up switch to
/// `d.ddde-XX` notation with a signed two-digit exponent.
pub fn format_probability(v: Probability) -> String {
    if v.is_nan() {
        return "nan".into();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".into() } else { "-inf".into() };
    }
    let sci = format!("{v:e}");
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    if v != 0.0 && !(-4..16).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exp.abs());
    }
    let fixed = format!("{v}");
    if fixed.contains('.') {
        fixed
    } else {
        fixed + ".0"
    }
}

/// Every entry strictly above `threshold`, in table order.
pub fn collect(
    table: &ProbabilityTable,
    target_vocab: &Vocabulary,
    source_vocab: &Vocabulary,
    threshold: Probability,
) -> Result<Vec<Record>> {
    if threshold.is_nan() {
        return Err(Ibm1Error::InvalidOption("threshold must be a number".into()));
    }
    let mut out = Vec::new();
    for (f, e, v) in table.iter() {
        if v > threshold {
            out.push(Record {
                target: target_vocab.lookup(Side::Target, e)?.to_string(),
                source: source_vocab.lookup(Side::Source, f)?.to_string(),
                probability: v,
            });
        }
    }
    Ok(out)
}

/// Tab-separated lines sorted by the whole line, probabilities rendered by
/// [`format_probability`].
pub fn write_report(records: &[Record]) -> String {
    let mut lines: Vec<String> = records.iter().map(Record::to_line).collect();
    lines.sort();
    let mut s = lines.join("\n");
    if !s.is_empty() {
        s.push('\n');
    }
    s
}

// Per-iteration diagnostics, one TSV line per pass after a header
pub fn write_stats(stats: &[IterationStats]) -> String {
    let mut s = String::from("iteration\tlog_mass\tentries\tskipped_targets\n");
    for st in stats {
        s.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            st.iteration, st.log_mass, st.entries, st.skipped_targets
        ));
    }
    s
}
