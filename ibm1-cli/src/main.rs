use std::fs;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use ibm1_core::{collect, corpus::check_lengths, read_text, train, write_report, write_stats, TrainOptions};

/// Estimate IBM Model 1 word-translation probabilities from a sentence-aligned corpus.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Target-language corpus, one sentence per line ("-" for stdin)
    target: String,
    /// Source-language corpus, one sentence per line
    source: String,
    /// Number of EM iterations (0 trains nothing)
    iterations: usize,
    /// Only pairs with probability strictly above this are printed
    #[arg(allow_negative_numbers = true)]
    threshold: f64,
    /// Words seen in fewer sentences than this become <UNK>
    #[arg(short = 'u', long = "unk-threshold", default_value_t = ibm1_core::types::DEFAULT_UNK_THRESHOLD)]
    unk_threshold: usize,
    /// Probability a pair gets when it is first seen
    #[arg(short = 'p', long = "initial-probability", allow_negative_numbers = true,
          default_value_t = ibm1_core::types::DEFAULT_PROBABILITY)]
    initial_probability: f64,
    /// Write per-iteration statistics as TSV ("-" for stderr)
    #[arg(short = 'S', long = "stats")]
    stats_out: Option<String>,
    /// More log output (-v info, -vv debug)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn write_stats_to(path: &str, data: &str) -> Result<()> {
    if path == "-" {
        eprint!("{data}");
    } else {
        fs::write(path, data).with_context(|| format!("writing stats to {path}"))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.threshold.is_nan() {
        anyhow::bail!("threshold must be a number");
    }
    let opts = TrainOptions {
        iterations: args.iterations,
        unk_threshold: args.unk_threshold,
        initial_probability: args.initial_probability,
    };
    opts.validate()?;

    let started = Instant::now();
    let target = read_text(&args.target)?;
    let source = read_text(&args.source)?;
    check_lengths(&args.target, target.len(), &args.source, source.len())?;
    log::info!("read {} sentence pairs in {:.2?}", target.len(), started.elapsed());

    let res = train(&target, &source, &opts).context("training failed")?;
    log::info!("trained in {:.2?}", started.elapsed());

    if let Some(path) = args.stats_out.as_deref() {
        write_stats_to(path, &write_stats(&res.stats))?;
    }

    let records = collect(&res.table, &res.target_vocab, &res.source_vocab, args.threshold)?;
    print!("{}", write_report(&records));
    log::info!("{} pairs above {}, total {:.2?}", records.len(), args.threshold, started.elapsed());

    Ok(())
}
