use ibm1_core::{collect, train_plaintext, write_report, write_stats, TrainOptions};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct TrainOutput {
    report: String,
    stats: String,
}

#[wasm_bindgen]
impl TrainOutput {
    #[wasm_bindgen(getter)]
    pub fn report(&self) -> String {
        self.report.clone()
    }
    #[wasm_bindgen(getter)]
    pub fn stats(&self) -> String {
        self.stats.clone()
    }
}

/// Trains on two in-memory corpora (one sentence per line) and returns the
/// sorted `target\tsource\tprobability` report.
#[wasm_bindgen]
pub fn train_report(
    target_text: &str,
    source_text: &str,
    iterations: usize,
    threshold: f64,
    unk_threshold: usize,
    initial_probability: f64,
) -> Result<TrainOutput, JsValue> {
    let opts = TrainOptions { iterations, unk_threshold, initial_probability };
    let res = train_plaintext(target_text, source_text, &opts)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let records = collect(&res.table, &res.target_vocab, &res.source_vocab, threshold)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(TrainOutput {
        report: write_report(&records),
        stats: write_stats(&res.stats),
    })
}
