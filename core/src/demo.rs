//! Demo ledgers: the fixed population used by the runner's `--populate`
//! and seeded random batches for exercising the engine.

use crate::{
    error::ReportResult,
    record::{Metadata, Record},
    rng::BatchRng,
    store::RecordStore,
    types::Amount,
};

const POSTS: &[(&str, &str)] = &[
    ("Bangkok", "Thailand"),
    ("Phuket", "Thailand"),
    ("Paris", "France"),
    ("Marseille", "France"),
    ("Ibiza", "Spain"),
    ("Barcelona", "Spain"),
    ("Washington", "USA"),
    ("Boston", "USA"),
    ("Montreal", "Canada"),
];

const FEES: &[(&str, Amount)] = &[("Fee 19", 100), ("Fee 4", 55), ("Fee 6", 30)];

fn entry(amount: Amount, post: &str, fee_type: &str, country: &str) -> (Amount, Metadata) {
    (
        amount,
        Metadata::from([("post", post), ("fee type", fee_type), ("country", country)]),
    )
}

/// The fixed demo population: twelve consular fees repeated three
/// times, then three one-offs. 39 records in all.
pub fn demo_ledger() -> Vec<(Amount, Metadata)> {
    let block = [
        entry(100, "Bangkok", "Fee 19", "Thailand"),
        entry(100, "Bangkok", "Fee 19", "Thailand"),
        entry(100, "Phuket", "Fee 19", "Thailand"),
        entry(55, "Phuket", "Fee 4", "Thailand"),
        entry(30, "Phuket", "Fee 6", "Thailand"),
        entry(100, "Paris", "Fee 19", "France"),
        entry(100, "Marseille", "Fee 19", "France"),
        entry(100, "Ibiza", "Fee 19", "Spain"),
        entry(100, "Ibiza", "Fee 19", "Spain"),
        entry(100, "Ibiza", "Fee 19", "Spain"),
        entry(55, "Ibiza", "Fee 4", "Spain"),
        entry(100, "Barcelona", "Fee 19", "Spain"),
    ];

    let mut ledger: Vec<(Amount, Metadata)> = Vec::with_capacity(block.len() * 3 + 3);
    for _ in 0..3 {
        ledger.extend(block.iter().cloned());
    }
    ledger.push(entry(100, "Washington", "Fee 19", "USA"));
    ledger.push(entry(55, "Boston", "Fee 4", "USA"));
    ledger.push(entry(100, "Montreal", "Fee 19", "Canada"));
    ledger
}

/// Write the demo population into `store`. Returns how many were added.
pub fn populate<S: RecordStore + ?Sized>(store: &S) -> ReportResult<usize> {
    let ledger = demo_ledger();
    for (amount, metadata) in &ledger {
        store.insert_record(*amount, metadata)?;
    }
    log::info!("populated {} demo record(s)", ledger.len());
    Ok(ledger.len())
}

/// `n` reproducible records over the demo vocabulary. Each attribute is
/// dropped with some probability so batches have ragged schemas, and
/// an occasional `reference` attribute appears late in the batch.
pub fn random_batch(seed: u64, n: usize) -> Vec<Record> {
    let mut rng = BatchRng::new(seed);
    (0..n)
        .map(|i| {
            let (post, country) = *rng.pick(POSTS);
            let (fee_type, amount) = *rng.pick(FEES);
            let mut metadata = Metadata::new();
            if rng.chance(0.9) {
                metadata.insert("post", post);
            }
            if rng.chance(0.8) {
                metadata.insert("fee type", fee_type);
            }
            if rng.chance(0.85) {
                metadata.insert("country", country);
            }
            if i >= n / 2 && rng.chance(0.2) {
                metadata.insert("reference", format!("REF-{:04}", rng.next_u64_below(10_000)));
            }
            Record::new(amount, metadata)
        })
        .collect()
}
