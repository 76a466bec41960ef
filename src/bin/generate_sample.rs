//! Writes `sample_lims.parquet` (one row per measurement) and
//! `sample_pims_stats.parquet` (one row per batch with statistic columns).

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const BATCHES: [&str; 8] = [
    "B24001", "B24002", "B24003", "B24004", "B24005", "B24006", "B24007", "B24008",
];

/// `(analyte, target, relative spread)`; spreads land in each stability band.
const ANALYTES: [(&str, f64, f64); 4] = [
    ("Assay", 99.5, 0.01),
    ("pH", 7.0, 0.02),
    ("Water", 0.35, 0.10),
    ("Impurity A", 0.08, 0.30),
];

/// `(variable, target, std of the within-batch std)`
const PROCESS_VARIABLES: [(&str, f64, f64); 3] = [
    ("ROOM_temp", 22.0, 0.5),
    ("DRYER_rpm", 120.0, 4.0),
    ("DRYER_dp", 35.0, 7.0),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn write_parquet(path: &str, schema: Arc<Schema>, columns: Vec<ArrayRef>) -> Result<()> {
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    println!("Wrote {} rows to {path}", batch.num_rows());
    Ok(())
}

/// Replicate results per batch and analyte, with the odd text result mixed in.
fn lims_sample(rng: &mut SimpleRng) -> Result<()> {
    let mut seq = Vec::new();
    let mut charg = Vec::new();
    let mut analyte = Vec::new();
    let mut result = Vec::new();

    for batch in BATCHES {
        for (name, target, spread) in ANALYTES {
            for _ in 0..3 {
                seq.push(seq.len() as i64 + 1);
                charg.push(batch.to_string());
                analyte.push(name.to_string());
                result.push(format!("{:.3}", rng.gauss(target, target * spread)));
            }
        }
        seq.push(seq.len() as i64 + 1);
        charg.push(batch.to_string());
        analyte.push("Appearance".to_string());
        result.push("PASS".to_string());

        seq.push(seq.len() as i64 + 1);
        charg.push(batch.to_string());
        analyte.push("Particle size".to_string());
        result.push("90-110".to_string());
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("SEQ", DataType::Int64, false),
        Field::new("CHARG", DataType::Utf8, false),
        Field::new("ANALYTE", DataType::Utf8, false),
        Field::new("FINAL", DataType::Utf8, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(seq)),
        Arc::new(StringArray::from(charg)),
        Arc::new(StringArray::from(analyte)),
        Arc::new(StringArray::from(result)),
    ];
    write_parquet("sample_lims.parquet", schema, columns)
}

/// One row per batch with `<variable>_평균` / `<variable>_표준편차` columns.
fn pims_sample(rng: &mut SimpleRng) -> Result<()> {
    let mut fields = vec![Field::new("배치번호", DataType::Utf8, false)];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(BATCHES.to_vec()))];

    for (name, target, std_spread) in PROCESS_VARIABLES {
        let means: Vec<f64> = BATCHES.iter().map(|_| rng.gauss(target, target * 0.02)).collect();
        let stds: Vec<f64> = BATCHES.iter().map(|_| rng.gauss(std_spread, std_spread * 0.2).abs()).collect();
        fields.push(Field::new(format!("{name}_평균"), DataType::Float64, false));
        fields.push(Field::new(format!("{name}_표준편차"), DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from(means)));
        columns.push(Arc::new(Float64Array::from(stds)));
    }

    write_parquet("sample_pims_stats.parquet", Arc::new(Schema::new(fields)), columns)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    lims_sample(&mut rng)?;
    pims_sample(&mut rng)
}
