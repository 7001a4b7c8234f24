//! Bar loading for the runner.
//!
//! Reads a headed CSV of `timestamp,open,high,low,close[,volume]` into an
//! owned, ordered `Vec<Bar>`. Rows are kept in file order; the engine assumes
//! the file is already sorted.
//!
//! Malformed rows (missing or unparseable OHLC, non-finite values, bytes that
//! are not UTF-8) are skipped with a warning and counted. An unparseable
//! volume keeps the bar with volume 0. A file with no usable rows is an error.
//!
//! Synthetic data is a developer-only mode for demos and tests, tagged as such
//! in every artifact.

use bandrev_core::Bar;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}' in CSV header")]
    MissingColumn(&'static str),

    #[error("no valid bars in {source_name}")]
    NoData { source_name: String },
}

/// Where a bar sequence came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    Csv { path: String },
    Synthetic { seed: u64 },
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Csv { path } => write!(f, "{path}"),
            DataSource::Synthetic { seed } => write!(f, "synthetic (seed {seed})"),
        }
    }
}

/// Result of loading bars, including provenance.
#[derive(Debug, Clone)]
pub struct LoadedBars {
    pub bars: Vec<Bar>,
    pub source: DataSource,
    /// Data rows dropped as malformed.
    pub skipped_rows: usize,
    /// BLAKE3 over every bar field, hex.
    pub dataset_hash: String,
}

impl LoadedBars {
    pub fn from_bars(bars: Vec<Bar>, source: DataSource, skipped_rows: usize) -> Self {
        let dataset_hash = compute_dataset_hash(&bars);
        Self {
            bars,
            source,
            skipped_rows,
            dataset_hash,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self.source, DataSource::Synthetic { .. })
    }
}

/// Column positions resolved from the header row.
struct Columns {
    timestamp: Option<usize>,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &'static str| find(name).ok_or(LoadError::MissingColumn(name));
        Ok(Self {
            timestamp: find("timestamp").or_else(|| find("date")),
            open: required("open")?,
            high: required("high")?,
            low: required("low")?,
            close: required("close")?,
            volume: find("volume"),
        })
    }

    /// Parse one data row. `None` means the OHLC values or the timestamp
    /// are unusable; a bad volume only degrades to 0.0.
    fn parse(&self, record: &csv::ByteRecord, line: usize) -> Option<Bar> {
        let num = |i: usize| -> Option<f64> {
            text_field(record, i)?
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
        };
        let timestamp = match self.timestamp {
            Some(i) => text_field(record, i)?.to_string(),
            None => String::new(),
        };
        let mut bar = Bar {
            timestamp,
            open: num(self.open)?,
            high: num(self.high)?,
            low: num(self.low)?,
            close: num(self.close)?,
            volume: 0.0,
        };

        let raw_volume = self.volume.and_then(|i| record.get(i));
        match raw_volume.map(std::str::from_utf8) {
            None | Some(Ok("")) => {}
            Some(Ok(raw)) => match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => bar.volume = v,
                _ => warn!(line, raw, "unparseable volume, using 0"),
            },
            Some(Err(_)) => warn!(line, "volume is not UTF-8, using 0"),
        }
        Some(bar)
    }
}

/// Field `i` as trimmed text, `None` if absent or not UTF-8.
fn text_field(record: &csv::ByteRecord, i: usize) -> Option<&str> {
    std::str::from_utf8(record.get(i)?).ok().map(str::trim)
}

/// Load bars from a CSV file.
pub fn load_csv(path: &Path) -> Result<LoadedBars, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source = DataSource::Csv {
        path: path.display().to_string(),
    };
    let loaded = load_from_reader(file, source)?;
    info!(
        path = %path.display(),
        bars = loaded.bars.len(),
        skipped = loaded.skipped_rows,
        "loaded bars"
    );
    Ok(loaded)
}

/// Load bars from any CSV byte stream.
pub fn load_from_reader<R: io::Read>(
    reader: R,
    source: DataSource,
) -> Result<LoadedBars, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::from_headers(rdr.headers()?)?;

    let mut bars = Vec::new();
    let mut skipped_rows = 0;
    let mut record = csv::ByteRecord::new();
    // Line 1 is the header.
    let mut line = 1;
    while rdr.read_byte_record(&mut record)? {
        line += 1;
        match columns.parse(&record, line) {
            Some(bar) => bars.push(bar),
            None => {
                skipped_rows += 1;
                warn!(line, record = ?record, "skipping malformed row");
            }
        }
    }

    if bars.is_empty() {
        return Err(LoadError::NoData {
            source_name: source.to_string(),
        });
    }

    Ok(LoadedBars::from_bars(bars, source, skipped_rows))
}

/// Write bars as CSV in the same layout `load_csv` reads.
pub fn write_bars_csv(path: &Path, bars: &[Bar]) -> Result<(), LoadError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for bar in bars {
        wtr.serialize(bar)?;
    }
    wtr.flush().map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Compute a deterministic BLAKE3 hash over all bar data, in order.
pub fn compute_dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.timestamp.as_bytes());
        hasher.update(&[0]);
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Generate `n` one-minute synthetic bars from a seed.
///
/// A random walk pulled back toward 100.0, so band crossings and reversions
/// both occur. Same seed, same bars.
pub fn generate_synthetic_bars(n: usize, seed: u64) -> LoadedBars {
    let mut rng = StdRng::seed_from_u64(seed);
    // 2024-01-02T09:30:00Z
    let start: DateTime<Utc> = DateTime::from_timestamp(1_704_187_800, 0).unwrap_or_default();

    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0_f64;
    for i in 0..n {
        let shock: f64 = rng.gen_range(-0.004..0.004);
        let pull = (100.0 - price) / 100.0 * 0.02;
        let open = price;
        let close = (price * (1.0 + shock + pull)).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.001));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.001));
        let volume = rng.gen_range(1_000..50_000u32) as f64;

        let ts = start + Duration::minutes(i as i64);
        bars.push(Bar {
            timestamp: ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
    }

    LoadedBars::from_bars(bars, DataSource::Synthetic { seed }, 0)
}
