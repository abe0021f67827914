//! Per-call timing harness
//!
//! Every timed window brackets exactly one `encode` call. Fixture
//! construction, the size probe, and dropping the encoded buffer all happen
//! outside the window.

use std::hint::black_box;
use std::num::NonZeroU64;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info};

use crate::encoding::Encoder;
use crate::error::{ConfigError, EncodeError, Stage};
use crate::report::LatencySummary;
use crate::tick::TickData;

/// How the serialized length is obtained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeProbe {
    /// One extra untimed encode before the loop; doubles as a warm-up call
    #[default]
    Separate,
    /// Read the length off timed iteration 1, after its timer stops
    FirstIteration,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub iterations: NonZeroU64,
    pub size_probe: SizeProbe,
}

/// Upper bound on samples reserved before the first call; the buffer grows past it
const MAX_PREALLOC: usize = 1 << 16;

const DEFAULT_ITERATIONS: NonZeroU64 = match NonZeroU64::new(10_000) {
    Some(n) => n,
    None => NonZeroU64::MIN,
};

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            size_probe: SizeProbe::default(),
        }
    }
}

impl HarnessConfig {
    pub fn new(iterations: NonZeroU64) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    pub fn with_size_probe(mut self, size_probe: SizeProbe) -> Self {
        self.size_probe = size_probe;
        self
    }

    /// Parse a JSON config; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Outcome of a completed run: one sample per iteration, in order
#[derive(Debug, Clone)]
pub struct LatencyReport {
    encoding: String,
    encoded_len: usize,
    samples: Vec<Duration>,
}

impl LatencyReport {
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Serialized length of the fixture, in bytes
    pub fn encoded_len(&self) -> usize {
        self.encoded_len
    }

    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    pub fn iterations(&self) -> u64 {
        self.samples.len() as u64
    }

    /// Sum of the timed windows, excluding everything between them
    pub fn total(&self) -> Duration {
        self.samples.iter().sum()
    }

    pub fn summary(&self) -> LatencySummary {
        LatencySummary::from_samples(&self.samples)
    }
}

/// Encode `fixture` `config.iterations` times, timing each call on its own.
///
/// The first failing call aborts the run; nothing is retried and no partial
/// report is produced.
pub fn run_benchmark<E: Encoder + ?Sized>(
    encoder: &E,
    fixture: &TickData,
    config: &HarnessConfig,
) -> Result<LatencyReport, EncodeError> {
    let iterations = config.iterations.get();
    debug!(
        encoding = encoder.label(),
        iterations,
        size_probe = ?config.size_probe,
        "starting benchmark run"
    );

    let reserve = usize::try_from(iterations).map_or(MAX_PREALLOC, |n| n.min(MAX_PREALLOC));
    let mut samples = Vec::with_capacity(reserve);

    let encoded_len = match config.size_probe {
        SizeProbe::Separate => probe_len(encoder, fixture)?,
        SizeProbe::FirstIteration => {
            let (elapsed, len) = timed_encode(encoder, fixture, 1)?;
            samples.push(elapsed);
            len
        }
    };
    info!(encoding = encoder.label(), bytes = encoded_len, "serialized message length");

    let first = samples.len() as u64 + 1;
    for iteration in first..=iterations {
        let (elapsed, _) = timed_encode(encoder, fixture, iteration)?;
        samples.push(elapsed);
    }

    debug!(encoding = encoder.label(), samples = samples.len(), "benchmark run complete");

    Ok(LatencyReport {
        encoding: encoder.label().to_owned(),
        encoded_len,
        samples,
    })
}

fn probe_len<E: Encoder + ?Sized>(encoder: &E, fixture: &TickData) -> Result<usize, EncodeError> {
    encoder
        .encode(fixture)
        .map(|bytes| bytes.len())
        .map_err(|source| EncodeError::new(encoder.label(), Stage::SizeProbe, source))
}

/// One timed window. The buffer is dropped after the clock is read.
#[inline]
fn timed_encode<E: Encoder + ?Sized>(
    encoder: &E,
    fixture: &TickData,
    iteration: u64,
) -> Result<(Duration, usize), EncodeError> {
    let start = Instant::now();
    let result = encoder.encode(black_box(fixture));
    let elapsed = start.elapsed();

    let bytes = result
        .map_err(|source| EncodeError::new(encoder.label(), Stage::Iteration(iteration), source))?;
    let len = black_box(bytes).len();
    Ok((elapsed, len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Encoding;
    use crate::tick::build_fixture;

    fn iterations(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.iterations.get(), 10_000);
        assert_eq!(config.size_probe, SizeProbe::Separate);
    }

    #[test]
    fn test_config_from_json() {
        let config =
            HarnessConfig::from_json(r#"{"iterations": 250, "size_probe": "first-iteration"}"#).unwrap();
        assert_eq!(config, HarnessConfig::new(iterations(250)).with_size_probe(SizeProbe::FirstIteration));

        let partial = HarnessConfig::from_json(r#"{"iterations": 5}"#).unwrap();
        assert_eq!(partial.size_probe, SizeProbe::Separate);

        assert!(matches!(
            HarnessConfig::from_json(r#"{"iterations": 0}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_config_from_missing_path() {
        let err = HarnessConfig::from_path("/nonexistent/tick-harness.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("tick-harness.json"));
    }

    #[test]
    fn test_report_per_iteration_samples() {
        let fixture = build_fixture();
        let config = HarnessConfig::new(iterations(32));

        let encoder = Encoding::Binary.encoder().unwrap();
        let report = run_benchmark(&encoder, &fixture, &config).unwrap();
        assert_eq!(report.encoding(), "binary");
        assert_eq!(report.iterations(), 32);
        assert_eq!(report.samples().len(), 32);
        assert_eq!(report.encoded_len(), 559);
        assert_eq!(report.total(), report.samples().iter().sum::<Duration>());
    }

    #[test]
    fn test_probe_policies_agree_on_length() {
        let fixture = build_fixture();
        let separate = HarnessConfig::new(iterations(4));
        let first = separate.clone().with_size_probe(SizeProbe::FirstIteration);

        for encoding in Encoding::ALL {
            let encoder = encoding.encoder().unwrap();
            let a = run_benchmark(&encoder, &fixture, &separate).unwrap();
            let b = run_benchmark(&encoder, &fixture, &first).unwrap();
            assert_eq!(a.encoded_len(), b.encoded_len());
            assert_eq!(a.iterations(), b.iterations());
        }
    }
}
