use std::num::NonZeroU64;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tickmarshal::{
    build_fixture, run_benchmark, CodecError, EncodeError, Encoding, HarnessConfig, LatencyReport,
    SizeProbe,
};
use tracing::error;

#[derive(Parser)]
#[command(name = "compare_encodings", about = "Compare tick marshal cost: protobuf binary vs protobuf JSON")]
struct Cli {
    /// JSON harness config; flags below override its values
    #[arg(long, env = "TICK_CONFIG")]
    config: Option<PathBuf>,

    /// Timed encode calls per encoding [default: 10000]
    #[arg(long, env = "TICK_ITERATIONS")]
    iterations: Option<NonZeroU64>,

    /// How the serialized length is measured [default: separate]
    #[arg(long, value_enum, env = "TICK_SIZE_PROBE")]
    size_probe: Option<ProbeArg>,

    /// Which encoding to run
    #[arg(long, value_enum, default_value_t = EncodingArg::All, env = "TICK_ENCODING")]
    encoding: EncodingArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProbeArg {
    Separate,
    FirstIteration,
}

impl From<ProbeArg> for SizeProbe {
    fn from(arg: ProbeArg) -> Self {
        match arg {
            ProbeArg::Separate => SizeProbe::Separate,
            ProbeArg::FirstIteration => SizeProbe::FirstIteration,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum EncodingArg {
    Binary,
    Text,
    All,
}

impl EncodingArg {
    fn selected(self) -> Vec<Encoding> {
        match self {
            EncodingArg::Binary => vec![Encoding::Binary],
            EncodingArg::Text => vec![Encoding::Text],
            EncodingArg::All => Encoding::ALL.to_vec(),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match HarnessConfig::from_path(path) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "failed to load harness config");
                return ExitCode::FAILURE;
            }
        },
        None => HarnessConfig::default(),
    };
    if let Some(iterations) = cli.iterations {
        config.iterations = iterations;
    }
    if let Some(size_probe) = cli.size_probe {
        config.size_probe = size_probe.into();
    }

    match run_selected(cli.encoding, &config) {
        Ok(reports) => {
            print_table(&reports);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "benchmark run failed");
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("failed to build {0} encoder: {1}")]
    Setup(Encoding, #[source] CodecError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

fn run_selected(selection: EncodingArg, config: &HarnessConfig) -> Result<Vec<LatencyReport>, RunError> {
    let fixture = build_fixture();

    let mut reports = Vec::new();
    for encoding in selection.selected() {
        let encoder = encoding.encoder().map_err(|e| RunError::Setup(encoding, e))?;
        reports.push(run_benchmark(&encoder, &fixture, config)?);
    }
    Ok(reports)
}

fn print_table(reports: &[LatencyReport]) {
    println!();
    println!("| Encoding | Bytes | Mean (ns) | Median (ns) | p99 (ns) | Min (ns) | Max (ns) |");
    println!("|----------|-------|-----------|-------------|----------|----------|----------|");

    for report in reports {
        let s = report.summary();
        println!(
            "| {:8} | {:5} | {:9} | {:11} | {:8} | {:8} | {:8} |",
            report.encoding(),
            report.encoded_len(),
            ns(s.mean),
            ns(s.median),
            ns(s.p99),
            ns(s.min),
            ns(s.max),
        );
    }

    println!();
}

fn ns(d: Duration) -> u128 {
    d.as_nanos()
}
