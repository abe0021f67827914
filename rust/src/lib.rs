//! # Tickmarshal
//!
//! Marshal cost of one blockchain tick record in two encodings: the
//! protobuf wire format and the protobuf JSON mapping.
//!
//! ```rust
//! use std::num::NonZeroU64;
//! use tickmarshal::{build_fixture, run_benchmark, Encoding, HarnessConfig};
//!
//! let fixture = build_fixture();
//! let config = HarnessConfig::new(NonZeroU64::new(100).unwrap());
//!
//! let binary = run_benchmark(&Encoding::Binary.encoder().unwrap(), &fixture, &config).unwrap();
//! let text = run_benchmark(&Encoding::Text.encoder().unwrap(), &fixture, &config).unwrap();
//!
//! assert_eq!(binary.iterations(), 100);
//! assert!(text.encoded_len() > binary.encoded_len());
//! ```

pub mod encoding;
pub mod error;
pub mod harness;
pub mod report;
pub mod tick;

pub use encoding::{encode_binary, Encoder, Encoding, TextEncoder, TickEncoder};
pub use error::{CodecError, ConfigError, EncodeError, Stage};
pub use harness::{run_benchmark, HarnessConfig, LatencyReport, SizeProbe};
pub use report::LatencySummary;
pub use tick::{build_fixture, message_descriptor, TickData};
