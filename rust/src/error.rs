use std::fmt;

/// Failure of a single encode call
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("protobuf encode error: {0}")]
    Protobuf(#[from] prost::EncodeError),

    #[error("json encode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("protobuf descriptor error: {0}")]
    Descriptor(#[from] prost_reflect::DescriptorError),

    #[error("message type '{0}' not found in descriptor pool")]
    UnknownMessage(String),

    #[error("reflection error: {0}")]
    Reflect(String),

    #[error("encoder rejected the record: {0}")]
    Rejected(String),
}

/// Harness configuration that could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where in a benchmark run an encode call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The untimed call that measures the serialized length
    SizeProbe,
    /// A timed iteration, numbered from 1
    Iteration(u64),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::SizeProbe => write!(f, "size probe"),
            Stage::Iteration(n) => write!(f, "iteration {n}"),
        }
    }
}

/// A benchmark run aborted by a failing encode call.
///
/// Samples collected before the failure are dropped with the run.
#[derive(Debug, thiserror::Error)]
#[error("{encoding} encoding failed at {stage}: {source}")]
pub struct EncodeError {
    pub encoding: String,
    pub stage: Stage,
    #[source]
    pub source: CodecError,
}

impl EncodeError {
    pub fn new(encoding: impl Into<String>, stage: Stage, source: CodecError) -> Self {
        Self {
            encoding: encoding.into(),
            stage,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_encoding_and_iteration() {
        let err = EncodeError::new(
            "binary",
            Stage::Iteration(3),
            CodecError::Rejected("boom".into()),
        );
        assert_eq!(
            err.to_string(),
            "binary encoding failed at iteration 3: encoder rejected the record: boom"
        );

        let probe = EncodeError::new("text", Stage::SizeProbe, CodecError::Rejected("x".into()));
        assert!(probe.to_string().contains("size probe"));
    }
}
