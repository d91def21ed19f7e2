//! Error taxonomy for the design pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the design pipeline.
pub enum DesignError {
    /// I/O error (opening or reading an input file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A base outside A/C/G/T on the 2-bit encoding path.
    #[error("unsupported base '{base}' at position {position} for 2-bit encoding")]
    InvalidBase { base: char, position: usize },
    /// K-mer longer than a `u64` can hold at 2 bits per base.
    #[error("k-mer length {k} exceeds the 32-base limit of 2-bit encoding")]
    KmerTooLong { k: usize },
    /// The 8-byte length header of an off-target k-mer file could not be read.
    #[error("malformed off-target k-mer header: {0}")]
    MalformedHeader(String),
    /// Off-target k-mers are longer than the target k-mers.
    #[error(
        "off-target k-mer length {off_target} is greater than target k-mer length {target}; it must be equal or lower"
    )]
    OffTargetLengthExceeds { off_target: usize, target: usize },
    /// Off-target k-mer stream ended inside an 8-byte record.
    #[error("off-target k-mer stream ends with a truncated record ({trailing} trailing bytes)")]
    TruncatedRecord { trailing: usize },
    /// No k-mers left to seed a consensus from.
    #[error("k-mer pool is empty; no consensus can be seeded")]
    EmptyPool,
    /// A trial assembled a consensus shorter than the requested construct.
    #[error("consensus length {len} is shorter than construct length {construct_len}")]
    ConsensusTooShort { len: usize, construct_len: usize },
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
    /// The header selected for biasing is not among the targets.
    #[error("bias reference header '{0}' not present in input file")]
    BiasHeaderMissing(String),
    /// CSV export failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Sequence file could not be parsed.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

impl DesignError {
    /// Failures that only invalidate one search trial.
    pub fn is_trial_local(&self) -> bool {
        matches!(self, DesignError::ConsensusTooShort { .. })
    }
}

pub type Result<T> = std::result::Result<T, DesignError>;
