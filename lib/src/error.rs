use thiserror::Error;

/// Misuse of the accumulation pipeline.
///
/// None of these are recoverable runtime conditions; they surface a caller
/// or implementation bug and are propagated as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccumulationError {
    #[error("discontinuation points cannot be accumulated")]
    DiscontinuationAccumulated,
    #[error("{0} is not supported")]
    Unsupported(&'static str),
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
    #[error("accumulation window folded {folded} points but yielded no result")]
    EmptyAccumulation { folded: usize },
}

pub type Result<T, E = AccumulationError> = std::result::Result<T, E>;
