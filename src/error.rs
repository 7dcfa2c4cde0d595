// error.rs
use thiserror::Error;

/// Failure while decoding one base-62 pose body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("pose text ended after {found} of {needed} symbols")]
    Truncated { needed: usize, found: usize },
    #[error("symbol {symbol:?} at offset {offset} is not in the base-62 alphabet")]
    InvalidSymbol { symbol: char, offset: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("joint {index} out of range for structure with {len} joints")]
    JointOutOfRange { index: usize, len: usize },
    #[error("joint {joint} names parent {parent}, but the structure has {len} joints")]
    InvalidParent { joint: usize, parent: usize, len: usize },
    #[error("parent chain starting at joint {joint} never reaches the root")]
    ParentCycle { joint: usize },
    #[error("skeleton must have exactly one root, found {found}")]
    RootCount { found: usize },
    #[error("expected {expected} points, found {found}")]
    PointCount { expected: &'static str, found: usize },
    #[error("pose {name:?} has no skeleton for figure {figure}")]
    MissingSkeleton { name: String, figure: usize },
    #[error("pose index {index} out of range for collection of {len}")]
    PoseOutOfRange { index: usize, len: usize },
    #[error("failed to decode pose: {0}")]
    Decode(#[from] DecodeError),
    #[error("failed to parse pose collection: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
