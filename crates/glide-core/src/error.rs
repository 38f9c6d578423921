//! Base error type.
//!
//! Sub-crates may define their own error enums and convert them into
//! `GlideError` via `From` impls, or keep them separate and wrap `GlideError`
//! as one variant.  Both patterns are acceptable; prefer whichever keeps
//! error sites clean.

use thiserror::Error;

use crate::{LineId, NodeId, StopId};

/// The top-level error type for `glide-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum GlideError {
    #[error("signal node {0} not found")]
    NodeNotFound(NodeId),

    #[error("bus stop {0} not found")]
    StopNotFound(StopId),

    #[error("bus line {0} not found")]
    LineNotFound(LineId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `glide-*` crates.
pub type GlideResult<T> = Result<T, GlideError>;
