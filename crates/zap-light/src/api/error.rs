use thiserror::Error;

use super::types::{BlockId, NoCastId, RegionId, SourceId};

/// Errors reported by the lighting API.
///
/// None of these abort a frame: drawing degrades to "no light contribution"
/// and registration failures leave the object unregistered.
#[derive(Debug, Error)]
pub enum LightError {
    #[error("lighting is not enabled for region {0:?}")]
    LightingDisabled(RegionId),

    #[error("no light area exists for region {0:?}")]
    UnknownRegion(RegionId),

    #[error("light source {0:?} is not registered")]
    UnknownSource(SourceId),

    #[error("block {0:?} is not registered")]
    UnknownBlock(BlockId),

    #[error("no-cast region {0:?} is not registered")]
    UnknownNoCast(NoCastId),

    #[error("invalid lighting config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type LightResult<T> = Result<T, LightError>;
