use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_OBJECT_ID: AtomicU32 = AtomicU32::new(1);

fn next_object_id() -> u32 {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Identifies the world region a light area belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(pub u32);

/// Handle to a light source registered in a light area.
///
/// Ids are unique for the whole process, so a source keeps its id when it
/// is transferred to another area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub u32);

/// Handle to an occluder registered in a light area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

/// Handle to a no-cast region registered in a light area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoCastId(pub u32);

impl SourceId {
    pub(crate) fn next() -> Self {
        SourceId(next_object_id())
    }
}

impl BlockId {
    pub(crate) fn next() -> Self {
        BlockId(next_object_id())
    }
}

impl NoCastId {
    pub(crate) fn next() -> Self {
        NoCastId(next_object_id())
    }
}

/// Per-frame counters returned by `LightArea::draw`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Sources that contributed to the light layer.
    pub sources_drawn: u32,
    /// Active sources skipped because they are outside the view.
    pub sources_culled: u32,
    /// Sources silenced because they sit inside a `block_light_inside` occluder.
    pub sources_blocked: u32,
    /// Occluders that passed the distance cull, summed over all sources.
    pub blocks_considered: u32,
    /// Shadow punches applied (one per independent block or merged group).
    pub shadow_passes: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_across_kinds() {
        let a = SourceId::next();
        let b = BlockId::next();
        let c = SourceId::next();
        assert_ne!(a.0, b.0);
        assert_ne!(a, c);
        assert!(c.0 > a.0);
    }
}
