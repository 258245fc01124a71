use super::surface::Surface;

/// The four viewport-sized scratch surfaces a light area draws through.
///
/// Allocated once per viewport size and cleared, never reallocated, between
/// frames. Owned by a single light area so areas can be drawn independently.
#[derive(Debug, Clone)]
pub struct CompositingBuffers {
    /// Ambient fill with accumulated light erased out of it.
    pub darkness: Surface,
    /// Sum of every source's contribution this frame.
    pub light: Surface,
    /// One source's mask with its shadows punched out.
    pub working: Surface,
    /// Shadow coverage (and tint) for the block or group being applied.
    pub translucency: Surface,
}

impl CompositingBuffers {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            darkness: Surface::new(width, height),
            light: Surface::new(width, height),
            working: Surface::new(width, height),
            translucency: Surface::new(width, height),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.light.width(), self.light.height())
    }

    /// Reallocate for a new viewport. Call between frames.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.size() == (width, height) {
            return;
        }
        log::debug!("compositing buffers resized to {width}x{height}");
        self.darkness.resize(width, height);
        self.light.resize(width, height);
        self.working.resize(width, height);
        self.translucency.resize(width, height);
    }

    /// Whether the per-source scratch surfaces are fully transparent.
    pub fn scratch_is_clear(&self) -> bool {
        self.working.is_clear() && self.translucency.is_clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_reallocates_all_layers() {
        let mut buffers = CompositingBuffers::new(4, 4);
        buffers.resize(8, 2);
        assert_eq!(buffers.size(), (8, 2));
        assert_eq!(buffers.darkness.width(), 8);
        assert_eq!(buffers.translucency.height(), 2);
        assert!(buffers.scratch_is_clear());
    }
}
