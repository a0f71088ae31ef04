//! Viewport bookkeeping for the smart-scroll policy.

/// Distance from the bottom, in pixels, still treated as "at the bottom".
pub const DEFAULT_SCROLL_THRESHOLD_PX: u32 = 100;

/// What the rendering adapter should do with the viewport after a
/// transcript mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAction {
    SnapToBottom,
    Preserve,
}

/// Last viewport geometry reported by the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    /// Current scroll position from the top.
    pub offset: u32,
    /// Largest reachable scroll position for the current content height.
    pub max_offset: u32,
}

impl ScrollState {
    pub fn update(&mut self, offset: u32, max_offset: u32) {
        self.max_offset = max_offset;
        self.offset = offset.min(max_offset);
    }

    pub fn distance_from_bottom(&self) -> u32 {
        self.max_offset.saturating_sub(self.offset)
    }

    pub fn is_near_bottom(&self, threshold_px: u32) -> bool {
        self.distance_from_bottom() <= threshold_px
    }

    pub fn snap_to_bottom(&mut self) {
        self.offset = self.max_offset;
    }
}
