use glam::Vec2;

/// Axis-aligned rectangle.
///
/// Used both for source rectangles in texture pixels (origin top-left, Y down)
/// and for destination rectangles in screen pixels (origin at the viewport
/// centre, Y up). In both cases `position` is the top-left corner and the
/// rectangle extends by `size` to the right and "down" in its own convention.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(px: f32, py: f32, sx: f32, sy: f32) -> Self {
        Self {
            position: Vec2::new(px, py),
            size: Vec2::new(sx, sy),
        }
    }
}

/// Converts a vector to its GPU layout: `[x, y]`, tightly packed, no padding.
#[inline]
pub fn pack_vec2(v: Vec2) -> [f32; 2] {
    [v.x, v.y]
}

/// Fixed drawable area in pixels. Screen space is centred on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The rectangle covering the whole viewport in screen space.
    pub fn fullscreen_rect(&self) -> Rect {
        let w = self.width as f32;
        let h = self.height as f32;
        Rect::new(-w / 2.0, h / 2.0, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullscreen_rect_is_anchored_top_left() {
        let rect = Viewport::new(1280, 720).fullscreen_rect();
        assert_eq!(rect, Rect::new(-640.0, 360.0, 1280.0, 720.0));
    }

    #[test]
    fn pack_keeps_component_order() {
        assert_eq!(pack_vec2(Vec2::new(3.0, -4.5)), [3.0, -4.5]);
        assert_eq!(bytemuck::cast_slice::<f32, u8>(&pack_vec2(Vec2::new(1.0, 2.0))).len(), 8);
    }
}
