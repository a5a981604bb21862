use glam::{Vec2, Vec3};
use wgpu;

use crate::engine::graphics::rect::{pack_vec2, Rect};
use crate::engine::graphics::texture::TextureSize;

/// Corner order shared by positions and UVs: top-left, top-right, bottom-left, bottom-right.
pub const QUAD_CORNERS: usize = 4;

/// Two counter-clockwise triangles over [`QUAD_CORNERS`]. Back faces are culled,
/// so the winding must not change.
pub const QUAD_INDICES: [u32; 6] = [0, 2, 3, 0, 3, 1];

// Unit quad hanging down from the origin, uploaded once at initialisation.
const INITIAL_POSITIONS: [[f32; 3]; QUAD_CORNERS] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
];

const INITIAL_UVS: [[f32; 2]; QUAD_CORNERS] = [
    [0.0, 0.0],
    [1.0, 0.0],
    [0.0, 1.0],
    [1.0, 1.0],
];

/// Stream 0: tightly packed `[x, y, z]`.
pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: &[wgpu::VertexAttribute] = &[wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    }];

    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: ATTRIBUTES,
    }
}

/// Stream 1: tightly packed `[u, v]`.
pub fn uv_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: &[wgpu::VertexAttribute] = &[wgpu::VertexAttribute {
        offset: 0,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32x2,
    }];

    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: ATTRIBUTES,
    }
}

/// CPU-side copy of the sprite quad.
///
/// Every draw overwrites both arrays in place; the GPU buffers mirror them
/// byte for byte and are never reallocated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadGeometry {
    pub positions: [[f32; 3]; QUAD_CORNERS],
    pub uvs: [[f32; 2]; QUAD_CORNERS],
}

impl Default for QuadGeometry {
    fn default() -> Self {
        Self {
            positions: INITIAL_POSITIONS,
            uvs: INITIAL_UVS,
        }
    }
}

impl QuadGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the corners of `dest`, translated by `offset`.
    ///
    /// Screen space is Y-up, so the bottom edge sits at `position.y - size.y`.
    pub fn write_positions(&mut self, dest: &Rect, offset: Vec3) {
        let left = dest.position.x;
        let right = dest.position.x + dest.size.x;
        let top = dest.position.y;
        let bottom = dest.position.y - dest.size.y;

        let corners = [
            Vec2::new(left, top),
            Vec2::new(right, top),
            Vec2::new(left, bottom),
            Vec2::new(right, bottom),
        ];
        for (slot, corner) in self.positions.iter_mut().zip(corners) {
            let [x, y] = pack_vec2(corner + offset.truncate());
            *slot = [x, y, offset.z];
        }
    }

    /// Writes the corners of `source` normalised against the texture size.
    ///
    /// Texture space is Y-down with the origin at the image's top-left.
    pub fn write_uvs(&mut self, source: &Rect, texture_size: TextureSize) {
        let extent = texture_size.as_vec2();
        let near = source.position / extent;
        let far = (source.position + source.size) / extent;

        let corners = [
            Vec2::new(near.x, near.y),
            Vec2::new(far.x, near.y),
            Vec2::new(near.x, far.y),
            Vec2::new(far.x, far.y),
        ];
        for (slot, corner) in self.uvs.iter_mut().zip(corners) {
            *slot = pack_vec2(corner);
        }
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    pub fn index_bytes() -> &'static [u8] {
        bytemuck::cast_slice(&QUAD_INDICES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(w: u32, h: u32) -> TextureSize {
        TextureSize::new(w, h).unwrap()
    }

    #[test]
    fn positions_grow_right_and_down() {
        let mut quad = QuadGeometry::new();
        quad.write_positions(&Rect::new(-393.0, 256.0, 786.0, 255.0), Vec3::new(10.0, -20.0, 0.25));

        assert_eq!(
            quad.positions,
            [
                [-383.0, 236.0, 0.25],
                [403.0, 236.0, 0.25],
                [-383.0, -19.0, 0.25],
                [403.0, -19.0, 0.25],
            ]
        );
    }

    #[test]
    fn full_texture_maps_to_unit_square() {
        let mut quad = QuadGeometry::new();
        quad.write_uvs(&Rect::new(0.0, 0.0, 333.0, 77.0), size(333, 77));

        assert_eq!(quad.uvs, [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
    }

    #[test]
    fn sub_rect_is_normalised_per_axis() {
        let mut quad = QuadGeometry::new();
        quad.write_uvs(&Rect::new(64.0, 32.0, 64.0, 32.0), size(256, 128));

        assert_eq!(quad.uvs, [[0.25, 0.25], [0.5, 0.25], [0.25, 0.5], [0.5, 0.5]]);
    }

    #[test]
    fn zero_area_rects_collapse_without_nan() {
        let mut quad = QuadGeometry::new();
        quad.write_positions(&Rect::new(5.0, 5.0, 0.0, 0.0), Vec3::ZERO);
        quad.write_uvs(&Rect::new(8.0, 8.0, 0.0, 0.0), size(16, 16));

        assert!(quad.positions.iter().all(|p| *p == [5.0, 5.0, 0.0]));
        assert!(quad.uvs.iter().all(|uv| *uv == [0.5, 0.5]));
    }

    #[test]
    fn indices_wind_counter_clockwise() {
        let quad = QuadGeometry::new();
        for tri in QUAD_INDICES.chunks(3) {
            let a = Vec2::from_slice(&quad.positions[tri[0] as usize][..2]);
            let b = Vec2::from_slice(&quad.positions[tri[1] as usize][..2]);
            let c = Vec2::from_slice(&quad.positions[tri[2] as usize][..2]);
            assert!((b - a).perp_dot(c - a) > 0.0, "triangle {tri:?} is clockwise");
        }
    }

    #[test]
    fn byte_views_are_tightly_packed() {
        let quad = QuadGeometry::new();
        assert_eq!(quad.position_bytes().len(), 4 * 3 * 4);
        assert_eq!(quad.uv_bytes().len(), 4 * 2 * 4);
        assert_eq!(QuadGeometry::index_bytes().len(), 6 * 4);
    }
}
