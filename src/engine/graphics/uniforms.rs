//! CPU staging for the sprite program's uniform block.
//!
//! wgpu has no per-name uniform locations, so the block is described as an
//! ordered list of named `f32` slots laid out back to back (std140 scalars,
//! padded to 16 bytes). Lookups walk the list on every call.

use bytemuck::{Pod, Zeroable};

/// Slot names in declaration order. Must match `SpriteUniforms` in the shaders.
pub const UNIFORM_SLOTS: [&str; 4] = ["brightness", "viewport_width", "viewport_height", "padding"];

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct UniformBlock {
    values: [f32; UNIFORM_SLOTS.len()],
}

impl Default for UniformBlock {
    fn default() -> Self {
        let mut block = Self::zeroed();
        block.set("brightness", 1.0);
        block
    }
}

impl UniformBlock {
    pub const SIZE: u64 = std::mem::size_of::<UniformBlock>() as u64;

    /// Byte offset of `name`, or `None` if the block has no such slot.
    pub fn locate(name: &str) -> Option<u64> {
        UNIFORM_SLOTS
            .iter()
            .position(|slot| *slot == name)
            .map(|index| (index * std::mem::size_of::<f32>()) as u64)
    }

    /// Stores `value` under `name`. Returns the slot's byte offset, or `None`
    /// if the name does not resolve, in which case nothing changes.
    pub fn set(&mut self, name: &str, value: f32) -> Option<u64> {
        let offset = Self::locate(name)?;
        self.values[offset as usize / std::mem::size_of::<f32>()] = value;
        Some(offset)
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        Self::locate(name).map(|offset| self.values[offset as usize / std::mem::size_of::<f32>()])
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_one_std140_row() {
        assert_eq!(UniformBlock::SIZE, 16);
        assert_eq!(UniformBlock::default().as_bytes().len(), 16);
    }

    #[test]
    fn named_slots_resolve_to_offsets() {
        assert_eq!(UniformBlock::locate("brightness"), Some(0));
        assert_eq!(UniformBlock::locate("viewport_width"), Some(4));
        assert_eq!(UniformBlock::locate("viewport_height"), Some(8));
        assert_eq!(UniformBlock::locate("tint"), None);
    }

    #[test]
    fn unknown_name_is_ignored() {
        let mut block = UniformBlock::default();
        let before = block;
        assert_eq!(block.set("tint", 0.3), None);
        assert_eq!(block, before);
    }

    #[test]
    fn set_then_get() {
        let mut block = UniformBlock::default();
        assert_eq!(block.get("brightness"), Some(1.0));
        block.set("brightness", 0.5);
        block.set("viewport_width", 1280.0);
        assert_eq!(block.get("brightness"), Some(0.5));
        assert_eq!(block.get("viewport_width"), Some(1280.0));
        assert_eq!(&block.as_bytes()[0..4], &0.5f32.to_ne_bytes());
    }
}
