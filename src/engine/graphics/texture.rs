use std::path::Path;

use glam::Vec2;
use image::RgbaImage;
use log::{debug, info};
use wgpu;

use crate::engine::error::{Result, SpriteError};

/// Texels are sampled as stored, so brightness scales the 8-bit values directly.
pub const SPRITE_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Intrinsic pixel size of a texture. Never zero in either dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSize {
    width: u32,
    height: u32,
}

impl TextureSize {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SpriteError::DegenerateTexture { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn of_image(image: &RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::new(width, height)
    }

    /// Rejects sizes the device cannot allocate in a single 2D texture.
    pub fn check_limit(&self, max_dimension: u32) -> Result<()> {
        if self.width > max_dimension || self.height > max_dimension {
            return Err(SpriteError::TextureTooLarge {
                width: self.width,
                height: self.height,
                max_dimension,
            });
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

/// Layout shared by every sprite texture: a filterable 2D view and its sampler.
pub fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Sprite Texture Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// GPU-resident RGBA8 texture plus the bind group that exposes it to the sprite program.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
    size: TextureSize,
}

impl Texture {
    /// Decodes `path` into RGBA8 and uploads it.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let rgba = image::open(path)
            .map_err(|source| SpriteError::AssetLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let texture = Self::from_rgba(device, queue, layout, &rgba, &path.display().to_string())?;
        info!(
            "[texture] Loaded texture: {}x{} from {}",
            texture.size.width,
            texture.size.height,
            path.display()
        );
        Ok(texture)
    }

    /// Uploads already decoded pixels. Zero-sized and oversized images are
    /// rejected before anything touches the GPU.
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        rgba: &RgbaImage,
        label: &str,
    ) -> Result<Self> {
        let size = TextureSize::of_image(rgba)?;
        size.check_limit(device.limits().max_texture_dimension_2d)?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            size: size.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SPRITE_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            label: Some(label),
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.width),
                rows_per_image: Some(size.height),
            },
            size.extent(),
        );

        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let texture_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture_sampler),
                },
            ],
        });
        debug!("[texture] Uploaded {} ({}x{})", label, size.width, size.height);

        Ok(Self {
            texture,
            bind_group,
            size,
        })
    }

    pub fn size(&self) -> TextureSize {
        self.size
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.texture.destroy();
    }
}
