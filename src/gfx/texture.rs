//! GPU textures built from externally decoded pixel buffers.
//!
//! File formats never reach this layer: callers hand over rgba8 bytes plus
//! dimensions, and everything here is upload and sampling configuration.

/// A decoded image ready for upload.
///
/// `channels` records what the source carried before conversion (3 for an
/// opaque image, 4 with alpha); the pixel bytes themselves are always
/// expanded to rgba8.
pub struct PixelData {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl PixelData {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self {
            pixels,
            width,
            height,
            channels,
        }
    }

    /// A gray checkerboard used when an image fails to decode, so a missing
    /// asset degrades the picture instead of leaving a binding undefined.
    pub fn fallback() -> Self {
        const SIZE: u32 = 8;
        let mut pixels = Vec::with_capacity((SIZE * SIZE * 4) as usize);
        for y in 0..SIZE {
            for x in 0..SIZE {
                let value = if (x + y) % 2 == 0 { 0xb0 } else { 0x40 };
                pixels.extend_from_slice(&[value, value, value, 0xff]);
            }
        }
        Self::new(pixels, SIZE, SIZE, 3)
    }
}

/// GPU texture resource bundling texture, view, and sampler.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Depth buffer format used throughout the renderer.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Uploads decoded pixels into a filterable 2D texture.
    pub fn from_pixels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pixels: &PixelData,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: pixels.width,
            height: pixels.height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * pixels.width),
                rows_per_image: Some(pixels.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} sampler")),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Creates a depth texture matching the surface configuration.
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_a_well_formed_rgba_image() {
        let pixels = PixelData::fallback();
        assert_eq!(
            pixels.pixels.len(),
            (pixels.width * pixels.height * 4) as usize
        );
        // Fully opaque.
        assert!(pixels.pixels.chunks_exact(4).all(|px| px[3] == 0xff));
    }

    #[test]
    fn fallback_alternates_between_two_values() {
        let pixels = PixelData::fallback();
        let first = pixels.pixels[0];
        let second = pixels.pixels[4];
        assert_ne!(first, second);
    }
}
