//! Diffuse textures sampled by the model shader.

/// Checker image for the bundled cube, used where there is no filesystem.
pub const BUILTIN_TEXTURE: &[u8] = include_bytes!("../assets/models/cube.png");

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Decodes any format the `image` crate was built with into RGBA8.
pub fn decode_rgba(bytes: &[u8]) -> Result<image::RgbaImage, image::ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// A linear color in [0, 1] as one sRGB-encoded texel.
pub fn solid_texel(color: [f32; 3]) -> [u8; 4] {
    let encode = |c: f32| {
        let c = c.clamp(0.0, 1.0);
        let srgb = if c <= 0.003_130_8 { c * 12.92 } else { 1.055 * c.powf(1.0 / 2.4) - 0.055 };
        (srgb * 255.0).round() as u8
    };
    [encode(color[0]), encode(color[1]), encode(color[2]), 255]
}

impl Texture {
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        rgba: &[u8],
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
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
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self { texture, view, sampler }
    }

    /// 1x1 texture of `color`, for materials without a map.
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, color: [f32; 3]) -> Self {
        Self::from_rgba(device, queue, 1, 1, &solid_texel(color), "Solid Texture")
    }

    pub fn from_image_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
    ) -> Result<Self, image::ImageError> {
        let rgba = decode_rgba(bytes)?;
        let (width, height) = rgba.dimensions();
        Ok(Self::from_rgba(device, queue, width, height, rgba.as_raw(), label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_texture_decodes() {
        let rgba = decode_rgba(BUILTIN_TEXTURE).unwrap();
        assert_eq!(rgba.dimensions(), (64, 64));
        assert_eq!(rgba.as_raw().len(), 64 * 64 * 4);
        assert_eq!(rgba.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(decode_rgba(b"not an image").is_err());
    }

    #[test]
    fn solid_texels_are_srgb_encoded() {
        assert_eq!(solid_texel([1.0, 1.0, 1.0]), [255, 255, 255, 255]);
        assert_eq!(solid_texel([0.0, 2.0, -1.0]), [0, 255, 0, 255]);
        // linear 0.5 is about 188 in sRGB
        assert_eq!(solid_texel([0.5, 0.5, 0.5])[0], 188);
    }
}
