use crate::error::ViewerError;
use crate::mesh::{self, Mesh};
use crate::obj;
use crate::texture::{self, Texture};

/// Cube shipped with the crate; the web build draws this since it has no
/// filesystem to load from.
pub const BUILTIN_MODEL: &str = include_str!("../assets/models/cube.obj");

/// A loaded model ready to draw.
pub struct Model {
    mesh: Mesh,
    texture: Texture,
    triangles: usize,
}

impl Model {
    /// Loads an OBJ and the diffuse map of its material. A material that
    /// cannot be found or decoded falls back to a plain color.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, ViewerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let label = path.file_stem().and_then(|s| s.to_str()).unwrap_or("model");

        let material = crate::material::resolve(path, &text);
        let diffuse = material.as_ref().map_or([1.0; 3], |m| m.diffuse);
        let texture = match material.and_then(|m| m.texture_path) {
            Some(image_path) => {
                let decoded = std::fs::read(&image_path)
                    .map_err(ViewerError::from)
                    .and_then(|bytes| Ok(Texture::from_image_bytes(device, queue, &bytes, label)?));
                decoded.unwrap_or_else(|e| {
                    log::warn!("texture {}: {e}; drawing untextured", image_path.display());
                    Texture::solid(device, queue, diffuse)
                })
            }
            None => Texture::solid(device, queue, diffuse),
        };

        Self::with_texture(device, label, &text, texture)
    }

    /// The bundled checker cube with its embedded texture.
    pub fn builtin(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self, ViewerError> {
        let texture = Texture::from_image_bytes(device, queue, texture::BUILTIN_TEXTURE, "cube")?;
        Self::with_texture(device, "cube", BUILTIN_MODEL, texture)
    }

    fn with_texture(device: &wgpu::Device, label: &str, text: &str, texture: Texture) -> Result<Self, ViewerError> {
        let mut data = obj::parse_obj(text)?;
        data.fit_unit_sphere();
        log::info!(
            "model `{label}`: {} vertices, {} triangles",
            data.vertices.len(),
            data.triangle_count()
        );
        Ok(Self {
            mesh: mesh::upload(device, &data, label),
            texture,
            triangles: data.triangle_count(),
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Draws with whatever pipeline and uniforms are bound on `pass`.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
        pass.set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
    }
}
