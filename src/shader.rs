//! Render pipeline wrapper with named uniforms.
//!
//! wgpu has no notion of uniform names, so the shader keeps a CPU copy of
//! its uniform block together with a table of field names, types and byte
//! offsets. Setters write into that copy; [`Shader::upload`] pushes it to
//! the GPU before the pass that uses it.

use std::borrow::Cow;

use cgmath::{Matrix4, Vector3};

use crate::texture::Texture;
use crate::types::{mat4_to_array, vec3_to_array};

/// Shader compiled into the binary, used when no path is configured.
pub const DEFAULT_SOURCE: &str = include_str!("assets/model.wgsl");

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UniformKind {
    Float3,
    Mat4,
}

impl UniformKind {
    pub const fn size_bytes(self) -> usize {
        match self {
            UniformKind::Float3 => 12,
            UniformKind::Mat4 => 64,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct UniformField {
    pub name: &'static str,
    pub kind: UniformKind,
    pub offset: usize,
}

/// Layout of `Uniforms` in `model.wgsl` (WGSL uniform alignment rules).
pub const MODEL_UNIFORMS: &[UniformField] = &[
    UniformField { name: "u_proj_view", kind: UniformKind::Mat4, offset: 0 },
    UniformField { name: "u_model", kind: UniformKind::Mat4, offset: 64 },
    UniformField { name: "u_view_pos", kind: UniformKind::Float3, offset: 128 },
];
pub const MODEL_UNIFORMS_SIZE: usize = 144;

/// CPU copy of a uniform buffer, addressed by field name.
#[derive(Clone, Debug)]
pub struct UniformBlock {
    fields: &'static [UniformField],
    data: Vec<u8>,
    dirty: bool,
}

impl UniformBlock {
    pub fn new(fields: &'static [UniformField], size: usize) -> Self {
        debug_assert!(fields.iter().all(|f| f.offset + f.kind.size_bytes() <= size));
        Self { fields, data: vec![0; size], dirty: true }
    }

    /// Returns false (after logging) if `name` is unknown or not a vec3.
    pub fn set_float3(&mut self, name: &str, value: Vector3<f32>) -> bool {
        self.write(name, UniformKind::Float3, bytemuck::bytes_of(&vec3_to_array(value)))
    }

    /// Returns false (after logging) if `name` is unknown or not a mat4.
    pub fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>) -> bool {
        self.write(name, UniformKind::Mat4, bytemuck::bytes_of(&mat4_to_array(value)))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// True once after any write.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    fn write(&mut self, name: &str, kind: UniformKind, bytes: &[u8]) -> bool {
        let Some(field) = self.fields.iter().find(|f| f.name == name) else {
            log::warn!("uniform `{name}` not found");
            return false;
        };
        if field.kind != kind {
            log::warn!("uniform `{name}` is {:?}, not {kind:?}", field.kind);
            return false;
        }
        self.data[field.offset..field.offset + bytes.len()].copy_from_slice(bytes);
        self.dirty = true;
        true
    }
}

/// Loads WGSL from `path`, or the built-in shader when `path` is `None`.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_source(path: Option<&std::path::Path>) -> std::io::Result<Cow<'static, str>> {
    match path {
        Some(p) => Ok(Cow::Owned(std::fs::read_to_string(p)?)),
        None => Ok(Cow::Borrowed(DEFAULT_SOURCE)),
    }
}

pub struct Shader {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    buffer: wgpu::Buffer,
    uniforms: UniformBlock,
}

impl Shader {
    pub fn new(
        device: &wgpu::Device,
        source: Cow<'_, str>,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        vertex_layout: wgpu::VertexBufferLayout<'_>,
        texture: &Texture,
    ) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Model Shader"),
            source: wgpu::ShaderSource::Wgsl(source),
        });

        let uniforms = UniformBlock::new(MODEL_UNIFORMS, MODEL_UNIFORMS_SIZE);
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(MODEL_UNIFORMS_SIZE as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniforms Buffer"),
            size: MODEL_UNIFORMS_SIZE as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model BG"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&texture.view) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(&texture.sampler) },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Model Pipeline Layout"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Model Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self { pipeline, bind_group, buffer, uniforms }
    }

    pub fn set_float3(&mut self, name: &str, value: Vector3<f32>) {
        self.uniforms.set_float3(name, value);
    }

    pub fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
        self.uniforms.set_mat4(name, value);
    }

    /// Copies pending uniform writes into the GPU buffer.
    pub fn upload(&mut self, queue: &wgpu::Queue) {
        if self.uniforms.take_dirty() {
            queue.write_buffer(&self.buffer, 0, self.uniforms.bytes());
        }
    }

    /// Activates the pipeline, uniforms and texture for the rest of `pass`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
    }
}
