use std::borrow::Cow;

use crate::error::ViewerError;
use crate::mesh::Vertex;
use crate::model::Model;
use crate::shader::Shader;
use crate::window::base::{DEPTH_FORMAT, WindowBase};

/// The shader and model drawn each frame.
pub struct Renderer {
    pub shader: Shader,
    pub model: Model,
}

impl Renderer {
    pub fn new(base: &WindowBase, shader_source: Cow<'_, str>, model: Model) -> Result<Self, ViewerError> {
        let layout = Vertex::layout();
        let attributes = layout.wgpu_attributes()?;
        let shader = Shader::new(
            base.device(),
            shader_source,
            base.color_format(),
            DEPTH_FORMAT,
            layout.buffer_layout(&attributes),
            model.texture(),
        );
        Ok(Self { shader, model })
    }

    /// Clears, draws the model with the current uniforms and presents.
    pub fn draw(&mut self, base: &WindowBase, clear: wgpu::Color) -> Result<(), wgpu::SurfaceError> {
        let frame = base.acquire_frame()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = base.device().create_command_encoder(
            &wgpu::CommandEncoderDescriptor { label: Some("Main Encoder") }
        );

        self.shader.upload(base.queue());

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load:  wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: base.depth_view(),
                    depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.shader.bind(&mut rpass);
            self.model.render(&mut rpass);
        }

        base.queue().submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
