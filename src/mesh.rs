use wgpu::util::DeviceExt;
use bytemuck::{Pod, Zeroable};

use crate::layout::{Attribute, VertexLayout};

/// Per-vertex data (matches the shader: location(0)=position, location(1)=normal, location(2)=uv)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn layout() -> VertexLayout {
        VertexLayout::from_attributes([
            Attribute::new(0, 3), // position
            Attribute::new(1, 3), // normal
            Attribute::new(2, 2), // uv
        ])
    }
}

/// CPU-side indexed triangle list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds as (min, max); `None` when there are no vertices.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;
        for v in &self.vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v.position[axis]);
                max[axis] = max[axis].max(v.position[axis]);
            }
        }
        Some((min, max))
    }

    /// Centre the mesh on the origin and scale it into the unit sphere so
    /// any model fits the default camera distance.
    pub fn fit_unit_sphere(&mut self) {
        let Some((min, max)) = self.bounds() else { return };
        let center = [
            (min[0] + max[0]) * 0.5,
            (min[1] + max[1]) * 0.5,
            (min[2] + max[2]) * 0.5,
        ];
        let radius = self
            .vertices
            .iter()
            .map(|v| {
                let d = [
                    v.position[0] - center[0],
                    v.position[1] - center[1],
                    v.position[2] - center[2],
                ];
                (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
            })
            .fold(0.0_f32, f32::max);
        if radius <= f32::EPSILON {
            return;
        }
        for v in &mut self.vertices {
            for axis in 0..3 {
                v.position[axis] = (v.position[axis] - center[axis]) / radius;
            }
        }
    }
}

/// GPU buffers for one mesh.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

pub fn upload(device: &wgpu::Device, data: &MeshData, label: &str) -> Mesh {
    let vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Vertex Buffer")),
        contents: bytemuck::cast_slice(&data.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let ib = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Index Buffer")),
        contents: bytemuck::cast_slice(&data.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    Mesh {
        vertex_buffer: vb,
        index_buffer: ib,
        index_count: data.indices.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32, y: f32, z: f32) -> Vertex {
        Vertex { position: [x, y, z], ..Default::default() }
    }

    #[test]
    fn layout_stride_matches_vertex_size() {
        assert_eq!(Vertex::layout().stride() as usize, std::mem::size_of::<Vertex>());
    }

    #[test]
    fn fit_unit_sphere_centres_and_scales() {
        let mut mesh = MeshData {
            vertices: vec![vertex(10.0, 2.0, 2.0), vertex(14.0, 2.0, 2.0)],
            indices: vec![],
        };
        mesh.fit_unit_sphere();
        assert_eq!(mesh.vertices[0].position, [-1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn single_point_is_left_alone() {
        let mut mesh = MeshData { vertices: vec![vertex(3.0, 3.0, 3.0)], indices: vec![] };
        mesh.fit_unit_sphere();
        assert_eq!(mesh.vertices[0].position, [3.0, 3.0, 3.0]);
        assert_eq!(MeshData::default().bounds(), None);
    }
}
