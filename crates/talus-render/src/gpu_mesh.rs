//! GPU mesh upload: vertex/index buffers from CPU-side geometry

use crate::primitives::{Mesh, Vertex};
use talus_terrain::TerrainMesh;
use wgpu::util::DeviceExt;

/// A GPU-resident mesh ready to draw
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    /// Upload an interleaved mesh to the GPU
    pub fn from_mesh(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        Self::upload(device, &mesh.vertices, &mesh.indices, label)
    }

    /// Interleave a terrain mesh's attribute arrays and upload it
    pub fn from_terrain(device: &wgpu::Device, terrain: &TerrainMesh, label: &str) -> Self {
        let vertices = interleave_terrain(terrain);
        Self::upload(device, &vertices, &terrain.indices, label)
    }

    fn upload(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32], label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

/// Zip a terrain mesh's parallel attribute arrays into interleaved vertices
pub fn interleave_terrain(terrain: &TerrainMesh) -> Vec<Vertex> {
    (0..terrain.vertex_count())
        .map(|i| Vertex {
            position: terrain.positions[i],
            normal: terrain.normals[i],
            uv: terrain.uvs[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use talus_terrain::{build_mesh, Heightmap};

    #[test]
    fn interleave_preserves_attribute_pairing() {
        let heightmap = Heightmap::from_raw(vec![0.0, 0.25, 0.5, 1.0], 2, 2);
        let terrain = build_mesh(&heightmap, 10.0, 2.0);
        let vertices = interleave_terrain(&terrain);

        assert_eq!(vertices.len(), terrain.vertex_count());
        for (i, vertex) in vertices.iter().enumerate() {
            assert_eq!(vertex.position, terrain.positions[i]);
            assert_eq!(vertex.normal, terrain.normals[i]);
            assert_eq!(vertex.uv, terrain.uvs[i]);
        }
    }
}
