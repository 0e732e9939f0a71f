//! Mesh primitives shared by the render pipelines

use bytemuck::{Pod, Zeroable};

/// A vertex with position, normal, and UV coordinates
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// A mesh with vertices and indices
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Create a unit box mesh centered at the origin, spanning -0.5..0.5 on each
/// axis. Props scale it through their transform.
pub fn create_box_mesh() -> Mesh {
    let h = 0.5;

    // 8 corners
    let positions = [
        [-h, -h, -h], // 0: back-bottom-left
        [h, -h, -h],  // 1: back-bottom-right
        [h, h, -h],   // 2: back-top-right
        [-h, h, -h],  // 3: back-top-left
        [-h, -h, h],  // 4: front-bottom-left
        [h, -h, h],   // 5: front-bottom-right
        [h, h, h],    // 6: front-top-right
        [-h, h, h],   // 7: front-top-left
    ];

    let normals = [
        [0.0, 0.0, -1.0], // back
        [0.0, 0.0, 1.0],  // front
        [-1.0, 0.0, 0.0], // left
        [1.0, 0.0, 0.0],  // right
        [0.0, -1.0, 0.0], // bottom
        [0.0, 1.0, 0.0],  // top
    ];

    // Build vertices with proper normals per face (6 faces x 4 vertices = 24)
    // Vertex order per face must produce CCW winding for the outward normal
    // when indexed with [base, base+1, base+2, base, base+2, base+3]
    //
    // Each face covers the full 0..1 UV square.
    let vertices = vec![
        // Back face (z-)
        Vertex { position: positions[0], normal: normals[0], uv: [0.0, 0.0] },
        Vertex { position: positions[3], normal: normals[0], uv: [0.0, 1.0] },
        Vertex { position: positions[2], normal: normals[0], uv: [1.0, 1.0] },
        Vertex { position: positions[1], normal: normals[0], uv: [1.0, 0.0] },
        // Front face (z+)
        Vertex { position: positions[4], normal: normals[1], uv: [0.0, 0.0] },
        Vertex { position: positions[5], normal: normals[1], uv: [1.0, 0.0] },
        Vertex { position: positions[6], normal: normals[1], uv: [1.0, 1.0] },
        Vertex { position: positions[7], normal: normals[1], uv: [0.0, 1.0] },
        // Left face (x-)
        Vertex { position: positions[0], normal: normals[2], uv: [0.0, 0.0] },
        Vertex { position: positions[4], normal: normals[2], uv: [1.0, 0.0] },
        Vertex { position: positions[7], normal: normals[2], uv: [1.0, 1.0] },
        Vertex { position: positions[3], normal: normals[2], uv: [0.0, 1.0] },
        // Right face (x+)
        Vertex { position: positions[5], normal: normals[3], uv: [0.0, 0.0] },
        Vertex { position: positions[1], normal: normals[3], uv: [1.0, 0.0] },
        Vertex { position: positions[2], normal: normals[3], uv: [1.0, 1.0] },
        Vertex { position: positions[6], normal: normals[3], uv: [0.0, 1.0] },
        // Bottom face (y-)
        Vertex { position: positions[0], normal: normals[4], uv: [0.0, 0.0] },
        Vertex { position: positions[1], normal: normals[4], uv: [1.0, 0.0] },
        Vertex { position: positions[5], normal: normals[4], uv: [1.0, 1.0] },
        Vertex { position: positions[4], normal: normals[4], uv: [0.0, 1.0] },
        // Top face (y+)
        Vertex { position: positions[3], normal: normals[5], uv: [0.0, 0.0] },
        Vertex { position: positions[7], normal: normals[5], uv: [0.0, 1.0] },
        Vertex { position: positions[6], normal: normals[5], uv: [1.0, 1.0] },
        Vertex { position: positions[2], normal: normals[5], uv: [1.0, 0.0] },
    ];

    // Indices (two triangles per face)
    let indices: Vec<u32> = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base, base + 2, base + 3]
        })
        .collect();

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_mesh_has_expected_counts() {
        let mesh = create_box_mesh();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
    }

    #[test]
    fn box_indices_stay_in_range() {
        let mesh = create_box_mesh();
        for &index in &mesh.indices {
            assert!((index as usize) < mesh.vertices.len());
        }
    }

    #[test]
    fn box_triangles_face_outward() {
        let mesh = create_box_mesh();

        for triangle in mesh.indices.chunks(3) {
            let a = mesh.vertices[triangle[0] as usize].position;
            let b = mesh.vertices[triangle[1] as usize].position;
            let c = mesh.vertices[triangle[2] as usize].position;

            let ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let ac = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let face_normal = [
                ab[1] * ac[2] - ab[2] * ac[1],
                ab[2] * ac[0] - ab[0] * ac[2],
                ab[0] * ac[1] - ab[1] * ac[0],
            ];

            let stored = mesh.vertices[triangle[0] as usize].normal;
            let dot = face_normal[0] * stored[0]
                + face_normal[1] * stored[1]
                + face_normal[2] * stored[2];
            assert!(dot > 0.0, "triangle {triangle:?} winds against its normal");
        }
    }

    #[test]
    fn box_uvs_cover_unit_square() {
        let mesh = create_box_mesh();
        for vertex in &mesh.vertices {
            assert!(vertex.uv[0] >= 0.0 && vertex.uv[0] <= 1.0);
            assert!(vertex.uv[1] >= 0.0 && vertex.uv[1] <= 1.0);
        }
    }
}
