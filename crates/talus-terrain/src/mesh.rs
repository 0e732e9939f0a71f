//! Grid mesh generation from a heightmap

use crate::heightmap::Heightmap;

/// Triangulated grid mesh built from a heightmap.
///
/// Attribute arrays are parallel: vertex `i` is
/// `(positions[i], normals[i], uvs[i])`. Built once at startup and
/// immutable afterwards; the renderer uploads it and owns the GPU copy.
pub struct TerrainMesh {
    /// Vertex positions in world space, row-major grid order
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, constant (0, 1, 0); shading normals come from the
    /// terrain's normal-map texture, not the mesh
    pub normals: Vec<[f32; 3]>,
    /// UV coordinates in [0..1)
    pub uvs: Vec<[f32; 2]>,
    /// Triangle indices, two triangles per interior cell
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Build a grid mesh from a heightmap.
///
/// Each pixel becomes one vertex at
/// `(x * horizontal_scale, sample * height_scale, z * horizontal_scale)`.
/// Vertex order is row-major: vertex `i` sits at grid
/// `(i % width, i / width)`, which the index emission below relies on.
/// Guarantees: `width * height` vertices and
/// `(width - 1) * (height - 1) * 6` indices, all in range.
pub fn build_mesh(heightmap: &Heightmap, height_scale: f32, horizontal_scale: f32) -> TerrainMesh {
    let width = heightmap.width;
    let height = heightmap.height;
    let vert_count = (width * height) as usize;

    let mut positions = Vec::with_capacity(vert_count);
    let mut normals = Vec::with_capacity(vert_count);
    let mut uvs = Vec::with_capacity(vert_count);

    for z in 0..height {
        for x in 0..width {
            positions.push([
                x as f32 * horizontal_scale,
                heightmap.get(x, z) * height_scale,
                z as f32 * horizontal_scale,
            ]);
            normals.push([0.0, 1.0, 0.0]);
            // Divisor is width, not width - 1: the far edge stops just
            // short of uv 1.0, matching the textures authored for this
            // mapping.
            uvs.push([x as f32 / width as f32, z as f32 / height as f32]);
        }
    }

    // Two triangles per cell; the last row and column emit none
    let index_count = ((width - 1) * (height - 1) * 6) as usize;
    let mut indices = Vec::with_capacity(index_count);

    for cz in 0..height - 1 {
        for cx in 0..width - 1 {
            let v = cz * width + cx;

            // (here, below, below-right)
            indices.push(v);
            indices.push(v + width);
            indices.push(v + width + 1);

            // (here, below-right, right)
            indices.push(v);
            indices.push(v + width + 1);
            indices.push(v + 1);
        }
    }

    TerrainMesh {
        positions,
        normals,
        uvs,
        indices,
    }
}
