//! Talus Terrain - Heightmap-based terrain mesh generation
//!
//! Provides heightmap decoding and grid mesh generation. Does not depend
//! on talus-render; outputs raw vertex data (positions, normals, UVs,
//! indices) for the renderer to upload.

pub mod heightmap;
pub mod mesh;

pub use heightmap::Heightmap;
pub use mesh::{build_mesh, TerrainMesh};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_heightmap_generates_correct_mesh() {
        let hm = Heightmap::from_raw(vec![0.0; 16], 4, 4);
        let mesh = build_mesh(&hm, 250.0, 5.0);

        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.indices.len(), 3 * 3 * 6);
        assert_eq!(mesh.triangle_count(), 18);

        // Flat input stays flat for any height scale
        for pos in &mesh.positions {
            assert_eq!(pos[1], 0.0);
        }
    }

    #[test]
    fn vertex_and_index_counts_match_grid_size() {
        for (w, h) in [(2u32, 2u32), (5, 3), (8, 8)] {
            let hm = Heightmap::from_raw(vec![0.25; (w * h) as usize], w, h);
            let mesh = build_mesh(&hm, 1.0, 1.0);
            assert_eq!(mesh.vertex_count() as u32, w * h);
            assert_eq!(mesh.indices.len() as u32, (w - 1) * (h - 1) * 6);
        }
    }

    #[test]
    fn indices_stay_in_range() {
        let hm = Heightmap::from_raw(vec![0.5; 35], 7, 5);
        let mesh = build_mesh(&hm, 10.0, 2.0);

        let count = mesh.vertex_count() as u32;
        for &i in &mesh.indices {
            assert!(i < count);
        }
    }

    #[test]
    fn max_sample_reaches_height_scale() {
        // A fully-bright pixel (255 decodes to 1.0) lands at exactly height_scale
        let hm = Heightmap::from_raw(vec![1.0, 0.0, 0.0, 0.0], 2, 2);
        let mesh = build_mesh(&hm, 10.0, 1.0);
        assert_eq!(mesh.positions[0][1], 10.0);
    }

    #[test]
    fn three_by_three_grid_places_center_vertex() {
        let hm = Heightmap::from_raw(vec![0.0; 9], 3, 3);
        let mesh = build_mesh(&hm, 1.0, 1.0);

        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.indices.len(), 12);
        assert_eq!(mesh.triangle_count(), 4);
        // Vertex 4 is grid (1, 1)
        assert_eq!(mesh.positions[4], [1.0, 0.0, 1.0]);
    }

    #[test]
    fn cell_triangles_follow_grid_winding() {
        let hm = Heightmap::from_raw(vec![0.0; 9], 3, 3);
        let mesh = build_mesh(&hm, 1.0, 1.0);

        // First cell: (v, v+width, v+width+1) then (v, v+width+1, v+1)
        assert_eq!(&mesh.indices[0..6], &[0, 3, 4, 0, 4, 1]);
        // Second cell starts at v = 1
        assert_eq!(&mesh.indices[6..12], &[1, 4, 5, 1, 5, 2]);
    }

    #[test]
    fn uvs_divide_by_full_size() {
        let hm = Heightmap::from_raw(vec![0.0; 16], 4, 4);
        let mesh = build_mesh(&hm, 1.0, 1.0);

        assert_eq!(mesh.uvs[0], [0.0, 0.0]);
        // The far corner stops short of 1.0 (divisor is width, not width - 1)
        assert_eq!(mesh.uvs[15], [0.75, 0.75]);
    }

    #[test]
    fn normals_are_constant_up() {
        let hm = Heightmap::from_raw(vec![0.0, 1.0, 0.5, 0.25], 2, 2);
        let mesh = build_mesh(&hm, 100.0, 1.0);

        for n in &mesh.normals {
            assert_eq!(*n, [0.0, 1.0, 0.0]);
        }
    }
}
