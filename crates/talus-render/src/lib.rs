//! Talus Render - wgpu-based renderer for the terrain viewer
//!
//! Renders the heightmap terrain, prop objects, and sky into an offscreen
//! color/depth capture, then resolves that capture to the window surface
//! through the scan compositor (or a plain blit).

mod camera;
mod compositor;
mod context;
mod gpu_mesh;
mod object_pipeline;
mod offscreen;
mod primitives;
mod sky_pipeline;
mod terrain_pipeline;
mod texture;

pub use camera::{mat4_inverse, Camera};
pub use compositor::{
    compute_scan_uniforms, QuadVertex, ScanCompositor, ScanSettings, ScanUniforms, QUAD_VERTICES,
};
pub use context::{RenderContext, RenderError};
pub use gpu_mesh::{interleave_terrain, GpuMesh};
pub use object_pipeline::{ObjectPipeline, ObjectUniforms};
pub use offscreen::{
    validate_extent, OffscreenTarget, OFFSCREEN_COLOR_FORMAT, OFFSCREEN_DEPTH_FORMAT,
};
pub use primitives::{create_box_mesh, Mesh, Vertex};
pub use sky_pipeline::{compute_sky_uniforms, SkyPipeline, SkyUniforms};
pub use terrain_pipeline::{SceneUniforms, TerrainPipeline, TerrainUniforms};
pub use texture::GpuTexture;

#[cfg(test)]
mod tests {
    #[test]
    fn terrain_shader_wgsl_parses() {
        let source = include_str!("terrain_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("terrain_shader.wgsl failed to parse");
    }

    #[test]
    fn object_shader_wgsl_parses() {
        let source = include_str!("object_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("object_shader.wgsl failed to parse");
    }

    #[test]
    fn sky_shader_wgsl_parses() {
        let source = include_str!("sky_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("sky_shader.wgsl failed to parse");
    }

    #[test]
    fn scan_shader_wgsl_parses() {
        let source = include_str!("scan_shader.wgsl");
        naga::front::wgsl::parse_str(source).expect("scan_shader.wgsl failed to parse");
    }
}
