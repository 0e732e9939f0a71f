//! Sky render pipeline with a procedural gradient background
//!
//! Renders a fullscreen triangle at the far plane and colors it from the
//! per-pixel view direction. No vertex buffers required.

use crate::camera::{mat4_inverse, Camera};
use bytemuck::{Pod, Zeroable};
use talus_core::{mat4_mul, Vec3};

/// Uniform data for the sky: inverse view-projection (rotation only) plus
/// the sun direction
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SkyUniforms {
    pub inv_view_proj: [[f32; 4]; 4],
    pub light_direction: [f32; 3],
    pub _padding: f32,
}

/// Build sky uniforms from the camera's current orientation. Translation is
/// stripped from the view so the sky stays centered on the camera.
pub fn compute_sky_uniforms(camera: &Camera, light_direction: Vec3) -> SkyUniforms {
    let mut view = camera.view_matrix();
    view[3][0] = 0.0;
    view[3][1] = 0.0;
    view[3][2] = 0.0;

    let view_proj = mat4_mul(&camera.projection_matrix(), &view);

    SkyUniforms {
        inv_view_proj: mat4_inverse(&view_proj),
        light_direction: light_direction.to_array(),
        _padding: 0.0,
    }
}

/// The sky rendering pipeline
pub struct SkyPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub uniform_bind_group_layout: wgpu::BindGroupLayout,
}

impl SkyPipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sky Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sky_shader.wgsl").into()),
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Sky Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sky Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sky Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            // Drawn last at z = 1.0; LessEqual lets it fill only where the
            // scene left the cleared depth untouched
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_bind_group_layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mirror of the shader's direction reconstruction
    fn direction_for_ndc(uniforms: &SkyUniforms, x: f32, y: f32) -> Vec3 {
        let m = &uniforms.inv_view_proj;
        let p = [x, y, 1.0, 1.0];
        let mut out = [0.0f32; 4];
        for (row, value) in out.iter_mut().enumerate() {
            *value = m[0][row] * p[0] + m[1][row] * p[1] + m[2][row] * p[2] + m[3][row] * p[3];
        }
        Vec3::new(out[0] / out[3], out[1] / out[3], out[2] / out[3]).normalized()
    }

    #[test]
    fn center_pixel_looks_along_camera_forward() {
        let camera = Camera {
            yaw: 45.0,
            pitch: -20.0,
            ..Camera::new()
        };
        let uniforms = compute_sky_uniforms(&camera, Vec3::new(0.0, -1.0, 0.0));

        let dir = direction_for_ndc(&uniforms, 0.0, 0.0);
        let forward = camera.forward_vector();
        assert!(dir.dot(&forward) > 0.999, "dir {dir:?} vs forward {forward:?}");
    }

    #[test]
    fn sky_ignores_camera_position() {
        let near = Camera::new();
        let far = Camera {
            position: Vec3::new(5000.0, 800.0, -3000.0),
            ..Camera::new()
        };

        let a = compute_sky_uniforms(&near, Vec3::UP);
        let b = compute_sky_uniforms(&far, Vec3::UP);
        for col in 0..4 {
            for row in 0..4 {
                assert!((a.inv_view_proj[col][row] - b.inv_view_proj[col][row]).abs() < 1e-5);
            }
        }
    }
}
