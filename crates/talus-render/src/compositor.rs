//! Scan compositor, the fullscreen resolve of the offscreen capture
//!
//! Samples the captured color and depth, reconstructs world positions from
//! depth, and overlays an expanding scan pulse before writing to the surface.
//! A plain blit path resolves the capture untouched.

use crate::camera::{mat4_inverse, Camera};
use crate::offscreen::OffscreenTarget;
use bytemuck::{Pod, Zeroable};
use talus_core::Color;
use wgpu::util::DeviceExt;

/// A fullscreen quad vertex: clip-space position and UV
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// The fullscreen quad as two CCW triangles. V runs top-down to match
/// wgpu's texture origin.
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex { position: [-1.0, 1.0], uv: [0.0, 0.0] },
    QuadVertex { position: [-1.0, -1.0], uv: [0.0, 1.0] },
    QuadVertex { position: [1.0, -1.0], uv: [1.0, 1.0] },
    QuadVertex { position: [-1.0, 1.0], uv: [0.0, 0.0] },
    QuadVertex { position: [1.0, -1.0], uv: [1.0, 1.0] },
    QuadVertex { position: [1.0, 1.0], uv: [1.0, 0.0] },
];

/// Scan effect parameters
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Pulse color; alpha scales how strongly it tints the scene
    pub accent_color: Color,
    /// Seconds between pulses
    pub period: f32,
    /// Pulse travel speed in world units per second
    pub speed: f32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            accent_color: Color::new(0.2, 1.0, 0.6, 1.0),
            period: 8.0,
            speed: 300.0,
        }
    }
}

/// Uniform data for the scan resolve pass
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ScanUniforms {
    pub inverse_view: [[f32; 4]; 4],
    pub inverse_projection: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub time: f32,
    pub accent_color: [f32; 4],
    pub screen_resolution: [f32; 2],
    pub period: f32,
    pub speed: f32,
}

/// Build the uniforms for one resolve. The inverses are recomputed from the
/// camera's current matrices on every call so the reconstruction can never
/// lag a frame behind the scene pass.
pub fn compute_scan_uniforms(
    camera: &Camera,
    settings: &ScanSettings,
    time: f32,
    width: u32,
    height: u32,
) -> ScanUniforms {
    ScanUniforms {
        inverse_view: mat4_inverse(&camera.view_matrix()),
        inverse_projection: mat4_inverse(&camera.projection_matrix()),
        camera_position: camera.position_array(),
        time,
        accent_color: settings.accent_color.to_array(),
        screen_resolution: [width as f32, height as f32],
        period: settings.period,
        speed: settings.speed,
    }
}

/// Pipelines and shared resources for resolving the offscreen capture
pub struct ScanCompositor {
    pub scan_pipeline: wgpu::RenderPipeline,
    pub blit_pipeline: wgpu::RenderPipeline,
    pub uniform_bgl: wgpu::BindGroupLayout,
    pub input_bgl: wgpu::BindGroupLayout,
    pub uniform_buffer: wgpu::Buffer,
    pub quad_vertex_buffer: wgpu::Buffer,
    // Color is filtered; depth reads must stay exact
    pub color_sampler: wgpu::Sampler,
    pub depth_sampler: wgpu::Sampler,
}

impl ScanCompositor {
    /// Create both resolve pipelines and the shared fullscreen quad
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scan Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scan_shader.wgsl").into()),
        });

        let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scan Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let color_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Scan Color Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let depth_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Scan Depth Sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        // Group 0: ScanUniforms
        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scan Uniform BGL"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        // Group 1: captured color + depth with their samplers
        let input_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scan Input BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scan Pipeline Layout"),
            bind_group_layouts: &[&uniform_bgl, &input_bgl],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str, fs_entry: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_scan"),
                    buffers: &[QuadVertex::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fs_entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let scan_pipeline = make_pipeline("Scan Pipeline", "fs_scan");
        let blit_pipeline = make_pipeline("Blit Pipeline", "fs_blit");

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scan Uniform Buffer"),
            size: std::mem::size_of::<ScanUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            scan_pipeline,
            blit_pipeline,
            uniform_bgl,
            input_bgl,
            uniform_buffer,
            quad_vertex_buffer,
            color_sampler,
            depth_sampler,
        }
    }

    /// Resolve the capture to `target_view` with the scan overlay
    pub fn composite_scan(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &OffscreenTarget,
        uniforms: &ScanUniforms,
        target_view: &wgpu::TextureView,
    ) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniforms]));
        self.resolve(device, queue, &self.scan_pipeline, source, target_view);
    }

    /// Resolve the capture to `target_view` without the overlay
    pub fn composite_blit(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &OffscreenTarget,
        target_view: &wgpu::TextureView,
    ) {
        self.resolve(device, queue, &self.blit_pipeline, source, target_view);
    }

    fn resolve(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &wgpu::RenderPipeline,
        source: &OffscreenTarget,
        target_view: &wgpu::TextureView,
    ) {
        let uniform_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scan Uniform BG"),
            layout: &self.uniform_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: self.uniform_buffer.as_entire_binding(),
            }],
        });

        let input_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scan Input BG"),
            layout: &self.input_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&source.color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.color_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&source.depth_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.depth_sampler),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Scan Encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scan Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &uniform_bg, &[]);
            pass.set_bind_group(1, &input_bg, &[]);
            pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
            pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talus_core::{mat4_mul, Vec3};

    #[test]
    fn scan_uniforms_matches_wgsl_layout() {
        // 2 mat4 + vec3/f32 + vec4 + vec2 + 2 f32
        assert_eq!(std::mem::size_of::<ScanUniforms>(), 176);
    }

    #[test]
    fn quad_covers_clip_space() {
        let xs: Vec<f32> = QUAD_VERTICES.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = QUAD_VERTICES.iter().map(|v| v.position[1]).collect();
        assert!(xs.contains(&-1.0) && xs.contains(&1.0));
        assert!(ys.contains(&-1.0) && ys.contains(&1.0));
    }

    #[test]
    fn quad_uvs_flip_vertically() {
        // Top-left corner samples the first texel row
        for vertex in &QUAD_VERTICES {
            let expected_u = if vertex.position[0] < 0.0 { 0.0 } else { 1.0 };
            let expected_v = if vertex.position[1] > 0.0 { 0.0 } else { 1.0 };
            assert_eq!(vertex.uv, [expected_u, expected_v]);
        }
    }

    #[test]
    fn uniforms_recompute_inverses_each_call() {
        let settings = ScanSettings::default();
        let mut camera = Camera::new();
        camera.position = Vec3::new(100.0, 125.0, 100.0);

        let first = compute_scan_uniforms(&camera, &settings, 0.0, 1280, 720);

        camera.position = Vec3::new(500.0, 125.0, 100.0);
        camera.yaw = 90.0;
        let second = compute_scan_uniforms(&camera, &settings, 0.1, 1280, 720);

        assert_ne!(first.inverse_view, second.inverse_view);
        assert_eq!(first.inverse_projection, second.inverse_projection);
    }

    #[test]
    fn inverse_view_undoes_view() {
        let camera = Camera {
            position: Vec3::new(100.0, 125.0, 100.0),
            yaw: 45.0,
            ..Camera::new()
        };
        let uniforms =
            compute_scan_uniforms(&camera, &ScanSettings::default(), 1.0, 1280, 720);
        let product = mat4_mul(&camera.view_matrix(), &uniforms.inverse_view);

        for col in 0..4 {
            for row in 0..4 {
                let expected = if col == row { 1.0 } else { 0.0 };
                assert!((product[col][row] - expected).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn uniforms_carry_screen_resolution() {
        let uniforms = compute_scan_uniforms(
            &Camera::new(),
            &ScanSettings::default(),
            2.5,
            1920,
            1080,
        );
        assert_eq!(uniforms.screen_resolution, [1920.0, 1080.0]);
        assert_eq!(uniforms.time, 2.5);
    }
}
