//! Scene construction and per-frame rendering
//!
//! Owns every GPU resource behind one frame: the offscreen capture the
//! terrain, props, and sky render into, and the compositor that resolves
//! the capture to the surface.

use crate::config::ViewerConfig;
use std::collections::HashMap;
use std::path::Path;
use talus_core::{Color, Mat4, Transform, Vec3, MAT4_IDENTITY};
use talus_render::{
    compute_scan_uniforms, compute_sky_uniforms, create_box_mesh, Camera, GpuMesh, GpuTexture,
    ObjectPipeline, ObjectUniforms, OffscreenTarget, RenderContext, RenderError, ScanCompositor,
    ScanSettings, SceneUniforms, SkyPipeline, SkyUniforms, TerrainPipeline, TerrainUniforms,
    OFFSCREEN_COLOR_FORMAT,
};
use talus_terrain::TerrainMesh;
use wgpu::util::DeviceExt;

/// A spinning textured box placed in the world
struct Prop {
    transform: Transform,
    /// Spin rate per axis in degrees per second
    spin: Vec3,
    uniform_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
}

/// GPU state for one loaded scene
pub struct Scene {
    terrain_pipeline: TerrainPipeline,
    object_pipeline: ObjectPipeline,
    sky_pipeline: SkyPipeline,
    compositor: ScanCompositor,
    offscreen: OffscreenTarget,

    scene_uniform_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,

    terrain_mesh: GpuMesh,
    terrain_material_bind_group: wgpu::BindGroup,

    sky_uniform_buffer: wgpu::Buffer,
    sky_bind_group: wgpu::BindGroup,

    box_mesh: GpuMesh,
    props: Vec<Prop>,

    light_direction: Vec3,
    height_scale: f32,
    scan_settings: ScanSettings,
    pub scan_enabled: bool,
}

impl Scene {
    /// Build all GPU resources for the configured scene. Missing textures
    /// fall back to placeholders; only render target creation can fail.
    pub fn new(
        context: &RenderContext,
        config: &ViewerConfig,
        terrain: &TerrainMesh,
        asset_root: &Path,
    ) -> Result<Self, RenderError> {
        let device = &context.device;
        let queue = &context.queue;

        // World-space pipelines target the offscreen capture, not the surface
        let terrain_pipeline = TerrainPipeline::new(device, OFFSCREEN_COLOR_FORMAT);
        let object_pipeline = ObjectPipeline::new(
            device,
            OFFSCREEN_COLOR_FORMAT,
            &terrain_pipeline.scene_bind_group_layout,
        );
        let sky_pipeline = SkyPipeline::new(device, OFFSCREEN_COLOR_FORMAT);
        let compositor = ScanCompositor::new(device, context.config.format);
        let offscreen =
            OffscreenTarget::new(device, context.config.width, context.config.height)?;

        let scene_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &terrain_pipeline.scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_uniform_buffer.as_entire_binding(),
            }],
        });

        // Terrain material: scalars plus the normal map and five layers
        let terrain_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Uniform Buffer"),
            contents: bytemuck::cast_slice(&[TerrainUniforms {
                texture_tile: config.terrain.texture_tile,
                _padding: [0.0; 3],
            }]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let layers = &config.terrain.layers;
        let normal_map = load_texture_or_fallback(
            device,
            queue,
            asset_root,
            &config.terrain.normal_map,
            false,
            "Terrain Normal Map",
        );
        let dirt = load_texture_or_fallback(device, queue, asset_root, &layers.dirt, true, "Dirt");
        let sand = load_texture_or_fallback(device, queue, asset_root, &layers.sand, true, "Sand");
        let grass =
            load_texture_or_fallback(device, queue, asset_root, &layers.grass, true, "Grass");
        let rock = load_texture_or_fallback(device, queue, asset_root, &layers.rock, true, "Rock");
        let snow = load_texture_or_fallback(device, queue, asset_root, &layers.snow, true, "Snow");

        let terrain_material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Terrain Material Bind Group"),
            layout: &terrain_pipeline.material_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: terrain_uniform_buffer.as_entire_binding(),
                },
                texture_view_entry(1, &normal_map),
                sampler_binding_entry(2, &normal_map),
                texture_view_entry(3, &dirt),
                sampler_binding_entry(4, &dirt),
                texture_view_entry(5, &sand),
                sampler_binding_entry(6, &sand),
                texture_view_entry(7, &grass),
                sampler_binding_entry(8, &grass),
                texture_view_entry(9, &rock),
                sampler_binding_entry(10, &rock),
                texture_view_entry(11, &snow),
                sampler_binding_entry(12, &snow),
            ],
        });

        let terrain_mesh = GpuMesh::from_terrain(device, terrain, "Terrain");

        let sky_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sky Uniform Buffer"),
            size: std::mem::size_of::<SkyUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sky_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sky Bind Group"),
            layout: &sky_pipeline.uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: sky_uniform_buffer.as_entire_binding(),
            }],
        });

        // Props share one box mesh; textures are loaded once per distinct path
        let box_mesh = GpuMesh::from_mesh(device, &create_box_mesh(), "Box");

        let mut prop_textures: HashMap<&str, GpuTexture> = HashMap::new();
        for prop_config in &config.props {
            prop_textures
                .entry(prop_config.texture.as_str())
                .or_insert_with(|| {
                    load_texture_or_fallback(
                        device,
                        queue,
                        asset_root,
                        &prop_config.texture,
                        true,
                        "Prop",
                    )
                });
        }

        let mut props = Vec::with_capacity(config.props.len());
        for prop_config in &config.props {
            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Object Uniform Buffer"),
                size: std::mem::size_of::<ObjectUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Object Bind Group"),
                layout: &object_pipeline.object_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

            let texture = &prop_textures[prop_config.texture.as_str()];
            let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Object Texture Bind Group"),
                layout: &object_pipeline.texture_bind_group_layout,
                entries: &[texture_view_entry(0, texture), sampler_binding_entry(1, texture)],
            });

            props.push(Prop {
                transform: Transform::from_position(Vec3::from_array(prop_config.position))
                    .with_scale(Vec3::ONE * prop_config.scale),
                spin: Vec3::new(
                    prop_config.spin[0].to_degrees(),
                    prop_config.spin[1].to_degrees(),
                    prop_config.spin[2].to_degrees(),
                ),
                uniform_buffer,
                object_bind_group,
                texture_bind_group,
            });
        }

        Ok(Self {
            terrain_pipeline,
            object_pipeline,
            sky_pipeline,
            compositor,
            offscreen,
            scene_uniform_buffer,
            scene_bind_group,
            terrain_mesh,
            terrain_material_bind_group,
            sky_uniform_buffer,
            sky_bind_group,
            box_mesh,
            props,
            light_direction: Vec3::from_array(config.light.direction).normalized(),
            height_scale: config.terrain.height_scale,
            scan_settings: ScanSettings {
                accent_color: Color::from_array(config.scan.accent_color),
                period: config.scan.period,
                speed: config.scan.speed,
            },
            scan_enabled: config.scan.enabled,
        })
    }

    /// Advance animated state. `delta` is in seconds.
    pub fn update(&mut self, delta: f32) {
        for prop in &mut self.props {
            prop.transform.rotation = prop.transform.rotation + prop.spin * delta;
        }
    }

    /// Render the scene into the offscreen capture, then resolve it to
    /// `target_view` with or without the scan overlay.
    pub fn render(
        &self,
        context: &RenderContext,
        camera: &Camera,
        time: f32,
        target_view: &wgpu::TextureView,
    ) {
        let queue = &context.queue;

        let scene_uniforms = SceneUniforms {
            view_proj: camera.view_projection_matrix(),
            camera_position: camera.position_array(),
            time,
            light_direction: self.light_direction.to_array(),
            height_scale: self.height_scale,
        };
        queue.write_buffer(
            &self.scene_uniform_buffer,
            0,
            bytemuck::cast_slice(&[scene_uniforms]),
        );

        let sky_uniforms = compute_sky_uniforms(camera, self.light_direction);
        queue.write_buffer(
            &self.sky_uniform_buffer,
            0,
            bytemuck::cast_slice(&[sky_uniforms]),
        );

        for prop in &self.props {
            let model = prop.transform.to_matrix();
            let object_uniforms = ObjectUniforms {
                model,
                model_inv_transpose: mat4_inv_transpose(&model),
            };
            queue.write_buffer(
                &prop.uniform_buffer,
                0,
                bytemuck::cast_slice(&[object_uniforms]),
            );
        }

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut pass = self.offscreen.begin_scene_pass(&mut encoder);

            pass.set_pipeline(&self.terrain_pipeline.pipeline);
            pass.set_bind_group(0, &self.scene_bind_group, &[]);
            pass.set_bind_group(1, &self.terrain_material_bind_group, &[]);
            pass.set_vertex_buffer(0, self.terrain_mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(
                self.terrain_mesh.index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            pass.draw_indexed(0..self.terrain_mesh.index_count, 0, 0..1);

            pass.set_pipeline(&self.object_pipeline.pipeline);
            pass.set_bind_group(0, &self.scene_bind_group, &[]);
            pass.set_vertex_buffer(0, self.box_mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(
                self.box_mesh.index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            for prop in &self.props {
                pass.set_bind_group(1, &prop.object_bind_group, &[]);
                pass.set_bind_group(2, &prop.texture_bind_group, &[]);
                pass.draw_indexed(0..self.box_mesh.index_count, 0, 0..1);
            }

            // Sky last: it only fills pixels still at the cleared depth
            pass.set_pipeline(&self.sky_pipeline.pipeline);
            pass.set_bind_group(0, &self.sky_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));

        if self.scan_enabled {
            let scan_uniforms = compute_scan_uniforms(
                camera,
                &self.scan_settings,
                time,
                self.offscreen.width,
                self.offscreen.height,
            );
            self.compositor.composite_scan(
                &context.device,
                queue,
                &self.offscreen,
                &scan_uniforms,
                target_view,
            );
        } else {
            self.compositor
                .composite_blit(&context.device, queue, &self.offscreen, target_view);
        }
    }

    /// Rebuild the offscreen capture after a surface resize
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        self.offscreen = OffscreenTarget::new(device, width, height)?;
        Ok(())
    }
}

fn texture_view_entry<'a>(binding: u32, texture: &'a GpuTexture) -> wgpu::BindGroupEntry<'a> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::TextureView(&texture.view),
    }
}

fn sampler_binding_entry<'a>(binding: u32, texture: &'a GpuTexture) -> wgpu::BindGroupEntry<'a> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::Sampler(&texture.sampler),
    }
}

/// Load a texture, or fall back to a 1x1 placeholder if the file is missing
/// or undecodable. The viewer keeps running; the failure is only logged.
fn load_texture_or_fallback(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    root: &Path,
    file: &str,
    srgb: bool,
    label: &str,
) -> GpuTexture {
    let path = root.join(file);
    match GpuTexture::from_file(device, queue, &path, srgb, label) {
        Ok(texture) => texture,
        Err(e) => {
            eprintln!("Failed to load texture '{}': {}", path.display(), e);
            if srgb {
                GpuTexture::fallback_white(device, queue)
            } else {
                GpuTexture::fallback_normal(device, queue)
            }
        }
    }
}

/// Inverse transpose of the upper-left 3x3, for transforming normals.
/// Returns identity when the transform is degenerate (zero scale).
fn mat4_inv_transpose(m: &Mat4) -> Mat4 {
    // Upper-left 3x3, row by row (storage is column-major)
    let a = m[0][0]; let b = m[1][0]; let c = m[2][0];
    let d = m[0][1]; let e = m[1][1]; let f = m[2][1];
    let g = m[0][2]; let h = m[1][2]; let i = m[2][2];

    let det = a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g);
    if det.abs() < 1e-10 {
        return MAT4_IDENTITY;
    }
    let inv_det = 1.0 / det;

    // The cofactor matrix over the determinant is the inverse transpose
    let cof00 = (e * i - f * h) * inv_det;
    let cof01 = (f * g - d * i) * inv_det;
    let cof02 = (d * h - e * g) * inv_det;
    let cof10 = (c * h - b * i) * inv_det;
    let cof11 = (a * i - c * g) * inv_det;
    let cof12 = (b * g - a * h) * inv_det;
    let cof20 = (b * f - c * e) * inv_det;
    let cof21 = (c * d - a * f) * inv_det;
    let cof22 = (a * e - b * d) * inv_det;

    [
        [cof00, cof10, cof20, 0.0],
        [cof01, cof11, cof21, 0.0],
        [cof02, cof12, cof22, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inv_transpose_of_identity_is_identity() {
        assert_eq!(mat4_inv_transpose(&MAT4_IDENTITY), MAT4_IDENTITY);
    }

    #[test]
    fn inv_transpose_inverts_uniform_scale() {
        let m = Transform::default().with_scale(Vec3::ONE * 2.0).to_matrix();
        let out = mat4_inv_transpose(&m);
        assert!((out[0][0] - 0.5).abs() < 1e-6);
        assert!((out[1][1] - 0.5).abs() < 1e-6);
        assert!((out[2][2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn inv_transpose_preserves_pure_rotation() {
        let m = Transform::default()
            .with_rotation(Vec3::new(30.0, 45.0, 60.0))
            .to_matrix();
        let out = mat4_inv_transpose(&m);
        for col in 0..3 {
            for row in 0..3 {
                assert!(
                    (out[col][row] - m[col][row]).abs() < 1e-5,
                    "mismatch at [{col}][{row}]"
                );
            }
        }
    }

    #[test]
    fn inv_transpose_of_degenerate_scale_is_identity() {
        let m = Transform::default().with_scale(Vec3::ZERO).to_matrix();
        assert_eq!(mat4_inv_transpose(&m), MAT4_IDENTITY);
    }
}
