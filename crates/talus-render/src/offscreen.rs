//! Offscreen render target: paired color and depth capture for compositing

use crate::context::RenderError;

/// Color format for offscreen capture. Linear, not sRGB: the scan shader
/// reads the raw values back and applies its own treatment.
pub const OFFSCREEN_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Depth format for offscreen capture, sampleable by the scan shader
pub const OFFSCREEN_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// A color/depth texture pair the scene renders into. Recreated on resize.
pub struct OffscreenTarget {
    pub color_texture: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth_texture: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl OffscreenTarget {
    /// Create a target with the given dimensions. Both textures carry
    /// TEXTURE_BINDING so a later pass can sample them.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Result<Self, RenderError> {
        validate_extent(width, height)?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Color Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            color_texture,
            color_view,
            depth_texture,
            depth_view,
            width,
            height,
        })
    }

    /// Begin the scene render pass into this target. Color clears to opaque
    /// black, depth to the far plane. The pass borrows the encoder; drop it
    /// before finishing the encoder.
    pub fn begin_scene_pass<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
    ) -> wgpu::RenderPass<'a> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }
}

/// Reject degenerate target dimensions before texture creation. wgpu would
/// also catch them, but as a validation error on the queue rather than a
/// value we can surface.
pub fn validate_extent(width: u32, height: u32) -> Result<(), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::RenderTarget(format!(
            "offscreen target requires non-zero dimensions, got {width}x{height}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_accepts_normal_dimensions() {
        assert!(validate_extent(1280, 720).is_ok());
        assert!(validate_extent(1, 1).is_ok());
    }

    #[test]
    fn extent_rejects_zero_width() {
        let err = validate_extent(0, 720).unwrap_err();
        assert!(err.to_string().contains("0x720"));
    }

    #[test]
    fn extent_rejects_zero_height() {
        assert!(validate_extent(1280, 0).is_err());
    }
}
