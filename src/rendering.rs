//! Rendering system: a wgpu surface cleared to the background color.

use std::sync::Arc;

use winit::window::Window;

use crate::color::Rgb;
use crate::error::RenderError;

/// Rendering system managing the wgpu device and window surface
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
}

impl RenderSystem {
    /// Create new rendering system
    pub async fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface (window must have 'static lifetime via Arc)
        let surface = instance.create_surface(window)?;

        // A clear-only pass runs fine on the low-power adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;

        // Fall back to a 1x1 surface until the first real resize
        let (width, height) =
            surface_size(size.width, size.height, device.limits().max_texture_dimension_2d)
                .unwrap_or((1, 1));

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        log::info!(
            "Renderer: {} ({:?}), surface {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            surface_format
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    /// Reconfigure the surface for a new window size
    pub fn resize(&mut self, width: u32, height: u32) {
        let max = self.device.limits().max_texture_dimension_2d;
        let Some((width, height)) = surface_size(width, height, max) else {
            return;
        };
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Reconfigure with the current size (after a lost or outdated surface)
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Present one frame filled with `color` (sRGB)
    pub fn render(&self, color: Rgb) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // sRGB surfaces encode on write, so the clear value must be linear
        let clear = if self.config.format.is_srgb() {
            color.to_linear()
        } else {
            color
        };

        {
            let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Background Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(clear.r),
                            g: f64::from(clear.g),
                            b: f64::from(clear.b),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Surface extent for a window size, clamped to the device texture limit.
/// `None` while minimized.
fn surface_size(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }
    if width > max_dimension || height > max_dimension {
        log::warn!(
            "Window {}x{} exceeds GPU limit {}, clamping surface",
            width,
            height,
            max_dimension
        );
    }
    Some((width.min(max_dimension), height.min(max_dimension)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_size_within_limits() {
        assert_eq!(surface_size(1280, 720, 8192), Some((1280, 720)));
        assert_eq!(surface_size(8192, 8192, 8192), Some((8192, 8192)));
    }

    #[test]
    fn test_surface_size_clamps_to_device_limit() {
        assert_eq!(surface_size(100_000, 720, 8192), Some((8192, 720)));
        assert_eq!(surface_size(4096, 20_000, 2048), Some((2048, 2048)));
    }

    #[test]
    fn test_minimized_window_has_no_surface() {
        assert_eq!(surface_size(0, 720, 8192), None);
        assert_eq!(surface_size(1280, 0, 8192), None);
    }
}
