use std::sync::Arc;

use log::{debug, info, warn};
use winit::{dpi::PhysicalSize, window::Window};

use crate::context::World;
use crate::error::{EngineError, Result};
use crate::render::canvas::Canvas;

/// Window surface plus the canvas uploaded to it every frame.
pub struct Graphics {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    /// Surface wants BGRA; the canvas is RGBA.
    swap_red_blue: bool,
    canvas: Canvas,
    staging: Vec<u8>,
}

pub async fn create_graphics(window: Arc<Window>) -> Result<Graphics> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let surface = instance.create_surface(window.clone())?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        })
        .await?;
    info!("graphics adapter: {}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("engine device"),
            ..Default::default()
        })
        .await?;

    let caps = surface.get_capabilities(&adapter);
    if !caps.usages.contains(wgpu::TextureUsages::COPY_DST) {
        return Err(EngineError::Presentation("surface does not accept copies".to_owned()));
    }
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|f| {
            matches!(
                f,
                wgpu::TextureFormat::Rgba8UnormSrgb
                    | wgpu::TextureFormat::Rgba8Unorm
                    | wgpu::TextureFormat::Bgra8UnormSrgb
                    | wgpu::TextureFormat::Bgra8Unorm
            )
        })
        .ok_or_else(|| EngineError::Presentation("no 8-bit RGBA surface format".to_owned()))?;

    let size = window.inner_size();
    let mut config = surface
        .get_default_config(&adapter, size.width.max(1), size.height.max(1))
        .ok_or_else(|| EngineError::Presentation("surface not supported by adapter".to_owned()))?;
    config.format = format;
    config.usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST;
    surface.configure(&device, &config);
    debug!("surface {:?} {}x{}", config.format, config.width, config.height);

    let canvas = Canvas::new(config.width, config.height);
    Ok(Graphics {
        window,
        surface,
        device,
        queue,
        swap_red_blue: matches!(
            format,
            wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Bgra8Unorm
        ),
        config,
        canvas,
        staging: Vec::new(),
    })
}

impl Graphics {
    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.canvas.resize(size.width, size.height);
    }

    pub fn draw(&mut self, world: &World) {
        let scale = self.window.scale_factor() as f32;
        self.canvas.draw_scene(&world.graph, &world.assets, scale);

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(err) => {
                warn!("dropped frame: {err}");
                return;
            }
        };

        let bytes = if self.swap_red_blue {
            self.staging.clear();
            self.staging.extend_from_slice(self.canvas.as_bytes());
            for px in self.staging.chunks_exact_mut(4) {
                px.swap(0, 2);
            }
            &self.staging
        } else {
            self.canvas.as_bytes()
        };

        let (width, height) = (self.canvas.width(), self.canvas.height());
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &frame.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::empty());
        self.window.pre_present_notify();
        frame.present();
    }
}
