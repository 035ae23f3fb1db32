//! WebGPU render pipeline setup

use glam::Vec2;
use wgpu::util::DeviceExt;

use super::shapes::frame_vertices;
use super::vertex::{Vertex, linearize};
use crate::error::{OrbError, OrbResult};
use crate::sim::Frame;

/// Main render state
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,
    pub vertex_buffer: wgpu::Buffer,
    /// Vertices the current buffer can hold
    pub vertex_capacity: usize,
    pub vertex_count: u32,
    /// Surface size in CSS pixels (the space frames are built in)
    pub logical_size: Vec2,
    /// Bezier samples per blob segment
    pub curve_steps: usize,
}

impl RenderState {
    /// Configure `surface` for a `width` x `height` (physical pixels) canvas
    /// showing `logical_size` CSS pixels
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        logical_size: Vec2,
        curve_steps: usize,
    ) -> OrbResult<Self> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("orb-hero-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .map_err(|e| OrbError::Gpu(format!("device request failed: {e}")))?;

        let surface_caps = surface.get_capabilities(adapter);
        // Blend in sRGB space, like the page compositor does
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| OrbError::Gpu("surface reports no formats".into()))?;
        let alpha_mode = if surface_caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Surface configured: {:?}, {:?}, {}x{}",
            config.format,
            config.alpha_mode,
            config.width,
            config.height
        );

        // Create shader module
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("orb_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        // Create pipeline
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("render_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
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
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        // Create initial vertex buffer (grown on demand)
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vertex_buffer"),
            contents: bytemuck::cast_slice(&[Vertex::new(0.0, 0.0, [0.0; 4])]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            vertex_buffer,
            vertex_capacity: 1,
            vertex_count: 0,
            logical_size,
            curve_steps,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32, logical_size: Vec2) {
        if new_width > 0 && new_height > 0 {
            self.config.width = new_width;
            self.config.height = new_height;
            self.logical_size = logical_size;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reconfigure after the surface was lost
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Convert surface pixels (origin top-left, y down) to NDC
    pub fn pixel_to_ndc(&self, p: [f32; 2]) -> [f32; 2] {
        pixel_to_ndc(p, self.logical_size)
    }

    /// Tessellate, upload and draw one frame
    pub fn render(&mut self, frame: &Frame) -> Result<(), wgpu::SurfaceError> {
        let linear_output = self.config.format.is_srgb();
        let vertices: Vec<Vertex> = frame_vertices(frame, self.curve_steps)
            .into_iter()
            .map(|v| {
                let color = if linear_output {
                    linearize(v.color)
                } else {
                    v.color
                };
                Vertex {
                    position: self.pixel_to_ndc(v.position),
                    color,
                }
            })
            .collect();

        if vertices.len() > self.vertex_capacity {
            let capacity = vertices.len().next_power_of_two();
            self.vertex_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("vertex_buffer"),
                size: (capacity * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.vertex_capacity = capacity;
            log::debug!("Vertex buffer grown to {} vertices", capacity);
        }
        if !vertices.is_empty() {
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        }
        self.vertex_count = vertices.len() as u32;

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if self.vertex_count > 0 {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                render_pass.draw(0..self.vertex_count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Map a point in a `size` pixel surface to normalized device coordinates
pub fn pixel_to_ndc(p: [f32; 2], size: Vec2) -> [f32; 2] {
    let w = size.x.max(1.0);
    let h = size.y.max(1.0);
    [p[0] / w * 2.0 - 1.0, 1.0 - p[1] / h * 2.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_to_ndc() {
        let size = Vec2::new(200.0, 100.0);
        assert_eq!(pixel_to_ndc([0.0, 0.0], size), [-1.0, 1.0]);
        assert_eq!(pixel_to_ndc([200.0, 100.0], size), [1.0, -1.0]);
        assert_eq!(pixel_to_ndc([100.0, 50.0], size), [0.0, 0.0]);
        // Degenerate sizes do not divide by zero
        let p = pixel_to_ndc([1.0, 1.0], Vec2::ZERO);
        assert!(p[0].is_finite() && p[1].is_finite());
    }
}
