//! wgpu implementation of [`GpuBackend`]
//!
//! One render pipeline draws every batch. The bind group carries the frame
//! projection, one linear sampler, and sixteen texture views; slots the batch
//! does not use are bound to a 1x1 white placeholder.
//!
//! Two targets are supported:
//! - an offscreen texture, readable with [`WgpuBackend::read_pixels`]
//! - a window surface from any `raw-window-handle` host, presented at
//!   [`GpuBackend::end_frame`]

use std::sync::Arc;

use slotmap::SlotMap;
use spiro_core::{Color, TextureId};

use crate::backend::{validate_rgba, FrameParams, GpuBackend};
use crate::shaders::BATCH_SHADER;
use crate::vertex::{Vertex, MAX_TEXTURES, MAX_VERTICES};
use crate::{GpuError, Result};

/// Uniform block shared by every draw in a frame
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniforms {
    projection: [[f32; 4]; 4],
}

/// Configuration for creating a [`WgpuBackend`]
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Preferred target format (None = pick from the surface, or
    /// `Rgba8Unorm` offscreen)
    pub texture_format: Option<wgpu::TextureFormat>,
    /// Adapter selection preference
    pub power_preference: wgpu::PowerPreference,
    /// Wait for vertical blank when presenting to a surface
    pub vsync: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            texture_format: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            vsync: true,
        }
    }
}

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

enum Target {
    Offscreen {
        texture: wgpu::Texture,
        view: wgpu::TextureView,
    },
    Surface {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
        frame: Option<(wgpu::SurfaceTexture, wgpu::TextureView)>,
    },
}

/// Batch backend rendering with wgpu
pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    adapter_info: wgpu::AdapterInfo,
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    placeholder: GpuTexture,
    textures: SlotMap<TextureId, GpuTexture>,
    target: Target,
    width: u32,
    height: u32,
    /// Clear to apply at the start of the next pass
    pending_clear: Option<Color>,
}

impl WgpuBackend {
    /// Get the preferred backend for the current platform
    ///
    /// Using the primary backend instead of all backends reduces memory usage
    /// by avoiding initialization of multiple GPU driver stacks.
    pub fn preferred_backends() -> wgpu::Backends {
        #[cfg(target_os = "macos")]
        {
            wgpu::Backends::METAL
        }
        #[cfg(target_os = "windows")]
        {
            wgpu::Backends::DX12
        }
        #[cfg(target_os = "linux")]
        {
            wgpu::Backends::VULKAN
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        {
            wgpu::Backends::PRIMARY
        }
    }

    /// Create the wgpu instance backends are built from
    pub fn create_instance() -> wgpu::Instance {
        wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: Self::preferred_backends(),
            ..Default::default()
        })
    }

    /// Create a backend rendering into an offscreen texture
    pub async fn offscreen(
        instance: &wgpu::Instance,
        width: u32,
        height: u32,
        config: RendererConfig,
    ) -> Result<Self> {
        let adapter = Self::request_adapter(instance, &config, None).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let format = config
            .texture_format
            .unwrap_or(wgpu::TextureFormat::Rgba8Unorm);
        let (texture, view) = Self::create_offscreen_target(&device, format, width, height);

        Ok(Self::create(
            adapter.get_info(),
            device,
            queue,
            format,
            Target::Offscreen { texture, view },
            width,
            height,
        ))
    }

    /// Create a backend presenting to a window surface
    pub async fn with_surface<W>(
        instance: &wgpu::Instance,
        window: Arc<W>,
        width: u32,
        height: u32,
        config: RendererConfig,
    ) -> Result<Self>
    where
        W: raw_window_handle::HasWindowHandle
            + raw_window_handle::HasDisplayHandle
            + Send
            + Sync
            + 'static,
    {
        let surface = instance.create_surface(window)?;
        let adapter = Self::request_adapter(instance, &config, Some(&surface)).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        tracing::debug!("Surface capabilities - formats: {:?}", surface_caps.formats);

        let fallback = surface_caps
            .formats
            .first()
            .copied()
            .ok_or(GpuError::AdapterNotFound)?;
        let format = config.texture_format.unwrap_or_else(|| {
            // Non-sRGB on macOS avoids double gamma correction
            #[cfg(target_os = "macos")]
            {
                surface_caps
                    .formats
                    .iter()
                    .find(|f| !f.is_srgb())
                    .copied()
                    .unwrap_or(fallback)
            }
            #[cfg(not(target_os = "macos"))]
            {
                surface_caps
                    .formats
                    .iter()
                    .find(|f| f.is_srgb())
                    .copied()
                    .unwrap_or(fallback)
            }
        });
        tracing::debug!("Selected texture format: {:?}", format);

        let present_mode = if config.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            desired_maximum_frame_latency: 2,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);

        Ok(Self::create(
            adapter.get_info(),
            device,
            queue,
            format,
            Target::Surface {
                surface,
                config: surface_config,
                frame: None,
            },
            width,
            height,
        ))
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        config: &RendererConfig,
        compatible_surface: Option<&wgpu::Surface<'static>>,
    ) -> Result<wgpu::Adapter> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.power_preference,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::AdapterNotFound)?;

        let info = adapter.get_info();
        tracing::debug!("Using adapter {} ({:?})", info.name, info.backend);
        Ok(adapter)
    }

    async fn request_device(
        adapter: &wgpu::Adapter,
    ) -> Result<(Arc<wgpu::Device>, Arc<wgpu::Queue>)> {
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Spiro GPU Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await?;
        Ok((Arc::new(device), Arc::new(queue)))
    }

    fn create(
        adapter_info: wgpu::AdapterInfo,
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
        target: Target,
        width: u32,
        height: u32,
    ) -> Self {
        let bind_group_layout = Self::create_bind_group_layout(&device);
        let pipeline = Self::create_pipeline(&device, &bind_group_layout, format);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Batch Vertex Buffer"),
            size: (MAX_VERTICES * std::mem::size_of::<Vertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Batch Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let placeholder = Self::upload_texture(&device, &queue, 1, 1, &[255, 255, 255, 255]);

        tracing::debug!(
            "Created wgpu backend {}x{} ({:?}) on {}",
            width,
            height,
            format,
            adapter_info.name
        );

        Self {
            device,
            queue,
            adapter_info,
            format,
            pipeline,
            bind_group_layout,
            uniform_buffer,
            vertex_buffer,
            sampler,
            placeholder,
            textures: SlotMap::with_key(),
            target,
            width,
            height,
            pending_clear: None,
        }
    }

    fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let mut entries = vec![
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ];
        entries.extend((0..MAX_TEXTURES as u32).map(|slot| wgpu::BindGroupLayoutEntry {
            binding: 2 + slot,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        }));

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Batch Bind Group Layout"),
            entries: &entries,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Batch Shader"),
            source: wgpu::ShaderSource::Wgsl(BATCH_SHADER.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Batch Pipeline Layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Batch Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    // Straight alpha: src * a + dst * (1 - a)
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn create_offscreen_target(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Target"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn upload_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> GpuTexture {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Batch Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        GpuTexture { texture, view }
    }

    fn create_bind_group(&self, textures: &[TextureId]) -> wgpu::BindGroup {
        let views: Vec<&wgpu::TextureView> = (0..MAX_TEXTURES)
            .map(|slot| {
                textures
                    .get(slot)
                    .and_then(|&id| self.textures.get(id))
                    .map_or(&self.placeholder.view, |t| &t.view)
            })
            .collect();

        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: self.uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&self.sampler),
            },
        ];
        entries.extend(views.iter().enumerate().map(|(slot, view)| wgpu::BindGroupEntry {
            binding: 2 + slot as u32,
            resource: wgpu::BindingResource::TextureView(view),
        }));

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Batch Bind Group"),
            layout: &self.bind_group_layout,
            entries: &entries,
        })
    }

    fn target_view(&self) -> Option<&wgpu::TextureView> {
        match &self.target {
            Target::Offscreen { view, .. } => Some(view),
            Target::Surface { frame, .. } => frame.as_ref().map(|(_, view)| view),
        }
    }

    /// Encode one pass over the target, drawing `vertex_count` vertices
    fn submit_pass(&mut self, bind_group: Option<&wgpu::BindGroup>, vertex_count: u32) {
        let load = match self.pending_clear.take() {
            Some(c) => wgpu::LoadOp::Clear(wgpu::Color {
                r: c.r as f64,
                g: c.g as f64,
                b: c.b as f64,
                a: c.a as f64,
            }),
            None => wgpu::LoadOp::Load,
        };

        let Some(view) = self.target_view() else {
            tracing::warn!("Draw outside of a frame; no surface texture acquired");
            return;
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Batch Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Spiro Batch Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(bind_group) = bind_group {
                let byte_len = vertex_count as u64 * std::mem::size_of::<Vertex>() as u64;
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..byte_len));
                render_pass.draw(0..vertex_count, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Read the offscreen target back as tightly packed RGBA8 rows
    pub fn read_pixels(&self) -> Result<Vec<u8>> {
        let Target::Offscreen { texture, .. } = &self.target else {
            return Err(GpuError::NotOffscreen);
        };

        let (width, height) = (self.width.max(1), self.height.max(1));
        let bytes_per_row = Self::padded_bytes_per_row(width);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Buffer"),
            size: (bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| GpuError::Readback(e.to_string()))?
            .map_err(|e| GpuError::Readback(e.to_string()))?;

        // Strip row padding
        let data = buffer_slice.get_mapped_range();
        let row_len = (width * 4) as usize;
        let mut pixels = Vec::with_capacity(row_len * height as usize);
        for row in data.chunks_exact(bytes_per_row as usize) {
            pixels.extend_from_slice(&row[..row_len]);
        }
        drop(data);
        buffer.unmap();

        if matches!(
            self.format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        ) {
            for px in pixels.chunks_exact_mut(4) {
                px.swap(0, 2);
            }
        }
        Ok(pixels)
    }

    /// Bytes per row padded to `COPY_BYTES_PER_ROW_ALIGNMENT`
    fn padded_bytes_per_row(width: u32) -> u32 {
        let unpadded = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        unpadded.div_ceil(align) * align
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl GpuBackend for WgpuBackend {
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureId> {
        validate_rgba(width, height, rgba)?;
        let texture = Self::upload_texture(&self.device, &self.queue, width, height, rgba);
        Ok(self.textures.insert(texture))
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if let Some(t) = self.textures.remove(texture) {
            t.texture.destroy();
        }
    }

    fn begin_frame(&mut self, params: &FrameParams) -> Result<()> {
        if (params.width, params.height) != (self.width, self.height) {
            self.resize(params.width, params.height);
        }

        let uniforms = FrameUniforms {
            projection: params.projection.to_cols_array(),
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.pending_clear = None;

        if let Target::Surface {
            surface,
            config,
            frame,
        } = &mut self.target
        {
            let texture = match surface.get_current_texture() {
                Ok(texture) => texture,
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    tracing::debug!("Surface lost or outdated, reconfiguring");
                    surface.configure(&self.device, config);
                    surface.get_current_texture()?
                }
                Err(e) => return Err(e.into()),
            };
            let view = texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            *frame = Some((texture, view));
        }
        Ok(())
    }

    fn clear(&mut self, color: Color) {
        self.pending_clear = Some(color);
    }

    fn draw(&mut self, vertices: &[Vertex], textures: &[TextureId]) {
        if vertices.is_empty() {
            return;
        }
        let count = vertices.len().min(MAX_VERTICES);
        self.queue.write_buffer(
            &self.vertex_buffer,
            0,
            bytemuck::cast_slice(&vertices[..count]),
        );
        let bind_group = self.create_bind_group(textures);
        self.submit_pass(Some(&bind_group), count as u32);
    }

    fn end_frame(&mut self) -> Result<()> {
        // A clear with nothing drawn after it still needs a pass
        if self.pending_clear.is_some() {
            self.submit_pass(None, 0);
        }

        if let Target::Surface { frame, .. } = &mut self.target {
            if let Some((texture, view)) = frame.take() {
                drop(view);
                texture.present();
            }
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;

        match &mut self.target {
            Target::Offscreen { texture, view } => {
                let (new_texture, new_view) =
                    Self::create_offscreen_target(&self.device, self.format, width, height);
                *texture = new_texture;
                *view = new_view;
            }
            Target::Surface {
                surface, config, ..
            } => {
                config.width = width;
                config.height = height;
                surface.configure(&self.device, config);
            }
        }
        tracing::debug!("Resized target to {}x{}", width, height);
    }
}
