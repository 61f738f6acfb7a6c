use std::collections::HashMap;

use crate::{
    foundation::{
        core::Canvas,
        error::{PlayerError, PlayerResult},
    },
    media::frame::VisualFrame,
    render::{
        frame::FrameRGBA,
        renderer::{RenderSettings, TextureSlot, TransitionRenderer, ZoomUniforms},
    },
};

const ZOOM_SHADER: &str = r#"
struct VsOut {
  @builtin(position) pos: vec4<f32>,
  @location(0) uv: vec2<f32>,
};

struct Params {
  progress: f32,
  target_zoom: f32,
  aspect: f32,
  _pad: f32,
};

@vertex
fn vs(@builtin(vertex_index) vi: u32) -> VsOut {
  var p = array<vec2<f32>, 3>(
    vec2<f32>(-1.0, -1.0),
    vec2<f32>( 3.0, -1.0),
    vec2<f32>(-1.0,  3.0),
  );
  let pos = p[vi];
  let st = (pos + vec2<f32>(1.0, 1.0)) * 0.5;
  var o: VsOut;
  o.pos = vec4<f32>(pos, 0.0, 1.0);
  o.uv = vec2<f32>(st.x, 1.0 - st.y);
  return o;
}

@group(0) @binding(0) var t_from: texture_2d<f32>;
@group(0) @binding(1) var t_to: texture_2d<f32>;
@group(0) @binding(2) var s_lin: sampler;
@group(0) @binding(3) var<uniform> params: Params;

@fragment
fn fs(in: VsOut) -> @location(0) vec4<f32> {
  let scale = mix(1.0, params.target_zoom, params.progress);
  let from_uv = (in.uv - vec2<f32>(0.5, 0.5)) * scale + vec2<f32>(0.5, 0.5);
  let a = textureSample(t_from, s_lin, from_uv);
  let b = textureSample(t_to, s_lin, in.uv);
  return mix(a, b, smoothstep(0.0, 1.0, params.progress));
}
"#;

struct GpuTexture {
    width: u32,
    height: u32,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct Target {
    width: u32,
    height: u32,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    readback: wgpu::Buffer,
    bytes_per_row: u32,
}

/// wgpu implementation of the zoom transition with CPU readback of the composited frame.
pub struct GpuZoomRenderer {
    settings: RenderSettings,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    params: wgpu::Buffer,
    slots: HashMap<TextureSlot, GpuTexture>,
    target: Option<Target>,
}

impl GpuZoomRenderer {
    /// Acquire an adapter and device and build the blend pipeline.
    ///
    /// Any failure is reported as [`PlayerError::RendererInit`].
    pub fn new(settings: RenderSettings) -> PlayerResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                PlayerError::renderer_init("no gpu adapter available")
            }
            other => PlayerError::renderer_init(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("bunnyplay_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| PlayerError::renderer_init(format!("wgpu request_device failed: {e:?}")))?;

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("bunnyplay_zoom_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("bunnyplay_zoom_params"),
            size: 16,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bunnyplay_zoom_bgl"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(16),
                    },
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bunnyplay_zoom_shader"),
            source: wgpu::ShaderSource::Wgsl(ZOOM_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("bunnyplay_zoom_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("bunnyplay_zoom_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        tracing::info!(adapter = ?adapter.get_info().name, "gpu transition renderer ready");

        Ok(Self {
            settings,
            device,
            queue,
            pipeline,
            bind_group_layout,
            sampler,
            params,
            slots: HashMap::new(),
            target: None,
        })
    }

    fn ensure_target(&mut self, canvas: Canvas) -> PlayerResult<()> {
        if self
            .target
            .as_ref()
            .is_some_and(|t| t.width == canvas.width && t.height == canvas.height)
        {
            return Ok(());
        }

        let bytes_per_row_unpadded = canvas
            .width
            .checked_mul(4)
            .ok_or_else(|| PlayerError::validation("render target width overflow"))?;
        let bytes_per_row = align_to(bytes_per_row_unpadded, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        let buffer_size = u64::from(bytes_per_row)
            .checked_mul(u64::from(canvas.height))
            .ok_or_else(|| PlayerError::validation("readback buffer size overflow"))?;

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("bunnyplay_zoom_target"),
            size: extent(canvas.width, canvas.height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("bunnyplay_readback"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.target = Some(Target {
            width: canvas.width,
            height: canvas.height,
            texture,
            view,
            readback,
            bytes_per_row,
        });
        Ok(())
    }

    fn readback(&self, target: &Target) -> PlayerResult<Vec<u8>> {
        let buffer_slice = target.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| PlayerError::validation(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| PlayerError::validation("readback channel closed"))?
            .map_err(|e| PlayerError::validation(format!("readback map failed: {e:?}")))?;

        let mapped = buffer_slice.get_mapped_range();
        let row_bytes = target.width as usize * 4;
        let padded_row_bytes = target.bytes_per_row as usize;
        let mut out = Vec::with_capacity(row_bytes * target.height as usize);
        for row in 0..target.height as usize {
            let start = row * padded_row_bytes;
            out.extend_from_slice(&mapped[start..start + row_bytes]);
        }
        drop(mapped);
        target.readback.unmap();
        Ok(out)
    }
}

impl TransitionRenderer for GpuZoomRenderer {
    fn backend_name(&self) -> &'static str {
        "gpu"
    }

    fn set_source(&mut self, slot: TextureSlot, frame: &VisualFrame) -> bool {
        if !frame.is_decodable() {
            tracing::debug!(?slot, "skipping undecodable frame");
            return false;
        }

        let needs_create = self
            .slots
            .get(&slot)
            .map(|t| t.width != frame.width || t.height != frame.height)
            .unwrap_or(true);
        if needs_create {
            let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("bunnyplay_zoom_source"),
                size: extent(frame.width, frame.height),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            self.slots.insert(
                slot,
                GpuTexture {
                    width: frame.width,
                    height: frame.height,
                    texture,
                    view,
                },
            );
        }

        let Some(tex) = self.slots.get(&slot) else {
            return false;
        };
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &tex.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            frame.rgba8_premul.as_slice(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(frame.width * 4),
                rows_per_image: Some(frame.height),
            },
            extent(frame.width, frame.height),
        );
        true
    }

    fn has_source(&self, slot: TextureSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    fn render_frame(&mut self, progress: f32, canvas: Canvas) -> PlayerResult<FrameRGBA> {
        let from_key = match (
            self.slots.contains_key(&TextureSlot::From),
            self.slots.contains_key(&TextureSlot::To),
        ) {
            (true, _) => TextureSlot::From,
            (false, true) => TextureSlot::To,
            (false, false) => return Ok(FrameRGBA::filled(canvas, self.settings.clear_rgba)),
        };
        let to_key = if self.slots.contains_key(&TextureSlot::To) {
            TextureSlot::To
        } else {
            from_key
        };

        self.ensure_target(canvas)?;
        let uniforms = ZoomUniforms::new(progress, self.settings.target_zoom, canvas);
        self.queue
            .write_buffer(&self.params, 0, &uniforms.to_bytes());

        let (Some(from), Some(to), Some(target)) = (
            self.slots.get(&from_key),
            self.slots.get(&to_key),
            self.target.as_ref(),
        ) else {
            return Err(PlayerError::validation("gpu renderer resources missing"));
        };

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bunnyplay_zoom_bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&from.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&to.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.params.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("bunnyplay_zoom_encoder"),
            });
        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("bunnyplay_zoom_rp"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &bind_group, &[]);
            rp.draw(0..3, 0..1);
        }
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &target.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(target.bytes_per_row),
                    rows_per_image: Some(target.height),
                },
            },
            extent(target.width, target.height),
        );
        self.queue.submit(Some(encoder.finish()));

        let data = self.readback(target)?;
        Ok(FrameRGBA {
            width: target.width,
            height: target.height,
            data,
            premultiplied: true,
        })
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}

#[cfg(test)]
#[path = "../../tests/unit/render/gpu.rs"]
mod tests;
