use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};
use wgpu::util::DeviceExt;

use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{Frame, TextRun};
use crate::text::FontSystem;

use super::common::{
    premul_alpha_blend, viewport_ubo_min_binding_size, QuadVertex, ViewportUniform, QUAD_INDICES,
    QUAD_VERTICES,
};

const ATLAS_SIZE: u32 = 2048;
const GLYPH_PADDING: u32 = 1;

/// Top edge, in top-left surface pixels, of a layout box whose first
/// baseline sits at GL window row `baseline_y`.
fn layout_top(baseline_y: i32, surface_height: u32, ascent: f32) -> f32 {
    surface_height as f32 - baseline_y as f32 - ascent
}

// ── shelf packer ──────────────────────────────────────────────────────────

/// Row-by-row rectangle allocator for a square atlas.
///
/// Rectangles fill a shelf left to right; a rectangle that does not fit
/// opens a new shelf below the tallest one so far. Once a rectangle fails
/// to fit vertically the packer stays full.
#[derive(Debug, Clone, PartialEq)]
struct ShelfPacker {
    size: u32,
    cursor: [u32; 2],
    shelf_height: u32,
    full: bool,
}

impl ShelfPacker {
    fn new(size: u32) -> Self {
        Self { size, cursor: [GLYPH_PADDING; 2], shelf_height: 0, full: false }
    }

    /// Top-left corner for a `w` × `h` rectangle, or `None` when out of room.
    fn allocate(&mut self, w: u32, h: u32) -> Option<[u32; 2]> {
        if self.full || w + 2 * GLYPH_PADDING > self.size {
            return None;
        }

        if self.cursor[0] + w + GLYPH_PADDING > self.size {
            self.cursor = [GLYPH_PADDING, self.cursor[1] + self.shelf_height + GLYPH_PADDING];
            self.shelf_height = 0;
        }
        if self.cursor[1] + h + GLYPH_PADDING > self.size {
            self.full = true;
            return None;
        }

        let at = self.cursor;
        self.cursor[0] += w + GLYPH_PADDING;
        self.shelf_height = self.shelf_height.max(h);
        Some(at)
    }
}

// ── glyph atlas ───────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone)]
struct AtlasSlot {
    uv_min: [f32; 2],
    uv_max: [f32; 2],
}

/// R8 coverage atlas. Glyphs are rasterized on first use and kept for the
/// atlas lifetime; the cache key covers font, glyph and pixel size.
struct GlyphAtlas {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    packer: ShelfPacker,
    slots: HashMap<GlyphRasterConfig, AtlasSlot>,
    warned_full: bool,
}

impl GlyphAtlas {
    fn new(device: &wgpu::Device) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("scenery glyph atlas"),
            size: wgpu::Extent3d {
                width: ATLAS_SIZE,
                height: ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            packer: ShelfPacker::new(ATLAS_SIZE),
            slots: HashMap::new(),
            warned_full: false,
        }
    }

    fn slot(
        &mut self,
        queue: &wgpu::Queue,
        font: &fontdue::Font,
        key: GlyphRasterConfig,
    ) -> Option<AtlasSlot> {
        if let Some(slot) = self.slots.get(&key) {
            return Some(*slot);
        }

        let (metrics, bitmap) = font.rasterize_config(key);
        let (w, h) = (metrics.width as u32, metrics.height as u32);
        if w == 0 || h == 0 {
            return None;
        }

        let Some([x, y]) = self.packer.allocate(w, h) else {
            if !self.warned_full {
                log::warn!("glyph atlas ({ATLAS_SIZE}×{ATLAS_SIZE}) is full; new glyphs are skipped");
                self.warned_full = true;
            }
            return None;
        };

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            &bitmap,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );

        let scale = 1.0 / ATLAS_SIZE as f32;
        let slot = AtlasSlot {
            uv_min: [x as f32 * scale, y as f32 * scale],
            uv_max: [(x + w) as f32 * scale, (y + h) as f32 * scale],
        };
        self.slots.insert(key, slot);
        Some(slot)
    }
}

// ── GPU state ─────────────────────────────────────────────────────────────

/// Pipeline and bindings; rebuilt only when the surface format changes.
struct TextPipeline {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    viewport_ubo: wgpu::Buffer,
    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,
}

impl TextPipeline {
    fn new(ctx: &RenderCtx<'_>, atlas: &GlyphAtlas) -> Self {
        let device = ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scenery text shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/text.wgsl").into()),
        });

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scenery text bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: viewport_ubo_min_binding_size(),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("scenery glyph sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scenery text viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scenery text bind group"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: viewport_ubo.as_entire_binding() },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scenery text pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scenery text pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), GlyphInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scenery text quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scenery text quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self { format: ctx.surface_format, pipeline, bind_group, viewport_ubo, quad_vbo, quad_ibo }
    }
}

// ── renderer ──────────────────────────────────────────────────────────────

/// Renderer for the text runs of a [`Frame`].
///
/// Text is bitmap-style overlay: it ignores the depth buffer and is drawn
/// after all geometry, in recorded order, through a fontdue glyph atlas.
pub struct TextRenderer {
    atlas: Option<GlyphAtlas>,
    gpu: Option<TextPipeline>,

    instances: Vec<GlyphInstance>,
    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,

    layout: Layout<()>,
    warned_no_fonts: bool,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            atlas: None,
            gpu: None,
            instances: Vec::new(),
            instance_vbo: None,
            instance_capacity: 0,
            layout: Layout::new(CoordinateSystem::PositiveYDown),
            warned_no_fonts: false,
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws every text run of `frame` on top of the color target.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        frame: &Frame,
        font_system: &FontSystem,
    ) {
        if frame.texts.is_empty() {
            return;
        }
        if font_system.is_empty() {
            if !self.warned_no_fonts {
                log::warn!("no fonts loaded; {} text run(s) skipped", frame.texts.len());
                self.warned_no_fonts = true;
            }
            return;
        }

        let atlas = self.atlas.get_or_insert_with(|| GlyphAtlas::new(ctx.device));
        if self.gpu.as_ref().is_none_or(|g| g.format != ctx.surface_format) {
            self.gpu = Some(TextPipeline::new(ctx, atlas));
        }

        let (_, surface_h) = ctx.surface_size();
        self.instances.clear();
        for run in &frame.texts {
            push_run(&mut self.layout, atlas, ctx.queue, run, surface_h, font_system, &mut self.instances);
        }
        if self.instances.is_empty() {
            return;
        }

        self.ensure_instance_capacity(ctx, self.instances.len());
        let (Some(gpu), Some(instance_vbo)) = (self.gpu.as_ref(), self.instance_vbo.as_ref()) else {
            return;
        };

        let (w, h) = ctx.surface_size();
        ctx.queue.write_buffer(
            &gpu.viewport_ubo,
            0,
            bytemuck::bytes_of(&ViewportUniform::new(w as f32, h as f32)),
        );
        ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&self.instances));

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scenery text pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations { load: wgpu::LoadOp::Load, store: wgpu::StoreOp::Store },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&gpu.pipeline);
        rpass.set_bind_group(0, &gpu.bind_group, &[]);
        rpass.set_vertex_buffer(0, gpu.quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(gpu.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..self.instances.len() as u32);
    }

    fn ensure_instance_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(64);
        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scenery text instance vbo"),
            size: (new_cap * std::mem::size_of::<GlyphInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }
}

/// Lays out one run with its first baseline at the run's GL position and
/// appends a quad per visible glyph.
fn push_run(
    layout: &mut Layout<()>,
    atlas: &mut GlyphAtlas,
    queue: &wgpu::Queue,
    run: &TextRun,
    surface_h: u32,
    font_system: &FontSystem,
    out: &mut Vec<GlyphInstance>,
) {
    let Some(font) = font_system.resolve(&run.font).and_then(|id| font_system.get(id)) else {
        return;
    };

    let ascent = font
        .horizontal_line_metrics(run.size)
        .map_or(run.size * 0.8, |m| m.ascent);

    layout.reset(&LayoutSettings {
        x: run.x as f32,
        y: layout_top(run.y, surface_h, ascent),
        ..LayoutSettings::default()
    });
    layout.append(&[font], &TextStyle::new(&run.text, run.size, 0));

    let color = run.color.to_array();
    for glyph in layout.glyphs() {
        if !glyph.char_data.rasterize() || glyph.width == 0 || glyph.height == 0 {
            continue;
        }
        let Some(slot) = atlas.slot(queue, font, glyph.key) else { continue };

        out.push(GlyphInstance {
            dst_min: [glyph.x, glyph.y],
            dst_max: [glyph.x + glyph.width as f32, glyph.y + glyph.height as f32],
            uv_min: slot.uv_min,
            uv_max: slot.uv_max,
            color,
        });
    }
}

/// Per-glyph instance (48 bytes): destination rect in surface pixels,
/// atlas rect in UV, straight-alpha color. Locations 1..=5.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlyphInstance {
    dst_min: [f32; 2],
    dst_max: [f32; 2],
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    color: [f32; 4],
}

impl GlyphInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2,
        2 => Float32x2,
        3 => Float32x2,
        4 => Float32x2,
        5 => Float32x4
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
