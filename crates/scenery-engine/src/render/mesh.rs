use crate::coords::ViewportRect;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{Batch, BatchKind, ClipVertex, Frame};

/// Pipeline variants: primitive class × depth test.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    kind: BatchKind,
    depth_test: bool,
}

impl PipelineKey {
    const ALL: [PipelineKey; 4] = [
        PipelineKey { kind: BatchKind::Triangles, depth_test: true },
        PipelineKey { kind: BatchKind::Triangles, depth_test: false },
        PipelineKey { kind: BatchKind::Lines, depth_test: true },
        PipelineKey { kind: BatchKind::Lines, depth_test: false },
    ];

    fn index(self) -> usize {
        match (self.kind, self.depth_test) {
            (BatchKind::Triangles, true) => 0,
            (BatchKind::Triangles, false) => 1,
            (BatchKind::Lines, true) => 2,
            (BatchKind::Lines, false) => 3,
        }
    }
}

/// Top-left pixel rect `(x, y, width, height)`.
type PixelRect = (f32, f32, f32, f32);

/// Clip-space affine map that keeps a viewport's pixel mapping while
/// rasterizing into a sub-rect of it.
///
/// wgpu viewports must lie inside the target, so a GL viewport hanging off
/// the surface is drawn through its on-surface part: vertices are remapped
/// so NDC over the part lands on the same pixels, and the clipper cuts the
/// rest.
#[derive(Debug, Copy, Clone, PartialEq)]
struct ClipRemap {
    scale: [f32; 2],
    offset: [f32; 2],
}

impl ClipRemap {
    const IDENTITY: Self = Self { scale: [1.0, 1.0], offset: [0.0, 0.0] };

    fn between(full: PixelRect, part: PixelRect) -> Self {
        let (fx, fy, fw, fh) = full;
        let (px, py, pw, ph) = part;
        Self {
            scale: [fw / pw, fh / ph],
            offset: [
                (2.0 * (fx - px) + fw) / pw - 1.0,
                1.0 - (2.0 * (fy - py) + fh) / ph,
            ],
        }
    }

    fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }

    fn apply(self, v: ClipVertex) -> ClipVertex {
        let [x, y, z, w] = v.position;
        ClipVertex {
            position: [
                x * self.scale[0] + w * self.offset[0],
                y * self.scale[1] + w * self.offset[1],
                z,
                w,
            ],
            ..v
        }
    }
}

/// Where a batch lands on the surface.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Placement {
    rect: PixelRect,
    remap: ClipRemap,
}

/// Resolves a GL viewport against the surface. `None` if nothing is visible.
fn place(viewport: ViewportRect, surface_w: u32, surface_h: u32) -> Option<Placement> {
    let full = viewport.to_top_left(surface_h);
    let rect = viewport.clamped_top_left(surface_w, surface_h)?;
    let remap = if rect == full { ClipRemap::IDENTITY } else { ClipRemap::between(full, rect) };
    Some(Placement { rect, remap })
}

/// Renderer for the geometry batches of a [`Frame`].
///
/// All batches go into one render pass, in recorded order. Each batch sets
/// its own viewport (and matching scissor) and picks the pipeline matching its depth state, so the
/// fixed-function ordering rules hold:
/// - depth test on: `Less` compare, depth writes on
/// - depth test off: always passes, depth untouched
#[derive(Default)]
pub struct MeshRenderer {
    pipeline_formats: Option<(wgpu::TextureFormat, wgpu::TextureFormat)>,
    pipelines: Vec<wgpu::RenderPipeline>,

    vertex_buffer: Option<wgpu::Buffer>,
    vertex_capacity: usize,

    warned_viewport: bool,
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears as the frame requests, then draws every batch.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, frame: &Frame) {
        self.ensure_pipelines(ctx);

        let (surface_w, surface_h) = ctx.surface_size();
        let placements: Vec<Option<Placement>> = frame
            .batches
            .iter()
            .map(|b| self.place_batch(b, surface_w, surface_h))
            .collect();

        let total = frame.vertex_count();
        if total > 0 {
            self.ensure_vertex_capacity(ctx, total);
            if let Some(vbo) = self.vertex_buffer.as_ref() {
                let mut offset = 0u64;
                for (batch, placement) in frame.batches.iter().zip(&placements) {
                    let bytes = match placement {
                        Some(p) if !p.remap.is_identity() => {
                            let remapped: Vec<ClipVertex> =
                                batch.vertices.iter().map(|v| p.remap.apply(*v)).collect();
                            ctx.queue.write_buffer(vbo, offset, bytemuck::cast_slice(&remapped));
                            std::mem::size_of_val(remapped.as_slice())
                        }
                        _ => {
                            ctx.queue.write_buffer(vbo, offset, bytemuck::cast_slice(&batch.vertices));
                            std::mem::size_of_val(batch.vertices.as_slice())
                        }
                    };
                    offset += bytes as u64;
                }
            }
        }

        let clear = frame.clear;
        let color_load = match clear.and_then(|c| c.color) {
            Some(color) => wgpu::LoadOp::Clear(color.to_wgpu()),
            None => wgpu::LoadOp::Load,
        };
        let depth_load = match clear {
            Some(c) if c.depth => wgpu::LoadOp::Clear(1.0),
            _ => wgpu::LoadOp::Load,
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scenery mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if total == 0 {
            return;
        }
        let Some(vbo) = self.vertex_buffer.as_ref() else { return };
        rpass.set_vertex_buffer(0, vbo.slice(..));

        let mut first = 0u32;
        for (batch, placement) in frame.batches.iter().zip(&placements) {
            let count = batch.vertices.len() as u32;
            let range = first..first + count;
            first += count;

            let Some(Placement { rect: (x, y, w, h), .. }) = *placement else { continue };
            let key = PipelineKey { kind: batch.kind, depth_test: batch.depth_test };
            let Some(pipeline) = self.pipelines.get(key.index()) else { continue };

            rpass.set_pipeline(pipeline);
            rpass.set_viewport(x, y, w, h, 0.0, 1.0);
            rpass.set_scissor_rect(x as u32, y as u32, w as u32, h as u32);
            rpass.draw(range, 0..1);
        }
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn place_batch(&mut self, batch: &Batch, surface_w: u32, surface_h: u32) -> Option<Placement> {
        let placement = place(batch.viewport, surface_w, surface_h)?;
        if !placement.remap.is_identity() && !self.warned_viewport {
            log::debug!(
                "viewport {:?} exceeds the {surface_w}x{surface_h} surface; clipping",
                batch.viewport
            );
            self.warned_viewport = true;
        }
        Some(placement)
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        let formats = (ctx.surface_format, ctx.depth_format);
        if self.pipeline_formats == Some(formats) && !self.pipelines.is_empty() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scenery mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scenery mesh pipeline layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        self.pipelines = PipelineKey::ALL
            .iter()
            .map(|key| {
                let topology = match key.kind {
                    BatchKind::Triangles => wgpu::PrimitiveTopology::TriangleList,
                    BatchKind::Lines => wgpu::PrimitiveTopology::LineList,
                };
                let (depth_write_enabled, depth_compare) = if key.depth_test {
                    (true, wgpu::CompareFunction::Less)
                } else {
                    (false, wgpu::CompareFunction::Always)
                };

                ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("scenery mesh pipeline"),
                    layout: Some(&layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_main"),
                        compilation_options: Default::default(),
                        buffers: &[ClipVertex::layout()],
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs_main"),
                        compilation_options: Default::default(),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: ctx.surface_format,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: None,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: ctx.depth_format,
                        depth_write_enabled,
                        depth_compare,
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState::default(),
                    multiview_mask: None,
                    cache: None,
                })
            })
            .collect();

        self.pipeline_formats = Some(formats);
    }

    fn ensure_vertex_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.vertex_capacity && self.vertex_buffer.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(1024);
        self.vertex_buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scenery mesh vbo"),
            size: (new_cap * std::mem::size_of::<ClipVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vertex_capacity = new_cap;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_indices_are_distinct() {
        let mut seen: Vec<usize> = PipelineKey::ALL.iter().map(|k| k.index()).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
        for (i, key) in PipelineKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
    }

    // ── viewport placement ───────────────────────────────────────────────

    /// Pixel a clip-space point lands on when rasterized through `rect`.
    fn to_pixel(rect: PixelRect, clip: [f32; 4]) -> (f32, f32) {
        let (x, y, w, h) = rect;
        let (nx, ny) = (clip[0] / clip[3], clip[1] / clip[3]);
        (x + (nx + 1.0) * 0.5 * w, y + (1.0 - ny) * 0.5 * h)
    }

    fn vertex(x: f32, y: f32, w: f32) -> ClipVertex {
        ClipVertex { position: [x, y, 0.5 * w, w], color: [1.0; 4] }
    }

    #[test]
    fn on_surface_viewport_is_used_as_is() {
        let p = place(ViewportRect::new(400, 0, 400, 300), 800, 600).unwrap();
        assert_eq!(p.rect, (400.0, 300.0, 400.0, 300.0));
        assert!(p.remap.is_identity());
    }

    #[test]
    fn overhanging_viewport_keeps_its_pixel_mapping() {
        // 300x200 viewport starting 100 px left of a 200x100 surface
        let viewport = ViewportRect::new(-100, -50, 300, 200);
        let full = viewport.to_top_left(100);
        let p = place(viewport, 200, 100).unwrap();
        assert_eq!(p.rect, (0.0, 0.0, 200.0, 100.0));

        for v in [vertex(0.0, 0.0, 1.0), vertex(0.5, -0.25, 2.0), vertex(-1.0, 1.0, 1.0)] {
            let (ex, ey) = to_pixel(full, v.position);
            let (ax, ay) = to_pixel(p.rect, p.remap.apply(v).position);
            assert!((ex - ax).abs() < 1e-3 && (ey - ay).abs() < 1e-3, "{v:?}");
        }
        // depth and w pass through
        let moved = p.remap.apply(vertex(0.3, 0.3, 2.0));
        assert_eq!(moved.position[2..], [1.0, 2.0]);
    }

    #[test]
    fn offscreen_viewport_draws_nothing() {
        assert_eq!(place(ViewportRect::new(900, 0, 100, 100), 800, 600), None);
    }
}
