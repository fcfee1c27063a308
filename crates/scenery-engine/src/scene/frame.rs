use crate::coords::ViewportRect;
use crate::paint::Color;

use super::{Batch, BatchKind, ClearOp, ClipVertex, TextRun};

/// Everything recorded for one frame, in issue order.
///
/// Batching rules:
/// - geometry is appended to the last batch when kind, viewport and depth
///   state all match; otherwise a new batch starts
/// - batches are never reordered, so painter's order survives when the depth
///   test is off
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Frame {
    pub clear: Option<ClearOp>,
    pub batches: Vec<Batch>,
    pub texts: Vec<TextRun>,
    /// Set once the producer called `flush`.
    pub flushed: bool,
}

impl Frame {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clear.is_none() && self.batches.is_empty() && self.texts.is_empty()
    }

    /// Records a clear. Clearing color discards everything drawn so far this
    /// frame, since it would be overwritten anyway.
    pub fn record_clear(&mut self, color: Option<Color>, depth: bool) {
        if color.is_some() {
            self.batches.clear();
            self.texts.clear();
        }

        let prev = self.clear.take();
        self.clear = Some(ClearOp {
            color: color.or(prev.and_then(|c| c.color)),
            depth: depth || prev.is_some_and(|c| c.depth),
        });
    }

    /// Appends assembled primitives, merging into the last batch when state matches.
    pub fn push_geometry(
        &mut self,
        kind: BatchKind,
        viewport: ViewportRect,
        depth_test: bool,
        vertices: &[ClipVertex],
    ) {
        if vertices.is_empty() {
            return;
        }

        if let Some(last) = self.batches.last_mut() {
            if last.kind == kind && last.viewport == viewport && last.depth_test == depth_test {
                last.vertices.extend_from_slice(vertices);
                return;
            }
        }

        self.batches.push(Batch {
            kind,
            viewport,
            depth_test,
            vertices: vertices.to_vec(),
        });
    }

    pub fn push_text(&mut self, run: TextRun) {
        self.texts.push(run);
    }

    /// Total vertices across all batches.
    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(|b| b.vertices.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32) -> ClipVertex {
        ClipVertex { position: [x, 0.0, 0.0, 1.0], color: [1.0; 4] }
    }

    const FULL: ViewportRect = ViewportRect::new(0, 0, 100, 100);

    #[test]
    fn matching_state_merges_into_one_batch() {
        let mut f = Frame::new();
        f.push_geometry(BatchKind::Triangles, FULL, true, &[v(0.0), v(1.0), v(2.0)]);
        f.push_geometry(BatchKind::Triangles, FULL, true, &[v(3.0), v(4.0), v(5.0)]);
        assert_eq!(f.batches.len(), 1);
        assert_eq!(f.batches[0].primitive_count(), 2);
    }

    #[test]
    fn state_change_starts_new_batch_in_order() {
        let mut f = Frame::new();
        f.push_geometry(BatchKind::Triangles, FULL, true, &[v(0.0), v(1.0), v(2.0)]);
        f.push_geometry(BatchKind::Lines, FULL, true, &[v(0.0), v(1.0)]);
        f.push_geometry(BatchKind::Triangles, FULL, false, &[v(0.0), v(1.0), v(2.0)]);
        let kinds: Vec<_> = f.batches.iter().map(|b| (b.kind, b.depth_test)).collect();
        assert_eq!(
            kinds,
            vec![
                (BatchKind::Triangles, true),
                (BatchKind::Lines, true),
                (BatchKind::Triangles, false),
            ]
        );
    }

    #[test]
    fn empty_geometry_is_ignored() {
        let mut f = Frame::new();
        f.push_geometry(BatchKind::Lines, FULL, false, &[]);
        assert!(f.is_empty());
    }

    #[test]
    fn color_clear_discards_earlier_drawing() {
        let mut f = Frame::new();
        f.push_geometry(BatchKind::Lines, FULL, false, &[v(0.0), v(1.0)]);
        f.record_clear(Some(Color::BLACK), true);
        assert!(f.batches.is_empty());
        assert_eq!(f.clear, Some(ClearOp { color: Some(Color::BLACK), depth: true }));
    }

    #[test]
    fn depth_only_clear_keeps_color_request() {
        let mut f = Frame::new();
        f.record_clear(Some(Color::WHITE), false);
        f.record_clear(None, true);
        assert_eq!(f.clear, Some(ClearOp { color: Some(Color::WHITE), depth: true }));
    }
}
