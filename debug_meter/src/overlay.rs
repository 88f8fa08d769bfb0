//! Overlay geometry for a reduced frame.
//!
//! Produces screen-space quads (and triangle-list vertices) for an external
//! renderer: one guide quad per lane followed by one quad per interval, all
//! inside a fixed viewport rectangle. Coordinates are normalized device
//! coordinates, `x` right and `y` up.

use crate::color::MeterColor;
use crate::reducer::FrameTimeline;

/// Vertices emitted per quad (two triangles).
pub const VERTICES_PER_QUAD: usize = 6;

/// Unit-square corners of the two triangles, in emission order.
const QUAD_CORNERS: [[f32; 2]; VERTICES_PER_QUAD] = [
    [0.0, 0.0],
    [1.0, 0.0],
    [0.0, 1.0],
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
];

/// Placement of the overlay on screen.
///
/// The rectangle is given in viewport-relative units (`0..1`, `y` down).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OverlayLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Depth written to every vertex.
    pub depth: f32,
    /// Alternating lane background colors.
    pub guide_colors: [MeterColor; 2],
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self {
            x: 0.1,
            y: 0.7,
            width: 0.8,
            height: 0.2,
            depth: 0.5,
            guide_colors: [MeterColor::GUIDE_DARK, MeterColor::GUIDE_LIGHT],
        }
    }
}

impl OverlayLayout {
    /// Map a normalized time coordinate to NDC x.
    pub fn ndc_x(&self, t: f32) -> f32 {
        (t * self.width + self.x) * 2.0 - 1.0
    }

    /// Map a position within a lane (`0` top, `1` bottom) to NDC y.
    pub fn ndc_y(&self, lane: usize, lane_count: usize, within: f32) -> f32 {
        let lanes = lane_count.max(1) as f32;
        ((lane as f32 + within) / lanes * self.height + self.y) * -2.0 + 1.0
    }

    /// Quad covering `[start, end]` of the frame window on `lane`.
    pub fn quad(
        &self,
        lane: usize,
        lane_count: usize,
        start: f32,
        end: f32,
        color: MeterColor,
    ) -> OverlayQuad {
        OverlayQuad {
            x0: self.ndc_x(start),
            y0: self.ndc_y(lane, lane_count, 0.0),
            x1: self.ndc_x(end),
            y1: self.ndc_y(lane, lane_count, 1.0),
            color,
        }
    }
}

/// An axis-aligned colored rectangle in NDC.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OverlayQuad {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub color: MeterColor,
}

impl OverlayQuad {
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }

    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// Two triangles covering the quad.
    pub fn vertices(&self, depth: f32) -> [OverlayVertex; VERTICES_PER_QUAD] {
        QUAD_CORNERS.map(|[u, v]| OverlayVertex {
            position: [
                self.x0 + (self.x1 - self.x0) * u,
                self.y0 + (self.y1 - self.y0) * v,
                depth,
            ],
            color: self.color.0,
        })
    }
}

/// A sprite vertex: position + packed ABGR color.
///
/// Matches a `R32G32B32_FLOAT` position at offset 0 and a `R8G8B8A8_UNORM`
/// color at offset 12.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayVertex {
    pub position: [f32; 3],
    pub color: u32,
}

/// Guide quads for every lane, then one quad per interval.
pub fn build_quads(timeline: &FrameTimeline, layout: &OverlayLayout) -> Vec<OverlayQuad> {
    let lane_count = timeline.lane_count;
    let mut quads = Vec::with_capacity(lane_count + timeline.interval_count());

    for lane in 0..lane_count {
        let color = layout.guide_colors[lane % 2];
        quads.push(layout.quad(lane, lane_count, 0.0, 1.0, color));
    }

    for lane in &timeline.lanes {
        for interval in &lane.intervals {
            quads.push(layout.quad(
                lane.lane,
                lane_count,
                interval.start,
                interval.end(),
                interval.color,
            ));
        }
    }
    quads
}

/// Reusable vertex storage for the overlay draw.
///
/// Starts sized for `initial_quads` and grows (2x) when a frame needs more,
/// keeping its allocation between frames.
pub struct OverlayBatch {
    layout: OverlayLayout,
    vertices: Vec<OverlayVertex>,
    quad_count: usize,
}

impl OverlayBatch {
    pub fn new(layout: OverlayLayout, initial_quads: usize) -> Self {
        Self {
            layout,
            vertices: Vec::with_capacity(initial_quads * VERTICES_PER_QUAD),
            quad_count: 0,
        }
    }

    pub fn layout(&self) -> &OverlayLayout {
        &self.layout
    }

    /// Replace the batch contents with the geometry of `timeline`.
    pub fn rebuild(&mut self, timeline: &FrameTimeline) {
        let quads = build_quads(timeline, &self.layout);
        let needed = quads.len() * VERTICES_PER_QUAD;
        if needed > self.vertices.capacity() {
            let grown = needed.max(self.vertices.capacity().saturating_mul(2));
            self.vertices.reserve_exact(grown - self.vertices.len());
            log::debug!("Overlay batch grown to {} vertices", grown);
        }

        self.vertices.clear();
        for quad in &quads {
            self.vertices.extend_from_slice(&quad.vertices(self.layout.depth));
        }
        self.quad_count = quads.len();
    }

    pub fn vertices(&self) -> &[OverlayVertex] {
        &self.vertices
    }

    /// Vertex data ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn quad_count(&self) -> usize {
        self.quad_count
    }

    /// Vertices to draw as a triangle list.
    pub fn draw_vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }
}
