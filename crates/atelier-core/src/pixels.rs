//! RGBA pixel buffer and stroke rasterizer

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::AtelierError;
use crate::tool::{CompositeMode, ToolConfig};

/// A position in canvas pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// RGBA8 pixel buffer with straight (non-premultiplied) alpha
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl PixelBuffer {
    /// Create a buffer filled with an opaque background color
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        let mut buffer = Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        };
        buffer.fill(background);
        buffer
    }

    /// Wrap raw RGBA bytes, validating the length
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, AtelierError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(AtelierError::BufferSize { expected, actual: data.len() });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Fill every pixel with an opaque color
    pub fn fill(&mut self, color: Rgb) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, 255]);
        }
    }

    /// Overwrite this buffer with another one, reusing the allocation when sizes match
    pub fn copy_from(&mut self, other: &PixelBuffer) {
        if self.data.len() == other.data.len() {
            self.data.copy_from_slice(&other.data);
            self.width = other.width;
            self.height = other.height;
        } else {
            *self = other.clone();
        }
    }

    /// Composite a polyline onto the buffer using the tool's mode, width and opacity.
    /// Round caps and joins; a single point paints a dot.
    pub fn stroke(&mut self, points: &[Point], tool: &ToolConfig) {
        let alpha = tool.alpha();
        if alpha <= 0.0 {
            return;
        }
        let radius = tool.effective_width() / 2.0;
        let Some(mask) = CoverageMask::for_polyline(points, radius, self.width, self.height) else {
            return;
        };

        let mode = tool.composite_mode();
        for (x, y, coverage) in mask.covered() {
            let i = self.index(x, y);
            composite(&mut self.data[i..i + 4], mode, tool.color, coverage * alpha);
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

fn composite(px: &mut [u8], mode: CompositeMode, color: Rgb, src_a: f32) {
    match mode {
        CompositeMode::SourceOver => source_over(px, color, src_a),
        CompositeMode::DestinationOut => destination_out(px, src_a),
    }
}

fn source_over(px: &mut [u8], color: Rgb, src_a: f32) {
    let dst_a = f32::from(px[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= f32::EPSILON {
        px.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }
    let blend = |src: u8, dst: u8| {
        let c = (f32::from(src) * src_a + f32::from(dst) * dst_a * (1.0 - src_a)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    px[0] = blend(color.r, px[0]);
    px[1] = blend(color.g, px[1]);
    px[2] = blend(color.b, px[2]);
    px[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

fn destination_out(px: &mut [u8], src_a: f32) {
    let out_a = f32::from(px[3]) * (1.0 - src_a);
    px[3] = out_a.round().clamp(0.0, 255.0) as u8;
}

/// Coverage of a stroke that grows one segment at a time.
///
/// The mask spans the whole buffer and keeps the per-pixel maximum, so after
/// any number of segments the composited pixels match a one-shot
/// [`PixelBuffer::stroke`] of the same path. Each segment only re-composites
/// its own neighbourhood from the stroke's base buffer.
pub struct StrokeLayer {
    mask: CoverageMask,
    tool: ToolConfig,
    last: Point,
}

impl fmt::Debug for StrokeLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrokeLayer")
            .field("tool", &self.tool)
            .field("last", &self.last)
            .finish()
    }
}

impl StrokeLayer {
    /// Start at `at`, painting the initial dot onto `target`
    pub fn begin(at: Point, tool: ToolConfig, base: &PixelBuffer, target: &mut PixelBuffer) -> Self {
        let mut layer = Self {
            mask: CoverageMask::blank(base.width, base.height),
            tool,
            last: at,
        };
        layer.add_segment(at, at, base, target);
        layer
    }

    pub fn last(&self) -> Point {
        self.last
    }

    /// Extend to `to` and refresh the pixels the new segment touches
    pub fn extend(&mut self, to: Point, base: &PixelBuffer, target: &mut PixelBuffer) {
        let from = self.last;
        self.last = to;
        self.add_segment(from, to, base, target);
    }

    fn add_segment(&mut self, a: Point, b: Point, base: &PixelBuffer, target: &mut PixelBuffer) {
        let alpha = self.tool.alpha();
        if alpha <= 0.0 || base.data.len() != target.data.len() || base.width != self.mask.width {
            return;
        }
        let radius = self.tool.effective_width() / 2.0;
        let Some(region) = self.mask.add_segment(a, b, radius) else {
            return;
        };

        let mode = self.tool.composite_mode();
        for y in region.y0..region.y1 {
            for x in region.x0..region.x1 {
                let coverage = self.mask.values[(y * self.mask.width + x) as usize];
                if coverage <= 0.0 {
                    continue;
                }
                let i = target.index(x, y);
                let px = &mut target.data[i..i + 4];
                px.copy_from_slice(&base.data[i..i + 4]);
                composite(px, mode, self.tool.color, coverage * alpha);
            }
        }
    }
}

/// Pixel rectangle `[x0, x1) x [y0, y1)` in mask coordinates
struct Region {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

/// Anti-aliased stroke coverage over the clipped bounding box of a polyline.
/// Each pixel keeps the maximum coverage of any segment so joins do not double up.
struct CoverageMask {
    x0: u32,
    y0: u32,
    width: u32,
    values: Vec<f32>,
}

impl CoverageMask {
    /// Empty mask covering a whole `width` x `height` buffer
    fn blank(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            width,
            values: vec![0.0; width as usize * height as usize],
        }
    }

    fn for_polyline(points: &[Point], radius: f32, buf_w: u32, buf_h: u32) -> Option<Self> {
        let first = points.first()?;
        if buf_w == 0 || buf_h == 0 {
            return None;
        }

        let reach = radius + 1.0;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        let (x0, x1) = clip_span(min_x - reach, max_x + reach, buf_w)?;
        let (y0, y1) = clip_span(min_y - reach, max_y + reach, buf_h)?;
        let width = x1 - x0;
        let height = y1 - y0;

        let mut mask = Self {
            x0,
            y0,
            width,
            values: vec![0.0; width as usize * height as usize],
        };

        if points.len() == 1 {
            mask.add_segment(*first, *first, radius);
        } else {
            for pair in points.windows(2) {
                mask.add_segment(pair[0], pair[1], radius);
            }
        }
        Some(mask)
    }

    /// Raise coverage along `a`-`b`; returns the touched region
    fn add_segment(&mut self, a: Point, b: Point, radius: f32) -> Option<Region> {
        let reach = radius + 1.0;
        let height = self.values.len() as u32 / self.width.max(1);
        let local = |lo: f32, hi: f32, origin: u32, extent: u32| -> Option<(u32, u32)> {
            let start = (lo - origin as f32).floor().max(0.0) as u32;
            let end = ((hi - origin as f32).ceil().max(0.0) as u32).min(extent);
            (start < end).then_some((start, end))
        };
        let (sx, ex) = local(a.x.min(b.x) - reach, a.x.max(b.x) + reach, self.x0, self.width)?;
        let (sy, ey) = local(a.y.min(b.y) - reach, a.y.max(b.y) + reach, self.y0, height)?;

        for ly in sy..ey {
            for lx in sx..ex {
                let center = Point::new(
                    (self.x0 + lx) as f32 + 0.5,
                    (self.y0 + ly) as f32 + 0.5,
                );
                let coverage = (radius + 0.5 - distance_to_segment(center, a, b)).clamp(0.0, 1.0);
                let slot = &mut self.values[(ly * self.width + lx) as usize];
                if coverage > *slot {
                    *slot = coverage;
                }
            }
        }
        Some(Region { x0: sx, y0: sy, x1: ex, y1: ey })
    }

    /// Iterate (x, y, coverage) in buffer coordinates for covered pixels
    fn covered(&self) -> impl Iterator<Item = (u32, u32, f32)> + '_ {
        self.values.iter().enumerate().filter(|(_, c)| **c > 0.0).map(move |(i, c)| {
            let i = i as u32;
            (self.x0 + i % self.width, self.y0 + i / self.width, *c)
        })
    }
}

/// Clip the float span [lo, hi) to [0, extent) in whole pixels
fn clip_span(lo: f32, hi: f32, extent: u32) -> Option<(u32, u32)> {
    if hi <= 0.0 || lo >= extent as f32 {
        return None;
    }
    let start = lo.floor().max(0.0) as u32;
    let end = (hi.ceil() as u32).min(extent);
    (start < end).then_some((start, end))
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}
