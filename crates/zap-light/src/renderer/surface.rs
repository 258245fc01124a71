use glam::{Affine2, Vec2};

use crate::components::color::Rgba;
use super::blend::{composite, BlendMode};

/// Integer pixel rectangle, `x1`/`y1` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelRect {
    pub const EMPTY: Self = Self { x0: 0, y0: 0, x1: 0, y1: 0 };

    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest rect containing every pixel touched by `[min, max]`.
    pub fn enclosing(min: Vec2, max: Vec2) -> Self {
        Self {
            x0: min.x.floor() as i32,
            y0: min.y.floor() as i32,
            x1: max.x.ceil() as i32,
            y1: max.y.ceil() as i32,
        }
    }

    /// Rect enclosing a set of points.
    pub fn around(points: &[Vec2]) -> Self {
        let Some(first) = points.first() else {
            return Self::EMPTY;
        };
        let (min, max) = points
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Self::enclosing(min, max)
    }

    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }


    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }
}

/// A CPU raster surface of premultiplied RGBA pixels.
///
/// Stands in for a canvas: the compositing buffers, light masks and the
/// frame target are all surfaces.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Surface {
    /// Create a fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; (width as usize) * (height as usize)],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whole-surface rect.
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Reallocate to a new size. Contents are cleared.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize((width as usize) * (height as usize), Rgba::TRANSPARENT);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Pixel at `(x, y)`; transparent when out of bounds.
    pub fn pixel(&self, x: i32, y: i32) -> Rgba {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return Rgba::TRANSPARENT;
        }
        self.pixels[self.index(x, y)]
    }

    /// Raw pixel slice, row-major.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Composite a single pixel. Out-of-bounds writes are ignored.
    pub fn blend_pixel(&mut self, x: i32, y: i32, src: Rgba, mode: BlendMode) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = self.index(x, y);
        self.pixels[i] = composite(self.pixels[i], src, mode);
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    /// Reset the pixels inside `rect` to transparent.
    pub fn clear_rect(&mut self, rect: PixelRect) {
        self.fill_rect(rect, Rgba::TRANSPARENT, BlendMode::Copy);
    }

    /// Whether every pixel is fully transparent.
    pub fn is_clear(&self) -> bool {
        self.pixels.iter().all(|p| *p == Rgba::TRANSPARENT)
    }

    /// Composite a constant color over `rect`.
    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgba, mode: BlendMode) {
        let r = rect.intersect(&self.bounds());
        if r.is_empty() {
            return;
        }
        for y in r.y0..r.y1 {
            let row = self.index(r.x0, y);
            for px in &mut self.pixels[row..row + (r.x1 - r.x0) as usize] {
                *px = composite(*px, color, mode);
            }
        }
    }

    /// Composite a per-pixel color over `rect`. `shader` gets the pixel centre.
    pub fn fill_rect_with<F>(&mut self, rect: PixelRect, mode: BlendMode, mut shader: F)
    where
        F: FnMut(Vec2) -> Rgba,
    {
        let r = rect.intersect(&self.bounds());
        if r.is_empty() {
            return;
        }
        for y in r.y0..r.y1 {
            for x in r.x0..r.x1 {
                let src = shader(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                let i = self.index(x, y);
                self.pixels[i] = composite(self.pixels[i], src, mode);
            }
        }
    }

    /// Rasterise triangles (in pixel space) with a constant color.
    ///
    /// A pixel is covered when its centre lies inside or on the triangle.
    /// Either winding is accepted; degenerate triangles are skipped.
    pub fn fill_triangles(&mut self, triangles: &[[Vec2; 3]], color: Rgba, mode: BlendMode, clip: PixelRect) {
        let clip = clip.intersect(&self.bounds());
        for tri in triangles {
            let [a, b, c] = *tri;
            let area = (b - a).perp_dot(c - a);
            if area.abs() < 1e-9 {
                continue;
            }
            let r = PixelRect::around(tri).intersect(&clip);
            if r.is_empty() {
                continue;
            }
            let sign = area.signum();
            for y in r.y0..r.y1 {
                for x in r.x0..r.x1 {
                    let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let w0 = (b - a).perp_dot(p - a) * sign;
                    let w1 = (c - b).perp_dot(p - b) * sign;
                    let w2 = (a - c).perp_dot(p - c) * sign;
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let i = self.index(x, y);
                        self.pixels[i] = composite(self.pixels[i], color, mode);
                    }
                }
            }
        }
    }

    /// Draw `src` through `transform` (source pixel space -> destination pixel space).
    ///
    /// Nearest-neighbour sampling; `opacity` scales every source pixel.
    pub fn draw_surface(
        &mut self,
        src: &Surface,
        transform: Affine2,
        opacity: f32,
        mode: BlendMode,
        clip: PixelRect,
    ) {
        if src.width == 0 || src.height == 0 || opacity <= 0.0 {
            return;
        }
        let (sw, sh) = (src.width as f32, src.height as f32);
        let corners = [
            transform.transform_point2(Vec2::ZERO),
            transform.transform_point2(Vec2::new(sw, 0.0)),
            transform.transform_point2(Vec2::new(sw, sh)),
            transform.transform_point2(Vec2::new(0.0, sh)),
        ];
        let r = PixelRect::around(&corners)
            .intersect(&clip)
            .intersect(&self.bounds());
        if r.is_empty() {
            return;
        }
        let inverse = transform.inverse();
        for y in r.y0..r.y1 {
            for x in r.x0..r.x1 {
                let s = inverse.transform_point2(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if s.x < 0.0 || s.y < 0.0 || s.x >= sw || s.y >= sh {
                    continue;
                }
                let sp = src.pixels[src.index(s.x as i32, s.y as i32)];
                if sp.a <= 0.0 && !matches!(mode, BlendMode::Copy | BlendMode::KeepWhereOpaque) {
                    continue;
                }
                let i = self.index(x, y);
                self.pixels[i] = composite(self.pixels[i], sp.scale(opacity), mode);
            }
        }
    }

    /// Pixel-aligned composite of a same-sized surface, restricted to `rect`.
    pub fn composite_from(&mut self, src: &Surface, rect: PixelRect, mode: BlendMode) {
        let r = rect.intersect(&self.bounds()).intersect(&src.bounds());
        if r.is_empty() {
            return;
        }
        for y in r.y0..r.y1 {
            for x in r.x0..r.x1 {
                let i = self.index(x, y);
                let sp = src.pixels[src.index(x, y)];
                self.pixels[i] = composite(self.pixels[i], sp, mode);
            }
        }
    }

    /// Straight-alpha RGBA8 bytes, row-major (canvas `ImageData` layout).
    pub fn write_rgba8(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.pixels.len() * 4);
        for p in &self.pixels {
            let c = p.unpremultiply();
            out.extend_from_slice(&[
                (c.r.clamp(0.0, 1.0) * 255.0).round() as u8,
                (c.g.clamp(0.0, 1.0) * 255.0).round() as u8,
                (c.b.clamp(0.0, 1.0) * 255.0).round() as u8,
                (c.a.clamp(0.0, 1.0) * 255.0).round() as u8,
            ]);
        }
    }
}
