//! Software compositor. The scene is drawn into an RGBA pixel buffer that
//! the GPU side only has to upload.

use glam::Vec2;
use image::RgbaImage;

use crate::assets::AssetStore;
use crate::geometry::Rect;
use crate::graph::{Content, SceneGraph};

pub type Color = [u8; 4];

const CLEAR: Color = [0, 0, 0, 255];
/// Sprites whose texture was registered without pixels.
const PLACEHOLDER: Color = [128, 128, 128, 255];
const LABEL_BACK: Color = [20, 20, 20, 200];
const LABEL_TEXT: Color = [255, 255, 255, 255];

/// 3x5 digit glyphs, one row per three bits, top row first.
const DIGITS: [u16; 10] = [
    0b111_101_101_101_111,
    0b010_110_010_010_111,
    0b111_001_111_100_111,
    0b111_001_111_001_111,
    0b101_101_111_001_001,
    0b111_100_111_001_111,
    0b111_100_111_101_111,
    0b111_001_001_001_001,
    0b111_101_111_101_111,
    0b111_101_111_001_111,
];

/// Pixel-space rectangle, y down, edges as floats so partial pixels can be
/// sampled at their centers.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Area {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

impl Area {
    fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tightly packed RGBA rows, top row first.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let i = ((y * self.width + x) * 4) as usize;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    pub fn clear(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Draws every visible node of `graph` in render order. `scale` is
    /// pixels per scene unit; scene y grows upwards, canvas y downwards.
    pub fn draw_scene(&mut self, graph: &SceneGraph, assets: &AssetStore, scale: f32) {
        self.clear(CLEAR);
        for id in graph.render_list() {
            let node = &graph[id];
            let area = self.to_pixels(graph.frame(id), scale);
            match &node.content {
                Content::Empty => {}
                Content::Sprite(texture) => match &assets.texture_info(*texture).pixels {
                    Some(image) => self.blit(area, image),
                    None => self.fill(area, PLACEHOLDER),
                },
                Content::Label(text) => {
                    self.fill(area, LABEL_BACK);
                    self.text(area, text);
                }
            }
        }
    }

    fn to_pixels(&self, frame: Rect, scale: f32) -> Area {
        let min = frame.min().min(frame.max()) * scale;
        let max = frame.min().max(frame.max()) * scale;
        let top = self.height as f32;
        Area {
            x0: min.x,
            y0: top - max.y,
            x1: max.x,
            y1: top - min.y,
        }
    }

    /// Pixels whose centers fall inside `area`, clipped to the canvas.
    fn covered(&self, area: Area) -> (std::ops::Range<u32>, std::ops::Range<u32>) {
        let clip = |lo: f32, hi: f32, limit: u32| {
            let start = (lo - 0.5).ceil().clamp(0.0, limit as f32) as u32;
            let end = (hi - 0.5).ceil().clamp(0.0, limit as f32) as u32;
            start..end.max(start)
        };
        (
            clip(area.x0, area.x1, self.width),
            clip(area.y0, area.y1, self.height),
        )
    }

    fn blend(&mut self, x: u32, y: u32, color: Color) {
        let alpha = color[3] as u32;
        if alpha == 0 {
            return;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let dst = &mut self.pixels[i..i + 4];
        for c in 0..3 {
            dst[c] = ((color[c] as u32 * alpha + dst[c] as u32 * (255 - alpha)) / 255) as u8;
        }
        dst[3] = (alpha + dst[3] as u32 * (255 - alpha) / 255) as u8;
    }

    fn fill(&mut self, area: Area, color: Color) {
        let (xs, ys) = self.covered(area);
        for y in ys {
            for x in xs.clone() {
                self.blend(x, y, color);
            }
        }
    }

    /// Nearest-neighbour scaled copy of `image` over `area`.
    fn blit(&mut self, area: Area, image: &RgbaImage) {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 || area.width() <= 0.0 || area.height() <= 0.0 {
            return;
        }
        let (xs, ys) = self.covered(area);
        for y in ys {
            let v = (y as f32 + 0.5 - area.y0) / area.height();
            let sy = ((v * h as f32) as u32).min(h - 1);
            for x in xs.clone() {
                let u = (x as f32 + 0.5 - area.x0) / area.width();
                let sx = ((u * w as f32) as u32).min(w - 1);
                self.blend(x, y, image.get_pixel(sx, sy).0);
            }
        }
    }

    /// Digits centered in `area`; anything else is skipped.
    fn text(&mut self, area: Area, text: &str) {
        let glyphs: Vec<u16> = text
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| DIGITS[d as usize])
            .collect();
        if glyphs.is_empty() {
            return;
        }
        // 3 columns plus one of spacing per glyph, 5 rows, one cell margin
        let columns = glyphs.len() as f32 * 4.0 - 1.0;
        let cell = (area.width() / (columns + 2.0)).min(area.height() / 7.0);
        if cell <= 0.0 {
            return;
        }
        let origin = Vec2::new(
            area.x0 + (area.width() - columns * cell) * 0.5,
            area.y0 + (area.height() - 5.0 * cell) * 0.5,
        );
        for (i, glyph) in glyphs.iter().enumerate() {
            for row in 0..5 {
                for col in 0..3 {
                    if glyph & (1 << (14 - row * 3 - col)) == 0 {
                        continue;
                    }
                    let x0 = origin.x + (i as f32 * 4.0 + col as f32) * cell;
                    let y0 = origin.y + row as f32 * cell;
                    self.fill(
                        Area {
                            x0,
                            y0,
                            x1: x0 + cell,
                            y1: y0 + cell,
                        },
                        LABEL_TEXT,
                    );
                }
            }
        }
    }
}
