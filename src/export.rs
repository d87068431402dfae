//! Rendering collaborators: PNG output and ASCII dumps.

use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use tracing::info;

use crate::classify::BLOCKED;
use crate::color::Color;
use crate::error::MapError;
use crate::generator::GeneratedMap;
use crate::gradient::ColorGradient;
use crate::tilemap::Tilemap;

/// Receives generated layers for display.
pub trait MapRenderer {
    /// Heights in [0, 1] shown as greyscale.
    fn draw_heights(&mut self, heights: &Tilemap<f32>) -> Result<(), MapError>;

    /// Row-major colour buffer (`y * width + x`).
    fn draw_colors(&mut self, colors: &[Color], width: usize, height: usize) -> Result<(), MapError>;

    /// 0 = blocked, 1 = passable.
    fn draw_blockage(&mut self, blockage: &Tilemap<u8>) -> Result<(), MapError>;

    /// Whichever layer the draw mode selects, as colours.
    fn draw_display(&mut self, colors: &[Color], width: usize, height: usize) -> Result<(), MapError> {
        self.draw_colors(colors, width, height)
    }
}

/// Push every layer of `map` to `renderer`.
pub fn render_map(map: &GeneratedMap, renderer: &mut impl MapRenderer) -> Result<(), MapError> {
    renderer.draw_heights(&map.heights)?;
    renderer.draw_colors(&map.colors, map.width(), map.height())?;
    renderer.draw_blockage(map.blockage())?;
    renderer.draw_display(&map.display_colors(), map.width(), map.height())
}

/// Writes each layer as a PNG into an output directory.
#[derive(Clone, Debug)]
pub struct PngRenderer {
    out_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl PngRenderer {
    pub const HEIGHTS_FILE: &'static str = "heights.png";
    pub const COLORS_FILE: &'static str = "colors.png";
    pub const BLOCKAGE_FILE: &'static str = "blockage.png";
    pub const DISPLAY_FILE: &'static str = "display.png";

    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self, MapError> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)?;
        Ok(Self {
            out_dir,
            written: Vec::new(),
        })
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn record(&mut self, path: PathBuf) {
        info!(path = %path.display(), "wrote image");
        self.written.push(path);
    }

    fn save_rgb(&mut self, img: RgbImage, name: &str) -> Result<(), MapError> {
        let path = self.out_dir.join(name);
        img.save(&path)?;
        self.record(path);
        Ok(())
    }
}

impl MapRenderer for PngRenderer {
    fn draw_heights(&mut self, heights: &Tilemap<f32>) -> Result<(), MapError> {
        let path = self.out_dir.join(Self::HEIGHTS_FILE);
        heights_image(heights).save(&path)?;
        self.record(path);
        Ok(())
    }

    fn draw_colors(&mut self, colors: &[Color], width: usize, height: usize) -> Result<(), MapError> {
        self.save_rgb(color_image(colors, width, height), Self::COLORS_FILE)
    }

    fn draw_blockage(&mut self, blockage: &Tilemap<u8>) -> Result<(), MapError> {
        self.save_rgb(blockage_image(blockage), Self::BLOCKAGE_FILE)
    }

    fn draw_display(&mut self, colors: &[Color], width: usize, height: usize) -> Result<(), MapError> {
        self.save_rgb(color_image(colors, width, height), Self::DISPLAY_FILE)
    }
}

/// Greyscale image of a height field, 0 = black, 1 = white.
pub fn heights_image(heights: &Tilemap<f32>) -> GrayImage {
    ImageBuffer::from_fn(heights.width as u32, heights.height as u32, |x, y| {
        let h = *heights.get(x as usize, y as usize);
        Luma([(h.clamp(0.0, 1.0) * 255.0).round() as u8])
    })
}

/// RGB image from a row-major colour buffer. Missing cells are black.
pub fn color_image(colors: &[Color], width: usize, height: usize) -> RgbImage {
    ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        let idx = y as usize * width + x as usize;
        Rgb(colors.get(idx).copied().unwrap_or(Color::BLACK).to_rgb8())
    })
}

/// Blocked cells black, passable cells white.
pub fn blockage_image(blockage: &Tilemap<u8>) -> RgbImage {
    ImageBuffer::from_fn(blockage.width as u32, blockage.height as u32, |x, y| {
        if *blockage.get(x as usize, y as usize) == BLOCKED {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

/// Orientation of a gradient preview strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StripOrientation {
    /// Time 0 at the bottom.
    Vertical,
    /// Time 0 on the left.
    Horizontal,
}

/// A `length` x `thickness` preview of the gradient.
pub fn gradient_strip_image(
    gradient: &ColorGradient,
    length: usize,
    thickness: usize,
    orientation: StripOrientation,
) -> RgbImage {
    let samples = gradient.sample_strip(length);
    let (w, h) = match orientation {
        StripOrientation::Vertical => (thickness, length),
        StripOrientation::Horizontal => (length, thickness),
    };
    ImageBuffer::from_fn(w as u32, h as u32, |x, y| {
        let i = match orientation {
            StripOrientation::Vertical => length - 1 - y as usize,
            StripOrientation::Horizontal => x as usize,
        };
        Rgb(samples[i].to_rgb8())
    })
}

pub fn save_gradient_strip(
    gradient: &ColorGradient,
    length: usize,
    orientation: StripOrientation,
    path: &Path,
) -> Result<(), MapError> {
    gradient_strip_image(gradient, length, 16, orientation).save(path)?;
    Ok(())
}

/// `#` for blocked cells and `.` for passable ones, one line per row.
pub fn blockage_ascii(blockage: &Tilemap<u8>) -> String {
    let mut out = String::with_capacity((blockage.width + 1) * blockage.height);
    for y in 0..blockage.height {
        for x in 0..blockage.width {
            out.push(if *blockage.get(x, y) == BLOCKED { '#' } else { '.' });
        }
        out.push('\n');
    }
    out
}
