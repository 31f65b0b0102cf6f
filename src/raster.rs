//! SVG rasterization
//!
//! Renders cached vector images into fixed-format bitmaps scaled to a
//! requested width, keeping the image's intrinsic aspect ratio.

use resvg::tiny_skia::{Color, IntSize, Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use serde::{Deserialize, Serialize};

use crate::marketplace::AssetError;

/// Side length of the placeholder bitmap
pub const PLACEHOLDER_SIZE: u32 = 5;

/// Largest width or height a rendered bitmap may have
pub const MAX_BITMAP_DIMENSION: u32 = 8192;

/// Pixel layout of a bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PixelFormat {
    /// 4 bytes per pixel, red first
    Rgba8888,
    /// 1 byte per pixel, coverage only
    Alpha8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8888 => 4,
            PixelFormat::Alpha8 => 1,
        }
    }
}

/// A decoded bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Row-major pixel bytes, no padding
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// The blank bitmap returned when an asset cannot be rendered
    pub fn placeholder() -> Self {
        let side = PLACEHOLDER_SIZE as usize;
        Self {
            width: PLACEHOLDER_SIZE,
            height: PLACEHOLDER_SIZE,
            format: PixelFormat::Alpha8,
            pixels: vec![0; side * side],
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.format == PixelFormat::Alpha8
            && self.width == PLACEHOLDER_SIZE
            && self.height == PLACEHOLDER_SIZE
    }

    /// RGBA value of a pixel (alpha-only bitmaps report black with that alpha)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let offset = (y as usize * self.width as usize + x as usize) * bpp;
        match self.format {
            PixelFormat::Rgba8888 => {
                let p = self.pixels.get(offset..offset + 4)?;
                Some([p[0], p[1], p[2], p[3]])
            }
            PixelFormat::Alpha8 => Some([0, 0, 0, *self.pixels.get(offset)?]),
        }
    }

    /// Encode as PNG
    pub fn to_png(&self) -> Result<Vec<u8>, AssetError> {
        let size = IntSize::from_wh(self.width, self.height)
            .ok_or_else(|| AssetError::Render("Bitmap has zero size".to_string()))?;

        let rgba = match self.format {
            PixelFormat::Rgba8888 => self.pixels.clone(),
            PixelFormat::Alpha8 => self
                .pixels
                .iter()
                .flat_map(|&a| [0, 0, 0, a])
                .collect(),
        };

        let pixmap = Pixmap::from_vec(rgba, size)
            .ok_or_else(|| AssetError::Render("Pixel buffer does not match bitmap size".to_string()))?;
        pixmap
            .encode_png()
            .map_err(|e| AssetError::Render(e.to_string()))
    }
}

/// Height that keeps `aspect_ratio` (width / height) at `target_width`
pub fn target_height(aspect_ratio: f32, target_width: u32) -> u32 {
    if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
        return target_width.max(1);
    }
    ((target_width as f32 / aspect_ratio).round() as u32).max(1)
}

/// Render SVG document bytes into an RGBA bitmap `target_width` pixels wide
///
/// The background is filled white before the image is drawn.
pub fn rasterize_svg(data: &[u8], target_width: u32) -> Result<Bitmap, AssetError> {
    if target_width == 0 {
        return Err(AssetError::Render("Target width must be positive".to_string()));
    }

    let tree = Tree::from_data(data, &Options::default())
        .map_err(|e| AssetError::Render(format!("Invalid SVG: {}", e)))?;

    let size = tree.size();
    let aspect_ratio = size.width() / size.height();
    let width = target_width;
    let height = target_height(aspect_ratio, width);
    if width > MAX_BITMAP_DIMENSION || height > MAX_BITMAP_DIMENSION {
        return Err(AssetError::Render(format!(
            "Bitmap {}x{} exceeds the {} pixel limit",
            width, height, MAX_BITMAP_DIMENSION
        )));
    }

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| AssetError::Render(format!("Cannot allocate {}x{} bitmap", width, height)))?;
    pixmap.fill(Color::WHITE);

    let transform = Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Ok(Bitmap {
        width,
        height,
        format: PixelFormat::Rgba8888,
        pixels: pixmap.take(),
    })
}
