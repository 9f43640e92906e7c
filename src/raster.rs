use crate::error::IcoForgeError;
use crate::types::Color;
use image::ColorType;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Shader, Transform};

/// Raster-canvas capability consumed by the frame renderer.
///
/// The renderer takes a backend at construction instead of reaching for a
/// process-wide rasterizer handle, so the capability is explicit and tests
/// can substitute a recording implementation.
pub trait RasterBackend {
    type Canvas: RasterCanvas;

    /// Allocate a fully transparent square RGBA canvas, `size` pixels on
    /// edge.
    fn canvas(&self, size: u32) -> Result<Self::Canvas, IcoForgeError>;
}

pub trait RasterCanvas {
    /// Fill a simple polygon, given in pixel coordinates, with an opaque
    /// color. Fills land in call order; later fills occlude earlier ones.
    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Color);

    /// Encode the finished canvas as a compressed PNG payload.
    fn encode_png(self) -> Result<Vec<u8>, IcoForgeError>;
}

/// Production backend: tiny-skia pixmap fills, PNG payloads via the image
/// crate's encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkiaBackend;

impl RasterBackend for SkiaBackend {
    type Canvas = SkiaCanvas;

    fn canvas(&self, size: u32) -> Result<SkiaCanvas, IcoForgeError> {
        let pixmap = Pixmap::new(size, size)
            .ok_or_else(|| IcoForgeError::Raster(format!("invalid canvas size {size}x{size}")))?;
        Ok(SkiaCanvas { pixmap })
    }
}

pub struct SkiaCanvas {
    pixmap: Pixmap,
}

impl std::fmt::Debug for SkiaCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkiaCanvas")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

impl RasterCanvas for SkiaCanvas {
    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Color) {
        let Some((&(first_x, first_y), rest)) = points.split_first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(first_x, first_y);
        for &(px, py) in rest {
            pb.line_to(px, py);
        }
        pb.close();
        let Some(path) = pb.finish() else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &fill_paint(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn encode_png(self) -> Result<Vec<u8>, IcoForgeError> {
        let width = self.pixmap.width();
        let height = self.pixmap.height();
        let data = self.pixmap.take();
        let mut png = Vec::new();
        let encoder = PngEncoder::new(&mut png);
        encoder
            .write_image(&data, width, height, ColorType::Rgba8.into())
            .map_err(|e| IcoForgeError::Raster(format!("png encode failed: {e}")))?;
        Ok(png)
    }
}

// Hard-edged fills keep the output byte-stable across runs; anti-aliased
// coverage is a non-goal for favicon-scale artwork.
fn fill_paint(color: Color) -> Paint<'static> {
    let c = tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a);
    Paint {
        shader: Shader::SolidColor(c),
        anti_alias: false,
        ..Paint::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    #[test]
    fn canvas_starts_transparent_and_encodes_png() {
        let canvas = SkiaBackend.canvas(4).expect("canvas");
        assert!(canvas.pixmap.data().iter().all(|&b| b == 0));
        let png = canvas.encode_png().expect("encode");
        assert_eq!(&png[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn fill_covers_interior_pixels() {
        let mut canvas = SkiaBackend.canvas(8).expect("canvas");
        canvas.fill_polygon(
            &[(0.0, 0.0), (8.0, 0.0), (8.0, 8.0), (0.0, 8.0)],
            Color::rgb(255, 0, 170),
        );
        let pixel = canvas.pixmap.pixel(4, 4).expect("in bounds");
        assert_eq!(
            (pixel.red(), pixel.green(), pixel.blue(), pixel.alpha()),
            (255, 0, 170, 255)
        );
    }

    #[test]
    fn later_fill_occludes_earlier_fill() {
        let mut canvas = SkiaBackend.canvas(8).expect("canvas");
        canvas.fill_polygon(
            &[(0.0, 0.0), (8.0, 0.0), (8.0, 8.0), (0.0, 8.0)],
            Color::rgb(10, 20, 30),
        );
        canvas.fill_polygon(
            &[(0.0, 0.0), (8.0, 0.0), (8.0, 8.0), (0.0, 8.0)],
            Color::rgb(200, 100, 50),
        );
        let pixel = canvas.pixmap.pixel(4, 4).expect("in bounds");
        assert_eq!(
            (pixel.red(), pixel.green(), pixel.blue()),
            (200, 100, 50)
        );
    }

    #[test]
    fn degenerate_polygon_is_a_no_op() {
        let mut canvas = SkiaBackend.canvas(4).expect("canvas");
        canvas.fill_polygon(&[], Color::BLACK);
        canvas.fill_polygon(&[(1.0, 1.0), (2.0, 2.0)], Color::BLACK);
        assert!(canvas.pixmap.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn zero_size_canvas_is_rejected() {
        let err = SkiaBackend.canvas(0).unwrap_err();
        assert!(matches!(err, IcoForgeError::Raster(_)));
    }
}
