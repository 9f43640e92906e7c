use crate::error::IcoForgeError;
use crate::ico::RasterFrame;
use crate::raster::{RasterBackend, RasterCanvas};
use crate::svg::CompiledIcon;
use crate::types::Polygon;

/// Uniform fit of the logical canvas into a square pixel frame: the smaller
/// per-axis scale wins so the artwork never distorts, and the leftover space
/// centers it on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    pub scale: f32,
    pub x_offset: f32,
    pub y_offset: f32,
}

impl FitTransform {
    pub fn new(
        logical_width: f32,
        logical_height: f32,
        size: u32,
    ) -> Result<Self, IcoForgeError> {
        if logical_width <= 0.0 || logical_height <= 0.0 || size == 0 {
            return Err(IcoForgeError::InvalidDimensions);
        }
        let s = size as f32;
        let scale = (s / logical_width).min(s / logical_height);
        Ok(Self {
            scale,
            x_offset: (s - logical_width * scale) / 2.0,
            y_offset: (s - logical_height * scale) / 2.0,
        })
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.x_offset + x * self.scale,
            self.y_offset + y * self.scale,
        )
    }
}

/// Rasterizes one compiled document at one pixel size per call. The raster
/// capability is an explicit constructor argument, never ambient state.
pub struct FrameRenderer<B: RasterBackend> {
    backend: B,
}

impl<B: RasterBackend> FrameRenderer<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Produce one PNG frame at `size` pixels. Shapes fill in document
    /// order; polygons without enclosable area never reach the backend.
    pub fn render(
        &self,
        icon: &CompiledIcon,
        size: u32,
    ) -> Result<RasterFrame, IcoForgeError> {
        let fit = FitTransform::new(icon.width, icon.height, size)?;
        let mut canvas = self.backend.canvas(size)?;
        for shape in &icon.shapes {
            for polygon in &shape.polygons {
                if !fillable(polygon) {
                    continue;
                }
                let points: Vec<(f32, f32)> = polygon
                    .iter()
                    .map(|&(px, py)| fit.apply(px, py))
                    .collect();
                canvas.fill_polygon(&points, shape.fill);
            }
        }
        let data = canvas.encode_png()?;
        Ok(RasterFrame { size, data })
    }
}

// A closed subpath repeats its first point; three distinct vertices are
// still required to enclose any area.
fn fillable(polygon: &Polygon) -> bool {
    let mut vertices = polygon.len();
    if vertices > 1 && polygon[vertices - 1] == polygon[0] {
        vertices -= 1;
    }
    vertices >= 3
}
