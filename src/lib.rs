mod debug;
mod error;
mod ico;
mod raster;
mod render;
mod svg;
mod types;

pub use error::IcoForgeError;
pub use ico::{RasterFrame, encode_ico};
pub use raster::{RasterBackend, RasterCanvas, SkiaBackend, SkiaCanvas};
pub use render::{FitTransform, FrameRenderer};
pub use svg::{CompiledIcon, CompiledShape, compile_svg};
pub use types::{Color, Polygon};

use debug::DebugLogger;
use std::path::Path;
use std::sync::Arc;

/// Sizes browsers actually request: 16 and 32 everywhere, 48 on some
/// Windows surfaces.
pub const DEFAULT_SIZES: &[u32] = &[16, 32, 48];

/// Converts one SVG-subset document into a multi-size ICO container.
///
/// The document is compiled once; each configured size gets its own
/// rasterized frame, and the container serializes the frames in the
/// configured order. Generation is all-or-nothing: any grammar or dimension
/// error aborts before a single output byte exists.
pub struct IcoForge<B: RasterBackend = SkiaBackend> {
    sizes: Vec<u32>,
    renderer: FrameRenderer<B>,
    debug: Option<Arc<DebugLogger>>,
}

impl<B: RasterBackend> std::fmt::Debug for IcoForge<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IcoForge")
            .field("sizes", &self.sizes)
            .field("debug", &self.debug.is_some())
            .finish()
    }
}

pub struct IcoForgeBuilder {
    sizes: Vec<u32>,
    debug_path: Option<std::path::PathBuf>,
}

impl IcoForgeBuilder {
    pub fn new() -> Self {
        Self {
            sizes: DEFAULT_SIZES.to_vec(),
            debug_path: None,
        }
    }

    /// Output pixel sizes, one container frame each, in this order.
    pub fn sizes(mut self, sizes: &[u32]) -> Self {
        self.sizes = sizes.to_vec();
        self
    }

    /// Write a JSON-lines pipeline log to `path`.
    pub fn debug_log(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<IcoForge, IcoForgeError> {
        self.build_with_backend(SkiaBackend)
    }

    /// Build against a caller-supplied raster capability instead of the
    /// default tiny-skia backend.
    pub fn build_with_backend<B: RasterBackend>(
        self,
        backend: B,
    ) -> Result<IcoForge<B>, IcoForgeError> {
        if self.sizes.is_empty() {
            return Err(IcoForgeError::InvalidConfiguration(
                "at least one output size is required".to_string(),
            ));
        }
        if self.sizes.contains(&0) {
            return Err(IcoForgeError::InvalidConfiguration(
                "output size 0 is not representable".to_string(),
            ));
        }
        let debug = match self.debug_path {
            Some(path) => Some(Arc::new(DebugLogger::new(path)?)),
            None => None,
        };
        Ok(IcoForge {
            sizes: self.sizes,
            renderer: FrameRenderer::new(backend),
            debug,
        })
    }
}

impl Default for IcoForgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IcoForge {
    pub fn builder() -> IcoForgeBuilder {
        IcoForgeBuilder::new()
    }
}

impl<B: RasterBackend> IcoForge<B> {
    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    /// Compile the document once and rasterize every configured size, in
    /// order, into a single ICO blob.
    pub fn generate(&self, svg_xml: &str) -> Result<Vec<u8>, IcoForgeError> {
        let icon = self.compile(svg_xml)?;
        let mut frames = Vec::with_capacity(self.sizes.len());
        for &size in &self.sizes {
            frames.push(self.render_frame(&icon, size)?);
        }
        self.finish(frames)
    }

    /// Same bytes as [`generate`](Self::generate), with frames rasterized in
    /// parallel and collected back into the configured size order before
    /// encoding.
    pub fn generate_parallel(&self, svg_xml: &str) -> Result<Vec<u8>, IcoForgeError>
    where
        B: Sync,
    {
        use rayon::prelude::*;

        let icon = self.compile(svg_xml)?;
        let mut results: Vec<(usize, Result<RasterFrame, IcoForgeError>)> = self
            .sizes
            .par_iter()
            .enumerate()
            .map(|(idx, &size)| (idx, self.render_frame(&icon, size)))
            .collect();
        results.sort_by_key(|(idx, _)| *idx);

        let mut frames = Vec::with_capacity(results.len());
        for (_, res) in results {
            frames.push(res?);
        }
        self.finish(frames)
    }

    /// Invocation surface: read one source document, write the same ICO
    /// blob to every output path. The blob is built fully in memory first,
    /// so a failed run leaves pre-existing outputs untouched.
    pub fn generate_to_file(
        &self,
        svg_path: impl AsRef<Path>,
        outputs: &[impl AsRef<Path>],
    ) -> Result<(), IcoForgeError> {
        let svg_xml = std::fs::read_to_string(svg_path)?;
        let blob = self.generate(&svg_xml)?;
        for output in outputs {
            std::fs::write(output, &blob)?;
        }
        Ok(())
    }

    fn compile(&self, svg_xml: &str) -> Result<CompiledIcon, IcoForgeError> {
        let icon = compile_svg(svg_xml)?;
        if let Some(logger) = self.debug.as_deref() {
            logger.log_event(
                "compile",
                &[
                    format!("\"shapes\":{}", icon.shapes.len()),
                    format!("\"width\":{}", icon.width),
                    format!("\"height\":{}", icon.height),
                ],
            );
        }
        Ok(icon)
    }

    fn render_frame(&self, icon: &CompiledIcon, size: u32) -> Result<RasterFrame, IcoForgeError> {
        let frame = self.renderer.render(icon, size)?;
        if let Some(logger) = self.debug.as_deref() {
            logger.log_event(
                "frame",
                &[
                    format!("\"size\":{}", frame.size),
                    format!("\"bytes\":{}", frame.data.len()),
                ],
            );
            logger.increment("frames", 1);
        }
        Ok(frame)
    }

    fn finish(&self, frames: Vec<RasterFrame>) -> Result<Vec<u8>, IcoForgeError> {
        let blob = encode_ico(&frames);
        if let Some(logger) = self.debug.as_deref() {
            logger.increment("containers", 1);
            logger.emit_summary("generate");
            logger.flush();
        }
        Ok(blob)
    }
}
