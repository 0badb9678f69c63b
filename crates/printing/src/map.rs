use std::fmt;

use futures::stream::LocalBoxStream;
use thiserror::Error;

/// Map viewport size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Geographic extent currently shown by the map view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Stable identity of a tiled layer, used to key settlement records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// Tile load lifecycle event emitted by a tiled layer's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileEvent {
    LoadStart,
    LoadEnd,
    LoadError,
}

/// Encoded raster exported from the map's rendering surface.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub width_px: u32,
    pub height_px: u32,
    /// JPEG-encoded pixels, embedded into the PDF as-is.
    pub jpeg: Vec<u8>,
}

/// Failure to export the rendering surface, e.g. a canvas tainted by a
/// cross-origin tile. Fatal to the print session.
#[derive(Debug, Clone, Error)]
#[error("{detail}")]
pub struct CaptureError {
    pub detail: String,
}

impl CaptureError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// A map layer composed of discretely loaded image tiles.
/// 由獨立載入的圖磚構成的地圖圖層。
pub trait TileLayer {
    fn id(&self) -> LayerId;

    /// Stream of tile load events from the layer's source. The stream
    /// ending means the source can emit nothing further.
    fn events(&self) -> LocalBoxStream<'static, TileEvent>;
}

/// Abstraction over the live map view mutated during capture.
/// 拍攝快照期間會被就地調整的地圖檢視抽象介面。
///
/// The pipeline resizes the view, re-fits the extent, forces renders
/// and exports the surface through this trait; the host owns the
/// actual map widget. The view is a process-wide singleton from the
/// pipeline's perspective, which is why the dialog layer rejects
/// overlapping sessions.
pub trait MapAdapter {
    /// Current viewport size in device pixels.
    fn size(&self) -> PixelSize;

    /// Geographic extent visible at the current size.
    fn extent(&self) -> Extent;

    fn set_size(&mut self, size: PixelSize);

    /// Re-fits `extent` into the current viewport without constraining
    /// resolution, so the same geography is shown scaled.
    fn fit_extent(&mut self, extent: Extent);

    /// Forces a synchronous render pass.
    fn render_sync(&mut self);

    /// Exports the rendering surface as an encoded raster.
    fn capture(&mut self) -> Result<CapturedFrame, CaptureError>;

    /// The currently visible tiled layers. Non-tiled and hidden layers
    /// are not returned.
    fn tile_layers(&self) -> Vec<Box<dyn TileLayer>>;
}
