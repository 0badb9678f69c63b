//! Print-to-PDF compositing pipeline for web map views.
//!
//! The pipeline composites the live map canvas, static element images
//! and label text into a PDF whose page matches a designer-authored
//! millimetre layout. The host supplies the map view, asset fetching
//! and delay scheduling through the [`map::MapAdapter`],
//! [`assets::AssetFetcher`] and [`timer::Timer`] traits.

pub mod assets;
pub mod compose;
pub mod config;
pub mod dialog;
pub mod error;
pub mod map;
pub mod pdf;
pub mod session;
pub mod snapshot;
pub mod strings;
pub mod tiles;
pub mod timer;

pub use assets::{element_asset_url, picture_url, sanitize_name, AssetFetcher, FetchError};
pub use compose::{compose_elements, ComposeOutcome};
pub use config::PrintConfig;
pub use dialog::PrintDialog;
pub use error::PrintError;
pub use map::{
    CaptureError, CapturedFrame, Extent, LayerId, MapAdapter, PixelSize, TileEvent, TileLayer,
};
pub use pdf::{DrawOp, PageComposer, PdfDocument, RasterImage, RectMm};
pub use session::{run_print_session, PrintOutput, PrintRequest, SessionState};
pub use snapshot::{snapshot_map, MapSnapshot};
pub use strings::{default_catalog, Catalog, Notice};
pub use tiles::{settle_all, settle_layer, SettleRecord};
pub use timer::Timer;
