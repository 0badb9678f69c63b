use std::collections::HashMap;

use mapsheet_layout::{mm_to_px, Element, Resolution};

use crate::config::PrintConfig;
use crate::map::{CaptureError, CapturedFrame, LayerId, MapAdapter, PixelSize};
use crate::tiles::{settle_all, SettleRecord};
use crate::timer::Timer;

/// Result of snapshotting the live map for one viewport element.
#[derive(Debug)]
pub struct MapSnapshot {
    pub frame: CapturedFrame,
    /// Settlement bookkeeping for the tiled layers that were awaited.
    /// Empty when the map had no visible tiled layers.
    pub tile_layers: HashMap<LayerId, SettleRecord>,
}

/// Captures the current map view at the pixel size the element and
/// resolution demand, without permanently altering map state.
/// 以元件與解析度換算出的像素尺寸拍攝地圖，且不永久改變地圖狀態。
///
/// The original size and extent are restored and a final render forced
/// on every path, including capture failure, before the result
/// propagates.
pub async fn snapshot_map(
    map: &mut dyn MapAdapter,
    element: &Element,
    resolution: Resolution,
    timer: &dyn Timer,
    config: &PrintConfig,
) -> Result<MapSnapshot, CaptureError> {
    let target = PixelSize::new(
        mm_to_px(element.width_mm, resolution.dpi()),
        mm_to_px(element.height_mm, resolution.dpi()),
    );
    let original_size = map.size();
    let original_extent = map.extent();

    map.set_size(target);
    map.fit_extent(original_extent);
    map.render_sync();

    // With no network-dependent content the capture can proceed
    // immediately; otherwise wait for every layer to settle, then give
    // the final tile paint time to flush to the surface.
    let layers = map.tile_layers();
    let tile_layers = if layers.is_empty() {
        HashMap::new()
    } else {
        let records = settle_all(&layers, timer, config.layer_grace()).await;
        timer.sleep(config.flush_delay()).await;
        records
    };

    let captured = map.capture();

    map.set_size(original_size);
    map.fit_extent(original_extent);
    map.render_sync();

    Ok(MapSnapshot {
        frame: captured?,
        tile_layers,
    })
}
