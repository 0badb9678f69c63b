use std::cell::Cell;
use std::collections::BTreeMap;

use futures::future::{join_all, LocalBoxFuture};

use mapsheet_layout::{Element, ElementKind, PT_TO_MM};

use crate::assets::{self, AssetFetcher};
use crate::config::PrintConfig;
use crate::map::{CaptureError, MapAdapter};
use crate::pdf::{DrawOp, RasterImage, RectMm};
use crate::session::PrintRequest;
use crate::snapshot::snapshot_map;
use crate::timer::Timer;

/// Font size applied to labels whose element declares none.
const DEFAULT_LABEL_SIZE_PT: f64 = 12.0;

/// What the compositor produced for one session.
pub struct ComposeOutcome {
    /// Draw ops in element declaration order. Skipped elements emit
    /// nothing.
    pub ops: Vec<DrawOp>,
    /// How many elements reached their terminal loaded state. Always
    /// the full element count, even when a fatal capture error is
    /// present.
    pub completed: u32,
    /// Set when the map capture export failed; the session must not be
    /// saved.
    pub fatal: Option<CaptureError>,
}

enum Resolved {
    Drawn(DrawOp),
    Skipped,
    Fatal(CaptureError),
}

/// Drives every layout element to a terminal loaded state.
/// 將版面中的每個元件推進至載入完成的終止狀態。
///
/// Elements resolve in parallel and may complete in any order; the
/// only guarantee is that this returns once every element has counted
/// exactly once. Decorative fetch failures are absorbed; only the map
/// capture can be fatal.
pub async fn compose_elements(
    request: &PrintRequest,
    map: &mut dyn MapAdapter,
    fetcher: &dyn AssetFetcher,
    timer: &dyn Timer,
    config: &PrintConfig,
) -> ComposeOutcome {
    let elements = &request.layout.elements;
    let completed = Cell::new(0u32);
    let completed = &completed;
    let map_index = elements
        .iter()
        .rposition(|element| element.kind == ElementKind::Map);
    let mut map_slot = Some(map);

    let mut pending: Vec<LocalBoxFuture<'_, Resolved>> = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        let fut: LocalBoxFuture<'_, Resolved> = match &element.kind {
            ElementKind::Label => {
                let op = label_op(element, &request.labels);
                Box::pin(async move {
                    completed.set(completed.get() + 1);
                    match op {
                        Some(op) => Resolved::Drawn(op),
                        None => Resolved::Skipped,
                    }
                })
            }
            ElementKind::Map if Some(index) == map_index => match map_slot.take() {
                Some(map) => {
                    let resolution = request.resolution;
                    Box::pin(async move {
                        let result =
                            snapshot_map(map, element, resolution, timer, config).await;
                        completed.set(completed.get() + 1);
                        match result {
                            Ok(snapshot) => Resolved::Drawn(DrawOp::FramedImage {
                                rect: element_rect(element),
                                image: RasterImage::Jpeg {
                                    width_px: snapshot.frame.width_px,
                                    height_px: snapshot.frame.height_px,
                                    data: snapshot.frame.jpeg,
                                },
                            }),
                            Err(err) => Resolved::Fatal(err),
                        }
                    })
                }
                None => counted_skip(completed),
            },
            // Only the last map element is snapshotted; earlier ones
            // render nothing.
            ElementKind::Map => counted_skip(completed),
            // Unrecognized kinds are counted no-ops.
            ElementKind::Other(_) => counted_skip(completed),
            ElementKind::Picture
            | ElementKind::Legend
            | ElementKind::Shape
            | ElementKind::Arrow
            | ElementKind::Scalebar => {
                let url = if element.kind == ElementKind::Picture {
                    assets::picture_url(&config.thumbnail_base, element)
                } else {
                    Some(assets::element_asset_url(
                        &config.thumbnail_base,
                        &request.layout,
                        element,
                        request.resolution,
                    ))
                };
                match url {
                    Some(url) => Box::pin(async move {
                        let fetched = fetcher.fetch(&url).await;
                        completed.set(completed.get() + 1);
                        match fetched.and_then(|bytes| assets::decode_png(&bytes)) {
                            Ok(image) => Resolved::Drawn(DrawOp::Image {
                                rect: element_rect(element),
                                image,
                            }),
                            // A missing asset must not block the
                            // pipeline.
                            Err(_) => Resolved::Skipped,
                        }
                    }),
                    None => counted_skip(completed),
                }
            }
        };
        pending.push(fut);
    }

    let mut ops = Vec::new();
    let mut fatal = None;
    for resolved in join_all(pending).await {
        match resolved {
            Resolved::Drawn(op) => ops.push(op),
            Resolved::Skipped => {}
            Resolved::Fatal(err) => fatal = Some(err),
        }
    }

    ComposeOutcome {
        ops,
        completed: completed.get(),
        fatal,
    }
}

fn counted_skip<'a>(completed: &'a Cell<u32>) -> LocalBoxFuture<'a, Resolved> {
    Box::pin(async move {
        completed.set(completed.get() + 1);
        Resolved::Skipped
    })
}

fn element_rect(element: &Element) -> RectMm {
    RectMm {
        x_mm: element.x_mm,
        y_mm: element.y_mm,
        width_mm: element.width_mm,
        height_mm: element.height_mm,
    }
}

/// Text run for a label element, keyed by element name into the
/// user-entered fields. The baseline sits one font-size below the
/// element origin.
fn label_op(element: &Element, labels: &BTreeMap<String, String>) -> Option<DrawOp> {
    let name = element.name.as_deref()?;
    let text = labels.get(name)?;
    if text.is_empty() {
        return None;
    }
    let size_pt = element.font_size_pt.unwrap_or(DEFAULT_LABEL_SIZE_PT);
    Some(DrawOp::Text {
        x_mm: element.x_mm,
        y_mm: element.y_mm + size_pt * PT_TO_MM,
        size_pt,
        text: text.clone(),
    })
}
