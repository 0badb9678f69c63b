use futures::future::LocalBoxFuture;
use thiserror::Error;

use mapsheet_layout::{Element, PageLayout, Resolution};

use crate::pdf::RasterImage;

/// Failure to fetch or decode a decorative asset. Recoverable: the
/// element is skipped but still counted as loaded.
#[derive(Debug, Clone, Error)]
#[error("{detail}")]
pub struct FetchError {
    pub detail: String,
}

impl FetchError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Fetches element images by URL.
///
/// Implementations must issue cross-origin requests anonymously so the
/// surface they are drawn into stays untainted.
pub trait AssetFetcher {
    fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, FetchError>>;
}

/// Strips a layout name down to lower-cased alphanumerics for use in
/// asset filenames: `"Layout #1!"` becomes `"layout1"`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// URL of the pre-rendered asset for a legend, scale bar, shape or
/// arrow element: sanitized layout name, element id and resolution
/// under the configured thumbnail base.
pub fn element_asset_url(
    base: &str,
    layout: &PageLayout,
    element: &Element,
    resolution: Resolution,
) -> String {
    format!(
        "{}/{}{}_{}.png",
        base.trim_end_matches('/'),
        sanitize_name(&layout.name),
        element.id,
        resolution.dpi()
    )
}

/// URL of a picture element's fixed image file, under the same asset
/// base. `None` when the element names no file.
pub fn picture_url(base: &str, element: &Element) -> Option<String> {
    let file = element.name.as_deref()?.trim();
    if file.is_empty() {
        return None;
    }
    Some(format!("{}/{}", base.trim_end_matches('/'), file))
}

/// Decodes fetched PNG bytes into raw pixels for embedding.
pub fn decode_png(bytes: &[u8]) -> Result<RasterImage, FetchError> {
    let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map_err(|err| FetchError::new(err.to_string()))?;
    let rgb = decoded.to_rgb8();
    Ok(RasterImage::Rgb8 {
        width_px: rgb.width(),
        height_px: rgb.height(),
        data: rgb.into_raw(),
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use mapsheet_layout::{ElementKind, ResolutionSet};

    fn layout(name: &str) -> PageLayout {
        PageLayout {
            name: name.to_string(),
            thumbnail: None,
            width_mm: 210.0,
            height_mm: 297.0,
            elements: Vec::new(),
        }
    }

    fn element(id: u32, kind: ElementKind, name: Option<&str>) -> Element {
        Element {
            id,
            kind,
            x_mm: 0.0,
            y_mm: 0.0,
            width_mm: 10.0,
            height_mm: 10.0,
            name: name.map(str::to_string),
            font: None,
            font_size_pt: None,
            grid: None,
        }
    }

    #[test]
    fn sanitizes_layout_names() {
        assert_eq!(sanitize_name("Layout #1!"), "layout1");
        assert_eq!(sanitize_name("A4 portrait"), "a4portrait");
        assert_eq!(sanitize_name("---"), "");
    }

    #[test]
    fn synthesizes_element_asset_urls() {
        let resolution = ResolutionSet::default().get(150).unwrap();
        let url = element_asset_url(
            "thumbs/",
            &layout("Layout #1!"),
            &element(4, ElementKind::Legend, None),
            resolution,
        );
        assert_eq!(url, "thumbs/layout14_150.png");
    }

    #[test]
    fn picture_url_uses_fixed_filename() {
        let url = picture_url("thumbs", &element(2, ElementKind::Picture, Some("logo.png")));
        assert_eq!(url.as_deref(), Some("thumbs/logo.png"));
        assert!(picture_url("thumbs", &element(2, ElementKind::Picture, None)).is_none());
    }

    #[test]
    fn decodes_png_to_rgb8() {
        let bytes = testing::tiny_png(3, 2);
        match decode_png(&bytes).unwrap() {
            RasterImage::Rgb8 {
                width_px,
                height_px,
                data,
            } => {
                assert_eq!((width_px, height_px), (3, 2));
                assert_eq!(data.len(), 3 * 2 * 3);
            }
            other => panic!("unexpected raster: {other:?}"),
        }
    }

    #[test]
    fn decode_failure_is_reported() {
        assert!(decode_png(b"not a png").is_err());
    }
}
