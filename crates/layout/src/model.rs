use std::fmt;

use serde::de::{Deserializer, Error as _};
use serde::Deserialize;

/// Page orientation derived from the layout's dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Kind of a positioned layout element.
///
/// Unknown kind strings deserialize to [`ElementKind::Other`] so that
/// layouts authored against a newer designer remain loadable; the
/// compositor treats such elements as counted no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Map,
    Label,
    Legend,
    Picture,
    Shape,
    Arrow,
    Scalebar,
    Other(String),
}

impl ElementKind {
    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::Map => "map",
            ElementKind::Label => "label",
            ElementKind::Legend => "legend",
            ElementKind::Picture => "picture",
            ElementKind::Shape => "shape",
            ElementKind::Arrow => "arrow",
            ElementKind::Scalebar => "scalebar",
            ElementKind::Other(other) => other,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Err(D::Error::custom("element type must not be empty"));
        }
        Ok(match raw.as_str() {
            "map" => ElementKind::Map,
            "label" => ElementKind::Label,
            "legend" => ElementKind::Legend,
            "picture" => ElementKind::Picture,
            "shape" => ElementKind::Shape,
            "arrow" => ElementKind::Arrow,
            "scalebar" => ElementKind::Scalebar,
            _ => ElementKind::Other(raw),
        })
    }
}

/// One positioned unit within a layout. Geometry is millimetres in
/// page coordinate space, origin top-left.
/// 版面中的單一定位元件，座標以公釐表示，原點在左上角。
#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(rename = "x")]
    pub x_mm: f64,
    #[serde(rename = "y")]
    pub y_mm: f64,
    #[serde(rename = "width")]
    pub width_mm: f64,
    #[serde(rename = "height")]
    pub height_mm: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub font: Option<String>,
    #[serde(rename = "size", default)]
    pub font_size_pt: Option<f64>,
    #[serde(default)]
    pub grid: Option<bool>,
}

/// Designer-authored page template with positioned elements.
/// 設計者編排的頁面樣板，內含各個定位元件。
///
/// Identity is `name`; it feeds the asset filenames built for the
/// decorative elements.
#[derive(Debug, Clone, Deserialize)]
pub struct PageLayout {
    pub name: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(rename = "width")]
    pub width_mm: f64,
    #[serde(rename = "height")]
    pub height_mm: f64,
    pub elements: Vec<Element>,
}

impl PageLayout {
    /// Landscape iff the page is wider than tall.
    pub fn orientation(&self) -> Orientation {
        if self.width_mm > self.height_mm {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// The map viewport element to snapshot.
    ///
    /// Layouts are expected to carry exactly one `map` element. When a
    /// layout carries several, only the last one is snapshotted — the
    /// earlier ones render nothing. Known limitation carried over from
    /// the original designer contract.
    pub fn map_element(&self) -> Option<&Element> {
        self.elements
            .iter()
            .rev()
            .find(|element| element.kind == ElementKind::Map)
    }

    /// Label elements in declaration order, for building the dialog's
    /// text fields.
    pub fn label_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements
            .iter()
            .filter(|element| element.kind == ElementKind::Label)
    }
}
