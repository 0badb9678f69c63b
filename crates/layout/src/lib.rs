//! Print layout model shared by the compositing pipeline and host UI.

pub mod config;
pub mod model;
pub mod resolution;
pub mod units;

pub use config::{load_layouts, LayoutConfigError};
pub use model::{Element, ElementKind, Orientation, PageLayout};
pub use resolution::{Resolution, ResolutionSet};
pub use units::{mm_to_pt, mm_to_px, pt_to_mm, MM_PER_INCH, PT_PER_INCH, PT_TO_MM};
