use thiserror::Error;

use crate::model::PageLayout;

/// Errors raised while loading externally supplied layout definitions.
#[derive(Debug, Error)]
pub enum LayoutConfigError {
    #[error("layout configuration is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("layout at index {index} has an empty name")]
    EmptyName { index: usize },
    #[error("layout '{name}' has a non-positive page size")]
    NonPositivePageSize { name: String },
    #[error("layout '{name}' element {element_id} has invalid geometry")]
    BadElementGeometry { name: String, element_id: u32 },
}

/// Parses and structurally validates an array of layout definitions.
/// 解析並逐項驗證外部提供的版面定義。
///
/// Validation happens once at the boundary; the pipeline assumes every
/// [`PageLayout`] it receives already passed through here.
pub fn load_layouts(json: &str) -> Result<Vec<PageLayout>, LayoutConfigError> {
    let layouts: Vec<PageLayout> = serde_json::from_str(json)?;
    for (index, layout) in layouts.iter().enumerate() {
        validate_layout(index, layout)?;
    }
    Ok(layouts)
}

fn validate_layout(index: usize, layout: &PageLayout) -> Result<(), LayoutConfigError> {
    if layout.name.trim().is_empty() {
        return Err(LayoutConfigError::EmptyName { index });
    }
    if !(layout.width_mm > 0.0 && layout.height_mm > 0.0)
        || !layout.width_mm.is_finite()
        || !layout.height_mm.is_finite()
    {
        return Err(LayoutConfigError::NonPositivePageSize {
            name: layout.name.clone(),
        });
    }
    for element in &layout.elements {
        let geometry = [
            element.x_mm,
            element.y_mm,
            element.width_mm,
            element.height_mm,
        ];
        if geometry.iter().any(|value| !value.is_finite())
            || element.width_mm < 0.0
            || element.height_mm < 0.0
        {
            return Err(LayoutConfigError::BadElementGeometry {
                name: layout.name.clone(),
                element_id: element.id,
            });
        }
    }
    Ok(())
}
