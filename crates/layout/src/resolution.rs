use std::fmt;

use serde::Deserialize;

/// A raster resolution in dots per inch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct Resolution(u32);

impl Resolution {
    pub fn dpi(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dpi", self.0)
    }
}

/// The configured set of resolutions the user may choose from.
///
/// No member is pre-selected; choosing one is a precondition for
/// printing.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ResolutionSet(Vec<u32>);

impl ResolutionSet {
    pub fn new(allowed: Vec<u32>) -> Self {
        Self(allowed)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Resolution> + '_ {
        self.0.iter().map(|dpi| Resolution(*dpi))
    }

    /// Looks up an allowed resolution by DPI value.
    pub fn get(&self, dpi: u32) -> Option<Resolution> {
        self.0.contains(&dpi).then_some(Resolution(dpi))
    }
}

impl Default for ResolutionSet {
    fn default() -> Self {
        Self(vec![72, 150, 300])
    }
}
