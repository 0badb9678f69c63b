use thiserror::Error;

use crate::config::PrintConfig;
use crate::map::CaptureError;
use crate::strings::{Catalog, Notice};

/// Errors that abort a print session.
///
/// Only the map capture export can fail a session; decorative asset
/// and tile failures are absorbed upstream.
#[derive(Debug, Error)]
pub enum PrintError {
    #[error("map capture failed: {0}")]
    Capture(#[from] CaptureError),
}

impl PrintError {
    /// Builds the transient, user-dismissible notification for this
    /// failure, with the underlying detail substituted into the
    /// localized template.
    pub fn notice(&self, catalog: &Catalog, config: &PrintConfig) -> Notice {
        let PrintError::Capture(err) = self;
        Notice {
            message: catalog.format("print.error.capture", &[&err.detail]),
            duration: config.notice_duration(),
        }
    }
}
