use std::time::Duration;

use serde::Deserialize;

use mapsheet_layout::ResolutionSet;

/// Print pipeline settings supplied by the host application.
/// 主程式提供的列印管線設定。
///
/// The delay fields are heuristics covering sources that never report
/// activity and final tile paint flushing; they are not completion
/// signals.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    /// Base path under which the pre-rendered element assets live.
    pub thumbnail_base: String,
    /// DPI values the user may choose from.
    pub resolutions: ResolutionSet,
    /// File name of the saved document.
    pub output_name: String,
    /// Grace period before a tile source that never reported a
    /// load-start is force-settled.
    pub layer_grace_ms: u64,
    /// Delay between the last layer settling and the surface capture,
    /// allowing the final tile paint to flush.
    pub flush_delay_ms: u64,
    /// How long the capture-failure notification stays on screen.
    pub notice_duration_ms: u64,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            thumbnail_base: "thumbs".to_string(),
            resolutions: ResolutionSet::default(),
            output_name: "map.pdf".to_string(),
            layer_grace_ms: 1_000,
            flush_delay_ms: 1_000,
            notice_duration_ms: 5_000,
        }
    }
}

impl PrintConfig {
    pub fn layer_grace(&self) -> Duration {
        Duration::from_millis(self.layer_grace_ms)
    }

    pub fn flush_delay(&self) -> Duration {
        Duration::from_millis(self.flush_delay_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }
}
