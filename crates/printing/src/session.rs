use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use mapsheet_layout::{PageLayout, Resolution};

use crate::assets::AssetFetcher;
use crate::compose::compose_elements;
use crate::config::PrintConfig;
use crate::error::PrintError;
use crate::map::MapAdapter;
use crate::pdf::{PageComposer, PdfDocument};
use crate::timer::Timer;

/// Confirmed print parameters. Constructing one requires a chosen
/// resolution, so the "no resolution selected" precondition never
/// reaches the pipeline.
#[derive(Debug, Clone)]
pub struct PrintRequest {
    pub layout: PageLayout,
    pub resolution: Resolution,
    /// User-entered label texts keyed by label element name.
    pub labels: BTreeMap<String, String>,
}

/// Progress marker of one print session, for the host's UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Collecting,
    Compositing,
    Saved,
    Failed,
}

/// The finished document plus bookkeeping.
#[derive(Debug, Clone)]
pub struct PrintOutput {
    pub file_name: String,
    pub data: Vec<u8>,
    /// Elements that reached their terminal loaded state; equals the
    /// layout's element count on every saved session.
    pub completed: u32,
    pub state: SessionState,
}

impl PrintOutput {
    /// Writes the document into `dir` under its configured file name.
    pub fn save_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.data)?;
        Ok(path)
    }
}

/// Runs one print session end-to-end: composites every element, then
/// finalizes and returns the document exactly once.
/// 端到端執行一次列印工作階段：合成所有元件後，恰好一次完成並回傳文件。
///
/// Each invocation is a fresh session; nothing is shared between
/// calls, so repeated or interleaved sessions cannot corrupt each
/// other's counters. A capture export failure is the only fatal
/// outcome — the map is already restored by the time it propagates,
/// and no document is saved.
pub async fn run_print_session(
    request: &PrintRequest,
    map: &mut dyn MapAdapter,
    fetcher: &dyn AssetFetcher,
    timer: &dyn Timer,
    config: &PrintConfig,
) -> Result<PrintOutput, PrintError> {
    let outcome = compose_elements(request, map, fetcher, timer, config).await;
    debug_assert_eq!(outcome.completed as usize, request.layout.elements.len());

    if let Some(err) = outcome.fatal {
        return Err(PrintError::Capture(err));
    }

    let mut page = PageComposer::new(request.layout.width_mm, request.layout.height_mm);
    for op in outcome.ops {
        page.push(op);
    }
    let mut document = PdfDocument::new();
    document.add_page(page);

    Ok(PrintOutput {
        file_name: config.output_name.clone(),
        data: document.finish(),
        completed: outcome.completed,
        state: SessionState::Saved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::testing::TableFetcher;
    use crate::map::testing::MockMap;
    use crate::map::{Extent, PixelSize};
    use crate::timer::testing::{TestTimer, TimerMode};
    use futures::executor::block_on;
    use mapsheet_layout::{Element, ElementKind, ResolutionSet};

    fn two_element_layout() -> PageLayout {
        PageLayout {
            name: "A4 portrait".to_string(),
            thumbnail: None,
            width_mm: 210.0,
            height_mm: 297.0,
            elements: vec![
                Element {
                    id: 1,
                    kind: ElementKind::Map,
                    x_mm: 20.0,
                    y_mm: 40.0,
                    width_mm: 171.0,
                    height_mm: 167.0,
                    name: None,
                    font: None,
                    font_size_pt: None,
                    grid: None,
                },
                Element {
                    id: 2,
                    kind: ElementKind::Label,
                    x_mm: 20.0,
                    y_mm: 39.25,
                    width_mm: 100.0,
                    height_mm: 10.0,
                    name: Some("Title".to_string()),
                    font: Some("Helvetica".to_string()),
                    font_size_pt: Some(18.0),
                    grid: None,
                },
            ],
        }
    }

    fn make_request() -> PrintRequest {
        PrintRequest {
            layout: two_element_layout(),
            resolution: ResolutionSet::default().get(72).unwrap(),
            labels: [("Title".to_string(), "Harbour overview".to_string())]
                .into_iter()
                .collect(),
        }
    }

    fn mock_map() -> MockMap {
        MockMap::new(
            PixelSize::new(640, 480),
            Extent {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 1.0,
                max_y: 1.0,
            },
        )
    }

    #[test]
    fn end_to_end_two_element_session_saves_once() {
        let request = make_request();
        let mut map = mock_map();
        let fetcher = TableFetcher::default();
        let timer = TestTimer::new(TimerMode::Never);
        let config = PrintConfig::default();

        let output = block_on(run_print_session(
            &request, &mut map, &fetcher, &timer, &config,
        ))
        .unwrap();

        assert_eq!(output.state, SessionState::Saved);
        assert_eq!(output.completed, 2);
        assert_eq!(output.file_name, "map.pdf");
        assert!(output.data.starts_with(b"%PDF"));

        let text = String::from_utf8_lossy(&output.data);
        // One image draw and one text draw.
        assert_eq!(text.matches(" Do\n").count(), 1);
        assert_eq!(text.matches(" Tj\n").count(), 1);
        assert!(text.contains("(Harbour overview) Tj"));

        // Zero tiled layers: capture proceeded without consulting the
        // timer, and the map was restored.
        assert_eq!(timer.call_count(), 0);
        assert_eq!(map.current_size, PixelSize::new(640, 480));
    }

    #[test]
    fn capture_failure_fails_session_without_saving() {
        let request = make_request();
        let mut map = mock_map();
        map.capture_failure = Some("canvas is tainted".to_string());
        let fetcher = TableFetcher::default();
        let timer = TestTimer::new(TimerMode::Never);
        let config = PrintConfig::default();

        let err = block_on(run_print_session(
            &request, &mut map, &fetcher, &timer, &config,
        ))
        .unwrap_err();

        let PrintError::Capture(capture) = err;
        assert_eq!(capture.detail, "canvas is tainted");
        assert_eq!(map.current_size, PixelSize::new(640, 480));
    }

    #[test]
    fn sessions_are_independent() {
        let request = make_request();
        let fetcher = TableFetcher::default();
        let timer = TestTimer::new(TimerMode::Never);
        let config = PrintConfig::default();

        for _ in 0..2 {
            let mut map = mock_map();
            let output = block_on(run_print_session(
                &request, &mut map, &fetcher, &timer, &config,
            ))
            .unwrap();
            assert_eq!(output.completed, 2);
        }
    }

    #[test]
    fn save_to_writes_configured_file_name() {
        let request = make_request();
        let mut map = mock_map();
        let fetcher = TableFetcher::default();
        let timer = TestTimer::new(TimerMode::Never);
        let config = PrintConfig::default();

        let output = block_on(run_print_session(
            &request, &mut map, &fetcher, &timer, &config,
        ))
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = output.save_to(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "map.pdf");
        assert_eq!(std::fs::read(&path).unwrap(), output.data);
    }
}
