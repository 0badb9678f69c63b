use std::collections::BTreeMap;

use mapsheet_layout::{PageLayout, Resolution, ResolutionSet};

use crate::session::PrintRequest;
use crate::strings::Notice;

/// State behind the print dialog: layout choice, resolution choice,
/// label text fields, busy indicator and the error notification.
///
/// This is pure state — the host renders it with whatever widget
/// toolkit it uses. No resolution is pre-selected; `submit` yields
/// nothing until one is chosen, which makes the "printing silently
/// does nothing" precondition structural. The busy flag rejects
/// overlapping sessions: the live map is a singleton and must not be
/// mutated by two captures at once.
#[derive(Debug, Clone)]
pub struct PrintDialog {
    layouts: Vec<PageLayout>,
    resolutions: ResolutionSet,
    selected_layout: usize,
    selected_resolution: Option<Resolution>,
    labels: BTreeMap<String, String>,
    busy: bool,
    notice: Option<Notice>,
}

impl PrintDialog {
    pub fn new(layouts: Vec<PageLayout>, resolutions: ResolutionSet) -> Self {
        let mut dialog = Self {
            layouts,
            resolutions,
            selected_layout: 0,
            selected_resolution: None,
            labels: BTreeMap::new(),
            busy: false,
            notice: None,
        };
        dialog.reset_labels();
        dialog
    }

    pub fn layouts(&self) -> &[PageLayout] {
        &self.layouts
    }

    pub fn selected_layout(&self) -> Option<&PageLayout> {
        self.layouts.get(self.selected_layout)
    }

    /// Switches the page layout and rebuilds the label fields from the
    /// new layout's label elements. Out-of-range indices are ignored.
    pub fn select_layout(&mut self, index: usize) {
        if index < self.layouts.len() {
            self.selected_layout = index;
            self.reset_labels();
        }
    }

    pub fn resolutions(&self) -> &ResolutionSet {
        &self.resolutions
    }

    pub fn selected_resolution(&self) -> Option<Resolution> {
        self.selected_resolution
    }

    /// Chooses a resolution from the allowed set. Returns false (and
    /// changes nothing) for values outside the set.
    pub fn select_resolution(&mut self, dpi: u32) -> bool {
        match self.resolutions.get(dpi) {
            Some(resolution) => {
                self.selected_resolution = Some(resolution);
                true
            }
            None => false,
        }
    }

    /// Names of the label text fields for the chosen layout.
    pub fn label_fields(&self) -> Vec<&str> {
        self.labels.keys().map(String::as_str).collect()
    }

    /// Stores user-entered text for a label field. Unknown field names
    /// are ignored.
    pub fn set_label(&mut self, name: &str, text: impl Into<String>) {
        if let Some(entry) = self.labels.get_mut(name) {
            *entry = text.into();
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn can_submit(&self) -> bool {
        !self.busy && self.selected_resolution.is_some() && !self.layouts.is_empty()
    }

    /// Confirms the collected parameters. `None` while no resolution
    /// is chosen or a session is still running.
    pub fn submit(&mut self) -> Option<PrintRequest> {
        if !self.can_submit() {
            return None;
        }
        let layout = self.selected_layout()?.clone();
        let resolution = self.selected_resolution?;
        self.busy = true;
        self.notice = None;
        Some(PrintRequest {
            layout,
            resolution,
            labels: self.labels.clone(),
        })
    }

    /// Reports the session outcome back: clears the busy indicator and
    /// installs the error notification, if any.
    pub fn finish(&mut self, notice: Option<Notice>) {
        self.busy = false;
        self.notice = notice;
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn reset_labels(&mut self) {
        self.labels = match self.selected_layout() {
            Some(layout) => layout
                .label_elements()
                .filter_map(|element| element.name.clone())
                .map(|name| (name, String::new()))
                .collect(),
            None => BTreeMap::new(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use mapsheet_layout::{Element, ElementKind};

    fn label(id: u32, name: &str) -> Element {
        Element {
            id,
            kind: ElementKind::Label,
            x_mm: 0.0,
            y_mm: 0.0,
            width_mm: 50.0,
            height_mm: 10.0,
            name: Some(name.to_string()),
            font: None,
            font_size_pt: Some(12.0),
            grid: None,
        }
    }

    fn layout(name: &str, labels: &[&str]) -> PageLayout {
        PageLayout {
            name: name.to_string(),
            thumbnail: None,
            width_mm: 210.0,
            height_mm: 297.0,
            elements: labels
                .iter()
                .enumerate()
                .map(|(index, label_name)| label(index as u32 + 1, label_name))
                .collect(),
        }
    }

    fn dialog() -> PrintDialog {
        PrintDialog::new(
            vec![
                layout("A4", &["Title", "Author"]),
                layout("A3", &["Caption"]),
            ],
            ResolutionSet::default(),
        )
    }

    #[test]
    fn submit_requires_a_chosen_resolution() {
        let mut dialog = dialog();
        assert!(!dialog.can_submit());
        assert!(dialog.submit().is_none());

        assert!(!dialog.select_resolution(96));
        assert!(dialog.select_resolution(150));
        let request = dialog.submit().expect("submittable");
        assert_eq!(request.resolution.dpi(), 150);
        assert_eq!(request.layout.name, "A4");
    }

    #[test]
    fn busy_dialog_rejects_reentry() {
        let mut dialog = dialog();
        dialog.select_resolution(72);
        assert!(dialog.submit().is_some());
        assert!(dialog.is_busy());
        assert!(dialog.submit().is_none());

        dialog.finish(None);
        assert!(!dialog.is_busy());
        assert!(dialog.submit().is_some());
    }

    #[test]
    fn label_fields_follow_the_selected_layout() {
        let mut dialog = dialog();
        assert_eq!(dialog.label_fields(), vec!["Author", "Title"]);

        dialog.set_label("Title", "Harbour overview");
        dialog.set_label("Nonexistent", "ignored");
        dialog.select_resolution(72);
        let request = dialog.submit().unwrap();
        assert_eq!(
            request.labels.get("Title").map(String::as_str),
            Some("Harbour overview")
        );
        assert!(!request.labels.contains_key("Nonexistent"));
    }

    #[test]
    fn switching_layouts_resets_label_fields() {
        let mut dialog = dialog();
        dialog.set_label("Title", "text");
        dialog.select_layout(1);
        assert_eq!(dialog.label_fields(), vec!["Caption"]);
        dialog.select_layout(99);
        assert_eq!(dialog.selected_layout().unwrap().name, "A3");
    }

    #[test]
    fn finish_with_notice_surfaces_error_until_dismissed() {
        let mut dialog = dialog();
        dialog.select_resolution(72);
        dialog.submit().unwrap();

        let notice = Notice {
            message: "Printing failed: the map image could not be exported (tainted)".to_string(),
            duration: Duration::from_secs(5),
        };
        dialog.finish(Some(notice.clone()));
        assert_eq!(dialog.notice(), Some(&notice));

        dialog.dismiss_notice();
        assert!(dialog.notice().is_none());
    }
}
