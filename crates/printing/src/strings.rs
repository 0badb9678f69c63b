use std::collections::HashMap;
use std::time::Duration;

use once_cell::sync::Lazy;

/// English defaults; hosts install translated catalogs over these.
const DEFAULT_STRINGS: &[(&str, &str)] = &[
    ("dialog.title", "Print map"),
    ("dialog.layout", "Page layout"),
    ("dialog.resolution", "Resolution"),
    ("dialog.print", "Print"),
    ("dialog.progress", "Preparing document..."),
    (
        "print.error.capture",
        "Printing failed: the map image could not be exported ({0})",
    ),
];

static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(|| {
    let mut catalog = Catalog::empty();
    for (key, template) in DEFAULT_STRINGS {
        catalog.insert(*key, *template);
    }
    catalog
});

/// The built-in English catalog.
pub fn default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Key → template message catalog with `{0}`-style positional
/// substitution.
/// 以 `{0}` 位置參數代入的訊息字串目錄。
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A catalog pre-filled with the English defaults, ready for
    /// per-locale overrides.
    pub fn with_defaults() -> Self {
        default_catalog().clone()
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.entries.insert(key.into(), template.into());
    }

    /// Formats the template under `key`, replacing `{N}` placeholders
    /// with `params[N]`. Unknown keys fall back to the key itself so a
    /// missing translation never hides an error.
    pub fn format(&self, key: &str, params: &[&str]) -> String {
        let template = match self.entries.get(key) {
            Some(template) => template.as_str(),
            None => key,
        };
        let mut output = template.to_string();
        for (index, param) in params.iter().enumerate() {
            output = output.replace(&format!("{{{index}}}"), param);
        }
        output
    }
}

/// Transient, user-dismissible notification shown by the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    /// Fixed display duration before the host auto-dismisses.
    pub duration: Duration,
}
