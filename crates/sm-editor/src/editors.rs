//! Registry of per-node-type editor panels.
//!
//! Sibling panels are handed an `&mut dyn EditorHost` when they are built and
//! register themselves through it; the session manager shows the one that
//! matches the current view node.

use sm_core::{GraphError, GraphFacade};
use std::path::PathBuf;

/// Internal event asking sibling panels to (re)request their editor.
pub const LOAD_UI_EVENT: &str = "session-manager-load-ui";

/// Opaque handle of a panel owned by the host toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelHandle(pub u64);

/// What the session manager offers to sibling editor panels.
pub trait EditorHost {
    /// Whether the hosting panel infrastructure exists yet.
    fn is_ready(&self) -> bool;

    /// Register `panel` under `label` for later display. Fails while the
    /// host is not ready.
    fn add_editor(&mut self, label: &str, panel: PanelHandle) -> Result<(), GraphError>;

    /// Show the panel registered as `label` and hide every other one.
    fn use_editor(&mut self, label: &str);

    /// Hide every panel and ask the siblings to request theirs again.
    fn reload_editor_tab(&mut self, graph: &mut dyn GraphFacade);

    /// Locate a bundled resource by file name.
    fn aux_file_path(&self, file_name: &str) -> Result<PathBuf, GraphError>;
}

#[derive(Debug, Clone)]
struct Entry {
    label: String,
    panel: PanelHandle,
    visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EditorRegistry {
    entries: Vec<Entry>,
    support_dir: Option<PathBuf>,
}

impl EditorRegistry {
    pub fn new(support_dir: Option<PathBuf>) -> Self {
        Self {
            entries: Vec::new(),
            support_dir,
        }
    }

    /// Register or replace the panel for `label`; it starts hidden.
    pub fn add(&mut self, label: &str, panel: PanelHandle) {
        match self.entries.iter_mut().find(|e| e.label == label) {
            Some(entry) => {
                entry.panel = panel;
                entry.visible = false;
            }
            None => self.entries.push(Entry {
                label: label.to_string(),
                panel,
                visible: false,
            }),
        }
        log::debug!("editor registered: {label}");
    }

    pub fn show(&mut self, label: &str) {
        for entry in &mut self.entries {
            entry.visible = entry.label == label;
        }
    }

    pub fn hide_all(&mut self) {
        for entry in &mut self.entries {
            entry.visible = false;
        }
    }

    /// Currently shown panel.
    pub fn visible(&self) -> Option<(&str, PanelHandle)> {
        self.entries
            .iter()
            .find(|e| e.visible)
            .map(|e| (e.label.as_str(), e.panel))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn resolve(&self, file_name: &str) -> Result<PathBuf, GraphError> {
        let dir = self
            .support_dir
            .as_deref()
            .ok_or_else(|| GraphError::Resource("no support directory".into()))?;
        let path = dir.join(file_name);
        if !path.exists() {
            return Err(GraphError::Resource(format!(
                "{} not found",
                path.display()
            )));
        }
        Ok(path)
    }
}
