//! Dashboard documents on disk.

use std::path::{Path, PathBuf};

use gridboard_layout::{DashboardDocument, EngineConfig, LayoutEngine};
use serde_json::Value;

use crate::error::{CliError, Result};

/// An engine loaded from a document file, plus the companion data that rides
/// along with it.
#[derive(Debug)]
pub struct StoredDashboard {
    pub path: PathBuf,
    pub engine: LayoutEngine,
    pub shared: Option<Value>,
}

impl StoredDashboard {
    /// Load `path`. The document's own view mode and density win over the
    /// profile. Damaged widget entries are repaired; a bad header is an error.
    pub fn open(path: &Path, config: EngineConfig) -> Result<Self> {
        let content = read_existing(path)?;
        let document = DashboardDocument::from_json(&content)?;
        let shared = document.shared.clone();
        let mut engine = LayoutEngine::new(config.mobile_layout(document.is_mobile_layout));
        engine.load_document(document)?;
        gridboard_core::debug!(
            path = %path.display(),
            widgets = engine.widgets().len(),
            "dashboard loaded"
        );
        Ok(Self {
            path: path.to_path_buf(),
            engine,
            shared,
        })
    }

    /// Load `path` if it exists, otherwise start an empty dashboard there.
    pub fn open_or_empty(path: &Path, config: EngineConfig) -> Result<Self> {
        if path.exists() {
            return Self::open(path, config);
        }
        Ok(Self {
            path: path.to_path_buf(),
            engine: LayoutEngine::new(config),
            shared: None,
        })
    }

    pub fn save(&self) -> Result<()> {
        write_document(&self.path, &self.engine, self.shared.clone())
    }
}

pub fn read_existing(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CliError::MissingPath {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

pub fn write_document(path: &Path, engine: &LayoutEngine, shared: Option<Value>) -> Result<()> {
    let mut json = engine.export_json(shared)?;
    json.push('\n');
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    gridboard_core::debug!(path = %path.display(), "dashboard written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use gridboard_layout::{EngineConfig, LayoutEngine};
    use serde_json::json;

    use super::*;

    #[test]
    fn saved_dashboard_reopens_with_companion_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/board.json");
        let engine = LayoutEngine::with_default_layout(EngineConfig::default());
        write_document(&path, &engine, Some(json!({"notes": ["a"]}))).unwrap();

        let stored = StoredDashboard::open(&path, EngineConfig::default()).unwrap();
        assert_eq!(stored.engine.widgets(), engine.widgets());
        assert_eq!(stored.shared, Some(json!({"notes": ["a"]})));
    }

    #[test]
    fn document_view_mode_overrides_the_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phone.json");
        let mobile = EngineConfig::default().viewport(390.0, 840.0).mobile_layout(true);
        write_document(&path, &LayoutEngine::with_default_layout(mobile), None).unwrap();

        let stored = StoredDashboard::open(&path, EngineConfig::default()).unwrap();
        assert!(stored.engine.is_mobile_layout());
    }

    #[test]
    fn missing_file_is_reported_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            StoredDashboard::open(&path, EngineConfig::default()),
            Err(CliError::MissingPath { .. })
        ));
        let empty = StoredDashboard::open_or_empty(&path, EngineConfig::default()).unwrap();
        assert!(empty.engine.widgets().is_empty());
    }
}
