// SPDX-License-Identifier: MIT OR Apache-2.0
//! Preview settings.
//!
//! Read from `preview.ron` in the working directory when present:
//! - which graph document to load (built-in demo scene otherwise)
//! - which node to preview
//! - whether produced meshes are uploaded to the backend
//! - where texture paths are resolved

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "preview.ron";

/// Preview host settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Format version
    pub version: u32,
    /// Graph document to load
    pub graph: Option<PathBuf>,
    /// Node to preview, overriding the document's designated output
    pub output_node: Option<u64>,
    /// Run every node instead of only the output's dependencies
    pub execute_all: bool,
    /// Upload produced meshes before releasing them
    pub upload_meshes: bool,
    /// Root for relative texture paths
    pub texture_root: Option<PathBuf>,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            graph: None,
            output_node: None,
            execute_all: false,
            upload_meshes: true,
            texture_root: None,
        }
    }
}

impl PreviewSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Parse settings from RON
    pub fn from_ron(content: &str) -> std::io::Result<Self> {
        let settings: PreviewSettings = ron::from_str(content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        // Version check
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Settings version {} is newer than supported version {}",
                    settings.version, SETTINGS_FORMAT_VERSION
                ),
            ));
        }

        Ok(settings)
    }

    /// Load `preview.ron` from `dir`, falling back to defaults when absent
    pub fn load_or_default(dir: &Path) -> std::io::Result<Self> {
        let path = dir.join(SETTINGS_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_serialization() {
        let settings = PreviewSettings {
            graph: Some(PathBuf::from("graphs/tower.ron")),
            output_node: Some(4),
            ..Default::default()
        };
        let ron_str = ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::default()).unwrap();
        let loaded = PreviewSettings::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded = PreviewSettings::from_ron("(execute_all: true)").unwrap();
        assert!(loaded.execute_all);
        assert!(loaded.upload_meshes);
        assert!(loaded.graph.is_none());
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = PreviewSettings::from_ron("(version: 99)").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(PreviewSettings::load_or_default(dir.path()).unwrap(), PreviewSettings::default());

        let settings = PreviewSettings {
            upload_meshes: false,
            ..Default::default()
        };
        settings.save(&dir.path().join(SETTINGS_FILE_NAME)).unwrap();
        assert_eq!(PreviewSettings::load_or_default(dir.path()).unwrap(), settings);
    }
}
