//! Application settings
//!
//! Stored as RON in the platform config directory. Missing or unreadable
//! settings fall back to defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::interaction::MagnifierSettings;

/// An overlay offered in the catalog panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display name
    pub name: String,
    /// Image file on disk
    pub path: PathBuf,
}

/// User-adjustable settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub magnifier: MagnifierSettings,
    /// Grab radius of a corner handle in pixels
    pub handle_radius: f32,
    /// Grid cells per side of the preview warp mesh
    pub mesh_subdivision: u32,
    /// Size of the rectangle a newly selected overlay is placed in
    pub default_overlay_size: (f64, f64),
    /// Extension proposed in the export dialog
    pub export_extension: String,
    /// Overlays listed in the side panel
    pub catalog: Vec<CatalogEntry>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            magnifier: MagnifierSettings::default(),
            handle_radius: 12.0,
            mesh_subdivision: 16,
            default_overlay_size: (200.0, 400.0),
            export_extension: "png".to_string(),
            catalog: Vec::new(),
        }
    }
}

impl Settings {
    /// `<config dir>/perspective-overlay/settings.ron`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("perspective-overlay").join("settings.ron"))
    }

    /// Load from a file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {:?}", path))?;
        let settings: Self = ron::from_str(&text)
            .with_context(|| format!("parsing settings in {:?}", path))?;
        log::info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save to a file, creating the parent directory
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, text)?;
        log::info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Settings from the default location, or defaults
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings: {:#}", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "perspective-overlay-settings-{}.ron",
            std::process::id()
        ));
        let mut settings = Settings::default();
        settings.magnifier.zoom = 4.0;
        settings.catalog.push(CatalogEntry {
            name: "Classic door".to_string(),
            path: PathBuf::from("doors/classic.png"),
        });

        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = ron::from_str("(handle_radius: 20.0)").unwrap();
        assert_eq!(settings.handle_radius, 20.0);
        assert_eq!(settings.magnifier, MagnifierSettings::default());
        assert_eq!(settings.mesh_subdivision, 16);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let path = std::env::temp_dir().join(format!(
            "perspective-overlay-bad-settings-{}.ron",
            std::process::id()
        ));
        std::fs::write(&path, "not ron at all {").unwrap();
        assert!(Settings::load(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
