//! Saved overlay placement
//!
//! Records which images were used and where the corners sit. Corners are kept
//! in background image pixels so a placement survives a different window size.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::warp::{Point, Quad, WarpError};

/// A placement that can be saved and reopened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Version string
    pub version: String,
    pub background: Option<PathBuf>,
    pub overlay: Option<PathBuf>,
    /// Background image size the corners refer to
    pub image_size: Point,
    /// Corners in background image pixels
    pub corners: Quad,
}

impl Placement {
    pub fn new(
        background: Option<PathBuf>,
        overlay: Option<PathBuf>,
        image_size: Point,
        corners: Quad,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            background,
            overlay,
            image_size,
            corners,
        }
    }

    /// Corners mapped into a container of `container_size`
    pub fn corners_in_container(&self, container_size: Point) -> Result<Quad, WarpError> {
        self.corners.scaled(
            container_size.x / self.image_size.x,
            container_size.y / self.image_size.y,
        )
    }

    /// Save to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Saved placement to {:?}", path);
        Ok(())
    }

    /// Load from a file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let placement: Self = serde_json::from_str(&json)?;
        if placement.image_size.x <= 0.0 || placement.image_size.y <= 0.0 {
            anyhow::bail!("placement {:?} has an empty image size", path);
        }
        log::info!("Loaded placement from {:?}", path);
        Ok(placement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warp::Corner;

    fn sample() -> Placement {
        Placement::new(
            Some(PathBuf::from("facade.jpg")),
            Some(PathBuf::from("door.png")),
            Point::new(1600.0, 1200.0),
            Quad::from_rect(Point::new(300.0, 300.0), Point::new(400.0, 800.0)),
        )
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "perspective-overlay-placement-{}.json",
            std::process::id()
        ));
        let placement = sample();
        placement.save(&path).unwrap();
        assert_eq!(Placement::load(&path).unwrap(), placement);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_corners_follow_container_size() {
        let quad = sample().corners_in_container(Point::new(800.0, 600.0)).unwrap();
        assert_eq!(quad.corner(Corner::TopLeft), Point::new(150.0, 150.0));
        assert_eq!(quad.corner(Corner::BottomRight), Point::new(350.0, 550.0));
    }

    #[test]
    fn test_empty_container_is_rejected() {
        assert!(matches!(
            sample().corners_in_container(Point::new(0.0, 600.0)),
            Err(WarpError::InvalidScale(..))
        ));
    }

    #[test]
    fn test_empty_image_size_rejected() {
        let path = std::env::temp_dir().join(format!(
            "perspective-overlay-empty-placement-{}.json",
            std::process::id()
        ));
        let mut placement = sample();
        placement.image_size = Point::ZERO;
        placement.save(&path).unwrap();
        assert!(Placement::load(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
