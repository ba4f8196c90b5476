//! Perspective Overlay Library
//!
//! Places a flat overlay image onto a photo by dragging its four corners. The
//! overlay is warped with a projective transform solved from the corners.

pub mod app;
pub mod interaction;
pub mod project;
pub mod render;
pub mod ui;
pub mod warp;
pub mod workspace;

// Re-export commonly used types
pub use app::PerspectiveOverlayApp;
pub use interaction::{ContainerBox, DragController, HitTarget, InteractionState, PointerListeners};
pub use project::{Placement, Settings};
pub use render::{flatten, ExportError, ExportWorker};
pub use warp::{compute_projective_transform, Corner, Homography, Point, Quad, WarpError};
pub use workspace::Workspace;
