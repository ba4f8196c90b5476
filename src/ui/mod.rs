//! UI components
//!
//! Panels and painters built on egui. State lives in the workspace; these only
//! draw it and translate input.

pub mod canvas;
pub mod catalog_panel;
pub mod corner_panel;
pub mod magnifier;
pub mod notifications;
pub mod thumbnail_cache;

pub use canvas::{ImageTexture, WorkspaceCanvas};
pub use catalog_panel::{CatalogAction, CatalogPanel, IMAGE_EXTENSIONS};
pub use corner_panel::{CornerPanel, CornerPanelAction};
pub use notifications::{Toast, ToastManager, ToastVariant};
