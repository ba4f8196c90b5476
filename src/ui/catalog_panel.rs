//! Overlay catalog
//!
//! Lists the overlays from settings and offers file pickers for a background
//! photo and an arbitrary overlay image.

use std::path::{Path, PathBuf};

use eframe::egui::{self, RichText};

use crate::project::CatalogEntry;

use super::thumbnail_cache::{ThumbnailCache, THUMBNAIL_SIZE};

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "gif", "tif", "tiff"];

/// Actions requested from the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogAction {
    OpenBackground(PathBuf),
    SelectOverlay(PathBuf),
}

/// Catalog panel UI state
#[derive(Default)]
pub struct CatalogPanel {
    filter: String,
    thumbnails: ThumbnailCache,
}

impl CatalogPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the catalog panel
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        catalog: &[CatalogEntry],
        selected: Option<&Path>,
        has_background: bool,
    ) -> Option<CatalogAction> {
        let mut action = None;
        self.thumbnails.poll(ui.ctx());

        ui.heading("Photo");
        let label = if has_background { "Change Photo…" } else { "Open Photo…" };
        if ui.button(label).clicked() {
            if let Some(path) = pick_image("Open photo") {
                action = Some(CatalogAction::OpenBackground(path));
            }
        }

        ui.separator();
        ui.heading("Overlays");

        ui.add_enabled_ui(has_background, |ui| {
            if ui.button("Open Overlay…").clicked() {
                if let Some(path) = pick_image("Open overlay") {
                    action = Some(CatalogAction::SelectOverlay(path));
                }
            }

            if catalog.is_empty() {
                ui.label(RichText::new("No catalog entries in settings").weak());
                return;
            }

            ui.add(egui::TextEdit::singleline(&mut self.filter).hint_text("Filter"));
            egui::ScrollArea::vertical().show(ui, |ui| {
                for entry in filter_entries(catalog, &self.filter) {
                    let is_selected = selected == Some(entry.path.as_path());
                    let clicked = ui
                        .horizontal(|ui| {
                            self.show_thumbnail(ui, &entry.path);
                            ui.selectable_label(is_selected, &entry.name)
                                .on_hover_text(entry.path.display().to_string())
                                .clicked()
                        })
                        .inner;
                    if clicked && !is_selected {
                        action = Some(CatalogAction::SelectOverlay(entry.path.clone()));
                    }
                }
            });
        });

        if !has_background {
            ui.label(RichText::new("Open a photo first").weak());
        }

        action
    }

    fn show_thumbnail(&mut self, ui: &mut egui::Ui, path: &Path) {
        let size = egui::Vec2::splat(THUMBNAIL_SIZE as f32);
        if let Some(texture) = self.thumbnails.get(path) {
            let image = egui::Image::new((texture.id(), texture.size_vec2()));
            ui.add_sized(size, image.max_size(size));
            return;
        }
        if self.thumbnails.is_pending(path) {
            ui.add_sized(size, egui::Spinner::new());
        } else {
            ui.add_sized(size, egui::Label::new(RichText::new("?").weak()));
        }
    }
}

fn pick_image(title: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
}

/// Case-insensitive name filter
fn filter_entries<'a>(catalog: &'a [CatalogEntry], filter: &str) -> Vec<&'a CatalogEntry> {
    let filter = filter.trim().to_lowercase();
    catalog
        .iter()
        .filter(|entry| filter.is_empty() || entry.name.to_lowercase().contains(&filter))
        .collect()
}
