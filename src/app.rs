//! Main application state and UI
//!
//! Wires the workspace to images on disk, the side panels, the export worker
//! and the toasts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use eframe::egui;
use image::RgbaImage;

use crate::interaction::PointerListeners;
use crate::project::{Placement, Settings};
use crate::render::{ExportEvent, ExportJob, ExportWorker};
use crate::ui::{
    CatalogAction, CatalogPanel, CornerPanel, CornerPanelAction, ImageTexture, Toast,
    ToastManager, WorkspaceCanvas, IMAGE_EXTENSIONS,
};
use crate::warp::{OverlaySize, Point, Quad};
use crate::workspace::Workspace;

/// Where a new overlay goes when no container has been laid out yet
const FALLBACK_OVERLAY_ORIGIN: Point = Point::new(150.0, 150.0);

/// An image held both as pixels for export and as a texture for display
struct LoadedImage {
    path: PathBuf,
    pixels: Arc<RgbaImage>,
    texture: ImageTexture,
}

impl LoadedImage {
    fn load(ctx: &egui::Context, name: &str, path: &Path) -> anyhow::Result<Self> {
        let pixels = image::open(path)
            .with_context(|| format!("could not open {}", path.display()))?
            .to_rgba8();
        if pixels.width() == 0 || pixels.height() == 0 {
            anyhow::bail!("{} has no pixels", path.display());
        }
        let texture = ImageTexture::new(ctx, name, &pixels);
        Ok(Self {
            path: path.to_path_buf(),
            pixels: Arc::new(pixels),
            texture,
        })
    }
}

/// Main application state
pub struct PerspectiveOverlayApp {
    pub settings: Settings,
    pub workspace: Workspace,

    // Images
    background: Option<LoadedImage>,
    overlay: Option<LoadedImage>,
    /// Saved placement waiting for the canvas to know its container size
    pending_placement: Option<Placement>,
    /// Photo change waiting for confirmation
    pending_background: Option<PathBuf>,

    // UI panels
    canvas: WorkspaceCanvas,
    catalog_panel: CatalogPanel,
    corner_panel: CornerPanel,
    toasts: ToastManager,
    show_settings: bool,

    export_worker: ExportWorker,
}

impl PerspectiveOverlayApp {
    /// Create a new application instance
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        log::info!("Initializing Perspective Overlay...");

        let settings = Settings::load_or_default();
        let listeners = PointerListeners::new();

        let app = Self {
            settings,
            workspace: Workspace::new(listeners.clone()),
            background: None,
            overlay: None,
            pending_placement: None,
            pending_background: None,
            canvas: WorkspaceCanvas::new(listeners),
            catalog_panel: CatalogPanel::new(),
            corner_panel: CornerPanel::new(),
            toasts: ToastManager::new(),
            show_settings: false,
            export_worker: ExportWorker::new(),
        };

        log::info!(
            "Perspective Overlay initialized with {} catalog entries",
            app.settings.catalog.len()
        );
        app
    }

    /// Ask before replacing a photo that already has an overlay on it
    fn request_background(&mut self, ctx: &egui::Context, path: PathBuf) {
        if self.overlay.is_some() {
            self.pending_background = Some(path);
        } else {
            self.open_background(ctx, &path);
        }
    }

    /// Load a background photo. Clears the overlay and all placement state.
    fn open_background(&mut self, ctx: &egui::Context, path: &Path) -> bool {
        match LoadedImage::load(ctx, "background", path) {
            Ok(image) => {
                log::info!(
                    "Loaded background {:?} ({}x{})",
                    path,
                    image.pixels.width(),
                    image.pixels.height()
                );
                self.background = Some(image);
                self.overlay = None;
                self.pending_placement = None;
                self.workspace.reset();
                true
            }
            Err(e) => {
                log::error!("Failed to load background: {:#}", e);
                self.toasts.push(Toast::error(format!("{:#}", e)));
                false
            }
        }
    }

    /// Rectangle a freshly selected overlay starts in
    fn default_overlay_quad(&self) -> Quad {
        let (w, h) = self.settings.default_overlay_size;
        let size = Point::new(w, h);
        match self.canvas.container() {
            Some(container) => Quad::centered(container.size, size),
            None => Quad::from_rect(FALLBACK_OVERLAY_ORIGIN, size),
        }
    }

    /// Select and load an overlay image
    fn select_overlay(&mut self, ctx: &egui::Context, path: &Path) -> bool {
        if self.background.is_none() {
            self.toasts.push(Toast::info("Open a photo before choosing an overlay"));
            return false;
        }

        self.workspace.select_overlay(self.default_overlay_quad());
        match LoadedImage::load(ctx, "overlay", path) {
            Ok(image) => {
                self.workspace
                    .overlay_loaded(OverlaySize::from(image.pixels.dimensions()));
                self.overlay = Some(image);
                true
            }
            Err(e) => {
                log::error!("Failed to load overlay: {:#}", e);
                self.workspace.overlay_failed();
                self.overlay = None;
                self.toasts.push(Toast::error(format!("{:#}", e)));
                false
            }
        }
    }

    /// Queue the flattened composite for writing
    fn export(&mut self) {
        let (Some(background), Some(overlay), Some(container)) =
            (&self.background, &self.overlay, self.canvas.container())
        else {
            self.toasts.push(Toast::info("Place an overlay before exporting"));
            return;
        };

        if let Err(e) = self.workspace.try_transform() {
            self.toasts
                .push(Toast::error(format!("Cannot export this placement: {}", e)));
            return;
        }

        let quad = match self
            .workspace
            .quad_in_image(container.size, background.texture.natural_size())
        {
            Ok(quad) => quad,
            Err(e) => {
                self.toasts
                    .push(Toast::error(format!("Cannot export this placement: {}", e)));
                return;
            }
        };

        let extension = self.settings.export_extension.clone();
        let Some(path) = rfd::FileDialog::new()
            .set_title("Export composite")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .set_file_name(format!("composite.{}", extension))
            .save_file()
        else {
            return;
        };

        let job = ExportJob {
            background: Arc::clone(&background.pixels),
            overlay: Arc::clone(&overlay.pixels),
            quad,
            path,
        };
        if let Err(e) = self.export_worker.submit(job) {
            log::error!("Failed to queue export: {}", e);
            self.toasts.push(Toast::error(e.to_string()));
        }
    }

    fn poll_exports(&mut self) {
        for event in self.export_worker.poll_events() {
            match event {
                ExportEvent::Started(path) => {
                    self.toasts
                        .push(Toast::info(format!("Exporting {}…", file_name(&path))));
                }
                ExportEvent::Finished(path) => {
                    self.toasts
                        .push(Toast::success(format!("Saved {}", path.display())));
                }
                ExportEvent::Failed(path, message) => {
                    self.toasts.push(Toast::error(format!(
                        "Export of {} failed: {}",
                        file_name(&path),
                        message
                    )));
                }
            }
        }
    }

    fn save_placement(&mut self) {
        let (Some(background), Some(container)) = (&self.background, self.canvas.container())
        else {
            return;
        };
        let image_size = background.texture.natural_size();
        let corners = match self.workspace.quad_in_image(container.size, image_size) {
            Ok(corners) => corners,
            Err(e) => {
                log::warn!("Not saving placement: {}", e);
                self.toasts
                    .push(Toast::error(format!("Cannot save this placement: {}", e)));
                return;
            }
        };
        let placement = Placement::new(
            Some(background.path.clone()),
            self.overlay.as_ref().map(|o| o.path.clone()),
            image_size,
            corners,
        );

        let Some(path) = rfd::FileDialog::new()
            .add_filter("Placement", &["json"])
            .set_file_name("placement.json")
            .save_file()
        else {
            return;
        };
        if let Err(e) = placement.save(&path) {
            log::error!("Failed to save placement: {:#}", e);
            self.toasts.push(Toast::error(format!("{:#}", e)));
        }
    }

    fn open_placement(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Placement", &["json"])
            .pick_file()
        else {
            return;
        };

        let placement = match Placement::load(&path) {
            Ok(placement) => placement,
            Err(e) => {
                log::error!("Failed to load placement: {:#}", e);
                self.toasts.push(Toast::error(format!("{:#}", e)));
                return;
            }
        };

        if let Some(background) = &placement.background {
            if !self.open_background(ctx, background) {
                return;
            }
        }
        if let Some(overlay) = &placement.overlay {
            self.select_overlay(ctx, overlay);
        }
        self.pending_placement = Some(placement);
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Placement...").clicked() {
                        ui.close_menu();
                        self.open_placement(ctx);
                    }
                    let save = egui::Button::new("Save Placement...");
                    if ui.add_enabled(self.background.is_some(), save).clicked()
                    {
                        ui.close_menu();
                        self.save_placement();
                    }
                    ui.separator();
                    let export = egui::Button::new("Export Composite...");
                    if ui.add_enabled(self.overlay.is_some(), export).clicked()
                    {
                        ui.close_menu();
                        self.export();
                    }
                    ui.separator();
                    if ui.button("Settings").clicked() {
                        self.show_settings = true;
                        ui.close_menu();
                    }
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    let label = if self.workspace.controls_visible() {
                        "Hide Controls"
                    } else {
                        "Show Controls"
                    };
                    if ui.button(label).clicked() {
                        self.workspace.toggle_controls();
                        ui.close_menu();
                    }
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.overlay.is_some() && ui.button("⬇ Export").clicked() {
                        self.export();
                    }
                });
            });
        });
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }

        let mut save = false;
        egui::Window::new("⚙ Settings")
            .resizable(false)
            .collapsible(false)
            .open(&mut self.show_settings)
            .show(ctx, |ui| {
                let settings = &mut self.settings;
                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("Magnifier zoom:");
                        ui.add(
                            egui::DragValue::new(&mut settings.magnifier.zoom)
                                .speed(0.1)
                                .clamp_range(1.0..=10.0)
                                .suffix("×"),
                        );
                        ui.end_row();

                        ui.label("Magnifier size:");
                        ui.add(
                            egui::DragValue::new(&mut settings.magnifier.size)
                                .speed(1.0)
                                .clamp_range(40.0..=400.0)
                                .suffix("px"),
                        );
                        ui.end_row();

                        ui.label("Magnifier lift:");
                        ui.add(
                            egui::DragValue::new(&mut settings.magnifier.lift)
                                .speed(1.0)
                                .clamp_range(0.0..=200.0)
                                .suffix("px"),
                        );
                        ui.end_row();

                        ui.label("Handle radius:");
                        ui.add(
                            egui::DragValue::new(&mut settings.handle_radius)
                                .speed(0.5)
                                .clamp_range(4.0..=40.0)
                                .suffix("px"),
                        );
                        ui.end_row();

                        ui.label("Preview mesh:");
                        ui.add(
                            egui::DragValue::new(&mut settings.mesh_subdivision)
                                .speed(1)
                                .clamp_range(1..=64),
                        );
                        ui.end_row();

                        ui.label("Export format:");
                        egui::ComboBox::from_id_source("export_extension")
                            .selected_text(settings.export_extension.clone())
                            .show_ui(ui, |ui| {
                                for ext in ["png", "jpg", "webp"] {
                                    ui.selectable_value(
                                        &mut settings.export_extension,
                                        ext.to_string(),
                                        ext,
                                    );
                                }
                            });
                        ui.end_row();
                    });

                ui.separator();
                if ui.button("Save Settings").clicked() {
                    save = true;
                }
            });

        if save {
            let result = Settings::default_path()
                .context("no config directory on this platform")
                .and_then(|path| self.settings.save(&path));
            match result {
                Ok(()) => self.toasts.push(Toast::success("Settings saved")),
                Err(e) => {
                    log::error!("Failed to save settings: {:#}", e);
                    self.toasts.push(Toast::error(format!("{:#}", e)));
                }
            }
        }
    }

    fn show_change_photo_confirm(&mut self, ctx: &egui::Context) {
        let Some(path) = self.pending_background.clone() else {
            return;
        };

        let mut decision = None;
        egui::Window::new("Change photo?")
            .resizable(false)
            .collapsible(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("The current overlay and its placement will be discarded.");
                ui.horizontal(|ui| {
                    if ui.button("Change Photo").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });

        match decision {
            Some(true) => {
                self.pending_background = None;
                self.open_background(ctx, &path);
            }
            Some(false) => self.pending_background = None,
            None => {}
        }
    }
}

impl eframe::App for PerspectiveOverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_exports();

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) && self.workspace.is_dragging() {
            log::debug!("Escape pressed - cancelling drag");
            self.workspace.cancel_drag();
        }

        self.show_menu_bar(ctx);

        let mut catalog_action = None;
        egui::SidePanel::left("catalog_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                catalog_action = self.catalog_panel.show(
                    ui,
                    &self.settings.catalog,
                    self.overlay.as_ref().map(|o| o.path.as_path()),
                    self.background.is_some(),
                );
            });
        match catalog_action {
            Some(CatalogAction::OpenBackground(path)) => self.request_background(ctx, path),
            Some(CatalogAction::SelectOverlay(path)) => {
                self.select_overlay(ctx, &path);
            }
            None => {}
        }

        let mut corner_action = None;
        egui::SidePanel::right("corner_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                corner_action = self.corner_panel.show(ui, &mut self.workspace);
            });
        if corner_action == Some(CornerPanelAction::ResetPlacement) {
            let quad = self.default_overlay_quad();
            self.workspace.restore_quad(quad);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.canvas.show(
                    ui,
                    &mut self.workspace,
                    self.background.as_ref().map(|b| &b.texture),
                    self.overlay.as_ref().map(|o| &o.texture),
                    &self.settings,
                    &mut self.pending_placement,
                );
            });

        self.show_settings_window(ctx);
        self.show_change_photo_confirm(ctx);
        self.toasts.show(ctx);
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
