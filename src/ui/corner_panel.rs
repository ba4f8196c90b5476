//! Corner panel
//!
//! Shows the corner coordinates and the solved transform, and holds the
//! controls toggle.

use eframe::egui::{self, Color32};

use crate::warp::{Corner, WarpError};
use crate::workspace::Workspace;

/// Actions requested from the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerPanelAction {
    ResetPlacement,
}

/// Corner panel UI state
#[derive(Default)]
pub struct CornerPanel {
    show_matrix: bool,
}

impl CornerPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the corner panel
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        workspace: &mut Workspace,
    ) -> Option<CornerPanelAction> {
        let mut action = None;
        ui.heading("Placement");

        if !workspace.overlay_size().is_loaded() {
            ui.label("Select an overlay to place it.");
            return None;
        }

        let mut visible = workspace.controls_visible();
        if ui.checkbox(&mut visible, "Show controls").changed() {
            workspace.set_controls_visible(visible);
        }

        ui.separator();

        egui::Grid::new("corner_coordinates")
            .num_columns(3)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                for corner in Corner::ALL {
                    let point = workspace.quad().corner(corner);
                    let label = if workspace.active_corner() == Some(corner) {
                        egui::RichText::new(corner.label()).strong()
                    } else {
                        egui::RichText::new(corner.label())
                    };
                    ui.label(label);
                    ui.monospace(format!("X: {:.1}", point.x));
                    ui.monospace(format!("Y: {:.1}", point.y));
                    ui.end_row();
                }
            });

        ui.separator();

        match workspace.try_transform() {
            Ok(homography) => {
                let (g, h) = homography.perspective_terms();
                if homography.folds(workspace.overlay_size()) {
                    ui.colored_label(
                        Color32::from_rgb(220, 120, 40),
                        format!("⚠ {}", WarpError::FoldedQuad),
                    );
                } else if homography.is_affine(1e-9) {
                    ui.label("Affine placement");
                } else {
                    ui.label(format!("Perspective: g={:.2e} h={:.2e}", g, h));
                }

                ui.checkbox(&mut self.show_matrix, "Show matrix3d");
                if self.show_matrix {
                    let m = homography.to_matrix3d();
                    let text = m
                        .chunks(4)
                        .map(|col| {
                            col.iter()
                                .map(|v| format!("{:>10.4}", v))
                                .collect::<Vec<_>>()
                                .join(" ")
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                    ui.monospace(text);
                }
            }
            Err(e) => {
                ui.colored_label(Color32::from_rgb(220, 120, 40), format!("⚠ {}", e));
                ui.label("Showing the last valid placement.");
            }
        }

        ui.separator();

        if ui.button("Reset Placement").clicked() {
            action = Some(CornerPanelAction::ResetPlacement);
        }

        action
    }
}
