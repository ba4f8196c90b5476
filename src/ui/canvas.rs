//! Workspace canvas
//!
//! Paints the background, the warped overlay, the quad outline and the corner
//! handles, and adapts egui pointer input into workspace events. While a drag
//! holds global listeners, moves and releases are routed to the workspace no
//! matter where the pointer is.

use eframe::egui::{self, Color32, CursorIcon, Pos2, Rect, Sense, Stroke, Vec2};

use crate::interaction::{ContainerBox, HitTarget, InteractionState, PointerListeners};
use crate::project::{Placement, Settings};
use crate::warp::{Corner, Point, WarpMesh};
use crate::workspace::Workspace;

use super::magnifier::paint_magnifier;

const HANDLE_COLOR: Color32 = Color32::from_rgb(37, 99, 235);
const OUTLINE_COLOR: Color32 = Color32::from_rgba_premultiplied(30, 65, 123, 128);
const FILL_COLOR: Color32 = Color32::from_rgba_premultiplied(6, 13, 25, 25);
const FILL_HOVER_COLOR: Color32 = Color32::from_rgba_premultiplied(12, 26, 49, 51);

/// A loaded image and its GPU texture
pub struct ImageTexture {
    pub texture: egui::TextureHandle,
    /// Natural size in pixels
    pub size: [usize; 2],
}

impl ImageTexture {
    pub fn new(ctx: &egui::Context, name: &str, image: &image::RgbaImage) -> Self {
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        let texture = ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR);
        Self { texture, size }
    }

    pub fn natural_size(&self) -> Point {
        Point::new(self.size[0] as f64, self.size[1] as f64)
    }
}

/// Canvas UI state
pub struct WorkspaceCanvas {
    listeners: PointerListeners,
    /// Container box from the most recent frame
    last_container: Option<ContainerBox>,
}

impl WorkspaceCanvas {
    pub fn new(listeners: PointerListeners) -> Self {
        Self {
            listeners,
            last_container: None,
        }
    }

    /// Container box as of the last paint, if a background is shown
    pub fn container(&self) -> Option<ContainerBox> {
        self.last_container
    }

    /// Show the canvas
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        workspace: &mut Workspace,
        background: Option<&ImageTexture>,
        overlay: Option<&ImageTexture>,
        settings: &Settings,
        pending_placement: &mut Option<Placement>,
    ) {
        let available = ui.available_rect_before_wrap();
        let (response, painter) = ui.allocate_painter(available.size(), Sense::click_and_drag());
        painter.rect_filled(response.rect, 0.0, Color32::from_gray(243));

        let Some(background) = background else {
            self.last_container = None;
            painter.text(
                response.rect.center(),
                egui::Align2::CENTER_CENTER,
                "Open a photo to get started",
                egui::FontId::proportional(16.0),
                Color32::from_gray(156),
            );
            return;
        };

        // Re-queried every frame: the box moves when the window resizes
        let image_rect = fit_rect(response.rect, background.natural_size());
        let container = ContainerBox::new(
            Point::new(image_rect.min.x as f64, image_rect.min.y as f64),
            Point::new(image_rect.width() as f64, image_rect.height() as f64),
        );
        self.last_container = Some(container);

        if let Some(placement) = pending_placement.take() {
            match placement.corners_in_container(container.size) {
                Ok(quad) => workspace.restore_quad(quad),
                Err(e) => {
                    // Retried once the container has an area again
                    log::debug!("Deferring placement restore: {}", e);
                    *pending_placement = Some(placement);
                }
            }
        }

        painter.image(
            background.texture.id(),
            image_rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );

        if let Some(overlay) = overlay {
            self.handle_input(ui, &response, workspace, &container, settings);
            paint_overlay(&painter, workspace, overlay, &container, settings.mesh_subdivision);
            if workspace.controls_visible() {
                self.paint_controls(ui, &painter, workspace, &container, settings);
            }
        }

        if let Some(view) = workspace.magnifier(container.size, &settings.magnifier) {
            let lens_painter = ui.ctx().layer_painter(egui::LayerId::new(
                egui::Order::Foreground,
                egui::Id::new("corner_magnifier"),
            ));
            paint_magnifier(&lens_painter, &view, background.texture.id(), &container);
        }
    }

    fn handle_input(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        workspace: &mut Workspace,
        container: &ContainerBox,
        settings: &Settings,
    ) {
        let (frame, press_pos, latest_pos) = ui.input(|i| {
            let frame = PointerFrame {
                pressed: i.pointer.primary_pressed(),
                released: i.pointer.primary_released(),
                button_down: i.pointer.primary_down(),
                moved: i.pointer.delta() != Vec2::ZERO,
                over_canvas: response.hovered(),
            };
            (frame, i.pointer.press_origin(), i.pointer.latest_pos())
        });

        if frame.starts_drag(workspace.is_dragging()) {
            if let Some(pos) = press_pos {
                workspace.pointer_down(to_point(pos), container, settings.handle_radius as f64);
            }
        }

        // Global routing while the drag holds listeners
        if self.listeners.is_capturing() {
            let routing = frame.captured();
            if routing.forward_move {
                if let Some(pos) = latest_pos {
                    workspace.pointer_move(to_point(pos), container);
                }
            }
            if routing.end_drag {
                workspace.pointer_up();
            }
            ui.ctx().request_repaint();
        }
    }

    fn paint_controls(
        &self,
        ui: &egui::Ui,
        painter: &egui::Painter,
        workspace: &Workspace,
        container: &ContainerBox,
        settings: &Settings,
    ) {
        let corners = workspace.quad().corners().map(|c| to_pos(container.to_page(c)));
        let radius = settings.handle_radius;

        let hover = ui
            .input(|i| i.pointer.hover_pos())
            .filter(|_| !workspace.is_dragging())
            .and_then(|pos| workspace.hit_test(container.to_local(to_point(pos)), radius as f64));

        let shape_active = hover == Some(HitTarget::Shape)
            || matches!(workspace.interaction(), InteractionState::DraggingShape { .. });
        if shape_active || matches!(hover, Some(HitTarget::Handle(_))) || workspace.is_dragging() {
            ui.ctx().set_cursor_icon(CursorIcon::Move);
        }

        let mut fill = egui::Mesh::default();
        let fill_color = if shape_active { FILL_HOVER_COLOR } else { FILL_COLOR };
        for corner in corners {
            fill.colored_vertex(corner, fill_color);
        }
        fill.add_triangle(0, 1, 2);
        fill.add_triangle(0, 2, 3);
        painter.add(egui::Shape::mesh(fill));
        painter.add(egui::Shape::closed_line(
            corners.to_vec(),
            Stroke::new(2.0, OUTLINE_COLOR),
        ));

        for corner in Corner::ALL {
            let pos = corners[corner.index()];
            let scale = if workspace.active_corner() == Some(corner) {
                1.25
            } else if hover == Some(HitTarget::Handle(corner)) {
                1.1
            } else {
                1.0
            };
            painter.circle_filled(pos, radius * scale, Color32::from_black_alpha(40));
            painter.circle_stroke(pos, radius * scale - 1.0, Stroke::new(2.0, Color32::WHITE));
            painter.circle_filled(pos, radius * scale * 0.5, HANDLE_COLOR);
        }
    }
}

/// Primary-button pointer state for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PointerFrame {
    pressed: bool,
    released: bool,
    button_down: bool,
    moved: bool,
    /// Pointer is over the canvas and not covered by another widget
    over_canvas: bool,
}

/// What a captured drag does with a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CapturedRouting {
    forward_move: bool,
    end_drag: bool,
}

impl PointerFrame {
    /// A press over the canvas may start a drag; presses elsewhere and
    /// presses during a drag never do
    fn starts_drag(&self, dragging: bool) -> bool {
        self.pressed && self.over_canvas && !dragging
    }

    /// Routing while global listeners are live. Position does not matter. A
    /// button found up without a release event (focus lost) also ends the
    /// drag.
    fn captured(&self) -> CapturedRouting {
        CapturedRouting {
            forward_move: self.moved,
            end_drag: self.released || !self.button_down,
        }
    }
}

/// Draw the warped overlay for this frame.
///
/// The transform is solved here, before painting, from the current corners.
fn paint_overlay(
    painter: &egui::Painter,
    workspace: &mut Workspace,
    overlay: &ImageTexture,
    container: &ContainerBox,
    subdivision: u32,
) {
    let Some(homography) = workspace.current_transform() else {
        return;
    };
    let Some(warp) = WarpMesh::build(&homography, workspace.overlay_size(), subdivision) else {
        return;
    };

    let mut mesh = egui::Mesh::with_texture(overlay.texture.id());
    for vertex in &warp.vertices {
        mesh.vertices.push(egui::epaint::Vertex {
            pos: to_pos(container.to_page(vertex.position)),
            uv: Pos2::new(vertex.uv.x as f32, vertex.uv.y as f32),
            color: Color32::WHITE,
        });
    }
    mesh.indices = warp.indices;
    painter.add(egui::Shape::mesh(mesh));
}

/// Largest rect with the image's aspect ratio that fits in `outer`, centered
fn fit_rect(outer: Rect, natural: Point) -> Rect {
    let natural = Vec2::new(natural.x as f32, natural.y as f32);
    if natural.x <= 0.0 || natural.y <= 0.0 {
        return outer;
    }
    let scale = (outer.width() / natural.x).min(outer.height() / natural.y).min(1.0);
    Rect::from_center_size(outer.center(), natural * scale)
}

pub(crate) fn to_point(pos: Pos2) -> Point {
    Point::new(pos.x as f64, pos.y as f64)
}

pub(crate) fn to_pos(point: Point) -> Pos2 {
    Pos2::new(point.x as f32, point.y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(moved: bool) -> PointerFrame {
        PointerFrame {
            button_down: true,
            moved,
            ..Default::default()
        }
    }

    #[test]
    fn test_press_over_canvas_starts_drag() {
        let press = PointerFrame {
            pressed: true,
            button_down: true,
            over_canvas: true,
            ..Default::default()
        };
        assert!(press.starts_drag(false));
        assert!(!press.starts_drag(true));

        let covered = PointerFrame {
            over_canvas: false,
            ..press
        };
        assert!(!covered.starts_drag(false));
        assert!(!held(true).starts_drag(false));
    }

    #[test]
    fn test_captured_moves_forwarded_anywhere() {
        // Off the canvas while dragging
        let routing = held(true).captured();
        assert!(routing.forward_move);
        assert!(!routing.end_drag);

        assert_eq!(held(false).captured(), CapturedRouting::default());
    }

    #[test]
    fn test_release_anywhere_ends_drag() {
        let release = PointerFrame {
            released: true,
            ..Default::default()
        };
        assert!(release.captured().end_drag);
    }

    #[test]
    fn test_button_found_up_ends_drag() {
        let lost = PointerFrame {
            moved: true,
            ..Default::default()
        };
        let routing = lost.captured();
        assert!(routing.end_drag);
        assert!(routing.forward_move);
    }

    #[test]
    fn test_fit_rect_preserves_aspect() {
        let outer = Rect::from_min_size(Pos2::ZERO, Vec2::new(1000.0, 500.0));
        let fitted = fit_rect(outer, Point::new(2000.0, 2000.0));
        assert_eq!(fitted.size(), Vec2::new(500.0, 500.0));
        assert_eq!(fitted.center(), outer.center());
    }

    #[test]
    fn test_fit_rect_never_upscales() {
        let outer = Rect::from_min_size(Pos2::ZERO, Vec2::new(1000.0, 800.0));
        let fitted = fit_rect(outer, Point::new(400.0, 300.0));
        assert_eq!(fitted.size(), Vec2::new(400.0, 300.0));
    }
}
