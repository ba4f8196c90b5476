//! Magnifier lens painter

use std::f64::consts::TAU;

use eframe::egui::{self, Color32, Stroke};

use crate::interaction::{ContainerBox, MagnifierView};
use crate::warp::Point;

use super::canvas::to_pos;

const RIM_SEGMENTS: usize = 48;
const BORDER_WIDTH: f32 = 3.0;
const CROSSHAIR_COLOR: Color32 = Color32::from_rgba_premultiplied(153, 0, 0, 153);

/// Paint the lens on a layer above the handles.
///
/// Painting only, so the lens never takes pointer input.
pub fn paint_magnifier(
    painter: &egui::Painter,
    view: &MagnifierView,
    background: egui::TextureId,
    container: &ContainerBox,
) {
    let center = to_pos(container.to_page(view.center));
    let radius = view.radius as f32;

    painter.circle_filled(center, radius + 2.0, Color32::from_black_alpha(60));
    painter.circle_filled(center, radius, Color32::WHITE);
    painter.add(egui::Shape::mesh(lens_mesh(view, background, container)));
    painter.circle_stroke(center, radius, Stroke::new(BORDER_WIDTH, Color32::WHITE));

    for (from, to) in view.crosshair() {
        painter.line_segment(
            [to_pos(container.to_page(from)), to_pos(container.to_page(to))],
            Stroke::new(1.0, CROSSHAIR_COLOR),
        );
    }
}

/// Textured fan covering the lens circle
fn lens_mesh(
    view: &MagnifierView,
    background: egui::TextureId,
    container: &ContainerBox,
) -> egui::Mesh {
    let mut mesh = egui::Mesh::with_texture(background);
    let top_left = view.top_left();
    let r = view.radius;

    let mut push = |local: Point| {
        let source = view.source_at(local);
        mesh.vertices.push(egui::epaint::Vertex {
            pos: to_pos(container.to_page(top_left + local)),
            uv: egui::pos2(
                (source.x / container.size.x) as f32,
                (source.y / container.size.y) as f32,
            ),
            color: Color32::WHITE,
        });
    };

    push(Point::splat(r));
    for i in 0..=RIM_SEGMENTS {
        let angle = TAU * i as f64 / RIM_SEGMENTS as f64;
        push(Point::new(r + r * angle.cos(), r + r * angle.sin()));
    }

    for i in 1..=RIM_SEGMENTS as u32 {
        mesh.add_triangle(0, i, i + 1);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::MagnifierSettings;

    #[test]
    fn test_lens_center_samples_target() {
        let container = ContainerBox::new(Point::new(50.0, 20.0), Point::new(800.0, 600.0));
        let target = Point::new(400.0, 300.0);
        let view = MagnifierView::new(target, container.size, &MagnifierSettings::default());
        let mesh = lens_mesh(&view, egui::TextureId::default(), &container);

        assert_eq!(mesh.vertices.len(), RIM_SEGMENTS + 2);
        assert_eq!(mesh.indices.len(), RIM_SEGMENTS * 3);
        let hub = mesh.vertices[0];
        assert!((hub.uv.x - 0.5).abs() < 1e-6);
        assert!((hub.uv.y - 0.5).abs() < 1e-6);
        assert_eq!(hub.pos, to_pos(container.to_page(view.center)));
    }
}
