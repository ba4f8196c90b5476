//! Workspace state
//!
//! Owns the destination quad, the interaction state, the overlay's natural
//! size and the controls toggle. The UI feeds it pointer events and asks it for
//! the current transform at the start of every paint.

use crate::interaction::{
    magnifier_for, ContainerBox, DragController, HitTarget, InteractionState, MagnifierSettings,
    MagnifierView, PointerListeners,
};
use crate::warp::{Corner, Homography, OverlaySize, Point, Quad, WarpError};

/// Core state behind the canvas
#[derive(Debug)]
pub struct Workspace {
    quad: Quad,
    overlay_size: OverlaySize,
    controls_visible: bool,
    controller: DragController,
    /// Last transform that solved successfully; shown while the current
    /// corners are degenerate
    last_transform: Option<Homography>,
}

impl Workspace {
    pub fn new(listeners: PointerListeners) -> Self {
        Self {
            quad: Quad::default(),
            overlay_size: OverlaySize::unset(),
            controls_visible: true,
            controller: DragController::new(listeners),
            last_transform: None,
        }
    }

    pub fn quad(&self) -> &Quad {
        &self.quad
    }

    pub fn overlay_size(&self) -> OverlaySize {
        self.overlay_size
    }

    pub fn interaction(&self) -> InteractionState {
        self.controller.state()
    }

    pub fn active_corner(&self) -> Option<Corner> {
        self.controller.active_corner()
    }

    pub fn is_dragging(&self) -> bool {
        self.controller.is_dragging()
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    /// Show or hide handles and outline. Never touches the quad.
    pub fn set_controls_visible(&mut self, visible: bool) {
        if !visible {
            self.controller.cancel();
        }
        self.controls_visible = visible;
    }

    pub fn toggle_controls(&mut self) {
        self.set_controls_visible(!self.controls_visible);
    }

    /// A new overlay was chosen: place it at `placement` and wait for it to load
    pub fn select_overlay(&mut self, placement: Quad) {
        self.controller.cancel();
        self.quad.reset(placement);
        self.overlay_size = OverlaySize::unset();
        self.last_transform = None;
        log::info!("Overlay selected, waiting for load");
    }

    /// Overlay finished loading with its natural pixel size
    pub fn overlay_loaded(&mut self, size: OverlaySize) {
        log::info!("Overlay loaded: {}x{}", size.width, size.height);
        self.overlay_size = size;
    }

    /// Overlay failed to load; nothing is drawn until another loads
    pub fn overlay_failed(&mut self) {
        self.overlay_size = OverlaySize::unset();
        self.last_transform = None;
    }

    /// A new background was chosen: everything starts over
    pub fn reset(&mut self) {
        self.controller.cancel();
        self.quad.reset(Quad::default());
        self.overlay_size = OverlaySize::unset();
        self.controls_visible = true;
        self.last_transform = None;
    }

    /// Restore saved corners, e.g. from a placement file
    pub fn restore_quad(&mut self, quad: Quad) {
        self.controller.cancel();
        self.quad.reset(quad);
    }

    /// Solve the transform for the current corners and overlay size
    pub fn try_transform(&self) -> Result<Homography, WarpError> {
        Homography::from_rect(self.overlay_size, self.quad.corners())
    }

    /// Transform to paint this frame.
    ///
    /// Recomputed on every call. While the corners are degenerate the last good
    /// transform is returned so the previous frame stays on screen. `None`
    /// until the overlay has loaded.
    pub fn current_transform(&mut self) -> Option<Homography> {
        if !self.overlay_size.is_loaded() {
            return None;
        }
        match self.try_transform() {
            Ok(h) => {
                self.last_transform = Some(h);
                Some(h)
            }
            Err(e) => {
                log::debug!("Keeping previous transform: {}", e);
                self.last_transform
            }
        }
    }

    /// What the pointer would grab at a container-local position.
    ///
    /// Handles sit above the shape, so they win. Nothing is grabbable while
    /// controls are hidden.
    pub fn hit_test(&self, local: Point, handle_radius: f64) -> Option<HitTarget> {
        if !self.controls_visible {
            return None;
        }

        // Later handles are drawn on top
        let handle = Corner::ALL
            .iter()
            .rev()
            .copied()
            .find(|&c| self.quad.corner(c).distance(local) <= handle_radius);
        if let Some(corner) = handle {
            return Some(HitTarget::Handle(corner));
        }

        if self.quad.contains(local) {
            return Some(HitTarget::Shape);
        }
        None
    }

    /// Pointer pressed at `page`; starts a drag if it hits a control
    pub fn pointer_down(
        &mut self,
        page: Point,
        container: &ContainerBox,
        handle_radius: f64,
    ) -> bool {
        match self.hit_test(container.to_local(page), handle_radius) {
            Some(target) => self.controller.on_pointer_down(target, page),
            None => false,
        }
    }

    /// Global pointer move; returns whether the quad changed
    pub fn pointer_move(&mut self, page: Point, container: &ContainerBox) -> bool {
        match self.controller.on_pointer_move(page, container, &mut self.quad) {
            Ok(changed) => changed,
            Err(e) => {
                log::warn!("Rejected pointer move to {:?}: {}", page, e);
                false
            }
        }
    }

    /// Global pointer release
    pub fn pointer_up(&mut self) {
        self.controller.on_pointer_up();
    }

    pub fn cancel_drag(&mut self) {
        self.controller.cancel();
    }

    /// Lens for the active corner drag, if any
    pub fn magnifier(
        &self,
        container_size: Point,
        settings: &MagnifierSettings,
    ) -> Option<MagnifierView> {
        magnifier_for(self.controller.state(), &self.quad, container_size, settings)
    }

    /// Corners expressed in the background image's own pixels
    ///
    /// Fails while the container has no area.
    pub fn quad_in_image(
        &self,
        container_size: Point,
        image_size: Point,
    ) -> Result<Quad, WarpError> {
        self.quad
            .scaled(image_size.x / container_size.x, image_size.y / container_size.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> ContainerBox {
        ContainerBox::new(Point::new(10.0, 20.0), Point::new(800.0, 600.0))
    }

    fn loaded_workspace() -> Workspace {
        let mut ws = Workspace::new(PointerListeners::new());
        ws.select_overlay(Quad::from_rect(Point::new(150.0, 150.0), Point::new(200.0, 400.0)));
        ws.overlay_loaded(OverlaySize::new(400.0, 800.0));
        ws
    }

    #[test]
    fn test_no_transform_until_overlay_loads() {
        let mut ws = Workspace::new(PointerListeners::new());
        ws.select_overlay(Quad::default());
        assert!(ws.current_transform().is_none());

        ws.overlay_loaded(OverlaySize::new(400.0, 800.0));
        assert!(ws.current_transform().is_some());

        ws.overlay_failed();
        assert!(ws.current_transform().is_none());
    }

    #[test]
    fn test_default_placement_is_pure_scale() {
        let mut ws = loaded_workspace();
        let h = ws.current_transform().unwrap();
        assert!((h.m[0][0] - 0.5).abs() < 1e-9);
        assert!((h.m[1][1] - 0.5).abs() < 1e-9);
        assert!(h.is_affine(1e-9));
    }

    #[test]
    fn test_degenerate_drag_keeps_previous_transform() {
        let mut ws = loaded_workspace();
        let c = container();
        let before = ws.current_transform().unwrap();

        // Grab top-left and drag it onto the right edge's line
        let tl_page = c.to_page(Point::new(150.0, 150.0));
        assert!(ws.pointer_down(tl_page, &c, 12.0));
        assert!(ws.pointer_move(c.to_page(Point::new(350.0, 50.0)), &c));

        assert_eq!(ws.try_transform(), Err(WarpError::DegenerateConfiguration));
        assert_eq!(ws.current_transform(), Some(before));

        // Moving past the degenerate spot recovers
        ws.pointer_move(c.to_page(Point::new(100.0, 120.0)), &c);
        let after = ws.current_transform().unwrap();
        assert_ne!(after, before);
        assert!(!after.is_affine(1e-9));
        ws.pointer_up();
        assert!(!ws.is_dragging());
    }

    #[test]
    fn test_controls_toggle_is_visual_only() {
        let mut ws = loaded_workspace();
        let quad = *ws.quad();
        let matrix = ws.current_transform().unwrap().to_matrix3d();

        ws.toggle_controls();
        assert!(!ws.controls_visible());
        ws.toggle_controls();
        assert!(ws.controls_visible());

        assert_eq!(*ws.quad(), quad);
        assert_eq!(ws.current_transform().unwrap().to_matrix3d(), matrix);
    }

    #[test]
    fn test_hidden_controls_are_not_interactive() {
        let mut ws = loaded_workspace();
        let c = container();
        ws.set_controls_visible(false);

        assert_eq!(ws.hit_test(Point::new(150.0, 150.0), 12.0), None);
        assert!(!ws.pointer_down(c.to_page(Point::new(250.0, 300.0)), &c, 12.0));
        assert_eq!(ws.interaction(), InteractionState::Idle);
    }

    #[test]
    fn test_handles_win_over_shape() {
        let ws = loaded_workspace();
        assert_eq!(
            ws.hit_test(Point::new(152.0, 153.0), 12.0),
            Some(HitTarget::Handle(Corner::TopLeft))
        );
        assert_eq!(ws.hit_test(Point::new(250.0, 300.0), 12.0), Some(HitTarget::Shape));
        assert_eq!(ws.hit_test(Point::new(20.0, 20.0), 12.0), None);
    }

    #[test]
    fn test_shape_drag_moves_all_corners() {
        let mut ws = loaded_workspace();
        let c = container();
        let before = *ws.quad();

        assert!(ws.pointer_down(c.to_page(Point::new(250.0, 300.0)), &c, 12.0));
        assert!(ws.magnifier(Point::new(800.0, 600.0), &MagnifierSettings::default()).is_none());
        ws.pointer_move(c.to_page(Point::new(260.0, 290.0)), &c);
        ws.pointer_up();

        for i in 0..4 {
            assert_eq!(ws.quad().corners()[i], before.corners()[i] + Point::new(10.0, -10.0));
        }
    }

    #[test]
    fn test_magnifier_follows_corner_drag() {
        let mut ws = loaded_workspace();
        let c = container();
        let settings = MagnifierSettings::default();

        ws.pointer_down(c.to_page(Point::new(350.0, 550.0)), &c, 12.0);
        ws.pointer_move(c.to_page(Point::new(360.0, 540.0)), &c);
        let view = ws.magnifier(c.size, &settings).unwrap();
        assert_eq!(view.target, Point::new(360.0, 540.0));

        ws.pointer_up();
        assert!(ws.magnifier(c.size, &settings).is_none());
    }

    #[test]
    fn test_background_reset() {
        let mut ws = loaded_workspace();
        let c = container();
        ws.pointer_down(c.to_page(Point::new(150.0, 150.0)), &c, 12.0);
        ws.set_controls_visible(false);
        ws.reset();

        assert_eq!(*ws.quad(), Quad::default());
        assert!(!ws.overlay_size().is_loaded());
        assert!(ws.controls_visible());
        assert!(!ws.is_dragging());
    }

    #[test]
    fn test_quad_in_image() {
        let ws = loaded_workspace();
        let q = ws
            .quad_in_image(Point::new(800.0, 600.0), Point::new(1600.0, 1200.0))
            .unwrap();
        assert_eq!(q.corner(Corner::TopLeft), Point::new(300.0, 300.0));
        assert_eq!(q.corner(Corner::BottomRight), Point::new(700.0, 1100.0));
    }

    #[test]
    fn test_quad_in_image_rejects_empty_container() {
        let ws = loaded_workspace();
        let before = *ws.quad();
        assert!(matches!(
            ws.quad_in_image(Point::ZERO, Point::new(1600.0, 1200.0)),
            Err(WarpError::InvalidScale(..))
        ));
        assert_eq!(*ws.quad(), before);
    }
}
