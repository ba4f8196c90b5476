//! Drag interaction state machine
//!
//! Turns pointer events into either a single-corner move or a rigid
//! translation of the whole quad. A single enum holds the interaction state,
//! so the two drag kinds can never be active at once.

use crate::warp::{Corner, Point, Quad, WarpError};

use super::listeners::{ListenerSubscription, PointerListeners};

/// What a pointer-down landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// One of the four corner handles
    Handle(Corner),
    /// The quad's fill or outline, outside any handle
    Shape,
}

/// Current interaction state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// A single corner follows the pointer
    DraggingCorner(Corner),
    /// The whole quad follows the pointer; `last` is the previous page position
    DraggingShape { last: Point },
}

/// Bounding box of the reference container in page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerBox {
    pub origin: Point,
    pub size: Point,
}

impl ContainerBox {
    pub fn new(origin: Point, size: Point) -> Self {
        Self { origin, size }
    }

    /// Convert a page position into container-local coordinates
    pub fn to_local(&self, page: Point) -> Point {
        page - self.origin
    }

    pub fn to_page(&self, local: Point) -> Point {
        local + self.origin
    }
}

/// Drives the quad from pointer input
#[derive(Debug)]
pub struct DragController {
    state: InteractionState,
    listeners: PointerListeners,
    /// Held exactly while the state is not `Idle`
    subscription: Option<ListenerSubscription>,
}

impl DragController {
    pub fn new(listeners: PointerListeners) -> Self {
        Self {
            state: InteractionState::Idle,
            listeners,
            subscription: None,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self.state, InteractionState::Idle)
    }

    /// Corner currently being dragged, which drives the magnifier
    pub fn active_corner(&self) -> Option<Corner> {
        match self.state {
            InteractionState::DraggingCorner(corner) => Some(corner),
            _ => None,
        }
    }

    pub fn listeners(&self) -> &PointerListeners {
        &self.listeners
    }

    /// Start a drag. Ignored while another drag is active.
    ///
    /// Returns whether a drag started.
    pub fn on_pointer_down(&mut self, target: HitTarget, page: Point) -> bool {
        if self.is_dragging() {
            log::debug!("Ignoring pointer-down on {:?} during {:?}", target, self.state);
            return false;
        }

        self.state = match target {
            HitTarget::Handle(corner) => InteractionState::DraggingCorner(corner),
            HitTarget::Shape => InteractionState::DraggingShape { last: page },
        };
        self.subscription = Some(self.listeners.subscribe());
        log::debug!("Drag started: {:?}", self.state);
        true
    }

    /// Apply a global pointer move.
    ///
    /// `container` must be the container's current bounding box, queried for
    /// this move; it can change between moves when the window scrolls or
    /// resizes. Returns whether the quad changed.
    pub fn on_pointer_move(
        &mut self,
        page: Point,
        container: &ContainerBox,
        quad: &mut Quad,
    ) -> Result<bool, WarpError> {
        match self.state {
            InteractionState::Idle => Ok(false),
            InteractionState::DraggingCorner(corner) => {
                let local = container.to_local(page);
                quad.set_corner(corner.index(), local)?;
                Ok(true)
            }
            InteractionState::DraggingShape { last } => {
                let delta = page - last;
                quad.translate(delta)?;
                self.state = InteractionState::DraggingShape { last: page };
                Ok(delta != Point::ZERO)
            }
        }
    }

    /// Global pointer-up: ends any drag
    pub fn on_pointer_up(&mut self) {
        if self.is_dragging() {
            log::debug!("Drag ended: {:?}", self.state);
        }
        self.end();
    }

    /// Abandon the current drag. Moves already applied stay applied.
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            log::debug!("Drag cancelled: {:?}", self.state);
        }
        self.end();
    }

    fn end(&mut self) {
        self.state = InteractionState::Idle;
        self.subscription = None;
    }
}
