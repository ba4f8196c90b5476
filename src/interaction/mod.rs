//! Pointer interaction
//!
//! Corner and shape dragging, the global listener lifecycle behind it, and the
//! magnifier that follows an active corner drag.

mod drag;
mod listeners;
mod magnifier;

pub use drag::{ContainerBox, DragController, HitTarget, InteractionState};
pub use listeners::{ListenerKind, ListenerSubscription, PointerListeners};
pub use magnifier::{magnifier_for, MagnifierSettings, MagnifierView};
