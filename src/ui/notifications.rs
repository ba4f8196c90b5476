//! Toast notifications for load and export results

use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText};

const DEFAULT_DURATION: Duration = Duration::from_secs(5);
const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Info,
    Success,
    Error,
}

impl ToastVariant {
    fn color(self) -> Color32 {
        match self {
            ToastVariant::Info => Color32::from_rgb(96, 165, 250),
            ToastVariant::Success => Color32::from_rgb(74, 222, 128),
            ToastVariant::Error => Color32::from_rgb(248, 113, 113),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub variant: ToastVariant,
    created: Instant,
    /// None keeps the toast until dismissed
    duration: Option<Duration>,
}

impl Toast {
    fn new(message: impl Into<String>, variant: ToastVariant, duration: Option<Duration>) -> Self {
        Self {
            message: message.into(),
            variant,
            created: Instant::now(),
            duration,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastVariant::Info, Some(DEFAULT_DURATION))
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastVariant::Success, Some(DEFAULT_DURATION))
    }

    /// Errors stay until dismissed
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastVariant::Error, None)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.duration
            .is_some_and(|duration| self.created.elapsed() >= duration)
    }
}

/// Stack of visible toasts, newest last
#[derive(Debug, Default)]
pub struct ToastManager {
    toasts: Vec<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, toast: Toast) {
        self.toasts.push(toast);
        if self.toasts.len() > MAX_TOASTS {
            self.toasts.remove(0);
        }
    }

    pub fn count(&self) -> usize {
        self.toasts.len()
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }

    pub fn dismiss(&mut self, index: usize) {
        if index < self.toasts.len() {
            self.toasts.remove(index);
        }
    }

    pub fn remove_expired(&mut self) {
        self.toasts.retain(|toast| !toast.is_expired());
    }

    /// Show the stack in the bottom-right corner
    pub fn show(&mut self, ctx: &egui::Context) {
        self.remove_expired();
        if self.toasts.is_empty() {
            return;
        }

        let mut dismissed = None;
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for (i, toast) in self.toasts.iter().enumerate() {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.set_max_width(320.0);
                        ui.horizontal(|ui| {
                            ui.label(RichText::new("●").color(toast.variant.color()));
                            ui.label(&toast.message);
                            if ui.small_button("✖").clicked() {
                                dismissed = Some(i);
                            }
                        });
                    });
                }
            });

        if let Some(i) = dismissed {
            self.dismiss(i);
        }
        // Keep ticking so timed toasts expire without input
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_clear() {
        let mut manager = ToastManager::new();
        manager.push(Toast::success("Exported"));
        manager.push(Toast::error("Could not load overlay"));
        assert_eq!(manager.count(), 2);
        manager.clear();
        assert_eq!(manager.count(), 0);
    }

    #[test]
    fn test_oldest_dropped_past_limit() {
        let mut manager = ToastManager::new();
        for i in 0..MAX_TOASTS + 2 {
            manager.push(Toast::info(format!("toast {}", i)));
        }
        assert_eq!(manager.count(), MAX_TOASTS);
        assert_eq!(manager.toasts[0].message, "toast 2");
    }

    #[test]
    fn test_expiry() {
        let fresh = Toast::success("fresh").with_duration(Duration::from_secs(10));
        assert!(!fresh.is_expired());

        let expired = Toast::info("gone").with_duration(Duration::ZERO);
        assert!(expired.is_expired());

        assert!(!Toast::error("sticky").is_expired());
    }

    #[test]
    fn test_dismiss() {
        let mut manager = ToastManager::new();
        manager.push(Toast::error("a"));
        manager.push(Toast::error("b"));
        manager.dismiss(0);
        assert_eq!(manager.count(), 1);
        assert_eq!(manager.toasts[0].message, "b");
        manager.dismiss(7);
        assert_eq!(manager.count(), 1);
    }
}
