//! Loading overlay, success modal and error alerts.
//!
//! `UiHelper` keeps the state of the two lazily created elements and hands
//! them to a [`Surface`] to paint after every change.

mod terminal;

pub use terminal::TerminalSurface;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Element id of the loading overlay
pub const LOADING_OVERLAY_ID: &str = "loading-overlay";
/// Element id of the success modal
pub const SUCCESS_MODAL_ID: &str = "success-modal";
/// Heading shown in the success modal
pub const SUCCESS_TITLE: &str = "Success!";

/// Invoked after the success modal is closed through its button
pub type CloseCallback = Arc<dyn Fn() + Send + Sync>;

/// Full-screen loading overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub id: &'static str,
    pub class: &'static str,
    pub visible: bool,
}

/// What a surface needs to paint the success modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    pub id: &'static str,
    pub title: &'static str,
    pub message: String,
    pub visible: bool,
}

/// Somewhere the helper's elements are drawn
pub trait Surface: Send + Sync {
    fn paint_overlay(&self, overlay: &Overlay);
    fn paint_modal(&self, modal: &ModalView);
    /// Blocking notification
    fn alert(&self, message: &str);
}

struct Modal {
    view: ModalView,
    on_close: Option<CloseCallback>,
}

#[derive(Default)]
struct UiState {
    overlay: Option<Overlay>,
    modal: Option<Modal>,
}

pub struct UiHelper {
    surface: Arc<dyn Surface>,
    state: Mutex<UiState>,
}

impl UiHelper {
    pub fn new(surface: Arc<dyn Surface>) -> Self {
        Self {
            surface,
            state: Mutex::new(UiState::default()),
        }
    }

    /// Helper painting to the terminal
    pub fn terminal() -> Self {
        Self::new(Arc::new(TerminalSurface))
    }

    fn state(&self) -> MutexGuard<'_, UiState> {
        // Painting never panics while holding the lock, so poisoning is benign
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Show the loading overlay, creating it on first use
    pub fn show_loading(&self) {
        let overlay = {
            let mut state = self.state();
            let overlay = state.overlay.get_or_insert_with(|| {
                debug!("Creating {}", LOADING_OVERLAY_ID);
                Overlay {
                    id: LOADING_OVERLAY_ID,
                    class: "loading-overlay",
                    visible: false,
                }
            });
            overlay.visible = true;
            overlay.clone()
        };
        self.surface.paint_overlay(&overlay);
    }

    /// Hide the loading overlay if it exists
    pub fn hide_loading(&self) {
        let overlay = {
            let mut state = self.state();
            match state.overlay.as_mut() {
                Some(overlay) => {
                    overlay.visible = false;
                    overlay.clone()
                }
                None => return,
            }
        };
        self.surface.paint_overlay(&overlay);
    }

    pub fn is_loading(&self) -> bool {
        self.state()
            .overlay
            .as_ref()
            .is_some_and(|overlay| overlay.visible)
    }

    /// Show the success modal with `message`
    ///
    /// A given `on_close` replaces the close handler; `None` keeps whatever
    /// handler is already bound. Calling this while the modal is visible
    /// overwrites its message.
    pub fn show_success_modal(&self, message: &str, on_close: Option<CloseCallback>) {
        let view = {
            let mut state = self.state();
            let modal = state.modal.get_or_insert_with(|| {
                debug!("Creating {}", SUCCESS_MODAL_ID);
                Modal {
                    view: ModalView {
                        id: SUCCESS_MODAL_ID,
                        title: SUCCESS_TITLE,
                        message: String::new(),
                        visible: false,
                    },
                    on_close: None,
                }
            });
            modal.view.message = message.to_string();
            modal.view.visible = true;
            if on_close.is_some() {
                modal.on_close = on_close;
            }
            modal.view.clone()
        };
        self.surface.paint_modal(&view);
    }

    /// Hide the success modal without running its close handler
    pub fn hide_success_modal(&self) {
        let view = {
            let mut state = self.state();
            match state.modal.as_mut() {
                Some(modal) => {
                    modal.view.visible = false;
                    modal.view.clone()
                }
                None => return,
            }
        };
        self.surface.paint_modal(&view);
    }

    /// Press the modal's close button: hide it, then run the bound handler
    pub fn close_success_modal(&self) {
        let callback = {
            let state = self.state();
            state.modal.as_ref().and_then(|modal| modal.on_close.clone())
        };
        self.hide_success_modal();
        if let Some(callback) = callback {
            callback();
        }
    }

    pub fn is_modal_visible(&self) -> bool {
        self.state()
            .modal
            .as_ref()
            .is_some_and(|modal| modal.view.visible)
    }

    /// Message of the success modal, once it exists
    pub fn modal_message(&self) -> Option<String> {
        self.state()
            .modal
            .as_ref()
            .map(|modal| modal.view.message.clone())
    }

    pub fn show_error(&self, message: &str) {
        self.surface.alert(&format!("Error: {}", message));
    }
}

impl fmt::Debug for UiHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiHelper")
            .field("loading", &self.is_loading())
            .field("modal_visible", &self.is_modal_visible())
            .finish()
    }
}
