use super::{ModalView, Overlay, Surface};
use std::io::Write;

/// Paints the overlay and alerts on stderr and the modal on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSurface;

impl Surface for TerminalSurface {
    fn paint_overlay(&self, overlay: &Overlay) {
        let mut err = std::io::stderr().lock();
        if overlay.visible {
            let _ = write!(err, "\rLoading...");
        } else {
            // Clear the spinner line
            let _ = write!(err, "\r          \r");
        }
        let _ = err.flush();
    }

    fn paint_modal(&self, modal: &ModalView) {
        if !modal.visible {
            return;
        }
        let width = modal.message.chars().count().max(modal.title.len()) + 4;
        let border = "-".repeat(width);
        println!("{}", border);
        println!("  {}", modal.title);
        println!("  {}", modal.message);
        println!("{}", border);
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}
