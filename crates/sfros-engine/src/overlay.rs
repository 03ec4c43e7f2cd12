//! Immediate-mode overlay used for on-screen debug panels.

/// Minimal immediate-mode GUI surface.
///
/// Coordinates are window pixels with the origin at the top-left corner.
/// Calls only take effect for the frame currently being drawn.
pub trait Overlay {
    /// Draw a background panel.
    fn do_panel(&mut self, x: f32, y: f32, w: f32, h: f32);

    /// Draw a single line of literal text.
    fn do_label(&mut self, x: f32, y: f32, text: &str);
}
