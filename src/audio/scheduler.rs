//! Per-frame scheduling.

use std::sync::Arc;

use winit::window::Window;

/// Requests one callback at the next display refresh
pub trait FrameScheduler {
    fn request_frame(&mut self);

    /// Drop any outstanding request
    fn cancel(&mut self);
}

/// Schedules frames through winit redraw requests
pub struct RedrawScheduler {
    window: Arc<Window>,
}

impl RedrawScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }

    fn cancel(&mut self) {
        // winit cannot revoke a redraw; the controller ignores unscheduled ones
        log::trace!("Frame loop cancelled");
    }
}
