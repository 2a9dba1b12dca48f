use crate::menu::{DesktopError, DisplayGeometry, InputManipulator};
use hyprwarp::wm::{self, MonitorName, Point, Rect};

/// Desktop collaborator backed by Hyprland IPC. Grabbing claims the focused monitor,
/// which then stays the menu's monitor until release.
#[derive(Debug, Default)]
pub struct HyprDesktop {
    grabbed: Option<MonitorName>,
}

impl HyprDesktop {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputManipulator for HyprDesktop {
    fn warp_pointer(&mut self, to: Point) -> Result<(), DesktopError> {
        wm::warp_cursor(to)?;
        Ok(())
    }

    fn grab_input(&mut self) -> Result<(), DesktopError> {
        // exclusive keyboard/pointer input is the frontend's job; this only pins the monitor
        let monitor = wm::get_active_monitor()
            .ok_or_else(|| DesktopError::Grab("no focused monitor".into()))?;
        log::debug!("Grabbed input on {}", monitor);
        self.grabbed = Some(monitor);
        Ok(())
    }

    fn release_input(&mut self) {
        if let Some(monitor) = self.grabbed.take() {
            log::debug!("Released input on {}", monitor);
        }
    }
}

impl DisplayGeometry for HyprDesktop {
    fn pointer_position(&self) -> Option<Point> {
        wm::get_cursor_pos()
    }

    fn monitor_bounds(&self) -> Option<Rect> {
        wm::get_active_monitor_bounds()
    }
}
