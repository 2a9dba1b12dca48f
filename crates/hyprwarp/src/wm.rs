use derive_more::{AsRef, Deref, Display, From, Into};
use hyprland::data::{CursorPosition, Monitor, Monitors};
use hyprland::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn floor(self) -> Self {
        Self::new(self.x.floor(), self.y.floor())
    }
}

/// Monitor area in global, logical (scale-corrected) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Moves `point` inside this rect shrunk by `inset` on every side. An axis too
    /// small for the inset, or a NaN inset or coordinate, collapses onto the rect's
    /// center line.
    pub fn clamp(&self, point: Point, inset: f64) -> Point {
        fn axis(value: f64, start: f64, len: f64, inset: f64) -> f64 {
            let (lo, hi) = (start + inset, start + len - inset);
            match lo.partial_cmp(&hi) {
                Some(Ordering::Less | Ordering::Equal) if !value.is_nan() => value.clamp(lo, hi),
                _ => start + len / 2.0,
            }
        }

        Point::new(
            axis(point.x, self.x, self.width, inset),
            axis(point.y, self.y, self.height, inset),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Deref, From, Into, AsRef)]
pub struct MonitorName(String);

crate::impl_string_newtype!(MonitorName);

#[derive(Debug, Error)]
pub enum WarpError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("hyprctl exited with {0}")]
    Dispatch(std::process::ExitStatus),
}

fn focused_monitor() -> Option<Monitor> {
    Monitors::get().ok()?.into_iter().find(|m| m.focused)
}

pub fn get_active_monitor() -> Option<MonitorName> {
    focused_monitor().map(|m| MonitorName(m.name))
}

pub fn get_active_monitor_bounds() -> Option<Rect> {
    let m = focused_monitor()?;
    let scale = if m.scale > 0.0 { m.scale as f64 } else { 1.0 };

    Some(Rect::new(
        m.x as f64,
        m.y as f64,
        m.width as f64 / scale,
        m.height as f64 / scale,
    ))
}

pub fn get_cursor_pos() -> Option<Point> {
    let cursor = CursorPosition::get().ok()?;
    Some(Point::new(cursor.x as f64, cursor.y as f64))
}

/// Moves the pointer to a global position through `hyprctl dispatch movecursor`.
pub fn warp_cursor(target: Point) -> Result<(), WarpError> {
    let target = target.floor();
    let status = Command::new("hyprctl")
        .arg("dispatch")
        .arg("movecursor")
        .arg(format!("{}", target.x as i64))
        .arg(format!("{}", target.y as i64))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(WarpError::Dispatch(status))
    }
}
