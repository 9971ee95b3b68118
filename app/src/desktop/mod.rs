//! Windowing collaborators.
//!
//! Workers never talk to a window system directly. They go through these
//! traits, which only promise what the game needs: report a window's absolute
//! rectangle, move it, draw a frame and surface close requests. Any call may
//! fail with `Unavailable` if the window has been destroyed underneath us.

mod virtual_desktop;

pub use virtual_desktop::VirtualDesktop;

use std::fmt;

use antipong::{Point, Rect, RenderPayload, Size};

/// Opaque window identifier, unique within one desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("window {0} is unavailable")]
    Unavailable(WindowHandle),
    #[error("cannot open window: {0}")]
    Open(String),
}

/// Where a new window should appear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPlacement {
    /// Explicit top-left corner. Wins over `centered`.
    pub position: Option<Point>,
    pub size: Size,
    /// Center on the display when no position is given.
    pub centered: bool,
}

impl WindowPlacement {
    pub fn at(position: Point, size: Size) -> Self {
        Self {
            position: Some(position),
            size,
            centered: false,
        }
    }

    pub fn centered(size: Size) -> Self {
        Self {
            position: None,
            size,
            centered: true,
        }
    }

    /// Let the desktop choose.
    pub fn floating(size: Size) -> Self {
        Self {
            position: None,
            size,
            centered: false,
        }
    }
}

/// Map a window to its absolute screen rectangle and move it.
pub trait WindowGeometry: Send + Sync {
    fn get_rect(&self, handle: WindowHandle) -> Result<Rect, GeometryError>;

    fn set_position(&self, handle: WindowHandle, position: Point) -> Result<(), GeometryError>;
}

/// A window system a worker can open its window on.
pub trait Desktop: WindowGeometry {
    fn open(&self, placement: &WindowPlacement) -> Result<WindowHandle, GeometryError>;

    /// Paint `payload` into the window. Drawables are in screen space; the
    /// desktop translates them by the window origin.
    fn draw(&self, handle: WindowHandle, payload: &RenderPayload) -> Result<(), GeometryError>;

    /// Consume a pending user close request, if any.
    fn take_close_request(&self, handle: WindowHandle) -> bool;

    fn close(&self, handle: WindowHandle);
}
