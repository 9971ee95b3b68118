//! In-memory desktop for headless runs and tests.
//!
//! Windows are plain rectangles in a shared table. "User" actions (dragging a
//! window, clicking its close button) are exposed as methods so a driver or a
//! test can play the part of the person at the screen.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use antipong::{Drawable, Point, Rect, RenderPayload, Size};

use super::{Desktop, GeometryError, WindowGeometry, WindowHandle, WindowPlacement};

/// Offset between successive floating windows.
const CASCADE_STEP: i32 = 40;

struct VirtualWindow {
    rect: Rect,
    close_requested: bool,
    draws: u64,
    /// Last painted drawables, in window-local coordinates.
    frame: Vec<Drawable>,
}

pub struct VirtualDesktop {
    display: Size,
    next_id: AtomicU64,
    windows: RwLock<HashMap<WindowHandle, VirtualWindow>>,
}

impl VirtualDesktop {
    pub fn new(display: Size) -> Self {
        Self {
            display,
            next_id: AtomicU64::new(1),
            windows: RwLock::new(HashMap::new()),
        }
    }

    pub fn request_close_all(&self) {
        for w in self
            .windows
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .values_mut()
        {
            w.close_requested = true;
        }
    }

    fn place(&self, placement: &WindowPlacement, index: u64) -> Point {
        if let Some(p) = placement.position {
            return p;
        }
        if placement.centered {
            return Point::new(
                ((self.display.width - placement.size.width) / 2) as f64,
                ((self.display.height - placement.size.height) / 2) as f64,
            );
        }
        let span = (self.display.width - placement.size.width).max(1);
        let offset = (index as i32 * CASCADE_STEP) % span;
        Point::new(offset as f64, offset.min(self.display.height) as f64)
    }
}

/// The person at the screen.
#[cfg(test)]
impl VirtualDesktop {
    pub fn handles(&self) -> Vec<WindowHandle> {
        let mut handles: Vec<_> = self
            .windows
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .copied()
            .collect();
        handles.sort_by_key(|h| h.0);
        handles
    }

    /// Simulate the user dragging a window.
    pub fn move_window(&self, handle: WindowHandle, position: Point) -> Result<(), GeometryError> {
        self.set_position(handle, position)
    }

    /// Simulate the user clicking a window's close button.
    pub fn request_close(&self, handle: WindowHandle) {
        if let Some(w) = self
            .windows
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&handle)
        {
            w.close_requested = true;
        }
    }

    pub fn draw_count(&self, handle: WindowHandle) -> u64 {
        self.windows
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&handle)
            .map(|w| w.draws)
            .unwrap_or(0)
    }

    /// Drawables from the last paint, translated into window space.
    pub fn last_frame(&self, handle: WindowHandle) -> Option<Vec<Drawable>> {
        self.windows
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&handle)
            .map(|w| w.frame.clone())
    }
}

fn to_window_space(drawable: &Drawable, origin: Point) -> Drawable {
    match drawable {
        Drawable::Circle { center, radius } => Drawable::Circle {
            center: center.relative_to(origin),
            radius: *radius,
        },
        Drawable::Rectangle { origin: o, size } => Drawable::Rectangle {
            origin: o.relative_to(origin),
            size: *size,
        },
        Drawable::Text { origin: o, text } => Drawable::Text {
            origin: o.relative_to(origin),
            text: text.clone(),
        },
    }
}

impl WindowGeometry for VirtualDesktop {
    fn get_rect(&self, handle: WindowHandle) -> Result<Rect, GeometryError> {
        self.windows
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&handle)
            .map(|w| w.rect)
            .ok_or(GeometryError::Unavailable(handle))
    }

    fn set_position(&self, handle: WindowHandle, position: Point) -> Result<(), GeometryError> {
        let mut guard = self.windows.write().unwrap_or_else(|e| e.into_inner());
        let w = guard
            .get_mut(&handle)
            .ok_or(GeometryError::Unavailable(handle))?;
        w.rect = w.rect.with_origin(position);
        Ok(())
    }
}

impl Desktop for VirtualDesktop {
    fn open(&self, placement: &WindowPlacement) -> Result<WindowHandle, GeometryError> {
        if placement.size.width <= 0 || placement.size.height <= 0 {
            return Err(GeometryError::Open(format!(
                "empty window size {}",
                placement.size
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = WindowHandle(id);
        let origin = self.place(placement, id - 1);
        self.windows.write().unwrap_or_else(|e| e.into_inner()).insert(
            handle,
            VirtualWindow {
                rect: Rect::from_origin_size(origin, placement.size),
                close_requested: false,
                draws: 0,
                frame: Vec::new(),
            },
        );
        tracing::debug!("desktop: opened window {handle} at {origin:?}");
        Ok(handle)
    }

    fn draw(&self, handle: WindowHandle, payload: &RenderPayload) -> Result<(), GeometryError> {
        let mut guard = self.windows.write().unwrap_or_else(|e| e.into_inner());
        let w = guard
            .get_mut(&handle)
            .ok_or(GeometryError::Unavailable(handle))?;
        let origin = w.rect.origin();
        w.frame = payload
            .visible_in(&w.rect)
            .map(|d| to_window_space(d, origin))
            .collect();
        w.draws += 1;
        tracing::trace!(
            "desktop: window {handle} paint #{}, {} drawables",
            w.draws,
            w.frame.len()
        );
        Ok(())
    }

    fn take_close_request(&self, handle: WindowHandle) -> bool {
        self.windows
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&handle)
            .map(|w| std::mem::take(&mut w.close_requested))
            .unwrap_or(false)
    }

    fn close(&self, handle: WindowHandle) {
        if self
            .windows
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&handle)
            .is_some()
        {
            tracing::debug!("desktop: closed window {handle}");
        }
    }
}
