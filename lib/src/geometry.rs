//! Screen-space geometry: points, sizes and window rectangles.
//!
//! Window rectangles are integer pixels in absolute screen coordinates. The
//! ball lives in continuous space, so points are `f64`.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate into the coordinate space whose origin is `origin`.
    pub fn relative_to(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A width/height pair. Serializes as `"<w>x<h>"` (e.g. `"300x300"`) so the
/// TOML file and the command line share one hand-editable spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("invalid size {s:?}: expected <width>x<height>"))?;
        let width: i32 = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width in size: {s:?}"))?;
        let height: i32 = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height in size: {s:?}"))?;
        if width < 0 || height < 0 {
            return Err(format!("invalid size {s:?}: dimensions must be non-negative"));
        }
        Ok(Self { width, height })
    }
}

impl Serialize for Size {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Size {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// Absolute screen rectangle of a window, as reported by a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(
            origin.x.round() as i32,
            origin.y.round() as i32,
            size.width,
            size.height,
        )
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Same size, moved so its top-left corner sits at `origin`.
    pub fn with_origin(self, origin: Point) -> Self {
        Self::from_origin_size(origin, self.size())
    }

    /// Inclusive on all four edges: a ball sitting exactly on a window border
    /// counts as visible in that window.
    pub fn contains(&self, point: Point) -> bool {
        let (x, y) = (self.x as f64, self.y as f64);
        point.x >= x
            && point.x <= x + self.width as f64
            && point.y >= y
            && point.y <= y + self.height as f64
    }

    /// True if the two rectangles overlap by at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// True if any of `rects` contains `point`.
pub fn any_contains<'a>(point: Point, rects: impl IntoIterator<Item = &'a Rect>) -> bool {
    rects.into_iter().any(|r| r.contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive_on_edges() {
        let r = Rect::new(10, 20, 100, 50);
        assert!(r.contains(Point::new(10.0, 20.0)));
        assert!(r.contains(Point::new(110.0, 70.0)));
        assert!(r.contains(Point::new(60.0, 45.0)));
        assert!(!r.contains(Point::new(9.9, 45.0)));
        assert!(!r.contains(Point::new(60.0, 70.1)));
    }

    #[test]
    fn any_contains_checks_every_rect() {
        let rects = [Rect::new(0, 0, 10, 10), Rect::new(100, 100, 10, 10)];
        assert!(any_contains(Point::new(105.0, 105.0), &rects));
        assert!(!any_contains(Point::new(50.0, 50.0), &rects));
        assert!(!any_contains(Point::new(50.0, 50.0), &[]));
    }

    #[test]
    fn intersects_requires_overlap() {
        let a = Rect::new(0, 0, 100, 100);
        assert!(a.intersects(&Rect::new(50, 50, 100, 100)));
        assert!(a.intersects(&Rect::new(-10, -10, 20, 20)));
        // Touching edges do not overlap
        assert!(!a.intersects(&Rect::new(100, 0, 10, 10)));
        assert!(!a.intersects(&Rect::new(0, 200, 10, 10)));
    }

    #[test]
    fn size_parses_and_displays() {
        let s: Size = "300x200".parse().unwrap();
        assert_eq!(s, Size::new(300, 200));
        assert_eq!(s.to_string(), "300x200");
        assert_eq!(" 30 X 100 ".parse::<Size>().unwrap(), Size::new(30, 100));
        assert!("300".parse::<Size>().is_err());
        assert!("ax2".parse::<Size>().is_err());
        assert!("-1x2".parse::<Size>().is_err());
    }

    #[test]
    fn with_origin_keeps_size() {
        let r = Rect::new(5, 5, 40, 30).with_origin(Point::new(100.4, 200.6));
        assert_eq!(r, Rect::new(100, 201, 40, 30));
    }
}
