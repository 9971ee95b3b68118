//! Ball physics: linear motion inside the play area, axis-aligned bounces and
//! paddle scoring.
//!
//! The play area is the set of legal ball centres. A ball of radius R bouncing
//! inside a rectangle is the same as a point bouncing inside that rectangle
//! shrunk by R on every side, so the radius is folded in once, up front.

use crate::{GameOptions, Point, Size};

/// Unit-sign direction. Each component is always -1 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Direction {
    x: i8,
    y: i8,
}

impl Direction {
    /// Any non-negative component maps to +1.
    pub fn new(x: i8, y: i8) -> Self {
        Self {
            x: if x < 0 { -1 } else { 1 },
            y: if y < 0 { -1 } else { 1 },
        }
    }

    pub fn x(self) -> i8 {
        self.x
    }

    pub fn y(self) -> i8 {
        self.y
    }

    fn flip_x(self) -> Self {
        Self { x: -self.x, ..self }
    }

    fn flip_y(self) -> Self {
        Self { y: -self.y, ..self }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Self { x: 1, y: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallState {
    pub position: Point,
    pub direction: Direction,
    pub speed: f64,
}

/// Rectangle of legal ball centres. Constant for one game instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlayArea {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Derive the play area from the display size and paddle/ball geometry.
///
/// The bottom edge keeps a 20px margin for window decorations.
pub fn play_area(display: Size, options: &GameOptions) -> PlayArea {
    let side = (options.paddle_x + options.paddle_size.width + options.ball_radius) as f64;
    let radius = options.ball_radius as f64;
    PlayArea::new(
        side,
        radius,
        display.width as f64 - side * 2.0,
        display.height as f64 - 20.0 - radius * 2.0,
    )
}

/// Speed for the given score: every paddle bounce makes the ball faster.
pub fn ball_speed(options: &GameOptions, score: u32) -> f64 {
    options.initial_ball_speed + score as f64 * options.ball_speed_score_multiplier
}

/// Advance `position` linearly for `dt` seconds.
pub fn tick_position(position: Point, speed: f64, direction: Direction, dt: f64) -> Point {
    Point::new(
        position.x + speed * dt * direction.x as f64,
        position.y + speed * dt * direction.y as f64,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub position: Point,
    pub direction: Direction,
    /// The ball came off a paddle (left or right boundary).
    pub scored: bool,
}

/// One physics step.
///
/// Bounces are decided on the pre-step position and the current direction,
/// so a ball that is already heading back inside is never reversed twice.
/// At most one axis flips per call; horizontal wins at corners.
pub fn step(
    position: Point,
    speed: f64,
    direction: Direction,
    dt: f64,
    area: &PlayArea,
) -> StepOutcome {
    let next = tick_position(position, speed, direction, dt);

    let (direction, scored) = if direction.x < 0 && position.x < area.left() {
        (direction.flip_x(), true)
    } else if direction.x > 0 && position.x > area.right() {
        (direction.flip_x(), true)
    } else if direction.y < 0 && position.y < area.top() {
        (direction.flip_y(), false)
    } else if direction.y > 0 && position.y > area.bottom() {
        (direction.flip_y(), false)
    } else {
        (direction, false)
    };

    StepOutcome {
        position: next,
        direction,
        scored,
    }
}

/// Split `dt` into chunks no longer than `frame`. A zero or negative `dt`
/// yields nothing.
pub fn substeps(dt: f64, frame: f64) -> impl Iterator<Item = f64> {
    let frame = if frame > 0.0 { frame } else { f64::INFINITY };
    let mut remaining = dt.max(0.0);
    std::iter::from_fn(move || {
        if remaining <= 0.0 {
            return None;
        }
        let chunk = remaining.min(frame);
        remaining -= chunk;
        Some(chunk)
    })
}
