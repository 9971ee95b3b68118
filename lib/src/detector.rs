//! Loss detection.

use crate::{Point, Rect, any_contains};

/// True when no known rectangle contains the ball.
///
/// Workers that have not reported yet (`None`) never make the ball visible.
/// Callers are responsible for suppressing this during the serve countdown.
pub fn is_lost<'a>(ball: Point, rects: impl IntoIterator<Item = Option<&'a Rect>>) -> bool {
    !any_contains(ball, rects.into_iter().flatten())
}
