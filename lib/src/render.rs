//! Per-tick render payload construction.

use crate::{Drawable, GameOptions, Point, RenderPayload, Size};

/// Build the drawables for one frame: the ball, both paddles tracking the
/// ball's height, the score lines and an optional FPS counter.
pub fn build_payload(
    ball: Point,
    score: u32,
    highscore: u32,
    display: Size,
    options: &GameOptions,
    fps: Option<u32>,
) -> RenderPayload {
    let paddle = options.paddle_size;
    let paddle_y = ball.y - (paddle.height / 2) as f64;

    let mut out = vec![
        Drawable::Circle {
            center: ball,
            radius: options.ball_radius,
        },
        Drawable::Rectangle {
            origin: Point::new(options.paddle_x as f64, paddle_y),
            size: paddle,
        },
        Drawable::Rectangle {
            origin: Point::new(
                (display.width - options.paddle_x - paddle.width) as f64,
                paddle_y,
            ),
            size: paddle,
        },
        Drawable::Text {
            origin: Point::new(0.0, 0.0),
            text: format!("SCORE: {score}"),
        },
        Drawable::Text {
            origin: Point::new(0.0, 20.0),
            text: format!("HIGH: {highscore}"),
        },
    ];

    if let Some(fps) = fps {
        out.push(Drawable::Text {
            origin: Point::new((display.width - 90) as f64, 0.0),
            text: format!("FPS: {fps}"),
        });
    }

    RenderPayload(out)
}

/// Exponential moving average: moves `average` a fraction `k` toward `current`.
pub fn rolling_average(average: f64, current: f64, k: f64) -> f64 {
    average + (current - average) * k
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_layout() {
        let opts = GameOptions::default();
        let payload = build_payload(
            Point::new(960.0, 540.0),
            2,
            7,
            Size::new(1920, 1080),
            &opts,
            None,
        );
        assert_eq!(payload.0.len(), 5);
        assert_eq!(
            payload.0[0],
            Drawable::Circle {
                center: Point::new(960.0, 540.0),
                radius: 10
            }
        );
        assert_eq!(
            payload.0[1],
            Drawable::Rectangle {
                origin: Point::new(50.0, 490.0),
                size: Size::new(30, 100)
            }
        );
        assert_eq!(
            payload.0[2],
            Drawable::Rectangle {
                origin: Point::new(1840.0, 490.0),
                size: Size::new(30, 100)
            }
        );
        assert_eq!(
            payload.0[3],
            Drawable::Text {
                origin: Point::new(0.0, 0.0),
                text: "SCORE: 2".into()
            }
        );
        assert_eq!(
            payload.0[4],
            Drawable::Text {
                origin: Point::new(0.0, 20.0),
                text: "HIGH: 7".into()
            }
        );
    }

    #[test]
    fn fps_counter_is_appended() {
        let payload = build_payload(
            Point::new(0.0, 0.0),
            0,
            0,
            Size::new(1920, 1080),
            &GameOptions::default(),
            Some(59),
        );
        assert_eq!(
            payload.0.last(),
            Some(&Drawable::Text {
                origin: Point::new(1830.0, 0.0),
                text: "FPS: 59".into()
            })
        );
    }

    #[test]
    fn same_state_same_payload() {
        let opts = GameOptions::default();
        let display = Size::new(800, 600);
        let a = build_payload(Point::new(1.0, 2.0), 1, 1, display, &opts, None);
        let b = build_payload(Point::new(1.0, 2.0), 1, 1, display, &opts, None);
        assert_eq!(a, b);
        let moved = build_payload(Point::new(1.5, 2.0), 1, 1, display, &opts, None);
        assert_ne!(a, moved);
    }

    #[test]
    fn rolling_average_moves_toward_current() {
        assert_eq!(rolling_average(60.0, 60.0, 0.1), 60.0);
        assert!((rolling_average(60.0, 30.0, 0.1) - 57.0).abs() < 1e-12);
    }
}
