//! Persisted configuration schema.
//!
//! The TOML file has three sections: `[game]` tuning, `[display]` geometry and
//! `[score]` persistence. Every field has a default so a partial file is fine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::Size;

/// Game tuning. Speeds are pixels per second along each axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    pub target_fps: u32,
    pub initial_ball_speed: f64,
    /// Added to the ball speed for every paddle bounce.
    pub ball_speed_score_multiplier: f64,
    pub ball_radius: i32,
    /// Movable windows, including the centered one. At least 1.
    pub num_movable_windows: usize,
    /// Distance from the screen edge to the outer side of each paddle.
    pub paddle_x: i32,
    pub paddle_size: Size,
    pub movable_window_size: Size,
    /// Countdown before the ball starts moving; loss is not evaluated meanwhile.
    pub serve_delay_ms: u64,
    pub show_fps: bool,
    /// Upper bound on the first-tick wait for each worker's initial report.
    pub first_report_timeout_ms: u64,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            target_fps: 60,
            initial_ball_speed: 70.0,
            ball_speed_score_multiplier: 10.0,
            ball_radius: 10,
            num_movable_windows: 5,
            paddle_x: 50,
            paddle_size: Size::new(30, 100),
            movable_window_size: Size::new(300, 300),
            serve_delay_ms: 1500,
            show_fps: true,
            first_report_timeout_ms: 2000,
        }
    }
}

impl GameOptions {
    /// Nominal frame period in seconds.
    pub fn frame_length(&self) -> f64 {
        1.0 / self.target_fps.max(1) as f64
    }

    /// Size of the pinned window at each side of the screen: wide enough to
    /// show the paddle and the ball at the moment it bounces.
    pub fn paddle_window_size(&self, display: Size) -> Size {
        Size::new(self.paddle_size.width * 3, display.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    pub width: i32,
    pub height: i32,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl DisplaySection {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreSection {
    /// High score file. Relative paths resolve against the working directory.
    pub path: PathBuf,
}

impl Default for ScoreSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("score.txt"),
        }
    }
}

/// Top-level persisted config.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AntipongConfig {
    #[serde(default)]
    pub game: GameOptions,
    #[serde(default)]
    pub display: DisplaySection,
    #[serde(default)]
    pub score: ScoreSection,
}
