//! Persistent state: the config file and the high score.

pub mod config;
pub mod score;
