//! The orchestrator owns the simulation and runs the fixed-rate tick loop.
//!
//! Each tick: advance physics in sub-steps, build the frame, tell every
//! worker to freeze (its last rectangle holds the ball) or unfreeze, send the
//! frame, collect the freshest report from each worker, and decide whether
//! the game is over. Reads never block except on the first tick, where each
//! worker gets a bounded wait for its initial report.

mod roster;

pub use roster::{Roster, layout};

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use antipong::{
    BallState, Command, Direction, GameOptions, PlayArea, Point, Report, Size, ball_speed,
    build_payload, is_lost, play_area, rolling_average, step, substeps,
};

use crate::channel::PollError;
use crate::desktop::Desktop;

/// Weight of the newest sample in the FPS moving average.
const FPS_SMOOTHING: f64 = 0.1;

/// How one game instance ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// The ball was visible in no window.
    Lost { score: u32 },
    /// A worker asked to quit (its window was closed).
    Quit { worker: usize },
    /// A worker went away without saying so, or never reported in.
    WorkerDied { worker: usize },
}

impl GameOutcome {
    /// Final score, only for a lost game.
    pub fn score(&self) -> Option<u32> {
        match self {
            GameOutcome::Lost { score } => Some(*score),
            GameOutcome::Quit { .. } | GameOutcome::WorkerDied { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Countdown before the ball moves. Loss is not evaluated.
    Serve { until: Instant },
    Playing,
}

pub struct Orchestrator {
    options: GameOptions,
    display: Size,
    area: PlayArea,
    highscore: u32,
    ball: BallState,
    score: u32,
    phase: Phase,
    avg_fps: f64,
    first_tick: bool,
    roster: Roster,
}

impl Orchestrator {
    /// Spawn the workers for one game on `desktop`.
    pub fn start(
        options: GameOptions,
        display: Size,
        highscore: u32,
        desktop: Arc<dyn Desktop>,
    ) -> std::io::Result<Self> {
        let roster = Roster::spawn(layout(&options, display), desktop)?;
        info!("game: {} workers, high score {highscore}", roster.len());
        Ok(Self::with_roster(options, display, highscore, roster))
    }

    pub fn with_roster(
        options: GameOptions,
        display: Size,
        highscore: u32,
        roster: Roster,
    ) -> Self {
        let area = play_area(display, &options);
        let phase = if options.serve_delay_ms == 0 {
            Phase::Playing
        } else {
            Phase::Serve {
                until: Instant::now() + Duration::from_millis(options.serve_delay_ms),
            }
        };
        Self {
            ball: BallState {
                position: Point::new(display.width as f64 / 2.0, display.height as f64 / 2.0),
                direction: Direction::new(1, 1),
                speed: ball_speed(&options, 0),
            },
            avg_fps: options.target_fps as f64,
            options,
            display,
            area,
            highscore,
            score: 0,
            phase,
            first_tick: true,
            roster,
        }
    }

    /// Run ticks until the game ends, then tear every worker down.
    pub fn run(mut self) -> GameOutcome {
        let frame = Duration::from_secs_f64(self.options.frame_length());
        let mut last = tick_origin(Instant::now(), frame);

        let outcome = loop {
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f64();
            last = now;

            if let Some(outcome) = self.tick(now, dt) {
                break outcome;
            }

            if let Some(rest) = frame.checked_sub(now.elapsed()) {
                std::thread::sleep(rest);
            }
        };

        match outcome {
            GameOutcome::Lost { score } => info!("game: lost with score {score}"),
            GameOutcome::Quit { worker } => info!("game: worker {worker} quit"),
            GameOutcome::WorkerDied { worker } => warn!("game: worker {worker} died"),
        }
        self.roster.shutdown();
        outcome
    }

    /// One tick: simulate, dispatch, collect, judge.
    pub fn tick(&mut self, now: Instant, dt: f64) -> Option<GameOutcome> {
        if dt > 0.0 {
            self.avg_fps = rolling_average(self.avg_fps, 1.0 / dt, FPS_SMOOTHING);
        }
        self.advance(now, dt);
        let unreachable = self.dispatch();
        if let Some(outcome) = self.collect(unreachable) {
            return Some(outcome);
        }
        self.judge()
    }

    fn advance(&mut self, now: Instant, dt: f64) {
        if let Phase::Serve { until } = self.phase {
            if now < until {
                return;
            }
            info!("game: serve");
            self.phase = Phase::Playing;
        }

        for sub in substeps(dt, self.options.frame_length()) {
            self.ball.speed = ball_speed(&self.options, self.score);
            let out = step(
                self.ball.position,
                self.ball.speed,
                self.ball.direction,
                sub,
                &self.area,
            );
            self.ball.position = out.position;
            self.ball.direction = out.direction;
            if out.scored {
                self.score += 1;
                debug!("game: paddle bounce, score {}", self.score);
            }
        }
    }

    /// Send freeze/unfreeze plus the frame to every worker. Returns the first
    /// worker whose link is gone.
    fn dispatch(&self) -> Option<usize> {
        let fps = self
            .options
            .show_fps
            .then(|| self.avg_fps.round().max(0.0) as u32);
        let payload = build_payload(
            self.ball.position,
            self.score,
            self.highscore,
            self.display,
            &self.options,
            fps,
        );
        let ball = self.ball.position;
        let mut unreachable = None;

        for slot in self.roster.slots() {
            let hold = slot.last_rect.is_some_and(|r| r.contains(ball));
            let freeze = if hold {
                Command::Freeze
            } else {
                Command::Unfreeze
            };
            if slot.link.send(freeze).is_err()
                || slot.link.send(Command::Render(payload.clone())).is_err()
            {
                unreachable.get_or_insert(slot.id());
            }
        }
        unreachable
    }

    /// Take the freshest report from every worker. A queued quit wins over
    /// death, so closing a window is never mistaken for a crash.
    fn collect(&mut self, unreachable: Option<usize>) -> Option<GameOutcome> {
        let first = std::mem::replace(&mut self.first_tick, false);
        let timeout = Duration::from_millis(self.options.first_report_timeout_ms);
        let mut quit = None;
        let mut died = unreachable;

        for slot in self.roster.slots_mut() {
            let read = if first {
                slot.link.wait_first(timeout)
            } else {
                slot.link.drain_latest()
            };
            match read {
                Ok(Some(Report::ClientState(rect))) => slot.last_rect = Some(rect),
                Ok(Some(Report::Quit)) => {
                    quit.get_or_insert(slot.id());
                }
                Ok(None) if first => {
                    warn!("game: worker {} sent no report within {timeout:?}", slot.id());
                    died.get_or_insert(slot.id());
                }
                Ok(None) => {}
                Err(PollError::Disconnected) => {
                    died.get_or_insert(slot.id());
                }
                Err(e @ PollError::Malformed(_)) => {
                    warn!("game: worker {}: {e}", slot.id());
                    died.get_or_insert(slot.id());
                }
            }
            if !slot.handle.is_alive() {
                died.get_or_insert(slot.id());
            }
        }

        if let Some(worker) = quit {
            return Some(GameOutcome::Quit { worker });
        }
        died.map(|worker| GameOutcome::WorkerDied { worker })
    }

    fn judge(&self) -> Option<GameOutcome> {
        match self.phase {
            Phase::Serve { .. } => None,
            Phase::Playing => is_lost(self.ball.position, self.roster.last_rects())
                .then_some(GameOutcome::Lost { score: self.score }),
        }
    }
}

/// Pretend the previous tick happened one frame ago, or right now if the
/// monotonic clock is younger than a frame.
fn tick_origin(now: Instant, frame: Duration) -> Instant {
    now.checked_sub(frame).unwrap_or(now)
}
