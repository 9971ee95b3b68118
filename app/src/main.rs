use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod actors;
mod channel;
mod desktop;
mod orchestrator;
mod state;

use antipong::{AntipongConfig, Size, play_area};
use desktop::{Desktop, VirtualDesktop};
use orchestrator::{GameOutcome, Orchestrator};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "antipong",
    about = "Keep the ball inside at least one window (headless simulation on a virtual desktop)"
)]
struct Config {
    /// Config file path (default: ~/.config/antipong/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of movable windows, including the centered one
    #[arg(short, long)]
    windows: Option<usize>,

    /// Initial ball speed in pixels per second
    #[arg(short, long)]
    speed: Option<f64>,

    /// Speed added per paddle bounce
    #[arg(short, long)]
    multiplier: Option<f64>,

    /// High score file
    #[arg(short = 'o', long)]
    scorefile: Option<PathBuf>,

    /// Target frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Size of each movable window, e.g. 300x300
    #[arg(long)]
    window_size: Option<Size>,

    /// Games to play before exiting (0 = until a window is closed)
    #[arg(long, default_value_t = 0)]
    rounds: u32,

    /// Display width in pixels
    #[arg(long)]
    width: Option<i32>,

    /// Display height in pixels
    #[arg(long)]
    height: Option<i32>,
}

impl Config {
    /// Command-line values override the config file.
    fn apply(&self, config: &mut AntipongConfig) {
        let game = &mut config.game;
        if let Some(n) = self.windows {
            game.num_movable_windows = n;
        }
        if let Some(speed) = self.speed {
            game.initial_ball_speed = speed;
        }
        if let Some(m) = self.multiplier {
            game.ball_speed_score_multiplier = m;
        }
        if let Some(fps) = self.fps {
            game.target_fps = fps;
        }
        if let Some(size) = self.window_size {
            game.movable_window_size = size;
        }
        if let Some(path) = &self.scorefile {
            config.score.path = path.clone();
        }
        if let Some(w) = self.width {
            config.display.width = w;
        }
        if let Some(h) = self.height {
            config.display.height = h;
        }
    }
}

/// Reject settings that make the game degenerate before any window opens.
fn validate(config: &AntipongConfig) -> anyhow::Result<()> {
    let display = config.display.size();
    let game = &config.game;
    anyhow::ensure!(
        display.width > 0 && display.height > 0,
        "display size must be positive, got {display}"
    );
    for (name, size) in [
        ("movable window", game.movable_window_size),
        ("paddle", game.paddle_size),
    ] {
        anyhow::ensure!(
            size.width > 0 && size.height > 0,
            "{name} size must be positive, got {size}"
        );
    }
    anyhow::ensure!(
        game.ball_radius > 0,
        "ball radius must be positive, got {}",
        game.ball_radius
    );
    for (name, value) in [
        ("initial ball speed", game.initial_ball_speed),
        ("speed multiplier", game.ball_speed_score_multiplier),
    ] {
        anyhow::ensure!(
            value.is_finite() && value >= 0.0,
            "{name} must be a non-negative number, got {value}"
        );
    }
    let area = play_area(display, game);
    anyhow::ensure!(
        area.width > 0.0 && area.height > 0.0,
        "display {display} leaves no room to play between the paddles"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Rounds
// ---------------------------------------------------------------------------

/// Dead rounds in a row before giving up.
const MAX_DEAD_ROUNDS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    Play,
    Stop,
    GiveUp,
}

/// Bookkeeping across games: round count, high score and dead-round streak.
struct Rounds {
    /// 0 plays until a window is closed.
    limit: u32,
    played: u32,
    dead_in_a_row: u32,
    highscore: u32,
}

impl Rounds {
    fn new(limit: u32, highscore: u32) -> Self {
        Self {
            limit,
            played: 0,
            dead_in_a_row: 0,
            highscore,
        }
    }

    fn record(&mut self, outcome: GameOutcome) -> Next {
        self.played += 1;
        if let Some(score) = outcome.score()
            && score > self.highscore
        {
            tracing::info!("new high score: {score}");
            self.highscore = score;
        }
        match outcome {
            GameOutcome::Lost { .. } => self.dead_in_a_row = 0,
            GameOutcome::Quit { .. } => return Next::Stop,
            GameOutcome::WorkerDied { worker } => {
                tracing::warn!("round {} abandoned, worker {worker} died", self.played);
                self.dead_in_a_row += 1;
                if self.dead_in_a_row >= MAX_DEAD_ROUNDS {
                    return Next::GiveUp;
                }
            }
        }
        if self.limit != 0 && self.played >= self.limit {
            Next::Stop
        } else {
            Next::Play
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new("antipong=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::debug!("debug logging enabled");

    let cli = Config::parse();

    // Load (or create) config file, then layer the command line on top
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(state::config::default_config_path);
    let mut config = state::config::load(&config_path);
    cli.apply(&mut config);

    validate(&config)?;

    let display = config.display.size();
    let options = config.game;
    let score_path = config.score.path;
    let mut rounds = Rounds::new(cli.rounds, state::score::load(&score_path));

    // No real window system: nobody drags windows here, so every round ends
    // in a loss shortly after the serve.
    let desktop = Arc::new(VirtualDesktop::new(display));
    let interrupted = Arc::new(AtomicBool::new(false));
    watch_ctrl_c(Arc::clone(&desktop), Arc::clone(&interrupted))?;

    let result = loop {
        if interrupted.load(Ordering::Relaxed) {
            break Ok(());
        }
        tracing::info!(
            "round {}, high score {}",
            rounds.played + 1,
            rounds.highscore
        );
        let shared: Arc<dyn Desktop> = desktop.clone();
        let game = match Orchestrator::start(options.clone(), display, rounds.highscore, shared) {
            Ok(game) => game,
            Err(e) => break Err(anyhow::Error::from(e)),
        };
        match rounds.record(game.run()) {
            Next::Play => {}
            Next::Stop => break Ok(()),
            Next::GiveUp => {
                break Err(anyhow::anyhow!(
                    "a worker died in {MAX_DEAD_ROUNDS} rounds in a row, giving up"
                ));
            }
        }
    };

    tracing::info!("shutting down...");
    state::score::save(&score_path, rounds.highscore);
    result
}

/// Close every window on Ctrl-C so the running game ends with a quit.
///
/// The signal listener needs a tokio runtime; it lives on its own thread so
/// the game loop stays plain blocking code.
fn watch_ctrl_c(desktop: Arc<VirtualDesktop>, interrupted: Arc<AtomicBool>) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    std::thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            if let Err(e) = rt.block_on(tokio::signal::ctrl_c()) {
                tracing::warn!("cannot listen for Ctrl-C: {e}");
                return;
            }
            tracing::info!("interrupted");
            interrupted.store(true, Ordering::Relaxed);
            // A game may be opening its windows right now; keep closing them
            loop {
                desktop.request_close_all();
                std::thread::sleep(Duration::from_millis(50));
            }
        })?;
    Ok(())
}
