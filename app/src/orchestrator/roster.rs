//! The set of workers in one game and what the orchestrator knows about them.

use std::sync::Arc;

use antipong::{Command, GameOptions, Point, Rect, Size};

use crate::actors::{self, WorkerConfig, WorkerHandle};
use crate::channel::OrchestratorEnd;
use crate::desktop::{Desktop, WindowPlacement};

/// Window layout for one game: a pinned paddle window at each side of the
/// display, one centered movable window where the ball starts, and the rest
/// of the movable windows wherever the desktop puts them.
pub fn layout(options: &GameOptions, display: Size) -> Vec<WorkerConfig> {
    let paddle_window = options.paddle_window_size(display);
    let movable = options.num_movable_windows.max(1);

    let mut out = vec![
        WorkerConfig {
            id: 0,
            placement: WindowPlacement::at(Point::new(0.0, 0.0), paddle_window),
            pinned: true,
        },
        WorkerConfig {
            id: 1,
            placement: WindowPlacement::at(
                Point::new((display.width - paddle_window.width) as f64, 0.0),
                paddle_window,
            ),
            pinned: true,
        },
        WorkerConfig {
            id: 2,
            placement: WindowPlacement::centered(options.movable_window_size),
            pinned: false,
        },
    ];
    out.extend((1..movable).map(|i| WorkerConfig {
        id: 2 + i,
        placement: WindowPlacement::floating(options.movable_window_size),
        pinned: false,
    }));
    out
}

/// One worker as seen from the orchestrator.
pub struct WorkerSlot {
    pub link: OrchestratorEnd,
    pub handle: WorkerHandle,
    /// Most recent reported rectangle; `None` until the first report.
    pub last_rect: Option<Rect>,
}

impl WorkerSlot {
    pub fn new(link: OrchestratorEnd, handle: WorkerHandle) -> Self {
        Self {
            link,
            handle,
            last_rect: None,
        }
    }

    pub fn id(&self) -> usize {
        self.handle.id()
    }
}

pub struct Roster {
    slots: Vec<WorkerSlot>,
    shut_down: bool,
}

impl Roster {
    pub fn new(slots: Vec<WorkerSlot>) -> Self {
        Self {
            slots,
            shut_down: false,
        }
    }

    /// Spawn one worker per config. Workers already started are torn down if
    /// a later spawn fails.
    pub fn spawn(configs: Vec<WorkerConfig>, desktop: Arc<dyn Desktop>) -> std::io::Result<Self> {
        let mut roster = Self::new(Vec::with_capacity(configs.len()));
        for config in configs {
            let (link, handle) = actors::spawn(config, Arc::clone(&desktop))?;
            roster.slots.push(WorkerSlot::new(link, handle));
        }
        Ok(roster)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[WorkerSlot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [WorkerSlot] {
        &mut self.slots
    }

    pub fn last_rects(&self) -> impl Iterator<Item = Option<&Rect>> {
        self.slots.iter().map(|s| s.last_rect.as_ref())
    }

    /// Broadcast `quit` and reap every worker. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        for slot in &self.slots {
            let _ = slot.link.send(Command::Quit);
        }
        for slot in &mut self.slots {
            slot.handle.reap();
        }
        tracing::debug!("roster: {} workers reaped", self.slots.len());
    }
}

impl Drop for Roster {
    fn drop(&mut self) {
        self.shutdown();
    }
}
