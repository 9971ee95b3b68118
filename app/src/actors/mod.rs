//! Worker actors, one thread per window, reachable only through a link.

pub mod session;
mod worker;

use std::sync::Arc;
use std::thread::JoinHandle;

use crate::channel::{self, OrchestratorEnd};
use crate::desktop::{Desktop, WindowPlacement};

/// Startup parameters for one worker. Plain data: the run loop is the same
/// for every worker and only this record varies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkerConfig {
    pub id: usize,
    pub placement: WindowPlacement,
    /// Pinned for life at the opening position (paddle windows).
    pub pinned: bool,
}

/// Liveness side of a spawned worker.
pub struct WorkerHandle {
    id: usize,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn new(id: usize, thread: JoinHandle<()>) -> Self {
        Self {
            id,
            thread: Some(thread),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_alive(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Wait for the worker thread to exit.
    pub fn reap(&mut self) {
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::warn!("worker {}: thread panicked", self.id);
        }
    }
}

/// Spawn a worker thread and return the orchestrator's end of its link.
pub fn spawn(
    config: WorkerConfig,
    desktop: Arc<dyn Desktop>,
) -> std::io::Result<(OrchestratorEnd, WorkerHandle)> {
    let (orchestrator_end, worker_end) = channel::link();
    let thread = std::thread::Builder::new()
        .name(format!("worker:{}", config.id))
        .spawn(move || worker::run(config, desktop, worker_end))?;
    Ok((orchestrator_end, WorkerHandle::new(config.id, thread)))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::desktop::{VirtualDesktop, WindowGeometry};
    use antipong::{Command, Drawable, Point, Rect, RenderPayload, Report, Size};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn desktop() -> Arc<VirtualDesktop> {
        Arc::new(VirtualDesktop::new(Size::new(1000, 800)))
    }

    fn start(
        desktop: &Arc<VirtualDesktop>,
        placement: WindowPlacement,
        pinned: bool,
    ) -> (OrchestratorEnd, WorkerHandle) {
        let config = WorkerConfig {
            id: 0,
            placement,
            pinned,
        };
        spawn(config, desktop.clone()).unwrap()
    }

    /// Send one tick's commands and wait for the matching report.
    fn tick(link: &mut OrchestratorEnd, commands: Vec<Command>) -> Report {
        for cmd in commands {
            link.send(cmd).unwrap();
        }
        link.wait_first(TIMEOUT).unwrap().expect("worker report")
    }

    fn ball(x: f64) -> RenderPayload {
        RenderPayload(vec![Drawable::Circle {
            center: Point::new(x, 50.0),
            radius: 10,
        }])
    }

    #[test]
    fn reports_true_rect_when_unfrozen() {
        let d = desktop();
        let placement = WindowPlacement::at(Point::new(10.0, 20.0), Size::new(100, 100));
        let (mut link, mut handle) = start(&d, placement, false);

        let report = tick(&mut link, vec![Command::Unfreeze, Command::Render(ball(1.0))]);
        assert_eq!(report, Report::ClientState(Rect::new(10, 20, 100, 100)));

        let window = d.handles()[0];
        d.move_window(window, Point::new(300.0, 300.0)).unwrap();
        let report = tick(&mut link, vec![Command::Unfreeze, Command::Render(ball(1.0))]);
        assert_eq!(report, Report::ClientState(Rect::new(300, 300, 100, 100)));

        link.send(Command::Quit).unwrap();
        handle.reap();
        assert!(!handle.is_alive());
        assert!(d.handles().is_empty());
    }

    #[test]
    fn frozen_worker_reports_pin_and_snaps_back() {
        let d = desktop();
        let placement = WindowPlacement::at(Point::new(10.0, 20.0), Size::new(100, 100));
        let (mut link, mut handle) = start(&d, placement, false);

        let report = tick(&mut link, vec![Command::Freeze, Command::Render(ball(1.0))]);
        assert_eq!(report, Report::ClientState(Rect::new(10, 20, 100, 100)));

        let window = d.handles()[0];
        d.move_window(window, Point::new(500.0, 500.0)).unwrap();
        let report = tick(&mut link, vec![Command::Freeze, Command::Render(ball(1.0))]);
        assert_eq!(report, Report::ClientState(Rect::new(10, 20, 100, 100)));
        assert_eq!(d.get_rect(window).unwrap(), Rect::new(10, 20, 100, 100));

        link.send(Command::Quit).unwrap();
        handle.reap();
    }

    #[test]
    fn pinned_worker_ignores_unfreeze() {
        let d = desktop();
        let placement = WindowPlacement::at(Point::new(0.0, 0.0), Size::new(90, 800));
        let (mut link, mut handle) = start(&d, placement, true);
        let pinned = Report::ClientState(Rect::new(0, 0, 90, 800));

        assert_eq!(tick(&mut link, vec![Command::Unfreeze]), pinned);
        let window = d.handles()[0];
        d.move_window(window, Point::new(250.0, 40.0)).unwrap();
        assert_eq!(tick(&mut link, vec![Command::Unfreeze]), pinned);
        assert_eq!(tick(&mut link, vec![Command::Unfreeze]), pinned);

        link.send(Command::Quit).unwrap();
        handle.reap();
    }

    #[test]
    fn unchanged_payload_is_not_repainted() {
        let d = desktop();
        let placement = WindowPlacement::at(Point::new(0.0, 0.0), Size::new(100, 100));
        let (mut link, mut handle) = start(&d, placement, false);

        tick(&mut link, vec![Command::Unfreeze, Command::Render(ball(1.0))]);
        let window = d.handles()[0];
        tick(&mut link, vec![Command::Unfreeze, Command::Render(ball(1.0))]);
        assert_eq!(d.draw_count(window), 1);
        tick(&mut link, vec![Command::Unfreeze, Command::Render(ball(2.0))]);
        assert_eq!(d.draw_count(window), 2);

        link.send(Command::Quit).unwrap();
        handle.reap();
    }

    #[test]
    fn close_request_reports_quit() {
        let d = desktop();
        let placement = WindowPlacement::centered(Size::new(100, 100));
        let (mut link, mut handle) = start(&d, placement, false);
        tick(&mut link, vec![Command::Unfreeze]);

        d.request_close(d.handles()[0]);
        assert_eq!(link.wait_first(TIMEOUT).unwrap(), Some(Report::Quit));
        handle.reap();
        assert!(!handle.is_alive());
    }

    #[test]
    fn worker_exits_when_window_cannot_open() {
        let d = desktop();
        let (mut link, mut handle) = start(&d, WindowPlacement::floating(Size::new(0, 0)), false);
        handle.reap();
        assert!(!handle.is_alive());
        assert!(link.wait_first(TIMEOUT).is_err());
    }

    #[test]
    fn undecodable_command_ends_the_worker() {
        let d = desktop();
        let placement = WindowPlacement::floating(Size::new(10, 10));
        let (mut link, mut handle) = start(&d, placement, false);
        tick(&mut link, vec![Command::Unfreeze]);

        link.send_raw(r#"{"kind":"teleport"}"#);
        handle.reap();
        assert!(!handle.is_alive());
        assert!(d.handles().is_empty());
    }

    #[test]
    fn worker_exits_when_orchestrator_drops_link() {
        let d = desktop();
        let (link, mut handle) = start(&d, WindowPlacement::floating(Size::new(10, 10)), false);
        drop(link);
        handle.reap();
        assert!(d.handles().is_empty());
    }
}
