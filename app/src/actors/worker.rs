//! Worker thread: owns one window and obeys the orchestrator.
//!
//! Every time commands arrive: read the true window rectangle, apply every
//! pending command in order, hold the window on its pin if frozen, repaint if
//! the payload changed and report the logical rectangle. Every iteration,
//! busy or idle, ends by looking for a local close request. One report goes
//! out per received command batch, which is one per orchestrator tick.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::WorkerConfig;
use super::session::{Effect, Session};
use crate::channel::{POLL_INTERVAL, PollError, WorkerEnd};
use crate::desktop::{Desktop, WindowHandle};
use antipong::Report;

pub(super) fn run(config: WorkerConfig, desktop: Arc<dyn Desktop>, mut link: WorkerEnd) {
    let id = config.id;
    let mut session = Session::new(config.pinned);

    let handle = match desktop.open(&config.placement) {
        Ok(h) => h,
        Err(e) => {
            warn!("worker {id}: {e}");
            return;
        }
    };
    match desktop.get_rect(handle) {
        Ok(rect) => session.start(rect),
        Err(e) => {
            warn!("worker {id}: window lost during startup: {e}");
            desktop.close(handle);
            return;
        }
    }
    info!(
        "worker {id}: running in window {handle}{}",
        if config.pinned { " (pinned)" } else { "" }
    );

    'session: loop {
        let batch = match link.drain_all() {
            Ok(batch) => batch,
            Err(PollError::Disconnected) => {
                debug!("worker {id}: orchestrator gone");
                break;
            }
            Err(e @ PollError::Malformed(_)) => {
                warn!("worker {id}: {e}");
                break;
            }
        };

        let idle = batch.is_empty();
        if !idle {
            session.observe(desktop.get_rect(handle).ok());
            let mut repaint = false;
            for cmd in batch {
                match session.apply(cmd) {
                    Effect::None => {}
                    Effect::Repaint => repaint = true,
                    Effect::Quit => {
                        debug!("worker {id}: quit");
                        break 'session;
                    }
                }
            }
            session.settle();
            hold_pin(id, &session, desktop.as_ref(), handle);

            if repaint
                && let Some(payload) = session.payload()
                && let Err(e) = desktop.draw(handle, payload)
            {
                debug!("worker {id}: draw skipped: {e}");
            }

            if let Some(rect) = session.reported_rect()
                && link.report(Report::ClientState(rect)).is_err()
            {
                break;
            }
        }

        if desktop.take_close_request(handle) {
            info!("worker {id}: window closed by user");
            let _ = link.report(Report::Quit);
            break;
        }

        if idle {
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    session.terminate();
    desktop.close(handle);
}

/// Move the window back onto its pin if the user dragged it away.
fn hold_pin(id: usize, session: &Session, desktop: &dyn Desktop, handle: WindowHandle) {
    let Some(pin) = session.pin() else {
        return;
    };
    if session.true_rect().map(|r| r.origin()) == Some(pin.origin()) {
        return;
    }
    if let Err(e) = desktop.set_position(handle, pin.origin()) {
        debug!("worker {id}: cannot hold pin: {e}");
    }
}
