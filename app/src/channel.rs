//! Orchestrator/worker link. Wraps a pair of `tokio::sync::mpsc` unbounded
//! channels so callers never touch the channel types directly.
//!
//! Messages cross the link as JSON text from the protocol codec, the same
//! form they would take over a pipe. Anything that fails to decode is fatal
//! for the link: a worker stops on a bad command and the orchestrator counts a
//! worker that sends a bad report as dead.
//!
//! The two ends drain differently. The orchestrator only cares about the
//! freshest geometry and keeps the most recent report. A worker must apply
//! every command in order, so it takes the whole pending batch.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use antipong::{
    Command, ProtocolError, Report, decode_command, decode_report, encode_command, encode_report,
};

/// Sleep between polls while waiting on an empty channel.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

// ---------------------------------------------------------------------------
// PollError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    /// The peer end of the link has been dropped.
    #[error("peer disconnected")]
    Disconnected,
    /// The peer sent text that is not a protocol message.
    #[error("{0}")]
    Malformed(String),
}

impl From<ProtocolError> for PollError {
    fn from(e: ProtocolError) -> Self {
        PollError::Malformed(e.to_string())
    }
}

/// Create a connected pair of endpoints.
pub fn link() -> (OrchestratorEnd, WorkerEnd) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (report_tx, report_rx) = mpsc::unbounded_channel();
    (
        OrchestratorEnd {
            tx: cmd_tx,
            rx: report_rx,
        },
        WorkerEnd {
            tx: report_tx,
            rx: cmd_rx,
        },
    )
}

// ---------------------------------------------------------------------------
// OrchestratorEnd
// ---------------------------------------------------------------------------

pub struct OrchestratorEnd {
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
}

impl OrchestratorEnd {
    pub fn send(&self, cmd: Command) -> Result<(), PollError> {
        let text = encode_command(&cmd)?;
        self.tx.send(text).map_err(|_| PollError::Disconnected)
    }

    /// Non-blocking: the next queued report, or `Ok(None)` if empty.
    pub fn poll(&mut self) -> Result<Option<Report>, PollError> {
        match self.rx.try_recv() {
            Ok(text) => Ok(Some(decode_report(&text)?)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(PollError::Disconnected),
        }
    }

    /// Non-blocking drain keeping only the most recent report. A queued
    /// `Quit` is terminal and wins over any geometry.
    ///
    /// Reports already queued are returned even if the worker has since gone
    /// away; the disconnect surfaces on the next call.
    pub fn drain_latest(&mut self) -> Result<Option<Report>, PollError> {
        let mut latest: Option<Report> = None;
        loop {
            match self.poll() {
                Ok(Some(report)) => {
                    if !latest.as_ref().is_some_and(Report::is_quit) {
                        latest = Some(report);
                    }
                }
                Ok(None) => return Ok(latest),
                Err(PollError::Disconnected) if latest.is_some() => return Ok(latest),
                Err(e) => return Err(e),
            }
        }
    }

    /// Bounded blocking read for the first report of a game. Returns
    /// `Ok(None)` if nothing arrived before `timeout`.
    pub fn wait_first(&mut self, timeout: Duration) -> Result<Option<Report>, PollError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(report) = self.drain_latest()? {
                return Ok(Some(report));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

// ---------------------------------------------------------------------------
// WorkerEnd
// ---------------------------------------------------------------------------

pub struct WorkerEnd {
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
}

impl WorkerEnd {
    pub fn report(&self, report: Report) -> Result<(), PollError> {
        let text = encode_report(&report)?;
        self.tx.send(text).map_err(|_| PollError::Disconnected)
    }

    /// Non-blocking: every pending command, in the order sent. An empty batch
    /// means nothing is queued. One undecodable command fails the whole batch.
    pub fn drain_all(&mut self) -> Result<Vec<Command>, PollError> {
        let mut batch = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(text) => batch.push(decode_command(&text)?),
                Err(TryRecvError::Empty) => return Ok(batch),
                Err(TryRecvError::Disconnected) if batch.is_empty() => {
                    return Err(PollError::Disconnected);
                }
                Err(TryRecvError::Disconnected) => return Ok(batch),
            }
        }
    }
}

/// Raw text injection, bypassing the encoder.
#[cfg(test)]
impl OrchestratorEnd {
    pub fn send_raw(&self, text: &str) {
        let _ = self.tx.send(text.to_owned());
    }
}

#[cfg(test)]
impl WorkerEnd {
    pub fn report_raw(&self, text: &str) {
        let _ = self.tx.send(text.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antipong::Rect;

    #[test]
    fn drain_latest_keeps_most_recent_report() {
        let (mut orch, worker) = link();
        worker.report(Report::ClientState(Rect::new(0, 0, 10, 10))).unwrap();
        worker.report(Report::ClientState(Rect::new(1, 1, 10, 10))).unwrap();
        worker.report(Report::ClientState(Rect::new(2, 2, 10, 10))).unwrap();

        assert_eq!(
            orch.drain_latest().unwrap(),
            Some(Report::ClientState(Rect::new(2, 2, 10, 10)))
        );
        // Backlog is gone
        assert_eq!(orch.drain_latest().unwrap(), None);
    }

    #[test]
    fn queued_quit_is_not_overwritten() {
        let (mut orch, worker) = link();
        worker.report(Report::Quit).unwrap();
        worker.report(Report::ClientState(Rect::new(1, 1, 10, 10))).unwrap();
        assert_eq!(orch.drain_latest().unwrap(), Some(Report::Quit));
    }

    #[test]
    fn backlog_survives_worker_exit() {
        let (mut orch, worker) = link();
        worker.report(Report::Quit).unwrap();
        drop(worker);
        assert_eq!(orch.drain_latest().unwrap(), Some(Report::Quit));
        assert_eq!(orch.drain_latest(), Err(PollError::Disconnected));
        assert_eq!(orch.send(Command::Quit), Err(PollError::Disconnected));
    }

    #[test]
    fn worker_drains_full_batch_in_order() {
        let (orch, mut worker) = link();
        orch.send(Command::Freeze).unwrap();
        orch.send(Command::Unfreeze).unwrap();
        orch.send(Command::Quit).unwrap();
        assert_eq!(
            worker.drain_all().unwrap(),
            vec![Command::Freeze, Command::Unfreeze, Command::Quit]
        );
        assert!(worker.drain_all().unwrap().is_empty());
        drop(orch);
        assert_eq!(worker.drain_all(), Err(PollError::Disconnected));
    }

    #[test]
    fn wait_first_times_out() {
        let (mut orch, _worker) = link();
        let started = Instant::now();
        assert_eq!(orch.wait_first(Duration::from_millis(20)).unwrap(), None);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn wait_first_returns_late_report() {
        let (mut orch, worker) = link();
        let t = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            worker.report(Report::ClientState(Rect::new(3, 3, 3, 3))).unwrap();
            worker
        });
        assert_eq!(
            orch.wait_first(Duration::from_secs(5)).unwrap(),
            Some(Report::ClientState(Rect::new(3, 3, 3, 3)))
        );
        t.join().unwrap();
    }

    #[test]
    fn reports_travel_as_protocol_text() {
        let (orch, mut worker) = link();
        orch.send(Command::Freeze).unwrap();
        assert_eq!(worker.rx.try_recv().unwrap(), r#"{"kind":"freeze"}"#);
    }

    #[test]
    fn bad_command_fails_the_batch() {
        let (orch, mut worker) = link();
        orch.send(Command::Freeze).unwrap();
        orch.send_raw(r#"{"kind":"explode"}"#);
        orch.send(Command::Unfreeze).unwrap();
        assert!(matches!(worker.drain_all(), Err(PollError::Malformed(_))));
    }

    #[test]
    fn bad_report_is_an_error_not_a_rect() {
        let (mut orch, worker) = link();
        worker.report(Report::ClientState(Rect::new(0, 0, 1, 1))).unwrap();
        worker.report_raw("not json");
        assert!(matches!(orch.drain_latest(), Err(PollError::Malformed(_))));
    }
}
