//! Worker session state machine.
//!
//! Pure bookkeeping, no I/O: the worker thread feeds it observed window
//! geometry and orchestrator commands, and asks it what to report and
//! whether a repaint or a window move is due.

use antipong::{Command, Rect, RenderPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Running,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeState {
    Unfrozen,
    /// Pinned at this rectangle; reported instead of the true one.
    Frozen(Rect),
}

/// What the worker should do after one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// The payload changed; paint `Session::payload()`.
    Repaint,
    Quit,
}

#[derive(Debug)]
pub struct Session {
    state: SessionState,
    freeze: FreezeState,
    /// Startup rectangle of a permanently pinned worker.
    anchor: Option<Rect>,
    pinned: bool,
    true_rect: Option<Rect>,
    payload: Option<RenderPayload>,
}

impl Session {
    pub fn new(pinned: bool) -> Self {
        Self {
            state: SessionState::Starting,
            freeze: FreezeState::Unfrozen,
            anchor: None,
            pinned,
            true_rect: None,
            payload: None,
        }
    }

    /// The window is open at `rect`. Permanently pinned sessions pin here.
    pub fn start(&mut self, rect: Rect) {
        self.true_rect = Some(rect);
        if self.pinned {
            self.anchor = Some(rect);
            self.freeze = FreezeState::Frozen(rect);
        }
        self.state = SessionState::Running;
    }

    /// Record the window's true rectangle. `None` (geometry unavailable this
    /// round) keeps the previous one.
    pub fn observe(&mut self, rect: Option<Rect>) {
        if let Some(rect) = rect {
            self.true_rect = Some(rect);
        }
    }

    pub fn apply(&mut self, cmd: Command) -> Effect {
        if self.state == SessionState::Terminated {
            return Effect::Quit;
        }
        match cmd {
            Command::Render(payload) => {
                if self.payload.as_ref() == Some(&payload) {
                    Effect::None
                } else {
                    self.payload = Some(payload);
                    Effect::Repaint
                }
            }
            Command::Freeze => {
                if let (FreezeState::Unfrozen, Some(rect)) = (self.freeze, self.true_rect) {
                    self.freeze = FreezeState::Frozen(rect);
                }
                Effect::None
            }
            Command::Unfreeze => {
                if !self.pinned {
                    self.freeze = FreezeState::Unfrozen;
                }
                Effect::None
            }
            Command::Quit => {
                self.terminate();
                Effect::Quit
            }
        }
    }

    /// End of a command batch. Permanently pinned sessions go back to their
    /// anchor no matter what the batch said.
    pub fn settle(&mut self) {
        if let Some(anchor) = self.anchor {
            self.freeze = FreezeState::Frozen(anchor);
        }
    }

    pub fn terminate(&mut self) {
        self.state = SessionState::Terminated;
    }

    pub fn pin(&self) -> Option<Rect> {
        match self.freeze {
            FreezeState::Frozen(rect) => Some(rect),
            FreezeState::Unfrozen => None,
        }
    }

    /// The window's true rectangle, if it has ever been observed.
    pub fn true_rect(&self) -> Option<Rect> {
        self.true_rect
    }

    /// Logical rectangle for the orchestrator: the pin while frozen.
    pub fn reported_rect(&self) -> Option<Rect> {
        self.pin().or(self.true_rect)
    }

    pub fn payload(&self) -> Option<&RenderPayload> {
        self.payload.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antipong::{Drawable, Point};

    fn running(pinned: bool, rect: Rect) -> Session {
        let mut s = Session::new(pinned);
        s.start(rect);
        s
    }

    fn payload(x: f64) -> RenderPayload {
        RenderPayload(vec![Drawable::Circle {
            center: Point::new(x, 0.0),
            radius: 10,
        }])
    }

    #[test]
    fn starts_then_runs() {
        let mut s = Session::new(false);
        assert_eq!(s.state, SessionState::Starting);
        assert_eq!(s.reported_rect(), None);
        s.start(Rect::new(0, 0, 10, 10));
        assert_eq!(s.state, SessionState::Running);
        assert_eq!(s.freeze, FreezeState::Unfrozen);
    }

    #[test]
    fn freeze_pins_current_true_rect() {
        let mut s = running(false, Rect::new(0, 0, 10, 10));
        s.observe(Some(Rect::new(5, 5, 10, 10)));
        s.apply(Command::Freeze);
        assert_eq!(s.pin(), Some(Rect::new(5, 5, 10, 10)));

        // User drags the window; the report stays on the pin
        s.observe(Some(Rect::new(50, 50, 10, 10)));
        assert_eq!(s.reported_rect(), Some(Rect::new(5, 5, 10, 10)));

        // Repeated freeze does not move the pin
        s.apply(Command::Freeze);
        assert_eq!(s.pin(), Some(Rect::new(5, 5, 10, 10)));

        s.apply(Command::Unfreeze);
        assert_eq!(s.reported_rect(), Some(Rect::new(50, 50, 10, 10)));
    }

    #[test]
    fn freeze_then_unfreeze_is_a_no_op() {
        let rect = Rect::new(7, 8, 10, 10);
        let untouched = running(false, rect);
        let mut toggled = running(false, rect);
        toggled.apply(Command::Freeze);
        toggled.apply(Command::Unfreeze);
        toggled.settle();
        assert_eq!(toggled.freeze, untouched.freeze);
        assert_eq!(toggled.reported_rect(), untouched.reported_rect());
    }

    #[test]
    fn pinned_session_ignores_unfreeze() {
        let anchor = Rect::new(0, 0, 90, 1080);
        let mut s = running(true, anchor);
        s.apply(Command::Unfreeze);
        s.settle();
        s.observe(Some(Rect::new(400, 400, 90, 1080)));
        assert_eq!(s.reported_rect(), Some(anchor));

        s.apply(Command::Freeze);
        s.apply(Command::Unfreeze);
        s.settle();
        assert_eq!(s.freeze, FreezeState::Frozen(anchor));
    }

    #[test]
    fn identical_render_is_skipped() {
        let mut s = running(false, Rect::new(0, 0, 10, 10));
        assert_eq!(s.apply(Command::Render(payload(1.0))), Effect::Repaint);
        assert_eq!(s.apply(Command::Render(payload(1.0))), Effect::None);
        assert_eq!(s.apply(Command::Render(payload(2.0))), Effect::Repaint);
        assert_eq!(s.payload(), Some(&payload(2.0)));
    }

    #[test]
    fn unavailable_geometry_keeps_last_rect() {
        let mut s = running(false, Rect::new(1, 2, 3, 4));
        s.observe(None);
        assert_eq!(s.true_rect(), Some(Rect::new(1, 2, 3, 4)));
    }

    #[test]
    fn quit_terminates() {
        let mut s = running(false, Rect::new(0, 0, 10, 10));
        assert_eq!(s.apply(Command::Quit), Effect::Quit);
        assert_eq!(s.state, SessionState::Terminated);
        assert_eq!(s.apply(Command::Freeze), Effect::Quit);
    }
}
