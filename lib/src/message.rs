//! Orchestrator/worker protocol.
//!
//! Every message is one complete tagged record. Commands flow from the
//! orchestrator to a worker, reports flow back. The tag names on the wire are
//! `render`, `freeze`, `unfreeze`, `quit` and `client_state`.
//!
//! Links carry the JSON text produced by the codec at the bottom of this
//! module. An unknown tag is a hard decode error, never a guess.

use serde::{Deserialize, Serialize};

use crate::{Point, Rect, Size};

// ---------------------------------------------------------------------------
// Drawables
// ---------------------------------------------------------------------------

/// One primitive in a render payload. Positions are absolute screen
/// coordinates; each worker translates them into its own window space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Drawable {
    Circle { center: Point, radius: i32 },
    Rectangle { origin: Point, size: Size },
    Text { origin: Point, text: String },
}

impl Drawable {
    /// Conservative screen-space bounds. Text is measured with a fixed cell
    /// size since glyph metrics belong to the renderer.
    pub fn bounds(&self) -> Rect {
        match self {
            Drawable::Circle { center, radius } => Rect::from_origin_size(
                Point::new(center.x - *radius as f64, center.y - *radius as f64),
                Size::new(radius * 2, radius * 2),
            ),
            Drawable::Rectangle { origin, size } => Rect::from_origin_size(*origin, *size),
            Drawable::Text { origin, text } => Rect::from_origin_size(
                *origin,
                Size::new(
                    text.chars().count() as i32 * TEXT_CELL.width,
                    TEXT_CELL.height,
                ),
            ),
        }
    }
}

/// Monospace cell used for text bounds.
pub const TEXT_CELL: Size = Size::new(9, 15);

/// Ordered drawables for one frame. Workers compare whole payloads to skip
/// redundant repaints, so order is significant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderPayload(pub Vec<Drawable>);

impl RenderPayload {
    /// Drawables that overlap `window`, in payload order.
    pub fn visible_in(&self, window: &Rect) -> impl Iterator<Item = &Drawable> {
        self.0.iter().filter(move |d| d.bounds().intersects(window))
    }
}

// ---------------------------------------------------------------------------
// Commands and reports
// ---------------------------------------------------------------------------

/// Orchestrator -> worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "info", rename_all = "snake_case")]
pub enum Command {
    /// Repaint if the payload differs from the last one drawn.
    Render(RenderPayload),
    /// Pin the window at its current true rectangle.
    Freeze,
    /// Release the pin (ignored by permanently pinned workers).
    Unfreeze,
    Quit,
}

/// Worker -> orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "info", rename_all = "snake_case")]
pub enum Report {
    /// The worker's logical rectangle for this tick (pinned if frozen).
    ClientState(Rect),
    Quit,
}

impl Report {
    pub fn is_quit(&self) -> bool {
        matches!(self, Report::Quit)
    }
}

// ---------------------------------------------------------------------------
// Wire codec
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub fn encode_command(cmd: &Command) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(cmd)?)
}

pub fn decode_command(text: &str) -> Result<Command, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

pub fn encode_report(report: &Report) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(report)?)
}

pub fn decode_report(text: &str) -> Result<Report, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}
