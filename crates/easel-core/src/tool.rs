//! Pointer tools: route gesture events to session operations.

use serde::{Deserialize, Serialize};

use crate::gesture::Gesture;
use crate::intent::EditIntent;
use crate::session::{EditSession, Presenter, SessionError};
use crate::view::Point;
use crate::Color;

/// What a drag on the canvas does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum Tool {
    /// Rubber-band a crop rectangle; crops on release.
    Crop,
    /// Freehand strokes, previewed segment by segment while moving.
    Draw {
        #[serde(default)]
        color: Color,
    },
    /// Place text at the top-left of the dragged rectangle on release.
    Text {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        color: Color,
        #[serde(default)]
        scale: Option<f32>,
    },
}

/// A tool bound to its gesture tracker.
#[derive(Debug, Clone)]
pub struct PointerTool {
    tool: Tool,
    gesture: Gesture,
}

impl PointerTool {
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            gesture: Gesture::new(),
        }
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn press(&mut self, at: Point) {
        self.gesture.press(at);
    }

    pub fn motion<P: Presenter>(
        &mut self,
        session: &mut EditSession<P>,
        at: Point,
    ) -> Result<(), SessionError> {
        let Some((from, to)) = self.gesture.motion(at) else {
            return Ok(());
        };
        match &self.tool {
            Tool::Draw { color } => session.stroke(from, to, *color),
            Tool::Crop | Tool::Text { .. } => Ok(()),
        }
    }

    /// Finish the drag. Returns the intent that was applied, if any.
    pub fn release<P: Presenter>(
        &mut self,
        session: &mut EditSession<P>,
        at: Point,
    ) -> Result<Option<EditIntent>, SessionError> {
        let Some(drag) = self.gesture.release(at) else {
            return Ok(None);
        };

        let intent = match &self.tool {
            // Segments were already previewed during motion
            Tool::Draw { .. } => return Ok(None),
            Tool::Crop => EditIntent::Crop {
                start: drag.start,
                end: drag.end,
            },
            Tool::Text { text, color, scale } => EditIntent::Text {
                text: text.clone(),
                color: *color,
                scale: *scale,
                start: drag.start,
                end: drag.end,
            },
        };
        session.apply(&intent)?;
        Ok(Some(intent))
    }

    /// Replay a whole drag: press at the first point, move through the rest,
    /// release at the last.
    pub fn drag<P: Presenter>(
        &mut self,
        session: &mut EditSession<P>,
        points: &[Point],
    ) -> Result<Option<EditIntent>, SessionError> {
        let [first, rest @ ..] = points else {
            return Ok(None);
        };
        self.press(*first);
        for p in rest {
            self.motion(session, *p).inspect_err(|_| self.gesture.cancel())?;
        }
        let last = rest.last().unwrap_or(first);
        self.release(session, *last)
    }
}
