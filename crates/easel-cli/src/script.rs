//! Edit scripts: a JSON list of steps replayed against a session.
//!
//! ```json
//! [
//!   {"step": "intent", "intent": {"op": "filter", "kind": "grayscale"}},
//!   {"step": "commit"},
//!   {"step": "drag", "tool": {"tool": "crop"}, "points": [{"x": 0, "y": 0}, {"x": 90, "y": 60}]},
//!   {"step": "commit"}
//! ]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use easel_core::{EditIntent, EditSession, Point, PointerTool, Presenter, Tool};
use log::info;
use serde::{Deserialize, Serialize};

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Preview an edit.
    Intent { intent: EditIntent },
    /// Replay a pointer drag with the given tool.
    Drag { tool: Tool, points: Vec<Point> },
    Commit,
    Discard,
    Revert,
}

pub fn parse_script(text: &str) -> Result<Vec<Step>> {
    serde_json::from_str(text).context("Invalid edit script")
}

pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse_script(&text).with_context(|| format!("In script {}", path.display()))
}

/// Run every step in order, stopping at the first failure.
pub fn replay<P: Presenter>(session: &mut EditSession<P>, steps: &[Step]) -> Result<()> {
    for (index, step) in steps.iter().enumerate() {
        let n = index + 1;
        match step {
            Step::Intent { intent } => session
                .apply(intent)
                .with_context(|| format!("Step {n}: {} failed", intent.name()))?,
            Step::Drag { tool, points } => {
                PointerTool::new(tool.clone())
                    .drag(session, points)
                    .with_context(|| format!("Step {n}: drag failed"))?;
            }
            Step::Commit => session.commit().with_context(|| format!("Step {n}: commit failed"))?,
            Step::Discard => session
                .discard()
                .with_context(|| format!("Step {n}: discard failed"))?,
            Step::Revert => session.revert().with_context(|| format!("Step {n}: revert failed"))?,
        }
    }
    info!("Replayed {} steps", steps.len());
    Ok(())
}
