//! Press / move / release tracking for crop selections and freehand strokes.
//!
//! The tracker is fed discrete canvas positions and does not care which
//! windowing system produced them.

use crate::view::Point;

/// Gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    Active,
}

/// A finished press-move*-release sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub start: Point,
    pub end: Point,
    /// Every position seen, press and release included.
    pub points: Vec<Point>,
}

/// `Idle -> Active -> Idle` state machine.
#[derive(Debug, Clone, Default)]
pub struct Gesture {
    phase: GesturePhase,
    points: Vec<Point>,
}

impl Gesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Start a new sequence, discarding any unfinished one.
    pub fn press(&mut self, at: Point) {
        self.points.clear();
        self.points.push(at);
        self.phase = GesturePhase::Active;
    }

    /// Record a move. Returns the segment `(previous, current)` while active;
    /// moves while idle are ignored.
    pub fn motion(&mut self, at: Point) -> Option<(Point, Point)> {
        if self.phase != GesturePhase::Active {
            return None;
        }
        let previous = *self.points.last()?;
        self.points.push(at);
        Some((previous, at))
    }

    /// Finish the sequence. Returns `None` if no press preceded it.
    pub fn release(&mut self, at: Point) -> Option<Drag> {
        if self.phase != GesturePhase::Active {
            return None;
        }
        self.phase = GesturePhase::Idle;

        if self.points.last() != Some(&at) {
            self.points.push(at);
        }
        let points = std::mem::take(&mut self.points);
        Some(Drag {
            start: points[0],
            end: at,
            points,
        })
    }

    /// Drop any in-progress sequence.
    pub fn cancel(&mut self) {
        self.points.clear();
        self.phase = GesturePhase::Idle;
    }
}
