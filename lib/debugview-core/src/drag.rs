use crate::platform::{Position, Size};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragDelta {
    pub dx: f32,
    pub dy: f32,
}

impl DragDelta {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
    Other,
}

/// A raw pointer sample in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub raw_x: f32,
    pub raw_y: f32,
}

impl TouchEvent {
    pub fn new(action: TouchAction, raw_x: f32, raw_y: f32) -> Self {
        Self {
            action,
            raw_x,
            raw_y,
        }
    }
}

/// Result of feeding one touch event to a [`DragGestureTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// The event was not part of a drag gesture.
    Ignored,
    /// The event was consumed but produced no movement.
    Consumed,
    Moved(DragDelta),
}

/// Turns a down/move*/up stream of raw pointer samples into incremental deltas.
#[derive(Debug, Default)]
pub struct DragGestureTracker {
    last_raw: Option<(f32, f32)>,
}

impl DragGestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.last_raw.is_some()
    }

    pub fn handle_event(&mut self, event: &TouchEvent) -> GestureOutcome {
        match event.action {
            TouchAction::Down => {
                self.last_raw = Some((event.raw_x, event.raw_y));
                GestureOutcome::Consumed
            }
            TouchAction::Move => {
                let Some((last_x, last_y)) = self.last_raw else {
                    return GestureOutcome::Consumed;
                };
                self.last_raw = Some((event.raw_x, event.raw_y));
                GestureOutcome::Moved(DragDelta::new(event.raw_x - last_x, event.raw_y - last_y))
            }
            // Moves are applied as they arrive, so there is nothing to commit or roll back
            TouchAction::Up | TouchAction::Cancel => {
                self.last_raw = None;
                GestureOutcome::Consumed
            }
            TouchAction::Other => GestureOutcome::Ignored,
        }
    }
}

/// Picks the rendered size per dimension, falling back to the requested size while the
/// window has not been laid out yet.
pub fn resolve_window_size(rendered: Size, requested: Size) -> Size {
    Size::new(
        if rendered.width > 0 {
            rendered.width
        } else {
            requested.width
        },
        if rendered.height > 0 {
            rendered.height
        } else {
            requested.height
        },
    )
}

/// Rounds half-way values up, towards positive infinity.
fn round_half_up(value: f32) -> i64 {
    (value as f64 + 0.5).floor() as i64
}

fn clamp_axis(origin: i32, delta: f32, extent: u32, screen: u32) -> i32 {
    let min = -(extent as i64);
    let max = screen as i64 + extent as i64;
    let next = (origin as i64).saturating_add(round_half_up(delta));
    next.clamp(min, max).clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Moves `origin` by `delta`, keeping the window at most one window extent beyond any
/// screen edge so it can always be dragged back.
pub fn reposition(origin: Position, delta: DragDelta, window: Size, screen: Size) -> Position {
    Position::new(
        clamp_axis(origin.x, delta.dx, window.width, screen.width),
        clamp_axis(origin.y, delta.dy, window.height, screen.height),
    )
}
