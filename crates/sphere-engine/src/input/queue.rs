use crate::api::types::EmotionId;

/// Input events the scene understands.
/// Hit-testing happens in the UI shell; sphere events arrive already resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Cursor moved to (x, y) in CSS pixels relative to the canvas.
    PointerMove { x: f32, y: f32 },
    /// Cursor left the canvas.
    PointerLeave,
    /// Cursor entered (`Some`) or left (`None`) an emotion sphere.
    HoverSphere(Option<EmotionId>),
    ClickSphere(EmotionId),
    ClickMainSphere,
    /// Dive into the focused emotion.
    Confirm,
    /// Back out of gathering before the zoom starts.
    Release,
    /// Drop the focused selection, staying split.
    Deselect,
    ReturnToOverview,
    Resize { width: f32, height: f32 },
}

/// Host input buffered between frames, applied in arrival order at the
/// start of the next `advance`.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Take everything queued so far.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
