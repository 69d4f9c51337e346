//! Pointer and touch input in scene coordinates.
//!
//! The window reports positions y-down in physical pixels; scenes work y-up
//! in logical points. Mouse input is folded into a single synthetic touch so
//! scene code only ever deals with touches.

use std::collections::HashMap;
use std::time::Duration;

use glam::Vec2;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton};

pub type TouchId = u64;

/// Touch id used for the left mouse button.
pub const MOUSE_TOUCH_ID: TouchId = u64::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Touch {
    pub id: TouchId,
    pub phase: TouchPhase,
    pub location: Vec2,
    /// 1 for a single tap, 2 for a double tap, and so on.
    pub tap_count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Touch(Touch),
    SecondaryPress(Vec2),
}

/// Coalesces presses that land close together in time and space.
#[derive(Clone, Debug)]
pub struct TapTracker {
    window: Duration,
    slop: f32,
    last: Option<(Duration, Vec2)>,
    count: u32,
}

impl TapTracker {
    pub fn new(window: Duration, slop: f32) -> Self {
        Self {
            window,
            slop,
            last: None,
            count: 0,
        }
    }

    /// Registers a press at `at` (time since start) and returns its tap count.
    pub fn press(&mut self, at: Duration, location: Vec2) -> u32 {
        let continues = self.last.is_some_and(|(prev_at, prev_location)| {
            at.saturating_sub(prev_at) <= self.window && prev_location.distance(location) <= self.slop
        });
        self.count = if continues { self.count + 1 } else { 1 };
        self.last = Some((at, location));
        self.count
    }
}

/// Window position to scene coordinates.
pub fn to_scene(position: PhysicalPosition<f64>, scale_factor: f64, scene_height: f32) -> Vec2 {
    let logical = position.to_logical::<f64>(scale_factor);
    Vec2::new(logical.x as f32, scene_height - logical.y as f32)
}

/// Turns raw mouse and touch events into scene [`Touch`]es.
#[derive(Debug)]
pub struct PointerInput {
    cursor: Vec2,
    mouse_down: bool,
    taps: TapTracker,
    touch_taps: HashMap<TouchId, u32>,
}

impl PointerInput {
    pub fn new(taps: TapTracker) -> Self {
        Self {
            cursor: Vec2::ZERO,
            mouse_down: false,
            taps,
            touch_taps: HashMap::new(),
        }
    }

    pub fn cursor_moved(&mut self, location: Vec2) -> Option<PointerEvent> {
        self.cursor = location;
        self.mouse_down.then(|| {
            PointerEvent::Touch(self.mouse_touch(TouchPhase::Moved))
        })
    }

    pub fn mouse_button(
        &mut self,
        button: MouseButton,
        state: ElementState,
        now: Duration,
    ) -> Option<PointerEvent> {
        match (button, state) {
            (MouseButton::Left, ElementState::Pressed) => {
                self.mouse_down = true;
                let taps = self.taps.press(now, self.cursor);
                self.touch_taps.insert(MOUSE_TOUCH_ID, taps);
                Some(PointerEvent::Touch(self.mouse_touch(TouchPhase::Began)))
            }
            (MouseButton::Left, ElementState::Released) if self.mouse_down => {
                self.mouse_down = false;
                let touch = self.mouse_touch(TouchPhase::Ended);
                self.touch_taps.remove(&MOUSE_TOUCH_ID);
                Some(PointerEvent::Touch(touch))
            }
            (MouseButton::Right, ElementState::Pressed) => Some(PointerEvent::SecondaryPress(self.cursor)),
            _ => None,
        }
    }

    /// Cancels the synthetic mouse touch, e.g. when the cursor leaves the window.
    pub fn cancel_mouse(&mut self) -> Option<PointerEvent> {
        if !self.mouse_down {
            return None;
        }
        self.mouse_down = false;
        let touch = self.mouse_touch(TouchPhase::Cancelled);
        self.touch_taps.remove(&MOUSE_TOUCH_ID);
        Some(PointerEvent::Touch(touch))
    }

    pub fn touch(
        &mut self,
        id: TouchId,
        phase: winit::event::TouchPhase,
        location: Vec2,
        now: Duration,
    ) -> Touch {
        let phase = match phase {
            winit::event::TouchPhase::Started => TouchPhase::Began,
            winit::event::TouchPhase::Moved => TouchPhase::Moved,
            winit::event::TouchPhase::Ended => TouchPhase::Ended,
            winit::event::TouchPhase::Cancelled => TouchPhase::Cancelled,
        };
        let tap_count = match phase {
            TouchPhase::Began => {
                let taps = self.taps.press(now, location);
                self.touch_taps.insert(id, taps);
                taps
            }
            TouchPhase::Moved => self.touch_taps.get(&id).copied().unwrap_or(1),
            TouchPhase::Ended | TouchPhase::Cancelled => self.touch_taps.remove(&id).unwrap_or(1),
        };
        Touch {
            id,
            phase,
            location,
            tap_count,
        }
    }

    fn mouse_touch(&self, phase: TouchPhase) -> Touch {
        Touch {
            id: MOUSE_TOUCH_ID,
            phase,
            location: self.cursor,
            tap_count: self.touch_taps.get(&MOUSE_TOUCH_ID).copied().unwrap_or(1),
        }
    }
}
