//! Crouch bookkeeping.
//!
//! Crouching is independent of the movement mode cascade and
//! unconditional: pressing the key rescales the body and nudges it
//! downward, releasing restores the scale. The pre-crouch scale is
//! recorded exactly once, so any number of crouch cycles restores the
//! same value with no drift.

use bevy::prelude::*;

/// Crouch state for one controlled body.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct CrouchState {
    /// Whether the body is currently crouched.
    pub crouched: bool,
    /// Vertical scale recorded on the first crouch press.
    start_y_scale: Option<f32>,
}

impl CrouchState {
    /// Create an un-crouched state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a crouch. Records the pre-crouch scale on the first call
    /// ever and returns the scale to apply, or `None` when already
    /// crouched.
    pub fn begin(&mut self, current_y_scale: f32, crouch_y_scale: f32) -> Option<f32> {
        if self.crouched {
            return None;
        }
        self.start_y_scale.get_or_insert(current_y_scale);
        self.crouched = true;
        Some(crouch_y_scale)
    }

    /// End a crouch. Returns the recorded start scale to restore, or
    /// `None` when not crouched.
    pub fn end(&mut self) -> Option<f32> {
        if !self.crouched {
            return None;
        }
        self.crouched = false;
        self.start_y_scale
    }
}
