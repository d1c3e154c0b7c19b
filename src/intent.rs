//! Movement intent component.
//!
//! The intent carries the raw input signals the controller consumes:
//! movement axes plus the jump/sprint/crouch key states. The input
//! collaborator writes it every frame from whatever device it polls;
//! the controller never touches input devices itself.

use bevy::prelude::*;

/// Per-frame input snapshot for one controlled body.
///
/// Axis values are clamped to [-1, 1]. Key states are plain booleans set
/// every frame; the controller derives press/release edges internally by
/// comparing against the previous frame's values, which it latches at the
/// end of each frame.
///
/// # Example
///
/// ```rust,ignore
/// // Your input system, each frame:
/// intent.set_move_axes(axes.x, axes.y);
/// intent.set_jump_held(keyboard.pressed(KeyCode::Space));
/// intent.set_sprint_held(keyboard.pressed(KeyCode::ShiftLeft));
/// intent.set_crouch_held(keyboard.pressed(KeyCode::ControlLeft));
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct LocomotionIntent {
    /// Strafe axis (-1 = left, 1 = right).
    pub horizontal: f32,
    /// Forward axis (-1 = backward, 1 = forward).
    pub vertical: f32,
    /// Whether the jump key is physically down this frame.
    pub jump_held: bool,
    /// Whether the sprint key is down this frame.
    pub sprint_held: bool,
    /// Whether the crouch key is down this frame.
    pub crouch_held: bool,
    /// Previous frame's jump state, latched by the controller.
    pub(crate) jump_held_prev: bool,
    /// Previous frame's crouch state, latched by the controller.
    pub(crate) crouch_held_prev: bool,
}

impl LocomotionIntent {
    /// Create an empty intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both movement axes, clamped to [-1, 1].
    pub fn set_move_axes(&mut self, horizontal: f32, vertical: f32) {
        self.horizontal = horizontal.clamp(-1.0, 1.0);
        self.vertical = vertical.clamp(-1.0, 1.0);
    }

    /// Set the jump key state for this frame.
    pub fn set_jump_held(&mut self, held: bool) {
        self.jump_held = held;
    }

    /// Set the sprint key state for this frame.
    pub fn set_sprint_held(&mut self, held: bool) {
        self.sprint_held = held;
    }

    /// Set the crouch key state for this frame.
    pub fn set_crouch_held(&mut self, held: bool) {
        self.crouch_held = held;
    }

    /// Clear the movement axes.
    pub fn clear_axes(&mut self) {
        self.horizontal = 0.0;
        self.vertical = 0.0;
    }

    /// Check if there is any movement input.
    pub fn is_moving(&self) -> bool {
        self.horizontal.abs() > 0.001 || self.vertical.abs() > 0.001
    }

    /// The jump key went down this frame.
    pub fn jump_just_pressed(&self) -> bool {
        self.jump_held && !self.jump_held_prev
    }

    /// The jump key went up this frame.
    pub fn jump_just_released(&self) -> bool {
        !self.jump_held && self.jump_held_prev
    }

    /// The crouch key went down this frame.
    pub fn crouch_just_pressed(&self) -> bool {
        self.crouch_held && !self.crouch_held_prev
    }

    /// The crouch key went up this frame.
    pub fn crouch_just_released(&self) -> bool {
        !self.crouch_held && self.crouch_held_prev
    }

    /// Latch current key states as the previous frame's values.
    ///
    /// Called once per frame by the controller after every system that
    /// consumes edges has run.
    pub(crate) fn latch_edges(&mut self) {
        self.jump_held_prev = self.jump_held;
        self.crouch_held_prev = self.crouch_held;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_new_is_empty() {
        let intent = LocomotionIntent::new();
        assert_eq!(intent.horizontal, 0.0);
        assert_eq!(intent.vertical, 0.0);
        assert!(!intent.jump_held);
        assert!(!intent.sprint_held);
        assert!(!intent.crouch_held);
        assert!(!intent.is_moving());
    }

    #[test]
    fn intent_axes_clamped() {
        let mut intent = LocomotionIntent::new();
        intent.set_move_axes(5.0, -5.0);
        assert_eq!(intent.horizontal, 1.0);
        assert_eq!(intent.vertical, -1.0);
    }

    #[test]
    fn intent_is_moving_threshold() {
        let mut intent = LocomotionIntent::new();
        intent.set_move_axes(0.0005, 0.0);
        assert!(!intent.is_moving());

        intent.set_move_axes(0.5, 0.0);
        assert!(intent.is_moving());

        intent.clear_axes();
        assert!(!intent.is_moving());
    }

    #[test]
    fn jump_edge_detection() {
        let mut intent = LocomotionIntent::new();

        intent.set_jump_held(true);
        assert!(intent.jump_just_pressed());
        assert!(!intent.jump_just_released());

        // Still held after latching: no longer an edge.
        intent.latch_edges();
        assert!(!intent.jump_just_pressed());

        intent.set_jump_held(false);
        assert!(intent.jump_just_released());
        intent.latch_edges();
        assert!(!intent.jump_just_released());
    }

    #[test]
    fn crouch_edge_detection() {
        let mut intent = LocomotionIntent::new();

        intent.set_crouch_held(true);
        assert!(intent.crouch_just_pressed());
        intent.latch_edges();
        assert!(!intent.crouch_just_pressed());

        intent.set_crouch_held(false);
        assert!(intent.crouch_just_released());
    }

    #[test]
    fn repress_after_latch_is_a_new_edge() {
        let mut intent = LocomotionIntent::new();

        intent.set_jump_held(true);
        intent.latch_edges();
        intent.set_jump_held(false);
        intent.latch_edges();

        intent.set_jump_held(true);
        assert!(intent.jump_just_pressed());
    }
}
