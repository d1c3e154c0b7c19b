//! Movement mode state machine.
//!
//! The mode is re-derived from scratch every frame from the intent and
//! the ground snapshot; the only state carried across frames is the
//! target speed, which Airborne deliberately leaves untouched.

use bevy::prelude::*;

use crate::config::LocomotionConfig;
use crate::intent::LocomotionIntent;
use crate::sensor::GroundState;

/// The controller's movement mode.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementMode {
    /// Grounded, no modifier held.
    #[default]
    Walking,
    /// Grounded with the sprint key held.
    Sprinting,
    /// Crouch key held (grounded or not).
    Crouching,
    /// No ground contact.
    Airborne,
}

/// Select the mode for this frame.
///
/// Priority cascade, highest first: crouch held short-circuits
/// everything; then sprint and plain walking require ground contact;
/// anything else is airborne. Returns the mode and its target speed,
/// `None` when the mode keeps the previous speed.
pub fn select_mode(
    intent: &LocomotionIntent,
    ground: &GroundState,
    config: &LocomotionConfig,
) -> (MovementMode, Option<f32>) {
    if intent.crouch_held {
        return (MovementMode::Crouching, Some(config.crouch_speed));
    }
    if ground.grounded && intent.sprint_held {
        return (MovementMode::Sprinting, Some(config.sprint_speed));
    }
    if ground.grounded {
        return (MovementMode::Walking, Some(config.walk_speed));
    }
    // Airborne keeps whichever ground speed was last set: mid-air movement
    // has no speed cap of its own, preserving takeoff momentum.
    (MovementMode::Airborne, None)
}

/// Current mode and its target speed.
///
/// Mutated once per frame by [`crate::systems::select_movement_mode`];
/// read by the velocity limiter and the force integrator.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct ModeState {
    /// Mode selected this frame.
    pub mode: MovementMode,
    /// Speed the limiter clamps to and the integrator propels toward.
    pub target_speed: f32,
}

impl Default for ModeState {
    fn default() -> Self {
        Self {
            mode: MovementMode::Walking,
            target_speed: LocomotionConfig::default().walk_speed,
        }
    }
}

impl ModeState {
    /// Create a state starting in Walking at the config's walk speed.
    pub fn new(config: &LocomotionConfig) -> Self {
        Self {
            mode: MovementMode::Walking,
            target_speed: config.walk_speed,
        }
    }

    /// Apply this frame's selection, keeping the speed when the mode
    /// carries none of its own.
    pub fn apply(&mut self, mode: MovementMode, target_speed: Option<f32>) {
        self.mode = mode;
        if let Some(speed) = target_speed {
            self.target_speed = speed;
        }
    }
}
