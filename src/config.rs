//! Controller configuration components.
//!
//! This module defines the flat tunable record for the locomotion
//! controller and the external orientation frame supplied by the camera
//! collaborator.

use bevy::prelude::*;

/// The movement basis supplied by an external camera/orientation rig.
///
/// The integrator builds its move direction from this frame's `forward`
/// and `right` vectors. When the component is missing the controller
/// falls back to the body's own transform basis and logs a configuration
/// warning once.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct OrientationFrame {
    /// Forward direction of the frame.
    forward: Vec3,
    /// Right direction of the frame.
    right: Vec3,
}

impl Default for OrientationFrame {
    fn default() -> Self {
        Self {
            forward: Vec3::NEG_Z,
            right: Vec3::X,
        }
    }
}

impl OrientationFrame {
    /// Create a frame from explicit basis vectors.
    ///
    /// Both vectors are normalized. A zero-length input falls back to the
    /// corresponding world axis.
    pub fn new(forward: Vec3, right: Vec3) -> Self {
        let forward = forward.normalize_or_zero();
        let right = right.normalize_or_zero();
        Self {
            forward: if forward == Vec3::ZERO {
                Vec3::NEG_Z
            } else {
                forward
            },
            right: if right == Vec3::ZERO { Vec3::X } else { right },
        }
    }

    /// Create a frame from a yaw angle (radians around world Y).
    pub fn from_yaw(yaw: f32) -> Self {
        let rotation = Quat::from_rotation_y(yaw);
        Self {
            forward: rotation * Vec3::NEG_Z,
            right: rotation * Vec3::X,
        }
    }

    /// Forward direction of the frame.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Right direction of the frame.
    #[inline]
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Update the basis vectors, ignoring zero-length inputs.
    pub fn set(&mut self, forward: Vec3, right: Vec3) {
        let forward = forward.normalize_or_zero();
        if forward != Vec3::ZERO {
            self.forward = forward;
        }
        let right = right.normalize_or_zero();
        if right != Vec3::ZERO {
            self.right = right;
        }
    }

    /// Combine raw input axes into a world-space move direction.
    ///
    /// `vertical` scales `forward`, `horizontal` scales `right`. The
    /// result is not normalized; the integrator normalizes before
    /// applying propulsion.
    pub fn move_direction(&self, horizontal: f32, vertical: f32) -> Vec3 {
        self.forward * vertical + self.right * horizontal
    }
}

/// Tunable parameters for the locomotion controller.
///
/// Speeds are in units/second, forces in units/second^2 (they are scaled
/// by body mass on application), times in seconds, and angles in degrees.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct LocomotionConfig {
    // === Speeds ===
    /// Target speed while walking.
    pub walk_speed: f32,
    /// Target speed while sprinting.
    pub sprint_speed: f32,
    /// Target speed while crouching.
    pub crouch_speed: f32,

    // === Ground feel ===
    /// Linear damping applied to the body while grounded (0 while airborne).
    pub ground_drag: f32,
    /// Propulsion force = target speed * this multiplier.
    pub propulsion_multiplier: f32,
    /// Fraction of propulsion available while airborne (0.0 to 1.0).
    pub air_multiplier: f32,

    // === Jumping ===
    /// Takeoff speed of a jump. The impulse is scaled by body mass so the
    /// vertical velocity right after a jump equals this value.
    pub jump_force: f32,
    /// Seconds after a jump before another jump becomes available.
    pub jump_cooldown: f32,
    /// Delay before automatic repeated jumps begin while the key is held.
    pub continuous_jump_delay: f32,
    /// Minimum interval between automatic jumps while holding. The
    /// effective interval is at least `jump_cooldown`.
    pub continuous_jump_interval: f32,
    /// Extra delay added to `continuous_jump_delay` when the hold begins
    /// immediately after a jump.
    pub hold_jump_extra_delay: f32,
    /// Window after a jump within which a new hold counts as "immediately
    /// after" and receives the extra delay.
    pub just_jumped_threshold: f32,

    // === Crouching ===
    /// Vertical scale applied to the body while crouched.
    pub crouch_y_scale: f32,
    /// Downward impulse (velocity units) applied when crouching starts,
    /// to help ground adhesion.
    pub crouch_impulse: f32,

    // === Ground & slope sensing ===
    /// Full standing height of the body; ray lengths derive from half of it.
    pub player_height: f32,
    /// The ground ray starts this far above the body position, tolerating
    /// pivots below the feet.
    pub ray_origin_offset: f32,
    /// Ground ray length = player_height / 2 + this margin.
    pub ground_ray_margin: f32,
    /// Slope ray length = player_height / 2 + this margin.
    pub slope_ray_margin: f32,
    /// Steepest surface (degrees) still treated as a walkable slope.
    pub max_slope_angle: f32,
    /// Downward force applied while ascending on a slope, keeping the
    /// body in contact with the surface.
    pub slope_stick_force: f32,
    /// Collision group (memberships, filters) bits classifying ground for
    /// the ground ray. `None` lets the ray hit everything. The slope ray
    /// is always unfiltered.
    pub ground_filter: Option<(u32, u32)>,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            // Speeds
            walk_speed: 7.0,
            sprint_speed: 10.0,
            crouch_speed: 3.5,

            // Ground feel
            ground_drag: 5.0,
            propulsion_multiplier: 10.0,
            air_multiplier: 0.4,

            // Jumping
            jump_force: 12.0,
            jump_cooldown: 0.25,
            continuous_jump_delay: 0.5,
            continuous_jump_interval: 0.05,
            hold_jump_extra_delay: 0.5,
            just_jumped_threshold: 0.15,

            // Crouching
            crouch_y_scale: 0.5,
            crouch_impulse: 5.0,

            // Ground & slope sensing
            player_height: 2.0,
            ray_origin_offset: 0.1,
            ground_ray_margin: 0.2,
            slope_ray_margin: 0.3,
            max_slope_angle: 40.0,
            slope_stick_force: 80.0,
            ground_filter: None,
        }
    }
}

impl LocomotionConfig {
    /// Create a config with default tuning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Length of the grounded-check ray.
    #[inline]
    pub fn ground_ray_length(&self) -> f32 {
        self.player_height * 0.5 + self.ground_ray_margin
    }

    /// Length of the slope probe ray.
    #[inline]
    pub fn slope_ray_length(&self) -> f32 {
        self.player_height * 0.5 + self.slope_ray_margin
    }

    /// Wait between automatic jumps: never shorter than the cooldown.
    #[inline]
    pub fn hold_repeat_interval(&self) -> f32 {
        self.jump_cooldown.max(self.continuous_jump_interval)
    }

    /// Config tuned for a responsive first-person player.
    pub fn player() -> Self {
        Self {
            sprint_speed: 12.0,
            jump_force: 14.0,
            ..default()
        }
    }

    /// Builder: set walk/sprint/crouch speeds.
    pub fn with_speeds(mut self, walk: f32, sprint: f32, crouch: f32) -> Self {
        self.walk_speed = walk;
        self.sprint_speed = sprint;
        self.crouch_speed = crouch;
        self
    }

    /// Builder: set jump force and cooldown.
    pub fn with_jump(mut self, force: f32, cooldown: f32) -> Self {
        self.jump_force = force;
        self.jump_cooldown = cooldown;
        self
    }

    /// Builder: set the hold-to-repeat timing (initial delay, minimum
    /// interval, extra delay after a fresh jump).
    pub fn with_hold_jump(mut self, delay: f32, interval: f32, extra_delay: f32) -> Self {
        self.continuous_jump_delay = delay;
        self.continuous_jump_interval = interval;
        self.hold_jump_extra_delay = extra_delay;
        self
    }

    /// Builder: set the ground drag.
    pub fn with_ground_drag(mut self, drag: f32) -> Self {
        self.ground_drag = drag;
        self
    }

    /// Builder: set the airborne propulsion fraction.
    pub fn with_air_multiplier(mut self, multiplier: f32) -> Self {
        self.air_multiplier = multiplier.clamp(0.0, 1.0);
        self
    }

    /// Builder: set the body height used for ray lengths.
    pub fn with_player_height(mut self, height: f32) -> Self {
        self.player_height = height;
        self
    }

    /// Builder: set the maximum walkable slope angle (degrees).
    pub fn with_max_slope_angle(mut self, degrees: f32) -> Self {
        self.max_slope_angle = degrees;
        self
    }

    /// Builder: set the crouch scale and crouch speed.
    pub fn with_crouch(mut self, y_scale: f32, speed: f32) -> Self {
        self.crouch_y_scale = y_scale;
        self.crouch_speed = speed;
        self
    }

    /// Builder: classify ground with collision group bits
    /// (memberships, filters).
    pub fn with_ground_filter(mut self, memberships: u32, filters: u32) -> Self {
        self.ground_filter = Some((memberships, filters));
        self
    }
}
