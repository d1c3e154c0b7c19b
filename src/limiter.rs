//! Velocity limiter.
//!
//! Clamps the body's speed to the mode's target without ever touching
//! the vertical velocity component. Slope tangent and flat horizontal
//! are different planes, so the clamp has two branches; conflating them
//! clamps incorrectly on inclines.

use bevy::prelude::*;

/// Clamp `velocity` to `target_speed`.
///
/// With a `slope_normal` (walkable slope, grounded, not exiting a jump):
/// the velocity is projected onto the slope plane and, when its magnitude
/// exceeds the target, rescaled there; the returned vector reassembles
/// the rescaled X/Z with the *unprojected* vertical component.
///
/// Without one (flat ground or airborne): only the XZ magnitude is
/// compared and rescaled; vertical velocity passes through untouched.
///
/// Returns `None` when the speed is already within the target, so callers
/// can skip the velocity write-back entirely.
pub fn limit_velocity(velocity: Vec3, target_speed: f32, slope_normal: Option<Vec3>) -> Option<Vec3> {
    match slope_normal {
        Some(normal) => {
            let slope_velocity = velocity.reject_from_normalized(normal);
            if slope_velocity.length() <= target_speed {
                return None;
            }
            let limited = slope_velocity.normalize_or_zero() * target_speed;
            // Vertical comes from the unprojected velocity, not the plane.
            Some(Vec3::new(limited.x, velocity.y, limited.z))
        }
        None => {
            let flat = Vec2::new(velocity.x, velocity.z);
            if flat.length() <= target_speed {
                return None;
            }
            let limited = flat.normalize_or_zero() * target_speed;
            Some(Vec3::new(limited.x, velocity.y, limited.y))
        }
    }
}
